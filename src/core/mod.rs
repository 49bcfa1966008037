//! Core module - record types, query compilation and the employee store

pub mod config;
pub mod criteria;
pub mod employee;
pub mod error;
pub mod identity;
pub mod mapper;
pub mod session;
pub mod store;

pub use config::Config;
pub use criteria::{
    compile, Attribute, CompiledQuery, CriteriaBuilder, Criterion, GroupKey, GroupSpec, Operator,
    Projection,
};
pub use employee::{Department, Employee, EmployeeDraft, Role, Salary, Sex};
pub use error::{CoreError, Result};
pub use identity::{IdParseError, Ssn};
pub use session::{Session, SessionProvider, SqliteProvider};
pub use store::{
    BatchOutcome, DeletionReview, DependencySummary, EditableAttribute, EmployeeStore,
    GuardedDelete, RowFailure,
};
