//! Employee store: the query, guard and write operations over a COMPANY database
//!
//! This module provides:
//! - Criteria searches and grouped salary averages (`queries`)
//! - Dependency classification before deletes (`guard`)
//! - Validated inserts and per-row batch updates/deletes (`writes`)
//! - Schema installation and sample data for new databases (`schema`)
//!
//! Every operation acquires its own session from the [`SessionProvider`] and
//! releases it before returning. Batch writes run one autocommitted
//! statement per row; there is no enclosing transaction.

mod guard;
mod queries;
mod schema;
mod writes;

pub use guard::{DeletionReview, DependencySummary, GuardedDelete};
pub use writes::{BatchOutcome, EditableAttribute, RowFailure};

use std::path::PathBuf;

use crate::core::error::Result;
use crate::core::session::{Session, SessionProvider, SqliteProvider};

/// Record operations over employees, backed by a session provider
pub struct EmployeeStore<P: SessionProvider = SqliteProvider> {
    provider: P,
}

impl<P: SessionProvider> EmployeeStore<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn session(&self) -> Result<Session> {
        self.provider.acquire()
    }
}

impl EmployeeStore<SqliteProvider> {
    /// Store over a SQLite database file
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(SqliteProvider::new(path))
    }
}

#[cfg(test)]
mod tests;
