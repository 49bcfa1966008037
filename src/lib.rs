//! corpdb: employee records over a COMPANY database
//!
//! Typed search criteria compiled into parameterized SQL, grouped salary
//! reports, and inserts, updates and deletes guarded by referential checks.

pub mod cli;
pub mod core;
