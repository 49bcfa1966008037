//! Error taxonomy for the record engine
//!
//! Every failure the core can produce is a [`CoreError`]. Caller errors
//! (projection, criteria, validation) are raised before any statement runs;
//! store failures carry the underlying rusqlite error as their source.

use miette::Diagnostic;
use thiserror::Error;

use crate::core::identity::Ssn;

/// Result alias used throughout the core
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[derive(Debug, Error, Diagnostic)]
pub enum CoreError {
    #[error("No attributes selected for the result")]
    #[diagnostic(
        code(corpdb::criteria::projection),
        help("select at least one attribute (e.g. name, ssn, salary)")
    )]
    InvalidProjection,

    #[error("Unsupported search attribute: {tag}")]
    #[diagnostic(
        code(corpdb::criteria::unsupported),
        help("filterable attributes: name, ssn, bdate, address, department, sex, salary, supervisor")
    )]
    UnsupportedCriterion { tag: String },

    #[error("Invalid {field} '{value}': {reason}")]
    #[diagnostic(code(corpdb::validation))]
    Validation {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Employee {ssn} already exists")]
    #[diagnostic(code(corpdb::write::duplicate_key))]
    DuplicateKey { ssn: Ssn },

    #[error("Cannot delete supervisors with subordinates: {}", join_ssns(.blocked))]
    #[diagnostic(
        code(corpdb::guard::blocked),
        help("reassign the subordinates of these employees to another supervisor first")
    )]
    DependencyBlocked { blocked: Vec<Ssn> },

    #[error("Query failed: {0}")]
    #[diagnostic(code(corpdb::store::query))]
    Query(#[source] rusqlite::Error),

    #[error("Data access failed: {0}")]
    #[diagnostic(code(corpdb::store::data_access))]
    DataAccess(#[source] rusqlite::Error),

    #[error("Batch stopped after {succeeded} of {attempted} row(s): {source}")]
    #[diagnostic(code(corpdb::write::interrupted))]
    BatchInterrupted {
        succeeded: usize,
        attempted: usize,
        #[source]
        source: Box<CoreError>,
    },
}

impl CoreError {
    /// Shorthand for a field-level validation failure
    pub fn validation(
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CoreError::Validation {
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// True for failures raised by the caller's input rather than the store
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidProjection
                | CoreError::UnsupportedCriterion { .. }
                | CoreError::Validation { .. }
        )
    }
}

fn join_ssns(ssns: &[Ssn]) -> String {
    ssns.iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_message_lists_all_ssns() {
        let err = CoreError::DependencyBlocked {
            blocked: vec![
                Ssn::parse("999999999").unwrap(),
                Ssn::parse("888888888").unwrap(),
            ],
        };
        assert_eq!(
            err.to_string(),
            "Cannot delete supervisors with subordinates: 999999999, 888888888"
        );
    }

    #[test]
    fn test_caller_errors() {
        assert!(CoreError::InvalidProjection.is_caller_error());
        assert!(CoreError::validation("salary", "x", "not a number").is_caller_error());
        assert!(!CoreError::Query(rusqlite::Error::QueryReturnedNoRows).is_caller_error());
    }
}
