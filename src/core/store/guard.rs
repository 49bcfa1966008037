//! Mutation guard: dependency checks before deleting employees
//!
//! Two tiers:
//! - an employee who supervises anyone else is **blocked** and must never
//!   reach the delete statement;
//! - an employee who manages a department, works on a project or has
//!   dependents on file is **warnable**: deletion is allowed once the caller
//!   has explicit confirmation.

use rusqlite::params;
use serde::Serialize;

use crate::core::error::{CoreError, Result};
use crate::core::identity::Ssn;
use crate::core::session::{Session, SessionProvider};

use super::{BatchOutcome, EmployeeStore};

const SUBORDINATES_SQL: &str = "SELECT COUNT(*) FROM EMPLOYEE WHERE Super_ssn = ?1 AND Ssn <> ?1";
const MANAGED_DEPARTMENTS_SQL: &str = "SELECT COUNT(*) FROM DEPARTMENT WHERE Mgr_ssn = ?1";
const PROJECT_ASSIGNMENTS_SQL: &str = "SELECT COUNT(*) FROM WORKS_ON WHERE Essn = ?1";
const DEPENDENTS_SQL: &str = "SELECT COUNT(*) FROM DEPENDENT WHERE Essn = ?1";

/// Records that reference one employee
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencySummary {
    pub ssn: Ssn,
    pub subordinates: usize,
    pub managed_departments: usize,
    pub project_assignments: usize,
    pub dependents: usize,
}

impl DependencySummary {
    pub fn is_blocking(&self) -> bool {
        self.subordinates > 0
    }

    pub fn is_warnable(&self) -> bool {
        self.managed_departments > 0 || self.project_assignments > 0 || self.dependents > 0
    }
}

/// Outcome of classifying a deletion batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionReview {
    /// Supervisors with subordinates, in request order
    pub blocked: Vec<Ssn>,
    /// Some member has soft dependencies and needs confirmation
    pub warnable: bool,
    /// Per-identifier counts, in request order
    pub details: Vec<DependencySummary>,
}

impl DeletionReview {
    /// Nothing blocked and nothing to confirm
    pub fn is_clean(&self) -> bool {
        self.blocked.is_empty() && !self.warnable
    }
}

/// Result of [`EmployeeStore::delete_guarded`]
#[derive(Debug)]
pub enum GuardedDelete {
    Deleted(BatchOutcome),
    /// The caller refused the dependency warning; nothing was deleted
    Declined,
}

impl<P: SessionProvider> EmployeeStore<P> {
    /// Classify a deletion batch without modifying anything
    ///
    /// Duplicate identifiers are reviewed once.
    pub fn classify_deletion(&self, ids: &[Ssn]) -> Result<DeletionReview> {
        let session = self.session()?;

        let mut details: Vec<DependencySummary> = Vec::with_capacity(ids.len());
        for ssn in ids {
            if details.iter().any(|d| &d.ssn == ssn) {
                continue;
            }
            details.push(DependencySummary {
                ssn: ssn.clone(),
                subordinates: count(&session, SUBORDINATES_SQL, ssn)?,
                managed_departments: count(&session, MANAGED_DEPARTMENTS_SQL, ssn)?,
                project_assignments: count(&session, PROJECT_ASSIGNMENTS_SQL, ssn)?,
                dependents: count(&session, DEPENDENTS_SQL, ssn)?,
            });
        }

        let blocked: Vec<Ssn> = details
            .iter()
            .filter(|d| d.is_blocking())
            .map(|d| d.ssn.clone())
            .collect();
        let warnable = details.iter().any(DependencySummary::is_warnable);

        tracing::debug!(
            requested = ids.len(),
            blocked = blocked.len(),
            warnable,
            "deletion classified"
        );
        Ok(DeletionReview {
            blocked,
            warnable,
            details,
        })
    }

    /// Delete after the guard has cleared the batch
    ///
    /// Fails with [`CoreError::DependencyBlocked`] (deleting nothing) if any
    /// identifier is blocked. When the batch is warnable, `confirm` is asked
    /// once for the whole batch; refusing deletes nothing.
    pub fn delete_guarded<F>(&self, ids: &[Ssn], confirm: F) -> Result<GuardedDelete>
    where
        F: FnOnce(&DeletionReview) -> bool,
    {
        let review = self.classify_deletion(ids)?;
        if !review.blocked.is_empty() {
            return Err(CoreError::DependencyBlocked {
                blocked: review.blocked,
            });
        }
        if review.warnable && !confirm(&review) {
            return Ok(GuardedDelete::Declined);
        }
        Ok(GuardedDelete::Deleted(self.delete(ids)?))
    }
}

fn count(session: &Session, sql: &str, ssn: &Ssn) -> Result<usize> {
    let n: i64 = session
        .prepare_cached(sql)
        .and_then(|mut stmt| stmt.query_row(params![ssn.as_str()], |row| row.get(0)))
        .map_err(CoreError::Query)?;
    Ok(n.max(0) as usize)
}
