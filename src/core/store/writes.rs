//! Write operations: insert, per-row batch update and delete
//!
//! Batches run sequentially, one autocommitted statement per identifier. A
//! validation failure skips only its own row; a store failure stops the
//! batch and reports how many rows had already been written.

use rusqlite::types::Value;
use rusqlite::{ffi, params, params_from_iter, ErrorCode};
use std::fmt;
use std::str::FromStr;

use crate::core::criteria::Attribute;
use crate::core::employee::{
    parse_birth_date, parse_department_number, parse_ssn, Employee, EmployeeDraft, Salary, Sex,
    DATE_FORMAT,
};
use crate::core::error::{CoreError, Result};
use crate::core::identity::Ssn;
use crate::core::mapper::insert_params;
use crate::core::session::{Session, SessionProvider};

use super::EmployeeStore;

const INSERT_SQL: &str = "INSERT INTO EMPLOYEE \
    (Fname, Minit, Lname, Ssn, Bdate, Address, Sex, Salary, Super_ssn, Dno, created, modified) \
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)";

const DELETE_SQL: &str = "DELETE FROM EMPLOYEE WHERE Ssn = ?1";

// =========================================================================
// Editable attributes
// =========================================================================

/// Attributes that may be changed in place; identifier and names are excluded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditableAttribute {
    Address,
    Sex,
    Salary,
    Bdate,
    Supervisor,
    Department,
}

impl EditableAttribute {
    pub fn column(&self) -> &'static str {
        match self {
            EditableAttribute::Address => "Address",
            EditableAttribute::Sex => "Sex",
            EditableAttribute::Salary => "Salary",
            EditableAttribute::Bdate => "Bdate",
            EditableAttribute::Supervisor => "Super_ssn",
            EditableAttribute::Department => "Dno",
        }
    }

    /// Coerce the new value for the row identified by `target`
    pub fn coerce(&self, raw: &str, target: &Ssn) -> Result<Value> {
        match self {
            EditableAttribute::Address => {
                let address = raw.trim();
                if address.is_empty() {
                    return Err(CoreError::validation("address", raw, "required"));
                }
                Ok(Value::Text(address.to_string()))
            }
            EditableAttribute::Sex => Ok(Value::Text(raw.parse::<Sex>()?.as_str().to_string())),
            EditableAttribute::Salary => Ok(Value::Real(Salary::parse(raw)?.as_f64())),
            EditableAttribute::Bdate => Ok(Value::Text(
                parse_birth_date(raw)?.format(DATE_FORMAT).to_string(),
            )),
            EditableAttribute::Supervisor => {
                let supervisor = parse_ssn("supervisor", raw)?;
                if &supervisor == target {
                    return Err(CoreError::validation(
                        "supervisor",
                        raw,
                        "an employee cannot supervise themselves",
                    ));
                }
                Ok(Value::Text(supervisor.into()))
            }
            EditableAttribute::Department => Ok(Value::Integer(i64::from(
                parse_department_number(raw)?,
            ))),
        }
    }

    fn update_sql(&self) -> String {
        format!(
            "UPDATE EMPLOYEE SET {} = ?1, modified = CURRENT_TIMESTAMP WHERE Ssn = ?2",
            self.column()
        )
    }
}

impl fmt::Display for EditableAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Attribute::from(*self).as_str())
    }
}

impl From<EditableAttribute> for Attribute {
    fn from(attr: EditableAttribute) -> Self {
        match attr {
            EditableAttribute::Address => Attribute::Address,
            EditableAttribute::Sex => Attribute::Sex,
            EditableAttribute::Salary => Attribute::Salary,
            EditableAttribute::Bdate => Attribute::Bdate,
            EditableAttribute::Supervisor => Attribute::Supervisor,
            EditableAttribute::Department => Attribute::Department,
        }
    }
}

impl TryFrom<Attribute> for EditableAttribute {
    type Error = CoreError;

    fn try_from(attr: Attribute) -> Result<Self> {
        match attr {
            Attribute::Address => Ok(EditableAttribute::Address),
            Attribute::Sex => Ok(EditableAttribute::Sex),
            Attribute::Salary => Ok(EditableAttribute::Salary),
            Attribute::Bdate => Ok(EditableAttribute::Bdate),
            Attribute::Supervisor => Ok(EditableAttribute::Supervisor),
            Attribute::Department => Ok(EditableAttribute::Department),
            Attribute::Name | Attribute::Ssn | Attribute::Modified => Err(
                CoreError::validation("attribute", attr.as_str(), "not editable"),
            ),
        }
    }
}

impl FromStr for EditableAttribute {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        EditableAttribute::try_from(s.parse::<Attribute>()?)
    }
}

// =========================================================================
// Batch accounting
// =========================================================================

/// A row skipped because its value failed validation
#[derive(Debug)]
pub struct RowFailure {
    pub ssn: Ssn,
    pub error: CoreError,
}

/// Per-row accounting for a batch update or delete
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub requested: usize,
    pub succeeded: usize,
    pub failures: Vec<RowFailure>,
}

impl BatchOutcome {
    /// Rows attempted but not found (no longer existing)
    pub fn missing(&self) -> usize {
        self.requested - self.succeeded - self.failures.len()
    }
}

// =========================================================================
// Writes
// =========================================================================

impl<P: SessionProvider> EmployeeStore<P> {
    /// Insert a new employee; timestamps are assigned by the database
    ///
    /// Fails with [`CoreError::DuplicateKey`] if the SSN is taken.
    pub fn insert(&self, emp: &Employee) -> Result<bool> {
        ensure_insertable(emp)?;

        let session = self.session()?;
        let inserted = session
            .execute(INSERT_SQL, params_from_iter(insert_params(emp)))
            .map_err(|e| {
                if is_primary_key_violation(&e) {
                    CoreError::DuplicateKey {
                        ssn: emp.ssn.clone(),
                    }
                } else {
                    CoreError::DataAccess(e)
                }
            })?;

        tracing::debug!(ssn = %emp.ssn, "employee inserted");
        Ok(inserted > 0)
    }

    /// Validate raw input and insert it, returning the stored record
    pub fn insert_draft(&self, draft: &EmployeeDraft) -> Result<Employee> {
        let emp = draft.validate()?;
        self.insert(&emp)?;
        Ok(emp)
    }

    /// Set one attribute to `value` on every listed employee
    ///
    /// Each row is coerced and written on its own and gets a fresh
    /// modification time. Identifiers that no longer exist are not counted.
    pub fn update(
        &self,
        ids: &[Ssn],
        attribute: EditableAttribute,
        value: &str,
    ) -> Result<BatchOutcome> {
        let sql = attribute.update_sql();
        let session = self.session()?;

        self.run_batch(&session, ids, |session, ssn| {
            let new_value = attribute.coerce(value, ssn)?;
            session
                .execute(&sql, params![new_value, ssn.as_str()])
                .map_err(CoreError::DataAccess)
        })
    }

    /// Physically delete each listed employee
    ///
    /// Deleting an identifier that no longer exists is not an error; it
    /// simply does not count towards `succeeded`.
    pub fn delete(&self, ids: &[Ssn]) -> Result<BatchOutcome> {
        let session = self.session()?;
        self.run_batch(&session, ids, |session, ssn| {
            session
                .execute(DELETE_SQL, params![ssn.as_str()])
                .map_err(CoreError::DataAccess)
        })
    }

    /// Grant admin rights; returns false if the SSN was already an admin
    pub fn add_admin(&self, ssn: &Ssn) -> Result<bool> {
        let session = self.session()?;
        let inserted = session
            .execute(
                "INSERT OR IGNORE INTO ADMIN (ssn) VALUES (?1)",
                params![ssn.as_str()],
            )
            .map_err(CoreError::DataAccess)?;
        Ok(inserted > 0)
    }

    fn run_batch<F>(&self, session: &Session, ids: &[Ssn], mut write_row: F) -> Result<BatchOutcome>
    where
        F: FnMut(&Session, &Ssn) -> Result<usize>,
    {
        let mut outcome = BatchOutcome {
            requested: ids.len(),
            ..Default::default()
        };

        for (i, ssn) in ids.iter().enumerate() {
            match write_row(session, ssn) {
                Ok(changed) if changed > 0 => outcome.succeeded += 1,
                Ok(_) => {}
                Err(error) if error.is_caller_error() => {
                    tracing::debug!(%ssn, %error, "row skipped");
                    outcome.failures.push(RowFailure {
                        ssn: ssn.clone(),
                        error,
                    });
                }
                Err(error) => {
                    return Err(CoreError::BatchInterrupted {
                        succeeded: outcome.succeeded,
                        attempted: i + 1,
                        source: Box::new(error),
                    });
                }
            }
        }

        tracing::debug!(
            requested = outcome.requested,
            succeeded = outcome.succeeded,
            failed = outcome.failures.len(),
            "batch finished"
        );
        Ok(outcome)
    }
}

fn ensure_insertable(emp: &Employee) -> Result<()> {
    if emp.first_name.trim().is_empty() {
        return Err(CoreError::validation("first name", "", "required"));
    }
    if emp.last_name.trim().is_empty() {
        return Err(CoreError::validation("last name", "", "required"));
    }
    if emp.sex.is_none() {
        return Err(CoreError::validation("sex", "", "required"));
    }
    match emp.department_number {
        Some(n) if (0..=99).contains(&n) => Ok(()),
        Some(n) => Err(CoreError::validation(
            "department",
            n.to_string(),
            "expected a 1 or 2 digit department number",
        )),
        None => Err(CoreError::validation("department", "", "required")),
    }
}

fn is_primary_key_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.code == ErrorCode::ConstraintViolation
                && (e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                    || e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ssn(s: &str) -> Ssn {
        Ssn::parse(s).unwrap()
    }

    #[test]
    fn test_editable_attribute_parse() {
        assert_eq!(
            "salary".parse::<EditableAttribute>().unwrap(),
            EditableAttribute::Salary
        );
        assert_eq!(
            "dno".parse::<EditableAttribute>().unwrap(),
            EditableAttribute::Department
        );
        for locked in ["name", "ssn", "modified"] {
            let err = locked.parse::<EditableAttribute>().unwrap_err();
            assert!(matches!(err, CoreError::Validation { field: "attribute", .. }));
        }
        assert!(matches!(
            "height".parse::<EditableAttribute>().unwrap_err(),
            CoreError::UnsupportedCriterion { .. }
        ));
    }

    #[test]
    fn test_coercion_per_attribute() {
        let target = ssn("123456789");
        assert_eq!(
            EditableAttribute::Salary.coerce("45000.25", &target).unwrap(),
            Value::Real(45000.25)
        );
        assert_eq!(
            EditableAttribute::Department.coerce("04", &target).unwrap(),
            Value::Integer(4)
        );
        assert_eq!(
            EditableAttribute::Bdate.coerce("1970-01-31", &target).unwrap(),
            Value::Text("1970-01-31".into())
        );
        assert_eq!(
            EditableAttribute::Sex.coerce("f", &target).unwrap(),
            Value::Text("F".into())
        );
        assert!(EditableAttribute::Bdate.coerce("31/01/1970", &target).is_err());
        assert!(EditableAttribute::Department.coerce("five", &target).is_err());
    }

    #[test]
    fn test_self_supervision_rejected() {
        let target = ssn("123456789");
        let err = EditableAttribute::Supervisor
            .coerce("123456789", &target)
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation { field: "supervisor", .. }));
        assert!(EditableAttribute::Supervisor
            .coerce("333445555", &target)
            .is_ok());
    }

    #[test]
    fn test_update_sql_uses_fixed_column() {
        assert_eq!(
            EditableAttribute::Supervisor.update_sql(),
            "UPDATE EMPLOYEE SET Super_ssn = ?1, modified = CURRENT_TIMESTAMP WHERE Ssn = ?2"
        );
    }
}
