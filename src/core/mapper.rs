//! Entity mapper: EMPLOYEE rows to [`Employee`] records and back
//!
//! Reads honor the query's projection: only the columns selected for the
//! projected attributes are read, everything else keeps its default.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::Row;

use crate::core::criteria::{Attribute, Projection};
use crate::core::employee::{Employee, Salary, Sex, DATE_FORMAT};
use crate::core::identity::Ssn;

/// Format of SQLite's CURRENT_TIMESTAMP
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Build an employee from a row produced by a compiled query
pub fn employee_from_row(row: &Row<'_>, projection: &Projection) -> rusqlite::Result<Employee> {
    let ssn_text: String = row.get("Ssn")?;
    let ssn = Ssn::parse(&ssn_text).map_err(|e| conversion_error(row, "Ssn", e))?;
    let mut emp = Employee::with_ssn(ssn);

    for attr in projection.attributes() {
        match attr {
            Attribute::Ssn => {}
            Attribute::Name => {
                emp.first_name = row.get::<_, Option<String>>("Fname")?.unwrap_or_default();
                emp.middle_initial = row
                    .get::<_, Option<String>>("Minit")?
                    .and_then(|m| m.trim().chars().next());
                emp.last_name = row.get::<_, Option<String>>("Lname")?.unwrap_or_default();
            }
            Attribute::Bdate => {
                emp.birth_date = match row.get::<_, Option<String>>("Bdate")? {
                    Some(text) if !text.trim().is_empty() => Some(
                        NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
                            .map_err(|e| conversion_error(row, "Bdate", e))?,
                    ),
                    _ => None,
                };
            }
            Attribute::Address => {
                emp.address = row.get::<_, Option<String>>("Address")?.unwrap_or_default();
            }
            Attribute::Sex => {
                emp.sex = match row.get::<_, Option<String>>("Sex")?.as_deref() {
                    Some("F") => Some(Sex::F),
                    Some("M") => Some(Sex::M),
                    None | Some("") => None,
                    Some(other) => {
                        return Err(conversion_error(
                            row,
                            "Sex",
                            format!("unexpected sex value '{other}'"),
                        ))
                    }
                };
            }
            Attribute::Salary => {
                emp.salary = match row.get::<_, Option<f64>>("Salary")? {
                    Some(amount) => Salary::from_f64(amount).ok_or_else(|| {
                        conversion_error(row, "Salary", format!("invalid salary {amount}"))
                    })?,
                    None => Salary::default(),
                };
            }
            Attribute::Supervisor => {
                emp.supervisor_ssn = match row.get::<_, Option<String>>("Super_ssn")? {
                    Some(text) if !text.trim().is_empty() => Some(
                        Ssn::parse(&text).map_err(|e| conversion_error(row, "Super_ssn", e))?,
                    ),
                    _ => None,
                };
            }
            Attribute::Department => {
                emp.department_number = row.get("Dno")?;
                emp.department_name = row.get("Dname")?;
            }
            Attribute::Modified => {
                emp.created = row
                    .get::<_, Option<String>>("created")?
                    .and_then(|s| parse_timestamp(&s));
                emp.modified = row
                    .get::<_, Option<String>>("modified")?
                    .and_then(|s| parse_timestamp(&s));
            }
        }
    }

    Ok(emp)
}

/// Parameters for INSERT, in EMPLOYEE column order (timestamps excluded)
pub fn insert_params(emp: &Employee) -> Vec<Value> {
    vec![
        Value::Text(emp.first_name.clone()),
        emp.middle_initial
            .map(|c| Value::Text(c.to_string()))
            .unwrap_or(Value::Null),
        Value::Text(emp.last_name.clone()),
        Value::Text(emp.ssn.to_string()),
        emp.birth_date
            .map(|d| Value::Text(d.format(DATE_FORMAT).to_string()))
            .unwrap_or(Value::Null),
        Value::Text(emp.address.clone()),
        emp.sex
            .map(|s| Value::Text(s.as_str().to_string()))
            .unwrap_or(Value::Null),
        Value::Real(emp.salary.as_f64()),
        emp.supervisor_ssn
            .as_ref()
            .map(|s| Value::Text(s.to_string()))
            .unwrap_or(Value::Null),
        emp.department_number
            .map(|n| Value::Integer(i64::from(n)))
            .unwrap_or(Value::Null),
    ]
}

/// Parse a stored timestamp (SQLite `CURRENT_TIMESTAMP` or RFC 3339), as UTC
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT)
        .map(|dt| dt.and_utc())
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(s.trim())
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        })
}

fn conversion_error(
    row: &Row<'_>,
    column: &str,
    err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> rusqlite::Error {
    let idx = row.as_ref().column_index(column).unwrap_or(0);
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into())
}
