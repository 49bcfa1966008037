//! Employee record and field-level value types
//!
//! Raw input from the UI arrives as strings in an [`EmployeeDraft`]; every
//! field is validated into its typed form before anything touches the store.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::core::error::{CoreError, Result};
use crate::core::identity::Ssn;

/// Date format used for birth dates, in storage and on input
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// =========================================================================
// Sex
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sex {
    F,
    M,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::F => "F",
            Sex::M => "M",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sex {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "F" => Ok(Sex::F),
            "M" => Ok(Sex::M),
            _ => Err(CoreError::validation("sex", s, "must be F or M")),
        }
    }
}

// =========================================================================
// Salary
// =========================================================================

/// Non-negative amount with two fractional digits, held as cents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Salary {
    cents: i64,
}

impl Salary {
    /// Largest number of digits allowed before the decimal point
    pub const MAX_INTEGER_DIGITS: usize = 8;

    pub fn from_cents(cents: i64) -> Option<Self> {
        (cents >= 0).then_some(Self { cents })
    }

    /// Convert a stored floating point amount, rounding to whole cents
    pub fn from_f64(amount: f64) -> Option<Self> {
        if !amount.is_finite() || amount < 0.0 {
            return None;
        }
        Some(Self {
            cents: (amount * 100.0).round() as i64,
        })
    }

    /// Parse user input such as `50000`, `50000.5` or `50000.50`
    pub fn parse(s: &str) -> Result<Self> {
        let input = s.trim();
        let invalid = || {
            CoreError::validation(
                "salary",
                s,
                "expected a non-negative amount with at most 2 decimal places",
            )
        };

        let (whole, frac) = match input.split_once('.') {
            Some((w, f)) => (w, Some(f)),
            None => (input, None),
        };

        if whole.is_empty()
            || whole.len() > Self::MAX_INTEGER_DIGITS
            || !whole.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let frac_cents = match frac {
            None => 0,
            Some(f) if (1..=2).contains(&f.len()) && f.chars().all(|c| c.is_ascii_digit()) => {
                let padded = format!("{:0<2}", f);
                padded.parse::<i64>().map_err(|_| invalid())?
            }
            Some(_) => return Err(invalid()),
        };

        let whole_cents = whole.parse::<i64>().map_err(|_| invalid())? * 100;
        Ok(Self {
            cents: whole_cents + frac_cents,
        })
    }

    pub fn cents(&self) -> i64 {
        self.cents
    }

    pub fn as_f64(&self) -> f64 {
        self.cents as f64 / 100.0
    }
}

impl fmt::Display for Salary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.cents / 100, self.cents % 100)
    }
}

impl Serialize for Salary {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

// =========================================================================
// Field parsers shared by insert validation and update coercion
// =========================================================================

pub fn parse_ssn(field: &'static str, s: &str) -> Result<Ssn> {
    Ssn::parse(s).map_err(|e| CoreError::validation(field, s, e.to_string()))
}

pub fn parse_birth_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| CoreError::validation("birth date", s, "expected YYYY-MM-DD"))
}

pub fn parse_department_number(s: &str) -> Result<i32> {
    let t = s.trim();
    if t.is_empty() || t.len() > 2 || !t.chars().all(|c| c.is_ascii_digit()) {
        return Err(CoreError::validation(
            "department",
            s,
            "expected a 1 or 2 digit department number",
        ));
    }
    t.parse()
        .map_err(|_| CoreError::validation("department", s, "not a number"))
}

fn parse_name(field: &'static str, s: &str) -> Result<String> {
    let t = s.trim();
    if t.is_empty() {
        return Err(CoreError::validation(field, s, "required"));
    }
    if !t.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(CoreError::validation(field, s, "letters only"));
    }
    Ok(t.to_string())
}

fn parse_initial(s: &str) -> Result<Option<char>> {
    let t = s.trim();
    let mut chars = t.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Ok(None),
        (Some(c), None) if c.is_ascii_alphabetic() => Ok(Some(c.to_ascii_uppercase())),
        _ => Err(CoreError::validation(
            "middle initial",
            s,
            "a single letter",
        )),
    }
}

// =========================================================================
// Employee
// =========================================================================

/// One EMPLOYEE row, optionally joined with its department name
///
/// Fields outside a query's projection keep their default (empty) value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Employee {
    pub first_name: String,
    pub middle_initial: Option<char>,
    pub last_name: String,
    pub ssn: Ssn,
    pub birth_date: Option<NaiveDate>,
    pub address: String,
    pub sex: Option<Sex>,
    pub salary: Salary,
    pub supervisor_ssn: Option<Ssn>,
    pub department_number: Option<i32>,
    /// Read-only, from the DEPARTMENT join
    pub department_name: Option<String>,
    /// Server-assigned
    pub created: Option<DateTime<Utc>>,
    /// Server-assigned, refreshed on every write
    pub modified: Option<DateTime<Utc>>,
}

impl Employee {
    /// An otherwise empty record carrying only its identifier
    pub fn with_ssn(ssn: Ssn) -> Self {
        Self {
            first_name: String::new(),
            middle_initial: None,
            last_name: String::new(),
            ssn,
            birth_date: None,
            address: String::new(),
            sex: None,
            salary: Salary::default(),
            supervisor_ssn: None,
            department_number: None,
            department_name: None,
            created: None,
            modified: None,
        }
    }

    /// Full name as shown in result tables, e.g. `Jane Q. Doe`
    pub fn display_name(&self) -> String {
        match self.middle_initial {
            Some(m) => format!("{} {}. {}", self.first_name, m, self.last_name),
            None => format!("{} {}", self.first_name, self.last_name),
        }
    }

    /// Compare all stored fields, ignoring server-assigned timestamps and the
    /// join-derived department name
    pub fn same_record(&self, other: &Employee) -> bool {
        self.first_name == other.first_name
            && self.middle_initial == other.middle_initial
            && self.last_name == other.last_name
            && self.ssn == other.ssn
            && self.birth_date == other.birth_date
            && self.address == other.address
            && self.sex == other.sex
            && self.salary == other.salary
            && self.supervisor_ssn == other.supervisor_ssn
            && self.department_number == other.department_number
    }
}

/// Unvalidated employee input, exactly as typed by the user
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EmployeeDraft {
    pub first_name: String,
    pub middle_initial: String,
    pub last_name: String,
    pub ssn: String,
    pub birth_date: String,
    pub address: String,
    pub sex: String,
    pub salary: String,
    pub supervisor_ssn: String,
    pub department_number: String,
}

impl EmployeeDraft {
    /// Validate every field, failing on the first invalid one
    ///
    /// Required: first name, last name, SSN, sex, department number.
    /// Optional fields left blank become empty/None (salary becomes 0.00).
    pub fn validate(&self) -> Result<Employee> {
        let first_name = parse_name("first name", &self.first_name)?;
        let middle_initial = parse_initial(&self.middle_initial)?;
        let last_name = parse_name("last name", &self.last_name)?;
        let ssn = parse_ssn("ssn", &self.ssn)?;

        let birth_date = if self.birth_date.trim().is_empty() {
            None
        } else {
            Some(parse_birth_date(&self.birth_date)?)
        };

        if self.sex.trim().is_empty() {
            return Err(CoreError::validation("sex", "", "required"));
        }
        let sex: Sex = self.sex.parse()?;

        let salary = if self.salary.trim().is_empty() {
            Salary::default()
        } else {
            Salary::parse(&self.salary)?
        };

        let supervisor_ssn = if self.supervisor_ssn.trim().is_empty() {
            None
        } else {
            Some(parse_ssn("supervisor", &self.supervisor_ssn)?)
        };

        let department_number = parse_department_number(&self.department_number)?;

        Ok(Employee {
            first_name,
            middle_initial,
            last_name,
            ssn,
            birth_date,
            address: self.address.trim().to_string(),
            sex: Some(sex),
            salary,
            supervisor_ssn,
            department_number: Some(department_number),
            department_name: None,
            created: None,
            modified: None,
        })
    }
}

// =========================================================================
// Department / access
// =========================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Department {
    pub number: i32,
    pub name: String,
    pub manager_ssn: Option<Ssn>,
}

/// Access level resolved at login
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Employee => write!(f, "employee"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane() -> EmployeeDraft {
        EmployeeDraft {
            first_name: "Jane".into(),
            middle_initial: "Q".into(),
            last_name: "Doe".into(),
            ssn: "123456789".into(),
            birth_date: "1980-02-29".into(),
            address: "12 Elm St, Houston TX".into(),
            sex: "F".into(),
            salary: "55000.50".into(),
            supervisor_ssn: String::new(),
            department_number: "5".into(),
        }
    }

    #[test]
    fn test_salary_parse() {
        assert_eq!(Salary::parse("50000").unwrap().cents(), 5_000_000);
        assert_eq!(Salary::parse("50000.5").unwrap().cents(), 5_000_050);
        assert_eq!(Salary::parse(" 0.07 ").unwrap().cents(), 7);
        assert_eq!(Salary::parse("12.34").unwrap().to_string(), "12.34");
    }

    #[test]
    fn test_salary_rejects_bad_input() {
        for bad in ["not-a-number", "-5", "1.234", "", ".50", "123456789", "1e5", "10."] {
            let err = Salary::parse(bad).unwrap_err();
            assert!(
                matches!(err, CoreError::Validation { field: "salary", .. }),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_salary_from_f64_rounds() {
        assert_eq!(Salary::from_f64(60000.0).unwrap().to_string(), "60000.00");
        assert_eq!(Salary::from_f64(1234.567).unwrap().cents(), 123_457);
        assert!(Salary::from_f64(-1.0).is_none());
        assert!(Salary::from_f64(f64::NAN).is_none());
    }

    #[test]
    fn test_sex_parse() {
        assert_eq!("F".parse::<Sex>().unwrap(), Sex::F);
        assert_eq!(" m".parse::<Sex>().unwrap(), Sex::M);
        assert!("X".parse::<Sex>().is_err());
    }

    #[test]
    fn test_draft_validates() {
        let emp = jane().validate().unwrap();
        assert_eq!(emp.display_name(), "Jane Q. Doe");
        assert_eq!(emp.ssn.as_str(), "123456789");
        assert_eq!(emp.department_number, Some(5));
        assert_eq!(emp.sex, Some(Sex::F));
        assert_eq!(emp.birth_date, NaiveDate::from_ymd_opt(1980, 2, 29));
        assert_eq!(emp.supervisor_ssn, None);
    }

    #[test]
    fn test_draft_optional_fields() {
        let mut draft = jane();
        draft.middle_initial.clear();
        draft.birth_date.clear();
        draft.salary.clear();
        let emp = draft.validate().unwrap();
        assert_eq!(emp.display_name(), "Jane Doe");
        assert_eq!(emp.birth_date, None);
        assert_eq!(emp.salary, Salary::default());
    }

    #[test]
    fn test_draft_rejects_each_bad_field() {
        let cases: [(fn(&mut EmployeeDraft), &str); 7] = [
            (|d| d.first_name = "J4ne".into(), "first name"),
            (|d| d.middle_initial = "QR".into(), "middle initial"),
            (|d| d.ssn = "12345".into(), "ssn"),
            (|d| d.birth_date = "29/02/1980".into(), "birth date"),
            (|d| d.sex = "".into(), "sex"),
            (|d| d.supervisor_ssn = "abc".into(), "supervisor"),
            (|d| d.department_number = "123".into(), "department"),
        ];
        for (mutate, expected) in cases {
            let mut draft = jane();
            mutate(&mut draft);
            match draft.validate() {
                Err(CoreError::Validation { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected validation error on {expected}, got {other:?}"),
            }
        }
    }
}
