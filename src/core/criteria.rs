//! Criteria builder: typed filter conditions compiled into parameterized SQL
//!
//! A search is a list of [`Criterion`] values (combined with AND) plus a
//! [`Projection`] naming the attributes to return. Each [`Attribute`] owns
//! its column mapping, its implied [`Operator`] and the coercion of raw user
//! values into bound parameters, so no value is ever written into the query
//! text.
//!
//! Predicates are kept in an ordered list: the same inputs always compile to
//! the same text with parameters in placeholder order.

use rusqlite::types::Value;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::core::employee::{parse_birth_date, parse_ssn, Employee, Salary, Sex, DATE_FORMAT};
use crate::core::error::{CoreError, Result};

/// Base FROM clause shared by every employee search
const FROM_CLAUSE: &str = "FROM EMPLOYEE e LEFT JOIN DEPARTMENT d ON e.Dno = d.Dnumber";

// =========================================================================
// Attributes
// =========================================================================

/// Employee attributes that can be filtered on and/or returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Attribute {
    Name,
    Ssn,
    Bdate,
    Address,
    Sex,
    Salary,
    Supervisor,
    Department,
    /// Last-modified timestamp; projectable only
    Modified,
}

/// Comparison implied by an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `col = ?`
    Equals,
    /// `col LIKE '%v%'`
    Contains,
    /// `col IN (?, ?, ...)`
    In,
    /// `col >= ?`
    AtLeast,
}

impl Attribute {
    /// Every attribute, in display order
    pub fn all() -> &'static [Attribute] {
        &[
            Attribute::Name,
            Attribute::Ssn,
            Attribute::Bdate,
            Attribute::Address,
            Attribute::Sex,
            Attribute::Salary,
            Attribute::Supervisor,
            Attribute::Department,
            Attribute::Modified,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Name => "Name",
            Attribute::Ssn => "Ssn",
            Attribute::Bdate => "Bdate",
            Attribute::Address => "Address",
            Attribute::Sex => "Sex",
            Attribute::Salary => "Salary",
            Attribute::Supervisor => "Supervisor",
            Attribute::Department => "Department",
            Attribute::Modified => "Modified",
        }
    }

    /// Column header used in rendered result tables
    pub fn header(&self) -> &'static str {
        match self {
            Attribute::Name => "NAME",
            Attribute::Ssn => "SSN",
            Attribute::Bdate => "BDATE",
            Attribute::Address => "ADDRESS",
            Attribute::Sex => "SEX",
            Attribute::Salary => "SALARY",
            Attribute::Supervisor => "SUPERVISOR",
            Attribute::Department => "DEPARTMENT",
            Attribute::Modified => "MODIFIED",
        }
    }

    /// Operator applied when this attribute is used as a filter, or `None`
    /// if it cannot be filtered on
    pub fn operator(&self) -> Option<Operator> {
        match self {
            Attribute::Name | Attribute::Address => Some(Operator::Contains),
            Attribute::Ssn | Attribute::Bdate | Attribute::Supervisor => Some(Operator::Equals),
            Attribute::Department | Attribute::Sex => Some(Operator::In),
            Attribute::Salary => Some(Operator::AtLeast),
            Attribute::Modified => None,
        }
    }

    /// Columns this attribute contributes to a SELECT list
    pub(crate) fn select_columns(&self) -> &'static [&'static str] {
        match self {
            Attribute::Name => &["e.Fname", "e.Minit", "e.Lname"],
            Attribute::Ssn => &["e.Ssn"],
            Attribute::Bdate => &["e.Bdate"],
            Attribute::Address => &["e.Address"],
            Attribute::Sex => &["e.Sex"],
            Attribute::Salary => &["e.Salary"],
            Attribute::Supervisor => &["e.Super_ssn"],
            Attribute::Department => &["e.Dno", "d.Dname"],
            Attribute::Modified => &["e.created", "e.modified"],
        }
    }

    /// Left-hand side of the filter predicate
    fn filter_expr(&self) -> &'static str {
        match self {
            Attribute::Name => "(e.Fname || ' ' || COALESCE(SUBSTR(NULLIF(TRIM(e.Minit), ''), 1, 1) || '. ', '') || e.Lname)",
            Attribute::Ssn => "e.Ssn",
            Attribute::Bdate => "e.Bdate",
            Attribute::Address => "e.Address",
            Attribute::Sex => "e.Sex",
            Attribute::Salary => "e.Salary",
            Attribute::Supervisor => "e.Super_ssn",
            Attribute::Department => "d.Dname",
            Attribute::Modified => "e.modified",
        }
    }

    /// Coerce one raw filter value into a bound parameter
    fn coerce(&self, raw: &str) -> Result<Value> {
        match self {
            Attribute::Name | Attribute::Address => {
                Ok(Value::Text(format!("%{}%", escape_like(raw.trim()))))
            }
            Attribute::Ssn => Ok(Value::Text(parse_ssn("ssn", raw)?.into())),
            Attribute::Supervisor => Ok(Value::Text(parse_ssn("supervisor", raw)?.into())),
            Attribute::Bdate => Ok(Value::Text(
                parse_birth_date(raw)?.format(DATE_FORMAT).to_string(),
            )),
            Attribute::Department => {
                let name = raw.trim();
                if name.is_empty() {
                    return Err(CoreError::validation("department", raw, "empty name"));
                }
                Ok(Value::Text(name.to_string()))
            }
            Attribute::Sex => Ok(Value::Text(raw.parse::<Sex>()?.as_str().to_string())),
            Attribute::Salary => Ok(Value::Real(Salary::parse(raw)?.as_f64())),
            Attribute::Modified => Err(CoreError::UnsupportedCriterion {
                tag: self.as_str().to_string(),
            }),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Attribute {
    type Err = CoreError;

    /// Accepts display names and the underlying column names, any case
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Attribute::Name),
            "ssn" => Ok(Attribute::Ssn),
            "bdate" | "birthdate" | "birth_date" => Ok(Attribute::Bdate),
            "address" => Ok(Attribute::Address),
            "sex" => Ok(Attribute::Sex),
            "salary" => Ok(Attribute::Salary),
            "supervisor" | "super_ssn" => Ok(Attribute::Supervisor),
            "department" | "dept" | "dno" | "dname" => Ok(Attribute::Department),
            "modified" => Ok(Attribute::Modified),
            _ => Err(CoreError::UnsupportedCriterion { tag: s.to_string() }),
        }
    }
}

/// Escape LIKE wildcards so user text matches literally (paired with `ESCAPE '\'`)
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

// =========================================================================
// Criterion
// =========================================================================

/// One filter condition: an attribute and its raw value(s)
///
/// Multi-valued attributes (department, sex) take any number of values and
/// compile to `IN`; every other attribute takes exactly one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Criterion {
    pub attribute: Attribute,
    pub values: Vec<String>,
}

impl Criterion {
    pub fn new(attribute: Attribute, values: Vec<String>) -> Self {
        Self { attribute, values }
    }

    pub fn single(attribute: Attribute, value: impl Into<String>) -> Self {
        Self::new(attribute, vec![value.into()])
    }

    pub fn name(fragment: impl Into<String>) -> Self {
        Self::single(Attribute::Name, fragment)
    }

    pub fn ssn(ssn: impl Into<String>) -> Self {
        Self::single(Attribute::Ssn, ssn)
    }

    pub fn salary_at_least(amount: impl Into<String>) -> Self {
        Self::single(Attribute::Salary, amount)
    }

    pub fn departments<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Attribute::Department, names.into_iter().map(Into::into).collect())
    }

    pub fn sexes<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Attribute::Sex, values.into_iter().map(Into::into).collect())
    }

    /// Parse `tag=value` (multiple values separated by commas for IN attributes)
    pub fn parse(s: &str) -> Result<Self> {
        let (tag, value) = s
            .split_once('=')
            .ok_or_else(|| CoreError::validation("criterion", s, "expected attribute=value"))?;
        let attribute: Attribute = tag.parse()?;
        let values = match attribute.operator() {
            Some(Operator::In) => value
                .split(',')
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect(),
            _ => vec![value.to_string()],
        };
        Ok(Self::new(attribute, values))
    }

    /// Render this criterion into a predicate, pushing its parameters
    ///
    /// Returns `None` when the criterion carries no values.
    fn render(&self, params: &mut Vec<Value>) -> Result<Option<String>> {
        let operator = self
            .attribute
            .operator()
            .ok_or_else(|| CoreError::UnsupportedCriterion {
                tag: self.attribute.as_str().to_string(),
            })?;

        if self.values.is_empty() {
            return Ok(None);
        }

        let expr = self.attribute.filter_expr();
        let predicate = match operator {
            Operator::In => {
                for raw in &self.values {
                    params.push(self.attribute.coerce(raw)?);
                }
                let placeholders = vec!["?"; self.values.len()].join(", ");
                format!("{expr} IN ({placeholders})")
            }
            Operator::Equals => {
                params.push(self.attribute.coerce(self.single_value()?)?);
                format!("{expr} = ?")
            }
            Operator::Contains => {
                params.push(self.attribute.coerce(self.single_value()?)?);
                format!("{expr} LIKE ? ESCAPE '\\'")
            }
            Operator::AtLeast => {
                params.push(self.attribute.coerce(self.single_value()?)?);
                format!("{expr} >= ?")
            }
        };
        Ok(Some(predicate))
    }

    fn single_value(&self) -> Result<&str> {
        match self.values.as_slice() {
            [one] => Ok(one),
            many => Err(CoreError::validation(
                "criterion",
                many.join(", "),
                format!("{} takes a single value", self.attribute),
            )),
        }
    }
}

// =========================================================================
// Projection
// =========================================================================

/// Ordered, de-duplicated set of attributes a query returns
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Projection {
    attributes: Vec<Attribute>,
}

impl Projection {
    pub fn new(attributes: impl IntoIterator<Item = Attribute>) -> Self {
        let mut out: Vec<Attribute> = Vec::new();
        for attr in attributes {
            if !out.contains(&attr) {
                out.push(attr);
            }
        }
        Self { attributes: out }
    }

    /// Every attribute, in display order
    pub fn all() -> Self {
        Self::new(Attribute::all().iter().copied())
    }

    /// Parse a comma-separated list of tags, e.g. `name,salary`
    pub fn parse(s: &str) -> Result<Self> {
        let attrs = s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Attribute>>>()?;
        Ok(Self::new(attrs))
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn contains(&self, attr: Attribute) -> bool {
        self.attributes.contains(&attr)
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Column headers for rendered rows
    pub fn headers(&self) -> Vec<&'static str> {
        self.attributes.iter().map(Attribute::header).collect()
    }

    /// Render one employee as display cells, in projection order
    ///
    /// `utc_offset_hours` shifts the last-modified timestamp for display.
    pub fn render(&self, emp: &Employee, utc_offset_hours: i32) -> Vec<String> {
        self.attributes
            .iter()
            .map(|attr| match attr {
                Attribute::Name => emp.display_name(),
                Attribute::Ssn => emp.ssn.to_string(),
                Attribute::Bdate => emp
                    .birth_date
                    .map(|d| d.format(DATE_FORMAT).to_string())
                    .unwrap_or_default(),
                Attribute::Address => emp.address.clone(),
                Attribute::Sex => emp.sex.map(|s| s.to_string()).unwrap_or_default(),
                Attribute::Salary => emp.salary.to_string(),
                Attribute::Supervisor => emp
                    .supervisor_ssn
                    .as_ref()
                    .map(|s| s.to_string())
                    .unwrap_or_default(),
                Attribute::Department => emp.department_name.clone().unwrap_or_default(),
                Attribute::Modified => emp
                    .modified
                    .map(|ts| {
                        (ts + chrono::Duration::hours(i64::from(utc_offset_hours)))
                            .format("%Y-%m-%d %H:%M:%S")
                            .to_string()
                    })
                    .unwrap_or_default(),
            })
            .collect()
    }

    /// SELECT list: the identifier first, then each projected column once
    fn select_list(&self) -> Vec<&'static str> {
        let mut columns = vec!["e.Ssn"];
        for attr in &self.attributes {
            for col in attr.select_columns() {
                if !columns.contains(col) {
                    columns.push(col);
                }
            }
        }
        columns
    }
}

// =========================================================================
// Compilation
// =========================================================================

/// Query text plus positional parameters, in placeholder order
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Accumulates criteria and a projection, then compiles them
#[derive(Debug, Clone, Default)]
pub struct CriteriaBuilder {
    criteria: Vec<Criterion>,
    projection: Projection,
    order_by_name: bool,
}

impl CriteriaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, criterion: Criterion) -> Self {
        self.criteria.push(criterion);
        self
    }

    pub fn filters(mut self, criteria: impl IntoIterator<Item = Criterion>) -> Self {
        self.criteria.extend(criteria);
        self
    }

    pub fn select(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    /// Sort by first name, then last name
    pub fn order_by_name(mut self) -> Self {
        self.order_by_name = true;
        self
    }

    pub fn compile(&self) -> Result<CompiledQuery> {
        if self.projection.is_empty() {
            return Err(CoreError::InvalidProjection);
        }

        let mut sql = format!(
            "SELECT {} {} WHERE 1=1",
            self.projection.select_list().join(", "),
            FROM_CLAUSE
        );
        let mut params = Vec::new();

        for criterion in &self.criteria {
            if let Some(predicate) = criterion.render(&mut params)? {
                sql.push_str(" AND ");
                sql.push_str(&predicate);
            }
        }

        if self.order_by_name {
            sql.push_str(" ORDER BY e.Fname, e.Lname");
        }

        tracing::debug!(sql = %sql, params = params.len(), "compiled employee query");
        Ok(CompiledQuery { sql, params })
    }
}

/// Compile criteria and a projection into a parameterized query
pub fn compile(criteria: &[Criterion], projection: &Projection) -> Result<CompiledQuery> {
    CriteriaBuilder::new()
        .filters(criteria.iter().cloned())
        .select(projection.clone())
        .compile()
}

// =========================================================================
// Grouped averages
// =========================================================================

/// Grouping used for the average-salary report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupSpec {
    Sex,
    Department,
    Supervisor,
}

impl GroupSpec {
    pub fn sql(&self) -> &'static str {
        match self {
            GroupSpec::Sex => {
                "SELECT NULLIF(TRIM(e.Sex), '') AS grp, AVG(e.Salary) FROM EMPLOYEE e \
                 GROUP BY grp ORDER BY grp"
            }
            GroupSpec::Department => {
                "SELECT NULLIF(TRIM(d.Dname), '') AS grp, AVG(e.Salary) FROM EMPLOYEE e \
                 LEFT JOIN DEPARTMENT d ON e.Dno = d.Dnumber GROUP BY grp ORDER BY grp"
            }
            GroupSpec::Supervisor => {
                "SELECT NULLIF(TRIM(e.Super_ssn), '') AS grp, AVG(e.Salary) FROM EMPLOYEE e \
                 GROUP BY grp ORDER BY grp"
            }
        }
    }

    /// Column header for the group key
    pub fn header(&self) -> &'static str {
        match self {
            GroupSpec::Sex => "SEX",
            GroupSpec::Department => "DNAME",
            GroupSpec::Supervisor => "SUPERVISOR",
        }
    }

    /// Label shown for rows whose group key is NULL
    pub fn missing_label(&self) -> &'static str {
        match self {
            GroupSpec::Sex => "Unspecified",
            GroupSpec::Department => "No Department",
            GroupSpec::Supervisor => "No Supervisor",
        }
    }
}

impl FromStr for GroupSpec {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sex" => Ok(GroupSpec::Sex),
            "department" | "dept" | "dname" => Ok(GroupSpec::Department),
            "supervisor" | "super_ssn" => Ok(GroupSpec::Supervisor),
            _ => Err(CoreError::UnsupportedCriterion { tag: s.to_string() }),
        }
    }
}

/// Group key of an average-salary row; NULL keys are kept as `Missing`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupKey {
    Value(String),
    Missing,
}

impl GroupKey {
    pub fn label<'a>(&'a self, spec: &GroupSpec) -> &'a str {
        match self {
            GroupKey::Value(v) => v,
            GroupKey::Missing => spec.missing_label(),
        }
    }
}

impl From<&str> for GroupKey {
    fn from(s: &str) -> Self {
        GroupKey::Value(s.to_string())
    }
}
