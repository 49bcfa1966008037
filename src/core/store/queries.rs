//! Read operations: criteria searches, grouped averages and lookups

use std::collections::BTreeMap;

use rusqlite::{params, params_from_iter, OptionalExtension};

use crate::core::criteria::{
    compile, CompiledQuery, Criterion, CriteriaBuilder, GroupKey, GroupSpec, Projection,
};
use crate::core::employee::{Department, Employee, Role};
use crate::core::error::{CoreError, Result};
use crate::core::identity::Ssn;
use crate::core::mapper::employee_from_row;
use crate::core::session::SessionProvider;

use super::EmployeeStore;

impl<P: SessionProvider> EmployeeStore<P> {
    /// Run a criteria search, returning rows in store order
    ///
    /// Fields outside `projection` are left empty on the returned records.
    pub fn search(&self, criteria: &[Criterion], projection: &Projection) -> Result<Vec<Employee>> {
        let query = compile(criteria, projection)?;
        self.run(&query, projection)
    }

    /// Every employee with all attributes, ordered by first then last name
    pub fn get_all(&self) -> Result<Vec<Employee>> {
        let projection = Projection::all();
        let query = CriteriaBuilder::new()
            .select(projection.clone())
            .order_by_name()
            .compile()?;
        self.run(&query, &projection)
    }

    /// Look up one employee by SSN with all attributes
    pub fn find(&self, ssn: &Ssn) -> Result<Option<Employee>> {
        let mut found = self.search(&[Criterion::ssn(ssn.as_str())], &Projection::all())?;
        Ok(found.pop())
    }

    /// Execute a compiled query, mapping each row through the projection
    pub fn run(&self, query: &CompiledQuery, projection: &Projection) -> Result<Vec<Employee>> {
        let session = self.session()?;
        let mut stmt = session.prepare(&query.sql).map_err(CoreError::Query)?;
        let rows = stmt
            .query_map(params_from_iter(query.params.iter()), |row| {
                employee_from_row(row, projection)
            })
            .map_err(CoreError::Query)?;

        let employees = rows
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(CoreError::Query)?;
        tracing::debug!(rows = employees.len(), "employee query finished");
        Ok(employees)
    }

    /// Average salary per group; NULL group keys become [`GroupKey::Missing`]
    pub fn group_average(&self, spec: GroupSpec) -> Result<BTreeMap<GroupKey, f64>> {
        let session = self.session()?;
        let mut stmt = session.prepare(spec.sql()).map_err(CoreError::Query)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, Option<String>>(0)?,
                    row.get::<_, Option<f64>>(1)?,
                ))
            })
            .map_err(CoreError::Query)?;

        let mut averages = BTreeMap::new();
        for row in rows {
            let (key, average) = row.map_err(CoreError::Query)?;
            let key = match key {
                Some(k) if !k.trim().is_empty() => GroupKey::Value(k),
                _ => GroupKey::Missing,
            };
            averages.insert(key, average.unwrap_or(0.0));
        }
        Ok(averages)
    }

    /// All departments, ordered by number
    pub fn departments(&self) -> Result<Vec<Department>> {
        let session = self.session()?;
        let mut stmt = session
            .prepare("SELECT Dnumber, Dname, Mgr_ssn FROM DEPARTMENT ORDER BY Dnumber")
            .map_err(CoreError::Query)?;
        let rows = stmt
            .query_map([], |row| {
                let manager: Option<String> = row.get(2)?;
                Ok(Department {
                    number: row.get(0)?,
                    name: row.get(1)?,
                    manager_ssn: manager.and_then(|m| Ssn::parse(&m).ok()),
                })
            })
            .map_err(CoreError::Query)?;

        let departments = rows
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(CoreError::Query)?;
        Ok(departments)
    }

    pub fn employee_exists(&self, ssn: &Ssn) -> Result<bool> {
        self.exists("SELECT 1 FROM EMPLOYEE WHERE Ssn = ?1", ssn)
    }

    pub fn is_admin(&self, ssn: &Ssn) -> Result<bool> {
        self.exists("SELECT 1 FROM ADMIN WHERE ssn = ?1", ssn)
    }

    /// Resolve the access level for an SSN; admins need not be employees
    pub fn login(&self, ssn: &Ssn) -> Result<Option<Role>> {
        if self.is_admin(ssn)? {
            Ok(Some(Role::Admin))
        } else if self.employee_exists(ssn)? {
            Ok(Some(Role::Employee))
        } else {
            Ok(None)
        }
    }

    fn exists(&self, sql: &str, ssn: &Ssn) -> Result<bool> {
        let session = self.session()?;
        let found = session
            .query_row(sql, params![ssn.as_str()], |_| Ok(()))
            .optional()
            .map_err(CoreError::Query)?;
        Ok(found.is_some())
    }
}
