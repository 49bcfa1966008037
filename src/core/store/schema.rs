//! Database schema installation

use crate::core::error::{CoreError, Result};
use crate::core::session::SessionProvider;

use super::EmployeeStore;

/// COMPANY schema; foreign keys are declared for documentation and are not
/// enforced by the connection
const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS DEPARTMENT (
        Dnumber INTEGER PRIMARY KEY,
        Dname TEXT NOT NULL UNIQUE,
        Mgr_ssn CHAR(9) REFERENCES EMPLOYEE(Ssn),
        Mgr_start_date TEXT
    );

    CREATE TABLE IF NOT EXISTS EMPLOYEE (
        Fname TEXT NOT NULL,
        Minit CHAR(1),
        Lname TEXT NOT NULL,
        Ssn CHAR(9) PRIMARY KEY,
        Bdate TEXT,
        Address TEXT,
        Sex CHAR(1) CHECK (Sex IN ('F', 'M')),
        Salary DECIMAL(10, 2) CHECK (Salary >= 0),
        Super_ssn CHAR(9) REFERENCES EMPLOYEE(Ssn),
        Dno INTEGER NOT NULL REFERENCES DEPARTMENT(Dnumber),
        created TEXT,
        modified TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_employee_super_ssn ON EMPLOYEE(Super_ssn);
    CREATE INDEX IF NOT EXISTS idx_employee_dno ON EMPLOYEE(Dno);

    CREATE TABLE IF NOT EXISTS PROJECT (
        Pname TEXT NOT NULL UNIQUE,
        Pnumber INTEGER PRIMARY KEY,
        Plocation TEXT,
        Dnum INTEGER NOT NULL REFERENCES DEPARTMENT(Dnumber)
    );

    CREATE TABLE IF NOT EXISTS WORKS_ON (
        Essn CHAR(9) NOT NULL REFERENCES EMPLOYEE(Ssn),
        Pno INTEGER NOT NULL REFERENCES PROJECT(Pnumber),
        Hours DECIMAL(3, 1),
        PRIMARY KEY (Essn, Pno)
    );

    CREATE TABLE IF NOT EXISTS DEPENDENT (
        Essn CHAR(9) NOT NULL REFERENCES EMPLOYEE(Ssn),
        Dependent_name TEXT NOT NULL,
        Sex CHAR(1),
        Bdate TEXT,
        Relationship TEXT,
        PRIMARY KEY (Essn, Dependent_name)
    );

    CREATE TABLE IF NOT EXISTS ADMIN (
        ssn CHAR(9) PRIMARY KEY
    );
"#;

/// The textbook COMPANY dataset
const SAMPLE_DATA: &str = r#"
    INSERT OR IGNORE INTO DEPARTMENT (Dnumber, Dname, Mgr_ssn, Mgr_start_date) VALUES
        (5, 'Research', '333445555', '1988-05-22'),
        (4, 'Administration', '987654321', '1995-01-01'),
        (1, 'Headquarters', '888665555', '1981-06-19');

    INSERT OR IGNORE INTO EMPLOYEE
        (Fname, Minit, Lname, Ssn, Bdate, Address, Sex, Salary, Super_ssn, Dno, created, modified)
    VALUES
        ('John', 'B', 'Smith', '123456789', '1965-01-09', '731 Fondren, Houston TX', 'M', 30000, '333445555', 5, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP),
        ('Franklin', 'T', 'Wong', '333445555', '1955-12-08', '638 Voss, Houston TX', 'M', 40000, '888665555', 5, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP),
        ('Alicia', 'J', 'Zelaya', '999887777', '1968-01-19', '3321 Castle, Spring TX', 'F', 25000, '987654321', 4, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP),
        ('Jennifer', 'S', 'Wallace', '987654321', '1941-06-20', '291 Berry, Bellaire TX', 'F', 43000, '888665555', 4, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP),
        ('Ramesh', 'K', 'Narayan', '666884444', '1962-09-15', '975 Fire Oak, Humble TX', 'M', 38000, '333445555', 5, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP),
        ('Joyce', 'A', 'English', '453453453', '1972-07-31', '5631 Rice, Houston TX', 'F', 25000, '333445555', 5, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP),
        ('Ahmad', 'V', 'Jabbar', '987987987', '1969-03-29', '980 Dallas, Houston TX', 'M', 25000, '987654321', 4, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP),
        ('James', 'E', 'Borg', '888665555', '1937-11-10', '450 Stone, Houston TX', 'M', 55000, NULL, 1, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP);

    INSERT OR IGNORE INTO PROJECT (Pname, Pnumber, Plocation, Dnum) VALUES
        ('ProductX', 1, 'Bellaire', 5),
        ('ProductY', 2, 'Sugarland', 5),
        ('ProductZ', 3, 'Houston', 5),
        ('Computerization', 10, 'Stafford', 4),
        ('Reorganization', 20, 'Houston', 1),
        ('Newbenefits', 30, 'Stafford', 4);

    INSERT OR IGNORE INTO WORKS_ON (Essn, Pno, Hours) VALUES
        ('123456789', 1, 32.5), ('123456789', 2, 7.5),
        ('666884444', 3, 40.0),
        ('453453453', 1, 20.0), ('453453453', 2, 20.0),
        ('333445555', 2, 10.0), ('333445555', 3, 10.0), ('333445555', 10, 10.0), ('333445555', 20, 10.0),
        ('999887777', 30, 30.0), ('999887777', 10, 10.0),
        ('987987987', 10, 35.0), ('987987987', 30, 5.0),
        ('987654321', 30, 20.0), ('987654321', 20, 15.0),
        ('888665555', 20, NULL);

    INSERT OR IGNORE INTO DEPENDENT (Essn, Dependent_name, Sex, Bdate, Relationship) VALUES
        ('333445555', 'Alice', 'F', '1986-04-05', 'Daughter'),
        ('333445555', 'Theodore', 'M', '1983-10-25', 'Son'),
        ('333445555', 'Joy', 'F', '1958-05-03', 'Spouse'),
        ('987654321', 'Abner', 'M', '1942-02-28', 'Spouse'),
        ('123456789', 'Michael', 'M', '1988-01-04', 'Son'),
        ('123456789', 'Alice', 'F', '1988-12-30', 'Daughter'),
        ('123456789', 'Elizabeth', 'F', '1967-05-05', 'Spouse');

    INSERT OR IGNORE INTO ADMIN (ssn) VALUES ('888665555');
"#;

impl<P: SessionProvider> EmployeeStore<P> {
    /// Create any missing COMPANY tables; existing tables are left untouched
    pub fn install_schema(&self) -> Result<()> {
        let session = self.session()?;
        session
            .execute_batch(SCHEMA)
            .map_err(CoreError::DataAccess)?;
        tracing::debug!("schema installed");
        Ok(())
    }

    /// Seed the sample COMPANY dataset; rows that already exist are skipped
    pub fn load_sample_data(&self) -> Result<()> {
        let session = self.session()?;
        session
            .execute_batch(SAMPLE_DATA)
            .map_err(CoreError::DataAccess)?;
        tracing::debug!("sample data loaded");
        Ok(())
    }
}
