//! Employee identity: the nine-digit SSN primary key

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of digits in an SSN
pub const SSN_LEN: usize = 9;

/// Employee identifier (EMPLOYEE.Ssn), immutable once created
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ssn(String);

/// Errors when parsing an SSN
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdParseError {
    #[error("SSN must be 9 digits, got {0} character(s)")]
    WrongLength(usize),

    #[error("SSN must contain digits only: {0}")]
    NonDigit(String),
}

impl Ssn {
    /// Parse an SSN, trimming surrounding whitespace
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        let s = s.trim();
        if s.chars().count() != SSN_LEN {
            return Err(IdParseError::WrongLength(s.chars().count()));
        }
        if !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(IdParseError::NonDigit(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ssn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Ssn {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Ssn {
    type Error = IdParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Ssn> for String {
    fn from(ssn: Ssn) -> Self {
        ssn.0
    }
}

impl AsRef<str> for Ssn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
