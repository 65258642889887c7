//! Error types for appenv.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid environment variables:\n{0}")]
    SchemaViolation(Violations),

    #[error("invalid schema: {0}")]
    Schema(String),

    #[error("environment variable {0} is not declared")]
    Undeclared(String),

    #[error("server-side environment variable {0} accessed from client code")]
    ServerOnly(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a single variable failed its rule.
///
/// Never carries the offending value: several declared variables are secrets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    Missing,
    InvalidUrl(String),
    InvalidChoice { allowed: Vec<String> },
    RequiredInMode { var: String, mode: String },
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "required but not set"),
            Self::InvalidUrl(reason) => write!(f, "not a valid URL ({reason})"),
            Self::InvalidChoice { allowed } => {
                write!(f, "expected one of: {}", allowed.join(", "))
            }
            Self::RequiredInMode { var, mode } => {
                write!(f, "required when {var}={mode} but not set")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub variable: String,
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.variable, self.kind)
    }
}

/// Every violation found in one resolution pass, in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(pub Vec<Violation>);

impl Violations {
    pub fn push(&mut self, variable: &str, kind: ViolationKind) {
        self.0.push(Violation {
            variable: variable.to_string(),
            kind,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    /// Names of the offending variables.
    pub fn variables(&self) -> Vec<&str> {
        self.0.iter().map(|v| v.variable.as_str()).collect()
    }

    pub fn find(&self, variable: &str) -> Option<&Violation> {
        self.0.iter().find(|v| v.variable == variable)
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  - {violation}")?;
        }
        Ok(())
    }
}
