//! Error types for the rule compiler.

use std::fmt;

use thiserror::Error;

use crate::scope::SINGLETON_SCOPES;

/// Errors raised while decoding or merging rule documents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("malformed rule document at line {line}: {message}")]
    MalformedDocument { line: usize, message: String },
}

impl CoreError {
    pub(crate) fn malformed(line: usize, message: impl Into<String>) -> Self {
        CoreError::MalformedDocument {
            line,
            message: message.into(),
        }
    }
}

/// A problem with one raw rule declaration.
///
/// `index` is the zero-based position of the offending declaration in the
/// input slice handed to [`validate`](crate::validation::validate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("the '{field}' field is required in rule #{index}")]
    MissingField { index: usize, field: &'static str },

    #[error(
        "the 'prefix' field is not allowed on scope '{scope}' in rule #{index} (singleton scopes: {})",
        SINGLETON_SCOPES.join(", ")
    )]
    IllegalPrefix { index: usize, scope: String },

    #[error("unknown scope '{scope}' in rule #{index}")]
    UnknownScope { index: usize, scope: String },

    #[error("unknown policy '{policy}' in rule #{index}, expected one of: write, read, deny")]
    UnknownPolicy { index: usize, policy: String },
}

impl ValidationError {
    /// Position of the offending declaration.
    pub fn index(&self) -> usize {
        match self {
            ValidationError::MissingField { index, .. }
            | ValidationError::IllegalPrefix { index, .. }
            | ValidationError::UnknownScope { index, .. }
            | ValidationError::UnknownPolicy { index, .. } => *index,
        }
    }
}

/// Every validation problem found in one rule block, reported together.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    /// Append the errors of another block, keeping their order.
    pub fn extend(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.len() {
            0 => write!(f, "no validation errors"),
            1 => write!(f, "1 error occurred:\n\t* {}", self.0[0]),
            n => {
                write!(f, "{} errors occurred:", n)?;
                for err in &self.0 {
                    write!(f, "\n\t* {}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ValidationErrors {}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self(errors)
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
