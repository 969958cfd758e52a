//! Error types for token management.

use consul_acl_core::{CoreError, ValidationErrors};
use consul_acl_store::StoreError;
use thiserror::Error;

/// Errors that can occur during token management.
#[derive(Debug, Error)]
pub enum AclError {
    /// Rule declarations failed validation.
    #[error("invalid rules: {0}")]
    Validation(#[from] ValidationErrors),

    /// Inherited rule declarations failed validation.
    ///
    /// Carries the errors of both blocks so one pass reports everything.
    #[error("invalid rules: {}", describe_blocks(.rules, .inherits))]
    InvalidRuleBlocks {
        rules: ValidationErrors,
        inherits: ValidationErrors,
    },

    /// A rule document could not be decoded.
    #[error("rule document error: {0}")]
    Core(#[from] CoreError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Token not found.
    #[error("token not found: {0}")]
    TokenNotFound(String),

    /// Token type is neither `client` nor `management`.
    #[error("invalid token type {0:?}, expected \"client\" or \"management\"")]
    InvalidTokenType(String),

    /// Client configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

fn describe_blocks(rules: &ValidationErrors, inherits: &ValidationErrors) -> String {
    let mut parts = Vec::new();
    if !rules.is_empty() {
        parts.push(format!("rule: {rules}"));
    }
    if !inherits.is_empty() {
        parts.push(format!("inherits: {inherits}"));
    }
    parts.join("\n")
}

/// Result type for token management.
pub type Result<T> = std::result::Result<T, AclError>;

#[cfg(test)]
mod tests {
    use super::*;
    use consul_acl_core::ValidationError;

    #[test]
    fn test_block_errors_name_both_blocks() {
        let err = AclError::InvalidRuleBlocks {
            rules: vec![ValidationError::UnknownScope {
                index: 0,
                scope: "acl".into(),
            }]
            .into(),
            inherits: vec![ValidationError::MissingField {
                index: 1,
                field: "policy",
            }]
            .into(),
        };
        let text = err.to_string();
        assert!(text.contains("rule: 1 error occurred"));
        assert!(text.contains("inherits: 1 error occurred"));
        assert!(text.contains("rule #1"));
    }

    #[test]
    fn test_inherits_only() {
        let err = AclError::InvalidRuleBlocks {
            rules: ValidationErrors::default(),
            inherits: vec![ValidationError::UnknownPolicy {
                index: 0,
                policy: "list".into(),
            }]
            .into(),
        };
        assert!(!err.to_string().contains("rule: "));
    }
}
