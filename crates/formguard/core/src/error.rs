// File: src/error.rs
// Purpose: Error taxonomy for configuration and rule parsing

use thiserror::Error;

/// Errors raised while building a validation session.
///
/// Field verdicts are never errors; an invalid field is reported as `true`
/// by the checker. These variants only cover configuration that cannot be
/// turned into a working session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// Options are structurally broken (bad JSON, duplicate field names, ...)
    #[error("invalid form options: {0}")]
    Configuration(String),

    /// The rule type token does not match any known rule
    #[error("unrecognized rule type `{0}`")]
    UnrecognizedRule(String),

    /// The rule type is known but its parameter cannot be used
    #[error("invalid parameter for rule `{rule}`: {reason}")]
    InvalidRuleParameter { rule: String, reason: String },
}

impl FormError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub(crate) fn parameter(rule: &str, reason: impl Into<String>) -> Self {
        Self::InvalidRuleParameter {
            rule: rule.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FormError>;
