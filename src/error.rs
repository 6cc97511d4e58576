//! Error types for policy parsing

use thiserror::Error;

/// Policy parsing result type
pub type Result<T> = std::result::Result<T, PolicyError>;

/// Reasons a policy document is rejected
///
/// Evaluation never fails; every variant here comes from parsing.
#[derive(Error, Debug)]
pub enum PolicyError {
    /// Document is not valid JSON or does not have the policy shape
    #[error("Malformed policy document: {0}")]
    Json(#[from] serde_json::Error),

    /// Document has no Version element
    #[error("Policy document has no Version")]
    MissingVersion,

    /// Version is not the supported literal
    #[error("Unsupported policy version: {0}")]
    UnsupportedVersion(String),

    /// Effect other than Allow or Deny
    #[error("Invalid effect: {0} (must be Allow or Deny)")]
    InvalidEffect(String),

    /// Action token that names no known action
    #[error("Unrecognized action: {0}")]
    InvalidAction(String),

    /// Resource that is not `*` or a well-formed ARN
    #[error("Invalid ARN: {0}")]
    InvalidArn(String),

    /// Principal entry that cannot be interpreted
    #[error("Invalid principal: {0}")]
    InvalidPrincipal(String),

    /// Condition block keyed by an unknown operator
    #[error("Unknown condition operator: {0}")]
    UnknownConditionOperator(String),

    /// Condition with a known operator but unusable values
    #[error("Invalid {operator} condition on {key}: {reason}")]
    InvalidCondition {
        operator: String,
        key: String,
        reason: String,
    },

    /// Statement uses an element together with its negation
    #[error("Statement cannot contain both {0} and {1}")]
    ConflictingElements(&'static str, &'static str),

    /// Document exceeds the configured size limit
    #[error("Policy document is {size} bytes, limit is {limit}")]
    DocumentTooLarge { size: usize, limit: usize },

    /// Parser configuration could not be loaded
    #[error("Invalid parser configuration: {0}")]
    Config(#[from] toml::de::Error),
}
