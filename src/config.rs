//! Parser configuration
//!
//! Settings can be built in code with [`PolicyParser`] or loaded from TOML:
//!
//! ```toml
//! tenant = "ACCOUNT"
//! max_document_size = 20480
//! reject_invalid_principals = true
//! ```

use crate::error::Result;
use crate::iam::Policy;
use serde::{Deserialize, Serialize};

/// Default document size limit in bytes
pub const DEFAULT_MAX_DOCUMENT_SIZE: usize = 20 * 1024;

/// Settings that control how policy documents are parsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    /// Owning account; fills the blank account field of resource ARNs
    pub tenant: String,

    /// Larger documents are rejected
    pub max_document_size: usize,

    /// When false, uninterpretable principal entries are dropped
    pub reject_invalid_principals: bool,
}

impl ParserConfig {
    /// Default settings scoped to `tenant`
    pub fn for_tenant(tenant: impl Into<String>) -> Self {
        ParserConfig {
            tenant: tenant.into(),
            ..Self::default()
        }
    }

    /// Load settings from a TOML string; missing keys take their defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            tenant: String::new(),
            max_document_size: DEFAULT_MAX_DOCUMENT_SIZE,
            reject_invalid_principals: true,
        }
    }
}

/// Builder for parsing policies with non-default settings
///
/// # Examples
///
/// ```
/// use iam_policy::PolicyParser;
///
/// let policy = PolicyParser::new()
///     .tenant("ACCOUNT")
///     .max_document_size(4096)
///     .parse(r#"{
///         "Version": "2012-10-17",
///         "Statement": {"Effect": "Allow", "Action": "s3:*", "Resource": "*"}
///     }"#)
///     .unwrap();
///
/// assert_eq!(policy.statements().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PolicyParser {
    config: ParserConfig,
}

impl PolicyParser {
    /// Create a parser with default settings
    pub fn new() -> Self {
        PolicyParser {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser from loaded settings
    pub fn from_config(config: ParserConfig) -> Self {
        PolicyParser { config }
    }

    /// Set the owning account
    pub fn tenant<S: Into<String>>(mut self, tenant: S) -> Self {
        self.config.tenant = tenant.into();
        self
    }

    /// Set the document size limit in bytes
    pub fn max_document_size(mut self, limit: usize) -> Self {
        self.config.max_document_size = limit;
        self
    }

    /// Choose whether bad principal entries fail the parse
    pub fn reject_invalid_principals(mut self, reject: bool) -> Self {
        self.config.reject_invalid_principals = reject;
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a policy document with these settings
    pub fn parse(&self, text: &str) -> Result<Policy> {
        Policy::parse_with(&self.config, text)
    }
}
