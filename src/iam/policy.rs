//! IAM policy documents
//!
//! A [`Policy`] is parsed once from JSON and is immutable afterwards.
//! Evaluation takes no locks and mutates nothing, so one policy can be shared
//! across threads behind an `Arc`.

use super::action::Action;
use super::arn::Arn;
use super::document::PolicyDocument;
use super::environment::Environment;
use super::principal::Identity;
use super::statement::{Effect, Statement};
use crate::config::ParserConfig;
use crate::error::{PolicyError, Result};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace, warn};

/// The only policy language version accepted
pub const POLICY_VERSION: &str = "2012-10-17";

/// Policy language version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    V2012_10_17,
}

impl Version {
    pub fn parse(s: &str) -> Option<Self> {
        (s == POLICY_VERSION).then_some(Version::V2012_10_17)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Version::V2012_10_17 => POLICY_VERSION,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed policy document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    text: String,
    version: Version,
    id: Option<String>,
    statements: Vec<Statement>,
}

impl Policy {
    /// Parse a document owned by `tenant` with default settings
    ///
    /// # Examples
    ///
    /// ```
    /// use iam_policy::iam::{Action, Arn, Effect, Environment, Policy};
    ///
    /// let policy = Policy::parse("tenant", r#"{
    ///     "Version": "2012-10-17",
    ///     "Statement": [{
    ///         "Effect": "Allow",
    ///         "Action": "s3:ListBucket",
    ///         "Resource": "arn:aws:s3:::example_bucket"
    ///     }]
    /// }"#).unwrap();
    ///
    /// let bucket = Arn::parse("arn:aws:s3::tenant:example_bucket").unwrap();
    /// let env = Environment::new();
    /// assert_eq!(policy.eval(&env, None, Action::S3ListBucket, &bucket), Effect::Allow);
    /// assert_eq!(policy.eval(&env, None, Action::S3GetObject, &bucket), Effect::Pass);
    /// ```
    pub fn parse(tenant: &str, text: &str) -> Result<Self> {
        Self::parse_with(&ParserConfig::for_tenant(tenant), text)
    }

    /// Parse a document with explicit settings
    ///
    /// Any error rejects the whole document.
    pub fn parse_with(config: &ParserConfig, text: &str) -> Result<Self> {
        match Self::parse_inner(config, text) {
            Ok(policy) => {
                debug!(
                    tenant = %config.tenant,
                    id = policy.id.as_deref().unwrap_or(""),
                    statements = policy.statements.len(),
                    "parsed policy"
                );
                Ok(policy)
            }
            Err(e) => {
                warn!(tenant = %config.tenant, error = %e, "rejected policy");
                Err(e)
            }
        }
    }

    fn parse_inner(config: &ParserConfig, text: &str) -> Result<Self> {
        if text.len() > config.max_document_size {
            return Err(PolicyError::DocumentTooLarge {
                size: text.len(),
                limit: config.max_document_size,
            });
        }

        let doc: PolicyDocument = serde_json::from_str(text)?;

        let version = doc.version.ok_or(PolicyError::MissingVersion)?;
        let version = Version::parse(&version).ok_or(PolicyError::UnsupportedVersion(version))?;

        let mut statements = Vec::new();
        for stmt in doc.statement.into_vec() {
            if let Some(stmt) = stmt.into_statement(config)? {
                statements.push(stmt);
            }
        }

        Ok(Policy {
            text: text.to_string(),
            version,
            id: doc.id,
            statements,
        })
    }

    /// Decide a request
    ///
    /// Any applying Deny wins regardless of order. Otherwise any applying
    /// Allow gives Allow. With nothing applying the result is Pass, which
    /// grants nothing.
    pub fn eval(
        &self,
        env: &Environment,
        identity: Option<&dyn Identity>,
        action: Action,
        resource: &Arn,
    ) -> Effect {
        let mut has_allow = false;

        for statement in &self.statements {
            match statement.eval(env, identity, action, resource) {
                // Explicit deny
                Effect::Deny => {
                    trace!(%action, %resource, "denied");
                    return Effect::Deny;
                }
                Effect::Allow => has_allow = true,
                Effect::Pass => {}
            }
        }

        let effect = if has_allow { Effect::Allow } else { Effect::Pass };
        trace!(%action, %resource, %effect, "policy evaluated");
        effect
    }

    /// Whether any statement has a condition on `key`
    pub fn has_conditional(&self, key: &str) -> bool {
        self.statements.iter().any(|s| s.has_conditional(key))
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// The document exactly as supplied
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn version(&self) -> Version {
        self.version
    }
}

impl FromStr for Policy {
    type Err = PolicyError;

    /// Parse with no owning tenant
    fn from_str(s: &str) -> Result<Self> {
        Policy::parse("", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{"Version": "2012-10-17", "Statement": {"Effect": "Deny", "Action": "*", "Resource": "*"}}"#;

    #[test]
    fn test_version() {
        assert_eq!(Version::parse("2012-10-17"), Some(Version::V2012_10_17));
        assert_eq!(Version::parse("2008-10-17"), None);
        assert_eq!(Version::V2012_10_17.to_string(), POLICY_VERSION);
    }

    #[test]
    fn test_missing_version() {
        let err = Policy::parse("t", r#"{"Statement": []}"#).unwrap_err();
        assert!(matches!(err, PolicyError::MissingVersion));
    }

    #[test]
    fn test_unsupported_version() {
        let err = Policy::parse("t", r#"{"Version": "2008-10-17", "Statement": []}"#).unwrap_err();
        assert!(matches!(err, PolicyError::UnsupportedVersion(v) if v == "2008-10-17"));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Policy::parse("t", "{\"Version\": ").unwrap_err(),
            PolicyError::Json(_)
        ));
        assert!(matches!(
            Policy::parse("t", r#"{"Version": "2012-10-17"}"#).unwrap_err(),
            PolicyError::Json(_)
        ));
    }

    #[test]
    fn test_document_too_large() {
        let config = ParserConfig {
            max_document_size: 16,
            ..ParserConfig::default()
        };
        let err = Policy::parse_with(&config, MINIMAL).unwrap_err();
        assert!(matches!(err, PolicyError::DocumentTooLarge { limit: 16, .. }));
    }

    #[test]
    fn test_text_and_accessors() {
        let policy: Policy = MINIMAL.parse().unwrap();
        assert_eq!(policy.text(), MINIMAL);
        assert_eq!(policy.id(), None);
        assert_eq!(policy.version(), Version::V2012_10_17);
        assert_eq!(policy.statements().len(), 1);
        assert!(!policy.has_conditional("aws:SourceIp"));
    }

    #[test]
    fn test_deny_wins_regardless_of_order() {
        let text = r#"{
            "Version": "2012-10-17",
            "Statement": [
                {"Effect": "Allow", "Action": "s3:*", "Resource": "*"},
                {"Effect": "Deny", "Action": "s3:DeleteObject", "Resource": "*"},
                {"Effect": "Allow", "Action": "s3:DeleteObject", "Resource": "*"}
            ]
        }"#;
        let policy = Policy::parse("t", text).unwrap();
        let env = Environment::new();
        let object = Arn::parse("arn:aws:s3::t:bucket/key").unwrap();

        assert_eq!(policy.eval(&env, None, Action::S3DeleteObject, &object), Effect::Deny);
        assert_eq!(policy.eval(&env, None, Action::S3GetObject, &object), Effect::Allow);
        assert_eq!(policy.eval(&env, None, Action::IamGetRole, &object), Effect::Pass);
    }

    #[test]
    fn test_empty_statement_list_passes() {
        let policy = Policy::parse("t", r#"{"Version": "2012-10-17", "Statement": []}"#).unwrap();
        let arn = Arn::parse("arn:aws:s3::t:b").unwrap();
        assert_eq!(policy.eval(&Environment::new(), None, Action::S3GetObject, &arn), Effect::Pass);
    }
}
