//! # iam-policy - AWS-style access policy evaluation
//!
//! Parses IAM policy documents and decides, for a caller, an action and a
//! target resource, whether the request is allowed, denied, or left undecided.
//!
//! - **Deny wins**: any applying Deny statement overrides every Allow
//! - **Pass is not Allow**: a request no statement covers grants nothing
//! - **Fail closed**: unreadable context values make conditions false
//! - **Immutable**: a parsed [`Policy`] can be evaluated from many threads
//!
//! ## Quick Start
//!
//! ```rust
//! use iam_policy::{Action, Arn, Effect, Environment, Policy, Result};
//!
//! # fn main() -> Result<()> {
//! let policy = Policy::parse("ACCOUNT", r#"{
//!     "Version": "2012-10-17",
//!     "Statement": [{
//!         "Effect": "Allow",
//!         "Action": ["s3:List*", "s3:Get*"],
//!         "Resource": "arn:aws:s3:::example_bucket/*",
//!         "Condition": {"IpAddress": {"aws:SourceIp": "192.168.1.0/24"}}
//!     }]
//! }"#)?;
//!
//! let object: Arn = "arn:aws:s3::ACCOUNT:example_bucket/report.txt".parse()?;
//! let env = Environment::new().with("aws:SourceIp", "192.168.1.20");
//!
//! assert_eq!(policy.eval(&env, None, Action::S3GetObject, &object), Effect::Allow);
//! assert_eq!(policy.eval(&Environment::new(), None, Action::S3GetObject, &object), Effect::Pass);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod iam;

pub use config::{ParserConfig, PolicyParser};
pub use error::{PolicyError, Result};
pub use iam::{
    Action, Arn, Condition, ConditionOperator, Effect, Environment, Identity, MaskedIp, Policy,
    Principal, Statement,
};
