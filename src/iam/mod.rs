//! Identity and Access Management (IAM) policy evaluation
//!
//! Provides AWS-style access control with:
//! - JSON policy documents parsed into immutable statements
//! - Allow/Deny statements with explicit deny precedence
//! - Wildcard matching for actions, ARNs and condition strings
//! - Condition evaluation (String, Numeric, Date, Bool, IP, ARN, Null)
//! - A fixed action vocabulary stored as a bitset

mod action;
mod arn;
mod condition;
mod document;
mod environment;
mod network;
mod pattern;
mod policy;
mod principal;
mod statement;

pub use action::{Action, ActionService, ActionSet};
pub use arn::{Arn, Partition, Service};
pub use condition::{Condition, ConditionOperator};
pub use environment::Environment;
pub use network::MaskedIp;
pub use pattern::{MatchMode, PatternMatcher};
pub use policy::{Policy, Version, POLICY_VERSION};
pub use principal::{Identity, Principal, PrincipalSet};
pub use statement::{Effect, Statement};
