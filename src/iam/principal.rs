//! Principals named in policy statements and the caller identity capability

use super::arn::{Arn, Service};
use std::collections::BTreeSet;
use std::fmt;

/// An identity a statement's Principal/NotPrincipal can name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Principal {
    /// `*`: anyone
    Wildcard,
    /// A whole account (`arn:aws:iam::<tenant>:root` or a bare account id)
    Tenant(String),
    /// `arn:aws:iam::<tenant>:user/<name>`
    User { tenant: String, name: String },
    /// `arn:aws:iam::<tenant>:role/<name>`
    Role { tenant: String, name: String },
}

/// Principals named by one statement element
pub type PrincipalSet = BTreeSet<Principal>;

impl Principal {
    pub fn tenant(tenant: impl Into<String>) -> Self {
        Principal::Tenant(tenant.into())
    }

    pub fn user(tenant: impl Into<String>, name: impl Into<String>) -> Self {
        Principal::User {
            tenant: tenant.into(),
            name: name.into(),
        }
    }

    pub fn role(tenant: impl Into<String>, name: impl Into<String>) -> Self {
        Principal::Role {
            tenant: tenant.into(),
            name: name.into(),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Principal::Wildcard)
    }

    /// Interpret one entry of an `"AWS"` principal list
    ///
    /// # Examples
    /// ```
    /// use iam_policy::iam::Principal;
    ///
    /// assert_eq!(
    ///     Principal::parse("arn:aws:iam::ACCOUNT:root"),
    ///     Some(Principal::tenant("ACCOUNT"))
    /// );
    /// assert_eq!(Principal::parse("*"), Some(Principal::Wildcard));
    /// assert_eq!(Principal::parse("arn:aws:iam::ACCOUNT:group/g"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        if s == "*" {
            return Some(Principal::Wildcard);
        }

        if !s.starts_with("arn:") {
            // Bare account id
            if s.is_empty() || s.contains(':') || s.contains('*') {
                return None;
            }
            return Some(Principal::tenant(s));
        }

        let arn = Arn::parse(s)?;
        if arn.service != Service::Iam || arn.account.is_empty() {
            return None;
        }

        if arn.resource == "root" {
            return Some(Principal::Tenant(arn.account));
        }

        match arn.resource.split_once('/') {
            Some(("user", name)) if !name.is_empty() => Some(Principal::user(arn.account, name)),
            Some(("role", name)) if !name.is_empty() => Some(Principal::role(arn.account, name)),
            _ => None,
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Principal::Wildcard => f.write_str("*"),
            Principal::Tenant(tenant) => write!(f, "arn:aws:iam::{}:root", tenant),
            Principal::User { tenant, name } => write!(f, "arn:aws:iam::{}:user/{}", tenant, name),
            Principal::Role { tenant, name } => write!(f, "arn:aws:iam::{}:role/{}", tenant, name),
        }
    }
}

/// Capability of an authenticated caller to be tested against principals
///
/// Authentication happens elsewhere; the engine only asks whether the caller
/// is one of a set of principals.
pub trait Identity {
    fn is_identity(&self, ids: &PrincipalSet) -> bool;
}

impl Identity for Principal {
    /// A wildcard caller is anyone named by a non-empty set; otherwise the
    /// set must name this principal exactly or contain `*`.
    ///
    /// An account principal does not cover the users and roles in that
    /// account. Callers that need that should implement `Identity` themselves.
    fn is_identity(&self, ids: &PrincipalSet) -> bool {
        if self.is_wildcard() && !ids.is_empty() {
            return true;
        }
        ids.contains(self) || ids.contains(&Principal::Wildcard)
    }
}
