//! Policy statements and their applicability predicate

use super::action::{Action, ActionSet};
use super::arn::Arn;
use super::condition::Condition;
use super::environment::Environment;
use super::principal::{Identity, PrincipalSet};
use std::fmt;
use tracing::trace;

/// Outcome of evaluating a statement or a whole policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    /// Allow the request
    Allow,
    /// Deny the request (takes precedence over Allow)
    Deny,
    /// Nothing decided the request; never written in a document
    Pass,
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Effect::Allow => "Allow",
            Effect::Deny => "Deny",
            Effect::Pass => "Pass",
        })
    }
}

/// A single policy statement
///
/// Each constraint comes as a positive and a negated element, at most one of
/// which is populated. A statement with neither `action` nor `not_action`
/// never applies; the same holds for resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Statement ID (optional)
    pub sid: Option<String>,

    /// Allow or Deny
    pub effect: Effect,

    pub principal: PrincipalSet,
    pub not_principal: PrincipalSet,

    pub action: ActionSet,
    pub not_action: ActionSet,

    /// Resource patterns, in document order
    pub resource: Vec<Arn>,
    pub not_resource: Vec<Arn>,

    /// All must hold for the statement to apply
    pub conditions: Vec<Condition>,
}

impl Statement {
    /// Create a statement with no constraints
    pub fn new(effect: Effect) -> Self {
        Statement {
            sid: None,
            effect,
            principal: PrincipalSet::new(),
            not_principal: PrincipalSet::new(),
            action: ActionSet::empty(),
            not_action: ActionSet::empty(),
            resource: Vec::new(),
            not_resource: Vec::new(),
            conditions: Vec::new(),
        }
    }

    pub fn with_sid(mut self, sid: impl Into<String>) -> Self {
        self.sid = Some(sid.into());
        self
    }

    pub fn with_actions(mut self, actions: ActionSet) -> Self {
        self.action = actions;
        self
    }

    pub fn with_resource(mut self, resource: Arn) -> Self {
        if !self.resource.contains(&resource) {
            self.resource.push(resource);
        }
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Check whether this statement applies to a request
    ///
    /// Principal constraints are only checked when the caller supplies an
    /// identity.
    pub fn applies(
        &self,
        env: &Environment,
        identity: Option<&dyn Identity>,
        action: Action,
        resource: &Arn,
    ) -> bool {
        if let Some(identity) = identity {
            if !self.principal.is_empty() && !identity.is_identity(&self.principal) {
                return false;
            }
            if !self.not_principal.is_empty() && identity.is_identity(&self.not_principal) {
                return false;
            }
        }

        let action_matches = if !self.action.is_empty() {
            self.action.contains(action)
        } else if !self.not_action.is_empty() {
            !self.not_action.contains(action)
        } else {
            false
        };
        if !action_matches {
            return false;
        }

        let resource_matches = if !self.resource.is_empty() {
            self.resource.iter().any(|pattern| pattern.matches(resource))
        } else if !self.not_resource.is_empty() {
            !self.not_resource.iter().any(|pattern| pattern.matches(resource))
        } else {
            false
        };
        if !resource_matches {
            return false;
        }

        self.conditions.iter().all(|c| c.evaluate(env))
    }

    /// This statement's effect if it applies, `Pass` otherwise
    pub fn eval(
        &self,
        env: &Environment,
        identity: Option<&dyn Identity>,
        action: Action,
        resource: &Arn,
    ) -> Effect {
        let applies = self.applies(env, identity, action, resource);
        trace!(
            sid = self.sid.as_deref().unwrap_or(""),
            %action,
            %resource,
            applies,
            "statement checked"
        );
        if applies {
            self.effect
        } else {
            Effect::Pass
        }
    }

    /// Whether any condition inspects `key`
    pub fn has_conditional(&self, key: &str) -> bool {
        self.conditions.iter().any(|c| c.key == key)
    }
}
