//! Serde model of a raw policy document and its conversion into statements

use super::action::ActionSet;
use super::arn::Arn;
use super::condition::{Condition, ConditionOperator};
use super::principal::{Principal, PrincipalSet};
use super::statement::{Effect, Statement};
use crate::config::ParserConfig;
use crate::error::{PolicyError, Result};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::marker::PhantomData;
use tracing::warn;

/// A single element or an array of them
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

/// Object entries in document order, repeated keys included
#[derive(Debug)]
pub(crate) struct Entries<V>(pub Vec<(String, V)>);

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Entries<V> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
            type Value = Entries<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(Entries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

/// Top-level document
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub(crate) struct PolicyDocument {
    pub version: Option<String>,
    pub id: Option<String>,
    pub statement: OneOrMany<StatementDocument>,
}

/// `"*"` or a map such as `{"AWS": [...]}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum PrincipalDocument {
    Any(String),
    Mapped(Entries<OneOrMany<String>>),
}

/// Condition values may be written as strings, numbers or booleans
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ConditionScalar {
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl ConditionScalar {
    fn into_string(self) -> String {
        match self {
            ConditionScalar::Bool(b) => b.to_string(),
            ConditionScalar::Number(n) => n.to_string(),
            ConditionScalar::String(s) => s,
        }
    }
}

/// operator -> context key -> values; a repeated operator or key is another
/// condition, not a replacement
type ConditionBlock = Entries<Entries<OneOrMany<ConditionScalar>>>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub(crate) struct StatementDocument {
    pub sid: Option<String>,
    pub effect: String,
    pub principal: Option<PrincipalDocument>,
    pub not_principal: Option<PrincipalDocument>,
    pub action: Option<OneOrMany<String>>,
    pub not_action: Option<OneOrMany<String>>,
    pub resource: Option<OneOrMany<String>>,
    pub not_resource: Option<OneOrMany<String>>,
    pub condition: Option<ConditionBlock>,
}

impl StatementDocument {
    /// Build a statement, or `None` if it names a principal set that ended up
    /// empty and so can never apply
    pub(crate) fn into_statement(self, config: &ParserConfig) -> Result<Option<Statement>> {
        let effect = match self.effect.as_str() {
            "Allow" => Effect::Allow,
            "Deny" => Effect::Deny,
            _ => return Err(PolicyError::InvalidEffect(self.effect)),
        };

        exclusive(&self.principal, &self.not_principal, "Principal", "NotPrincipal")?;
        exclusive(&self.action, &self.not_action, "Action", "NotAction")?;
        exclusive(&self.resource, &self.not_resource, "Resource", "NotResource")?;

        let mut stmt = Statement::new(effect);
        stmt.sid = self.sid;

        if let Some(doc) = self.principal {
            let (set, _) = principals(doc, config)?;
            if set.is_empty() {
                warn!(sid = stmt.sid.as_deref().unwrap_or(""), "statement names no principal, skipping");
                return Ok(None);
            }
            stmt.principal = set;
        }
        if let Some(doc) = self.not_principal {
            let (set, dropped) = principals(doc, config)?;
            // An Allow must not reach a principal it was meant to exclude
            if dropped > 0 && effect == Effect::Allow {
                warn!(
                    sid = stmt.sid.as_deref().unwrap_or(""),
                    dropped, "allow excludes unreadable principals, skipping"
                );
                return Ok(None);
            }
            stmt.not_principal = set;
        }

        if let Some(tokens) = self.action {
            stmt.action = actions(tokens)?;
        }
        if let Some(tokens) = self.not_action {
            stmt.not_action = actions(tokens)?;
        }

        if let Some(arns) = self.resource {
            stmt.resource = resources(arns, &config.tenant)?;
        }
        if let Some(arns) = self.not_resource {
            stmt.not_resource = resources(arns, &config.tenant)?;
        }

        if let Some(block) = self.condition {
            stmt.conditions = conditions(block)?;
        }

        Ok(Some(stmt))
    }
}

fn exclusive<T>(
    a: &Option<T>,
    b: &Option<T>,
    a_name: &'static str,
    b_name: &'static str,
) -> Result<()> {
    if a.is_some() && b.is_some() {
        return Err(PolicyError::ConflictingElements(a_name, b_name));
    }
    Ok(())
}

/// Parsed principals and the number of entries dropped in lenient mode
fn principals(doc: PrincipalDocument, config: &ParserConfig) -> Result<(PrincipalSet, usize)> {
    let mut set = PrincipalSet::new();
    let mut dropped = 0;

    let mut reject = |entry: String, kept: usize| -> Result<()> {
        if config.reject_invalid_principals {
            return Err(PolicyError::InvalidPrincipal(entry));
        }
        warn!(principal = %entry, kept, "dropping invalid principal");
        dropped += 1;
        Ok(())
    };

    match doc {
        PrincipalDocument::Any(s) if s == "*" => {
            set.insert(Principal::Wildcard);
        }
        PrincipalDocument::Any(s) => reject(s, set.len())?,
        PrincipalDocument::Mapped(Entries(map)) => {
            for (kind, entries) in map {
                if kind != "AWS" {
                    reject(kind, set.len())?;
                    continue;
                }
                for entry in entries.into_vec() {
                    match Principal::parse(&entry) {
                        Some(principal) => {
                            set.insert(principal);
                        }
                        None => reject(entry, set.len())?,
                    }
                }
            }
        }
    }

    Ok((set, dropped))
}

fn actions(tokens: OneOrMany<String>) -> Result<ActionSet> {
    let mut set = ActionSet::empty();
    for token in tokens.into_vec() {
        match ActionSet::resolve(&token) {
            Some(resolved) => set |= resolved,
            None => return Err(PolicyError::InvalidAction(token)),
        }
    }
    set.fill_sentinels();
    Ok(set)
}

fn resources(arns: OneOrMany<String>, tenant: &str) -> Result<Vec<Arn>> {
    let mut out: Vec<Arn> = Vec::new();
    for text in arns.into_vec() {
        let mut arn = Arn::parse(&text).ok_or(PolicyError::InvalidArn(text))?;
        if arn.account.is_empty() {
            arn.account = tenant.to_string();
        }
        if !out.contains(&arn) {
            out.push(arn);
        }
    }
    Ok(out)
}

fn conditions(block: ConditionBlock) -> Result<Vec<Condition>> {
    let mut out = Vec::new();
    for (op_name, Entries(keys)) in block.0 {
        let (operator, if_exists) = ConditionOperator::parse(&op_name)
            .ok_or_else(|| PolicyError::UnknownConditionOperator(op_name.clone()))?;

        for (key, values) in keys {
            let values: Vec<String> = values
                .into_vec()
                .into_iter()
                .map(ConditionScalar::into_string)
                .collect();

            let invalid = |reason: &str| PolicyError::InvalidCondition {
                operator: op_name.clone(),
                key: key.clone(),
                reason: reason.to_string(),
            };

            if values.is_empty() {
                return Err(invalid("no values"));
            }
            if operator == ConditionOperator::Null
                && values
                    .iter()
                    .any(|v| !v.eq_ignore_ascii_case("true") && !v.eq_ignore_ascii_case("false"))
            {
                return Err(invalid("Null takes true or false"));
            }

            out.push(Condition::new(operator, key, values).with_if_exists(if_exists));
        }
    }
    Ok(out)
}
