//! Condition evaluation for IAM policies
//!
//! Each condition names an operator, a context key and one or more values.
//! The context value is compared against every listed value and the condition
//! holds if any comparison does. Negated operators (`StringNotEquals`,
//! `NotIpAddress`, ...) hold only if no comparison does.
//!
//! A missing context key fails the condition unless the operator carried the
//! `IfExists` suffix. A context value that cannot be read as the operator's
//! type (number, date, address, ...) always fails the condition.

use super::arn::Arn;
use super::environment::Environment;
use super::network::MaskedIp;
use super::pattern::PatternMatcher;
use base64::Engine;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::fmt;

/// Condition operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionOperator {
    /// String equals (case-sensitive)
    StringEquals,
    /// String differs from every value
    StringNotEquals,
    /// String equals, ignoring case
    StringEqualsIgnoreCase,
    /// String differs from every value, ignoring case
    StringNotEqualsIgnoreCase,
    /// String matches a `?`/`*` pattern
    StringLike,
    /// String matches none of the patterns
    StringNotLike,
    NumericEquals,
    NumericNotEquals,
    NumericLessThan,
    NumericLessThanEquals,
    NumericGreaterThan,
    NumericGreaterThanEquals,
    /// Dates are RFC 3339, `YYYY-MM-DD`, or epoch seconds
    DateEquals,
    DateNotEquals,
    DateLessThan,
    DateLessThanEquals,
    DateGreaterThan,
    DateGreaterThanEquals,
    /// `true`/`false`, case-insensitive
    Bool,
    /// Base64-encoded bytes
    BinaryEquals,
    /// Address lies in one of the networks
    IpAddress,
    /// Address lies in none of the networks
    NotIpAddress,
    ArnEquals,
    ArnNotEquals,
    ArnLike,
    ArnNotLike,
    /// Tests key presence: `true` means the key must be absent
    Null,
}

const OPERATORS: &[(&str, ConditionOperator)] = &[
    ("StringEquals", ConditionOperator::StringEquals),
    ("StringNotEquals", ConditionOperator::StringNotEquals),
    ("StringEqualsIgnoreCase", ConditionOperator::StringEqualsIgnoreCase),
    ("StringNotEqualsIgnoreCase", ConditionOperator::StringNotEqualsIgnoreCase),
    ("StringLike", ConditionOperator::StringLike),
    ("StringNotLike", ConditionOperator::StringNotLike),
    ("NumericEquals", ConditionOperator::NumericEquals),
    ("NumericNotEquals", ConditionOperator::NumericNotEquals),
    ("NumericLessThan", ConditionOperator::NumericLessThan),
    ("NumericLessThanEquals", ConditionOperator::NumericLessThanEquals),
    ("NumericGreaterThan", ConditionOperator::NumericGreaterThan),
    ("NumericGreaterThanEquals", ConditionOperator::NumericGreaterThanEquals),
    ("DateEquals", ConditionOperator::DateEquals),
    ("DateNotEquals", ConditionOperator::DateNotEquals),
    ("DateLessThan", ConditionOperator::DateLessThan),
    ("DateLessThanEquals", ConditionOperator::DateLessThanEquals),
    ("DateGreaterThan", ConditionOperator::DateGreaterThan),
    ("DateGreaterThanEquals", ConditionOperator::DateGreaterThanEquals),
    ("Bool", ConditionOperator::Bool),
    ("BinaryEquals", ConditionOperator::BinaryEquals),
    ("IpAddress", ConditionOperator::IpAddress),
    ("NotIpAddress", ConditionOperator::NotIpAddress),
    ("ArnEquals", ConditionOperator::ArnEquals),
    ("ArnNotEquals", ConditionOperator::ArnNotEquals),
    ("ArnLike", ConditionOperator::ArnLike),
    ("ArnNotLike", ConditionOperator::ArnNotLike),
    ("Null", ConditionOperator::Null),
];

impl ConditionOperator {
    /// Name as written in a policy document
    pub fn name(self) -> &'static str {
        OPERATORS
            .iter()
            .find(|(_, op)| *op == self)
            .map(|(name, _)| *name)
            .unwrap_or("Unknown")
    }

    /// Exact lookup by document name, without any `IfExists` suffix
    pub fn from_name(name: &str) -> Option<Self> {
        OPERATORS
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, op)| *op)
    }

    /// Parse a condition block key, returning the operator and whether it
    /// carried the `IfExists` suffix
    ///
    /// `Null` has no `IfExists` form.
    pub fn parse(token: &str) -> Option<(Self, bool)> {
        if let Some(op) = Self::from_name(token) {
            return Some((op, false));
        }
        let op = Self::from_name(token.strip_suffix("IfExists")?)?;
        (op != ConditionOperator::Null).then_some((op, true))
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub operator: ConditionOperator,
    pub key: String,
    pub values: Vec<String>,
    /// Treat a missing key as satisfied
    pub if_exists: bool,
}

impl Condition {
    /// Create a new condition
    pub fn new(
        operator: ConditionOperator,
        key: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Condition {
            operator,
            key: key.into(),
            values: values.into_iter().map(Into::into).collect(),
            if_exists: false,
        }
    }

    /// Set the `IfExists` behavior
    pub fn with_if_exists(mut self, if_exists: bool) -> Self {
        self.if_exists = if_exists;
        self
    }

    /// Read a condition value or context value as a network
    pub fn as_network(s: &str) -> Option<MaskedIp> {
        MaskedIp::parse(s)
    }

    /// Evaluate this condition against a request environment
    pub fn evaluate(&self, env: &Environment) -> bool {
        use ConditionOperator::*;

        if self.operator == Null {
            let absent = !env.contains_key(&self.key);
            return self
                .values
                .iter()
                .filter_map(|v| as_bool(v))
                .any(|want_absent| want_absent == absent);
        }

        let actual = match env.get(&self.key) {
            Some(v) => v,
            None => return self.if_exists,
        };

        match self.operator {
            StringEquals => self.any_value(|v| actual == v),
            StringNotEquals => !self.any_value(|v| actual == v),
            StringEqualsIgnoreCase => self.any_value(|v| eq_ignore_case(actual, v)),
            StringNotEqualsIgnoreCase => !self.any_value(|v| eq_ignore_case(actual, v)),
            StringLike => self.any_value(|v| PatternMatcher::matches(v, actual, false)),
            StringNotLike => !self.any_value(|v| PatternMatcher::matches(v, actual, false)),

            NumericEquals => self.any_typed(as_number, actual, |a, b| a == b),
            NumericNotEquals => self.no_typed(as_number, actual, |a, b| a == b),
            NumericLessThan => self.any_typed(as_number, actual, |a, b| a < b),
            NumericLessThanEquals => self.any_typed(as_number, actual, |a, b| a <= b),
            NumericGreaterThan => self.any_typed(as_number, actual, |a, b| a > b),
            NumericGreaterThanEquals => self.any_typed(as_number, actual, |a, b| a >= b),

            DateEquals => self.any_typed(as_date, actual, |a, b| a == b),
            DateNotEquals => self.no_typed(as_date, actual, |a, b| a == b),
            DateLessThan => self.any_typed(as_date, actual, |a, b| a < b),
            DateLessThanEquals => self.any_typed(as_date, actual, |a, b| a <= b),
            DateGreaterThan => self.any_typed(as_date, actual, |a, b| a > b),
            DateGreaterThanEquals => self.any_typed(as_date, actual, |a, b| a >= b),

            Bool => self.any_typed(as_bool, actual, |a, b| a == b),
            BinaryEquals => self.any_typed(as_binary, actual, |a, b| a == b),

            IpAddress => self.any_typed(MaskedIp::parse, actual, |a, b| b.matches(a)),
            NotIpAddress => self.no_typed(MaskedIp::parse, actual, |a, b| b.matches(a)),

            ArnEquals | ArnLike => self.any_typed(Arn::parse, actual, |a, b| b.matches(a)),
            ArnNotEquals | ArnNotLike => self.no_typed(Arn::parse, actual, |a, b| b.matches(a)),

            Null => unreachable!("Null is decided before the key lookup"),
        }
    }

    fn any_value(&self, f: impl Fn(&str) -> bool) -> bool {
        self.values.iter().any(|v| f(v.as_str()))
    }

    /// Holds if the context value parses and matches some parseable value
    fn any_typed<T>(
        &self,
        parse: impl Fn(&str) -> Option<T>,
        actual: &str,
        cmp: impl Fn(&T, &T) -> bool,
    ) -> bool {
        let actual = match parse(actual) {
            Some(a) => a,
            None => return false,
        };
        self.values
            .iter()
            .filter_map(|v| parse(v.as_str()))
            .any(|expected| cmp(&actual, &expected))
    }

    /// Holds if the context value parses, every value parses, and none match
    fn no_typed<T>(
        &self,
        parse: impl Fn(&str) -> Option<T>,
        actual: &str,
        cmp: impl Fn(&T, &T) -> bool,
    ) -> bool {
        let actual = match parse(actual) {
            Some(a) => a,
            None => return false,
        };
        for value in &self.values {
            match parse(value.as_str()) {
                Some(expected) if cmp(&actual, &expected) => return false,
                Some(_) => {}
                None => return false,
            }
        }
        true
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn as_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn as_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| !n.is_nan())
}

fn as_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    let secs: i64 = s.parse().ok()?;
    Utc.timestamp_opt(secs, 0).single()
}

fn as_binary(s: &str) -> Option<Vec<u8>> {
    base64::engine::general_purpose::STANDARD.decode(s).ok()
}
