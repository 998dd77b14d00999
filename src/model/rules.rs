//! Field rules: `required` and regex `pattern`, each with an optional message.
//!
//! Rules are declared as raw descriptors (serde-friendly) and compiled once
//! into a [`RuleSet`]:
//!
//! {
//!   "state": {
//!     "pattern": "^[A-Z]{2,}$",
//!     "message": "The state should be two capital letters (ie \"CA\")"
//!   }
//! }
//!
//! A pattern that does not compile is a declaration bug, reported from
//! [`RuleSpec::validate_and_build`] and never from a check.

use crate::Result;
use crate::diagnostics;
use crate::model::Attributes;

use anyhow::{Context, bail};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeSet;

/// Raw rule descriptor as it appears in a declaration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRule {
    #[serde(default)]
    pub required: bool,

    /// Regex source, compiled by `validate_and_build`.
    #[serde(default)]
    pub pattern: Option<String>,

    #[serde(default)]
    pub message: Option<String>,
}

/// Descriptors keyed by attribute name, kept in declaration order.
#[derive(Debug, Clone, Default)]
pub struct RuleSpec {
    pub rules: Vec<(String, RawRule)>,
}

/// Compiled rule for a single attribute.
#[derive(Debug, Clone)]
pub struct Rule {
    pub required: bool,
    pub pattern: Option<Regex>,
    pub message: Option<String>,
}

/// Compiled rules for one record type.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<(String, Rule)>,
}

impl RuleSpec {
    /// Read descriptors from a JSON object of `name -> descriptor`.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(map) = value else {
            bail!(
                "{}",
                diagnostics::error_message("rule declarations must be a JSON object")
            );
        };

        let mut rules = Vec::with_capacity(map.len());
        for (name, raw) in map {
            let rule: RawRule = serde_json::from_value(raw).with_context(|| {
                diagnostics::error_message(format!("bad rule descriptor for '{}'", name))
            })?;
            rules.push((name, rule));
        }
        Ok(Self { rules })
    }

    /// Compile every pattern and reject duplicate or empty attribute names.
    pub fn validate_and_build(&self) -> Result<RuleSet> {
        let mut seen = BTreeSet::new();
        let mut rules = Vec::with_capacity(self.rules.len());

        for (name, raw) in &self.rules {
            if name.trim().is_empty() {
                bail!(
                    "{}",
                    diagnostics::error_message("rule declared for an empty attribute name")
                );
            }
            if !seen.insert(name.as_str()) {
                bail!(
                    "{}",
                    diagnostics::error_message(format!(
                        "duplicate rule for attribute '{}'",
                        name
                    ))
                );
            }

            let pattern = match &raw.pattern {
                Some(src) => Some(Regex::new(src).with_context(|| {
                    diagnostics::error_message(format!(
                        "pattern for attribute '{}' is not a valid regex: {:?}",
                        name, src
                    ))
                })?),
                None => None,
            };

            rules.push((
                name.clone(),
                Rule {
                    required: raw.required,
                    pattern,
                    message: raw.message.clone(),
                },
            ));
        }

        Ok(RuleSet { rules })
    }
}

impl Rule {
    /// Check one value; `None` means the attribute is absent from the bag.
    ///
    /// At most one message comes back: a failed `required` check hides the
    /// pattern check.
    pub fn check(&self, name: &str, value: Option<&Value>) -> Option<String> {
        if self.required && is_blank(value) {
            return Some(
                self.message
                    .clone()
                    .unwrap_or_else(|| format!("The field \"{}\" is required", name)),
            );
        }

        match (&self.pattern, value) {
            (Some(pattern), Some(value))
                if is_truthy(value) && !pattern.is_match(&pattern_subject(value)) =>
            {
                Some(
                    self.message
                        .clone()
                        .unwrap_or_else(|| format!("The field \"{}\" is not valid", name)),
                )
            }
            _ => None,
        }
    }
}

impl RuleSet {
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|(n, _)| n == name).map(|(_, r)| r)
    }

    /// Validate `name` against the bag. Attributes without a rule pass.
    pub fn validate_attribute(&self, attrs: &Attributes, name: &str) -> Option<String> {
        self.get(name)?.check(name, attrs.get(name))
    }
}

/// Missing, null, false and "" fail `required`. Numbers never do, so a
/// numeric zero counts as present.
fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Patterns are only applied to values that are present and non-empty.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::Bool(true) | Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text a pattern is matched against.
fn pattern_subject(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}
