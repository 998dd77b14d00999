//! Record model: typed records that nest other records, flatten to one JSON
//! document, and validate themselves against declared rules.
//!
//! Every record type declares a static [`Schema`] (which attributes hold
//! nested records, and the rules per attribute). Validation works on an
//! attribute bag, the record's flattened JSON, so the order of the bag is
//! the declaration order and the first failing attribute wins.

pub mod address;
pub mod person;
pub mod rules;

pub use address::Address;
pub use person::Person;
pub use rules::{RawRule, Rule, RuleSet, RuleSpec};

use crate::Result;
use crate::diagnostics;

use anyhow::{Context, bail};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Plain attribute bag, kept in insertion order.
pub type Attributes = serde_json::Map<String, Value>;

/// Static metadata for one record type.
#[derive(Debug)]
pub struct Schema {
    pub name: &'static str,
    /// Attributes whose values are nested records.
    pub nested: &'static [&'static str],
    pub rules: RuleSet,
}

impl Schema {
    pub fn is_nested(&self, name: &str) -> bool {
        self.nested.contains(&name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Also validate nested records (default: true).
    pub nested: bool,
    /// Validate this one attribute and nothing else.
    pub only: Option<String>,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            nested: true,
            only: None,
        }
    }
}

impl ValidateOptions {
    /// Top-level attributes only; nested records are not entered.
    pub fn shallow() -> Self {
        Self {
            nested: false,
            only: None,
        }
    }

    pub fn only(name: impl Into<String>) -> Self {
        Self {
            nested: true,
            only: Some(name.into()),
        }
    }
}

/// Behaviour shared by every record, usable behind `&dyn Model` so a parent
/// can reach its nested records.
pub trait Model {
    fn schema(&self) -> &'static Schema;

    /// Flattened plain JSON of this record. Nested records appear as their
    /// own `to_json`, never as model values.
    fn to_json(&self) -> Attributes;

    /// The nested record stored under `name`, if `name` is a nested
    /// attribute and currently holds one.
    fn nested(&self, _name: &str) -> Option<&dyn Model> {
        None
    }

    /// Validate one attribute of `attrs`. Returns the failure message.
    fn validate_attribute(&self, attrs: &Attributes, name: &str) -> Option<String> {
        self.schema().rules.validate_attribute(attrs, name)
    }

    /// Validate a bag of attributes, stopping at the first failure.
    ///
    /// When `options.nested` is set, a nested attribute first validates the
    /// record currently stored under it (with the same options) and
    /// reports that record's error.
    fn validate(&self, attrs: &Attributes, options: &ValidateOptions) -> Option<String> {
        if let Some(only) = &options.only {
            return self.validate_attribute(attrs, only);
        }

        let schema = self.schema();
        for name in attrs.keys() {
            if options.nested && schema.is_nested(name) {
                if let Some(child) = self.nested(name) {
                    if let Some(err) = child.validate(&child.to_json(), options) {
                        return Some(err);
                    }
                }
            }

            if let Some(err) = self.validate_attribute(attrs, name) {
                return Some(err);
            }
        }
        None
    }

    fn is_valid(&self, options: &ValidateOptions) -> bool {
        self.validate(&self.to_json(), options).is_none()
    }
}

/// A concrete record type that can be built from plain JSON.
pub trait Record: Model + DeserializeOwned + Default + Clone {
    /// Human name used in messages.
    const KIND: &'static str;

    fn id(&self) -> Option<&str> {
        None
    }

    fn assign_id(&mut self, _id: String) {}

    /// Build a record from a plain JSON document, materializing nested
    /// records from their plain JSON as well.
    fn hydrate(raw: Attributes) -> Result<Self> {
        serde_json::from_value(Value::Object(raw)).with_context(|| {
            diagnostics::error_message(format!("cannot hydrate {} record", Self::KIND))
        })
    }

    /// Set an attribute by dotted path (`address.city`). Leading segments
    /// that name nested attributes descend into those records.
    fn set(&mut self, path: &str, value: Value) -> Result<()> {
        let (target, prefix, attribute) = resolve_path(&*self, path);

        if let Some((head, _)) = attribute.split_once('.') {
            if target.schema().is_nested(head) {
                bail!(
                    "{}",
                    diagnostics::error_message(format!(
                        "cannot set '{}': {} has no {} record",
                        path,
                        Self::KIND,
                        head
                    ))
                );
            }
        }

        let mut attrs = self.to_json();
        let mut cursor = &mut attrs;
        for segment in &prefix {
            cursor = match cursor.get_mut(segment.as_str()) {
                Some(Value::Object(map)) => map,
                _ => bail!(
                    "{}",
                    diagnostics::error_message(format!(
                        "cannot set '{}': '{}' is not a nested record",
                        path, segment
                    ))
                ),
            };
        }
        cursor.insert(attribute, value);

        *self = Self::hydrate(attrs)?;
        Ok(())
    }
}

/// Store `child` under `name` as its own plain JSON, or `null` when the
/// nested attribute is empty.
pub fn flatten_nested(attrs: &mut Attributes, name: &str, child: Option<&dyn Model>) {
    let value = match child {
        Some(child) => Value::Object(child.to_json()),
        None => Value::Null,
    };
    attrs.insert(name.to_string(), value);
}

/// Resolve a dotted input name to the record it targets.
///
/// Returns the target record, the nested attribute names walked to reach
/// it, and the remaining attribute name. Segments stop descending at the
/// first one that is not a populated nested attribute.
pub fn resolve_path<'a>(model: &'a dyn Model, path: &str) -> (&'a dyn Model, Vec<String>, String) {
    let segments: Vec<&str> = path.split('.').collect();
    let mut current = model;
    let mut prefix = Vec::new();
    let mut i = 0;

    while i + 1 < segments.len() {
        let segment = segments[i];
        let child = if current.schema().is_nested(segment) {
            current.nested(segment)
        } else {
            None
        };
        match child {
            Some(child) => {
                current = child;
                prefix.push(segment.to_string());
                i += 1;
            }
            None => break,
        }
    }

    (current, prefix, segments[i..].join("."))
}

/// Unwrap a JSON object into an attribute bag.
pub fn into_attributes(value: Value) -> Result<Attributes> {
    match value {
        Value::Object(map) => Ok(map),
        other => bail!(
            "{}",
            diagnostics::error_message(format!("expected a JSON object, found {}", other))
        ),
    }
}
