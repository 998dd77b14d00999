//! Postal address owned by a person. Has no identity of its own.

use crate::model::{Attributes, Model, Record, RuleSpec, Schema};

use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::LazyLock;

static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    let rules = RuleSpec::from_value(json!({
        "addressOne": {
            "required": true,
            "message": "The address is required"
        },
        "state": {
            "pattern": "^[A-Z]{2,}$",
            "message": "The state should be two capital letters (ie \"CA\")"
        },
        "zipCode": {
            "pattern": "^[0-9]{5,}$",
            "message": "The zip code should be five digits (ie 61374)"
        }
    }))
    .and_then(|spec| spec.validate_and_build())
    .expect("built-in address rules must compile");

    Schema {
        name: "address",
        nested: &[],
        rules,
    }
});

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub address_one: String,
    #[serde(default)]
    pub address_two: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,

    /// Undeclared attributes, carried through unchanged.
    #[serde(flatten)]
    pub extra: Attributes,
}

impl Address {
    /// One-line display form: address line one, city, state and zip code,
    /// skipping empty parts.
    pub fn calculated_address(&self) -> String {
        [&self.address_one, &self.city, &self.state, &self.zip_code]
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Model for Address {
    fn schema(&self) -> &'static Schema {
        &SCHEMA
    }

    fn to_json(&self) -> Attributes {
        let mut attrs = Attributes::new();
        attrs.insert("addressOne".into(), Value::String(self.address_one.clone()));
        attrs.insert("addressTwo".into(), Value::String(self.address_two.clone()));
        attrs.insert("city".into(), Value::String(self.city.clone()));
        attrs.insert("state".into(), Value::String(self.state.clone()));
        attrs.insert("zipCode".into(), Value::String(self.zip_code.clone()));
        for (k, v) in &self.extra {
            attrs.entry(k.clone()).or_insert_with(|| v.clone());
        }
        attrs
    }
}

impl Record for Address {
    const KIND: &'static str = "address";
}
