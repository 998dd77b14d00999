use crate::model::{Address, Attributes, Model, Record, RuleSpec, Schema, flatten_nested};

use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::LazyLock;

static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    let rules = RuleSpec::from_value(json!({
        "firstName": {
            "required": true,
            "message": "The first name is required"
        },
        "lastName": {
            "required": true,
            "message": "The last name is required"
        },
        "address": {
            "required": true
        }
    }))
    .and_then(|spec| spec.validate_and_build())
    .expect("built-in person rules must compile");

    Schema {
        name: "person",
        nested: &["address"],
        rules,
    }
});

/// A person in the list. Owns its address outright.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// `None` when the document carries `"address": null`.
    #[serde(default = "fresh_address")]
    pub address: Option<Address>,

    #[serde(flatten)]
    pub extra: Attributes,
}

fn fresh_address() -> Option<Address> {
    Some(Address::default())
}

impl Default for Person {
    fn default() -> Self {
        Self {
            id: None,
            first_name: String::new(),
            last_name: String::new(),
            address: fresh_address(),
            extra: Attributes::new(),
        }
    }
}

impl Person {
    pub fn full_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (false, false) => format!("{} {}", self.first_name, self.last_name),
            (false, true) => self.first_name.clone(),
            (true, _) => self.last_name.clone(),
        }
    }

    pub fn calculated_address(&self) -> String {
        self.address
            .as_ref()
            .map(Address::calculated_address)
            .unwrap_or_default()
    }
}

impl Model for Person {
    fn schema(&self) -> &'static Schema {
        &SCHEMA
    }

    fn to_json(&self) -> Attributes {
        let mut attrs = Attributes::new();
        if let Some(id) = &self.id {
            attrs.insert("id".into(), Value::String(id.clone()));
        }
        attrs.insert("firstName".into(), Value::String(self.first_name.clone()));
        attrs.insert("lastName".into(), Value::String(self.last_name.clone()));
        flatten_nested(
            &mut attrs,
            "address",
            self.address.as_ref().map(|a| a as &dyn Model),
        );
        for (k, v) in &self.extra {
            attrs.entry(k.clone()).or_insert_with(|| v.clone());
        }
        attrs
    }

    fn nested(&self, name: &str) -> Option<&dyn Model> {
        match name {
            "address" => self.address.as_ref().map(|a| a as &dyn Model),
            _ => None,
        }
    }
}

impl Record for Person {
    const KIND: &'static str = "person";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn assign_id(&mut self, id: String) {
        self.id = Some(id);
    }
}
