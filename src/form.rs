//! Two-page add/edit form for one person.
//!
//! Page 0 holds the person's own fields, page 1 the address. The form edits
//! a draft copy; the collection only sees it once `complete` saves it.

use crate::Result;
use crate::collection::{PersonList, SaveError};
use crate::events::Event;
use crate::model::{Address, Model, Person, Record, ValidateOptions, resolve_path};
use crate::store::Store;

use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Person,
    Address,
}

const PERSON_INPUTS: &[&str] = &["firstName", "lastName"];
const ADDRESS_INPUTS: &[&str] = &[
    "address.addressOne",
    "address.addressTwo",
    "address.city",
    "address.state",
    "address.zipCode",
];

impl Page {
    pub fn index(self) -> usize {
        match self {
            Page::Person => 0,
            Page::Address => 1,
        }
    }

    /// Input names shown on this page.
    pub fn inputs(self) -> &'static [&'static str] {
        match self {
            Page::Person => PERSON_INPUTS,
            Page::Address => ADDRESS_INPUTS,
        }
    }
}

#[derive(Debug, Default)]
pub struct PersonForm {
    page: Page,
    draft: Option<Person>,
    /// Per-input messages currently on display.
    field_errors: BTreeMap<String, String>,
    events: Vec<Event>,
}

impl PersonForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn draft(&self) -> Option<&Person> {
        self.draft.as_ref()
    }

    pub fn field_error(&self, input: &str) -> Option<&str> {
        self.field_errors.get(input).map(String::as_str)
    }

    pub fn field_errors(&self) -> &BTreeMap<String, String> {
        &self.field_errors
    }

    /// Start editing a copy of `person`. A person stored without an address
    /// gets an empty one so the address page has inputs to fill.
    pub fn set_model(&mut self, mut person: Person) -> &mut Self {
        if person.address.is_none() {
            person.address = Some(Address::default());
        }
        self.draft = Some(person);
        self.field_errors.clear();
        self
    }

    pub fn clear_model(&mut self) -> &mut Self {
        self.draft = None;
        self.field_errors.clear();
        self
    }

    /// Current text of an input, read from the draft.
    pub fn input_value(&self, input: &str) -> String {
        let Some(draft) = &self.draft else {
            return String::new();
        };
        let (target, _, attribute) = resolve_path(draft, input);
        match target.to_json().get(&attribute) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    /// Take the value of one input into the draft and validate just that
    /// attribute. Returns the message now shown for the input.
    pub fn blur(&mut self, input: &str, value: &str) -> Result<Option<String>> {
        let Some(draft) = self.draft.as_mut() else {
            return Ok(None);
        };
        draft.set(input, Value::String(value.to_string()))?;
        Ok(self.check_input(input))
    }

    /// Re-run field validation for every input on the current page.
    pub fn touch_visible(&mut self) {
        for input in self.page.inputs() {
            self.check_input(input);
        }
    }

    /// Move to the address page if the person's own fields are valid.
    pub fn next(&mut self) -> bool {
        let Some(draft) = &self.draft else {
            return false;
        };

        if draft.is_valid(&ValidateOptions::shallow()) {
            self.page = Page::Address;
            self.events.push(Event::FormNext(self.page));
            true
        } else {
            self.touch_visible();
            false
        }
    }

    pub fn back(&mut self) {
        self.page = Page::Person;
        self.events.push(Event::FormBack(self.page));
    }

    /// Drop the draft and return to the first page.
    pub fn cancel(&mut self) {
        self.page = Page::Person;
        self.clear_model();
        self.events.push(Event::FormCancel(self.page));
    }

    /// Save the draft through the collection.
    ///
    /// Field errors for the current page are refreshed first, but the save
    /// is attempted either way. On failure the draft and page are kept.
    pub fn complete(
        &mut self,
        people: &mut PersonList,
        store: &mut dyn Store,
    ) -> std::result::Result<Person, SaveError> {
        self.touch_visible();

        let Some(draft) = self.draft.clone() else {
            let err = SaveError::Invalid("no person is being edited".to_string());
            self.events.push(Event::FormError(err.to_string()));
            return Err(err);
        };

        match people.save(draft.clone(), store) {
            Ok(id) => {
                let mut saved = draft;
                saved.assign_id(id);
                self.draft = Some(saved.clone());
                self.page = Page::Person;
                self.field_errors.clear();
                self.events.push(Event::FormComplete(Box::new(saved.clone())));
                Ok(saved)
            }
            Err(err) => {
                tracing::debug!("save refused: {}", err);
                self.events.push(Event::FormError(err.to_string()));
                Err(err)
            }
        }
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    fn check_input(&mut self, input: &str) -> Option<String> {
        let draft = self.draft.as_ref()?;
        let (target, _, attribute) = resolve_path(draft, input);
        let error = target.validate_attribute(&target.to_json(), &attribute);

        match &error {
            Some(message) => {
                self.field_errors.insert(input.to_string(), message.clone());
            }
            None => {
                self.field_errors.remove(input);
            }
        }
        error
    }
}
