//! Ordered, id-keyed set of top-level records mirrored into a store.

use crate::diagnostics;
use crate::events::Event;
use crate::model::{Model, Person, Record, ValidateOptions};
use crate::store::{Store, StoreError};

use thiserror::Error;
use uuid::Uuid;

/// Namespace the person list is stored under.
pub const PEOPLE_NAMESPACE: &str = "people";

pub type PersonList = Collection<Person>;

#[derive(Error, Debug)]
pub enum SaveError {
    /// The record failed validation; nothing was written.
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct Collection<R: Record> {
    namespace: String,
    records: Vec<R>,
    events: Vec<Event>,
}

impl<R: Record> Collection<R> {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            records: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Replace the contents with what the store holds for this namespace.
    ///
    /// Documents that cannot be hydrated, carry no id, or repeat an id are
    /// skipped with a warning.
    pub fn fetch(&mut self, store: &dyn Store) -> Result<usize, StoreError> {
        let docs = store.find_all(&self.namespace)?;

        let mut records: Vec<R> = Vec::with_capacity(docs.len());
        for doc in docs {
            let record = match R::hydrate(doc) {
                Ok(record) => record,
                Err(e) => {
                    diagnostics::warn(format!(
                        "skipping stored {} in '{}': {:#}",
                        R::KIND,
                        self.namespace,
                        e
                    ));
                    continue;
                }
            };

            let Some(id) = record.id() else {
                diagnostics::warn(format!(
                    "skipping stored {} in '{}' without an id",
                    R::KIND,
                    self.namespace
                ));
                continue;
            };
            if records.iter().any(|r| r.id() == Some(id)) {
                diagnostics::warn(format!(
                    "skipping stored {} in '{}' with duplicate id {}",
                    R::KIND,
                    self.namespace,
                    id
                ));
                continue;
            }

            records.push(record);
        }

        self.records = records;
        tracing::debug!(
            namespace = %self.namespace,
            count = self.records.len(),
            "fetched records"
        );
        Ok(self.records.len())
    }

    /// Insert a record, assigning an id if it has none. Returns the id.
    ///
    /// A record whose id is already present is ignored.
    pub fn add(&mut self, mut record: R) -> String {
        let id = match record.id() {
            Some(id) => id.to_string(),
            None => {
                let id = new_id();
                record.assign_id(id.clone());
                id
            }
        };

        if self.position(&id).is_none() {
            self.records.push(record);
            self.events.push(Event::Add(id.clone()));
        }
        id
    }

    pub fn get(&self, id: &str) -> Option<&R> {
        self.records.iter().find(|r| r.id() == Some(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.records.iter()
    }

    /// Validate (nested records included) and persist `record`, then put it
    /// in the collection in place of any record with the same id.
    pub fn save(&mut self, mut record: R, store: &mut dyn Store) -> Result<String, SaveError> {
        if let Some(message) = record.validate(&record.to_json(), &ValidateOptions::default()) {
            return Err(SaveError::Invalid(message));
        }

        let id = match record.id() {
            Some(id) => id.to_string(),
            None => {
                let id = new_id();
                record.assign_id(id.clone());
                id
            }
        };

        store.save(&self.namespace, &id, record.to_json())?;
        tracing::debug!(namespace = %self.namespace, %id, "saved {}", R::KIND);

        match self.position(&id) {
            Some(i) => {
                self.records[i] = record;
                self.events.push(Event::Change(id.clone()));
            }
            None => {
                self.records.push(record);
                self.events.push(Event::Add(id.clone()));
            }
        }
        Ok(id)
    }

    /// Delete a record from the store and then from the collection.
    /// Unknown ids are a no-op.
    pub fn destroy(&mut self, id: &str, store: &mut dyn Store) -> Result<Option<R>, StoreError> {
        let Some(pos) = self.position(id) else {
            return Ok(None);
        };

        store.destroy(&self.namespace, id)?;
        let record = self.records.remove(pos);
        self.events.push(Event::Remove(id.to_string()));
        tracing::debug!(namespace = %self.namespace, %id, "removed {}", R::KIND);
        Ok(Some(record))
    }

    /// Relay an edit request for a member record.
    pub fn request_edit(&mut self, id: &str) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.events.push(Event::Edit(id.to_string()));
        true
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id() == Some(id))
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}
