//! Namespaced key-value record store behind the collection.
//!
//! Records are plain flattened JSON documents keyed by their `id`. A store
//! keeps insertion order within a namespace; updating a record keeps its
//! position.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::model::Attributes;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("cannot access store file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store file {path} is not valid: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub trait Store {
    /// Every record in `namespace`, in insertion order. Documents without
    /// an id are returned too; only the id-keyed operations ignore them.
    fn find_all(&self, namespace: &str) -> Result<Vec<Attributes>, StoreError>;

    fn find(&self, namespace: &str, id: &str) -> Result<Option<Attributes>, StoreError>;

    /// Create or replace the record stored under `id`.
    fn save(&mut self, namespace: &str, id: &str, record: Attributes) -> Result<(), StoreError>;

    /// Remove the record stored under `id`. Returns whether one existed.
    fn destroy(&mut self, namespace: &str, id: &str) -> Result<bool, StoreError>;
}

/// Ordered `(id, record)` rows of one namespace. A row read back without a
/// string id has no key and is never matched.
pub(crate) type Rows = Vec<(Option<String>, Attributes)>;

pub(crate) fn find<'a>(rows: &'a Rows, id: &str) -> Option<&'a Attributes> {
    rows.iter()
        .find(|(existing, _)| existing.as_deref() == Some(id))
        .map(|(_, r)| r)
}

pub(crate) fn upsert(rows: &mut Rows, id: &str, record: Attributes) {
    match rows
        .iter_mut()
        .find(|(existing, _)| existing.as_deref() == Some(id))
    {
        Some((_, slot)) => *slot = record,
        None => rows.push((Some(id.to_string()), record)),
    }
}

pub(crate) fn remove(rows: &mut Rows, id: &str) -> bool {
    let before = rows.len();
    rows.retain(|(existing, _)| existing.as_deref() != Some(id));
    rows.len() != before
}
