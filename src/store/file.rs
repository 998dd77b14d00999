//! Durable store: one JSON file holding every namespace.
//!
//! File shape:
//! {
//!   "people": [
//!     { "id": "…", "firstName": "Ada", "lastName": "Lovelace", "address": { … } },
//!     ...
//!   ]
//! }
//!
//! The whole file is rewritten on each mutation (temp file, then rename).
//! Documents without a string `id` are carried through rewrites untouched.

use crate::model::Attributes;
use crate::store::{Rows, Store, StoreError, find, remove, upsert};

use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, Rows>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        let raw: BTreeMap<String, Vec<Attributes>> =
            serde_json::from_str(&text).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;

        let mut out = BTreeMap::new();
        for (namespace, records) in raw {
            let rows: Rows = records
                .into_iter()
                .map(|record| {
                    let id = match record.get("id") {
                        Some(Value::String(id)) => Some(id.clone()),
                        _ => None,
                    };
                    (id, record)
                })
                .collect();
            out.insert(namespace, rows);
        }
        Ok(out)
    }

    fn write(&self, namespaces: &BTreeMap<String, Rows>) -> Result<(), StoreError> {
        let raw: BTreeMap<&str, Vec<&Attributes>> = namespaces
            .iter()
            .map(|(ns, rows)| (ns.as_str(), rows.iter().map(|(_, r)| r).collect()))
            .collect();
        let text = serde_json::to_string_pretty(&raw).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, text).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl Store for FileStore {
    fn find_all(&self, namespace: &str) -> Result<Vec<Attributes>, StoreError> {
        let mut all = self.load()?;
        Ok(all
            .remove(namespace)
            .map(|rows| rows.into_iter().map(|(_, r)| r).collect())
            .unwrap_or_default())
    }

    fn find(&self, namespace: &str, id: &str) -> Result<Option<Attributes>, StoreError> {
        let all = self.load()?;
        Ok(all.get(namespace).and_then(|rows| find(rows, id)).cloned())
    }

    fn save(&mut self, namespace: &str, id: &str, mut record: Attributes) -> Result<(), StoreError> {
        // The id is what `load` keys rows by.
        record.insert("id".to_string(), Value::String(id.to_string()));

        let mut all = self.load()?;
        upsert(all.entry(namespace.to_string()).or_default(), id, record);
        self.write(&all)
    }

    fn destroy(&mut self, namespace: &str, id: &str) -> Result<bool, StoreError> {
        let mut all = self.load()?;
        let removed = all
            .get_mut(namespace)
            .map(|rows| remove(rows, id))
            .unwrap_or(false);
        if removed {
            self.write(&all)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::into_attributes;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(id: &str, name: &str) -> Attributes {
        into_attributes(json!({ "id": id, "firstName": name })).unwrap()
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("people.json"));
        assert!(store.find_all("people").unwrap().is_empty());
    }

    #[test]
    fn records_survive_a_new_store_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("people.json");

        let mut store = FileStore::new(&path);
        store.save("people", "a", record("a", "Ada")).unwrap();
        store.save("people", "b", record("b", "Grace")).unwrap();
        store.save("people", "a", record("a", "Augusta")).unwrap();

        let reopened = FileStore::new(&path);
        let all = reopened.find_all("people").unwrap();
        assert_eq!(all, vec![record("a", "Augusta"), record("b", "Grace")]);
        assert_eq!(reopened.find("people", "b").unwrap(), Some(record("b", "Grace")));
    }

    #[test]
    fn save_stamps_the_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("people.json"));
        store
            .save("people", "x1", into_attributes(json!({ "firstName": "Ada" })).unwrap())
            .unwrap();
        assert_eq!(store.find("people", "x1").unwrap(), Some(record("x1", "Ada")));
    }

    #[test]
    fn destroy_removes_durably() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("people.json");
        let mut store = FileStore::new(&path);
        store.save("people", "a", record("a", "Ada")).unwrap();

        assert!(store.destroy("people", "a").unwrap());
        assert!(!store.destroy("people", "a").unwrap());
        assert!(FileStore::new(&path).find_all("people").unwrap().is_empty());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("people.json");
        fs::write(&path, "{ not json").unwrap();

        let err = FileStore::new(&path).find_all("people").unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn record_without_id_is_read_and_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("people.json");
        fs::write(
            &path,
            r#"{ "people": [ { "id": "a", "firstName": "Ada" }, { "firstName": "NoId" } ] }"#,
        )
        .unwrap();
        let no_id = into_attributes(json!({ "firstName": "NoId" })).unwrap();

        let mut store = FileStore::new(&path);
        assert_eq!(store.find_all("people").unwrap(), vec![record("a", "Ada"), no_id.clone()]);
        assert_eq!(store.find("people", "").unwrap(), None);

        store.save("people", "b", record("b", "Grace")).unwrap();
        assert!(store.destroy("people", "a").unwrap());
        assert_eq!(
            FileStore::new(&path).find_all("people").unwrap(),
            vec![no_id, record("b", "Grace")]
        );
    }
}
