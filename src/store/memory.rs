use crate::model::Attributes;
use crate::store::{Rows, Store, StoreError, find, remove, upsert};

use std::collections::BTreeMap;

/// In-process store. Contents live as long as the value does.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    namespaces: BTreeMap<String, Rows>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self, namespace: &str) -> usize {
        self.namespaces.get(namespace).map(Vec::len).unwrap_or(0)
    }
}

impl Store for MemoryStore {
    fn find_all(&self, namespace: &str) -> Result<Vec<Attributes>, StoreError> {
        Ok(self
            .namespaces
            .get(namespace)
            .map(|rows| rows.iter().map(|(_, r)| r.clone()).collect())
            .unwrap_or_default())
    }

    fn find(&self, namespace: &str, id: &str) -> Result<Option<Attributes>, StoreError> {
        Ok(self
            .namespaces
            .get(namespace)
            .and_then(|rows| find(rows, id))
            .cloned())
    }

    fn save(&mut self, namespace: &str, id: &str, record: Attributes) -> Result<(), StoreError> {
        upsert(
            self.namespaces.entry(namespace.to_string()).or_default(),
            id,
            record,
        );
        Ok(())
    }

    fn destroy(&mut self, namespace: &str, id: &str) -> Result<bool, StoreError> {
        Ok(self
            .namespaces
            .get_mut(namespace)
            .map(|rows| remove(rows, id))
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::into_attributes;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn save_replaces_in_place() {
        let mut store = MemoryStore::new();
        store.save("people", "a", into_attributes(json!({ "id": "a", "n": 1 })).unwrap()).unwrap();
        store.save("people", "b", into_attributes(json!({ "id": "b" })).unwrap()).unwrap();
        store.save("people", "a", into_attributes(json!({ "id": "a", "n": 2 })).unwrap()).unwrap();

        let all = store.find_all("people").unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].get("n"), Some(&json!(2)));
        assert_eq!(all[1].get("id"), Some(&json!("b")));
    }

    #[test]
    fn namespaces_are_isolated() {
        let mut store = MemoryStore::new();
        store.save("people", "a", Attributes::new()).unwrap();
        assert_eq!(store.len("people"), 1);
        assert_eq!(store.len("pets"), 0);
        assert_eq!(store.find("pets", "a").unwrap(), None);
    }

    #[test]
    fn destroy_reports_whether_a_record_existed() {
        let mut store = MemoryStore::new();
        store.save("people", "a", Attributes::new()).unwrap();
        assert!(store.destroy("people", "a").unwrap());
        assert!(!store.destroy("people", "a").unwrap());
        assert!(!store.destroy("other", "a").unwrap());
    }
}
