use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde_json::{Map, Value};

use mandala_types::{Document, Revision, UserId};

use crate::{DocumentStore, StoreError, merge_for_save};

/// In-process store. The revision check and the write happen under one lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<UserId, Map<String, Value>>>,
}

impl MemoryStore {
    /// Seed a raw stored document, as another writer would have left it.
    pub fn insert_raw(&self, user: UserId, raw: Map<String, Value>) {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user, raw);
    }

    #[must_use]
    pub fn raw(&self, user: &UserId) -> Option<Map<String, Value>> {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(user)
            .cloned()
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self, user: &UserId) -> Result<Option<Document>, StoreError> {
        let Some(raw) = self.raw(user) else {
            return Ok(None);
        };
        Document::hydrate(Value::Object(raw))
            .map(Some)
            .map_err(|source| StoreError::Parse {
                path: format!("memory:{user}").into(),
                source,
            })
    }

    fn save(&self, user: &UserId, document: &Document) -> Result<Revision, StoreError> {
        let mut documents = self.documents.lock().unwrap_or_else(PoisonError::into_inner);
        let (merged, revision) = merge_for_save(user, documents.get(user).cloned(), document)?;
        documents.insert(user.clone(), merged);
        Ok(revision)
    }
}
