//! In-process attribute store

use super::{
    encode_attributes, AttributeStore, StoreResult, StoredAttributes, DEFAULT_MAX_JSON_BYTES,
};
use crate::envelope::Attributes;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

/// Attribute store held in a `HashMap`. Nothing survives the process.
///
/// Applies the same size cap as the SQLite store and records every save so
/// callers can assert on write traffic.
pub struct MemoryAttributeStore {
    table: String,
    max_json_bytes: usize,
    records: Mutex<HashMap<String, StoredAttributes>>,
    saves: Mutex<Vec<StoredAttributes>>,
}

impl MemoryAttributeStore {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            max_json_bytes: DEFAULT_MAX_JSON_BYTES,
            records: Mutex::new(HashMap::new()),
            saves: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_max_json_bytes(mut self, max_json_bytes: usize) -> Self {
        self.max_json_bytes = max_json_bytes;
        self
    }

    /// Seed a record directly, bypassing the save log
    pub fn insert(&self, record: StoredAttributes) {
        self.records
            .lock()
            .unwrap()
            .insert(record.user_id.clone(), record);
    }

    /// Every successful save, oldest first
    pub fn saves(&self) -> Vec<StoredAttributes> {
        self.saves.lock().unwrap().clone()
    }
}

#[async_trait]
impl AttributeStore for MemoryAttributeStore {
    async fn get(&self, user_id: &str) -> StoreResult<Option<StoredAttributes>> {
        Ok(self.records.lock().unwrap().get(user_id).cloned())
    }

    async fn save(
        &self,
        user_id: &str,
        session_id: &str,
        attributes: &Attributes,
    ) -> StoreResult<()> {
        encode_attributes(attributes, self.max_json_bytes)?;
        let record = StoredAttributes {
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
            attributes: attributes.clone(),
            updated_at: Utc::now(),
        };
        self.records
            .lock()
            .unwrap()
            .insert(user_id.to_string(), record.clone());
        self.saves.lock().unwrap().push(record);
        Ok(())
    }

    async fn exists(&self) -> StoreResult<bool> {
        Ok(true)
    }

    fn table_name(&self) -> &str {
        &self.table
    }
}
