//! Session attribute persistence
//!
//! Keeps a user's session attributes between stateless invocations. Records
//! are keyed by user id; the last write wins.

mod memory;
mod sqlite;

pub use memory::MemoryAttributeStore;
pub use sqlite::SqliteAttributeStore;

use crate::envelope::Attributes;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Default cap on serialized attribute size, in bytes
pub const DEFAULT_MAX_JSON_BYTES: usize = 1_024_000;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("json limit is {limit}. Attempted: {actual}")]
    TooLarge { limit: usize, actual: usize },
    #[error("Invalid table name: {0}")]
    InvalidTableName(String),
    #[error("Table does not exist: {0}")]
    TableMissing(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A persisted attribute record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAttributes {
    pub user_id: String,
    /// Session that wrote the record; a mismatch on read marks it stale
    pub session_id: String,
    pub attributes: Attributes,
    pub updated_at: DateTime<Utc>,
}

/// Key-value storage for session attributes
#[async_trait]
pub trait AttributeStore: Send + Sync {
    /// Record for `user_id`, or `None` on a miss
    async fn get(&self, user_id: &str) -> StoreResult<Option<StoredAttributes>>;

    /// Overwrite the record for `user_id`
    async fn save(
        &self,
        user_id: &str,
        session_id: &str,
        attributes: &Attributes,
    ) -> StoreResult<()>;

    /// Whether the backing table exists
    async fn exists(&self) -> StoreResult<bool>;

    /// Name of the backing table
    fn table_name(&self) -> &str;
}

#[async_trait]
impl<T: AttributeStore + ?Sized> AttributeStore for Arc<T> {
    async fn get(&self, user_id: &str) -> StoreResult<Option<StoredAttributes>> {
        (**self).get(user_id).await
    }

    async fn save(
        &self,
        user_id: &str,
        session_id: &str,
        attributes: &Attributes,
    ) -> StoreResult<()> {
        (**self).save(user_id, session_id, attributes).await
    }

    async fn exists(&self) -> StoreResult<bool> {
        (**self).exists().await
    }

    fn table_name(&self) -> &str {
        (**self).table_name()
    }
}

/// Serialize attributes, enforcing the size cap
pub(crate) fn encode_attributes(attributes: &Attributes, max_json_bytes: usize) -> StoreResult<String> {
    let json = serde_json::to_string(attributes)?;
    if json.len() > max_json_bytes {
        return Err(StoreError::TooLarge {
            limit: max_json_bytes,
            actual: json.len(),
        });
    }
    Ok(json)
}
