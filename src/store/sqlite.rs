//! SQLite-backed attribute store

use super::{
    encode_attributes, AttributeStore, StoreError, StoreResult, StoredAttributes,
    DEFAULT_MAX_JSON_BYTES,
};
use crate::envelope::Attributes;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, LazyLock, Mutex};

static TABLE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,63}$").expect("valid regex"));

/// Thread-safe attribute table handle.
///
/// One row per user: `user_id` is the partition key.
#[derive(Clone)]
pub struct SqliteAttributeStore {
    conn: Arc<Mutex<Connection>>,
    table: String,
    max_json_bytes: usize,
}

impl SqliteAttributeStore {
    /// Open or create the database, creating the table if missing
    pub fn open<P: AsRef<Path>>(path: P, table: &str) -> StoreResult<Self> {
        let store = Self::from_connection(Connection::open(path)?, table)?;
        store.create_table()?;
        Ok(store)
    }

    /// Open an existing database whose table must already exist
    pub fn attach<P: AsRef<Path>>(path: P, table: &str) -> StoreResult<Self> {
        let store = Self::from_connection(Connection::open(path)?, table)?;
        if !store.table_exists()? {
            return Err(StoreError::TableMissing(table.to_string()));
        }
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory(table: &str) -> StoreResult<Self> {
        let store = Self::from_connection(Connection::open_in_memory()?, table)?;
        store.create_table()?;
        Ok(store)
    }

    #[must_use]
    pub fn with_max_json_bytes(mut self, max_json_bytes: usize) -> Self {
        self.max_json_bytes = max_json_bytes;
        self
    }

    fn from_connection(conn: Connection, table: &str) -> StoreResult<Self> {
        // The name is interpolated into SQL, so only plain identifiers pass
        if !TABLE_NAME.is_match(table) {
            return Err(StoreError::InvalidTableName(table.to_string()));
        }
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            table: table.to_string(),
            max_json_bytes: DEFAULT_MAX_JSON_BYTES,
        })
    }

    fn create_table(&self) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                user_id TEXT PRIMARY KEY,
                session_id TEXT NOT NULL,
                session_attributes TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );",
            table = self.table
        ))?;
        Ok(())
    }

    fn table_exists(&self) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
            params![self.table],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn get_record(&self, user_id: &str) -> StoreResult<Option<StoredAttributes>> {
        let conn = self.conn.lock().unwrap();
        let row: Option<(String, String, String)> = conn
            .query_row(
                &format!(
                    "SELECT session_id, session_attributes, updated_at FROM {} WHERE user_id = ?1",
                    self.table
                ),
                params![user_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let Some((session_id, json, updated_at)) = row else {
            return Ok(None);
        };

        Ok(Some(StoredAttributes {
            user_id: user_id.to_string(),
            session_id,
            attributes: serde_json::from_str(&json)?,
            updated_at: parse_datetime(&updated_at),
        }))
    }

    fn put_record(&self, user_id: &str, session_id: &str, attributes: &Attributes) -> StoreResult<()> {
        let json = encode_attributes(attributes, self.max_json_bytes)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO {} (user_id, session_id, session_attributes, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(user_id) DO UPDATE SET
                    session_id = excluded.session_id,
                    session_attributes = excluded.session_attributes,
                    updated_at = excluded.updated_at",
                self.table
            ),
            params![user_id, session_id, json, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

#[async_trait]
impl AttributeStore for SqliteAttributeStore {
    async fn get(&self, user_id: &str) -> StoreResult<Option<StoredAttributes>> {
        let record = self.get_record(user_id);
        match &record {
            Ok(found) => tracing::debug!(
                table = %self.table,
                user_id = %user_id,
                hit = found.is_some(),
                "Get complete"
            ),
            Err(e) => tracing::debug!(table = %self.table, error = %e, "Attribute get failed"),
        }
        record
    }

    async fn save(
        &self,
        user_id: &str,
        session_id: &str,
        attributes: &Attributes,
    ) -> StoreResult<()> {
        let result = self.put_record(user_id, session_id, attributes);
        match &result {
            Ok(()) => tracing::debug!(table = %self.table, user_id = %user_id, "Save complete"),
            Err(e) => tracing::debug!(table = %self.table, error = %e, "Attribute save failed"),
        }
        result
    }

    async fn exists(&self) -> StoreResult<bool> {
        self.table_exists()
    }

    fn table_name(&self) -> &str {
        &self.table
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}
