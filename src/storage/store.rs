use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use crate::calendar::Appointment;

pub const STORAGE_KEY: &str = "termine_save_key";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Durable persistence of the whole appointment collection.
#[cfg_attr(test, automock)]
pub trait Store {
    fn save(&self, appointments: &[Appointment]) -> Result<(), StoreError>;

    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Vec<Appointment>>, StoreError>;
}

/// Key-value table in SQLite; the collection is one JSON document under [`STORAGE_KEY`].
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let store = Self::new(Connection::open(path)?);
        store.initialize()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let store = Self::new(Connection::open_in_memory()?);
        store.initialize()?;
        Ok(store)
    }

    pub fn initialize(&self) -> Result<(), StoreError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    fn write_value(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            rusqlite::params![key, value],
        )?;
        Ok(())
    }

    fn read_value(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    #[cfg(test)]
    fn table_exists(&self, table_name: &str) -> bool {
        let result: rusqlite::Result<i32> = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [table_name],
            |row| row.get(0),
        );
        result.unwrap_or(0) > 0
    }
}

impl Store for SqliteStore {
    fn save(&self, appointments: &[Appointment]) -> Result<(), StoreError> {
        let data = serde_json::to_string(appointments)?;
        self.write_value(STORAGE_KEY, &data)?;
        tracing::debug!("Saved {} appointments", appointments.len());
        Ok(())
    }

    fn load(&self) -> Result<Option<Vec<Appointment>>, StoreError> {
        match self.read_value(STORAGE_KEY)? {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }
}
