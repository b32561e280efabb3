//! SQLite-backed key-value storage for usage totals.
//!
//! Values are stored as JSON text under the same keys the usage view reads,
//! so a `get` of several keys is a single query and a `set` is a single
//! transaction. WAL mode lets the CLI read while the daemon writes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tracing::warn;

use crate::config::{data_dir, UserConfig};
use crate::data::store::{KeyValueStore, Result};

const CURRENT_SCHEMA_VERSION: i32 = 1;
const DATABASE_NAME: &str = "usage.db";
const IN_MEMORY: &str = ":memory:";

pub struct UsageStore {
    conn: Connection,
    path: PathBuf,
}

impl UsageStore {
    /// Open or create the usage database in the data directory.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir().join(DATABASE_NAME))
    }

    /// Open the database at the configured override path, if any.
    pub fn open_configured(config: &UserConfig) -> Result<Self> {
        match config.database_path() {
            Some(path) => Self::open_at(&path),
            None => Self::open(),
        }
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;
             PRAGMA busy_timeout=5000;",
        )?;

        Self::with_connection(conn, path.to_path_buf())
    }

    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn, PathBuf::from(IN_MEMORY))
    }

    fn with_connection(conn: Connection, path: PathBuf) -> Result<Self> {
        let mut store = Self { conn, path };
        store.initialize_schema()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn initialize_schema(&mut self) -> Result<()> {
        if self.get_schema_version()? == 0 {
            self.create_initial_schema()?;
        }
        Ok(())
    }

    /// Current schema version (0 if not initialized)
    fn get_schema_version(&self) -> Result<i32> {
        let exists: bool = self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='schema_version'",
            [],
            |row| row.get(0),
        )?;

        if !exists {
            return Ok(0);
        }

        let version: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?
            .unwrap_or(0);

        Ok(version)
    }

    fn create_initial_schema(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;

        tx.execute_batch(
            r#"
            CREATE TABLE schema_version (
                version INTEGER NOT NULL
            );

            CREATE TABLE kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;

        tx.execute(
            "INSERT INTO schema_version (version) VALUES (?)",
            [CURRENT_SCHEMA_VERSION],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// A row that no longer parses as JSON reads as absent, so the next write
    /// replaces it instead of every read failing.
    fn read_value(&self, key: &str) -> Result<Option<Value>> {
        let raw: Option<String> = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()?;

        let Some(text) = raw else {
            return Ok(None);
        };

        match serde_json::from_str(&text) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key, error = %e, "Ignoring corrupt stored value");
                Ok(None)
            }
        }
    }
}

impl KeyValueStore for UsageStore {
    fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>> {
        let mut values = HashMap::with_capacity(keys.len());
        for key in keys {
            if let Some(value) = self.read_value(key)? {
                values.insert(key.to_string(), value);
            }
        }
        Ok(values)
    }

    fn set(&mut self, entries: Vec<(&str, Value)>) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let tx = self.conn.transaction()?;

        for (key, value) in entries {
            let text = serde_json::to_string(&value)?;
            tx.execute(
                "INSERT INTO kv (key, value, updated_at) VALUES (?, ?, ?)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at",
                params![key, text, now],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn size_bytes(&self) -> u64 {
        if self.path.to_string_lossy() == IN_MEMORY {
            return 0;
        }
        std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }
}
