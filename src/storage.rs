//! Durable key-value storage backing the session.
//!
//! This plays the role a browser's local storage would: a flat string map
//! that survives restarts. The SQLite backend keeps it in a single table; the
//! in-memory backend is used for `--ephemeral` runs and tests.

use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Errors raised by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
  #[error("storage query failed: {0}")]
  Sqlite(#[from] rusqlite::Error),
  #[error("failed to create storage directory {}: {source}", path.display())]
  CreateDir {
    path: PathBuf,
    source: std::io::Error,
  },
  #[error("could not determine data directory")]
  NoDataDir,
  #[error("storage lock poisoned")]
  Poisoned,
}

/// A durable string-to-string map.
pub trait LocalStorage: Send + Sync {
  /// Get the value stored under `key`.
  fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

  /// Store `value` under `key`, replacing any previous value.
  fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

  /// Remove every key.
  fn clear(&self) -> Result<(), StorageError>;

  /// Store several items at once. Backends that support it do this atomically.
  fn set_items(&self, items: &[(&str, &str)]) -> Result<(), StorageError> {
    for (key, value) in items {
      self.set_item(key, value)?;
    }
    Ok(())
  }
}

/// Storage that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
  items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  fn items(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, StorageError> {
    self.items.lock().map_err(|_| StorageError::Poisoned)
  }
}

impl LocalStorage for MemoryStorage {
  fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
    Ok(self.items()?.get(key).cloned())
  }

  fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
    self.items()?.insert(key.to_string(), value.to_string());
    Ok(())
  }

  fn clear(&self) -> Result<(), StorageError> {
    self.items()?.clear();
    Ok(())
  }
}

/// SQLite-backed storage.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

/// Schema for the key-value table.
const STORAGE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS local_storage (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

impl SqliteStorage {
  /// Open or create the storage at the default location.
  pub fn open_default() -> Result<Self, StorageError> {
    Self::open(&Self::default_path()?)
  }

  /// Open or create the storage at `path`.
  pub fn open(path: &Path) -> Result<Self, StorageError> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).map_err(|source| StorageError::CreateDir {
        path: parent.to_path_buf(),
        source,
      })?;
    }

    let conn = Connection::open(path)?;
    Self::with_connection(conn)
  }

  /// Open a private in-memory database.
  #[cfg(test)]
  pub fn open_in_memory() -> Result<Self, StorageError> {
    Self::with_connection(Connection::open_in_memory()?)
  }

  fn with_connection(conn: Connection) -> Result<Self, StorageError> {
    conn.execute_batch(STORAGE_SCHEMA)?;
    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  /// Get the default database path.
  pub fn default_path() -> Result<PathBuf, StorageError> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or(StorageError::NoDataDir)?;

    Ok(data_dir.join("hrdesk").join("session.db"))
  }

  fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
    self.conn.lock().map_err(|_| StorageError::Poisoned)
  }
}

impl LocalStorage for SqliteStorage {
  fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
    let conn = self.conn()?;
    let value = conn
      .query_row(
        "SELECT value FROM local_storage WHERE key = ?",
        params![key],
        |row| row.get(0),
      )
      .optional()?;
    Ok(value)
  }

  fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
    self.set_items(&[(key, value)])
  }

  fn clear(&self) -> Result<(), StorageError> {
    let conn = self.conn()?;
    conn.execute("DELETE FROM local_storage", [])?;
    Ok(())
  }

  fn set_items(&self, items: &[(&str, &str)]) -> Result<(), StorageError> {
    let mut conn = self.conn()?;
    let tx = conn.transaction()?;
    for (key, value) in items {
      tx.execute(
        "INSERT OR REPLACE INTO local_storage (key, value, updated_at)
         VALUES (?, ?, datetime('now'))",
        params![key, value],
      )?;
    }
    tx.commit()?;
    Ok(())
  }
}
