// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Key-value persistence for JSON-encoded collections.
//!
//! Every collection lives under a single key and is rewritten in full on each
//! write. Reads are forgiving: a missing key yields the empty value and a
//! payload that no longer decodes is logged and treated as empty, so a
//! corrupted entry never prevents the application from starting.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// All users' transactions share this key; filtering by user happens in memory.
pub const TRANSACTIONS_KEY: &str = "simple-ledger-transactions";
/// Accounts are stored one key per user: `accounts_<userId>`.
pub const ACCOUNTS_NAMESPACE: &str = "accounts";
pub const CURRENT_USER_KEY: &str = "ledger_current_user";
pub const USERS_KEY: &str = "ledger_users";
pub const REMOTE_CONFIG_KEY: &str = "ledger_supabase_config";

/// Builds a storage identifier from a namespace and an optional scope.
pub fn storage_key(namespace: &str, scope: Option<&str>) -> String {
    match scope {
        Some(scope) => format!("{}_{}", namespace, scope),
        None => namespace.to_string(),
    }
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Keys and values kept in the `kv` table created by [`crate::db`].
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let v = self
            .conn
            .query_row("SELECT value FROM kv WHERE key=?1", params![key], |r| {
                r.get(0)
            })
            .optional()?;
        Ok(v)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv(key, value, updated_at) VALUES(?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value=excluded.value, updated_at=excluded.updated_at",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key=?1", params![key])?;
        Ok(())
    }
}

/// Process-local store, used by tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Stateless JSON façade over a [`KeyValueStore`]. Cloning is cheap and all
/// clones talk to the same backend.
#[derive(Clone)]
pub struct Store {
    kv: Rc<dyn KeyValueStore>,
}

impl Store {
    pub fn new(kv: impl KeyValueStore + 'static) -> Self {
        Self { kv: Rc::new(kv) }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::default())
    }

    pub fn get_raw(&self, key: &str) -> Result<Option<String>> {
        self.kv.get(key)
    }

    pub fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        self.kv.set(key, value)
    }

    /// Strict read: `Ok(None)` for a missing key, an error for a bad payload.
    pub fn try_read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.kv.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| Error::Deserialization {
                key: key.to_string(),
                source,
            })
    }

    /// Forgiving read used by the ledger, registry and session.
    pub fn read<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.try_read(key) {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(key, error = %e, "falling back to an empty value");
                T::default()
            }
        }
    }

    /// Replaces whatever is stored under `key`.
    pub fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.kv.set(key, &raw)?;
        tracing::trace!(key, bytes = raw.len(), "wrote value");
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.kv.remove(key)
    }
}
