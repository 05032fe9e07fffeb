// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Wires the store, session and ledger together for one command invocation.

use anyhow::Result;

use crate::config::{AppConfig, RemoteConfig, resolve_remote};
use crate::db;
use crate::error::Error;
use crate::ledger::Ledger;
use crate::models::{Transaction, User};
use crate::registry::AccountRegistry;
use crate::session::SessionContext;
use crate::store::{SqliteStore, Store};

pub struct App {
    pub store: Store,
    pub session: SessionContext,
    pub ledger: Ledger,
}

impl App {
    /// Builds the context over `store`, restoring any saved session.
    pub fn new(store: Store, env_remote: Option<&RemoteConfig>) -> Self {
        let remote = resolve_remote(&store, env_remote);
        let mut session = SessionContext::new(store.clone()).with_remote_config(remote);
        session.init();
        let ledger = Ledger::load(store.clone());
        Self {
            store,
            session,
            ledger,
        }
    }

    pub fn open(config: &AppConfig) -> Result<Self> {
        let conn = db::open(&config.db_path)?;
        let store = Store::new(SqliteStore::new(conn));
        Ok(Self::new(store, config.remote_override.as_ref()))
    }

    pub fn user(&self) -> Result<&User, Error> {
        self.session.require_user()
    }

    pub fn user_id(&self) -> Result<String, Error> {
        Ok(self.user()?.id.clone())
    }

    /// The signed-in user's accounts.
    pub fn registry(&self) -> Result<AccountRegistry, Error> {
        Ok(AccountRegistry::load(self.store.clone(), &self.user_id()?))
    }

    /// The signed-in user's transactions in ledger order.
    pub fn user_transactions(&self) -> Result<Vec<Transaction>, Error> {
        Ok(self.ledger.by_user(&self.user_id()?))
    }

    pub fn close(mut self) {
        self.session.teardown();
    }
}
