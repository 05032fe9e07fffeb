// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! One user's accounts and cards, stored under `accounts_<userId>`.
//!
//! Accounts are independent of transactions: deleting an account leaves the
//! transactions that referenced it, and their copied account names, in place.

use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::models::{Account, AccountInput, AccountType};
use crate::store::{ACCOUNTS_NAMESPACE, Store, storage_key};
use crate::utils::new_id;

pub struct AccountRegistry {
    store: Store,
    user_id: String,
    accounts: Vec<Account>,
}

impl AccountRegistry {
    pub fn load(store: Store, user_id: &str) -> Self {
        let accounts: Vec<Account> = store.read(&storage_key(ACCOUNTS_NAMESPACE, Some(user_id)));
        tracing::debug!(user_id, count = accounts.len(), "loaded accounts");
        Self {
            store,
            user_id: user_id.to_string(),
            accounts,
        }
    }

    pub fn add(&mut self, input: AccountInput) -> Result<Account> {
        let account = build_account(new_id("account"), &self.user_id, input)?;
        self.accounts.push(account.clone());
        self.persist();
        tracing::info!(id = %account.id, "account added");
        Ok(account)
    }

    /// Replaces the account with `id` wholesale. Unknown ids are ignored.
    pub fn update(&mut self, id: &str, input: AccountInput) -> Result<()> {
        let account = build_account(id.to_string(), &self.user_id, input)?;
        let Some(slot) = self.accounts.iter_mut().find(|a| a.id == id) else {
            tracing::debug!(id, "update ignored, account not found");
            return Ok(());
        };
        *slot = account;
        self.persist();
        tracing::info!(id, "account updated");
        Ok(())
    }

    pub fn delete(&mut self, id: &str) {
        let before = self.accounts.len();
        self.accounts.retain(|a| a.id != id);
        if self.accounts.len() == before {
            tracing::debug!(id, "delete ignored, account not found");
            return;
        }
        self.persist();
        tracing::info!(id, "account deleted");
    }

    pub fn list_by_user(&self) -> Vec<Account> {
        self.accounts
            .iter()
            .filter(|a| a.user_id == self.user_id)
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.name == name)
    }

    /// Looks an account up by id first, then by name.
    pub fn resolve(&self, id_or_name: &str) -> Option<&Account> {
        self.get(id_or_name)
            .or_else(|| self.find_by_name(id_or_name))
    }

    fn persist(&self) {
        let key = storage_key(ACCOUNTS_NAMESPACE, Some(&self.user_id));
        if let Err(e) = self.store.write(&key, &self.accounts) {
            tracing::error!(key, error = %e, "failed to persist accounts");
        }
    }
}

/// Parses a user-entered balance. Empty or unparsable text becomes zero.
pub fn parse_balance(text: &str) -> Decimal {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Decimal::ZERO;
    }
    trimmed
        .parse::<Decimal>()
        .or_else(|_| trimmed.replace(',', ".").parse::<Decimal>())
        .unwrap_or(Decimal::ZERO)
}

fn build_account(id: String, user_id: &str, input: AccountInput) -> Result<Account> {
    let name = input.name.trim();
    let bank = input.bank.trim();
    if name.is_empty() || input.kind.trim().is_empty() || bank.is_empty() {
        return Err(Error::validation(
            "Please fill in all required fields: name, type and bank",
        ));
    }
    let kind: AccountType = input.kind.parse()?;

    let card_field = |v: Option<String>| {
        v.map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && kind.is_card())
    };

    Ok(Account {
        id,
        name: name.to_string(),
        kind,
        bank: bank.to_string(),
        brand: card_field(input.brand),
        issuer: card_field(input.issuer),
        balance: parse_balance(&input.balance),
        user_id: user_id.to_string(),
    })
}
