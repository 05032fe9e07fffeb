// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The ordered collection of every user's transactions.
//!
//! New entries are prepended, so ledger order is newest insertion first
//! regardless of each entry's `date`. Each mutation rewrites the whole
//! collection under [`TRANSACTIONS_KEY`]; this is fine for a single user's
//! hundreds to low thousands of rows but grows linearly with history.

use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::models::{NewTransaction, Transaction, TransactionPatch, TransactionType};
use crate::store::{Store, TRANSACTIONS_KEY};
use crate::utils::{new_id, today};

/// Amounts are persisted as JSON numbers, so accepted values stay within the
/// range an `f64` reproduces exactly: under 10^13 with cent precision.
pub const MAX_AMOUNT: i64 = 10_000_000_000_000;
pub const AMOUNT_SCALE: u32 = 2;

pub struct Ledger {
    store: Store,
    transactions: Vec<Transaction>,
}

impl Ledger {
    /// Loads the stored collection, starting empty if it is missing or unreadable.
    pub fn load(store: Store) -> Self {
        let mut transactions: Vec<Transaction> = store.read(TRANSACTIONS_KEY);
        // Older data stored expenses as negative amounts.
        for tx in &mut transactions {
            tx.amount = tx.amount.abs();
        }
        tracing::debug!(count = transactions.len(), "loaded ledger");
        Self {
            store,
            transactions,
        }
    }

    pub fn add(&mut self, new: NewTransaction) -> Result<Transaction> {
        validate_amount(new.amount)?;
        validate_description(&new.description)?;
        validate_category(new.kind, &new.category)?;

        let tx = Transaction {
            id: new_id("transaction"),
            kind: new.kind,
            amount: new.amount.abs(),
            description: new.description,
            category: new.category,
            date: new.date.unwrap_or_else(today),
            user_id: new.user_id,
            account_id: new.account_id,
            account_name: new.account_name,
            status: new.status.unwrap_or_default(),
        };
        self.transactions.insert(0, tx.clone());
        self.persist();
        tracing::info!(id = %tx.id, kind = %tx.kind, "transaction added");
        Ok(tx)
    }

    /// Merges `patch` into the transaction with `id`. Unknown ids are ignored.
    ///
    /// Only the patched fields are validated, so legacy rows with categories
    /// outside the current set can still have their status or date changed.
    pub fn update(&mut self, id: &str, patch: TransactionPatch) -> Result<()> {
        let Some(pos) = self.transactions.iter().position(|t| t.id == id) else {
            tracing::debug!(id, "update ignored, transaction not found");
            return Ok(());
        };

        let mut updated = self.transactions[pos].clone();
        patch.apply_to(&mut updated);
        if patch.amount.is_some() {
            validate_amount(updated.amount)?;
        }
        if patch.description.is_some() {
            validate_description(&updated.description)?;
        }
        if patch.category.is_some() || patch.kind.is_some() {
            validate_category(updated.kind, &updated.category)?;
        }

        self.transactions[pos] = updated;
        self.persist();
        tracing::info!(id, "transaction updated");
        Ok(())
    }

    /// Removes the transaction with `id`; deleting twice is the same as once.
    pub fn delete(&mut self, id: &str) {
        let before = self.transactions.len();
        self.transactions.retain(|t| t.id != id);
        if self.transactions.len() == before {
            tracing::debug!(id, "delete ignored, transaction not found");
            return;
        }
        self.persist();
        tracing::info!(id, "transaction deleted");
    }

    /// The user's transactions in ledger order.
    pub fn by_user(&self, user_id: &str) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|t| t.belongs_to(user_id))
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    fn persist(&self) {
        // The in-memory copy stays authoritative for this session if the write fails.
        if let Err(e) = self.store.write(TRANSACTIONS_KEY, &self.transactions) {
            tracing::error!(error = %e, "failed to persist transactions");
        }
    }
}

fn validate_amount(amount: Decimal) -> Result<()> {
    if amount.abs() >= Decimal::from(MAX_AMOUNT) {
        return Err(Error::validation(format!(
            "Amount must be below {}",
            MAX_AMOUNT
        )));
    }
    if amount.normalize().scale() > AMOUNT_SCALE {
        return Err(Error::validation(format!(
            "Amount can have at most {} decimal places",
            AMOUNT_SCALE
        )));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<()> {
    if description.trim().is_empty() {
        return Err(Error::validation("Description is required"));
    }
    Ok(())
}

fn validate_category(kind: TransactionType, category: &str) -> Result<()> {
    if category.trim().is_empty() {
        return Err(Error::validation("Category is required"));
    }
    if !kind.allows_category(category) {
        return Err(Error::validation(format!(
            "Category '{}' is not valid for {} transactions, expected one of: {}",
            category,
            kind,
            kind.categories().join(", ")
        )));
    }
    Ok(())
}
