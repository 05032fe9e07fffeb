// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Compound filtering, sorting and row selection for the transactions table.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::ledger::Ledger;
use crate::models::{Transaction, TransactionStatus, TransactionType};

/// Sentinel label meaning "do not filter on this field".
pub const ALL: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter<T> {
    All,
    Only(T),
}

impl<T> Default for Filter<T> {
    fn default() -> Self {
        Filter::All
    }
}

impl<T: PartialEq> Filter<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(expected) => expected == value,
        }
    }

    /// A missing value only passes the `All` filter.
    pub fn matches_opt(&self, value: Option<&T>) -> bool {
        match (self, value) {
            (Filter::All, _) => true,
            (Filter::Only(expected), Some(v)) => expected == v,
            (Filter::Only(_), None) => false,
        }
    }
}

impl<T> Filter<T> {
    /// Parses a label, treating the [`ALL`] sentinel (and an empty label) as no filter.
    pub fn parse(label: &str) -> Result<Self>
    where
        T: FromStr<Err = Error>,
    {
        let label = label.trim();
        if label.is_empty() || label.eq_ignore_ascii_case(ALL) {
            return Ok(Filter::All);
        }
        Ok(Filter::Only(label.parse()?))
    }
}

impl Filter<String> {
    /// Free-text filter for categories and account names, with the same sentinel rules.
    pub fn text(label: &str) -> Self {
        let label = label.trim();
        if label.is_empty() || label.eq_ignore_ascii_case(ALL) {
            Filter::All
        } else {
            Filter::Only(label.to_string())
        }
    }
}

/// Filters combined with logical AND. Every field defaults to pass-through.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    pub search: String,
    pub category: Filter<String>,
    pub kind: Filter<TransactionType>,
    pub account: Filter<String>,
    pub status: Filter<TransactionStatus>,
}

impl Filters {
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Filter::Only(category.into());
        self
    }

    pub fn kind(mut self, kind: TransactionType) -> Self {
        self.kind = Filter::Only(kind);
        self
    }

    pub fn account(mut self, account_name: impl Into<String>) -> Self {
        self.account = Filter::Only(account_name.into());
        self
    }

    pub fn status(mut self, status: TransactionStatus) -> Self {
        self.status = Filter::Only(status);
        self
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        self.matches_search(tx)
            && self.category.matches(&tx.category)
            && self.kind.matches(&tx.kind)
            && self.account.matches_opt(tx.account_name.as_ref())
            && self.status.matches(&tx.status)
    }

    fn matches_search(&self, tx: &Transaction) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        tx.description.to_lowercase().contains(&needle)
            || tx.category.to_lowercase().contains(&needle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Date,
    Amount,
    Category,
    Description,
}

impl FromStr for SortField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date" => Ok(SortField::Date),
            "amount" => Ok(SortField::Amount),
            "category" => Ok(SortField::Category),
            "description" => Ok(SortField::Description),
            other => Err(Error::validation(format!(
                "Invalid sort field '{}', expected date|amount|category|description",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            field: SortField::Date,
            direction: SortDirection::Desc,
        }
    }
}

impl Sort {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Choosing the active field flips the direction; a new field starts descending.
    pub fn toggle(&mut self, field: SortField) {
        if self.field == field {
            self.direction = self.direction.flipped();
        } else {
            self.field = field;
            self.direction = SortDirection::Desc;
        }
    }

    fn compare(&self, a: &Transaction, b: &Transaction) -> Ordering {
        let ord = match self.field {
            SortField::Date => a.date.cmp(&b.date),
            SortField::Amount => a.magnitude().cmp(&b.magnitude()),
            SortField::Category => a.category.cmp(&b.category),
            SortField::Description => a.description.cmp(&b.description),
        };
        match self.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

/// Stable sort: rows with equal keys keep their ledger order in both directions.
pub fn sort(transactions: &mut [Transaction], sort: Sort) {
    transactions.sort_by(|a, b| sort.compare(a, b));
}

pub fn apply(transactions: &[Transaction], filters: &Filters, order: Sort) -> Vec<Transaction> {
    let mut visible: Vec<Transaction> = transactions
        .iter()
        .filter(|t| filters.matches(t))
        .cloned()
        .collect();
    sort(&mut visible, order);
    visible
}

/// Ids picked for bulk actions, in the order they were picked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<String>,
}

impl Selection {
    pub fn toggle(&mut self, id: &str) {
        if let Some(pos) = self.ids.iter().position(|s| s == id) {
            self.ids.remove(pos);
        } else {
            self.ids.push(id.to_string());
        }
    }

    /// Selects exactly the visible rows, or clears if they are all selected already.
    pub fn select_all(&mut self, visible: &[Transaction]) {
        if visible.iter().all(|t| self.contains(&t.id)) {
            self.clear();
        } else {
            self.ids = visible.iter().map(|t| t.id.clone()).collect();
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|s| s == id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Deletes every selected id from the ledger, then clears the selection.
    pub fn delete_selected(&mut self, ledger: &mut Ledger) -> usize {
        let count = self.ids.len();
        for id in &self.ids {
            ledger.delete(id);
        }
        self.clear();
        count
    }
}

/// Everything the transactions table needs besides the rows themselves.
/// Lives for one session only.
#[derive(Debug, Clone, Default)]
pub struct TableState {
    pub filters: Filters,
    pub sort: Sort,
    pub selection: Selection,
}

impl TableState {
    pub fn visible(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        apply(transactions, &self.filters, self.sort)
    }

    pub fn select_all_visible(&mut self, transactions: &[Transaction]) {
        let visible = self.visible(transactions);
        self.selection.select_all(&visible);
    }
}
