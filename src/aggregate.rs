// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Derived views over a user's transactions: summary cards, the recent list,
//! category slices and month-by-month history.
//!
//! Everything here is a pure function of its input and is recomputed on
//! demand; nothing is cached.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Transaction, TransactionType};

/// Number of rows shown in the dashboard's recent list.
pub const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub net_balance: Decimal,
    pub income_count: usize,
    pub expense_count: usize,
}

/// Sums magnitudes per type, so both totals are non-negative whatever sign
/// the amounts were stored with. Totals saturate at the `Decimal` range.
pub fn summarize(transactions: &[Transaction]) -> Summary {
    let mut s = Summary::default();
    for tx in transactions {
        match tx.kind {
            TransactionType::Income => {
                s.total_income = s.total_income.saturating_add(tx.magnitude());
                s.income_count += 1;
            }
            TransactionType::Expense => {
                s.total_expense = s.total_expense.saturating_add(tx.magnitude());
                s.expense_count += 1;
            }
        }
    }
    s.net_balance = s.total_income.saturating_sub(s.total_expense);
    s
}

/// The first `n` rows in ledger order (newest insertion first), not re-sorted by date.
pub fn recent(transactions: &[Transaction], n: usize) -> &[Transaction] {
    &transactions[..n.min(transactions.len())]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySlice {
    pub category: String,
    pub total: Decimal,
    /// Share of the type's total, rounded to one decimal place.
    pub percentage: Decimal,
}

/// Per-category totals for one transaction type, largest first.
pub fn category_breakdown(transactions: &[Transaction], kind: TransactionType) -> Vec<CategorySlice> {
    let mut totals: BTreeMap<&str, Decimal> = BTreeMap::new();
    for tx in transactions.iter().filter(|t| t.kind == kind) {
        let total = totals.entry(tx.category.as_str()).or_insert(Decimal::ZERO);
        *total = total.saturating_add(tx.magnitude());
    }
    let grand = totals
        .values()
        .fold(Decimal::ZERO, |acc, t| acc.saturating_add(*t));

    let mut slices: Vec<CategorySlice> = totals
        .into_iter()
        .map(|(category, total)| CategorySlice {
            category: category.to_string(),
            total,
            percentage: if grand.is_zero() {
                Decimal::ZERO
            } else {
                (total / grand * Decimal::ONE_HUNDRED).round_dp(1)
            },
        })
        .collect();
    // BTreeMap iteration already orders by name, and the sort is stable.
    slices.sort_by(|a, b| b.total.cmp(&a.total));
    slices
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotals {
    /// `YYYY-MM`
    pub month: String,
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

/// Income, expense and balance per calendar month, newest month first,
/// limited to the latest `months` months that have activity.
pub fn monthly_history(transactions: &[Transaction], months: usize) -> Vec<MonthlyTotals> {
    let mut by_month: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    for tx in transactions {
        let entry = by_month
            .entry(tx.date.format("%Y-%m").to_string())
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        match tx.kind {
            TransactionType::Income => entry.0 = entry.0.saturating_add(tx.magnitude()),
            TransactionType::Expense => entry.1 = entry.1.saturating_add(tx.magnitude()),
        }
    }
    by_month
        .into_iter()
        .rev()
        .take(months)
        .map(|(month, (income, expense))| MonthlyTotals {
            month,
            income,
            expense,
            balance: income.saturating_sub(expense),
        })
        .collect()
}
