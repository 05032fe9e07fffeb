// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::utils::deserialize_date;

pub const INCOME_CATEGORIES: [&str; 4] = ["Salário", "Freelance", "Investimentos", "Outros"];
pub const EXPENSE_CATEGORIES: [&str; 6] = [
    "Alimentação",
    "Transporte",
    "Moradia",
    "Saúde",
    "Lazer",
    "Outros",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// Localized label shown in tables and accepted by filters.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Income => "receita",
            TransactionType::Expense => "despesa",
        }
    }

    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            TransactionType::Income => &INCOME_CATEGORIES,
            TransactionType::Expense => &EXPENSE_CATEGORIES,
        }
    }

    pub fn allows_category(&self, category: &str) -> bool {
        self.categories().contains(&category)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "receita" => Ok(TransactionType::Income),
            "expense" | "despesa" => Ok(TransactionType::Expense),
            other => Err(Error::validation(format!(
                "Invalid transaction type '{}', expected income|expense",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    #[default]
    Confirmado,
    Pendente,
    Cancelado,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Confirmado => "confirmado",
            TransactionStatus::Pendente => "pendente",
            TransactionStatus::Cancelado => "cancelado",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "confirmado" => Ok(TransactionStatus::Confirmado),
            "pendente" => Ok(TransactionStatus::Pendente),
            "cancelado" => Ok(TransactionStatus::Cancelado),
            other => Err(Error::validation(format!(
                "Invalid status '{}', expected confirmado|pendente|cancelado",
                other
            ))),
        }
    }
}

/// A single income or expense entry.
///
/// `amount` always holds a non-negative magnitude; the sign shown to users is
/// derived from `kind`. `account_name` is a copy of the account's name taken
/// when the account was attached, not a live reference: renaming or deleting
/// the account leaves it untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    #[serde(deserialize_with = "deserialize_date")]
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    #[serde(default)]
    pub status: TransactionStatus,
}

impl Transaction {
    pub fn magnitude(&self) -> Decimal {
        self.amount.abs()
    }

    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionType::Income => self.magnitude(),
            TransactionType::Expense => -self.magnitude(),
        }
    }

    pub fn belongs_to(&self, user_id: &str) -> bool {
        self.user_id.as_deref() == Some(user_id)
    }
}

/// Input for [`crate::ledger::Ledger::add`]; the ledger assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub kind: TransactionType,
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    pub date: Option<NaiveDate>,
    pub user_id: Option<String>,
    pub account_id: Option<String>,
    pub account_name: Option<String>,
    pub status: Option<TransactionStatus>,
}

impl NewTransaction {
    pub fn new(
        kind: TransactionType,
        amount: Decimal,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            amount,
            description: description.into(),
            category: category.into(),
            date: None,
            user_id: None,
            account_id: None,
            account_name: None,
            status: None,
        }
    }

    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_account(mut self, account: &Account) -> Self {
        self.account_id = Some(account.id.clone());
        self.account_name = Some(account.name.clone());
        self
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub kind: Option<TransactionType>,
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
    pub account_id: Option<String>,
    pub account_name: Option<String>,
    pub status: Option<TransactionStatus>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        *self == TransactionPatch::default()
    }

    pub fn apply_to(&self, tx: &mut Transaction) {
        if let Some(kind) = self.kind {
            tx.kind = kind;
        }
        if let Some(amount) = self.amount {
            tx.amount = amount.abs();
        }
        if let Some(description) = &self.description {
            tx.description = description.clone();
        }
        if let Some(category) = &self.category {
            tx.category = category.clone();
        }
        if let Some(date) = self.date {
            tx.date = date;
        }
        if let Some(account_id) = &self.account_id {
            tx.account_id = Some(account_id.clone());
        }
        if let Some(account_name) = &self.account_name {
            tx.account_name = Some(account_name.clone());
        }
        if let Some(status) = self.status {
            tx.status = status;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Checking,
    Savings,
    CreditCard,
    DebitCard,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Checking => "checking",
            AccountType::Savings => "savings",
            AccountType::CreditCard => "credit_card",
            AccountType::DebitCard => "debit_card",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AccountType::Checking => "Conta Corrente",
            AccountType::Savings => "Conta Poupança",
            AccountType::CreditCard => "Cartão de Crédito",
            AccountType::DebitCard => "Cartão de Débito",
        }
    }

    pub fn is_card(&self) -> bool {
        matches!(self, AccountType::CreditCard | AccountType::DebitCard)
    }
}

impl FromStr for AccountType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "checking" => Ok(AccountType::Checking),
            "savings" => Ok(AccountType::Savings),
            "credit_card" => Ok(AccountType::CreditCard),
            "debit_card" => Ok(AccountType::DebitCard),
            "" => Err(Error::validation("Account type is required")),
            other => Err(Error::validation(format!(
                "Invalid account type '{}', expected checking|savings|credit_card|debit_card",
                other
            ))),
        }
    }
}

/// A bank account or card owned by one user.
///
/// `brand` and `issuer` are only ever set for card accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AccountType,
    pub bank: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    pub user_id: String,
}

impl Account {
    /// One-line summary such as `Nubank · Mastercard · Nubank` for cards or
    /// `Itaú` for bank accounts.
    pub fn details(&self) -> String {
        let mut parts = vec![self.bank.clone()];
        if self.kind.is_card() {
            parts.extend(self.brand.iter().cloned());
            parts.extend(self.issuer.iter().cloned());
        }
        parts.join(" · ")
    }
}

/// Raw account form input, validated by the registry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountInput {
    pub name: String,
    pub kind: String,
    pub bank: String,
    pub brand: Option<String>,
    pub issuer: Option<String>,
    pub balance: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, rename = "created_at", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}
