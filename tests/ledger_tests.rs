// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use simple_ledger::Error;
use simple_ledger::ledger::{Ledger, MAX_AMOUNT};
use simple_ledger::models::{NewTransaction, TransactionPatch, TransactionStatus, TransactionType};
use simple_ledger::store::{Store, TRANSACTIONS_KEY};

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn groceries(user: &str) -> NewTransaction {
    NewTransaction::new(TransactionType::Expense, dec("320"), "Mercado", "Alimentação")
        .for_user(user)
        .on(day("2025-03-10"))
}

#[test]
fn add_then_by_user_preserves_fields() {
    let mut ledger = Ledger::load(Store::in_memory());
    let input = groceries("user_ana").with_status(TransactionStatus::Pendente);
    let tx = ledger.add(input).unwrap();

    let rows = ledger.by_user("user_ana");
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row, &tx);
    assert!(row.id.starts_with("transaction_"));
    assert_eq!(row.kind, TransactionType::Expense);
    assert_eq!(row.amount, dec("320"));
    assert_eq!(row.description, "Mercado");
    assert_eq!(row.category, "Alimentação");
    assert_eq!(row.date, day("2025-03-10"));
    assert_eq!(row.status, TransactionStatus::Pendente);
    assert!(ledger.by_user("user_bob").is_empty());
}

#[test]
fn add_defaults_status_and_stores_magnitude() {
    let mut ledger = Ledger::load(Store::in_memory());
    let tx = ledger
        .add(NewTransaction::new(TransactionType::Expense, dec("-45.90"), "Uber", "Transporte").for_user("u"))
        .unwrap();
    assert_eq!(tx.status, TransactionStatus::Confirmado);
    assert_eq!(tx.amount, dec("45.90"));
    assert_eq!(tx.signed_amount(), dec("-45.90"));
}

#[test]
fn new_entries_are_prepended() {
    let mut ledger = Ledger::load(Store::in_memory());
    let first = ledger.add(groceries("u")).unwrap();
    let second = ledger
        .add(NewTransaction::new(TransactionType::Income, dec("5500"), "Salário março", "Salário")
            .for_user("u")
            .on(day("2025-01-01")))
        .unwrap();
    let ids: Vec<String> = ledger.by_user("u").into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[test]
fn add_rejects_invalid_input_without_changes() {
    let mut ledger = Ledger::load(Store::in_memory());
    let blank = NewTransaction::new(TransactionType::Expense, dec("10"), "  ", "Alimentação");
    assert!(matches!(ledger.add(blank), Err(Error::Validation(_))));

    let wrong_category = NewTransaction::new(TransactionType::Income, dec("10"), "Pix", "Alimentação");
    let err = ledger.add(wrong_category).unwrap_err();
    assert!(err.to_string().contains("Alimentação"));
    assert!(ledger.is_empty());
}

#[test]
fn update_merges_only_patched_fields() {
    let mut ledger = Ledger::load(Store::in_memory());
    let tx = ledger.add(groceries("u")).unwrap();
    let patch = TransactionPatch {
        amount: Some(dec("-99.5")),
        status: Some(TransactionStatus::Cancelado),
        ..TransactionPatch::default()
    };
    ledger.update(&tx.id, patch).unwrap();

    let row = ledger.get(&tx.id).unwrap();
    assert_eq!(row.amount, dec("99.5"));
    assert_eq!(row.status, TransactionStatus::Cancelado);
    assert_eq!(row.description, "Mercado");
    assert_eq!(row.date, tx.date);
}

#[test]
fn update_rejects_invalid_patch_and_keeps_record() {
    let mut ledger = Ledger::load(Store::in_memory());
    let tx = ledger.add(groceries("u")).unwrap();
    let patch = TransactionPatch {
        kind: Some(TransactionType::Income),
        ..TransactionPatch::default()
    };
    assert!(ledger.update(&tx.id, patch).is_err());
    assert_eq!(ledger.get(&tx.id), Some(&tx));
}

#[test]
fn update_of_unknown_id_is_a_no_op() {
    let mut ledger = Ledger::load(Store::in_memory());
    ledger.add(groceries("u")).unwrap();
    let patch = TransactionPatch {
        description: Some("x".into()),
        ..TransactionPatch::default()
    };
    ledger.update("transaction_missing", patch).unwrap();
    assert_eq!(ledger.by_user("u")[0].description, "Mercado");
}

#[test]
fn delete_unknown_id_leaves_ledger_unchanged() {
    let mut ledger = Ledger::load(Store::in_memory());
    ledger.add(groceries("u")).unwrap();
    ledger.add(groceries("u")).unwrap();
    ledger.delete("transaction_0_nothere");
    assert_eq!(ledger.len(), 2);
}

#[test]
fn delete_twice_is_same_as_once() {
    let store = Store::in_memory();
    let mut ledger = Ledger::load(store.clone());
    let keep = ledger.add(groceries("u")).unwrap();
    let gone = ledger.add(groceries("u")).unwrap();

    ledger.delete(&gone.id);
    let after_once = ledger.by_user("u");
    let stored_once = store.get_raw(TRANSACTIONS_KEY).unwrap();
    ledger.delete(&gone.id);
    assert_eq!(ledger.by_user("u"), after_once);
    assert_eq!(store.get_raw(TRANSACTIONS_KEY).unwrap(), stored_once);
    assert_eq!(after_once.len(), 1);
    assert_eq!(after_once[0].id, keep.id);
}

#[test]
fn mutations_survive_reload() {
    let store = Store::in_memory();
    let mut ledger = Ledger::load(store.clone());
    let tx = ledger.add(groceries("u")).unwrap();
    let cents = ledger
        .add(NewTransaction::new(TransactionType::Income, dec("1234.56"), "Freela", "Freelance").for_user("u"))
        .unwrap();
    let largest = ledger
        .add(
            NewTransaction::new(TransactionType::Income, dec("123456789012.34"), "Venda", "Investimentos")
                .for_user("u"),
        )
        .unwrap();

    let reloaded = Ledger::load(store);
    assert_eq!(reloaded.by_user("u"), vec![largest.clone(), cents.clone(), tx]);
    assert_eq!(reloaded.get(&cents.id).unwrap().amount, dec("1234.56"));
    assert_eq!(reloaded.get(&largest.id).unwrap().amount, dec("123456789012.34"));
}

#[test]
fn amounts_outside_storable_range_are_rejected() {
    let store = Store::in_memory();
    let mut ledger = Ledger::load(store.clone());
    for amount in [Decimal::MAX, Decimal::from(MAX_AMOUNT), dec("-10000000000000"), dec("12.345")] {
        let new = NewTransaction::new(TransactionType::Expense, amount, "Mercado", "Alimentação").for_user("u");
        assert!(matches!(ledger.add(new), Err(Error::Validation(_))), "{} accepted", amount);
    }
    assert!(ledger.is_empty());
    assert_eq!(dec("12.340").normalize().scale(), 2);
    ledger
        .add(NewTransaction::new(TransactionType::Expense, dec("12.340"), "Mercado", "Alimentação").for_user("u"))
        .unwrap();

    let tx = ledger.add(groceries("u")).unwrap();
    let patch = TransactionPatch {
        amount: Some(Decimal::MAX),
        ..TransactionPatch::default()
    };
    assert!(ledger.update(&tx.id, patch).is_err());
    assert_eq!(ledger.get(&tx.id), Some(&tx));

    let reloaded = Ledger::load(store);
    assert_eq!(reloaded.len(), 2);
}

#[test]
fn load_accepts_legacy_payload() {
    let store = Store::in_memory();
    store
        .set_raw(
            TRANSACTIONS_KEY,
            r#"[{"id":"1700000000000","type":"expense","amount":-25.5,"description":"Café",
                "category":"Alimentação","date":"2024-11-02T00:00:00.000Z","userId":"u",
                "accountName":"Nubank"}]"#,
        )
        .unwrap();
    let ledger = Ledger::load(store);
    let rows = ledger.by_user("u");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].amount, dec("25.5"));
    assert_eq!(rows[0].date, day("2024-11-02"));
    assert_eq!(rows[0].status, TransactionStatus::Confirmado);
    assert_eq!(rows[0].account_name.as_deref(), Some("Nubank"));
}

#[test]
fn corrupted_payload_loads_as_empty() {
    let store = Store::in_memory();
    store.set_raw(TRANSACTIONS_KEY, "{not json").unwrap();
    let mut ledger = Ledger::load(store.clone());
    assert!(ledger.is_empty());

    ledger.add(groceries("u")).unwrap();
    assert_eq!(Ledger::load(store).len(), 1);
}
