// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use simple_ledger::app::App;
use simple_ledger::commands::exporter::{self, export_file_name, write_export};
use simple_ledger::models::{NewTransaction, TransactionType, User};
use simple_ledger::session::SessionRecord;
use simple_ledger::store::{CURRENT_USER_KEY, Store};
use simple_ledger::{cli, utils::today};
use tempfile::tempdir;

fn base_app() -> App {
    let store = Store::in_memory();
    let record = SessionRecord {
        user: User {
            id: "user_ana".to_string(),
            username: "ana".to_string(),
            email: None,
            display_name: None,
            created_at: None,
        },
        access_token: None,
    };
    store.write(CURRENT_USER_KEY, &record).unwrap();
    let mut app = App::new(store, None);
    let new = NewTransaction::new(
        TransactionType::Expense,
        "12.34".parse().unwrap(),
        "Corner Shop",
        "Alimentação",
    )
    .for_user("user_ana")
    .on(NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
    app.ledger.add(new).unwrap();
    let hidden = NewTransaction::new(TransactionType::Income, Decimal::from(1), "Other", "Outros")
        .for_user("user_bob");
    app.ledger.add(hidden).unwrap();
    app
}

#[test]
fn file_name_uses_export_date() {
    let d = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
    assert_eq!(export_file_name(d, "json"), "transacoes_2025-03-07.json");
}

#[test]
fn export_transactions_streams_pretty_json() {
    let app = base_app();
    let dir = tempdir().unwrap();
    let out_str = dir.path().to_string_lossy().to_string();

    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "simple-ledger",
        "export",
        "transactions",
        "--out",
        &out_str,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(&app, export_m).unwrap();
    } else {
        panic!("no export subcommand");
    }

    let out_path = dir.path().join(export_file_name(today(), "json"));
    let contents = std::fs::read_to_string(&out_path).unwrap();
    assert!(contents.contains("\n  "));
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    let rows = parsed.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["type"], "expense");
    assert_eq!(rows[0]["amount"], 12.34);
    assert_eq!(rows[0]["date"], "2025-01-02");
    assert_eq!(rows[0]["description"], "Corner Shop");
    assert_eq!(rows[0]["userId"], "user_ana");
    assert_eq!(rows[0]["status"], "confirmado");
}

#[test]
fn export_csv_has_header_and_rows() {
    let app = base_app();
    let dir = tempdir().unwrap();
    let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
    let path = write_export(&app.user_transactions().unwrap(), "csv", dir.path(), date).unwrap();
    assert_eq!(path, dir.path().join("transacoes_2025-03-07.csv"));

    let mut rdr = csv::Reader::from_path(&path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[1], "date");
    let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 1);
    assert_eq!(&records[0][3], "Corner Shop");
    assert_eq!(&records[0][5], "12.34");
}

#[test]
fn export_transactions_rejects_unknown_format() {
    let app = base_app();
    let dir = tempdir().unwrap();
    let out_dir = dir.path().join("out");
    let out_str = out_dir.to_string_lossy().to_string();

    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "simple-ledger",
        "export",
        "transactions",
        "--format",
        "xml",
        "--out",
        &out_str,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        assert!(exporter::handle(&app, export_m).is_err());
    } else {
        panic!("no export subcommand");
    }
    assert!(!out_dir.exists());
}
