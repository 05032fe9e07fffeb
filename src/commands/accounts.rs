// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::app::App;
use crate::models::AccountInput;
use crate::utils::{fmt_brl, maybe_print_json, optional, pretty_table, required};

pub fn handle(app: &mut App, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let mut registry = app.registry()?;
            let account = registry.add(account_input(sub)?)?;
            println!(
                "Added account '{}' ({}, {})",
                account.name,
                account.kind.label(),
                account.id
            );
        }
        Some(("edit", sub)) => {
            let id = required(sub, "id")?;
            let mut registry = app.registry()?;
            if registry.get(id).is_none() {
                println!("No account with id {}", id);
                return Ok(());
            }
            registry.update(id, account_input(sub)?)?;
            println!("Updated account {}", id);
        }
        Some(("list", sub)) => list(app, sub)?,
        Some(("rm", sub)) => {
            let id = required(sub, "id")?;
            let mut registry = app.registry()?;
            registry.delete(id);
            println!("Removed account {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn account_input(sub: &clap::ArgMatches) -> Result<AccountInput> {
    Ok(AccountInput {
        name: required(sub, "name")?.to_string(),
        kind: required(sub, "type")?.to_string(),
        bank: required(sub, "bank")?.to_string(),
        brand: optional(sub, "brand").map(str::to_string),
        issuer: optional(sub, "issuer").map(str::to_string),
        balance: optional(sub, "balance").unwrap_or_default().to_string(),
    })
}

fn list(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    let accounts = app.registry()?.list_by_user();
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &accounts)? {
        return Ok(());
    }
    if accounts.is_empty() {
        println!("No accounts yet. Add one with `simple-ledger account add`.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = accounts
        .iter()
        .map(|a| {
            vec![
                a.id.clone(),
                a.name.clone(),
                a.kind.label().to_string(),
                a.details(),
                fmt_brl(&a.balance),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Id", "Name", "Type", "Details", "Balance"], rows)
    );
    Ok(())
}
