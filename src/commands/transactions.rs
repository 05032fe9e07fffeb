// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, bail};

use crate::aggregate::{RECENT_LIMIT, recent};
use crate::app::App;
use crate::filters::{Filter, Filters, Selection, Sort, SortDirection, SortField, TableState};
use crate::models::{
    Account, NewTransaction, Transaction, TransactionPatch, TransactionStatus, TransactionType,
};
use crate::registry::AccountRegistry;
use crate::utils::{
    fmt_brl, maybe_print_json, optional, parse_date, parse_decimal, pretty_table, required,
};

pub fn handle(app: &mut App, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(app, sub)?,
        Some(("edit", sub)) => edit(app, sub)?,
        Some(("rm", sub)) => remove(app, sub)?,
        Some(("list", sub)) => list(app, sub)?,
        Some(("recent", sub)) => recent_list(app, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(app: &mut App, sub: &clap::ArgMatches) -> Result<()> {
    let user_id = app.user_id()?;
    let kind: TransactionType = required(sub, "type")?.parse()?;
    let amount = parse_decimal(required(sub, "amount")?)?;
    let mut new = NewTransaction::new(
        kind,
        amount,
        required(sub, "description")?,
        required(sub, "category")?,
    )
    .for_user(&user_id);
    if let Some(date) = optional(sub, "date") {
        new = new.on(parse_date(date)?);
    }
    if let Some(status) = optional(sub, "status") {
        new = new.with_status(status.parse()?);
    }
    if let Some(account) = optional(sub, "account") {
        let registry = app.registry()?;
        new = new.with_account(resolve_account(&registry, account)?);
    }

    let tx = app.ledger.add(new)?;
    println!(
        "Recorded {} {} '{}' on {} ({})",
        tx.kind.label(),
        fmt_brl(&tx.magnitude()),
        tx.description,
        tx.date,
        tx.id
    );
    Ok(())
}

fn edit(app: &mut App, sub: &clap::ArgMatches) -> Result<()> {
    let id = required(sub, "id")?;
    let user_id = app.user_id()?;
    if !app.ledger.get(id).is_some_and(|t| t.belongs_to(&user_id)) {
        println!("No transaction with id {}", id);
        return Ok(());
    }

    let mut patch = TransactionPatch {
        kind: optional(sub, "type")
            .map(str::parse::<TransactionType>)
            .transpose()?,
        amount: optional(sub, "amount").map(parse_decimal).transpose()?,
        description: optional(sub, "description").map(str::to_string),
        category: optional(sub, "category").map(str::to_string),
        date: optional(sub, "date").map(parse_date).transpose()?,
        status: optional(sub, "status")
            .map(str::parse::<TransactionStatus>)
            .transpose()?,
        ..TransactionPatch::default()
    };
    if let Some(account) = optional(sub, "account") {
        let registry = app.registry()?;
        let account = resolve_account(&registry, account)?;
        patch.account_id = Some(account.id.clone());
        patch.account_name = Some(account.name.clone());
    }
    if patch.is_empty() {
        bail!("Nothing to change, pass at least one field to edit");
    }

    app.ledger.update(id, patch)?;
    println!("Updated transaction {}", id);
    Ok(())
}

fn remove(app: &mut App, sub: &clap::ArgMatches) -> Result<()> {
    let user_id = app.user_id()?;
    let mut selection = Selection::default();
    for id in sub.get_many::<String>("id").into_iter().flatten() {
        // Other users' rows are never selectable.
        if app.ledger.get(id).is_some_and(|t| t.belongs_to(&user_id)) && !selection.contains(id) {
            selection.toggle(id);
        }
    }
    let count = selection.delete_selected(&mut app.ledger);
    println!("Removed {} transaction(s)", count);
    Ok(())
}

/// The table state described by `tx list` flags.
pub fn table_state(sub: &clap::ArgMatches) -> Result<TableState> {
    let mut filters = Filters::default();
    if let Some(term) = optional(sub, "search") {
        filters = filters.search(term.trim());
    }
    filters.category = Filter::text(optional(sub, "category").unwrap_or_default());
    filters.kind = Filter::parse(optional(sub, "type").unwrap_or_default())?;
    filters.account = Filter::text(optional(sub, "account").unwrap_or_default());
    filters.status = Filter::parse(optional(sub, "status").unwrap_or_default())?;

    let field: SortField = optional(sub, "sort").unwrap_or("date").parse()?;
    let direction = if sub.get_flag("asc") {
        SortDirection::Asc
    } else {
        SortDirection::Desc
    };
    Ok(TableState {
        filters,
        sort: Sort::new(field, direction),
        ..TableState::default()
    })
}

/// The rows `tx list` shows for `transactions`, limit applied.
pub fn filtered_rows(
    transactions: &[Transaction],
    sub: &clap::ArgMatches,
) -> Result<Vec<Transaction>> {
    let mut rows = table_state(sub)?.visible(transactions);
    if let Some(limit) = sub.get_one::<usize>("limit") {
        rows.truncate(*limit);
    }
    Ok(rows)
}

fn list(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    let data = filtered_rows(&app.user_transactions()?, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        if data.is_empty() {
            println!("No transactions match");
            return Ok(());
        }
        print_table(&data);
    }
    Ok(())
}

fn recent_list(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    let limit = sub.get_one::<usize>("limit").copied().unwrap_or(RECENT_LIMIT);
    let all = app.user_transactions()?;
    let rows = recent(&all, limit);
    if rows.is_empty() {
        println!("No transactions yet");
        return Ok(());
    }
    print_table(rows);
    Ok(())
}

fn print_table(data: &[Transaction]) {
    let rows: Vec<Vec<String>> = data
        .iter()
        .map(|t| {
            vec![
                t.date.to_string(),
                t.kind.label().to_string(),
                t.description.clone(),
                t.category.clone(),
                t.account_name.clone().unwrap_or_default(),
                t.status.to_string(),
                fmt_brl(&t.signed_amount()),
                t.id.clone(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Date", "Type", "Description", "Category", "Account", "Status", "Amount", "Id"],
            rows,
        )
    );
}

fn resolve_account<'a>(registry: &'a AccountRegistry, id_or_name: &str) -> Result<&'a Account> {
    registry
        .resolve(id_or_name)
        .with_context(|| format!("Unknown account '{}'", id_or_name))
}
