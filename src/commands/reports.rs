// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::aggregate::{category_breakdown, monthly_history, summarize};
use crate::app::App;
use crate::models::TransactionType;
use crate::utils::{fmt_brl, maybe_print_json, pretty_table, required};

pub fn summary(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    let s = summarize(&app.user_transactions()?);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        return Ok(());
    }
    let rows = vec![
        vec![
            "Income".to_string(),
            fmt_brl(&s.total_income),
            s.income_count.to_string(),
        ],
        vec![
            "Expense".to_string(),
            fmt_brl(&s.total_expense),
            s.expense_count.to_string(),
        ],
        vec![
            "Balance".to_string(),
            fmt_brl(&s.net_balance),
            (s.income_count + s.expense_count).to_string(),
        ],
    ];
    println!("{}", pretty_table(&["", "Total", "Count"], rows));
    Ok(())
}

pub fn handle(app: &App, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("categories", sub)) => categories(app, sub)?,
        Some(("monthly", sub)) => monthly(app, sub)?,
        _ => {}
    }
    Ok(())
}

fn categories(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    let kind: TransactionType = required(sub, "type")?.parse()?;
    let slices = category_breakdown(&app.user_transactions()?, kind);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &slices)? {
        return Ok(());
    }
    if slices.is_empty() {
        println!("No {} transactions yet", kind.label());
        return Ok(());
    }
    let rows: Vec<Vec<String>> = slices
        .iter()
        .map(|c| {
            vec![
                c.category.clone(),
                fmt_brl(&c.total),
                format!("{}%", c.percentage),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Category", "Total", "Share"], rows));
    Ok(())
}

fn monthly(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    let months = sub.get_one::<usize>("months").copied().unwrap_or(6);
    let history = monthly_history(&app.user_transactions()?, months);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &history)? {
        return Ok(());
    }
    let rows: Vec<Vec<String>> = history
        .iter()
        .map(|m| {
            vec![
                m.month.clone(),
                fmt_brl(&m.income),
                fmt_brl(&m.expense),
                fmt_brl(&m.balance),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Month", "Income", "Expense", "Balance"], rows)
    );
    Ok(())
}
