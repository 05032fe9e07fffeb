// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;

use crate::app::App;
use crate::models::Transaction;
use crate::utils::{required, today};

pub fn handle(app: &App, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => {
            let format = required(sub, "format")?.to_lowercase();
            let dir = PathBuf::from(required(sub, "out")?);
            let path = write_export(&app.user_transactions()?, &format, &dir, today())?;
            println!("Exported transactions to {}", path.display());
            Ok(())
        }
        _ => Ok(()),
    }
}

/// `transacoes_<date>.<ext>`, the name the dashboard's download used.
pub fn export_file_name(date: NaiveDate, ext: &str) -> String {
    format!("transacoes_{}.{}", date.format("%Y-%m-%d"), ext)
}

/// Writes `transactions` into `dir` and returns the file's path. Unknown
/// formats are rejected before anything touches the disk.
pub fn write_export(
    transactions: &[Transaction],
    format: &str,
    dir: &Path,
    date: NaiveDate,
) -> Result<PathBuf> {
    if !matches!(format, "json" | "csv") {
        bail!("Unknown format: {} (use json|csv)", format);
    }
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(export_file_name(date, format));

    if format == "csv" {
        let mut wtr = csv::Writer::from_path(&path)?;
        wtr.write_record([
            "id",
            "date",
            "type",
            "description",
            "category",
            "amount",
            "account",
            "status",
        ])?;
        for t in transactions {
            wtr.write_record([
                t.id.clone(),
                t.date.to_string(),
                t.kind.to_string(),
                t.description.clone(),
                t.category.clone(),
                t.magnitude().to_string(),
                t.account_name.clone().unwrap_or_default(),
                t.status.to_string(),
            ])?;
        }
        wtr.flush()?;
    } else {
        std::fs::write(&path, serde_json::to_string_pretty(transactions)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    tracing::info!(path = %path.display(), count = transactions.len(), "exported transactions");
    Ok(path)
}
