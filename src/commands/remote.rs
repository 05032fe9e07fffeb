// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::app::App;
use crate::utils::required;

pub fn handle(app: &mut App, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("configure", sub)) => {
            let cfg = app
                .session
                .configure_remote(required(sub, "url")?, required(sub, "key")?)?;
            println!("Remote identity set to {} (key {})", cfg.url, cfg.masked_key());
        }
        Some(("show", _)) => match app.session.remote_config() {
            Some(cfg) => {
                println!("url: {}", cfg.url);
                println!("key: {}", cfg.masked_key());
                if let Some(at) = &cfg.configured_at {
                    println!("configured: {}", at);
                }
            }
            None => println!("No remote identity configured; using local accounts"),
        },
        Some(("clear", _)) => {
            app.session.clear_remote()?;
            println!("Remote identity removed; using local accounts");
        }
        _ => {}
    }
    Ok(())
}
