// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use anyhow::Result;

use simple_ledger::app::App;
use simple_ledger::config::AppConfig;
use simple_ledger::{cli, commands, logging};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    logging::init(matches.get_count("verbose"));
    let config = AppConfig::load(matches.get_one::<String>("db").map(PathBuf::from))?;
    let mut app = App::open(&config)?;

    let result = match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", config.db_path.display());
            Ok(())
        }
        Some(("register", sub)) => commands::auth::register(&mut app, sub),
        Some(("login", sub)) => commands::auth::login(&mut app, sub),
        Some(("logout", _)) => commands::auth::logout(&mut app),
        Some(("whoami", _)) => commands::auth::whoami(&app),
        Some(("user", sub)) => commands::auth::handle_user(&mut app, sub),
        Some(("remote", sub)) => commands::remote::handle(&mut app, sub),
        Some(("account", sub)) => commands::accounts::handle(&mut app, sub),
        Some(("tx", sub)) => commands::transactions::handle(&mut app, sub),
        Some(("summary", sub)) => commands::reports::summary(&app, sub),
        Some(("report", sub)) => commands::reports::handle(&app, sub),
        Some(("export", sub)) => commands::exporter::handle(&app, sub),
        _ => {
            cli::build_cli().print_help()?;
            println!();
            Ok(())
        }
    };
    app.close();
    result
}
