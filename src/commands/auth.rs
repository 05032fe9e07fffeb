// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};

use crate::app::App;
use crate::session::SignUpOutcome;
use crate::utils::{optional, required};

pub fn register(app: &mut App, m: &clap::ArgMatches) -> Result<()> {
    let username = required(m, "username")?;
    let password = required(m, "password")?;
    if password != required(m, "confirm")? {
        bail!("Passwords do not match");
    }
    match app.session.sign_up(username, password, optional(m, "email"))? {
        SignUpOutcome::SignedIn(user) => {
            println!("Registered and signed in as '{}' ({})", user.username, user.id);
        }
        SignUpOutcome::ConfirmationRequired(user) => {
            println!(
                "Registered '{}'. Check {} to confirm the address, then run `simple-ledger login`.",
                user.username,
                user.email.as_deref().unwrap_or("your inbox")
            );
        }
    }
    Ok(())
}

pub fn login(app: &mut App, m: &clap::ArgMatches) -> Result<()> {
    let user = app
        .session
        .sign_in(required(m, "username")?, required(m, "password")?)?;
    println!("Signed in as '{}'", user.username);
    Ok(())
}

pub fn logout(app: &mut App) -> Result<()> {
    if app.session.current_user().is_none() {
        println!("Nobody is signed in");
        return Ok(());
    }
    app.session.sign_out();
    println!("Signed out");
    Ok(())
}

pub fn whoami(app: &App) -> Result<()> {
    match app.session.current_user() {
        Some(user) => {
            println!("{} ({})", user.username, user.id);
            if let Some(email) = &user.email {
                println!("email: {}", email);
            }
            let mode = if app.session.is_remote() { "remote" } else { "local" };
            println!("identity: {}", mode);
        }
        None => println!("Nobody is signed in"),
    }
    Ok(())
}

pub fn handle_user(app: &mut App, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("rename", sub)) => {
            let user = app.session.update_username(required(sub, "username")?)?;
            println!("Username changed to '{}'", user.username);
        }
        Some(("reset-password", sub)) => {
            let email = required(sub, "email")?;
            app.session.reset_password(email)?;
            if app.session.is_remote() {
                println!("Password reset instructions sent to {}", email);
            } else {
                println!("{} belongs to a local user; there is no mailer in local mode", email);
            }
        }
        _ => {}
    }
    Ok(())
}
