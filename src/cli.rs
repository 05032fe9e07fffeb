// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn account_fields(cmd: Command) -> Command {
    cmd.arg(Arg::new("name").long("name").required(true))
        .arg(
            Arg::new("type")
                .long("type")
                .required(true)
                .help("checking|savings|credit_card|debit_card"),
        )
        .arg(Arg::new("bank").long("bank").required(true))
        .arg(Arg::new("brand").long("brand").help("Card brand, cards only"))
        .arg(Arg::new("issuer").long("issuer").help("Card issuer, cards only"))
        .arg(
            Arg::new("balance")
                .long("balance")
                .default_value("")
                .help("Opening balance, e.g. 1500.00 or 1500,00"),
        )
}

pub fn build_cli() -> Command {
    Command::new("simple-ledger")
        .about("Personal finance ledger: income, expenses, accounts and summaries")
        .version(crate_version!())
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .help("Database file (default: platform data dir, or $SIMPLE_LEDGER_DB)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("More logging; repeat for more"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("register")
                .about("Create a user and sign in")
                .arg(Arg::new("username").long("username").required(true))
                .arg(Arg::new("password").long("password").required(true))
                .arg(
                    Arg::new("confirm")
                        .long("confirm")
                        .required(true)
                        .help("Repeat the password"),
                )
                .arg(Arg::new("email").long("email")),
        )
        .subcommand(
            Command::new("login")
                .about("Sign in with a username or email")
                .arg(Arg::new("username").long("username").required(true))
                .arg(Arg::new("password").long("password").required(true)),
        )
        .subcommand(Command::new("logout").about("Sign out"))
        .subcommand(Command::new("whoami").about("Show the signed-in user"))
        .subcommand(
            Command::new("user")
                .about("Manage the signed-in user")
                .subcommand(
                    Command::new("rename")
                        .arg(Arg::new("username").long("username").required(true)),
                )
                .subcommand(
                    Command::new("reset-password")
                        .arg(Arg::new("email").long("email").required(true)),
                ),
        )
        .subcommand(
            Command::new("remote")
                .about("Remote identity backend")
                .subcommand(
                    Command::new("configure")
                        .arg(Arg::new("url").long("url").required(true))
                        .arg(
                            Arg::new("key")
                                .long("key")
                                .required(true)
                                .help("Public (anon) key"),
                        ),
                )
                .subcommand(Command::new("show"))
                .subcommand(Command::new("clear")),
        )
        .subcommand(
            Command::new("account")
                .about("Manage accounts and cards")
                .subcommand(account_fields(Command::new("add")))
                .subcommand(account_fields(
                    Command::new("edit").arg(Arg::new("id").long("id").required(true)),
                ))
                .subcommand(json_flags(Command::new("list")))
                .subcommand(Command::new("rm").arg(Arg::new("id").long("id").required(true))),
        )
        .subcommand(
            Command::new("tx")
                .about("Manage transactions")
                .subcommand(
                    Command::new("add")
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .required(true)
                                .help("income|expense"),
                        )
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("description").long("description").required(true))
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("date").long("date").help("YYYY-MM-DD, default today"))
                        .arg(Arg::new("account").long("account").help("Account id or name"))
                        .arg(
                            Arg::new("status")
                                .long("status")
                                .help("confirmado|pendente|cancelado"),
                        ),
                )
                .subcommand(
                    Command::new("edit")
                        .arg(Arg::new("id").long("id").required(true))
                        .arg(Arg::new("type").long("type"))
                        .arg(Arg::new("amount").long("amount"))
                        .arg(Arg::new("description").long("description"))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("date").long("date"))
                        .arg(Arg::new("account").long("account"))
                        .arg(Arg::new("status").long("status")),
                )
                .subcommand(
                    Command::new("rm").arg(
                        Arg::new("id")
                            .long("id")
                            .required(true)
                            .action(ArgAction::Append),
                    ),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(Arg::new("search").long("search"))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("type").long("type"))
                        .arg(Arg::new("account").long("account").help("Account name"))
                        .arg(Arg::new("status").long("status"))
                        .arg(
                            Arg::new("sort")
                                .long("sort")
                                .default_value("date")
                                .help("date|amount|category|description"),
                        )
                        .arg(Arg::new("asc").long("asc").action(ArgAction::SetTrue))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(
                    Command::new("recent").arg(
                        Arg::new("limit")
                            .long("limit")
                            .value_parser(value_parser!(usize))
                            .default_value("5"),
                    ),
                ),
        )
        .subcommand(json_flags(
            Command::new("summary").about("Income, expense and balance totals"),
        ))
        .subcommand(
            Command::new("report")
                .about("Reports")
                .subcommand(json_flags(
                    Command::new("categories").arg(
                        Arg::new("type")
                            .long("type")
                            .default_value("expense")
                            .help("income|expense"),
                    ),
                ))
                .subcommand(json_flags(
                    Command::new("monthly").arg(
                        Arg::new("months")
                            .long("months")
                            .value_parser(value_parser!(usize))
                            .default_value("6"),
                    ),
                )),
        )
        .subcommand(
            Command::new("export").about("Export data").subcommand(
                Command::new("transactions")
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .default_value("json")
                            .help("json|csv"),
                    )
                    .arg(
                        Arg::new("out")
                            .long("out")
                            .default_value(".")
                            .help("Directory to write the file into"),
                    ),
            ),
        )
}
