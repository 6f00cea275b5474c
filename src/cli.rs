// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{crate_version, value_parser, Arg, ArgAction, Command};

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn trade_cmd(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(Arg::new("account").long("account").required(true).help("Account id or name"))
        .arg(
            Arg::new("sats")
                .long("sats")
                .required(true)
                .value_parser(value_parser!(i64))
                .help("Amount in satoshis"),
        )
        .arg(Arg::new("fiat").long("fiat").required(true).help("Fiat amount paid or received"))
        .arg(Arg::new("price").long("price").help("Fiat per BTC (default: implied by --fiat/--sats)"))
        .arg(Arg::new("note").long("note"))
        .arg(Arg::new("platform").long("platform"))
        .arg(Arg::new("commission").long("commission").help("Commission in percent"))
}

pub fn build_cli() -> Command {
    Command::new("moneytrack")
        .about("Personal finance ledger with a Bitcoin sub-ledger")
        .version(crate_version!())
        .subcommand_required(false)
        .subcommand(Command::new("init").about("Create the database and default data"))
        .subcommand(
            Command::new("account")
                .about("Manage accounts")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("type").long("type").default_value("Efectivo"))
                        .arg(
                            Arg::new("balance")
                                .long("balance")
                                .default_value("0")
                                .help("Initial balance"),
                        ),
                )
                .subcommand(json_args(Command::new("list")))
                .subcommand(
                    Command::new("rm").arg(
                        Arg::new("account")
                            .required(true)
                            .help("Account id or name; its transactions are removed too"),
                    ),
                ),
        )
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .required(true)
                                .value_parser(["income", "expense"]),
                        )
                        .arg(Arg::new("icon").long("icon").default_value("ic_category"))
                        .arg(Arg::new("color").long("color").default_value("#607D8B")),
                )
                .subcommand(json_args(Command::new("list")))
                .subcommand(
                    Command::new("rm").arg(Arg::new("category").required(true).help("Category id or name")),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and inspect transactions")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("account").long("account").required(true))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(
                            Arg::new("category")
                                .long("category")
                                .help("Category id or name; uncategorized amounts are expenses"),
                        )
                        .arg(Arg::new("date").long("date").help("YYYY-MM-DD (default: now)"))
                        .arg(Arg::new("note").long("note")),
                )
                .subcommand(json_args(
                    Command::new("list")
                        .arg(Arg::new("account").long("account"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(
                    Command::new("rm").arg(
                        Arg::new("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                ),
        )
        .subcommand(
            Command::new("budget")
                .about("Monthly category budgets")
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("month").long("month").required(true).help("YYYY-MM"))
                        .arg(Arg::new("amount").long("amount").required(true)),
                )
                .subcommand(json_args(
                    Command::new("list").arg(Arg::new("month").long("month")),
                ))
                .subcommand(json_args(
                    Command::new("report").arg(Arg::new("month").long("month").required(true)),
                )),
        )
        .subcommand(
            Command::new("bitcoin")
                .about("Bitcoin sub-ledger")
                .subcommand(trade_cmd("buy", "Buy sats with fiat from an account"))
                .subcommand(trade_cmd("sell", "Sell sats into an account"))
                .subcommand(json_args(Command::new("list")))
                .subcommand(
                    Command::new("rm").arg(
                        Arg::new("id")
                            .required(true)
                            .value_parser(value_parser!(i64))
                            .help("Holding id"),
                    ),
                )
                .subcommand(Command::new("value").arg(Arg::new("currency").long("currency"))),
        )
        .subcommand(
            Command::new("report")
                .about("Reports")
                .subcommand(json_args(
                    Command::new("cashflow")
                        .arg(
                            Arg::new("weekly")
                                .long("weekly")
                                .action(ArgAction::SetTrue)
                                .conflicts_with_all(["monthly", "from"]),
                        )
                        .arg(
                            Arg::new("monthly")
                                .long("monthly")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("from"),
                        )
                        .arg(Arg::new("from").long("from").requires("to"))
                        .arg(Arg::new("to").long("to").requires("from")),
                ))
                .subcommand(json_args(Command::new("balance"))),
        )
        .subcommand(
            Command::new("price")
                .about("Bitcoin spot price")
                .subcommand(Command::new("get").arg(Arg::new("currency").long("currency")))
                .subcommand(
                    Command::new("set-currency").arg(Arg::new("currency").required(true)),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand(
                    Command::new("backup").arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Import data")
                .subcommand(
                    Command::new("backup").arg(Arg::new("path").long("path").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Check ledger consistency"))
}
