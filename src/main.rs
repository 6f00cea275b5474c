// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use moneytrack::{cli, commands, db, seed, utils};

#[tokio::main]
async fn main() -> Result<()> {
    utils::init_tracing();
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let store = db::Store::new(db::open_or_init()?);
    let seeded = seed::seed_if_empty(&store).await?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
            if seeded != seed::SeedReport::default() {
                println!(
                    "Seeded {} account(s) and {} categories",
                    seeded.accounts, seeded.categories
                );
            }
        }
        Some(("account", sub)) => commands::accounts::handle(&store, sub).await?,
        Some(("category", sub)) => commands::categories::handle(&store, sub).await?,
        Some(("tx", sub)) => commands::transactions::handle(&store, sub).await?,
        Some(("budget", sub)) => commands::budgets::handle(&store, sub).await?,
        Some(("bitcoin", sub)) => commands::bitcoin::handle(&store, sub).await?,
        Some(("report", sub)) => commands::reports::handle(&store, sub).await?,
        Some(("price", sub)) => commands::price::handle(&store, sub).await?,
        Some(("import", sub)) => commands::importer::handle(&store, sub).await?,
        Some(("export", sub)) => commands::exporter::handle(&store, sub).await?,
        Some(("doctor", _)) => commands::doctor::handle(&store).await?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
