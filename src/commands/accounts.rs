// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{Store, Table};
use crate::repo::accounts;
use crate::utils::{account_by_ref, get_fiat_currency, maybe_print_json, parse_decimal, pretty_table};
use anyhow::Result;

pub async fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim().to_string();
            let typ = sub.get_one::<String>("type").unwrap().trim().to_string();
            let balance = parse_decimal(sub.get_one::<String>("balance").unwrap())?;
            let account = store
                .write(&[Table::Accounts], move |tx| accounts::insert(tx, &name, balance, &typ))
                .await?;
            println!(
                "Added account '{}' ({}) with balance {} [id {}]",
                account.name, account.r#type, account.current_balance, account.id
            );
        }
        Some(("list", sub)) => {
            let (data, ccy) = store
                .read(|c| Ok((accounts::list(c)?, get_fiat_currency(c)?)))
                .await?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|a| {
                        vec![
                            a.id.to_string(),
                            a.name.clone(),
                            a.r#type.clone(),
                            crate::utils::fmt_money(&a.current_balance, &ccy),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["Id", "Name", "Type", "Balance"], rows));
            }
        }
        Some(("rm", sub)) => {
            let account = account_by_ref(store, sub.get_one::<String>("account").unwrap()).await?;
            let id = account.id;
            store
                .write(
                    &[Table::Accounts, Table::Transactions, Table::BitcoinHoldings],
                    move |tx| accounts::delete(tx, id),
                )
                .await?;
            println!("Removed account '{}' and its transactions", account.name);
        }
        _ => {}
    }
    Ok(())
}
