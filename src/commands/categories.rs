// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{Store, Table};
use crate::models::TransactionType;
use crate::repo::categories;
use crate::utils::{category_by_ref, maybe_print_json, pretty_table};
use anyhow::{bail, Result};

pub async fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim().to_string();
            let ty: TransactionType = sub
                .get_one::<String>("type")
                .unwrap()
                .parse()
                .map_err(anyhow::Error::msg)?;
            let icon = sub.get_one::<String>("icon").unwrap().clone();
            let color = sub.get_one::<String>("color").unwrap().clone();
            let cat = store
                .write(&[Table::Categories], move |tx| {
                    categories::insert(tx, &name, &icon, &color, ty)
                })
                .await?;
            println!("Added category '{}' ({}) [id {}]", cat.name, cat.transaction_type, cat.id);
        }
        Some(("list", sub)) => {
            let data = store.read(categories::list).await?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|c| {
                        vec![
                            c.id.to_string(),
                            c.name.clone(),
                            c.transaction_type.to_string(),
                            c.icon_name.clone(),
                            c.color_hex.clone(),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["Id", "Category", "Type", "Icon", "Color"], rows));
            }
        }
        Some(("rm", sub)) => {
            let cat = category_by_ref(store, sub.get_one::<String>("category").unwrap()).await?;
            if cat.transaction_type == TransactionType::Bitcoin {
                bail!("The Bitcoin category is required by the Bitcoin ledger and cannot be removed");
            }
            let id = cat.id;
            store
                .write(&[Table::Categories, Table::Budgets, Table::Transactions], move |tx| {
                    categories::delete(tx, id)
                })
                .await?;
            println!("Removed category '{}'", cat.name);
        }
        _ => {}
    }
    Ok(())
}
