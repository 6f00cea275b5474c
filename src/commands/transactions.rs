// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::cashflow::day_start_millis;
use crate::db::Store;
use crate::ledger::{AddTransaction, RemoveTransaction};
use crate::models::{NewTransaction, TransactionType};
use crate::repo::{accounts, transactions};
use crate::utils::{
    account_by_ref, category_by_ref, maybe_print_json, now_millis, parse_date, parse_decimal,
    pretty_table,
};
use anyhow::{bail, Result};
use chrono::{Local, TimeZone};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

pub async fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub).await?,
        Some(("list", sub)) => list(store, sub).await?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            RemoveTransaction::new(store.clone()).execute(id).await?;
            println!("Removed transaction {}", id);
        }
        _ => {}
    }
    Ok(())
}

async fn add(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let account = account_by_ref(store, sub.get_one::<String>("account").unwrap()).await?;
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    if amount <= Decimal::ZERO {
        bail!("Amount must be greater than zero");
    }
    let category = match sub.get_one::<String>("category") {
        Some(c) => Some(category_by_ref(store, c).await?),
        None => None,
    };
    let is_expense = match &category {
        Some(c) if c.transaction_type == TransactionType::Bitcoin => {
            bail!("Use `bitcoin buy` or `bitcoin sell` for Bitcoin trades")
        }
        Some(c) => c.transaction_type == TransactionType::Expense,
        None => true,
    };
    let date = match sub.get_one::<String>("date") {
        Some(d) => day_start_millis(&Local, parse_date(d)?),
        None => now_millis(),
    };
    let note = sub
        .get_one::<String>("note")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let stored = AddTransaction::new(store.clone())
        .execute(
            NewTransaction {
                account_id: account.id,
                category_id: category.as_ref().map(|c| c.id),
                amount,
                date,
                note,
            },
            is_expense,
        )
        .await?;
    println!(
        "Recorded {} {} on '{}' [id {}]",
        if is_expense { "expense" } else { "income" },
        amount,
        account.name,
        stored.id
    );
    Ok(())
}

async fn list(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(store, sub).await?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.account.clone(),
                    r.amount.to_string(),
                    r.category.clone(),
                    r.kind.clone(),
                    r.note.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Date", "Account", "Amount", "Category", "Type", "Note"],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub account: String,
    pub amount: Decimal,
    pub category: String,
    pub kind: String,
    pub note: String,
}

/// Newest first, optionally narrowed to one account and truncated.
pub async fn query_rows(store: &Store, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let account_id = match sub.get_one::<String>("account") {
        Some(r) => Some(account_by_ref(store, r).await?.id),
        None => None,
    };
    let limit = sub.get_one::<usize>("limit").copied();

    let (all, names) = store
        .read(|c| {
            let names: HashMap<i64, String> = accounts::list(c)?
                .into_iter()
                .map(|a| (a.id, a.name))
                .collect();
            Ok((transactions::list_with_category(c, None)?, names))
        })
        .await?;

    let rows = all
        .into_iter()
        .filter(|t| account_id.is_none_or(|id| t.transaction.account_id == id))
        .take(limit.unwrap_or(usize::MAX))
        .map(|t| {
            let date = Local
                .timestamp_millis_opt(t.transaction.date)
                .single()
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            TransactionRow {
                id: t.transaction.id,
                date,
                account: names.get(&t.transaction.account_id).cloned().unwrap_or_default(),
                amount: t.transaction.amount,
                category: t.category.as_ref().map(|c| c.name.clone()).unwrap_or_default(),
                kind: t
                    .category
                    .as_ref()
                    .map(|c| c.transaction_type.to_string())
                    .unwrap_or_default(),
                note: t.transaction.note.unwrap_or_default(),
            }
        })
        .collect();
    Ok(rows)
}
