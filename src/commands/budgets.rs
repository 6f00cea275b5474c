// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::cashflow::{day_start_millis, month_bounds};
use crate::db::{Store, Table};
use crate::models::TransactionType;
use crate::repo::{budgets, categories, transactions};
use crate::utils::{category_by_ref, maybe_print_json, parse_decimal, parse_month, pretty_table};
use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

pub async fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(store, sub).await?,
        Some(("list", sub)) => list(store, sub).await?,
        Some(("report", sub)) => report(store, sub).await?,
        _ => {}
    }
    Ok(())
}

async fn set(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = parse_month(sub.get_one::<String>("month").unwrap())?;
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    if amount < Decimal::ZERO {
        bail!("Budget limit cannot be negative");
    }
    let cat = category_by_ref(store, sub.get_one::<String>("category").unwrap()).await?;
    if cat.transaction_type != TransactionType::Expense {
        bail!("Budgets apply to expense categories, '{}' is {}", cat.name, cat.transaction_type);
    }
    let cat_id = cat.id;
    store
        .write(&[Table::Budgets], move |tx| {
            budgets::upsert(tx, cat_id, amount, month, year)
        })
        .await?;
    println!("Budget set for {}-{:02} / {} = {}", year, month, cat.name, amount);
    Ok(())
}

#[derive(Debug, Serialize)]
struct BudgetRow {
    month: String,
    category: String,
    limit: Decimal,
}

async fn list(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let period = sub
        .get_one::<String>("month")
        .map(String::as_str)
        .map(parse_month)
        .transpose()?;
    let (items, names) = store
        .read(move |c| {
            let items = match period {
                Some((year, month)) => budgets::for_period(c, month, year)?,
                None => budgets::list(c)?,
            };
            let names: HashMap<i64, String> =
                categories::list(c)?.into_iter().map(|c| (c.id, c.name)).collect();
            Ok((items, names))
        })
        .await?;
    let data: Vec<BudgetRow> = items
        .into_iter()
        .map(|b| BudgetRow {
            month: format!("{}-{:02}", b.period_year, b.period_month),
            category: names.get(&b.category_id).cloned().unwrap_or_default(),
            limit: b.limit_amount,
        })
        .collect();
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|r| vec![r.month.clone(), r.category.clone(), r.limit.to_string()])
            .collect();
        println!("{}", pretty_table(&["Month", "Category", "Budget"], rows));
    }
    Ok(())
}

#[derive(Debug, Serialize, PartialEq)]
pub struct BudgetUsage {
    pub category: String,
    pub limit: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
}

/// Spend per budgeted category in the given month, using local day boundaries.
pub async fn usage(store: &Store, year: i32, month: u32) -> Result<Vec<BudgetUsage>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .with_context(|| format!("Invalid period {}-{:02}", year, month))?;
    let (first, last) = month_bounds(first);
    let from = day_start_millis(&Local, first);
    let to = last
        .succ_opt()
        .map(|next| day_start_millis(&Local, next) - 1)
        .unwrap_or(i64::MAX);

    let (items, names, rows) = store
        .read(move |c| {
            let names: HashMap<i64, String> =
                categories::list(c)?.into_iter().map(|c| (c.id, c.name)).collect();
            Ok((
                budgets::for_period(c, month, year)?,
                names,
                transactions::by_date_range(c, from, to)?,
            ))
        })
        .await?;

    let mut spent: HashMap<i64, Decimal> = HashMap::new();
    for row in rows {
        if let Some(cat) = row.category.filter(|c| c.transaction_type == TransactionType::Expense) {
            *spent.entry(cat.id).or_default() += row.transaction.amount;
        }
    }
    Ok(items
        .into_iter()
        .map(|b| {
            let used = spent.get(&b.category_id).copied().unwrap_or_default();
            BudgetUsage {
                category: names.get(&b.category_id).cloned().unwrap_or_default(),
                limit: b.limit_amount,
                spent: used,
                remaining: b.limit_amount - used,
            }
        })
        .collect())
}

async fn report(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = parse_month(sub.get_one::<String>("month").unwrap())?;
    let data = usage(store, year, month).await?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|u| {
                vec![
                    u.category.clone(),
                    u.limit.to_string(),
                    format!("{:.2}", u.spent),
                    format!("{:.2}", u.remaining),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Category", "Budget", "Spent", "Remaining"], rows)
        );
    }
    Ok(())
}
