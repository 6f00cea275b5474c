// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::cashflow::{CashFlowAggregator, LabelStyle};
use crate::db::Store;
use crate::models::DailyBucket;
use crate::portfolio;
use crate::repo::{accounts, holdings};
use crate::utils::{fmt_money, get_fiat_currency, maybe_print_json, parse_date, pretty_table};
use anyhow::{bail, Context, Result};
use chrono::Local;
use futures::{Stream, StreamExt};
use rust_decimal::Decimal;
use serde::Serialize;

pub async fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("cashflow", sub)) => cashflow(store, sub).await?,
        Some(("balance", sub)) => balance(store, sub).await?,
        _ => {}
    }
    Ok(())
}

/// Current value of a reactive query; the stream is dropped afterwards.
pub async fn first<T, S>(stream: S) -> Result<T>
where
    S: Stream<Item = crate::error::Result<T>>,
{
    let mut stream = Box::pin(stream);
    Ok(stream.next().await.context("stream ended before emitting")??)
}

async fn cashflow(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let agg = CashFlowAggregator::new(store.clone(), Local);
    let today = agg.today();
    let buckets: Vec<DailyBucket> = if sub.get_flag("monthly") {
        first(agg.monthly(today)).await?
    } else if let (Some(from), Some(to)) =
        (sub.get_one::<String>("from"), sub.get_one::<String>("to"))
    {
        let (from, to) = (parse_date(from)?, parse_date(to)?);
        if from > to {
            bail!("--from {} is after --to {}", from, to);
        }
        first(agg.observe(from, to, LabelStyle::IsoDate)).await?
    } else {
        first(agg.weekly(today)).await?
    };

    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &buckets)? {
        let rows = buckets
            .iter()
            .map(|b| {
                vec![
                    b.label.clone(),
                    format!("{:.2}", b.income_amount),
                    format!("{:.2}", b.expense_amount),
                    format!("{:.2}", b.bitcoin_amount),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Day", "Income", "Expense", "Bitcoin"], rows)
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct BalanceReport {
    accounts: Vec<(String, Decimal)>,
    total: Decimal,
    sats: i64,
}

async fn balance(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let total = first(portfolio::total_balance(store)).await?;
    let (list, sats, ccy) = store
        .read(|c| Ok((accounts::list(c)?, holdings::total_sats(c)?, get_fiat_currency(c)?)))
        .await?;
    let report = BalanceReport {
        accounts: list.into_iter().map(|a| (a.name, a.current_balance)).collect(),
        total,
        sats,
    };
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        let mut rows: Vec<Vec<String>> = report
            .accounts
            .iter()
            .map(|(name, bal)| vec![name.clone(), fmt_money(bal, &ccy)])
            .collect();
        rows.push(vec!["Total".into(), fmt_money(&report.total, &ccy)]);
        rows.push(vec!["Bitcoin".into(), format!("{} sats", report.sats)]);
        println!("{}", pretty_table(&["Account", "Balance"], rows));
    }
    Ok(())
}
