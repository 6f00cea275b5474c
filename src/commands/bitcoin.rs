// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::price::{coingecko_cache, currency_arg};
use super::reports::first;
use crate::db::Store;
use crate::ledger::{AddBitcoinTransaction, BitcoinTrade, DeleteBitcoinTransaction};
use crate::models::implied_price;
use crate::portfolio;
use crate::repo::holdings;
use crate::utils::{account_by_ref, fmt_money, maybe_print_json, parse_decimal, pretty_table};
use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use rust_decimal::Decimal;

pub async fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("buy", sub)) => trade(store, sub, true).await?,
        Some(("sell", sub)) => trade(store, sub, false).await?,
        Some(("list", sub)) => list(store, sub).await?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let holding = store
                .read(move |c| holdings::get(c, id))
                .await?
                .with_context(|| format!("Holding {} not found", id))?;
            DeleteBitcoinTransaction::new(store.clone()).execute(holding).await?;
            println!("Removed holding {}", id);
        }
        Some(("value", sub)) => {
            let ccy = currency_arg(store, sub).await?;
            let value = first(portfolio::bitcoin_value(store, coingecko_cache()?, ccy.clone())).await?;
            let sats = store.read(holdings::total_sats).await?;
            println!("{} sats = {}", sats, fmt_money(&value, &ccy));
        }
        _ => {}
    }
    Ok(())
}

async fn trade(store: &Store, sub: &clap::ArgMatches, is_buy: bool) -> Result<()> {
    let account = account_by_ref(store, sub.get_one::<String>("account").unwrap()).await?;
    let sats = *sub.get_one::<i64>("sats").unwrap();
    let fiat = parse_decimal(sub.get_one::<String>("fiat").unwrap())?;
    let price = match sub.get_one::<String>("price") {
        Some(p) => parse_decimal(p)?,
        None => implied_price(sats, fiat).unwrap_or(Decimal::ZERO),
    };

    let mut trade = if is_buy {
        BitcoinTrade::buy(account.id, sats, fiat, price)
    } else {
        BitcoinTrade::sell(account.id, sats, fiat, price)
    };
    if let Some(note) = sub.get_one::<String>("note") {
        trade = trade.with_note(note.as_str());
    }
    trade.platform = sub
        .get_one::<String>("platform")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    if let Some(c) = sub.get_one::<String>("commission") {
        trade.commission = parse_decimal(c)?;
    }

    let tx_id = AddBitcoinTransaction::new(store.clone()).execute(trade).await?;
    println!(
        "{} {} sats for {} on '{}' [transaction {}]",
        if is_buy { "Bought" } else { "Sold" },
        sats,
        fiat,
        account.name,
        tx_id
    );
    Ok(())
}

async fn list(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let data = store.read(holdings::list).await?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|h| {
                let when = Local
                    .timestamp_millis_opt(h.last_update)
                    .single()
                    .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                vec![
                    h.id.to_string(),
                    h.sats_amount.to_string(),
                    h.last_fiat_price.to_string(),
                    when,
                    h.transaction_id.map(|t| t.to_string()).unwrap_or_default(),
                    h.platform.clone().unwrap_or_default(),
                    format!("{}%", h.commission),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Sats", "Price", "Updated", "Tx", "Platform", "Commission"],
                rows,
            )
        );
    }
    Ok(())
}
