// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{Store, Table};
use crate::price::{CoinGeckoClient, PriceCache};
use crate::utils::{fmt_money, get_fiat_currency, set_fiat_currency};
use anyhow::Result;
use std::sync::Arc;

pub fn coingecko_cache() -> Result<PriceCache> {
    Ok(PriceCache::new(Arc::new(CoinGeckoClient::new()?)))
}

/// `--currency` if given, otherwise the stored display currency.
pub async fn currency_arg(store: &Store, sub: &clap::ArgMatches) -> Result<String> {
    match sub.get_one::<String>("currency") {
        Some(c) => Ok(c.trim().to_lowercase()),
        None => Ok(store.read(get_fiat_currency).await?),
    }
}

pub async fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("get", sub)) => {
            let ccy = currency_arg(store, sub).await?;
            let price = coingecko_cache()?.get_price(&ccy).await?;
            println!("1 BTC = {}", fmt_money(&price, &ccy));
        }
        Some(("set-currency", sub)) => {
            let ccy = sub.get_one::<String>("currency").unwrap().trim().to_lowercase();
            let stored = ccy.clone();
            store
                .write(&[Table::Settings], move |tx| set_fiat_currency(tx, &stored))
                .await?;
            println!("Display currency set to {}", ccy.to_uppercase());
        }
        _ => {}
    }
    Ok(())
}
