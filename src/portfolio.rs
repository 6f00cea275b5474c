// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Dashboard totals: fiat balance across accounts and the fiat value of the
//! sats position.

use crate::db::{Store, Table};
use crate::error::Result;
use crate::models::SATS_PER_BTC;
use crate::price::PriceCache;
use crate::repo::{accounts, holdings};
use futures::{Stream, StreamExt};
use rust_decimal::Decimal;

pub fn total_balance(store: &Store) -> impl Stream<Item = Result<Decimal>> + Send + 'static {
    store.observe(&[Table::Accounts], |conn| {
        Ok(accounts::list(conn)?
            .iter()
            .map(|a| a.current_balance)
            .sum::<Decimal>())
    })
}

pub fn sats_to_fiat(sats: i64, price: Decimal) -> Decimal {
    Decimal::from(sats) / Decimal::from(SATS_PER_BTC) * price
}

/// Fiat value of all holdings, re-emitted when holdings change.
///
/// Each emission asks the price cache, so the quote is at most one TTL old. A
/// failed lookup is shown as a zero value rather than failing the stream.
pub fn bitcoin_value(
    store: &Store,
    prices: PriceCache,
    currency: String,
) -> impl Stream<Item = Result<Decimal>> + Send + 'static {
    store
        .observe(&[Table::BitcoinHoldings], holdings::total_sats)
        .then(move |sats| {
            let prices = prices.clone();
            let currency = currency.clone();
            async move {
                let sats = sats?;
                let price = match prices.get_price(&currency).await {
                    Ok(p) => p,
                    Err(err) => {
                        tracing::warn!(error = %err, "bitcoin price unavailable, valuing at zero");
                        Decimal::ZERO
                    }
                };
                Ok(sats_to_fiat(sats, price))
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{AddBitcoinTransaction, BitcoinTrade};
    use crate::price::tests::FixedOracle;
    use std::sync::Arc;

    #[test]
    fn one_coin_is_worth_the_price() {
        assert_eq!(sats_to_fiat(SATS_PER_BTC, Decimal::from(60_000)), Decimal::from(60_000));
        assert_eq!(sats_to_fiat(50_000_000, Decimal::from(60_000)), Decimal::from(30_000));
    }

    #[tokio::test]
    async fn total_balance_tracks_accounts() {
        let store = Store::open_in_memory().unwrap();
        let mut stream = Box::pin(total_balance(&store));
        assert_eq!(stream.next().await.unwrap().unwrap(), Decimal::ZERO);
        store
            .write(&[Table::Accounts], |tx| {
                accounts::insert(tx, "A", Decimal::from(10), "CASH")?;
                accounts::insert(tx, "B", Decimal::new(525, 2), "BANK")?;
                Ok(())
            })
            .await
            .unwrap();
        assert_eq!(stream.next().await.unwrap().unwrap(), Decimal::new(1525, 2));
    }

    #[tokio::test]
    async fn value_follows_holdings_and_degrades_to_zero() {
        let store = Store::open_in_memory().unwrap();
        let account_id = store
            .write(&[Table::Accounts], |tx| {
                Ok(accounts::insert(tx, "Banco", Decimal::from(5000), "BANK")?.id)
            })
            .await
            .unwrap();

        let prices = PriceCache::new(Arc::new(FixedOracle::new(65_000, 60_000)));
        let mut value = Box::pin(bitcoin_value(&store, prices, "eur".into()));
        assert_eq!(value.next().await.unwrap().unwrap(), Decimal::ZERO);

        AddBitcoinTransaction::new(store.clone())
            .execute(BitcoinTrade::buy(
                account_id,
                SATS_PER_BTC / 2,
                Decimal::from(30_000),
                Decimal::from(60_000),
            ))
            .await
            .unwrap_err(); // only 5000 available
        AddBitcoinTransaction::new(store.clone())
            .execute(BitcoinTrade::buy(
                account_id,
                100_000,
                Decimal::from(60),
                Decimal::from(60_000),
            ))
            .await
            .unwrap();
        assert_eq!(value.next().await.unwrap().unwrap(), Decimal::from(60));

        let offline = PriceCache::new(Arc::new(FixedOracle::failing()));
        let mut zero = Box::pin(bitcoin_value(&store, offline, "eur".into()));
        assert_eq!(zero.next().await.unwrap().unwrap(), Decimal::ZERO);
    }
}
