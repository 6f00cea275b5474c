// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Bitcoin spot price lookup with a single-slot cache.

use crate::error::{LedgerError, Result};
use crate::utils::http_client;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub const COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";
pub const PRICE_TTL: Duration = Duration::from_secs(600);
const COIN_ID: &str = "bitcoin";
const QUOTED_CURRENCIES: &[&str] = &["usd", "eur"];

/// External quote service.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Spot prices of `ids[0]` keyed by lower-case vs-currency.
    async fn fetch_spot_price(
        &self,
        ids: &[&str],
        vs_currencies: &[&str],
    ) -> Result<HashMap<String, Decimal>>;
}

#[derive(Debug, Deserialize)]
struct SimplePrice(HashMap<String, HashMap<String, f64>>);

pub struct CoinGeckoClient {
    client: reqwest::Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(COINGECKO_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Ok(CoinGeckoClient {
            client: http_client()?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl PriceOracle for CoinGeckoClient {
    async fn fetch_spot_price(
        &self,
        ids: &[&str],
        vs_currencies: &[&str],
    ) -> Result<HashMap<String, Decimal>> {
        let url = format!("{}/simple/price", self.base_url.trim_end_matches('/'));
        let resp = self
            .client
            .get(url)
            .query(&[("ids", ids.join(",")), ("vs_currencies", vs_currencies.join(","))])
            .send()
            .await?
            .error_for_status()?;
        let body: SimplePrice = resp.json().await?;
        let coin = ids.first().copied().unwrap_or(COIN_ID);
        let quotes = body
            .0
            .get(coin)
            .ok_or_else(|| LedgerError::PriceFetchFailure(format!("no quotes for '{}'", coin)))?;

        let mut out = HashMap::with_capacity(quotes.len());
        for (ccy, px) in quotes {
            let d = Decimal::try_from(*px).map_err(|e| {
                LedgerError::PriceFetchFailure(format!("invalid {} price {}: {}", ccy, px, e))
            })?;
            out.insert(ccy.to_lowercase(), d);
        }
        Ok(out)
    }
}

#[derive(Debug, Clone)]
struct CachedPrice {
    price: Decimal,
    currency: String,
    fetched_at: Instant,
}

/// Process-wide cache in front of a [`PriceOracle`].
///
/// The slot lock is held across the fetch, so any number of callers that find
/// the slot stale produce exactly one upstream request.
#[derive(Clone)]
pub struct PriceCache {
    oracle: Arc<dyn PriceOracle>,
    slot: Arc<Mutex<Option<CachedPrice>>>,
    ttl: Duration,
}

impl PriceCache {
    pub fn new(oracle: Arc<dyn PriceOracle>) -> Self {
        Self::with_ttl(oracle, PRICE_TTL)
    }

    pub fn with_ttl(oracle: Arc<dyn PriceOracle>, ttl: Duration) -> Self {
        PriceCache {
            oracle,
            slot: Arc::new(Mutex::new(None)),
            ttl,
        }
    }

    pub async fn get_price(&self, currency: &str) -> Result<Decimal> {
        let currency = currency.trim().to_lowercase();
        let mut slot = self.slot.lock().await;
        if let Some(cached) = slot.as_ref() {
            if cached.currency == currency && cached.fetched_at.elapsed() < self.ttl {
                return Ok(cached.price);
            }
        }

        let mut vs: Vec<&str> = QUOTED_CURRENCIES.to_vec();
        if !vs.contains(&currency.as_str()) {
            vs.push(currency.as_str());
        }
        let quotes = self.oracle.fetch_spot_price(&[COIN_ID], &vs).await?;
        let price = quotes.get(&currency).copied().ok_or_else(|| {
            LedgerError::PriceFetchFailure(format!("no {} quote returned", currency))
        })?;
        tracing::debug!(%price, currency = %currency, "bitcoin price refreshed");
        *slot = Some(CachedPrice {
            price,
            currency,
            fetched_at: Instant::now(),
        });
        Ok(price)
    }
}
