// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, Utc};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use std::sync::Once;

use crate::db::Store;
use crate::models::{Account, Category};
use crate::repo;

const UA: &str = concat!("moneytrack/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_FIAT: &str = "eur";

static TRACING_INIT: Once = Once::new();

/// Installs the global `tracing` subscriber; `RUST_LOG` refines the default.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::from_default_env().add_directive(
            "moneytrack=info"
                .parse()
                .unwrap_or_else(|_| tracing_subscriber::filter::LevelFilter::INFO.into()),
        );
        fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    });
}

pub fn http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(15))
        .user_agent(UA)
        .build()
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// `YYYY-MM` -> (year, month)
pub fn parse_month(s: &str) -> Result<(i32, u32)> {
    let d = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
    Ok((d.year(), d.month()))
}

/// Accepts plain (`12.50`) and scientific (`1.5E7`) notation.
pub fn decimal_from_str(s: &str) -> Option<Decimal> {
    let s = s.trim();
    s.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(s).ok())
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    decimal_from_str(s).with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{} {}", d.round_dp(2), ccy.to_uppercase())
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

fn find_account(conn: &Connection, reference: &str) -> crate::error::Result<Option<Account>> {
    match reference.parse::<i64>() {
        Ok(id) => repo::accounts::get(conn, id),
        Err(_) => repo::accounts::find_by_name(conn, reference),
    }
}

fn find_category(conn: &Connection, reference: &str) -> crate::error::Result<Option<Category>> {
    match reference.parse::<i64>() {
        Ok(id) => repo::categories::get(conn, id),
        Err(_) => repo::categories::find_by_name(conn, reference),
    }
}

/// Resolves an account by numeric id or by name.
pub async fn account_by_ref(store: &Store, reference: &str) -> Result<Account> {
    let reference = reference.trim().to_string();
    let key = reference.clone();
    store
        .read(move |c| find_account(c, &key))
        .await?
        .with_context(|| format!("Account '{}' not found", reference))
}

pub async fn category_by_ref(store: &Store, reference: &str) -> Result<Category> {
    let reference = reference.trim().to_string();
    let key = reference.clone();
    store
        .read(move |c| find_category(c, &key))
        .await?
        .with_context(|| format!("Category '{}' not found", reference))
}

// Display currency settings
pub fn get_fiat_currency(conn: &Connection) -> crate::error::Result<String> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key='fiat_currency'",
            [],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v.unwrap_or_else(|| DEFAULT_FIAT.to_string()))
}

pub fn set_fiat_currency(conn: &Connection, ccy: &str) -> crate::error::Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES('fiat_currency', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![ccy.trim().to_lowercase()],
    )?;
    Ok(())
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // arrays stream one element per line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_accepts_scientific_notation() {
        assert_eq!(decimal_from_str("12.50"), Some(Decimal::new(1250, 2)));
        assert_eq!(decimal_from_str("1.5E7"), Some(Decimal::from(15_000_000)));
        assert_eq!(decimal_from_str(" -0.25 "), Some(Decimal::new(-25, 2)));
        assert!(decimal_from_str("abc").is_none());
    }

    #[test]
    fn month_parses_into_year_and_month() {
        assert_eq!(parse_month("2025-02").unwrap(), (2025, 2));
        assert!(parse_month("2025-13").is_err());
    }

    #[test]
    fn fiat_currency_defaults_and_updates() {
        let conn = crate::db::open_in_memory().unwrap();
        assert_eq!(get_fiat_currency(&conn).unwrap(), "eur");
        set_fiat_currency(&conn, "USD").unwrap();
        assert_eq!(get_fiat_currency(&conn).unwrap(), "usd");
    }

    #[tokio::test]
    async fn references_resolve_by_id_or_name() {
        let store = Store::open_in_memory().unwrap();
        let acct = store
            .write(&[], |tx| repo::accounts::insert(tx, "Banco", Decimal::from(5), "BANK"))
            .await
            .unwrap();
        assert_eq!(account_by_ref(&store, "Banco").await.unwrap(), acct);
        assert_eq!(account_by_ref(&store, &acct.id.to_string()).await.unwrap(), acct);
        let err = account_by_ref(&store, "Nope").await.unwrap_err();
        assert!(err.to_string().contains("Nope"));
    }
}
