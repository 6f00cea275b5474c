// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::decimal_at;
use crate::error::Result;
use crate::models::BitcoinHolding;
use rusqlite::{params, Connection, OptionalExtension, Row};

const COLUMNS: &str =
    "id, sats_amount, last_fiat_price, last_update, transaction_id, platform, commission";

fn from_row(r: &Row<'_>) -> rusqlite::Result<BitcoinHolding> {
    Ok(BitcoinHolding {
        id: r.get(0)?,
        sats_amount: r.get(1)?,
        last_fiat_price: decimal_at(r, 2)?,
        last_update: r.get(3)?,
        transaction_id: r.get(4)?,
        platform: r.get(5)?,
        commission: decimal_at(r, 6)?,
    })
}

/// Newest first.
pub fn list(conn: &Connection) -> Result<Vec<BitcoinHolding>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {COLUMNS} FROM bitcoin_holdings ORDER BY last_update DESC, id DESC"
    ))?;
    let rows = stmt.query_map([], from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<BitcoinHolding>> {
    let mut stmt =
        conn.prepare_cached(&format!("SELECT {COLUMNS} FROM bitcoin_holdings WHERE id=?1"))?;
    Ok(stmt.query_row(params![id], from_row).optional()?)
}

pub fn total_sats(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT COALESCE(SUM(sats_amount), 0) FROM bitcoin_holdings",
        [],
        |r| r.get(0),
    )?)
}

pub fn by_transaction_id(conn: &Connection, transaction_id: i64) -> Result<Option<BitcoinHolding>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {COLUMNS} FROM bitcoin_holdings WHERE transaction_id=?1 ORDER BY id LIMIT 1"
    ))?;
    Ok(stmt.query_row(params![transaction_id], from_row).optional()?)
}

/// Inserts a holding and returns its generated id; `holding.id` is ignored.
pub fn insert(conn: &Connection, holding: &BitcoinHolding) -> Result<i64> {
    conn.execute(
        "INSERT INTO bitcoin_holdings(sats_amount, last_fiat_price, last_update, transaction_id, platform, commission) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            holding.sats_amount,
            holding.last_fiat_price.to_string(),
            holding.last_update,
            holding.transaction_id,
            holding.platform,
            holding.commission.to_string()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn delete(conn: &Connection, id: i64) -> Result<usize> {
    Ok(conn.execute("DELETE FROM bitcoin_holdings WHERE id=?1", params![id])?)
}

pub fn delete_all(conn: &Connection) -> Result<usize> {
    Ok(conn.execute("DELETE FROM bitcoin_holdings", [])?)
}

pub fn insert_all(conn: &Connection, holdings: &[BitcoinHolding]) -> Result<usize> {
    let mut stmt = conn.prepare_cached(&format!(
        "INSERT INTO bitcoin_holdings({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
    ))?;
    for h in holdings {
        stmt.execute(params![
            h.id,
            h.sats_amount,
            h.last_fiat_price.to_string(),
            h.last_update,
            h.transaction_id,
            h.platform,
            h.commission.to_string()
        ])?;
    }
    Ok(holdings.len())
}

/// Holdings whose linked transaction row no longer exists.
pub fn orphaned(conn: &Connection) -> Result<Vec<BitcoinHolding>> {
    let mut stmt = conn.prepare(
        "SELECT h.id, h.sats_amount, h.last_fiat_price, h.last_update, h.transaction_id, h.platform, h.commission \
         FROM bitcoin_holdings h LEFT JOIN transactions t ON h.transaction_id = t.id \
         WHERE h.transaction_id IS NOT NULL AND t.id IS NULL",
    )?;
    let rows = stmt.query_map([], from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
