// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::decimal_at;
use crate::error::Result;
use crate::models::Account;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;

const COLUMNS: &str = "id, name, current_balance, type";

fn from_row(r: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: r.get(0)?,
        name: r.get(1)?,
        current_balance: decimal_at(r, 2)?,
        r#type: r.get(3)?,
    })
}

pub fn list(conn: &Connection) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare_cached(&format!("SELECT {COLUMNS} FROM accounts ORDER BY id"))?;
    let rows = stmt.query_map([], from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<Account>> {
    let mut stmt = conn.prepare_cached(&format!("SELECT {COLUMNS} FROM accounts WHERE id=?1"))?;
    Ok(stmt.query_row(params![id], from_row).optional()?)
}

pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Account>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {COLUMNS} FROM accounts WHERE name=?1 ORDER BY id LIMIT 1"
    ))?;
    Ok(stmt.query_row(params![name], from_row).optional()?)
}

pub fn count(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM accounts", [], |r| r.get(0))?)
}

pub fn insert(conn: &Connection, name: &str, balance: Decimal, r#type: &str) -> Result<Account> {
    conn.execute(
        "INSERT INTO accounts(name, current_balance, type) VALUES (?1, ?2, ?3)",
        params![name, balance.to_string(), r#type],
    )?;
    Ok(Account {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        current_balance: balance,
        r#type: r#type.to_string(),
    })
}

pub fn update_balance(conn: &Connection, id: i64, balance: Decimal) -> Result<()> {
    conn.execute(
        "UPDATE accounts SET current_balance=?1 WHERE id=?2",
        params![balance.to_string(), id],
    )?;
    Ok(())
}

pub fn delete(conn: &Connection, id: i64) -> Result<usize> {
    Ok(conn.execute("DELETE FROM accounts WHERE id=?1", params![id])?)
}

pub fn delete_all(conn: &Connection) -> Result<usize> {
    Ok(conn.execute("DELETE FROM accounts", [])?)
}

/// Inserts rows keeping their ids.
pub fn insert_all(conn: &Connection, accounts: &[Account]) -> Result<usize> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO accounts(id, name, current_balance, type) VALUES (?1, ?2, ?3, ?4)",
    )?;
    for a in accounts {
        stmt.execute(params![a.id, a.name, a.current_balance.to_string(), a.r#type])?;
    }
    Ok(accounts.len())
}
