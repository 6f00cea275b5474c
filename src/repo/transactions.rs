// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::categories::from_row_at as category_at;
use super::decimal_at;
use crate::error::Result;
use crate::models::{NewTransaction, Transaction, TransactionWithCategory};
use rusqlite::{params, Connection, OptionalExtension, Row};

const COLUMNS: &str = "id, account_id, category_id, amount, date, note";

fn from_row(r: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: r.get(0)?,
        account_id: r.get(1)?,
        category_id: r.get(2)?,
        amount: decimal_at(r, 3)?,
        date: r.get(4)?,
        note: r.get(5)?,
    })
}

fn with_category_from_row(r: &Row<'_>) -> rusqlite::Result<TransactionWithCategory> {
    let transaction = from_row(r)?;
    let cat_id: Option<i64> = r.get(6)?;
    let category = match cat_id {
        Some(_) => Some(category_at(r, 6)?),
        None => None,
    };
    Ok(TransactionWithCategory {
        transaction,
        category,
    })
}

const JOINED: &str = "SELECT t.id, t.account_id, t.category_id, t.amount, t.date, t.note, \
     c.id, c.name, c.icon_name, c.color_hex, c.transaction_type \
     FROM transactions t LEFT JOIN categories c ON t.category_id = c.id";

/// Newest first.
pub fn list(conn: &Connection) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {COLUMNS} FROM transactions ORDER BY date DESC, id DESC"
    ))?;
    let rows = stmt.query_map([], from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn list_with_category(
    conn: &Connection,
    limit: Option<usize>,
) -> Result<Vec<TransactionWithCategory>> {
    let mut sql = format!("{JOINED} ORDER BY t.date DESC, t.id DESC");
    if let Some(limit) = limit {
        sql.push_str(&format!(" LIMIT {}", limit));
    }
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], with_category_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Transactions with `start <= date <= end` (epoch millis), oldest first.
pub fn by_date_range(
    conn: &Connection,
    start: i64,
    end: i64,
) -> Result<Vec<TransactionWithCategory>> {
    let mut stmt = conn.prepare_cached(&format!(
        "{JOINED} WHERE t.date BETWEEN ?1 AND ?2 ORDER BY t.date, t.id"
    ))?;
    let rows = stmt.query_map(params![start, end], with_category_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<Transaction>> {
    let mut stmt =
        conn.prepare_cached(&format!("SELECT {COLUMNS} FROM transactions WHERE id=?1"))?;
    Ok(stmt.query_row(params![id], from_row).optional()?)
}

pub fn get_with_category(conn: &Connection, id: i64) -> Result<Option<TransactionWithCategory>> {
    let mut stmt = conn.prepare_cached(&format!("{JOINED} WHERE t.id=?1"))?;
    Ok(stmt
        .query_row(params![id], with_category_from_row)
        .optional()?)
}

pub fn for_account(conn: &Connection, account_id: i64) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {COLUMNS} FROM transactions WHERE account_id=?1 ORDER BY date, id"
    ))?;
    let rows = stmt.query_map(params![account_id], from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// BITCOIN-category transactions with no holding pointing at them.
pub fn unlinked_bitcoin(conn: &Connection) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.account_id, t.category_id, t.amount, t.date, t.note \
         FROM transactions t JOIN categories c ON t.category_id = c.id \
         LEFT JOIN bitcoin_holdings h ON h.transaction_id = t.id \
         WHERE c.transaction_type = 'BITCOIN' AND h.id IS NULL ORDER BY t.id",
    )?;
    let rows = stmt.query_map([], from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn insert(conn: &Connection, tx: &NewTransaction) -> Result<i64> {
    conn.execute(
        "INSERT INTO transactions(account_id, category_id, amount, date, note) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            tx.account_id,
            tx.category_id,
            tx.amount.to_string(),
            tx.date,
            tx.note
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn delete(conn: &Connection, id: i64) -> Result<usize> {
    Ok(conn.execute("DELETE FROM transactions WHERE id=?1", params![id])?)
}

pub fn delete_all(conn: &Connection) -> Result<usize> {
    Ok(conn.execute("DELETE FROM transactions", [])?)
}

pub fn insert_all(conn: &Connection, transactions: &[Transaction]) -> Result<usize> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO transactions(id, account_id, category_id, amount, date, note) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for t in transactions {
        stmt.execute(params![
            t.id,
            t.account_id,
            t.category_id,
            t.amount.to_string(),
            t.date,
            t.note
        ])?;
    }
    Ok(transactions.len())
}
