// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::decimal_at;
use crate::error::Result;
use crate::models::Budget;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;

const COLUMNS: &str = "id, category_id, limit_amount, period_month, period_year";

fn from_row(r: &Row<'_>) -> rusqlite::Result<Budget> {
    Ok(Budget {
        id: r.get(0)?,
        category_id: r.get(1)?,
        limit_amount: decimal_at(r, 2)?,
        period_month: r.get(3)?,
        period_year: r.get(4)?,
    })
}

pub fn list(conn: &Connection) -> Result<Vec<Budget>> {
    let mut stmt = conn.prepare_cached(&format!("SELECT {COLUMNS} FROM budgets ORDER BY id"))?;
    let rows = stmt.query_map([], from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn for_period(conn: &Connection, month: u32, year: i32) -> Result<Vec<Budget>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {COLUMNS} FROM budgets WHERE period_month=?1 AND period_year=?2 ORDER BY category_id"
    ))?;
    let rows = stmt.query_map(params![month, year], from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Sets the limit for a category and period, replacing an existing one.
pub fn upsert(
    conn: &Connection,
    category_id: i64,
    limit: Decimal,
    month: u32,
    year: i32,
) -> Result<Budget> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM budgets WHERE category_id=?1 AND period_month=?2 AND period_year=?3",
            params![category_id, month, year],
            |r| r.get(0),
        )
        .optional()?;
    let id = match existing {
        Some(id) => {
            conn.execute(
                "UPDATE budgets SET limit_amount=?1 WHERE id=?2",
                params![limit.to_string(), id],
            )?;
            id
        }
        None => {
            conn.execute(
                "INSERT INTO budgets(category_id, limit_amount, period_month, period_year) VALUES (?1, ?2, ?3, ?4)",
                params![category_id, limit.to_string(), month, year],
            )?;
            conn.last_insert_rowid()
        }
    };
    Ok(Budget {
        id,
        category_id,
        limit_amount: limit,
        period_month: month,
        period_year: year,
    })
}

pub fn delete_all(conn: &Connection) -> Result<usize> {
    Ok(conn.execute("DELETE FROM budgets", [])?)
}

pub fn insert_all(conn: &Connection, budgets: &[Budget]) -> Result<usize> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO budgets(id, category_id, limit_amount, period_month, period_year) VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for b in budgets {
        stmt.execute(params![
            b.id,
            b.category_id,
            b.limit_amount.to_string(),
            b.period_month,
            b.period_year
        ])?;
    }
    Ok(budgets.len())
}
