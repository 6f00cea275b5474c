// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::Result;
use crate::models::{Category, TransactionType};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

const COLUMNS: &str = "id, name, icon_name, color_hex, transaction_type";

pub(crate) fn type_at(r: &Row<'_>, idx: usize) -> rusqlite::Result<TransactionType> {
    let raw: String = r.get(idx)?;
    raw.parse::<TransactionType>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into())
    })
}

pub(crate) fn from_row_at(r: &Row<'_>, offset: usize) -> rusqlite::Result<Category> {
    Ok(Category {
        id: r.get(offset)?,
        name: r.get(offset + 1)?,
        icon_name: r.get(offset + 2)?,
        color_hex: r.get(offset + 3)?,
        transaction_type: type_at(r, offset + 4)?,
    })
}

fn from_row(r: &Row<'_>) -> rusqlite::Result<Category> {
    from_row_at(r, 0)
}

pub fn list(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt =
        conn.prepare_cached(&format!("SELECT {COLUMNS} FROM categories ORDER BY id"))?;
    let rows = stmt.query_map([], from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<Category>> {
    let mut stmt =
        conn.prepare_cached(&format!("SELECT {COLUMNS} FROM categories WHERE id=?1"))?;
    Ok(stmt.query_row(params![id], from_row).optional()?)
}

pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Category>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {COLUMNS} FROM categories WHERE name=?1 ORDER BY id LIMIT 1"
    ))?;
    Ok(stmt.query_row(params![name], from_row).optional()?)
}

/// First category of the given type, by id.
pub fn by_transaction_type(conn: &Connection, ty: TransactionType) -> Result<Option<Category>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {COLUMNS} FROM categories WHERE transaction_type=?1 ORDER BY id LIMIT 1"
    ))?;
    Ok(stmt.query_row(params![ty.as_str()], from_row).optional()?)
}

pub fn count(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM categories", [], |r| r.get(0))?)
}

pub fn insert(
    conn: &Connection,
    name: &str,
    icon_name: &str,
    color_hex: &str,
    ty: TransactionType,
) -> Result<Category> {
    conn.execute(
        "INSERT INTO categories(name, icon_name, color_hex, transaction_type) VALUES (?1, ?2, ?3, ?4)",
        params![name, icon_name, color_hex, ty.as_str()],
    )?;
    Ok(Category {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        icon_name: icon_name.to_string(),
        color_hex: color_hex.to_string(),
        transaction_type: ty,
    })
}

/// Returns the BITCOIN category, creating it when missing. Run it inside a
/// write transaction; the partial unique index rejects a second one anyway.
pub fn ensure_bitcoin(conn: &Connection) -> Result<Category> {
    if let Some(existing) = by_transaction_type(conn, TransactionType::Bitcoin)? {
        return Ok(existing);
    }
    insert(conn, "Bitcoin", "ic_bitcoin", "#EF6C00", TransactionType::Bitcoin)
}

pub fn delete(conn: &Connection, id: i64) -> Result<usize> {
    Ok(conn.execute("DELETE FROM categories WHERE id=?1", params![id])?)
}

pub fn delete_all(conn: &Connection) -> Result<usize> {
    Ok(conn.execute("DELETE FROM categories", [])?)
}

pub fn insert_all(conn: &Connection, categories: &[Category]) -> Result<usize> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO categories(id, name, icon_name, color_hex, transaction_type) VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for c in categories {
        stmt.execute(params![
            c.id,
            c.name,
            c.icon_name,
            c.color_hex,
            c.transaction_type.as_str()
        ])?;
    }
    Ok(categories.len())
}
