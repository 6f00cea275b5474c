// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Row-level access to each table.
//!
//! Every function takes a plain `&Connection`; callers that need atomicity
//! pass the `rusqlite::Transaction` opened by [`crate::db::Store::write`].

pub mod accounts;
pub mod budgets;
pub mod categories;
pub mod holdings;
pub mod transactions;

use rusqlite::types::Type;
use rusqlite::Row;
use rust_decimal::Decimal;

/// Money columns are stored as TEXT to keep exact decimal values.
pub(crate) fn decimal_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    raw.trim().parse::<Decimal>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
    })
}
