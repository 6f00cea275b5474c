// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! First-run defaults.

use crate::db::{Store, Table};
use crate::error::Result;
use crate::models::TransactionType;
use crate::repo::{accounts, categories};
use rust_decimal::Decimal;

const DEFAULT_CATEGORIES: &[(&str, &str, &str, TransactionType)] = &[
    ("Salario", "ic_salary", "#4CAF50", TransactionType::Income),
    ("Comida", "ic_food", "#F44336", TransactionType::Expense),
    ("Transporte", "ic_transport", "#2196F3", TransactionType::Expense),
    ("Ocio", "ic_leisure", "#9C27B0", TransactionType::Expense),
    ("Hogar", "ic_home", "#FF9800", TransactionType::Expense),
    ("Salud", "ic_health", "#E91E63", TransactionType::Expense),
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub accounts: usize,
    pub categories: usize,
}

/// Inserts the default cash account and categories into empty tables and
/// makes sure the BITCOIN category exists. Running it again is a no-op.
pub async fn seed_if_empty(store: &Store) -> Result<SeedReport> {
    let report = store
        .write(&[Table::Accounts, Table::Categories], |tx| {
            let mut report = SeedReport::default();
            if accounts::count(tx)? == 0 {
                accounts::insert(tx, "Efectivo", Decimal::ZERO, "Efectivo")?;
                report.accounts += 1;
            }
            if categories::count(tx)? == 0 {
                for (name, icon, color, ty) in DEFAULT_CATEGORIES {
                    categories::insert(tx, name, icon, color, *ty)?;
                    report.categories += 1;
                }
            }
            let had_bitcoin =
                categories::by_transaction_type(tx, TransactionType::Bitcoin)?.is_some();
            categories::ensure_bitcoin(tx)?;
            if !had_bitcoin {
                report.categories += 1;
            }
            Ok(report)
        })
        .await?;
    if report != SeedReport::default() {
        tracing::info!(
            accounts = report.accounts,
            categories = report.categories,
            "seeded defaults"
        );
    }
    Ok(report)
}
