// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::Store;
use crate::models::TransactionType;
use crate::repo::{categories, holdings, transactions};
use crate::utils::pretty_table;
use anyhow::Result;

/// Consistency findings as `(issue, detail)` pairs.
pub async fn diagnose(store: &Store) -> Result<Vec<(String, String)>> {
    let (orphans, unlinked, sats, bitcoin_cat) = store
        .read(|c| {
            Ok((
                holdings::orphaned(c)?,
                transactions::unlinked_bitcoin(c)?,
                holdings::total_sats(c)?,
                categories::by_transaction_type(c, TransactionType::Bitcoin)?,
            ))
        })
        .await?;

    let mut rows = Vec::new();
    // 1) Holdings whose fiat leg is gone
    for h in orphans {
        rows.push((
            "holding_without_transaction".to_string(),
            format!("holding {} ({} sats)", h.id, h.sats_amount),
        ));
    }
    // 2) Fiat legs whose holding is gone
    for t in unlinked {
        rows.push((
            "bitcoin_transaction_without_holding".to_string(),
            format!("transaction {} ({})", t.id, t.amount),
        ));
    }
    // 3) Position below zero
    if sats < 0 {
        rows.push(("negative_sats_total".to_string(), format!("{} sats", sats)));
    }
    // 4) Missing singleton
    if bitcoin_cat.is_none() {
        rows.push(("missing_bitcoin_category".to_string(), "run `moneytrack init`".to_string()));
    }
    Ok(rows)
}

pub async fn handle(store: &Store) -> Result<()> {
    let rows = diagnose(store).await?;
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        let rows = rows.into_iter().map(|(i, d)| vec![i, d]).collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
