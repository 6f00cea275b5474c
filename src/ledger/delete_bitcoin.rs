// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{Store, Table};
use crate::error::Result;
use crate::models::BitcoinHolding;
use crate::repo::{accounts, holdings, transactions};
use rusqlite::Connection;

/// Removes a holding and, when linked, its fiat leg with balance reversal.
#[derive(Clone)]
pub struct DeleteBitcoinTransaction {
    store: Store,
}

impl DeleteBitcoinTransaction {
    pub fn new(store: Store) -> Self {
        DeleteBitcoinTransaction { store }
    }

    pub async fn execute(&self, holding: BitcoinHolding) -> Result<()> {
        self.store
            .write(
                &[Table::Accounts, Table::Transactions, Table::BitcoinHoldings],
                move |tx| delete_holding(tx, &holding),
            )
            .await
    }
}

pub(super) fn delete_holding(conn: &Connection, holding: &BitcoinHolding) -> Result<()> {
    if let Some(txid) = holding.transaction_id {
        match transactions::get(conn, txid)? {
            Some(fiat_leg) => {
                match accounts::get(conn, fiat_leg.account_id)? {
                    Some(account) => {
                        // signed amount: buys were negative, sells positive
                        let new_balance = account.current_balance - fiat_leg.amount;
                        accounts::update_balance(conn, account.id, new_balance)?;
                    }
                    None => tracing::warn!(
                        account_id = fiat_leg.account_id,
                        "fiat leg account missing; balance not reversed"
                    ),
                }
                transactions::delete(conn, txid)?;
            }
            // nothing left to reverse
            None => tracing::warn!(
                holding_id = holding.id,
                transaction_id = txid,
                "linked transaction missing; deleting holding without balance reversal"
            ),
        }
    }
    holdings::delete(conn, holding.id)?;
    tracing::debug!(holding_id = holding.id, sats = holding.sats_amount, "holding deleted");
    Ok(())
}
