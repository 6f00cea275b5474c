// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::delete_bitcoin::delete_holding;
use super::delete_transaction::reverse_and_delete;
use crate::db::{Store, Table};
use crate::error::{LedgerError, Result};
use crate::models::TransactionType;
use crate::repo::{holdings, transactions};

/// Deletes a stored transaction by id, picking the right reversal.
///
/// A row with a linked holding goes through the holding path so both legs
/// disappear together, whatever its category. EXPENSE and uncategorized rows
/// are credited back; INCOME and unlinked BITCOIN rows are reversed by
/// subtracting their signed amount.
#[derive(Clone)]
pub struct RemoveTransaction {
    store: Store,
}

impl RemoveTransaction {
    pub fn new(store: Store) -> Self {
        RemoveTransaction { store }
    }

    pub async fn execute(&self, transaction_id: i64) -> Result<()> {
        self.store
            .write(
                &[Table::Accounts, Table::Transactions, Table::BitcoinHoldings],
                move |tx| {
                    let found = transactions::get_with_category(tx, transaction_id)?
                        .ok_or(LedgerError::TransactionNotFound(transaction_id))?;
                    if let Some(holding) = holdings::by_transaction_id(tx, transaction_id)? {
                        return delete_holding(tx, &holding);
                    }
                    // uncategorized rows were recorded as expenses
                    let is_expense = match found.category.as_ref().map(|c| c.transaction_type) {
                        Some(TransactionType::Income) | Some(TransactionType::Bitcoin) => false,
                        Some(TransactionType::Expense) | None => true,
                    };
                    reverse_and_delete(tx, &found.transaction, is_expense)
                },
            )
            .await
    }
}
