// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{load_account, FIAT_SHORTFALL};
use crate::db::{Store, Table};
use crate::error::{LedgerError, Result};
use crate::models::{NewTransaction, Transaction};
use crate::repo::{accounts, transactions};

/// Records a transaction and moves its account balance.
#[derive(Clone)]
pub struct AddTransaction {
    store: Store,
}

impl AddTransaction {
    pub fn new(store: Store) -> Self {
        AddTransaction { store }
    }

    /// `amount` is applied as given: subtracted for an expense, added otherwise.
    pub async fn execute(&self, new_tx: NewTransaction, is_expense: bool) -> Result<Transaction> {
        self.store
            .write(&[Table::Transactions, Table::Accounts], move |tx| {
                let account = load_account(tx, new_tx.account_id)?;
                if is_expense && account.current_balance < new_tx.amount {
                    return Err(LedgerError::InsufficientBalance(FIAT_SHORTFALL.to_string()));
                }

                let id = transactions::insert(tx, &new_tx)?;
                let new_balance = if is_expense {
                    account.current_balance - new_tx.amount
                } else {
                    account.current_balance + new_tx.amount
                };
                accounts::update_balance(tx, account.id, new_balance)?;
                tracing::debug!(
                    transaction_id = id,
                    account_id = account.id,
                    %new_balance,
                    is_expense,
                    "transaction added"
                );
                Ok(new_tx.into_stored(id))
            })
            .await
    }
}
