// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::load_account;
use crate::db::{Store, Table};
use crate::error::{LedgerError, Result};
use crate::models::Transaction;
use crate::repo::{accounts, transactions};
use rusqlite::Connection;

/// Exact inverse of [`super::AddTransaction`].
#[derive(Clone)]
pub struct DeleteTransaction {
    store: Store,
}

impl DeleteTransaction {
    pub fn new(store: Store) -> Self {
        DeleteTransaction { store }
    }

    pub async fn execute(&self, transaction: Transaction, is_expense: bool) -> Result<()> {
        self.store
            .write(
                &[Table::Transactions, Table::Accounts, Table::BitcoinHoldings],
                move |tx| reverse_and_delete(tx, &transaction, is_expense),
            )
            .await
    }
}

pub(super) fn reverse_and_delete(
    conn: &Connection,
    transaction: &Transaction,
    is_expense: bool,
) -> Result<()> {
    let account = load_account(conn, transaction.account_id)?;
    if transactions::get(conn, transaction.id)?.is_none() {
        return Err(LedgerError::TransactionNotFound(transaction.id));
    }

    let new_balance = if is_expense {
        account.current_balance + transaction.amount
    } else {
        account.current_balance - transaction.amount
    };
    accounts::update_balance(conn, account.id, new_balance)?;
    transactions::delete(conn, transaction.id)?;
    tracing::debug!(
        transaction_id = transaction.id,
        account_id = account.id,
        %new_balance,
        "transaction deleted"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::AddTransaction;
    use crate::models::NewTransaction;
    use rust_decimal::Decimal;

    async fn setup(balance: i64) -> (Store, i64) {
        let store = Store::open_in_memory().unwrap();
        let id = store
            .write(&[Table::Accounts], move |tx| {
                Ok(accounts::insert(tx, "Efectivo", Decimal::from(balance), "CASH")?.id)
            })
            .await
            .unwrap();
        (store, id)
    }

    async fn balance(store: &Store, id: i64) -> Decimal {
        store
            .read(move |c| accounts::get(c, id))
            .await
            .unwrap()
            .unwrap()
            .current_balance
    }

    #[tokio::test]
    async fn delete_inverts_add_for_both_directions() {
        let (store, id) = setup(100).await;
        let add = AddTransaction::new(store.clone());
        let del = DeleteTransaction::new(store.clone());

        for is_expense in [true, false] {
            let t = add
                .execute(
                    NewTransaction {
                        account_id: id,
                        category_id: None,
                        amount: Decimal::new(3725, 2),
                        date: 0,
                        note: None,
                    },
                    is_expense,
                )
                .await
                .unwrap();
            assert_ne!(balance(&store, id).await, Decimal::from(100));
            del.execute(t, is_expense).await.unwrap();
            assert_eq!(balance(&store, id).await, Decimal::from(100));
        }
    }

    #[tokio::test]
    async fn second_delete_does_not_reverse_twice() {
        let (store, id) = setup(100).await;
        let t = AddTransaction::new(store.clone())
            .execute(
                NewTransaction {
                    account_id: id,
                    category_id: None,
                    amount: Decimal::from(100),
                    date: 0,
                    note: None,
                },
                true,
            )
            .await
            .unwrap();
        assert_eq!(balance(&store, id).await, Decimal::ZERO);

        let del = DeleteTransaction::new(store.clone());
        del.execute(t.clone(), true).await.unwrap();
        assert_eq!(balance(&store, id).await, Decimal::from(100));

        let err = del.execute(t, true).await.unwrap_err();
        assert!(matches!(err, LedgerError::TransactionNotFound(_)));
        assert_eq!(balance(&store, id).await, Decimal::from(100));
    }

    #[tokio::test]
    async fn vanished_account_fails() {
        let store = Store::open_in_memory().unwrap();
        let t = Transaction {
            id: 1,
            account_id: 7,
            category_id: None,
            amount: Decimal::ONE,
            date: 0,
            note: None,
        };
        let err = DeleteTransaction::new(store).execute(t, false).await.unwrap_err();
        assert!(matches!(err, LedgerError::AccountNotFound(7)));
    }
}
