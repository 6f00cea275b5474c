// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{load_account, BITCOIN_SHORTFALL, FIAT_SHORTFALL};
use crate::db::{Store, Table};
use crate::error::{LedgerError, Result};
use crate::models::{BitcoinHolding, NewTransaction, TransactionType};
use crate::repo::{accounts, categories, holdings, transactions};
use crate::utils::now_millis;
use rust_decimal::Decimal;

/// One side of a fiat <-> sats swap as entered by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct BitcoinTrade {
    pub sats_amount: i64,
    pub fiat_amount: Decimal,
    pub account_id: i64,
    pub is_buy: bool,
    /// Fiat per whole BTC. Bookkeeping only, never re-fetched.
    pub price: Decimal,
    pub note: Option<String>,
    pub platform: Option<String>,
    pub commission: Decimal,
}

impl BitcoinTrade {
    pub fn buy(account_id: i64, sats_amount: i64, fiat_amount: Decimal, price: Decimal) -> Self {
        BitcoinTrade {
            sats_amount,
            fiat_amount,
            account_id,
            is_buy: true,
            price,
            note: None,
            platform: None,
            commission: Decimal::ZERO,
        }
    }

    pub fn sell(account_id: i64, sats_amount: i64, fiat_amount: Decimal, price: Decimal) -> Self {
        BitcoinTrade {
            is_buy: false,
            ..BitcoinTrade::buy(account_id, sats_amount, fiat_amount, price)
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    fn composed_note(&self) -> String {
        let verb = if self.is_buy { "Compra" } else { "Venta" };
        let base = format!("{} Bitcoin ({} sats)", verb, self.sats_amount);
        match self.note.as_deref().map(str::trim) {
            Some(user) if !user.is_empty() => format!("{} - {}", base, user),
            _ => base,
        }
    }
}

/// Records the fiat leg and the sats leg of a trade together.
#[derive(Clone)]
pub struct AddBitcoinTransaction {
    store: Store,
}

impl AddBitcoinTransaction {
    pub fn new(store: Store) -> Self {
        AddBitcoinTransaction { store }
    }

    /// Returns the id of the fiat-leg transaction.
    pub async fn execute(&self, trade: BitcoinTrade) -> Result<i64> {
        if trade.sats_amount <= 0 {
            return Err(LedgerError::InvalidAmount(format!(
                "sats amount must be positive, got {}",
                trade.sats_amount
            )));
        }
        if trade.fiat_amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "fiat amount must be positive, got {}",
                trade.fiat_amount
            )));
        }

        self.store
            .write(
                &[Table::Accounts, Table::Transactions, Table::BitcoinHoldings],
                move |tx| {
                    let account = load_account(tx, trade.account_id)?;
                    if trade.is_buy {
                        if account.current_balance < trade.fiat_amount {
                            return Err(LedgerError::InsufficientBalance(
                                FIAT_SHORTFALL.to_string(),
                            ));
                        }
                    } else if holdings::total_sats(tx)? < trade.sats_amount {
                        return Err(LedgerError::InsufficientBalance(
                            BITCOIN_SHORTFALL.to_string(),
                        ));
                    }

                    let new_balance = if trade.is_buy {
                        account.current_balance - trade.fiat_amount
                    } else {
                        account.current_balance + trade.fiat_amount
                    };
                    accounts::update_balance(tx, account.id, new_balance)?;

                    let category_id = categories::by_transaction_type(tx, TransactionType::Bitcoin)?
                        .map(|c| c.id);
                    if category_id.is_none() {
                        tracing::warn!("no BITCOIN category; fiat leg stored uncategorized");
                    }
                    let now = now_millis();
                    let transaction_id = transactions::insert(
                        tx,
                        &NewTransaction {
                            account_id: account.id,
                            category_id,
                            amount: if trade.is_buy {
                                -trade.fiat_amount
                            } else {
                                trade.fiat_amount
                            },
                            date: now,
                            note: Some(trade.composed_note()),
                        },
                    )?;

                    let sats = if trade.is_buy {
                        trade.sats_amount
                    } else {
                        -trade.sats_amount
                    };
                    let holding_id = holdings::insert(
                        tx,
                        &BitcoinHolding {
                            id: 0,
                            sats_amount: sats,
                            last_fiat_price: trade.price,
                            last_update: now,
                            transaction_id: Some(transaction_id),
                            platform: trade.platform.clone(),
                            commission: trade.commission,
                        },
                    )?;
                    tracing::debug!(
                        transaction_id,
                        holding_id,
                        sats,
                        %new_balance,
                        "bitcoin trade recorded"
                    );
                    Ok(transaction_id)
                },
            )
            .await
    }
}
