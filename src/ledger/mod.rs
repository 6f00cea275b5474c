// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Balance-mutating use cases.
//!
//! Each `execute` validates first and then applies all of its effects inside a
//! single store transaction, so a failed call leaves nothing behind and two
//! calls against the same account never interleave their read and write of
//! `current_balance`.

mod add_bitcoin;
mod add_transaction;
mod delete_bitcoin;
mod delete_transaction;
mod remove_transaction;

pub use add_bitcoin::{AddBitcoinTransaction, BitcoinTrade};
pub use add_transaction::AddTransaction;
pub use delete_bitcoin::DeleteBitcoinTransaction;
pub use delete_transaction::DeleteTransaction;
pub use remove_transaction::RemoveTransaction;

pub const FIAT_SHORTFALL: &str = "Saldo insuficiente en la cuenta";
pub const BITCOIN_SHORTFALL: &str = "Saldo insuficiente de Bitcoin";

use crate::error::{LedgerError, Result};
use crate::models::Account;
use crate::repo::accounts;
use rusqlite::Connection;

pub(crate) fn load_account(conn: &Connection, id: i64) -> Result<Account> {
    accounts::get(conn, id)?.ok_or(LedgerError::AccountNotFound(id))
}
