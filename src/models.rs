// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const SATS_PER_BTC: i64 = 100_000_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub current_balance: Decimal,
    pub r#type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Income,
    Expense,
    Bitcoin,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "INCOME",
            TransactionType::Expense => "EXPENSE",
            TransactionType::Bitcoin => "BITCOIN",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INCOME" => Ok(TransactionType::Income),
            "EXPENSE" => Ok(TransactionType::Expense),
            "BITCOIN" => Ok(TransactionType::Bitcoin),
            other => Err(format!("unknown transaction type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub icon_name: String,
    pub color_hex: String,
    pub transaction_type: TransactionType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub category_id: i64,
    pub limit_amount: Decimal,
    pub period_month: u32, // 1-12
    pub period_year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub account_id: i64,
    pub category_id: Option<i64>,
    pub amount: Decimal,
    pub date: i64, // epoch millis
    pub note: Option<String>,
}

/// A transaction that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub account_id: i64,
    pub category_id: Option<i64>,
    pub amount: Decimal,
    pub date: i64,
    pub note: Option<String>,
}

impl NewTransaction {
    pub fn into_stored(self, id: i64) -> Transaction {
        Transaction {
            id,
            account_id: self.account_id,
            category_id: self.category_id,
            amount: self.amount,
            date: self.date,
            note: self.note,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionWithCategory {
    pub transaction: Transaction,
    pub category: Option<Category>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BitcoinHolding {
    pub id: i64,
    pub sats_amount: i64,
    pub last_fiat_price: Decimal,
    pub last_update: i64, // epoch millis
    pub transaction_id: Option<i64>,
    pub platform: Option<String>,
    pub commission: Decimal, // percent
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyBucket {
    pub label: String,
    pub date: NaiveDate,
    pub income_amount: Decimal,
    pub expense_amount: Decimal,
    pub bitcoin_amount: Decimal,
}

impl DailyBucket {
    pub fn empty(label: String, date: NaiveDate) -> Self {
        DailyBucket {
            label,
            date,
            income_amount: Decimal::ZERO,
            expense_amount: Decimal::ZERO,
            bitcoin_amount: Decimal::ZERO,
        }
    }
}

/// Price implied by a trade: fiat paid per whole bitcoin.
pub fn implied_price(sats: i64, fiat: Decimal) -> Option<Decimal> {
    if sats == 0 {
        return None;
    }
    let btc = Decimal::from(sats) / Decimal::from(SATS_PER_BTC);
    fiat.checked_div(btc)
}
