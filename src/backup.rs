// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Full-dataset backup as one sectioned CSV document.
//!
//! ```text
//! [accounts]
//! id,name,current_balance,type
//! 1,Efectivo,120.50,Efectivo
//! [categories]
//! ...
//! ```
//!
//! Import replaces everything in a single transaction, keeping the ids found
//! in the document.

use crate::db::{Store, ALL_TABLES};
use crate::error::{LedgerError, Result};
use crate::models::{Account, BitcoinHolding, Budget, Category, Transaction, TransactionType};
use crate::repo::{accounts, budgets, categories, holdings, transactions};
use crate::utils::decimal_from_str;
use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use rust_decimal::Decimal;
use std::io::{Read, Write};

const ACCOUNTS: &str = "accounts";
const CATEGORIES: &str = "categories";
const BUDGETS: &str = "budgets";
const TRANSACTIONS: &str = "transactions";
const HOLDINGS: &str = "bitcoin_holdings";

const ACCOUNT_HEADER: &[&str] = &["id", "name", "current_balance", "type"];
const CATEGORY_HEADER: &[&str] = &["id", "name", "icon_name", "color_hex", "transaction_type"];
const BUDGET_HEADER: &[&str] = &["id", "category_id", "limit_amount", "period_month", "period_year"];
const TRANSACTION_HEADER: &[&str] = &["id", "account_id", "category_id", "amount", "date", "note"];
const HOLDING_HEADER: &[&str] = &[
    "id",
    "sats_amount",
    "last_fiat_price",
    "last_update",
    "transaction_id",
    "platform",
    "commission",
];

/// Everything a backup carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub accounts: Vec<Account>,
    pub categories: Vec<Category>,
    pub budgets: Vec<Budget>,
    pub transactions: Vec<Transaction>,
    pub holdings: Vec<BitcoinHolding>,
}

impl Dataset {
    pub fn row_count(&self) -> usize {
        self.accounts.len()
            + self.categories.len()
            + self.budgets.len()
            + self.transactions.len()
            + self.holdings.len()
    }
}

/// Reads the whole dataset in one snapshot.
pub async fn snapshot(store: &Store) -> Result<Dataset> {
    store
        .read(|conn| {
            Ok(Dataset {
                accounts: accounts::list(conn)?,
                categories: categories::list(conn)?,
                budgets: budgets::list(conn)?,
                transactions: transactions::list(conn)?,
                holdings: holdings::list(conn)?,
            })
        })
        .await
}

pub async fn export<W: Write>(store: &Store, out: W) -> Result<usize> {
    let data = snapshot(store).await?;
    encode(&data, out)?;
    tracing::info!(rows = data.row_count(), "backup exported");
    Ok(data.row_count())
}

/// Replaces the stored dataset with the one in `input` and returns the number
/// of rows inserted. On any error the stored data is left as it was.
pub async fn import<R: Read>(store: &Store, input: R) -> Result<usize> {
    let data = decode(input)?;
    let inserted = store
        .write(ALL_TABLES, move |tx| {
            transactions::delete_all(tx)?;
            budgets::delete_all(tx)?;
            holdings::delete_all(tx)?;
            categories::delete_all(tx)?;
            accounts::delete_all(tx)?;

            let mut n = accounts::insert_all(tx, &data.accounts)?;
            n += categories::insert_all(tx, &data.categories)?;
            n += budgets::insert_all(tx, &data.budgets)?;
            n += transactions::insert_all(tx, &data.transactions)?;
            n += holdings::insert_all(tx, &data.holdings)?;
            Ok(n)
        })
        .await?;
    tracing::info!(rows = inserted, "backup imported");
    Ok(inserted)
}

pub fn encode<W: Write>(data: &Dataset, out: W) -> Result<()> {
    let mut wtr = WriterBuilder::new()
        .flexible(true)
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(out);

    section(&mut wtr, ACCOUNTS, ACCOUNT_HEADER)?;
    for a in &data.accounts {
        wtr.write_record([
            a.id.to_string(),
            a.name.clone(),
            a.current_balance.to_string(),
            a.r#type.clone(),
        ])?;
    }

    section(&mut wtr, CATEGORIES, CATEGORY_HEADER)?;
    for c in &data.categories {
        wtr.write_record([
            c.id.to_string(),
            c.name.clone(),
            c.icon_name.clone(),
            c.color_hex.clone(),
            c.transaction_type.to_string(),
        ])?;
    }

    section(&mut wtr, BUDGETS, BUDGET_HEADER)?;
    for b in &data.budgets {
        wtr.write_record([
            b.id.to_string(),
            b.category_id.to_string(),
            b.limit_amount.to_string(),
            b.period_month.to_string(),
            b.period_year.to_string(),
        ])?;
    }

    section(&mut wtr, TRANSACTIONS, TRANSACTION_HEADER)?;
    for t in &data.transactions {
        wtr.write_record([
            t.id.to_string(),
            t.account_id.to_string(),
            t.category_id.map(|id| id.to_string()).unwrap_or_default(),
            t.amount.to_string(),
            t.date.to_string(),
            t.note.clone().unwrap_or_default(),
        ])?;
    }

    section(&mut wtr, HOLDINGS, HOLDING_HEADER)?;
    for h in &data.holdings {
        wtr.write_record([
            h.id.to_string(),
            h.sats_amount.to_string(),
            h.last_fiat_price.to_string(),
            h.last_update.to_string(),
            h.transaction_id.map(|id| id.to_string()).unwrap_or_default(),
            h.platform.clone().unwrap_or_default(),
            h.commission.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

fn section<W: Write>(wtr: &mut csv::Writer<W>, name: &str, header: &[&str]) -> Result<()> {
    wtr.write_record([format!("[{}]", name)])?;
    wtr.write_record(header)?;
    Ok(())
}

/// Parses a backup document without touching any store.
pub fn decode<R: Read>(input: R) -> Result<Dataset> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut data = Dataset::default();
    let mut current: Option<String> = None;
    let mut skip_header = false;

    for record in rdr.records() {
        let rec = record?;
        if let Some(name) = section_marker(&rec) {
            current = Some(name.to_string());
            skip_header = true;
            continue;
        }
        if skip_header {
            skip_header = false;
            continue;
        }
        let Some(name) = current.as_deref() else {
            tracing::debug!("ignoring row outside any section");
            continue;
        };
        match name {
            ACCOUNTS => data.accounts.push(parse_account(&rec)?),
            CATEGORIES => data.categories.push(parse_category(&rec)?),
            BUDGETS => data.budgets.push(parse_budget(&rec)?),
            TRANSACTIONS => data.transactions.push(parse_transaction(&rec)?),
            HOLDINGS => data.holdings.push(parse_holding(&rec)?),
            _ => {}
        }
    }
    Ok(data)
}

fn section_marker(rec: &StringRecord) -> Option<&str> {
    if rec.len() != 1 {
        return None;
    }
    let field = rec.get(0)?.trim();
    field.strip_prefix('[')?.strip_suffix(']')
}

/// Field accessor bound to one section, so every failure names it.
struct Fields<'a> {
    section: &'static str,
    rec: &'a StringRecord,
}

impl<'a> Fields<'a> {
    fn new(section: &'static str, rec: &'a StringRecord, min: usize) -> Result<Self> {
        if rec.len() < min {
            return Err(LedgerError::malformed(
                section,
                format!("expected at least {} columns, found {}", min, rec.len()),
            ));
        }
        Ok(Fields { section, rec })
    }

    fn text(&self, idx: usize) -> &'a str {
        self.rec.get(idx).unwrap_or("")
    }

    fn opt_text(&self, idx: usize) -> Option<String> {
        Some(self.text(idx)).filter(|s| !s.is_empty()).map(str::to_string)
    }

    fn int<T: std::str::FromStr>(&self, idx: usize, column: &str) -> Result<T> {
        let raw = self.text(idx).trim();
        raw.parse::<T>().map_err(|_| {
            LedgerError::malformed(self.section, format!("invalid {} '{}'", column, raw))
        })
    }

    fn opt_int(&self, idx: usize, column: &str) -> Result<Option<i64>> {
        if self.text(idx).trim().is_empty() {
            Ok(None)
        } else {
            self.int(idx, column).map(Some)
        }
    }

    fn decimal(&self, idx: usize, column: &str) -> Result<Decimal> {
        let raw = self.text(idx);
        decimal_from_str(raw).ok_or_else(|| {
            LedgerError::malformed(self.section, format!("invalid {} '{}'", column, raw))
        })
    }
}

fn parse_account(rec: &StringRecord) -> Result<Account> {
    let f = Fields::new(ACCOUNTS, rec, 4)?;
    Ok(Account {
        id: f.int(0, "id")?,
        name: f.text(1).to_string(),
        current_balance: f.decimal(2, "current_balance")?,
        r#type: f.text(3).to_string(),
    })
}

fn parse_category(rec: &StringRecord) -> Result<Category> {
    let f = Fields::new(CATEGORIES, rec, 5)?;
    let transaction_type = f
        .text(4)
        .parse::<TransactionType>()
        .map_err(|reason| LedgerError::malformed(CATEGORIES, reason))?;
    Ok(Category {
        id: f.int(0, "id")?,
        name: f.text(1).to_string(),
        icon_name: f.text(2).to_string(),
        color_hex: f.text(3).to_string(),
        transaction_type,
    })
}

fn parse_budget(rec: &StringRecord) -> Result<Budget> {
    let f = Fields::new(BUDGETS, rec, 5)?;
    Ok(Budget {
        id: f.int(0, "id")?,
        category_id: f.int(1, "category_id")?,
        limit_amount: f.decimal(2, "limit_amount")?,
        period_month: f.int(3, "period_month")?,
        period_year: f.int(4, "period_year")?,
    })
}

fn parse_transaction(rec: &StringRecord) -> Result<Transaction> {
    let f = Fields::new(TRANSACTIONS, rec, 5)?;
    Ok(Transaction {
        id: f.int(0, "id")?,
        account_id: f.int(1, "account_id")?,
        category_id: f.opt_int(2, "category_id")?,
        amount: f.decimal(3, "amount")?,
        date: f.int(4, "date")?,
        note: f.opt_text(5),
    })
}

fn parse_holding(rec: &StringRecord) -> Result<BitcoinHolding> {
    let f = Fields::new(HOLDINGS, rec, 4)?;
    let commission = if f.text(6).trim().is_empty() {
        Decimal::ZERO
    } else {
        f.decimal(6, "commission")?
    };
    Ok(BitcoinHolding {
        id: f.int(0, "id")?,
        sats_amount: f.int(1, "sats_amount")?,
        last_fiat_price: f.decimal(2, "last_fiat_price")?,
        last_update: f.int(3, "last_update")?,
        transaction_id: f.opt_int(4, "transaction_id")?,
        platform: f.opt_text(5),
        commission,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Table;

    fn sample() -> Dataset {
        Dataset {
            accounts: vec![
                Account {
                    id: 3,
                    name: "Banco, \"principal\"".into(),
                    current_balance: Decimal::new(120050, 2),
                    r#type: "BANK".into(),
                },
                Account {
                    id: 7,
                    name: "Efectivo".into(),
                    current_balance: Decimal::ZERO,
                    r#type: "Efectivo".into(),
                },
            ],
            categories: vec![
                Category {
                    id: 2,
                    name: "Comida".into(),
                    icon_name: "ic_food".into(),
                    color_hex: "#F44336".into(),
                    transaction_type: TransactionType::Expense,
                },
                Category {
                    id: 9,
                    name: "Bitcoin".into(),
                    icon_name: "ic_bitcoin".into(),
                    color_hex: "#EF6C00".into(),
                    transaction_type: TransactionType::Bitcoin,
                },
            ],
            budgets: vec![Budget {
                id: 1,
                category_id: 2,
                limit_amount: Decimal::from(300),
                period_month: 2,
                period_year: 2025,
            }],
            transactions: vec![
                Transaction {
                    id: 10,
                    account_id: 3,
                    category_id: Some(2),
                    amount: Decimal::new(1999, 2),
                    date: 1_740_000_000_000,
                    note: Some("pizza, beer\nand \"tips\"".into()),
                },
                Transaction {
                    id: 11,
                    account_id: 3,
                    category_id: Some(9),
                    amount: Decimal::from(-50),
                    date: 1_740_000_100_000,
                    note: Some("Compra Bitcoin (100000 sats)".into()),
                },
                Transaction {
                    id: 12,
                    account_id: 7,
                    category_id: None,
                    amount: Decimal::from(5),
                    date: 1_740_000_200_000,
                    note: None,
                },
            ],
            holdings: vec![BitcoinHolding {
                id: 4,
                sats_amount: 100_000,
                last_fiat_price: Decimal::from(50_000),
                last_update: 1_740_000_100_000,
                transaction_id: Some(11),
                platform: Some("Bisq".into()),
                commission: Decimal::new(15, 1),
            }],
        }
    }

    async fn store_with(data: &Dataset) -> Store {
        let store = Store::open_in_memory().unwrap();
        let mut buf = Vec::new();
        encode(data, &mut buf).unwrap();
        import(&store, buf.as_slice()).await.unwrap();
        store
    }

    #[test]
    fn layout_has_markers_headers_and_newlines() {
        let mut buf = Vec::new();
        encode(&Dataset::default(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "[accounts]\nid,name,current_balance,type\n\
             [categories]\nid,name,icon_name,color_hex,transaction_type\n\
             [budgets]\nid,category_id,limit_amount,period_month,period_year\n\
             [transactions]\nid,account_id,category_id,amount,date,note\n\
             [bitcoin_holdings]\nid,sats_amount,last_fiat_price,last_update,transaction_id,platform,commission\n"
        );
    }

    #[tokio::test]
    async fn import_of_export_reproduces_the_dataset() {
        let data = sample();
        let store = store_with(&data).await;

        let mut buf = Vec::new();
        let exported = export(&store, &mut buf).await.unwrap();
        assert_eq!(exported, data.row_count());

        let fresh = Store::open_in_memory().unwrap();
        let inserted = import(&fresh, buf.as_slice()).await.unwrap();
        assert_eq!(inserted, 9);

        let mut back = snapshot(&fresh).await.unwrap();
        let mut expected = data.clone();
        for d in [&mut back, &mut expected] {
            d.accounts.sort_by_key(|a| a.id);
            d.categories.sort_by_key(|c| c.id);
            d.transactions.sort_by_key(|t| t.id);
        }
        assert_eq!(back, expected);
    }

    #[tokio::test]
    async fn empty_document_clears_everything() {
        let store = store_with(&sample()).await;
        let mut buf = Vec::new();
        encode(&Dataset::default(), &mut buf).unwrap();
        assert_eq!(import(&store, buf.as_slice()).await.unwrap(), 0);
        assert_eq!(snapshot(&store).await.unwrap(), Dataset::default());
    }

    #[tokio::test]
    async fn short_row_is_rejected_and_data_kept() {
        let store = store_with(&sample()).await;
        let before = snapshot(&store).await.unwrap();

        let doc = "[accounts]\nid,name,current_balance,type\n1,Broken,10\n";
        let err = import(&store, doc.as_bytes()).await.unwrap_err();
        match err {
            LedgerError::MalformedBackupSection { section, .. } => assert_eq!(section, "accounts"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(snapshot(&store).await.unwrap(), before);
    }

    #[tokio::test]
    async fn dangling_reference_rolls_back() {
        let store = store_with(&sample()).await;
        let before = snapshot(&store).await.unwrap();

        // transaction points at an account that is not in the document
        let doc = "[accounts]\nid,name,current_balance,type\n1,A,0,CASH\n\
                   [transactions]\nid,account_id,category_id,amount,date,note\n1,99,,5,0,\n";
        let err = import(&store, doc.as_bytes()).await.unwrap_err();
        assert!(matches!(err, LedgerError::Database(_)));
        assert_eq!(snapshot(&store).await.unwrap(), before);
    }

    #[test]
    fn legacy_holdings_and_scientific_decimals_are_accepted() {
        let doc = "[bitcoin_holdings]\nid,sats_amount,last_fiat_price,last_update\n\
                   5,250000,6.5E4,1700000000000\n\
                   [unknown]\nwhatever,goes\n1,2\n";
        let data = decode(doc.as_bytes()).unwrap();
        assert_eq!(data.holdings.len(), 1);
        let h = &data.holdings[0];
        assert_eq!(h.last_fiat_price, Decimal::from(65_000));
        assert_eq!(h.transaction_id, None);
        assert_eq!(h.platform, None);
        assert_eq!(h.commission, Decimal::ZERO);
    }

    #[test]
    fn unknown_transaction_type_names_the_section() {
        let doc = "[categories]\nid,name,icon_name,color_hex,transaction_type\n1,X,ic,#000,TRANSFER\n";
        let err = decode(doc.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("[categories]"));
    }

    #[tokio::test]
    async fn import_notifies_observers() {
        let store = Store::open_in_memory().unwrap();
        let mut rx = store.subscribe();
        let mut buf = Vec::new();
        encode(&sample(), &mut buf).unwrap();
        import(&store, buf.as_slice()).await.unwrap();
        let touched = rx.recv().await.unwrap();
        assert!(touched.contains(&Table::Transactions));
        assert!(touched.contains(&Table::BitcoinHoldings));
    }
}
