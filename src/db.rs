// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::Result;
use anyhow::Context;
use directories::ProjectDirs;
use futures::Stream;
use once_cell::sync::Lazy;
use rusqlite::{Connection, TransactionBehavior};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.federico", "MoneyTrack", "moneytrack"));

/// Environment variable that points the CLI at a specific database file.
pub const DB_ENV: &str = "MONEYTRACK_DB";

const CHANGE_BUS_CAPACITY: usize = 64;

pub fn db_path() -> anyhow::Result<PathBuf> {
    if let Ok(custom) = std::env::var(DB_ENV) {
        if !custom.trim().is_empty() {
            return Ok(PathBuf::from(custom.trim()));
        }
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("moneytrack.sqlite"))
}

pub fn open_or_init() -> anyhow::Result<Connection> {
    let path = db_path()?;
    open_at(&path).with_context(|| format!("Open DB at {}", path.display()))
}

pub fn open_at(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS accounts(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        current_balance TEXT NOT NULL DEFAULT '0',
        type TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        icon_name TEXT NOT NULL,
        color_hex TEXT NOT NULL,
        transaction_type TEXT NOT NULL
            CHECK(transaction_type IN ('INCOME','EXPENSE','BITCOIN'))
    );
    -- at most one BITCOIN category per dataset
    CREATE UNIQUE INDEX IF NOT EXISTS idx_categories_single_bitcoin
        ON categories(transaction_type) WHERE transaction_type = 'BITCOIN';

    CREATE TABLE IF NOT EXISTS budgets(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        category_id INTEGER NOT NULL,
        limit_amount TEXT NOT NULL,
        period_month INTEGER NOT NULL CHECK(period_month BETWEEN 1 AND 12),
        period_year INTEGER NOT NULL,
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_budgets_category ON budgets(category_id);

    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        account_id INTEGER NOT NULL,
        category_id INTEGER,
        amount TEXT NOT NULL,
        date INTEGER NOT NULL, -- epoch millis
        note TEXT,
        FOREIGN KEY(account_id) REFERENCES accounts(id) ON DELETE CASCADE,
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE SET NULL
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
    CREATE INDEX IF NOT EXISTS idx_transactions_account ON transactions(account_id);
    CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category_id);

    CREATE TABLE IF NOT EXISTS bitcoin_holdings(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        sats_amount INTEGER NOT NULL,
        last_fiat_price TEXT NOT NULL,
        last_update INTEGER NOT NULL,
        transaction_id INTEGER,
        platform TEXT,
        commission TEXT NOT NULL DEFAULT '0',
        FOREIGN KEY(transaction_id) REFERENCES transactions(id) ON DELETE SET NULL
    );
    CREATE INDEX IF NOT EXISTS idx_bitcoin_holdings_transaction
        ON bitcoin_holdings(transaction_id);
    "#,
    )?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Settings,
    Accounts,
    Categories,
    Budgets,
    Transactions,
    BitcoinHoldings,
}

pub const ALL_TABLES: &[Table] = &[
    Table::Settings,
    Table::Accounts,
    Table::Categories,
    Table::Budgets,
    Table::Transactions,
    Table::BitcoinHoldings,
];

/// Async handle over the single SQLite connection.
///
/// Statements run on the blocking pool. Every `write` is one `BEGIN IMMEDIATE`
/// transaction, so read-modify-write cycles on the same row serialize. After a
/// commit the touched tables are published on a broadcast bus that drives
/// [`Store::observe`].
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
    changes: broadcast::Sender<Vec<Table>>,
}

impl Store {
    pub fn new(conn: Connection) -> Self {
        let (changes, _rx) = broadcast::channel(CHANGE_BUS_CAPACITY);
        Store {
            conn: Arc::new(Mutex::new(conn)),
            changes,
        }
    }

    pub fn open(path: &Path) -> Result<Self> {
        Ok(Store::new(open_at(path)?))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Store::new(open_in_memory()?))
    }

    fn lock(conn: &Mutex<Connection>) -> MutexGuard<'_, Connection> {
        // a panicking writer never committed, so the connection is still usable
        conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub async fn read<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        task::spawn_blocking(move || {
            let guard = Self::lock(&conn);
            f(&guard)
        })
        .await?
    }

    /// Runs `f` inside one IMMEDIATE transaction. An error from `f` rolls the
    /// whole transaction back and nothing is published.
    pub async fn write<T, F>(&self, touched: &[Table], f: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Transaction<'_>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let out = task::spawn_blocking(move || {
            let mut guard = Self::lock(&conn);
            let tx = guard.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let out = f(&tx)?;
            tx.commit()?;
            Ok::<_, crate::error::LedgerError>(out)
        })
        .await??;
        self.publish(touched);
        Ok(out)
    }

    fn publish(&self, touched: &[Table]) {
        if touched.is_empty() {
            return;
        }
        // no subscribers is fine
        let _ = self.changes.send(touched.to_vec());
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Vec<Table>> {
        self.changes.subscribe()
    }

    /// Streams `query` now and again after every committed write touching one
    /// of `tables`. A lagged subscriber re-queries, so delivery is
    /// at-least-once. Dropping the stream unsubscribes.
    pub fn observe<T, F>(
        &self,
        tables: &'static [Table],
        query: F,
    ) -> impl Stream<Item = Result<T>> + Send + 'static
    where
        F: Fn(&Connection) -> Result<T> + Send + Sync + 'static,
        T: Send + 'static,
    {
        let rx = self.subscribe();
        let state = (self.clone(), Arc::new(query), rx, true);
        futures::stream::unfold(state, move |(store, query, mut rx, first)| async move {
            if !first {
                loop {
                    match rx.recv().await {
                        Ok(changed) if changed.iter().any(|t| tables.contains(t)) => break,
                        Ok(_) => continue,
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::debug!(skipped, "change bus lagged, re-querying");
                            break;
                        }
                        Err(RecvError::Closed) => return None,
                    }
                }
            }
            let q = Arc::clone(&query);
            let item = store.read(move |conn| q(conn)).await;
            Some((item, (store, query, rx, false)))
        })
    }
}
