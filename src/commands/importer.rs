// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::backup;
use crate::db::Store;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;

pub async fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("backup", sub)) => import_backup(store, sub).await,
        _ => Ok(()),
    }
}

/// Replaces every account, category, budget, transaction and holding with
/// the backup's content.
async fn import_backup(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let path = sub.get_one::<String>("path").unwrap().trim();
    let file = File::open(path).with_context(|| format!("Open backup {}", path))?;
    let rows = backup::import(store, BufReader::new(file))
        .await
        .with_context(|| format!("Import backup {}", path))?;
    println!("Imported {} rows from {}", rows, path);
    Ok(())
}
