// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::backup;
use crate::db::Store;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;

pub async fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("backup", sub)) => export_backup(store, sub).await,
        _ => Ok(()),
    }
}

async fn export_backup(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let out = sub.get_one::<String>("out").unwrap().trim();
    let file = File::create(out).with_context(|| format!("Create backup file {}", out))?;
    let rows = backup::export(store, BufWriter::new(file))
        .await
        .with_context(|| format!("Write backup to {}", out))?;
    println!("Exported {} rows to {}", rows, out);
    Ok(())
}
