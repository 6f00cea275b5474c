// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cli;
pub mod db;
pub mod error;
pub mod models;
pub mod utils;
pub mod repo;
pub mod ledger;
pub mod seed;
pub mod price;
pub mod cashflow;
pub mod portfolio;
pub mod backup;
pub mod commands;
