// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite log store for Ampwatch.
//!
//! Provides an append-only `electricity_log` table with embedded migrations,
//! a single-writer connection via `tokio-rusqlite`, and connect-with-retry
//! that reports exhaustion as an explicit error.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use adapter::SqliteLogStore;
pub use database::Database;
