// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the Steeple CRM.
//!
//! WAL-mode SQLite with embedded migrations and a single writer thread via
//! `tokio-rusqlite`, exposed through the [`steeple_core::CrmStore`] trait.
//! Also holds the JSON-file preference store.

pub mod database;
pub mod migrations;
pub mod preferences;
pub mod queries;
pub mod store;

pub use database::Database;
pub use preferences::FilePreferences;
pub use store::SqliteStore;
