// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection lifecycle, PRAGMAs, and timestamp encoding.
//!
//! Every statement runs on tokio-rusqlite's single background thread, so
//! `Database` is the one writer. Do not open extra connections for writes.

use std::path::Path;

use chrono::NaiveDateTime;
use steeple_core::SteepleError;
use tracing::debug;

use crate::migrations::run_migrations;

/// Text encoding of every stored instant.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

pub fn encode_ts(at: &NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Decode a stored instant; malformed text reads as absent.
pub fn decode_ts(text: Option<String>) -> Option<NaiveDateTime> {
    text.and_then(|t| NaiveDateTime::parse_from_str(&t, TIMESTAMP_FORMAT).ok())
}

/// Convert a tokio-rusqlite error into `SteepleError::Storage`.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> SteepleError {
    SteepleError::storage(e)
}

/// An open, migrated SQLite database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path`, set PRAGMAs, and migrate.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, SteepleError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(SteepleError::storage)?;
            }
        }
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(SteepleError::storage)?;
        Self::prepare(conn, wal_mode).await
    }

    /// An in-memory database, mainly for tests.
    pub async fn open_in_memory() -> Result<Self, SteepleError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(SteepleError::storage)?;
        Self::prepare(conn, false).await
    }

    async fn prepare(conn: tokio_rusqlite::Connection, wal_mode: bool) -> Result<Self, SteepleError> {
        conn.call(move |conn| -> Result<(), SteepleError> {
            let journal = if wal_mode { "WAL" } else { "DELETE" };
            conn.execute_batch(&format!(
                "PRAGMA journal_mode = {journal};
                 PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;"
            ))
            .map_err(SteepleError::storage)?;
            run_migrations(conn)
        })
        .await
        .map_err(|e| match e {
            tokio_rusqlite::Error::Error(inner) => inner,
            other => SteepleError::storage(other),
        })?;
        debug!(wal_mode, "database ready");
        Ok(Self { conn })
    }

    /// The underlying connection handle.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL so the main file is self-contained.
    pub async fn checkpoint(&self) -> Result<(), SteepleError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    #[test]
    fn timestamps_roundtrip_with_millis() {
        let at = NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_milli_opt(9, 5, 3, 42)
            .unwrap();
        assert_eq!(encode_ts(&at), "2026-10-16T09:05:03.042");
        assert_eq!(decode_ts(Some(encode_ts(&at))), Some(at));
        assert_eq!(decode_ts(Some("yesterday".into())), None);
        assert_eq!(decode_ts(None), None);
    }

    #[tokio::test]
    async fn open_creates_file_and_schema() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("crm.db");
        let db = Database::open(path.to_str().unwrap(), true).await.unwrap();
        assert!(path.exists());

        let tables: Vec<String> = db
            .connection()
            .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
                )?;
                let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
                rows.collect()
            })
            .await
            .unwrap();
        for expected in ["activities", "calendar_availability", "kpi_targets", "leads"] {
            assert!(tables.iter().any(|t| t == expected), "missing {expected}");
        }
        db.checkpoint().await.unwrap();
    }

    #[tokio::test]
    async fn reopening_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("crm.db");
        let path = path.to_str().unwrap();
        drop(Database::open(path, true).await.unwrap());
        Database::open(path, true).await.unwrap();
    }
}
