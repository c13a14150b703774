// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-owner KPI target documents.

use chrono::NaiveDateTime;
use rusqlite::params;
use rusqlite::types::Value;
use steeple_core::{KpiTarget, KpiTargetRecord, SteepleError};

use crate::database::{Database, encode_ts, map_tr_err};

/// A stored target cell. Anything but an integer reads as absent.
fn target_cell(value: Value) -> Option<i64> {
    match value {
        Value::Integer(n) => Some(n),
        _ => None,
    }
}

pub async fn list_targets(db: &Database) -> Result<Vec<KpiTargetRecord>, SteepleError> {
    db.connection()
        .call(|conn| {
            let mut stmt =
                conn.prepare("SELECT owner, calls, emails, messages FROM kpi_targets ORDER BY owner")?;
            let rows = stmt.query_map([], |row| {
                Ok(KpiTargetRecord {
                    owner: row.get(0)?,
                    calls: target_cell(row.get(1)?),
                    emails: target_cell(row.get(2)?),
                    messages: target_cell(row.get(3)?),
                })
            })?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Replace the target document for `owner`.
pub async fn upsert_target(
    db: &Database,
    owner: &str,
    target: &KpiTarget,
    now: NaiveDateTime,
) -> Result<(), SteepleError> {
    let owner = owner.to_string();
    let target = *target;
    let stamp = encode_ts(&now);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO kpi_targets (owner, calls, emails, messages, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(owner) DO UPDATE SET
                    calls = excluded.calls,
                    emails = excluded.emails,
                    messages = excluded.messages,
                    updated_at = excluded.updated_at",
                params![owner, target.calls, target.emails, target.messages, stamp],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
