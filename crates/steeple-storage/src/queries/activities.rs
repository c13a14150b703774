// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Activity log operations.

use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{Row, params};
use steeple_core::{Activity, ActivityType, NewActivity, SteepleError};
use tracing::warn;

use crate::database::{Database, decode_ts, encode_ts, map_tr_err};

const COLUMNS: &str = "id, lead_id, type, notes, happened_at, created_at, owner";

/// Rows whose type is not a known activity type read as `None`.
fn row_to_activity(row: &Row<'_>) -> rusqlite::Result<Option<Activity>> {
    let id: String = row.get(0)?;
    let raw_type: String = row.get(2)?;
    let Ok(activity_type) = ActivityType::from_str(&raw_type) else {
        warn!(%id, activity_type = %raw_type, "skipping activity with unknown type");
        return Ok(None);
    };
    Ok(Some(Activity {
        id,
        lead_id: row.get(1)?,
        activity_type,
        notes: row.get(3)?,
        happened_at: decode_ts(row.get(4)?),
        created_at: decode_ts(row.get(5)?),
        owner: row.get(6)?,
    }))
}

pub async fn insert_activity(
    db: &Database,
    id: &str,
    lead_id: &str,
    activity: &NewActivity,
    now: NaiveDateTime,
) -> Result<(), SteepleError> {
    let id = id.to_string();
    let lead_id = lead_id.to_string();
    let activity = activity.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO activities (id, lead_id, type, notes, happened_at, created_at, owner)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    id,
                    lead_id,
                    activity.activity_type.to_string(),
                    activity.notes,
                    encode_ts(&activity.happened_at),
                    encode_ts(&now),
                    activity.owner,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// The `limit` most recent activities of one lead, newest first.
pub async fn list_for_lead(
    db: &Database,
    lead_id: &str,
    limit: usize,
) -> Result<Vec<Activity>, SteepleError> {
    let lead_id = lead_id.to_string();
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| {
            let sql = format!(
                "SELECT {COLUMNS} FROM activities WHERE lead_id = ?1
                 ORDER BY happened_at DESC, created_at DESC LIMIT ?2"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![lead_id, limit], row_to_activity)?;
            rows.filter_map(Result::transpose)
                .collect::<rusqlite::Result<Vec<_>>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Every activity, oldest first.
pub async fn list_all(db: &Database) -> Result<Vec<Activity>, SteepleError> {
    db.connection()
        .call(|conn| {
            let sql = format!("SELECT {COLUMNS} FROM activities ORDER BY happened_at, created_at");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], row_to_activity)?;
            rows.filter_map(Result::transpose)
                .collect::<rusqlite::Result<Vec<_>>>()
        })
        .await
        .map_err(map_tr_err)
}
