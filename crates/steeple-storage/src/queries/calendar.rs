// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared availability calendar.

use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{Row, params};
use steeple_core::{AvailabilityType, CalendarEntry, NewCalendarEntry, SteepleError};

use crate::database::{Database, decode_ts, encode_ts, map_tr_err};

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<CalendarEntry> {
    Ok(CalendarEntry {
        id: row.get(0)?,
        lead_id: row.get(1)?,
        church_name: row.get(2)?,
        owner: row.get(3)?,
        availability_type: AvailabilityType::from_str(&row.get::<_, String>(4)?)
            .unwrap_or_default(),
        notes: row.get(5)?,
        starts_on: decode_ts(row.get(6)?),
        created_by: row.get(7)?,
        created_at: decode_ts(row.get(8)?),
        updated_at: decode_ts(row.get(9)?),
    })
}

pub async fn insert_entry(
    db: &Database,
    id: &str,
    entry: &NewCalendarEntry,
    now: NaiveDateTime,
) -> Result<(), SteepleError> {
    let id = id.to_string();
    let entry = entry.clone();
    let stamp = encode_ts(&now);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO calendar_availability (id, lead_id, church_name, owner, \
                 availability_type, notes, starts_on, created_by, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
                params![
                    id,
                    entry.lead_id,
                    entry.church_name,
                    entry.owner,
                    entry.availability_type.to_string(),
                    entry.notes,
                    encode_ts(&entry.starts_on),
                    entry.created_by,
                    stamp,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn delete_entry(db: &Database, id: &str) -> Result<bool, SteepleError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let removed =
                conn.execute("DELETE FROM calendar_availability WHERE id = ?1", params![id])?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// All entries, earliest start first.
pub async fn list_entries(db: &Database) -> Result<Vec<CalendarEntry>, SteepleError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, lead_id, church_name, owner, availability_type, notes, starts_on, \
                 created_by, created_at, updated_at \
                 FROM calendar_availability ORDER BY starts_on ASC, rowid ASC",
            )?;
            let rows = stmt.query_map([], row_to_entry)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })
        .await
        .map_err(map_tr_err)
}
