// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead CRUD.

use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::types::Value;
use rusqlite::{Row, params, params_from_iter};
use steeple_core::{ActivityType, Lead, LeadPatch, LivestreamStatus, NewLead, Stage, SteepleError};

use crate::database::{Database, decode_ts, encode_ts, map_tr_err};

const COLUMNS: &str = "id, church_name, website, livestream_status, livestream_url, city, state, \
     contact_name, contact_role, phone, email, owner, stage, tier_interest, \
     estimated_gear_budget, notes, next_follow_up_at, last_activity_type, last_activity_at, \
     deposit_paid, deposit_amount, deposit_paid_at, created_at, updated_at, closed_at";

fn row_to_lead(row: &Row<'_>) -> rusqlite::Result<Lead> {
    let livestream: Option<String> = row.get(3)?;
    let stage: String = row.get(12)?;
    let last_type: Option<String> = row.get(17)?;
    Ok(Lead {
        id: row.get(0)?,
        church_name: row.get(1)?,
        website: row.get(2)?,
        livestream_status: livestream.and_then(|s| LivestreamStatus::from_str(&s).ok()),
        livestream_url: row.get(4)?,
        city: row.get(5)?,
        state: row.get(6)?,
        contact_name: row.get(7)?,
        contact_role: row.get(8)?,
        phone: row.get(9)?,
        email: row.get(10)?,
        owner: row.get(11)?,
        stage: Stage::from_str(&stage).unwrap_or_default(),
        tier_interest: row.get(13)?,
        estimated_gear_budget: row.get(14)?,
        notes: row.get(15)?,
        next_follow_up_at: decode_ts(row.get(16)?),
        last_activity_type: last_type.and_then(|t| ActivityType::from_str(&t).ok()),
        last_activity_at: decode_ts(row.get(18)?),
        deposit_paid: row.get(19)?,
        deposit_amount: row.get(20)?,
        deposit_paid_at: decode_ts(row.get(21)?),
        created_at: decode_ts(row.get(22)?),
        updated_at: decode_ts(row.get(23)?),
        closed_at: decode_ts(row.get(24)?),
    })
}

fn ts_value(at: Option<NaiveDateTime>) -> Value {
    at.map_or(Value::Null, |t| Value::Text(encode_ts(&t)))
}

/// Insert a lead with a fresh id, stamped `now` for both create and update.
pub async fn insert_lead(
    db: &Database,
    id: &str,
    lead: &NewLead,
    now: NaiveDateTime,
) -> Result<(), SteepleError> {
    let id = id.to_string();
    let lead = lead.clone();
    let stamp = encode_ts(&now);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO leads (id, church_name, website, livestream_status, livestream_url, \
                 city, state, contact_name, contact_role, phone, email, owner, stage, \
                 tier_interest, estimated_gear_budget, notes, next_follow_up_at, deposit_paid, \
                 deposit_amount, deposit_paid_at, created_at, updated_at, closed_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, \
                 ?17, ?18, ?19, ?20, ?21, ?21, ?22)",
                params![
                    id,
                    lead.church_name,
                    lead.website,
                    lead.livestream_status.map(|s| s.to_string()),
                    lead.livestream_url,
                    lead.city,
                    lead.state,
                    lead.contact_name,
                    lead.contact_role,
                    lead.phone,
                    lead.email,
                    lead.owner,
                    lead.stage.to_string(),
                    lead.tier_interest,
                    lead.estimated_gear_budget,
                    lead.notes,
                    lead.next_follow_up_at.as_ref().map(encode_ts),
                    lead.deposit_paid,
                    lead.deposit_amount,
                    lead.deposit_paid_at.as_ref().map(encode_ts),
                    stamp,
                    lead.closed_at.as_ref().map(encode_ts),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_lead(db: &Database, id: &str) -> Result<Option<Lead>, SteepleError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let sql = format!("SELECT {COLUMNS} FROM leads WHERE id = ?1");
            match conn.query_row(&sql, params![id], row_to_lead) {
                Ok(lead) => Ok(Some(lead)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// All leads, most recently updated first.
pub async fn list_leads(db: &Database) -> Result<Vec<Lead>, SteepleError> {
    db.connection()
        .call(|conn| {
            let sql = format!("SELECT {COLUMNS} FROM leads ORDER BY updated_at DESC, rowid DESC");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], row_to_lead)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Column assignments for a merge patch. `updated_at` is always included.
fn patch_assignments(patch: &LeadPatch, now: NaiveDateTime) -> Vec<(&'static str, Value)> {
    let mut sets: Vec<(&'static str, Value)> = Vec::new();
    if let Some(owner) = &patch.owner {
        sets.push(("owner", Value::Text(owner.clone())));
    }
    if let Some(stage) = patch.stage {
        sets.push(("stage", Value::Text(stage.to_string())));
    }
    if let Some(tier) = &patch.tier_interest {
        sets.push(("tier_interest", Value::Text(tier.clone())));
    }
    if let Some(budget) = &patch.estimated_gear_budget {
        sets.push(("estimated_gear_budget", Value::Text(budget.clone())));
    }
    if let Some(notes) = &patch.notes {
        sets.push(("notes", Value::Text(notes.clone())));
    }
    if let Some(next) = patch.next_follow_up_at {
        sets.push(("next_follow_up_at", ts_value(next)));
    }
    if let Some(kind) = patch.last_activity_type {
        sets.push(("last_activity_type", Value::Text(kind.to_string())));
    }
    if let Some(at) = patch.last_activity_at {
        sets.push(("last_activity_at", ts_value(Some(at))));
    }
    if let Some(paid) = patch.deposit_paid {
        sets.push(("deposit_paid", Value::Integer(i64::from(paid))));
    }
    if let Some(amount) = patch.deposit_amount {
        sets.push(("deposit_amount", amount.map_or(Value::Null, Value::Real)));
    }
    if let Some(paid_at) = patch.deposit_paid_at {
        sets.push(("deposit_paid_at", ts_value(paid_at)));
    }
    if let Some(closed_at) = patch.closed_at {
        sets.push(("closed_at", ts_value(Some(closed_at))));
    }
    sets.push(("updated_at", Value::Text(encode_ts(&now))));
    sets
}

/// Merge `patch` into lead `id`. Returns false if no such lead exists.
pub async fn update_lead(
    db: &Database,
    id: &str,
    patch: &LeadPatch,
    now: NaiveDateTime,
) -> Result<bool, SteepleError> {
    let sets = patch_assignments(patch, now);
    let clause = sets
        .iter()
        .enumerate()
        .map(|(i, (col, _))| format!("{col} = ?{}", i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!("UPDATE leads SET {clause} WHERE id = ?{}", sets.len() + 1);
    let mut values: Vec<Value> = sets.into_iter().map(|(_, v)| v).collect();
    values.push(Value::Text(id.to_string()));

    db.connection()
        .call(move |conn| {
            let changed = conn.execute(&sql, params_from_iter(values))?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a lead and its activities in one transaction.
pub async fn delete_lead(db: &Database, id: &str) -> Result<bool, SteepleError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM activities WHERE lead_id = ?1", params![id])?;
            let removed = tx.execute("DELETE FROM leads WHERE id = ?1", params![id])?;
            tx.commit()?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn patch_always_bumps_updated_at() {
        let sets = patch_assignments(&LeadPatch::default(), at(9));
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].0, "updated_at");
    }

    #[test]
    fn clearing_a_nullable_field_writes_null() {
        let patch = LeadPatch {
            next_follow_up_at: Some(None),
            deposit_amount: Some(None),
            ..LeadPatch::default()
        };
        let sets = patch_assignments(&patch, at(9));
        assert_eq!(sets[0], ("next_follow_up_at", Value::Null));
        assert_eq!(sets[1], ("deposit_amount", Value::Null));
    }

    #[tokio::test]
    async fn update_of_missing_lead_reports_false() {
        let db = Database::open_in_memory().await.unwrap();
        let changed = update_lead(&db, "nope", &LeadPatch::default(), at(9))
            .await
            .unwrap();
        assert!(!changed);
    }
}
