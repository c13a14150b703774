// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document builders for tests.

use chrono::{NaiveDate, NaiveDateTime};
use steeple_core::{Activity, ActivityType, Lead, NewLead, Stage};

/// A minimal valid lead payload in Austin, TX.
pub fn new_lead(church_name: &str, owner: &str) -> NewLead {
    NewLead {
        church_name: church_name.to_string(),
        city: "Austin".into(),
        state: "TX".into(),
        owner: owner.to_string(),
        ..NewLead::default()
    }
}

/// A stored lead with the given id, owner, and stage.
pub fn lead(id: &str, church_name: &str, owner: &str, stage: Stage) -> Lead {
    Lead {
        id: id.to_string(),
        church_name: church_name.to_string(),
        city: "Austin".into(),
        state: "TX".into(),
        owner: owner.to_string(),
        stage,
        ..Lead::default()
    }
}

/// A stored activity.
pub fn activity(
    id: &str,
    lead_id: &str,
    kind: ActivityType,
    happened_at: NaiveDateTime,
    owner: Option<&str>,
) -> Activity {
    Activity {
        id: id.to_string(),
        lead_id: lead_id.to_string(),
        activity_type: kind,
        notes: String::new(),
        happened_at: Some(happened_at),
        created_at: Some(happened_at),
        owner: owner.map(str::to_string),
    }
}

/// Local date-time shorthand. Panics on an invalid date.
pub fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .unwrap_or_else(|| panic!("invalid fixture date {year}-{month}-{day} {hour}:00"))
}
