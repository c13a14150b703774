// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local preference keys and restoring UI state from them.

use std::str::FromStr;

use chrono::NaiveDateTime;
use steeple_core::dates::{month_key, parse_iso_date_input, parse_month_key, week_start};
use steeple_core::{ALL_FILTER, OWNERS, PreferenceStore, Stage};
use steeple_pipeline::LeadFilter;

use crate::state::View;

pub const VIEW: &str = "crm:view";
pub const USER_OWNER: &str = "crm:userOwner";
pub const QUICK_OWNER: &str = "crm:quickOwner";
pub const STAGE_FILTER: &str = "crm:stageFilter";
pub const SEARCH: &str = "crm:search";
pub const CALENDAR_MONTH: &str = "crm:calendarMonth";
pub const KPI_WEEK_START: &str = "crm:kpiWeekStart";

/// Every key written by the controller.
pub const ALL_KEYS: [&str; 7] = [
    VIEW,
    USER_OWNER,
    QUICK_OWNER,
    STAGE_FILTER,
    SEARCH,
    CALENDAR_MONTH,
    KPI_WEEK_START,
];

/// UI settings restored at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredPrefs {
    pub view: View,
    pub user_owner: String,
    pub filter: LeadFilter,
    pub calendar_month: String,
    pub kpi_week_start: NaiveDateTime,
}

pub fn is_roster_owner(owner: &str) -> bool {
    OWNERS.contains(&owner)
}

/// Canonical stage-filter value for `raw`, or `None` if it names no stage.
pub fn canonical_stage_filter(raw: &str) -> Option<String> {
    if raw == ALL_FILTER {
        return Some(ALL_FILTER.to_string());
    }
    Stage::from_str(raw.trim()).ok().map(|s| s.to_string())
}

/// Canonical owner-filter value for `raw`, or `None` if it is not `ALL` or a roster owner.
pub fn canonical_owner_filter(raw: &str) -> Option<String> {
    if raw == ALL_FILTER || is_roster_owner(raw) {
        Some(raw.to_string())
    } else {
        None
    }
}

/// Read every preference, falling back to defaults for missing or invalid values.
pub fn restore(prefs: &dyn PreferenceStore, default_owner: &str, now: NaiveDateTime) -> RestoredPrefs {
    let view = prefs
        .get(VIEW)
        .and_then(|v| View::from_str(&v).ok())
        .unwrap_or_default();

    let user_owner = prefs
        .get(USER_OWNER)
        .filter(|o| is_roster_owner(o))
        .unwrap_or_else(|| default_owner.to_string());

    let filter = LeadFilter {
        owner: prefs
            .get(QUICK_OWNER)
            .and_then(|o| canonical_owner_filter(&o))
            .unwrap_or_else(|| ALL_FILTER.to_string()),
        stage: prefs
            .get(STAGE_FILTER)
            .and_then(|s| canonical_stage_filter(&s))
            .unwrap_or_else(|| ALL_FILTER.to_string()),
        search: prefs.get(SEARCH).unwrap_or_default(),
    };

    let calendar_month = prefs
        .get(CALENDAR_MONTH)
        .filter(|k| parse_month_key(k).is_some())
        .unwrap_or_else(|| month_key(&now));

    let kpi_week_start = prefs
        .get(KPI_WEEK_START)
        .and_then(|d| parse_iso_date_input(&d))
        .map(week_start)
        .unwrap_or_else(|| week_start(now));

    RestoredPrefs {
        view,
        user_owner,
        filter,
        calendar_month,
        kpi_week_start,
    }
}
