// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turning parsed CSV rows into lead payloads.

use std::collections::HashSet;
use std::str::FromStr;

use steeple_core::dates::parse_us_date;
use steeple_core::{LivestreamStatus, NewLead, Stage, SteepleError};
use steeple_pipeline::dedupe::key_church;
use tracing::debug;

use crate::parse::{ParsedCsv, parse_csv};
use crate::schema::{CSV_HEADER, require_header};

/// Leads to create from one import, with dedupe bookkeeping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportPlan {
    /// New leads in file order.
    pub leads: Vec<NewLead>,
    /// Rows whose church already exists, or appeared earlier in the file.
    pub skipped: usize,
    /// Rows missing church name, city, or state.
    pub incomplete: usize,
}

fn column(row: &[String], name: &str) -> String {
    CSV_HEADER
        .iter()
        .position(|c| *c == name)
        .and_then(|i| row.get(i))
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

/// Map one data row to a lead payload.
///
/// Returns `None` when church name, city, or state is blank. A blank owner
/// becomes `default_owner`; a blank or unknown stage becomes Lead.
pub fn row_to_new_lead(row: &[String], default_owner: &str) -> Option<NewLead> {
    let church_name = column(row, "church_name");
    let city = column(row, "city");
    let state = column(row, "state");
    if church_name.is_empty() || city.is_empty() || state.is_empty() {
        return None;
    }

    let owner = match column(row, "owner") {
        o if o.is_empty() => default_owner.to_string(),
        o => o,
    };
    let stage = Stage::from_str(&column(row, "stage")).unwrap_or_default();
    let livestream_status = LivestreamStatus::from_str(&column(row, "has_livestream")).ok();

    Some(NewLead {
        church_name,
        website: column(row, "website"),
        livestream_status,
        livestream_url: column(row, "livestream_url"),
        city,
        state,
        contact_name: column(row, "contact_name"),
        contact_role: column(row, "contact_role"),
        phone: column(row, "phone"),
        email: column(row, "email"),
        owner,
        stage,
        tier_interest: column(row, "tier_interest"),
        estimated_gear_budget: column(row, "estimated_gear_budget"),
        notes: column(row, "notes"),
        next_follow_up_at: parse_us_date(&column(row, "next_followup_date")),
        ..NewLead::default()
    })
}

/// Build the import plan for already-parsed CSV.
///
/// `existing` holds the dedupe keys of leads already in the store. Keys of
/// accepted rows are added as they are seen, so duplicates within the file
/// are skipped too.
pub fn plan_parsed(
    parsed: &ParsedCsv,
    mut existing: HashSet<String>,
    default_owner: &str,
) -> Result<ImportPlan, SteepleError> {
    require_header(&parsed.header)?;

    let mut plan = ImportPlan::default();
    for row in &parsed.rows {
        let Some(lead) = row_to_new_lead(row, default_owner) else {
            plan.incomplete += 1;
            continue;
        };
        let key = key_church(&lead.church_name, &lead.city, &lead.state);
        if !existing.insert(key) {
            debug!(church = %lead.church_name, "skipping duplicate church");
            plan.skipped += 1;
            continue;
        }
        plan.leads.push(lead);
    }
    Ok(plan)
}

/// Parse `text` and build its import plan. Fails before any row on a bad header.
pub fn plan_import(
    text: &str,
    existing: HashSet<String>,
    default_owner: &str,
) -> Result<ImportPlan, SteepleError> {
    plan_parsed(&parse_csv(text), existing, default_owner)
}
