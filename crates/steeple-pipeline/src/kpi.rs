// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Weekly KPI counters and targets.
//!
//! Counts are per owner and per metric over a Monday-anchored week
//! `[start, start + 7 days)`. An activity is attributed to its own
//! denormalized owner when it has one, else to the current owner of its
//! lead. Older activities predate the denormalized field, so the join path
//! is still required.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDateTime;
use steeple_core::dates::{add_days, week_end};
use steeple_core::{
    Activity, ActivityType, KpiMetric, KpiTarget, KpiTargetRecord, Lead, OWNERS, SteepleError,
};

/// Metric an activity type counts toward, if any.
pub fn kpi_metric(kind: ActivityType) -> Option<KpiMetric> {
    match kind {
        ActivityType::CallAttempted | ActivityType::CallConnected | ActivityType::VoicemailLeft => {
            Some(KpiMetric::Calls)
        }
        ActivityType::EmailSent => Some(KpiMetric::Emails),
        ActivityType::TextSms => Some(KpiMetric::Messages),
        _ => None,
    }
}

/// Counts for one owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KpiTotals {
    pub calls: u32,
    pub emails: u32,
    pub messages: u32,
}

impl KpiTotals {
    pub fn get(&self, metric: KpiMetric) -> u32 {
        match metric {
            KpiMetric::Calls => self.calls,
            KpiMetric::Emails => self.emails,
            KpiMetric::Messages => self.messages,
        }
    }

    fn bump(&mut self, metric: KpiMetric) {
        match metric {
            KpiMetric::Calls => self.calls += 1,
            KpiMetric::Emails => self.emails += 1,
            KpiMetric::Messages => self.messages += 1,
        }
    }
}

/// Boundaries of a KPI week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KpiWindow {
    /// Monday 00:00, inclusive.
    pub start: NaiveDateTime,
    /// `start + 7 days`, exclusive.
    pub end_exclusive: NaiveDateTime,
    /// Last instant of the seventh day, for display.
    pub end: NaiveDateTime,
}

impl KpiWindow {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            start,
            end_exclusive: add_days(start, 7),
            end: week_end(start),
        }
    }

    pub fn contains(&self, at: &NaiveDateTime) -> bool {
        *at >= self.start && *at < self.end_exclusive
    }
}

/// Aggregated counts for every rostered owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KpiReport {
    pub window: KpiWindow,
    pub totals: BTreeMap<String, KpiTotals>,
}

impl KpiReport {
    pub fn totals_for(&self, owner: &str) -> KpiTotals {
        self.totals.get(owner).copied().unwrap_or_default()
    }
}

/// Resolve the owner an activity is credited to.
fn attributed_owner<'a>(
    activity: &'a Activity,
    lead_owners: &HashMap<&str, &'a str>,
) -> Option<&'a str> {
    match activity.owner.as_deref() {
        Some(owner) if !owner.is_empty() => Some(owner),
        _ => lead_owners
            .get(activity.lead_id.as_str())
            .copied()
            .filter(|o| !o.is_empty()),
    }
}

/// Count activities per owner and metric within the week starting at `week_start`.
pub fn aggregate(activities: &[Activity], leads: &[Lead], week_start: NaiveDateTime) -> KpiReport {
    let window = KpiWindow::new(week_start);
    let lead_owners: HashMap<&str, &str> = leads
        .iter()
        .map(|l| (l.id.as_str(), l.owner.as_str()))
        .collect();

    let mut totals: BTreeMap<String, KpiTotals> = OWNERS
        .iter()
        .map(|o| (o.to_string(), KpiTotals::default()))
        .collect();

    for activity in activities {
        let Some(metric) = kpi_metric(activity.activity_type) else {
            continue;
        };
        let Some(at) = activity.happened_at.or(activity.created_at) else {
            continue;
        };
        if !window.contains(&at) {
            continue;
        }
        let Some(owner) = attributed_owner(activity, &lead_owners) else {
            continue;
        };
        if let Some(entry) = totals.get_mut(owner) {
            entry.bump(metric);
        }
    }

    KpiReport { window, totals }
}

fn valid_target(value: Option<i64>, fallback: u32) -> u32 {
    value
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(fallback)
}

/// Targets for every rostered owner, falling back to defaults per metric.
pub fn resolve_targets(records: &[KpiTargetRecord]) -> BTreeMap<String, KpiTarget> {
    OWNERS
        .iter()
        .map(|owner| {
            let target = match records.iter().find(|r| r.owner == *owner) {
                Some(record) => KpiTarget {
                    calls: valid_target(record.calls, KpiTarget::DEFAULT.calls),
                    emails: valid_target(record.emails, KpiTarget::DEFAULT.emails),
                    messages: valid_target(record.messages, KpiTarget::DEFAULT.messages),
                },
                None => KpiTarget::DEFAULT,
            };
            (owner.to_string(), target)
        })
        .collect()
}

/// Percentage of `target` reached, capped at 100. Zero targets report 0.
pub fn progress_percent(done: u32, target: u32) -> u32 {
    if target == 0 {
        return 0;
    }
    let pct = (f64::from(done) / f64::from(target) * 100.0).round();
    pct.min(100.0) as u32
}

fn parse_target_field(label: &str, raw: &str) -> Result<u32, SteepleError> {
    raw.trim().parse::<u32>().map_err(|_| {
        SteepleError::Validation(format!(
            "{label} target must be a whole number of 0 or more (got `{}`)",
            raw.trim()
        ))
    })
}

/// Validate raw target input. Any bad field rejects the whole save.
pub fn parse_target_input(
    calls: &str,
    emails: &str,
    messages: &str,
) -> Result<KpiTarget, SteepleError> {
    Ok(KpiTarget {
        calls: parse_target_field("Calls", calls)?,
        emails: parse_target_field("Emails", emails)?,
        messages: parse_target_field("Messages", messages)?,
    })
}
