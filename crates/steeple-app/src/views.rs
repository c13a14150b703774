// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only projections of [`AppState`] for each screen.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use steeple_core::dates::{is_same_day, parse_month_key};
use steeple_core::{
    Activity, CalendarEntry, KpiMetric, KpiTarget, Lead, OWNERS, Stage,
};
use steeple_pipeline::{KpiTotals, KpiWindow, aggregate, progress_percent, resolve_targets};

use crate::state::AppState;

fn by_church_name(a: &Lead, b: &Lead) -> Ordering {
    a.church_name
        .to_lowercase()
        .cmp(&b.church_name.to_lowercase())
        .then_with(|| a.church_name.cmp(&b.church_name))
}

/// Follow-up ascending with undated leads last, then church name.
fn by_follow_up_then_name(a: &Lead, b: &Lead) -> Ordering {
    match (a.next_follow_up_at, b.next_follow_up_at) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| by_church_name(a, b))
}

/// Leads passing the owner, stage, and search filters.
pub fn filtered_leads(state: &AppState) -> Vec<&Lead> {
    state.leads.iter().filter(|l| state.filter.matches(l)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueBadge {
    Overdue,
    DueToday,
}

/// Badge shown on a lead card.
pub fn due_badge(lead: &Lead, now: NaiveDateTime) -> Option<DueBadge> {
    let next = lead.next_follow_up_at?;
    if is_same_day(&next, &now) {
        Some(DueBadge::DueToday)
    } else if next < now {
        Some(DueBadge::Overdue)
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineColumn<'a> {
    pub stage: Stage,
    pub leads: Vec<&'a Lead>,
}

/// Filtered leads grouped by stage, one column per stage in pipeline order.
pub fn pipeline(state: &AppState) -> Vec<PipelineColumn<'_>> {
    let filtered = filtered_leads(state);
    Stage::ALL
        .into_iter()
        .map(|stage| {
            let mut leads: Vec<&Lead> = filtered.iter().copied().filter(|l| l.stage == stage).collect();
            leads.sort_by(|a, b| by_follow_up_then_name(a, b));
            PipelineColumn { stage, leads }
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Followups<'a> {
    pub overdue: Vec<&'a Lead>,
    pub due_today: Vec<&'a Lead>,
    pub upcoming: Vec<&'a Lead>,
}

/// The current user's filtered leads with a follow-up date, earliest first.
pub fn followups(state: &AppState, now: NaiveDateTime) -> Followups<'_> {
    let mut upcoming: Vec<&Lead> = filtered_leads(state)
        .into_iter()
        .filter(|l| l.owner == state.user_owner && l.next_follow_up_at.is_some())
        .collect();
    upcoming.sort_by_key(|l| l.next_follow_up_at);

    let overdue = upcoming
        .iter()
        .copied()
        .filter(|l| l.next_follow_up_at.is_some_and(|n| n < now))
        .collect();
    let due_today = upcoming
        .iter()
        .copied()
        .filter(|l| l.next_follow_up_at.is_some_and(|n| is_same_day(&n, &now)))
        .collect();

    Followups {
        overdue,
        due_today,
        upcoming,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarDay<'a> {
    pub day: u32,
    pub entries: Vec<&'a CalendarEntry>,
}

/// One month of the shared calendar.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarMonth<'a> {
    pub year: i32,
    pub month: u32,
    /// Blank cells before day 1 in a Sunday-first grid.
    pub leading_blanks: u32,
    pub days: Vec<CalendarDay<'a>>,
    /// Leads that may receive availability, by church name.
    pub closed_won: Vec<&'a Lead>,
}

impl CalendarMonth<'_> {
    pub fn label(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_default()
    }

    /// Entries of the month in display order.
    pub fn entries(&self) -> impl Iterator<Item = &CalendarEntry> {
        self.days.iter().flat_map(|d| d.entries.iter().copied())
    }
}

/// The calendar grid for `state.calendar_month`; an invalid key shows `now`'s month.
pub fn calendar(state: &AppState, now: NaiveDateTime) -> CalendarMonth<'_> {
    let (year, month) =
        parse_month_key(&state.calendar_month).unwrap_or((now.year(), now.month()));
    let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(now.date());
    let leading_blanks = first.weekday().num_days_from_sunday();
    let day_count = steeple_core::dates::days_in_month(year, month);

    let mut in_month: Vec<&CalendarEntry> = state
        .calendar_entries
        .iter()
        .filter(|e| {
            e.starts_on
                .is_some_and(|s| s.year() == year && s.month() == month)
        })
        .collect();
    in_month.sort_by(|a, b| {
        a.starts_on.cmp(&b.starts_on).then_with(|| {
            a.church_name
                .to_lowercase()
                .cmp(&b.church_name.to_lowercase())
        })
    });

    let mut by_day: BTreeMap<u32, Vec<&CalendarEntry>> = BTreeMap::new();
    for entry in in_month {
        if let Some(start) = entry.starts_on {
            by_day.entry(start.day()).or_default().push(entry);
        }
    }
    let days = (1..=day_count)
        .map(|day| CalendarDay {
            day,
            entries: by_day.remove(&day).unwrap_or_default(),
        })
        .collect();

    let mut closed_won: Vec<&Lead> = state
        .leads
        .iter()
        .filter(|l| l.stage == Stage::ClosedWon)
        .collect();
    closed_won.sort_by(|a, b| by_church_name(a, b));

    CalendarMonth {
        year,
        month,
        leading_blanks,
        days,
        closed_won,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricProgress {
    pub metric: KpiMetric,
    pub done: u32,
    pub target: u32,
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerKpi {
    pub owner: String,
    pub target: KpiTarget,
    pub totals: KpiTotals,
    pub metrics: Vec<MetricProgress>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KpiBoard {
    pub window: KpiWindow,
    pub owners: Vec<OwnerKpi>,
}

/// Weekly counters against targets for every roster owner.
pub fn kpis(state: &AppState) -> KpiBoard {
    let report = aggregate(&state.activities, &state.leads, state.kpi_week_start);
    let targets = resolve_targets(&state.kpi_targets);
    let owners = OWNERS
        .iter()
        .map(|&owner| {
            let target = targets.get(owner).copied().unwrap_or_default();
            let totals = report.totals_for(owner);
            let metrics = KpiMetric::ALL
                .into_iter()
                .map(|metric| {
                    let done = totals.get(metric);
                    let goal = target.get(metric);
                    MetricProgress {
                        metric,
                        done,
                        target: goal,
                        percent: progress_percent(done, goal),
                    }
                })
                .collect();
            OwnerKpi {
                owner: owner.to_string(),
                target,
                totals,
                metrics,
            }
        })
        .collect();
    KpiBoard {
        window: report.window,
        owners,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeadDetailView<'a> {
    pub lead: &'a Lead,
    pub activities: &'a [Activity],
    pub loading: bool,
}

/// The open detail panel, if its lead still exists.
pub fn detail(state: &AppState) -> Option<LeadDetailView<'_>> {
    let detail = state.detail.as_ref()?;
    let lead = state.lead(&detail.lead_id)?;
    Some(LeadDetailView {
        lead,
        activities: &detail.activities,
        loading: detail.loading,
    })
}
