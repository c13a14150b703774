// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plain-text rendering of the CRM views.
//!
//! Every function returns the text instead of printing it so the output can
//! be checked in tests. Color is applied only when `color` is true.

use std::fmt::Write;

use chrono::{Datelike, NaiveDateTime};
use steeple_app::views::{
    self, CalendarMonth, DueBadge, Followups, KpiBoard, LeadDetailView, PipelineColumn,
};
use steeple_app::{AppState, View};
use steeple_core::dates::{format_us_date, number_to_money};
use steeple_core::{KpiMetric, Lead};

const WEEKDAYS: &str = "Sun Mon Tue Wed Thu Fri Sat";

fn heading(text: &str, color: bool) -> String {
    if color {
        use colored::Colorize;
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

fn badge(badge: Option<DueBadge>, color: bool) -> String {
    let (label, overdue) = match badge {
        Some(DueBadge::Overdue) => ("overdue", true),
        Some(DueBadge::DueToday) => ("due today", false),
        None => return String::new(),
    };
    if color {
        use colored::Colorize;
        let tag = format!(" [{label}]");
        if overdue {
            tag.red().to_string()
        } else {
            tag.yellow().to_string()
        }
    } else {
        format!(" [{label}]")
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn follow_up(lead: &Lead) -> String {
    lead.next_follow_up_at
        .as_ref()
        .map(format_us_date)
        .unwrap_or_else(|| "no follow-up".to_string())
}

fn lead_line(lead: &Lead, now: NaiveDateTime, color: bool) -> String {
    format!(
        "  {:<8}  {} ({}, {})  {}  {}{}",
        short_id(&lead.id),
        lead.church_name,
        lead.city,
        lead.state,
        if lead.owner.is_empty() { "-" } else { lead.owner.as_str() },
        follow_up(lead),
        badge(views::due_badge(lead, now), color),
    )
}

/// The kanban board, one block per stage.
pub fn pipeline(columns: &[PipelineColumn<'_>], now: NaiveDateTime, color: bool) -> String {
    let mut out = String::new();
    for column in columns {
        let _ = writeln!(
            out,
            "{} ({})",
            heading(&column.stage.to_string(), color),
            column.leads.len()
        );
        for lead in &column.leads {
            let _ = writeln!(out, "{}", lead_line(lead, now, color));
        }
    }
    out
}

/// Overdue, due-today, and upcoming follow-ups.
pub fn followups(groups: &Followups<'_>, now: NaiveDateTime, color: bool) -> String {
    let mut out = String::new();
    for (title, leads) in [
        ("Overdue", &groups.overdue),
        ("Due Today", &groups.due_today),
        ("Upcoming", &groups.upcoming),
    ] {
        let _ = writeln!(out, "{} ({})", heading(title, color), leads.len());
        if leads.is_empty() {
            let _ = writeln!(out, "  none");
        }
        for lead in leads.iter() {
            let _ = writeln!(out, "{}  {}", lead_line(lead, now, color), lead.stage);
        }
    }
    out
}

/// A month grid followed by the entries of the month.
pub fn calendar(month: &CalendarMonth<'_>, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", heading(&month.label(), color));
    let _ = writeln!(out, "{WEEKDAYS}");

    let mut line = "    ".repeat(month.leading_blanks as usize);
    for (i, day) in month.days.iter().enumerate() {
        let marker = if day.entries.is_empty() { ' ' } else { '*' };
        let _ = write!(line, "{:>3}{marker}", day.day);
        if (month.leading_blanks as usize + i + 1) % 7 == 0 {
            let _ = writeln!(out, "{}", line.trim_end());
            line.clear();
        }
    }
    if !line.is_empty() {
        let _ = writeln!(out, "{}", line.trim_end());
    }

    let _ = writeln!(out);
    let mut any = false;
    for entry in month.entries() {
        any = true;
        let day = entry.starts_on.map(|s| s.day()).unwrap_or_default();
        let _ = write!(
            out,
            "  {:<8}  {:>2}  {}  {}  {}",
            short_id(&entry.id),
            day,
            entry.availability_type,
            entry.church_name,
            entry.owner
        );
        if !entry.notes.is_empty() {
            let _ = write!(out, "  {}", entry.notes);
        }
        let _ = writeln!(out);
    }
    if !any {
        let _ = writeln!(out, "  no availability this month");
    }

    let _ = writeln!(out, "{}", heading("Closed Won clients", color));
    if month.closed_won.is_empty() {
        let _ = writeln!(out, "  none");
    }
    for lead in &month.closed_won {
        let _ = writeln!(out, "  {:<8}  {}", short_id(&lead.id), lead.church_name);
    }
    out
}

fn metric_label(metric: KpiMetric) -> &'static str {
    match metric {
        KpiMetric::Calls => "Calls",
        KpiMetric::Emails => "Emails",
        KpiMetric::Messages => "Messages",
    }
}

fn bar(percent: u32) -> String {
    let filled = (percent / 10) as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(10 - filled))
}

/// Per-owner weekly counts against targets.
pub fn kpis(board: &KpiBoard, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        heading(
            &format!(
                "Week of {} to {}",
                format_us_date(&board.window.start),
                format_us_date(&board.window.end)
            ),
            color
        )
    );
    for owner in &board.owners {
        let _ = writeln!(out, "{}", owner.owner);
        for m in &owner.metrics {
            let line = format!(
                "  {:<9} {:>4} / {:<4} {} {:>3}%",
                metric_label(m.metric),
                m.done,
                m.target,
                bar(m.percent),
                m.percent
            );
            if color && m.percent >= 100 {
                use colored::Colorize;
                let _ = writeln!(out, "{}", line.green());
            } else {
                let _ = writeln!(out, "{line}");
            }
        }
    }
    out
}

/// All fields of one lead plus its recent activity.
pub fn lead_detail(view: &LeadDetailView<'_>, color: bool) -> String {
    let lead = view.lead;
    let mut out = String::new();
    let _ = writeln!(out, "{}", heading(&lead.church_name, color));
    let optional = |at: Option<NaiveDateTime>| at.as_ref().map(format_us_date).unwrap_or_default();
    let fields = [
        ("Id", lead.id.clone()),
        ("Stage", lead.stage.to_string()),
        ("Owner", lead.owner.clone()),
        ("Location", format!("{}, {}", lead.city, lead.state)),
        ("Website", lead.website.clone()),
        (
            "Livestream",
            lead.livestream_status
                .map(|s| s.to_string())
                .unwrap_or_default(),
        ),
        ("Livestream URL", lead.livestream_url.clone()),
        ("Contact", lead.contact_name.clone()),
        ("Role", lead.contact_role.clone()),
        ("Phone", lead.phone.clone()),
        ("Email", lead.email.clone()),
        ("Tier", lead.tier_interest.clone()),
        ("Gear budget", lead.estimated_gear_budget.clone()),
        ("Next follow-up", optional(lead.next_follow_up_at)),
        (
            "Last activity",
            lead.last_activity_type
                .map(|t| format!("{t} on {}", optional(lead.last_activity_at)))
                .unwrap_or_default(),
        ),
        (
            "Deposit",
            if lead.deposit_paid {
                let amount = lead
                    .deposit_amount
                    .map(|a| format!("${}", number_to_money(a)))
                    .unwrap_or_default();
                format!("paid {amount} {}", optional(lead.deposit_paid_at))
                    .trim()
                    .to_string()
            } else {
                "not paid".to_string()
            },
        ),
        ("Closed", optional(lead.closed_at)),
        ("Notes", lead.notes.clone()),
    ];
    for (label, value) in fields {
        if !value.is_empty() {
            let _ = writeln!(out, "  {label:<15} {value}");
        }
    }

    let _ = writeln!(out, "{}", heading("Activity", color));
    if view.loading {
        let _ = writeln!(out, "  loading...");
    } else if view.activities.is_empty() {
        let _ = writeln!(out, "  no activity yet");
    }
    for activity in view.activities {
        let when = optional(activity.happened_at);
        let _ = write!(out, "  {when}  {}", activity.activity_type);
        if !activity.notes.is_empty() {
            let _ = write!(out, "  {}", activity.notes);
        }
        let _ = writeln!(out);
    }
    out
}

/// Render whichever view the state currently shows.
pub fn current_view(state: &AppState, now: NaiveDateTime, color: bool) -> String {
    match state.view {
        View::Pipeline | View::NewLead => pipeline(&views::pipeline(state), now, color),
        View::Followups => followups(&views::followups(state, now), now, color),
        View::Calendar => calendar(&views::calendar(state, now), color),
        View::Kpis => kpis(&views::kpis(state), color),
        View::ImportExport | View::Settings => settings(state),
    }
}

/// Saved preferences and the active filter.
pub fn settings(state: &AppState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Default user      {}", state.user_owner);
    let _ = writeln!(out, "Owner filter      {}", state.filter.owner);
    let _ = writeln!(out, "Stage filter      {}", state.filter.stage);
    let _ = writeln!(out, "Search            {}", state.filter.search);
    let _ = writeln!(out, "Calendar month    {}", state.calendar_month);
    let _ = writeln!(
        out,
        "KPI week          {}",
        format_us_date(&state.kpi_week_start)
    );
    let _ = writeln!(out, "Leads             {}", state.leads.len());
    out
}
