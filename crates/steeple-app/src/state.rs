// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Explicit application state.
//!
//! The controller is the only writer. Store snapshots replace a whole
//! collection at once and bump [`AppState::revision`].

use std::collections::HashMap;

use chrono::NaiveDateTime;
use strum::{AsRefStr, Display, EnumString};
use tracing::debug;

use steeple_core::{Activity, CalendarEntry, KpiTargetRecord, Lead, Snapshot};
use steeple_pipeline::LeadFilter;

use crate::prefs::RestoredPrefs;

/// Top-level screens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum View {
    #[default]
    Pipeline,
    Followups,
    Calendar,
    Kpis,
    ImportExport,
    Settings,
    NewLead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A transient message for the user, drained by the view layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// The open lead detail panel.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadDetail {
    pub lead_id: String,
    /// Ticket of the latest activity fetch for this panel.
    pub ticket: u64,
    pub loading: bool,
    /// Most recent activities, newest first.
    pub activities: Vec<Activity>,
}

/// Result of one detail fetch, tagged with the ticket it was issued under.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailLoaded {
    pub ticket: u64,
    pub lead_id: String,
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub view: View,
    pub user_owner: String,
    pub filter: LeadFilter,
    pub calendar_month: String,
    pub kpi_week_start: NaiveDateTime,

    /// All leads, most recently updated first.
    pub leads: Vec<Lead>,
    leads_by_id: HashMap<String, usize>,
    pub calendar_entries: Vec<CalendarEntry>,
    pub activities: Vec<Activity>,
    pub kpi_targets: Vec<KpiTargetRecord>,

    pub detail: Option<LeadDetail>,
    pub notices: Vec<Notice>,
    /// Incremented once per applied snapshot.
    pub revision: u64,
}

impl AppState {
    pub fn new(prefs: RestoredPrefs) -> Self {
        Self {
            view: prefs.view,
            user_owner: prefs.user_owner,
            filter: prefs.filter,
            calendar_month: prefs.calendar_month,
            kpi_week_start: prefs.kpi_week_start,
            leads: Vec::new(),
            leads_by_id: HashMap::new(),
            calendar_entries: Vec::new(),
            activities: Vec::new(),
            kpi_targets: Vec::new(),
            detail: None,
            notices: Vec::new(),
            revision: 0,
        }
    }

    pub fn lead(&self, id: &str) -> Option<&Lead> {
        self.leads_by_id.get(id).and_then(|&i| self.leads.get(i))
    }

    pub fn calendar_entry(&self, id: &str) -> Option<&CalendarEntry> {
        self.calendar_entries.iter().find(|e| e.id == id)
    }

    /// Replace one collection with a snapshot.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        match snapshot {
            Snapshot::Leads(leads) => {
                debug!(count = leads.len(), "applying leads snapshot");
                self.leads_by_id = leads
                    .iter()
                    .enumerate()
                    .map(|(i, l)| (l.id.clone(), i))
                    .collect();
                self.leads = leads;
            }
            Snapshot::Calendar(entries) => {
                debug!(count = entries.len(), "applying calendar snapshot");
                self.calendar_entries = entries;
            }
            Snapshot::Activities(activities) => {
                debug!(count = activities.len(), "applying activities snapshot");
                self.activities = activities;
            }
            Snapshot::KpiTargets(targets) => {
                debug!(count = targets.len(), "applying KPI targets snapshot");
                self.kpi_targets = targets;
            }
        }
        self.revision += 1;
    }

    /// Apply a detail fetch result. Returns false if it was stale.
    pub fn apply_detail(&mut self, loaded: DetailLoaded) -> bool {
        match &mut self.detail {
            Some(detail) if detail.ticket == loaded.ticket && detail.lead_id == loaded.lead_id => {
                detail.activities = loaded.activities;
                detail.loading = false;
                true
            }
            _ => false,
        }
    }

    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    /// Remove and return all pending notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
