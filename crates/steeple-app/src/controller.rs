// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The application controller.
//!
//! Owns [`AppState`] and is the only code that mutates it. UI transitions
//! persist their preference key; store operations write through the
//! [`CrmStore`] and then fold any published snapshots back into state.
//!
//! A failed store write is logged, turned into an error [`Notice`], and
//! returned. Nothing is retried.

use std::mem::discriminant;
use std::sync::Arc;

use chrono::NaiveDateTime;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, error, info, warn};

use steeple_core::dates::{
    add_days, month_key, parse_iso_date_input, parse_month_key, shift_month, to_iso_date_input,
    week_start,
};
use steeple_core::traits::store::ACTIVITY_HISTORY_LIMIT;
use steeple_core::{
    Clock, Confirm, CrmStore, KpiTarget, LeadPatch, NewActivity, NewCalendarEntry,
    PreferenceStore, Snapshot, Stage, SteepleError,
};
use steeple_csv::{export_filename, leads_to_csv, plan_import};
use steeple_pipeline::{
    LeadEdit, activity_patch, existing_keys, gate_new_lead, parse_target_input, stage_change_patch,
};

use crate::forms::{ActivityForm, CalendarForm, KpiTargetForm, NewLeadForm};
use crate::prefs::{self, canonical_owner_filter, canonical_stage_filter, is_roster_owner};
use crate::state::{AppState, DetailLoaded, LeadDetail, Notice, View};

/// Outcome of a CSV import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub created: usize,
    pub skipped: usize,
}

/// A rendered CSV export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub contents: String,
}

/// An issued detail fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRequest {
    pub ticket: u64,
    pub lead_id: String,
}

/// External collaborators the controller talks to.
pub struct Collaborators {
    pub store: Arc<dyn CrmStore>,
    pub prefs: Arc<dyn PreferenceStore>,
    pub confirm: Arc<dyn Confirm>,
    pub clock: Arc<dyn Clock>,
}

pub struct Controller {
    store: Arc<dyn CrmStore>,
    prefs: Arc<dyn PreferenceStore>,
    confirm: Arc<dyn Confirm>,
    clock: Arc<dyn Clock>,
    default_owner: String,
    snapshots: broadcast::Receiver<Snapshot>,
    next_ticket: u64,
    state: AppState,
}

impl Controller {
    /// Build a controller and restore UI preferences.
    ///
    /// Subscribes to the store immediately; call [`Controller::load`] to
    /// fetch the initial collections.
    pub fn new(collaborators: Collaborators, default_owner: &str) -> Self {
        let Collaborators {
            store,
            prefs,
            confirm,
            clock,
        } = collaborators;
        let restored = prefs::restore(prefs.as_ref(), default_owner, clock.now());
        let snapshots = store.subscribe();
        Self {
            store,
            prefs,
            confirm,
            clock,
            default_owner: default_owner.to_string(),
            snapshots,
            next_ticket: 0,
            state: AppState::new(restored),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// Remove and return pending notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.state.take_notices()
    }

    /// Load every collection from the store.
    pub async fn load(&mut self) -> Result<(), SteepleError> {
        let leads = self.store.list_leads().await?;
        let calendar = self.store.list_calendar_entries().await?;
        let activities = self.store.list_all_activities().await?;
        let targets = self.store.list_kpi_targets().await?;
        // Anything published before the reads is already reflected in them.
        self.drain_pending();
        for snapshot in [
            Snapshot::Leads(leads),
            Snapshot::Calendar(calendar),
            Snapshot::Activities(activities),
            Snapshot::KpiTargets(targets),
        ] {
            self.state.apply_snapshot(snapshot);
        }
        info!(
            leads = self.state.leads.len(),
            calendar = self.state.calendar_entries.len(),
            "CRM state loaded"
        );
        Ok(())
    }

    fn drain_pending(&mut self) {
        loop {
            match self.snapshots.try_recv() {
                Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }

    /// Apply every queued snapshot, keeping only the newest per collection.
    ///
    /// Returns how many snapshots were applied.
    pub fn pump_snapshots(&mut self) -> usize {
        let mut latest: Vec<Snapshot> = Vec::new();
        loop {
            match self.snapshots.try_recv() {
                Ok(snapshot) => {
                    latest.retain(|s| discriminant(s) != discriminant(&snapshot));
                    latest.push(snapshot);
                }
                Err(TryRecvError::Lagged(missed)) => {
                    warn!(missed, "snapshot receiver lagged, skipping to newest");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        let applied = latest.len();
        for snapshot in latest {
            self.state.apply_snapshot(snapshot);
        }
        applied
    }

    /// Wait for the next snapshot and apply it. Returns false once the store is gone.
    pub async fn next_snapshot(&mut self) -> bool {
        loop {
            match self.snapshots.recv().await {
                Ok(snapshot) => {
                    self.state.apply_snapshot(snapshot);
                    return true;
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "snapshot receiver lagged, skipping to newest");
                }
                Err(broadcast::error::RecvError::Closed) => return false,
            }
        }
    }

    fn fail(&mut self, title: &str, err: SteepleError) -> SteepleError {
        match &err {
            SteepleError::Validation(msg) | SteepleError::CsvHeader { expected: msg } => {
                debug!(%title, reason = %msg, "input rejected");
            }
            _ => error!(%title, error = %err, "store operation failed"),
        }
        self.state.push_notice(Notice::error(title, err.to_string()));
        err
    }

    fn notify(&mut self, title: &str, message: impl Into<String>) {
        self.state.push_notice(Notice::info(title, message));
    }

    // --- UI transitions ---

    pub fn set_view(&mut self, view: View) {
        self.state.view = view;
        self.prefs.set(prefs::VIEW, view.as_ref());
    }

    /// Returns false and leaves state alone if `owner` is not `ALL` or a roster owner.
    pub fn set_owner_filter(&mut self, owner: &str) -> bool {
        let Some(owner) = canonical_owner_filter(owner) else {
            warn!(%owner, "ignoring unknown owner filter");
            return false;
        };
        self.prefs.set(prefs::QUICK_OWNER, &owner);
        self.state.filter.owner = owner;
        true
    }

    /// Returns false and leaves state alone if `stage` is not `ALL` or a stage name.
    pub fn set_stage_filter(&mut self, stage: &str) -> bool {
        let Some(stage) = canonical_stage_filter(stage) else {
            warn!(%stage, "ignoring unknown stage filter");
            return false;
        };
        self.prefs.set(prefs::STAGE_FILTER, &stage);
        self.state.filter.stage = stage;
        true
    }

    pub fn set_search(&mut self, search: &str) {
        self.prefs.set(prefs::SEARCH, search);
        self.state.filter.search = search.to_string();
    }

    /// Change who "I" am on this device.
    pub fn set_user_owner(&mut self, owner: &str) -> Result<(), SteepleError> {
        if !is_roster_owner(owner) {
            let err = SteepleError::Validation(format!("Unknown owner `{owner}`."));
            return Err(self.fail("Save failed", err));
        }
        self.prefs.set(prefs::USER_OWNER, owner);
        self.state.user_owner = owner.to_string();
        self.notify("Saved", format!("Default user: {owner}"));
        Ok(())
    }

    /// Returns false if `key` is not a `YYYY-MM` month.
    pub fn set_calendar_month(&mut self, key: &str) -> bool {
        if parse_month_key(key).is_none() {
            return false;
        }
        let key = key.trim().to_string();
        self.prefs.set(prefs::CALENDAR_MONTH, &key);
        self.state.calendar_month = key;
        true
    }

    pub fn shift_calendar_month(&mut self, delta: i32) {
        let key = shift_month(&self.state.calendar_month, delta, &self.clock.now());
        self.set_calendar_month(&key);
    }

    pub fn current_calendar_month(&mut self) {
        let key = month_key(&self.clock.now());
        self.set_calendar_month(&key);
    }

    /// Show the KPI week containing `at`.
    pub fn set_kpi_week(&mut self, at: NaiveDateTime) {
        let start = week_start(at);
        self.prefs.set(prefs::KPI_WEEK_START, &to_iso_date_input(&start));
        self.state.kpi_week_start = start;
    }

    pub fn shift_kpi_week(&mut self, weeks: i64) {
        let at = add_days(self.state.kpi_week_start, weeks * 7);
        self.set_kpi_week(at);
    }

    pub fn current_kpi_week(&mut self) {
        let now = self.clock.now();
        self.set_kpi_week(now);
    }

    /// Show the KPI week containing a `YYYY-MM-DD` date.
    pub fn set_kpi_week_from_input(&mut self, date: &str) -> Result<(), SteepleError> {
        let Some(at) = parse_iso_date_input(date) else {
            let err = SteepleError::Validation("Please choose a valid date.".into());
            return Err(self.fail("Invalid date", err));
        };
        self.set_kpi_week(at);
        Ok(())
    }

    /// Clear every local preference and return to defaults.
    pub fn reset_preferences(&mut self) {
        for key in prefs::ALL_KEYS {
            self.prefs.remove(key);
        }
        let restored = prefs::restore(self.prefs.as_ref(), &self.default_owner, self.clock.now());
        self.state.view = restored.view;
        self.state.user_owner = restored.user_owner;
        self.state.filter = restored.filter;
        self.state.calendar_month = restored.calendar_month;
        self.state.kpi_week_start = restored.kpi_week_start;
        info!("local preferences reset");
        self.notify("Reset", "Local settings cleared.");
    }

    // --- Leads ---

    /// Create a lead from the new-lead form, then return to the pipeline.
    pub async fn create_lead(&mut self, form: NewLeadForm) -> Result<String, SteepleError> {
        let mut lead = match form.into_new_lead(&self.state.user_owner) {
            Ok(lead) => lead,
            Err(err) => return Err(self.fail("Missing required fields", err)),
        };
        gate_new_lead(&mut lead, self.clock.now());

        let id = match self.store.create_lead(&lead).await {
            Ok(id) => id,
            Err(err) => return Err(self.fail("Create failed", err)),
        };
        self.pump_snapshots();
        self.notify("Created", lead.church_name.clone());
        self.set_view(View::Pipeline);
        Ok(id)
    }

    /// Save the detail form for a lead, with deposit gating.
    pub async fn save_lead(&mut self, lead_id: &str, edit: LeadEdit) -> Result<(), SteepleError> {
        if self.state.lead(lead_id).is_none() {
            return Err(self.fail("Save failed", SteepleError::lead_not_found(lead_id)));
        }
        let patch = edit.into_patch(self.clock.now());
        self.write_patch(lead_id, &patch, "Save failed").await?;
        self.notify("Saved", "Lead updated.");
        Ok(())
    }

    /// Move a lead to `stage`, with deposit gating. Returns the stage actually set.
    pub async fn set_stage(&mut self, lead_id: &str, stage: Stage) -> Result<Stage, SteepleError> {
        let Some(lead) = self.state.lead(lead_id) else {
            return Err(self.fail("Save failed", SteepleError::lead_not_found(lead_id)));
        };
        let patch = stage_change_patch(lead, stage, self.clock.now());
        let applied = patch.stage.unwrap_or(stage);
        self.write_patch(lead_id, &patch, "Save failed").await?;
        self.notify("Saved", format!("Stage: {applied}"));
        Ok(applied)
    }

    async fn write_patch(
        &mut self,
        lead_id: &str,
        patch: &LeadPatch,
        title: &str,
    ) -> Result<(), SteepleError> {
        if let Err(err) = self.store.update_lead(lead_id, patch).await {
            return Err(self.fail(title, err));
        }
        self.pump_snapshots();
        Ok(())
    }

    /// Delete a lead after confirmation. Returns false if the user declined.
    pub async fn delete_lead(&mut self, lead_id: &str) -> Result<bool, SteepleError> {
        if !self.confirm.confirm("Delete this lead? This cannot be undone.") {
            debug!(lead_id, "lead deletion declined");
            return Ok(false);
        }
        if let Err(err) = self.store.delete_lead(lead_id).await {
            return Err(self.fail("Delete failed", err));
        }
        self.pump_snapshots();
        if self.state.detail.as_ref().is_some_and(|d| d.lead_id == lead_id) {
            self.close_lead();
        }
        self.notify("Deleted", "Lead removed.");
        Ok(true)
    }

    // --- Activities ---

    /// Log an activity and apply its follow-up and closing rules to the lead.
    pub async fn log_activity(
        &mut self,
        lead_id: &str,
        form: ActivityForm,
    ) -> Result<String, SteepleError> {
        let now = self.clock.now();
        let Some(lead) = self.state.lead(lead_id) else {
            return Err(self.fail("Activity failed", SteepleError::lead_not_found(lead_id)));
        };
        let owner = Some(lead.owner.clone()).filter(|o| !o.is_empty());
        let happened_at = match form.happened_at(now) {
            Ok(at) => at,
            Err(err) => return Err(self.fail("Invalid date", err)),
        };

        let activity = NewActivity {
            activity_type: form.activity_type,
            notes: form.notes.trim().to_string(),
            happened_at,
            owner,
        };
        let id = match self.store.add_activity(lead_id, &activity).await {
            Ok(id) => id,
            Err(err) => return Err(self.fail("Activity failed", err)),
        };
        let patch = activity_patch(form.activity_type, happened_at, now);
        self.write_patch(lead_id, &patch, "Activity failed").await?;
        self.notify("Logged", form.activity_type.to_string());

        if self.state.detail.as_ref().is_some_and(|d| d.lead_id == lead_id) {
            self.open_lead(lead_id).await?;
        }
        Ok(id)
    }

    // --- Lead detail ---

    /// Open the detail panel in its loading state and issue a fetch ticket.
    ///
    /// Returns `None` if the lead is not in state.
    pub fn begin_detail(&mut self, lead_id: &str) -> Option<DetailRequest> {
        self.state.lead(lead_id)?;
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.state.detail = Some(LeadDetail {
            lead_id: lead_id.to_string(),
            ticket,
            loading: true,
            activities: Vec::new(),
        });
        Some(DetailRequest {
            ticket,
            lead_id: lead_id.to_string(),
        })
    }

    /// Run a detail fetch against the store.
    pub async fn fetch_detail(&self, request: DetailRequest) -> Result<DetailLoaded, SteepleError> {
        let activities = self
            .store
            .list_activities(&request.lead_id, ACTIVITY_HISTORY_LIMIT)
            .await?;
        Ok(DetailLoaded {
            ticket: request.ticket,
            lead_id: request.lead_id,
            activities,
        })
    }

    /// Apply a fetch result. Returns false if a newer fetch superseded it.
    pub fn finish_detail(&mut self, loaded: DetailLoaded) -> bool {
        let ticket = loaded.ticket;
        let applied = self.state.apply_detail(loaded);
        if !applied {
            warn!(ticket, "discarding stale lead detail response");
        }
        applied
    }

    /// Open a lead and load its recent activity.
    pub async fn open_lead(&mut self, lead_id: &str) -> Result<bool, SteepleError> {
        let Some(request) = self.begin_detail(lead_id) else {
            return Ok(false);
        };
        match self.fetch_detail(request).await {
            Ok(loaded) => Ok(self.finish_detail(loaded)),
            Err(err) => Err(self.fail("Load failed", err)),
        }
    }

    /// Show a lead in the detail panel, fetching only if it is not already loaded there.
    pub async fn show_lead(&mut self, lead_id: &str) -> Result<bool, SteepleError> {
        let loaded = self
            .state
            .detail
            .as_ref()
            .is_some_and(|d| d.lead_id == lead_id && !d.loading);
        if loaded {
            return Ok(true);
        }
        self.open_lead(lead_id).await
    }

    pub fn close_lead(&mut self) {
        self.state.detail = None;
    }

    // --- Import / export ---

    /// Import leads from CSV text, skipping churches that already exist.
    ///
    /// A bad header fails before anything is written. A write failure stops
    /// the import; leads created before it remain.
    pub async fn import_csv(&mut self, text: &str) -> Result<ImportSummary, SteepleError> {
        let existing = existing_keys(&self.state.leads);
        let plan = match plan_import(text, existing, &self.state.user_owner) {
            Ok(plan) => plan,
            Err(err) => return Err(self.fail("Import failed", err)),
        };
        if plan.incomplete > 0 {
            debug!(rows = plan.incomplete, "ignored rows missing church name, city, or state");
        }

        let mut summary = ImportSummary {
            created: 0,
            skipped: plan.skipped,
        };
        for mut lead in plan.leads {
            gate_new_lead(&mut lead, self.clock.now());
            if let Err(err) = self.store.create_lead(&lead).await {
                self.pump_snapshots();
                return Err(self.fail(
                    &format!("Import failed after {} created", summary.created),
                    err,
                ));
            }
            summary.created += 1;
        }
        self.pump_snapshots();

        info!(created = summary.created, skipped = summary.skipped, "CSV import complete");
        self.notify(
            "Import complete",
            format!("Created {}, skipped {}", summary.created, summary.skipped),
        );
        Ok(summary)
    }

    /// Serialize every lead to CSV, named for today's date.
    /// Leads go out oldest first so a re-import recreates them in the same order.
    pub fn export_csv(&mut self) -> Result<CsvExport, SteepleError> {
        // State is newest first; reversing keeps insertion order among equal stamps.
        let mut leads: Vec<_> = self.state.leads.iter().rev().collect();
        leads.sort_by_key(|lead| (lead.created_at.is_none(), lead.created_at));
        let contents = match leads_to_csv(leads) {
            Ok(csv) => csv,
            Err(err) => return Err(self.fail("Export failed", err)),
        };
        Ok(CsvExport {
            filename: export_filename(self.clock.now().date()),
            contents,
        })
    }

    // --- Calendar ---

    /// Add availability for a Closed Won lead and jump to its month.
    pub async fn create_calendar_entry(&mut self, form: CalendarForm) -> Result<String, SteepleError> {
        let lead_id = form.lead_id.trim();
        if lead_id.is_empty() || form.date.trim().is_empty() {
            let err = SteepleError::Validation("Choose a closed client and a date.".into());
            return Err(self.fail("Missing fields", err));
        }
        let lead = match self.state.lead(lead_id) {
            Some(lead) if lead.stage == Stage::ClosedWon => lead.clone(),
            _ => {
                let err = SteepleError::Validation(
                    "Availability can only be added for Closed Won clients.".into(),
                );
                return Err(self.fail("Invalid client", err));
            }
        };
        let Some(starts_on) = parse_iso_date_input(&form.date) else {
            let err = SteepleError::Validation("Please choose a valid date.".into());
            return Err(self.fail("Invalid date", err));
        };
        let availability_type = match form.availability() {
            Ok(kind) => kind,
            Err(err) => return Err(self.fail("Invalid availability", err)),
        };

        let entry = NewCalendarEntry {
            lead_id: lead.id.clone(),
            church_name: lead.church_name.clone(),
            owner: lead.owner.clone(),
            availability_type,
            notes: form.notes.trim().to_string(),
            starts_on,
            created_by: self.state.user_owner.clone(),
        };
        let id = match self.store.create_calendar_entry(&entry).await {
            Ok(id) => id,
            Err(err) => return Err(self.fail("Save failed", err)),
        };
        self.pump_snapshots();
        self.set_calendar_month(&month_key(&starts_on));
        self.notify("Saved", "Availability added to master calendar.");
        Ok(id)
    }

    /// Delete a calendar entry after confirmation.
    ///
    /// Returns false if the entry is unknown or the user declined.
    pub async fn delete_calendar_entry(&mut self, entry_id: &str) -> Result<bool, SteepleError> {
        let Some(entry) = self.state.calendar_entry(entry_id) else {
            return Ok(false);
        };
        let church = if entry.church_name.is_empty() {
            "this client"
        } else {
            entry.church_name.as_str()
        };
        if !self.confirm.confirm(&format!("Delete availability for {church}?")) {
            return Ok(false);
        }
        if let Err(err) = self.store.delete_calendar_entry(entry_id).await {
            return Err(self.fail("Delete failed", err));
        }
        self.pump_snapshots();
        self.notify("Deleted", "Availability removed.");
        Ok(true)
    }

    // --- KPI targets ---

    /// Validate and save one owner's weekly targets.
    pub async fn save_kpi_target(&mut self, form: KpiTargetForm) -> Result<KpiTarget, SteepleError> {
        if !is_roster_owner(&form.owner) {
            let err = SteepleError::Validation(format!("Unknown owner `{}`.", form.owner));
            return Err(self.fail("Invalid KPI target", err));
        }
        let target = match parse_target_input(&form.calls, &form.emails, &form.messages) {
            Ok(target) => target,
            Err(err) => return Err(self.fail("Invalid KPI target", err)),
        };
        if let Err(err) = self.store.set_kpi_target(&form.owner, &target).await {
            return Err(self.fail("Save failed", err));
        }
        self.pump_snapshots();
        self.notify("Saved", format!("KPI targets updated for {}.", form.owner));
        Ok(target)
    }
}
