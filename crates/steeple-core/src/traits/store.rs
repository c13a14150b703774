// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document store trait (leads, activities, calendar, KPI targets).

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::SteepleError;
use crate::types::{
    Activity, CalendarEntry, HealthStatus, KpiTarget, KpiTargetRecord, Lead, LeadPatch,
    NewActivity, NewCalendarEntry, NewLead, Snapshot,
};

/// Maximum activities returned for one lead's history.
pub const ACTIVITY_HISTORY_LIMIT: usize = 50;

/// Persistence backend holding every CRM collection.
///
/// The store assigns document ids and the `createdAt`/`updatedAt` stamps.
/// After every successful write it publishes a full [`Snapshot`] of the
/// collection that changed to all subscribers.
#[async_trait]
pub trait CrmStore: Send + Sync + 'static {
    /// Returns the human-readable name of this backend.
    fn name(&self) -> &str;

    /// Performs a health check and returns the backend's current status.
    async fn health_check(&self) -> Result<HealthStatus, SteepleError>;

    /// Initializes the backend (migrations, pragmas). Idempotent.
    async fn initialize(&self) -> Result<(), SteepleError>;

    /// Closes the backend, flushing pending writes.
    async fn close(&self) -> Result<(), SteepleError>;

    /// Subscribes to collection snapshots.
    ///
    /// Only snapshots published after this call are delivered; callers load
    /// the initial state with the `list_*` methods.
    fn subscribe(&self) -> broadcast::Receiver<Snapshot>;

    // --- Leads ---

    async fn create_lead(&self, lead: &NewLead) -> Result<String, SteepleError>;

    async fn get_lead(&self, id: &str) -> Result<Option<Lead>, SteepleError>;

    /// All leads, most recently updated first.
    async fn list_leads(&self) -> Result<Vec<Lead>, SteepleError>;

    /// Merge `patch` into the lead and bump `updatedAt`.
    async fn update_lead(&self, id: &str, patch: &LeadPatch) -> Result<(), SteepleError>;

    /// Delete the lead and its activities.
    async fn delete_lead(&self, id: &str) -> Result<(), SteepleError>;

    // --- Activities ---

    async fn add_activity(
        &self,
        lead_id: &str,
        activity: &NewActivity,
    ) -> Result<String, SteepleError>;

    /// Most recent activities of one lead, newest first.
    async fn list_activities(
        &self,
        lead_id: &str,
        limit: usize,
    ) -> Result<Vec<Activity>, SteepleError>;

    /// Every activity across all leads.
    async fn list_all_activities(&self) -> Result<Vec<Activity>, SteepleError>;

    // --- Calendar ---

    async fn create_calendar_entry(
        &self,
        entry: &NewCalendarEntry,
    ) -> Result<String, SteepleError>;

    async fn delete_calendar_entry(&self, id: &str) -> Result<(), SteepleError>;

    /// All calendar entries, earliest first.
    async fn list_calendar_entries(&self) -> Result<Vec<CalendarEntry>, SteepleError>;

    // --- KPI targets ---

    async fn list_kpi_targets(&self) -> Result<Vec<KpiTargetRecord>, SteepleError>;

    /// Replace the target document for `owner`.
    async fn set_kpi_target(&self, owner: &str, target: &KpiTarget) -> Result<(), SteepleError>;
}
