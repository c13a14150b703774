// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of [`CrmStore`].

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{OnceCell, broadcast};
use tracing::{debug, info};

use steeple_config::model::StorageConfig;
use steeple_core::{
    Activity, CalendarEntry, Clock, CrmStore, HealthStatus, KpiTarget, KpiTargetRecord, Lead,
    LeadPatch, NewActivity, NewCalendarEntry, NewLead, Snapshot, SteepleError, SystemClock,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed document store.
///
/// The database is opened by [`CrmStore::initialize`]. After every write
/// the changed collection is re-read and broadcast as a [`Snapshot`].
pub struct SqliteStore {
    config: StorageConfig,
    clock: Arc<dyn Clock>,
    db: OnceCell<Database>,
    snapshots: broadcast::Sender<Snapshot>,
}

impl SqliteStore {
    pub fn new(config: StorageConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Like [`SqliteStore::new`], stamping documents with `clock`.
    pub fn with_clock(config: StorageConfig, clock: Arc<dyn Clock>) -> Self {
        let (snapshots, _) = broadcast::channel(config.snapshot_buffer.max(1));
        Self {
            config,
            clock,
            db: OnceCell::new(),
            snapshots,
        }
    }

    fn db(&self) -> Result<&Database, SteepleError> {
        self.db.get().ok_or_else(|| SteepleError::Storage {
            source: "store not initialized, call initialize() first".into(),
        })
    }

    fn publish(&self, snapshot: Snapshot) {
        // No subscribers is not an error.
        let _ = self.snapshots.send(snapshot);
    }

    async fn publish_leads(&self) -> Result<(), SteepleError> {
        let leads = queries::leads::list_leads(self.db()?).await?;
        debug!(count = leads.len(), "publishing leads snapshot");
        self.publish(Snapshot::Leads(leads));
        Ok(())
    }

    async fn publish_activities(&self) -> Result<(), SteepleError> {
        let activities = queries::activities::list_all(self.db()?).await?;
        self.publish(Snapshot::Activities(activities));
        Ok(())
    }

    async fn publish_calendar(&self) -> Result<(), SteepleError> {
        let entries = queries::calendar::list_entries(self.db()?).await?;
        self.publish(Snapshot::Calendar(entries));
        Ok(())
    }

    async fn publish_kpi_targets(&self) -> Result<(), SteepleError> {
        let targets = queries::kpi::list_targets(self.db()?).await?;
        self.publish(Snapshot::KpiTargets(targets));
        Ok(())
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[async_trait]
impl CrmStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn health_check(&self) -> Result<HealthStatus, SteepleError> {
        let Some(db) = self.db.get() else {
            return Ok(HealthStatus::Unhealthy("store not initialized".into()));
        };
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn initialize(&self) -> Result<(), SteepleError> {
        let path = self.config.database_path.clone();
        let wal_mode = self.config.wal_mode;
        self.db
            .get_or_try_init(|| Database::open(&path, wal_mode))
            .await?;
        debug!(path = %self.config.database_path, "SQLite store initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), SteepleError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("WAL checkpoint complete");
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<Snapshot> {
        self.snapshots.subscribe()
    }

    async fn create_lead(&self, lead: &NewLead) -> Result<String, SteepleError> {
        let id = new_id();
        queries::leads::insert_lead(self.db()?, &id, lead, self.clock.now()).await?;
        info!(lead_id = %id, church = %lead.church_name, "lead created");
        self.publish_leads().await?;
        Ok(id)
    }

    async fn get_lead(&self, id: &str) -> Result<Option<Lead>, SteepleError> {
        queries::leads::get_lead(self.db()?, id).await
    }

    async fn list_leads(&self) -> Result<Vec<Lead>, SteepleError> {
        queries::leads::list_leads(self.db()?).await
    }

    async fn update_lead(&self, id: &str, patch: &LeadPatch) -> Result<(), SteepleError> {
        if !queries::leads::update_lead(self.db()?, id, patch, self.clock.now()).await? {
            return Err(SteepleError::lead_not_found(id));
        }
        info!(lead_id = %id, "lead updated");
        self.publish_leads().await
    }

    async fn delete_lead(&self, id: &str) -> Result<(), SteepleError> {
        if queries::leads::delete_lead(self.db()?, id).await? {
            info!(lead_id = %id, "lead deleted");
        }
        self.publish_leads().await?;
        self.publish_activities().await
    }

    async fn add_activity(
        &self,
        lead_id: &str,
        activity: &NewActivity,
    ) -> Result<String, SteepleError> {
        let db = self.db()?;
        if queries::leads::get_lead(db, lead_id).await?.is_none() {
            return Err(SteepleError::lead_not_found(lead_id));
        }
        let id = new_id();
        queries::activities::insert_activity(db, &id, lead_id, activity, self.clock.now()).await?;
        info!(lead_id = %lead_id, activity_id = %id, kind = %activity.activity_type, "activity logged");
        self.publish_activities().await?;
        Ok(id)
    }

    async fn list_activities(
        &self,
        lead_id: &str,
        limit: usize,
    ) -> Result<Vec<Activity>, SteepleError> {
        queries::activities::list_for_lead(self.db()?, lead_id, limit).await
    }

    async fn list_all_activities(&self) -> Result<Vec<Activity>, SteepleError> {
        queries::activities::list_all(self.db()?).await
    }

    async fn create_calendar_entry(
        &self,
        entry: &NewCalendarEntry,
    ) -> Result<String, SteepleError> {
        let id = new_id();
        queries::calendar::insert_entry(self.db()?, &id, entry, self.clock.now()).await?;
        info!(entry_id = %id, lead_id = %entry.lead_id, "calendar entry created");
        self.publish_calendar().await?;
        Ok(id)
    }

    async fn delete_calendar_entry(&self, id: &str) -> Result<(), SteepleError> {
        if queries::calendar::delete_entry(self.db()?, id).await? {
            info!(entry_id = %id, "calendar entry deleted");
        }
        self.publish_calendar().await
    }

    async fn list_calendar_entries(&self) -> Result<Vec<CalendarEntry>, SteepleError> {
        queries::calendar::list_entries(self.db()?).await
    }

    async fn list_kpi_targets(&self) -> Result<Vec<KpiTargetRecord>, SteepleError> {
        queries::kpi::list_targets(self.db()?).await
    }

    async fn set_kpi_target(&self, owner: &str, target: &KpiTarget) -> Result<(), SteepleError> {
        queries::kpi::upsert_target(self.db()?, owner, target, self.clock.now()).await?;
        info!(owner = %owner, calls = target.calls, emails = target.emails, messages = target.messages, "KPI target saved");
        self.publish_kpi_targets().await
    }
}
