// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory [`CrmStore`] for controller tests.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::{Mutex, broadcast};

use steeple_core::{
    Activity, CalendarEntry, Clock, CrmStore, HealthStatus, KpiTarget, KpiTargetRecord, Lead,
    LeadPatch, NewActivity, NewCalendarEntry, NewLead, Snapshot, SteepleError, SystemClock,
};

#[derive(Default)]
struct Collections {
    // (insertion sequence, document)
    leads: Vec<(u64, Lead)>,
    activities: Vec<(u64, Activity)>,
    calendar: Vec<(u64, CalendarEntry)>,
    kpi_targets: BTreeMap<String, KpiTargetRecord>,
}

impl Collections {
    fn leads_sorted(&self) -> Vec<Lead> {
        let mut leads = self.leads.clone();
        leads.sort_by(|(sa, a), (sb, b)| b.updated_at.cmp(&a.updated_at).then(sb.cmp(sa)));
        leads.into_iter().map(|(_, l)| l).collect()
    }

    fn activities_sorted(&self) -> Vec<Activity> {
        let mut all = self.activities.clone();
        all.sort_by(|(sa, a), (sb, b)| {
            a.happened_at
                .cmp(&b.happened_at)
                .then(a.created_at.cmp(&b.created_at))
                .then(sa.cmp(sb))
        });
        all.into_iter().map(|(_, a)| a).collect()
    }

    fn calendar_sorted(&self) -> Vec<CalendarEntry> {
        let mut entries = self.calendar.clone();
        entries.sort_by(|(sa, a), (sb, b)| a.starts_on.cmp(&b.starts_on).then(sa.cmp(sb)));
        entries.into_iter().map(|(_, e)| e).collect()
    }
}

/// A [`CrmStore`] over in-process collections.
///
/// Ordering and snapshot publication match the SQLite store. Ids are
/// sequential (`lead-1`, `activity-2`, ...). [`MemoryStore::fail_writes`]
/// makes every write return a storage error until turned off.
pub struct MemoryStore {
    clock: Arc<dyn Clock>,
    data: Arc<Mutex<Collections>>,
    snapshots: broadcast::Sender<Snapshot>,
    next_id: AtomicU64,
    fail_writes: AtomicBool,
    writes: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let (snapshots, _) = broadcast::channel(64);
        Self {
            clock,
            data: Arc::new(Mutex::new(Collections::default())),
            snapshots,
            next_id: AtomicU64::new(1),
            fail_writes: AtomicBool::new(false),
            writes: AtomicU64::new(0),
        }
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Insert a fully formed lead, bypassing id and timestamp assignment.
    pub async fn seed_lead(&self, lead: Lead) {
        let seq = self.next_seq();
        self.data.lock().await.leads.push((seq, lead));
    }

    /// Insert a fully formed activity, bypassing the lead-existence check.
    pub async fn seed_activity(&self, activity: Activity) {
        let seq = self.next_seq();
        self.data.lock().await.activities.push((seq, activity));
    }

    /// Insert a raw target document, including invalid values.
    pub async fn seed_kpi_target(&self, record: KpiTargetRecord) {
        self.data
            .lock()
            .await
            .kpi_targets
            .insert(record.owner.clone(), record);
    }

    fn next_seq(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn new_id(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.next_seq())
    }

    fn check_write(&self) -> Result<NaiveDateTime, SteepleError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SteepleError::storage(std::io::Error::other(
                "injected write failure",
            )));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(self.clock.now())
    }

    fn publish(&self, snapshot: Snapshot) {
        let _ = self.snapshots.send(snapshot);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CrmStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> Result<HealthStatus, SteepleError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Ok(HealthStatus::Degraded("writes failing".into()));
        }
        Ok(HealthStatus::Healthy)
    }

    async fn initialize(&self) -> Result<(), SteepleError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), SteepleError> {
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<Snapshot> {
        self.snapshots.subscribe()
    }

    async fn create_lead(&self, lead: &NewLead) -> Result<String, SteepleError> {
        let now = self.check_write()?;
        let seq = self.next_seq();
        let id = format!("lead-{seq}");
        let doc = Lead {
            id: id.clone(),
            church_name: lead.church_name.clone(),
            website: lead.website.clone(),
            livestream_status: lead.livestream_status,
            livestream_url: lead.livestream_url.clone(),
            city: lead.city.clone(),
            state: lead.state.clone(),
            contact_name: lead.contact_name.clone(),
            contact_role: lead.contact_role.clone(),
            phone: lead.phone.clone(),
            email: lead.email.clone(),
            owner: lead.owner.clone(),
            stage: lead.stage,
            tier_interest: lead.tier_interest.clone(),
            estimated_gear_budget: lead.estimated_gear_budget.clone(),
            notes: lead.notes.clone(),
            next_follow_up_at: lead.next_follow_up_at,
            last_activity_type: None,
            last_activity_at: None,
            deposit_paid: lead.deposit_paid,
            deposit_amount: lead.deposit_amount,
            deposit_paid_at: lead.deposit_paid_at,
            created_at: Some(now),
            updated_at: Some(now),
            closed_at: lead.closed_at,
        };
        let snapshot = {
            let mut data = self.data.lock().await;
            data.leads.push((seq, doc));
            data.leads_sorted()
        };
        self.publish(Snapshot::Leads(snapshot));
        Ok(id)
    }

    async fn get_lead(&self, id: &str) -> Result<Option<Lead>, SteepleError> {
        let data = self.data.lock().await;
        Ok(data
            .leads
            .iter()
            .find(|(_, l)| l.id == id)
            .map(|(_, l)| l.clone()))
    }

    async fn list_leads(&self) -> Result<Vec<Lead>, SteepleError> {
        Ok(self.data.lock().await.leads_sorted())
    }

    async fn update_lead(&self, id: &str, patch: &LeadPatch) -> Result<(), SteepleError> {
        let now = self.check_write()?;
        let snapshot = {
            let mut data = self.data.lock().await;
            let Some((_, lead)) = data.leads.iter_mut().find(|(_, l)| l.id == id) else {
                return Err(SteepleError::lead_not_found(id));
            };
            patch.apply_to(lead);
            lead.updated_at = Some(now);
            data.leads_sorted()
        };
        self.publish(Snapshot::Leads(snapshot));
        Ok(())
    }

    async fn delete_lead(&self, id: &str) -> Result<(), SteepleError> {
        self.check_write()?;
        let (leads, activities) = {
            let mut data = self.data.lock().await;
            data.leads.retain(|(_, l)| l.id != id);
            data.activities.retain(|(_, a)| a.lead_id != id);
            (data.leads_sorted(), data.activities_sorted())
        };
        self.publish(Snapshot::Leads(leads));
        self.publish(Snapshot::Activities(activities));
        Ok(())
    }

    async fn add_activity(
        &self,
        lead_id: &str,
        activity: &NewActivity,
    ) -> Result<String, SteepleError> {
        let now = self.check_write()?;
        let id = self.new_id("activity");
        let snapshot = {
            let mut data = self.data.lock().await;
            if !data.leads.iter().any(|(_, l)| l.id == lead_id) {
                return Err(SteepleError::lead_not_found(lead_id));
            }
            let seq = self.next_seq();
            data.activities.push((
                seq,
                Activity {
                    id: id.clone(),
                    lead_id: lead_id.to_string(),
                    activity_type: activity.activity_type,
                    notes: activity.notes.clone(),
                    happened_at: Some(activity.happened_at),
                    created_at: Some(now),
                    owner: activity.owner.clone(),
                },
            ));
            data.activities_sorted()
        };
        self.publish(Snapshot::Activities(snapshot));
        Ok(id)
    }

    async fn list_activities(
        &self,
        lead_id: &str,
        limit: usize,
    ) -> Result<Vec<Activity>, SteepleError> {
        let data = self.data.lock().await;
        let mut history: Vec<Activity> = data
            .activities_sorted()
            .into_iter()
            .filter(|a| a.lead_id == lead_id)
            .collect();
        history.reverse();
        history.truncate(limit);
        Ok(history)
    }

    async fn list_all_activities(&self) -> Result<Vec<Activity>, SteepleError> {
        Ok(self.data.lock().await.activities_sorted())
    }

    async fn create_calendar_entry(
        &self,
        entry: &NewCalendarEntry,
    ) -> Result<String, SteepleError> {
        let now = self.check_write()?;
        let seq = self.next_seq();
        let id = format!("calendar-{seq}");
        let snapshot = {
            let mut data = self.data.lock().await;
            data.calendar.push((
                seq,
                CalendarEntry {
                    id: id.clone(),
                    lead_id: entry.lead_id.clone(),
                    church_name: entry.church_name.clone(),
                    owner: entry.owner.clone(),
                    availability_type: entry.availability_type,
                    notes: entry.notes.clone(),
                    starts_on: Some(entry.starts_on),
                    created_by: entry.created_by.clone(),
                    created_at: Some(now),
                    updated_at: Some(now),
                },
            ));
            data.calendar_sorted()
        };
        self.publish(Snapshot::Calendar(snapshot));
        Ok(id)
    }

    async fn delete_calendar_entry(&self, id: &str) -> Result<(), SteepleError> {
        self.check_write()?;
        let snapshot = {
            let mut data = self.data.lock().await;
            data.calendar.retain(|(_, e)| e.id != id);
            data.calendar_sorted()
        };
        self.publish(Snapshot::Calendar(snapshot));
        Ok(())
    }

    async fn list_calendar_entries(&self) -> Result<Vec<CalendarEntry>, SteepleError> {
        Ok(self.data.lock().await.calendar_sorted())
    }

    async fn list_kpi_targets(&self) -> Result<Vec<KpiTargetRecord>, SteepleError> {
        Ok(self.data.lock().await.kpi_targets.values().cloned().collect())
    }

    async fn set_kpi_target(&self, owner: &str, target: &KpiTarget) -> Result<(), SteepleError> {
        self.check_write()?;
        let snapshot = {
            let mut data = self.data.lock().await;
            data.kpi_targets.insert(
                owner.to_string(),
                KpiTargetRecord {
                    owner: owner.to_string(),
                    calls: Some(i64::from(target.calls)),
                    emails: Some(i64::from(target.emails)),
                    messages: Some(i64::from(target.messages)),
                },
            );
            data.kpi_targets.values().cloned().collect()
        };
        self.publish(Snapshot::KpiTargets(snapshot));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use steeple_core::{ActivityType, Stage};

    use super::*;
    use crate::FixedClock;
    use crate::fixtures::new_lead;

    fn store() -> (Arc<FixedClock>, MemoryStore) {
        let clock = Arc::new(FixedClock::at(2026, 10, 16, 9));
        (clock.clone(), MemoryStore::with_clock(clock))
    }

    #[tokio::test]
    async fn leads_list_most_recently_updated_first() {
        let (clock, store) = store();
        let a = store.create_lead(&new_lead("A", "Adrian")).await.unwrap();
        clock.advance(Duration::minutes(1));
        let b = store.create_lead(&new_lead("B", "Adrian")).await.unwrap();
        clock.advance(Duration::minutes(1));
        store
            .update_lead(
                &a,
                &LeadPatch {
                    stage: Some(Stage::Contacted),
                    ..LeadPatch::default()
                },
            )
            .await
            .unwrap();

        let ids: Vec<String> = store.list_leads().await.unwrap().into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[tokio::test]
    async fn injected_failures_block_writes() {
        let (_, store) = store();
        store.fail_writes(true);
        assert!(matches!(
            store.create_lead(&new_lead("A", "Adrian")).await,
            Err(SteepleError::Storage { .. })
        ));
        assert!(store.list_leads().await.unwrap().is_empty());
        store.fail_writes(false);
        store.create_lead(&new_lead("A", "Adrian")).await.unwrap();
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn delete_cascades_and_publishes_both_collections() {
        let (clock, store) = store();
        let id = store.create_lead(&new_lead("A", "Adrian")).await.unwrap();
        store
            .add_activity(
                &id,
                &NewActivity {
                    activity_type: ActivityType::EmailSent,
                    notes: String::new(),
                    happened_at: clock.now(),
                    owner: Some("Adrian".into()),
                },
            )
            .await
            .unwrap();
        let mut rx = store.subscribe();
        store.delete_lead(&id).await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), Snapshot::Leads(vec![]));
        assert_eq!(rx.recv().await.unwrap(), Snapshot::Activities(vec![]));
    }
}
