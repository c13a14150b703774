// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SqliteStore behavior through the CrmStore trait.

use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use steeple_config::model::StorageConfig;
use steeple_core::dates::parse_us_date;
use steeple_core::{
    ActivityType, AvailabilityType, Clock, CrmStore, HealthStatus, KpiTarget, LeadPatch,
    LivestreamStatus, NewActivity, NewCalendarEntry, NewLead, Snapshot, Stage, SteepleError,
};
use steeple_storage::SqliteStore;
use tempfile::{TempDir, tempdir};

struct StepClock(Mutex<NaiveDateTime>);

impl Clock for StepClock {
    fn now(&self) -> NaiveDateTime {
        let mut now = self.0.lock().unwrap();
        *now += Duration::seconds(1);
        *now
    }
}

async fn store() -> (TempDir, SqliteStore) {
    let dir = tempdir().unwrap();
    let config = StorageConfig {
        database_path: dir.path().join("crm.db").to_str().unwrap().to_string(),
        wal_mode: true,
        snapshot_buffer: 16,
    };
    let start = NaiveDate::from_ymd_opt(2026, 10, 16)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    let store = SqliteStore::with_clock(config, Arc::new(StepClock(Mutex::new(start))));
    store.initialize().await.unwrap();
    (dir, store)
}

fn new_lead(name: &str) -> NewLead {
    NewLead {
        church_name: name.into(),
        city: "Austin".into(),
        state: "TX".into(),
        owner: "Adrian".into(),
        ..NewLead::default()
    }
}

#[tokio::test]
async fn uninitialized_store_is_unhealthy_and_rejects_queries() {
    let dir = tempdir().unwrap();
    let store = SqliteStore::new(StorageConfig {
        database_path: dir.path().join("x.db").to_str().unwrap().to_string(),
        wal_mode: true,
        snapshot_buffer: 4,
    });
    assert!(matches!(
        store.health_check().await.unwrap(),
        HealthStatus::Unhealthy(_)
    ));
    assert!(store.list_leads().await.is_err());
}

#[tokio::test]
async fn initialize_is_idempotent_and_healthy() {
    let (_dir, store) = store().await;
    store.initialize().await.unwrap();
    assert_eq!(store.name(), "sqlite");
    assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
    store.close().await.unwrap();
}

#[tokio::test]
async fn every_lead_field_roundtrips() {
    let (_dir, store) = store().await;
    let lead = NewLead {
        church_name: "Grace".into(),
        website: "grace.org".into(),
        livestream_status: Some(LivestreamStatus::Unknown),
        livestream_url: "https://yt/grace".into(),
        city: "Austin".into(),
        state: "TX".into(),
        contact_name: "Pat".into(),
        contact_role: "Pastor".into(),
        phone: "555".into(),
        email: "pat@grace.org".into(),
        owner: "Carmen".into(),
        stage: Stage::DiscoveryScheduled,
        tier_interest: "Pro".into(),
        estimated_gear_budget: "$5,000".into(),
        notes: "line one\nline two".into(),
        next_follow_up_at: parse_us_date("11/02/2026"),
        deposit_paid: false,
        deposit_amount: Some(250.5),
        deposit_paid_at: None,
        closed_at: None,
    };
    let id = store.create_lead(&lead).await.unwrap();
    let got = store.get_lead(&id).await.unwrap().unwrap();

    assert_eq!(got.id, id);
    assert_eq!(got.church_name, lead.church_name);
    assert_eq!(got.website, lead.website);
    assert_eq!(got.livestream_status, lead.livestream_status);
    assert_eq!(got.livestream_url, lead.livestream_url);
    assert_eq!(got.contact_name, lead.contact_name);
    assert_eq!(got.contact_role, lead.contact_role);
    assert_eq!(got.phone, lead.phone);
    assert_eq!(got.email, lead.email);
    assert_eq!(got.owner, lead.owner);
    assert_eq!(got.stage, lead.stage);
    assert_eq!(got.tier_interest, lead.tier_interest);
    assert_eq!(got.estimated_gear_budget, lead.estimated_gear_budget);
    assert_eq!(got.notes, lead.notes);
    assert_eq!(got.next_follow_up_at, lead.next_follow_up_at);
    assert_eq!(got.deposit_amount, Some(250.5));
    assert!(got.created_at.is_some());
    assert_eq!(got.created_at, got.updated_at);
    assert_eq!(got.last_activity_type, None);
}

#[tokio::test]
async fn leads_list_most_recently_updated_first() {
    let (_dir, store) = store().await;
    let a = store.create_lead(&new_lead("A")).await.unwrap();
    let b = store.create_lead(&new_lead("B")).await.unwrap();
    let ids: Vec<String> = store.list_leads().await.unwrap().into_iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![b.clone(), a.clone()]);

    store
        .update_lead(
            &a,
            &LeadPatch {
                notes: Some("touched".into()),
                ..LeadPatch::default()
            },
        )
        .await
        .unwrap();
    let ids: Vec<String> = store.list_leads().await.unwrap().into_iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![a, b]);
}

#[tokio::test]
async fn patch_merges_and_clears() {
    let (_dir, store) = store().await;
    let mut lead = new_lead("Grace");
    lead.next_follow_up_at = parse_us_date("01/05/2026");
    let id = store.create_lead(&lead).await.unwrap();

    let closed = parse_us_date("02/01/2026").unwrap();
    store
        .update_lead(
            &id,
            &LeadPatch {
                stage: Some(Stage::ClosedLost),
                next_follow_up_at: Some(None),
                last_activity_type: Some(ActivityType::ClosedLost),
                closed_at: Some(closed),
                ..LeadPatch::default()
            },
        )
        .await
        .unwrap();

    let got = store.get_lead(&id).await.unwrap().unwrap();
    assert_eq!(got.stage, Stage::ClosedLost);
    assert_eq!(got.next_follow_up_at, None);
    assert_eq!(got.last_activity_type, Some(ActivityType::ClosedLost));
    assert_eq!(got.closed_at, Some(closed));
    assert_eq!(got.owner, "Adrian");
    assert!(got.updated_at > got.created_at);
}

#[tokio::test]
async fn updating_missing_lead_is_not_found() {
    let (_dir, store) = store().await;
    let err = store
        .update_lead("ghost", &LeadPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SteepleError::NotFound { kind: "lead", .. }));
}

#[tokio::test]
async fn activities_are_newest_first_limited_and_cascade() {
    let (_dir, store) = store().await;
    let id = store.create_lead(&new_lead("Grace")).await.unwrap();
    let base = parse_us_date("03/01/2026").unwrap();
    for day in 0..5 {
        store
            .add_activity(
                &id,
                &NewActivity {
                    activity_type: ActivityType::CallAttempted,
                    notes: format!("call {day}"),
                    happened_at: base + Duration::days(day),
                    owner: Some("Adrian".into()),
                },
            )
            .await
            .unwrap();
    }

    let recent = store.list_activities(&id, 3).await.unwrap();
    let notes: Vec<&str> = recent.iter().map(|a| a.notes.as_str()).collect();
    assert_eq!(notes, vec!["call 4", "call 3", "call 2"]);
    assert_eq!(recent[0].owner.as_deref(), Some("Adrian"));
    assert_eq!(store.list_all_activities().await.unwrap().len(), 5);

    store.delete_lead(&id).await.unwrap();
    assert!(store.get_lead(&id).await.unwrap().is_none());
    assert!(store.list_all_activities().await.unwrap().is_empty());
}

#[tokio::test]
async fn activity_for_missing_lead_is_rejected() {
    let (_dir, store) = store().await;
    let err = store
        .add_activity(
            "ghost",
            &NewActivity {
                activity_type: ActivityType::EmailSent,
                notes: String::new(),
                happened_at: parse_us_date("03/01/2026").unwrap(),
                owner: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SteepleError::NotFound { .. }));
}

#[tokio::test]
async fn calendar_entries_sort_by_start() {
    let (_dir, store) = store().await;
    let lead = store.create_lead(&new_lead("Grace")).await.unwrap();
    let entry = |date: &str| NewCalendarEntry {
        lead_id: lead.clone(),
        church_name: "Grace".into(),
        owner: "Adrian".into(),
        availability_type: AvailabilityType::Booked,
        notes: String::new(),
        starts_on: parse_us_date(date).unwrap(),
        created_by: "Carmen".into(),
    };
    let late = store.create_calendar_entry(&entry("05/20/2026")).await.unwrap();
    let early = store.create_calendar_entry(&entry("05/02/2026")).await.unwrap();

    let listed = store.list_calendar_entries().await.unwrap();
    assert_eq!(listed[0].id, early);
    assert_eq!(listed[1].id, late);
    assert_eq!(listed[0].availability_type, AvailabilityType::Booked);
    assert_eq!(listed[0].created_by, "Carmen");

    store.delete_calendar_entry(&early).await.unwrap();
    assert_eq!(store.list_calendar_entries().await.unwrap().len(), 1);
}

#[tokio::test]
async fn kpi_targets_upsert_per_owner() {
    let (_dir, store) = store().await;
    store
        .set_kpi_target("Carmen", &KpiTarget { calls: 10, emails: 20, messages: 30 })
        .await
        .unwrap();
    store
        .set_kpi_target("Carmen", &KpiTarget { calls: 11, emails: 21, messages: 31 })
        .await
        .unwrap();
    let records = store.list_kpi_targets().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].owner, "Carmen");
    assert_eq!(records[0].calls, Some(11));
    assert_eq!(records[0].messages, Some(31));
}

#[tokio::test]
async fn hand_edited_rows_read_leniently() {
    let (dir, store) = store().await;
    let lead = store.create_lead(&new_lead("Grace")).await.unwrap();
    let happened = parse_us_date("10/14/2026").unwrap();
    store
        .add_activity(
            &lead,
            &NewActivity {
                activity_type: ActivityType::CallAttempted,
                notes: "left voicemail".into(),
                happened_at: happened,
                owner: Some("Adrian".into()),
            },
        )
        .await
        .unwrap();

    let conn = rusqlite::Connection::open(dir.path().join("crm.db")).unwrap();
    conn.execute_batch(&format!(
        "INSERT INTO kpi_targets (owner, calls, emails, messages, updated_at)
         VALUES ('Carmen', 'lots', 12.5, 40, '2026-10-16T09:00:00.000');
         INSERT INTO activities (id, lead_id, type, notes, happened_at, created_at, owner)
         VALUES ('smoke', '{lead}', 'Smoke Signal', '', '2026-10-14T10:00:00.000',
                 '2026-10-16T09:00:00.000', 'Adrian');
         INSERT INTO calendar_availability
             (id, lead_id, availability_type, starts_on, created_at, updated_at)
         VALUES ('cal', '{lead}', 'Maybe', '2026-11-01T00:00:00.000',
                 '2026-10-16T09:00:00.000', '2026-10-16T09:00:00.000');"
    ))
    .unwrap();
    drop(conn);

    let targets = store.list_kpi_targets().await.unwrap();
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].calls, None);
    assert_eq!(targets[0].emails, None);
    assert_eq!(targets[0].messages, Some(40));

    let all = store.list_all_activities().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].activity_type, ActivityType::CallAttempted);
    assert_eq!(store.list_activities(&lead, 10).await.unwrap().len(), 1);

    let calendar = store.list_calendar_entries().await.unwrap();
    assert_eq!(calendar.len(), 1);
    assert_eq!(calendar[0].availability_type, AvailabilityType::Available);
}

#[tokio::test]
async fn writes_publish_collection_snapshots() {
    let (_dir, store) = store().await;
    let mut rx = store.subscribe();

    let id = store.create_lead(&new_lead("Grace")).await.unwrap();
    match rx.recv().await.unwrap() {
        Snapshot::Leads(leads) => assert_eq!(leads[0].id, id),
        other => panic!("expected leads snapshot, got {other:?}"),
    }

    store
        .set_kpi_target("Adrian", &KpiTarget::DEFAULT)
        .await
        .unwrap();
    assert!(matches!(rx.recv().await.unwrap(), Snapshot::KpiTargets(t) if t.len() == 1));

    store.delete_lead(&id).await.unwrap();
    assert!(matches!(rx.recv().await.unwrap(), Snapshot::Leads(l) if l.is_empty()));
    assert!(matches!(rx.recv().await.unwrap(), Snapshot::Activities(a) if a.is_empty()));
}
