// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The controller over a real SQLite file.

use std::path::Path;
use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};
use steeple_app::{ActivityForm, Collaborators, Controller, NewLeadForm, views};
use steeple_config::model::StorageConfig;
use steeple_core::{ActivityType, Clock, CrmStore, Stage};
use steeple_storage::{FilePreferences, SqliteStore};
use steeple_test_utils::{FixedClock, ScriptedConfirm};

/// Ticks one second on every read, so each write gets its own stamp.
struct StepClock(FixedClock);

impl Clock for StepClock {
    fn now(&self) -> NaiveDateTime {
        self.0.advance(Duration::seconds(1));
        self.0.now()
    }
}

async fn open_controller(dir: &Path, db: &str) -> Controller {
    let config = StorageConfig {
        database_path: dir.join(db).to_string_lossy().to_string(),
        wal_mode: true,
        snapshot_buffer: 16,
    };
    let clock: Arc<dyn Clock> = Arc::new(StepClock(FixedClock::at(2026, 10, 16, 9)));
    let store = Arc::new(SqliteStore::with_clock(config, clock.clone()));
    store.initialize().await.unwrap();
    let mut controller = Controller::new(
        Collaborators {
            store,
            prefs: Arc::new(FilePreferences::open(dir.join(format!("{db}.prefs.json")))),
            confirm: Arc::new(ScriptedConfirm::always(true)),
            clock,
        },
        "Carmen",
    );
    controller.load().await.unwrap();
    controller
}

#[tokio::test]
async fn lead_lifecycle_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig {
        database_path: dir.path().join("crm.db").to_string_lossy().to_string(),
        wal_mode: true,
        snapshot_buffer: 16,
    };
    let clock = Arc::new(FixedClock::at(2026, 10, 16, 9));
    let prefs_path = dir.path().join("prefs.json");

    let lead_id = {
        let store = Arc::new(SqliteStore::with_clock(config.clone(), clock.clone()));
        store.initialize().await.unwrap();
        let mut controller = Controller::new(
            Collaborators {
                store: store.clone(),
                prefs: Arc::new(FilePreferences::open(&prefs_path)),
                confirm: Arc::new(ScriptedConfirm::always(true)),
                clock: clock.clone(),
            },
            "Carmen",
        );
        controller.load().await.unwrap();

        let id = controller
            .create_lead(NewLeadForm {
                church_name: "Grace".into(),
                city: "Austin".into(),
                state: "TX".into(),
                ..NewLeadForm::default()
            })
            .await
            .unwrap();
        controller
            .log_activity(
                &id,
                ActivityForm {
                    activity_type: ActivityType::DepositPaid,
                    date: "2026-10-15".into(),
                    notes: "card".into(),
                },
            )
            .await
            .unwrap();
        controller.shift_calendar_month(2);
        store.close().await.unwrap();
        id
    };

    let store = Arc::new(SqliteStore::with_clock(config, clock.clone()));
    store.initialize().await.unwrap();
    let mut controller = Controller::new(
        Collaborators {
            store,
            prefs: Arc::new(FilePreferences::open(&prefs_path)),
            confirm: Arc::new(ScriptedConfirm::always(true)),
            clock: clock.clone(),
        },
        "Carmen",
    );
    controller.load().await.unwrap();

    let lead = controller.state().lead(&lead_id).unwrap();
    assert_eq!(lead.owner, "Carmen");
    assert_eq!(lead.stage, Stage::ClosedWon);
    assert_eq!(lead.closed_at, Some(clock.now()));
    assert_eq!(controller.state().calendar_month, "2026-12");

    controller.open_lead(&lead_id).await.unwrap();
    let detail = views::detail(controller.state()).unwrap();
    assert_eq!(detail.activities.len(), 1);
    assert_eq!(detail.activities[0].notes, "card");
}

#[tokio::test]
async fn export_is_byte_identical_after_reimport() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = open_controller(dir.path(), "source.db").await;
    let mut ids = Vec::new();
    for church in ["Grace", "Hope", "Trinity"] {
        let id = source
            .create_lead(NewLeadForm {
                church_name: church.into(),
                city: "Austin".into(),
                state: "TX".into(),
                ..NewLeadForm::default()
            })
            .await
            .unwrap();
        ids.push(id);
    }
    // Touching the oldest lead moves it to the top of the list but not the export.
    source
        .log_activity(
            &ids[0],
            ActivityForm {
                activity_type: ActivityType::EmailSent,
                date: "2026-10-15".into(),
                notes: String::new(),
            },
        )
        .await
        .unwrap();
    assert_eq!(source.state().leads[0].id, ids[0]);

    let export = source.export_csv().unwrap();
    let churches: Vec<&str> = export
        .contents
        .lines()
        .skip(1)
        .filter_map(|line| line.split(',').next())
        .collect();
    assert_eq!(churches, ["Grace", "Hope", "Trinity"]);

    let mut target = open_controller(dir.path(), "target.db").await;
    let summary = target.import_csv(&export.contents).await.unwrap();
    assert_eq!(summary.created, 3);
    let again = target.export_csv().unwrap();
    assert_eq!(again.contents, export.contents);
}
