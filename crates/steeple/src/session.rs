// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring a controller to the configured store and preference file.

use std::io::{BufRead, IsTerminal, Write};
use std::sync::Arc;

use steeple_app::{Collaborators, Controller, Notice, NoticeLevel};
use steeple_config::SteepleConfig;
use steeple_core::{Confirm, CrmStore, SteepleError, SystemClock};
use steeple_storage::{FilePreferences, SqliteStore};
use tracing::debug;

/// Asks on the terminal, or answers yes when `--yes` was given.
pub struct TerminalConfirm {
    assume_yes: bool,
}

impl TerminalConfirm {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        if !std::io::stdin().is_terminal() {
            debug!(%prompt, "no terminal to confirm on, declining");
            return false;
        }
        eprint!("{prompt} [y/N] ");
        let _ = std::io::stderr().flush();
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

/// An open store plus the controller over it.
pub struct Session {
    pub store: Arc<SqliteStore>,
    pub controller: Controller,
}

impl Session {
    /// Open the database, restore preferences, and load every collection.
    pub async fn open(config: &SteepleConfig, assume_yes: bool) -> Result<Self, SteepleError> {
        let store = Arc::new(SqliteStore::new(config.storage.clone()));
        store.initialize().await?;
        let mut controller = Controller::new(
            Collaborators {
                store: store.clone(),
                prefs: Arc::new(FilePreferences::open(&config.preferences.path)),
                confirm: Arc::new(TerminalConfirm::new(assume_yes)),
                clock: Arc::new(SystemClock),
            },
            &config.crm.default_owner,
        );
        controller.load().await?;
        Ok(Self { store, controller })
    }

    /// Print pending notices and close the store.
    pub async fn finish(mut self, use_color: bool) -> Result<(), SteepleError> {
        print_notices(&self.controller.take_notices(), use_color);
        self.store.close().await
    }
}

fn print_notices(notices: &[Notice], use_color: bool) {
    for notice in notices {
        if use_color {
            use colored::Colorize;
            match notice.level {
                NoticeLevel::Info => {
                    eprintln!("{} {}", notice.title.green().bold(), notice.message)
                }
                NoticeLevel::Error => {
                    eprintln!("{} {}", notice.title.red().bold(), notice.message.red())
                }
            }
        } else {
            let tag = match notice.level {
                NoticeLevel::Info => "[OK]",
                NoticeLevel::Error => "[FAIL]",
            };
            eprintln!("{tag} {}: {}", notice.title, notice.message);
        }
    }
}
