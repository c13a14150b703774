// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `steeple doctor` command implementation.
//!
//! Checks that the database opens, the preference file is usable, and the
//! export directory exists.

use std::collections::BTreeMap;
use std::io::IsTerminal;
use std::path::Path;
use std::time::{Duration, Instant};

use steeple_config::SteepleConfig;
use steeple_core::{CrmStore, HealthStatus, SteepleError};
use steeple_storage::SqliteStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run every check and print a report. Returns the number of failed checks.
pub async fn run_doctor(config: &SteepleConfig, plain: bool) -> Result<usize, SteepleError> {
    let use_color = !plain && std::io::stdout().is_terminal();
    let results = vec![
        check_database(config).await,
        check_preferences(&config.preferences.path),
        check_export_directory(&config.export.directory),
    ];

    println!();
    println!("  steeple doctor");
    println!("  {}", "-".repeat(50));

    let mut fail_count = 0;
    let mut warn_count = 0;
    for result in &results {
        let duration_ms = result.duration.as_millis();
        let tag = match result.status {
            CheckStatus::Pass => {
                if use_color {
                    use colored::Colorize;
                    "✓".green().to_string()
                } else {
                    "[OK]  ".to_string()
                }
            }
            CheckStatus::Warn => {
                warn_count += 1;
                if use_color {
                    use colored::Colorize;
                    "!".yellow().to_string()
                } else {
                    "[WARN]".to_string()
                }
            }
            CheckStatus::Fail => {
                fail_count += 1;
                if use_color {
                    use colored::Colorize;
                    "✗".red().to_string()
                } else {
                    "[FAIL]".to_string()
                }
            }
        };
        println!(
            "    {tag} {:<20} {} ({duration_ms}ms)",
            result.name, result.message
        );
    }

    println!();
    let issues = fail_count + warn_count;
    if issues > 0 {
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }
    println!();

    Ok(fail_count)
}

async fn check_database(config: &SteepleConfig) -> CheckResult {
    let start = Instant::now();
    let existed = Path::new(&config.storage.database_path).exists();
    let store = SqliteStore::new(config.storage.clone());
    if let Err(e) = store.initialize().await {
        return CheckResult::new("Database", CheckStatus::Fail, e.to_string(), start);
    }
    let status = store.health_check().await;
    let _ = store.close().await;
    match status {
        Ok(HealthStatus::Healthy) if existed => {
            CheckResult::new("Database", CheckStatus::Pass, "connected", start)
        }
        Ok(HealthStatus::Healthy) => CheckResult::new(
            "Database",
            CheckStatus::Warn,
            format!("created {}", config.storage.database_path),
            start,
        ),
        Ok(HealthStatus::Degraded(reason)) => {
            CheckResult::new("Database", CheckStatus::Warn, reason, start)
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            CheckResult::new("Database", CheckStatus::Fail, reason, start)
        }
        Err(e) => CheckResult::new("Database", CheckStatus::Fail, e.to_string(), start),
    }
}

fn check_preferences(path: &str) -> CheckResult {
    let start = Instant::now();
    let path = Path::new(path);
    if !path.exists() {
        return CheckResult::new(
            "Preferences",
            CheckStatus::Pass,
            "not saved yet (defaults in use)",
            start,
        );
    }
    let parsed = std::fs::read_to_string(path).map(|text| {
        serde_json::from_str::<BTreeMap<String, String>>(&text).is_ok()
    });
    match parsed {
        Ok(true) => CheckResult::new("Preferences", CheckStatus::Pass, "readable", start),
        Ok(false) => CheckResult::new(
            "Preferences",
            CheckStatus::Warn,
            "unreadable contents, defaults will be used",
            start,
        ),
        Err(e) => CheckResult::new("Preferences", CheckStatus::Fail, e.to_string(), start),
    }
}

fn check_export_directory(directory: &str) -> CheckResult {
    let start = Instant::now();
    let path = Path::new(directory);
    if path.is_dir() {
        CheckResult::new("Export directory", CheckStatus::Pass, directory, start)
    } else {
        CheckResult::new(
            "Export directory",
            CheckStatus::Warn,
            format!("{directory} does not exist"),
            start,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_preferences_file_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let result = check_preferences(&dir.path().join("prefs.json").to_string_lossy());
        assert_eq!(result.status, CheckStatus::Pass);
    }

    #[test]
    fn garbage_preferences_file_warns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "not json").unwrap();
        let result = check_preferences(&path.to_string_lossy());
        assert_eq!(result.status, CheckStatus::Warn);
    }

    #[test]
    fn export_directory_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let ok = check_export_directory(&dir.path().to_string_lossy());
        assert_eq!(ok.status, CheckStatus::Pass);
        let missing = check_export_directory(&dir.path().join("nope").to_string_lossy());
        assert_eq!(missing.status, CheckStatus::Warn);
    }
}
