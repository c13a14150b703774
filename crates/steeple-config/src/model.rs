// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Steeple CRM.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key fails
//! at startup instead of being silently ignored.

use serde::{Deserialize, Serialize};
use steeple_core::OWNERS;

/// Top-level Steeple configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SteepleConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub app: AppConfig,

    /// Sales team settings.
    #[serde(default)]
    pub crm: CrmConfig,

    /// Document store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Local preference file.
    #[serde(default)]
    pub preferences: PreferencesConfig,

    /// CSV export destination.
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CrmConfig {
    /// Owner assumed for this device until a preference says otherwise.
    #[serde(default = "default_owner")]
    pub default_owner: String,
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            default_owner: default_owner(),
        }
    }
}

fn default_owner() -> String {
    OWNERS[0].to_string()
}

/// SQLite store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL mode.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// Capacity of the snapshot broadcast channel.
    #[serde(default = "default_snapshot_buffer")]
    pub snapshot_buffer: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            snapshot_buffer: default_snapshot_buffer(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("steeple").join("steeple.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("steeple.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

fn default_snapshot_buffer() -> usize {
    64
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PreferencesConfig {
    /// JSON file holding per-device view preferences.
    #[serde(default = "default_preferences_path")]
    pub path: String,
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            path: default_preferences_path(),
        }
    }
}

fn default_preferences_path() -> String {
    dirs::config_dir()
        .map(|p| p.join("steeple").join("preferences.json"))
        .unwrap_or_else(|| std::path::PathBuf::from("steeple-preferences.json"))
        .to_string_lossy()
        .into_owned()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    /// Directory CSV exports are written to.
    #[serde(default = "default_export_directory")]
    pub directory: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: default_export_directory(),
        }
    }
}

fn default_export_directory() -> String {
    ".".to_string()
}
