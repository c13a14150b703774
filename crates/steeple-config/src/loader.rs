// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Later layers override earlier ones:
//! compiled defaults, `/etc/steeple/steeple.toml`,
//! `~/.config/steeple/steeple.toml`, `./steeple.toml`, then `STEEPLE_*`
//! environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::SteepleConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG: &str = "/etc/steeple/steeple.toml";

/// Configuration file in the working directory.
pub const LOCAL_CONFIG: &str = "steeple.toml";

/// The per-user configuration file, if a config directory exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("steeple").join("steeple.toml"))
}

/// Files consulted by [`load_config`], lowest precedence first.
pub fn config_files() -> Vec<PathBuf> {
    let mut files = vec![PathBuf::from(SYSTEM_CONFIG)];
    files.extend(user_config_path());
    files.push(PathBuf::from(LOCAL_CONFIG));
    files
}

/// The full layered Figment, before extraction.
pub fn build_figment() -> Figment {
    config_files()
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(SteepleConfig::default())),
            |figment, file| figment.merge(Toml::file(file)),
        )
        .merge(env_provider())
}

/// Load from the standard file hierarchy with environment overrides.
pub fn load_config() -> Result<SteepleConfig, figment::Error> {
    build_figment().extract()
}

/// Load defaults overlaid with one TOML string. No files, no environment.
pub fn load_config_from_str(toml_content: &str) -> Result<SteepleConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SteepleConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load one explicit file with environment overrides, skipping the hierarchy.
pub fn load_config_from_path(path: &Path) -> Result<SteepleConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SteepleConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Map `STEEPLE_<SECTION>_<KEY>` to `<section>.<key>`.
///
/// Only the first underscore after the section name becomes a dot, so
/// `STEEPLE_CRM_DEFAULT_OWNER` maps to `crm.default_owner`.
pub fn env_key(raw: &str) -> String {
    const SECTIONS: [&str; 5] = ["app", "crm", "storage", "preferences", "export"];
    let raw = raw.to_ascii_lowercase();
    for section in SECTIONS {
        if let Some(rest) = raw.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    raw
}

fn env_provider() -> Env {
    Env::prefixed("STEEPLE_").map(|key| env_key(key.as_str()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_split_on_section_only() {
        assert_eq!(env_key("crm_default_owner"), "crm.default_owner");
        assert_eq!(env_key("storage_database_path"), "storage.database_path");
        assert_eq!(env_key("preferences_path"), "preferences.path");
        assert_eq!(env_key("app_log_level"), "app.log_level");
        assert_eq!(env_key("EXPORT_DIRECTORY"), "export.directory");
        assert_eq!(env_key("unrelated"), "unrelated");
    }

    #[test]
    fn hierarchy_ends_with_local_file() {
        let files = config_files();
        assert_eq!(files.first(), Some(&PathBuf::from(SYSTEM_CONFIG)));
        assert_eq!(files.last(), Some(&PathBuf::from(LOCAL_CONFIG)));
    }
}
