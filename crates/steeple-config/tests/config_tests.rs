// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Steeple configuration system.

use std::io::Write;

use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use steeple_config::diagnostic::ConfigError;
use steeple_config::model::SteepleConfig;
use steeple_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

#[test]
fn full_toml_deserializes() {
    let toml = r#"
[app]
log_level = "debug"

[crm]
default_owner = "Carmen"

[storage]
database_path = "/tmp/steeple-test.db"
wal_mode = false
snapshot_buffer = 8

[preferences]
path = "/tmp/prefs.json"

[export]
directory = "/tmp/exports"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.app.log_level, "debug");
    assert_eq!(config.crm.default_owner, "Carmen");
    assert_eq!(config.storage.database_path, "/tmp/steeple-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.storage.snapshot_buffer, 8);
    assert_eq!(config.preferences.path, "/tmp/prefs.json");
    assert_eq!(config.export.directory, "/tmp/exports");
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    assert_eq!(config.app.log_level, "info");
    assert_eq!(config.crm.default_owner, "Adrian");
    assert!(config.storage.wal_mode);
    assert_eq!(config.storage.snapshot_buffer, 64);
    assert!(config.storage.database_path.ends_with("steeple.db"));
    assert_eq!(config.export.directory, ".");
}

#[test]
fn unknown_key_in_section_is_rejected() {
    let err = load_config_from_str("[crm]\ndefualt_owner = \"Carmen\"\n")
        .expect_err("should reject unknown field");
    let msg = err.to_string();
    assert!(
        msg.contains("unknown field") || msg.contains("defualt_owner"),
        "got: {msg}"
    );
}

#[test]
fn unknown_top_level_section_is_rejected() {
    assert!(load_config_from_str("[logging]\nlevel = \"debug\"\n").is_err());
}

#[test]
fn unknown_key_diagnostic_carries_suggestion() {
    let errors = load_and_validate_str("[storage]\nsnapshot_bufer = 3\n")
        .expect_err("should produce diagnostics");
    let suggestion = errors.iter().find_map(|e| match e {
        ConfigError::UnknownKey { suggestion, .. } => suggestion.clone(),
        _ => None,
    });
    assert_eq!(suggestion.as_deref(), Some("snapshot_buffer"));
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[storage]\nwal_mode = \"yes please\"\n")
        .expect_err("should produce diagnostics");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. }))
    );
}

#[test]
fn unrostered_default_owner_fails_validation() {
    let errors = load_and_validate_str("[crm]\ndefault_owner = \"Zed\"\n")
        .expect_err("should fail validation");
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}

#[test]
fn dotted_override_wins_over_file() {
    let config: SteepleConfig = Figment::new()
        .merge(Serialized::defaults(SteepleConfig::default()))
        .merge(Toml::string("[crm]\ndefault_owner = \"Adrian\"\n"))
        .merge(("crm.default_owner", "Carmen"))
        .extract()
        .expect("override should merge");
    assert_eq!(config.crm.default_owner, "Carmen");
}

#[test]
fn missing_file_is_skipped() {
    let config: SteepleConfig = Figment::new()
        .merge(Serialized::defaults(SteepleConfig::default()))
        .merge(Toml::file("/nonexistent/steeple.toml"))
        .extract()
        .expect("missing file should be skipped");
    assert_eq!(config.crm.default_owner, "Adrian");
}

#[test]
fn explicit_path_is_loaded() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[export]\ndirectory = \"/srv/exports\"").unwrap();
    let config = load_and_validate_path(file.path()).expect("file should load");
    assert_eq!(config.export.directory, "/srv/exports");
}
