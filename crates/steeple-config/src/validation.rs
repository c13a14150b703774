// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks that serde attributes cannot express.

use steeple_core::OWNERS;

use crate::diagnostic::ConfigError;
use crate::model::SteepleConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &SteepleConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.app.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "app.log_level `{}` must be one of: {}",
                config.app.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if !OWNERS.contains(&config.crm.default_owner.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "crm.default_owner `{}` is not on the roster ({})",
                config.crm.default_owner,
                OWNERS.join(", ")
            ),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.storage.snapshot_buffer == 0 {
        errors.push(ConfigError::Validation {
            message: "storage.snapshot_buffer must be at least 1".to_string(),
        });
    }

    if config.preferences.path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "preferences.path must not be empty".to_string(),
        });
    }

    if config.export.directory.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "export.directory must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&SteepleConfig::default()).is_ok());
    }

    #[test]
    fn all_failures_are_collected() {
        let mut config = SteepleConfig::default();
        config.crm.default_owner = "Zed".into();
        config.storage.database_path = "  ".into();
        config.storage.snapshot_buffer = 0;
        config.app.log_level = "loud".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors[1].to_string().contains("Zed"));
    }
}
