// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON-file preference store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use steeple_core::PreferenceStore;
use tracing::warn;

/// Preferences kept in a flat JSON object on disk.
///
/// The file is read once on open and rewritten after every change. A
/// missing or corrupt file starts empty; write failures are logged.
pub struct FilePreferences {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FilePreferences {
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "ignoring unreadable preferences file");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self {
            path,
            values: Mutex::new(values),
        }
    }

    fn persist(&self, values: &BTreeMap<String, String>) {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    warn!(path = %parent.display(), error = %e, "cannot create preferences directory");
                    return;
                }
            }
        }
        let text = match serde_json::to_string_pretty(values) {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "cannot encode preferences");
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, text) {
            warn!(path = %self.path.display(), error = %e, "cannot write preferences");
        }
    }

    fn update(&self, change: impl FnOnce(&mut BTreeMap<String, String>)) {
        let mut values = match self.values.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        change(&mut values);
        self.persist(&values);
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        let values = match self.values.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.update(|values| {
            values.insert(key.to_string(), value.to_string());
        });
    }

    fn remove(&self, key: &str) {
        self.update(|values| {
            values.remove(key);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn values_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prefs").join("p.json");
        let prefs = FilePreferences::open(&path);
        prefs.set("crm:view", "kpis");
        prefs.set("crm:userOwner", "Carmen");
        prefs.remove("crm:userOwner");

        let reopened = FilePreferences::open(&path);
        assert_eq!(reopened.get("crm:view").as_deref(), Some("kpis"));
        assert_eq!(reopened.get("crm:userOwner"), None);
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("p.json");
        std::fs::write(&path, "{not json").unwrap();
        let prefs = FilePreferences::open(&path);
        assert_eq!(prefs.get("crm:view"), None);
        prefs.set("crm:view", "pipeline");
        assert_eq!(FilePreferences::open(&path).get("crm:view").as_deref(), Some("pipeline"));
    }
}
