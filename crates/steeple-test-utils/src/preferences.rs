// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Map-backed preference store.

use std::collections::HashMap;
use std::sync::Mutex;

use steeple_core::PreferenceStore;

#[derive(Default)]
pub struct MemoryPreferences {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with initial key/value pairs.
    pub fn with<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let prefs = Self::new();
        for (k, v) in pairs {
            prefs.set(k, v);
        }
        prefs
    }

    /// Copy of every stored pair.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.values.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut values) = self.values.lock() {
            values.remove(key);
        }
    }
}
