// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local key/value preference store.

/// A per-device string map that survives restarts.
///
/// Implementations swallow their own I/O failures: a preference that cannot
/// be read falls back to its default, and a failed write is only logged.
pub trait PreferenceStore: Send + Sync {
    /// Returns the stored value for `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`.
    fn set(&self, key: &str, value: &str);

    /// Removes `key`.
    fn remove(&self, key: &str);
}
