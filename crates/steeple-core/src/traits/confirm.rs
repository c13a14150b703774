// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User confirmation for destructive actions.

/// Asks the user a yes/no question before a destructive action.
pub trait Confirm: Send + Sync {
    /// Returns true if the user agreed.
    fn confirm(&self, prompt: &str) -> bool;
}
