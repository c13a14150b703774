// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fuzzy church identity used to skip duplicate leads on import.

use std::collections::HashSet;

use steeple_core::Lead;

fn normalize(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Build the dedupe key for a church.
///
/// Each part is trimmed, lowercased, and has internal whitespace runs
/// collapsed to one space; parts are joined with `|`.
pub fn key_church(church_name: &str, city: &str, state: &str) -> String {
    format!(
        "{}|{}|{}",
        normalize(church_name),
        normalize(city),
        normalize(state)
    )
}

/// Keys of every existing lead.
pub fn existing_keys<'a>(leads: impl IntoIterator<Item = &'a Lead>) -> HashSet<String> {
    leads
        .into_iter()
        .map(|l| key_church(&l.church_name, &l.city, &l.state))
        .collect()
}
