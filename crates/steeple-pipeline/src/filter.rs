// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Owner, stage, and free-text lead filtering.

use steeple_core::{ALL_FILTER, Lead};

/// The three list filters. `ALL` disables the owner or stage filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadFilter {
    pub owner: String,
    pub stage: String,
    pub search: String,
}

impl Default for LeadFilter {
    fn default() -> Self {
        Self {
            owner: ALL_FILTER.to_string(),
            stage: ALL_FILTER.to_string(),
            search: String::new(),
        }
    }
}

impl LeadFilter {
    pub fn matches(&self, lead: &Lead) -> bool {
        matches(lead, &self.owner, &self.stage, &self.search)
    }
}

/// Text searched by the free-text filter: non-empty fields joined by spaces.
fn haystack(lead: &Lead) -> String {
    let status = lead.livestream_status.map(|s| s.to_string());
    [
        lead.church_name.as_str(),
        lead.city.as_str(),
        lead.state.as_str(),
        lead.notes.as_str(),
        lead.website.as_str(),
        lead.email.as_str(),
        lead.phone.as_str(),
        lead.contact_name.as_str(),
        lead.contact_role.as_str(),
        lead.livestream_url.as_str(),
        status.as_deref().unwrap_or(""),
    ]
    .into_iter()
    .filter(|field| !field.is_empty())
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase()
}

/// Returns true if `lead` passes the owner filter, the stage filter, and the search.
pub fn matches(lead: &Lead, owner_filter: &str, stage_filter: &str, search: &str) -> bool {
    if owner_filter != ALL_FILTER && lead.owner != owner_filter {
        return false;
    }
    if stage_filter != ALL_FILTER && lead.stage.as_ref() != stage_filter {
        return false;
    }
    let needle = search.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    haystack(lead).contains(&needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use steeple_core::{LivestreamStatus, Stage};

    fn lead() -> Lead {
        Lead {
            church_name: "Grace Church".into(),
            city: "Austin".into(),
            state: "TX".into(),
            owner: "Adrian".into(),
            stage: Stage::Contacted,
            notes: "Wants a PTZ camera QUOTE".into(),
            ..Lead::default()
        }
    }

    #[test]
    fn all_filters_pass_everything() {
        assert!(matches(&lead(), "ALL", "ALL", ""));
        assert!(matches(&lead(), "ALL", "ALL", "   "));
    }

    #[test]
    fn owner_filter_excludes_other_owners() {
        assert!(matches(&lead(), "Adrian", "ALL", ""));
        assert!(!matches(&lead(), "Carmen", "ALL", ""));
    }

    #[test]
    fn stage_filter_uses_display_name() {
        assert!(matches(&lead(), "ALL", "Contacted", ""));
        assert!(!matches(&lead(), "ALL", "Closed Won", ""));
    }

    #[test]
    fn search_matches_notes_in_any_case() {
        assert!(matches(&lead(), "ALL", "ALL", "ptz camera quote"));
        assert!(matches(&lead(), "ALL", "ALL", "  PTZ  "));
        assert!(!matches(&lead(), "ALL", "ALL", "drone"));
    }

    #[test]
    fn empty_fields_are_skipped_not_rendered() {
        // "null" must not appear in the haystack for missing fields.
        assert!(!matches(&lead(), "ALL", "ALL", "null"));
        assert!(!matches(&lead(), "ALL", "ALL", "undefined"));
    }

    #[test]
    fn search_spans_field_boundaries_with_single_space() {
        assert!(matches(&lead(), "ALL", "ALL", "austin tx"));
    }

    #[test]
    fn search_covers_livestream_fields() {
        let mut l = lead();
        l.livestream_url = "https://youtube.com/@grace".into();
        l.livestream_status = Some(LivestreamStatus::Yes);
        assert!(matches(&l, "ALL", "ALL", "youtube.com/@grace"));
    }

    #[test]
    fn filters_are_anded() {
        assert!(!matches(&lead(), "Adrian", "Lead", "grace"));
        assert!(matches(&lead(), "Adrian", "Contacted", "grace"));
    }

    #[test]
    fn lead_filter_defaults_to_all() {
        assert!(LeadFilter::default().matches(&lead()));
    }
}
