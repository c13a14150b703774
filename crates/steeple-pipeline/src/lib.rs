// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure pipeline rules for the Steeple CRM.
//!
//! Nothing here touches the store: every function maps documents and
//! "now" to a decision or a patch.

pub mod dedupe;
pub mod filter;
pub mod kpi;
pub mod rules;

pub use dedupe::{existing_keys, key_church};
pub use filter::{LeadFilter, matches};
pub use kpi::{
    KpiReport, KpiTotals, KpiWindow, aggregate, kpi_metric, parse_target_input, progress_percent,
    resolve_targets,
};
pub use rules::{
    GatedStage, LeadEdit, activity_patch, gate_new_lead, gate_stage, reminder_days,
    stage_change_patch,
};
