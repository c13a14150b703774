// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Steeple CRM.
//!
//! This crate provides the document types, the collaborator traits (store,
//! preferences, confirmation), the error type, and the date/money helpers
//! used throughout the Steeple workspace.

pub mod clock;
pub mod dates;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use clock::{Clock, SystemClock};
pub use error::SteepleError;
pub use types::{
    ALL_FILTER, Activity, ActivityType, AvailabilityType, CalendarEntry, HealthStatus, KpiMetric,
    KpiTarget, KpiTargetRecord, Lead, LeadPatch, LivestreamStatus, NewActivity,
    NewCalendarEntry, NewLead, OWNERS, Snapshot, Stage,
};

pub use traits::{Confirm, CrmStore, PreferenceStore};
