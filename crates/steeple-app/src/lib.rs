// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Application layer for the Steeple CRM.
//!
//! [`Controller`] owns the [`AppState`], applies store snapshots, and runs
//! every user operation. The `views` module turns state into per-screen
//! projections; rendering them is left to the front end.

pub mod controller;
pub mod forms;
pub mod prefs;
pub mod state;
pub mod views;

pub use controller::{Collaborators, Controller, CsvExport, DetailRequest, ImportSummary};
pub use forms::{ActivityForm, CalendarForm, KpiTargetForm, NewLeadForm};
pub use state::{AppState, DetailLoaded, LeadDetail, Notice, NoticeLevel, View};
