// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed queries, one module per collection.

pub mod activities;
pub mod calendar;
pub mod kpi;
pub mod leads;
