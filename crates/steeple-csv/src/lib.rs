// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead CSV import and export.
//!
//! Import is a line-oriented quote-aware reader followed by an exact header
//! check and row-to-lead mapping with dedupe. Export writes the same column
//! contract through the `csv` crate.

pub mod import;
pub mod parse;
pub mod schema;
pub mod write;

pub use import::{ImportPlan, plan_import, plan_parsed, row_to_new_lead};
pub use parse::{ParsedCsv, parse_csv, split_line};
pub use schema::{CSV_HEADER, header_line, require_header, validate_header};
pub use write::{export_filename, lead_record, leads_to_csv};
