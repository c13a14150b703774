// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits for the Steeple CRM.
//!
//! The document store, the local preference store, and the user
//! confirmation prompt are external to the domain logic and reached only
//! through these traits.

pub mod confirm;
pub mod preferences;
pub mod store;

pub use confirm::Confirm;
pub use preferences::PreferenceStore;
pub use store::CrmStore;
