// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test doubles for the Steeple collaborator traits.
//!
//! - [`MemoryStore`]: in-memory `CrmStore` with snapshot broadcast and
//!   write-failure injection
//! - [`MemoryPreferences`]: `PreferenceStore` over a map
//! - [`FixedClock`]: settable `Clock`
//! - [`ScriptedConfirm`]: `Confirm` that replays canned answers

pub mod clock;
pub mod confirm;
pub mod fixtures;
pub mod memory_store;
pub mod preferences;

pub use clock::FixedClock;
pub use confirm::ScriptedConfirm;
pub use memory_store::MemoryStore;
pub use preferences::MemoryPreferences;
