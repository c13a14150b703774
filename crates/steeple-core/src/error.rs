// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Steeple CRM.

use thiserror::Error;

/// The primary error type used across store traits and CRM operations.
#[derive(Debug, Error)]
pub enum SteepleError {
    /// Configuration errors (invalid TOML, unknown owner, bad paths).
    #[error("configuration error: {0}")]
    Config(String),

    /// Store backend errors (database open, query failure, migration failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An imported CSV header did not match the column contract.
    #[error("CSV header must be exactly: {expected}")]
    CsvHeader { expected: String },

    /// User input rejected before any write.
    #[error("{0}")]
    Validation(String),

    /// A referenced document does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SteepleError {
    /// Wrap any error as a storage failure.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        SteepleError::Storage {
            source: Box::new(err),
        }
    }

    /// Shorthand for a missing lead.
    pub fn lead_not_found(id: &str) -> Self {
        SteepleError::NotFound {
            kind: "lead",
            id: id.to_string(),
        }
    }
}
