// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The lead CSV column contract.

use steeple_core::SteepleError;

/// Columns of the lead CSV, in order. Matching is exact and case-sensitive.
pub const CSV_HEADER: [&str; 16] = [
    "church_name",
    "website",
    "has_livestream",
    "livestream_url",
    "city",
    "state",
    "contact_name",
    "contact_role",
    "phone",
    "email",
    "owner",
    "stage",
    "next_followup_date",
    "notes",
    "tier_interest",
    "estimated_gear_budget",
];

/// The header as a single comma-joined line.
pub fn header_line() -> String {
    CSV_HEADER.join(",")
}

/// True when `header` is exactly [`CSV_HEADER`].
pub fn validate_header<S: AsRef<str>>(header: &[S]) -> bool {
    header.len() == CSV_HEADER.len()
        && header
            .iter()
            .zip(CSV_HEADER)
            .all(|(got, want)| got.as_ref() == want)
}

/// Like [`validate_header`], but returns the import-aborting error.
pub fn require_header<S: AsRef<str>>(header: &[S]) -> Result<(), SteepleError> {
    if validate_header(header) {
        Ok(())
    } else {
        Err(SteepleError::CsvHeader {
            expected: header_line(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_header_is_valid() {
        assert!(validate_header(&CSV_HEADER));
    }

    #[test]
    fn missing_column_is_rejected_with_expected_header() {
        let short: Vec<&str> = CSV_HEADER.iter().copied().filter(|c| *c != "notes").collect();
        assert!(!validate_header(&short));
        let err = require_header(&short).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("CSV header must be exactly: {}", header_line())
        );
    }

    #[test]
    fn reordered_extra_or_recased_columns_are_rejected() {
        let mut swapped = CSV_HEADER.to_vec();
        swapped.swap(0, 1);
        assert!(!validate_header(&swapped));

        let mut extra = CSV_HEADER.to_vec();
        extra.push("budget_notes");
        assert!(!validate_header(&extra));

        let mut upper = CSV_HEADER.to_vec();
        upper[0] = "Church_Name";
        assert!(!validate_header(&upper));
    }

    #[test]
    fn legacy_header_without_livestream_columns_is_rejected() {
        let legacy: Vec<&str> = CSV_HEADER
            .iter()
            .copied()
            .filter(|c| !c.contains("livestream"))
            .collect();
        assert_eq!(legacy.len(), 14);
        assert!(!validate_header(&legacy));
    }
}
