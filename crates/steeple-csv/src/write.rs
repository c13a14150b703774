// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead export.

use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use steeple_core::dates::format_us_date;
use steeple_core::{Lead, SteepleError};

use crate::schema::CSV_HEADER;

/// One lead as a CSV record in [`CSV_HEADER`] order.
pub fn lead_record(lead: &Lead) -> [String; 16] {
    [
        lead.church_name.clone(),
        lead.website.clone(),
        lead.livestream_status
            .map(|s| s.to_string())
            .unwrap_or_default(),
        lead.livestream_url.clone(),
        lead.city.clone(),
        lead.state.clone(),
        lead.contact_name.clone(),
        lead.contact_role.clone(),
        lead.phone.clone(),
        lead.email.clone(),
        lead.owner.clone(),
        lead.stage.to_string(),
        lead.next_follow_up_at
            .as_ref()
            .map(format_us_date)
            .unwrap_or_default(),
        lead.notes.clone(),
        lead.tier_interest.clone(),
        lead.estimated_gear_budget.clone(),
    ]
}

/// Serialize leads with the header line first.
///
/// Values containing a comma, a double quote, or a line break are quoted
/// with inner quotes doubled. Lines are joined with `\n` and there is no
/// trailing newline.
pub fn leads_to_csv<'a>(leads: impl IntoIterator<Item = &'a Lead>) -> Result<String, SteepleError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(CSV_HEADER)
        .map_err(|e| SteepleError::Internal(format!("csv write failed: {e}")))?;
    for lead in leads {
        writer
            .write_record(lead_record(lead))
            .map_err(|e| SteepleError::Internal(format!("csv write failed: {e}")))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| SteepleError::Internal(format!("csv flush failed: {e}")))?;
    let mut text = String::from_utf8(bytes)
        .map_err(|e| SteepleError::Internal(format!("csv output is not UTF-8: {e}")))?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

/// File name for an export taken on `date`.
pub fn export_filename(date: NaiveDate) -> String {
    format!("church-sales-crm-export-{}.csv", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use steeple_core::dates::parse_us_date;
    use steeple_core::{LivestreamStatus, Stage};

    use crate::schema::header_line;

    #[test]
    fn empty_export_is_header_only() {
        let csv = leads_to_csv(&Vec::<Lead>::new()).unwrap();
        assert_eq!(csv, header_line());
    }

    #[test]
    fn record_follows_header_order() {
        let lead = Lead {
            church_name: "Grace".into(),
            website: "grace.org".into(),
            livestream_status: Some(LivestreamStatus::No),
            city: "Austin".into(),
            state: "TX".into(),
            owner: "Carmen".into(),
            stage: Stage::ProposalSent,
            next_follow_up_at: parse_us_date("3/9/2026"),
            estimated_gear_budget: "$4,000".into(),
            ..Lead::default()
        };
        let csv = leads_to_csv([&lead]).unwrap();
        let second = csv.lines().nth(1).unwrap();
        assert_eq!(
            second,
            "Grace,grace.org,no,,Austin,TX,,,,,Carmen,Proposal Sent,03/09/2026,,,\"$4,000\""
        );
    }

    #[test]
    fn quotes_are_doubled_and_newlines_quoted() {
        let lead = Lead {
            church_name: "St. \"Mark\"".into(),
            notes: "line one\nline two".into(),
            ..Lead::default()
        };
        let csv = leads_to_csv([&lead]).unwrap();
        assert!(csv.contains("\"St. \"\"Mark\"\"\""));
        assert!(csv.contains("\"line one\nline two\""));
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn export_filename_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(
            export_filename(date),
            "church-sales-crm-export-2026-10-16.csv"
        );
    }
}
