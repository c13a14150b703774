// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw form input and its conversion to store payloads.

use std::str::FromStr;

use chrono::NaiveDateTime;
use steeple_core::dates::{parse_iso_date_input, parse_us_date};
use steeple_core::{ActivityType, AvailabilityType, LivestreamStatus, NewLead, Stage, SteepleError};

/// The new-lead form. Every field is free text as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewLeadForm {
    pub church_name: String,
    pub website: String,
    pub livestream_status: String,
    pub livestream_url: String,
    pub city: String,
    pub state: String,
    pub contact_name: String,
    pub contact_role: String,
    pub phone: String,
    pub email: String,
    pub owner: String,
    pub stage: String,
    pub tier_interest: String,
    pub estimated_gear_budget: String,
    /// `MM/DD/YYYY`; blank or unparseable leaves the lead without a follow-up.
    pub next_follow_up: String,
    pub notes: String,
}

impl NewLeadForm {
    /// Validate and build the payload. A blank owner becomes `default_owner`.
    pub fn into_new_lead(self, default_owner: &str) -> Result<NewLead, SteepleError> {
        let church_name = self.church_name.trim().to_string();
        let city = self.city.trim().to_string();
        let state = self.state.trim().to_string();
        if church_name.is_empty() || city.is_empty() || state.is_empty() {
            return Err(SteepleError::Validation(
                "Church name, city, and state are required.".into(),
            ));
        }

        let stage = match self.stage.trim() {
            "" => Stage::Lead,
            raw => Stage::from_str(raw)
                .map_err(|_| SteepleError::Validation(format!("Unknown stage `{raw}`.")))?,
        };
        let livestream_status = match self.livestream_status.trim() {
            "" => None,
            raw => Some(LivestreamStatus::from_str(raw).map_err(|_| {
                SteepleError::Validation(format!("Livestream must be yes, no, or unknown (got `{raw}`)."))
            })?),
        };
        let owner = match self.owner.trim() {
            "" => default_owner.to_string(),
            o => o.to_string(),
        };

        Ok(NewLead {
            church_name,
            website: self.website.trim().to_string(),
            livestream_status,
            livestream_url: self.livestream_url.trim().to_string(),
            city,
            state,
            contact_name: self.contact_name.trim().to_string(),
            contact_role: self.contact_role.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: self.email.trim().to_string(),
            owner,
            stage,
            tier_interest: self.tier_interest.trim().to_string(),
            estimated_gear_budget: self.estimated_gear_budget.trim().to_string(),
            notes: self.notes.trim().to_string(),
            next_follow_up_at: parse_us_date(&self.next_follow_up),
            ..NewLead::default()
        })
    }
}

/// The log-activity form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityForm {
    pub activity_type: ActivityType,
    /// `YYYY-MM-DD`; blank means now.
    pub date: String,
    pub notes: String,
}

impl ActivityForm {
    /// When the activity happened: the date at local noon, or `now` if blank.
    pub fn happened_at(&self, now: NaiveDateTime) -> Result<NaiveDateTime, SteepleError> {
        if self.date.trim().is_empty() {
            return Ok(now);
        }
        parse_iso_date_input(&self.date)
            .ok_or_else(|| SteepleError::Validation("Please choose a valid date.".into()))
    }
}

/// The add-availability form on the calendar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarForm {
    pub lead_id: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// Blank means Available.
    pub availability_type: String,
    pub notes: String,
}

impl CalendarForm {
    pub fn availability(&self) -> Result<AvailabilityType, SteepleError> {
        match self.availability_type.trim() {
            "" => Ok(AvailabilityType::Available),
            raw => AvailabilityType::from_str(raw).map_err(|_| {
                SteepleError::Validation(format!(
                    "Availability must be Available, Booked, or Unavailable (got `{raw}`)."
                ))
            }),
        }
    }
}

/// The per-owner KPI target form. Values are validated on save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KpiTargetForm {
    pub owner: String,
    pub calls: String,
    pub emails: String,
    pub messages: String,
}
