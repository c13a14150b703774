// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document types shared by the store, the rules, and the application layer.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// The fixed sales owner roster.
pub const OWNERS: [&str; 2] = ["Adrian", "Carmen"];

/// Filter value meaning "do not filter on this field".
pub const ALL_FILTER: &str = "ALL";

/// Pipeline position of a lead.
///
/// Declaration order is pipeline column order.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum Stage {
    #[default]
    Lead,
    Contacted,
    Responded,
    #[strum(to_string = "Discovery Scheduled")]
    #[serde(rename = "Discovery Scheduled")]
    DiscoveryScheduled,
    #[strum(to_string = "Proposal Sent")]
    #[serde(rename = "Proposal Sent")]
    ProposalSent,
    #[strum(to_string = "Verbal Yes")]
    #[serde(rename = "Verbal Yes")]
    VerbalYes,
    #[strum(to_string = "Closed Won")]
    #[serde(rename = "Closed Won")]
    ClosedWon,
    #[strum(to_string = "Closed Lost")]
    #[serde(rename = "Closed Lost")]
    ClosedLost,
}

impl Stage {
    /// All stages in pipeline order.
    pub const ALL: [Stage; 8] = [
        Stage::Lead,
        Stage::Contacted,
        Stage::Responded,
        Stage::DiscoveryScheduled,
        Stage::ProposalSent,
        Stage::VerbalYes,
        Stage::ClosedWon,
        Stage::ClosedLost,
    ];
}

/// Kind of logged interaction with a lead.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum ActivityType {
    #[strum(to_string = "Email Sent")]
    #[serde(rename = "Email Sent")]
    EmailSent,
    #[strum(to_string = "Call Attempted")]
    #[serde(rename = "Call Attempted")]
    CallAttempted,
    #[strum(to_string = "Call Connected")]
    #[serde(rename = "Call Connected")]
    CallConnected,
    #[strum(to_string = "Voicemail Left")]
    #[serde(rename = "Voicemail Left")]
    VoicemailLeft,
    #[strum(to_string = "Text/SMS")]
    #[serde(rename = "Text/SMS")]
    TextSms,
    #[strum(to_string = "Meeting Scheduled")]
    #[serde(rename = "Meeting Scheduled")]
    MeetingScheduled,
    #[strum(to_string = "Meeting Held")]
    #[serde(rename = "Meeting Held")]
    MeetingHeld,
    #[strum(to_string = "Proposal Sent")]
    #[serde(rename = "Proposal Sent")]
    ProposalSent,
    #[strum(to_string = "Deposit Link Sent")]
    #[serde(rename = "Deposit Link Sent")]
    DepositLinkSent,
    #[strum(to_string = "Deposit Paid")]
    #[serde(rename = "Deposit Paid")]
    DepositPaid,
    #[strum(to_string = "Closed Lost")]
    #[serde(rename = "Closed Lost")]
    ClosedLost,
}

impl ActivityType {
    /// All activity types in menu order.
    pub const ALL: [ActivityType; 11] = [
        ActivityType::EmailSent,
        ActivityType::CallAttempted,
        ActivityType::CallConnected,
        ActivityType::VoicemailLeft,
        ActivityType::TextSms,
        ActivityType::MeetingScheduled,
        ActivityType::MeetingHeld,
        ActivityType::ProposalSent,
        ActivityType::DepositLinkSent,
        ActivityType::DepositPaid,
        ActivityType::ClosedLost,
    ];
}

/// Whether a church streams its services.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum LivestreamStatus {
    Yes,
    No,
    Unknown,
}

/// Scheduling state recorded on the shared calendar.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum AvailabilityType {
    #[default]
    Available,
    Booked,
    Unavailable,
}

/// Weekly KPI counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum KpiMetric {
    Calls,
    Emails,
    Messages,
}

impl KpiMetric {
    pub const ALL: [KpiMetric; 3] = [KpiMetric::Calls, KpiMetric::Emails, KpiMetric::Messages];
}

/// A sales record in the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub church_name: String,
    pub website: String,
    pub livestream_status: Option<LivestreamStatus>,
    pub livestream_url: String,
    pub city: String,
    pub state: String,
    pub contact_name: String,
    pub contact_role: String,
    pub phone: String,
    pub email: String,
    pub owner: String,
    pub stage: Stage,
    pub tier_interest: String,
    pub estimated_gear_budget: String,
    pub notes: String,
    pub next_follow_up_at: Option<NaiveDateTime>,
    pub last_activity_type: Option<ActivityType>,
    pub last_activity_at: Option<NaiveDateTime>,
    pub deposit_paid: bool,
    pub deposit_amount: Option<f64>,
    pub deposit_paid_at: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    pub closed_at: Option<NaiveDateTime>,
}

/// Payload for creating a lead. The store assigns `id`, `createdAt`, and `updatedAt`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewLead {
    pub church_name: String,
    pub website: String,
    pub livestream_status: Option<LivestreamStatus>,
    pub livestream_url: String,
    pub city: String,
    pub state: String,
    pub contact_name: String,
    pub contact_role: String,
    pub phone: String,
    pub email: String,
    pub owner: String,
    pub stage: Stage,
    pub tier_interest: String,
    pub estimated_gear_budget: String,
    pub notes: String,
    pub next_follow_up_at: Option<NaiveDateTime>,
    pub deposit_paid: bool,
    pub deposit_amount: Option<f64>,
    pub deposit_paid_at: Option<NaiveDateTime>,
    pub closed_at: Option<NaiveDateTime>,
}

/// A merge update against an existing lead.
///
/// `None` leaves a field untouched. For nullable fields the inner `Option`
/// is the value written, so `Some(None)` clears the field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadPatch {
    pub owner: Option<String>,
    pub stage: Option<Stage>,
    pub tier_interest: Option<String>,
    pub estimated_gear_budget: Option<String>,
    pub notes: Option<String>,
    pub next_follow_up_at: Option<Option<NaiveDateTime>>,
    pub last_activity_type: Option<ActivityType>,
    pub last_activity_at: Option<NaiveDateTime>,
    pub deposit_paid: Option<bool>,
    pub deposit_amount: Option<Option<f64>>,
    pub deposit_paid_at: Option<Option<NaiveDateTime>>,
    pub closed_at: Option<NaiveDateTime>,
}

impl LeadPatch {
    /// Returns true if the patch would not change any field.
    pub fn is_empty(&self) -> bool {
        *self == LeadPatch::default()
    }

    /// Merge this patch into an in-memory lead.
    pub fn apply_to(&self, lead: &mut Lead) {
        if let Some(owner) = &self.owner {
            lead.owner = owner.clone();
        }
        if let Some(stage) = self.stage {
            lead.stage = stage;
        }
        if let Some(tier) = &self.tier_interest {
            lead.tier_interest = tier.clone();
        }
        if let Some(budget) = &self.estimated_gear_budget {
            lead.estimated_gear_budget = budget.clone();
        }
        if let Some(notes) = &self.notes {
            lead.notes = notes.clone();
        }
        if let Some(next) = self.next_follow_up_at {
            lead.next_follow_up_at = next;
        }
        if let Some(kind) = self.last_activity_type {
            lead.last_activity_type = Some(kind);
        }
        if let Some(at) = self.last_activity_at {
            lead.last_activity_at = Some(at);
        }
        if let Some(paid) = self.deposit_paid {
            lead.deposit_paid = paid;
        }
        if let Some(amount) = self.deposit_amount {
            lead.deposit_amount = amount;
        }
        if let Some(paid_at) = self.deposit_paid_at {
            lead.deposit_paid_at = paid_at;
        }
        if let Some(closed_at) = self.closed_at {
            lead.closed_at = Some(closed_at);
        }
    }
}

/// An immutable logged interaction, owned by one lead.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub lead_id: String,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub notes: String,
    pub happened_at: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
    /// Owner copied from the lead at creation. Older records do not carry it.
    pub owner: Option<String>,
}

/// Payload for logging an activity.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub activity_type: ActivityType,
    pub notes: String,
    pub happened_at: NaiveDateTime,
    pub owner: Option<String>,
}

/// A scheduling note on the shared calendar, tied to a Closed Won lead.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEntry {
    pub id: String,
    pub lead_id: String,
    pub church_name: String,
    pub owner: String,
    pub availability_type: AvailabilityType,
    pub notes: String,
    pub starts_on: Option<NaiveDateTime>,
    pub created_by: String,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

/// Payload for creating a calendar entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCalendarEntry {
    pub lead_id: String,
    pub church_name: String,
    pub owner: String,
    pub availability_type: AvailabilityType,
    pub notes: String,
    pub starts_on: NaiveDateTime,
    pub created_by: String,
}

/// Weekly activity targets for one owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KpiTarget {
    pub calls: u32,
    pub emails: u32,
    pub messages: u32,
}

impl KpiTarget {
    /// Built-in targets used when no valid document exists.
    pub const DEFAULT: KpiTarget = KpiTarget {
        calls: 150,
        emails: 90,
        messages: 50,
    };

    pub fn get(&self, metric: KpiMetric) -> u32 {
        match metric {
            KpiMetric::Calls => self.calls,
            KpiMetric::Emails => self.emails,
            KpiMetric::Messages => self.messages,
        }
    }
}

impl Default for KpiTarget {
    fn default() -> Self {
        KpiTarget::DEFAULT
    }
}

/// A KPI target document as stored. Values are unchecked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KpiTargetRecord {
    pub owner: String,
    pub calls: Option<i64>,
    pub emails: Option<i64>,
    pub messages: Option<i64>,
}

/// A full result-set snapshot pushed by a store subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    /// All leads, most recently updated first.
    Leads(Vec<Lead>),
    /// All calendar entries, earliest first.
    Calendar(Vec<CalendarEntry>),
    /// Every activity across all leads.
    Activities(Vec<Activity>),
    /// All KPI target documents.
    KpiTargets(Vec<KpiTargetRecord>),
}

/// Health status reported by store health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Store is fully operational.
    Healthy,
    /// Store is operational but experiencing issues.
    Degraded(String),
    /// Store is not operational.
    Unhealthy(String),
}
