// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stage transitions and follow-up rules.
//!
//! Stages are not a strict state machine: a user may move a lead to any
//! stage. The one guarded transition is Closed Won, which is reserved for
//! leads whose deposit has been paid:
//!
//! - a paid deposit forces Closed Won and stamps `closedAt`;
//! - Closed Won requested without a paid deposit is silently downgraded to
//!   Verbal Yes.
//!
//! Logging an activity may additionally move the follow-up date and, for
//! Deposit Paid and Closed Lost, close the lead.

use chrono::NaiveDateTime;
use steeple_core::dates::add_days;
use steeple_core::{ActivityType, Lead, LeadPatch, NewLead, Stage};
use tracing::debug;

/// Days until the next follow-up after logging `kind`. Zero means "leave it".
pub fn reminder_days(kind: ActivityType) -> u32 {
    match kind {
        ActivityType::EmailSent => 7,
        ActivityType::CallAttempted => 5,
        ActivityType::CallConnected => 5,
        ActivityType::VoicemailLeft => 5,
        ActivityType::TextSms => 5,
        ActivityType::MeetingScheduled => 0,
        ActivityType::MeetingHeld => 0,
        ActivityType::ProposalSent => 5,
        ActivityType::DepositLinkSent => 3,
        ActivityType::DepositPaid => 0,
        ActivityType::ClosedLost => 0,
    }
}

/// Outcome of the deposit gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatedStage {
    /// Stage that will actually be stored.
    pub stage: Stage,
    /// Whether `closedAt` must be stamped.
    pub stamp_closed: bool,
}

/// Apply the deposit gate to a requested stage.
pub fn gate_stage(requested: Stage, deposit_paid: bool) -> GatedStage {
    if deposit_paid {
        return GatedStage {
            stage: Stage::ClosedWon,
            stamp_closed: true,
        };
    }
    if requested == Stage::ClosedWon {
        debug!("Closed Won requested without a paid deposit, storing Verbal Yes");
        return GatedStage {
            stage: Stage::VerbalYes,
            stamp_closed: false,
        };
    }
    GatedStage {
        stage: requested,
        stamp_closed: false,
    }
}

/// The editable fields of a lead as submitted from the detail form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadEdit {
    pub owner: String,
    pub stage: Stage,
    pub tier_interest: String,
    pub estimated_gear_budget: String,
    pub notes: String,
    pub next_follow_up_at: Option<NaiveDateTime>,
    pub deposit_paid: bool,
    pub deposit_amount: Option<f64>,
    pub deposit_paid_at: Option<NaiveDateTime>,
}

impl LeadEdit {
    /// Start an edit from the lead's current values.
    pub fn from_lead(lead: &Lead) -> Self {
        Self {
            owner: lead.owner.clone(),
            stage: lead.stage,
            tier_interest: lead.tier_interest.clone(),
            estimated_gear_budget: lead.estimated_gear_budget.clone(),
            notes: lead.notes.clone(),
            next_follow_up_at: lead.next_follow_up_at,
            deposit_paid: lead.deposit_paid,
            deposit_amount: lead.deposit_amount,
            deposit_paid_at: lead.deposit_paid_at,
        }
    }

    /// Build the merge patch, with the deposit gate applied.
    pub fn into_patch(self, now: NaiveDateTime) -> LeadPatch {
        let gated = gate_stage(self.stage, self.deposit_paid);
        LeadPatch {
            owner: Some(self.owner),
            stage: Some(gated.stage),
            tier_interest: Some(self.tier_interest),
            estimated_gear_budget: Some(self.estimated_gear_budget),
            notes: Some(self.notes),
            next_follow_up_at: Some(self.next_follow_up_at),
            deposit_paid: Some(self.deposit_paid),
            deposit_amount: Some(self.deposit_amount),
            deposit_paid_at: Some(self.deposit_paid_at),
            closed_at: gated.stamp_closed.then_some(now),
            ..LeadPatch::default()
        }
    }
}

/// Patch for moving `lead` directly to `requested`, gated on its deposit.
pub fn stage_change_patch(lead: &Lead, requested: Stage, now: NaiveDateTime) -> LeadPatch {
    let gated = gate_stage(requested, lead.deposit_paid);
    LeadPatch {
        stage: Some(gated.stage),
        closed_at: gated.stamp_closed.then_some(now),
        ..LeadPatch::default()
    }
}

/// Gate a lead that is about to be created.
pub fn gate_new_lead(lead: &mut NewLead, now: NaiveDateTime) {
    let gated = gate_stage(lead.stage, lead.deposit_paid);
    lead.stage = gated.stage;
    if gated.stamp_closed {
        lead.closed_at = Some(now);
    }
}

/// Patch applied to the parent lead after logging an activity.
///
/// Always records the last activity. A positive reminder overwrites the
/// follow-up date with `now + days`. Deposit Paid and Closed Lost also
/// close the lead.
pub fn activity_patch(
    kind: ActivityType,
    happened_at: NaiveDateTime,
    now: NaiveDateTime,
) -> LeadPatch {
    let mut patch = LeadPatch {
        last_activity_type: Some(kind),
        last_activity_at: Some(happened_at),
        ..LeadPatch::default()
    };

    let days = reminder_days(kind);
    if days > 0 {
        patch.next_follow_up_at = Some(Some(add_days(now, i64::from(days))));
    }

    match kind {
        ActivityType::DepositPaid => {
            patch.deposit_paid = Some(true);
            patch.stage = Some(Stage::ClosedWon);
            patch.closed_at = Some(now);
            patch.deposit_paid_at = Some(Some(happened_at));
        }
        ActivityType::ClosedLost => {
            patch.stage = Some(Stage::ClosedLost);
            patch.closed_at = Some(now);
        }
        _ => {}
    }

    patch
}
