//! XP ledger event types
//!
//! An `XpEvent` is one entry in the durable, append-only XP ledger. Entries
//! are never mutated or deleted; the sum of a rep's deltas is their
//! authoritative lifetime XP.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{CallId, OrgId, RepId, XpEventId};

/// Reason an XP event was granted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XpReason {
    /// A call was completed and scored (base + talk time + conversion)
    CallCompleted,
    /// Talk-time bonus granted outside call scoring
    TalkTimeBonus,
    /// Conversion bonus granted outside call scoring
    ConversionBonus,
    /// AI quality assessment bonus
    AiQualityBonus,
    /// Penalty for a missed followup
    MissedFollowupPenalty,
    /// Manual correction by an administrator
    ManualAdjustment,
}

impl XpReason {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::CallCompleted => "Call Completed",
            Self::TalkTimeBonus => "Talk Time Bonus",
            Self::ConversionBonus => "Conversion Bonus",
            Self::AiQualityBonus => "AI Quality Bonus",
            Self::MissedFollowupPenalty => "Missed Followup Penalty",
            Self::ManualAdjustment => "Manual Adjustment",
        }
    }
}

/// A single entry in the durable XP ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpEvent {
    pub id: XpEventId,
    pub rep_id: RepId,
    pub org_id: OrgId,
    /// Originating call, when the event was produced by call scoring
    pub call_id: Option<CallId>,
    /// Signed XP delta (penalties are negative)
    pub delta: i64,
    pub reason: XpReason,
    pub created_at: DateTime<Utc>,
}

impl XpEvent {
    /// Create a new event stamped with a fresh ID and the current time
    pub fn new(
        org_id: OrgId,
        rep_id: RepId,
        call_id: Option<CallId>,
        delta: i64,
        reason: XpReason,
    ) -> Self {
        Self {
            id: XpEventId::new(),
            rep_id,
            org_id,
            call_id,
            delta,
            reason,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_construction() {
        let event = XpEvent::new(
            OrgId::new("org-1"),
            RepId::new("rep-1"),
            None,
            25,
            XpReason::CallCompleted,
        );
        assert_eq!(event.delta, 25);
        assert_eq!(event.reason, XpReason::CallCompleted);
        assert!(event.call_id.is_none());
    }

    #[test]
    fn test_reason_serde() {
        let json = serde_json::to_string(&XpReason::MissedFollowupPenalty).unwrap();
        assert_eq!(json, "\"missed_followup_penalty\"");
    }
}
