//! Milestone notification types
//!
//! A milestone is a celebratory notification derived from a state transition
//! (a conversion, a rep breaking into the top ranks, a call-count threshold).
//! Milestones are ephemeral: delivered over the realtime feed, never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::RepId;

/// Kind of milestone that fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneType {
    /// A lead converted to a sale
    Conversion,
    /// The rep entered the top ranks of their organization
    TopRankEntry,
    /// The rep crossed a lifetime completed-call threshold
    CallsCountMilestone,
}

impl MilestoneType {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Conversion => "Conversion",
            Self::TopRankEntry => "Top Rank Entry",
            Self::CallsCountMilestone => "Call Count Milestone",
        }
    }
}

/// A milestone notification, derived once per triggering XP event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilestoneEvent {
    pub milestone_type: MilestoneType,
    pub rep_id: RepId,
    pub rep_name: String,
    /// Type-dependent value: XP delta of the converting call, the new rank,
    /// or the call-count threshold crossed
    pub value: i64,
    /// Human-readable celebration message
    pub message: String,
    pub fired_at: DateTime<Utc>,
}

impl MilestoneEvent {
    pub fn new(
        milestone_type: MilestoneType,
        rep_id: RepId,
        rep_name: impl Into<String>,
        value: i64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            milestone_type,
            rep_id,
            rep_name: rep_name.into(),
            value,
            message: message.into(),
            fired_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_milestone_construction() {
        let milestone = MilestoneEvent::new(
            MilestoneType::TopRankEntry,
            RepId::new("rep-1"),
            "Jordan",
            3,
            "Jordan broke into the top 3!",
        );
        assert_eq!(milestone.milestone_type, MilestoneType::TopRankEntry);
        assert_eq!(milestone.value, 3);
    }

    #[test]
    fn test_milestone_type_serde() {
        let json = serde_json::to_string(&MilestoneType::CallsCountMilestone).unwrap();
        assert_eq!(json, "\"calls_count_milestone\"");
    }
}
