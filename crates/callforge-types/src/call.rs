//! Call outcome and AI quality assessment records
//!
//! These records arrive from external collaborators: the call-logging flow
//! supplies a `CompletedCall`, the AI-analysis flow supplies a
//! `QualityAssessment`. Both are inputs to scoring, validated upstream.

use serde::{Deserialize, Serialize};

use crate::identity::{CallId, OrgId, RepId};

/// Final disposition of a completed call, as recorded by the rep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Lead converted to a sale
    Converted,
    /// Lead declined
    NotInterested,
    /// Lead asked to be called back
    CallbackRequested,
    /// Call was never picked up
    NoAnswer,
    /// Number did not belong to the lead
    WrongNumber,
}

impl Disposition {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Converted => "Converted",
            Self::NotInterested => "Not Interested",
            Self::CallbackRequested => "Callback Requested",
            Self::NoAnswer => "No Answer",
            Self::WrongNumber => "Wrong Number",
        }
    }

    /// Whether this disposition counts as a conversion
    pub fn is_conversion(&self) -> bool {
        matches!(self, Self::Converted)
    }
}

/// Outcome of a single call, the input to call scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallOutcome {
    /// Whether the lead answered
    pub is_answered: bool,
    /// Talk time in seconds (negative values are clamped to zero by scoring)
    pub duration_seconds: i64,
    /// Disposition, if the rep recorded one
    pub disposition: Option<Disposition>,
}

impl CallOutcome {
    /// Whether this outcome carries a conversion
    pub fn is_conversion(&self) -> bool {
        self.disposition.map(|d| d.is_conversion()).unwrap_or(false)
    }
}

/// A completed call as delivered by the call-logging flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedCall {
    /// Organization the call belongs to
    pub org_id: OrgId,
    /// Rep who made the call
    pub rep_id: RepId,
    /// Rep display name, carried for milestone messages
    pub rep_name: String,
    /// Call identifier
    pub call_id: CallId,
    /// Scored outcome
    pub outcome: CallOutcome,
    /// Lead display name, if known
    pub lead_name: Option<String>,
}

/// Structured quality assessment from the AI-analysis flow
///
/// Drives the AI-quality XP bonus as a configurable weighted sum; the fields
/// here are the assessment vocabulary the analysis pipeline produces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityAssessment {
    /// Overall sentiment in [-1.0, 1.0]
    pub sentiment_score: f64,
    /// Number of action items captured during the call
    pub action_items_count: u32,
    /// Call ended on a positive outcome
    pub positive_outcome: bool,
    /// Rep handled an objection
    pub objection_handled: bool,
    /// Rep opened the call professionally
    pub professional_greeting: bool,
    /// Next steps were clearly agreed
    pub clear_next_steps: bool,
}
