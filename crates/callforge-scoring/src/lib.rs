//! CallForge Scoring - Pure XP computation
//!
//! This crate maps call outcomes and AI quality assessments to signed XP
//! deltas. Everything here is a pure function of its inputs and the scoring
//! configuration: no I/O, no clocks, no shared state. Persisting and ranking
//! the resulting deltas is the orchestrator's job.
//!
//! # Formula
//!
//! ```text
//! delta = base_call_xp
//! if is_answered && duration_seconds > 0:
//!     delta += ceil(duration_seconds / 60) * per_minute_xp
//! if disposition == Converted:
//!     delta += conversion_bonus_xp
//! ```
//!
//! Invalid inputs (negative durations) are clamped to zero rather than
//! rejected: this is a scoring heuristic, not a validation boundary.
//!
//! # Example
//!
//! ```ignore
//! use callforge_scoring::{score_call, ScoringConfig};
//!
//! let config = ScoringConfig::default();
//! let delta = score_call(&outcome, &config);
//! ```

use serde::{Deserialize, Serialize};

use callforge_types::{CallOutcome, QualityAssessment};

/// Tunable scoring constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// XP granted for logging any call
    pub base_call_xp: i64,
    /// XP granted per started minute of talk time on answered calls
    pub per_minute_xp: i64,
    /// XP granted when the call disposition is a conversion
    pub conversion_bonus_xp: i64,
    /// XP deducted when a followup is missed (stored positive, applied negative)
    pub missed_followup_penalty: i64,
    /// Weights for the AI quality bonus
    pub quality_weights: QualityWeights,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_call_xp: 10,
            per_minute_xp: 5,
            conversion_bonus_xp: 100,
            missed_followup_penalty: 50,
            quality_weights: QualityWeights::default(),
        }
    }
}

/// Weights for the AI quality bonus
///
/// The bonus is a weighted sum over the assessment fields; adding a term here
/// extends the bonus without touching the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityWeights {
    /// Multiplier for the sentiment score (clamped to [-1, 1])
    pub sentiment: f64,
    /// XP per captured action item
    pub per_action_item: f64,
    /// XP when the call ended on a positive outcome
    pub positive_outcome: f64,
    /// XP when an objection was handled
    pub objection_handled: f64,
    /// XP for a professional greeting
    pub professional_greeting: f64,
    /// XP when next steps were clearly agreed
    pub clear_next_steps: f64,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            sentiment: 20.0,
            per_action_item: 5.0,
            positive_outcome: 15.0,
            objection_handled: 10.0,
            professional_greeting: 5.0,
            clear_next_steps: 10.0,
        }
    }
}

/// Compute the XP delta for a completed call
pub fn score_call(outcome: &CallOutcome, config: &ScoringConfig) -> i64 {
    let mut delta = config.base_call_xp;

    // Negative durations are clamped, not rejected
    let duration = outcome.duration_seconds.max(0);

    if outcome.is_answered && duration > 0 {
        let minutes = (duration + 59) / 60; // ceil(duration / 60)
        delta += minutes * config.per_minute_xp;
    }

    if outcome.is_conversion() {
        delta += config.conversion_bonus_xp;
    }

    delta
}

/// Compute the XP bonus for an AI quality assessment
///
/// Weighted sum over the assessment fields, rounded to the nearest integer
/// and clamped at zero (a poor assessment earns nothing, never a penalty).
pub fn score_quality(assessment: &QualityAssessment, weights: &QualityWeights) -> i64 {
    let mut bonus = assessment.sentiment_score.clamp(-1.0, 1.0) * weights.sentiment;
    bonus += assessment.action_items_count as f64 * weights.per_action_item;

    if assessment.positive_outcome {
        bonus += weights.positive_outcome;
    }
    if assessment.objection_handled {
        bonus += weights.objection_handled;
    }
    if assessment.professional_greeting {
        bonus += weights.professional_greeting;
    }
    if assessment.clear_next_steps {
        bonus += weights.clear_next_steps;
    }

    (bonus.round() as i64).max(0)
}

/// Compute the (negative) delta for a missed followup
pub fn missed_followup_delta(config: &ScoringConfig) -> i64 {
    -config.missed_followup_penalty
}
