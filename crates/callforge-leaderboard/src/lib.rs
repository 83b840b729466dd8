//! CallForge Leaderboard - The scoring event orchestrator
//!
//! The leaderboard coordinates every XP mutation in the system. On each
//! scoring-relevant event it:
//!
//! 1. Computes the XP delta (pure scoring)
//! 2. Persists the delta to the durable event log — a failure here aborts
//!    the operation with no state change
//! 3. Snapshots the rep's rank, then applies the delta to the ranking store
//!    via atomic increment — a failure here leaves the ranking stale until
//!    reconciliation, never fails the operation
//! 4. Fetches the updated top-k
//! 5. Evaluates milestones (conversion, top-rank entry, call-count)
//! 6. Broadcasts the ranking update, plus any milestones, over the org feed
//!
//! The orchestrator exclusively owns XP mutations of both stores; no other
//! component may mutate rep XP directly. Scoring, stores, and fanout are
//! injected at construction so each can be substituted independently.
//!
//! # Example
//!
//! ```ignore
//! use callforge_leaderboard::{Leaderboard, LeaderboardConfig};
//!
//! let leaderboard = Leaderboard::new(
//!     event_log,
//!     ranking,
//!     feed,
//!     ScoringConfig::default(),
//!     LeaderboardConfig::default(),
//! );
//!
//! let applied = leaderboard.record_call(&completed_call).await?;
//! for milestone in &applied.milestones {
//!     println!("{}", milestone.message);
//! }
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use callforge_eventlog::{EventLogError, XpEventLog};
use callforge_feed::{FeedHub, FeedReceiver};
use callforge_ranking::{RankEntry, RankingError, RankingStore};
use callforge_scoring::{missed_followup_delta, score_call, score_quality, ScoringConfig};
use callforge_types::{
    CallId, CompletedCall, MilestoneEvent, MilestoneType, OrgId, QualityAssessment, RepId,
    XpEvent, XpEventId, XpReason,
};

/// Orchestrator errors
#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("Event log error: {0}")]
    EventLog(#[from] EventLogError),

    #[error("Ranking error: {0}")]
    Ranking(#[from] RankingError),
}

pub type Result<T> = std::result::Result<T, LeaderboardError>;

/// Leaderboard behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardConfig {
    /// Number of entries in broadcast ranking updates
    pub top_k: usize,
    /// Rank at or above which the top-rank-entry milestone fires
    pub top_rank_threshold: usize,
    /// Lifetime completed-call thresholds that fire the call-count milestone
    pub call_count_milestones: Vec<u64>,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            top_rank_threshold: 3,
            call_count_milestones: vec![50, 100, 200, 500, 1000],
        }
    }
}

/// Result of one applied scoring event
#[derive(Debug, Clone, Serialize)]
pub struct AppliedEvent {
    /// Durable event log entry ID
    pub event_id: XpEventId,
    /// Signed XP delta that was applied
    pub delta: i64,
    /// New cached total, if the ranking increment succeeded
    pub new_total: Option<i64>,
    /// Rank strictly before this event, if the rep was already ranked
    pub previous_rank: Option<usize>,
    /// Rank after this event, if the ranking increment succeeded
    pub new_rank: Option<usize>,
    /// Milestones fired by this event
    pub milestones: Vec<MilestoneEvent>,
}

/// Milestone evaluation inputs that vary per entry point
struct EventContext<'a> {
    rep_name: &'a str,
    lead_name: Option<&'a str>,
    /// The triggering event is a conversion
    conversion: bool,
    /// The triggering event counts toward the call-count milestone
    counts_as_call: bool,
}

/// The leaderboard orchestrator
///
/// Holds the injected collaborators and the two config blocks. Cloneable
/// handles (`Arc`) so it can be shared across request tasks.
pub struct Leaderboard {
    event_log: Arc<dyn XpEventLog>,
    ranking: Arc<dyn RankingStore>,
    feed: Arc<FeedHub>,
    scoring: ScoringConfig,
    config: LeaderboardConfig,
}

impl Leaderboard {
    pub fn new(
        event_log: Arc<dyn XpEventLog>,
        ranking: Arc<dyn RankingStore>,
        feed: Arc<FeedHub>,
        scoring: ScoringConfig,
        config: LeaderboardConfig,
    ) -> Self {
        Self {
            event_log,
            ranking,
            feed,
            scoring,
            config,
        }
    }

    // ------------------------------------------------------------------
    // Scoring entry points
    // ------------------------------------------------------------------

    /// Score and apply a completed call from the call-logging flow
    pub async fn record_call(&self, call: &CompletedCall) -> Result<AppliedEvent> {
        let delta = score_call(&call.outcome, &self.scoring);
        let ctx = EventContext {
            rep_name: &call.rep_name,
            lead_name: call.lead_name.as_deref(),
            conversion: call.outcome.is_conversion(),
            counts_as_call: true,
        };
        self.apply(
            &call.org_id,
            &call.rep_id,
            Some(call.call_id.clone()),
            delta,
            XpReason::CallCompleted,
            ctx,
        )
        .await
    }

    /// Apply an AI quality bonus from the analysis flow
    pub async fn record_quality_bonus(
        &self,
        org_id: &OrgId,
        rep_id: &RepId,
        rep_name: &str,
        call_id: Option<CallId>,
        assessment: &QualityAssessment,
    ) -> Result<AppliedEvent> {
        let delta = score_quality(assessment, &self.scoring.quality_weights);
        let ctx = EventContext {
            rep_name,
            lead_name: None,
            conversion: false,
            counts_as_call: false,
        };
        self.apply(org_id, rep_id, call_id, delta, XpReason::AiQualityBonus, ctx)
            .await
    }

    /// Apply the missed-followup penalty from the followup tracker
    pub async fn record_missed_followup(
        &self,
        org_id: &OrgId,
        rep_id: &RepId,
        rep_name: &str,
    ) -> Result<AppliedEvent> {
        let delta = missed_followup_delta(&self.scoring);
        let ctx = EventContext {
            rep_name,
            lead_name: None,
            conversion: false,
            counts_as_call: false,
        };
        self.apply(
            org_id,
            rep_id,
            None,
            delta,
            XpReason::MissedFollowupPenalty,
            ctx,
        )
        .await
    }

    /// Apply a manual XP correction by an administrator
    pub async fn apply_manual_adjustment(
        &self,
        org_id: &OrgId,
        rep_id: &RepId,
        rep_name: &str,
        delta: i64,
    ) -> Result<AppliedEvent> {
        let ctx = EventContext {
            rep_name,
            lead_name: None,
            conversion: false,
            counts_as_call: false,
        };
        self.apply(org_id, rep_id, None, delta, XpReason::ManualAdjustment, ctx)
            .await
    }

    // ------------------------------------------------------------------
    // Query surface
    // ------------------------------------------------------------------

    /// Current top rankings for an organization
    pub async fn top_rankings(&self, org_id: &OrgId, limit: usize) -> Result<Vec<RankEntry>> {
        Ok(self.ranking.top_k(org_id, limit).await?)
    }

    /// A rep's current cached score
    pub async fn rep_score(&self, org_id: &OrgId, rep_id: &RepId) -> Result<Option<i64>> {
        Ok(self.ranking.score(org_id, rep_id).await?)
    }

    /// A rep's current rank within their organization
    pub async fn rep_rank(&self, org_id: &OrgId, rep_id: &RepId) -> Result<Option<usize>> {
        Ok(self.ranking.rank(org_id, rep_id).await?)
    }

    /// Subscribe a connection to an organization's realtime feed
    pub fn join_feed(&self, org_id: &OrgId) -> FeedReceiver {
        self.feed.join(org_id)
    }

    // ------------------------------------------------------------------
    // Reconciliation
    // ------------------------------------------------------------------

    /// Replay the event log sum for a rep into the ranking store
    ///
    /// Heals the drift left behind when a ranking increment failed after a
    /// durable write succeeded. Returns the authoritative total.
    pub async fn reconcile_rep(&self, org_id: &OrgId, rep_id: &RepId) -> Result<i64> {
        let total = self.event_log.sum_for_rep(org_id, rep_id).await?;
        self.ranking.set_score(org_id, rep_id, total).await?;
        info!(org = %org_id, rep = %rep_id, total, "reconciled rep score from event log");
        Ok(total)
    }

    // ------------------------------------------------------------------
    // Pipeline
    // ------------------------------------------------------------------

    async fn apply(
        &self,
        org_id: &OrgId,
        rep_id: &RepId,
        call_id: Option<CallId>,
        delta: i64,
        reason: XpReason,
        ctx: EventContext<'_>,
    ) -> Result<AppliedEvent> {
        // Durable write first; a failure here aborts with no state change
        let event = XpEvent::new(org_id.clone(), rep_id.clone(), call_id, delta, reason);
        let event_id = self.event_log.append(event).await?;

        // Snapshot the rank before the increment; the top-rank-entry
        // milestone needs the pre-event position
        let previous_rank = match self.ranking.rank(org_id, rep_id).await {
            Ok(rank) => rank,
            Err(error) => {
                warn!(org = %org_id, rep = %rep_id, %error, "previous-rank snapshot failed");
                None
            }
        };

        // Apply to the ranking cache. The event log entry stands either way:
        // on failure the ranking is stale until `reconcile_rep` runs.
        let new_total = match self.ranking.increment_score(org_id, rep_id, delta).await {
            Ok(total) => Some(total),
            Err(error) => {
                warn!(
                    org = %org_id,
                    rep = %rep_id,
                    %error,
                    "ranking increment failed; leaderboard stale until reconciliation"
                );
                None
            }
        };

        let new_rank = if new_total.is_some() {
            match self.ranking.rank(org_id, rep_id).await {
                Ok(rank) => rank,
                Err(error) => {
                    warn!(org = %org_id, rep = %rep_id, %error, "post-event rank lookup failed");
                    None
                }
            }
        } else {
            None
        };

        let entries = match self.ranking.top_k(org_id, self.config.top_k).await {
            Ok(entries) => entries,
            Err(error) => {
                warn!(org = %org_id, %error, "top-k fetch failed; broadcasting empty ranking");
                Vec::new()
            }
        };

        let milestones = self
            .evaluate_milestones(org_id, rep_id, delta, previous_rank, new_rank, &ctx)
            .await;

        self.feed.broadcast_ranking(org_id, entries);
        for milestone in &milestones {
            info!(
                org = %org_id,
                rep = %rep_id,
                milestone = %milestone.milestone_type.display_name(),
                value = milestone.value,
                "milestone fired"
            );
            self.feed.broadcast_milestone(org_id, milestone);
        }

        debug!(
            org = %org_id,
            rep = %rep_id,
            delta,
            total = ?new_total,
            rank = ?new_rank,
            "scoring event applied"
        );

        Ok(AppliedEvent {
            event_id,
            delta,
            new_total,
            previous_rank,
            new_rank,
            milestones,
        })
    }

    /// Evaluate milestone rules in fixed order; each is independent and any
    /// subset may fire from a single event, at most once per rule
    async fn evaluate_milestones(
        &self,
        org_id: &OrgId,
        rep_id: &RepId,
        delta: i64,
        previous_rank: Option<usize>,
        new_rank: Option<usize>,
        ctx: &EventContext<'_>,
    ) -> Vec<MilestoneEvent> {
        let mut milestones = Vec::new();

        // Conversion: fires on every converted call, not just the first
        if ctx.conversion {
            let message = match ctx.lead_name {
                Some(lead) => format!("{} closed a deal with {}!", ctx.rep_name, lead),
                None => format!("{} closed a deal!", ctx.rep_name),
            };
            milestones.push(MilestoneEvent::new(
                MilestoneType::Conversion,
                rep_id.clone(),
                ctx.rep_name,
                delta,
                message,
            ));
        }

        // Top-rank entry: requires a known previous rank to avoid false
        // positives; a rep's first event never fires this
        if let (Some(prev), Some(new)) = (previous_rank, new_rank) {
            let threshold = self.config.top_rank_threshold;
            if new <= threshold && prev > threshold {
                milestones.push(MilestoneEvent::new(
                    MilestoneType::TopRankEntry,
                    rep_id.clone(),
                    ctx.rep_name,
                    new as i64,
                    format!("{} broke into the top {}!", ctx.rep_name, threshold),
                ));
            }
        }

        // Call count: crossing semantics (previous < threshold <= new), so a
        // threshold fires exactly once even if counts could skip
        if ctx.counts_as_call {
            match self.event_log.call_count_for_rep(org_id, rep_id).await {
                Ok(count) => {
                    let previous_count = count.saturating_sub(1);
                    for &threshold in &self.config.call_count_milestones {
                        if previous_count < threshold && threshold <= count {
                            milestones.push(MilestoneEvent::new(
                                MilestoneType::CallsCountMilestone,
                                rep_id.clone(),
                                ctx.rep_name,
                                threshold as i64,
                                format!(
                                    "{} hit {} completed calls!",
                                    ctx.rep_name, threshold
                                ),
                            ));
                        }
                    }
                }
                Err(error) => {
                    warn!(
                        org = %org_id,
                        rep = %rep_id,
                        %error,
                        "call count unavailable; skipping call-count milestone"
                    );
                }
            }
        }

        milestones
    }
}
