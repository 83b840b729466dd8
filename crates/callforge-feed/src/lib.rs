//! CallForge Feed - Realtime fanout to dashboard clients
//!
//! The feed hub maintains one broadcast scope per organization. Dashboard
//! connections join their org's scope and receive ranking updates and
//! milestone notifications as they happen.
//!
//! # Protocol
//!
//! Messages serialize as JSON with a `type` tag:
//!
//! ```json
//! {
//!     "type": "ranking_update",
//!     "entries": [{"rep_id": "rep-1", "score": 155, "rank": 1}]
//! }
//! ```
//!
//! ```json
//! {
//!     "type": "milestone",
//!     "rep_id": "rep-1",
//!     "rep_name": "Jordan",
//!     "milestone_type": "conversion",
//!     "value": 100,
//!     "message": "Jordan closed a deal!"
//! }
//! ```
//!
//! # Delivery
//!
//! At most once, best effort: no retry, no persistence of missed messages.
//! A client that reconnects re-pulls full state through the leaderboard
//! query surface rather than relying on replayed events. Receivers that have
//! disconnected are pruned on the next broadcast to their org.

use std::collections::HashMap;

use flume::Sender;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use callforge_ranking::RankEntry;
use callforge_types::{MilestoneEvent, MilestoneType, OrgId, RepId};

/// Messages pushed to connected dashboard clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedMessage {
    /// Updated top-k leaderboard for the client's organization
    RankingUpdate { entries: Vec<RankEntry> },
    /// A milestone fired for a rep in the client's organization
    Milestone {
        rep_id: RepId,
        rep_name: String,
        milestone_type: MilestoneType,
        value: i64,
        message: String,
    },
}

impl From<&MilestoneEvent> for FeedMessage {
    fn from(m: &MilestoneEvent) -> Self {
        Self::Milestone {
            rep_id: m.rep_id.clone(),
            rep_name: m.rep_name.clone(),
            milestone_type: m.milestone_type,
            value: m.value,
            message: m.message.clone(),
        }
    }
}

/// Receiving side of a feed subscription
pub type FeedReceiver = flume::Receiver<FeedMessage>;

/// Broadcast hub with one channel scope per organization
#[derive(Default)]
pub struct FeedHub {
    channels: RwLock<HashMap<OrgId, Vec<Sender<FeedMessage>>>>,
}

impl FeedHub {
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribe a connection to an organization's feed
    pub fn join(&self, org_id: &OrgId) -> FeedReceiver {
        let (tx, rx) = flume::unbounded();
        self.channels
            .write()
            .entry(org_id.clone())
            .or_default()
            .push(tx);
        debug!(org = %org_id, "feed subscriber joined");
        rx
    }

    /// Push an updated leaderboard to all of an org's subscribers
    pub fn broadcast_ranking(&self, org_id: &OrgId, entries: Vec<RankEntry>) {
        self.broadcast(org_id, FeedMessage::RankingUpdate { entries });
    }

    /// Push a milestone notification to all of an org's subscribers
    pub fn broadcast_milestone(&self, org_id: &OrgId, milestone: &MilestoneEvent) {
        self.broadcast(org_id, FeedMessage::from(milestone));
    }

    /// Number of connections currently joined to an org's feed
    pub fn subscriber_count(&self, org_id: &OrgId) -> usize {
        self.channels
            .read()
            .get(org_id)
            .map(|subs| subs.len())
            .unwrap_or(0)
    }

    fn broadcast(&self, org_id: &OrgId, message: FeedMessage) {
        let mut channels = self.channels.write();
        let Some(subs) = channels.get_mut(org_id) else {
            return;
        };

        let before = subs.len();
        subs.retain(|tx| tx.send(message.clone()).is_ok());
        let dropped = before - subs.len();
        if dropped > 0 {
            warn!(org = %org_id, dropped, "pruned disconnected feed subscribers");
        }
    }
}
