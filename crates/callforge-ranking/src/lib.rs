//! CallForge Ranking - Fast-read per-organization score store
//!
//! The ranking store holds current XP totals per rep and answers top-k and
//! rank queries. It is a rebuildable cache over the durable event log, never
//! a second source of truth.
//!
//! # Contract
//!
//! - `increment_score` is atomic: concurrent increments from simultaneous
//!   call submissions never lose updates. Callers must not read-modify-write.
//! - Ranks are computed on read: 1-based, contiguous, score descending.
//! - Tie-break: equal scores order by first write into the org's scope
//!   (stable insertion order, first-write wins).
//! - Every operation is scoped by `OrgId`; data never crosses organizations.
//!
//! # Example
//!
//! ```ignore
//! use callforge_ranking::{InMemoryRankingStore, RankingStore};
//!
//! let store = InMemoryRankingStore::new();
//! let total = store.increment_score(&org_id, &rep_id, 25).await?;
//! let top = store.top_k(&org_id, 10).await?;
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use callforge_types::{OrgId, RepId};

/// Ranking store errors
#[derive(Debug, Error)]
pub enum RankingError {
    #[error("Storage error: {message}")]
    Storage { message: String },
}

pub type Result<T> = std::result::Result<T, RankingError>;

/// One row of a leaderboard, rank computed at read time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankEntry {
    pub rep_id: RepId,
    pub score: i64,
    /// 1-based position within the organization
    pub rank: usize,
}

/// Current XP totals per rep, scoped per organization
///
/// The one piece of genuinely shared mutable state in the system; all
/// mutation flows through `increment_score` (or `set_score` during
/// reconciliation).
#[async_trait]
pub trait RankingStore: Send + Sync {
    /// Atomically add `delta` to a rep's score, creating the entry with
    /// `delta` as initial value if absent. Returns the new total.
    async fn increment_score(&self, org_id: &OrgId, rep_id: &RepId, delta: i64) -> Result<i64>;

    /// Top k reps by score descending with contiguous 1-based ranks
    async fn top_k(&self, org_id: &OrgId, k: usize) -> Result<Vec<RankEntry>>;

    /// A rep's current score, if they have one
    async fn score(&self, org_id: &OrgId, rep_id: &RepId) -> Result<Option<i64>>;

    /// A rep's rank among all ranked reps in the org (not just top-k)
    async fn rank(&self, org_id: &OrgId, rep_id: &RepId) -> Result<Option<usize>>;

    /// Overwrite a rep's cached total with an authoritative value.
    /// Reconciliation only; never part of the scoring hot path.
    async fn set_score(&self, org_id: &OrgId, rep_id: &RepId, score: i64) -> Result<()>;
}

#[derive(Debug, Clone, Copy)]
struct RepScore {
    score: i64,
    /// Insertion sequence within the org, for the first-write-wins tie-break
    seq: u64,
}

#[derive(Debug, Default)]
struct OrgBoard {
    scores: HashMap<RepId, RepScore>,
    next_seq: u64,
}

impl OrgBoard {
    /// Reps ordered by score descending, insertion order on ties
    fn sorted(&self) -> Vec<(&RepId, &RepScore)> {
        let mut rows: Vec<_> = self.scores.iter().collect();
        rows.sort_by(|(_, a), (_, b)| b.score.cmp(&a.score).then(a.seq.cmp(&b.seq)));
        rows
    }
}

/// In-memory ranking store
///
/// A lock-guarded score map per organization. Increment and read are both
/// O(n log n) at worst for rank computation, which is adequate for
/// per-organization rep counts; an external sorted-set service can replace
/// this behind the same trait.
#[derive(Default)]
pub struct InMemoryRankingStore {
    boards: RwLock<HashMap<OrgId, OrgBoard>>,
}

impl InMemoryRankingStore {
    pub fn new() -> Self {
        Self {
            boards: RwLock::new(HashMap::new()),
        }
    }

    /// Number of ranked reps in an organization
    pub fn ranked_count(&self, org_id: &OrgId) -> usize {
        self.boards
            .read()
            .get(org_id)
            .map(|b| b.scores.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl RankingStore for InMemoryRankingStore {
    async fn increment_score(&self, org_id: &OrgId, rep_id: &RepId, delta: i64) -> Result<i64> {
        let mut boards = self.boards.write();
        let board = boards.entry(org_id.clone()).or_default();

        let seq = board.next_seq;
        let entry = board.scores.entry(rep_id.clone()).or_insert(RepScore {
            score: 0,
            seq,
        });
        if entry.seq == seq {
            board.next_seq += 1;
        }
        entry.score += delta;
        Ok(entry.score)
    }

    async fn top_k(&self, org_id: &OrgId, k: usize) -> Result<Vec<RankEntry>> {
        let boards = self.boards.read();
        let Some(board) = boards.get(org_id) else {
            return Ok(Vec::new());
        };

        Ok(board
            .sorted()
            .into_iter()
            .take(k)
            .enumerate()
            .map(|(i, (rep_id, rep))| RankEntry {
                rep_id: rep_id.clone(),
                score: rep.score,
                rank: i + 1,
            })
            .collect())
    }

    async fn score(&self, org_id: &OrgId, rep_id: &RepId) -> Result<Option<i64>> {
        let boards = self.boards.read();
        Ok(boards
            .get(org_id)
            .and_then(|b| b.scores.get(rep_id))
            .map(|r| r.score))
    }

    async fn rank(&self, org_id: &OrgId, rep_id: &RepId) -> Result<Option<usize>> {
        let boards = self.boards.read();
        let Some(board) = boards.get(org_id) else {
            return Ok(None);
        };

        Ok(board
            .sorted()
            .iter()
            .position(|(id, _)| *id == rep_id)
            .map(|p| p + 1))
    }

    async fn set_score(&self, org_id: &OrgId, rep_id: &RepId, score: i64) -> Result<()> {
        let mut boards = self.boards.write();
        let board = boards.entry(org_id.clone()).or_default();

        match board.scores.get_mut(rep_id) {
            Some(rep) => rep.score = score,
            None => {
                let seq = board.next_seq;
                board.next_seq += 1;
                board.scores.insert(rep_id.clone(), RepScore { score, seq });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn org(id: &str) -> OrgId {
        OrgId::new(id)
    }

    fn rep(id: &str) -> RepId {
        RepId::new(id)
    }

    #[tokio::test]
    async fn test_increment_creates_and_accumulates() {
        let store = InMemoryRankingStore::new();

        assert_eq!(
            store.increment_score(&org("o"), &rep("r"), 25).await.unwrap(),
            25
        );
        assert_eq!(
            store.increment_score(&org("o"), &rep("r"), 115).await.unwrap(),
            140
        );
        assert_eq!(store.score(&org("o"), &rep("r")).await.unwrap(), Some(140));
    }

    #[tokio::test]
    async fn test_top_k_descending_contiguous_ranks() {
        let store = InMemoryRankingStore::new();

        store.increment_score(&org("o"), &rep("a"), 50).await.unwrap();
        store.increment_score(&org("o"), &rep("b"), 200).await.unwrap();
        store.increment_score(&org("o"), &rep("c"), 120).await.unwrap();

        let top = store.top_k(&org("o"), 10).await.unwrap();
        assert_eq!(top.len(), 3);
        assert_eq!(top[0], RankEntry { rep_id: rep("b"), score: 200, rank: 1 });
        assert_eq!(top[1], RankEntry { rep_id: rep("c"), score: 120, rank: 2 });
        assert_eq!(top[2], RankEntry { rep_id: rep("a"), score: 50, rank: 3 });
    }

    #[tokio::test]
    async fn test_tie_break_first_write_wins() {
        let store = InMemoryRankingStore::new();

        store.increment_score(&org("o"), &rep("first"), 100).await.unwrap();
        store.increment_score(&org("o"), &rep("second"), 100).await.unwrap();

        // Repeated reads return the same order
        for _ in 0..3 {
            let top = store.top_k(&org("o"), 10).await.unwrap();
            assert_eq!(top[0].rep_id, rep("first"));
            assert_eq!(top[1].rep_id, rep("second"));
        }

        // Insertion order holds even after the later rep catches up through
        // separate increments
        store.increment_score(&org("o"), &rep("second"), -50).await.unwrap();
        store.increment_score(&org("o"), &rep("second"), 50).await.unwrap();
        let top = store.top_k(&org("o"), 10).await.unwrap();
        assert_eq!(top[0].rep_id, rep("first"));
    }

    #[tokio::test]
    async fn test_rank_covers_all_reps_not_just_top_k() {
        let store = InMemoryRankingStore::new();

        for i in 0..20 {
            store
                .increment_score(&org("o"), &rep(&format!("r{i}")), (i as i64) * 10)
                .await
                .unwrap();
        }

        // r0 has the lowest score, rank 20
        assert_eq!(store.rank(&org("o"), &rep("r0")).await.unwrap(), Some(20));
        assert_eq!(store.rank(&org("o"), &rep("r19")).await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_org_isolation() {
        let store = InMemoryRankingStore::new();

        store.increment_score(&org("org-a"), &rep("r"), 500).await.unwrap();

        assert_eq!(store.score(&org("org-b"), &rep("r")).await.unwrap(), None);
        assert_eq!(store.rank(&org("org-b"), &rep("r")).await.unwrap(), None);
        assert!(store.top_k(&org("org-b"), 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_increments_do_not_lose_updates() {
        let store = Arc::new(InMemoryRankingStore::new());

        let mut handles = Vec::new();
        for _ in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..10 {
                    store
                        .increment_score(&OrgId::new("o"), &RepId::new("r"), 7)
                        .await
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(
            store.score(&org("o"), &rep("r")).await.unwrap(),
            Some(50 * 10 * 7)
        );
    }

    #[tokio::test]
    async fn test_set_score_overwrites() {
        let store = InMemoryRankingStore::new();

        store.increment_score(&org("o"), &rep("r"), 100).await.unwrap();
        store.set_score(&org("o"), &rep("r"), 40).await.unwrap();
        assert_eq!(store.score(&org("o"), &rep("r")).await.unwrap(), Some(40));

        // Creates the entry when absent
        store.set_score(&org("o"), &rep("new"), 15).await.unwrap();
        assert_eq!(store.score(&org("o"), &rep("new")).await.unwrap(), Some(15));
    }

    #[tokio::test]
    async fn test_negative_totals_are_representable() {
        let store = InMemoryRankingStore::new();

        let total = store.increment_score(&org("o"), &rep("r"), -50).await.unwrap();
        assert_eq!(total, -50);
        assert_eq!(store.rank(&org("o"), &rep("r")).await.unwrap(), Some(1));
    }
}
