//! CallForge Event Log - Durable XP ledger
//!
//! The event log is:
//! - Append-only (entries are never mutated or deleted)
//! - Org-scoped (every query is partitioned by `OrgId`)
//! - The source of truth for XP (the ranking store is a rebuildable cache)
//!
//! # Invariants
//!
//! 1. An append succeeds or fails atomically; no partial writes
//! 2. The sum of a rep's deltas is their authoritative lifetime XP
//! 3. Reconciliation replays `sum_for_rep` to heal the ranking cache
//!
//! `sum_for_rep` and the query surface are audit paths, not the hot path:
//! leaderboard reads go through the ranking store.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use callforge_types::{OrgId, RepId, XpEvent, XpEventId, XpReason};

/// Errors that can occur in event log operations
#[derive(Debug, Error)]
pub enum EventLogError {
    #[error("Append failed: {message}")]
    AppendFailed { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

pub type Result<T> = std::result::Result<T, EventLogError>;

/// Durable, append-only store of XP events
///
/// Implementations must make `append` atomic: an entry is either fully
/// recorded or not recorded at all.
#[async_trait]
pub trait XpEventLog: Send + Sync {
    /// Append an event; never overwrites
    async fn append(&self, event: XpEvent) -> Result<XpEventId>;

    /// Recompute a rep's total XP by summing all of their events
    async fn sum_for_rep(&self, org_id: &OrgId, rep_id: &RepId) -> Result<i64>;

    /// Lifetime count of completed-call events for a rep
    async fn call_count_for_rep(&self, org_id: &OrgId, rep_id: &RepId) -> Result<u64>;

    /// All events for a rep, oldest first
    async fn events_for_rep(&self, org_id: &OrgId, rep_id: &RepId) -> Result<Vec<XpEvent>>;

    /// Recent events for an organization, newest first
    async fn recent_events(&self, org_id: &OrgId, limit: usize) -> Result<Vec<XpEvent>>;
}

/// In-memory event log
///
/// Thread-safe and designed for concurrent access. Useful as the test
/// double and as the single-process deployment backend.
#[derive(Clone, Default)]
pub struct InMemoryEventLog {
    entries: Arc<RwLock<Vec<XpEvent>>>,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Total number of entries across all organizations
    pub async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl XpEventLog for InMemoryEventLog {
    async fn append(&self, event: XpEvent) -> Result<XpEventId> {
        let mut entries = self.entries.write().await;
        let id = event.id.clone();
        entries.push(event);
        Ok(id)
    }

    async fn sum_for_rep(&self, org_id: &OrgId, rep_id: &RepId) -> Result<i64> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|e| &e.org_id == org_id && &e.rep_id == rep_id)
            .map(|e| e.delta)
            .sum())
    }

    async fn call_count_for_rep(&self, org_id: &OrgId, rep_id: &RepId) -> Result<u64> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|e| {
                &e.org_id == org_id
                    && &e.rep_id == rep_id
                    && e.reason == XpReason::CallCompleted
            })
            .count() as u64)
    }

    async fn events_for_rep(&self, org_id: &OrgId, rep_id: &RepId) -> Result<Vec<XpEvent>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|e| &e.org_id == org_id && &e.rep_id == rep_id)
            .cloned()
            .collect())
    }

    async fn recent_events(&self, org_id: &OrgId, limit: usize) -> Result<Vec<XpEvent>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .rev()
            .filter(|e| &e.org_id == org_id)
            .take(limit)
            .cloned()
            .collect())
    }
}
