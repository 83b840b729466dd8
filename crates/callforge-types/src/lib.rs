//! CallForge Types - Canonical domain types for call-tracking gamification
//!
//! This crate contains all foundational types for CallForge with zero
//! dependencies on other callforge crates. It defines the type system for:
//!
//! - Identity types (OrgId, RepId, CallId, XpEventId)
//! - Call outcome and AI quality assessment records
//! - XP events (the durable, append-only scoring ledger entries)
//! - Milestone events (ephemeral celebration notifications)
//!
//! # Architectural Invariants
//!
//! 1. Every scoring entity is partitioned by `OrgId` — rankings never cross
//!    organization boundaries
//! 2. An `XpEvent`, once written, is never mutated or deleted
//! 3. The sum of a rep's event deltas is their authoritative lifetime XP
//! 4. A `MilestoneEvent` is derived from a state transition, not stored state

pub mod call;
pub mod event;
pub mod identity;
pub mod milestone;

pub use call::*;
pub use event::*;
pub use identity::*;
pub use milestone::*;

/// Version of the CallForge types schema
pub const TYPES_VERSION: &str = "0.1.0";
