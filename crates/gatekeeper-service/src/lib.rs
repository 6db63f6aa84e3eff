//! # gatekeeper-service
//!
//! Orchestration layer for Gatekeeper. Holds the per-request flow
//! controller, the immutable configuration snapshot it reads, and the
//! reloader that swaps snapshots.
//!
//! Services follow constructor injection; all shared dependencies are
//! provided at construction time via `Arc` references.

pub mod context;
pub mod flow;
pub mod reload;
pub mod snapshot;

pub use context::RequestContext;
pub use flow::{AuthFlow, FlowDecision, FlowOutcome, ResourcePath};
pub use reload::{ConfigReloader, ReloadOutcome};
pub use snapshot::{GatewaySnapshot, SnapshotStore};
