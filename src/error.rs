//! Error taxonomy for the resolution pipeline.
//!
//! "Not found" is never an error here: zero matches from the knowledge base
//! surface as `Resolution::NotFound` (or `TokenOutcome::NotFound` for a
//! token inside a phrase), so callers can always tell an absent word apart
//! from a fault. No variant is ever retried; every failure is terminal for
//! the current request.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    /// Malformed request, rejected before any remote call.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The reachability probe failed; the resolution attempt is aborted
    /// without touching the knowledge base or either store.
    #[error("no internet connectivity")]
    Connectivity,

    /// Transport or parse failure talking to the knowledge base.
    #[error("knowledge base query failed: {0}")]
    Resolution(String),

    /// Durable-store or cache failure. A durable failure fails the whole
    /// operation; a cache failure after a successful durable insert is
    /// downgraded to a warning by the orchestrator.
    #[error("persistence failed: {0}")]
    Persistence(String),
}
