//! Core identifier types for Arkhe.
//!
//! This crate defines the identifiers shared by the model and runtime crates:
//! - Entity and handover identifiers (caller-assigned, non-empty strings)
//! - Execution identifiers (UUID v7, one per handover invocation)
//!
//! Value kinds, entities and handovers live in `arkhe-model` and
//! `arkhe-runtime`, not here.

mod execution;
mod ids;

pub use execution::ExecutionId;
pub use ids::{EntityId, HandoverId};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid {kind} id: {reason}")]
    InvalidId { kind: &'static str, reason: String },

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),
}
