//! Error types for handover construction, execution and verification.

use arkhe_model::ModelError;
use arkhe_types::{EntityId, HandoverId};
use thiserror::Error;

use crate::PolicyKind;

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Boxed cause of a failed mapping function.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    InvalidId(#[from] arkhe_types::Error),

    /// A transmutative handover was built without a fidelity.
    #[error("transmutative handover '{handover_id}' requires a fidelity")]
    MissingFidelity { handover_id: HandoverId },

    /// Fidelity outside `[0, 1]` (or NaN).
    #[error("fidelity {value} is outside [0, 1]")]
    FidelityOutOfRange { value: f64 },

    /// The caller-supplied mapping function failed.
    #[error("handover '{handover_id}' failed: {source}")]
    HandoverExecutionFailed {
        handover_id: HandoverId,
        #[source]
        source: BoxError,
    },

    /// Totals before and after a conservative transfer differ by more than
    /// the tolerance.
    #[error("conservation violated: total {before} became {after} (tolerance {tolerance})")]
    ConservationViolated { before: f64, after: f64, tolerance: f64 },

    /// An operation required a handover of a different policy.
    #[error("handover '{handover_id}' is {actual:?}, expected {expected:?}")]
    PolicyMismatch {
        handover_id: HandoverId,
        expected: PolicyKind,
        actual: PolicyKind,
    },

    /// An outcome was applied through a handover that did not produce it.
    #[error("outcome of handover '{found}' applied through '{expected}'")]
    ForeignOutcome {
        expected: HandoverId,
        found: HandoverId,
    },

    #[error("entity id already registered: {0}")]
    DuplicateId(EntityId),

    #[error("entity not registered: {0}")]
    UnknownEntity(String),
}

/// Errors from strict configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
