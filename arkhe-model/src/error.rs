//! Error types for the value and entity model.

use arkhe_types::EntityId;
use thiserror::Error;

use crate::Shape;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while constructing or updating typed values and entities.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The data's runtime representation is incompatible with the declared kind.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// A vector's data dimensionality disagrees with its declared shape.
    #[error("shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch { expected: Shape, found: Shape },

    /// The shape itself is unusable (empty vector shape, zero dimension,
    /// element count not matching the dimensions).
    #[error("invalid shape {shape}: {reason}")]
    InvalidShape { shape: Shape, reason: String },

    /// Lookup or update of an attribute the entity never declared.
    #[error("entity '{entity}' has no attribute '{name}'")]
    UnknownAttribute { entity: EntityId, name: String },

    /// An attribute name declared twice on the same entity.
    #[error("entity '{entity}' already declares attribute '{name}'")]
    DuplicateAttribute { entity: EntityId, name: String },

    #[error(transparent)]
    InvalidId(#[from] arkhe_types::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
