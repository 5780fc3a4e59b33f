//! Typed value and entity model for Arkhe.
//!
//! Defines the types every handover operates on:
//! - [`ValueKind`] and [`Shape`] — the declared form of a value
//! - [`Data`] — the closed set of runtime representations (scalar, array,
//!   opaque function, entity reference)
//! - [`TypedValue`] — data paired with its kind and shape, validated on every write
//! - [`Entity`] — an identified, fixed-schema map of named typed values
//! - [`EntityRef`] — the shared handle through which entities are referenced
//!
//! Domain vocabulary (robots, planets, ontologies) is built by callers with
//! [`EntityBuilder`], not by extending these types.

mod data;
mod entity;
mod error;
mod kind;
mod value;

pub use data::{Array, Data, Opaque, Scalar};
pub use entity::{Entity, EntityBuilder, EntityRef};
pub use error::{ModelError, ModelResult};
pub use kind::{Shape, ValueKind};
pub use value::TypedValue;

pub use arkhe_types::EntityId;
