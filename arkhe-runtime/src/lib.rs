//! Handover runtime for Arkhe entities.
//!
//! A caller builds entities (see `arkhe-model`), connects two of them with a
//! [`Handover`] under a [`PreservationPolicy`], executes it, and applies the
//! returned value itself. The runtime never mutates entities as a side effect
//! of execution.
//!
//! - [`Handover`] / [`HandoverOutcome`] — construction, execution, fidelity metadata
//! - [`PreservationPolicy`] / [`Fidelity`] — conservative vs. transmutative discipline
//! - [`verify_conservation`] / [`ConservationCheck`] — post-hoc consistency checks
//! - [`ConservativeTransfer`] — an explicit apply step for conservative outcomes
//! - [`EntityRegistry`] — optional id-uniqueness policy for a set of entities
//! - [`RuntimeConfig`] — tolerance and registry settings loaded from TOML
//!
//! Everything is synchronous. Entities are shared through `EntityRef`, whose
//! lock makes concurrent use possible but is not required by the reference
//! single-threaded driver.

mod config;
mod error;
mod handover;
mod policy;
mod registry;
mod transfer;

pub use config::{ConservationConfig, DEFAULT_TOLERANCE, RegistryConfig, RuntimeConfig};
pub use error::{BoxError, ConfigError, RuntimeError, RuntimeResult};
pub use handover::{Handover, HandoverOutcome};
pub use policy::{Fidelity, PolicyKind, PreservationPolicy, verify_conservation};
pub use registry::EntityRegistry;
pub use transfer::{ConservationCheck, ConservativeTransfer, TransferDirection, TransferRecord};

pub use arkhe_types::{ExecutionId, HandoverId};
