//! Handovers: directed, named interactions between two entities.
//!
//! A handover references a source and a target entity, carries one
//! [`PreservationPolicy`], and owns a caller-supplied mapping function that
//! computes the transferred value from the source's current state.
//!
//! Execution is a pure computation. It never writes to either entity; the
//! caller applies the returned value as a separate step (by hand, or through
//! [`ConservativeTransfer`](crate::ConservativeTransfer)).

use arkhe_model::{Entity, EntityRef};
use arkhe_types::{ExecutionId, HandoverId};
use std::fmt;
use tracing::{debug, warn};

use crate::{Fidelity, PolicyKind, PreservationPolicy, RuntimeError, RuntimeResult};

type MapState<T> = dyn Fn(&Entity) -> anyhow::Result<T> + Send + Sync;

/// A directed interaction from `source` to `target`.
///
/// `map_state` must depend only on its argument so that repeated execution
/// over unchanged source state yields the same value. It runs while a read
/// lock on the source is held and must not try to write to it.
pub struct Handover<T> {
    id: HandoverId,
    source: EntityRef,
    target: EntityRef,
    policy: PreservationPolicy,
    map_state: Box<MapState<T>>,
}

impl<T> Handover<T> {
    /// Builds a handover between two existing entities.
    ///
    /// Transmutative handovers need a `fidelity` in `[0, 1]`; conservative
    /// handovers ignore it.
    pub fn new<F>(
        id: impl Into<String>,
        source: &EntityRef,
        target: &EntityRef,
        kind: PolicyKind,
        map_state: F,
        fidelity: Option<f64>,
    ) -> RuntimeResult<Self>
    where
        F: Fn(&Entity) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        let id = HandoverId::new(id)?;
        let policy = PreservationPolicy::from_parts(kind, fidelity, &id)?;
        debug!(
            "Built {:?} handover {} from {} to {}",
            kind,
            id,
            source.id(),
            target.id()
        );
        Ok(Self {
            id,
            source: source.clone(),
            target: target.clone(),
            policy,
            map_state: Box::new(map_state),
        })
    }

    /// Shorthand for a quantity-preserving handover.
    pub fn conservative<F>(
        id: impl Into<String>,
        source: &EntityRef,
        target: &EntityRef,
        map_state: F,
    ) -> RuntimeResult<Self>
    where
        F: Fn(&Entity) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        Self::new(id, source, target, PolicyKind::Conservative, map_state, None)
    }

    /// Shorthand for a form-changing handover with the given fidelity.
    pub fn transmutative<F>(
        id: impl Into<String>,
        source: &EntityRef,
        target: &EntityRef,
        fidelity: f64,
        map_state: F,
    ) -> RuntimeResult<Self>
    where
        F: Fn(&Entity) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        Self::new(id, source, target, PolicyKind::Transmutative, map_state, Some(fidelity))
    }

    #[must_use]
    pub fn id(&self) -> &HandoverId {
        &self.id
    }

    #[must_use]
    pub fn source(&self) -> &EntityRef {
        &self.source
    }

    #[must_use]
    pub fn target(&self) -> &EntityRef {
        &self.target
    }

    #[must_use]
    pub fn policy(&self) -> PreservationPolicy {
        self.policy
    }

    /// Runs the mapping function over the source's current state.
    ///
    /// Neither entity is modified. Each call is independent and stamped with
    /// a fresh [`ExecutionId`].
    pub fn execute(&self) -> RuntimeResult<HandoverOutcome<T>> {
        let execution_id = ExecutionId::new();
        debug!("Executing handover {} ({})", self.id, execution_id);

        let result = {
            let snapshot = self.source.read();
            (self.map_state)(&*snapshot)
        };

        match result {
            Ok(value) => Ok(HandoverOutcome {
                execution_id,
                handover_id: self.id.clone(),
                policy: self.policy,
                value,
            }),
            Err(err) => {
                warn!("Handover {} ({}) failed: {:#}", self.id, execution_id, err);
                Err(RuntimeError::HandoverExecutionFailed {
                    handover_id: self.id.clone(),
                    source: err.into(),
                })
            }
        }
    }
}

impl<T> fmt::Debug for Handover<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handover")
            .field("id", &self.id)
            .field("source", &self.source)
            .field("target", &self.target)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// The result of one handover execution.
#[derive(Debug, Clone, PartialEq)]
pub struct HandoverOutcome<T> {
    /// Unique per invocation.
    pub execution_id: ExecutionId,
    pub handover_id: HandoverId,
    pub policy: PreservationPolicy,
    /// The value computed by the mapping function.
    pub value: T,
}

impl<T> HandoverOutcome<T> {
    /// Fidelity metadata for transmutative handovers.
    #[must_use]
    pub fn fidelity(&self) -> Option<Fidelity> {
        self.policy.fidelity()
    }

    #[must_use]
    pub fn into_value(self) -> T {
        self.value
    }
}
