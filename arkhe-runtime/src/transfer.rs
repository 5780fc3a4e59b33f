//! Caller-side helpers for applying and checking conservative handovers.

use arkhe_types::HandoverId;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    ConservationConfig, DEFAULT_TOLERANCE, Handover, HandoverOutcome, PolicyKind, RuntimeError,
    RuntimeResult, verify_conservation,
};

/// Rounding allowance per unit of magnitude for transfers computed in `f64`.
const ROUNDING_ULPS: f64 = 4.0 * f64::EPSILON;

/// Snapshot of the two conserved quantities taken before a transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct ConservationCheck {
    handover_id: HandoverId,
    source_attr: String,
    target_attr: String,
    before_source: f64,
    before_target: f64,
}

impl ConservationCheck {
    /// Reads `source_attr` on the handover's source and `target_attr` on its
    /// target. Both must be numeric scalars.
    pub fn capture<T>(handover: &Handover<T>, source_attr: &str, target_attr: &str) -> RuntimeResult<Self> {
        let before_source = handover.source().read().quantity(source_attr)?;
        let before_target = handover.target().read().quantity(target_attr)?;
        Ok(Self {
            handover_id: handover.id().clone(),
            source_attr: source_attr.to_string(),
            target_attr: target_attr.to_string(),
            before_source,
            before_target,
        })
    }

    /// Quantities at capture time, `(source, target)`.
    #[must_use]
    pub fn before(&self) -> (f64, f64) {
        (self.before_source, self.before_target)
    }

    /// Re-reads both quantities and checks the total did not drift.
    pub fn verify<T>(&self, handover: &Handover<T>, tolerance: f64) -> RuntimeResult<TransferRecord> {
        let after_source = handover.source().read().quantity(&self.source_attr)?;
        let after_target = handover.target().read().quantity(&self.target_attr)?;
        verify_conservation(
            self.before_source,
            self.before_target,
            after_source,
            after_target,
            tolerance,
        )?;
        Ok(TransferRecord {
            handover_id: self.handover_id.clone(),
            before_source: self.before_source,
            before_target: self.before_target,
            after_source,
            after_target,
        })
    }
}

/// Which side gives up the transferred amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferDirection {
    /// Source loses the amount, target gains it.
    SourceToTarget,
    /// Target loses the amount, source gains it (e.g. a grazer feeding on
    /// the entity it targets).
    TargetToSource,
}

/// Quantities on both sides of an applied transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRecord {
    pub handover_id: HandoverId,
    pub before_source: f64,
    pub before_target: f64,
    pub after_source: f64,
    pub after_target: f64,
}

/// Explicit apply step for the outcome of a conservative handover.
///
/// Names the conserved attribute on each side and the direction of flow.
/// [`ConservativeTransfer::apply`] moves the executed amount and verifies the
/// total afterwards.
///
/// The configured tolerance is absolute. Because the transfer does its own
/// `f64` arithmetic, the check also allows a few units of rounding relative
/// to the quantities involved, so a transfer of `0.1` out of `1e12` is not
/// refused for float error alone.
#[derive(Debug, Clone, PartialEq)]
pub struct ConservativeTransfer {
    source_attr: String,
    target_attr: String,
    direction: TransferDirection,
    tolerance: f64,
}

impl ConservativeTransfer {
    pub fn new(
        source_attr: impl Into<String>,
        target_attr: impl Into<String>,
        direction: TransferDirection,
    ) -> Self {
        Self {
            source_attr: source_attr.into(),
            target_attr: target_attr.into(),
            direction,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Takes the tolerance from the `[conservation]` config section.
    #[must_use]
    pub fn with_config(self, config: &ConservationConfig) -> Self {
        self.with_tolerance(config.tolerance)
    }

    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    #[must_use]
    pub fn direction(&self) -> TransferDirection {
        self.direction
    }

    /// Moves `outcome.value` between the two attributes.
    ///
    /// Rejects outcomes of transmutative handovers and outcomes produced by
    /// a different handover. Both new values are computed and checked before
    /// either entity is written.
    pub fn apply(&self, handover: &Handover<f64>, outcome: &HandoverOutcome<f64>) -> RuntimeResult<TransferRecord> {
        if outcome.handover_id != *handover.id() {
            return Err(RuntimeError::ForeignOutcome {
                expected: handover.id().clone(),
                found: outcome.handover_id.clone(),
            });
        }
        let actual = outcome.policy.kind();
        if actual != PolicyKind::Conservative {
            return Err(RuntimeError::PolicyMismatch {
                handover_id: handover.id().clone(),
                expected: PolicyKind::Conservative,
                actual,
            });
        }

        let check = ConservationCheck::capture(handover, &self.source_attr, &self.target_attr)?;
        let (source, target) = check.before();

        // Same attribute on the same entity: nothing moves.
        if handover.source().ptr_eq(handover.target()) && self.source_attr == self.target_attr {
            return check.verify(handover, self.tolerance);
        }

        let amount = outcome.value;
        let (after_source, after_target) = match self.direction {
            TransferDirection::SourceToTarget => (source - amount, target + amount),
            TransferDirection::TargetToSource => (source + amount, target - amount),
        };
        let tolerance = self.effective_tolerance(source, target, after_source, after_target);
        verify_conservation(source, target, after_source, after_target, tolerance)?;

        handover
            .source()
            .write()
            .set_attribute(&self.source_attr, after_source)?;
        handover
            .target()
            .write()
            .set_attribute(&self.target_attr, after_target)?;

        let record = check.verify(handover, tolerance)?;
        info!(
            "Applied {} of {} via {}: {} {} -> {}, {} {} -> {}",
            amount,
            self.source_attr,
            handover.id(),
            handover.source().id(),
            record.before_source,
            record.after_source,
            handover.target().id(),
            record.before_target,
            record.after_target
        );
        Ok(record)
    }

    /// The configured tolerance, widened to cover `f64` rounding at the
    /// magnitude of the quantities. Non-finite magnitudes and unusable
    /// tolerances get no allowance.
    fn effective_tolerance(
        &self,
        before_source: f64,
        before_target: f64,
        after_source: f64,
        after_target: f64,
    ) -> f64 {
        let magnitude = (before_source.abs() + before_target.abs())
            .max(after_source.abs() + after_target.abs());
        if magnitude.is_finite() && self.tolerance >= 0.0 {
            self.tolerance.max(ROUNDING_ULPS * magnitude)
        } else {
            self.tolerance
        }
    }
}
