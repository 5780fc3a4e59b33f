//! Preservation policies and the post-hoc conservation check.
//!
//! A conservative handover moves a quantity: whatever the caller subtracts
//! from one side it adds to the other, so `source + target` stays fixed.
//! A transmutative handover changes the form of what it moves; nothing is
//! conserved and a [`Fidelity`] records how much of the source survived.

use arkhe_types::HandoverId;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::{RuntimeError, RuntimeResult};

/// Fraction of source information preserved by a transformation, in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Fidelity(f64);

impl Fidelity {
    /// Everything survives.
    pub const LOSSLESS: Self = Self(1.0);

    pub fn new(value: f64) -> RuntimeResult<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(RuntimeError::FidelityOutOfRange { value });
        }
        Ok(Self(value))
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Fidelity {
    type Error = RuntimeError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Fidelity> for f64 {
    fn from(f: Fidelity) -> Self {
        f.0
    }
}

impl fmt::Display for Fidelity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The discipline tag without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    Conservative,
    Transmutative,
}

/// How a handover treats the state it moves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PreservationPolicy {
    /// The moved quantity leaves `source + target` unchanged.
    Conservative,
    /// No conservation; `fidelity` describes what survived.
    Transmutative { fidelity: Fidelity },
}

impl PreservationPolicy {
    /// Combines a policy tag with an optional raw fidelity.
    ///
    /// Transmutative policies require a fidelity in `[0, 1]`. A fidelity
    /// supplied for a conservative policy is ignored.
    pub fn from_parts(
        kind: PolicyKind,
        fidelity: Option<f64>,
        handover_id: &HandoverId,
    ) -> RuntimeResult<Self> {
        match (kind, fidelity) {
            (PolicyKind::Conservative, None) => Ok(Self::Conservative),
            (PolicyKind::Conservative, Some(ignored)) => {
                debug!(
                    "Ignoring fidelity {} on conservative handover {}",
                    ignored, handover_id
                );
                Ok(Self::Conservative)
            }
            (PolicyKind::Transmutative, None) => Err(RuntimeError::MissingFidelity {
                handover_id: handover_id.clone(),
            }),
            (PolicyKind::Transmutative, Some(value)) => Ok(Self::Transmutative {
                fidelity: Fidelity::new(value)?,
            }),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> PolicyKind {
        match self {
            Self::Conservative => PolicyKind::Conservative,
            Self::Transmutative { .. } => PolicyKind::Transmutative,
        }
    }

    /// The fidelity of a transmutative policy, `None` for conservative ones.
    #[must_use]
    pub const fn fidelity(&self) -> Option<Fidelity> {
        match self {
            Self::Conservative => None,
            Self::Transmutative { fidelity } => Some(*fidelity),
        }
    }

    #[must_use]
    pub const fn is_conservative(&self) -> bool {
        matches!(self, Self::Conservative)
    }
}

/// Checks that a transfer left `source + target` unchanged within `tolerance`.
///
/// Meant to run after the caller applied a conservative handover's effect.
/// It reports; it does not undo anything. Non-finite totals and a negative
/// or NaN tolerance are reported as violations.
pub fn verify_conservation(
    before_source: f64,
    before_target: f64,
    after_source: f64,
    after_target: f64,
    tolerance: f64,
) -> RuntimeResult<()> {
    let before = before_source + before_target;
    let after = after_source + after_target;
    let drift = (before - after).abs();

    // NaN drift or tolerance fails the comparison and lands here too.
    if !(tolerance >= 0.0 && drift <= tolerance) {
        warn!(
            "Conservation violated: total {} became {} (drift {}, tolerance {})",
            before, after, drift, tolerance
        );
        return Err(RuntimeError::ConservationViolated { before, after, tolerance });
    }
    Ok(())
}
