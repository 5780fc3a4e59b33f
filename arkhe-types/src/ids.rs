//! Identifier types for entities and handovers.
//!
//! Both are caller-assigned strings (e.g. `"Rabbit_01"`, `"EatGrass"`).
//! They are never generated or rewritten by the runtime; the only rule is
//! that they must contain at least one non-whitespace character.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use crate::Error;

fn validate(kind: &'static str, raw: &str) -> Result<(), Error> {
    if raw.trim().is_empty() {
        return Err(Error::InvalidId {
            kind,
            reason: "id must not be empty".to_string(),
        });
    }
    Ok(())
}

/// Identifier of an entity (node).
///
/// Unique within a running process by caller convention. The runtime only
/// checks uniqueness when an `EntityRegistry` is configured to do so.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    /// Creates an entity ID, rejecting empty or whitespace-only input.
    pub fn new(id: impl Into<String>) -> Result<Self, Error> {
        let id = id.into();
        validate("entity", &id)?;
        Ok(Self(id))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for EntityId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for EntityId {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for EntityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Identifier of a handover (a named, directed interaction).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HandoverId(String);

impl HandoverId {
    /// Creates a handover ID, rejecting empty or whitespace-only input.
    pub fn new(id: impl Into<String>) -> Result<Self, Error> {
        let id = id.into();
        validate("handover", &id)?;
        Ok(Self(id))
    }

    /// Derives the conventional id for a handover between two entities,
    /// `"{prefix}_{source}_{target}"`.
    #[must_use]
    pub fn between(prefix: &str, source: &EntityId, target: &EntityId) -> Self {
        if prefix.trim().is_empty() {
            return Self(format!("{source}_{target}"));
        }
        Self(format!("{prefix}_{source}_{target}"))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HandoverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for HandoverId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for HandoverId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for HandoverId {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<HandoverId> for String {
    fn from(id: HandoverId) -> Self {
        id.0
    }
}

impl AsRef<str> for HandoverId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
