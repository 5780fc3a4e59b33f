//! Caller-side entity registry.
//!
//! Entities do not know about each other; id uniqueness is a registry
//! policy, controlled by [`RegistryConfig::enforce_unique_ids`].

use arkhe_model::{Entity, EntityRef};
use arkhe_types::EntityId;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::{Handover, PolicyKind, RegistryConfig, RuntimeError, RuntimeResult};

/// Holds the entities a simulation driver owns, keyed by id.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: HashMap<EntityId, EntityRef>,
    config: RegistryConfig,
}

impl EntityRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            entities: HashMap::new(),
            config,
        }
    }

    /// Registers an entity and returns its shared handle.
    pub fn register(&mut self, entity: Entity) -> RuntimeResult<EntityRef> {
        self.register_ref(EntityRef::new(entity))
    }

    /// Registers an existing handle.
    pub fn register_ref(&mut self, handle: EntityRef) -> RuntimeResult<EntityRef> {
        let id = handle.id().clone();
        if let Some(existing) = self.entities.get(&id) {
            if existing.ptr_eq(&handle) {
                return Ok(handle);
            }
            if self.config.enforce_unique_ids {
                return Err(RuntimeError::DuplicateId(id));
            }
            warn!("Replacing registered entity {}", id);
        } else {
            debug!("Registered entity {}", id);
        }
        self.entities.insert(id, handle.clone());
        Ok(handle)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&EntityRef> {
        self.entities.get(id)
    }

    /// Like [`get`](Self::get) but fails with `UnknownEntity`.
    pub fn require(&self, id: &str) -> RuntimeResult<&EntityRef> {
        self.get(id)
            .ok_or_else(|| RuntimeError::UnknownEntity(id.to_string()))
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    /// Removes an entity from the registry. Handovers already holding its
    /// handle keep it alive.
    pub fn remove(&mut self, id: &str) -> Option<EntityRef> {
        self.entities.remove(id)
    }

    /// Registered ids in sorted order.
    #[must_use]
    pub fn ids(&self) -> Vec<&EntityId> {
        let mut ids: Vec<&EntityId> = self.entities.keys().collect();
        ids.sort();
        ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Builds a handover between two registered entities.
    pub fn handover<T, F>(
        &self,
        id: impl Into<String>,
        source_id: &str,
        target_id: &str,
        kind: PolicyKind,
        map_state: F,
        fidelity: Option<f64>,
    ) -> RuntimeResult<Handover<T>>
    where
        F: Fn(&Entity) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        let source = self.require(source_id)?;
        let target = self.require(target_id)?;
        Handover::new(id, source, target, kind, map_state, fidelity)
    }
}
