use arkhe_types::EntityId;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{Array, Data, ModelError, ModelResult, Opaque, Scalar, TypedValue, ValueKind};

/// A uniquely identified container of typed, named attribute values.
///
/// The attribute set is declared up front. Updates rewrite the data of an
/// existing attribute and never create new ones; growing the schema goes
/// through [`Entity::declare_attribute`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    id: EntityId,
    state_space: ValueKind,
    attributes: BTreeMap<String, TypedValue>,
}

impl Entity {
    /// Creates an entity with a complete initial attribute set.
    ///
    /// Fails if `id` is blank or if an attribute name appears twice.
    pub fn new<I, K>(id: impl Into<String>, state_space: ValueKind, attributes: I) -> ModelResult<Self>
    where
        I: IntoIterator<Item = (K, TypedValue)>,
        K: Into<String>,
    {
        let mut entity = Self {
            id: EntityId::new(id)?,
            state_space,
            attributes: BTreeMap::new(),
        };
        for (name, value) in attributes {
            entity.declare_attribute(name, value)?;
        }
        Ok(entity)
    }

    /// Starts a fluent builder.
    pub fn builder(id: impl Into<String>, state_space: ValueKind) -> EntityBuilder {
        EntityBuilder::new(id, state_space)
    }

    #[must_use]
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// The entity's nominal representation kind. Informational only.
    #[must_use]
    pub fn state_space(&self) -> ValueKind {
        self.state_space
    }

    pub fn get_attribute(&self, name: &str) -> ModelResult<&TypedValue> {
        self.attributes.get(name).ok_or_else(|| self.unknown(name))
    }

    /// Shorthand for `get_attribute(name)?.get()`.
    pub fn get(&self, name: &str) -> ModelResult<&Data> {
        Ok(self.get_attribute(name)?.get())
    }

    /// Reads a numeric scalar attribute.
    pub fn quantity(&self, name: &str) -> ModelResult<f64> {
        self.get_attribute(name)?.as_f64()
    }

    /// Rewrites the data of a declared attribute.
    pub fn set_attribute(&mut self, name: &str, data: impl Into<Data>) -> ModelResult<()> {
        match self.attributes.get_mut(name) {
            Some(value) => value.set(data),
            None => Err(self.unknown(name)),
        }
    }

    /// Adds a new attribute to the schema.
    pub fn declare_attribute(&mut self, name: impl Into<String>, value: TypedValue) -> ModelResult<()> {
        let name = name.into();
        if self.attributes.contains_key(&name) {
            return Err(ModelError::DuplicateAttribute {
                entity: self.id.clone(),
                name,
            });
        }
        self.attributes.insert(name, value);
        Ok(())
    }

    #[must_use]
    pub fn contains_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Attribute names in sorted order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// JSON snapshot for display. Functions render as their label and node
    /// references as the referenced entity id.
    pub fn to_json(&self) -> ModelResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn unknown(&self, name: &str) -> ModelError {
        ModelError::UnknownAttribute {
            entity: self.id.clone(),
            name: name.to_string(),
        }
    }
}

/// Fluent constructor for [`Entity`].
///
/// Errors from individual attributes are deferred to [`EntityBuilder::build`]
/// so declarations can be chained.
#[derive(Debug)]
pub struct EntityBuilder {
    id: String,
    state_space: ValueKind,
    attributes: Vec<(String, ModelResult<TypedValue>)>,
}

impl EntityBuilder {
    pub fn new(id: impl Into<String>, state_space: ValueKind) -> Self {
        Self {
            id: id.into(),
            state_space,
            attributes: Vec::new(),
        }
    }

    pub fn attribute(mut self, name: impl Into<String>, value: TypedValue) -> Self {
        self.attributes.push((name.into(), Ok(value)));
        self
    }

    pub fn scalar(self, name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.attribute(name, TypedValue::scalar(value))
    }

    pub fn vector(mut self, name: impl Into<String>, array: Array) -> Self {
        self.attributes.push((name.into(), TypedValue::vector(array)));
        self
    }

    pub fn function(self, name: impl Into<String>, value: Opaque) -> Self {
        self.attribute(name, TypedValue::function(value))
    }

    pub fn node(self, name: impl Into<String>, entity: EntityRef) -> Self {
        self.attribute(name, TypedValue::node(entity))
    }

    pub fn build(self) -> ModelResult<Entity> {
        let mut entity = Entity::new(self.id, self.state_space, std::iter::empty::<(String, TypedValue)>())?;
        for (name, value) in self.attributes {
            entity.declare_attribute(name, value?)?;
        }
        Ok(entity)
    }
}

/// Shared handle to an [`Entity`].
///
/// Handovers, node-reference attributes and registries refer to entities
/// through this handle and never own them. The id is cached outside the lock
/// since it never changes.
///
/// Lock poisoning is recovered rather than propagated: every attribute write
/// is validated before it is applied, so a panicking writer cannot leave an
/// entity half-updated.
#[derive(Clone)]
pub struct EntityRef {
    id: EntityId,
    inner: Arc<RwLock<Entity>>,
}

impl EntityRef {
    pub fn new(entity: Entity) -> Self {
        Self {
            id: entity.id.clone(),
            inner: Arc::new(RwLock::new(entity)),
        }
    }

    #[must_use]
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Entity> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Entity> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clones the current state of the entity.
    #[must_use]
    pub fn snapshot(&self) -> Entity {
        self.read().clone()
    }

    /// True when both handles point at the same entity.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl From<Entity> for EntityRef {
    fn from(entity: Entity) -> Self {
        Self::new(entity)
    }
}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityRef").field(&self.id.as_str()).finish()
    }
}

impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Serialize for EntityRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Repr<'a> {
            node: &'a EntityId,
        }
        Repr { node: &self.id }.serialize(serializer)
    }
}
