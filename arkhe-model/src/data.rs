//! Runtime representations for attribute data.
//!
//! [`Data`] is the closed set of things a [`TypedValue`](crate::TypedValue)
//! may hold. Each variant corresponds to exactly one [`ValueKind`].

use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::{EntityRef, ModelError, ModelResult, Shape, ValueKind};

/// A single number, flag or label.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Name of the runtime representation, used in mismatch errors.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
        }
    }

    /// Numeric view of `Int` and `Float` scalars.
    ///
    /// `Int` values beyond 2^53 in magnitude round to the nearest
    /// representable `f64`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Bool(_) | Self::Text(_) => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// An n-dimensional array of scalars stored in row-major order.
///
/// All elements share one scalar type, and the element count always equals
/// the product of the array's dimensions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Array {
    shape: Shape,
    elements: Vec<Scalar>,
}

impl Array {
    /// Builds an array, checking element count and element homogeneity.
    pub fn new(shape: impl Into<Shape>, elements: Vec<Scalar>) -> ModelResult<Self> {
        let shape = shape.into();
        let Some(count) = shape.element_count() else {
            return Err(ModelError::InvalidShape {
                reason: "element count overflows usize".to_string(),
                shape,
            });
        };
        if shape.is_empty() || count != elements.len() {
            return Err(ModelError::InvalidShape {
                reason: format!(
                    "{} elements cannot fill {} dimension(s)",
                    elements.len(),
                    shape.rank()
                ),
                shape,
            });
        }
        if let Some(first) = elements.first() {
            let expected = first.type_name();
            if let Some(odd) = elements.iter().find(|e| e.type_name() != expected) {
                return Err(ModelError::TypeMismatch {
                    expected: format!("array of {expected}"),
                    found: odd.type_name().to_string(),
                });
            }
        }
        Ok(Self { shape, elements })
    }

    /// Builds a one-dimensional array from homogeneous items.
    pub fn from_vec<T: Into<Scalar>>(items: Vec<T>) -> Self {
        let elements: Vec<Scalar> = items.into_iter().map(Into::into).collect();
        Self {
            shape: Shape::new(vec![elements.len()]),
            elements,
        }
    }

    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[must_use]
    pub fn elements(&self) -> &[Scalar] {
        &self.elements
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Numeric view of the elements, `None` if any element is not a number.
    #[must_use]
    pub fn to_f64_vec(&self) -> Option<Vec<f64>> {
        self.elements.iter().map(Scalar::as_f64).collect()
    }
}

impl<T: Into<Scalar>> FromIterator<T> for Array {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

/// An opaque callable or value, identified by a label.
///
/// The runtime never inspects the payload; callers recover it with
/// [`Opaque::downcast_ref`]. Two opaques are equal only if they share the
/// same payload allocation.
#[derive(Clone)]
pub struct Opaque {
    label: String,
    inner: Arc<dyn Any + Send + Sync>,
}

impl Opaque {
    pub fn new<T: Any + Send + Sync>(label: impl Into<String>, value: T) -> Self {
        Self {
            label: label.into(),
            inner: Arc::new(value),
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the payload if it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Opaque").field(&self.label).finish()
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Serialize for Opaque {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Repr<'a> {
            function: &'a str,
        }
        Repr {
            function: &self.label,
        }
        .serialize(serializer)
    }
}

/// The data held by a typed value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Data {
    Scalar(Scalar),
    Vector(Array),
    Function(Opaque),
    Node(EntityRef),
}

impl Data {
    /// The kind this data naturally belongs to.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Scalar(_) => ValueKind::Scalar,
            Self::Vector(_) => ValueKind::Vector,
            Self::Function(_) => ValueKind::Function,
            Self::Node(_) => ValueKind::NodeRef,
        }
    }

    /// Name of the runtime representation, used in mismatch errors.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Scalar(s) => s.type_name(),
            Self::Vector(_) => "vector",
            Self::Function(_) => "function",
            Self::Node(_) => "node",
        }
    }

    #[must_use]
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        self.as_scalar().and_then(Scalar::as_f64)
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Self::Vector(a) => Some(a),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_opaque(&self) -> Option<&Opaque> {
        match self {
            Self::Function(o) => Some(o),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_node(&self) -> Option<&EntityRef> {
        match self {
            Self::Node(n) => Some(n),
            _ => None,
        }
    }
}

impl From<Scalar> for Data {
    fn from(v: Scalar) -> Self {
        Self::Scalar(v)
    }
}

impl From<bool> for Data {
    fn from(v: bool) -> Self {
        Self::Scalar(v.into())
    }
}

impl From<i64> for Data {
    fn from(v: i64) -> Self {
        Self::Scalar(v.into())
    }
}

impl From<i32> for Data {
    fn from(v: i32) -> Self {
        Self::Scalar(v.into())
    }
}

impl From<f64> for Data {
    fn from(v: f64) -> Self {
        Self::Scalar(v.into())
    }
}

impl From<&str> for Data {
    fn from(v: &str) -> Self {
        Self::Scalar(v.into())
    }
}

impl From<String> for Data {
    fn from(v: String) -> Self {
        Self::Scalar(v.into())
    }
}

impl From<Array> for Data {
    fn from(v: Array) -> Self {
        Self::Vector(v)
    }
}

impl From<Opaque> for Data {
    fn from(v: Opaque) -> Self {
        Self::Function(v)
    }
}

impl From<EntityRef> for Data {
    fn from(v: EntityRef) -> Self {
        Self::Node(v)
    }
}
