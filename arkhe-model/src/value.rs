use serde::Serialize;

use crate::{Array, Data, EntityRef, ModelError, ModelResult, Opaque, Scalar, Shape, ValueKind};

/// A value tagged with a declared kind and shape, validated on every write.
///
/// `kind` and `shape` are fixed at construction. `data` may be replaced
/// through [`TypedValue::set`], which either swaps in the new data or
/// rejects it and keeps the old.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypedValue {
    kind: ValueKind,
    shape: Shape,
    data: Data,
}

impl TypedValue {
    /// Validates `data` against `(kind, shape)` and builds the value.
    ///
    /// For `Function` and `NodeRef` the shape is ignored and stored empty.
    pub fn new(kind: ValueKind, shape: impl Into<Shape>, data: impl Into<Data>) -> ModelResult<Self> {
        // Scalars keep the declared shape so a non-empty one is reported.
        let shape = match kind {
            ValueKind::Scalar | ValueKind::Vector => shape.into(),
            ValueKind::Function | ValueKind::NodeRef => Shape::scalar(),
        };
        let data = data.into();
        validate(kind, &shape, &data)?;
        Ok(Self { kind, shape, data })
    }

    /// A scalar value. Always valid.
    pub fn scalar(value: impl Into<Scalar>) -> Self {
        Self {
            kind: ValueKind::Scalar,
            shape: Shape::scalar(),
            data: Data::Scalar(value.into()),
        }
    }

    /// A vector value whose declared shape is the array's own shape.
    pub fn vector(array: Array) -> ModelResult<Self> {
        let shape = array.shape().clone();
        Self::new(ValueKind::Vector, shape, array)
    }

    /// A function value wrapping an opaque payload.
    pub fn function(value: Opaque) -> Self {
        Self {
            kind: ValueKind::Function,
            shape: Shape::scalar(),
            data: Data::Function(value),
        }
    }

    /// A node reference embedding another entity.
    pub fn node(entity: EntityRef) -> Self {
        Self {
            kind: ValueKind::NodeRef,
            shape: Shape::scalar(),
            data: Data::Node(entity),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[must_use]
    pub fn get(&self) -> &Data {
        &self.data
    }

    /// Replaces the data after re-validating it against the stored kind and
    /// shape. On failure the previous data is left untouched.
    pub fn set(&mut self, data: impl Into<Data>) -> ModelResult<()> {
        let data = data.into();
        validate(self.kind, &self.shape, &data)?;
        self.data = data;
        Ok(())
    }

    #[must_use]
    pub fn into_data(self) -> Data {
        self.data
    }

    /// Reads a numeric scalar as `f64`.
    pub fn as_f64(&self) -> ModelResult<f64> {
        self.data.as_f64().ok_or_else(|| ModelError::TypeMismatch {
            expected: "numeric scalar".to_string(),
            found: self.data.type_name().to_string(),
        })
    }
}

fn validate(kind: ValueKind, shape: &Shape, data: &Data) -> ModelResult<()> {
    if data.kind() != kind {
        return Err(ModelError::TypeMismatch {
            expected: kind.to_string(),
            found: data.type_name().to_string(),
        });
    }

    match (kind, data) {
        (ValueKind::Scalar, Data::Scalar(_)) => {
            if !shape.is_empty() {
                return Err(ModelError::ShapeMismatch {
                    expected: Shape::scalar(),
                    found: shape.clone(),
                });
            }
            Ok(())
        }
        (ValueKind::Vector, Data::Vector(array)) => {
            if !shape.is_valid_vector_shape() {
                return Err(ModelError::InvalidShape {
                    shape: shape.clone(),
                    reason: "vector dimensions must be non-empty and positive".to_string(),
                });
            }
            if array.shape() != shape {
                return Err(ModelError::ShapeMismatch {
                    expected: shape.clone(),
                    found: array.shape().clone(),
                });
            }
            Ok(())
        }
        (ValueKind::Function, Data::Function(_)) | (ValueKind::NodeRef, Data::Node(_)) => Ok(()),
        // Unreachable after the kind check above, kept exhaustive.
        (ValueKind::Scalar | ValueKind::Vector | ValueKind::Function | ValueKind::NodeRef, _) => {
            Err(ModelError::TypeMismatch {
                expected: kind.to_string(),
                found: data.type_name().to_string(),
            })
        }
    }
}
