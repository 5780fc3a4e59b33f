use serde::{Deserialize, Serialize};
use std::fmt;

/// The shape/semantics a value may take.
///
/// Closed set: every validation site matches on it exhaustively, so adding a
/// kind is a compile-time-checked change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// A single number, flag or label. Shape is always empty.
    Scalar,
    /// A fixed-dimension array of scalars. Shape lists positive dimensions.
    Vector,
    /// An opaque callable or value. Shape is ignored.
    Function,
    /// A reference to another entity. Shape is ignored.
    NodeRef,
}

impl ValueKind {
    /// Whether values of this kind carry a meaningful shape.
    #[must_use]
    pub const fn is_shaped(self) -> bool {
        match self {
            Self::Vector => true,
            Self::Scalar | Self::Function | Self::NodeRef => false,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Vector => "vector",
            Self::Function => "function",
            Self::NodeRef => "node_ref",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dimensions of a value. Empty for scalars and for unshaped kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Shape(Vec<usize>);

impl Shape {
    /// The empty shape used by scalars, functions and node references.
    #[must_use]
    pub const fn scalar() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn new(dims: Vec<usize>) -> Self {
        Self(dims)
    }

    #[must_use]
    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    /// Number of dimensions.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of elements a value of this shape holds. The empty shape holds one.
    ///
    /// Returns `None` when the product of the dimensions overflows `usize`.
    #[must_use]
    pub fn element_count(&self) -> Option<usize> {
        self.0.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
    }

    /// True when the shape is usable as a vector declaration: at least one
    /// dimension, no zero-sized dimension, and a representable element count.
    #[must_use]
    pub fn is_valid_vector_shape(&self) -> bool {
        !self.0.is_empty() && self.0.iter().all(|&d| d > 0) && self.element_count().is_some()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, dim) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{dim}")?;
        }
        if self.0.len() == 1 {
            write!(f, ",")?;
        }
        write!(f, ")")
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self(dims.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Self(dims.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_tuple_notation() {
        assert_eq!(Shape::scalar().to_string(), "()");
        assert_eq!(Shape::from([3]).to_string(), "(3,)");
        assert_eq!(Shape::from([2, 4]).to_string(), "(2, 4)");
    }

    #[test]
    fn element_count_is_product_of_dims() {
        assert_eq!(Shape::scalar().element_count(), Some(1));
        assert_eq!(Shape::from([3]).element_count(), Some(3));
        assert_eq!(Shape::from([2, 3, 4]).element_count(), Some(24));
    }

    #[test]
    fn element_count_overflow_is_none() {
        assert_eq!(Shape::from([usize::MAX, 2]).element_count(), None);
        assert_eq!(Shape::from([usize::MAX / 2 + 1, 2]).element_count(), None);
        assert!(!Shape::from([usize::MAX, 2]).is_valid_vector_shape());
    }

    #[test]
    fn vector_shape_validity() {
        assert!(Shape::from([3]).is_valid_vector_shape());
        assert!(!Shape::scalar().is_valid_vector_shape());
        assert!(!Shape::from([3, 0]).is_valid_vector_shape());
    }

    #[test]
    fn only_vectors_are_shaped() {
        assert!(ValueKind::Vector.is_shaped());
        assert!(!ValueKind::Scalar.is_shaped());
        assert!(!ValueKind::Function.is_shaped());
        assert!(!ValueKind::NodeRef.is_shaped());
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&ValueKind::NodeRef).unwrap();
        assert_eq!(json, "\"node_ref\"");
        let parsed: ValueKind = serde_json::from_str("\"vector\"").unwrap();
        assert_eq!(parsed, ValueKind::Vector);
    }
}
