//! Typed arrays produced from accessors.
//!
//! Every component read from the binary payload is widened into a [`Scalar`]:
//! integer component types become `Scalar::Int`, `FLOAT` becomes
//! `Scalar::Float`. A [`DecodedArray`] stores the components flattened, so
//! an accessor of `count` elements with arity `n` holds `count * n` scalars.

use std::slice::{ChunksExact, ChunksExactMut};

use num_traits::{NumCast, ToPrimitive};
use serde::Serialize;
use serde_json::Value;

use crate::data_types::{ComponentType, ElementType};

/// A single decoded component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
}

impl Scalar {
    pub fn as_f64(self) -> f64 {
        match self {
            Scalar::Int(v) => v as f64,
            Scalar::Float(v) => v,
        }
    }

    pub fn is_integral(self) -> bool {
        matches!(self, Scalar::Int(_))
    }

    /// Adds `offset` while keeping the variant.
    pub fn offset_by(self, offset: i64) -> Scalar {
        match self {
            Scalar::Int(v) => Scalar::Int(v + offset),
            Scalar::Float(v) => Scalar::Float(v + offset as f64),
        }
    }

    pub fn to_json(self) -> Value {
        match self {
            Scalar::Int(v) => Value::from(v),
            // Non-finite floats have no JSON form.
            Scalar::Float(v) => serde_json::Number::from_f64(v)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        }
    }
}

impl ToPrimitive for Scalar {
    fn to_i64(&self) -> Option<i64> {
        match *self {
            Scalar::Int(v) => Some(v),
            Scalar::Float(v) => v.to_i64(),
        }
    }

    fn to_u64(&self) -> Option<u64> {
        match *self {
            Scalar::Int(v) => v.to_u64(),
            Scalar::Float(v) => v.to_u64(),
        }
    }

    fn to_f64(&self) -> Option<f64> {
        Some(self.as_f64())
    }
}

/// One accessor's worth of decoded components.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedArray {
    component_type: ComponentType,
    element_type: ElementType,
    values: Vec<Scalar>,
}

impl DecodedArray {
    /// Wraps already flattened components.
    ///
    /// `values.len()` must be a multiple of the element arity.
    pub fn new(component_type: ComponentType, element_type: ElementType, values: Vec<Scalar>) -> Self {
        debug_assert_eq!(values.len() % element_type.arity(), 0);
        Self {
            component_type,
            element_type,
            values,
        }
    }

    /// Placeholder for accessors without a buffer view.
    pub fn empty(component_type: ComponentType, element_type: ElementType) -> Self {
        Self::new(component_type, element_type, Vec::new())
    }

    pub fn component_type(&self) -> ComponentType {
        self.component_type
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub fn arity(&self) -> usize {
        self.element_type.arity()
    }

    /// Number of elements (not components).
    pub fn len(&self) -> usize {
        self.values.len() / self.arity()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Flattened components.
    pub fn values(&self) -> &[Scalar] {
        &self.values
    }

    pub fn element(&self, index: usize) -> Option<&[Scalar]> {
        let arity = self.arity();
        let start = index.checked_mul(arity)?;
        self.values.get(start..start.checked_add(arity)?)
    }

    pub fn elements(&self) -> ChunksExact<'_, Scalar> {
        self.values.chunks_exact(self.arity())
    }

    pub fn elements_mut(&mut self) -> ChunksExactMut<'_, Scalar> {
        let arity = self.arity();
        self.values.chunks_exact_mut(arity)
    }

    /// Casts every component to `T`, failing if any value does not fit.
    pub fn cast<T: NumCast>(&self) -> Option<Vec<T>> {
        self.values.iter().map(|v| T::from(*v)).collect()
    }

    /// JSON rendering used by document comparison: scalars as a flat list,
    /// everything else as a list of component lists.
    pub fn to_json_value(&self) -> Value {
        if self.arity() == 1 {
            Value::Array(self.values.iter().map(|v| v.to_json()).collect())
        } else {
            Value::Array(
                self.elements()
                    .map(|e| Value::Array(e.iter().map(|v| v.to_json()).collect()))
                    .collect(),
            )
        }
    }
}
