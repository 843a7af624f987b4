//! Cell-centred fields, multiplicative weights and the [`UnitField`] sentinel.

use crate::dimensions::Dimensions;
use crate::error::DimensionError;
use crate::value::{FieldValue, Tensor, Vector};

/// A named, dimensioned field with one value per mesh cell.
#[derive(Clone, Debug, PartialEq)]
pub struct VolField<T> {
    name: String,
    dimensions: Dimensions,
    values: Vec<T>,
}

impl<T: FieldValue> VolField<T> {
    /// Create a field from per-cell values.
    pub fn new(name: impl Into<String>, dimensions: Dimensions, values: Vec<T>) -> Self {
        Self {
            name: name.into(),
            dimensions,
            values,
        }
    }

    /// Create a field holding `value` in each of `n_cells` cells.
    pub fn uniform(
        name: impl Into<String>,
        dimensions: Dimensions,
        value: T,
        n_cells: usize,
    ) -> Self {
        Self::new(name, dimensions, vec![value; n_cells])
    }

    /// Create a zero field.
    pub fn zeros(name: impl Into<String>, dimensions: Dimensions, n_cells: usize) -> Self {
        Self::uniform(name, dimensions, T::ZERO, n_cells)
    }

    /// Field name, used to route the field to contributors.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Physical dimensions of the values.
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Per-cell values.
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Mutable per-cell values.
    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the field has no cells.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replace all values, keeping name and dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`DimensionError::SizeMismatch`] if `values` has a different
    /// cell count.
    pub fn assign(&mut self, values: &[T]) -> Result<(), DimensionError> {
        if values.len() != self.values.len() {
            return Err(DimensionError::SizeMismatch {
                operation: "assign",
                expected: self.values.len(),
                found: values.len(),
            });
        }
        self.values.copy_from_slice(values);
        Ok(())
    }

    /// Replace the cell list, e.g. after a mesh topology change.
    pub fn resize(&mut self, n_cells: usize, fill: T) {
        self.values.resize(n_cells, fill);
    }
}

/// A per-cell multiplicative factor such as density or phase fraction.
///
/// Implemented by scalar fields and by [`UnitField`]. Source dispatch
/// always receives an `alpha` and a `rho`; callers without one pass the
/// sentinel and no code path branches on its presence.
pub trait Weight {
    /// Physical dimensions of the factor.
    fn dimensions(&self) -> Dimensions;

    /// Value in `cell`.
    fn at(&self, cell: usize) -> f64;

    /// Number of cells covered, or `None` if the factor is defined
    /// everywhere.
    fn len(&self) -> Option<usize>;

    /// Whether the factor is identically one.
    fn is_unit(&self) -> bool {
        false
    }
}

impl Weight for VolField<f64> {
    fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    fn at(&self, cell: usize) -> f64 {
        self.values[cell]
    }

    fn len(&self) -> Option<usize> {
        Some(self.values.len())
    }
}

/// A dimensionless field that is 1 in every cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UnitField;

impl Weight for UnitField {
    fn dimensions(&self) -> Dimensions {
        Dimensions::NONE
    }

    fn at(&self, _cell: usize) -> f64 {
        1.0
    }

    fn len(&self) -> Option<usize> {
        None
    }

    fn is_unit(&self) -> bool {
        true
    }
}

/// The phase-fraction and density factors of one equation.
#[derive(Clone, Copy)]
pub struct Weights<'a> {
    /// Phase fraction.
    pub alpha: &'a dyn Weight,
    /// Density.
    pub rho: &'a dyn Weight,
}

impl<'a> Weights<'a> {
    /// Weights for a phase equation.
    pub fn new(alpha: &'a dyn Weight, rho: &'a dyn Weight) -> Self {
        Self { alpha, rho }
    }

    /// Both factors set to [`UnitField`].
    pub fn unit() -> Weights<'static> {
        Weights {
            alpha: &UnitField,
            rho: &UnitField,
        }
    }

    /// Combined dimensions `alpha * rho`.
    pub fn dimensions(&self) -> Dimensions {
        self.alpha.dimensions() * self.rho.dimensions()
    }

    /// Combined factor `alpha * rho` in `cell`.
    pub fn at(&self, cell: usize) -> f64 {
        self.alpha.at(cell) * self.rho.at(cell)
    }

    /// Whether both factors are identically one.
    pub fn is_unit(&self) -> bool {
        self.alpha.is_unit() && self.rho.is_unit()
    }
}

/// A mutable field tagged with its value type.
pub enum FieldMut<'a> {
    /// Scalar field.
    Scalar(&'a mut VolField<f64>),
    /// Vector field.
    Vector(&'a mut VolField<Vector>),
    /// Tensor field.
    Tensor(&'a mut VolField<Tensor>),
}

impl FieldMut<'_> {
    /// Name of the wrapped field.
    pub fn name(&self) -> &str {
        match self {
            Self::Scalar(f) => f.name(),
            Self::Vector(f) => f.name(),
            Self::Tensor(f) => f.name(),
        }
    }

    /// Value type name of the wrapped field.
    pub fn value_type(&self) -> &'static str {
        match self {
            Self::Scalar(_) => f64::TYPE_NAME,
            Self::Vector(_) => Vector::TYPE_NAME,
            Self::Tensor(_) => Tensor::TYPE_NAME,
        }
    }
}
