//! The per-field equation accumulator [`FvMatrix`].
//!
//! A matrix holds, for every cell `i`, the linearised balance
//!
//! ```text
//! diag[i] * psi[i] = source[i]
//! ```
//!
//! with both sides volume integrated. Off-diagonal neighbour coupling
//! belongs to the discretisation and is not represented here; the
//! discretisation owns its own operator and adds a source matrix into it.
//!
//! A volumetric source term `S(psi) = Su + Sp * psi` contributes
//! `source += Su * V` and `diag -= Sp * V`, so a matrix built only from
//! source terms can be added directly to a transport equation assembled
//! in the same sign convention.

use crate::dimensions::Dimensions;
use crate::error::DimensionError;
use crate::field::VolField;
use crate::value::{FieldValue, Tensor, Vector};

/// Linearised algebraic form of one field's equation.
#[derive(Clone, Debug, PartialEq)]
pub struct FvMatrix<T> {
    field_name: String,
    psi_dimensions: Dimensions,
    dimensions: Dimensions,
    psi: Vec<T>,
    volumes: Vec<f64>,
    diag: Vec<f64>,
    source: Vec<T>,
}

impl<T: FieldValue> FvMatrix<T> {
    /// Create a zero matrix for `psi` on cells with the given volumes.
    ///
    /// `dimensions` are the dimensions of a volume-integrated term of the
    /// equation, e.g. `[K m^3 s^-1]` for `ddt(T)`.
    ///
    /// # Errors
    ///
    /// Returns [`DimensionError::SizeMismatch`] if `psi` and `volumes`
    /// disagree on the cell count (the field is not defined on this mesh).
    pub fn new(
        psi: &VolField<T>,
        volumes: &[f64],
        dimensions: Dimensions,
    ) -> Result<Self, DimensionError> {
        if psi.len() != volumes.len() {
            return Err(DimensionError::SizeMismatch {
                operation: "matrix construction",
                expected: volumes.len(),
                found: psi.len(),
            });
        }
        let n = volumes.len();
        Ok(Self {
            field_name: psi.name().to_string(),
            psi_dimensions: psi.dimensions(),
            dimensions,
            psi: psi.values().to_vec(),
            volumes: volumes.to_vec(),
            diag: vec![0.0; n],
            source: vec![T::ZERO; n],
        })
    }

    /// A zero matrix for the same field, cells and dimensions.
    pub fn zeroed(&self) -> Self {
        let n = self.volumes.len();
        Self {
            field_name: self.field_name.clone(),
            psi_dimensions: self.psi_dimensions,
            dimensions: self.dimensions,
            psi: self.psi.clone(),
            volumes: self.volumes.clone(),
            diag: vec![0.0; n],
            source: vec![T::ZERO; n],
        }
    }

    /// Name of the field this equation solves for.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Dimensions of a volume-integrated term.
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Dimensions of a volumetric (per unit volume) explicit source.
    pub fn source_dimensions(&self) -> Dimensions {
        self.dimensions / Dimensions::VOLUME
    }

    /// Dimensions of a volumetric implicit coefficient.
    pub fn implicit_dimensions(&self) -> Dimensions {
        self.source_dimensions() / self.psi_dimensions
    }

    /// Dimensions of the solved field.
    pub fn psi_dimensions(&self) -> Dimensions {
        self.psi_dimensions
    }

    /// Field values at assembly time (the current iterate).
    pub fn psi(&self) -> &[T] {
        &self.psi
    }

    /// Cell volumes.
    pub fn volumes(&self) -> &[f64] {
        &self.volumes
    }

    /// Diagonal coefficients.
    pub fn diag(&self) -> &[f64] {
        &self.diag
    }

    /// Mutable diagonal coefficients, for discretisation code.
    pub fn diag_mut(&mut self) -> &mut [f64] {
        &mut self.diag
    }

    /// Right-hand side.
    pub fn source(&self) -> &[T] {
        &self.source
    }

    /// Mutable right-hand side, for discretisation code.
    pub fn source_mut(&mut self) -> &mut [T] {
        &mut self.source
    }

    /// Number of cells.
    pub fn n_cells(&self) -> usize {
        self.volumes.len()
    }

    /// Add an explicit volumetric source `su`.
    ///
    /// # Errors
    ///
    /// Fails if `su` does not have [`source_dimensions`](Self::source_dimensions)
    /// or a different cell count.
    pub fn add_explicit(&mut self, su: &VolField<T>) -> Result<(), DimensionError> {
        self.check_size("explicit source", su.len())?;
        check_dims("explicit source", self.source_dimensions(), su.dimensions())?;
        for ((s, &v), &vol) in self.source.iter_mut().zip(su.values()).zip(&self.volumes) {
            *s += v * vol;
        }
        Ok(())
    }

    /// Add an implicit volumetric source `sp * psi`.
    ///
    /// # Errors
    ///
    /// Fails if `sp` does not have
    /// [`implicit_dimensions`](Self::implicit_dimensions) or a different
    /// cell count.
    pub fn add_implicit(&mut self, sp: &VolField<f64>) -> Result<(), DimensionError> {
        self.check_size("implicit source", sp.len())?;
        check_dims("implicit source", self.implicit_dimensions(), sp.dimensions())?;
        for ((d, &v), &vol) in self.diag.iter_mut().zip(sp.values()).zip(&self.volumes) {
            *d -= v * vol;
        }
        Ok(())
    }

    /// Superpose another matrix for the same field.
    ///
    /// # Errors
    ///
    /// Fails if the matrices differ in dimensions or cell count.
    pub fn add_matrix(&mut self, other: &FvMatrix<T>) -> Result<(), DimensionError> {
        self.check_size("matrix sum", other.n_cells())?;
        check_dims("matrix sum", self.dimensions, other.dimensions)?;
        for (d, &o) in self.diag.iter_mut().zip(&other.diag) {
            *d += o;
        }
        for (s, &o) in self.source.iter_mut().zip(&other.source) {
            *s += o;
        }
        Ok(())
    }

    /// Pin `psi` to `values` in `cells`.
    ///
    /// Overwrites the row: the cell's right-hand side becomes
    /// `value * diag`, so a later call for the same cell replaces an
    /// earlier one. A row with no diagonal yet is given the cell volume.
    ///
    /// # Errors
    ///
    /// Fails if `cells` and `values` differ in length or a cell index is
    /// out of range.
    pub fn set_values(&mut self, cells: &[usize], values: &[T]) -> Result<(), DimensionError> {
        if cells.len() != values.len() {
            return Err(DimensionError::SizeMismatch {
                operation: "set values",
                expected: cells.len(),
                found: values.len(),
            });
        }
        for (&cell, &value) in cells.iter().zip(values) {
            if cell >= self.n_cells() {
                return Err(DimensionError::SizeMismatch {
                    operation: "set values",
                    expected: self.n_cells(),
                    found: cell + 1,
                });
            }
            if self.diag[cell] == 0.0 {
                self.diag[cell] = self.volumes[cell];
            }
            self.psi[cell] = value;
            self.source[cell] = value * self.diag[cell];
        }
        Ok(())
    }

    fn check_size(&self, operation: &'static str, found: usize) -> Result<(), DimensionError> {
        if found != self.n_cells() {
            return Err(DimensionError::SizeMismatch {
                operation,
                expected: self.n_cells(),
                found,
            });
        }
        Ok(())
    }
}

fn check_dims(
    operation: &'static str,
    expected: Dimensions,
    found: Dimensions,
) -> Result<(), DimensionError> {
    if expected != found {
        return Err(DimensionError::Mismatch {
            operation,
            expected,
            found,
        });
    }
    Ok(())
}

/// A mutable matrix tagged with its value type.
pub enum Equation<'a> {
    /// Scalar equation.
    Scalar(&'a mut FvMatrix<f64>),
    /// Vector equation.
    Vector(&'a mut FvMatrix<Vector>),
    /// Tensor equation.
    Tensor(&'a mut FvMatrix<Tensor>),
}

impl Equation<'_> {
    /// Name of the field the wrapped equation solves for.
    pub fn field_name(&self) -> &str {
        match self {
            Self::Scalar(m) => m.field_name(),
            Self::Vector(m) => m.field_name(),
            Self::Tensor(m) => m.field_name(),
        }
    }

    /// Value type name of the wrapped equation.
    pub fn value_type(&self) -> &'static str {
        match self {
            Self::Scalar(_) => f64::TYPE_NAME,
            Self::Vector(_) => Vector::TYPE_NAME,
            Self::Tensor(_) => Tensor::TYPE_NAME,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Equation for T in [K m^3 s^-1].
    fn t_rate() -> Dimensions {
        Dimensions::TEMPERATURE * Dimensions::VOLUME / Dimensions::TIME
    }

    fn t_field(values: Vec<f64>) -> VolField<f64> {
        VolField::new("T", Dimensions::TEMPERATURE, values)
    }

    #[test]
    fn new_rejects_field_from_other_mesh() {
        let err = FvMatrix::new(&t_field(vec![1.0; 3]), &[1.0; 2], t_rate());
        assert!(matches!(err, Err(DimensionError::SizeMismatch { .. })));
    }

    #[test]
    fn explicit_source_is_volume_integrated() {
        let mut m = FvMatrix::new(&t_field(vec![0.0; 2]), &[2.0, 0.5], t_rate()).unwrap();
        let su = VolField::new("su", m.source_dimensions(), vec![3.0, 4.0]);
        m.add_explicit(&su).unwrap();
        assert_eq!(m.source(), &[6.0, 2.0]);
        assert_eq!(m.diag(), &[0.0, 0.0]);
    }

    #[test]
    fn implicit_source_subtracts_from_diagonal() {
        let mut m = FvMatrix::new(&t_field(vec![0.0; 2]), &[2.0, 1.0], t_rate()).unwrap();
        let sp = VolField::new("sp", m.implicit_dimensions(), vec![-1.5, 0.5]);
        m.add_implicit(&sp).unwrap();
        assert_eq!(m.diag(), &[3.0, -0.5]);
    }

    #[test]
    fn explicit_source_with_wrong_dimensions_rejected() {
        let mut m = FvMatrix::new(&t_field(vec![0.0; 1]), &[1.0], t_rate()).unwrap();
        let su = VolField::new("su", Dimensions::POWER, vec![1.0]);
        match m.add_explicit(&su) {
            Err(DimensionError::Mismatch {
                expected, found, ..
            }) => {
                assert_eq!(expected, Dimensions::TEMPERATURE / Dimensions::TIME);
                assert_eq!(found, Dimensions::POWER);
            }
            other => panic!("expected Mismatch, got {other:?}"),
        }
    }

    #[test]
    fn matrix_sum_checks_dimensions() {
        let a = FvMatrix::new(&t_field(vec![0.0; 1]), &[1.0], t_rate()).unwrap();
        let b = FvMatrix::new(&t_field(vec![0.0; 1]), &[1.0], Dimensions::POWER).unwrap();
        let mut sum = a.zeroed();
        assert!(sum.add_matrix(&a).is_ok());
        assert!(matches!(
            sum.add_matrix(&b),
            Err(DimensionError::Mismatch { .. })
        ));
    }

    #[test]
    fn set_values_overwrites_row() {
        let mut m = FvMatrix::new(&t_field(vec![0.0; 3]), &[1.0, 2.0, 1.0], t_rate()).unwrap();
        m.diag_mut()[0] = 4.0;
        m.set_values(&[0, 1], &[10.0, 20.0]).unwrap();
        assert_eq!(m.diag(), &[4.0, 2.0, 0.0]);
        assert_eq!(m.source(), &[40.0, 40.0, 0.0]);
        assert_eq!(m.psi(), &[10.0, 20.0, 0.0]);

        m.set_values(&[1], &[5.0]).unwrap();
        assert_eq!(m.source()[1], 10.0);
        assert!(m.set_values(&[3], &[1.0]).is_err());
    }

    #[test]
    fn vector_equation_tagging() {
        let u = VolField::<Vector>::zeros("U", Dimensions::VELOCITY, 2);
        let mut m = FvMatrix::new(&u, &[1.0, 1.0], Dimensions::VELOCITY).unwrap();
        let tagged = Vector::equation(&mut m);
        assert_eq!(tagged.field_name(), "U");
        assert_eq!(tagged.value_type(), "vector");
    }
}
