//! Reusable option fixtures.
//!
//! - [`ConstSource`]: uniform explicit and implicit scalar source.
//! - [`FailingSource`]: fails deterministically after N calls.
//! - [`PinConstraint`]: fixes one cell of an equation to a value.
//! - [`ClampCorrection`]: clips a scalar field after the solve.

use std::cell::Cell;
use std::rc::Rc;

use fvopt_core::{Dimensions, Equation, FieldMut, FvMatrix, OptionError, VolField, Weights};
use fvopt_option::{ActiveFields, ConstraintOption, CorrectionOption, FvOption, SourceOption};

fn scalar<'a>(
    eqn: Equation<'a>,
    field_name: &str,
) -> Result<&'a mut FvMatrix<f64>, OptionError> {
    match eqn {
        Equation::Scalar(m) => Ok(m),
        other => Err(OptionError::UnsupportedFieldType {
            field: field_name.to_string(),
            value_type: other.value_type(),
        }),
    }
}

/// Adds `su + sp * psi` per unit volume, scaled by the weights.
pub struct ConstSource {
    pub name: String,
    fields: ActiveFields,
    pub su: f64,
    pub sp: f64,
    /// Overrides the explicit source dimensions (to provoke mismatches).
    pub su_dimensions: Option<Dimensions>,
    calls: Rc<Cell<usize>>,
}

impl ConstSource {
    pub fn new(name: impl Into<String>, field: &str, su: f64, sp: f64) -> Self {
        Self {
            name: name.into(),
            fields: ActiveFields::new().with_add_sup([field]),
            su,
            sp,
            su_dimensions: None,
            calls: Rc::new(Cell::new(0)),
        }
    }

    /// Shared counter of `add_sup` calls.
    pub fn calls(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.calls)
    }
}

impl FvOption for ConstSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &str {
        "constSource"
    }

    fn active_fields(&self) -> &ActiveFields {
        &self.fields
    }

    fn as_source(&mut self) -> Option<&mut dyn SourceOption> {
        Some(self)
    }
}

impl SourceOption for ConstSource {
    fn add_sup(
        &mut self,
        eqn: Equation<'_>,
        weights: &Weights<'_>,
        field_name: &str,
    ) -> Result<(), OptionError> {
        self.calls.set(self.calls.get() + 1);
        let m = scalar(eqn, field_name)?;
        let n = m.n_cells();
        let su: Vec<f64> = (0..n).map(|i| self.su * weights.at(i)).collect();
        let sp: Vec<f64> = (0..n).map(|i| self.sp * weights.at(i)).collect();
        let su_dims = self.su_dimensions.unwrap_or_else(|| m.source_dimensions());
        m.add_explicit(&VolField::new("su", su_dims, su))?;
        m.add_implicit(&VolField::new("sp", m.implicit_dimensions(), sp))?;
        Ok(())
    }
}

/// A source that succeeds `fail_after` times, then fails every call.
pub struct FailingSource {
    pub name: String,
    fields: ActiveFields,
    fail_after: usize,
    calls: usize,
}

impl FailingSource {
    pub fn new(name: impl Into<String>, field: &str, fail_after: usize) -> Self {
        Self {
            name: name.into(),
            fields: ActiveFields::new().with_add_sup([field]),
            fail_after,
            calls: 0,
        }
    }
}

impl FvOption for FailingSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &str {
        "failingSource"
    }

    fn active_fields(&self) -> &ActiveFields {
        &self.fields
    }

    fn as_source(&mut self) -> Option<&mut dyn SourceOption> {
        Some(self)
    }
}

impl SourceOption for FailingSource {
    fn add_sup(
        &mut self,
        _eqn: Equation<'_>,
        _weights: &Weights<'_>,
        _field_name: &str,
    ) -> Result<(), OptionError> {
        self.calls += 1;
        if self.calls > self.fail_after {
            return Err(OptionError::ExecutionFailed {
                reason: format!("failed after {} calls", self.fail_after),
            });
        }
        Ok(())
    }
}

/// Fixes `cells` of the equation to `value`.
pub struct PinConstraint {
    pub name: String,
    fields: ActiveFields,
    pub cells: Vec<usize>,
    pub value: f64,
}

impl PinConstraint {
    pub fn new(name: impl Into<String>, field: &str, cells: Vec<usize>, value: f64) -> Self {
        Self {
            name: name.into(),
            fields: ActiveFields::new().with_constrain([field]),
            cells,
            value,
        }
    }
}

impl FvOption for PinConstraint {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &str {
        "pinConstraint"
    }

    fn active_fields(&self) -> &ActiveFields {
        &self.fields
    }

    fn as_constraint(&mut self) -> Option<&mut dyn ConstraintOption> {
        Some(self)
    }
}

impl ConstraintOption for PinConstraint {
    fn constrain(&mut self, eqn: Equation<'_>, field_name: &str) -> Result<(), OptionError> {
        let m = scalar(eqn, field_name)?;
        let values = vec![self.value; self.cells.len()];
        m.set_values(&self.cells, &values)?;
        Ok(())
    }
}

/// Clips a scalar field to `[min, max]`.
pub struct ClampCorrection {
    pub name: String,
    fields: ActiveFields,
    pub min: f64,
    pub max: f64,
}

impl ClampCorrection {
    pub fn new(name: impl Into<String>, field: &str, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            fields: ActiveFields::new().with_correct([field]),
            min,
            max,
        }
    }
}

impl FvOption for ClampCorrection {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &str {
        "clampCorrection"
    }

    fn active_fields(&self) -> &ActiveFields {
        &self.fields
    }

    fn as_correction(&mut self) -> Option<&mut dyn CorrectionOption> {
        Some(self)
    }
}

impl CorrectionOption for ClampCorrection {
    fn correct(&mut self, field: FieldMut<'_>) -> Result<(), OptionError> {
        match field {
            FieldMut::Scalar(f) => {
                for v in f.values_mut() {
                    *v = v.clamp(self.min, self.max);
                }
                Ok(())
            }
            other => Err(OptionError::UnsupportedFieldType {
                field: other.name().to_string(),
                value_type: other.value_type(),
            }),
        }
    }
}
