//! Clip a scalar field to a range after it has been solved.

use std::rc::Rc;

use fvopt_core::{ConfigError, Dict, FieldMut, Mesh, MeshTopoChange, OptionError};
use fvopt_option::{ActiveFields, CorrectionOption, FvOption};
use log::{debug, warn};

use crate::selection::CellSelection;

/// Limits a scalar field (by default `T`) to `[min, max]` in the selected
/// cells.
#[derive(Debug)]
pub struct LimitScalar {
    name: String,
    active: ActiveFields,
    selection: CellSelection,
    min: f64,
    max: f64,
}

/// Builder for [`LimitScalar`].
///
/// Required: `min` and `max`. Defaults: field `T`, all cells.
pub struct LimitScalarBuilder {
    name: String,
    field: String,
    selection: CellSelection,
    min: Option<f64>,
    max: Option<f64>,
}

impl LimitScalar {
    /// Type name used in configuration.
    pub const TYPE_NAME: &'static str = "limitScalar";

    /// Start building a limiter called `name`.
    pub fn builder(name: impl Into<String>) -> LimitScalarBuilder {
        LimitScalarBuilder {
            name: name.into(),
            field: "T".to_string(),
            selection: CellSelection::All,
            min: None,
            max: None,
        }
    }

    /// Construct from configuration (`field`, `min`, `max` and a selection).
    pub fn from_dict(name: &str, dict: &Dict, mesh: &Rc<dyn Mesh>) -> Result<Self, ConfigError> {
        Self::builder(name)
            .field(dict.word_or("field", "T")?)
            .selection(CellSelection::from_dict(dict, mesh.n_cells())?)
            .min(dict.get_scalar("min")?)
            .max(dict.get_scalar("max")?)
            .build()
            .map_err(|reason| dict.invalid("min", reason))
    }

    /// Lower limit.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper limit.
    pub fn max(&self) -> f64 {
        self.max
    }
}

impl LimitScalarBuilder {
    /// Set the limited field (default `T`).
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    /// Set the cell selection.
    pub fn selection(mut self, selection: CellSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Set the lower limit.
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Set the upper limit.
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Build the limiter, validating all configuration.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a limit is missing or not finite, or if
    /// `min > max`.
    pub fn build(self) -> Result<LimitScalar, String> {
        let min = self.min.ok_or_else(|| "min is required".to_string())?;
        let max = self.max.ok_or_else(|| "max is required".to_string())?;
        if !min.is_finite() || !max.is_finite() {
            return Err(format!("limits must be finite, got [{min}, {max}]"));
        }
        if min > max {
            return Err(format!("min ({min}) must be <= max ({max})"));
        }
        Ok(LimitScalar {
            name: self.name,
            active: ActiveFields::new().with_correct([self.field]),
            selection: self.selection,
            min,
            max,
        })
    }
}

impl FvOption for LimitScalar {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn active_fields(&self) -> &ActiveFields {
        &self.active
    }

    fn as_correction(&mut self) -> Option<&mut dyn CorrectionOption> {
        Some(self)
    }

    fn update_mesh(&mut self, change: &MeshTopoChange) {
        self.selection.update_mesh(change);
    }
}

impl CorrectionOption for LimitScalar {
    fn correct(&mut self, field: FieldMut<'_>) -> Result<(), OptionError> {
        let f = match field {
            FieldMut::Scalar(f) => f,
            other => {
                warn!(
                    "Option '{}' cannot limit {} field '{}'",
                    self.name,
                    other.value_type(),
                    other.name()
                );
                return Err(OptionError::UnsupportedFieldType {
                    field: other.name().to_string(),
                    value_type: other.value_type(),
                });
            }
        };
        let cells = self.selection.resolve(f.len());
        let values = f.values_mut();
        let mut clipped = 0usize;
        for c in cells {
            let v = values[c].clamp(self.min, self.max);
            if v != values[c] {
                clipped += 1;
                values[c] = v;
            }
        }
        debug!("Option '{}' clipped {clipped} cell(s)", self.name);
        Ok(())
    }
}
