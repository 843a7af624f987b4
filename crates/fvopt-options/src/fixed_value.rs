//! Pin field values over a cell selection.

use std::rc::Rc;

use fvopt_core::{
    ConfigError, Dict, Equation, FieldValue, FvMatrix, Mesh, MeshTopoChange, OptionError,
};
use fvopt_option::{ActiveFields, ConstraintOption, FvOption};
use indexmap::IndexMap;
use log::warn;

use crate::selection::CellSelection;
use crate::value::CellValue;

/// Fixes each configured field to a constant in the selected cells.
///
/// Overwrites the matrix rows of those cells, so when several constraints
/// cover the same cell the one registered last decides its value.
pub struct FixedValueConstraint {
    name: String,
    active: ActiveFields,
    selection: CellSelection,
    values: IndexMap<String, CellValue>,
}

impl FixedValueConstraint {
    /// Type name used in configuration.
    pub const TYPE_NAME: &'static str = "fixedValueConstraint";

    /// Constrain each `(field, value)` pair over `selection`.
    pub fn new<I, S>(name: impl Into<String>, selection: CellSelection, values: I) -> Self
    where
        I: IntoIterator<Item = (S, CellValue)>,
        S: Into<String>,
    {
        let values: IndexMap<String, CellValue> =
            values.into_iter().map(|(f, v)| (f.into(), v)).collect();
        let active = ActiveFields::new().with_constrain(values.keys().cloned());
        Self {
            name: name.into(),
            active,
            selection,
            values,
        }
    }

    /// Construct from configuration:
    ///
    /// ```text
    /// inlet
    /// {
    ///     type            fixedValueConstraint;
    ///     selectionMode   cells;
    ///     cells           (0);
    ///     fieldValues     { T 350; U (0 0 0); }
    /// }
    /// ```
    pub fn from_dict(name: &str, dict: &Dict, mesh: &Rc<dyn Mesh>) -> Result<Self, ConfigError> {
        let selection = CellSelection::from_dict(dict, mesh.n_cells())?;
        let field_values = dict.sub_dict("fieldValues")?;
        let mut values = Vec::new();
        for (field, _) in field_values.iter() {
            values.push((field.to_string(), CellValue::from_dict(field_values, field)?));
        }
        if values.is_empty() {
            return Err(dict.invalid("fieldValues", "at least one field is required"));
        }
        Ok(Self::new(name, selection, values))
    }
}

fn pin<T: FieldValue>(m: &mut FvMatrix<T>, selection: &CellSelection, value: T) -> Result<(), OptionError> {
    let cells = selection.resolve(m.n_cells());
    let values = vec![value; cells.len()];
    m.set_values(&cells, &values)?;
    Ok(())
}

impl FvOption for FixedValueConstraint {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn active_fields(&self) -> &ActiveFields {
        &self.active
    }

    fn as_constraint(&mut self) -> Option<&mut dyn ConstraintOption> {
        Some(self)
    }

    fn update_mesh(&mut self, change: &MeshTopoChange) {
        self.selection.update_mesh(change);
    }
}

impl ConstraintOption for FixedValueConstraint {
    fn constrain(&mut self, eqn: Equation<'_>, field_name: &str) -> Result<(), OptionError> {
        let value = *self
            .values
            .get(field_name)
            .ok_or_else(|| OptionError::ExecutionFailed {
                reason: format!("no value configured for field '{field_name}'"),
            })?;
        match (eqn, value) {
            (Equation::Scalar(m), CellValue::Scalar(v)) => pin(m, &self.selection, v),
            (Equation::Vector(m), CellValue::Vector(v)) => pin(m, &self.selection, v),
            (Equation::Tensor(m), CellValue::Tensor(v)) => pin(m, &self.selection, v),
            (eqn, value) => {
                warn!(
                    "Option '{}': {} value configured for {} field '{}'",
                    self.name,
                    value.value_type(),
                    eqn.value_type(),
                    field_name
                );
                Err(OptionError::UnsupportedFieldType {
                    field: field_name.to_string(),
                    value_type: eqn.value_type(),
                })
            }
        }
    }
}
