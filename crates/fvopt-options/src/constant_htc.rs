//! Coupling with a constant heat-transfer coefficient.

use std::rc::Rc;

use fvopt_core::{ConfigError, Dict, Dimensions, Entry, Mesh, OptionError};

use crate::coupling::{CouplingModel, CouplingSettings, HeatTransferCoefficient};
use crate::hub::CouplingHub;

/// Area per unit volume of the interface: uniform or per cell.
#[derive(Clone, Debug, PartialEq)]
pub enum AreaPerVolume {
    /// Same value in every cell.
    Uniform(f64),
    /// One value per cell.
    PerCell(Vec<f64>),
}

/// `htc = h * AoV`, with both factors fixed at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstantHeatTransfer {
    h: f64,
    h_dimensions: Dimensions,
    aov: AreaPerVolume,
    aov_dimensions: Dimensions,
}

impl ConstantHeatTransfer {
    /// Type name used in configuration.
    pub const TYPE_NAME: &'static str = "constantHeatTransfer";

    /// Default dimensions of `h`: `[kg s^-3 K^-1]` (W m^-2 K^-1).
    pub const H_DIMENSIONS: Dimensions = Dimensions::new(1, 0, -3, -1, 0, 0, 0);

    /// Default dimensions of `AoV`: `[m^-1]`.
    pub const AOV_DIMENSIONS: Dimensions = Dimensions::new(0, -1, 0, 0, 0, 0, 0);

    /// A closure with explicit dimensions for both factors.
    pub fn new(
        h: f64,
        h_dimensions: Dimensions,
        aov: AreaPerVolume,
        aov_dimensions: Dimensions,
    ) -> Self {
        Self {
            h,
            h_dimensions,
            aov,
            aov_dimensions,
        }
    }

    /// Read `h` and `AoV` (scalar, dimensioned scalar or per-cell list).
    pub fn closure_from_dict(dict: &Dict, n_cells: usize) -> Result<Self, ConfigError> {
        let (h_dimensions, h) = dict.get_dimensioned("h", Self::H_DIMENSIONS)?;
        if !h.is_finite() || h < 0.0 {
            return Err(dict.invalid("h", format!("must be finite and non-negative, got {h}")));
        }
        let (aov_dimensions, aov) = match dict.lookup("AoV")? {
            Entry::List(values) => {
                if values.len() != n_cells {
                    return Err(dict.invalid(
                        "AoV",
                        format!("{} values for {n_cells} cells", values.len()),
                    ));
                }
                (Self::AOV_DIMENSIONS, AreaPerVolume::PerCell(values.clone()))
            }
            _ => {
                let (dims, v) = dict.get_dimensioned("AoV", Self::AOV_DIMENSIONS)?;
                (dims, AreaPerVolume::Uniform(v))
            }
        };
        Ok(Self::new(h, h_dimensions, aov, aov_dimensions))
    }

    /// Build the full coupling model from an option dictionary.
    pub fn from_dict(
        name: &str,
        dict: &Dict,
        mesh: &Rc<dyn Mesh>,
        hub: &Rc<CouplingHub>,
    ) -> Result<CouplingModel, ConfigError> {
        let settings = CouplingSettings::from_dict(dict)?;
        let closure = Self::closure_from_dict(dict, mesh.n_cells())?;
        CouplingModel::new(name, Rc::clone(mesh), hub, settings, Box::new(closure))
    }
}

impl HeatTransferCoefficient for ConstantHeatTransfer {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn dimensions(&self) -> Dimensions {
        self.h_dimensions * self.aov_dimensions
    }

    fn correct_htc(&mut self, mesh: &dyn Mesh) -> Result<Vec<f64>, OptionError> {
        match &self.aov {
            AreaPerVolume::Uniform(a) => Ok(vec![self.h * a; mesh.n_cells()]),
            AreaPerVolume::PerCell(a) if a.len() == mesh.n_cells() => {
                Ok(a.iter().map(|a| self.h * a).collect())
            }
            AreaPerVolume::PerCell(a) => Err(OptionError::ExecutionFailed {
                reason: format!(
                    "AoV has {} values but region '{}' has {} cells",
                    a.len(),
                    mesh.region(),
                    mesh.n_cells()
                ),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fvopt_test_utils::MockMesh;

    #[test]
    fn default_dimensions_are_power_per_volume_per_kelvin() {
        let dict = Dict::named("htx")
            .with("h", Entry::Scalar(10.0))
            .with("AoV", Entry::Scalar(2.0));
        let closure = ConstantHeatTransfer::closure_from_dict(&dict, 3).unwrap();
        assert_eq!(
            closure.dimensions(),
            Dimensions::POWER / Dimensions::VOLUME / Dimensions::TEMPERATURE
        );
        let mut closure = closure;
        let mesh = MockMesh::uniform("fluid", 3, 1.0);
        assert_eq!(closure.correct_htc(&mesh).unwrap(), vec![20.0; 3]);
    }

    #[test]
    fn per_cell_area_must_match_mesh() {
        let dict = Dict::named("htx")
            .with("h", Entry::Scalar(1.0))
            .with("AoV", Entry::List(vec![1.0, 2.0]));
        assert!(ConstantHeatTransfer::closure_from_dict(&dict, 3).is_err());

        let mut closure = ConstantHeatTransfer::closure_from_dict(&dict, 2).unwrap();
        let mesh = MockMesh::uniform("fluid", 2, 1.0);
        assert_eq!(closure.correct_htc(&mesh).unwrap(), vec![1.0, 2.0]);
        assert!(closure
            .correct_htc(&MockMesh::uniform("fluid", 4, 1.0))
            .is_err());
    }

    #[test]
    fn negative_h_rejected() {
        let dict = Dict::named("htx")
            .with("h", Entry::Scalar(-1.0))
            .with("AoV", Entry::Scalar(1.0));
        assert!(ConstantHeatTransfer::closure_from_dict(&dict, 1).is_err());
    }
}
