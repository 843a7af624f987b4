//! Constant semi-implicit sources over a cell selection.
//!
//! For each configured field the source is `Su + Sp * psi`, where `Su` has
//! the value type of the field and `Sp` is a scalar coefficient. In
//! `absolute` volume mode both are totals for the selection and are
//! divided by its volume; in `specific` mode they are per unit volume.
//!
//! Values are taken to be in the units of the equation they are added
//! to, so the source adopts the equation's dimensions.

use std::rc::Rc;

use fvopt_core::{
    ConfigError, Dict, Entry, Equation, FieldValue, FvMatrix, Mesh, MeshTopoChange, OptionError,
    VolField, Weights,
};
use fvopt_option::{ActiveFields, FvOption, SourceOption};
use indexmap::IndexMap;
use log::warn;

use crate::selection::CellSelection;
use crate::value::CellValue;

/// How configured source values relate to cell volume.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VolumeMode {
    /// Totals over the selection.
    Absolute,
    /// Values per unit volume.
    Specific,
}

impl VolumeMode {
    fn parse(word: &str) -> Option<Self> {
        match word {
            "absolute" => Some(Self::Absolute),
            "specific" => Some(Self::Specific),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct FieldSource {
    explicit: CellValue,
    implicit: f64,
}

/// Constant explicit and implicit sources for one or more fields.
///
/// # Construction
///
/// ```
/// use std::rc::Rc;
/// use fvopt_core::{Mesh, Vector};
/// use fvopt_options::{SemiImplicitSource, VolumeMode};
/// use fvopt_test_utils::MockMesh;
///
/// let mesh: Rc<dyn Mesh> = Rc::new(MockMesh::uniform("fluid", 4, 0.25));
/// let heater = SemiImplicitSource::builder("heater", mesh)
///     .volume_mode(VolumeMode::Absolute)
///     .source("T", 100.0, 0.0)
///     .source("U", Vector([1.0, 0.0, 0.0]), 0.0)
///     .build()
///     .unwrap();
/// assert_eq!(heater.fields().count(), 2);
/// ```
pub struct SemiImplicitSource {
    name: String,
    active: ActiveFields,
    mesh: Rc<dyn Mesh>,
    selection: CellSelection,
    volume_mode: VolumeMode,
    sources: IndexMap<String, FieldSource>,
}

/// Builder for [`SemiImplicitSource`].
///
/// Defaults: all cells, [`VolumeMode::Absolute`], no sources.
pub struct SemiImplicitSourceBuilder {
    name: String,
    mesh: Rc<dyn Mesh>,
    selection: CellSelection,
    volume_mode: VolumeMode,
    sources: IndexMap<String, FieldSource>,
}

impl SemiImplicitSource {
    /// Type name used in configuration.
    pub const TYPE_NAME: &'static str = "semiImplicitSource";

    /// Start building a source called `name` on `mesh`.
    pub fn builder(name: impl Into<String>, mesh: Rc<dyn Mesh>) -> SemiImplicitSourceBuilder {
        SemiImplicitSourceBuilder {
            name: name.into(),
            mesh,
            selection: CellSelection::All,
            volume_mode: VolumeMode::Absolute,
            sources: IndexMap::new(),
        }
    }

    /// Construct from configuration:
    ///
    /// ```text
    /// heater
    /// {
    ///     type            semiImplicitSource;
    ///     selectionMode   cells;
    ///     cells           (0 3);
    ///     volumeMode      absolute;
    ///     sources
    ///     {
    ///         T { explicit 100; implicit 0; }
    ///     }
    /// }
    /// ```
    pub fn from_dict(name: &str, dict: &Dict, mesh: &Rc<dyn Mesh>) -> Result<Self, ConfigError> {
        let selection = CellSelection::from_dict(dict, mesh.n_cells())?;
        let mode_word = dict.word_or("volumeMode", "absolute")?;
        let volume_mode = VolumeMode::parse(mode_word).ok_or_else(|| {
            dict.invalid(
                "volumeMode",
                format!("unknown mode '{mode_word}' (valid modes: absolute, specific)"),
            )
        })?;

        let mut builder = Self::builder(name, Rc::clone(mesh))
            .selection(selection)
            .volume_mode(volume_mode);
        let sources = dict.sub_dict("sources")?;
        for (field, entry) in sources.iter() {
            let Entry::Dict(coeffs) = entry else {
                return Err(sources.invalid(field, "expected a dictionary of explicit/implicit"));
            };
            let explicit = CellValue::from_dict(coeffs, "explicit")?;
            let implicit = coeffs.scalar_or("implicit", 0.0)?;
            builder = builder.source(field, explicit, implicit);
        }
        builder
            .build()
            .map_err(|reason| dict.invalid("sources", reason))
    }

    /// Fields this option adds sources to.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    /// The cell selection.
    pub fn selection(&self) -> &CellSelection {
        &self.selection
    }

    fn scale(&self, volumes: &[f64]) -> Result<f64, OptionError> {
        match self.volume_mode {
            VolumeMode::Specific => Ok(1.0),
            VolumeMode::Absolute => {
                let v = self.selection.volume(volumes);
                if v > 0.0 {
                    Ok(1.0 / v)
                } else {
                    Err(OptionError::ExecutionFailed {
                        reason: format!("selection of '{}' has zero volume", self.name),
                    })
                }
            }
        }
    }
}

impl SemiImplicitSourceBuilder {
    /// Set the cell selection.
    pub fn selection(mut self, selection: CellSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Set the volume mode.
    pub fn volume_mode(mut self, mode: VolumeMode) -> Self {
        self.volume_mode = mode;
        self
    }

    /// Add (or replace) the source for `field`.
    pub fn source(
        mut self,
        field: impl Into<String>,
        explicit: impl Into<CellValue>,
        implicit: f64,
    ) -> Self {
        self.sources.insert(
            field.into(),
            FieldSource {
                explicit: explicit.into(),
                implicit,
            },
        );
        self
    }

    /// Build the option, validating all configuration.
    ///
    /// # Errors
    ///
    /// Returns `Err` if no source is configured, a coefficient is not
    /// finite, or an absolute-mode selection has no volume.
    pub fn build(self) -> Result<SemiImplicitSource, String> {
        if self.sources.is_empty() {
            return Err("at least one source is required".to_string());
        }
        for (field, s) in &self.sources {
            let finite = match s.explicit {
                CellValue::Scalar(v) => v.is_finite(),
                CellValue::Vector(v) => v.0.iter().all(|c| c.is_finite()),
                CellValue::Tensor(t) => t.0.iter().all(|c| c.is_finite()),
            };
            if !finite || !s.implicit.is_finite() {
                return Err(format!("source coefficients for '{field}' must be finite"));
            }
        }
        if self.volume_mode == VolumeMode::Absolute
            && !(self.selection.volume(&self.mesh.cell_volumes()) > 0.0)
        {
            return Err("absolute volume mode needs a selection with positive volume".to_string());
        }

        let active = ActiveFields::new().with_add_sup(self.sources.keys().cloned());
        Ok(SemiImplicitSource {
            name: self.name,
            active,
            mesh: self.mesh,
            selection: self.selection,
            volume_mode: self.volume_mode,
            sources: self.sources,
        })
    }
}

fn add_uniform<T: FieldValue>(
    m: &mut FvMatrix<T>,
    cells: &[usize],
    su: T,
    sp: f64,
) -> Result<(), OptionError> {
    let n = m.n_cells();
    let mut explicit = VolField::zeros("Su", m.source_dimensions(), n);
    let mut implicit = VolField::zeros("Sp", m.implicit_dimensions(), n);
    for &c in cells {
        explicit.values_mut()[c] = su;
        implicit.values_mut()[c] = sp;
    }
    m.add_explicit(&explicit)?;
    m.add_implicit(&implicit)?;
    Ok(())
}

impl FvOption for SemiImplicitSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn active_fields(&self) -> &ActiveFields {
        &self.active
    }

    fn as_source(&mut self) -> Option<&mut dyn SourceOption> {
        Some(self)
    }

    fn update_mesh(&mut self, change: &MeshTopoChange) {
        self.selection.update_mesh(change);
    }
}

impl SourceOption for SemiImplicitSource {
    fn add_sup(
        &mut self,
        eqn: Equation<'_>,
        _weights: &Weights<'_>,
        field_name: &str,
    ) -> Result<(), OptionError> {
        let source = *self
            .sources
            .get(field_name)
            .ok_or_else(|| OptionError::ExecutionFailed {
                reason: format!("no source configured for field '{field_name}'"),
            })?;
        let volumes = self.mesh.cell_volumes();
        let scale = self.scale(&volumes)?;
        let cells = self.selection.resolve(volumes.len());
        let sp = source.implicit * scale;

        match (eqn, source.explicit) {
            (Equation::Scalar(m), CellValue::Scalar(su)) => add_uniform(m, &cells, su * scale, sp),
            (Equation::Vector(m), CellValue::Vector(su)) => add_uniform(m, &cells, su * scale, sp),
            (Equation::Tensor(m), CellValue::Tensor(su)) => add_uniform(m, &cells, su * scale, sp),
            (eqn, value) => {
                warn!(
                    "Option '{}': {} source configured for {} field '{}'",
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
