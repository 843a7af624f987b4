//! The per-region [`OptionList`].
//!
//! Routes each equation to the options that declared its field and
//! validates, once per time step, that every declared field was
//! exercised during the previous step.

use std::error::Error;
use std::fmt;
use std::rc::Rc;

use fvopt_core::{
    ConfigError, DimensionError, Dict, Dimensions, Entry, FieldValue, FvMatrix, Mesh,
    MeshTopoChange, OptionError, TimeIndex, UnitField, VolField, Weight, Weights,
};
use indexmap::IndexMap;
use log::{debug, info};

use crate::factory::OptionFactory;
use crate::option::{implements, ActiveFields, Capability, FvOption};
use crate::report::{OptionSummary, OptionsReport};

// ── Errors ─────────────────────────────────────────────────────────

/// A declared field an option did not act on during a step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unapplied {
    /// Option name.
    pub option: String,
    /// The capability the field was declared for.
    pub capability: Capability,
    /// Field name.
    pub field: String,
}

/// Errors from building or dispatching an option list.
#[derive(Clone, Debug, PartialEq)]
pub enum OptionListError {
    /// Configuration could not be turned into options.
    Config(ConfigError),
    /// Declared fields were not exercised during the previous step.
    NotApplied(Vec<Unapplied>),
    /// An option failed while running.
    OptionFailed {
        /// Name of the failing option.
        name: String,
        /// What went wrong.
        reason: OptionError,
    },
    /// The aggregate matrix could not be built for the field.
    Dimension(DimensionError),
}

impl fmt::Display for OptionListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration error: {e}"),
            Self::NotApplied(missing) => {
                write!(f, "options not applied during the previous step: ")?;
                for (i, u) in missing.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "'{}' ({} of field '{}')", u.option, u.capability, u.field)?;
                }
                Ok(())
            }
            Self::OptionFailed { name, reason } => write!(f, "option '{name}' failed: {reason}"),
            Self::Dimension(e) => write!(f, "{e}"),
        }
    }
}

impl Error for OptionListError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::OptionFailed { reason, .. } => Some(reason),
            Self::Dimension(e) => Some(e),
            Self::NotApplied(_) => None,
        }
    }
}

impl From<ConfigError> for OptionListError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<DimensionError> for OptionListError {
    fn from(e: DimensionError) -> Self {
        Self::Dimension(e)
    }
}

// ── OptionList ─────────────────────────────────────────────────────

struct Slot {
    option: Box<dyn FvOption>,
    applied: ActiveFields,
}

/// The options of one mesh region, in registration order.
///
/// Sources are summed, so their order does not matter. Constraints and
/// corrections run in registration order; for a cell touched by several
/// constraints the last registered one wins.
pub struct OptionList {
    mesh: Rc<dyn Mesh>,
    slots: IndexMap<String, Slot>,
    last_checked: Option<TimeIndex>,
}

impl OptionList {
    /// An option list with no options.
    pub fn empty(mesh: Rc<dyn Mesh>) -> Self {
        Self {
            mesh,
            slots: IndexMap::new(),
            last_checked: None,
        }
    }

    /// Build the options described by `dict`.
    ///
    /// `dict` holds one sub-dictionary per option, keyed by option name,
    /// each with a `type` entry. The entries may also be wrapped in an
    /// `options` sub-dictionary. Entries that are not dictionaries are
    /// ignored.
    ///
    /// # Errors
    ///
    /// [`ConfigError::DuplicateName`] for a repeated option name,
    /// [`ConfigError::UnknownType`] for an unregistered type, and any
    /// error reported by an option constructor.
    pub fn new(
        mesh: Rc<dyn Mesh>,
        dict: &Dict,
        factory: &OptionFactory,
    ) -> Result<Self, OptionListError> {
        let mut list = Self::empty(mesh);
        list.reset(dict, factory)?;
        Ok(list)
    }

    /// Drop all options and build new ones from `dict`.
    ///
    /// Existing options are dropped before the new ones are built, so a
    /// failure leaves the list empty.
    pub fn reset(&mut self, dict: &Dict, factory: &OptionFactory) -> Result<(), OptionListError> {
        self.slots.clear();
        self.last_checked = None;

        if let Err(e) = self.populate(dict, factory) {
            self.slots.clear();
            return Err(e);
        }

        if self.slots.is_empty() {
            info!("No finite volume options present for region '{}'", self.mesh.region());
        } else {
            info!(
                "Selected {} finite volume option(s) for region '{}'",
                self.slots.len(),
                self.mesh.region()
            );
        }
        Ok(())
    }

    fn populate(&mut self, dict: &Dict, factory: &OptionFactory) -> Result<(), OptionListError> {
        let entries = dict.optional_sub_dict("options").unwrap_or(dict);
        for (name, entry) in entries.iter() {
            let Entry::Dict(sub) = entry else {
                continue;
            };
            if self.slots.contains_key(name) {
                return Err(ConfigError::DuplicateName {
                    name: name.to_string(),
                }
                .into());
            }
            let option = factory.create(name, sub, &self.mesh)?;
            self.push(option)?;
        }
        Ok(())
    }

    /// Re-read the options after the run-time dictionary changed.
    pub fn read(&mut self, dict: &Dict, factory: &OptionFactory) -> Result<(), OptionListError> {
        self.reset(dict, factory)
    }

    /// Register an already constructed option.
    ///
    /// # Errors
    ///
    /// [`ConfigError::DuplicateName`] if the name is taken, and
    /// [`ConfigError::MissingCapability`] if the option declares fields
    /// for a capability it does not implement.
    pub fn push(&mut self, mut option: Box<dyn FvOption>) -> Result<(), ConfigError> {
        let name = option.name().to_string();
        if self.slots.contains_key(&name) {
            return Err(ConfigError::DuplicateName { name });
        }
        for cap in Capability::ALL {
            let declared = !option.active_fields().fields(cap).is_empty();
            if declared && !implements(option.as_mut(), cap) {
                return Err(ConfigError::MissingCapability {
                    name,
                    capability: cap.to_string(),
                });
            }
        }
        debug!("Registered option '{}' of type {}", name, option.type_name());
        self.slots.insert(
            name,
            Slot {
                option,
                applied: ActiveFields::new(),
            },
        );
        Ok(())
    }

    // ── Sources ──────────────────────────────────────────────────────

    /// Source terms for `field`, routed by the field's own name.
    pub fn source<T: FieldValue>(
        &mut self,
        field: &VolField<T>,
    ) -> Result<FvMatrix<T>, OptionListError> {
        self.source_weighted(&UnitField, &UnitField, field, field.name())
    }

    /// Source terms for `field`, routed by `name`.
    pub fn source_named<T: FieldValue>(
        &mut self,
        field: &VolField<T>,
        name: &str,
    ) -> Result<FvMatrix<T>, OptionListError> {
        self.source_weighted(&UnitField, &UnitField, field, name)
    }

    /// Source terms for a density-weighted equation.
    pub fn source_rho<T: FieldValue>(
        &mut self,
        rho: &dyn Weight,
        field: &VolField<T>,
    ) -> Result<FvMatrix<T>, OptionListError> {
        self.source_weighted(&UnitField, rho, field, field.name())
    }

    /// Source terms for a density-weighted equation, routed by `name`.
    pub fn source_rho_named<T: FieldValue>(
        &mut self,
        rho: &dyn Weight,
        field: &VolField<T>,
        name: &str,
    ) -> Result<FvMatrix<T>, OptionListError> {
        self.source_weighted(&UnitField, rho, field, name)
    }

    /// Source terms for a phase equation.
    pub fn source_phase<T: FieldValue>(
        &mut self,
        alpha: &dyn Weight,
        rho: &dyn Weight,
        field: &VolField<T>,
    ) -> Result<FvMatrix<T>, OptionListError> {
        self.source_weighted(alpha, rho, field, field.name())
    }

    /// Source terms for a phase equation, routed by `name`.
    pub fn source_phase_named<T: FieldValue>(
        &mut self,
        alpha: &dyn Weight,
        rho: &dyn Weight,
        field: &VolField<T>,
        name: &str,
    ) -> Result<FvMatrix<T>, OptionListError> {
        self.source_weighted(alpha, rho, field, name)
    }

    /// Sum of the source terms of every option declaring `name`.
    ///
    /// The result has dimensions `alpha * rho * field * volume / time`.
    /// `field` itself is not modified. With no matching option the zero
    /// matrix is returned.
    ///
    /// # Errors
    ///
    /// [`OptionListError::NotApplied`] if this call starts a new step and
    /// the previous one left declared fields unexercised, and
    /// [`OptionListError::OptionFailed`] naming the first option that fails,
    /// and [`OptionListError::Dimension`] if `alpha` or `rho` is not
    /// defined on this mesh.
    pub fn source_weighted<T: FieldValue>(
        &mut self,
        alpha: &dyn Weight,
        rho: &dyn Weight,
        field: &VolField<T>,
        name: &str,
    ) -> Result<FvMatrix<T>, OptionListError> {
        let n_cells = self.mesh.n_cells();
        for weight in [alpha, rho] {
            match weight.len() {
                Some(found) if found != n_cells => {
                    return Err(DimensionError::SizeMismatch {
                        operation: "source weight",
                        expected: n_cells,
                        found,
                    }
                    .into());
                }
                _ => {}
            }
        }
        let weights = Weights::new(alpha, rho);
        let dimensions =
            weights.dimensions() * field.dimensions() * Dimensions::VOLUME / Dimensions::TIME;
        self.assemble(&weights, field, name, dimensions)
    }

    /// Source terms for an equation with a second time derivative.
    pub fn d2dt2<T: FieldValue>(
        &mut self,
        field: &VolField<T>,
    ) -> Result<FvMatrix<T>, OptionListError> {
        self.d2dt2_named(field, field.name())
    }

    /// As [`d2dt2`](Self::d2dt2), routed by `name`.
    pub fn d2dt2_named<T: FieldValue>(
        &mut self,
        field: &VolField<T>,
        name: &str,
    ) -> Result<FvMatrix<T>, OptionListError> {
        let dimensions = field.dimensions() * Dimensions::VOLUME / Dimensions::TIME.pow(2);
        self.assemble(&Weights::unit(), field, name, dimensions)
    }

    fn assemble<T: FieldValue>(
        &mut self,
        weights: &Weights<'_>,
        field: &VolField<T>,
        name: &str,
        dimensions: Dimensions,
    ) -> Result<FvMatrix<T>, OptionListError> {
        self.check_applied()?;

        let volumes = self.mesh.cell_volumes();
        let mut total = FvMatrix::new(field, &volumes, dimensions)?;

        for (option_name, slot) in self.slots.iter_mut() {
            if !slot.option.active_fields().contains(Capability::AddSup, name) {
                continue;
            }
            slot.applied.insert(Capability::AddSup, name);
            let Some(source) = slot.option.as_source() else {
                continue;
            };
            debug!("Applying source '{option_name}' to field {name}");

            let mut contribution = total.zeroed();
            let failed = |reason: OptionError| OptionListError::OptionFailed {
                name: option_name.clone(),
                reason,
            };
            source
                .add_sup(T::equation(&mut contribution), weights, name)
                .map_err(failed)?;
            total
                .add_matrix(&contribution)
                .map_err(|e| failed(e.into()))?;
        }
        Ok(total)
    }

    // ── Constraints and corrections ──────────────────────────────────

    /// Apply every constraint declared for the equation's field, in
    /// registration order.
    pub fn constrain<T: FieldValue>(
        &mut self,
        eqn: &mut FvMatrix<T>,
    ) -> Result<(), OptionListError> {
        self.check_applied()?;
        let name = eqn.field_name().to_string();

        for (option_name, slot) in self.slots.iter_mut() {
            if !slot.option.active_fields().contains(Capability::Constrain, &name) {
                continue;
            }
            slot.applied.insert(Capability::Constrain, name.as_str());
            let Some(constraint) = slot.option.as_constraint() else {
                continue;
            };
            debug!("Applying constraint '{option_name}' to field {name}");
            constraint
                .constrain(T::equation(eqn), &name)
                .map_err(|reason| OptionListError::OptionFailed {
                    name: option_name.clone(),
                    reason,
                })?;
        }
        Ok(())
    }

    /// Apply every correction declared for `field`, in registration order.
    pub fn correct<T: FieldValue>(
        &mut self,
        field: &mut VolField<T>,
    ) -> Result<(), OptionListError> {
        self.check_applied()?;
        let name = field.name().to_string();

        for (option_name, slot) in self.slots.iter_mut() {
            if !slot.option.active_fields().contains(Capability::Correct, &name) {
                continue;
            }
            slot.applied.insert(Capability::Correct, name.as_str());
            let Some(correction) = slot.option.as_correction() else {
                continue;
            };
            debug!("Applying correction '{option_name}' to field {name}");
            correction
                .correct(T::field_mut(field))
                .map_err(|reason| OptionListError::OptionFailed {
                    name: option_name.clone(),
                    reason,
                })?;
        }
        Ok(())
    }

    // ── Bookkeeping ──────────────────────────────────────────────────

    /// Validate the previous step's bookkeeping if a new step has begun.
    ///
    /// Called by every dispatch method. The first call within a step
    /// compares the fields each option acted on during the previous
    /// observed step against its declared fields, then clears the record.
    /// Further calls within the same step do nothing.
    ///
    /// # Errors
    ///
    /// [`OptionListError::NotApplied`] listing every declared field that
    /// was not exercised. The record is cleared either way.
    pub fn check_applied(&mut self) -> Result<(), OptionListError> {
        let now = self.mesh.time_index();
        if self.last_checked == Some(now) {
            return Ok(());
        }
        let previous = self.last_checked.replace(now);

        let mut missing = Vec::new();
        if previous.is_some() {
            for (name, slot) in &self.slots {
                for cap in Capability::ALL {
                    for field in slot.option.active_fields().fields(cap) {
                        if !slot.applied.contains(cap, field) {
                            missing.push(Unapplied {
                                option: name.clone(),
                                capability: cap,
                                field: field.clone(),
                            });
                        }
                    }
                }
            }
        }
        for slot in self.slots.values_mut() {
            slot.applied.clear();
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(OptionListError::NotApplied(missing))
        }
    }

    // ── Mesh changes ─────────────────────────────────────────────────

    /// Forward a topology change to every option.
    pub fn update_mesh(&mut self, change: &MeshTopoChange) {
        for slot in self.slots.values_mut() {
            slot.option.update_mesh(change);
        }
    }

    /// Forward mesh motion to every option. Returns `true` if all succeed.
    pub fn move_points(&mut self) -> bool {
        let mut ok = true;
        for slot in self.slots.values_mut() {
            ok &= slot.option.move_points();
        }
        ok
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// The region mesh.
    pub fn mesh(&self) -> &Rc<dyn Mesh> {
        &self.mesh
    }

    /// Whether any option adds sources to `field`.
    pub fn adds_sup_to_field(&self, field: &str) -> bool {
        self.declares(Capability::AddSup, field)
    }

    /// Whether any option constrains `field`.
    pub fn constrains_field(&self, field: &str) -> bool {
        self.declares(Capability::Constrain, field)
    }

    /// Whether any option corrects `field`.
    pub fn corrects_field(&self, field: &str) -> bool {
        self.declares(Capability::Correct, field)
    }

    fn declares(&self, cap: Capability, field: &str) -> bool {
        self.slots
            .values()
            .any(|s| s.option.active_fields().contains(cap, field))
    }

    /// Number of options.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the list holds no options.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The option called `name`.
    pub fn get(&self, name: &str) -> Option<&dyn FvOption> {
        self.slots.get(name).map(|s| s.option.as_ref())
    }

    /// Option names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    /// Describe the options held.
    pub fn describe(&self) -> OptionsReport {
        OptionsReport {
            region: self.mesh.region().to_string(),
            options: self
                .slots
                .iter()
                .map(|(name, slot)| OptionSummary {
                    name: name.clone(),
                    type_name: slot.option.type_name().to_string(),
                    active: slot.option.active_fields().clone(),
                })
                .collect(),
        }
    }
}

impl fmt::Debug for OptionList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionList")
            .field("region", &self.mesh.region())
            .field("options", &self.slots.keys().collect::<Vec<_>>())
            .field("last_checked", &self.last_checked)
            .finish()
    }
}
