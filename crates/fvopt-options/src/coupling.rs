//! Heat-transfer coupling between two independently meshed regions.
//!
//! A [`CouplingModel`] on one region pairs with a model on a partner
//! region, found by name through the shared [`CouplingHub`]. Each side
//! adds `htc * (T_nbr - T)` to its energy equation, where `T_nbr` is the
//! partner's temperature mapped onto local cells.
//!
//! The coefficient `htc` is computed by a pluggable
//! [`HeatTransferCoefficient`] closure on the master side and memoized per
//! time index. A slave side asks its master to refresh and maps the
//! master's coefficient onto its own cells.
//!
//! Two linearisations are available:
//!
//! - explicit: `Su = htc * (T_nbr - T_old)`, matrix diagonal untouched;
//! - semi-implicit: `Su = htc * T_nbr`, `Sp = -htc`.
//!
//! Both reach the same steady state `T = T_nbr`; the semi-implicit form
//! keeps the local temperature in the matrix.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use fvopt_core::{
    ConfigError, Dict, Dimensions, Equation, FieldValue, Mesh, MeshTopoChange, OptionError,
    TimeIndex, VolField, Weights,
};
use fvopt_option::{ActiveFields, FvOption, SourceOption};
use log::{debug, warn};

use crate::hub::CouplingHub;

// ── Closure ────────────────────────────────────────────────────────

/// Computes the volumetric heat-transfer coefficient of a coupling model.
pub trait HeatTransferCoefficient {
    /// Configuration type name of the model using this closure.
    fn type_name(&self) -> &str;

    /// Dimensions of the coefficient returned by
    /// [`correct_htc`](Self::correct_htc).
    fn dimensions(&self) -> Dimensions;

    /// Per-cell coefficient over `mesh`.
    fn correct_htc(&mut self, mesh: &dyn Mesh) -> Result<Vec<f64>, OptionError>;
}

// ── Shared state ───────────────────────────────────────────────────

/// The part of a coupling model reachable from its partner.
///
/// Owned by the model behind `Rc<RefCell<_>>`; the hub holds only a weak
/// handle.
pub struct CouplingState {
    region: String,
    name: String,
    mesh: Rc<dyn Mesh>,
    htc: VolField<f64>,
    cached: Option<TimeIndex>,
    master: bool,
    closure: Box<dyn HeatTransferCoefficient>,
}

impl CouplingState {
    /// Region the model belongs to.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The region mesh.
    pub fn mesh(&self) -> &Rc<dyn Mesh> {
        &self.mesh
    }

    /// Last computed coefficient.
    pub fn htc(&self) -> &VolField<f64> {
        &self.htc
    }

    /// Whether this side computes the coefficient.
    pub fn is_master(&self) -> bool {
        self.master
    }

    /// Time index of the cached coefficient, if any.
    pub fn cached_time_index(&self) -> Option<TimeIndex> {
        self.cached
    }

    /// Recompute the coefficient with the closure unless it is already
    /// current for this time index.
    fn refresh_master(&mut self) -> Result<(), OptionError> {
        let now = self.mesh.time_index();
        if self.cached == Some(now) {
            return Ok(());
        }
        let values = self.closure.correct_htc(&*self.mesh)?;
        if values.len() != self.mesh.n_cells() {
            return Err(OptionError::ExecutionFailed {
                reason: format!(
                    "heat transfer coefficient of '{}' has {} values for {} cells",
                    self.name,
                    values.len(),
                    self.mesh.n_cells()
                ),
            });
        }
        self.htc = VolField::new("htc", self.closure.dimensions(), values);
        self.cached = Some(now);
        debug!(
            "Recomputed htc of '{}' in region '{}' at time index {}",
            self.name, self.region, now.0
        );
        Ok(())
    }
}

impl fmt::Debug for CouplingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CouplingState")
            .field("region", &self.region)
            .field("name", &self.name)
            .field("master", &self.master)
            .field("cached", &self.cached)
            .field("closure", &self.closure.type_name())
            .finish()
    }
}

// ── Settings ───────────────────────────────────────────────────────

/// Coupling configuration shared by all closures.
#[derive(Clone, Debug, PartialEq)]
pub struct CouplingSettings {
    /// Partner region.
    pub nbr_region: String,
    /// Partner model name; `None` means the same name as this model.
    pub nbr_model: Option<String>,
    /// Whether this side computes the coefficient.
    pub master: bool,
    /// Use the semi-implicit linearisation.
    pub semi_implicit: bool,
    /// Local temperature field.
    pub t_name: String,
    /// Partner temperature field.
    pub t_nbr_name: String,
    /// Equations the coupling adds to.
    pub field_names: Vec<String>,
}

impl CouplingSettings {
    /// Defaults: master, explicit, temperature `T` on both sides, added to
    /// the `T` equation.
    pub fn new(nbr_region: impl Into<String>) -> Self {
        Self {
            nbr_region: nbr_region.into(),
            nbr_model: None,
            master: true,
            semi_implicit: false,
            t_name: "T".to_string(),
            t_nbr_name: "T".to_string(),
            field_names: vec!["T".to_string()],
        }
    }

    /// Read from an option's dictionary:
    ///
    /// ```text
    /// nbrRegionName   solid;      // required
    /// nbrModelName    htx;        // default: own name
    /// master          true;
    /// semiImplicit    false;
    /// TName           T;
    /// TNbrName        T;          // default: TName
    /// fieldNames      (h);        // default: (TName)
    /// ```
    pub fn from_dict(dict: &Dict) -> Result<Self, ConfigError> {
        let t_name = dict.word_or("TName", "T")?.to_string();
        let t_nbr_name = dict.word_or("TNbrName", &t_name)?.to_string();
        let field_names = if dict.contains("fieldNames") {
            dict.get_words("fieldNames")?
        } else {
            vec![t_name.clone()]
        };
        if field_names.is_empty() {
            return Err(dict.invalid("fieldNames", "at least one field is required"));
        }
        let nbr_model = if dict.contains("nbrModelName") {
            Some(dict.get_word("nbrModelName")?.to_string())
        } else {
            None
        };
        Ok(Self {
            nbr_region: dict.get_word("nbrRegionName")?.to_string(),
            nbr_model,
            master: dict.bool_or("master", true)?,
            semi_implicit: dict.bool_or("semiImplicit", false)?,
            t_name,
            t_nbr_name,
            field_names,
        })
    }
}

// ── Model ──────────────────────────────────────────────────────────

/// A coupling contributor. See the [module docs](crate::coupling).
pub struct CouplingModel {
    name: String,
    type_name: String,
    active: ActiveFields,
    settings: CouplingSettings,
    state: Rc<RefCell<CouplingState>>,
    hub: Rc<CouplingHub>,
}

impl CouplingModel {
    /// Create a model named `name` on `mesh` and register it with `hub`.
    ///
    /// The partner does not need to exist yet; it is resolved on first use.
    ///
    /// # Errors
    ///
    /// Fails if a live model with the same name is already registered for
    /// this region, or if the settings name this model as its own partner.
    pub fn new(
        name: impl Into<String>,
        mesh: Rc<dyn Mesh>,
        hub: &Rc<CouplingHub>,
        settings: CouplingSettings,
        closure: Box<dyn HeatTransferCoefficient>,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        let region = mesh.region().to_string();
        let nbr_model = settings.nbr_model.as_deref().unwrap_or(&name);
        if settings.nbr_region == region && nbr_model == name {
            return Err(ConfigError::InvalidEntry {
                scope: name.clone(),
                key: "nbrRegionName".to_string(),
                reason: "a coupling model cannot be its own partner".to_string(),
            });
        }
        let type_name = closure.type_name().to_string();
        let htc = VolField::zeros("htc", closure.dimensions(), mesh.n_cells());
        let state = Rc::new(RefCell::new(CouplingState {
            region,
            name: name.clone(),
            mesh,
            htc,
            cached: None,
            master: settings.master,
            closure,
        }));
        {
            let s = state.borrow();
            hub.register(&s.region, &name, &state)?;
        }
        let active = ActiveFields::new().with_add_sup(settings.field_names.iter().cloned());
        Ok(Self {
            name,
            type_name,
            active,
            settings,
            state,
            hub: Rc::clone(hub),
        })
    }

    /// The coupling settings.
    pub fn settings(&self) -> &CouplingSettings {
        &self.settings
    }

    /// This model's shared state.
    pub fn state(&self) -> &Rc<RefCell<CouplingState>> {
        &self.state
    }

    /// Name of the partner model.
    pub fn nbr_model_name(&self) -> &str {
        self.settings.nbr_model.as_deref().unwrap_or(&self.name)
    }

    /// Resolve the partner through the hub.
    ///
    /// # Errors
    ///
    /// [`OptionError::PartnerNotFound`] if no live partner is registered.
    pub fn nbr_model(&self) -> Result<Rc<RefCell<CouplingState>>, OptionError> {
        self.hub
            .lookup(&self.settings.nbr_region, self.nbr_model_name())
    }

    /// Map values defined on the partner region onto local cells.
    pub fn interpolate<T: FieldValue>(&self, values: &[T]) -> Result<Vec<T>, OptionError> {
        let nbr = self.nbr_model()?;
        let nbr = nbr.borrow();
        self.interpolate_with(&nbr, values)
    }

    /// Map values defined on `nbr`'s region onto local cells.
    pub fn interpolate_with<T: FieldValue>(
        &self,
        nbr: &CouplingState,
        values: &[T],
    ) -> Result<Vec<T>, OptionError> {
        let region = self.state.borrow().region.clone();
        let map = self.hub.mapping(&nbr.region, &region)?;
        Ok(map.apply(values)?)
    }

    /// Bring the coefficient up to date for the current time index.
    ///
    /// A master recomputes with its closure at most once per index. A
    /// slave refreshes its master and maps the master's coefficient.
    ///
    /// # Errors
    ///
    /// Fails if the partner cannot be resolved, if neither side is a
    /// master, or if the closure or the mapping fails.
    pub fn correct(&mut self) -> Result<(), OptionError> {
        let nbr = self.nbr_model()?;
        if self.state.borrow().master {
            return self.state.borrow_mut().refresh_master();
        }

        if !nbr.borrow().master {
            return Err(OptionError::ExecutionFailed {
                reason: format!(
                    "'{}' and its partner '{}' in region '{}' are both slaves",
                    self.name,
                    self.nbr_model_name(),
                    self.settings.nbr_region
                ),
            });
        }
        nbr.borrow_mut().refresh_master()?;

        let now = self.state.borrow().mesh.time_index();
        if self.state.borrow().cached == Some(now) {
            return Ok(());
        }
        let (dims, mapped) = {
            let nbr = nbr.borrow();
            (
                nbr.htc.dimensions(),
                self.interpolate_with(&nbr, nbr.htc.values())?,
            )
        };
        let mut state = self.state.borrow_mut();
        state.htc = VolField::new("htc", dims, mapped);
        state.cached = Some(now);
        debug!(
            "Mapped htc of '{}' from region '{}' at time index {}",
            self.name, self.settings.nbr_region, now.0
        );
        Ok(())
    }

    /// The current coefficient (not refreshed).
    pub fn htc(&self) -> VolField<f64> {
        self.state.borrow().htc.clone()
    }

    fn local_temperature(&self, m_field: &str, psi: &[f64]) -> Result<Vec<f64>, OptionError> {
        if m_field == self.settings.t_name {
            return Ok(psi.to_vec());
        }
        let state = self.state.borrow();
        state
            .mesh
            .lookup_scalar(&self.settings.t_name)
            .map(|t| t.values().to_vec())
            .ok_or_else(|| OptionError::FieldNotFound {
                region: state.region.clone(),
                field: self.settings.t_name.clone(),
            })
    }
}

impl FvOption for CouplingModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn active_fields(&self) -> &ActiveFields {
        &self.active
    }

    fn as_source(&mut self) -> Option<&mut dyn SourceOption> {
        Some(self)
    }

    fn update_mesh(&mut self, change: &MeshTopoChange) {
        let mut state = self.state.borrow_mut();
        let dims = state.htc.dimensions();
        let values = change.map_values(state.htc.values(), 0.0);
        state.htc = VolField::new("htc", dims, values);
        state.cached = None;
        self.hub.invalidate_region(&state.region);
    }

    fn move_points(&mut self) -> bool {
        self.state.borrow_mut().cached = None;
        true
    }
}

impl SourceOption for CouplingModel {
    fn add_sup(
        &mut self,
        eqn: Equation<'_>,
        _weights: &Weights<'_>,
        field_name: &str,
    ) -> Result<(), OptionError> {
        let m = match eqn {
            Equation::Scalar(m) => m,
            other => {
                warn!(
                    "Coupling '{}' cannot add to {} field '{}'",
                    self.name,
                    other.value_type(),
                    field_name
                );
                return Err(OptionError::UnsupportedFieldType {
                    field: field_name.to_string(),
                    value_type: other.value_type(),
                });
            }
        };

        self.correct()?;
        let nbr = self.nbr_model()?;
        let (t_nbr_dims, t_nbr) = {
            let nbr = nbr.borrow();
            let field = nbr.mesh.lookup_scalar(&self.settings.t_nbr_name).ok_or_else(|| {
                OptionError::FieldNotFound {
                    region: nbr.region.clone(),
                    field: self.settings.t_nbr_name.clone(),
                }
            })?;
            (
                field.dimensions(),
                self.interpolate_with(&nbr, field.values())?,
            )
        };
        let htc = self.htc();
        let su_dims = htc.dimensions() * t_nbr_dims;

        if self.settings.semi_implicit {
            let su: Vec<f64> = htc.values().iter().zip(&t_nbr).map(|(h, t)| h * t).collect();
            let sp: Vec<f64> = htc.values().iter().map(|h| -h).collect();
            m.add_explicit(&VolField::new("Su", su_dims, su))?;
            m.add_implicit(&VolField::new("Sp", htc.dimensions(), sp))?;
        } else {
            let t = self.local_temperature(m.field_name(), m.psi())?;
            let su: Vec<f64> = htc
                .values()
                .iter()
                .zip(t_nbr.iter().zip(&t))
                .map(|(h, (tn, t))| h * (tn - t))
                .collect();
            m.add_explicit(&VolField::new("Su", su_dims, su))?;
        }
        debug!(
            "Coupling '{}' added {} source to '{}'",
            self.name,
            if self.settings.semi_implicit {
                "semi-implicit"
            } else {
                "explicit"
            },
            field_name
        );
        Ok(())
    }
}

impl Drop for CouplingModel {
    fn drop(&mut self) {
        let region = self.state.borrow().region.clone();
        self.hub.deregister(&region, &self.name, &self.state);
    }
}

impl fmt::Debug for CouplingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CouplingModel")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("settings", &self.settings)
            .field("state", &self.state.borrow())
            .finish()
    }
}
