//! Cross-region lookup of coupling models and cell maps.
//!
//! A [`CouplingHub`] is shared (via `Rc`) by every region of a run. Coupling
//! models register a weak handle to their state when constructed and
//! remove it when dropped, so a partner can only ever be reached while it
//! is alive. Cell maps between regions are registered by the caller.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use fvopt_core::{ConfigError, OptionError};
use indexmap::IndexMap;
use log::debug;

use crate::cell_map::CellMap;
use crate::coupling::CouplingState;

type Key = (String, String);

/// Registry of coupling models and inter-region cell maps.
#[derive(Default)]
pub struct CouplingHub {
    models: RefCell<IndexMap<Key, Weak<RefCell<CouplingState>>>>,
    maps: RefCell<IndexMap<Key, Rc<CellMap>>>,
}

impl CouplingHub {
    /// An empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Models ───────────────────────────────────────────────────────

    pub(crate) fn register(
        &self,
        region: &str,
        name: &str,
        state: &Rc<RefCell<CouplingState>>,
    ) -> Result<(), ConfigError> {
        let key = (region.to_string(), name.to_string());
        let mut models = self.models.borrow_mut();
        if models.get(&key).is_some_and(|w| w.strong_count() > 0) {
            return Err(ConfigError::DuplicateName {
                name: format!("{region}/{name}"),
            });
        }
        models.insert(key, Rc::downgrade(state));
        debug!("Registered coupling model '{name}' in region '{region}'");
        Ok(())
    }

    pub(crate) fn deregister(&self, region: &str, name: &str, state: &Rc<RefCell<CouplingState>>) {
        let key = (region.to_string(), name.to_string());
        let mut models = self.models.borrow_mut();
        let ours = models
            .get(&key)
            .is_some_and(|w| std::ptr::eq(w.as_ptr(), Rc::as_ptr(state)));
        if ours {
            models.shift_remove(&key);
        }
    }

    pub(crate) fn lookup(
        &self,
        region: &str,
        name: &str,
    ) -> Result<Rc<RefCell<CouplingState>>, OptionError> {
        self.models
            .borrow()
            .get(&(region.to_string(), name.to_string()))
            .and_then(Weak::upgrade)
            .ok_or_else(|| OptionError::PartnerNotFound {
                region: region.to_string(),
                model: name.to_string(),
            })
    }

    /// Whether a live model `name` is registered for `region`.
    pub fn has_model(&self, region: &str, name: &str) -> bool {
        self.lookup(region, name).is_ok()
    }

    // ── Cell maps ────────────────────────────────────────────────────

    /// Register the map taking values from region `from` to region `to`.
    pub fn add_mapping(&self, from: impl Into<String>, to: impl Into<String>, map: CellMap) {
        self.maps
            .borrow_mut()
            .insert((from.into(), to.into()), Rc::new(map));
    }

    /// Register `map` from `a` to `b` and its reverse from `b` to `a`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the map cannot be reversed; nothing is registered.
    pub fn connect(&self, a: &str, b: &str, map: CellMap) -> Result<(), String> {
        let back = map.reverse()?;
        self.add_mapping(a, b, map);
        self.add_mapping(b, a, back);
        Ok(())
    }

    /// The map from region `from` to region `to`.
    pub fn mapping(&self, from: &str, to: &str) -> Result<Rc<CellMap>, OptionError> {
        self.maps
            .borrow()
            .get(&(from.to_string(), to.to_string()))
            .cloned()
            .ok_or_else(|| OptionError::MappingNotFound {
                from: from.to_string(),
                to: to.to_string(),
            })
    }

    /// Drop every map into or out of `region`, e.g. after its topology changed.
    pub fn invalidate_region(&self, region: &str) {
        self.maps
            .borrow_mut()
            .retain(|(from, to), _| from != region && to != region);
    }
}

impl fmt::Debug for CouplingHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let models: Vec<String> = self
            .models
            .borrow()
            .iter()
            .filter(|(_, w)| w.strong_count() > 0)
            .map(|((r, n), _)| format!("{r}/{n}"))
            .collect();
        let maps: Vec<String> = self
            .maps
            .borrow()
            .keys()
            .map(|(from, to)| format!("{from}->{to}"))
            .collect();
        f.debug_struct("CouplingHub")
            .field("models", &models)
            .field("maps", &maps)
            .finish()
    }
}
