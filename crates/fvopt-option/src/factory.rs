//! Name-keyed constructors for configured options.

use std::fmt;
use std::rc::Rc;

use fvopt_core::{ConfigError, Dict, Mesh};
use indexmap::IndexMap;

use crate::option::FvOption;

/// Builds an option from its name, its own sub-dictionary and the region mesh.
pub type OptionConstructor =
    Box<dyn Fn(&str, &Dict, &Rc<dyn Mesh>) -> Result<Box<dyn FvOption>, ConfigError>>;

/// Registry of option constructors, keyed by the `type` entry.
#[derive(Default)]
pub struct OptionFactory {
    constructors: IndexMap<String, OptionConstructor>,
}

impl OptionFactory {
    /// An empty factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `constructor` for `type_name`, replacing any previous one.
    pub fn register<F>(&mut self, type_name: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn(&str, &Dict, &Rc<dyn Mesh>) -> Result<Box<dyn FvOption>, ConfigError> + 'static,
    {
        self.constructors
            .insert(type_name.into(), Box::new(constructor));
        self
    }

    /// Whether a constructor is registered for `type_name`.
    pub fn contains(&self, type_name: &str) -> bool {
        self.constructors.contains_key(type_name)
    }

    /// Registered type names, in registration order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Construct the option `name` described by `dict`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingEntry`] if `dict` has no `type` entry,
    /// [`ConfigError::UnknownType`] if no constructor is registered for
    /// it, or whatever the constructor reports.
    pub fn create(
        &self,
        name: &str,
        dict: &Dict,
        mesh: &Rc<dyn Mesh>,
    ) -> Result<Box<dyn FvOption>, ConfigError> {
        let type_name = dict.get_word("type")?;
        let constructor =
            self.constructors
                .get(type_name)
                .ok_or_else(|| ConfigError::UnknownType {
                    name: name.to_string(),
                    type_name: type_name.to_string(),
                    known: self.type_names().map(str::to_string).collect(),
                })?;
        constructor(name, dict, mesh)
    }
}

impl fmt::Debug for OptionFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionFactory")
            .field("types", &self.constructors.keys().collect::<Vec<_>>())
            .finish()
    }
}
