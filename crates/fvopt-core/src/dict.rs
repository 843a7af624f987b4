//! Parsed configuration dictionaries.
//!
//! Parsing the on-disk format is the caller's business; options consume
//! an already-built [`Dict`]. Entries keep their insertion order and
//! repeated keys are preserved so the option list can diagnose duplicate
//! option names. Lookups return the last occurrence.

use crate::dimensions::Dimensions;
use crate::error::ConfigError;

/// A single configuration value.
#[derive(Clone, Debug, PartialEq)]
pub enum Entry {
    /// `true` / `false`.
    Bool(bool),
    /// A number.
    Scalar(f64),
    /// A number with explicit dimensions.
    Dimensioned {
        /// Dimensions of the value.
        dimensions: Dimensions,
        /// The value.
        value: f64,
    },
    /// A single word.
    Word(String),
    /// A list of words.
    Words(Vec<String>),
    /// A list of numbers (e.g. a vector value).
    List(Vec<f64>),
    /// A list of cell labels.
    Labels(Vec<usize>),
    /// A nested dictionary.
    Dict(Dict),
}

impl Entry {
    /// Short description of the entry kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Scalar(_) => "scalar",
            Self::Dimensioned { .. } => "dimensioned scalar",
            Self::Word(_) => "word",
            Self::Words(_) => "word list",
            Self::List(_) => "scalar list",
            Self::Labels(_) => "label list",
            Self::Dict(_) => "dictionary",
        }
    }

    /// Word shorthand.
    pub fn word(w: impl Into<String>) -> Self {
        Self::Word(w.into())
    }

    /// Word-list shorthand.
    pub fn words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Words(words.into_iter().map(Into::into).collect())
    }
}

/// An ordered dictionary of named entries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dict {
    name: String,
    entries: Vec<(String, Entry)>,
}

impl Dict {
    /// An empty, unnamed dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty dictionary with a name used in error messages.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Dictionary name (its key in the parent, when nested).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append an entry. A nested dictionary without a name takes `key`.
    pub fn insert(&mut self, key: impl Into<String>, entry: Entry) {
        let key = key.into();
        let entry = match entry {
            Entry::Dict(mut d) if d.name.is_empty() => {
                d.name = key.clone();
                Entry::Dict(d)
            }
            other => other,
        };
        self.entries.push((key, entry));
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, entry: Entry) -> Self {
        self.insert(key, entry);
        self
    }

    /// Builder shorthand for a nested dictionary.
    pub fn with_dict(self, key: impl Into<String>, dict: Dict) -> Self {
        self.with(key, Entry::Dict(dict))
    }

    /// Number of entries, counting repeats.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dictionary has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order, including repeats.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Last entry stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, e)| e)
    }

    /// Entry under `key`, or [`ConfigError::MissingEntry`].
    pub fn lookup(&self, key: &str) -> Result<&Entry, ConfigError> {
        self.get(key).ok_or_else(|| ConfigError::MissingEntry {
            scope: self.name.clone(),
            key: key.to_string(),
        })
    }

    /// Error for an entry of the wrong kind or value.
    pub fn invalid(&self, key: &str, reason: impl Into<String>) -> ConfigError {
        ConfigError::InvalidEntry {
            scope: self.name.clone(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    fn wrong_kind(&self, key: &str, wanted: &str, found: &Entry) -> ConfigError {
        self.invalid(key, format!("expected {wanted}, found {}", found.kind()))
    }

    /// Nested dictionary.
    pub fn sub_dict(&self, key: &str) -> Result<&Dict, ConfigError> {
        match self.lookup(key)? {
            Entry::Dict(d) => Ok(d),
            other => Err(self.wrong_kind(key, "dictionary", other)),
        }
    }

    /// Nested dictionary if present.
    pub fn optional_sub_dict(&self, key: &str) -> Option<&Dict> {
        match self.get(key) {
            Some(Entry::Dict(d)) => Some(d),
            _ => None,
        }
    }

    /// Boolean entry.
    pub fn get_bool(&self, key: &str) -> Result<bool, ConfigError> {
        match self.lookup(key)? {
            Entry::Bool(b) => Ok(*b),
            Entry::Word(w) => match w.as_str() {
                "true" | "yes" | "on" => Ok(true),
                "false" | "no" | "off" => Ok(false),
                _ => Err(self.invalid(key, format!("'{w}' is not a boolean"))),
            },
            other => Err(self.wrong_kind(key, "bool", other)),
        }
    }

    /// Boolean entry, or `default` when absent.
    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        if self.contains(key) {
            self.get_bool(key)
        } else {
            Ok(default)
        }
    }

    /// Scalar entry. A dimensioned entry yields its value.
    pub fn get_scalar(&self, key: &str) -> Result<f64, ConfigError> {
        match self.lookup(key)? {
            Entry::Scalar(v) => Ok(*v),
            Entry::Dimensioned { value, .. } => Ok(*value),
            other => Err(self.wrong_kind(key, "scalar", other)),
        }
    }

    /// Scalar entry, or `default` when absent.
    pub fn scalar_or(&self, key: &str, default: f64) -> Result<f64, ConfigError> {
        if self.contains(key) {
            self.get_scalar(key)
        } else {
            Ok(default)
        }
    }

    /// Dimensioned scalar. A plain scalar is given `default_dims`.
    pub fn get_dimensioned(
        &self,
        key: &str,
        default_dims: Dimensions,
    ) -> Result<(Dimensions, f64), ConfigError> {
        match self.lookup(key)? {
            Entry::Scalar(v) => Ok((default_dims, *v)),
            Entry::Dimensioned { dimensions, value } => Ok((*dimensions, *value)),
            other => Err(self.wrong_kind(key, "scalar", other)),
        }
    }

    /// Word entry.
    pub fn get_word(&self, key: &str) -> Result<&str, ConfigError> {
        match self.lookup(key)? {
            Entry::Word(w) => Ok(w),
            other => Err(self.wrong_kind(key, "word", other)),
        }
    }

    /// Word entry, or `default` when absent.
    pub fn word_or<'a>(&'a self, key: &str, default: &'a str) -> Result<&'a str, ConfigError> {
        if self.contains(key) {
            self.get_word(key)
        } else {
            Ok(default)
        }
    }

    /// Word-list entry. A single word is accepted as a one-element list.
    pub fn get_words(&self, key: &str) -> Result<Vec<String>, ConfigError> {
        match self.lookup(key)? {
            Entry::Words(ws) => Ok(ws.clone()),
            Entry::Word(w) => Ok(vec![w.clone()]),
            other => Err(self.wrong_kind(key, "word list", other)),
        }
    }

    /// Scalar-list entry.
    pub fn get_list(&self, key: &str) -> Result<&[f64], ConfigError> {
        match self.lookup(key)? {
            Entry::List(v) => Ok(v),
            other => Err(self.wrong_kind(key, "scalar list", other)),
        }
    }

    /// Label-list entry.
    pub fn get_labels(&self, key: &str) -> Result<&[usize], ConfigError> {
        match self.lookup(key)? {
            Entry::Labels(v) => Ok(v),
            other => Err(self.wrong_kind(key, "label list", other)),
        }
    }
}
