//! Error types shared by the option list and its contributors.
//!
//! Organised by failure class: configuration ([`ConfigError`]), field
//! algebra ([`DimensionError`]) and contributor execution
//! ([`OptionError`]). None of them is recoverable; each indicates a setup
//! or programming defect that must stop the run.

use std::error::Error;
use std::fmt;

use crate::dimensions::Dimensions;

/// Errors detected while reading configuration and constructing options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// No constructor is registered for the requested option type.
    UnknownType {
        /// Name of the offending option entry.
        name: String,
        /// The requested type.
        type_name: String,
        /// Types the factory knows about.
        known: Vec<String>,
    },
    /// Two options share a name.
    DuplicateName {
        /// The repeated name.
        name: String,
    },
    /// A required entry is absent.
    MissingEntry {
        /// Dictionary the entry was looked up in.
        scope: String,
        /// The missing key.
        key: String,
    },
    /// An entry is present but unusable.
    InvalidEntry {
        /// Dictionary the entry was read from.
        scope: String,
        /// The offending key.
        key: String,
        /// What is wrong with it.
        reason: String,
    },
    /// An option declares fields for a capability it does not implement.
    MissingCapability {
        /// Name of the option.
        name: String,
        /// The capability (`"source"`, `"constraint"`, `"correction"`).
        capability: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownType {
                name,
                type_name,
                known,
            } => {
                write!(
                    f,
                    "option '{name}': unknown type '{type_name}' (valid types: {})",
                    known.join(", ")
                )
            }
            Self::DuplicateName { name } => write!(f, "duplicate option name '{name}'"),
            Self::MissingEntry { scope, key } => {
                write!(f, "entry '{key}' not found in dictionary '{scope}'")
            }
            Self::InvalidEntry { scope, key, reason } => {
                write!(f, "entry '{key}' in dictionary '{scope}' is invalid: {reason}")
            }
            Self::MissingCapability { name, capability } => {
                write!(
                    f,
                    "option '{name}' declares {capability} fields but does not implement {capability}"
                )
            }
        }
    }
}

impl Error for ConfigError {}

/// Errors from combining fields and matrices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DimensionError {
    /// Physical dimensions differ.
    Mismatch {
        /// What was being combined.
        operation: &'static str,
        /// Dimensions required by the receiver.
        expected: Dimensions,
        /// Dimensions supplied.
        found: Dimensions,
    },
    /// Cell counts (or index ranges) differ.
    SizeMismatch {
        /// What was being combined.
        operation: &'static str,
        /// Size required by the receiver.
        expected: usize,
        /// Size supplied.
        found: usize,
    },
}

impl fmt::Display for DimensionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mismatch {
                operation,
                expected,
                found,
            } => write!(f, "{operation}: dimensions {found} do not match {expected}"),
            Self::SizeMismatch {
                operation,
                expected,
                found,
            } => write!(f, "{operation}: size {found} does not match {expected}"),
        }
    }
}

impl Error for DimensionError {}

/// Errors raised by an individual option while it runs.
///
/// Wrapped by the option list together with the option's name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionError {
    /// The coupled partner model is not (or no longer) registered.
    PartnerNotFound {
        /// Region the partner was looked up in.
        region: String,
        /// Model name looked up.
        model: String,
    },
    /// A field needed by the option is not registered on a mesh.
    FieldNotFound {
        /// Region searched.
        region: String,
        /// Missing field.
        field: String,
    },
    /// No cell map between two regions has been registered.
    MappingNotFound {
        /// Source region.
        from: String,
        /// Target region.
        to: String,
    },
    /// The option was dispatched a value type it does not handle.
    UnsupportedFieldType {
        /// Field name.
        field: String,
        /// Value type of the dispatched equation or field.
        value_type: &'static str,
    },
    /// A field or matrix combination failed.
    Dimension(DimensionError),
    /// Any other failure.
    ExecutionFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
}

impl fmt::Display for OptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PartnerNotFound { region, model } => {
                write!(f, "no coupled model '{model}' in region '{region}'")
            }
            Self::FieldNotFound { region, field } => {
                write!(f, "field '{field}' not found in region '{region}'")
            }
            Self::MappingNotFound { from, to } => {
                write!(f, "no cell map from region '{from}' to region '{to}'")
            }
            Self::UnsupportedFieldType { field, value_type } => {
                write!(f, "{value_type} field '{field}' is not supported")
            }
            Self::Dimension(e) => write!(f, "{e}"),
            Self::ExecutionFailed { reason } => write!(f, "execution failed: {reason}"),
        }
    }
}

impl Error for OptionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Dimension(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DimensionError> for OptionError {
    fn from(e: DimensionError) -> Self {
        Self::Dimension(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_type_lists_known_types() {
        let e = ConfigError::UnknownType {
            name: "heater".into(),
            type_name: "semiImplicitSauce".into(),
            known: vec!["semiImplicitSource".into(), "limitScalar".into()],
        };
        let msg = e.to_string();
        assert!(msg.contains("heater"));
        assert!(msg.contains("semiImplicitSauce"));
        assert!(msg.contains("semiImplicitSource, limitScalar"));
    }

    #[test]
    fn dimension_error_is_source_of_option_error() {
        let inner = DimensionError::Mismatch {
            operation: "matrix sum",
            expected: Dimensions::TEMPERATURE,
            found: Dimensions::POWER,
        };
        let outer = OptionError::from(inner.clone());
        assert_eq!(outer.to_string(), inner.to_string());
        assert!(outer.source().is_some());
    }
}
