//! The [`FvOption`] trait and its capability traits.
//!
//! Every option declares, per [`Capability`], the fields it acts on. The
//! option list consults those declarations to route equations and to
//! check that each declared field was exercised once per step.

use std::fmt;

use fvopt_core::{Equation, FieldMut, MeshTopoChange, OptionError, Weights};
use indexmap::IndexSet;

// ── Capabilities ───────────────────────────────────────────────────

/// One of the three ways an option can act on a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Adds source terms while an equation is assembled.
    AddSup,
    /// Overwrites matrix rows before the solve.
    Constrain,
    /// Adjusts the field after the solve.
    Correct,
}

impl Capability {
    /// All capabilities, in dispatch order.
    pub const ALL: [Capability; 3] = [Self::AddSup, Self::Constrain, Self::Correct];

    /// Name used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AddSup => "source",
            Self::Constrain => "constraint",
            Self::Correct => "correction",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field names an option acts on, one ordered set per [`Capability`].
///
/// Fixed once the option is constructed. The option list also uses this
/// type to record which fields were exercised during the current step.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActiveFields {
    add_sup: IndexSet<String>,
    constrain: IndexSet<String>,
    correct: IndexSet<String>,
}

impl ActiveFields {
    /// No fields for any capability.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: declare source fields.
    pub fn with_add_sup<I, S>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(Capability::AddSup, fields)
    }

    /// Builder: declare constrained fields.
    pub fn with_constrain<I, S>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(Capability::Constrain, fields)
    }

    /// Builder: declare corrected fields.
    pub fn with_correct<I, S>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(Capability::Correct, fields)
    }

    /// Builder: declare fields for `capability`.
    pub fn with<I, S>(mut self, capability: Capability, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for f in fields {
            self.insert(capability, f);
        }
        self
    }

    /// Fields declared for `capability`, in declaration order.
    pub fn fields(&self, capability: Capability) -> &IndexSet<String> {
        match capability {
            Capability::AddSup => &self.add_sup,
            Capability::Constrain => &self.constrain,
            Capability::Correct => &self.correct,
        }
    }

    /// Whether `field` is declared for `capability`.
    pub fn contains(&self, capability: Capability, field: &str) -> bool {
        self.fields(capability).contains(field)
    }

    /// Add `field` to `capability`. Returns `false` if already present.
    pub fn insert(&mut self, capability: Capability, field: impl Into<String>) -> bool {
        let set = match capability {
            Capability::AddSup => &mut self.add_sup,
            Capability::Constrain => &mut self.constrain,
            Capability::Correct => &mut self.correct,
        };
        set.insert(field.into())
    }

    /// Empty every set.
    pub fn clear(&mut self) {
        self.add_sup.clear();
        self.constrain.clear();
        self.correct.clear();
    }

    /// Whether no field is declared for any capability.
    pub fn is_empty(&self) -> bool {
        self.add_sup.is_empty() && self.constrain.is_empty() && self.correct.is_empty()
    }
}

// ── Traits ─────────────────────────────────────────────────────────

/// A named contributor to the equations of one mesh region.
///
/// Capabilities are reached through the `as_*` accessors, which return
/// `None` unless the option implements them. An option that declares
/// fields for a capability must implement it; the option list rejects it
/// otherwise.
///
/// # Examples
///
/// ```
/// use fvopt_core::{Equation, OptionError, VolField, Weights};
/// use fvopt_option::{ActiveFields, FvOption, SourceOption};
///
/// struct Heater {
///     fields: ActiveFields,
///     power: f64,
/// }
///
/// impl FvOption for Heater {
///     fn name(&self) -> &str { "heater" }
///     fn type_name(&self) -> &str { "heater" }
///     fn active_fields(&self) -> &ActiveFields { &self.fields }
///     fn as_source(&mut self) -> Option<&mut dyn SourceOption> { Some(self) }
/// }
///
/// impl SourceOption for Heater {
///     fn add_sup(
///         &mut self,
///         eqn: Equation<'_>,
///         _weights: &Weights<'_>,
///         field_name: &str,
///     ) -> Result<(), OptionError> {
///         match eqn {
///             Equation::Scalar(m) => {
///                 let su = VolField::uniform("su", m.source_dimensions(), self.power, m.n_cells());
///                 Ok(m.add_explicit(&su)?)
///             }
///             other => Err(OptionError::UnsupportedFieldType {
///                 field: field_name.to_string(),
///                 value_type: other.value_type(),
///             }),
///         }
///     }
/// }
///
/// let mut heater = Heater { fields: ActiveFields::new().with_add_sup(["T"]), power: 1.0 };
/// assert!(heater.as_source().is_some());
/// assert!(heater.as_constraint().is_none());
/// ```
pub trait FvOption {
    /// Unique name within the region's option list.
    fn name(&self) -> &str;

    /// Registered type name (the `type` entry of its configuration).
    fn type_name(&self) -> &str;

    /// Fields this option acts on.
    fn active_fields(&self) -> &ActiveFields;

    /// Source capability, if implemented.
    fn as_source(&mut self) -> Option<&mut dyn SourceOption> {
        None
    }

    /// Constraint capability, if implemented.
    fn as_constraint(&mut self) -> Option<&mut dyn ConstraintOption> {
        None
    }

    /// Correction capability, if implemented.
    fn as_correction(&mut self) -> Option<&mut dyn CorrectionOption> {
        None
    }

    /// Remap cell-indexed state after a topology change.
    fn update_mesh(&mut self, _change: &MeshTopoChange) {}

    /// React to mesh motion. Returns `true` on success.
    fn move_points(&mut self) -> bool {
        true
    }
}

/// Adds source terms to an equation.
pub trait SourceOption {
    /// Add this option's contribution for `field_name` to `eqn`.
    ///
    /// `eqn` is a zero matrix owned by the caller; the option list sums
    /// the contributions of all options afterwards. `field_name` is the
    /// routing name, which may differ from the equation's field name.
    fn add_sup(
        &mut self,
        eqn: Equation<'_>,
        weights: &Weights<'_>,
        field_name: &str,
    ) -> Result<(), OptionError>;
}

/// Overwrites rows of an equation before it is solved.
///
/// Constraints are applied in registration order and the last one to
/// touch a cell wins.
pub trait ConstraintOption {
    /// Constrain `eqn`, whose field is `field_name`.
    fn constrain(&mut self, eqn: Equation<'_>, field_name: &str) -> Result<(), OptionError>;
}

/// Adjusts a field after it has been solved.
pub trait CorrectionOption {
    /// Correct `field` in place.
    fn correct(&mut self, field: FieldMut<'_>) -> Result<(), OptionError>;
}

/// Whether `option` implements `capability`.
pub fn implements(option: &mut dyn FvOption, capability: Capability) -> bool {
    match capability {
        Capability::AddSup => option.as_source().is_some(),
        Capability::Constrain => option.as_constraint().is_some(),
        Capability::Correct => option.as_correction().is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Inert {
        fields: ActiveFields,
    }

    impl FvOption for Inert {
        fn name(&self) -> &str {
            "inert"
        }

        fn type_name(&self) -> &str {
            "inert"
        }

        fn active_fields(&self) -> &ActiveFields {
            &self.fields
        }
    }

    #[test]
    fn default_accessors_report_no_capability() {
        let mut opt = Inert {
            fields: ActiveFields::new(),
        };
        for cap in Capability::ALL {
            assert!(!implements(&mut opt, cap));
        }
        assert!(opt.move_points());
    }

    #[test]
    fn active_fields_keep_declaration_order() {
        let f = ActiveFields::new()
            .with_add_sup(["T", "U", "T"])
            .with_correct(["T"]);
        let names: Vec<&str> = f
            .fields(Capability::AddSup)
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(names, vec!["T", "U"]);
        assert!(f.contains(Capability::Correct, "T"));
        assert!(!f.contains(Capability::Constrain, "T"));
    }

    #[test]
    fn clear_empties_all_sets() {
        let mut f = ActiveFields::new()
            .with_add_sup(["T"])
            .with_constrain(["U"]);
        assert!(!f.is_empty());
        f.clear();
        assert!(f.is_empty());
    }

    #[test]
    fn capability_names() {
        assert_eq!(Capability::AddSup.to_string(), "source");
        assert_eq!(Capability::Constrain.to_string(), "constraint");
        assert_eq!(Capability::Correct.to_string(), "correction");
    }
}
