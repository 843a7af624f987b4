//! Finite-volume option trait, option list and factory.
//!
//! An [`FvOption`] contributes to the equations assembled on one mesh
//! region: volumetric sources through [`SourceOption`], row overrides
//! through [`ConstraintOption`], and post-solve adjustments through
//! [`CorrectionOption`]. The [`OptionList`] owns the options of a region,
//! routes each equation to the options that declared its field, and checks
//! once per time step that every declared field was actually exercised.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod factory;
pub mod list;
pub mod option;
pub mod report;

pub use factory::{OptionConstructor, OptionFactory};
pub use list::{OptionList, OptionListError, Unapplied};
pub use option::{
    implements, ActiveFields, Capability, ConstraintOption, CorrectionOption, FvOption,
    SourceOption,
};
pub use report::{OptionSummary, OptionsReport};
