//! fvopt: pluggable source terms, constraints and corrections for
//! finite-volume solvers.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all fvopt sub-crates. For most users, adding `fvopt` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use std::rc::Rc;
//! use fvopt::prelude::*;
//! use fvopt_test_utils::MockMesh;
//!
//! let mesh = Rc::new(MockMesh::uniform("fluid", 4, 0.25));
//! let config = Dict::new().with_dict(
//!     "heater",
//!     Dict::new()
//!         .with("type", Entry::word("semiImplicitSource"))
//!         .with_dict(
//!             "sources",
//!             Dict::new().with_dict("T", Dict::new().with("explicit", Entry::Scalar(2.0))),
//!         ),
//! );
//! let factory = standard_factory(&Rc::new(CouplingHub::new()));
//! let mut options = OptionList::new(mesh, &config, &factory).unwrap();
//!
//! let t = VolField::uniform("T", Dimensions::TEMPERATURE, 300.0, 4);
//! let eqn = options.source(&t).unwrap();
//! // 2 over the whole region of volume 1, integrated over 0.25 per cell.
//! assert_eq!(eqn.source(), &[0.5; 4]);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `fvopt-core` | Dimensions, fields, matrices, dictionaries, mesh trait, errors |
//! | [`option`] | `fvopt-option` | Option traits, the option list and the factory |
//! | [`options`] | `fvopt-options` | Built-in options, coupling hub and cell maps |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and traits (`fvopt-core`).
///
/// Contains [`types::Dimensions`], [`types::VolField`], the equation
/// accumulator [`types::FvMatrix`], configuration [`types::Dict`]s and
/// the [`types::Mesh`] trait a solver implements.
pub use fvopt_core as types;

/// Option traits and dispatch (`fvopt-option`).
///
/// [`option::FvOption`] is the extension point for user-defined options;
/// [`option::OptionList`] routes equations to them.
pub use fvopt_option as option;

/// Built-in options (`fvopt-options`).
///
/// Includes [`options::SemiImplicitSource`],
/// [`options::FixedValueConstraint`], [`options::LimitScalar`] and the
/// inter-region [`options::CouplingModel`].
pub use fvopt_options as options;

/// Common imports for typical fvopt usage.
///
/// ```rust
/// use fvopt::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use fvopt_core::{
        Dict, Dimensions, Entry, Equation, FieldMut, FieldValue, FvMatrix, Mesh, MeshTopoChange,
        Tensor, TimeIndex, UnitField, Vector, VolField, Weight, Weights,
    };

    // Errors
    pub use fvopt_core::{ConfigError, DimensionError, OptionError};
    pub use fvopt_option::OptionListError;

    // Option traits and dispatch
    pub use fvopt_option::{
        ActiveFields, Capability, ConstraintOption, CorrectionOption, FvOption, OptionFactory,
        OptionList, SourceOption,
    };

    // Built-in options
    pub use fvopt_options::{
        standard_factory, CellMap, CellSelection, ConstantHeatTransfer, CouplingHub,
        CouplingModel, CouplingSettings, FixedValueConstraint, HeatTransferCoefficient,
        LimitScalar, SemiImplicitSource,
    };
}
