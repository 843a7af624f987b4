//! Built-in finite-volume options for fvopt.
//!
//! - [`SemiImplicitSource`]: constant `Su + Sp * psi` sources.
//! - [`FixedValueConstraint`]: pins field values over a cell selection.
//! - [`LimitScalar`]: clips a scalar field after the solve.
//! - [`CouplingModel`]: heat transfer between two regions, with the
//!   [`ConstantHeatTransfer`] closure.
//!
//! Coupling partners find each other through a shared [`CouplingHub`],
//! which also holds the [`CellMap`]s between region meshes.
//! [`standard_factory`] registers every type above for configuration.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cell_map;
pub mod constant_htc;
pub mod coupling;
pub mod factory;
pub mod fixed_value;
pub mod hub;
pub mod limit_scalar;
pub mod selection;
pub mod semi_implicit_source;
pub mod value;

pub use cell_map::CellMap;
pub use constant_htc::{AreaPerVolume, ConstantHeatTransfer};
pub use coupling::{CouplingModel, CouplingSettings, CouplingState, HeatTransferCoefficient};
pub use factory::standard_factory;
pub use fixed_value::FixedValueConstraint;
pub use hub::CouplingHub;
pub use limit_scalar::{LimitScalar, LimitScalarBuilder};
pub use selection::CellSelection;
pub use semi_implicit_source::{SemiImplicitSource, SemiImplicitSourceBuilder, VolumeMode};
pub use value::CellValue;
