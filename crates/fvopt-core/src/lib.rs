//! Core types and traits for the fvopt finite-volume option framework.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! vocabulary shared by the option list and every contributor: time
//! indices, physical dimensions, per-cell fields and their value types,
//! the equation accumulator [`FvMatrix`], the parsed configuration
//! [`Dict`], the [`Mesh`] collaborator trait, and the error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod dict;
pub mod dimensions;
pub mod error;
pub mod field;
pub mod id;
pub mod matrix;
pub mod mesh;
pub mod value;

pub use dict::{Dict, Entry};
pub use dimensions::Dimensions;
pub use error::{ConfigError, DimensionError, OptionError};
pub use field::{FieldMut, UnitField, VolField, Weight, Weights};
pub use id::TimeIndex;
pub use matrix::{Equation, FvMatrix};
pub use mesh::{Mesh, MeshTopoChange};
pub use value::{FieldValue, Tensor, Vector};
