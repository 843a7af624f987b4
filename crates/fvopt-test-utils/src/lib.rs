//! Test utilities and mock types for fvopt development.
//!
//! Provides a [`MockMesh`] implementing [`Mesh`], a toy one-cell-per-row
//! solver ([`euler_ddt`], [`solve_diagonal`]) for driving equations to a
//! steady state, and reusable option fixtures in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::cell::{Cell, RefCell};

use fvopt_core::{Dimensions, FvMatrix, Mesh, TimeIndex, VolField};
use indexmap::IndexMap;

pub use fixtures::{ClampCorrection, ConstSource, FailingSource, PinConstraint};

/// Mock implementation of [`Mesh`].
///
/// Interior mutability lets tests advance time, register fields and
/// change volumes through the shared `Rc` the options hold.
pub struct MockMesh {
    region: String,
    volumes: RefCell<Vec<f64>>,
    time_index: Cell<TimeIndex>,
    scalars: RefCell<IndexMap<String, VolField<f64>>>,
}

impl MockMesh {
    pub fn new(region: impl Into<String>, volumes: Vec<f64>) -> Self {
        Self {
            region: region.into(),
            volumes: RefCell::new(volumes),
            time_index: Cell::new(TimeIndex(0)),
            scalars: RefCell::new(IndexMap::new()),
        }
    }

    /// `n_cells` cells of equal `volume`.
    pub fn uniform(region: impl Into<String>, n_cells: usize, volume: f64) -> Self {
        Self::new(region, vec![volume; n_cells])
    }

    pub fn set_time(&self, index: TimeIndex) {
        self.time_index.set(index);
    }

    /// Move to the next time index and return it.
    pub fn advance(&self) -> TimeIndex {
        let next = self.time_index.get().next();
        self.time_index.set(next);
        next
    }

    /// Register (or replace) a scalar field under its own name.
    pub fn set_scalar(&self, field: VolField<f64>) {
        self.scalars
            .borrow_mut()
            .insert(field.name().to_string(), field);
    }

    pub fn remove_scalar(&self, name: &str) {
        self.scalars.borrow_mut().shift_remove(name);
    }

    pub fn set_volumes(&self, volumes: Vec<f64>) {
        *self.volumes.borrow_mut() = volumes;
    }
}

impl Mesh for MockMesh {
    fn region(&self) -> &str {
        &self.region
    }

    fn n_cells(&self) -> usize {
        self.volumes.borrow().len()
    }

    fn cell_volumes(&self) -> Vec<f64> {
        self.volumes.borrow().clone()
    }

    fn time_index(&self) -> TimeIndex {
        self.time_index.get()
    }

    fn lookup_scalar(&self, name: &str) -> Option<VolField<f64>> {
        self.scalars.borrow().get(name).cloned()
    }
}

/// Euler time-derivative matrix `V/dt * (psi - psi_old)` for `field`.
///
/// Written in the options' sign convention, so an options matrix can be
/// added to it directly.
pub fn euler_ddt(field: &VolField<f64>, volumes: &[f64], dt: f64) -> FvMatrix<f64> {
    let dims = field.dimensions() * Dimensions::VOLUME / Dimensions::TIME;
    let mut m = FvMatrix::new(field, volumes, dims).expect("field and volumes must agree");
    for (i, &v) in volumes.iter().enumerate() {
        m.diag_mut()[i] = v / dt;
        m.source_mut()[i] = v / dt * field.values()[i];
    }
    m
}

/// Solve a diagonal-only system. Rows with zero diagonal keep `psi`.
pub fn solve_diagonal(m: &FvMatrix<f64>) -> Vec<f64> {
    m.diag()
        .iter()
        .zip(m.source())
        .zip(m.psi())
        .map(|((&d, &s), &p)| if d == 0.0 { p } else { s / d })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_mesh_time_and_fields() {
        let mesh = MockMesh::uniform("solid", 2, 0.5);
        assert_eq!(mesh.region(), "solid");
        assert_eq!(mesh.n_cells(), 2);
        assert_eq!(mesh.time_index(), TimeIndex(0));
        assert_eq!(mesh.advance(), TimeIndex(1));

        assert!(mesh.lookup_scalar("T").is_none());
        mesh.set_scalar(VolField::uniform("T", Dimensions::TEMPERATURE, 300.0, 2));
        assert_eq!(mesh.lookup_scalar("T").unwrap().values(), &[300.0, 300.0]);
        mesh.remove_scalar("T");
        assert!(mesh.lookup_scalar("T").is_none());
    }

    #[test]
    fn ddt_alone_keeps_old_value() {
        let t = VolField::new("T", Dimensions::TEMPERATURE, vec![300.0, 310.0]);
        let m = euler_ddt(&t, &[2.0, 1.0], 0.5);
        assert_eq!(solve_diagonal(&m), vec![300.0, 310.0]);
    }
}
