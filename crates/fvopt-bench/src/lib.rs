//! Benchmark profiles for the fvopt option framework.
//!
//! - [`source_profile`]: one region with many overlapping heat sources
//! - [`coupled_profile`]: two conformal regions joined by a heat transfer
//!   coupling

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::rc::Rc;

use fvopt_core::{Dict, Dimensions, Entry, VolField};
use fvopt_option::OptionList;
use fvopt_options::{standard_factory, CellMap, CouplingHub};
use fvopt_test_utils::MockMesh;

/// A region of `n_cells` unit cells with `n_sources` semi-implicit sources
/// on `T`, each covering every other cell.
pub fn source_profile(n_cells: usize, n_sources: usize) -> (Rc<MockMesh>, OptionList) {
    let mesh = Rc::new(MockMesh::uniform("fluid", n_cells, 1.0));
    let cells: Vec<usize> = (0..n_cells).step_by(2).collect();
    let mut config = Dict::new();
    for i in 0..n_sources {
        config.insert(
            format!("heater{i}"),
            Entry::Dict(
                Dict::new()
                    .with("type", Entry::word("semiImplicitSource"))
                    .with("selectionMode", Entry::word("cells"))
                    .with("cells", Entry::Labels(cells.clone()))
                    .with("volumeMode", Entry::word("specific"))
                    .with_dict(
                        "sources",
                        Dict::new().with_dict(
                            "T",
                            Dict::new()
                                .with("explicit", Entry::Scalar(1.0 + i as f64))
                                .with("implicit", Entry::Scalar(-0.01)),
                        ),
                    ),
            ),
        );
    }
    let factory = standard_factory(&Rc::new(CouplingHub::new()));
    let options = OptionList::new(mesh.clone(), &config, &factory)
        .expect("benchmark configuration is valid");
    (mesh, options)
}

/// Two coupled regions.
pub struct CoupledProfile {
    /// Shared hub.
    pub hub: Rc<CouplingHub>,
    /// Master side.
    pub fluid: Rc<MockMesh>,
    /// Slave side, temperature fixed at 350 K.
    pub solid: Rc<MockMesh>,
    /// Fluid options (one coupling model).
    pub fluid_options: OptionList,
    /// Solid options (the partner coupling model).
    pub solid_options: OptionList,
}

/// Two conformal regions of `n_cells` cells coupled by `constantHeatTransfer`.
pub fn coupled_profile(n_cells: usize, semi_implicit: bool) -> CoupledProfile {
    let hub = Rc::new(CouplingHub::new());
    hub.connect("fluid", "solid", CellMap::identity(n_cells))
        .expect("identity map reverses");
    let factory = standard_factory(&hub);

    let fluid = Rc::new(MockMesh::uniform("fluid", n_cells, 1.0));
    let solid = Rc::new(MockMesh::uniform("solid", n_cells, 1.0));
    fluid.set_scalar(temperature(n_cells, 300.0));
    solid.set_scalar(temperature(n_cells, 350.0));

    let coupling = |nbr: &str, master: bool| {
        Dict::new().with_dict(
            "htx",
            Dict::new()
                .with("type", Entry::word("constantHeatTransfer"))
                .with("nbrRegionName", Entry::word(nbr))
                .with("master", Entry::Bool(master))
                .with("semiImplicit", Entry::Bool(semi_implicit))
                .with(
                    "h",
                    Entry::Dimensioned {
                        dimensions: Dimensions::TIME.pow(-1),
                        value: 0.5,
                    },
                )
                .with(
                    "AoV",
                    Entry::Dimensioned {
                        dimensions: Dimensions::NONE,
                        value: 1.0,
                    },
                ),
        )
    };
    let fluid_options = OptionList::new(fluid.clone(), &coupling("solid", true), &factory)
        .expect("benchmark configuration is valid");
    let solid_options = OptionList::new(solid.clone(), &coupling("fluid", false), &factory)
        .expect("benchmark configuration is valid");

    CoupledProfile {
        hub,
        fluid,
        solid,
        fluid_options,
        solid_options,
    }
}

/// Uniform temperature field `T`.
pub fn temperature(n_cells: usize, value: f64) -> VolField<f64> {
    VolField::uniform("T", Dimensions::TEMPERATURE, value, n_cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_profile_sums_all_sources() {
        let (_mesh, mut options) = source_profile(4, 3);
        let eqn = options.source(&temperature(4, 300.0)).unwrap();
        // 1 + 2 + 3 on even cells only.
        assert_eq!(eqn.source(), &[6.0, 0.0, 6.0, 0.0]);
    }

    #[test]
    fn coupled_profile_dispatches_on_both_sides() {
        let mut p = coupled_profile(8, true);
        let fluid = p.fluid_options.source(&temperature(8, 300.0)).unwrap();
        assert_eq!(fluid.source()[0], 175.0);
        let solid = p.solid_options.source(&temperature(8, 350.0)).unwrap();
        assert_eq!(solid.source()[0], 150.0);
        assert!(p.hub.has_model("solid", "htx"));
    }
}
