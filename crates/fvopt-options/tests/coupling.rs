//! Integration test: two-region heat transfer coupling.
//!
//! A fluid and a solid region, one cell each, exchange heat through a
//! fixed coefficient. The solid is held at 350 K while the fluid starts
//! at 300 K and is driven to a steady state with a toy Euler solver.

use std::cell::Cell;
use std::rc::Rc;

use fvopt_core::{Dict, Dimensions, Entry, Mesh, MeshTopoChange, OptionError, VolField};
use fvopt_option::{FvOption, OptionList, OptionListError};
use fvopt_options::{
    standard_factory, CellMap, CellSelection, CellValue, ConstantHeatTransfer, CouplingHub,
    CouplingModel, CouplingSettings, FixedValueConstraint, HeatTransferCoefficient,
};
use fvopt_test_utils::{euler_ddt, solve_diagonal, MockMesh};

// ── Helpers ──────────────────────────────────────────────────────────

/// `[s^-1]`: a coefficient for a temperature equation without `rho * Cp`.
fn per_second() -> Dimensions {
    Dimensions::TIME.pow(-1)
}

fn coupling_dict(nbr_region: &str, semi_implicit: bool, master: bool) -> Dict {
    Dict::new()
        .with("type", Entry::word("constantHeatTransfer"))
        .with("nbrRegionName", Entry::word(nbr_region))
        .with("semiImplicit", Entry::Bool(semi_implicit))
        .with("master", Entry::Bool(master))
        .with(
            "h",
            Entry::Dimensioned {
                dimensions: per_second(),
                value: 0.5,
            },
        )
        .with(
            "AoV",
            Entry::Dimensioned {
                dimensions: Dimensions::NONE,
                value: 1.0,
            },
        )
}

fn region(name: &str, t: f64) -> Rc<MockMesh> {
    let mesh = Rc::new(MockMesh::uniform(name, 1, 1.0));
    mesh.set_scalar(VolField::uniform("T", Dimensions::TEMPERATURE, t, 1));
    mesh
}

struct Regions {
    hub: Rc<CouplingHub>,
    fluid: Rc<MockMesh>,
    solid: Rc<MockMesh>,
    fluid_options: OptionList,
    solid_options: OptionList,
}

fn two_regions(semi_implicit: bool) -> Regions {
    let hub = Rc::new(CouplingHub::new());
    hub.connect("fluid", "solid", CellMap::identity(1)).unwrap();
    let factory = standard_factory(&hub);
    let fluid = region("fluid", 300.0);
    let solid = region("solid", 350.0);

    let fluid_options = OptionList::new(
        fluid.clone(),
        &Dict::new().with_dict("htx", coupling_dict("solid", semi_implicit, true)),
        &factory,
    )
    .unwrap();
    let solid_options = OptionList::new(
        solid.clone(),
        &Dict::new().with_dict("htx", coupling_dict("fluid", semi_implicit, false)),
        &factory,
    )
    .unwrap();
    Regions {
        hub,
        fluid,
        solid,
        fluid_options,
        solid_options,
    }
}

/// Advance the fluid temperature `steps` times with `dt = 1`, holding the
/// solid fixed. Returns the final temperature and the first step's
/// combined matrix diagonal.
fn drive(regions: &mut Regions, steps: usize) -> (f64, f64) {
    let volumes = regions.fluid.cell_volumes();
    let mut t = VolField::uniform("T", Dimensions::TEMPERATURE, 300.0, 1);
    let mut first_diag = None;
    for _ in 0..steps {
        regions.fluid.set_scalar(t.clone());
        let mut eqn = euler_ddt(&t, &volumes, 1.0);
        let sources = regions.fluid_options.source(&t).unwrap();
        eqn.add_matrix(&sources).unwrap();
        first_diag.get_or_insert(eqn.diag()[0]);
        t.assign(&solve_diagonal(&eqn)).unwrap();
        regions.fluid.advance();
        regions.solid.advance();
    }
    (t.values()[0], first_diag.unwrap_or(0.0))
}

// ── Linearisation ────────────────────────────────────────────────────

#[test]
fn explicit_and_semi_implicit_reach_same_steady_state() {
    let mut explicit = two_regions(false);
    let mut implicit = two_regions(true);

    let (t_explicit, diag_explicit) = drive(&mut explicit, 200);
    let (t_implicit, diag_implicit) = drive(&mut implicit, 200);

    assert!((t_explicit - 350.0).abs() < 1e-6, "explicit: {t_explicit}");
    assert!((t_implicit - 350.0).abs() < 1e-6, "semi-implicit: {t_implicit}");
    // ddt alone gives V/dt = 1; the semi-implicit form adds htc * V.
    assert_eq!(diag_explicit, 1.0);
    assert_eq!(diag_implicit, 1.5);
}

#[test]
fn first_step_sources_differ_by_linearisation() {
    let mut explicit = two_regions(false);
    let mut implicit = two_regions(true);
    let t = VolField::uniform("T", Dimensions::TEMPERATURE, 300.0, 1);

    let e = explicit.fluid_options.source(&t).unwrap();
    assert_eq!(e.source(), &[0.5 * (350.0 - 300.0)]);
    assert_eq!(e.diag(), &[0.0]);

    let i = implicit.fluid_options.source(&t).unwrap();
    assert_eq!(i.source(), &[0.5 * 350.0]);
    assert_eq!(i.diag(), &[0.5]);
}

// ── Memoization ──────────────────────────────────────────────────────

struct Counting {
    calls: Rc<Cell<usize>>,
}

impl HeatTransferCoefficient for Counting {
    fn type_name(&self) -> &str {
        "countingHeatTransfer"
    }

    fn dimensions(&self) -> Dimensions {
        per_second()
    }

    fn correct_htc(&mut self, mesh: &dyn Mesh) -> Result<Vec<f64>, OptionError> {
        self.calls.set(self.calls.get() + 1);
        Ok(vec![1.0; mesh.n_cells()])
    }
}

fn counting_pair(calls: &Rc<Cell<usize>>) -> (Rc<MockMesh>, CouplingModel, CouplingModel) {
    let hub = Rc::new(CouplingHub::new());
    hub.connect("fluid", "solid", CellMap::identity(1)).unwrap();
    let fluid = region("fluid", 300.0);
    let solid = region("solid", 350.0);
    let master = CouplingModel::new(
        "htx",
        fluid.clone(),
        &hub,
        CouplingSettings::new("solid"),
        Box::new(Counting {
            calls: Rc::clone(calls),
        }),
    )
    .unwrap();
    let mut slave_settings = CouplingSettings::new("fluid");
    slave_settings.master = false;
    let slave = CouplingModel::new(
        "htx",
        solid,
        &hub,
        slave_settings,
        Box::new(Counting {
            calls: Rc::new(Cell::new(0)),
        }),
    )
    .unwrap();
    (fluid, master, slave)
}

#[test]
fn coefficient_recomputed_once_per_time_index() {
    let calls = Rc::new(Cell::new(0));
    let (fluid, mut master, mut slave) = counting_pair(&calls);

    master.correct().unwrap();
    master.correct().unwrap();
    slave.correct().unwrap();
    assert_eq!(calls.get(), 1);

    fluid.advance();
    master.correct().unwrap();
    assert_eq!(calls.get(), 2);
    slave.correct().unwrap();
    assert_eq!(calls.get(), 2);
}

#[test]
fn mesh_motion_forces_recompute() {
    let calls = Rc::new(Cell::new(0));
    let (_fluid, mut master, _slave) = counting_pair(&calls);
    master.correct().unwrap();
    assert!(master.move_points());
    master.correct().unwrap();
    assert_eq!(calls.get(), 2);
}

// ── Partner resolution ───────────────────────────────────────────────

#[test]
fn unresolvable_partner_is_a_lookup_error() {
    let hub = Rc::new(CouplingHub::new());
    let fluid = region("fluid", 300.0);
    let mut lonely = CouplingModel::new(
        "htx",
        fluid,
        &hub,
        CouplingSettings::new("nowhere"),
        Box::new(ConstantHeatTransfer::new(
            1.0,
            per_second(),
            fvopt_options::AreaPerVolume::Uniform(1.0),
            Dimensions::NONE,
        )),
    )
    .unwrap();

    assert!(matches!(
        lonely.correct(),
        Err(OptionError::PartnerNotFound { ref region, ref model })
            if region == "nowhere" && model == "htx"
    ));
    assert!(matches!(
        lonely.interpolate(&[1.0]),
        Err(OptionError::PartnerNotFound { .. })
    ));
}

#[test]
fn dropped_partner_fails_cleanly() {
    let mut regions = two_regions(true);
    assert!(regions.hub.has_model("solid", "htx"));
    assert_eq!(regions.solid_options.len(), 1);
    drop(regions.solid_options);
    assert!(!regions.hub.has_model("solid", "htx"));

    let t = VolField::uniform("T", Dimensions::TEMPERATURE, 300.0, 1);
    let err = regions.fluid_options.source(&t).unwrap_err();
    assert!(matches!(
        err,
        OptionListError::OptionFailed {
            ref name,
            reason: OptionError::PartnerNotFound { .. },
        } if name == "htx"
    ));
}

#[test]
fn missing_mapping_is_reported() {
    let hub = Rc::new(CouplingHub::new());
    let factory = standard_factory(&hub);
    let fluid = region("fluid", 300.0);
    let solid = region("solid", 350.0);
    let mut fluid_options = OptionList::new(
        fluid,
        &Dict::new().with_dict("htx", coupling_dict("solid", false, true)),
        &factory,
    )
    .unwrap();
    let _solid_options = OptionList::new(
        solid,
        &Dict::new().with_dict("htx", coupling_dict("fluid", false, false)),
        &factory,
    )
    .unwrap();

    let t = VolField::uniform("T", Dimensions::TEMPERATURE, 300.0, 1);
    assert!(matches!(
        fluid_options.source(&t),
        Err(OptionListError::OptionFailed {
            reason: OptionError::MappingNotFound { .. },
            ..
        })
    ));
}

// ── Mapping ──────────────────────────────────────────────────────────

#[test]
fn identity_mapping_is_exact() {
    let regions = two_regions(false);
    let hub = &regions.hub;
    let values = [300.0, -0.0, 1e-300, f64::MAX, 273.15];
    let map = CellMap::identity(values.len());
    assert_eq!(map.apply(&values).unwrap(), values);
    assert_eq!(hub.mapping("solid", "fluid").unwrap().apply(&[350.0]).unwrap(), [350.0]);
}

#[test]
fn coupled_cells_use_weighted_map() {
    // Two fluid cells share one solid cell.
    let hub = Rc::new(CouplingHub::new());
    hub.connect(
        "solid",
        "fluid",
        CellMap::weighted(1, vec![vec![(0, 1.0)], vec![(0, 1.0)]]).unwrap(),
    )
    .unwrap();
    let fluid = Rc::new(MockMesh::uniform("fluid", 2, 1.0));
    let solid = region("solid", 350.0);
    let fluid_htx = CouplingModel::new(
        "htx",
        fluid,
        &hub,
        CouplingSettings::new("solid"),
        Box::new(ConstantHeatTransfer::new(
            1.0,
            per_second(),
            fvopt_options::AreaPerVolume::Uniform(1.0),
            Dimensions::NONE,
        )),
    )
    .unwrap();
    let mut solid_settings = CouplingSettings::new("fluid");
    solid_settings.master = false;
    let _solid_htx = CouplingModel::new(
        "htx",
        solid,
        &hub,
        solid_settings,
        Box::new(ConstantHeatTransfer::new(
            1.0,
            per_second(),
            fvopt_options::AreaPerVolume::Uniform(1.0),
            Dimensions::NONE,
        )),
    )
    .unwrap();

    assert_eq!(fluid_htx.interpolate(&[350.0]).unwrap(), vec![350.0, 350.0]);
}

// ── Dimensions ───────────────────────────────────────────────────────

#[test]
fn coefficient_dimension_mismatch_names_option() {
    let hub = Rc::new(CouplingHub::new());
    hub.connect("fluid", "solid", CellMap::identity(1)).unwrap();
    let factory = standard_factory(&hub);
    // Default dimensions of h and AoV give W m^-3 K^-1, which does not fit
    // a plain temperature equation.
    let dict = |nbr: &str, master: bool| {
        Dict::new().with_dict(
            "htx",
            Dict::new()
                .with("type", Entry::word("constantHeatTransfer"))
                .with("nbrRegionName", Entry::word(nbr))
                .with("master", Entry::Bool(master))
                .with("h", Entry::Scalar(10.0))
                .with("AoV", Entry::Scalar(1.0)),
        )
    };
    let mut fluid_options = OptionList::new(region("fluid", 300.0), &dict("solid", true), &factory)
        .unwrap();
    let _solid_options =
        OptionList::new(region("solid", 350.0), &dict("fluid", false), &factory).unwrap();

    let t = VolField::uniform("T", Dimensions::TEMPERATURE, 300.0, 1);
    let err = fluid_options.source(&t).unwrap_err();
    assert!(matches!(
        err,
        OptionListError::OptionFailed {
            ref name,
            reason: OptionError::Dimension(_),
        } if name == "htx"
    ));
}

// ── Topology changes ─────────────────────────────────────────────────

#[test]
fn topology_change_reaches_every_option_in_list() {
    let calls = Rc::new(Cell::new(0));
    let hub = Rc::new(CouplingHub::new());
    hub.connect("fluid", "solid", CellMap::identity(2)).unwrap();
    let fluid = Rc::new(MockMesh::uniform("fluid", 2, 1.0));
    fluid.set_scalar(VolField::uniform("T", Dimensions::TEMPERATURE, 300.0, 2));
    let solid = Rc::new(MockMesh::uniform("solid", 2, 1.0));
    solid.set_scalar(VolField::uniform("T", Dimensions::TEMPERATURE, 350.0, 2));

    let master = CouplingModel::new(
        "htx",
        fluid.clone(),
        &hub,
        CouplingSettings::new("solid"),
        Box::new(Counting {
            calls: Rc::clone(&calls),
        }),
    )
    .unwrap();
    let mut slave_settings = CouplingSettings::new("fluid");
    slave_settings.master = false;
    let _slave = CouplingModel::new(
        "htx",
        solid,
        &hub,
        slave_settings,
        Box::new(Counting {
            calls: Rc::new(Cell::new(0)),
        }),
    )
    .unwrap();

    let mut list = OptionList::empty(fluid.clone());
    list.push(Box::new(FixedValueConstraint::new(
        "inlet",
        CellSelection::Cells(vec![1]),
        [("T", CellValue::Scalar(350.0))],
    )))
    .unwrap();
    list.push(Box::new(master)).unwrap();

    let t = VolField::uniform("T", Dimensions::TEMPERATURE, 300.0, 2);
    let mut eqn = list.source(&t).unwrap();
    list.constrain(&mut eqn).unwrap();
    assert_eq!(eqn.psi(), &[300.0, 350.0]);
    assert_eq!(calls.get(), 1);

    // The two cells swap places.
    list.update_mesh(&MeshTopoChange::new(2, vec![Some(1), Some(0)]));
    assert!(hub.mapping("fluid", "solid").is_err());
    assert!(hub.mapping("solid", "fluid").is_err());
    hub.connect("fluid", "solid", CellMap::identity(2)).unwrap();

    // Same time index, yet the coefficient is recomputed.
    let mut eqn = list.source(&t).unwrap();
    list.constrain(&mut eqn).unwrap();
    assert_eq!(eqn.psi(), &[350.0, 300.0]);
    assert_eq!(calls.get(), 2);
}
