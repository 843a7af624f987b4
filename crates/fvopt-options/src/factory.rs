//! The factory pre-loaded with every built-in option type.

use std::rc::Rc;

use fvopt_option::{FvOption, OptionFactory};

use crate::constant_htc::ConstantHeatTransfer;
use crate::fixed_value::FixedValueConstraint;
use crate::hub::CouplingHub;
use crate::limit_scalar::LimitScalar;
use crate::semi_implicit_source::SemiImplicitSource;

/// A factory with all built-in types registered.
///
/// Coupling models created through it register with `hub`, so every
/// region of a run should be given a factory built from the same hub.
pub fn standard_factory(hub: &Rc<CouplingHub>) -> OptionFactory {
    let mut factory = OptionFactory::new();
    factory
        .register(SemiImplicitSource::TYPE_NAME, |name, dict, mesh| {
            let opt: Box<dyn FvOption> = Box::new(SemiImplicitSource::from_dict(name, dict, mesh)?);
            Ok(opt)
        })
        .register(FixedValueConstraint::TYPE_NAME, |name, dict, mesh| {
            let opt: Box<dyn FvOption> =
                Box::new(FixedValueConstraint::from_dict(name, dict, mesh)?);
            Ok(opt)
        })
        .register(LimitScalar::TYPE_NAME, |name, dict, mesh| {
            let opt: Box<dyn FvOption> = Box::new(LimitScalar::from_dict(name, dict, mesh)?);
            Ok(opt)
        });
    let hub = Rc::clone(hub);
    factory.register(ConstantHeatTransfer::TYPE_NAME, move |name, dict, mesh| {
        let opt: Box<dyn FvOption> = Box::new(ConstantHeatTransfer::from_dict(name, dict, mesh, &hub)?);
        Ok(opt)
    });
    factory
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_builtin_types() {
        let factory = standard_factory(&Rc::new(CouplingHub::new()));
        let types: Vec<&str> = factory.type_names().collect();
        assert_eq!(
            types,
            [
                "semiImplicitSource",
                "fixedValueConstraint",
                "limitScalar",
                "constantHeatTransfer"
            ]
        );
    }
}
