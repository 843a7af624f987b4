//! Physical dimension sets.
//!
//! [`Dimensions`] stores the SI base-unit exponents of a quantity. Fields,
//! weights and matrices all carry one, and every combination of them is
//! checked so that a misconfigured contributor cannot silently add, say, a
//! power density to a temperature equation.

use std::fmt;
use std::ops::{Div, Mul};

const BASE_UNITS: [&str; 7] = ["kg", "m", "s", "K", "mol", "A", "cd"];

/// SI base-unit exponents: mass, length, time, temperature, moles,
/// current, luminous intensity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Dimensions {
    exponents: [i8; 7],
}

impl Dimensions {
    /// Dimensionless.
    pub const NONE: Self = Self::new(0, 0, 0, 0, 0, 0, 0);
    /// Mass `[kg]`.
    pub const MASS: Self = Self::new(1, 0, 0, 0, 0, 0, 0);
    /// Length `[m]`.
    pub const LENGTH: Self = Self::new(0, 1, 0, 0, 0, 0, 0);
    /// Time `[s]`.
    pub const TIME: Self = Self::new(0, 0, 1, 0, 0, 0, 0);
    /// Temperature `[K]`.
    pub const TEMPERATURE: Self = Self::new(0, 0, 0, 1, 0, 0, 0);
    /// Volume `[m^3]`.
    pub const VOLUME: Self = Self::new(0, 3, 0, 0, 0, 0, 0);
    /// Density `[kg m^-3]`.
    pub const DENSITY: Self = Self::new(1, -3, 0, 0, 0, 0, 0);
    /// Velocity `[m s^-1]`.
    pub const VELOCITY: Self = Self::new(0, 1, -1, 0, 0, 0, 0);
    /// Power `[kg m^2 s^-3]`.
    pub const POWER: Self = Self::new(1, 2, -3, 0, 0, 0, 0);

    /// Build from individual exponents.
    pub const fn new(
        mass: i8,
        length: i8,
        time: i8,
        temperature: i8,
        moles: i8,
        current: i8,
        luminous: i8,
    ) -> Self {
        Self {
            exponents: [mass, length, time, temperature, moles, current, luminous],
        }
    }

    /// Build from an exponent array in base-unit order.
    pub const fn from_exponents(exponents: [i8; 7]) -> Self {
        Self { exponents }
    }

    /// The exponent array in base-unit order.
    pub fn exponents(&self) -> [i8; 7] {
        self.exponents
    }

    /// Whether every exponent is zero.
    pub fn is_dimensionless(&self) -> bool {
        self.exponents == [0; 7]
    }

    /// Raise to an integer power.
    pub fn pow(self, n: i8) -> Self {
        let mut exponents = self.exponents;
        for e in &mut exponents {
            *e *= n;
        }
        Self { exponents }
    }
}

impl Mul for Dimensions {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut exponents = self.exponents;
        for (e, r) in exponents.iter_mut().zip(rhs.exponents) {
            *e += r;
        }
        Self { exponents }
    }
}

impl Div for Dimensions {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        let mut exponents = self.exponents;
        for (e, r) in exponents.iter_mut().zip(rhs.exponents) {
            *e -= r;
        }
        Self { exponents }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "[-]");
        }
        write!(f, "[")?;
        let mut first = true;
        for (unit, &e) in BASE_UNITS.iter().zip(&self.exponents) {
            if e == 0 {
                continue;
            }
            if !first {
                write!(f, " ")?;
            }
            first = false;
            if e == 1 {
                write!(f, "{unit}")?;
            } else {
                write!(f, "{unit}^{e}")?;
            }
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_dims() -> impl Strategy<Value = Dimensions> {
        prop::array::uniform7(-4i8..=4).prop_map(Dimensions::from_exponents)
    }

    #[test]
    fn volume_is_length_cubed() {
        assert_eq!(Dimensions::LENGTH.pow(3), Dimensions::VOLUME);
    }

    #[test]
    fn power_per_volume_per_kelvin() {
        let htc = Dimensions::POWER / Dimensions::VOLUME / Dimensions::TEMPERATURE;
        assert_eq!(htc, Dimensions::new(1, -1, -3, -1, 0, 0, 0));
        assert_eq!(htc * Dimensions::TEMPERATURE * Dimensions::VOLUME, Dimensions::POWER);
    }

    #[test]
    fn display_formats_exponents() {
        assert_eq!(Dimensions::NONE.to_string(), "[-]");
        assert_eq!(Dimensions::DENSITY.to_string(), "[kg m^-3]");
        assert_eq!(Dimensions::TEMPERATURE.to_string(), "[K]");
    }

    proptest! {
        #[test]
        fn mul_then_div_roundtrips(a in arb_dims(), b in arb_dims()) {
            prop_assert_eq!((a * b) / b, a);
        }

        #[test]
        fn mul_commutative(a in arb_dims(), b in arb_dims()) {
            prop_assert_eq!(a * b, b * a);
        }

        #[test]
        fn none_is_identity(a in arb_dims()) {
            prop_assert_eq!(a * Dimensions::NONE, a);
        }
    }
}
