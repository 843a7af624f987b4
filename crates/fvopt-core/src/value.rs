//! Per-cell value types and the [`FieldValue`] trait.
//!
//! The option list is generic over the value type of the field being
//! solved. Contributors, which live behind trait objects, receive the
//! equation or field wrapped in a tagged enum ([`Equation`], [`FieldMut`])
//! built by [`FieldValue::equation`] and [`FieldValue::field_mut`], so there
//! is one specialisation per concrete value type and no generic methods on
//! the object-safe traits.

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use crate::field::{FieldMut, VolField};
use crate::matrix::{Equation, FvMatrix};

/// A value stored per cell of a field.
pub trait FieldValue:
    Copy
    + Debug
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + Mul<f64, Output = Self>
    + AddAssign
    + SubAssign
    + 'static
{
    /// The additive identity.
    const ZERO: Self;

    /// Short name used in diagnostics (`"scalar"`, `"vector"`, `"tensor"`).
    const TYPE_NAME: &'static str;

    /// Tag a matrix of this value type for dispatch to contributors.
    fn equation(eqn: &mut FvMatrix<Self>) -> Equation<'_>;

    /// Tag a field of this value type for dispatch to contributors.
    fn field_mut(field: &mut VolField<Self>) -> FieldMut<'_>;
}

impl FieldValue for f64 {
    const ZERO: Self = 0.0;
    const TYPE_NAME: &'static str = "scalar";

    fn equation(eqn: &mut FvMatrix<Self>) -> Equation<'_> {
        Equation::Scalar(eqn)
    }

    fn field_mut(field: &mut VolField<Self>) -> FieldMut<'_> {
        FieldMut::Scalar(field)
    }
}

/// A three-component vector.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Vector(pub [f64; 3]);

/// A nine-component (3x3, row-major) tensor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tensor(pub [f64; 9]);

impl Default for Tensor {
    fn default() -> Self {
        Self::ZERO
    }
}

macro_rules! component_ops {
    ($ty:ident, $n:expr) => {
        impl Add for $ty {
            type Output = Self;
            fn add(mut self, rhs: Self) -> Self {
                self += rhs;
                self
            }
        }

        impl Sub for $ty {
            type Output = Self;
            fn sub(mut self, rhs: Self) -> Self {
                self -= rhs;
                self
            }
        }

        impl Neg for $ty {
            type Output = Self;
            fn neg(self) -> Self {
                self * -1.0
            }
        }

        impl Mul<f64> for $ty {
            type Output = Self;
            fn mul(mut self, rhs: f64) -> Self {
                for c in &mut self.0 {
                    *c *= rhs;
                }
                self
            }
        }

        impl AddAssign for $ty {
            fn add_assign(&mut self, rhs: Self) {
                for (c, r) in self.0.iter_mut().zip(rhs.0) {
                    *c += r;
                }
            }
        }

        impl SubAssign for $ty {
            fn sub_assign(&mut self, rhs: Self) {
                for (c, r) in self.0.iter_mut().zip(rhs.0) {
                    *c -= r;
                }
            }
        }

        impl From<[f64; $n]> for $ty {
            fn from(c: [f64; $n]) -> Self {
                Self(c)
            }
        }
    };
}

component_ops!(Vector, 3);
component_ops!(Tensor, 9);

impl FieldValue for Vector {
    const ZERO: Self = Vector([0.0; 3]);
    const TYPE_NAME: &'static str = "vector";

    fn equation(eqn: &mut FvMatrix<Self>) -> Equation<'_> {
        Equation::Vector(eqn)
    }

    fn field_mut(field: &mut VolField<Self>) -> FieldMut<'_> {
        FieldMut::Vector(field)
    }
}

impl FieldValue for Tensor {
    const ZERO: Self = Tensor([0.0; 9]);
    const TYPE_NAME: &'static str = "tensor";

    fn equation(eqn: &mut FvMatrix<Self>) -> Equation<'_> {
        Equation::Tensor(eqn)
    }

    fn field_mut(field: &mut VolField<Self>) -> FieldMut<'_> {
        FieldMut::Tensor(field)
    }
}

impl Tensor {
    /// The identity tensor.
    pub const IDENTITY: Self = Tensor([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_arithmetic() {
        let a = Vector([1.0, 2.0, 3.0]);
        let b = Vector([0.5, 0.5, 0.5]);
        assert_eq!(a + b, Vector([1.5, 2.5, 3.5]));
        assert_eq!(a - b, Vector([0.5, 1.5, 2.5]));
        assert_eq!(a * 2.0, Vector([2.0, 4.0, 6.0]));
        assert_eq!(-a, Vector([-1.0, -2.0, -3.0]));
    }

    #[test]
    fn tensor_zero_is_additive_identity() {
        let t = Tensor::IDENTITY * 3.0;
        assert_eq!(t + Tensor::ZERO, t);
        assert_eq!(Tensor::default(), Tensor::ZERO);
    }

    #[test]
    fn type_names() {
        assert_eq!(<f64 as FieldValue>::TYPE_NAME, "scalar");
        assert_eq!(Vector::TYPE_NAME, "vector");
        assert_eq!(Tensor::TYPE_NAME, "tensor");
    }
}
