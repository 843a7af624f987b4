//! Configured per-cell values of any supported value type.

use fvopt_core::{ConfigError, Dict, Entry, Tensor, Vector};

/// A constant read from configuration: a scalar, a 3-vector or a tensor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CellValue {
    /// Scalar value.
    Scalar(f64),
    /// Vector value, written `(x y z)`.
    Vector(Vector),
    /// Tensor value, written as nine row-major components.
    Tensor(Tensor),
}

impl CellValue {
    /// Read `key` from `dict`.
    pub fn from_dict(dict: &Dict, key: &str) -> Result<Self, ConfigError> {
        match dict.lookup(key)? {
            Entry::Scalar(v) => Ok(Self::Scalar(*v)),
            Entry::Dimensioned { value, .. } => Ok(Self::Scalar(*value)),
            Entry::List(c) => match c.len() {
                3 => Ok(Self::Vector(Vector([c[0], c[1], c[2]]))),
                9 => {
                    let mut t = [0.0; 9];
                    t.copy_from_slice(c);
                    Ok(Self::Tensor(Tensor(t)))
                }
                n => Err(dict.invalid(key, format!("expected 3 or 9 components, found {n}"))),
            },
            other => Err(dict.invalid(
                key,
                format!("expected scalar, vector or tensor, found {}", other.kind()),
            )),
        }
    }

    /// Value type name, matching [`FieldValue::TYPE_NAME`](fvopt_core::FieldValue::TYPE_NAME).
    pub fn value_type(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Vector(_) => "vector",
            Self::Tensor(_) => "tensor",
        }
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        Self::Scalar(v)
    }
}

impl From<Vector> for CellValue {
    fn from(v: Vector) -> Self {
        Self::Vector(v)
    }
}

impl From<Tensor> for CellValue {
    fn from(v: Tensor) -> Self {
        Self::Tensor(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_shape() {
        let d = Dict::named("s")
            .with("a", Entry::Scalar(2.0))
            .with("b", Entry::List(vec![1.0, 2.0, 3.0]))
            .with("c", Entry::List(vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]))
            .with("d", Entry::List(vec![1.0, 2.0]));
        assert_eq!(CellValue::from_dict(&d, "a").unwrap(), CellValue::Scalar(2.0));
        assert_eq!(
            CellValue::from_dict(&d, "b").unwrap(),
            CellValue::Vector(Vector([1.0, 2.0, 3.0]))
        );
        assert_eq!(
            CellValue::from_dict(&d, "c").unwrap(),
            CellValue::Tensor(Tensor::IDENTITY)
        );
        assert!(matches!(
            CellValue::from_dict(&d, "d"),
            Err(ConfigError::InvalidEntry { .. })
        ));
    }
}
