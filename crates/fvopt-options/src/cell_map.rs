//! Cell-to-cell interpolation between two region meshes.
//!
//! The geometric construction of a map (overlap volumes, nearest cells)
//! belongs to the caller; a [`CellMap`] only stores and applies it.

use fvopt_core::{DimensionError, FieldValue};
use smallvec::SmallVec;

type Donors = SmallVec<[(usize, f64); 4]>;

/// Maps per-cell values from a source mesh onto a target mesh.
#[derive(Clone, Debug, PartialEq)]
pub enum CellMap {
    /// Conformal meshes: target cell `i` is source cell `i`.
    Identity {
        /// Cell count of both meshes.
        n_cells: usize,
    },
    /// Each target cell is a weighted average of source cells.
    Weighted {
        /// Source cell count.
        n_source: usize,
        /// Per target cell, `(source cell, weight)` with weights summing to one.
        donors: Vec<Donors>,
    },
}

impl CellMap {
    /// One-to-one map between meshes with `n_cells` cells.
    pub fn identity(n_cells: usize) -> Self {
        Self::Identity { n_cells }
    }

    /// Weighted map. `donors[t]` lists `(source cell, weight)` pairs for
    /// target cell `t`; weights are normalised to sum to one.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a target has no donors, a source index is out of
    /// range, or a weight is negative or not finite.
    pub fn weighted(n_source: usize, donors: Vec<Vec<(usize, f64)>>) -> Result<Self, String> {
        let mut normalised = Vec::with_capacity(donors.len());
        for (t, list) in donors.into_iter().enumerate() {
            if list.is_empty() {
                return Err(format!("target cell {t} has no donor cells"));
            }
            let mut total = 0.0;
            for &(s, w) in &list {
                if s >= n_source {
                    return Err(format!(
                        "target cell {t}: donor {s} out of range for {n_source} source cells"
                    ));
                }
                if !w.is_finite() || w < 0.0 {
                    return Err(format!("target cell {t}: invalid weight {w}"));
                }
                total += w;
            }
            if total <= 0.0 {
                return Err(format!("target cell {t} has zero total weight"));
            }
            normalised.push(list.into_iter().map(|(s, w)| (s, w / total)).collect());
        }
        Ok(Self::Weighted {
            n_source,
            donors: normalised,
        })
    }

    /// Source cell count.
    pub fn n_source(&self) -> usize {
        match self {
            Self::Identity { n_cells } => *n_cells,
            Self::Weighted { n_source, .. } => *n_source,
        }
    }

    /// Target cell count.
    pub fn n_target(&self) -> usize {
        match self {
            Self::Identity { n_cells } => *n_cells,
            Self::Weighted { donors, .. } => donors.len(),
        }
    }

    /// Map source values onto the target cells.
    ///
    /// The identity map returns the input unchanged.
    pub fn apply<T: FieldValue>(&self, values: &[T]) -> Result<Vec<T>, DimensionError> {
        if values.len() != self.n_source() {
            return Err(DimensionError::SizeMismatch {
                operation: "cell map",
                expected: self.n_source(),
                found: values.len(),
            });
        }
        match self {
            Self::Identity { .. } => Ok(values.to_vec()),
            Self::Weighted { donors, .. } => Ok(donors
                .iter()
                .map(|list| {
                    list.iter()
                        .fold(T::ZERO, |acc, &(s, w)| acc + values[s] * w)
                })
                .collect()),
        }
    }

    /// The map in the opposite direction.
    ///
    /// Each source cell becomes a weighted average of the target cells
    /// that draw from it.
    ///
    /// # Errors
    ///
    /// Returns `Err` if some source cell is not a donor of any target.
    pub fn reverse(&self) -> Result<Self, String> {
        match self {
            Self::Identity { n_cells } => Ok(Self::identity(*n_cells)),
            Self::Weighted { n_source, donors } => {
                let mut reversed = vec![Vec::new(); *n_source];
                for (t, list) in donors.iter().enumerate() {
                    for &(s, w) in list {
                        reversed[s].push((t, w));
                    }
                }
                Self::weighted(donors.len(), reversed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fvopt_core::Vector;
    use proptest::prelude::*;

    #[test]
    fn weighted_map_averages_donors() {
        let map = CellMap::weighted(3, vec![vec![(0, 1.0), (1, 3.0)], vec![(2, 2.0)]]).unwrap();
        assert_eq!(map.n_source(), 3);
        assert_eq!(map.n_target(), 2);
        assert_eq!(map.apply(&[4.0, 8.0, 5.0]).unwrap(), vec![7.0, 5.0]);
    }

    #[test]
    fn weighted_map_validation() {
        assert!(CellMap::weighted(1, vec![vec![]]).is_err());
        assert!(CellMap::weighted(1, vec![vec![(1, 1.0)]]).is_err());
        assert!(CellMap::weighted(1, vec![vec![(0, -1.0)]]).is_err());
        assert!(CellMap::weighted(1, vec![vec![(0, 0.0)]]).is_err());
    }

    #[test]
    fn apply_checks_source_size() {
        let map = CellMap::identity(2);
        assert!(matches!(
            map.apply(&[1.0]),
            Err(DimensionError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn reverse_of_coarsening_spreads_back() {
        // Two fine source cells feed one coarse target.
        let map = CellMap::weighted(2, vec![vec![(0, 1.0), (1, 1.0)]]).unwrap();
        let back = map.reverse().unwrap();
        assert_eq!(back.n_source(), 1);
        assert_eq!(back.n_target(), 2);
        assert_eq!(back.apply(&[5.0]).unwrap(), vec![5.0, 5.0]);
    }

    #[test]
    fn reverse_fails_for_unused_source_cell() {
        let map = CellMap::weighted(2, vec![vec![(0, 1.0)]]).unwrap();
        assert!(map.reverse().is_err());
    }

    proptest! {
        #[test]
        fn identity_map_is_exact(values in prop::collection::vec(-1e12f64..1e12, 0..32)) {
            let map = CellMap::identity(values.len());
            prop_assert_eq!(map.apply(&values).unwrap(), values);
        }

        #[test]
        fn uniform_field_survives_weighted_map(
            value in -1e3f64..1e3,
            weights in prop::collection::vec(0.1f64..10.0, 1..6),
        ) {
            let n = weights.len();
            let donors = vec![weights.iter().copied().enumerate().collect::<Vec<_>>()];
            let map = CellMap::weighted(n, donors).unwrap();
            let out = map.apply(&vec![Vector([value, 0.0, -value]); n]).unwrap();
            prop_assert!((out[0].0[0] - value).abs() < 1e-9);
            prop_assert!((out[0].0[2] + value).abs() < 1e-9);
        }
    }
}
