//! The mesh collaborator and topology-change notifications.

use crate::field::VolField;
use crate::id::TimeIndex;

/// A mesh region as seen by options.
///
/// The mesh itself, its geometry and its field database belong to the
/// solver. Options only need the region name, cell volumes, the current
/// time index, and lookup of registered scalar fields by name (for
/// fields other than the one being solved).
pub trait Mesh {
    /// Region name, unique across the run.
    fn region(&self) -> &str;

    /// Number of cells.
    fn n_cells(&self) -> usize;

    /// Cell volumes, one per cell.
    fn cell_volumes(&self) -> Vec<f64>;

    /// Current time index of the region's time database.
    fn time_index(&self) -> TimeIndex;

    /// A registered scalar field, by name.
    fn lookup_scalar(&self, name: &str) -> Option<VolField<f64>>;
}

/// Describes a mesh topology change.
///
/// `cell_map[new]` is the old cell a new cell was created from, or `None`
/// for cells inserted from nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MeshTopoChange {
    n_old_cells: usize,
    cell_map: Vec<Option<usize>>,
}

impl MeshTopoChange {
    /// Create a change description.
    pub fn new(n_old_cells: usize, cell_map: Vec<Option<usize>>) -> Self {
        Self {
            n_old_cells,
            cell_map,
        }
    }

    /// Cell count before the change.
    pub fn n_old_cells(&self) -> usize {
        self.n_old_cells
    }

    /// Cell count after the change.
    pub fn n_cells(&self) -> usize {
        self.cell_map.len()
    }

    /// Origin of each new cell.
    pub fn cell_map(&self) -> &[Option<usize>] {
        &self.cell_map
    }

    /// New cells whose origin is in `old_cells`, in ascending order.
    pub fn map_cells(&self, old_cells: &[usize]) -> Vec<usize> {
        let mut selected = vec![false; self.n_old_cells];
        for &c in old_cells {
            if c < self.n_old_cells {
                selected[c] = true;
            }
        }
        self.cell_map
            .iter()
            .enumerate()
            .filter_map(|(new, old)| match old {
                Some(o) if *o < self.n_old_cells && selected[*o] => Some(new),
                _ => None,
            })
            .collect()
    }

    /// Carry per-cell values over to the new cells; inserted cells get `fill`.
    pub fn map_values<T: Copy>(&self, old: &[T], fill: T) -> Vec<T> {
        self.cell_map
            .iter()
            .map(|o| o.and_then(|o| old.get(o).copied()).unwrap_or(fill))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refinement_maps_children_to_selected_parents() {
        // Cell 1 split into two; cell 0 kept.
        let change = MeshTopoChange::new(2, vec![Some(0), Some(1), Some(1)]);
        assert_eq!(change.n_cells(), 3);
        assert_eq!(change.map_cells(&[1]), vec![1, 2]);
        assert_eq!(change.map_cells(&[0]), vec![0]);
    }

    #[test]
    fn removed_cells_drop_out_and_inserted_cells_fill() {
        let change = MeshTopoChange::new(3, vec![Some(2), None]);
        assert_eq!(change.map_cells(&[0, 1]), Vec::<usize>::new());
        assert_eq!(change.map_values(&[1.0, 2.0, 3.0], -1.0), vec![3.0, -1.0]);
    }
}
