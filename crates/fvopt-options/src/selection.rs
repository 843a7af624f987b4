//! Cell subsets an option acts on.

use fvopt_core::{ConfigError, Dict, MeshTopoChange};

/// The cells an option acts on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CellSelection {
    /// Every cell of the mesh.
    All,
    /// An explicit, sorted and deduplicated list of cells.
    Cells(Vec<usize>),
}

impl CellSelection {
    /// Valid `selectionMode` words.
    pub const MODES: [&'static str; 2] = ["all", "cells"];

    /// An explicit selection, validated against `n_cells`.
    pub fn cells(mut cells: Vec<usize>, n_cells: usize) -> Result<Self, String> {
        if let Some(&bad) = cells.iter().find(|&&c| c >= n_cells) {
            return Err(format!("cell {bad} out of range for a mesh of {n_cells} cells"));
        }
        cells.sort_unstable();
        cells.dedup();
        Ok(Self::Cells(cells))
    }

    /// Read `selectionMode` (default `all`) and, for `cells`, the `cells` list.
    pub fn from_dict(dict: &Dict, n_cells: usize) -> Result<Self, ConfigError> {
        match dict.word_or("selectionMode", "all")? {
            "all" => Ok(Self::All),
            "cells" => {
                let cells = dict.get_labels("cells")?.to_vec();
                Self::cells(cells, n_cells).map_err(|reason| dict.invalid("cells", reason))
            }
            other => Err(dict.invalid(
                "selectionMode",
                format!("unknown mode '{other}' (valid modes: {})", Self::MODES.join(", ")),
            )),
        }
    }

    /// Selected cell indices on a mesh of `n_cells` cells.
    pub fn resolve(&self, n_cells: usize) -> Vec<usize> {
        match self {
            Self::All => (0..n_cells).collect(),
            Self::Cells(c) => c.iter().copied().filter(|&i| i < n_cells).collect(),
        }
    }

    /// Total volume of the selected cells.
    pub fn volume(&self, volumes: &[f64]) -> f64 {
        match self {
            Self::All => volumes.iter().sum(),
            Self::Cells(c) => c.iter().filter_map(|&i| volumes.get(i)).sum(),
        }
    }

    /// Follow the selected cells through a topology change.
    pub fn update_mesh(&mut self, change: &MeshTopoChange) {
        if let Self::Cells(c) = self {
            *c = change.map_cells(c);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fvopt_core::Entry;

    #[test]
    fn default_mode_is_all() {
        let sel = CellSelection::from_dict(&Dict::named("heater"), 3).unwrap();
        assert_eq!(sel, CellSelection::All);
        assert_eq!(sel.resolve(3), vec![0, 1, 2]);
        assert_eq!(sel.volume(&[1.0, 2.0, 3.0]), 6.0);
    }

    #[test]
    fn cell_list_sorted_and_deduplicated() {
        let d = Dict::named("heater")
            .with("selectionMode", Entry::word("cells"))
            .with("cells", Entry::Labels(vec![2, 0, 2]));
        let sel = CellSelection::from_dict(&d, 3).unwrap();
        assert_eq!(sel, CellSelection::Cells(vec![0, 2]));
        assert_eq!(sel.volume(&[1.0, 2.0, 3.0]), 4.0);
    }

    #[test]
    fn out_of_range_cell_rejected() {
        let d = Dict::named("heater")
            .with("selectionMode", Entry::word("cells"))
            .with("cells", Entry::Labels(vec![5]));
        assert!(matches!(
            CellSelection::from_dict(&d, 3),
            Err(ConfigError::InvalidEntry { .. })
        ));
    }

    #[test]
    fn unknown_mode_lists_valid_modes() {
        let d = Dict::named("heater").with("selectionMode", Entry::word("cellZone"));
        let err = CellSelection::from_dict(&d, 3).unwrap_err();
        assert!(err.to_string().contains("all, cells"));
    }

    #[test]
    fn follows_refinement() {
        let mut sel = CellSelection::Cells(vec![1]);
        sel.update_mesh(&MeshTopoChange::new(2, vec![Some(0), Some(1), Some(1)]));
        assert_eq!(sel, CellSelection::Cells(vec![1, 2]));
    }
}
