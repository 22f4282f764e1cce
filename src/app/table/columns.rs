// src/app/table/columns.rs
// Column Visibility Store: the column chooser's checkboxes (staged edits) and the set of
// hidden columns the grid shows and the URL persists.

use super::grid::Grid;
use super::location::PageLocation;
use log::{debug, info};

pub const HIDDEN_COLUMN_PARAM: &str = "hidden_column";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnToggle {
    pub field: String,
    pub title: String,
    /// Checked means visible.
    pub checked: bool,
}

#[derive(Debug, Default)]
pub struct ColumnVisibilityStore {
    pub toggles: Vec<ColumnToggle>,
    hidden: Vec<String>,
}

impl ColumnVisibilityStore {
    pub fn from_grid<G: Grid>(grid: &G) -> Self {
        let toggles = grid
            .columns()
            .into_iter()
            .map(|c| ColumnToggle {
                field: c.field,
                title: c.title,
                checked: c.visible,
            })
            .collect();
        let mut store = Self {
            toggles,
            hidden: Vec::new(),
        };
        store.recount();
        store
    }

    pub fn hidden(&self) -> &[String] {
        &self.hidden
    }

    /// Value of the "N columns hidden" badge.
    pub fn hidden_count(&self) -> usize {
        self.hidden.len()
    }

    /// Hides the columns named in the URL once the grid is ready. Names the grid does not
    /// know are skipped.
    pub fn restore_from_url<G: Grid>(&mut self, grid: &mut G, location: &PageLocation) {
        for field in location.values(HIDDEN_COLUMN_PARAM) {
            if !grid.hide_column(&field) {
                debug!("Ignoring unknown hidden column '{}' from URL", field);
            }
        }
        self.resync(grid);
    }

    pub fn apply<G: Grid>(&mut self, grid: &mut G, location: &mut PageLocation) {
        for toggle in &self.toggles {
            if toggle.checked {
                grid.show_column(&toggle.field);
            } else {
                grid.hide_column(&toggle.field);
            }
        }
        self.recount();
        location.replace_params(
            &[HIDDEN_COLUMN_PARAM],
            self.hidden
                .iter()
                .map(|f| (HIDDEN_COLUMN_PARAM.to_string(), f.clone())),
        );
        grid.redraw();
        info!("Applied column visibility: {} hidden", self.hidden.len());
    }

    pub fn reset<G: Grid>(&mut self, grid: &mut G, location: &mut PageLocation) {
        for toggle in &mut self.toggles {
            grid.show_column(&toggle.field);
            toggle.checked = true;
        }
        self.hidden.clear();
        location.replace_params(&[HIDDEN_COLUMN_PARAM], Vec::new());
        grid.redraw();
        info!("Column visibility reset");
    }

    /// Staged only; nothing reaches the grid until `apply`.
    pub fn select_all(&mut self) {
        self.toggles.iter_mut().for_each(|t| t.checked = true);
    }

    pub fn deselect_all(&mut self) {
        self.toggles.iter_mut().for_each(|t| t.checked = false);
    }

    /// Discards staged changes when the chooser closes without applying.
    pub fn dismiss<G: Grid>(&mut self, grid: &G) {
        self.resync(grid);
    }

    fn resync<G: Grid>(&mut self, grid: &G) {
        for toggle in &mut self.toggles {
            if let Some(visible) = grid.is_column_visible(&toggle.field) {
                toggle.checked = visible;
            }
        }
        self.recount();
    }

    fn recount(&mut self) {
        self.hidden = self
            .toggles
            .iter()
            .filter(|t| !t.checked)
            .map(|t| t.field.clone())
            .collect();
    }
}
