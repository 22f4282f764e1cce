// src/app/table/header_filters.rs
// Show/hide toggles for the grid's inline per-column header filters. Independent of the
// filter editor: these drive the grid's own header filter, not the `filters` parameter.

use super::grid::Grid;
use log::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderFilterToggle {
    pub field: String,
    pub shown: bool,
    pub value: String,
}

impl HeaderFilterToggle {
    /// The toggle shows as active while the input has a value or is open.
    pub fn is_active(&self) -> bool {
        self.shown || !self.value.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct HeaderFilterToggles {
    toggles: Vec<HeaderFilterToggle>,
}

impl HeaderFilterToggles {
    /// One toggle per column that has an inline header filter.
    pub fn from_grid<G: Grid>(grid: &G) -> Self {
        let toggles = grid
            .columns()
            .into_iter()
            .filter(|c| c.header_filter)
            .map(|c| HeaderFilterToggle {
                field: c.field,
                shown: false,
                value: String::new(),
            })
            .collect();
        Self { toggles }
    }

    pub fn get(&self, field: &str) -> Option<&HeaderFilterToggle> {
        self.toggles.iter().find(|t| t.field == field)
    }

    fn get_mut(&mut self, field: &str) -> Option<&mut HeaderFilterToggle> {
        self.toggles.iter_mut().find(|t| t.field == field)
    }

    pub fn is_shown(&self, field: &str) -> bool {
        self.get(field).map(|t| t.shown).unwrap_or(false)
    }

    pub fn is_active(&self, field: &str) -> bool {
        self.get(field).map(HeaderFilterToggle::is_active).unwrap_or(false)
    }

    /// Flips the input's visibility. Hiding an input that still holds a value is refused.
    /// Returns whether anything changed.
    pub fn toggle(&mut self, field: &str) -> bool {
        let Some(toggle) = self.get_mut(field) else {
            return false;
        };
        if toggle.shown && !toggle.value.is_empty() {
            debug!("Not hiding header filter '{}': it holds a value", field);
            return false;
        }
        toggle.shown = !toggle.shown;
        true
    }

    /// Live update from typing; forwarded to the grid's header filter.
    pub fn set_value<G: Grid>(&mut self, grid: &mut G, field: &str, value: &str) {
        let Some(toggle) = self.get_mut(field) else {
            return;
        };
        if toggle.value == value {
            return;
        }
        toggle.value = value.to_string();
        grid.set_header_filter(field, value);
    }
}
