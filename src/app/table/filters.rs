// src/app/table/filters.rs
// Filter State Store: the active field/operator/value filters, the editor rows the user
// edits, and their mirror in the page URL.

use super::location::PageLocation;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

pub const FIELD_PARAM: &str = "field";
pub const OPERATOR_PARAM: &str = "operator";
pub const VALUE_PARAM: &str = "value";

/// Operators the server-side data sources understand.
pub const OPERATORS: [&str; 7] = ["=", "!=", "<", "<=", ">", ">=", "like"];

/// One filter condition. Editor rows use the same shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub operator: String,
    pub value: String,
}

impl Filter {
    pub fn new(field: &str, operator: &str, value: &str) -> Self {
        Self {
            field: field.to_string(),
            operator: operator.to_string(),
            value: value.to_string(),
        }
    }

    /// A filter is only sent, kept or counted when all three parts are filled in.
    pub fn is_valid(&self) -> bool {
        !self.field.is_empty() && !self.operator.is_empty() && !self.value.is_empty()
    }
}

/// Serializes a filter list the way the ajax endpoint expects the `filters` parameter.
pub fn filters_json(filters: &[Filter]) -> String {
    serde_json::to_string(filters).unwrap_or_else(|_| "[]".to_string())
}

#[derive(Debug, Default)]
pub struct FilterStore {
    filters: Vec<Filter>,
    /// Rows of the filter editor, in insertion order.
    pub rows: Vec<Filter>,
    active_count: usize,
}

impl FilterStore {
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Value of the "N filters active" counter.
    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn can_clear(&self) -> bool {
        self.active_count > 0
    }

    pub fn ajax_filters(&self) -> String {
        filters_json(&self.filters)
    }

    /// Reads the repeated field/operator/value parameters positionally, keeping only
    /// complete filters. Lists of unequal length leave the store untouched.
    pub fn load_from_url(&mut self, location: &PageLocation) -> bool {
        let fields = location.values(FIELD_PARAM);
        let operators = location.values(OPERATOR_PARAM);
        let values = location.values(VALUE_PARAM);

        if fields.len() != operators.len() || fields.len() != values.len() {
            warn!(
                "Ignoring filters in URL: {} fields, {} operators, {} values",
                fields.len(),
                operators.len(),
                values.len()
            );
            return false;
        }

        self.filters = fields
            .into_iter()
            .zip(operators)
            .zip(values)
            .map(|((field, operator), value)| Filter {
                field,
                operator,
                value,
            })
            .filter(Filter::is_valid)
            .collect();
        self.rows = self.filters.clone();
        self.active_count = self.filters.len();
        debug!("Loaded {} filters from URL", self.filters.len());
        true
    }

    /// Recomputes the active filter list from the editor rows.
    pub fn collect_from_editor(&mut self) -> &[Filter] {
        self.filters = self.rows.iter().filter(|r| r.is_valid()).cloned().collect();
        self.active_count = self.filters.len();
        &self.filters
    }

    /// Drops half-filled rows so an abandoned edit does not linger.
    pub fn purge_invalid_rows(&mut self) {
        let before = self.rows.len();
        self.rows.retain(Filter::is_valid);
        if self.rows.len() != before {
            debug!("Purged {} incomplete filter rows", before - self.rows.len());
        }
    }

    pub fn sync_to_url(&self, location: &mut PageLocation) {
        let pairs = self.filters.iter().flat_map(|f| {
            [
                (FIELD_PARAM.to_string(), f.field.clone()),
                (OPERATOR_PARAM.to_string(), f.operator.clone()),
                (VALUE_PARAM.to_string(), f.value.clone()),
            ]
        });
        location.replace_params(&[FIELD_PARAM, OPERATOR_PARAM, VALUE_PARAM], pairs);
    }

    /// Runs the apply sequence and returns the `filters` ajax parameter to refetch with.
    pub fn apply(&mut self, location: &mut PageLocation) -> String {
        self.collect_from_editor();
        self.purge_invalid_rows();
        self.sync_to_url(location);
        info!("Applied {} filters", self.active_count);
        self.ajax_filters()
    }

    pub fn clear(&mut self, location: &mut PageLocation) -> String {
        self.rows.clear();
        self.apply(location)
    }

    pub fn add_row(&mut self) {
        self.rows.push(Filter::default());
    }

    pub fn remove_row(&mut self, index: usize) {
        if index < self.rows.len() {
            self.rows.remove(index);
        }
    }

    /// Called when the filter editor is dismissed.
    pub fn close_editor(&mut self) {
        self.purge_invalid_rows();
    }
}
