// src/app/table/testing.rs
// In-memory stand-ins for the grid, the notifier and the transport, used by the tests.

use super::grid::{Grid, GridColumn, MenuAnchor, RefreshTicket, Row, Sorter};
use super::notify::{ConfirmPrompt, Notifier, Toast};
use super::request::{ApiRequest, RequestId, Transport};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Default)]
pub struct FakeGrid {
    pub columns: Vec<GridColumn>,
    pub rows: Vec<Row>,
    pub selected: BTreeSet<usize>,
    pub sorters: Vec<Sorter>,
    pub ajax_params: HashMap<String, String>,
    pub header_filters: HashMap<String, String>,
    pub refreshes: u64,
    pub redraws: usize,
    pub menus: Vec<(usize, MenuAnchor)>,
    pub processed_renders: usize,
}

impl FakeGrid {
    pub fn with_columns(fields: &[&str]) -> Self {
        Self {
            columns: fields
                .iter()
                .map(|f| GridColumn {
                    field: f.to_string(),
                    title: f.to_uppercase(),
                    visible: true,
                    header_filter: true,
                })
                .collect(),
            ..Default::default()
        }
    }

    pub fn with_rows(mut self, rows: Vec<Value>) -> Self {
        self.rows = rows
            .into_iter()
            .filter_map(|v| v.as_object().cloned())
            .collect();
        self
    }

    pub fn hidden(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| !c.visible)
            .map(|c| c.field.clone())
            .collect()
    }

    fn set_visible(&mut self, field: &str, visible: bool) -> bool {
        match self.columns.iter_mut().find(|c| c.field == field) {
            Some(column) => {
                column.visible = visible;
                true
            }
            None => false,
        }
    }
}

impl Grid for FakeGrid {
    fn columns(&self) -> Vec<GridColumn> {
        self.columns.clone()
    }

    fn show_column(&mut self, field: &str) -> bool {
        self.set_visible(field, true)
    }

    fn hide_column(&mut self, field: &str) -> bool {
        self.set_visible(field, false)
    }

    fn is_column_visible(&self, field: &str) -> Option<bool> {
        self.columns.iter().find(|c| c.field == field).map(|c| c.visible)
    }

    fn redraw(&mut self) {
        self.redraws += 1;
    }

    fn set_ajax_param(&mut self, name: &str, value: String) {
        self.ajax_params.insert(name.to_string(), value);
    }

    fn refresh(&mut self) -> RefreshTicket {
        self.refreshes += 1;
        RefreshTicket(self.refreshes)
    }

    fn row_data(&self, index: usize) -> Option<Row> {
        self.rows.get(index).cloned()
    }

    fn selected_rows(&self) -> Vec<Row> {
        self.selected
            .iter()
            .filter_map(|i| self.rows.get(*i).cloned())
            .collect()
    }

    fn toggle_row_selection(&mut self, index: usize) {
        if !self.selected.remove(&index) {
            self.selected.insert(index);
        }
    }

    fn sorters(&self) -> Vec<Sorter> {
        self.sorters.clone()
    }

    fn set_header_filter(&mut self, field: &str, value: &str) {
        self.header_filters.insert(field.to_string(), value.to_string());
    }

    fn open_row_menu(&mut self, index: usize, anchor: MenuAnchor) {
        self.menus.push((index, anchor));
    }

    fn process_rendered_content(&mut self) {
        self.processed_renders += 1;
    }
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub toasts: Vec<Toast>,
    pub prompts: Vec<ConfirmPrompt>,
}

impl Notifier for RecordingNotifier {
    fn toast(&mut self, toast: Toast) {
        self.toasts.push(toast);
    }

    fn confirm(&mut self, prompt: ConfirmPrompt) {
        self.prompts.push(prompt);
    }
}

#[derive(Debug, Default)]
pub struct RecordingTransport {
    pub sent: Vec<(RequestId, ApiRequest)>,
}

impl RecordingTransport {
    pub fn last(&self) -> Option<&(RequestId, ApiRequest)> {
        self.sent.last()
    }
}

impl Transport for RecordingTransport {
    fn send(&mut self, id: RequestId, request: ApiRequest) {
        self.sent.push((id, request));
    }
}
