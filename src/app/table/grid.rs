// src/app/table/grid.rs
// Grid Adapter: the contract of the grid widget, the options it is built from, and the
// adapter that wires controller state into it (ajax params, page tracking, total count,
// row menu and row-header selection).

use super::actions::RowAction;
use super::bootstrap::TableBootstrap;
use super::error::TableError;
use super::i18n::{pagination_labels, Translator};
use super::location::{PageLocation, PAGE_PARAM};
use log::{debug, trace, warn};
use serde::Deserialize;
use serde_json::{Map, Value};

/// A row as the server sends it.
pub type Row = Map<String, Value>;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const PAGE_SIZES: [u32; 5] = [5, 10, 25, 50, 100];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sorter {
    pub field: String,
    pub dir: SortDir,
}

/// Column as the grid currently has it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridColumn {
    pub field: String,
    pub title: String,
    pub visible: bool,
    pub header_filter: bool,
}

/// Screen position a menu should open at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MenuAnchor {
    pub x: f32,
    pub y: f32,
}

/// Handed out by `Grid::refresh`; the grid reports it back in `DataLoaded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RefreshTicket(pub u64);

/// Lifecycle notifications from the grid, dispatched by the controller in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    TableBuilt,
    /// Fired after every render, not just the first.
    RenderComplete,
    PageLoaded { page: u32 },
    DataLoaded {
        ticket: Option<RefreshTicket>,
        total: Option<u64>,
    },
    /// A data request failed; the rows on screen are unchanged.
    DataFailed {
        ticket: Option<RefreshTicket>,
        error: String,
    },
}

/// Body of a grid data GET.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageResponse {
    #[serde(default)]
    pub data: Vec<Row>,
    #[serde(default = "one")]
    pub last_page: u32,
    #[serde(default)]
    pub total: Option<u64>,
}

fn one() -> u32 {
    1
}

/// The grid widget. Treated as a black box: it fetches and renders pages itself.
pub trait Grid {
    fn columns(&self) -> Vec<GridColumn>;
    /// Returns false for unknown columns.
    fn show_column(&mut self, field: &str) -> bool;
    fn hide_column(&mut self, field: &str) -> bool;
    fn is_column_visible(&self, field: &str) -> Option<bool>;
    /// Recomputes column layout.
    fn redraw(&mut self);
    /// Extra parameter sent with every data request.
    fn set_ajax_param(&mut self, name: &str, value: String);
    /// Refetches the current page with the current ajax parameters.
    fn refresh(&mut self) -> RefreshTicket;
    fn row_data(&self, index: usize) -> Option<Row>;
    fn selected_rows(&self) -> Vec<Row>;
    fn toggle_row_selection(&mut self, index: usize);
    fn sorters(&self) -> Vec<Sorter>;
    /// Sets the grid's own inline header filter for a column.
    fn set_header_filter(&mut self, field: &str, value: &str);
    fn open_row_menu(&mut self, index: usize, anchor: MenuAnchor);
    /// Host hook run on newly rendered content (activates markup in cells).
    fn process_rendered_content(&mut self);
}

/// Per-column options understood by the grid.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnOptions {
    pub field: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "yes")]
    pub visible: bool,
    #[serde(default = "yes")]
    pub header_sort: bool,
    #[serde(default)]
    pub header_filter: Option<Value>,
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub min_width: Option<f32>,
}

fn yes() -> bool {
    true
}

impl ColumnOptions {
    /// Title, or the field name title-cased (`created_at` -> `Created At`).
    pub fn display_title(&self) -> String {
        if let Some(title) = &self.title {
            return title.clone();
        }
        self.field
            .split('_')
            .filter(|w| !w.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" ")
    }

    pub fn has_header_filter(&self) -> bool {
        match &self.header_filter {
            None | Some(Value::Null) | Some(Value::Bool(false)) => false,
            Some(_) => true,
        }
    }
}

/// Resolved grid options: the server configuration with the client-side overrides applied.
#[derive(Debug, Clone)]
pub struct GridOptions {
    raw: Map<String, Value>,
}

impl GridOptions {
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    pub fn ajax_url(&self) -> Option<&str> {
        self.raw.get("ajaxURL").and_then(Value::as_str)
    }

    pub fn initial_page(&self) -> u32 {
        self.raw
            .get("paginationInitialPage")
            .and_then(Value::as_u64)
            .and_then(|p| u32::try_from(p).ok())
            .unwrap_or(1)
    }

    pub fn page_size(&self) -> u32 {
        self.raw
            .get("paginationSize")
            .and_then(Value::as_u64)
            .and_then(|p| u32::try_from(p).ok())
            .filter(|p| *p > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn placeholder(&self) -> &str {
        self.raw
            .get("placeholder")
            .and_then(Value::as_str)
            .unwrap_or("No data found")
    }

    pub fn selectable(&self) -> bool {
        self.raw
            .get("selectableRows")
            .map(|v| !matches!(v, Value::Null | Value::Bool(false)))
            .unwrap_or(false)
    }

    pub fn row_header(&self) -> bool {
        self.raw
            .get("rowHeader")
            .map(|v| !matches!(v, Value::Null | Value::Bool(false)))
            .unwrap_or(false)
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.raw
            .get("langs")
            .and_then(|l| l.pointer(&format!("/default/pagination/{}", key)))
            .and_then(Value::as_str)
    }

    /// Column options; malformed entries are skipped.
    pub fn columns(&self) -> Vec<ColumnOptions> {
        let Some(columns) = self.raw.get("columns").and_then(Value::as_array) else {
            return Vec::new();
        };
        columns
            .iter()
            .filter_map(|c| match serde_json::from_value::<ColumnOptions>(c.clone()) {
                Ok(column) => Some(column),
                Err(e) => {
                    warn!("Skipping malformed column definition {}: {}", c, e);
                    None
                }
            })
            .collect()
    }
}

#[derive(Debug)]
pub struct GridAdapter {
    row_actions: Vec<RowAction>,
    row_header: bool,
    total_rows: Option<u64>,
}

impl GridAdapter {
    /// Merges the server configuration with the endpoint, labels, counter mode and the
    /// page taken from the URL.
    pub fn configure(
        bootstrap: &TableBootstrap,
        location: &PageLocation,
        translator: &dyn Translator,
    ) -> Result<GridOptions, TableError> {
        let mut raw = match &bootstrap.config {
            Some(Value::Object(map)) => map.clone(),
            _ => return Err(TableError::MissingConfig),
        };

        let endpoint = bootstrap
            .ajax_url
            .clone()
            .or_else(|| raw.get("ajaxURL").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| location.url().path().to_string());
        let ajax_url = location.resolve(&endpoint)?;

        let initial_page = location
            .first(PAGE_PARAM)
            .and_then(|p| p.parse::<u32>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);

        raw.insert("ajaxURL".into(), Value::String(ajax_url.to_string()));
        raw.insert("langs".into(), pagination_labels(translator));
        raw.insert("paginationCounter".into(), Value::String("rows".into()));
        raw.insert("paginationInitialPage".into(), Value::from(initial_page));

        debug!(
            "Grid configured: endpoint {}, initial page {}",
            ajax_url, initial_page
        );
        Ok(GridOptions { raw })
    }

    pub fn new(options: &GridOptions, row_actions: Vec<RowAction>) -> Self {
        Self {
            row_actions,
            row_header: options.row_header(),
            total_rows: None,
        }
    }

    pub fn row_actions(&self) -> &[RowAction] {
        &self.row_actions
    }

    pub fn has_row_actions(&self) -> bool {
        !self.row_actions.is_empty()
    }

    /// Contents of the "total rows" display, if the server reported one.
    pub fn total_rows(&self) -> Option<u64> {
        self.total_rows
    }

    /// Response hook: mirrors `total` into the total rows display.
    pub fn on_ajax_response(&mut self, total: Option<u64>) {
        if let Some(total) = total {
            trace!("Total rows reported: {}", total);
            self.total_rows = Some(total);
        }
    }

    /// Keeps the `page` URL parameter on the page the grid shows.
    pub fn on_page_loaded(&self, page: u32, location: &mut PageLocation) {
        location.set_param(PAGE_PARAM, &page.to_string());
    }

    pub fn refresh<G: Grid>(&self, grid: &mut G) -> RefreshTicket {
        grid.refresh()
    }

    /// Clicking a row header toggles selection when row headers are configured.
    pub fn row_header_clicked<G: Grid>(&self, grid: &mut G, index: usize) -> bool {
        if !self.row_header {
            return false;
        }
        grid.toggle_row_selection(index);
        true
    }

    /// Opens the row context menu below a trigger button instead of at a right-click.
    pub fn open_row_actions<G: Grid>(&self, grid: &mut G, index: usize, anchor: MenuAnchor) {
        if !self.has_row_actions() {
            return;
        }
        grid.open_row_menu(index, anchor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::table::i18n::Catalog;
    use serde_json::json;

    fn bootstrap(config: Value) -> TableBootstrap {
        TableBootstrap {
            config: Some(config),
            ..Default::default()
        }
    }

    #[test]
    fn missing_or_non_object_config_is_an_error() {
        let loc = PageLocation::parse("http://example.org/users").unwrap();
        let catalog = Catalog::default();
        let err = GridAdapter::configure(&TableBootstrap::default(), &loc, &catalog).unwrap_err();
        assert!(matches!(err, TableError::MissingConfig));
        let err = GridAdapter::configure(&bootstrap(json!([1, 2])), &loc, &catalog).unwrap_err();
        assert!(matches!(err, TableError::MissingConfig));
    }

    #[test]
    fn options_merge_endpoint_labels_and_page() {
        let loc = PageLocation::parse("http://example.org/admin/users?page=3&x=1").unwrap();
        let options = GridAdapter::configure(
            &bootstrap(json!({"paginationSize": 25, "columns": [{"field": "name"}]})),
            &loc,
            &Catalog::default(),
        )
        .unwrap();
        assert_eq!(options.ajax_url(), Some("http://example.org/admin/users"));
        assert_eq!(options.initial_page(), 3);
        assert_eq!(options.page_size(), 25);
        assert_eq!(options.raw()["paginationCounter"], "rows");
        assert_eq!(options.label("next"), Some("Next"));
    }

    #[test]
    fn explicit_ajax_url_wins_and_bad_page_falls_back() {
        let loc = PageLocation::parse("http://example.org/admin/users?page=zero").unwrap();
        let mut b = bootstrap(json!({}));
        b.ajax_url = Some("/tables/ajax-url/users".into());
        let options = GridAdapter::configure(&b, &loc, &Catalog::default()).unwrap();
        assert_eq!(options.ajax_url(), Some("http://example.org/tables/ajax-url/users"));
        assert_eq!(options.initial_page(), 1);
    }

    #[test]
    fn out_of_range_paging_numbers_fall_back() {
        let loc = PageLocation::parse("http://example.org/t").unwrap();
        let mut options =
            GridAdapter::configure(&bootstrap(json!({"paginationSize": 5_000_000_000u64})), &loc, &Catalog::default())
                .unwrap();
        assert_eq!(options.page_size(), DEFAULT_PAGE_SIZE);
        options
            .raw
            .insert("paginationInitialPage".into(), json!(4_294_967_297u64));
        assert_eq!(options.initial_page(), 1);
    }

    #[test]
    fn column_titles_default_to_the_field() {
        let column: ColumnOptions =
            serde_json::from_value(json!({"field": "created_at", "headerFilter": "input"})).unwrap();
        assert_eq!(column.display_title(), "Created At");
        assert!(column.has_header_filter());
        assert!(column.visible);
    }

    #[test]
    fn total_is_only_updated_when_reported() {
        let loc = PageLocation::parse("http://example.org/t").unwrap();
        let options = GridAdapter::configure(&bootstrap(json!({})), &loc, &Catalog::default()).unwrap();
        let mut adapter = GridAdapter::new(&options, Vec::new());
        adapter.on_ajax_response(Some(42));
        adapter.on_ajax_response(None);
        assert_eq!(adapter.total_rows(), Some(42));
    }

    #[test]
    fn page_changes_rewrite_the_url() {
        let mut loc = PageLocation::parse("http://example.org/t?field=a").unwrap();
        let options = GridAdapter::configure(&bootstrap(json!({})), &loc, &Catalog::default()).unwrap();
        let adapter = GridAdapter::new(&options, Vec::new());
        adapter.on_page_loaded(4, &mut loc);
        assert_eq!(loc.first("page").as_deref(), Some("4"));
        assert_eq!(loc.first("field").as_deref(), Some("a"));
    }
}
