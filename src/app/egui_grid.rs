// src/app/egui_grid.rs
// The grid widget's state: columns, the current page of rows, selection, remote sorting,
// inline header filters and paging. Fetches its own pages through a `Transport` and
// reports lifecycle events for the table controller to consume.

use crate::app::table::{
    error::TableError,
    grid::{
        Grid, GridColumn, GridEvent, GridOptions, MenuAnchor, PageResponse, RefreshTicket, Row,
        SortDir, Sorter, PAGE_SIZES,
    },
    request::{ApiRequest, ApiResponse, ApiResult, RequestId, Transport},
};
use crate::app::utils::cell_text;
use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

/// Match type the grid sends for its inline header filters.
const HEADER_FILTER_TYPE: &str = "like";

#[derive(Debug, Clone)]
pub struct ColumnView {
    pub column: GridColumn,
    pub header_sort: bool,
    pub width: Option<f32>,
    pub min_width: Option<f32>,
}

#[derive(Debug, Clone, Copy)]
struct PendingLoad {
    ticket: RefreshTicket,
    page: u32,
}

pub struct EguiGrid<T> {
    transport: T,
    columns: Vec<ColumnView>,
    rows: Vec<Row>,
    rendered: Vec<HashMap<String, String>>,
    selected: BTreeSet<usize>,
    sorters: Vec<Sorter>,
    ajax_params: BTreeMap<String, String>,
    header_filters: BTreeMap<String, String>,

    page: u32,
    page_size: u32,
    last_page: u32,
    loaded_page: Option<u32>,
    placeholder: String,
    selectable: bool,
    row_header: bool,

    next_request: u64,
    next_ticket: u64,
    in_flight: HashMap<RequestId, PendingLoad>,
    load_error: Option<String>,
    menu: Option<(usize, MenuAnchor)>,
    layout_generation: u64,
    events: VecDeque<GridEvent>,
}

impl<T: Transport> EguiGrid<T> {
    pub fn new(options: &GridOptions, transport: T) -> Self {
        let columns = options
            .columns()
            .into_iter()
            .map(|c| ColumnView {
                column: GridColumn {
                    title: c.display_title(),
                    visible: c.visible,
                    header_filter: c.has_header_filter(),
                    field: c.field.clone(),
                },
                header_sort: c.header_sort,
                width: c.width,
                min_width: c.min_width,
            })
            .collect();

        Self {
            transport,
            columns,
            rows: Vec::new(),
            rendered: Vec::new(),
            selected: BTreeSet::new(),
            sorters: Vec::new(),
            ajax_params: BTreeMap::new(),
            header_filters: BTreeMap::new(),
            page: options.initial_page(),
            page_size: options.page_size(),
            last_page: options.initial_page(),
            loaded_page: None,
            placeholder: options.placeholder().to_string(),
            selectable: options.selectable() || options.row_header(),
            row_header: options.row_header(),
            next_request: 0,
            next_ticket: 0,
            in_flight: HashMap::new(),
            load_error: None,
            menu: None,
            layout_generation: 0,
            events: VecDeque::new(),
        }
    }

    /// Announces the table and requests the initial page.
    pub fn build(&mut self) {
        self.events.push_back(GridEvent::TableBuilt);
        self.load_page(self.page);
    }

    pub fn drain_events(&mut self) -> Vec<GridEvent> {
        self.events.drain(..).collect()
    }

    // --- Read access for drawing ---

    pub fn column_views(&self) -> &[ColumnView] {
        &self.columns
    }

    pub fn visible_columns(&self) -> Vec<&ColumnView> {
        self.columns.iter().filter(|c| c.column.visible).collect()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Display text of a cell as prepared by the last render pass.
    pub fn cell(&self, index: usize, field: &str) -> &str {
        self.rendered
            .get(index)
            .and_then(|r| r.get(field))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    pub fn is_selectable(&self) -> bool {
        self.selectable
    }

    pub fn has_row_header(&self) -> bool {
        self.row_header
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn last_page(&self) -> u32 {
        self.last_page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn is_loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn sort_dir(&self, field: &str) -> Option<SortDir> {
        self.sorters.iter().find(|s| s.field == field).map(|s| s.dir)
    }

    pub fn header_filter(&self, field: &str) -> &str {
        self.header_filters.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn menu(&self) -> Option<(usize, MenuAnchor)> {
        self.menu
    }

    pub fn close_menu(&mut self) {
        self.menu = None;
    }

    /// Changes whenever the visible column set changes, so the table layout restarts.
    pub fn layout_generation(&self) -> u64 {
        self.layout_generation
    }

    // --- User interaction ---

    /// Header click: same column flips direction, another column sorts ascending.
    pub fn toggle_sort(&mut self, field: &str) {
        let dir = match self.sort_dir(field) {
            Some(dir) => dir.toggled(),
            None => SortDir::Asc,
        };
        self.sorters = vec![Sorter {
            field: field.to_string(),
            dir,
        }];
        debug!("Sorting by {} {}", field, dir.as_str());
        self.load_page(self.page);
    }

    pub fn go_to_page(&mut self, page: u32) {
        let page = page.clamp(1, self.last_page.max(1));
        self.load_page(page);
    }

    pub fn set_page_size(&mut self, size: u32) {
        if !PAGE_SIZES.contains(&size) || size == self.page_size {
            return;
        }
        self.page_size = size;
        self.load_page(1);
    }

    // --- Loading ---

    fn query(&self, page: u32) -> Vec<(String, String)> {
        let mut query = vec![
            ("page".to_string(), page.to_string()),
            ("size".to_string(), self.page_size.to_string()),
        ];
        for (i, sorter) in self.sorters.iter().enumerate() {
            query.push((format!("sort[{}][field]", i), sorter.field.clone()));
            query.push((format!("sort[{}][dir]", i), sorter.dir.as_str().to_string()));
        }
        let active = self.header_filters.iter().filter(|(_, v)| !v.is_empty());
        for (i, (field, value)) in active.enumerate() {
            query.push((format!("filter[{}][field]", i), field.clone()));
            query.push((format!("filter[{}][type]", i), HEADER_FILTER_TYPE.to_string()));
            query.push((format!("filter[{}][value]", i), value.clone()));
        }
        query.extend(self.ajax_params.iter().map(|(k, v)| (k.clone(), v.clone())));
        query
    }

    fn load_page(&mut self, page: u32) -> RefreshTicket {
        self.next_request += 1;
        self.next_ticket += 1;
        let id = RequestId(self.next_request);
        let ticket = RefreshTicket(self.next_ticket);
        let query = self.query(page);
        self.in_flight.insert(id, PendingLoad { ticket, page });
        self.transport.send(id, ApiRequest::FetchPage { query });
        ticket
    }

    /// Applies a page response. Responses are applied in arrival order, late ones included.
    pub fn on_page_response(&mut self, id: RequestId, result: ApiResult) {
        let Some(load) = self.in_flight.remove(&id) else {
            warn!("Dropping page response for unknown request {:?}", id);
            return;
        };
        match result {
            Ok(ApiResponse::Page(page)) => self.apply_page(load, page),
            Ok(other) => {
                self.fail_load(load, TableError::Decode(format!("unexpected response {:?}", other)))
            }
            Err(e) => self.fail_load(load, e),
        }
    }

    fn apply_page(&mut self, load: PendingLoad, response: PageResponse) {
        self.rows = response.data;
        self.last_page = response.last_page.max(1);
        self.page = load.page;
        self.selected.clear();
        self.menu = None;
        self.load_error = None;

        if self.loaded_page.is_some_and(|previous| previous != load.page) {
            self.events.push_back(GridEvent::PageLoaded { page: load.page });
        }
        self.loaded_page = Some(load.page);
        self.events.push_back(GridEvent::DataLoaded {
            ticket: Some(load.ticket),
            total: response.total,
        });
        self.events.push_back(GridEvent::RenderComplete);
    }

    fn fail_load(&mut self, load: PendingLoad, e: TableError) {
        warn!("Grid data request for page {} failed: {}", load.page, e);
        let error = e.to_string();
        self.load_error = Some(error.clone());
        self.events.push_back(GridEvent::DataFailed {
            ticket: Some(load.ticket),
            error,
        });
    }
}

impl<T: Transport> Grid for EguiGrid<T> {
    fn columns(&self) -> Vec<GridColumn> {
        self.columns.iter().map(|c| c.column.clone()).collect()
    }

    fn show_column(&mut self, field: &str) -> bool {
        match self.columns.iter_mut().find(|c| c.column.field == field) {
            Some(view) => {
                view.column.visible = true;
                true
            }
            None => false,
        }
    }

    fn hide_column(&mut self, field: &str) -> bool {
        match self.columns.iter_mut().find(|c| c.column.field == field) {
            Some(view) => {
                view.column.visible = false;
                true
            }
            None => false,
        }
    }

    fn is_column_visible(&self, field: &str) -> Option<bool> {
        self.columns
            .iter()
            .find(|c| c.column.field == field)
            .map(|c| c.column.visible)
    }

    fn redraw(&mut self) {
        self.layout_generation += 1;
    }

    fn set_ajax_param(&mut self, name: &str, value: String) {
        self.ajax_params.insert(name.to_string(), value);
    }

    fn refresh(&mut self) -> RefreshTicket {
        self.load_page(self.page)
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
        if index >= self.rows.len() {
            return;
        }
        if !self.selected.remove(&index) {
            self.selected.insert(index);
        }
    }

    fn sorters(&self) -> Vec<Sorter> {
        self.sorters.clone()
    }

    fn set_header_filter(&mut self, field: &str, value: &str) {
        if value.is_empty() {
            self.header_filters.remove(field);
        } else {
            self.header_filters.insert(field.to_string(), value.to_string());
        }
        self.load_page(1);
    }

    fn open_row_menu(&mut self, index: usize, anchor: MenuAnchor) {
        if index < self.rows.len() {
            self.menu = Some((index, anchor));
        }
    }

    fn process_rendered_content(&mut self) {
        self.rendered = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|(field, value)| (field.clone(), cell_text(value)))
                    .collect()
            })
            .collect();
    }
}
