// src/app/table/mod.rs
// The table controller. Owns the filter, column, header-filter, action and export state of
// one table and coordinates them with the grid, the page location, the notifier and the
// transport. Every method runs on the UI thread; responses are fed back in through
// `on_response` and grid lifecycle events through `on_grid_event`.

pub mod actions;
pub mod bootstrap;
pub mod columns;
pub mod csrf;
pub mod error;
pub mod export;
pub mod filters;
pub mod grid;
pub mod header_filters;
pub mod i18n;
pub mod location;
pub mod notify;
pub mod request;

#[cfg(test)]
pub mod testing;

use self::{
    actions::{ActionDispatcher, ActionEffect, PendingAction},
    bootstrap::TableBootstrap,
    columns::ColumnVisibilityStore,
    csrf::PageMeta,
    error::TableError,
    export::{build_export_query, export_file_name, ExportDispatcher},
    filters::FilterStore,
    grid::{Grid, GridAdapter, GridEvent, GridOptions, MenuAnchor},
    header_filters::HeaderFilterToggles,
    i18n::{tr, Translator},
    location::PageLocation,
    notify::{ConfirmPrompt, Notifier, Toast},
    request::{ApiRequest, ApiResponse, ApiResult, RequestId, Transport},
};
use log::{debug, error, info, warn};
use std::collections::HashSet;

/// Ajax parameter carrying the filter list on every grid data request.
pub const FILTERS_AJAX_PARAM: &str = "filters";

/// Resolves the grid options, reporting a configuration error once. `None` means the
/// table cannot be wired up at all.
pub fn configure_grid(
    bootstrap: &TableBootstrap,
    location: &PageLocation,
    translator: &dyn Translator,
    notifier: &mut dyn Notifier,
) -> Option<GridOptions> {
    match GridAdapter::configure(bootstrap, location, translator) {
        Ok(options) => Some(options),
        Err(e) => {
            error!("Table cannot be initialized: {}", e);
            let message = match e {
                TableError::MissingConfig => translator.gettext("No table configuration supplied"),
                other => other.to_string(),
            };
            notifier.toast(Toast::danger(message));
            None
        }
    }
}

pub struct TableController<G, N, T> {
    grid: G,
    notifier: N,
    transport: T,
    translator: Box<dyn Translator>,
    location: PageLocation,
    meta: PageMeta,
    table_id: Option<String>,
    exporters: Vec<String>,

    filters: FilterStore,
    columns: ColumnVisibilityStore,
    header_filters: HeaderFilterToggles,
    adapter: GridAdapter,
    actions: ActionDispatcher,
    export: ExportDispatcher,
    refresh_requests: HashSet<RequestId>,

    next_request: u64,
    built: bool,
}

impl<G: Grid, N: Notifier, T: Transport> TableController<G, N, T> {
    pub fn new(
        bootstrap: TableBootstrap,
        options: &GridOptions,
        mut grid: G,
        notifier: N,
        transport: T,
        translator: Box<dyn Translator>,
        location: PageLocation,
    ) -> Self {
        let mut filters = FilterStore::default();
        filters.load_from_url(&location);
        grid.set_ajax_param(FILTERS_AJAX_PARAM, filters.ajax_filters());

        let actions = ActionDispatcher::new(
            bootstrap.row_actions.clone(),
            bootstrap.bulk_actions,
            bootstrap.table_actions,
        );
        let adapter = GridAdapter::new(options, bootstrap.row_actions);

        Self {
            grid,
            notifier,
            transport,
            translator,
            location,
            meta: PageMeta::new(bootstrap.meta),
            table_id: bootstrap.table_id,
            exporters: bootstrap.exporters,
            filters,
            columns: ColumnVisibilityStore::default(),
            header_filters: HeaderFilterToggles::default(),
            adapter,
            actions,
            export: ExportDispatcher::default(),
            refresh_requests: HashSet::new(),
            next_request: 0,
            built: false,
        }
    }

    // --- Accessors for the UI ---

    pub fn grid(&self) -> &G {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut G {
        &mut self.grid
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn translator(&self) -> &dyn Translator {
        self.translator.as_ref()
    }

    pub fn location(&self) -> &PageLocation {
        &self.location
    }

    pub fn location_mut(&mut self) -> &mut PageLocation {
        &mut self.location
    }

    pub fn filters(&self) -> &FilterStore {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut FilterStore {
        &mut self.filters
    }

    pub fn columns(&self) -> &ColumnVisibilityStore {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> &mut ColumnVisibilityStore {
        &mut self.columns
    }

    pub fn header_filters(&self) -> &HeaderFilterToggles {
        &self.header_filters
    }

    pub fn adapter(&self) -> &GridAdapter {
        &self.adapter
    }

    pub fn actions(&self) -> &ActionDispatcher {
        &self.actions
    }

    pub fn exporters(&self) -> &[String] {
        &self.exporters
    }

    pub fn table_id(&self) -> Option<&str> {
        self.table_id.as_deref()
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    /// The export trigger is disabled while this is true.
    pub fn export_busy(&self) -> bool {
        self.export.is_busy()
    }

    fn next_id(&mut self) -> RequestId {
        self.next_request += 1;
        RequestId(self.next_request)
    }

    // --- Grid lifecycle ---

    pub fn on_grid_event(&mut self, event: GridEvent) {
        match event {
            GridEvent::TableBuilt => {
                if self.built {
                    return;
                }
                self.columns = ColumnVisibilityStore::from_grid(&self.grid);
                self.columns.restore_from_url(&mut self.grid, &self.location);
                self.header_filters = HeaderFilterToggles::from_grid(&self.grid);
                self.built = true;
                info!(
                    "Table built: {} columns, {} hidden, {} filters",
                    self.columns.toggles.len(),
                    self.columns.hidden_count(),
                    self.filters.active_count()
                );
            }
            GridEvent::RenderComplete => self.grid.process_rendered_content(),
            GridEvent::PageLoaded { page } => {
                self.adapter.on_page_loaded(page, &mut self.location);
            }
            GridEvent::DataLoaded { ticket, total } => {
                self.adapter.on_ajax_response(total);
                if let Some(ticket) = ticket {
                    for toast in self.actions.release_after_refresh(ticket) {
                        self.notifier.toast(toast);
                    }
                }
            }
            GridEvent::DataFailed { ticket, error } => {
                let abandoned = ticket.map_or(0, |t| self.actions.abandon_after_refresh(t));
                if abandoned > 0 {
                    error!("Refresh after action failed: {}", error);
                    self.notifier.toast(Toast::danger(error));
                } else {
                    warn!("Grid data request failed: {}", error);
                }
            }
        }
    }

    // --- Filters ---

    pub fn apply_filters(&mut self) {
        let ajax = self.filters.apply(&mut self.location);
        self.refetch_with(ajax);
    }

    pub fn clear_filters(&mut self) {
        let ajax = self.filters.clear(&mut self.location);
        self.refetch_with(ajax);
    }

    /// The filter editor was dismissed.
    pub fn close_filter_editor(&mut self) {
        self.filters.close_editor();
    }

    fn refetch_with(&mut self, filters_json: String) {
        self.grid.set_ajax_param(FILTERS_AJAX_PARAM, filters_json);
        self.adapter.refresh(&mut self.grid);
    }

    // --- Columns ---

    pub fn apply_columns(&mut self) {
        self.columns.apply(&mut self.grid, &mut self.location);
    }

    pub fn reset_columns(&mut self) {
        self.columns.reset(&mut self.grid, &mut self.location);
    }

    pub fn select_all_columns(&mut self) {
        self.columns.select_all();
    }

    pub fn deselect_all_columns(&mut self) {
        self.columns.deselect_all();
    }

    pub fn dismiss_column_editor(&mut self) {
        self.columns.dismiss(&self.grid);
    }

    // --- Header filters ---

    pub fn toggle_header_filter(&mut self, field: &str) -> bool {
        self.header_filters.toggle(field)
    }

    pub fn set_header_filter_value(&mut self, field: &str, value: &str) {
        self.header_filters.set_value(&mut self.grid, field, value);
    }

    // --- Rows ---

    pub fn row_header_clicked(&mut self, index: usize) -> bool {
        self.adapter.row_header_clicked(&mut self.grid, index)
    }

    pub fn open_row_actions(&mut self, index: usize, anchor: MenuAnchor) {
        self.adapter.open_row_actions(&mut self.grid, index, anchor);
    }

    // --- Actions ---

    pub fn trigger_row_action(&mut self, name: &str, index: usize) {
        let Some(row) = self.grid.row_data(index) else {
            warn!("Row action '{}' on missing row {}", name, index);
            return;
        };
        if let Some(pending) = self.actions.prepare_row(name, row) {
            self.submit(pending);
        }
    }

    pub fn trigger_bulk_action(&mut self, name: &str) {
        let rows = self.grid.selected_rows();
        if let Some(pending) = self.actions.prepare_bulk(name, rows) {
            self.submit(pending);
        }
    }

    pub fn trigger_table_action(&mut self, name: &str) {
        if let Some(pending) = self.actions.prepare_table(name) {
            self.submit(pending);
        }
    }

    fn submit(&mut self, pending: PendingAction) {
        if pending.needs_confirmation {
            let message = ActionDispatcher::confirmation_message(self.translator.as_ref(), &pending);
            self.notifier.confirm(ConfirmPrompt { message });
            self.actions.await_confirmation(pending);
        } else {
            self.dispatch(pending);
        }
    }

    /// Answer to the last confirmation prompt. Declining leaves everything untouched.
    pub fn resolve_confirmation(&mut self, accepted: bool) {
        let Some(pending) = self.actions.take_awaiting() else {
            return;
        };
        if accepted {
            self.dispatch(pending);
        } else {
            info!("Action '{}' declined", pending.name);
        }
    }

    fn dispatch(&mut self, pending: PendingAction) {
        let id = self.next_id();
        info!("Dispatching action '{}' as request {:?}", pending.name, id);
        self.transport.send(
            id,
            ApiRequest::Action {
                form: pending.form(),
                csrf_token: self.meta.csrf_token(),
            },
        );
        self.actions.track(id, pending);
    }

    /// POSTs `refresh=true`, then refetches once the server acknowledges.
    pub fn request_refresh(&mut self) {
        let id = self.next_id();
        self.transport.send(
            id,
            ApiRequest::Refresh {
                csrf_token: self.meta.csrf_token(),
            },
        );
        self.refresh_requests.insert(id);
    }

    // --- Export ---

    pub fn export(&mut self, exporter: Option<&str>) {
        let Some(exporter) = exporter.filter(|e| !e.is_empty()) else {
            return;
        };
        if self.export.is_busy() {
            debug!("Export '{}' ignored: another export is running", exporter);
            return;
        }
        let query = build_export_query(
            &self.location,
            exporter,
            self.filters.filters(),
            &self.grid.sorters(),
        );
        let file_name = export_file_name(self.table_id.as_deref(), exporter);
        let id = self.next_id();
        self.export.begin(id, exporter);
        self.notifier
            .toast(Toast::info(self.translator.gettext("Export started")).non_stacking());
        self.transport.send(id, ApiRequest::Export { query, file_name });
    }

    // --- Responses ---

    pub fn on_response(&mut self, id: RequestId, result: ApiResult) {
        if self.export.owns(id) {
            self.finish_export(id, result);
        } else if self.refresh_requests.remove(&id) {
            self.finish_refresh(result);
        } else if let Some(pending) = self.actions.finish(id) {
            self.finish_action(pending, result);
        } else {
            debug!("Dropping response for unknown request {:?}", id);
        }
    }

    fn finish_export(&mut self, id: RequestId, result: ApiResult) {
        let exporter = self.export.finish(id).unwrap_or_default();
        match result {
            Ok(ApiResponse::Downloaded { path }) => {
                info!("Export '{}' saved to {}", exporter, path.display());
                let path = path.display().to_string();
                let message = tr(
                    self.translator.as_ref(),
                    "Export saved to {path}",
                    &[("path", path.as_str())],
                );
                self.notifier.toast(Toast::success(message).non_stacking());
            }
            Ok(other) => self.export_failed(&exporter, TableError::Decode(format!("{:?}", other))),
            Err(e) => self.export_failed(&exporter, e),
        }
    }

    fn export_failed(&mut self, exporter: &str, e: TableError) {
        error!("Export '{}' failed: {}", exporter, e);
        let reason = e.to_string();
        let message = tr(
            self.translator.as_ref(),
            "Export failed: {reason}",
            &[("reason", reason.as_str())],
        );
        self.notifier.toast(Toast::danger(message).non_stacking());
    }

    fn finish_refresh(&mut self, result: ApiResult) {
        match result {
            Ok(_) => {
                let ticket = self.adapter.refresh(&mut self.grid);
                let toast = Toast::info(self.translator.gettext("Table refreshed"));
                self.actions.notify_after_refresh(ticket, toast);
            }
            Err(e) => {
                error!("Refresh request failed: {}", e);
                self.notifier.toast(Toast::danger(e.to_string()));
            }
        }
    }

    fn finish_action(&mut self, pending: PendingAction, result: ApiResult) {
        let response = match result {
            Ok(ApiResponse::Action(response)) => response,
            Ok(other) => {
                let e = TableError::Decode(format!("unexpected response {:?}", other));
                error!("Action '{}' failed: {}", pending.name, e);
                self.notifier.toast(Toast::danger(e.to_string()));
                return;
            }
            Err(e) => {
                error!("Action '{}' failed: {}", pending.name, e);
                self.notifier.toast(Toast::danger(e.to_string()));
                return;
            }
        };

        match ActionDispatcher::interpret(self.translator.as_ref(), &pending, &response) {
            ActionEffect::Notify(toasts) => {
                warn!("Action '{}' reported failure", pending.name);
                for toast in toasts {
                    self.notifier.toast(toast);
                }
            }
            ActionEffect::Navigate(target) => {
                info!("Action '{}' redirects to {}", pending.name, target);
                if let Err(e) = self.location.navigate(&target) {
                    self.notifier.toast(Toast::danger(e.to_string()));
                }
            }
            ActionEffect::RefreshThenNotify(toast) => {
                let ticket = self.adapter.refresh(&mut self.grid);
                self.actions.notify_after_refresh(ticket, toast);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::table::{
        actions::ActionResponse,
        grid::{RefreshTicket, SortDir, Sorter},
        i18n::Catalog,
        notify::ToastKind,
        testing::{FakeGrid, RecordingNotifier, RecordingTransport},
    };
    use serde_json::json;
    use std::path::PathBuf;

    type Controller = TableController<FakeGrid, RecordingNotifier, RecordingTransport>;

    fn bootstrap() -> TableBootstrap {
        serde_json::from_value(json!({
            "table_id": "users",
            "config": {"columns": [{"field": "id"}, {"field": "name"}, {"field": "age"}], "rowHeader": true},
            "row_actions": [
                {"name": "edit", "label": "Edit"},
                {"name": "delete", "label": "Delete", "with_confirmation": true}
            ],
            "bulk_actions": [{"action": "purge", "label": "Purge"}],
            "table_actions": [{"name": "rebuild", "label": "Rebuild"}],
            "exporters": ["csv"],
            "meta": {"csrf_field_name": "_csrf_token", "_csrf_token": "tok"}
        }))
        .unwrap()
    }

    fn controller_at(url: &str) -> Controller {
        let location = PageLocation::parse(url).unwrap();
        let bootstrap = bootstrap();
        let options = GridAdapter::configure(&bootstrap, &location, &Catalog::default()).unwrap();
        let grid = FakeGrid::with_columns(&["id", "name", "age"]).with_rows(vec![
            json!({"id": 1, "name": "ann", "actions": "<a>"}),
            json!({"id": 2, "name": "bob"}),
        ]);
        let mut controller = TableController::new(
            bootstrap,
            &options,
            grid,
            RecordingNotifier::default(),
            RecordingTransport::default(),
            Box::new(Catalog::default()),
            location,
        );
        controller.on_grid_event(GridEvent::TableBuilt);
        controller
    }

    fn controller() -> Controller {
        controller_at("http://example.org/users")
    }

    fn last_id(c: &Controller) -> RequestId {
        c.transport().last().map(|(id, _)| *id).unwrap()
    }

    fn respond(c: &mut Controller, body: &str) {
        let id = last_id(c);
        c.on_response(id, Ok(ApiResponse::Action(ActionResponse::parse(body).unwrap())));
    }

    #[test]
    fn missing_config_is_reported_once() {
        let location = PageLocation::parse("http://example.org/users").unwrap();
        let mut notifier = RecordingNotifier::default();
        let options = configure_grid(&TableBootstrap::default(), &location, &Catalog::default(), &mut notifier);
        assert!(options.is_none());
        assert_eq!(notifier.toasts.len(), 1);
        assert_eq!(notifier.toasts[0].kind, ToastKind::Danger);
    }

    #[test]
    fn filters_from_url_become_the_initial_ajax_param() {
        let c = controller_at("http://example.org/users?field=name&operator=%3D&value=bob");
        assert_eq!(
            c.grid().ajax_params.get(FILTERS_AJAX_PARAM).map(String::as_str),
            Some(r#"[{"field":"name","operator":"=","value":"bob"}]"#)
        );
        assert_eq!(c.filters().active_count(), 1);
    }

    #[test]
    fn applying_filters_syncs_url_and_refetches() {
        let mut c = controller_at("http://example.org/users?page=3");
        c.filters_mut().add_row();
        c.filters_mut().rows[0] = filters::Filter::new("age", ">", "30");
        c.filters_mut().add_row();
        c.apply_filters();

        assert_eq!(c.filters().rows.len(), 1);
        assert_eq!(c.location().values("field"), vec!["age"]);
        assert_eq!(c.location().first("page").as_deref(), Some("3"));
        assert_eq!(c.grid().refreshes, 1);
        assert!(c.grid().ajax_params[FILTERS_AJAX_PARAM].contains("\"age\""));

        c.clear_filters();
        assert!(c.location().values("field").is_empty());
        assert_eq!(c.grid().ajax_params[FILTERS_AJAX_PARAM], "[]");
        assert_eq!(c.grid().refreshes, 2);
    }

    #[test]
    fn closing_the_editor_purges_incomplete_rows() {
        let mut c = controller();
        c.filters_mut().add_row();
        c.filters_mut().rows[0].field = "name".into();
        c.close_filter_editor();
        assert!(c.filters().rows.is_empty());
        assert_eq!(c.grid().refreshes, 0);
    }

    #[test]
    fn hidden_columns_round_trip_through_the_url() {
        let mut c = controller();
        c.columns_mut().toggles[1].checked = false;
        c.apply_columns();
        assert_eq!(c.grid().hidden(), vec!["name"]);
        assert_eq!(c.columns().hidden_count(), 1);
        assert_eq!(c.grid().redraws, 1);

        let url = c.location().url().to_string();
        let reloaded = controller_at(&url);
        assert_eq!(reloaded.grid().hidden(), vec!["name"]);
        assert_eq!(reloaded.columns().hidden(), &["name".to_string()]);
    }

    #[test]
    fn unknown_hidden_columns_are_ignored() {
        let c = controller_at("http://example.org/users?hidden_column=gone&hidden_column=age");
        assert_eq!(c.grid().hidden(), vec!["age"]);
        assert!(c.notifier().toasts.is_empty());
    }

    #[test]
    fn staged_column_changes_are_discarded_on_dismiss() {
        let mut c = controller();
        c.deselect_all_columns();
        assert!(c.grid().hidden().is_empty());
        c.dismiss_column_editor();
        assert!(c.columns().toggles.iter().all(|t| t.checked));

        c.deselect_all_columns();
        c.select_all_columns();
        c.columns_mut().toggles[0].checked = false;
        c.apply_columns();
        c.reset_columns();
        assert!(c.grid().hidden().is_empty());
        assert!(c.location().values("hidden_column").is_empty());
        assert_eq!(c.columns().hidden_count(), 0);
    }

    #[test]
    fn bulk_action_without_selection_sends_nothing() {
        let mut c = controller();
        c.trigger_bulk_action("purge");
        assert!(c.transport().sent.is_empty());
        assert!(c.notifier().prompts.is_empty());
        assert!(c.notifier().toasts.is_empty());
    }

    #[test]
    fn bulk_action_confirms_then_posts_selected_rows() {
        let mut c = controller();
        c.grid_mut().toggle_row_selection(0);
        c.trigger_bulk_action("purge");
        assert_eq!(c.notifier().prompts.len(), 1);
        assert!(c.notifier().prompts[0].message.contains("Purge"));
        assert!(c.transport().sent.is_empty());

        c.resolve_confirmation(true);
        let (_, request) = c.transport().last().unwrap();
        assert_eq!(
            request,
            &ApiRequest::Action {
                form: vec![
                    ("bulk_action".into(), "purge".into()),
                    ("rows".into(), r#"[{"id":1,"name":"ann"}]"#.into()),
                ],
                csrf_token: Some("tok".into()),
            }
        );
    }

    #[test]
    fn declined_confirmation_sends_nothing() {
        let mut c = controller();
        c.trigger_table_action("rebuild");
        c.resolve_confirmation(false);
        assert!(c.transport().sent.is_empty());
        c.resolve_confirmation(true);
        assert!(c.transport().sent.is_empty());
    }

    #[test]
    fn row_actions_confirm_only_when_flagged() {
        let mut c = controller();
        c.trigger_row_action("edit", 1);
        assert!(c.notifier().prompts.is_empty());
        assert_eq!(c.transport().sent.len(), 1);

        c.trigger_row_action("delete", 1);
        assert_eq!(c.notifier().prompts.len(), 1);
        assert_eq!(c.transport().sent.len(), 1);

        c.trigger_row_action("edit", 99);
        assert_eq!(c.transport().sent.len(), 1);
    }

    #[test]
    fn failure_with_several_errors_shows_two_notifications() {
        let mut c = controller();
        c.trigger_row_action("edit", 0);
        respond(&mut c, r#"{"success": false, "errors": ["a", "b"]}"#);
        let toasts = &c.notifier().toasts;
        assert_eq!(toasts.len(), 2);
        assert_eq!(toasts[0].message, "a");
        assert!(toasts[1].message.contains("suppressed"));
        assert_eq!(c.grid().refreshes, 0);
    }

    #[test]
    fn redirect_navigates_without_refreshing() {
        let mut c = controller();
        c.trigger_row_action("edit", 0);
        respond(&mut c, r#"{"success": true, "redirect": "/x"}"#);
        assert_eq!(
            c.location().pending_navigation().map(|u| u.as_str()),
            Some("http://example.org/x")
        );
        assert_eq!(c.grid().refreshes, 0);
        assert!(c.notifier().toasts.is_empty());
    }

    #[test]
    fn success_notifies_after_the_refresh_lands() {
        let mut c = controller();
        c.trigger_row_action("edit", 0);
        respond(&mut c, r#"{"success": true}"#);
        assert_eq!(c.grid().refreshes, 1);
        assert!(c.notifier().toasts.is_empty());

        c.on_grid_event(GridEvent::DataLoaded {
            ticket: Some(RefreshTicket(1)),
            total: Some(12),
        });
        assert_eq!(c.adapter().total_rows(), Some(12));
        assert_eq!(c.notifier().toasts, vec![Toast::success("Action \"Edit\" completed successfully")]);
    }

    #[test]
    fn failed_refresh_after_success_reports_the_error_instead() {
        let mut c = controller();
        c.trigger_row_action("edit", 0);
        respond(&mut c, r#"{"success": true}"#);
        assert_eq!(c.grid().refreshes, 1);

        c.on_grid_event(GridEvent::DataFailed {
            ticket: Some(RefreshTicket(1)),
            error: "server returned HTTP 502".into(),
        });
        assert_eq!(c.notifier().toasts, vec![Toast::danger("server returned HTTP 502")]);

        c.on_grid_event(GridEvent::DataLoaded {
            ticket: Some(RefreshTicket(2)),
            total: None,
        });
        assert_eq!(c.notifier().toasts.len(), 1);
    }

    #[test]
    fn failed_page_load_without_pending_action_is_not_toasted() {
        let mut c = controller();
        c.on_grid_event(GridEvent::DataFailed {
            ticket: Some(RefreshTicket(7)),
            error: "boom".into(),
        });
        assert!(c.notifier().toasts.is_empty());
    }

    #[test]
    fn incomplete_url_filter_is_not_sent() {
        let c = controller_at("http://example.org/users?field=name&operator=%3D&value=");
        assert_eq!(c.grid().ajax_params[FILTERS_AJAX_PARAM], "[]");
        assert!(!c.filters().can_clear());
    }

    #[test]
    fn transport_failure_is_reported() {
        let mut c = controller();
        c.trigger_table_action("rebuild");
        c.resolve_confirmation(true);
        let id = last_id(&c);
        c.on_response(id, Err(TableError::HttpStatus { status: 500 }));
        assert_eq!(c.notifier().toasts, vec![Toast::danger("server returned HTTP 500")]);
        assert_eq!(c.actions().in_flight(), 0);
    }

    #[test]
    fn export_flow_disables_and_re_enables_the_trigger() {
        let mut c = controller();
        c.grid_mut().sorters = vec![Sorter {
            field: "age".into(),
            dir: SortDir::Desc,
        }];
        c.export(None);
        assert!(c.transport().sent.is_empty());

        c.export(Some("csv"));
        assert!(c.export_busy());
        let (id, request) = c.transport().last().cloned().unwrap();
        let ApiRequest::Export { query, file_name } = request else {
            panic!("expected an export request");
        };
        assert_eq!(file_name, "users.csv");
        assert!(query.contains(&("sort[0][field]".to_string(), "age".to_string())));
        assert_eq!(c.notifier().toasts.len(), 1);
        assert!(!c.notifier().toasts[0].stacking);

        c.export(Some("csv"));
        assert_eq!(c.transport().sent.len(), 1);

        c.on_response(id, Err(TableError::HttpStatus { status: 404 }));
        assert!(!c.export_busy());
        assert_eq!(c.notifier().toasts[1].kind, ToastKind::Danger);

        c.export(Some("csv"));
        let id = last_id(&c);
        c.on_response(
            id,
            Ok(ApiResponse::Downloaded {
                path: PathBuf::from("/tmp/users.csv"),
            }),
        );
        assert!(!c.export_busy());
        assert_eq!(c.notifier().toasts.last().map(|t| t.kind), Some(ToastKind::Success));
    }

    #[test]
    fn refresh_request_refetches_after_acknowledgement() {
        let mut c = controller();
        c.request_refresh();
        assert!(matches!(
            c.transport().last(),
            Some((_, ApiRequest::Refresh { csrf_token: Some(_) }))
        ));
        assert_eq!(c.grid().refreshes, 0);
        let id = last_id(&c);
        c.on_response(id, Ok(ApiResponse::Acknowledged));
        assert_eq!(c.grid().refreshes, 1);
    }

    #[test]
    fn header_filter_with_value_cannot_be_hidden() {
        let mut c = controller();
        assert!(c.toggle_header_filter("name"));
        assert!(c.header_filters().is_shown("name"));

        c.set_header_filter_value("name", "bo");
        assert_eq!(c.grid().header_filters["name"], "bo");
        assert!(!c.toggle_header_filter("name"));
        assert!(c.header_filters().is_shown("name"));

        c.set_header_filter_value("name", "");
        assert!(c.toggle_header_filter("name"));
        assert!(!c.header_filters().is_shown("name"));
        assert!(!c.header_filters().is_active("name"));
    }

    #[test]
    fn header_filter_indicator_follows_typing() {
        let mut c = controller();
        assert!(!c.header_filters().is_active("age"));
        c.set_header_filter_value("age", "4");
        assert!(c.header_filters().is_active("age"));
        assert!(!c.header_filters().is_shown("age"));
        assert_eq!(c.filters().active_count(), 0);
    }

    #[test]
    fn page_events_update_the_url_and_renders_run_the_hook() {
        let mut c = controller_at("http://example.org/users?field=a&operator=%3D&value=1");
        c.on_grid_event(GridEvent::PageLoaded { page: 2 });
        c.on_grid_event(GridEvent::RenderComplete);
        c.on_grid_event(GridEvent::RenderComplete);
        assert_eq!(c.location().first("page").as_deref(), Some("2"));
        assert_eq!(c.location().values("field"), vec!["a"]);
        assert_eq!(c.grid().processed_renders, 2);
    }

    #[test]
    fn row_header_and_action_button_reach_the_grid() {
        let mut c = controller();
        assert!(c.row_header_clicked(1));
        assert_eq!(c.grid().selected_rows().len(), 1);
        c.open_row_actions(1, MenuAnchor { x: 10.0, y: 20.0 });
        assert_eq!(c.grid().menus, vec![(1, MenuAnchor { x: 10.0, y: 20.0 })]);
    }
}
