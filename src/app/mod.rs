// src/app/mod.rs
// Main application logic for TablesDesk. Defines the App struct, implements the eframe::App
// trait, and wires the table controller to the egui grid, the toast tray, the HTTP client
// and the persisted settings.

pub mod api;
pub mod config;
pub mod egui_grid;
pub mod state;
pub mod table;
pub mod ui;
pub mod utils;

use eframe::{
    egui::{self, CentralPanel, CollapsingHeader, Context, Separator, TopBottomPanel, ViewportCommand},
    App, CreationContext,
};
use log::{debug, error, info, warn};
use std::{
    path::{Path, PathBuf},
    sync::{
        mpsc::{Receiver, Sender},
        Arc,
    },
    time::Instant,
};
use tokio::runtime::Runtime;

use self::{
    api::ApiClient,
    config::{store_settings, AppSettings, APP_NAME, SCRIPT_VERSION},
    egui_grid::EguiGrid,
    state::{RequestOrigin, UpdateMessage},
    table::{
        bootstrap::TableBootstrap,
        configure_grid,
        error::TableError,
        i18n::Catalog,
        location::PageLocation,
        notify::{Notifier, Toast},
        TableController,
    },
    ui::{toasts::ToastTray, views, widgets, windows},
};

/// The controller as the application instantiates it.
pub type Table = TableController<EguiGrid<ApiClient>, ToastTray, ApiClient>;

// --- Main Application Struct ---

pub struct TablesApp {
    // --- UI State ---
    logs: Vec<String>,
    logs_string_cache: String,
    logs_dirty: bool,
    logs_collapsed: bool,
    show_settings_window: bool,
    show_filter_window: bool,
    show_columns_window: bool,
    copy_logs_requested: bool,
    export_choice: String,

    // --- Table ---
    table: Option<Table>,
    /// Notifications raised while no table could be built.
    startup_toasts: ToastTray,
    saved_revision: u64,

    // --- Configuration ---
    settings: AppSettings,
    config_path: Option<PathBuf>,
    pending_settings: Option<AppSettings>,

    // --- Communication & Async ---
    task_update_sender: Sender<UpdateMessage>,
    update_receiver: Receiver<UpdateMessage>,
    rt: Arc<Runtime>,
}

// --- Application Implementation ---

impl TablesApp {
    pub fn new(
        _cc: &CreationContext<'_>,
        settings: AppSettings,
        config_path: Option<PathBuf>,
        task_update_sender: Sender<UpdateMessage>,
        update_receiver: Receiver<UpdateMessage>,
    ) -> Self {
        info!("Running TablesApp::new - v{}", SCRIPT_VERSION);
        if let Some(path) = &config_path {
            info!("Using config file: {}", path.display());
        } else {
            warn!("Could not determine config file path.");
        }
        info!("--- Loaded Persistent Settings ---");
        info!("PAGE_URL: {}", settings.page_url);
        info!("BOOTSTRAP: {}", settings.bootstrap_path);
        info!("DOWNLOAD_DIR: {}", settings.download_dir);
        info!("LOG_LEVEL: {}", settings.log_level);
        info!("--------------------------------");

        let rt = Arc::new(
            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .expect("Failed to create Tokio runtime"),
        );

        let mut app = Self {
            logs: Vec::new(),
            logs_string_cache: String::new(),
            logs_dirty: true,
            logs_collapsed: true,
            show_settings_window: false,
            show_filter_window: false,
            show_columns_window: false,
            copy_logs_requested: false,
            export_choice: String::new(),
            table: None,
            startup_toasts: ToastTray::default(),
            saved_revision: 0,
            settings,
            config_path,
            pending_settings: None,
            task_update_sender,
            update_receiver,
            rt,
        };
        app.load_table();
        app
    }

    /// (Re)builds the table from the settings: page location, description document and
    /// download directory. Failures leave the application without a table and a toast.
    fn load_table(&mut self) {
        self.table = None;
        self.show_filter_window = false;
        self.show_columns_window = false;

        match self.build_table() {
            Ok(Some(table)) => {
                self.saved_revision = table.location().revision();
                self.export_choice = table.exporters().first().cloned().unwrap_or_default();
                info!(
                    "Table '{}' ready, endpoint {}",
                    table.table_id().unwrap_or("table"),
                    table.transport().endpoint()
                );
                self.table = Some(table);
            }
            Ok(None) => warn!("Table could not be configured."),
            Err(e) => {
                error!("Failed to load table: {}", e);
                self.startup_toasts
                    .toast(Toast::danger(e.to_string()).with_title("Table unavailable"));
            }
        }
    }

    fn build_table(&mut self) -> Result<Option<Table>, TableError> {
        let location = PageLocation::parse(&self.settings.page_url)?;
        let bootstrap = TableBootstrap::load(Path::new(&self.settings.bootstrap_path))?;
        let translator = Catalog::new(bootstrap.translations.clone());

        let Some(options) =
            configure_grid(&bootstrap, &location, &translator, &mut self.startup_toasts)
        else {
            return Ok(None);
        };
        let endpoint = match options.ajax_url() {
            Some(url) => location.resolve(url)?,
            None => location.url().clone(),
        };

        let client = ApiClient::new(
            endpoint,
            self.settings.download_dir(),
            RequestOrigin::Controller,
            self.task_update_sender.clone(),
            self.rt.clone(),
        );
        let grid = EguiGrid::new(&options, client.with_origin(RequestOrigin::Grid));

        let mut table = TableController::new(
            bootstrap,
            &options,
            grid,
            ToastTray::default(),
            client,
            Box::new(translator),
            location,
        );
        table.grid_mut().build();
        Ok(Some(table))
    }

    fn rebuild_log_cache(&mut self) {
        if self.logs_dirty {
            self.logs_string_cache = self.logs.join("\n");
            self.logs_dirty = false;
        }
    }

    /// Saves `self.settings`, taking the page URL from the live location first.
    fn save_settings(&mut self) {
        if let Some(table) = &self.table {
            self.settings.page_url = table.location().url().to_string();
        }
        debug!("Saving settings, page URL: {}", self.settings.page_url);
        if !store_settings(&self.settings) {
            let _ = self
                .task_update_sender
                .send(UpdateMessage::Log("ERROR: Failed to save settings.".to_string()));
        }
    }

    fn handle_message(&mut self, msg: UpdateMessage) {
        match msg {
            UpdateMessage::Log(line) => {
                self.logs.push(line);
                self.logs_dirty = true;
            }
            UpdateMessage::Response { origin, id, result } => {
                let Some(table) = self.table.as_mut() else {
                    debug!("Dropping response {:?}: no table loaded", id);
                    return;
                };
                match origin {
                    RequestOrigin::Grid => table.grid_mut().on_page_response(id, result),
                    RequestOrigin::Controller => table.on_response(id, result),
                }
            }
        }
    }

    /// Hands queued grid lifecycle events to the controller, in order.
    fn pump_grid_events(&mut self) -> bool {
        let Some(table) = self.table.as_mut() else {
            return false;
        };
        let events = table.grid_mut().drain_events();
        let any = !events.is_empty();
        for event in events {
            table.on_grid_event(event);
        }
        any
    }
}

// --- eframe::App Implementation ---

impl App for TablesApp {
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Shutting down {}.", APP_NAME);
        self.save_settings();
    }

    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut needs_repaint = false;

        // --- 1. Process MPSC Messages ---
        let messages: Vec<UpdateMessage> = self.update_receiver.try_iter().collect();
        for msg in messages {
            needs_repaint = true;
            self.handle_message(msg);
        }

        // --- 2. Grid Lifecycle ---
        needs_repaint |= self.pump_grid_events();

        // --- 3. Navigation Requested by Actions ---
        if let Some(table) = self.table.as_mut() {
            if let Some(url) = table.location_mut().take_navigation() {
                info!("Opening {}", url);
                ctx.open_url(egui::OpenUrl::new_tab(url));
            }
        }

        self.rebuild_log_cache();

        if self.copy_logs_requested {
            if !self.logs_string_cache.is_empty() {
                ctx.copy_text(self.logs_string_cache.clone());
                info!("Logs copied to clipboard.");
            } else {
                warn!("Log buffer is empty, nothing to copy.");
            }
            self.copy_logs_requested = false;
        }

        // --- 4. Draw Panels ---
        TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Settings").clicked() {
                        self.show_settings_window = true;
                        ui.close_menu();
                    }
                    if ui.button("Reload table").clicked() {
                        info!("Reloading table from settings.");
                        self.load_table();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(ViewportCommand::Close);
                    }
                });
                ui.menu_button("Help", |ui| {
                    if ui.button("Copy Logs").clicked() {
                        self.copy_logs_requested = true;
                        ui.close_menu();
                    }
                });
            });
            ui.add_space(4.0);
            views::table_view::draw_toolbar(self, ui);
            ui.add_space(4.0);
            ui.add(Separator::default().spacing(0.0));
        });

        TopBottomPanel::bottom("log_panel")
            .resizable(true)
            .show_separator_line(true)
            .show(ctx, |ui| {
                let header_response = CollapsingHeader::new("Logs")
                    .default_open(!self.logs_collapsed)
                    .show(ui, |ui| {
                        widgets::draw_log_view_content(self, ui);
                    });
                if header_response.header_response.clicked() {
                    self.logs_collapsed = header_response.body_returned.is_none();
                }
                header_response
                    .header_response
                    .on_hover_text("Click to expand/collapse logs");
            });

        CentralPanel::default().show(ctx, |ui| {
            views::table_view::draw_table_view(self, ui);
        });

        // --- 5. Windows ---
        if self.show_settings_window {
            if self.pending_settings.is_none() {
                self.pending_settings = Some(self.settings.clone());
            }
            windows::settings_window::draw_settings_window(self, ctx);
        }
        if self.show_filter_window {
            windows::filter_window::draw_filter_window(self, ctx);
        }
        if self.show_columns_window {
            windows::columns_window::draw_columns_window(self, ctx);
        }
        if let Some(accepted) = windows::confirm_window::draw_confirm_window(self, ctx) {
            if let Some(table) = self.table.as_mut() {
                table.notifier_mut().take_prompt();
                table.resolve_confirmation(accepted);
            }
            needs_repaint = true;
        }

        // --- 6. Toasts ---
        let now = Instant::now();
        let tray = match self.table.as_mut() {
            Some(table) => table.notifier_mut(),
            None => &mut self.startup_toasts,
        };
        let toasts_showing = tray.expire(now);
        ui::toasts::draw_toasts(tray, ctx);

        // --- 7. Persist Location Changes ---
        let revision = self.table.as_ref().map(|t| t.location().revision());
        if let Some(revision) = revision {
            if revision != self.saved_revision {
                self.saved_revision = revision;
                self.save_settings();
            }
        }

        // --- 8. Repaint ---
        let busy = self
            .table
            .as_ref()
            .is_some_and(|t| t.grid().is_loading() || t.export_busy() || t.actions().in_flight() > 0);
        if needs_repaint {
            ctx.request_repaint();
        } else if busy || toasts_showing {
            ctx.request_repaint_after(std::time::Duration::from_millis(250));
        }
    }
}
