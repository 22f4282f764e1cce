// src/app/ui/windows/settings_window.rs
// The Settings window. Edits are staged in `app.pending_settings`; Save validates the page
// URL, persists the settings and reloads the table when a table-related field changed.

use crate::app::{state::UpdateMessage, table::location::PageLocation, TablesApp};
use egui::{Align2, ComboBox, Context, Grid, TextEdit, Window};
use log::{error, info};

pub fn draw_settings_window(app: &mut TablesApp, ctx: &Context) {
    let mut window_open = app.show_settings_window;
    let mut save_clicked = false;
    let mut cancel_clicked = false;

    Window::new("Settings")
        .open(&mut window_open)
        .resizable(true)
        .default_width(460.0)
        .anchor(Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            let Some(pending) = app.pending_settings.as_mut() else {
                error!("Settings window drawn without pending state initialized!");
                ui.colored_label(
                    ui.visuals().error_fg_color,
                    "Internal error: State not initialized.",
                );
                return;
            };

            ui.heading("Runtime Settings");
            ui.label("These settings override .env/environment variables and are saved persistently.");
            if let Some(path) = &app.config_path {
                ui.label(format!("Config file: {}", path.display()));
            } else {
                ui.label("Config file path not found.");
            }
            ui.separator();

            Grid::new("settings_grid")
                .num_columns(2)
                .spacing([40.0, 4.0])
                .striped(true)
                .show(ui, |ui| {
                    ui.label("Table page URL:");
                    ui.add(
                        TextEdit::singleline(&mut pending.page_url)
                            .hint_text("http://host/tables/users?page=1")
                            .desired_width(280.0),
                    );
                    ui.end_row();

                    ui.label("Table description file:");
                    ui.add(TextEdit::singleline(&mut pending.bootstrap_path).hint_text("table.json"));
                    ui.end_row();

                    ui.label("Download directory:");
                    ui.text_edit_singleline(&mut pending.download_dir);
                    ui.end_row();

                    ui.label("Log Level:");
                    ComboBox::from_id_salt("log_level")
                        .selected_text(&pending.log_level)
                        .show_ui(ui, |ui| {
                            for level in ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"] {
                                ui.selectable_value(&mut pending.log_level, level.to_string(), level);
                            }
                        });
                    ui.end_row();
                });

            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("Save & Close").clicked() {
                    match PageLocation::parse(&pending.page_url) {
                        Ok(_) => save_clicked = true,
                        Err(e) => {
                            let error_msg = format!("{}. Settings not saved.", e);
                            error!("{}", error_msg);
                            let _ = app
                                .task_update_sender
                                .send(UpdateMessage::Log(format!("ERROR: {}", error_msg)));
                        }
                    }
                }
                if ui.button("Cancel").clicked() {
                    cancel_clicked = true;
                }
            });
            ui.separator();
            ui.label("Note: Log Level changes take effect after an application restart.");
        });

    if save_clicked {
        if let Some(saved) = app.pending_settings.take() {
            let reload = saved.page_url != app.settings.page_url
                || saved.bootstrap_path != app.settings.bootstrap_path
                || saved.download_dir != app.settings.download_dir;
            app.settings = saved;
            if reload {
                info!("Table settings changed, reloading the table.");
                // save_settings takes the URL from a live table.
                app.table = None;
                app.save_settings();
                app.load_table();
            } else {
                app.save_settings();
            }
            info!("Settings updated and saved.");
        }
        window_open = false;
    } else if cancel_clicked {
        info!("Settings changes cancelled.");
        window_open = false;
    } else if !window_open && app.show_settings_window {
        info!("Settings window closed via 'X'. Changes discarded.");
    }

    app.show_settings_window = window_open;
    if !app.show_settings_window {
        app.pending_settings = None;
    }
}
