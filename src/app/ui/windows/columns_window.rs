// src/app/ui/windows/columns_window.rs
// The column chooser. Checkboxes stage edits in the column visibility store; OK applies
// them to the grid and the URL, Cancel or the title bar 'X' discards them.

use crate::app::TablesApp;
use egui::{Align, Align2, Context, Layout, ScrollArea, Window};
use log::{error, info};

enum Choice {
    None,
    Apply,
    Reset,
    Cancel,
}

pub fn draw_columns_window(app: &mut TablesApp, ctx: &Context) {
    let Some(table) = app.table.as_mut() else {
        error!("Columns window requested without a table.");
        app.show_columns_window = false;
        return;
    };

    let mut window_open = app.show_columns_window;
    let mut choice = Choice::None;
    let mut select_all = false;
    let mut deselect_all = false;

    Window::new(table.translator().gettext("Columns"))
        .open(&mut window_open)
        .resizable(false)
        .collapsible(false)
        .anchor(Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.label("Select columns to display:");
            ui.horizontal(|ui| {
                if ui.small_button("Select all").clicked() {
                    select_all = true;
                }
                if ui.small_button("Deselect all").clicked() {
                    deselect_all = true;
                }
            });
            ui.separator();

            ScrollArea::vertical()
                .max_height(300.0)
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for toggle in table.columns_mut().toggles.iter_mut() {
                        ui.checkbox(&mut toggle.checked, &toggle.title);
                    }
                });

            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("Reset").on_hover_text("Show every column").clicked() {
                    choice = Choice::Reset;
                }
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if ui.button("Cancel").clicked() {
                        choice = Choice::Cancel;
                    }
                    if ui.button("OK").clicked() {
                        choice = Choice::Apply;
                    }
                });
            });
        });

    if select_all {
        table.select_all_columns();
    }
    if deselect_all {
        table.deselect_all_columns();
    }

    match choice {
        Choice::Apply => {
            table.apply_columns();
            info!("Column selection applied, {} hidden.", table.columns().hidden_count());
            window_open = false;
        }
        Choice::Reset => {
            table.reset_columns();
            window_open = false;
        }
        Choice::Cancel => {
            table.dismiss_column_editor();
            window_open = false;
        }
        Choice::None if !window_open => {
            info!("Columns window closed via 'X'. Changes discarded.");
            table.dismiss_column_editor();
        }
        Choice::None => {}
    }

    app.show_columns_window = window_open;
}
