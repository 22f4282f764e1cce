// src/app/ui/windows/filter_window.rs
// The filter editor: one row per filter (field, operator, value). Apply sends the complete
// rows to the server and the URL; Clear drops them all.

use crate::app::{table::filters::OPERATORS, TablesApp};
use egui::{Align, Align2, ComboBox, Context, Grid, Layout, ScrollArea, TextEdit, Window};
use log::{error, info};

pub fn draw_filter_window(app: &mut TablesApp, ctx: &Context) {
    let Some(table) = app.table.as_mut() else {
        error!("Filter window requested without a table.");
        app.show_filter_window = false;
        return;
    };

    let fields: Vec<(String, String)> = table
        .grid()
        .column_views()
        .iter()
        .map(|v| (v.column.field.clone(), v.column.title.clone()))
        .collect();
    let title = table.translator().gettext("Filters");
    let can_clear = table.filters().can_clear();

    let mut window_open = app.show_filter_window;
    let mut apply = false;
    let mut clear = false;
    let mut removed: Option<usize> = None;
    let mut add = false;

    Window::new(title)
        .open(&mut window_open)
        .resizable(true)
        .collapsible(false)
        .default_width(480.0)
        .anchor(Align2::CENTER_TOP, egui::vec2(0.0, 80.0))
        .show(ctx, |ui| {
            let rows = &mut table.filters_mut().rows;
            if rows.is_empty() {
                ui.label("No filters. Use 'Add filter' to create one.");
            }
            ScrollArea::vertical()
                .max_height(320.0)
                .auto_shrink([false, true])
                .show(ui, |ui| {
                    Grid::new("filter_rows")
                        .num_columns(4)
                        .spacing([8.0, 4.0])
                        .show(ui, |ui| {
                            for (index, row) in rows.iter_mut().enumerate() {
                                let field_title = fields
                                    .iter()
                                    .find(|(field, _)| *field == row.field)
                                    .map(|(_, title)| title.as_str())
                                    .unwrap_or(row.field.as_str())
                                    .to_string();
                                ComboBox::from_id_salt(("filter_field", index))
                                    .selected_text(field_title)
                                    .width(150.0)
                                    .show_ui(ui, |ui| {
                                        for (field, title) in &fields {
                                            ui.selectable_value(&mut row.field, field.clone(), title);
                                        }
                                    });
                                ComboBox::from_id_salt(("filter_operator", index))
                                    .selected_text(row.operator.as_str())
                                    .width(60.0)
                                    .show_ui(ui, |ui| {
                                        for operator in OPERATORS {
                                            ui.selectable_value(
                                                &mut row.operator,
                                                operator.to_string(),
                                                operator,
                                            );
                                        }
                                    });
                                ui.add(
                                    TextEdit::singleline(&mut row.value)
                                        .hint_text("value")
                                        .desired_width(160.0),
                                );
                                if ui.small_button("✖").on_hover_text("Remove filter").clicked() {
                                    removed = Some(index);
                                }
                                ui.end_row();
                            }
                        });
                });

            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("➕ Add filter").clicked() {
                    add = true;
                }
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if ui.add_enabled(can_clear, egui::Button::new("Clear")).clicked() {
                        clear = true;
                    }
                    if ui.button("Apply").clicked() {
                        apply = true;
                    }
                });
            });
        });

    if let Some(index) = removed {
        table.filters_mut().remove_row(index);
    }
    if add {
        table.filters_mut().add_row();
    }

    if apply {
        table.apply_filters();
        window_open = false;
    } else if clear {
        info!("Clearing all filters.");
        table.clear_filters();
        window_open = false;
    }

    if !window_open && app.show_filter_window {
        table.close_filter_editor();
    }
    app.show_filter_window = window_open;
}
