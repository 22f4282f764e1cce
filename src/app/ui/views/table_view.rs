// src/app/ui/views/table_view.rs
// The table view: toolbar (filters, columns, actions, export, totals), the grid drawn with
// egui_extras::TableBuilder, the pagination footer and the row action menu.
//
// Drawing only reads the controller. Interactions are collected as intents and applied
// once the frame's table is finished.

use crate::app::{
    table::grid::{Grid, MenuAnchor, SortDir, PAGE_SIZES},
    ui::widgets::button_with_badge,
    Table, TablesApp,
};
use egui::{
    Align, Button, ComboBox, Context, Frame, Label, Layout, RichText, Sense, TextEdit, Ui,
};
use egui_extras::{Column, TableBuilder};
use log::info;

const DEFAULT_COLUMN_WIDTH: f32 = 140.0;

enum Intent {
    Sort(String),
    ToggleHeaderFilter(String),
    HeaderFilterValue(String, String),
    RowHeader(usize),
    ToggleSelection(usize),
    OpenRowMenu(usize, MenuAnchor),
    RowAction(String, usize),
    CloseMenu,
    GoToPage(u32),
    PageSize(u32),
}

fn t(table: &Table, msgid: &str) -> String {
    table.translator().gettext(msgid)
}

// --- Toolbar ---

pub fn draw_toolbar(app: &mut TablesApp, ui: &mut Ui) {
    let Some(table) = app.table.as_mut() else {
        ui.label("No table loaded. Check File > Settings, then File > Reload table.");
        return;
    };

    let mut bulk_choice: Option<String> = None;
    let mut table_choice: Option<String> = None;
    let mut refresh = false;
    let mut export = false;

    ui.horizontal(|ui| {
        if button_with_badge(ui, &t(table, "Filters"), table.filters().active_count(), true)
            .on_hover_text("Edit the filters sent with every data request")
            .clicked()
        {
            app.show_filter_window = true;
        }
        if button_with_badge(ui, &t(table, "Columns"), table.columns().hidden_count(), table.is_built())
            .on_hover_text("Choose which columns are shown")
            .clicked()
        {
            app.show_columns_window = true;
        }

        if !table.actions().bulk_actions().is_empty() {
            ui.separator();
            let selected = table.grid().selected_rows().len();
            let title = format!("{} ({})", t(table, "Bulk actions"), selected);
            ui.menu_button(title, |ui| {
                for action in table.actions().bulk_actions() {
                    if ui.button(&action.label).clicked() {
                        bulk_choice = Some(action.name.clone());
                        ui.close_menu();
                    }
                }
            });
        }
        if !table.actions().table_actions().is_empty() {
            ui.menu_button(t(table, "Table actions"), |ui| {
                for action in table.actions().table_actions() {
                    if ui.button(&action.label).clicked() {
                        table_choice = Some(action.name.clone());
                        ui.close_menu();
                    }
                }
            });
        }

        ui.separator();
        if ui.button(format!("🔄 {}", t(table, "Refresh"))).clicked() {
            refresh = true;
        }

        if !table.exporters().is_empty() {
            ui.separator();
            ComboBox::from_id_salt("exporter_choice")
                .selected_text(app.export_choice.as_str())
                .show_ui(ui, |ui| {
                    for exporter in table.exporters() {
                        ui.selectable_value(&mut app.export_choice, exporter.clone(), exporter);
                    }
                });
            let busy = table.export_busy();
            if ui
                .add_enabled(!busy, Button::new(format!("⬇ {}", t(table, "Export"))))
                .clicked()
            {
                export = true;
            }
            if busy {
                ui.spinner();
            }
        }

        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            if let Some(total) = table.adapter().total_rows() {
                ui.label(format!("{}: {}", t(table, "Total rows"), total));
            }
            if table.grid().is_loading() {
                ui.spinner();
            }
        });
    });

    if let Some(name) = bulk_choice {
        info!("Bulk action '{}' chosen.", name);
        table.trigger_bulk_action(&name);
    }
    if let Some(name) = table_choice {
        info!("Table action '{}' chosen.", name);
        table.trigger_table_action(&name);
    }
    if refresh {
        table.request_refresh();
    }
    if export {
        table.export(Some(app.export_choice.as_str()));
    }
}

// --- Table ---

pub fn draw_table_view(app: &mut TablesApp, ui: &mut Ui) {
    let Some(table) = app.table.as_mut() else {
        ui.centered_and_justified(|ui| {
            ui.label("No table loaded.");
        });
        return;
    };

    let mut intents = Vec::new();
    let ctx = ui.ctx().clone();
    draw_row_menu(table, &ctx, &mut intents);

    egui::TopBottomPanel::bottom("pagination_panel").show_inside(ui, |ui| {
        draw_pagination(table, ui, &mut intents);
    });
    draw_grid(table, ui, &mut intents);

    apply(table, intents);
}

fn draw_grid(table: &Table, ui: &mut Ui, intents: &mut Vec<Intent>) {
    let grid = table.grid();
    if let Some(error) = grid.load_error() {
        ui.colored_label(ui.visuals().error_fg_color, error);
    }

    let columns = grid.visible_columns();
    let has_row_actions = table.adapter().has_row_actions();
    let row_header = grid.has_row_header();
    let click_selects = grid.is_selectable() && !row_header;
    let any_filter_shown = columns
        .iter()
        .any(|c| table.header_filters().is_shown(&c.column.field));
    let header_height = if any_filter_shown { 46.0 } else { 22.0 };
    let row_height = ui.text_style_height(&egui::TextStyle::Body) + 6.0;

    let mut builder = TableBuilder::new(ui)
        .id_salt(("table_grid", grid.layout_generation()))
        .striped(true)
        .resizable(true)
        .cell_layout(Layout::left_to_right(Align::Center));
    if row_header {
        builder = builder.column(Column::exact(28.0));
    }
    for view in &columns {
        let mut column = Column::initial(view.width.unwrap_or(DEFAULT_COLUMN_WIDTH)).resizable(true);
        if let Some(min) = view.min_width {
            column = column.at_least(min);
        }
        builder = builder.column(column);
    }
    if has_row_actions {
        builder = builder.column(Column::exact(36.0));
    }

    builder
        .header(header_height, |mut header| {
            if row_header {
                header.col(|_| {});
            }
            for view in &columns {
                let field = &view.column.field;
                header.col(|ui| {
                    ui.vertical(|ui| {
                        ui.horizontal(|ui| {
                            let arrow = match grid.sort_dir(field) {
                                Some(SortDir::Asc) => " ⏶",
                                Some(SortDir::Desc) => " ⏷",
                                None => "",
                            };
                            let title = RichText::new(format!("{}{}", view.column.title, arrow)).strong();
                            if view.header_sort {
                                if ui
                                    .add(Button::new(title).frame(false))
                                    .on_hover_text(format!("Sort by {}", view.column.title))
                                    .clicked()
                                {
                                    intents.push(Intent::Sort(field.clone()));
                                }
                            } else {
                                ui.label(title);
                            }
                            if view.column.header_filter {
                                let icon = if table.header_filters().is_active(field) {
                                    RichText::new("🔍").color(ui.visuals().selection.stroke.color)
                                } else {
                                    RichText::new("🔍").weak()
                                };
                                if ui
                                    .add(Button::new(icon).frame(false).small())
                                    .on_hover_text("Show or hide the column filter")
                                    .clicked()
                                {
                                    intents.push(Intent::ToggleHeaderFilter(field.clone()));
                                }
                            }
                        });
                        if table.header_filters().is_shown(field) {
                            let mut value = grid.header_filter(field).to_string();
                            let edit = TextEdit::singleline(&mut value)
                                .desired_width(f32::INFINITY)
                                .hint_text("filter");
                            if ui.add(edit).changed() {
                                intents.push(Intent::HeaderFilterValue(field.clone(), value));
                            }
                        }
                    });
                });
            }
            if has_row_actions {
                header.col(|_| {});
            }
        })
        .body(|body| {
            body.rows(row_height, grid.row_count(), |mut row| {
                let index = row.index();
                let selected = grid.is_selected(index);
                row.set_selected(selected);

                if row_header {
                    row.col(|ui| {
                        let mark = if selected { "☑" } else { "☐" };
                        if ui.selectable_label(selected, mark).clicked() {
                            intents.push(Intent::RowHeader(index));
                        }
                    });
                }
                for view in &columns {
                    row.col(|ui| {
                        let text = grid.cell(index, &view.column.field);
                        let response = ui.add(Label::new(text).truncate().sense(Sense::click()));
                        if click_selects && response.clicked() {
                            intents.push(Intent::ToggleSelection(index));
                        }
                        if has_row_actions && response.secondary_clicked() {
                            let pos = response
                                .interact_pointer_pos()
                                .unwrap_or(response.rect.left_bottom());
                            intents.push(Intent::OpenRowMenu(index, MenuAnchor { x: pos.x, y: pos.y }));
                        }
                    });
                }
                if has_row_actions {
                    row.col(|ui| {
                        let button = ui.button("⋮").on_hover_text("Row actions");
                        if button.clicked() {
                            let pos = button.rect.left_bottom();
                            intents.push(Intent::OpenRowMenu(index, MenuAnchor { x: pos.x, y: pos.y }));
                        }
                    });
                }
            });
        });

    if grid.row_count() == 0 && !grid.is_loading() {
        ui.add_space(12.0);
        ui.vertical_centered(|ui| {
            ui.label(RichText::new(grid.placeholder()).weak());
        });
    }
}

fn draw_pagination(table: &Table, ui: &mut Ui, intents: &mut Vec<Intent>) {
    let grid = table.grid();
    let page = grid.page();
    let last = grid.last_page();

    ui.horizontal(|ui| {
        if ui.add_enabled(page > 1, Button::new(t(table, "First"))).clicked() {
            intents.push(Intent::GoToPage(1));
        }
        if ui.add_enabled(page > 1, Button::new(t(table, "Prev"))).clicked() {
            intents.push(Intent::GoToPage(page - 1));
        }
        ui.label(format!("{} / {}", page, last));
        if ui.add_enabled(page < last, Button::new(t(table, "Next"))).clicked() {
            intents.push(Intent::GoToPage(page + 1));
        }
        if ui.add_enabled(page < last, Button::new(t(table, "Last"))).clicked() {
            intents.push(Intent::GoToPage(last));
        }

        ui.separator();
        ui.label(t(table, "Page Size"));
        let mut size = grid.page_size();
        ComboBox::from_id_salt("page_size")
            .selected_text(size.to_string())
            .show_ui(ui, |ui| {
                for option in PAGE_SIZES {
                    ui.selectable_value(&mut size, option, option.to_string());
                }
            });
        if size != grid.page_size() {
            intents.push(Intent::PageSize(size));
        }

        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            let rows = grid.row_count() as u64;
            if rows > 0 {
                let first = u64::from(page.saturating_sub(1)) * u64::from(grid.page_size()) + 1;
                let mut counter = format!("{} {}-{}", t(table, "Showing"), first, first + rows - 1);
                if let Some(total) = table.adapter().total_rows() {
                    counter.push_str(&format!(" {} {} {}", t(table, "of"), total, t(table, "rows")));
                }
                ui.label(counter);
            }
        });
    });
}

fn draw_row_menu(table: &Table, ctx: &Context, intents: &mut Vec<Intent>) {
    let Some((index, anchor)) = table.grid().menu() else {
        return;
    };
    let area = egui::Area::new(egui::Id::new("row_action_menu"))
        .order(egui::Order::Foreground)
        .fixed_pos(egui::pos2(anchor.x, anchor.y))
        .show(ctx, |ui| {
            Frame::menu(ui.style()).show(ui, |ui| {
                for action in table.adapter().row_actions() {
                    let text = match &action.icon {
                        Some(icon) => format!("{} {}", icon, action.label()),
                        None => action.label().to_string(),
                    };
                    if ui.button(text).clicked() {
                        intents.push(Intent::RowAction(action.name.clone(), index));
                        intents.push(Intent::CloseMenu);
                    }
                }
            });
        });
    if area.response.clicked_elsewhere() || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        intents.push(Intent::CloseMenu);
    }
}

fn apply(table: &mut Table, intents: Vec<Intent>) {
    for intent in intents {
        match intent {
            Intent::Sort(field) => table.grid_mut().toggle_sort(&field),
            Intent::ToggleHeaderFilter(field) => {
                table.toggle_header_filter(&field);
            }
            Intent::HeaderFilterValue(field, value) => table.set_header_filter_value(&field, &value),
            Intent::RowHeader(index) => {
                table.row_header_clicked(index);
            }
            Intent::ToggleSelection(index) => table.grid_mut().toggle_row_selection(index),
            Intent::OpenRowMenu(index, anchor) => table.open_row_actions(index, anchor),
            Intent::RowAction(name, index) => table.trigger_row_action(&name, index),
            Intent::CloseMenu => table.grid_mut().close_menu(),
            Intent::GoToPage(page) => table.grid_mut().go_to_page(page),
            Intent::PageSize(size) => table.grid_mut().set_page_size(size),
        }
    }
}
