// src/app/ui/windows/confirm_window.rs
// Modal confirmation for actions flagged as needing one.

use crate::app::TablesApp;
use egui::{Align2, Color32, Context, Layout, RichText, Window};

/// Draws the pending prompt, if any.
///
/// Returns `Some(true)` when confirmed, `Some(false)` when cancelled or closed, and `None`
/// while there is nothing to answer.
pub fn draw_confirm_window(app: &mut TablesApp, ctx: &Context) -> Option<bool> {
    let table = app.table.as_ref()?;
    let prompt = table.notifier().prompt()?;
    let confirm_label = table.translator().gettext("Confirm");
    let cancel_label = table.translator().gettext("Cancel");

    let mut result = None;
    let mut open = true;
    Window::new(table.translator().gettext("Are you sure?"))
        .collapsible(false)
        .resizable(false)
        .open(&mut open)
        .anchor(Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.label(&prompt.message);
            ui.add_space(10.0);
            ui.horizontal(|ui| {
                ui.with_layout(Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.add_space(10.0);
                    if ui
                        .button(RichText::new(&confirm_label).color(Color32::RED))
                        .clicked()
                    {
                        result = Some(true);
                    }
                    ui.add_space(10.0);
                    if ui.button(&cancel_label).clicked() {
                        result = Some(false);
                    }
                });
            });
        });

    if !open && result.is_none() {
        result = Some(false);
    }
    result
}
