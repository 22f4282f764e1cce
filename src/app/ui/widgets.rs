// src/app/ui/widgets.rs
// Drawing functions for reusable UI widgets: the log view content area and the counter
// badges shown on toolbar buttons.

use crate::app::TablesApp;
use egui::{Align, Button, Layout, Response, RichText, ScrollArea, TextWrapMode, Ui};

// --- Widget Drawing Functions ---

/// Content of the collapsible log panel.
pub fn draw_log_view_content(app: &mut TablesApp, ui: &mut Ui) {
    ScrollArea::vertical()
        .stick_to_bottom(true)
        .auto_shrink([false, false])
        .show(ui, |ui| {
            ui.with_layout(Layout::top_down(Align::LEFT), |ui| {
                ui.add(
                    egui::Label::new(RichText::new(&app.logs_string_cache).monospace())
                        .wrap_mode(TextWrapMode::Extend),
                );
            });
        });
}

/// A toolbar button with a count appended; the count is hidden while zero.
pub fn button_with_badge(ui: &mut Ui, label: &str, count: usize, enabled: bool) -> Response {
    let text = if count > 0 {
        RichText::new(format!("{} ({})", label, count)).strong()
    } else {
        RichText::new(label)
    };
    ui.add_enabled(enabled, Button::new(text))
}
