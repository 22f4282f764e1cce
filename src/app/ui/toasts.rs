// src/app/ui/toasts.rs
// Toast notifications and the pending confirmation prompt. `ToastTray` is the
// application's `Notifier`; the tray is drawn as an overlay in the bottom-right corner.

use crate::app::table::notify::{ConfirmPrompt, Notifier, Toast, ToastKind};
use egui::{Align2, Color32, Context, Frame, RichText};
use log::debug;
use std::time::{Duration, Instant};

const TOAST_LIFETIME: Duration = Duration::from_secs(5);
const MAX_VISIBLE: usize = 5;

#[derive(Debug, Clone)]
struct ShownToast {
    toast: Toast,
    expires_at: Instant,
}

#[derive(Debug, Default)]
pub struct ToastTray {
    shown: Vec<ShownToast>,
    prompt: Option<ConfirmPrompt>,
}

impl ToastTray {
    pub fn toasts(&self) -> impl Iterator<Item = &Toast> {
        self.shown.iter().map(|s| &s.toast)
    }

    pub fn prompt(&self) -> Option<&ConfirmPrompt> {
        self.prompt.as_ref()
    }

    /// The prompt has been answered.
    pub fn take_prompt(&mut self) -> Option<ConfirmPrompt> {
        self.prompt.take()
    }

    pub fn dismiss(&mut self, index: usize) {
        if index < self.shown.len() {
            self.shown.remove(index);
        }
    }

    /// Drops expired toasts; returns whether any remain (the UI keeps repainting).
    pub fn expire(&mut self, now: Instant) -> bool {
        self.shown.retain(|s| s.expires_at > now);
        !self.shown.is_empty()
    }

    fn push_at(&mut self, toast: Toast, now: Instant) {
        if !toast.stacking
            && self
                .shown
                .iter()
                .any(|s| s.toast.message == toast.message && s.toast.kind == toast.kind)
        {
            debug!("Suppressing duplicate toast: {}", toast.message);
            return;
        }
        self.shown.push(ShownToast {
            toast,
            expires_at: now + TOAST_LIFETIME,
        });
        if self.shown.len() > MAX_VISIBLE {
            self.shown.remove(0);
        }
    }
}

impl Notifier for ToastTray {
    fn toast(&mut self, toast: Toast) {
        self.push_at(toast, Instant::now());
    }

    fn confirm(&mut self, prompt: ConfirmPrompt) {
        self.prompt = Some(prompt);
    }
}

fn kind_color(kind: ToastKind) -> Color32 {
    match kind {
        ToastKind::Info => Color32::from_rgb(60, 120, 200),
        ToastKind::Success => Color32::from_rgb(40, 150, 70),
        ToastKind::Warning => Color32::from_rgb(210, 150, 20),
        ToastKind::Danger => Color32::from_rgb(200, 50, 50),
    }
}

pub fn draw_toasts(tray: &mut ToastTray, ctx: &Context) {
    let mut dismissed = None;
    egui::Area::new(egui::Id::new("toast_tray"))
        .anchor(Align2::RIGHT_BOTTOM, egui::vec2(-12.0, -48.0))
        .show(ctx, |ui| {
            for (index, toast) in tray.toasts().enumerate() {
                Frame::popup(ui.style())
                    .stroke(egui::Stroke::new(1.5, kind_color(toast.kind)))
                    .show(ui, |ui| {
                        ui.set_max_width(320.0);
                        ui.horizontal(|ui| {
                            ui.vertical(|ui| {
                                if let Some(title) = &toast.title {
                                    ui.label(RichText::new(title).strong());
                                }
                                ui.label(RichText::new(&toast.message).color(kind_color(toast.kind)));
                            });
                            if ui.small_button("✖").clicked() {
                                dismissed = Some(index);
                            }
                        });
                    });
                ui.add_space(4.0);
            }
        });
    if let Some(index) = dismissed {
        tray.dismiss(index);
    }
}
