// src/main.rs
// Entry point for TablesDesk: loads settings, installs the logger that mirrors INFO lines
// into the UI, and starts the eframe application.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;

use app::{
    config::{load_settings, APP_NAME, SCRIPT_VERSION},
    state::UpdateMessage,
    TablesApp,
};
use chrono::Local;
use eframe::egui;
use log::{info, LevelFilter};
use std::sync::mpsc::channel;

fn main() -> Result<(), eframe::Error> {
    let (settings, config_path) = load_settings();
    let (update_sender, update_receiver) = channel();
    let logger_sender = update_sender.clone();

    let log_level = if cfg!(debug_assertions) {
        LevelFilter::Trace
    } else {
        settings.log_level_filter()
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .filter_module("reqwest", LevelFilter::Info)
        .filter_module("hyper", LevelFilter::Info)
        .format(move |buf, record| {
            use std::io::Write;
            let log_msg = format!(
                "[{}] [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            );
            // INFO and more severe lines also go to the log panel.
            if record.level() <= LevelFilter::Info {
                let _ = logger_sender.send(UpdateMessage::Log(log_msg.clone()));
            }
            writeln!(buf, "{}", log_msg)
        })
        .init();

    info!("--- {} v{} Starting ---", APP_NAME, SCRIPT_VERSION);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 700.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        APP_NAME,
        native_options,
        Box::new(move |cc| {
            Ok(Box::new(TablesApp::new(
                cc,
                settings,
                config_path,
                update_sender,
                update_receiver,
            )))
        }),
    )
}
