// src/app/config.rs
// Configuration for TablesDesk: constants, the persisted settings (confy) and the initial
// configuration read from the environment or a .env file.

use dotenvy::dotenv;
use log::{error, info, warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf, str::FromStr};

// --- Global Configuration Block ---
pub const SCRIPT_VERSION: &str = "0.1.0";
pub const APP_NAME: &str = "TablesDesk";
pub const DEFAULT_LOG_LEVEL: &str = "INFO";
pub const DEFAULT_PAGE_URL: &str = "http://127.0.0.1:5000/tables/users";
pub const DEFAULT_BOOTSTRAP: &str = "table.json";
pub const DEFAULT_DOWNLOAD_DIR: &str = "downloads";

pub const ENV_PAGE_URL: &str = "TABLES_PAGE_URL";
pub const ENV_BOOTSTRAP: &str = "TABLES_BOOTSTRAP";
pub const ENV_DOWNLOAD_DIR: &str = "TABLES_DOWNLOAD_DIR";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

// --- Configuration Structs ---

/// Configuration read from the environment before the persisted settings exist.
#[derive(Clone, Debug)]
pub struct InitialConfig {
    pub page_url: String,
    pub bootstrap_path: String,
    pub download_dir: String,
    pub log_level: LevelFilter,
}

/// Persistently stored application settings.
///
/// `page_url` carries the table page including its query string, so the page, filter
/// and hidden-column state survives a restart.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    pub page_url: String,
    pub bootstrap_path: String,
    pub download_dir: String,
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        let initial = load_initial_config();
        AppSettings {
            page_url: initial.page_url,
            bootstrap_path: initial.bootstrap_path,
            download_dir: initial.download_dir,
            log_level: initial.log_level.to_string(),
        }
    }
}

impl AppSettings {
    pub fn log_level_filter(&self) -> LevelFilter {
        parse_log_level(&self.log_level)
    }

    pub fn download_dir(&self) -> PathBuf {
        PathBuf::from(&self.download_dir)
    }
}

// --- Configuration Loading Functions ---

/// Falls back to the default level for anything unparseable.
pub fn parse_log_level(raw: &str) -> LevelFilter {
    LevelFilter::from_str(raw.trim()).unwrap_or_else(|_| {
        eprintln!(
            "WARN: Invalid LOG_LEVEL '{}'. Falling back to {}.",
            raw, DEFAULT_LOG_LEVEL
        );
        LevelFilter::Info
    })
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| {
            warn!("{} environment variable not set, using default: {}", name, default);
            default.to_string()
        })
}

/// Priority: environment variables > .env file > hardcoded defaults.
pub fn load_initial_config() -> InitialConfig {
    dotenv().ok();

    InitialConfig {
        page_url: env_or(ENV_PAGE_URL, DEFAULT_PAGE_URL),
        bootstrap_path: env_or(ENV_BOOTSTRAP, DEFAULT_BOOTSTRAP),
        download_dir: env_or(ENV_DOWNLOAD_DIR, DEFAULT_DOWNLOAD_DIR),
        log_level: parse_log_level(&env_or(ENV_LOG_LEVEL, DEFAULT_LOG_LEVEL)),
    }
}

/// Loads the persisted settings, storing the defaults when no file exists yet.
pub fn load_settings() -> (AppSettings, Option<PathBuf>) {
    let config_path = confy::get_configuration_file_path(APP_NAME, None).ok();
    let settings = match confy::load::<AppSettings>(APP_NAME, None) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!(
                "WARN: Failed to load config file ('{}'), using defaults: {}",
                APP_NAME, e
            );
            let defaults = AppSettings::default();
            if let Err(store_err) = confy::store(APP_NAME, None, &defaults) {
                eprintln!("ERROR: Failed to store default settings: {}", store_err);
            }
            defaults
        }
    };
    (settings, config_path)
}

pub fn store_settings(settings: &AppSettings) -> bool {
    match confy::store(APP_NAME, None, settings) {
        Ok(()) => {
            info!("Settings saved.");
            true
        }
        Err(e) => {
            error!("Failed to save settings: {}", e);
            false
        }
    }
}
