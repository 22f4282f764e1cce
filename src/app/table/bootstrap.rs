// src/app/table/bootstrap.rs
// The server-rendered description of a table: grid configuration, actions, exporters,
// page meta tags and translations. Loaded once at start-up.

use super::actions::{BulkAction, RowAction, TableAction};
use super::error::TableError;
use log::debug;
use serde::Deserialize;
use serde_json::Value;
use std::{collections::HashMap, fs, path::Path};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TableBootstrap {
    pub table_id: Option<String>,
    /// Explicit ajax endpoint; the page path is used when absent.
    pub ajax_url: Option<String>,
    /// Grid configuration object as produced by the server.
    pub config: Option<Value>,
    pub row_actions: Vec<RowAction>,
    pub bulk_actions: Vec<BulkAction>,
    pub table_actions: Vec<TableAction>,
    pub exporters: Vec<String>,
    pub meta: HashMap<String, String>,
    pub translations: HashMap<String, String>,
}

impl TableBootstrap {
    pub fn load(path: &Path) -> Result<Self, TableError> {
        let display = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|source| TableError::BootstrapRead {
            path: display.clone(),
            source,
        })?;
        let bootstrap: TableBootstrap =
            serde_json::from_str(&raw).map_err(|source| TableError::BootstrapParse {
                path: display.clone(),
                source,
            })?;
        debug!(
            "Loaded table description from {} ({} row actions, {} bulk actions, {} exporters)",
            display,
            bootstrap.row_actions.len(),
            bootstrap.bulk_actions.len(),
            bootstrap.exporters.len()
        );
        Ok(bootstrap)
    }
}
