// src/app/state.rs
// Messages passed from background tasks and the logger to the UI thread.

use crate::app::table::request::{ApiResult, RequestId};

/// Who issued a request: the table controller or the grid fetching its own pages.
/// Each keeps its own request id sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOrigin {
    Controller,
    Grid,
}

/// Sent over the MPSC channel and drained once per frame in `update()`.
#[derive(Debug)]
pub enum UpdateMessage {
    /// A log line (INFO level or more severe) for the log panel.
    Log(String),
    /// A finished request.
    Response {
        origin: RequestOrigin,
        id: RequestId,
        result: ApiResult,
    },
}
