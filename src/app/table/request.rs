// src/app/table/request.rs
// Requests the controller and the grid send to the ajax endpoint, and what comes back.

use super::actions::ActionResponse;
use super::error::TableError;
use super::grid::PageResponse;
use std::path::PathBuf;

/// Correlates a response with the request that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    /// POST of a row/bulk/table action form.
    Action {
        form: Vec<(String, String)>,
        csrf_token: Option<String>,
    },
    /// POST `refresh=true`.
    Refresh { csrf_token: Option<String> },
    /// GET of an exporter; the body is saved as `file_name`.
    Export {
        query: Vec<(String, String)>,
        file_name: String,
    },
    /// GET of one grid page.
    FetchPage { query: Vec<(String, String)> },
}

#[derive(Debug)]
pub enum ApiResponse {
    Action(ActionResponse),
    Acknowledged,
    Downloaded { path: PathBuf },
    Page(PageResponse),
}

pub type ApiResult = Result<ApiResponse, TableError>;

/// Sends requests without waiting; the result is delivered later to the UI thread,
/// which hands it back to whoever issued the request.
pub trait Transport {
    fn send(&mut self, id: RequestId, request: ApiRequest);
}
