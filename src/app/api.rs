// src/app/api.rs
// HTTP access to the tables ajax endpoint: action and refresh POSTs, grid page GETs and
// exporter downloads. Requests run on the shared Tokio runtime; results are sent back to
// the UI thread as `UpdateMessage::Response`.

use crate::app::state::{RequestOrigin, UpdateMessage};
use crate::app::table::{
    actions::ActionResponse,
    csrf::CSRF_HEADER,
    error::TableError,
    grid::PageResponse,
    request::{ApiRequest, ApiResponse, ApiResult, RequestId, Transport},
};
use futures_util::{Stream, StreamExt};
use log::{debug, error, info, trace};
use reqwest::{Client, StatusCode, Url};
use std::{
    path::{Path, PathBuf},
    sync::{mpsc::Sender, Arc},
};
use tokio::{fs, io::AsyncWriteExt, runtime::Runtime};

const REFRESH_FIELD: &str = "refresh";

/// Cheap to clone: the reqwest client, the sender and the runtime are all shared handles.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    endpoint: Url,
    download_dir: PathBuf,
    origin: RequestOrigin,
    sender: Sender<UpdateMessage>,
    rt: Arc<Runtime>,
}

impl ApiClient {
    pub fn new(
        endpoint: Url,
        download_dir: PathBuf,
        origin: RequestOrigin,
        sender: Sender<UpdateMessage>,
        rt: Arc<Runtime>,
    ) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            download_dir,
            origin,
            sender,
            rt,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Same connection pool and runtime, different origin tag.
    pub fn with_origin(&self, origin: RequestOrigin) -> Self {
        Self {
            origin,
            ..self.clone()
        }
    }
}

impl Transport for ApiClient {
    fn send(&mut self, id: RequestId, request: ApiRequest) {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let download_dir = self.download_dir.clone();
        let sender = self.sender.clone();
        let origin = self.origin;

        self.rt.spawn(async move {
            let result = execute(&client, &endpoint, &download_dir, request).await;
            if let Err(e) = &result {
                error!("Request {:?} to {} failed: {}", id, endpoint, e);
            }
            // The receiver is gone only while the application shuts down.
            let _ = sender.send(UpdateMessage::Response { origin, id, result });
        });
    }
}

// --- Request Execution ---

async fn execute(
    client: &Client,
    endpoint: &Url,
    download_dir: &Path,
    request: ApiRequest,
) -> ApiResult {
    match request {
        ApiRequest::Action { form, csrf_token } => {
            let (status, body) = post_form(client, endpoint, &form, csrf_token.as_deref()).await?;
            decode_action(status, &body).map(ApiResponse::Action)
        }
        ApiRequest::Refresh { csrf_token } => {
            let form = [(REFRESH_FIELD.to_string(), "true".to_string())];
            let (status, _) = post_form(client, endpoint, &form, csrf_token.as_deref()).await?;
            if !status.is_success() {
                return Err(TableError::HttpStatus {
                    status: status.as_u16(),
                });
            }
            Ok(ApiResponse::Acknowledged)
        }
        ApiRequest::Export { query, file_name } => {
            let url = request_url(endpoint, &query);
            download(client, url, download_dir, &file_name)
                .await
                .map(|path| ApiResponse::Downloaded { path })
        }
        ApiRequest::FetchPage { query } => {
            let url = request_url(endpoint, &query);
            fetch_page(client, url).await.map(ApiResponse::Page)
        }
    }
}

/// The endpoint with its query replaced by `query`.
pub fn request_url(endpoint: &Url, query: &[(String, String)]) -> Url {
    let mut url = endpoint.clone();
    if query.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(query);
    }
    url
}

async fn post_form(
    client: &Client,
    endpoint: &Url,
    form: &[(String, String)],
    csrf_token: Option<&str>,
) -> Result<(StatusCode, String), TableError> {
    debug!("POST {} with fields {:?}", endpoint, form.iter().map(|(k, _)| k).collect::<Vec<_>>());
    let mut request = client.post(endpoint.clone()).form(form);
    if let Some(token) = csrf_token {
        request = request.header(CSRF_HEADER, token);
    }
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;
    trace!("POST {} answered {}: {}", endpoint, status, body);
    Ok((status, body))
}

/// Action endpoints answer failures with a JSON body too, so the body is decoded whatever
/// the status; only an undecodable non-OK answer is reported as an HTTP error.
pub fn decode_action(status: StatusCode, body: &str) -> Result<ActionResponse, TableError> {
    match ActionResponse::parse(body) {
        Ok(response) => Ok(response),
        Err(_) if !status.is_success() => Err(TableError::HttpStatus {
            status: status.as_u16(),
        }),
        Err(e) => Err(e),
    }
}

async fn fetch_page(client: &Client, url: Url) -> Result<PageResponse, TableError> {
    debug!("GET {}", url);
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(TableError::HttpStatus {
            status: status.as_u16(),
        });
    }
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| TableError::Decode(e.to_string()))
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> TableError {
    let path = path.display().to_string();
    move |source| TableError::Download { path, source }
}

/// Temporary name the body is streamed to before the final rename.
pub fn part_path(download_dir: &Path, file_name: &str) -> PathBuf {
    download_dir.join(format!("{}.part", file_name))
}

async fn download(
    client: &Client,
    url: Url,
    download_dir: &Path,
    file_name: &str,
) -> Result<PathBuf, TableError> {
    info!("Downloading export from {}", url);
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(TableError::HttpStatus {
            status: status.as_u16(),
        });
    }

    save_stream(response.bytes_stream(), download_dir, file_name).await
}

/// Streams `body` into `<file_name>.part` inside `download_dir`, then renames it to
/// `file_name`. The part file is removed when the body fails midway.
async fn save_stream<S, B, E>(
    mut body: S,
    download_dir: &Path,
    file_name: &str,
) -> Result<PathBuf, TableError>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    TableError: From<E>,
{
    let target = download_dir.join(file_name);
    let part = part_path(download_dir, file_name);

    fs::create_dir_all(download_dir)
        .await
        .map_err(io_error(download_dir))?;

    let written = async {
        let mut file = fs::File::create(&part).await.map_err(io_error(&part))?;
        let mut total: u64 = 0;
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            let bytes = chunk.as_ref();
            total += bytes.len() as u64;
            file.write_all(bytes).await.map_err(io_error(&part))?;
        }
        file.flush().await.map_err(io_error(&part))?;
        Ok::<u64, TableError>(total)
    }
    .await;

    match written {
        Ok(total) => {
            fs::rename(&part, &target).await.map_err(io_error(&target))?;
            info!("Saved {} bytes to {}", total, target.display());
            Ok(target)
        }
        Err(e) => {
            let _ = fs::remove_file(&part).await;
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> Url {
        Url::parse("http://example.org/tables/ajax-url/users?stale=1").unwrap()
    }

    #[test]
    fn request_url_replaces_the_endpoint_query() {
        let query = vec![
            ("exporter".to_string(), "csv".to_string()),
            ("filters".to_string(), "[]".to_string()),
        ];
        let url = request_url(&endpoint(), &query);
        assert_eq!(url.path(), "/tables/ajax-url/users");
        assert_eq!(url.query(), Some("exporter=csv&filters=%5B%5D"));
        assert_eq!(request_url(&endpoint(), &[]).query(), None);
    }

    #[test]
    fn action_bodies_are_decoded_even_on_error_status() {
        let response = decode_action(
            StatusCode::BAD_REQUEST,
            r#"{"success": false, "errors": ["nope"]}"#,
        )
        .unwrap();
        assert_eq!(response.errors(), vec!["nope"]);

        let err = decode_action(StatusCode::INTERNAL_SERVER_ERROR, "<html>").unwrap_err();
        assert!(matches!(err, TableError::HttpStatus { status: 500 }));

        let err = decode_action(StatusCode::OK, "not json").unwrap_err();
        assert!(matches!(err, TableError::Decode(_)));
    }

    #[tokio::test]
    async fn streamed_body_lands_under_the_final_name() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("exports");
        let chunks = vec![
            Ok::<_, TableError>(b"id,name\n".to_vec()),
            Ok(b"1,ann\n".to_vec()),
        ];
        let path = save_stream(futures_util::stream::iter(chunks), &out, "users.csv")
            .await
            .unwrap();
        assert_eq!(path, out.join("users.csv"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "id,name\n1,ann\n");
        assert!(!part_path(&out, "users.csv").exists());
    }

    #[tokio::test]
    async fn broken_body_leaves_no_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        let chunks = vec![
            Ok(b"id,name\n".to_vec()),
            Err(TableError::Decode("connection reset".into())),
        ];
        let err = save_stream(futures_util::stream::iter(chunks), dir.path(), "users.csv")
            .await
            .unwrap_err();
        assert!(matches!(err, TableError::Decode(_)));
        assert!(!dir.path().join("users.csv").exists());
        assert!(!part_path(dir.path(), "users.csv").exists());
    }

    #[test]
    fn downloads_are_staged_next_to_the_target() {
        assert_eq!(
            part_path(Path::new("out"), "users.csv"),
            PathBuf::from("out/users.csv.part")
        );
    }
}
