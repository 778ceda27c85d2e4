//! HTTP client for the analysis service: `/upload` and `/export_csv`.

pub mod types;

use reqwest::Client;
use reqwest::multipart::{Form, Part};
use tracing::{debug, warn};

use types::{Analysis, AnalysisResult, ExportRequest, UploadResponse};

pub const PDF_MIME: &str = "application/pdf";

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("{0}")]
    Server(String),

    #[error("request rejected (HTTP {status})")]
    Rejected { status: u16 },

    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// The file and search terms sent to `/upload`.
#[derive(Debug)]
pub struct UploadRequest {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub tributos: String,
}

/// Abstraction over the analysis service.
/// Implemented by `HttpBackend` for production; tests also drive it through wiremock.
pub trait AnalysisBackend {
    async fn upload(&self, request: UploadRequest) -> Result<Analysis, BackendError>;
    async fn export_csv(&self, results: &[AnalysisResult]) -> Result<Vec<u8>, BackendError>;
}

#[derive(Clone)]
pub struct HttpBackend {
    http: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .post(format!("{}{path}", self.base_url))
            .header("User-Agent", crate::USER_AGENT)
    }
}

impl AnalysisBackend for HttpBackend {
    async fn upload(&self, request: UploadRequest) -> Result<Analysis, BackendError> {
        let size = request.bytes.len();
        let file = Part::bytes(request.bytes)
            .file_name(request.file_name)
            .mime_str(PDF_MIME)?;
        let form = Form::new()
            .part("file", file)
            .text("tributos", request.tributos);

        let response = self.post("/upload").multipart(form).send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(status = %status, bytes = size, "upload response received");

        // Parsed before the status is checked: a non-JSON error page is Malformed.
        let body: UploadResponse = serde_json::from_str(&text)?;
        if !status.is_success() || !body.success {
            warn!(status = %status, success = body.success, "upload rejected");
            return Err(match body.error {
                Some(message) => BackendError::Server(message),
                None => BackendError::Rejected {
                    status: status.as_u16(),
                },
            });
        }

        let total = body.total_encontrados.unwrap_or(body.results.len());
        Ok(Analysis {
            results: body.results,
            total,
        })
    }

    async fn export_csv(&self, results: &[AnalysisResult]) -> Result<Vec<u8>, BackendError> {
        let response = self
            .post("/export_csv")
            .json(&ExportRequest { results })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "export rejected");
            return Err(BackendError::Rejected {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        debug!(rows = results.len(), bytes = bytes.len(), "export downloaded");
        Ok(bytes.to_vec())
    }
}
