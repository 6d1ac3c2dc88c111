use std::sync::OnceLock;
use std::time::Duration;

use essaydesk_proto::{AnalysisResult, AnalyzeRequest, ApiErrorBody, EssayDraft};
use essaydesk_session::{Analyzer, DocumentStore, ServiceError};
use reqwest::{Client, Response};
use url::Url;

/// Path of the persistence endpoint, relative to the API base.
const ESSAYS_PATH: &str = "api/essays";

/// Path of the analysis endpoint, relative to the API base.
const ANALYZE_PATH: &str = "api/analyze";

/// HTTP request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Error building an [`ApiClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid API url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Client for the essay API: saves drafts and requests analysis.
///
/// A draft without an id is created with `POST /api/essays`; the id in the
/// response is remembered, and that draft and any draft carrying an id are
/// updated with `PATCH /api/essays/{id}`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    essays: Url,
    analyze: Url,
    created: OnceLock<String>,
}

impl ApiClient {
    /// Create a client rooted at `base`, e.g. `http://localhost:3000`.
    pub fn new(base: &str) -> Result<Self, ClientError> {
        let mut base = Url::parse(base)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            essays: base.join(ESSAYS_PATH)?,
            analyze: base.join(ANALYZE_PATH)?,
            created: OnceLock::new(),
        })
    }

    /// URL of one stored essay.
    pub fn essay_url(&self, id: &str) -> Url {
        let mut url = self.essays.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(id);
        }
        url
    }

    pub fn essays_url(&self) -> &Url {
        &self.essays
    }

    pub fn analyze_url(&self) -> &Url {
        &self.analyze
    }
}

impl DocumentStore for ApiClient {
    async fn save(&self, draft: &EssayDraft) -> Result<(), ServiceError> {
        let id = draft.id.as_deref().or(self.created.get().map(String::as_str));
        let request = match id {
            Some(id) => {
                let url = self.essay_url(id);
                tracing::debug!(%url, "PATCH draft");
                self.client.patch(url)
            }
            None => {
                tracing::debug!(url = %self.essays, "POST draft");
                self.client.post(self.essays.clone())
            }
        };
        let response = request.json(draft).send().await.map_err(transport)?;
        let response = check_status(response).await?;
        if id.is_none() {
            let body = response.bytes().await.unwrap_or_default();
            let created = serde_json::from_slice::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("id")?.as_str().map(str::to_owned));
            if let Some(created) = created {
                tracing::info!(id = %created, "essay created");
                let _ = self.created.set(created);
            }
        }
        Ok(())
    }
}

impl Analyzer for ApiClient {
    async fn analyze(&self, content: &str) -> Result<AnalysisResult, ServiceError> {
        tracing::debug!(url = %self.analyze, "POST analysis request");
        let body = AnalyzeRequest {
            content: content.to_string(),
        };
        let response = self
            .client
            .post(self.analyze.clone())
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        let response = check_status(response).await?;
        let bytes = response.bytes().await.map_err(transport)?;
        serde_json::from_slice(&bytes).map_err(|e| ServiceError::Malformed(e.to_string()))
    }
}

fn transport(err: reqwest::Error) -> ServiceError {
    ServiceError::Transport(err.to_string())
}

/// Pass 2xx responses through; turn anything else into a status error
/// carrying the body's `error` field when there is one.
async fn check_status(response: Response) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .bytes()
        .await
        .ok()
        .and_then(|body| serde_json::from_slice::<ApiErrorBody>(&body).ok())
        .map(|body| body.error);
    Err(ServiceError::Status {
        status: status.as_u16(),
        message,
    })
}
