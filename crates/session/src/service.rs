//! Interfaces to the collaborators the editor talks to.

use std::future::Future;

use essaydesk_proto::{AnalysisResult, EssayDraft};

/// Failure of a persistence or analysis call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Transport(String),
    /// The service answered with a non-success status.
    #[error("request failed with status {status}{}", detail(.message))]
    Status { status: u16, message: Option<String> },
    /// The response body could not be understood.
    #[error("malformed response: {0}")]
    Malformed(String),
}

fn detail(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

/// Persists a draft.
pub trait DocumentStore: Send + Sync + 'static {
    fn save(&self, draft: &EssayDraft) -> impl Future<Output = Result<(), ServiceError>> + Send;
}

/// Produces writing feedback for essay text.
pub trait Analyzer: Send + Sync + 'static {
    fn analyze(
        &self,
        content: &str,
    ) -> impl Future<Output = Result<AnalysisResult, ServiceError>> + Send;
}
