use std::path::{Path, PathBuf};

use essaydesk_core::fs::atomic_write;
use essaydesk_proto::EssayDraft;
use essaydesk_session::{DocumentStore, ServiceError};

/// Saves the essay text to a local file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentStore for FileStore {
    async fn save(&self, draft: &EssayDraft) -> Result<(), ServiceError> {
        let path = self.path.clone();
        let bytes = draft.content.clone().into_bytes();
        tokio::task::spawn_blocking(move || atomic_write(&path, &bytes))
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        tracing::debug!(path = %self.path.display(), "draft written");
        Ok(())
    }
}
