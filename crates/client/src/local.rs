use std::sync::Arc;

use essaydesk_proto::EssayDraft;
use essaydesk_session::session::{self, SessionHandle};
use essaydesk_session::{Analyzer, DocumentStore, Notice, SessionCmd, SessionConfig, View};

/// In-process client connected to an editing session via channels.
pub struct LocalClient {
    handle: SessionHandle,
}

impl LocalClient {
    /// Spawn a session editing `draft`.
    pub fn open<S, A>(draft: EssayDraft, store: Arc<S>, analyzer: Arc<A>, config: SessionConfig) -> Self
    where
        S: DocumentStore,
        A: Analyzer,
    {
        Self {
            handle: session::open(draft, store, analyzer, config),
        }
    }

    /// Send a command to the session.
    pub async fn send(&self, cmd: impl Into<SessionCmd>) {
        let _ = self.handle.cmd.send(cmd.into()).await;
    }

    /// Send an insert command to the session.
    pub async fn insert(&self, text: &str) {
        self.send(SessionCmd::Insert { text: text.into() }).await;
    }

    /// Trigger an immediate save of the current content.
    pub async fn save(&self) {
        self.send(SessionCmd::Save).await;
    }

    /// Request the current view and wait for it.
    pub async fn request_view(&mut self) -> Option<View> {
        self.send(SessionCmd::RequestView).await;
        self.next_view().await
    }

    /// Receive the next view emitted by the session. `None` once the session
    /// has stopped.
    pub async fn next_view(&mut self) -> Option<View> {
        self.handle.views.recv().await
    }

    pub async fn next_notice(&mut self) -> Option<Notice> {
        self.handle.notices.recv().await
    }

    /// Split into the command sender and the two receivers, for event loops
    /// that select over them.
    pub fn into_handle(self) -> SessionHandle {
        self.handle
    }
}
