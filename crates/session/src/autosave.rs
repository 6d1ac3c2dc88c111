use std::sync::Arc;
use std::time::SystemTime;

use essaydesk_proto::EssayDraft;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::notice::{self, Notice, NoticeSender};
use crate::service::DocumentStore;

/// Persistence status shown next to the editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveState {
    pub is_saving: bool,
    pub last_saved_at: Option<SystemTime>,
}

/// Handle to a running autosave task.
///
/// The task owns the only in-flight save. Settled content arriving while a
/// save is running is coalesced to the newest value and saved afterwards.
/// Dropping the handle stops the task; a save still in flight is abandoned
/// and its outcome never reaches [`SaveState`].
pub struct AutosaveHandle {
    requests: watch::Sender<Option<String>>,
    state: watch::Receiver<SaveState>,
    task: JoinHandle<()>,
}

impl AutosaveHandle {
    /// Start saving `settled` content through `store`.
    ///
    /// `draft` supplies the document fields sent with every save; its content
    /// is the baseline that never triggers an automatic save.
    pub fn spawn<S: DocumentStore>(
        store: Arc<S>,
        draft: EssayDraft,
        settled: watch::Receiver<String>,
        notices: NoticeSender,
    ) -> Self {
        let (req_tx, req_rx) = watch::channel(None);
        let (state_tx, state_rx) = watch::channel(SaveState::default());
        let worker = Autosave {
            store,
            baseline: draft.content.clone(),
            draft,
            last_saved: None,
            state: state_tx,
            notices,
        };
        let task = tokio::spawn(worker.run(settled, req_rx));
        Self {
            requests: req_tx,
            state: state_rx,
            task,
        }
    }

    /// Save `content` now, regardless of whether it changed.
    ///
    /// Never waits: a request made while a save is running replaces any
    /// earlier pending request.
    pub fn save_now(&self, content: String) {
        self.requests.send_replace(Some(content));
    }

    pub fn state(&self) -> SaveState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SaveState> {
        self.state.clone()
    }
}

impl Drop for AutosaveHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct Autosave<S> {
    store: Arc<S>,
    draft: EssayDraft,
    baseline: String,
    last_saved: Option<String>,
    state: watch::Sender<SaveState>,
    notices: NoticeSender,
}

impl<S: DocumentStore> Autosave<S> {
    async fn run(mut self, mut settled: watch::Receiver<String>, mut requests: Requests) {
        loop {
            let content = tokio::select! {
                biased;
                Ok(()) = requests.changed() => match pending(&mut requests) {
                    Some(content) => content,
                    None => continue,
                },
                changed = settled.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let content = settled.borrow_and_update().clone();
                    if !self.should_autosave(&content) {
                        continue;
                    }
                    content
                }
            };
            self.save(content).await;
        }
        tracing::debug!("autosave stopped");
    }

    fn should_autosave(&self, content: &str) -> bool {
        !content.is_empty()
            && content != self.baseline
            && self.last_saved.as_deref() != Some(content)
    }

    async fn save(&mut self, content: String) {
        self.state.send_modify(|s| s.is_saving = true);
        tracing::debug!(bytes = content.len(), "saving draft");
        let draft = self.draft.with_content(content.clone());
        match self.store.save(&draft).await {
            Ok(()) => {
                let now = SystemTime::now();
                self.state.send_modify(|s| {
                    s.is_saving = false;
                    s.last_saved_at = Some(now);
                });
                self.last_saved = Some(content);
                tracing::info!("draft saved");
                notice::post(
                    &self.notices,
                    Notice::info("Essay saved", "Your changes have been saved successfully."),
                );
            }
            Err(err) => {
                self.state.send_modify(|s| s.is_saving = false);
                tracing::warn!(error = %err, "saving draft failed");
                notice::post(
                    &self.notices,
                    Notice::error(
                        "Save failed",
                        format!("There was an error saving your essay ({err}). Please try again."),
                    ),
                );
            }
        }
    }
}

/// Receiving end of the depth-one explicit request slot.
pub(crate) type Requests = watch::Receiver<Option<String>>;

/// Newest explicit request, marking it seen.
pub(crate) fn pending(requests: &mut Requests) -> Option<String> {
    requests.borrow_and_update().clone()
}
