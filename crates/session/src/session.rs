use std::ops::Range;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use essaydesk_core::debounce::DEFAULT_DELAY;
use essaydesk_core::history::DEFAULT_MAX_HISTORY;
use essaydesk_core::progress::{self, DEFAULT_WORD_LIMIT};
use essaydesk_core::{Debounced, FormatCommand, History, cursor, format};
use essaydesk_proto::EssayDraft;
use tokio::sync::mpsc;

use crate::analysis::{AnalysisHandle, AnalysisState};
use crate::autosave::{AutosaveHandle, SaveState};
use crate::notice::{self, Notice, NoticeReceiver, NoticeSender};
use crate::service::{Analyzer, DocumentStore};

/// Direction for cursor movement or selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
    LineStart,
    LineEnd,
}

/// Commands that can be sent to the session actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCmd {
    /// Replace the whole content.
    Edit { content: String },
    /// Insert `text` at the cursor, replacing the selection.
    Insert { text: String },
    /// Delete the selection or the grapheme before the cursor.
    DeletePrev,
    /// Delete the selection or the grapheme after the cursor.
    DeleteNext,
    Move(Direction),
    /// Extend the selection in the given direction.
    Select(Direction),
    SetSelection(Range<usize>),
    Format(FormatCommand),
    Undo,
    Redo,
    Save,
    Analyze,
    /// Replace the content with a text file.
    Upload { path: PathBuf },
    /// Request the current view without modifying state.
    RequestView,
}

/// Tunables for one editing session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub debounce: Duration,
    pub max_history: usize,
    pub word_limit: usize,
    /// Analyse non-empty content once when the session opens.
    pub analyze_on_open: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DELAY,
            max_history: DEFAULT_MAX_HISTORY,
            word_limit: DEFAULT_WORD_LIMIT,
            analyze_on_open: true,
        }
    }
}

/// Everything the UI needs to draw the editor.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub content: String,
    /// Byte range from anchor to cursor; may run backwards.
    pub selection: Range<usize>,
    pub can_undo: bool,
    pub can_redo: bool,
    pub history_index: usize,
    pub history_len: usize,
    pub save: SaveState,
    pub analysis: AnalysisState,
    pub word_count: usize,
    pub word_limit: usize,
    /// When the session opened; the renderer derives the writing time.
    pub started_at: SystemTime,
}

impl View {
    pub fn cursor(&self) -> usize {
        self.selection.end
    }

    /// Selection with its bounds in ascending order.
    pub fn selected(&self) -> Range<usize> {
        format::normalize(&self.content, self.selection.clone())
    }

    /// Time spent in the session as of `now`.
    pub fn elapsed(&self, now: SystemTime) -> Duration {
        now.duration_since(self.started_at).unwrap_or_default()
    }
}

/// Handle for interacting with a running session.
pub struct SessionHandle {
    pub cmd: mpsc::Sender<SessionCmd>,
    pub views: mpsc::Receiver<View>,
    pub notices: NoticeReceiver,
}

/// Spawn a session editing `draft`.
pub fn open<S, A>(draft: EssayDraft, store: Arc<S>, analyzer: Arc<A>, config: SessionConfig) -> SessionHandle
where
    S: DocumentStore,
    A: Analyzer,
{
    Session::spawn(draft, store, analyzer, config)
}

struct Session {
    history: History,
    selection: Range<usize>,
    debounced: Debounced<String>,
    autosave: AutosaveHandle,
    analysis: AnalysisHandle,
    notices: NoticeSender,
    word_limit: usize,
    started_at: SystemTime,
}

impl Session {
    fn spawn<S, A>(draft: EssayDraft, store: Arc<S>, analyzer: Arc<A>, config: SessionConfig) -> SessionHandle
    where
        S: DocumentStore,
        A: Analyzer,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let (view_tx, view_rx) = mpsc::channel(32);
        let (notice_tx, notice_rx) = notice::channel();

        let debounced = Debounced::new(draft.content.clone(), config.debounce);
        let autosave = AutosaveHandle::spawn(store, draft.clone(), debounced.subscribe(), notice_tx.clone());
        let analysis = AnalysisHandle::spawn(
            analyzer,
            debounced.subscribe(),
            notice_tx.clone(),
            config.analyze_on_open,
        );
        let end = draft.content.len();
        let session = Session {
            history: History::new(draft.content, config.max_history),
            selection: end..end,
            debounced,
            autosave,
            analysis,
            notices: notice_tx,
            word_limit: config.word_limit,
            started_at: SystemTime::now(),
        };
        tokio::spawn(async move {
            session.run(cmd_rx, view_tx).await;
        });
        SessionHandle {
            cmd: cmd_tx,
            views: view_rx,
            notices: notice_rx,
        }
    }

    async fn run(mut self, mut rx: mpsc::Receiver<SessionCmd>, tx: mpsc::Sender<View>) {
        let mut saves = self.autosave.subscribe();
        let mut analyses = self.analysis.subscribe();
        loop {
            tokio::select! {
                cmd = rx.recv() => match cmd {
                    Some(cmd) => self.handle(cmd),
                    None => break,
                },
                Ok(()) = saves.changed() => {
                    saves.borrow_and_update();
                }
                Ok(()) = analyses.changed() => {
                    analyses.borrow_and_update();
                }
            }
            if tx.send(self.view()).await.is_err() {
                break;
            }
        }
        tracing::debug!("session closed");
    }

    fn handle(&mut self, cmd: SessionCmd) {
        match cmd {
            SessionCmd::Edit { content } => {
                let end = content.len();
                self.commit(content, end..end);
            }
            SessionCmd::Insert { text } => {
                let range = self.selected();
                let mut content = self.content().to_string();
                content.replace_range(range.clone(), &text);
                let pos = range.start + text.len();
                self.commit(content, pos..pos);
            }
            SessionCmd::DeletePrev => {
                let range = self.selected();
                let range = if range.is_empty() {
                    match cursor::grapheme_left(self.content(), range.start) {
                        Some(prev) => prev..range.start,
                        None => return,
                    }
                } else {
                    range
                };
                self.delete(range);
            }
            SessionCmd::DeleteNext => {
                let range = self.selected();
                let range = if range.is_empty() {
                    match cursor::grapheme_right(self.content(), range.end) {
                        Some(next) => range.end..next,
                        None => return,
                    }
                } else {
                    range
                };
                self.delete(range);
            }
            SessionCmd::Move(dir) => {
                let pos = self.step(self.selection.end, dir);
                self.selection = pos..pos;
            }
            SessionCmd::Select(dir) => {
                self.selection.end = self.step(self.selection.end, dir);
            }
            SessionCmd::SetSelection(range) => {
                self.selection = format::normalize(self.content(), range);
            }
            SessionCmd::Format(command) => {
                let formatted = format::apply_with_selection(self.content(), self.selected(), command);
                let end = formatted.selection.end;
                self.commit(formatted.content, end..end);
            }
            SessionCmd::Undo => {
                if self.history.undo() {
                    self.after_history_move();
                    notice::post(&self.notices, Notice::info("Undo", "Last action undone"));
                }
            }
            SessionCmd::Redo => {
                if self.history.redo() {
                    self.after_history_move();
                    notice::post(&self.notices, Notice::info("Redo", "Last action redone"));
                }
            }
            SessionCmd::Save => {
                self.autosave.save_now(self.content().to_string());
            }
            SessionCmd::Analyze => {
                self.analysis.analyze_now(self.content().to_string());
            }
            SessionCmd::Upload { path } => match essaydesk_core::fs::read_upload(&path) {
                Ok(text) => {
                    tracing::info!(path = %path.display(), "uploaded essay file");
                    let end = text.len();
                    self.commit(text, end..end);
                    notice::post(
                        &self.notices,
                        Notice::info("File uploaded", "Your file has been uploaded successfully."),
                    );
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "upload failed");
                    notice::post(
                        &self.notices,
                        Notice::error(
                            "Upload failed",
                            "There was an error uploading your file. Please try again.",
                        ),
                    );
                }
            },
            SessionCmd::RequestView => {}
        }
    }

    fn content(&self) -> &str {
        self.history.current_content()
    }

    /// Selection ordered and clamped to the current content.
    fn selected(&self) -> Range<usize> {
        format::normalize(self.content(), self.selection.clone())
    }

    fn step(&self, pos: usize, dir: Direction) -> usize {
        let text = self.content();
        match dir {
            Direction::Left => cursor::grapheme_left(text, pos).unwrap_or(0),
            Direction::Right => cursor::grapheme_right(text, pos).unwrap_or(text.len()),
            Direction::Up => cursor::line_up(text, pos),
            Direction::Down => cursor::line_down(text, pos),
            Direction::LineStart => cursor::line_start(text, pos),
            Direction::LineEnd => cursor::line_end(text, pos),
        }
    }

    fn delete(&mut self, range: Range<usize>) {
        let mut content = self.content().to_string();
        content.replace_range(range.clone(), "");
        self.commit(content, range.start..range.start);
    }

    /// Record new content as one undoable step.
    fn commit(&mut self, content: String, selection: Range<usize>) {
        self.history.append(content);
        self.selection = selection;
        self.debounced.set(self.content().to_string());
    }

    fn after_history_move(&mut self) {
        let end = self.content().len();
        self.selection = end..end;
        self.debounced.set(self.content().to_string());
    }

    fn view(&self) -> View {
        let content = self.content().to_string();
        View {
            word_count: progress::word_count(&content),
            selection: self.selection.clone(),
            content,
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
            history_index: self.history.index(),
            history_len: self.history.len(),
            save: self.autosave.state(),
            analysis: self.analysis.state(),
            word_limit: self.word_limit,
            started_at: self.started_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ServiceError;
    use essaydesk_proto::AnalysisResult;

    struct NullStore;

    impl DocumentStore for NullStore {
        async fn save(&self, _draft: &EssayDraft) -> Result<(), ServiceError> {
            Ok(())
        }
    }

    struct NullAnalyzer;

    impl Analyzer for NullAnalyzer {
        async fn analyze(&self, _content: &str) -> Result<AnalysisResult, ServiceError> {
            Ok(AnalysisResult::default())
        }
    }

    fn spawn(content: &str) -> SessionHandle {
        let draft = EssayDraft {
            content: content.into(),
            ..Default::default()
        };
        let config = SessionConfig {
            analyze_on_open: false,
            ..Default::default()
        };
        open(draft, Arc::new(NullStore), Arc::new(NullAnalyzer), config)
    }

    async fn send(handle: &mut SessionHandle, cmd: SessionCmd) -> View {
        handle.cmd.send(cmd).await.unwrap();
        handle.views.recv().await.unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn insert_appends_snapshot_at_cursor() {
        let mut handle = spawn("hi");
        let view = send(&mut handle, SessionCmd::Insert { text: " there".into() }).await;
        assert_eq!(view.content, "hi there");
        assert_eq!(view.cursor(), 8);
        assert_eq!(view.history_len, 2);
        assert!(view.can_undo);
        assert_eq!(view.word_count, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn format_uses_selection_and_is_undoable() {
        let mut handle = spawn("hello world");
        send(&mut handle, SessionCmd::SetSelection(0..5)).await;
        let view = send(&mut handle, SessionCmd::Format(FormatCommand::Bold)).await;
        assert_eq!(view.content, "**hello** world");
        assert_eq!(view.cursor(), 7);
        assert_eq!(view.history_len, 2);

        let view = send(&mut handle, SessionCmd::Undo).await;
        assert_eq!(view.content, "hello world");
        assert!(view.can_redo);
        assert_eq!(handle.notices.recv().await.unwrap().title, "Undo");
    }

    #[tokio::test(start_paused = true)]
    async fn unavailable_undo_is_silent() {
        let mut handle = spawn("x");
        let view = send(&mut handle, SessionCmd::Undo).await;
        assert_eq!(view.content, "x");
        assert!(handle.notices.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn delete_prev_removes_whole_grapheme() {
        let mut handle = spawn("ab😊");
        let view = send(&mut handle, SessionCmd::DeletePrev).await;
        assert_eq!(view.content, "ab");
        send(&mut handle, SessionCmd::Move(Direction::LineStart)).await;
        let view = send(&mut handle, SessionCmd::DeletePrev).await;
        assert_eq!(view.content, "ab");
        assert_eq!(view.history_len, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn select_then_insert_replaces_selection() {
        let mut handle = spawn("cat");
        send(&mut handle, SessionCmd::Move(Direction::LineStart)).await;
        send(&mut handle, SessionCmd::Select(Direction::Right)).await;
        let view = send(&mut handle, SessionCmd::Insert { text: "b".into() }).await;
        assert_eq!(view.content, "bat");
        assert_eq!(view.selection, 1..1);
    }

    #[tokio::test(start_paused = true)]
    async fn edit_after_undo_drops_redo_branch() {
        let mut handle = spawn("");
        send(&mut handle, SessionCmd::Edit { content: "one".into() }).await;
        send(&mut handle, SessionCmd::Edit { content: "two".into() }).await;
        send(&mut handle, SessionCmd::Undo).await;
        let view = send(&mut handle, SessionCmd::Edit { content: "three".into() }).await;
        assert!(!view.can_redo);
        let view = send(&mut handle, SessionCmd::Redo).await;
        assert_eq!(view.content, "three");
    }
}
