use std::sync::Arc;

use essaydesk_proto::AnalysisResult;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::autosave::{Requests, pending};
use crate::notice::{self, Notice, NoticeSender};
use crate::service::Analyzer;

/// Feedback status for the current essay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisState {
    pub is_analyzing: bool,
    /// Most recent successful result; kept when a later call fails.
    pub result: Option<AnalysisResult>,
}

/// Handle to a running analysis task.
///
/// At most one analysis call runs at a time; content settling while a call
/// is in flight is coalesced to the newest value. Dropping the handle stops
/// the task and discards any in-flight result.
pub struct AnalysisHandle {
    requests: watch::Sender<Option<String>>,
    state: watch::Receiver<AnalysisState>,
    task: JoinHandle<()>,
}

impl AnalysisHandle {
    /// Start analysing `settled` content with `analyzer`.
    ///
    /// With `analyze_initial`, the value `settled` holds right now is
    /// analysed once on start.
    pub fn spawn<A: Analyzer>(
        analyzer: Arc<A>,
        mut settled: watch::Receiver<String>,
        notices: NoticeSender,
        analyze_initial: bool,
    ) -> Self {
        let (req_tx, req_rx) = watch::channel(None);
        let (state_tx, state_rx) = watch::channel(AnalysisState::default());
        if analyze_initial {
            settled.mark_changed();
        }
        let worker = Analysis {
            analyzer,
            last_analyzed: None,
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

    /// Analyse `content` now, even if it was analysed before. Never waits
    /// for a running call.
    pub fn analyze_now(&self, content: String) {
        self.requests.send_replace(Some(content));
    }

    pub fn state(&self) -> AnalysisState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AnalysisState> {
        self.state.clone()
    }
}

impl Drop for AnalysisHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct Analysis<A> {
    analyzer: Arc<A>,
    last_analyzed: Option<String>,
    state: watch::Sender<AnalysisState>,
    notices: NoticeSender,
}

impl<A: Analyzer> Analysis<A> {
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
                    if self.last_analyzed.as_deref() == Some(content.as_str()) {
                        continue;
                    }
                    content
                }
            };
            if content.trim().is_empty() {
                tracing::debug!("skipping analysis of empty essay");
                continue;
            }
            self.analyze(content).await;
        }
        tracing::debug!("analysis stopped");
    }

    async fn analyze(&mut self, content: String) {
        self.state.send_modify(|s| s.is_analyzing = true);
        tracing::debug!(bytes = content.len(), "requesting analysis");
        match self.analyzer.analyze(&content).await {
            Ok(result) => {
                tracing::info!(
                    overall = result.metrics.overall,
                    suggestions = result.suggestions.len(),
                    "analysis complete"
                );
                self.state.send_modify(|s| {
                    s.is_analyzing = false;
                    s.result = Some(result);
                });
                self.last_analyzed = Some(content);
            }
            Err(err) => {
                self.state.send_modify(|s| s.is_analyzing = false);
                tracing::warn!(error = %err, "analysis failed");
                notice::post(
                    &self.notices,
                    Notice::error(
                        "Analysis failed",
                        "There was an error analyzing your essay. Please try again.",
                    ),
                );
            }
        }
    }
}
