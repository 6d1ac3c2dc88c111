//! Editing session for one essay: snapshot history, debounced autosave and
//! debounced writing analysis.

pub mod analysis;
pub mod autosave;
pub mod notice;
pub mod service;
pub mod session;

pub use analysis::{AnalysisHandle, AnalysisState};
pub use autosave::{AutosaveHandle, SaveState};
pub use notice::{Notice, NoticeLevel};
pub use service::{Analyzer, DocumentStore, ServiceError};
pub use session::{Direction, SessionCmd, SessionConfig, SessionHandle, View};
