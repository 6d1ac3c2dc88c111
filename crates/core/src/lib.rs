//! Editor building blocks: snapshot history, debouncing, formatting and
//! text helpers.

pub mod cursor;
pub mod debounce;
pub mod format;
pub mod fs;
pub mod history;
pub mod progress;

pub use debounce::{Debounced, Debouncer};
pub use format::{FormatCommand, Formatted};
pub use history::{History, Snapshot};
