use std::time::{SystemTime, UNIX_EPOCH};

/// Default number of snapshots kept per editing session.
pub const DEFAULT_MAX_HISTORY: usize = 50;

/// One recorded state of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    content: String,
    timestamp: u64,
}

impl Snapshot {
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Creation time in milliseconds since the Unix epoch.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

/// Linear snapshot history with a cursor.
///
/// The log is never empty and `index` always points into it. Appending after
/// an undo drops every snapshot past the cursor before recording the new one.
#[derive(Debug, Clone)]
pub struct History {
    log: Vec<Snapshot>,
    index: usize,
    max_history: usize,
}

impl History {
    /// Start a history holding `initial` as its only snapshot.
    pub fn new(initial: impl Into<String>, max_history: usize) -> Self {
        Self {
            log: vec![Snapshot {
                content: initial.into(),
                timestamp: now_millis(),
            }],
            index: 0,
            max_history: max_history.max(1),
        }
    }

    /// Record `content` as the newest snapshot, stamped with the wall clock.
    pub fn append(&mut self, content: impl Into<String>) {
        self.append_at(content, now_millis());
    }

    /// Record `content` with an explicit timestamp.
    pub fn append_at(&mut self, content: impl Into<String>, timestamp: u64) {
        self.log.truncate(self.index + 1);
        self.log.push(Snapshot {
            content: content.into(),
            timestamp,
        });
        self.index += 1;
        if self.log.len() > self.max_history {
            let drop = self.log.len() - self.max_history;
            self.log.drain(0..drop);
            self.index -= drop;
        }
    }

    /// Step back one snapshot. Returns `true` if the cursor moved.
    pub fn undo(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    /// Step forward one snapshot. Returns `true` if the cursor moved.
    pub fn redo(&mut self) -> bool {
        if self.index + 1 >= self.log.len() {
            return false;
        }
        self.index += 1;
        true
    }

    pub fn current(&self) -> &Snapshot {
        &self.log[self.index]
    }

    pub fn current_content(&self) -> &str {
        &self.log[self.index].content
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.log.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.log
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new("", DEFAULT_MAX_HISTORY)
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(history: &History) -> Vec<&str> {
        history.snapshots().iter().map(Snapshot::content).collect()
    }

    fn assert_consistent(history: &History) {
        assert!(history.index() < history.len());
        assert!(history.len() <= history.max_history());
        assert_eq!(
            history.current_content(),
            history.snapshots()[history.index()].content()
        );
        assert_eq!(history.can_undo(), history.index() != 0);
        assert_eq!(history.can_redo(), history.index() != history.len() - 1);
    }

    #[test]
    fn starts_with_initial_snapshot() {
        let history = History::new("draft", 10);
        assert_eq!(history.current_content(), "draft");
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn undo_redo_move_cursor_only() {
        let mut history = History::new("", 10);
        history.append("a");
        history.append("ab");
        assert!(history.undo());
        assert_eq!(history.current_content(), "a");
        assert!(history.undo());
        assert_eq!(history.current_content(), "");
        assert!(!history.undo());
        assert_eq!(history.len(), 3);
        assert!(history.redo());
        assert!(history.redo());
        assert!(!history.redo());
        assert_eq!(history.current_content(), "ab");
    }

    #[test]
    fn append_after_undo_discards_redo_branch() {
        let mut history = History::new("", 10);
        history.append("one");
        history.append("two");
        history.undo();
        history.undo();
        history.append("three");
        assert_eq!(contents(&history), vec!["", "three"]);
        assert!(!history.redo());
        assert_eq!(history.current_content(), "three");
    }

    #[test]
    fn cap_drops_oldest_snapshots() {
        let mut history = History::new("a", 3);
        history.append("b");
        history.append("c");
        history.append("d");
        assert_eq!(contents(&history), vec!["b", "c", "d"]);
        assert_eq!(history.index(), 2);
        assert_eq!(history.current_content(), "d");
    }

    #[test]
    fn zero_cap_is_clamped_to_one() {
        let mut history = History::new("a", 0);
        history.append("b");
        assert_eq!(contents(&history), vec!["b"]);
        assert!(!history.can_undo());
    }

    #[test]
    fn append_at_records_timestamp() {
        let mut history = History::new("", 5);
        history.append_at("x", 42);
        assert_eq!(history.current().timestamp(), 42);
    }

    #[test]
    fn invariants_hold_across_mixed_operations() {
        let mut history = History::new("", 4);
        let mut seed: u32 = 7;
        for step in 0..500 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            match (seed >> 16) % 3 {
                0 => history.append(format!("v{step}")),
                1 => {
                    history.undo();
                }
                _ => {
                    history.redo();
                }
            }
            assert_consistent(&history);
        }
    }
}
