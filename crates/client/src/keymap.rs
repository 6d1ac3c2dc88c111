use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use essaydesk_core::FormatCommand;
use essaydesk_session::{Direction, SessionCmd};

/// Where keyboard input is currently going.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// The essay text; shortcuts are live.
    #[default]
    Editor,
    /// A single-line input such as the upload path prompt. Shortcuts are
    /// suppressed so ordinary typing is never intercepted.
    TextField,
}

/// Action bound to a modifier+key combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Save,
    Undo,
    Redo,
    Format(FormatCommand),
    Analyze,
}

/// One row of the shortcut table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub key: char,
    pub shift: bool,
    pub action: Shortcut,
    pub description: &'static str,
}

impl Binding {
    const fn ctrl(key: char, action: Shortcut, description: &'static str) -> Self {
        Self {
            key,
            shift: false,
            action,
            description,
        }
    }

    const fn ctrl_shift(key: char, action: Shortcut, description: &'static str) -> Self {
        Self {
            key,
            shift: true,
            action,
            description,
        }
    }

    /// Human-readable chord, e.g. `Ctrl+Shift+Z`.
    pub fn label(&self) -> String {
        let shift = if self.shift { "Shift+" } else { "" };
        format!("Ctrl+{shift}{}", self.key.to_ascii_uppercase())
    }
}

/// Editor keyboard shortcuts. All use Ctrl (Cmd on macOS terminals that
/// forward it as Ctrl).
///
/// Terminals without the kitty keyboard protocol send Ctrl+I as Tab and drop
/// Shift from Ctrl chords, so Ctrl+E, Ctrl+N and Ctrl+Y stand in for the
/// chords they cannot report.
pub const SHORTCUTS: &[Binding] = &[
    Binding::ctrl('s', Shortcut::Save, "Save essay"),
    Binding::ctrl('z', Shortcut::Undo, "Undo"),
    Binding::ctrl_shift('z', Shortcut::Redo, "Redo"),
    Binding::ctrl('y', Shortcut::Redo, "Redo"),
    Binding::ctrl('b', Shortcut::Format(FormatCommand::Bold), "Bold"),
    Binding::ctrl('i', Shortcut::Format(FormatCommand::Italic), "Italic"),
    Binding::ctrl('e', Shortcut::Format(FormatCommand::Italic), "Italic"),
    Binding::ctrl('u', Shortcut::Format(FormatCommand::Underline), "Underline"),
    Binding::ctrl('l', Shortcut::Format(FormatCommand::List), "Bullet list"),
    Binding::ctrl_shift('l', Shortcut::Format(FormatCommand::Numbered), "Numbered list"),
    Binding::ctrl('n', Shortcut::Format(FormatCommand::Numbered), "Numbered list"),
    Binding::ctrl('q', Shortcut::Format(FormatCommand::Quote), "Quote"),
    Binding::ctrl('k', Shortcut::Format(FormatCommand::Code), "Code block"),
    Binding::ctrl('a', Shortcut::Analyze, "Analyze essay"),
];

/// Look up the shortcut for a Ctrl chord.
pub fn shortcut_for(key: char, shift: bool) -> Option<Shortcut> {
    let key = key.to_ascii_lowercase();
    SHORTCUTS
        .iter()
        .find(|b| b.key == key && b.shift == shift)
        .map(|b| b.action)
}

/// High-level editor command derived from a key event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Insert the given text at the cursor position.
    Insert(String),
    /// Delete the character before the cursor.
    DeletePrev,
    /// Delete the character at the cursor.
    DeleteNext,
    /// Move the cursor in the given direction without modifying the selection.
    Move(Direction),
    /// Extend the selection in the given direction.
    Select(Direction),
    Shortcut(Shortcut),
}

impl From<Shortcut> for SessionCmd {
    fn from(shortcut: Shortcut) -> Self {
        match shortcut {
            Shortcut::Save => SessionCmd::Save,
            Shortcut::Undo => SessionCmd::Undo,
            Shortcut::Redo => SessionCmd::Redo,
            Shortcut::Format(cmd) => SessionCmd::Format(cmd),
            Shortcut::Analyze => SessionCmd::Analyze,
        }
    }
}

impl From<Command> for SessionCmd {
    fn from(command: Command) -> Self {
        match command {
            Command::Insert(text) => SessionCmd::Insert { text },
            Command::DeletePrev => SessionCmd::DeletePrev,
            Command::DeleteNext => SessionCmd::DeleteNext,
            Command::Move(dir) => SessionCmd::Move(dir),
            Command::Select(dir) => SessionCmd::Select(dir),
            Command::Shortcut(shortcut) => shortcut.into(),
        }
    }
}

/// Translate a crossterm [`KeyEvent`] into an editor [`Command`].
///
/// Returns `None` for keys that have no associated command, including every
/// Ctrl chord while `focus` is a text field.
pub fn map_key_event(ev: KeyEvent, focus: Focus) -> Option<Command> {
    let shift = ev.modifiers.contains(KeyModifiers::SHIFT);
    match ev.code {
        KeyCode::Char(c) if ev.modifiers.contains(KeyModifiers::CONTROL) => {
            if focus != Focus::Editor {
                return None;
            }
            shortcut_for(c, shift || c.is_ascii_uppercase()).map(Command::Shortcut)
        }
        KeyCode::Char(c) => {
            if ev.modifiers.contains(KeyModifiers::ALT) {
                None
            } else {
                Some(Command::Insert(c.to_string()))
            }
        }
        KeyCode::Enter => Some(Command::Insert("\n".into())),
        KeyCode::Tab => Some(Command::Insert("\t".into())),
        KeyCode::Backspace => Some(Command::DeletePrev),
        KeyCode::Delete => Some(Command::DeleteNext),
        KeyCode::Left => Some(motion(Direction::Left, shift)),
        KeyCode::Right => Some(motion(Direction::Right, shift)),
        KeyCode::Up => Some(motion(Direction::Up, shift)),
        KeyCode::Down => Some(motion(Direction::Down, shift)),
        KeyCode::Home => Some(motion(Direction::LineStart, shift)),
        KeyCode::End => Some(motion(Direction::LineEnd, shift)),
        _ => None,
    }
}

fn motion(dir: Direction, shift: bool) -> Command {
    if shift {
        Command::Select(dir)
    } else {
        Command::Move(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn maps_char_to_insert() {
        let ev = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        assert_eq!(map_key_event(ev, Focus::Editor), Some(Command::Insert("a".into())));
    }

    #[test]
    fn maps_backspace_to_delete_prev() {
        let ev = KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(map_key_event(ev, Focus::Editor), Some(Command::DeletePrev));
    }

    #[test]
    fn maps_shift_left_to_select_left() {
        let ev = KeyEvent::new(KeyCode::Left, KeyModifiers::SHIFT);
        assert_eq!(
            map_key_event(ev, Focus::Editor),
            Some(Command::Select(Direction::Left))
        );
    }

    #[test]
    fn maps_ctrl_chords_to_shortcuts() {
        assert_eq!(
            map_key_event(ctrl('s'), Focus::Editor),
            Some(Command::Shortcut(Shortcut::Save))
        );
        assert_eq!(
            map_key_event(ctrl('b'), Focus::Editor),
            Some(Command::Shortcut(Shortcut::Format(FormatCommand::Bold)))
        );
        assert_eq!(
            map_key_event(ctrl('a'), Focus::Editor),
            Some(Command::Shortcut(Shortcut::Analyze))
        );
    }

    #[test]
    fn shift_distinguishes_undo_from_redo() {
        assert_eq!(
            map_key_event(ctrl('z'), Focus::Editor),
            Some(Command::Shortcut(Shortcut::Undo))
        );
        let shifted = KeyEvent::new(
            KeyCode::Char('Z'),
            KeyModifiers::CONTROL | KeyModifiers::SHIFT,
        );
        assert_eq!(
            map_key_event(shifted, Focus::Editor),
            Some(Command::Shortcut(Shortcut::Redo))
        );
        let numbered = KeyEvent::new(KeyCode::Char('L'), KeyModifiers::CONTROL);
        assert_eq!(
            map_key_event(numbered, Focus::Editor),
            Some(Command::Shortcut(Shortcut::Format(FormatCommand::Numbered)))
        );
    }

    #[test]
    fn text_field_focus_suppresses_shortcuts() {
        assert_eq!(map_key_event(ctrl('s'), Focus::TextField), None);
        let ev = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE);
        assert_eq!(
            map_key_event(ev, Focus::TextField),
            Some(Command::Insert("s".into()))
        );
    }

    #[test]
    fn unbound_chord_maps_to_nothing() {
        assert_eq!(map_key_event(ctrl('x'), Focus::Editor), None);
    }

    #[test]
    fn fallback_chords_reach_italic_and_numbered() {
        assert_eq!(
            map_key_event(ctrl('e'), Focus::Editor),
            Some(Command::Shortcut(Shortcut::Format(FormatCommand::Italic)))
        );
        assert_eq!(
            map_key_event(ctrl('n'), Focus::Editor),
            Some(Command::Shortcut(Shortcut::Format(FormatCommand::Numbered)))
        );
        // a legacy terminal reports Ctrl+I as a bare Tab
        let tab = KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE);
        assert_eq!(map_key_event(tab, Focus::Editor), Some(Command::Insert("\t".into())));
    }

    #[test]
    fn every_action_has_a_legacy_chord() {
        let legacy = |b: &&Binding| !b.shift && b.key != 'i';
        let mut actions = vec![Shortcut::Save, Shortcut::Undo, Shortcut::Redo, Shortcut::Analyze];
        actions.extend(FormatCommand::ALL.iter().copied().map(Shortcut::Format));
        for action in actions {
            assert!(
                SHORTCUTS.iter().filter(legacy).any(|b| b.action == action),
                "{action:?}"
            );
        }
    }

    #[test]
    fn every_chord_is_unique() {
        for (i, a) in SHORTCUTS.iter().enumerate() {
            for b in &SHORTCUTS[i + 1..] {
                assert!(!(a.key == b.key && a.shift == b.shift), "{}", a.label());
            }
        }
        assert_eq!(SHORTCUTS[2].label(), "Ctrl+Shift+Z");
    }

    #[test]
    fn shortcuts_convert_to_session_commands() {
        let cmd: SessionCmd = Command::Shortcut(Shortcut::Format(FormatCommand::Quote)).into();
        assert_eq!(cmd, SessionCmd::Format(FormatCommand::Quote));
        let cmd: SessionCmd = Command::Insert("x".into()).into();
        assert_eq!(cmd, SessionCmd::Insert { text: "x".into() });
    }
}
