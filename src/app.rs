//! Terminal front end: owns the screen and forwards keys to the session.

use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, supports_keyboard_enhancement,
};
use essaydesk_client::LocalClient;
use essaydesk_client::keymap::{Command, Focus, map_key_event};
use essaydesk_client::tui::{Chrome, Tui};
use essaydesk_core::fs::read_draft;
use essaydesk_session::{Analyzer, DocumentStore, Notice, SessionCmd, SessionHandle, View};
use futures_util::StreamExt;
use ratatui::backend::CrosstermBackend;

use crate::cli::EditOptions;

/// How long a notice stays in the status line.
const NOTICE_TTL: Duration = Duration::from_secs(2);
const TICK: Duration = Duration::from_secs(1);

/// Open `opts.file` and run the editor until the user quits.
pub async fn run<S, A>(opts: EditOptions, store: Arc<S>, analyzer: Arc<A>) -> Result<()>
where
    S: DocumentStore,
    A: Analyzer,
{
    let content = read_draft(&opts.file)
        .with_context(|| format!("reading {}", opts.file.display()))?;
    let draft = opts.draft.with_content(content);
    let handle = LocalClient::open(draft, store, analyzer, opts.config).into_handle();

    install_panic_hook();
    execute!(io::stdout(), EnterAlternateScreen)?;
    let result = match Tui::new(CrosstermBackend::new(io::stdout())) {
        Ok(mut tui) => {
            let disambiguated = disambiguate_keys();
            tracing::debug!(disambiguated, "keyboard protocol");
            let result = event_loop(&mut tui, handle).await;
            if disambiguated {
                let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
            }
            result
        }
        Err(err) => Err(err),
    };
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
    tracing::info!("editor closed");
    result
}

async fn event_loop(tui: &mut Tui<CrosstermBackend<Stdout>>, handle: SessionHandle) -> Result<()> {
    let SessionHandle {
        cmd,
        mut views,
        mut notices,
    } = handle;
    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(TICK);
    let mut input = Input::default();
    let mut view: Option<View> = None;
    let mut notice: Option<(Notice, Instant)> = None;

    cmd.send(SessionCmd::RequestView)
        .await
        .context("editing session stopped")?;

    loop {
        let mut redraw = false;
        tokio::select! {
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    match input.handle_key(key) {
                        Action::Quit => break,
                        Action::Send(command) => {
                            if cmd.send(command).await.is_err() {
                                break;
                            }
                        }
                        Action::Redraw => redraw = true,
                        Action::Ignore => {}
                    }
                }
                Some(Ok(Event::Resize(..))) => redraw = true,
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(err.into()),
                None => break,
            },
            next = views.recv() => match next {
                Some(next) => {
                    view = Some(next);
                    redraw = true;
                }
                None => break,
            },
            Some(next) = notices.recv() => {
                tracing::debug!(title = %next.title, error = next.is_error(), "notice");
                notice = Some((next, Instant::now()));
                redraw = true;
            }
            _ = tick.tick() => {
                if notice.as_ref().is_some_and(|(_, at)| at.elapsed() >= NOTICE_TTL) {
                    notice = None;
                }
                redraw = true;
            }
        }

        if let (true, Some(view)) = (redraw, &view) {
            let chrome = Chrome {
                notice: notice.as_ref().map(|(n, _)| n),
                prompt: input.prompt.as_deref(),
            };
            tui.draw(view, chrome)?;
        }
    }
    Ok(())
}

/// What the event loop should do after a key press.
#[derive(Debug, PartialEq)]
enum Action {
    Ignore,
    Redraw,
    Send(SessionCmd),
    Quit,
}

/// Key handling that lives outside the session: quitting and the upload prompt.
#[derive(Debug, Default)]
struct Input {
    prompt: Option<String>,
}

impl Input {
    fn focus(&self) -> Focus {
        if self.prompt.is_some() {
            Focus::TextField
        } else {
            Focus::Editor
        }
    }

    fn handle_key(&mut self, ev: KeyEvent) -> Action {
        let ctrl = ev.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && ev.code == KeyCode::Char('c') {
            return Action::Quit;
        }

        if self.prompt.is_some() {
            match ev.code {
                KeyCode::Esc => {
                    self.prompt = None;
                    return Action::Redraw;
                }
                KeyCode::Enter => {
                    let path = self.prompt.take().unwrap_or_default();
                    let path = path.trim();
                    if path.is_empty() {
                        return Action::Redraw;
                    }
                    return Action::Send(SessionCmd::Upload {
                        path: PathBuf::from(path),
                    });
                }
                _ => {}
            }
            let prompt = self.prompt.get_or_insert_with(String::new);
            return match map_key_event(ev, Focus::TextField) {
                Some(Command::Insert(text)) if !text.chars().any(char::is_control) => {
                    prompt.push_str(&text);
                    Action::Redraw
                }
                Some(Command::DeletePrev) => {
                    prompt.pop();
                    Action::Redraw
                }
                _ => Action::Ignore,
            };
        }

        match ev.code {
            KeyCode::Esc => Action::Quit,
            KeyCode::Char('o') if ctrl => {
                self.prompt = Some(String::new());
                Action::Redraw
            }
            _ => match map_key_event(ev, self.focus()) {
                Some(command) => Action::Send(command.into()),
                None => Action::Ignore,
            },
        }
    }
}

/// Ask the terminal to report Ctrl+I apart from Tab and to keep Shift on
/// Ctrl chords. Returns whether the flags were pushed.
fn disambiguate_keys() -> bool {
    if !matches!(supports_keyboard_enhancement(), Ok(true)) {
        return false;
    }
    execute!(
        io::stdout(),
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
    )
    .is_ok()
}

/// Leave raw mode and the alternate screen before the panic message prints.
fn install_panic_hook() {
    let original = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags, LeaveAlternateScreen);
        original(info);
    }));
}
