use std::time::{Duration, SystemTime};

use anyhow::Result;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use essaydesk_core::cursor;
use essaydesk_core::progress::{format_elapsed, format_word_count};
use essaydesk_session::{Notice, SaveState, View};
use ratatui::{
    Terminal,
    backend::Backend,
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

/// How long "Saved" stays visible after a save completes.
const SAVED_BADGE: Duration = Duration::from_secs(2);

/// Minimum terminal width before the analysis panel is shown.
const PANEL_MIN_WIDTH: u16 = 72;
const PANEL_WIDTH: u16 = 34;

/// Transient UI elements drawn around the editor.
#[derive(Debug, Default, Clone, Copy)]
pub struct Chrome<'a> {
    pub notice: Option<&'a Notice>,
    /// Contents of the upload path prompt, when open.
    pub prompt: Option<&'a str>,
}

/// Terminal user interface renderer.
pub struct Tui<B: Backend> {
    terminal: Terminal<B>,
    raw_mode: bool,
    first_line: usize,
}

impl<B: Backend> Tui<B> {
    /// Take over the terminal behind `backend`. Raw mode stays on until the
    /// `Tui` is dropped.
    pub fn new(backend: B) -> Result<Self> {
        enable_raw_mode()?;
        let mut tui = match Self::attach(backend, true) {
            Ok(tui) => tui,
            Err(err) => {
                let _ = disable_raw_mode();
                return Err(err);
            }
        };
        tui.terminal.hide_cursor()?;
        Ok(tui)
    }

    /// Render into `backend` without touching terminal modes.
    #[cfg(test)]
    pub fn new_for_test(backend: B) -> Result<Self> {
        Self::attach(backend, false)
    }

    fn attach(backend: B, raw_mode: bool) -> Result<Self> {
        Ok(Self {
            terminal: Terminal::new(backend)?,
            raw_mode,
            first_line: 0,
        })
    }

    /// Draw the editor for `view`.
    pub fn draw(&mut self, view: &View, chrome: Chrome<'_>) -> Result<()> {
        let (cursor_line, cursor_col) = cursor::line_col(&view.content, view.cursor());
        let mut first_line = self.first_line;
        self.terminal.draw(|f| {
            let size = f.area();
            let text_height = size.height.saturating_sub(1);
            let (text_width, panel) = if size.width >= PANEL_MIN_WIDTH {
                (size.width - PANEL_WIDTH, true)
            } else {
                (size.width, false)
            };

            first_line = scroll_to(first_line, cursor_line, text_height as usize);

            // Text area
            let lines: Vec<Line<'static>> = view
                .content
                .split('\n')
                .skip(first_line)
                .take(text_height as usize)
                .map(|l| Line::raw(l.to_string()))
                .collect();
            let text_area = Rect {
                x: 0,
                y: 0,
                width: text_width,
                height: text_height,
            };
            f.render_widget(Paragraph::new(lines), text_area);

            if panel {
                let panel_area = Rect {
                    x: text_width,
                    y: 0,
                    width: PANEL_WIDTH,
                    height: text_height,
                };
                let block = Block::default().borders(Borders::LEFT).title(" Analysis ");
                f.render_widget(Paragraph::new(analysis_lines(view)).block(block), panel_area);
            }

            // Status line
            let (left, right) = status_line(view, chrome, SystemTime::now());
            let status = spread(&left, &right, size.width as usize);
            let status_area = Rect {
                x: 0,
                y: text_height,
                width: size.width,
                height: 1,
            };
            f.render_widget(Paragraph::new(status), status_area);

            // Cursor placement
            if let Some(prompt) = chrome.prompt {
                let x = (PROMPT_LABEL.len() + prompt.chars().count()) as u16;
                f.set_cursor_position((x.min(size.width.saturating_sub(1)), text_height));
            } else {
                let x = (cursor_col as u16).min(text_width.saturating_sub(1));
                let y = (cursor_line - first_line) as u16;
                f.set_cursor_position((x, y));
            }
        })?;
        self.first_line = first_line;
        Ok(())
    }
}

impl<B: Backend> Drop for Tui<B> {
    fn drop(&mut self) {
        if !self.raw_mode {
            return;
        }
        let _ = self.terminal.show_cursor();
        let _ = disable_raw_mode();
    }
}

#[cfg(test)]
impl<B: Backend> Tui<B> {
    pub fn backend(&mut self) -> &mut B {
        self.terminal.backend_mut()
    }
}

const PROMPT_LABEL: &str = "Upload file: ";

/// First visible line keeping `cursor_line` on screen.
fn scroll_to(first_line: usize, cursor_line: usize, height: usize) -> usize {
    if height == 0 || cursor_line < first_line {
        cursor_line
    } else if cursor_line >= first_line + height {
        cursor_line + 1 - height
    } else {
        first_line
    }
}

/// Left and right halves of the status line.
pub fn status_line(view: &View, chrome: Chrome<'_>, now: SystemTime) -> (String, String) {
    let left = if let Some(prompt) = chrome.prompt {
        format!("{PROMPT_LABEL}{prompt}")
    } else if let Some(notice) = chrome.notice {
        format!("{}: {}", notice.title, notice.description)
    } else {
        save_label(&view.save, now).to_string()
    };
    let mut right = format!(
        "{} {}",
        format_word_count(view.word_count, view.word_limit),
        format_elapsed(view.elapsed(now))
    );
    if view.analysis.is_analyzing {
        right.insert_str(0, "analyzing… ");
    }
    (left, right)
}

/// `left` and `right` separated by enough spaces to fill `width` columns.
fn spread(left: &str, right: &str, width: usize) -> String {
    let used = left.chars().count() + right.chars().count();
    let gap = width.saturating_sub(used);
    format!("{left}{}{right}", " ".repeat(gap))
}

/// Autosave indicator text.
pub fn save_label(state: &SaveState, now: SystemTime) -> &'static str {
    if state.is_saving {
        return "Saving...";
    }
    match state.last_saved_at {
        Some(at) if now.duration_since(at).unwrap_or_default() < SAVED_BADGE => "Saved",
        _ => "",
    }
}

fn analysis_lines(view: &View) -> Vec<Line<'static>> {
    let Some(result) = &view.analysis.result else {
        let msg = if view.analysis.is_analyzing {
            "Analyzing your essay..."
        } else {
            "No analysis yet (Ctrl+A)"
        };
        return vec![Line::raw(msg)];
    };
    let mut lines: Vec<Line<'static>> = result
        .metrics
        .entries()
        .iter()
        .map(|(label, score)| Line::raw(format!("{label:<12}{score:>3}/100")))
        .collect();
    lines.push(Line::raw(""));
    for s in &result.suggestions {
        lines.push(Line::raw(format!("[{:?}] {}", s.severity, s.text)));
        lines.push(Line::raw(format!("  → {}", s.suggestion)));
    }
    lines
}
