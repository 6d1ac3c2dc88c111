use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Markdown-style formatting applied to the selected text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatCommand {
    Bold,
    Italic,
    Underline,
    List,
    Numbered,
    Quote,
    Code,
}

impl FormatCommand {
    pub const ALL: [FormatCommand; 7] = [
        FormatCommand::Bold,
        FormatCommand::Italic,
        FormatCommand::Underline,
        FormatCommand::List,
        FormatCommand::Numbered,
        FormatCommand::Quote,
        FormatCommand::Code,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FormatCommand::Bold => "bold",
            FormatCommand::Italic => "italic",
            FormatCommand::Underline => "underline",
            FormatCommand::List => "list",
            FormatCommand::Numbered => "numbered",
            FormatCommand::Quote => "quote",
            FormatCommand::Code => "code",
        }
    }

    /// Text inserted before and after the selection.
    fn markers(self) -> (&'static str, &'static str) {
        match self {
            FormatCommand::Bold => ("**", "**"),
            FormatCommand::Italic => ("*", "*"),
            FormatCommand::Underline => ("__", "__"),
            FormatCommand::List => ("\n- ", ""),
            FormatCommand::Numbered => ("\n1. ", ""),
            FormatCommand::Quote => ("> ", ""),
            FormatCommand::Code => ("`", "`"),
        }
    }
}

impl fmt::Display for FormatCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFormat(pub String);

impl fmt::Display for UnknownFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown format command: {}", self.0)
    }
}

impl std::error::Error for UnknownFormat {}

impl FromStr for FormatCommand {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormatCommand::ALL
            .into_iter()
            .find(|cmd| cmd.name() == s)
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

/// Result of formatting: the new text and the byte range now holding the
/// originally selected text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatted {
    pub content: String,
    pub selection: Range<usize>,
}

/// Wrap or prefix `selection` of `content` with the markers of `cmd`.
///
/// Selection bounds are byte offsets; they are ordered, clamped to the
/// content and moved down onto character boundaries.
pub fn apply(content: &str, selection: Range<usize>, cmd: FormatCommand) -> String {
    apply_with_selection(content, selection, cmd).content
}

pub fn apply_with_selection(content: &str, selection: Range<usize>, cmd: FormatCommand) -> Formatted {
    let Range { start, end } = normalize(content, selection);
    let (open, close) = cmd.markers();
    let mut out = String::with_capacity(content.len() + open.len() + close.len());
    out.push_str(&content[..start]);
    out.push_str(open);
    out.push_str(&content[start..end]);
    out.push_str(close);
    out.push_str(&content[end..]);
    let inner = start + open.len();
    Formatted {
        content: out,
        selection: inner..inner + (end - start),
    }
}

/// Order and clamp a byte range so it can slice `text`.
pub fn normalize(text: &str, range: Range<usize>) -> Range<usize> {
    let (a, b) = if range.start <= range.end {
        (range.start, range.end)
    } else {
        (range.end, range.start)
    };
    floor_boundary(text, a)..floor_boundary(text, b)
}

fn floor_boundary(text: &str, idx: usize) -> usize {
    let mut idx = idx.min(text.len());
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}
