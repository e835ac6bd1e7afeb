use crate::compile::{
    lex::token::Whitespace,
    tree::{Node, Text},
};
use serde::Serialize;

/// Ambient handling applied to every block of text before the whitespace
/// control of the surrounding tags.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Serialize)]
pub enum Autostrip {
    /// Text is kept as is.
    #[default]
    None,
    /// Leading and trailing whitespace of the whole block is removed.
    Strip,
    /// Each line is stripped, and blank lines are dropped.
    Trim,
}

impl Autostrip {
    /// Apply this mode to the given text.
    pub fn apply(self, text: &str) -> String {
        match self {
            Autostrip::None => text.to_owned(),
            Autostrip::Strip => text.trim().to_owned(),
            Autostrip::Trim => text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Buffers the text found between tags and applies whitespace control to it
/// when a tag boundary is reached.
#[derive(Debug, Default)]
pub struct Controller {
    buffer: String,
    /// Line of the first text pushed since the last flush.
    line: Option<usize>,
    autostrip: Autostrip,
    /// Modes to restore when a `strip` or `code` block ends.
    saved: Vec<Autostrip>,
    /// Whitespace control of the most recently closed tag.
    carried: Whitespace,
}

impl Controller {
    /// Create a new [`Controller`] starting in the given [`Autostrip`] mode.
    pub fn new(autostrip: Autostrip) -> Self {
        Self {
            autostrip,
            ..Default::default()
        }
    }

    /// Append raw text found on the given line.
    pub fn push(&mut self, text: &str, line: usize) {
        self.line.get_or_insert(line);
        self.buffer.push_str(text);
    }

    /// Remember the [`Whitespace`] of a closing delimiter, to be applied to
    /// the start of the next flush.
    pub fn carry(&mut self, whitespace: Whitespace) {
        self.carried = whitespace;
    }

    pub fn set_autostrip(&mut self, autostrip: Autostrip) {
        self.autostrip = autostrip;
    }

    /// Save the current mode so it can be restored later.
    pub fn save_autostrip(&mut self) {
        self.saved.push(self.autostrip);
    }

    /// Restore the most recently saved mode.
    ///
    /// Nothing happens when no mode was saved.
    pub fn restore_autostrip(&mut self) {
        if let Some(autostrip) = self.saved.pop() {
            self.autostrip = autostrip;
        }
    }

    /// Apply the current [`Autostrip`] mode, the carried [`Whitespace`] and the
    /// given upcoming [`Whitespace`] to the buffered text.
    ///
    /// Returns a [`Text`] node when any text remains. The node is placed on the
    /// line of the first buffered text, or the given line when nothing was
    /// buffered.
    pub fn flush(&mut self, upcoming: Whitespace, line: usize) -> Option<Node> {
        let buffer = std::mem::take(&mut self.buffer);
        let line = self.line.take().unwrap_or(line);
        let carried = std::mem::take(&mut self.carried);

        let text = self.autostrip.apply(&buffer);
        let mut text = trim_end(&trim_start(&text, carried), upcoming);
        match carried {
            Whitespace::AddNewline => text.insert(0, '\n'),
            Whitespace::AddSpace => text.insert(0, ' '),
            _ => {}
        }
        match upcoming {
            Whitespace::AddNewline => text.push('\n'),
            Whitespace::AddSpace => text.push(' '),
            _ => {}
        }

        if text.is_empty() {
            return None;
        }

        Some(Node::Text(Text { text, line }))
    }
}

/// Trim the start of the text up to the first newline.
fn trim_start(text: &str, whitespace: Whitespace) -> String {
    match (whitespace, text.find('\n')) {
        (Whitespace::TrimToNewline, Some(newline)) => {
            let (head, tail) = text.split_at(newline + 1);
            format!("{}{tail}", head.trim_start())
        }
        (Whitespace::TrimToNewlinePreserve, Some(newline)) => {
            let (head, tail) = text.split_at(newline);
            format!("{}{tail}", head.trim_start())
        }
        (Whitespace::TrimToNewline | Whitespace::TrimToNewlinePreserve, None) => {
            text.trim_start().to_owned()
        }
        _ => text.to_owned(),
    }
}

/// Trim the end of the text back to the last newline.
fn trim_end(text: &str, whitespace: Whitespace) -> String {
    match (whitespace, text.rfind('\n')) {
        (Whitespace::TrimToNewline, Some(newline)) => {
            let (head, tail) = text.split_at(newline);
            format!("{head}{}", tail.trim_end())
        }
        (Whitespace::TrimToNewlinePreserve, Some(newline)) => {
            let (head, tail) = text.split_at(newline + 1);
            format!("{head}{}", tail.trim_end())
        }
        (Whitespace::TrimToNewline | Whitespace::TrimToNewlinePreserve, None) => {
            text.trim_end().to_owned()
        }
        _ => text.to_owned(),
    }
}
