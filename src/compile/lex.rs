pub mod token;

mod state;

use crate::{
    compile::lex::{
        state::CursorState,
        token::{Spanned, Token, Whitespace},
    },
    log::{Error, INVALID_NUMBER, INVALID_TAG, UNCLOSED_STRING, UNEXPECTED_CHARACTER},
    region::Region,
    syntax::{Finders, Marker},
};

/// Provides methods to read a source string as [`Token`] instances.
pub struct Lexer<'source> {
    /// Reference to the source text.
    pub source: &'source str,
    /// Source identifier used in errors.
    name: &'source str,
    /// Position within source.
    cursor: usize,
    /// Line at the cursor, counting from one.
    line: usize,
    /// Compiled [`Finders`] used to search for markers in the source text.
    finders: &'source Finders,
    /// Tracks the [`Lexer`] state and determines the action taken
    /// on each step.
    state: CursorState,
    /// Tokens read so far.
    tokens: Vec<Spanned>,
}

impl<'source> Lexer<'source> {
    /// Create a new [`Lexer`] from the given source and [`Finders`].
    #[inline]
    pub fn new(source: &'source str, name: &'source str, finders: &'source Finders) -> Self {
        Self {
            source,
            name,
            cursor: 0,
            line: 1,
            finders,
            state: CursorState::Text,
            tokens: vec![],
        }
    }

    /// Read the whole source and return the tokens in order.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when an unexpected character, an unclosed string or
    /// a malformed number is found inside of a tag.
    pub fn tokenize(mut self) -> Result<Vec<Spanned>, Error> {
        while self.cursor < self.source.len() {
            match self.state {
                CursorState::Text => self.lex_text(),
                CursorState::Comment => self.lex_comment(),
                CursorState::Inside => self.lex_tag()?,
            }
        }
        tracing::trace!(name = self.name, tokens = self.tokens.len(), "tokenized template");

        Ok(self.tokens)
    }

    /// Read raw text up to the next opening marker, and the marker itself.
    ///
    /// Assumes the cursor is outside of a tag.
    fn lex_text(&mut self) {
        let from = self.cursor;

        match self.finders.open.next(self.source, from) {
            Some((id, begin, end)) => {
                self.push_text(from, begin);

                let (whitespace, end) = self.glyph_at(end);
                let token = match Marker::from(id) {
                    Marker::BeginComment => {
                        self.state = CursorState::Comment;
                        Token::BeginComment(whitespace)
                    }
                    Marker::BeginBlock => {
                        self.state = CursorState::Inside;
                        Token::BeginBlock(whitespace)
                    }
                    Marker::BeginExpression => {
                        self.state = CursorState::Inside;
                        Token::BeginExpression(whitespace)
                    }
                    _ => unreachable!("opening finder only holds opening markers"),
                };
                self.push(token, begin..end);
                self.cursor = end;
            }
            None => {
                let end = self.source.len();
                self.push_text(from, end);
                self.cursor = end;
            }
        }
    }

    /// Skip the content of a comment and read its end marker.
    ///
    /// A comment without an end marker consumes the rest of the source.
    fn lex_comment(&mut self) {
        let from = self.cursor;

        match self.finders.comment.next(self.source, from) {
            Some((_, begin, end)) => {
                let glyph = self.source[from..begin].chars().next_back();
                let whitespace = glyph.and_then(Whitespace::from_glyph);
                let marker_begin = match whitespace {
                    Some(_) => begin - 1,
                    None => begin,
                };

                self.line += count_lines(&self.source[from..begin]);
                self.push(
                    Token::EndComment(whitespace.unwrap_or_default()),
                    marker_begin..end,
                );
                self.cursor = end;
            }
            None => {
                self.line += count_lines(&self.source[from..]);
                self.cursor = self.source.len();
            }
        }
        self.state = CursorState::Text;
    }

    /// Read the next [`Token`] inside of a block or expression.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when an unexpected character is found.
    fn lex_tag(&mut self) -> Result<(), Error> {
        let from = self.cursor;
        let mut chars = self.source[from..].chars();
        let Some(char) = chars.next() else {
            return Ok(());
        };
        let following = chars.next();

        match char {
            '\n' => {
                self.line += 1;
                self.cursor += 1;
            }
            ' ' | '\t' | '\r' => self.cursor += 1,
            '[' => self.advance(Token::BeginList),
            ']' => self.advance(Token::EndList),
            '(' => self.advance(Token::BeginCall),
            ')' => self.advance(Token::EndCall),
            ',' => self.advance(Token::Comma),
            '=' => self.advance(Token::Equal),
            '"' => self.lex_string(from)?,
            c if c.is_ascii_digit() => self.lex_number(from)?,
            '-' | '+' if following.is_some_and(|c| c.is_ascii_digit()) => {
                self.lex_number(from)?
            }
            c if is_word_start(c) => self.lex_word(from),
            c => self.lex_closer(from, c)?,
        }

        Ok(())
    }

    /// Read the end marker of a tag, which may begin with a whitespace
    /// control glyph.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when no end marker is found at the cursor.
    fn lex_closer(&mut self, from: usize, char: char) -> Result<(), Error> {
        let (whitespace, at) = match Whitespace::from_glyph(char) {
            Some(whitespace) => (whitespace, from + 1),
            None => (Whitespace::None, from),
        };

        match self.finders.close.starts(self.source, at) {
            Some((id, end)) => {
                let token = match Marker::from(id) {
                    Marker::EndComment => Token::EndComment(whitespace),
                    Marker::EndBlock => Token::EndBlock(whitespace),
                    Marker::EndExpression => Token::EndExpression(whitespace),
                    _ => unreachable!("closing finder only holds closing markers"),
                };
                self.push(token, from..end);
                self.state = CursorState::Text;
                self.cursor = end;

                Ok(())
            }
            None if whitespace != Whitespace::None => Err(self
                .error(INVALID_TAG, from..at)
                .with_help(format!("`{char}` must be followed by the end of the tag"))),
            None => Err(self
                .error(UNEXPECTED_CHARACTER, from..from + char.len_utf8())
                .with_help(format!(
                    "expected a word, a number, a string, one of `[`, `]`, `(`, `)`, `,`, `=` \
                    or the end of the tag, found `{char}`"
                ))),
        }
    }

    /// Read a number, which may have a leading sign and a single decimal point.
    ///
    /// A second decimal point ends the number.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the number does not fit in the target type.
    fn lex_number(&mut self, from: usize) -> Result<(), Error> {
        let bytes = self.source.as_bytes();
        let digits = |mut index: usize| {
            while index < bytes.len() && bytes[index].is_ascii_digit() {
                index += 1;
            }
            index
        };

        let mut end = match bytes[from] {
            b'-' | b'+' => digits(from + 1),
            _ => digits(from),
        };
        let is_float = end < bytes.len() && bytes[end] == b'.';
        if is_float {
            end = digits(end + 1);
        }

        let window = &self.source[from..end];
        let token = if is_float {
            window
                .parse::<f64>()
                .ok()
                .filter(|float| float.is_finite())
                .map(Token::Float)
        } else {
            window.parse::<i64>().ok().map(Token::Integer)
        };

        match token {
            Some(token) => {
                self.push(token, from..end);
                self.cursor = end;

                Ok(())
            }
            None => Err(self
                .error(INVALID_NUMBER, from..end)
                .with_help(format!("`{window}` is out of range"))),
        }
    }

    /// Read a double quoted string, resolving the `\n`, `\t`, `\\` and `\"`
    /// escapes.
    ///
    /// Any other escaped character is dropped.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the source ends before the string is closed.
    fn lex_string(&mut self, from: usize) -> Result<(), Error> {
        let mut string = String::new();
        let mut escaped = false;
        let mut lines = 0;

        for (index, char) in self.source[from + 1..].char_indices() {
            if escaped {
                escaped = false;
                match char {
                    'n' => string.push('\n'),
                    't' => string.push('\t'),
                    '\\' => string.push('\\'),
                    '"' => string.push('"'),
                    _ => {}
                }
                continue;
            }

            match char {
                '"' => {
                    let end = from + 1 + index + 1;
                    self.push(Token::String(string), from..end);
                    self.line += lines;
                    self.cursor = end;

                    return Ok(());
                }
                '\\' => escaped = true,
                '\n' => {
                    lines += 1;
                    string.push(char);
                }
                c => string.push(c),
            }
        }

        Err(self
            .error(UNCLOSED_STRING, from..from + 1)
            .with_help("this might be an undelimited string, try closing it with `\"`"))
    }

    /// Read a word, which may hold a dotted path with `@` and `#` sigils.
    fn lex_word(&mut self, from: usize) {
        let end = self.source[from..]
            .find(|c: char| !is_word_continue(c))
            .map(|index| from + index)
            .unwrap_or(self.source.len());

        self.push(Token::Word(self.source[from..end].to_owned()), from..end);
        self.cursor = end;
    }

    /// Push raw text between the given offsets, when there is any.
    fn push_text(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }

        let text = &self.source[from..to];
        self.push(Token::Text(text.to_owned()), from..to);
        self.line += count_lines(text);
    }

    /// Push a single character [`Token`] at the cursor and move past it.
    fn advance(&mut self, token: Token) {
        let from = self.cursor;
        self.push(token, from..from + 1);
        self.cursor += 1;
    }

    fn push<T>(&mut self, token: Token, region: T)
    where
        T: Into<Region>,
    {
        self.tokens.push(Spanned {
            token,
            line: self.line,
            region: region.into(),
        });
    }

    /// Return the [`Whitespace`] glyph at the given offset, and the offset
    /// following it.
    fn glyph_at(&self, at: usize) -> (Whitespace, usize) {
        match self.source[at..].chars().next().and_then(Whitespace::from_glyph) {
            Some(whitespace) => (whitespace, at + 1),
            None => (Whitespace::None, at),
        }
    }

    fn error<T>(&self, reason: &str, region: T) -> Error
    where
        T: Into<Region>,
    {
        Error::build(reason)
            .with_name(self.name)
            .with_line(self.line)
            .with_pointer(self.source, region)
    }
}

/// Return true if the given character may begin a word.
fn is_word_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Return true if the given character may continue a word.
fn is_word_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '@' | '#')
}

fn count_lines(text: &str) -> usize {
    text.matches('\n').count()
}
