use crate::region::Region;
use serde::Serialize;
use std::fmt::Display;

/// Types emitted by the Lexer.
///
/// Tag delimiters carry the [`Whitespace`] control found just inside them.
#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    /// Raw text.
    Text(String),
    /// Beginning of a comment - {# by default.
    BeginComment(Whitespace),
    /// End of a comment - #} by default.
    EndComment(Whitespace),
    /// Beginning of a block - {% by default.
    BeginBlock(Whitespace),
    /// End of a block - %} by default.
    EndBlock(Whitespace),
    /// Beginning of an expression - {{ by default.
    BeginExpression(Whitespace),
    /// End of an expression - }} by default.
    EndExpression(Whitespace),
    /// String literal within a tag, with escapes resolved.
    String(String),
    /// Integer within a tag.
    Integer(i64),
    /// Number with a decimal point within a tag.
    Float(f64),
    /// [
    BeginList,
    /// ]
    EndList,
    /// (
    BeginCall,
    /// )
    EndCall,
    /// ,
    Comma,
    /// =
    Equal,
    /// An unquoted word, such as an action keyword or a dotted variable path.
    Word(String),
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Text(_) => write!(f, "text"),
            Token::BeginComment(_) => write!(f, "beginning of comment"),
            Token::EndComment(_) => write!(f, "end of comment"),
            Token::BeginBlock(_) => write!(f, "beginning of block"),
            Token::EndBlock(_) => write!(f, "end of block"),
            Token::BeginExpression(_) => write!(f, "beginning of expression"),
            Token::EndExpression(_) => write!(f, "end of expression"),
            Token::String(_) => write!(f, "string"),
            Token::Integer(_) => write!(f, "integer"),
            Token::Float(_) => write!(f, "float"),
            Token::BeginList => write!(f, "`[`"),
            Token::EndList => write!(f, "`]`"),
            Token::BeginCall => write!(f, "`(`"),
            Token::EndCall => write!(f, "`)`"),
            Token::Comma => write!(f, "`,`"),
            Token::Equal => write!(f, "`=`"),
            Token::Word(word) => write!(f, "`{word}`"),
        }
    }
}

/// A [`Token`] with the line it starts on and the area of source it was read from.
#[derive(Debug, PartialEq, Clone)]
pub struct Spanned {
    pub token: Token,
    /// Line number, counting from one.
    pub line: usize,
    pub region: Region,
}

/// Whitespace control requested by a glyph placed just inside a tag delimiter.
///
/// On an opening delimiter it applies to the end of the preceding text, on a
/// closing delimiter to the start of the following text.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Serialize)]
pub enum Whitespace {
    #[default]
    None,
    /// `-`: trim whitespace up to and including the nearest newline.
    TrimToNewline,
    /// `^`: trim whitespace up to, but not including, the nearest newline.
    TrimToNewlinePreserve,
    /// `+`: add a newline.
    AddNewline,
    /// `*`: add a space.
    AddSpace,
}

impl Whitespace {
    /// Return the [`Whitespace`] described by the given glyph, if it is one.
    pub fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '-' => Some(Whitespace::TrimToNewline),
            '^' => Some(Whitespace::TrimToNewlinePreserve),
            '+' => Some(Whitespace::AddNewline),
            '*' => Some(Whitespace::AddSpace),
            _ => None,
        }
    }
}

/// The kinds of tag, used to name the closer a tag is waiting for.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Tag {
    Comment,
    Block,
    Expression,
}

impl Tag {
    /// Return the [`Whitespace`] carried by the given token, if the token
    /// closes this kind of tag.
    pub fn closed_by(self, token: &Token) -> Option<Whitespace> {
        match (self, token) {
            (Tag::Comment, Token::EndComment(whitespace))
            | (Tag::Block, Token::EndBlock(whitespace))
            | (Tag::Expression, Token::EndExpression(whitespace)) => Some(*whitespace),
            _ => None,
        }
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tag::Comment => write!(f, "end of comment"),
            Tag::Block => write!(f, "end of block"),
            Tag::Expression => write!(f, "end of expression"),
        }
    }
}
