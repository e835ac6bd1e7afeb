/// Describes the internal state of a [`Lexer`][`super::Lexer`].
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum CursorState {
    /// Indicates the [`Lexer`][`super::Lexer`] is outside of any tag and
    /// reading raw text.
    Text,
    /// Indicates the [`Lexer`][`super::Lexer`] is inside of a comment, and
    /// only looking for its end.
    Comment,
    /// Indicates the [`Lexer`][`super::Lexer`] is inside of a block or
    /// expression.
    Inside,
}
