mod lex;
mod parse;
mod template;

pub use crate::compile::{
    lex::token,
    parse::{fold, tree, whitespace::Autostrip, Definitions, Parser},
    template::Template,
};

use crate::{log::Error, syntax::Syntax};
use lex::{token::Spanned, Lexer};

/// Compile a [`Template`] from the given text.
///
/// Provides a shortcut to quickly compile a `Template` without creating
/// an `Engine`. The template is named `?`, uses the default `Syntax`, and
/// can only call fragments that it defines itself.
///
/// # Examples
///
/// ```
/// use brace::compile;
///
/// let template = compile("hello, {{ name }}");
/// assert!(template.is_ok())
/// ```
pub fn compile(text: &str) -> Result<Template, Error> {
    let syntax = Syntax::default();

    Parser::new(text, "?", &syntax).compile(&mut Definitions::new())
}

/// Compile a [`Template`] from the given text, with full control over its
/// name, [`Syntax`] and the [`Definitions`] it shares with other templates.
///
/// `definitions` is only changed when compilation succeeds.
///
/// # Examples
///
/// ```
/// use brace::{compile_with, Definitions, Syntax};
///
/// let syntax = Syntax::default();
/// let mut definitions = Definitions::new();
///
/// compile_with(r#"{% def "hi" %}hi{% enddef %}"#, "a", &syntax, &mut definitions).unwrap();
/// let template = compile_with(r#"{% call "hi" %}"#, "b", &syntax, &mut definitions);
///
/// assert_eq!(template.unwrap().nodes.len(), 1);
/// ```
pub fn compile_with(
    text: &str,
    name: &str,
    syntax: &Syntax,
    definitions: &mut Definitions,
) -> Result<Template, Error> {
    Parser::new(text, name, syntax).compile(definitions)
}

/// Read the given text as a sequence of tokens.
///
/// # Errors
///
/// Returns an [`Error`] when the text holds a character, string or number that
/// cannot be read inside of a tag.
pub fn tokenize(text: &str, name: &str, syntax: &Syntax) -> Result<Vec<Spanned>, Error> {
    let finders = syntax.finders();

    Lexer::new(text, name, &finders).tokenize()
}
