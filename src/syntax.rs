//! Brace uses a type known as a Syntax to understand which delimiters and
//! switch clauses you would like to use in your templates. This module
//! defines the Builder type, which provides methods to easily generate
//! a `Syntax`.
//!
//! After a Syntax has been created, it can be passed to an Engine
//! and used to compile templates.
mod builder;

pub use builder::Builder;

use crate::compile::{tree::CaseKind, Autostrip};
use morel::Finder;

/// Markers that identify comments, blocks and expressions within text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Beginning of a Comment, which is discarded.
    BeginComment = 0,
    /// End of a Comment.
    EndComment = 1,
    /// Beginning of a Block, which holds an action such as "if" or "for".
    BeginBlock = 2,
    /// End of a Block.
    EndBlock = 3,
    /// Beginning of an Expression, which renders some value.
    BeginExpression = 4,
    /// End of an Expression.
    EndExpression = 5,
}

impl From<usize> for Marker {
    fn from(value: usize) -> Self {
        match value {
            0 => Self::BeginComment,
            1 => Self::EndComment,
            2 => Self::BeginBlock,
            3 => Self::EndBlock,
            4 => Self::BeginExpression,
            5 => Self::EndExpression,
            _ => unreachable!(),
        }
    }
}

impl From<Marker> for usize {
    fn from(k: Marker) -> Self {
        k as usize
    }
}

/// A switch clause keyword, such as `eq`, with the [`CaseKind`] it produces
/// and the exact number of arguments it takes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseRule {
    pub keyword: String,
    pub kind: CaseKind,
    pub arity: usize,
}

/// Delimiters, switch clauses and the starting autostrip mode used to
/// compile templates.
///
/// Create one with a [`Builder`], or use the [`Default`] implementation.
#[derive(Debug, Clone, PartialEq)]
pub struct Syntax {
    pub(crate) comment: (String, String),
    pub(crate) block: (String, String),
    pub(crate) expression: (String, String),
    pub(crate) cases: Vec<CaseRule>,
    pub(crate) autostrip: Autostrip,
}

impl Syntax {
    /// Return the switch clause registered under the given keyword.
    pub fn get_case(&self, keyword: &str) -> Option<&CaseRule> {
        self.cases.iter().find(|rule| rule.keyword == keyword)
    }

    /// Return every registered switch clause.
    pub fn get_cases(&self) -> &[CaseRule] {
        &self.cases
    }

    /// Return the autostrip mode that each parse begins in.
    pub fn get_autostrip(&self) -> Autostrip {
        self.autostrip
    }

    /// Build the searchers used by the lexer, one for each of its modes.
    pub(crate) fn finders(&self) -> Finders {
        let marker = |marker: Marker, text: &str| (usize::from(marker), text.to_owned());

        Finders {
            open: Finder::new(morel::Syntax::new(vec![
                marker(Marker::BeginComment, &self.comment.0),
                marker(Marker::BeginBlock, &self.block.0),
                marker(Marker::BeginExpression, &self.expression.0),
            ])),
            close: Finder::new(morel::Syntax::new(vec![
                marker(Marker::EndComment, &self.comment.1),
                marker(Marker::EndBlock, &self.block.1),
                marker(Marker::EndExpression, &self.expression.1),
            ])),
            comment: Finder::new(morel::Syntax::new(vec![marker(
                Marker::EndComment,
                &self.comment.1,
            )])),
        }
    }
}

impl Default for Syntax {
    fn default() -> Self {
        Builder::new().to_syntax()
    }
}

/// Compiled marker searchers.
pub(crate) struct Finders {
    /// Finds the beginning of any tag, used while reading raw text.
    pub open: Finder,
    /// Matches the end of any tag, used while inside of a block or expression.
    pub close: Finder,
    /// Finds the end of a comment.
    pub comment: Finder,
}
