use crate::{
    compile::{parse::whitespace::Autostrip, tree::ScopeKind},
    syntax::{CaseRule, Syntax},
};
use std::fmt::Display;

/// The keyword of an action tag, such as the `if` in `{% if x %}`.
///
/// Every keyword the parser understands has a variant, so dispatch over it
/// is checked for exhaustiveness.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Action<'a> {
    If,
    Elif,
    Else,
    For,
    Switch,
    /// A switch clause from the table held by the [`Syntax`].
    Case(&'a CaseRule),
    /// `set`, `global`, `template` or `private`.
    Set(ScopeKind),
    Unset,
    Scope,
    Code,
    Include,
    Return,
    Expand,
    Section,
    Use,
    Def,
    Call,
    Var,
    Error,
    Import,
    Do,
    Strip,
    /// `autostrip`, `autotrim` or `no_autostrip`.
    Autostrip(Autostrip),
    /// `end` followed by the name of the block it closes.
    End(&'a str),
}

impl<'a> Action<'a> {
    /// Return the [`Action`] named by the given word, if any.
    pub fn from_word(word: &'a str, syntax: &'a Syntax) -> Option<Self> {
        let action = match word {
            "if" => Action::If,
            "elif" => Action::Elif,
            "else" => Action::Else,
            "for" => Action::For,
            "switch" => Action::Switch,
            "set" => Action::Set(ScopeKind::Local),
            "global" => Action::Set(ScopeKind::Global),
            "template" => Action::Set(ScopeKind::Template),
            "private" => Action::Set(ScopeKind::Private),
            "unset" => Action::Unset,
            "scope" => Action::Scope,
            "code" => Action::Code,
            "include" => Action::Include,
            "return" => Action::Return,
            "expand" => Action::Expand,
            "section" => Action::Section,
            "use" => Action::Use,
            "def" => Action::Def,
            "call" => Action::Call,
            "var" => Action::Var,
            "error" => Action::Error,
            "import" => Action::Import,
            "do" => Action::Do,
            "strip" => Action::Strip,
            "autostrip" => Action::Autostrip(Autostrip::Strip),
            "autotrim" => Action::Autostrip(Autostrip::Trim),
            "no_autostrip" => Action::Autostrip(Autostrip::None),
            word => {
                if let Some(rule) = syntax.get_case(word) {
                    return Some(Action::Case(rule));
                }

                return word.strip_prefix("end").map(Action::End);
            }
        };

        Some(action)
    }
}

/// The kinds of block that stay open until a matching `end` tag.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BlockKind {
    If,
    For,
    Switch,
    Scope,
    Code,
    Section,
    Def,
    Var,
    Strip,
}

impl BlockKind {
    /// Return the keyword that opens this kind of block.
    pub fn name(self) -> &'static str {
        match self {
            BlockKind::If => "if",
            BlockKind::For => "for",
            BlockKind::Switch => "switch",
            BlockKind::Scope => "scope",
            BlockKind::Code => "code",
            BlockKind::Section => "section",
            BlockKind::Def => "def",
            BlockKind::Var => "var",
            BlockKind::Strip => "strip",
        }
    }
}

impl Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
