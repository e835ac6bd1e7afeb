//! The Abstract Syntax Tree produced by the [`Parser`][`super::Parser`].
//!
//! Statement nodes and expressions are closed sum types, so an evaluator
//! walking the tree matches on them exhaustively.
use serde::Serialize;
use serde_json::Value;

/// A statement node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Node {
    /// Literal text, rendered as is.
    Text(Text),
    /// Render the result of an expression.
    Emit(Emit),
    /// Conditional rendering.
    If(If),
    /// A loop.
    For(For),
    /// Select the first matching case.
    Switch(Switch),
    /// Assign values to variables in some scope.
    Assign(Assign),
    /// Remove variables.
    Unset(Unset),
    /// Render a body within a new scope.
    Scope(Scope),
    /// Run a body as code, without output whitespace handling.
    Code(Code),
    /// Render another template.
    Include(Include),
    /// Set values returned to the including template.
    Return(Return),
    /// Expand the keys of a mapping into variables.
    Expand(Expand),
    /// Capture a body into a named section.
    Section(Section),
    /// Render a named section.
    UseSection(UseSection),
    /// Capture the rendered body into a variable.
    Var(Capture),
    /// Raise an error from the template.
    Error(Raise),
    /// Import libraries into variables.
    Import(Import),
    /// Evaluate expressions for their side effects.
    Do(Do),
}

impl Node {
    /// Return the line that the node starts on.
    pub fn line(&self) -> usize {
        match self {
            Node::Text(node) => node.line,
            Node::Emit(node) => node.line,
            Node::If(node) => node.line,
            Node::For(node) => node.line,
            Node::Switch(node) => node.line,
            Node::Assign(node) => node.line,
            Node::Unset(node) => node.line,
            Node::Scope(node) => node.line,
            Node::Code(node) => node.line,
            Node::Include(node) => node.line,
            Node::Return(node) => node.line,
            Node::Expand(node) => node.line,
            Node::Section(node) => node.line,
            Node::UseSection(node) => node.line,
            Node::Var(node) => node.line,
            Node::Error(node) => node.line,
            Node::Import(node) => node.line,
            Node::Do(node) => node.line,
        }
    }
}

/// Literal text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Text {
    pub text: String,
    pub line: usize,
}

/// Output of an expression that could not be rendered ahead of time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Emit {
    pub expression: Expression,
    pub line: usize,
}

/// A chain of conditions, each with a body, and an optional else body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct If {
    /// The `if` branch followed by any `elif` branches, in source order.
    pub branches: Vec<Branch>,
    pub else_branch: Option<Vec<Node>>,
    pub line: usize,
}

/// One condition of an [`If`] and the body rendered when it holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Branch {
    pub condition: Expression,
    pub nodes: Vec<Node>,
}

/// `for variable[, companion] in iterable`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct For {
    pub variable: String,
    /// The second loop variable, when two are given.
    pub companion: Option<String>,
    pub iterable: Expression,
    pub nodes: Vec<Node>,
    /// Rendered when the loop has nothing to iterate.
    pub else_branch: Option<Vec<Node>>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Switch {
    pub subject: Expression,
    pub cases: Vec<Case>,
    pub line: usize,
}

/// A clause of a [`Switch`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Case {
    pub kind: CaseKind,
    pub arguments: Vec<Expression>,
    pub nodes: Vec<Node>,
    pub line: usize,
}

/// How a [`Case`] compares its arguments against the switch subject.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub enum CaseKind {
    Lesser,
    LesserOrEqual,
    Greater,
    GreaterOrEqual,
    NotEqual,
    Equal,
    /// Takes a lower and an upper bound.
    Between,
}

/// Where an assignment stores its value.
///
/// The parser records it unresolved; the evaluator decides what each scope means.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub enum ScopeKind {
    Local,
    Global,
    Template,
    Private,
}

/// `name = expression`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub name: String,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assign {
    pub assignments: Vec<Assignment>,
    pub scope: ScopeKind,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unset {
    pub names: Vec<String>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scope {
    pub assignments: Vec<Assignment>,
    pub nodes: Vec<Node>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Code {
    pub assignments: Vec<Assignment>,
    /// Variable receiving the values set with `return`.
    pub returns: Option<String>,
    pub nodes: Vec<Node>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Include {
    pub path: Expression,
    pub returns: Option<String>,
    pub assignments: Vec<Assignment>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Return {
    pub assignments: Vec<Assignment>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expand {
    pub expression: Expression,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub name: Expression,
    pub nodes: Vec<Node>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UseSection {
    pub name: Expression,
    pub line: usize,
}

/// Body whose rendered output is stored in a variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Capture {
    pub name: String,
    pub nodes: Vec<Node>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Raise {
    pub message: Expression,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Import {
    pub assignments: Vec<Assignment>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Do {
    pub expressions: Vec<Expression>,
    pub line: usize,
}

/// An expression within a tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expression {
    /// A constant.
    Value(Literal),
    /// A variable located by a dotted path.
    Var(Variable),
    /// Call to some function.
    Func(Call),
    /// Subscript of a variable.
    Index(Index),
    /// A list literal with at least one element that is not constant.
    List(List),
}

impl Expression {
    /// Return the line that the expression starts on.
    pub fn line(&self) -> usize {
        match self {
            Expression::Value(literal) => literal.line,
            Expression::Var(variable) => variable.line,
            Expression::Func(call) => call.line,
            Expression::Index(index) => index.line,
            Expression::List(list) => list.line,
        }
    }

    /// Return the constant value, if the expression is one.
    pub fn as_constant(&self) -> Option<&Value> {
        match self {
            Expression::Value(literal) => Some(&literal.value),
            _ => None,
        }
    }
}

/// Literal data that does not need to be evaluated any further.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Literal {
    pub value: Value,
    pub line: usize,
}

/// Path segments such as `["person", "name"]` for `person.name`.
///
/// A segment keeps its `@` or `#` sigil, if it had one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    pub path: Vec<String>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Call {
    pub callee: Vec<String>,
    pub arguments: Vec<Expression>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Index {
    pub base: Vec<String>,
    pub subscripts: Vec<Expression>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct List {
    pub items: Vec<Expression>,
    pub line: usize,
}
