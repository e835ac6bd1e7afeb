//! Brace parser.
//!
//! Utilizes a Lexer to receive instances of Token, which it uses to construct
//! a new Template containing the Abstract Syntax Tree.
//!
//! Blocks that are opened and not yet closed are tracked on a stack of frames,
//! each holding the nodes that belong to it, so nesting never recurses.
pub mod fold;
pub mod tree;
pub mod whitespace;

mod block;
mod state;

use crate::{
    compile::{
        lex::{
            token::{Spanned, Tag, Token, Whitespace},
            Lexer,
        },
        parse::{
            block::{Action, BlockKind},
            fold::{fold, render_constant},
            state::{BlockState, Closed, Frame},
            tree::{
                Assign, Assignment, Branch, Call, Case, Do, Emit, Expand, Expression, Import,
                Include, Index, List, Literal, Node, Raise, Return, Text, Unset,
                UseSection, Variable,
            },
            whitespace::{Autostrip, Controller},
        },
        Template,
    },
    log::{
        expected, expected_end, Error, CASE_ARITY, CASE_OUTSIDE_SWITCH, DOTTED_VARIABLE,
        EXPECTED_COMMA, INVALID_NUMBER, INVALID_VARIABLE, MISMATCHED_ELIF, MISMATCHED_ELSE,
        MISMATCHED_END, NESTED_TOO_DEEPLY, TOO_MANY_ENDS, UNCLOSED_TAG, UNEXPECTED_CLOSE_TAG,
        UNEXPECTED_TOKEN, UNKNOWN_ACTION, UNKNOWN_DEFINE, UNMATCHED_ACTION,
    },
    region::Region,
    syntax::Syntax,
};
use serde_json::{Number, Value};
use std::{collections::HashMap, fmt::Display, iter::Peekable, vec::IntoIter};

/// Named fragments registered with `def` and spliced with `call`.
pub type Definitions = HashMap<String, Vec<Node>>;

/// The deepest that list, call and index expressions may be nested.
const MAX_DEPTH: usize = 256;

/// Tokens that end a comma separated list.
#[derive(Debug, Clone, Copy)]
enum Until {
    Block,
    List,
    Call,
}

impl Until {
    fn matches(self, token: &Token) -> bool {
        matches!(
            (self, token),
            (Until::Block, Token::EndBlock(_))
                | (Until::List, Token::EndList)
                | (Until::Call, Token::EndCall)
        )
    }
}

impl Display for Until {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Until::Block => write!(f, "end of block"),
            Until::List => write!(f, "`]`"),
            Until::Call => write!(f, "`)`"),
        }
    }
}

pub struct Parser<'source> {
    /// Source text being compiled.
    source: &'source str,
    /// Source identifier used in errors.
    name: &'source str,
    syntax: &'source Syntax,
    /// Tokens produced by the Lexer.
    tokens: Peekable<IntoIter<Spanned>>,
    /// Line of the most recently consumed token.
    line: usize,
    /// Region of the most recently consumed token.
    region: Region,
    /// Blocks that are open, innermost last.
    frames: Vec<Frame>,
    /// Top level nodes of the template.
    nodes: Vec<Node>,
    whitespace: Controller,
    /// Definitions registered by this parse, committed only when it succeeds.
    staged: Definitions,
    /// Current nesting of expressions.
    depth: usize,
}

impl<'source> Parser<'source> {
    /// Create a new Parser from the given source, source identifier and [`Syntax`].
    #[inline]
    pub fn new(source: &'source str, name: &'source str, syntax: &'source Syntax) -> Self {
        Self {
            source,
            name,
            syntax,
            tokens: vec![].into_iter().peekable(),
            line: 1,
            region: Region::default(),
            frames: vec![],
            nodes: vec![],
            whitespace: Controller::new(syntax.get_autostrip()),
            staged: Definitions::new(),
            depth: 0,
        }
    }

    /// Compile the template.
    ///
    /// Fragments named with `def` are looked up in, and added to, the given
    /// [`Definitions`]. The table is only changed when compilation succeeds.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] describing the first syntax error in the source.
    pub fn compile(mut self, definitions: &mut Definitions) -> Result<Template, Error> {
        let finders = self.syntax.finders();
        let tokens = Lexer::new(self.source, self.name, &finders).tokenize()?;
        self.tokens = tokens.into_iter().peekable();

        while let Some(spanned) = self.next() {
            match spanned.token {
                Token::Text(text) => self.whitespace.push(&text, spanned.line),
                Token::BeginComment(whitespace) => {
                    self.flush(whitespace, spanned.line);
                    self.parse_tag_end(Tag::Comment)?;
                }
                Token::BeginBlock(whitespace) => {
                    self.flush(whitespace, spanned.line);
                    self.parse_action(definitions)?;
                    self.parse_tag_end(Tag::Block)?;
                }
                Token::BeginExpression(whitespace) => {
                    self.flush(whitespace, spanned.line);
                    self.parse_emitter(spanned.line)?;
                }
                token => {
                    return Err(self
                        .error(UNEXPECTED_TOKEN)
                        .with_help(expected("text or the beginning of a tag", token)))
                }
            }
        }
        self.flush(Whitespace::None, self.line);

        if let Some(frame) = self.frames.last() {
            let kind = frame.kind();
            return Err(self
                .error_at(UNMATCHED_ACTION, frame.line, frame.region)
                .with_help(expected_end(kind)));
        }

        for name in self.staged.keys() {
            tracing::debug!(template = self.name, name = name.as_str(), "registered definition");
        }
        definitions.extend(self.staged);
        tracing::debug!(name = self.name, nodes = self.nodes.len(), "compiled template");

        Ok(Template {
            name: self.name.to_owned(),
            nodes: self.nodes,
        })
    }

    /// Parse the keyword and arguments of an action tag, leaving the
    /// closing delimiter in place.
    fn parse_action(&mut self, definitions: &Definitions) -> Result<(), Error> {
        let keyword = self.next_must("an action")?;
        let (line, region) = (keyword.line, keyword.region);
        let word = match keyword.token {
            Token::Word(word) => word,
            token => {
                return Err(self
                    .error(UNEXPECTED_TOKEN)
                    .with_help(expected("an action", token)))
            }
        };

        let syntax = self.syntax;
        let Some(action) = Action::from_word(&word, syntax) else {
            return Err(self
                .error(UNKNOWN_ACTION)
                .with_help(format!("`{word}` is not a recognized action")));
        };

        match action {
            Action::If => {
                let condition = self.parse_expression()?;
                let state = BlockState::If {
                    branches: vec![Branch {
                        condition,
                        nodes: vec![],
                    }],
                    else_branch: None,
                    in_else: false,
                };
                self.open(line, region, state);
            }
            Action::Elif => {
                let condition = self.parse_expression()?;
                match self.frames.last_mut().map(|frame| &mut frame.state) {
                    Some(BlockState::If {
                        branches, in_else, ..
                    }) => {
                        branches.push(Branch {
                            condition,
                            nodes: vec![],
                        });
                        *in_else = false;
                    }
                    _ => {
                        return Err(self
                            .error_at(MISMATCHED_ELIF, line, region)
                            .with_help("`elif` must be inside of an `if` block"))
                    }
                }
            }
            Action::Else => match self.frames.last_mut().map(|frame| &mut frame.state) {
                Some(BlockState::If {
                    else_branch,
                    in_else,
                    ..
                }) => {
                    else_branch.get_or_insert_with(Vec::new);
                    *in_else = true;
                }
                Some(BlockState::For { else_branch, .. }) => {
                    else_branch.get_or_insert_with(Vec::new);
                }
                _ => {
                    return Err(self
                        .error_at(MISMATCHED_ELSE, line, region)
                        .with_help("`else` must be inside of an `if` or `for` block"))
                }
            },
            Action::For => {
                let variable = self.parse_name()?;
                let companion = match self.peek() {
                    Some(Token::Comma) => {
                        self.next();
                        Some(self.parse_name()?)
                    }
                    _ => None,
                };

                let next = self.next_must("`in`")?;
                if next.token != Token::Word("in".into()) {
                    return Err(self
                        .error(UNEXPECTED_TOKEN)
                        .with_help(expected("`in`", next.token)));
                }

                let iterable = self.parse_expression()?;
                let state = BlockState::For {
                    variable,
                    companion,
                    iterable,
                    nodes: vec![],
                    else_branch: None,
                };
                self.open(line, region, state);
            }
            Action::Switch => {
                let subject = self.parse_expression()?;
                let state = BlockState::Switch {
                    subject,
                    leading: vec![],
                    cases: vec![],
                };
                self.open(line, region, state);
            }
            Action::Case(rule) => {
                if !matches!(
                    self.frames.last().map(|frame| &frame.state),
                    Some(BlockState::Switch { .. })
                ) {
                    return Err(self
                        .error_at(CASE_OUTSIDE_SWITCH, line, region)
                        .with_help(format!("`{word}` must be inside of a `switch` block")));
                }

                let arguments = self.parse_list(Until::Block, Self::parse_expression)?;
                if arguments.len() != rule.arity {
                    return Err(self.error_at(CASE_ARITY, line, region).with_help(format!(
                        "`{word}` takes {} argument(s), found {}",
                        rule.arity,
                        arguments.len()
                    )));
                }

                if let Some(BlockState::Switch { cases, .. }) =
                    self.frames.last_mut().map(|frame| &mut frame.state)
                {
                    cases.push(Case {
                        kind: rule.kind,
                        arguments,
                        nodes: vec![],
                        line,
                    });
                }
            }
            Action::Set(scope) => {
                let assignments = self.parse_list(Until::Block, Self::parse_assignment)?;
                self.append(Node::Assign(Assign {
                    assignments,
                    scope,
                    line,
                }));
            }
            Action::Unset => {
                let names = self.parse_list(Until::Block, Self::parse_name)?;
                self.append(Node::Unset(Unset { names, line }));
            }
            Action::Scope => {
                let assignments = self.parse_list(Until::Block, Self::parse_assignment)?;
                let state = BlockState::Scope {
                    assignments,
                    nodes: vec![],
                };
                self.open(line, region, state);
            }
            Action::Code => {
                self.whitespace.save_autostrip();
                self.whitespace.set_autostrip(Autostrip::None);

                let returns = self.parse_returns()?;
                let assignments = self.parse_with()?;
                let state = BlockState::Code {
                    assignments,
                    returns,
                    nodes: vec![],
                };
                self.open(line, region, state);
            }
            Action::Include => {
                let path = self.parse_expression()?;
                let returns = self.parse_returns()?;
                let assignments = self.parse_with()?;
                self.append(Node::Include(Include {
                    path,
                    returns,
                    assignments,
                    line,
                }));
            }
            Action::Return => {
                let assignments = self.parse_list(Until::Block, Self::parse_assignment)?;
                self.append(Node::Return(Return { assignments, line }));
            }
            Action::Expand => {
                let expression = self.parse_expression()?;
                self.append(Node::Expand(Expand { expression, line }));
            }
            Action::Section => {
                let name = self.parse_expression()?;
                let state = BlockState::Section {
                    name,
                    nodes: vec![],
                };
                self.open(line, region, state);
            }
            Action::Use => {
                let name = self.parse_expression()?;
                self.append(Node::UseSection(UseSection { name, line }));
            }
            Action::Def => {
                let name = self.parse_string()?;
                let nodes = self.defined(&name, definitions).unwrap_or_default();
                self.open(line, region, BlockState::Def { name, nodes });
            }
            Action::Call => {
                let name = self.parse_string()?;
                let Some(nodes) = self.defined(&name, definitions) else {
                    return Err(self
                        .error(UNKNOWN_DEFINE)
                        .with_help(format!("no fragment named `{name}` has been defined")));
                };
                self.target().extend(nodes);
            }
            Action::Var => {
                let name = self.parse_name()?;
                let state = BlockState::Var {
                    name,
                    nodes: vec![],
                };
                self.open(line, region, state);
            }
            Action::Error => {
                let message = self.parse_expression()?;
                self.append(Node::Error(Raise { message, line }));
            }
            Action::Import => {
                let assignments = self.parse_list(Until::Block, Self::parse_assignment)?;
                self.append(Node::Import(Import { assignments, line }));
            }
            Action::Do => {
                let expressions = self.parse_list(Until::Block, Self::parse_expression)?;
                self.append(Node::Do(Do { expressions, line }));
            }
            Action::Strip => {
                self.whitespace.save_autostrip();
                self.open(line, region, BlockState::Strip);

                let autostrip = match self.peek() {
                    Some(Token::Word(word)) => match word.as_str() {
                        "on" => Some(Autostrip::Strip),
                        "off" => Some(Autostrip::None),
                        "trim" => Some(Autostrip::Trim),
                        _ => None,
                    },
                    Some(Token::EndBlock(_)) | None => return Ok(()),
                    Some(_) => None,
                };
                let next = self.next_must("`on`, `off` or `trim`")?;
                match autostrip {
                    Some(autostrip) => self.whitespace.set_autostrip(autostrip),
                    None => {
                        return Err(self
                            .error(UNEXPECTED_TOKEN)
                            .with_help(expected("`on`, `off` or `trim`", next.token)))
                    }
                }
            }
            Action::Autostrip(autostrip) => self.whitespace.set_autostrip(autostrip),
            Action::End(name) => self.close(name, line, region)?,
        }

        Ok(())
    }

    /// Close the innermost block, which must have the given name.
    fn close(&mut self, name: &str, line: usize, region: Region) -> Result<(), Error> {
        let Some(frame) = self.frames.pop() else {
            return Err(self
                .error_at(TOO_MANY_ENDS, line, region)
                .with_help(format!("`end{name}` does not close any open block")));
        };
        let kind = frame.kind();
        if kind.name() != name {
            return Err(self
                .error_at(MISMATCHED_END, line, region)
                .with_help(expected(format!("`end{kind}`"), format!("`end{name}`"))));
        }

        match frame.close() {
            Closed::Node(node) => self.append(node),
            Closed::Define(name, nodes) => {
                self.staged.insert(name, nodes);
            }
            Closed::Strip => {}
        }
        if matches!(kind, BlockKind::Strip | BlockKind::Code) {
            self.whitespace.restore_autostrip();
        }

        Ok(())
    }

    /// Return a copy of the fragment with the given name.
    ///
    /// A `def` that is still open is seen with the nodes it holds so far,
    /// ahead of fragments staged by this parse and then those in the table.
    fn defined(&self, name: &str, definitions: &Definitions) -> Option<Vec<Node>> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| match &frame.state {
                BlockState::Def { name: open, nodes } if open == name => Some(nodes),
                _ => None,
            })
            .or_else(|| self.staged.get(name))
            .or_else(|| definitions.get(name))
            .cloned()
    }

    /// Parse the expression of an emitter tag, and the end of the tag.
    ///
    /// A constant expression is rendered ahead of time as text.
    fn parse_emitter(&mut self, line: usize) -> Result<(), Error> {
        let expression = self.parse_expression()?;
        self.parse_tag_end(Tag::Expression)?;

        let node = match expression {
            Expression::Value(literal) => Node::Text(Text {
                text: render_constant(&literal.value),
                line,
            }),
            expression => Node::Emit(Emit { expression, line }),
        };
        self.append(node);

        Ok(())
    }

    /// Parse the closing delimiter of the given [`Tag`], and carry its
    /// [`Whitespace`] to the text that follows.
    fn parse_tag_end(&mut self, tag: Tag) -> Result<(), Error> {
        let next = self.next_must(tag)?;
        match tag.closed_by(&next.token) {
            Some(whitespace) => {
                self.whitespace.carry(whitespace);
                Ok(())
            }
            None => Err(self
                .error(UNEXPECTED_CLOSE_TAG)
                .with_help(expected(tag, next.token))),
        }
    }

    /// Parse an optional `return <name>`.
    fn parse_returns(&mut self) -> Result<Option<String>, Error> {
        if !self.peek_word("return") {
            return Ok(None);
        }
        self.next();

        self.parse_name().map(Some)
    }

    /// Parse an optional `with <assignments>`.
    fn parse_with(&mut self) -> Result<Vec<Assignment>, Error> {
        if !self.peek_word("with") {
            return Ok(vec![]);
        }
        self.next();

        self.parse_list(Until::Block, Self::parse_assignment)
    }

    /// Parse comma separated items until the given terminator, leaving the
    /// terminator in place.
    fn parse_list<T, F>(&mut self, until: Until, mut item: F) -> Result<Vec<T>, Error>
    where
        F: FnMut(&mut Self) -> Result<T, Error>,
    {
        let mut items = vec![];

        loop {
            let next = self.peek_must(until)?;
            if until.matches(&next.token) {
                return Ok(items);
            }

            if !items.is_empty() {
                if next.token != Token::Comma {
                    return Err(self
                        .error_at(EXPECTED_COMMA, next.line, next.region)
                        .with_help(expected("`,`", next.token)));
                }
                self.next();
            }

            items.push(item(self)?);
        }
    }

    /// Parse `name = expression`.
    fn parse_assignment(&mut self) -> Result<Assignment, Error> {
        let name = self.parse_name()?;

        let next = self.next_must("`=`")?;
        if next.token != Token::Equal {
            return Err(self
                .error(UNEXPECTED_TOKEN)
                .with_help(expected("`=`", next.token)));
        }

        Ok(Assignment {
            name,
            value: self.parse_expression()?,
        })
    }

    /// Parse a variable name without dots.
    fn parse_name(&mut self) -> Result<String, Error> {
        let next = self.next_must("a variable")?;
        let word = match next.token {
            Token::Word(word) => word,
            token => {
                return Err(self
                    .error(UNEXPECTED_TOKEN)
                    .with_help(expected("a variable", token)))
            }
        };

        let mut path = self.parse_path(&word, false)?;

        Ok(path.remove(0))
    }

    fn parse_string(&mut self) -> Result<String, Error> {
        let next = self.next_must("a string")?;
        match next.token {
            Token::String(string) => Ok(string),
            token => Err(self
                .error(UNEXPECTED_TOKEN)
                .with_help(expected("a string", token))),
        }
    }

    /// Split a word into the segments of a variable path.
    ///
    /// Each segment may begin with one `@` or `#`, which is kept.
    fn parse_path(&self, word: &str, dotted: bool) -> Result<Vec<String>, Error> {
        let segments: Vec<&str> = word.split('.').collect();
        if !dotted && segments.len() > 1 {
            return Err(self
                .error(DOTTED_VARIABLE)
                .with_help(format!("`{word}` must be a single name")));
        }

        for &segment in &segments {
            let name = segment.strip_prefix(['@', '#']).unwrap_or(segment);
            if !is_identifier(name) {
                return Err(self
                    .error(INVALID_VARIABLE)
                    .with_help(format!("`{word}` is not a valid variable name")));
            }
        }

        Ok(segments.into_iter().map(str::to_owned).collect())
    }

    /// Parse an expression.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when expressions are nested deeper than the
    /// supported limit.
    fn parse_expression(&mut self) -> Result<Expression, Error> {
        if self.depth >= MAX_DEPTH {
            return Err(self
                .error(NESTED_TOO_DEEPLY)
                .with_help(format!("expressions may be nested at most {MAX_DEPTH} levels")));
        }

        self.depth += 1;
        let expression = self.parse_expression_inner();
        self.depth -= 1;

        expression
    }

    fn parse_expression_inner(&mut self) -> Result<Expression, Error> {
        let next = self.next_must("an expression")?;
        let line = next.line;

        match next.token {
            Token::String(string) => Ok(literal(Value::String(string), line)),
            Token::Integer(integer) => Ok(literal(Value::from(integer), line)),
            Token::Float(float) => match Number::from_f64(float) {
                Some(number) => Ok(literal(Value::Number(number), line)),
                None => Err(self.error(INVALID_NUMBER)),
            },
            Token::BeginList => {
                let items = self.parse_list(Until::List, Self::parse_expression)?;
                self.next();

                Ok(fold(Expression::List(List { items, line })))
            }
            Token::Word(word) => {
                let path = self.parse_path(&word, true)?;

                match self.peek() {
                    Some(Token::BeginCall) => {
                        self.next();
                        let arguments = self.parse_list(Until::Call, Self::parse_expression)?;
                        self.next();

                        Ok(Expression::Func(Call {
                            callee: path,
                            arguments,
                            line,
                        }))
                    }
                    Some(Token::BeginList) => {
                        self.next();
                        let subscripts = self.parse_list(Until::List, Self::parse_expression)?;
                        self.next();

                        Ok(Expression::Index(Index {
                            base: path,
                            subscripts,
                            line,
                        }))
                    }
                    _ => Ok(Expression::Var(Variable { path, line })),
                }
            }
            token => Err(self
                .error(UNEXPECTED_TOKEN)
                .with_help(expected("an expression", token))),
        }
    }

    /// Push a new block onto the stack of open blocks.
    fn open(&mut self, line: usize, region: Region, state: BlockState) {
        self.frames.push(Frame {
            line,
            region,
            state,
        });
    }

    /// Flush buffered text to the current target.
    fn flush(&mut self, upcoming: Whitespace, line: usize) {
        if let Some(node) = self.whitespace.flush(upcoming, line) {
            self.append(node);
        }
    }

    fn append(&mut self, node: Node) {
        self.target().push(node);
    }

    /// Return the list that new nodes belong to.
    ///
    /// This is the body of the innermost block that holds nodes, or the top
    /// level of the template.
    fn target(&mut self) -> &mut Vec<Node> {
        self.frames
            .iter_mut()
            .rev()
            .find_map(Frame::target)
            .unwrap_or(&mut self.nodes)
    }

    /// Return the next token and remember its line and region.
    fn next(&mut self) -> Option<Spanned> {
        let next = self.tokens.next()?;
        self.line = next.line;
        self.region = next.region;

        Some(next)
    }

    /// Return the next token.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the source ends before a tag is closed.
    fn next_must<T>(&mut self, expect: T) -> Result<Spanned, Error>
    where
        T: Display,
    {
        match self.next() {
            Some(next) => Ok(next),
            None => Err(self.unclosed(expect)),
        }
    }

    fn peek(&mut self) -> Option<&Token> {
        self.tokens.peek().map(|next| &next.token)
    }

    fn peek_word(&mut self, word: &str) -> bool {
        matches!(self.peek(), Some(Token::Word(found)) if found == word)
    }

    /// Return a copy of the next token without consuming it.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the source ends before a tag is closed.
    fn peek_must<T>(&mut self, expect: T) -> Result<Spanned, Error>
    where
        T: Display,
    {
        match self.tokens.peek().cloned() {
            Some(next) => Ok(next),
            None => Err(self.unclosed(expect)),
        }
    }

    fn unclosed<T>(&self, expect: T) -> Error
    where
        T: Display,
    {
        self.error_at(UNCLOSED_TAG, self.line, Region::at(self.source.len()))
            .with_help(expected(expect, "end of source"))
    }

    /// Return an [`Error`] pointing at the most recently consumed token.
    fn error(&self, reason: &str) -> Error {
        self.error_at(reason, self.line, self.region)
    }

    fn error_at(&self, reason: &str, line: usize, region: Region) -> Error {
        Error::build(reason)
            .with_name(self.name)
            .with_line(line)
            .with_pointer(self.source, region)
    }
}

fn literal(value: Value, line: usize) -> Expression {
    Expression::Value(Literal { value, line })
}

/// Return true if the name matches `[A-Za-z_][A-Za-z0-9_]*`.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{Definitions, Parser};
    use crate::{
        compile::{
            tree::{
                Assign, Assignment, Branch, Call, Capture, Case, CaseKind, Code, Emit, Expand,
                Expression, For, If, Import, Include, Index, List, Literal, Node, Raise, Return,
                Scope, ScopeKind, Section, Switch, Text, Unset, UseSection, Variable,
            },
            Autostrip, Template,
        },
        log::{
            Error, CASE_ARITY, CASE_OUTSIDE_SWITCH, DOTTED_VARIABLE, EXPECTED_COMMA,
            INVALID_VARIABLE, MISMATCHED_ELIF, MISMATCHED_ELSE, MISMATCHED_END,
            NESTED_TOO_DEEPLY, TOO_MANY_ENDS, UNCLOSED_TAG, UNEXPECTED_CLOSE_TAG,
            UNEXPECTED_TOKEN, UNKNOWN_ACTION, UNKNOWN_DEFINE, UNMATCHED_ACTION,
        },
        syntax::{Builder, Syntax},
    };
    use rstest::rstest;
    use serde_json::{json, Value};

    #[test]
    fn test_parse_text_only() {
        assert_eq!(
            parse("hello\nworld").unwrap().nodes,
            vec![text("hello\nworld", 1)]
        );
    }

    #[test]
    fn test_parse_emit_variable() {
        assert_eq!(
            parse("hi {{ person.@name }}").unwrap().nodes,
            vec![
                text("hi ", 1),
                Node::Emit(Emit {
                    expression: var(&["person", "@name"], 1),
                    line: 1
                })
            ]
        );
    }

    #[test]
    fn test_parse_emit_constant() {
        assert_eq!(
            parse(r#"{{ "{{" }}{{ 5 }}{{ [1, "a"] }}"#).unwrap().nodes,
            vec![text("{{", 1), text("5", 1), text(r#"[1, "a"]"#, 1)]
        );
    }

    #[test]
    fn test_parse_call_and_index() {
        let nodes = parse("{{ fmt.upper(name, [x, 2]) }}{{ items[0, k] }}")
            .unwrap()
            .nodes;

        assert_eq!(
            nodes,
            vec![
                Node::Emit(Emit {
                    expression: Expression::Func(Call {
                        callee: vec!["fmt".into(), "upper".into()],
                        arguments: vec![
                            var(&["name"], 1),
                            Expression::List(List {
                                items: vec![var(&["x"], 1), value(json!(2), 1)],
                                line: 1
                            })
                        ],
                        line: 1
                    }),
                    line: 1
                }),
                Node::Emit(Emit {
                    expression: Expression::Index(Index {
                        base: vec!["items".into()],
                        subscripts: vec![value(json!(0), 1), var(&["k"], 1)],
                        line: 1
                    }),
                    line: 1
                })
            ]
        );
    }

    #[test]
    fn test_parse_if_elif_else() {
        let nodes = parse("{% if a %}1{% elif b %}2{% else %}3{% endif %}")
            .unwrap()
            .nodes;

        assert_eq!(
            nodes,
            vec![Node::If(If {
                branches: vec![
                    Branch {
                        condition: var(&["a"], 1),
                        nodes: vec![text("1", 1)]
                    },
                    Branch {
                        condition: var(&["b"], 1),
                        nodes: vec![text("2", 1)]
                    }
                ],
                else_branch: Some(vec![text("3", 1)]),
                line: 1
            })]
        );
    }

    #[test]
    fn test_parse_elif_after_else() {
        let nodes = parse("{% if a %}1{% else %}2{% elif b %}3{% endif %}")
            .unwrap()
            .nodes;

        let Node::If(node) = &nodes[0] else {
            panic!("expected an if node");
        };
        assert_eq!(node.branches[1].nodes, vec![text("3", 1)]);
        assert_eq!(node.else_branch, Some(vec![text("2", 1)]));
    }

    #[test]
    fn test_parse_for() {
        let nodes = parse("{% for k, v in map %}{{ k }}{% else %}none{% endfor %}")
            .unwrap()
            .nodes;

        assert_eq!(
            nodes,
            vec![Node::For(For {
                variable: "k".into(),
                companion: Some("v".into()),
                iterable: var(&["map"], 1),
                nodes: vec![Node::Emit(Emit {
                    expression: var(&["k"], 1),
                    line: 1
                })],
                else_branch: Some(vec![text("none", 1)]),
                line: 1
            })]
        );
    }

    #[test]
    fn test_parse_switch() {
        let nodes = parse("{% switch n %}skip{% lt 1 %}a{% bt 1, 5 %}b{% endswitch %}")
            .unwrap()
            .nodes;

        assert_eq!(
            nodes,
            vec![Node::Switch(Switch {
                subject: var(&["n"], 1),
                cases: vec![
                    Case {
                        kind: CaseKind::Lesser,
                        arguments: vec![value(json!(1), 1)],
                        nodes: vec![text("a", 1)],
                        line: 1
                    },
                    Case {
                        kind: CaseKind::Between,
                        arguments: vec![value(json!(1), 1), value(json!(5), 1)],
                        nodes: vec![text("b", 1)],
                        line: 1
                    }
                ],
                line: 1
            })]
        );
    }

    #[test]
    fn test_parse_assignments() {
        let nodes = parse("{% global a = 1, b = x %}{% unset a, b %}").unwrap().nodes;

        assert_eq!(
            nodes,
            vec![
                Node::Assign(Assign {
                    assignments: vec![
                        Assignment {
                            name: "a".into(),
                            value: value(json!(1), 1)
                        },
                        Assignment {
                            name: "b".into(),
                            value: var(&["x"], 1)
                        }
                    ],
                    scope: ScopeKind::Global,
                    line: 1
                }),
                Node::Unset(Unset {
                    names: vec!["a".into(), "b".into()],
                    line: 1
                })
            ]
        );
    }

    #[test]
    fn test_parse_assignment_scopes() {
        let nodes = parse("{% set a = 1 %}{% template b = 2 %}{% private c = 3 %}")
            .unwrap()
            .nodes;

        let scopes: Vec<ScopeKind> = nodes
            .iter()
            .map(|node| match node {
                Node::Assign(assign) => assign.scope,
                node => panic!("expected an assignment, found {node:?}"),
            })
            .collect();
        assert_eq!(
            scopes,
            vec![ScopeKind::Local, ScopeKind::Template, ScopeKind::Private]
        );
    }

    #[test]
    fn test_parse_scope() {
        let nodes = parse("{% scope a = 1, b = x %}{{ a }}{% endscope %}")
            .unwrap()
            .nodes;

        assert_eq!(
            nodes,
            vec![Node::Scope(Scope {
                assignments: vec![
                    Assignment {
                        name: "a".into(),
                        value: value(json!(1), 1)
                    },
                    Assignment {
                        name: "b".into(),
                        value: var(&["x"], 1)
                    }
                ],
                nodes: vec![Node::Emit(Emit {
                    expression: var(&["a"], 1),
                    line: 1
                })],
                line: 1
            })]
        );
    }

    #[test]
    fn test_parse_section_and_use() {
        let nodes = parse("{% section \"head\" %}\ntitle{% endsection %}{% use name %}")
            .unwrap()
            .nodes;

        assert_eq!(
            nodes,
            vec![
                Node::Section(Section {
                    name: value(json!("head"), 1),
                    nodes: vec![text("\ntitle", 1)],
                    line: 1
                }),
                Node::UseSection(UseSection {
                    name: var(&["name"], 2),
                    line: 2
                })
            ]
        );
    }

    #[test]
    fn test_parse_var() {
        let nodes = parse("{% var out %}a{{ b }}{% endvar %}").unwrap().nodes;

        assert_eq!(
            nodes,
            vec![Node::Var(Capture {
                name: "out".into(),
                nodes: vec![
                    text("a", 1),
                    Node::Emit(Emit {
                        expression: var(&["b"], 1),
                        line: 1
                    })
                ],
                line: 1
            })]
        );
    }

    #[test]
    fn test_parse_error_and_import() {
        let nodes = parse("{% error \"bad\" %}{% import lib = \"lib/text\" %}")
            .unwrap()
            .nodes;

        assert_eq!(
            nodes,
            vec![
                Node::Error(Raise {
                    message: value(json!("bad"), 1),
                    line: 1
                }),
                Node::Import(Import {
                    assignments: vec![Assignment {
                        name: "lib".into(),
                        value: value(json!("lib/text"), 1)
                    }],
                    line: 1
                })
            ]
        );
    }

    #[test]
    fn test_parse_return_and_expand() {
        let nodes = parse("{% code %}{% return a = x.y %}{% expand m %}{% endcode %}")
            .unwrap()
            .nodes;

        assert_eq!(
            nodes,
            vec![Node::Code(Code {
                assignments: vec![],
                returns: None,
                nodes: vec![
                    Node::Return(Return {
                        assignments: vec![Assignment {
                            name: "a".into(),
                            value: var(&["x", "y"], 1)
                        }],
                        line: 1
                    }),
                    Node::Expand(Expand {
                        expression: var(&["m"], 1),
                        line: 1
                    })
                ],
                line: 1
            })]
        );
    }

    #[test]
    fn test_parse_include() {
        let nodes = parse(r#"{% include "a.txt" return out with x = 1 %}"#)
            .unwrap()
            .nodes;

        assert_eq!(
            nodes,
            vec![Node::Include(Include {
                path: value(json!("a.txt"), 1),
                returns: Some("out".into()),
                assignments: vec![Assignment {
                    name: "x".into(),
                    value: value(json!(1), 1)
                }],
                line: 1
            })]
        );
    }

    #[test]
    fn test_parse_code_disables_autostrip() {
        let syntax = Builder::new().with_autostrip(Autostrip::Strip).to_syntax();
        let template = Parser::new(
            " a {% code return r %} b {% endcode %} c ",
            "test",
            &syntax,
        )
        .compile(&mut Definitions::new())
        .unwrap();

        assert_eq!(
            template.nodes,
            vec![
                text("a", 1),
                Node::Code(Code {
                    assignments: vec![],
                    returns: Some("r".into()),
                    nodes: vec![text(" b ", 1)],
                    line: 1
                }),
                text("c", 1)
            ]
        );
    }

    #[test]
    fn test_parse_strip_block() {
        let nodes = parse(" a {% strip on %} b {% endstrip %} c {% autotrim %}\n d \n\n e ")
            .unwrap()
            .nodes;

        assert_eq!(
            nodes,
            vec![text(" a ", 1), text("b", 1), text(" c ", 1), text("d\ne", 1)]
        );
    }

    #[test]
    fn test_parse_strip_without_mode() {
        let nodes = parse("{% autostrip %}{% strip %} a {% endstrip %}{% no_autostrip %} b ")
            .unwrap()
            .nodes;

        assert_eq!(nodes, vec![text("a", 1), text(" b ", 1)]);
    }

    #[test]
    fn test_parse_whitespace_control() {
        let nodes = parse("a\n  {%- do x -%}  \n b{{+ 1 *}}c").unwrap().nodes;

        assert_eq!(nodes[0], text("a", 1));
        assert_eq!(nodes[2], text(" b\n", 2));
        assert_eq!(nodes[3], text("1", 3));
        assert_eq!(nodes[4], text(" c", 3));
    }

    #[test]
    fn test_parse_comment() {
        assert_eq!(
            parse("a{# {% if %} #}b").unwrap().nodes,
            vec![text("a", 1), text("b", 1)]
        );
    }

    #[test]
    fn test_parse_def_and_call() {
        let syntax = Syntax::default();
        let mut definitions = Definitions::new();
        let template = Parser::new(
            r#"{% def "greet" %}hi{% enddef %}{% call "greet" %}{% call "greet" %}"#,
            "test",
            &syntax,
        )
        .compile(&mut definitions)
        .unwrap();

        assert_eq!(template.nodes, vec![text("hi", 1), text("hi", 1)]);
        assert_eq!(definitions.get("greet"), Some(&vec![text("hi", 1)]));
    }

    #[test]
    fn test_parse_call_within_own_def() {
        let syntax = Syntax::default();
        let mut definitions = Definitions::new();
        let template = Parser::new(
            r#"{% def "a" %}x{% call "a" %}{% enddef %}{% call "a" %}"#,
            "test",
            &syntax,
        )
        .compile(&mut definitions)
        .unwrap();

        let expected = vec![text("x", 1), text("x", 1)];
        assert_eq!(template.nodes, expected);
        assert_eq!(definitions["a"], expected);
    }

    #[test]
    fn test_parse_def_appends() {
        let syntax = Syntax::default();
        let mut definitions = Definitions::new();
        definitions.insert("d".into(), vec![text("a", 1)]);

        Parser::new(r#"{% def "d" %}b{% enddef %}"#, "test", &syntax)
            .compile(&mut definitions)
            .unwrap();

        assert_eq!(definitions["d"], vec![text("a", 1), text("b", 1)]);
    }

    #[test]
    fn test_failed_parse_keeps_definitions() {
        let syntax = Syntax::default();
        let mut definitions = Definitions::new();

        let result = Parser::new(r#"{% def "d" %}b{% enddef %}{% if %}"#, "test", &syntax)
            .compile(&mut definitions);

        assert!(result.is_err());
        assert!(definitions.is_empty());
    }

    #[test]
    fn test_parse_lines() {
        let nodes = parse("a\n{% if x %}\nb\n{% endif %}\n{{ y }}").unwrap().nodes;

        let lines: Vec<usize> = nodes.iter().map(Node::line).collect();
        assert_eq!(lines, vec![1, 2, 4, 5]);
    }

    #[test]
    fn test_parse_case_table() {
        let syntax = Builder::new()
            .without_cases()
            .with_case("case", CaseKind::Equal, 1)
            .to_syntax();
        let result = Parser::new("{% switch v %}{% case 5 %}{% endswitch %}", "test", &syntax)
            .compile(&mut Definitions::new());
        assert!(result.is_ok());

        let error = Parser::new("{% switch v %}{% eq 5 %}{% endswitch %}", "test", &syntax)
            .compile(&mut Definitions::new())
            .unwrap_err();
        assert_eq!(error.get_reason(), UNKNOWN_ACTION);
    }

    #[test]
    fn test_error_unmatched_line() {
        let error = parse("a\n\n{% for x in y %}\n{% if x %}").unwrap_err();

        assert_eq!(error.get_reason(), UNMATCHED_ACTION);
        assert_eq!(error.get_line(), Some(4));
        assert_eq!(error.get_name(), Some("test"));
    }

    #[test]
    fn test_error_nested_too_deeply() {
        let source = format!("{{{{ {}{} }}}}", "[".repeat(300), "]".repeat(300));

        assert_eq!(parse(&source).unwrap_err().get_reason(), NESTED_TOO_DEEPLY);
    }

    #[rstest]
    #[case("{% if x", UNCLOSED_TAG)]
    #[case("{{ x", UNCLOSED_TAG)]
    #[case("{# x", UNCLOSED_TAG)]
    #[case("{% if x }}", UNEXPECTED_CLOSE_TAG)]
    #[case("{{ x y }}", UNEXPECTED_CLOSE_TAG)]
    #[case("{% iff x %}", UNKNOWN_ACTION)]
    #[case("{% %}", UNEXPECTED_TOKEN)]
    #[case("{{ ] }}", UNEXPECTED_TOKEN)]
    #[case("{% set x 1 %}", UNEXPECTED_TOKEN)]
    #[case("{% for x of y %}{% endfor %}", UNEXPECTED_TOKEN)]
    #[case("{% strip maybe %}{% endstrip %}", UNEXPECTED_TOKEN)]
    #[case("{% def name %}{% enddef %}", UNEXPECTED_TOKEN)]
    #[case("{% do a b %}", EXPECTED_COMMA)]
    #[case("{{ f(a b) }}", EXPECTED_COMMA)]
    #[case("{{ a..b }}", INVALID_VARIABLE)]
    #[case("{{ a.@@b }}", INVALID_VARIABLE)]
    #[case("{% set a.b = 1 %}", DOTTED_VARIABLE)]
    #[case("{% elif x %}", MISMATCHED_ELIF)]
    #[case("{% for x in y %}{% elif x %}{% endfor %}", MISMATCHED_ELIF)]
    #[case("{% switch x %}{% else %}{% endswitch %}", MISMATCHED_ELSE)]
    #[case("{% eq 1 %}", CASE_OUTSIDE_SWITCH)]
    #[case("{% eq a b %}", CASE_OUTSIDE_SWITCH)]
    #[case("{% if x %}{% lt 1 %}{% endif %}", CASE_OUTSIDE_SWITCH)]
    #[case("{% switch x %}{% bt 1 %}{% endswitch %}", CASE_ARITY)]
    #[case("{% if x %}{% endfor %}", MISMATCHED_END)]
    #[case("{% scope %}{% endsection %}", MISMATCHED_END)]
    #[case(r#"{% section "s" %}{% endvar %}"#, MISMATCHED_END)]
    #[case("{% var v %}{% endscope %}", MISMATCHED_END)]
    #[case("{% endif %}", TOO_MANY_ENDS)]
    #[case(r#"{% call "missing" %}"#, UNKNOWN_DEFINE)]
    #[case("{% if x %}", UNMATCHED_ACTION)]
    fn test_errors(#[case] source: &str, #[case] reason: &str) {
        assert_eq!(parse(source).unwrap_err().get_reason(), reason);
    }

    fn parse(source: &str) -> Result<Template, Error> {
        let syntax = Syntax::default();
        Parser::new(source, "test", &syntax).compile(&mut Definitions::new())
    }

    fn text(text: &str, line: usize) -> Node {
        Node::Text(Text {
            text: text.into(),
            line,
        })
    }

    fn var(path: &[&str], line: usize) -> Expression {
        Expression::Var(Variable {
            path: path.iter().map(|segment| segment.to_string()).collect(),
            line,
        })
    }

    fn value(value: Value, line: usize) -> Expression {
        Expression::Value(Literal { value, line })
    }
}
