use crate::compile::{
    parse::block::BlockKind,
    tree::{
        Assignment, Branch, Capture, Case, Code, Expression, For, If, Node, Scope, Section,
        Switch,
    },
};
use crate::region::Region;

/// A block that has been opened and not yet closed.
#[derive(Debug)]
pub struct Frame {
    /// Line of the tag that opened the block.
    pub line: usize,
    /// [`Region`] of the keyword that opened the block.
    pub region: Region,
    pub state: BlockState,
}

/// Describes the internal state of an open block, and holds the nodes that
/// belong to it so far.
#[derive(Debug)]
pub enum BlockState {
    If {
        branches: Vec<Branch>,
        else_branch: Option<Vec<Node>>,
        /// True when new nodes belong to the else branch.
        in_else: bool,
    },
    For {
        variable: String,
        companion: Option<String>,
        iterable: Expression,
        nodes: Vec<Node>,
        else_branch: Option<Vec<Node>>,
    },
    Switch {
        subject: Expression,
        /// Nodes found before the first case, which are discarded.
        leading: Vec<Node>,
        cases: Vec<Case>,
    },
    Scope {
        assignments: Vec<Assignment>,
        nodes: Vec<Node>,
    },
    Code {
        assignments: Vec<Assignment>,
        returns: Option<String>,
        nodes: Vec<Node>,
    },
    Section {
        name: Expression,
        nodes: Vec<Node>,
    },
    /// A named fragment, registered on close instead of producing a node.
    Def { name: String, nodes: Vec<Node> },
    Var { name: String, nodes: Vec<Node> },
    /// Only changes the autostrip mode, so it never holds nodes.
    Strip,
}

/// The result of closing a [`Frame`].
#[derive(Debug)]
pub enum Closed {
    Node(Node),
    Define(String, Vec<Node>),
    Strip,
}

impl Frame {
    pub fn kind(&self) -> BlockKind {
        match self.state {
            BlockState::If { .. } => BlockKind::If,
            BlockState::For { .. } => BlockKind::For,
            BlockState::Switch { .. } => BlockKind::Switch,
            BlockState::Scope { .. } => BlockKind::Scope,
            BlockState::Code { .. } => BlockKind::Code,
            BlockState::Section { .. } => BlockKind::Section,
            BlockState::Def { .. } => BlockKind::Def,
            BlockState::Var { .. } => BlockKind::Var,
            BlockState::Strip => BlockKind::Strip,
        }
    }

    /// Return the list that new nodes are appended to while this block is
    /// the innermost one.
    ///
    /// Returns [`None`] for a `strip` block, which does not hold nodes.
    pub fn target(&mut self) -> Option<&mut Vec<Node>> {
        match &mut self.state {
            BlockState::If {
                branches,
                else_branch,
                in_else,
            } => match (in_else, else_branch) {
                (true, Some(nodes)) => Some(nodes),
                _ => branches.last_mut().map(|branch| &mut branch.nodes),
            },
            BlockState::For {
                nodes, else_branch, ..
            } => Some(else_branch.as_mut().unwrap_or(nodes)),
            BlockState::Switch { leading, cases, .. } => match cases.last_mut() {
                Some(case) => Some(&mut case.nodes),
                None => Some(leading),
            },
            BlockState::Scope { nodes, .. }
            | BlockState::Code { nodes, .. }
            | BlockState::Section { nodes, .. }
            | BlockState::Def { nodes, .. }
            | BlockState::Var { nodes, .. } => Some(nodes),
            BlockState::Strip => None,
        }
    }

    /// Close the block, returning the node it built.
    pub fn close(self) -> Closed {
        let line = self.line;

        match self.state {
            BlockState::If {
                branches,
                else_branch,
                ..
            } => Closed::Node(Node::If(If {
                branches,
                else_branch,
                line,
            })),
            BlockState::For {
                variable,
                companion,
                iterable,
                nodes,
                else_branch,
            } => Closed::Node(Node::For(For {
                variable,
                companion,
                iterable,
                nodes,
                else_branch,
                line,
            })),
            BlockState::Switch {
                subject,
                leading,
                cases,
            } => {
                if !leading.is_empty() {
                    tracing::debug!(line, count = leading.len(), "discarded nodes before first case");
                }

                Closed::Node(Node::Switch(Switch {
                    subject,
                    cases,
                    line,
                }))
            }
            BlockState::Scope { assignments, nodes } => Closed::Node(Node::Scope(Scope {
                assignments,
                nodes,
                line,
            })),
            BlockState::Code {
                assignments,
                returns,
                nodes,
            } => Closed::Node(Node::Code(Code {
                assignments,
                returns,
                nodes,
                line,
            })),
            BlockState::Section { name, nodes } => {
                Closed::Node(Node::Section(Section { name, nodes, line }))
            }
            BlockState::Var { name, nodes } => {
                Closed::Node(Node::Var(Capture { name, nodes, line }))
            }
            BlockState::Def { name, nodes } => Closed::Define(name, nodes),
            BlockState::Strip => Closed::Strip,
        }
    }
}
