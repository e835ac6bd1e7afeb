use super::tree::Node;
use serde::Serialize;

/// A compiled [`Template`], ready to be handed to an evaluator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    /// The source identifier of the [`Template`].
    pub name: String,
    /// The Abstract Syntax Tree generated during compilation.
    pub nodes: Vec<Node>,
}
