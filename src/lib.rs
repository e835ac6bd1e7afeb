//! Brace - Template Compiler
//!
//! Compiles brace-delimited template text into an Abstract Syntax Tree of
//! statement and expression nodes, ready to be rendered by an evaluator.
//!
//! ```
//! use brace::{compile, tree::Node};
//!
//! let template = compile("{% if user %}hello, {{ user.name }}{% endif %}").unwrap();
//! assert!(matches!(template.nodes[0], Node::If(_)));
//! ```
mod compile;
mod engine;
mod log;
mod region;
mod syntax;

pub use compile::{
    compile, compile_with, fold, tokenize,
    token::{Spanned, Token, Whitespace},
    tree, Autostrip, Definitions, Parser, Template,
};
pub use engine::Engine;
pub use log::{Error, Pointer, Visual};
pub use region::Region;
pub use syntax::{Builder, CaseRule, Marker, Syntax};
