//! Constant folding.
//!
//! This is an optimization applied to an expression after it is built, so
//! list literals made only of constants reach the evaluator as one value, and
//! constant emitters can be rendered ahead of time.
use crate::compile::tree::{Expression, List, Literal};
use serde_json::Value;

/// Fold a [`List`] whose items are all constant into a single [`Literal`]
/// array.
///
/// An empty list is left alone. Any other expression is returned unchanged.
pub fn fold(expression: Expression) -> Expression {
    match expression {
        Expression::List(List { items, line })
            if !items.is_empty() && items.iter().all(|item| item.as_constant().is_some()) =>
        {
            let line = items.first().map(Expression::line).unwrap_or(line);
            let values = items
                .into_iter()
                .filter_map(|item| match item {
                    Expression::Value(literal) => Some(literal.value),
                    _ => None,
                })
                .collect();

            Expression::Value(Literal {
                value: Value::Array(values),
                line,
            })
        }
        expression => expression,
    }
}

/// Render a constant as the text an emitter would produce for it.
///
/// Strings are rendered as is. Arrays are rendered as `[a, b]`, with any
/// string inside of them quoted.
pub fn render_constant(value: &Value) -> String {
    match value {
        Value::String(string) => string.clone(),
        Value::Array(array) => {
            let items: Vec<String> = array.iter().map(render_item).collect();
            format!("[{}]", items.join(", "))
        }
        value => value.to_string(),
    }
}

fn render_item(value: &Value) -> String {
    match value {
        Value::Array(_) => render_constant(value),
        value => value.to_string(),
    }
}
