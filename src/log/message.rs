use std::fmt::Display;

pub const UNCLOSED_TAG: &str = "unclosed tag";
pub const UNCLOSED_STRING: &str = "unclosed string";
pub const UNEXPECTED_CHARACTER: &str = "unexpected character";
pub const UNEXPECTED_TOKEN: &str = "unexpected token";
pub const UNEXPECTED_CLOSE_TAG: &str = "unexpected close tag";
pub const INVALID_TAG: &str = "invalid tag";
pub const INVALID_NUMBER: &str = "invalid number";
pub const INVALID_VARIABLE: &str = "invalid variable name";
pub const DOTTED_VARIABLE: &str = "dotted variable not allowed";
pub const EXPECTED_COMMA: &str = "expecting comma";
pub const UNKNOWN_ACTION: &str = "unknown action tag";
pub const MISMATCHED_ELIF: &str = "mismatched elif";
pub const MISMATCHED_ELSE: &str = "mismatched else";
pub const MISMATCHED_END: &str = "mismatched end tag";
pub const TOO_MANY_ENDS: &str = "too many ends";
pub const CASE_OUTSIDE_SWITCH: &str = "case outside of switch";
pub const CASE_ARITY: &str = "case arity mismatch";
pub const UNKNOWN_DEFINE: &str = "unknown define";
pub const UNMATCHED_ACTION: &str = "unmatched action tag";
pub const NESTED_TOO_DEEPLY: &str = "expression nested too deeply";
pub const DUPLICATE_TEMPLATE: &str = "duplicate template";

/// Return a string describing what was expected and what was found instead.
pub fn expected<T, Y>(expected: T, found: Y) -> String
where
    T: Display,
    Y: Display,
{
    format!("expected {expected}, found {found}")
}

/// Return a string suggesting the end tag that closes the given block.
pub fn expected_end<T>(block: T) -> String
where
    T: Display,
{
    format!("did you close the `{block}` block with an `end{block}` tag?")
}
