use super::{CaseRule, Syntax};
use crate::compile::{tree::CaseKind, Autostrip};

/// Switch clauses recognized when no other table is supplied.
const DEFAULT_CASES: [(&str, CaseKind, usize); 7] = [
    ("lt", CaseKind::Lesser, 1),
    ("le", CaseKind::LesserOrEqual, 1),
    ("gt", CaseKind::Greater, 1),
    ("ge", CaseKind::GreaterOrEqual, 1),
    ("ne", CaseKind::NotEqual, 1),
    ("eq", CaseKind::Equal, 1),
    ("bt", CaseKind::Between, 2),
];

/// Provides methods to build a [`Syntax`].
///
/// # Example
///
/// ```
/// use brace::{tree::CaseKind, Autostrip, Builder};
///
/// let syntax = Builder::new()
///     .with_expression("<<", ">>")
///     .with_case("case", CaseKind::Equal, 1)
///     .with_autostrip(Autostrip::Trim)
///     .to_syntax();
/// ```
#[derive(Debug, Clone)]
pub struct Builder<'marker> {
    comment: (&'marker str, &'marker str),
    block: (&'marker str, &'marker str),
    expression: (&'marker str, &'marker str),
    cases: Vec<(&'marker str, CaseKind, usize)>,
    autostrip: Autostrip,
}

impl<'marker> Builder<'marker> {
    /// Create a new [`Builder`].
    ///
    /// The `Builder` has default markers:
    ///
    /// ```text
    /// Comments: {# ... #}
    /// Blocks: {% if ... %}
    /// Expressions: {{ name }}
    /// ```
    ///
    /// The switch clauses `lt`, `le`, `gt`, `ge`, `ne` and `eq` take one argument,
    /// and `bt` takes two. Autostrip starts disabled.
    #[inline]
    pub fn new() -> Self {
        Self {
            comment: ("{#", "#}"),
            block: ("{%", "%}"),
            expression: ("{{", "}}"),
            cases: DEFAULT_CASES.to_vec(),
            autostrip: Autostrip::None,
        }
    }

    /// Set the comment markers.
    ///
    /// # Panics
    ///
    /// Panics if either marker is empty.
    #[inline]
    pub fn set_comment(&mut self, begin: &'marker str, end: &'marker str) {
        assert!(!begin.is_empty() && !end.is_empty());
        self.comment = (begin, end);
    }

    /// Set the comment markers.
    ///
    /// Returns the [`Builder`], so additional methods may be chained.
    #[inline]
    pub fn with_comment(mut self, begin: &'marker str, end: &'marker str) -> Self {
        self.set_comment(begin, end);

        self
    }

    /// Set the block markers.
    ///
    /// # Panics
    ///
    /// Panics if either marker is empty.
    #[inline]
    pub fn set_block(&mut self, begin: &'marker str, end: &'marker str) {
        assert!(!begin.is_empty() && !end.is_empty());
        self.block = (begin, end);
    }

    /// Set the block markers.
    ///
    /// Returns the [`Builder`], so additional methods may be chained.
    #[inline]
    pub fn with_block(mut self, begin: &'marker str, end: &'marker str) -> Self {
        self.set_block(begin, end);

        self
    }

    /// Set the expression markers.
    ///
    /// # Panics
    ///
    /// Panics if either marker is empty.
    #[inline]
    pub fn set_expression(&mut self, begin: &'marker str, end: &'marker str) {
        assert!(!begin.is_empty() && !end.is_empty());
        self.expression = (begin, end);
    }

    /// Set the expression markers.
    ///
    /// Returns the [`Builder`], so additional methods may be chained.
    #[inline]
    pub fn with_expression(mut self, begin: &'marker str, end: &'marker str) -> Self {
        self.set_expression(begin, end);

        self
    }

    /// Register a switch clause keyword, replacing any clause already
    /// registered under the same keyword.
    pub fn set_case(&mut self, keyword: &'marker str, kind: CaseKind, arity: usize) {
        self.cases.retain(|(existing, _, _)| *existing != keyword);
        self.cases.push((keyword, kind, arity));
    }

    /// Register a switch clause keyword.
    ///
    /// Returns the [`Builder`], so additional methods may be chained.
    ///
    /// # Examples
    ///
    /// ```
    /// use brace::{tree::CaseKind, Builder};
    ///
    /// let syntax = Builder::new()
    ///     .without_cases()
    ///     .with_case("case", CaseKind::Between, 2)
    ///     .to_syntax();
    ///
    /// assert_eq!(syntax.get_case("case").map(|rule| rule.arity), Some(2));
    /// assert!(syntax.get_case("eq").is_none());
    /// ```
    #[inline]
    pub fn with_case(mut self, keyword: &'marker str, kind: CaseKind, arity: usize) -> Self {
        self.set_case(keyword, kind, arity);

        self
    }

    /// Remove every switch clause, including the defaults.
    #[inline]
    pub fn without_cases(mut self) -> Self {
        self.cases.clear();

        self
    }

    /// Set the autostrip mode that each parse begins in.
    #[inline]
    pub fn with_autostrip(mut self, autostrip: Autostrip) -> Self {
        self.autostrip = autostrip;

        self
    }

    /// Return a [`Syntax`] instance from the settings in this [`Builder`].
    pub fn to_syntax(self) -> Syntax {
        let owned = |(begin, end): (&str, &str)| (begin.to_owned(), end.to_owned());

        Syntax {
            comment: owned(self.comment),
            block: owned(self.block),
            expression: owned(self.expression),
            cases: self
                .cases
                .into_iter()
                .map(|(keyword, kind, arity)| CaseRule {
                    keyword: keyword.to_owned(),
                    kind,
                    arity,
                })
                .collect(),
            autostrip: self.autostrip,
        }
    }
}

impl<'marker> Default for Builder<'marker> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::Builder;
    use crate::compile::{tree::CaseKind, Autostrip};

    #[test]
    fn test_replace_case() {
        let syntax = Builder::new()
            .with_case("eq", CaseKind::Between, 2)
            .to_syntax();

        let rule = syntax.get_case("eq").unwrap();
        assert_eq!(rule.kind, CaseKind::Between);
        assert_eq!(rule.arity, 2);
        assert_eq!(syntax.get_cases().len(), 7);
    }

    #[test]
    fn test_markers() {
        let syntax = Builder::new()
            .with_comment("<#", "#>")
            .with_block("<%", "%>")
            .with_expression("<<", ">>")
            .with_autostrip(Autostrip::Strip)
            .to_syntax();

        assert_eq!(syntax.comment, ("<#".to_owned(), "#>".to_owned()));
        assert_eq!(syntax.block, ("<%".to_owned(), "%>".to_owned()));
        assert_eq!(syntax.expression, ("<<".to_owned(), ">>".to_owned()));
        assert_eq!(syntax.get_autostrip(), Autostrip::Strip);
    }

    #[test]
    #[should_panic]
    fn test_empty_marker() {
        Builder::new().with_block("", "%}");
    }
}
