use super::{Pointer, RED, RESET};
use crate::{log::Visual, region::Region};
use std::fmt::{Debug, Display, Formatter, Result};

/// Describes a syntax error found while compiling a template, and allows
/// adding a contextual help text and visualization.
///
/// # Examples
///
/// Creating an [`Error`] that includes a [`Visual`] of type [`Pointer`]:
///
/// ```
/// use brace::{Error, Region};
///
/// Error::build("unknown action tag")
///     .with_pointer("{% iff name %}", Region::new(3..6))
///     .with_name("template.txt")
///     .with_line(1)
///     .with_help("`iff` is not a recognized action");
/// ```
///
/// When printed with `println!("{:#}", error)` the [`Error`] produces this output:
///
/// ```text
/// error: unknown action tag
///   --> template.txt:1:4
///    |
///  1 | {% iff name %}
///    |    ^^^
///    |
///   = help: `iff` is not a recognized action
/// ```
pub struct Error {
    /// Describes the cause of the [`Error`].
    reason: String,
    /// A visualization to help illustrate the [`Error`].
    visual: Option<Box<dyn Visual>>,
    /// Additional information to display with the [`Error`].
    help: Option<String>,
    /// The source identifier of the template that the [`Error`] comes from.
    name: Option<String>,
    /// The line, counting from one, that the [`Error`] was found on.
    line: Option<usize>,
}

impl Error {
    /// Create a new [`Error`] with the given reason text.
    ///
    /// The additional fields may be populated using the various methods
    /// defined on `Error`.
    ///
    /// # Examples
    ///
    /// ```
    /// use brace::Error;
    ///
    /// Error::build("unknown define")
    ///     .with_help("no fragment named `greet` has been defined");
    /// ```
    pub fn build<T>(reason: T) -> Self
    where
        T: Into<String>,
    {
        Error {
            reason: reason.into(),
            visual: None,
            help: None,
            name: None,
            line: None,
        }
    }

    /// Set the reason text, which is a short summary of the [`Error`].
    pub fn with_reason<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.reason = text.into();

        self
    }

    /// Set the name text, which is the source identifier of the template
    /// that the [`Error`] is related to.
    pub fn with_name<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.name = Some(text.into());

        self
    }

    /// Set the line that the [`Error`] was found on.
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);

        self
    }

    /// Set the [`Visual`], which is a visualization that helps illustrate the
    /// cause of the error.
    pub fn with_visual(mut self, visual: impl Visual + 'static) -> Self {
        self.visual = Some(Box::new(visual));

        self
    }

    /// Set the visualization to a new [`Pointer`] with the given source text and
    /// [`Region`].
    pub fn with_pointer<T>(mut self, source: &str, region: T) -> Self
    where
        T: Into<Region>,
    {
        self.visual = Some(Box::new(Pointer::new(source, region.into())));

        self
    }

    /// Set the help text, which is contextual information to accompany the
    /// reason text.
    pub fn with_help<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.help = Some(text.into());

        self
    }

    /// Return the reason text.
    pub fn get_reason(&self) -> &str {
        &self.reason
    }

    /// Return the help text, if any.
    pub fn get_help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Return the source identifier of the template that the error is related to.
    pub fn get_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Return the line that the error was found on.
    pub fn get_line(&self) -> Option<usize> {
        self.line
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("Error")
            .field("reason", &self.reason)
            .field("name", &self.name)
            .field("line", &self.line)
            .field("help", &self.help)
            .field("visual", &self.visual)
            .finish()
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if !f.alternate() {
            write!(f, "error: {}", self.reason)?;

            return match (&self.name, self.line) {
                (Some(name), Some(line)) => write!(f, " ({name}:{line})"),
                (None, Some(line)) => write!(f, " (line {line})"),
                _ => Ok(()),
            };
        }

        write!(f, "{RED}error{RESET}: {}", self.reason)?;
        match &self.visual {
            Some(visual) => visual.display(f, self.name.as_deref(), self.help.as_deref()),
            None => match &self.help {
                Some(help) => write!(f, "\n  = help: {help}"),
                None => Ok(()),
            },
        }
    }
}

impl std::error::Error for Error {}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.reason == other.reason
            && self.help == other.help
            && self.name == other.name
            && self.line == other.line
    }
}

#[cfg(test)]
mod tests {
    use super::Error;
    use crate::region::Region;

    #[test]
    fn test_display_plain() {
        let error = Error::build("unknown define")
            .with_name("page.html")
            .with_line(3);

        assert_eq!(error.to_string(), "error: unknown define (page.html:3)");
    }

    #[test]
    fn test_display_pointer() {
        let error = Error::build("unknown action tag")
            .with_name("page.html")
            .with_line(1)
            .with_pointer("{% iff x %}", Region::new(3..6))
            .with_help("`iff` is not a recognized action");
        let text = format!("{error:#}");

        assert!(text.contains("--> page.html:1:4"));
        assert!(text.contains("{% iff x %}"));
        assert!(text.contains("help: `iff` is not a recognized action"));
    }

    #[test]
    fn test_eq_ignores_visual() {
        let a = Error::build("too many ends").with_line(2);
        let b = Error::build("too many ends")
            .with_line(2)
            .with_pointer("{% endif %}", Region::new(3..8));

        assert_eq!(a, b);
        assert_ne!(a, Error::build("too many ends").with_line(3));
    }
}
