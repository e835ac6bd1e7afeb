use crate::{
    compile::{tree::Node, Definitions, Parser, Template},
    log::{Error, DUPLICATE_TEMPLATE},
    syntax::Syntax,
};
use std::collections::HashMap;

/// Facilitates compiling templates that share a [`Syntax`] and a table of
/// named fragments, and provides storage for the compiled templates.
#[derive(Debug, Default)]
pub struct Engine {
    /// Syntax used to compile every template.
    syntax: Syntax,
    /// Templates that this Engine is aware of.
    templates: HashMap<String, Template>,
    /// Fragments registered with `def` by any template compiled so far.
    definitions: Definitions,
}

impl Engine {
    /// Create a new instance of [`Engine`] with the given [`Syntax`].
    #[inline]
    pub fn new(syntax: Syntax) -> Self {
        Self {
            syntax,
            templates: HashMap::new(),
            definitions: Definitions::new(),
        }
    }

    /// Compile a new [`Template`] without storing it.
    ///
    /// Fragments defined by the template are still registered with the `Engine`,
    /// and fragments registered by earlier templates may be called.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when compilation fails, which most likely means the source
    /// contains invalid syntax.
    ///
    /// # Examples
    ///
    /// ```
    /// use brace::Engine;
    ///
    /// let mut engine = Engine::default();
    /// let template = engine.compile("page.html", "hello, {{ name }}!");
    /// assert!(template.is_ok());
    /// ```
    #[inline]
    pub fn compile(&mut self, name: &str, text: &str) -> Result<Template, Error> {
        Parser::new(text, name, &self.syntax).compile(&mut self.definitions)
    }

    /// Compile and store a new [`Template`] with the given name.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when a `Template` with the given name already exists,
    /// or when compilation fails, which most likely means the source contains invalid
    /// syntax.
    ///
    /// # Examples
    ///
    /// ```
    /// use brace::Engine;
    ///
    /// let mut engine = Engine::default();
    /// let result = engine.add_template("template_name", "hello, {{ name }}!");
    /// assert!(result.is_ok());
    ///
    /// let second = engine.add_template("template_name", "hello again");
    /// assert!(second.is_err());
    /// ```
    pub fn add_template(&mut self, name: &str, text: &str) -> Result<(), Error> {
        if self.templates.contains_key(name) {
            return Err(Error::build(DUPLICATE_TEMPLATE)
                .with_name(name)
                .with_help(format!(
                    "template with name `{name}` already exists in engine, \
                    overwrite it with `.add_template_must`"
                )));
        }

        self.add_template_must(name, text)
    }

    /// Compile and store a new [`Template`] with the given name.
    ///
    /// If a `Template` with the given name already exists in the [`Engine`],
    /// it is overwritten.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when compilation fails, which most likely means the source
    /// contains invalid syntax.
    ///
    /// # Examples
    ///
    /// ```
    /// use brace::Engine;
    ///
    /// let mut engine = Engine::default();
    /// engine.add_template_must("template_name", "hello, {{ name }}!").unwrap();
    /// engine.add_template_must("template_name", "hello again").unwrap();
    /// ```
    pub fn add_template_must(&mut self, name: &str, text: &str) -> Result<(), Error> {
        let template = self.compile(name, text)?;
        tracing::debug!(name, "stored template");

        self.templates.insert(name.to_owned(), template);
        Ok(())
    }

    /// Return the named [`Template`].
    ///
    /// # Examples
    ///
    /// ```
    /// use brace::Engine;
    ///
    /// let mut engine = Engine::default();
    /// engine.add_template_must("template_name", "hello, {{ name }}!").unwrap();
    ///
    /// let template = engine.get_template("template_name");
    /// assert!(template.is_some());
    /// ```
    #[inline]
    pub fn get_template(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Return the body of the named fragment.
    #[inline]
    pub fn get_definition(&self, name: &str) -> Option<&[Node]> {
        self.definitions.get(name).map(Vec::as_slice)
    }

    /// Return every fragment registered so far.
    #[inline]
    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    #[inline]
    pub fn get_syntax(&self) -> &Syntax {
        &self.syntax
    }
}
