//! Renders a package's landing page from a [`gtmpl`] template. Templates use
//! Go's `text/template` syntax and see two values: `.Config` (with fields
//! `Host`, `DefaultUser` and `Packages`) and `.Pkg` (with fields `Name` and
//! `Repo`). Every string is HTML-escaped before it reaches the template, so
//! templates may drop values directly into element text or double-quoted
//! attributes.

use crate::config::{Config, Package};
use gtmpl::{Context, Template, Value};
use pulldown_cmark::escape::escape_html;
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

/// The page template compiled into the binary. It contains the `go-import`
/// meta tag, a refresh redirect to the repository and a link for humans.
pub const EMBEDDED_TEMPLATE: &str = include_str!("../assets/template.html");

/// A parsed page template.
pub struct Renderer {
    template: Template,
}

impl Renderer {
    /// Parses `source` into a [`Renderer`].
    pub fn new(source: &str) -> Result<Renderer> {
        let mut template = Template::default();
        template.parse(source).map_err(Error::Parse)?;
        Ok(Renderer { template })
    }

    /// Loads and parses a template file.
    pub fn from_file(path: &Path) -> Result<Renderer> {
        let source = std::fs::read_to_string(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        Renderer::new(&source)
    }

    /// Parses the template compiled into the binary.
    pub fn embedded() -> Result<Renderer> {
        Renderer::new(EMBEDDED_TEMPLATE)
    }

    /// Renders the page for `package` into `w`. `package` should already be
    /// normalized (see [`Package::normalize`]).
    pub fn render<W: Write>(
        &self,
        w: &mut W,
        config: &Config,
        package: &Package,
    ) -> Result<()> {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("Config".to_owned(), config_to_value(config));
        m.insert("Pkg".to_owned(), package_to_value(package));
        let context =
            Context::from(Value::Object(m)).map_err(Error::Execute)?;
        self.template.execute(w, &context).map_err(Error::Execute)
    }
}

fn config_to_value(config: &Config) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("Host".to_owned(), escape(&config.host));
    m.insert("DefaultUser".to_owned(), escape(&config.default_user));
    m.insert(
        "Packages".to_owned(),
        Value::Array(config.packages.iter().map(package_to_value).collect()),
    );
    Value::Object(m)
}

fn package_to_value(package: &Package) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("Name".to_owned(), escape(&package.name));
    m.insert("Repo".to_owned(), escape(&package.repo));
    Value::Object(m)
}

fn escape(s: &str) -> Value {
    let mut escaped = String::with_capacity(s.len());
    // writing to a `String` can't fail
    let _ = escape_html(&mut escaped, s);
    Value::String(escaped)
}

/// The result of a fallible rendering operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading or executing a template.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems while opening a template file.
    Open { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing a template.
    Parse(String),

    /// Returned for errors executing a template.
    Execute(String),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Open { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::Parse(err) => write!(f, "Parsing template: {}", err),
            Error::Execute(err) => write!(f, "Rendering template: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open { path: _, err } => Some(err),
            Error::Parse(_) => None,
            Error::Execute(_) => None,
        }
    }
}
