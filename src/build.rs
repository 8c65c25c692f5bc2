//! Exports the [`build_pages`] function which stitches together the steps of
//! generating the landing pages: normalizing each package's repository
//! ([`crate::repo`]) and rendering and writing its page ([`crate::write`]).
//! A package that fails doesn't stop the others; every failure is collected
//! into a single [`Error`].

use crate::config::{Config, Package};
use crate::render::Renderer;
use crate::repo::Error as ReferenceError;
use crate::write::{Error as WriteError, Writer};
use std::fmt;
use std::path::PathBuf;
use tracing::{error, info};

/// Options for a build which don't come from the configuration document.
#[derive(Clone, Debug)]
pub struct Options {
    /// The output root. Defaults to `public`.
    pub output_directory: PathBuf,

    /// Whether to write a `.gitignore` into each package directory. Defaults
    /// to `true`.
    pub gitignore: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            output_directory: PathBuf::from("public"),
            gitignore: true,
        }
    }
}

/// Builds a page for every package in `config`, in declaration order. On
/// success, returns the paths of the written `index.html` files.
pub fn build_pages(
    config: &Config,
    renderer: &Renderer,
    options: &Options,
) -> Result<Vec<PathBuf>> {
    let writer = Writer {
        config,
        renderer,
        output_directory: &options.output_directory,
        gitignore: options.gitignore,
    };

    let mut written = Vec::with_capacity(config.packages.len());
    let mut failures = Vec::new();
    for package in &config.packages {
        match build_page(config, &writer, package) {
            Ok(path) => written.push(path),
            Err(err) => {
                error!(
                    name = %package.name,
                    repo = %package.repo,
                    error = %err,
                    "Generating HTML failed"
                );
                failures.push(Failure {
                    name: package.name.clone(),
                    repo: package.repo.clone(),
                    err,
                });
            }
        }
    }

    if failures.is_empty() {
        info!(pages = written.len(), "Generated all pages");
        Ok(written)
    } else {
        Err(Error { failures })
    }
}

fn build_page(
    config: &Config,
    writer: &Writer,
    package: &Package,
) -> PageResult<PathBuf> {
    let package = package.normalize(&config.default_user)?;
    info!(name = %package.name, repo = %package.repo, "Generating HTML");
    Ok(writer.write_package(&package)?)
}

type Result<T> = std::result::Result<T, Error>;

type PageResult<T> = std::result::Result<T, PageError>;

/// The error type for building a single package's page.
#[derive(Debug)]
pub enum PageError {
    /// Returned when the package's repository reference can't be normalized.
    Reference(ReferenceError),

    /// Returned for errors creating directories, rendering or writing files.
    Write(WriteError),
}

impl fmt::Display for PageError {
    /// Implements [`fmt::Display`] for [`PageError`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PageError::Reference(err) => err.fmt(f),
            PageError::Write(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for PageError {
    /// Implements [`std::error::Error`] for [`PageError`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PageError::Reference(err) => Some(err),
            PageError::Write(err) => Some(err),
        }
    }
}

impl From<ReferenceError> for PageError {
    /// Converts [`ReferenceError`]s into [`PageError`]. This allows us to use
    /// the `?` operator.
    fn from(err: ReferenceError) -> PageError {
        PageError::Reference(err)
    }
}

impl From<WriteError> for PageError {
    /// Converts [`WriteError`]s into [`PageError`]. This allows us to use the
    /// `?` operator.
    fn from(err: WriteError) -> PageError {
        PageError::Write(err)
    }
}

/// A package whose page couldn't be built. `repo` is the reference as
/// configured, before normalization.
#[derive(Debug)]
pub struct Failure {
    pub name: String,
    pub repo: String,
    pub err: PageError,
}

impl fmt::Display for Failure {
    /// Implements [`fmt::Display`] for [`Failure`], naming the package and
    /// its configured repository.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "package '{}' (repo '{}'): {}",
            self.name, self.repo, self.err
        )
    }
}

/// The aggregate error for a build: one [`Failure`] per package that failed,
/// in declaration order.
#[derive(Debug)]
pub struct Error {
    pub failures: Vec<Failure>,
}

impl fmt::Display for Error {
    /// Lists every failure, one per line.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} package(s) failed", self.failures.len())?;
        for failure in &self.failures {
            write!(f, "\n  {}", failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`]. The source is the first
    /// failure's cause; the rest are only available via [`Error::failures`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.failures
            .first()
            .map(|failure| &failure.err as &(dyn std::error::Error + 'static))
    }
}
