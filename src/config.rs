//! Defines the [`Config`] and [`Package`] types and the logic for loading them
//! from YAML. The configuration is loaded once at startup and never mutated;
//! normalizing a package's repository (see [`Package::normalize`]) produces a
//! working copy rather than rewriting the configured entry.

use crate::repo;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// The configuration document compiled into the binary. Used when no
/// `--config` file is given.
pub const EMBEDDED_CONFIG: &str = include_str!("../assets/config.yaml");

/// The top-level configuration: the vanity host, the user or organization
/// that owns repositories by default, and the packages to generate pages for.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// The vanity host, e.g., `go.example.com`. Import paths are
    /// `{host}/{package_name}`.
    pub host: String,

    /// The repository owner used for references that don't name one.
    pub default_user: String,

    /// The packages in declaration order.
    #[serde(default)]
    pub packages: Vec<Package>,
}

/// A single package declaration.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Package {
    /// The package name. This is both the output directory (relative to the
    /// output root) and the page title.
    pub name: String,

    /// The repository reference. Before normalization this may be empty, a
    /// bare repository name, a `user/repo` path, or a full URL.
    #[serde(default)]
    pub repo: String,
}

impl Config {
    /// Parses a [`Config`] from a YAML document.
    pub fn from_slice(input: &[u8]) -> Result<Config> {
        Ok(serde_yaml::from_slice(input)?)
    }

    /// Loads a [`Config`] from a YAML file on disk.
    pub fn from_file(path: &Path) -> Result<Config> {
        let input = std::fs::read(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        Config::from_slice(&input)
    }

    /// Parses the configuration compiled into the binary.
    pub fn embedded() -> Result<Config> {
        Config::from_slice(EMBEDDED_CONFIG.as_bytes())
    }
}

impl Package {
    /// Returns a copy of the package whose `repo` has been normalized into an
    /// absolute URL. See [`repo::normalize`] for the rules.
    pub fn normalize(&self, default_user: &str) -> repo::Result<Package> {
        let url = repo::normalize(&self.repo, &self.name, default_user)?;
        Ok(Package {
            name: self.name.clone(),
            repo: url.to_string(),
        })
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading the configuration. Any such error is fatal:
/// no packages are processed.
#[derive(Debug)]
pub enum Error {
    /// Returned when the configuration file can't be read.
    Open { path: PathBuf, err: std::io::Error },

    /// Returned when the document is malformed or a field has the wrong type.
    Parse(serde_yaml::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Open { path, err } => {
                write!(
                    f,
                    "Opening configuration file '{}': {}",
                    path.display(),
                    err
                )
            }
            Error::Parse(err) => write!(f, "Parsing configuration: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open { path: _, err } => Some(err),
            Error::Parse(err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts [`serde_yaml::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: serde_yaml::Error) -> Error {
        Error::Parse(err)
    }
}
