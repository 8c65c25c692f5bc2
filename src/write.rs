use crate::config::{Config, Package};
use crate::render::{Error as RenderError, Renderer};
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Component, Path, PathBuf};

/// The name of the generated page in each package directory.
pub const INDEX_FILE: &str = "index.html";

/// The name of the ignore file in each package directory.
pub const GITIGNORE_FILE: &str = ".gitignore";

/// The generated files ignore themselves so the output root can live inside a
/// repository without committing the pages.
pub const GITIGNORE_CONTENTS: &str = ".gitignore\nindex.html";

/// Responsible for creating package directories and writing their pages to
/// disk.
pub struct Writer<'a> {
    /// The configuration made available to the template as `.Config`.
    pub config: &'a Config,

    /// The page template.
    pub renderer: &'a Renderer,

    /// The output root. Each package is written to
    /// `{output_directory}/{package_name}/`, never outside of it (see
    /// [`package_dir`]).
    pub output_directory: &'a Path,

    /// Whether to write a `.gitignore` into each package directory.
    pub gitignore: bool,
}

impl Writer<'_> {
    /// Writes the page for a single normalized [`Package`]. Returns the path
    /// of the written `index.html`.
    pub fn write_package(&self, package: &Package) -> Result<PathBuf> {
        let dir = package_dir(self.output_directory, &package.name);
        create_dir(&dir)?;

        if self.gitignore {
            let path = dir.join(GITIGNORE_FILE);
            std::fs::write(&path, GITIGNORE_CONTENTS)
                .map_err(|err| Error::Io { path, err })?;
        }

        let path = dir.join(INDEX_FILE);
        let file = File::create(&path).map_err(|err| Error::Io {
            path: path.clone(),
            err,
        })?;

        // The file is closed when `w` drops, including when rendering fails.
        let mut w = BufWriter::new(file);
        self.renderer.render(&mut w, self.config, package)?;
        if let Err(err) = w.flush() {
            return Err(Error::Io { path, err });
        }
        Ok(path)
    }
}

/// Returns the output directory for the package `name`. The name is resolved
/// lexically beneath `output_directory`: root and drive prefixes are dropped,
/// `.` is ignored and `..` never climbs above the output root.
pub fn package_dir(output_directory: &Path, name: &str) -> PathBuf {
    let mut relative = PathBuf::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(segment) => relative.push(segment),
            Component::ParentDir => {
                relative.pop();
            }
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
        }
    }
    output_directory.join(relative)
}

fn create_dir(dir: &Path) -> Result<()> {
    match std::fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) => match e.kind() {
            io::ErrorKind::AlreadyExists => Ok(()),
            _ => Err(Error::CreateDirectory {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error creating the package's output directory.
    CreateDirectory { path: PathBuf, err: io::Error },

    /// An error creating or writing one of the output files.
    Io { path: PathBuf, err: io::Error },

    /// An error during templating.
    Render(RenderError),
}

impl From<RenderError> for Error {
    /// Converts a [`RenderError`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible template operations.
    fn from(err: RenderError) -> Error {
        Error::Render(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::CreateDirectory { path, err } => {
                write!(f, "Creating directory '{}': {}", path.display(), err)
            }
            Error::Io { path, err } => {
                write!(f, "Writing '{}': {}", path.display(), err)
            }
            Error::Render(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::CreateDirectory { path: _, err } => Some(err),
            Error::Io { path: _, err } => Some(err),
            Error::Render(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::TempDir;

    fn config() -> Config {
        Config {
            host: "example.com".to_owned(),
            default_user: "acme".to_owned(),
            packages: Vec::new(),
        }
    }

    fn package() -> Package {
        Package {
            name: "foo".to_owned(),
            repo: "https://github.com/acme/foo".to_owned(),
        }
    }

    #[test]
    fn test_write_package() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let config = config();
        let renderer = Renderer::new("{{ .Pkg.Repo }}")?;
        let writer = Writer {
            config: &config,
            renderer: &renderer,
            output_directory: dir.path(),
            gitignore: true,
        };

        let path = writer.write_package(&package())?;
        assert_eq!(dir.path().join("foo").join("index.html"), path);
        assert_eq!(
            "https://github.com/acme/foo",
            std::fs::read_to_string(&path).unwrap()
        );

        let gitignore =
            std::fs::read_to_string(dir.path().join("foo/.gitignore")).unwrap();
        assert_eq!(".gitignore\nindex.html", gitignore);
        assert_eq!(
            vec![".gitignore", "index.html"],
            gitignore.lines().collect::<Vec<_>>()
        );
        Ok(())
    }

    #[test]
    fn test_write_package_without_gitignore() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let config = config();
        let renderer = Renderer::embedded()?;
        let writer = Writer {
            config: &config,
            renderer: &renderer,
            output_directory: dir.path(),
            gitignore: false,
        };

        writer.write_package(&package())?;
        assert!(dir.path().join("foo/index.html").exists());
        assert!(!dir.path().join("foo/.gitignore").exists());
        Ok(())
    }

    #[test]
    fn test_write_package_twice_truncates() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let config = config();
        let long = Renderer::new("{{ .Pkg.Name }}{{ .Pkg.Name }}")?;
        let short = Renderer::new("{{ .Pkg.Name }}")?;
        for renderer in &[&long, &short] {
            Writer {
                config: &config,
                renderer,
                output_directory: dir.path(),
                gitignore: true,
            }
            .write_package(&package())?;
        }
        assert_eq!(
            "foo",
            std::fs::read_to_string(dir.path().join("foo/index.html")).unwrap()
        );
        Ok(())
    }

    #[test]
    fn test_write_package_nested_name() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let config = config();
        let renderer = Renderer::embedded()?;
        let writer = Writer {
            config: &config,
            renderer: &renderer,
            output_directory: &dir.path().join("public"),
            gitignore: false,
        };

        let path = writer.write_package(&Package {
            name: "foo/v2".to_owned(),
            repo: "https://github.com/acme/foo".to_owned(),
        })?;
        assert_eq!(dir.path().join("public/foo/v2/index.html"), path);
        Ok(())
    }

    #[test]
    fn test_write_package_absolute_name_stays_in_output() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let config = config();
        let renderer = Renderer::embedded()?;
        let output_directory = dir.path().join("public");
        let writer = Writer {
            config: &config,
            renderer: &renderer,
            output_directory: &output_directory,
            gitignore: true,
        };

        let name = outside.path().join("evil");
        let path = writer.write_package(&Package {
            name: name.to_string_lossy().into_owned(),
            repo: "https://github.com/acme/evil".to_owned(),
        })?;
        assert!(path.starts_with(&output_directory));
        assert!(path.exists());
        assert!(!outside.path().join("evil/index.html").exists());
        assert!(!outside.path().join("evil/.gitignore").exists());
        Ok(())
    }

    #[test]
    fn test_package_dir() {
        let root = Path::new("public");
        assert_eq!(root.join("foo"), package_dir(root, "foo"));
        assert_eq!(root.join("foo/v2"), package_dir(root, "foo/v2"));
        assert_eq!(root.join("foo"), package_dir(root, "/foo"));
        assert_eq!(root.join("foo"), package_dir(root, "./foo/."));
        assert_eq!(root.join("evil"), package_dir(root, "../../evil"));
        assert_eq!(root.join("bar"), package_dir(root, "foo/../bar"));
    }

    #[test]
    fn test_create_dir_fails_under_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("file");
        std::fs::write(&file, "").unwrap();
        match create_dir(&file.join("foo")) {
            Err(Error::CreateDirectory { .. }) => {}
            other => panic!("wanted a create directory error; {:?}", other),
        }
    }
}
