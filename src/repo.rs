//! Completes partial repository references into absolute URLs. A reference may
//! be empty, a bare repository name (`myrepo`), a `user/repo` path, or a full
//! URL. Missing pieces are filled in from the configured default user, the
//! package name, [`DEFAULT_SCHEME`] and [`DEFAULT_HOST`]. Normalization is
//! purely syntactic; nothing is fetched.

use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use std::fmt;
use url::{ParseError, Url};

/// The scheme used for references that don't specify one.
pub const DEFAULT_SCHEME: &str = "https";

/// The host used for references that don't specify one.
pub const DEFAULT_HOST: &str = "github.com";

/// Normalizes the repository reference `raw` for the package `name`.
///
/// * An empty path becomes `{default_user}/{name}`.
/// * A path without a `/` becomes `{default_user}/{raw}`. Note that this uses
///   the raw reference rather than the parsed path.
/// * Any other path is already `user/repo` and is kept as-is.
///
/// The scheme and host default to [`DEFAULT_SCHEME`] and [`DEFAULT_HOST`]
/// respectively. Query and fragment are carried over.
pub fn normalize(raw: &str, name: &str, default_user: &str) -> Result<Url> {
    let reference = Reference::parse(raw)?;

    // The separator check runs on the decoded path, so an escaped `%2F` counts
    // as a `/`.
    let decoded = reference.decoded_path()?;
    let path = if decoded.is_empty() {
        join(default_user, name)
    } else if !decoded.contains('/') {
        join(default_user, raw)
    } else {
        reference.path.to_owned()
    };
    if path.trim_matches('/').is_empty() {
        return Err(Error::EmptyPath);
    }
    let path = match path.starts_with('/') {
        true => path,
        false => format!("/{}", path),
    };

    let scheme = match reference.scheme {
        "" => DEFAULT_SCHEME,
        scheme => scheme,
    };
    let host = match reference.authority {
        "" => DEFAULT_HOST,
        authority => authority,
    };

    let mut url = Url::parse(&format!("{}://{}", scheme, host))?;
    // `set_path` percent-encodes characters that can't appear in a path (e.g.,
    // a `?` carried over from the raw reference).
    url.set_path(&path);
    url.set_query(reference.query);
    url.set_fragment(reference.fragment);
    Ok(url)
}

/// The syntactic components of a raw reference. Unlike [`Url`], a
/// [`Reference`] may be relative (no scheme and no host).
#[derive(Debug, Default, PartialEq, Eq)]
struct Reference<'a> {
    scheme: &'a str,
    authority: &'a str,
    path: &'a str,
    query: Option<&'a str>,
    fragment: Option<&'a str>,
}

impl<'a> Reference<'a> {
    fn parse(raw: &'a str) -> Result<Reference<'a>> {
        if let Some(c) = raw.chars().find(|c| c.is_ascii_control()) {
            return Err(Error::ControlCharacter(c));
        }

        let (rest, fragment) = match raw.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment)),
            None => (raw, None),
        };
        let (rest, query) = match rest.split_once('?') {
            Some((rest, query)) => (rest, Some(query)),
            None => (rest, None),
        };
        let (scheme, rest) = split_scheme(rest)?;

        let (authority, path) = match rest.strip_prefix("//") {
            Some(rest) => match rest.find('/') {
                Some(i) => (Some(&rest[..i]), &rest[i..]),
                None => (Some(rest), ""),
            },
            None => (None, rest),
        };

        if authority.is_none() {
            let rootless = !path.is_empty() && !path.starts_with('/');
            if !scheme.is_empty() && rootless {
                return Err(Error::Opaque(raw.to_owned()));
            }
            let first_segment = path.split('/').next().unwrap_or("");
            if scheme.is_empty() && first_segment.contains(':') {
                return Err(Error::ColonInFirstSegment(raw.to_owned()));
            }
        }

        Ok(Reference {
            scheme,
            authority: authority.unwrap_or(""),
            path,
            query,
            fragment,
        })
    }

    // Percent-decodes the path. Every `%` must start a two-digit hex escape
    // and the decoded bytes must be UTF-8.
    fn decoded_path(&self) -> Result<Cow<'a, str>> {
        let bytes = self.path.as_bytes();
        for (i, b) in bytes.iter().enumerate() {
            if *b == b'%' {
                let escape = bytes.get(i + 1..i + 3);
                match escape {
                    Some([hi, lo])
                        if hi.is_ascii_hexdigit()
                            && lo.is_ascii_hexdigit() => {}
                    _ => {
                        return Err(Error::InvalidEscape(self.path.to_owned()))
                    }
                }
            }
        }
        percent_decode_str(self.path)
            .decode_utf8()
            .map_err(|_| Error::InvalidEscape(self.path.to_owned()))
    }
}

// Splits a leading `scheme:` off of `input`. A scheme is a letter followed by
// letters, digits, `+`, `-` or `.`; anything else before the first `:` means
// there is no scheme.
fn split_scheme(input: &str) -> Result<(&str, &str)> {
    for (i, c) in input.char_indices() {
        match c {
            'a'..='z' | 'A'..='Z' => {}
            '0'..='9' | '+' | '-' | '.' if i > 0 => {}
            ':' if i == 0 => return Err(Error::MissingScheme(input.to_owned())),
            ':' => return Ok((&input[..i], &input[i + 1..])),
            _ => return Ok(("", input)),
        }
    }
    Ok(("", input))
}

// Joins two slash-separated paths and cleans the result: empty and `.`
// segments are dropped and `..` removes the preceding segment.
fn join(head: &str, tail: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in head.split('/').chain(tail.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }
    segments.join("/")
}

/// The result of a fallible normalization.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a repository reference that can't be normalized.
#[derive(Debug)]
pub enum Error {
    /// Returned when the reference contains an ASCII control character.
    ControlCharacter(char),

    /// Returned when the reference begins with `:`.
    MissingScheme(String),

    /// Returned when a relative reference has a `:` in its first path segment
    /// (e.g., scp-style `git@github.com:user/repo`).
    ColonInFirstSegment(String),

    /// Returned when the reference has a scheme but neither an authority nor
    /// an absolute path (e.g., `mailto:someone`).
    Opaque(String),

    /// Returned when the path has a malformed percent-escape or doesn't
    /// decode to UTF-8.
    InvalidEscape(String),

    /// Returned when the reference would normalize to an empty path.
    EmptyPath,

    /// Returned when the reassembled URL is invalid (e.g., a malformed host).
    Url(ParseError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ControlCharacter(c) => write!(
                f,
                "invalid control character {:?} in repository reference",
                c
            ),
            Error::MissingScheme(raw) => {
                write!(f, "'{}': missing protocol scheme", raw)
            }
            Error::ColonInFirstSegment(raw) => {
                write!(f, "'{}': first path segment cannot contain colon", raw)
            }
            Error::Opaque(raw) => {
                write!(f, "'{}': reference has no host or path", raw)
            }
            Error::InvalidEscape(path) => {
                write!(f, "'{}': invalid escape in repository path", path)
            }
            Error::EmptyPath => {
                write!(f, "repository reference has an empty path")
            }
            Error::Url(err) => write!(f, "invalid repository URL: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Url(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ParseError> for Error {
    /// Converts [`ParseError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: ParseError) -> Error {
        Error::Url(err)
    }
}
