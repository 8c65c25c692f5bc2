//! The command-line surface. All flags are optional; without any, the
//! embedded configuration and template are used and pages are written to
//! `public/` along with `.gitignore` files.

use crate::build::Options;
use clap::{crate_version, App, Arg, ArgMatches};
use std::ffi::OsString;
use std::path::PathBuf;

/// The parsed command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Args {
    /// A configuration file to use instead of the embedded one.
    pub config: Option<PathBuf>,

    /// A template file to use instead of the embedded one.
    pub template: Option<PathBuf>,

    /// The output root.
    pub output_directory: PathBuf,

    /// Whether to write `.gitignore` files.
    pub gitignore: bool,
}

impl Args {
    /// Parses the process arguments, exiting with usage on error.
    pub fn from_env() -> Args {
        Args::from_matches(&app().get_matches())
    }

    /// Parses `args`, where the first element is the program name.
    pub fn try_from_iter<I, T>(args: I) -> clap::Result<Args>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Ok(Args::from_matches(&app().get_matches_from_safe(args)?))
    }

    fn from_matches(matches: &ArgMatches) -> Args {
        Args {
            config: matches.value_of("config").map(PathBuf::from),
            template: matches.value_of("template").map(PathBuf::from),
            output_directory: PathBuf::from(
                matches.value_of("output").unwrap_or("public"),
            ),
            // `--gitignore` without a value means `true`; values were checked
            // by the validator.
            gitignore: matches
                .value_of("gitignore")
                .map(|v| parse_bool(v).unwrap_or(true))
                .unwrap_or(true),
        }
    }

    /// The build options selected by the command line.
    pub fn options(&self) -> Options {
        Options {
            output_directory: self.output_directory.clone(),
            gitignore: self.gitignore,
        }
    }
}

fn app() -> App<'static, 'static> {
    App::new("vanity-pages")
        .version(crate_version!())
        .about("Generates `go get` landing pages for Go vanity import paths")
        .arg(
            Arg::with_name("gitignore")
                .long("gitignore")
                .value_name("BOOL")
                .takes_value(true)
                .min_values(0)
                .max_values(1)
                .require_equals(true)
                .validator(|v| parse_bool(&v).map(|_| ()))
                .help("Generate .gitignore files for each package"),
        )
        .arg(
            Arg::with_name("config")
                .long("config")
                .value_name("FILE")
                .takes_value(true)
                .help("Load the configuration from FILE"),
        )
        .arg(
            Arg::with_name("template")
                .long("template")
                .value_name("FILE")
                .takes_value(true)
                .help("Render pages with the template in FILE"),
        )
        .arg(
            Arg::with_name("output")
                .long("output")
                .value_name("DIR")
                .takes_value(true)
                .default_value("public")
                .help("The directory to write package pages into"),
        )
}

/// Parses a boolean flag value. Accepts the same spellings as Go's
/// `strconv.ParseBool`.
pub fn parse_bool(value: &str) -> Result<bool, String> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(format!("invalid boolean value '{}'", value)),
    }
}
