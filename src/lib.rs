//! The library code for `vanity-pages`, which generates static landing pages
//! for Go vanity import paths. Each page carries the `go-import` meta tag that
//! `go get` uses to find a package's repository, plus a redirect for humans.
//!
//! The work is a single pass over the configured packages:
//!
//! 1. Loading the configuration ([`crate::config`])
//! 2. Normalizing each package's repository reference into a URL
//!    ([`crate::repo`])
//! 3. Rendering the page template ([`crate::render`]) and writing the result
//!    to `{output}/{package_name}/index.html` ([`crate::write`])
//!
//! [`crate::build`] drives the steps for every package. A package that fails
//! is reported and skipped; the remaining packages are still generated and
//! the failures are returned together at the end.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod cli;
pub mod config;
pub mod logging;
pub mod render;
pub mod repo;
pub mod write;
