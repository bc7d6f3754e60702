//! Error types for license-expr.
//!
//! Parse errors carry the offending character range and the original input so
//! callers can render caret-style diagnostics. Policy errors are raised while
//! assembling a [`CompatibilityPolicy`](crate::license::compatibility::CompatibilityPolicy),
//! never during evaluation.

use std::ops::Range;
use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level error for library operations that touch configuration or input files.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Policy(#[from] PolicyConfigurationError),

    #[error(transparent)]
    Unresolved(#[from] UnresolvedLicenseError),

    /// IO errors with the path that was being read
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Malformed XML: {0}")]
    Xml(String),

    #[error("Unsupported input file {0:?}: expected a POM or a MANIFEST.MF")]
    UnsupportedInput(PathBuf),
}

/// A malformed license expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}\n{input}\n{}", caret_line(.input, .range))]
pub struct ParseError {
    pub message: String,
    /// Byte range of the offending token within `input`.
    pub range: Range<usize>,
    pub input: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>, range: Range<usize>, input: &str) -> Self {
        Self {
            message: message.into(),
            range,
            input: input.to_string(),
        }
    }

    /// The offending slice of the input.
    pub fn token(&self) -> &str {
        self.input.get(self.range.clone()).unwrap_or_default()
    }
}

/// Carets under `range`, measured in characters so multi-byte input lines up.
fn caret_line(input: &str, range: &Range<usize>) -> String {
    let offset = input.get(..range.start).map_or(range.start, |s| s.chars().count());
    let width = input
        .get(range.clone())
        .map_or(range.len(), |s| s.chars().count())
        .max(1);
    format!("{}{}", " ".repeat(offset), "^".repeat(width))
}

/// Two policy registrations that cannot coexist.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PolicyConfigurationError {
    #[error("Policy entries `{first}` and `{second}` both cover `{leaf}` after expansion")]
    Overlap {
        leaf: String,
        first: String,
        second: String,
    },

    #[error("Policy entry `{key}` is registered more than once")]
    DuplicateKey { key: String },
}

/// Classification found no candidate above the similarity threshold.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Unable to resolve license `{title}`{}", describe_candidate(.best_candidate))]
pub struct UnresolvedLicenseError {
    pub title: String,
    /// Best scoring candidate and its similarity in `0.0..=1.0`, if any matched at all.
    pub best_candidate: Option<(String, f64)>,
}

fn describe_candidate(candidate: &Option<(String, f64)>) -> String {
    match candidate {
        Some((id, score)) => format!(" (closest: {} at {:.0}%)", id, score * 100.0),
        None => String::new(),
    }
}
