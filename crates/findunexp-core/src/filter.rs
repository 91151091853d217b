//! Import-path gating and resolution-error classification.

use miette::Diagnostic;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::package::{ImportPath, PackageDescriptor, ResolveError};

/// Pattern that matches every import path.
pub const MATCH_ALL: &str = ".*";

/// The import pattern could not be compiled.
#[derive(Debug, Error, Diagnostic)]
#[error("invalid import pattern `{pattern}`")]
#[diagnostic(
    code(findunexp::invalid_pattern),
    help("the pattern uses Rust `regex` syntax and is matched anywhere in the import path")
)]
pub struct PatternError {
    /// The pattern as given.
    pub pattern: String,
    /// Underlying regex error.
    #[source]
    pub source: regex::Error,
}

/// Outcome of classifying one discovered package.
#[derive(Debug)]
pub enum Verdict {
    /// Hand the descriptor to file selection.
    Proceed(PackageDescriptor),
    /// Skip without output.
    SkipSilently,
    /// Skip and print the message.
    SkipWithMessage(String),
}

/// Decides which packages are analyzed.
///
/// Holds the compiled import pattern; construct once per run.
#[derive(Debug, Clone)]
pub struct PackageFilter {
    pattern: Regex,
}

impl PackageFilter {
    /// Creates a filter from an already compiled pattern.
    #[must_use]
    pub fn new(pattern: Regex) -> Self {
        Self { pattern }
    }

    /// Compiles `pattern` into a filter.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] if the pattern is not a valid regex.
    pub fn from_pattern(pattern: &str) -> Result<Self, PatternError> {
        Regex::new(pattern)
            .map(Self::new)
            .map_err(|source| PatternError {
                pattern: pattern.to_owned(),
                source,
            })
    }

    /// Returns the source text of the compiled pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Whether the import path matches the pattern anywhere.
    #[must_use]
    pub fn should_process(&self, path: &ImportPath) -> bool {
        self.pattern.is_match(path.as_str())
    }

    /// Classifies the resolution outcome of `path`.
    ///
    /// A path that fails the pattern is skipped silently no matter what
    /// resolution produced.
    #[must_use]
    pub fn classify(
        &self,
        path: &ImportPath,
        outcome: Result<PackageDescriptor, ResolveError>,
    ) -> Verdict {
        if !self.should_process(path) {
            return Verdict::SkipSilently;
        }
        match outcome {
            Ok(pkg) => Verdict::Proceed(pkg),
            Err(e) if e.is_no_sources() => {
                debug!("Skipping {}: {}", path, e);
                Verdict::SkipSilently
            }
            Err(e) => Verdict::SkipWithMessage(e.to_string()),
        }
    }
}
