//! Drives one run: discovery, filtering, parsing, matching and reporting.

use std::io::{self, Write};

use findunexp_core::{ImportPath, PackageFilter, PackageSource, PatternError, ResolveError, Verdict};
use miette::Diagnostic;
use thiserror::Error;
use tracing::{debug, info};

use crate::matcher::find_embedding_matches;
use crate::report::Reporter;
use crate::selector::{select_and_parse, FileSelection};

/// Fatal errors raised before any package is processed.
#[derive(Debug, Error, Diagnostic)]
pub enum ScanError {
    /// The import pattern does not compile.
    #[error(transparent)]
    #[diagnostic(transparent)]
    InvalidPattern(#[from] PatternError),
}

/// Counters collected over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Import paths produced by discovery.
    pub packages_seen: usize,
    /// Import paths that passed the pattern.
    pub packages_matched: usize,
    /// Packages whose selected file was parsed.
    pub packages_scanned: usize,
    /// Structs reported.
    pub matches: usize,
    /// Packages skipped with a message.
    pub errors: usize,
    /// Matches whose source could not be reconstructed.
    pub render_failures: usize,
}

/// Sequential scanner over a [`PackageSource`].
pub struct Scanner<S, W: Write> {
    filter: PackageFilter,
    source: S,
    reporter: Reporter<W>,
}

impl<S: PackageSource, W: Write> Scanner<S, W> {
    /// Compiles `pattern` and creates a scanner.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidPattern`] if the pattern is malformed.
    pub fn new(pattern: &str, source: S, reporter: Reporter<W>) -> Result<Self, ScanError> {
        let filter = PackageFilter::from_pattern(pattern)?;
        Ok(Self::with_filter(filter, source, reporter))
    }

    /// Creates a scanner from an already compiled filter.
    pub fn with_filter(filter: PackageFilter, source: S, reporter: Reporter<W>) -> Self {
        Self {
            filter,
            source,
            reporter,
        }
    }

    /// Consumes the scanner, returning its reporter.
    pub fn into_reporter(self) -> Reporter<W> {
        self.reporter
    }

    /// Visits every discovered package once, in discovery order.
    ///
    /// Per-package failures are reported to the output and do not stop the
    /// run.
    ///
    /// # Errors
    ///
    /// Returns the first error from writing to the output; no further
    /// packages are processed after it.
    pub fn run(&mut self) -> io::Result<ScanSummary> {
        let filter = &self.filter;
        let source = &self.source;
        let reporter = &mut self.reporter;

        let mut summary = ScanSummary::default();
        let mut failed: Option<io::Error> = None;

        info!("Scanning packages matching `{}`", filter.pattern());
        source.for_each_package(&mut |path, err| {
            if failed.is_some() {
                return;
            }
            summary.packages_seen += 1;
            if let Err(e) = scan_package(filter, source, reporter, &mut summary, &path, err) {
                failed = Some(e);
            }
        });

        if let Some(e) = failed {
            return Err(e);
        }
        summary.render_failures = reporter.render_failures();
        info!(
            "Scanned {} of {} packages ({} matched pattern): {} structs, {} errors",
            summary.packages_scanned,
            summary.packages_seen,
            summary.packages_matched,
            summary.matches,
            summary.errors,
        );
        Ok(summary)
    }
}

fn scan_package<S: PackageSource, W: Write>(
    filter: &PackageFilter,
    source: &S,
    reporter: &mut Reporter<W>,
    summary: &mut ScanSummary,
    path: &ImportPath,
    err: Option<ResolveError>,
) -> io::Result<()> {
    if !filter.should_process(path) {
        return Ok(());
    }
    summary.packages_matched += 1;

    let outcome = match err {
        Some(e) => Err(e),
        None => source.resolve(path),
    };
    let pkg = match filter.classify(path, outcome) {
        Verdict::Proceed(pkg) => pkg,
        Verdict::SkipSilently => return Ok(()),
        Verdict::SkipWithMessage(message) => {
            debug!("Skipping {}: {}", path, message);
            summary.errors += 1;
            return reporter.message(&message);
        }
    };

    match select_and_parse(&pkg) {
        FileSelection::NoFile => Ok(()),
        FileSelection::ParseFailure(e) => {
            summary.errors += 1;
            reporter.message(&e.to_string())?;
            reporter.message("aborting package")
        }
        FileSelection::Parsed(tree) => {
            summary.packages_scanned += 1;
            let matches = find_embedding_matches(&tree);
            debug!("{}: {} matching structs", path, matches.len());
            for m in &matches {
                reporter.report(m)?;
            }
            summary.matches += matches.len();
            Ok(())
        }
    }
}
