//! Package model and the discovery seam.
//!
//! A [`PackageSource`] enumerates every import path reachable from a build
//! context and resolves each one to a [`PackageDescriptor`]. The scanner only
//! ever talks to this trait, so tests can feed it synthetic packages.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Opaque identifier of a package within the build universe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImportPath(String);

impl ImportPath {
    /// Creates an import path from its textual form.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImportPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImportPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ImportPath {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Resolved view of an import path.
///
/// File names are relative to [`dir`](Self::dir) and each list keeps the
/// order the resolver produced (sorted by name for the filesystem resolver).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageDescriptor {
    /// Import path this descriptor was resolved from.
    pub import_path: ImportPath,
    /// Package name from the package clause of the ordinary files.
    pub name: String,
    /// Directory containing the package sources.
    pub dir: PathBuf,
    /// Ordinary `.go` files.
    pub go_files: Vec<String>,
    /// `_test.go` files in the same package.
    pub test_go_files: Vec<String>,
    /// `_test.go` files in the external `<name>_test` package.
    pub xtest_go_files: Vec<String>,
    /// Files that import `"C"`.
    pub cgo_files: Vec<String>,
}

impl PackageDescriptor {
    /// Creates an empty descriptor rooted at `dir`.
    #[must_use]
    pub fn new(import_path: ImportPath, dir: impl Into<PathBuf>) -> Self {
        Self {
            import_path,
            dir: dir.into(),
            ..Self::default()
        }
    }

    /// File names in selection priority order: ordinary, test, external
    /// test, then cgo files.
    pub fn candidate_files(&self) -> impl Iterator<Item = &str> {
        self.go_files
            .iter()
            .chain(&self.test_go_files)
            .chain(&self.xtest_go_files)
            .chain(&self.cgo_files)
            .map(String::as_str)
    }

    /// Full path of the highest-priority file, if the package has any.
    #[must_use]
    pub fn first_candidate(&self) -> Option<PathBuf> {
        self.candidate_files().next().map(|name| self.dir.join(name))
    }

    /// Total number of files across all categories.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.go_files.len()
            + self.test_go_files.len()
            + self.xtest_go_files.len()
            + self.cgo_files.len()
    }
}

/// Errors produced while enumerating or resolving packages.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Directory holds nothing compilable for this build context.
    #[error("{}", no_sources_message(.dir, .excluded))]
    NoSources {
        /// Package directory.
        dir: PathBuf,
        /// Whether build constraints removed every Go file.
        excluded: bool,
    },

    /// No root contains the import path.
    #[error("cannot find package {path:?} in any of:{}", list_dirs(.searched))]
    NotFound {
        /// Requested import path.
        path: String,
        /// Directories that were searched.
        searched: Vec<PathBuf>,
    },

    /// Ordinary files disagree on the package name.
    #[error("found packages {first} ({first_file}) and {second} ({second_file}) in {}", .dir.display())]
    MultiplePackages {
        /// Package directory.
        dir: PathBuf,
        /// First package name seen.
        first: String,
        /// File declaring the first name.
        first_file: String,
        /// Conflicting package name.
        second: String,
        /// File declaring the conflicting name.
        second_file: String,
    },

    /// IO failure reading a directory or file.
    #[error("{}: {source}", .path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

impl ResolveError {
    /// Returns true for the benign "no compilable sources" kind.
    #[must_use]
    pub fn is_no_sources(&self) -> bool {
        matches!(self, Self::NoSources { .. })
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn no_sources_message(dir: &Path, excluded: &bool) -> String {
    if *excluded {
        format!("build constraints exclude all Go files in {}", dir.display())
    } else {
        format!("no buildable Go source files in {}", dir.display())
    }
}

fn list_dirs(dirs: &[PathBuf]) -> String {
    dirs.iter()
        .map(|d| format!("\n\t{}", d.display()))
        .collect()
}

/// Discovery mechanism: enumerates import paths and resolves them.
pub trait PackageSource {
    /// Calls `visit` once per discovered import path, in discovery order.
    ///
    /// The second argument carries an error when the path could not be
    /// enumerated cleanly (e.g. an unreadable directory).
    fn for_each_package(&self, visit: &mut dyn FnMut(ImportPath, Option<ResolveError>));

    /// Resolves an import path to its file lists.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NoSources`] when nothing is buildable, or
    /// another variant when resolution genuinely failed.
    fn resolve(&self, path: &ImportPath) -> Result<PackageDescriptor, ResolveError>;
}
