//! Picks and parses the one file analyzed per package.

use findunexp_core::PackageDescriptor;
use tracing::debug;

use crate::syntax::{ParseError, SyntaxTree};

/// Result of selecting a package's representative file.
#[derive(Debug)]
pub enum FileSelection {
    /// The first candidate parsed cleanly.
    Parsed(SyntaxTree),
    /// The first candidate could not be read or parsed.
    ParseFailure(ParseError),
    /// The package has no candidate files.
    NoFile,
}

/// Parses the first file of `pkg` in priority order (ordinary, test,
/// external test, cgo). Later files are never looked at.
#[must_use]
pub fn select_and_parse(pkg: &PackageDescriptor) -> FileSelection {
    let Some(path) = pkg.first_candidate() else {
        debug!("{}: no candidate files", pkg.import_path);
        return FileSelection::NoFile;
    };
    debug!("{}: parsing {}", pkg.import_path, path.display());
    match SyntaxTree::parse_file(&path) {
        Ok(tree) => FileSelection::Parsed(tree),
        Err(e) => FileSelection::ParseFailure(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn package(dir: &TempDir) -> PackageDescriptor {
        PackageDescriptor::new("example.com/p".into(), dir.path())
    }

    #[test]
    fn empty_package_selects_nothing() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(select_and_parse(&package(&tmp)), FileSelection::NoFile));
    }

    #[test]
    fn parses_first_ordinary_file_only() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.go"), "package p\n").unwrap();
        fs::write(tmp.path().join("b.go"), "package p\nfunc (\n").unwrap();
        let mut pkg = package(&tmp);
        pkg.go_files = vec!["a.go".into(), "b.go".into()];

        match select_and_parse(&pkg) {
            FileSelection::Parsed(tree) => assert!(tree.path().ends_with("a.go")),
            other => panic!("expected Parsed, got {other:?}"),
        }
    }

    #[test]
    fn falls_back_to_test_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("p_test.go"), "package p\n").unwrap();
        let mut pkg = package(&tmp);
        pkg.test_go_files = vec!["p_test.go".into()];

        match select_and_parse(&pkg) {
            FileSelection::Parsed(tree) => assert!(tree.path().ends_with("p_test.go")),
            other => panic!("expected Parsed, got {other:?}"),
        }
    }

    #[test]
    fn syntax_error_is_parse_failure() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.go"), "package p\ntype T struct {\n").unwrap();
        let mut pkg = package(&tmp);
        pkg.go_files = vec!["a.go".into()];

        match select_and_parse(&pkg) {
            FileSelection::ParseFailure(e) => assert!(e.to_string().contains("a.go:")),
            other => panic!("expected ParseFailure, got {other:?}"),
        }
    }
}
