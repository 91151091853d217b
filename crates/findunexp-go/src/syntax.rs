//! Go parsing with Tree-sitter.
//!
//! [`SyntaxTree`] owns one parsed file together with its source text, so
//! nodes handed out by [`SyntaxTree::root`] can always be resolved back to
//! text and positions.

use std::path::{Path, PathBuf};

use findunexp_core::SourcePosition;
use thiserror::Error;
use tree_sitter::{Language, Node, Parser, Tree};

/// Errors from reading or parsing a Go source file.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The file could not be read.
    #[error("{}: {source}", .path.display())]
    Io {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The file contains a syntax error.
    #[error("{}:{line}:{column}: {message}", .path.display())]
    Syntax {
        /// File containing the error.
        path: PathBuf,
        /// Line number (1-indexed).
        line: usize,
        /// Column number (1-indexed).
        column: usize,
        /// Description of the error.
        message: String,
    },

    /// The parser gave up without producing a tree.
    #[error("{}: parser produced no tree", .path.display())]
    Incomplete {
        /// File being parsed.
        path: PathBuf,
    },

    /// The Go grammar is incompatible with the linked Tree-sitter runtime.
    #[error("failed to load Go grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),
}

fn go_language() -> Language {
    tree_sitter_go::LANGUAGE.into()
}

/// Parses `source` without rejecting syntax errors.
pub(crate) fn parse_lenient(source: &str) -> Result<Option<Tree>, tree_sitter::LanguageError> {
    let mut parser = Parser::new();
    parser.set_language(&go_language())?;
    Ok(parser.parse(source, None))
}

/// One parsed Go file.
pub struct SyntaxTree {
    path: PathBuf,
    source: String,
    tree: Tree,
}

impl std::fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("path", &self.path)
            .field("len", &self.source.len())
            .finish_non_exhaustive()
    }
}

impl SyntaxTree {
    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Io`] if the file cannot be read and
    /// [`ParseError::Syntax`] if it is not valid Go.
    pub fn parse_file(path: &Path) -> Result<Self, ParseError> {
        let source = std::fs::read_to_string(path).map_err(|e| ParseError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(path, source)
    }

    /// Parses in-memory source, attributing positions to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Syntax`] at the first error or missing node.
    pub fn parse(path: impl Into<PathBuf>, source: impl Into<String>) -> Result<Self, ParseError> {
        let path = path.into();
        let source = source.into();
        let Some(tree) = parse_lenient(&source)? else {
            return Err(ParseError::Incomplete { path });
        };

        if tree.root_node().has_error() {
            let (node, message) = first_error(tree.root_node(), &source);
            let start = node.start_position();
            return Err(ParseError::Syntax {
                path,
                line: start.row + 1,
                column: start.column + 1,
                message,
            });
        }

        Ok(Self { path, source, tree })
    }

    /// Path the tree was parsed from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Full source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The `source_file` node.
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Source text covered by `node`.
    #[must_use]
    pub fn text(&self, node: &Node<'_>) -> &str {
        self.source.get(node.byte_range()).unwrap_or("")
    }

    /// Start position of `node`.
    #[must_use]
    pub fn position(&self, node: &Node<'_>) -> SourcePosition {
        let start = node.start_position();
        SourcePosition::new(self.path.clone(), start.row + 1, start.column + 1)
            .with_offset(node.start_byte())
    }

    /// Name from the package clause.
    #[must_use]
    pub fn package_name(&self) -> Option<&str> {
        let root = self.root();
        let mut cursor = root.walk();
        let clause = root
            .named_children(&mut cursor)
            .find(|n| n.kind() == "package_clause")?;
        let mut inner = clause.walk();
        let ident = clause
            .named_children(&mut inner)
            .find(|n| n.kind() == "package_identifier")?;
        Some(self.text(&ident))
    }
}

/// Locates the first error or missing node below `node`.
fn first_error<'t>(node: Node<'t>, source: &str) -> (Node<'t>, String) {
    if node.is_missing() {
        return (node, format!("expected {}", node.kind()));
    }
    if node.is_error() {
        let text = source.get(node.byte_range()).unwrap_or("");
        let snippet: String = text.lines().next().unwrap_or("").chars().take(24).collect();
        return (node, format!("syntax error near `{}`", snippet.trim()));
    }

    let mut cursor = node.walk();
    let children: Vec<Node<'t>> = node.children(&mut cursor).collect();
    for child in children {
        if child.has_error() || child.is_missing() {
            return first_error(child, source);
        }
    }
    (node, "syntax error".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_file() {
        let tree = SyntaxTree::parse("a.go", "package a\n\ntype T struct{}\n").unwrap();
        assert_eq!(tree.package_name(), Some("a"));
        assert_eq!(tree.root().kind(), "source_file");
        assert_eq!(tree.path(), Path::new("a.go"));
    }

    #[test]
    fn reports_syntax_error_with_position() {
        let err = SyntaxTree::parse("bad.go", "package a\n\nfunc f( {\n").unwrap_err();
        match &err {
            ParseError::Syntax { path, line, .. } => {
                assert_eq!(path, Path::new("bad.go"));
                assert!(*line >= 3);
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
        assert!(err.to_string().starts_with("bad.go:"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SyntaxTree::parse_file(Path::new("/nonexistent/x.go")).unwrap_err();
        assert!(matches!(err, ParseError::Io { .. }));
    }

    #[test]
    fn positions_are_one_indexed() {
        let tree = SyntaxTree::parse("p.go", "package p\n").unwrap();
        let pos = tree.position(&tree.root());
        assert_eq!((pos.line, pos.column, pos.offset), (1, 1, 0));
    }
}
