//! Package clause and import list of a Go file.

use tree_sitter::Node;

use crate::syntax::parse_lenient;

/// The parts of a file header that decide how a file is categorised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileHeader {
    /// Name from the package clause, if one could be read.
    pub package: Option<String>,
    /// Unquoted import paths.
    pub imports: Vec<String>,
}

impl FileHeader {
    /// Reads the header of `source`. Syntax errors later in the file do not
    /// prevent reading the header.
    #[must_use]
    pub fn read(source: &str) -> Self {
        let Ok(Some(tree)) = parse_lenient(source) else {
            return Self::default();
        };
        let root = tree.root_node();

        let mut header = Self::default();
        let mut cursor = root.walk();
        for node in root.named_children(&mut cursor) {
            match node.kind() {
                "package_clause" => {
                    let mut inner = node.walk();
                    header.package = node
                        .named_children(&mut inner)
                        .find(|n| n.kind() == "package_identifier")
                        .map(|n| text(source, &n).to_owned());
                }
                "import_declaration" => collect_imports(&node, source, &mut header.imports),
                "comment" => {}
                _ => break,
            }
        }
        header
    }

    /// Whether the file imports the pseudo-package `"C"`.
    #[must_use]
    pub fn imports_c(&self) -> bool {
        self.imports.iter().any(|i| i == "C")
    }
}

fn text<'s>(source: &'s str, node: &Node<'_>) -> &'s str {
    source.get(node.byte_range()).unwrap_or("")
}

fn collect_imports(node: &Node<'_>, source: &str, out: &mut Vec<String>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "import_spec" => {
                if let Some(path) = child.child_by_field_name("path") {
                    out.push(unquote(text(source, &path)));
                }
            }
            "import_spec_list" => collect_imports(&child, source, out),
            _ => {}
        }
    }
}

fn unquote(lit: &str) -> String {
    lit.trim_matches(|c| c == '"' || c == '`').to_string()
}
