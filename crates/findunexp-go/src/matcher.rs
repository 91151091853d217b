//! Detection of structs embedding a pointer to an unexported type.
//!
//! The walk is a pre-order depth-first traversal of the whole file, so
//! structs declared inside function bodies, nested in field types or used as
//! composite-literal types are all visited. Each subtree returns its own
//! matches; nothing is accumulated across calls.

use findunexp_core::SourcePosition;
use tree_sitter::Node;

use crate::ast::{enclosing_decl, is_exported, Field, StructType, TypeDecl, TypeExpr};
use crate::syntax::SyntaxTree;

/// A struct type flagged for embedding `*t` with `t` unexported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingMatch {
    /// Position of the `struct` keyword.
    pub position: SourcePosition,
    /// Type spec the struct is declared by, when it is one.
    pub decl: Option<TypeDecl>,
    /// The flagged struct.
    pub node: StructType,
    /// Identifier of the first qualifying embedded field.
    pub embedded: String,
}

impl EmbeddingMatch {
    /// Declared type name, or `None` for an anonymous struct.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        self.decl.as_ref().map(|d| d.name.as_str())
    }
}

/// Returns every struct in `tree` that embeds a pointer to an unexported
/// identifier, in the order the structs are first visited.
#[must_use]
pub fn find_embedding_matches(tree: &SyntaxTree) -> Vec<EmbeddingMatch> {
    collect(tree, tree.root())
}

fn collect(tree: &SyntaxTree, node: Node<'_>) -> Vec<EmbeddingMatch> {
    let mut found = Vec::new();

    if node.kind() == "struct_type" {
        let st = StructType::lower(tree, &node);
        if let Some(ident) = first_unexported_embed(&st) {
            found.push(EmbeddingMatch {
                position: tree.position(&node),
                decl: enclosing_decl(tree, &node),
                embedded: ident.to_owned(),
                node: st,
            });
        }
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        found.extend(collect(tree, child));
    }
    found
}

/// First field of `st` that qualifies; later fields are not inspected.
#[must_use]
pub fn first_unexported_embed(st: &StructType) -> Option<&str> {
    st.fields.iter().find_map(unexported_pointer_embed)
}

/// The identifier `t` if `field` is an embedded `*t` with `t` unexported.
///
/// Qualified pointees (`*pkg.t`) are never flagged: whether a name from
/// another package is visible cannot be decided from syntax alone.
#[must_use]
pub fn unexported_pointer_embed(field: &Field) -> Option<&str> {
    if !field.is_embedded() {
        return None;
    }
    let TypeExpr::Pointer(pointee) = &field.ty else {
        return None;
    };
    match pointee.as_ref() {
        TypeExpr::Ident(name) if !is_exported(name) => Some(name),
        TypeExpr::Ident(_)
        | TypeExpr::Pointer(_)
        | TypeExpr::Qualified { .. }
        | TypeExpr::Struct(_)
        | TypeExpr::Other(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(src: &str) -> Vec<EmbeddingMatch> {
        let tree = SyntaxTree::parse("m.go", src).unwrap();
        find_embedding_matches(&tree)
    }

    #[test]
    fn clean_file_has_no_matches() {
        let m = matches(
            "package p\n\ntype A struct {\n\tB\n\t*C\n\tx *y\n\tio.Reader\n}\n\nfunc f() {}\n",
        );
        assert!(m.is_empty());
    }

    #[test]
    fn flags_unexported_embedded_pointer() {
        let m = matches("package p\n\ntype A struct {\n\t*b\n}\n\ntype b struct{}\n");
        assert_eq!(m.len(), 1);
        assert_eq!(m[0].type_name(), Some("A"));
        assert_eq!(m[0].embedded, "b");
        assert_eq!((m[0].position.line, m[0].position.column), (3, 8));
    }

    #[test]
    fn exported_pointee_is_not_flagged() {
        assert!(matches("package p\ntype B struct {\n\t*C\n}\n").is_empty());
    }

    #[test]
    fn qualified_pointee_is_never_flagged() {
        assert!(matches("package p\ntype A struct {\n\t*pkg.t\n\t*pkg.T\n}\n").is_empty());
    }

    #[test]
    fn named_field_is_never_flagged() {
        assert!(matches("package p\ntype A struct {\n\tx *t\n}\n").is_empty());
    }

    #[test]
    fn non_pointer_embedding_is_not_flagged() {
        assert!(matches("package p\ntype A struct {\n\tt\n}\n").is_empty());
    }

    #[test]
    fn generic_pointee_is_not_flagged() {
        assert!(matches("package p\ntype A struct {\n\t*t[int]\n}\n").is_empty());
    }

    #[test]
    fn node_reported_once_for_several_qualifying_fields() {
        let m = matches("package p\ntype A struct {\n\t*a\n\t*b\n\t*c\n}\n");
        assert_eq!(m.len(), 1);
        assert_eq!(m[0].embedded, "a");
    }

    #[test]
    fn visits_structs_inside_function_bodies() {
        let m = matches("package p\nfunc f() {\n\ttype local struct {\n\t\t*impl\n\t}\n}\n");
        assert_eq!(m.len(), 1);
        assert_eq!(m[0].type_name(), Some("local"));
    }

    #[test]
    fn visits_nested_and_anonymous_structs() {
        let m = matches(
            "package p\ntype Outer struct {\n\tInner struct {\n\t\t*hidden\n\t}\n}\nvar v = struct{ *x }{}\n",
        );
        assert_eq!(m.len(), 2);
        assert!(m[0].decl.is_none());
        assert_eq!(m[0].embedded, "hidden");
        assert_eq!(m[1].embedded, "x");
        assert!(m[0].position.line < m[1].position.line);
    }

    #[test]
    fn outer_struct_flagged_before_inner() {
        let m = matches("package p\ntype A struct {\n\t*a\n\tin struct{ *b }\n}\n");
        assert_eq!(m.len(), 2);
        assert_eq!(m[0].type_name(), Some("A"));
        assert_eq!(m[1].embedded, "b");
    }

    #[test]
    fn results_follow_source_order() {
        let m = matches("package p\ntype Z struct{ *z }\ntype A struct{ *a }\n");
        let names: Vec<_> = m.iter().filter_map(EmbeddingMatch::type_name).collect();
        assert_eq!(names, ["Z", "A"]);
    }
}
