//! Lowered view of Go struct types.
//!
//! Tree-sitter exposes an untyped node tree. The matcher and printer work on
//! the closed shapes below instead, so every decision about a field's type is
//! an exhaustive `match`.

use serde::Serialize;
use tree_sitter::Node;

use crate::syntax::SyntaxTree;

/// A syntactic type reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TypeExpr {
    /// `T`
    Ident(String),
    /// `*X`
    Pointer(Box<TypeExpr>),
    /// `pkg.T`
    Qualified {
        /// Package name.
        package: String,
        /// Type name within the package.
        name: String,
    },
    /// `struct { ... }` used as a field type.
    Struct(StructType),
    /// Anything else, kept as source text.
    Other(String),
}

/// One field declaration of a struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    /// Declared names; empty for an embedded field.
    pub names: Vec<String>,
    /// Declared type.
    pub ty: TypeExpr,
    /// Raw tag literal including its quotes.
    pub tag: Option<String>,
    /// Line number (1-indexed).
    pub line: usize,
}

impl Field {
    /// An embedded field has no names.
    #[must_use]
    pub fn is_embedded(&self) -> bool {
        self.names.is_empty()
    }
}

/// A struct type with its fields in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructType {
    /// Fields in declaration order.
    pub fields: Vec<Field>,
}

/// The `type` spec a struct is the direct type of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDecl {
    /// Declared type name.
    pub name: String,
    /// Type parameter list as written, e.g. `[T any]`.
    pub type_params: Option<String>,
    /// `type A = struct{...}` rather than `type A struct{...}`.
    pub alias: bool,
}

/// Go's exportedness rule: the first character is an uppercase letter.
#[must_use]
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

impl StructType {
    /// Lowers a `struct_type` node.
    #[must_use]
    pub fn lower(tree: &SyntaxTree, node: &Node<'_>) -> Self {
        let mut fields = Vec::new();
        let mut cursor = node.walk();
        for list in node.named_children(&mut cursor) {
            if list.kind() != "field_declaration_list" {
                continue;
            }
            let mut list_cursor = list.walk();
            for decl in list.named_children(&mut list_cursor) {
                if decl.kind() == "field_declaration" {
                    fields.push(lower_field(tree, &decl));
                }
            }
        }
        Self { fields }
    }
}

fn lower_field(tree: &SyntaxTree, decl: &Node<'_>) -> Field {
    let mut cursor = decl.walk();
    let names: Vec<String> = decl
        .children_by_field_name("name", &mut cursor)
        .map(|n| tree.text(&n).to_owned())
        .collect();

    // Embedded pointers carry the `*` as a token of the declaration itself.
    let mut cursor = decl.walk();
    let starred = names.is_empty() && decl.children(&mut cursor).any(|c| c.kind() == "*");

    let ty = match decl.child_by_field_name("type") {
        Some(t) => lower_type(tree, &t),
        None => TypeExpr::Other(String::new()),
    };
    let ty = if starred {
        TypeExpr::Pointer(Box::new(ty))
    } else {
        ty
    };

    Field {
        names,
        ty,
        tag: decl
            .child_by_field_name("tag")
            .map(|t| tree.text(&t).to_owned()),
        line: decl.start_position().row + 1,
    }
}

/// Lowers any type node.
#[must_use]
pub fn lower_type(tree: &SyntaxTree, node: &Node<'_>) -> TypeExpr {
    match node.kind() {
        "type_identifier" => TypeExpr::Ident(tree.text(node).to_owned()),
        "pointer_type" => match node.named_child(0) {
            Some(inner) => TypeExpr::Pointer(Box::new(lower_type(tree, &inner))),
            None => TypeExpr::Other(tree.text(node).to_owned()),
        },
        "qualified_type" => {
            match (
                node.child_by_field_name("package"),
                node.child_by_field_name("name"),
            ) {
                (Some(pkg), Some(name)) => TypeExpr::Qualified {
                    package: tree.text(&pkg).to_owned(),
                    name: tree.text(&name).to_owned(),
                },
                _ => TypeExpr::Other(tree.text(node).to_owned()),
            }
        }
        "struct_type" => TypeExpr::Struct(StructType::lower(tree, node)),
        _ => TypeExpr::Other(tree.text(node).to_owned()),
    }
}

/// Returns the type spec `node` is the direct type of, if any.
#[must_use]
pub fn enclosing_decl(tree: &SyntaxTree, node: &Node<'_>) -> Option<TypeDecl> {
    let parent = node.parent()?;
    let alias = match parent.kind() {
        "type_spec" => false,
        "type_alias" => true,
        _ => return None,
    };
    if parent.child_by_field_name("type")?.id() != node.id() {
        return None;
    }
    let name = tree.text(&parent.child_by_field_name("name")?).to_owned();
    let type_params = parent
        .child_by_field_name("type_parameters")
        .map(|p| tree.text(&p).to_owned());
    Some(TypeDecl {
        name,
        type_params,
        alias,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_struct(src: &str) -> StructType {
        let tree = SyntaxTree::parse("t.go", src).unwrap();
        let node = find_kind(tree.root(), "struct_type").unwrap();
        StructType::lower(&tree, &node)
    }

    fn find_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
        if node.kind() == kind {
            return Some(node);
        }
        let mut cursor = node.walk();
        let children: Vec<Node<'t>> = node.named_children(&mut cursor).collect();
        children.into_iter().find_map(|c| find_kind(c, kind))
    }

    #[test]
    fn exportedness_is_first_letter_case() {
        assert!(is_exported("Foo"));
        assert!(!is_exported("foo"));
        assert!(!is_exported("_Foo"));
        assert!(!is_exported(""));
        assert!(is_exported("Ärger"));
    }

    #[test]
    fn lowers_embedded_pointer() {
        let st = first_struct("package p\ntype A struct {\n\t*b\n}\n");
        assert_eq!(st.fields.len(), 1);
        assert!(st.fields[0].is_embedded());
        assert_eq!(
            st.fields[0].ty,
            TypeExpr::Pointer(Box::new(TypeExpr::Ident("b".into())))
        );
        assert_eq!(st.fields[0].line, 3);
    }

    #[test]
    fn lowers_named_and_qualified_fields() {
        let st = first_struct(
            "package p\ntype A struct {\n\tx, y *t\n\tio.Reader\n\tz int `json:\"z\"`\n}\n",
        );
        assert_eq!(st.fields[0].names, vec!["x", "y"]);
        assert_eq!(
            st.fields[0].ty,
            TypeExpr::Pointer(Box::new(TypeExpr::Ident("t".into())))
        );
        assert_eq!(
            st.fields[1].ty,
            TypeExpr::Qualified {
                package: "io".into(),
                name: "Reader".into()
            }
        );
        assert_eq!(st.fields[2].ty, TypeExpr::Ident("int".into()));
        assert_eq!(st.fields[2].tag.as_deref(), Some("`json:\"z\"`"));
    }

    #[test]
    fn lowers_nested_struct_and_other_types() {
        let st = first_struct("package p\ntype A struct {\n\tin struct{ n int }\n\tm map[string]int\n}\n");
        assert!(matches!(st.fields[0].ty, TypeExpr::Struct(_)));
        assert_eq!(st.fields[1].ty, TypeExpr::Other("map[string]int".into()));
    }

    #[test]
    fn enclosing_decl_for_spec_and_alias() {
        let tree =
            SyntaxTree::parse("t.go", "package p\ntype G[T any] struct{ v T }\n").unwrap();
        let node = find_kind(tree.root(), "struct_type").unwrap();
        let decl = enclosing_decl(&tree, &node).unwrap();
        assert_eq!(decl.name, "G");
        assert_eq!(decl.type_params.as_deref(), Some("[T any]"));
        assert!(!decl.alias);

        let tree = SyntaxTree::parse("t.go", "package p\ntype A = struct{}\n").unwrap();
        let node = find_kind(tree.root(), "struct_type").unwrap();
        assert!(enclosing_decl(&tree, &node).unwrap().alias);

        let tree = SyntaxTree::parse("t.go", "package p\nvar v struct{}\n").unwrap();
        let node = find_kind(tree.root(), "struct_type").unwrap();
        assert!(enclosing_decl(&tree, &node).is_none());
    }
}
