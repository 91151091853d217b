//! Reconstruction of matched declarations as Go source.
//!
//! Output follows gofmt layout: tab indentation, one field per line, field
//! names padded to a common column. Comments are not reproduced.

use std::fmt::Write;

use thiserror::Error;

use crate::ast::{Field, StructType, TypeDecl, TypeExpr};
use crate::matcher::EmbeddingMatch;

/// A lowered node could not be turned back into source.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    /// A field has no type text.
    #[error("line {line}: field has an empty type expression")]
    EmptyType {
        /// Line of the field.
        line: usize,
    },

    /// An identifier in a type or field name is empty.
    #[error("line {line}: empty identifier")]
    EmptyIdent {
        /// Line of the field.
        line: usize,
    },
}

/// Renders the declaration of a match.
///
/// Structs declared by a type spec render as `type Name struct {...}`,
/// anonymous ones as a bare `struct {...}`.
///
/// # Errors
///
/// Returns [`RenderError`] if a field cannot be rendered.
pub fn render(m: &EmbeddingMatch) -> Result<String, RenderError> {
    let mut out = String::new();
    if let Some(decl) = &m.decl {
        write_decl_header(decl, &mut out);
    }
    write_struct(&m.node, 0, &mut out)?;
    Ok(out)
}

fn write_decl_header(decl: &TypeDecl, out: &mut String) {
    out.push_str("type ");
    out.push_str(&decl.name);
    if let Some(params) = &decl.type_params {
        out.push_str(params);
    }
    out.push_str(if decl.alias { " = " } else { " " });
}

/// Appends `st` to `out`, with closing brace at `depth` tabs.
///
/// # Errors
///
/// Returns [`RenderError`] if a field cannot be rendered.
pub fn write_struct(st: &StructType, depth: usize, out: &mut String) -> Result<(), RenderError> {
    if st.fields.is_empty() {
        out.push_str("struct{}");
        return Ok(());
    }

    let name_width = st
        .fields
        .iter()
        .map(|f| names_text(f).chars().count())
        .max()
        .unwrap_or(0);

    out.push_str("struct {\n");
    for field in &st.fields {
        push_indent(depth + 1, out);
        write_field(field, name_width, depth + 1, out)?;
        out.push('\n');
    }
    push_indent(depth, out);
    out.push('}');
    Ok(())
}

fn write_field(
    field: &Field,
    name_width: usize,
    depth: usize,
    out: &mut String,
) -> Result<(), RenderError> {
    if field.names.iter().any(String::is_empty) {
        return Err(RenderError::EmptyIdent { line: field.line });
    }
    if !field.is_embedded() {
        let _ = write!(out, "{:<width$} ", names_text(field), width = name_width);
    }
    write_type(&field.ty, field.line, depth, out)?;
    if let Some(tag) = &field.tag {
        out.push(' ');
        out.push_str(tag);
    }
    Ok(())
}

fn write_type(ty: &TypeExpr, line: usize, depth: usize, out: &mut String) -> Result<(), RenderError> {
    match ty {
        TypeExpr::Ident(name) => {
            if name.is_empty() {
                return Err(RenderError::EmptyIdent { line });
            }
            out.push_str(name);
        }
        TypeExpr::Pointer(inner) => {
            out.push('*');
            write_type(inner, line, depth, out)?;
        }
        TypeExpr::Qualified { package, name } => {
            if package.is_empty() || name.is_empty() {
                return Err(RenderError::EmptyIdent { line });
            }
            let _ = write!(out, "{package}.{name}");
        }
        TypeExpr::Struct(st) => write_struct(st, depth, out)?,
        TypeExpr::Other(text) => {
            if text.trim().is_empty() {
                return Err(RenderError::EmptyType { line });
            }
            out.push_str(text);
        }
    }
    Ok(())
}

fn names_text(field: &Field) -> String {
    field.names.join(", ")
}

fn push_indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push('\t');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::find_embedding_matches;
    use crate::syntax::SyntaxTree;
    use findunexp_core::SourcePosition;
    use std::path::PathBuf;

    fn render_first(src: &str) -> String {
        let tree = SyntaxTree::parse("r.go", src).unwrap();
        let m = find_embedding_matches(&tree);
        render(&m[0]).unwrap()
    }

    fn reflag(rendered: &str, decl: bool) -> usize {
        let src = if decl {
            format!("package p\n\n{rendered}\n")
        } else {
            format!("package p\n\nvar _ {rendered}\n")
        };
        let tree = SyntaxTree::parse("again.go", src).unwrap();
        find_embedding_matches(&tree).len()
    }

    #[test]
    fn renders_type_declaration() {
        let out = render_first("package p\ntype A struct{ *b }\n");
        insta::assert_snapshot!(out, @r"
        type A struct {
        	*b
        }
        ");
    }

    #[test]
    fn aligns_field_names() {
        let out = render_first(
            "package p\ntype A struct {\n\t*impl\n\tid int `json:\"id\"`\n\tlong, w string\n\tio.Reader\n}\n",
        );
        assert_eq!(
            out,
            "type A struct {\n\t*impl\n\tid      int `json:\"id\"`\n\tlong, w string\n\tio.Reader\n}"
        );
    }

    #[test]
    fn renders_nested_struct_with_indentation() {
        let out = render_first(
            "package p\ntype A struct {\n\t*a\n\tcfg struct {\n\t\tn int\n\t}\n\tnone struct{}\n}\n",
        );
        assert_eq!(
            out,
            "type A struct {\n\t*a\n\tcfg  struct {\n\t\tn int\n\t}\n\tnone struct{}\n}"
        );
    }

    #[test]
    fn renders_generic_and_alias_headers() {
        let out = render_first("package p\ntype G[T any] struct {\n\t*g\n\tv T\n}\n");
        assert!(out.starts_with("type G[T any] struct {\n"));
        let out = render_first("package p\ntype A = struct{ *a }\n");
        assert!(out.starts_with("type A = struct {\n"));
    }

    #[test]
    fn renders_anonymous_struct_bare() {
        let out = render_first("package p\nvar v struct{ *x }\n");
        assert_eq!(out, "struct {\n\t*x\n}");
    }

    #[test]
    fn rendered_text_is_flagged_again() {
        for src in [
            "package p\ntype A struct{ *b }\n",
            "package p\ntype G[T any] struct {\n\t*g\n\tm map[string]T\n\tf func(int) error\n}\n",
            "package p\ntype A struct {\n\t*a `tag:\"x\"`\n\tin struct{ *b }\n}\n",
        ] {
            assert!(reflag(&render_first(src), true) >= 1, "{src}");
        }
        assert_eq!(reflag(&render_first("package p\nvar v struct{ *x }\n"), false), 1);
    }

    #[test]
    fn empty_type_is_render_error() {
        let m = EmbeddingMatch {
            position: SourcePosition::new(PathBuf::from("x.go"), 1, 1),
            decl: None,
            node: StructType {
                fields: vec![
                    Field {
                        names: vec![],
                        ty: TypeExpr::Pointer(Box::new(TypeExpr::Ident("a".into()))),
                        tag: None,
                        line: 2,
                    },
                    Field {
                        names: vec!["broken".into()],
                        ty: TypeExpr::Other(String::new()),
                        tag: None,
                        line: 3,
                    },
                ],
            },
            embedded: "a".into(),
        };
        assert_eq!(render(&m), Err(RenderError::EmptyType { line: 3 }));
    }
}
