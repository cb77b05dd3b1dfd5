//! S-expression rendering.
//!
//! Only named nodes are written, plus missing nodes of any kind:
//!
//! ```text
//! (block_expression name: (block_name) (argument (variable_reference (path))) (MISSING "}}"))
//! ```

use std::fmt::Write;

use crate::Node;

pub(crate) fn to_sexp(node: Node<'_>) -> String {
    let mut out = String::new();
    write_node(node, None, &mut out);
    out
}

fn write_node(node: Node<'_>, field: Option<&str>, out: &mut String) {
    if let Some(field) = field {
        let _ = write!(out, "{field}: ");
    }
    if node.is_missing() {
        if node.is_named() {
            let _ = write!(out, "(MISSING {})", node.kind());
        } else {
            let _ = write!(out, "(MISSING \"{}\")", node.kind());
        }
        return;
    }
    if node.is_named() {
        let _ = write!(out, "({}", node.kind());
    } else {
        let _ = write!(out, "(\"{}\"", node.kind());
    }
    for (index, child) in node.children().enumerate() {
        if child.is_named() || child.is_missing() {
            out.push(' ');
            write_node(child, node.field_name_for_child(index), out);
        }
    }
    out.push(')');
}
