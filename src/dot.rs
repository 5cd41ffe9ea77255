//! Graphviz export of the parse tree
//!
//! Nodes are numbered in pre-order; each node line is followed by the edge from its
//! parent. Render with `dot -Tpng tree.dot -o tree.png`.

use crate::parser::tree::ParseTreeNode;
use std::fmt::Write;

const PREAMBLE: &str = "digraph ParseTree {\n    node [shape=box, fontname=\"Arial\"];\n    edge [arrowhead=vee];\n    rankdir=TB;\n";

/// Serializes the tree rooted at `root` as a DOT digraph.
pub fn to_dot(root: &ParseTreeNode) -> String {
    let mut out = String::from(PREAMBLE);
    let mut counter = 0;
    write_node(&mut out, root, None, &mut counter);
    out.push_str("}\n");
    out
}

fn write_node(out: &mut String, node: &ParseTreeNode, parent: Option<usize>, counter: &mut usize) {
    let id = *counter;
    *counter += 1;

    let mut label = escape(node.label());
    if let Some(value) = node.value.as_deref().filter(|v| !v.is_empty()) {
        label.push_str("\\n");
        label.push_str(&escape(value));
    }
    let _ = writeln!(out, "    node{id} [label=\"{label}\"];");
    if let Some(parent) = parent {
        let _ = writeln!(out, "    node{parent} -> node{id};");
    }

    for child in &node.children {
        write_node(out, child, Some(id), counter);
    }
}

/// Escapes a label for a double-quoted DOT string.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(c),
        }
    }
    escaped
}
