//! SVG serializer.
//!
//! Pure function over the surface tree: no I/O, deterministic output.
//! Classes are emitted first, then attributes in the order they were set,
//! then a `style` attribute built from the node's styles.

use std::fmt::Write;

use crate::node::NodeId;
use crate::surface::Surface;

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Serializes the whole surface. The root gets the SVG namespace if it has
/// none.
pub fn to_svg(surface: &Surface) -> String {
    let mut out = String::new();
    write_node(surface, surface.root(), true, &mut out);
    out
}

/// Serializes the subtree rooted at `id`; empty for stale handles.
pub fn node_to_svg(surface: &Surface, id: NodeId) -> String {
    let mut out = String::new();
    write_node(surface, id, false, &mut out);
    out
}

fn write_node(surface: &Surface, id: NodeId, is_root: bool, out: &mut String) {
    let Some(node) = surface.node(id) else {
        return;
    };

    out.push('<');
    out.push_str(&node.tag);
    if is_root && node.attr("xmlns").is_none() {
        let _ = write!(out, " xmlns=\"{SVG_NS}\"");
    }
    if !node.classes.is_empty() {
        let _ = write!(out, " class=\"{}\"", xml_escape(&node.classes.join(" ")));
    }
    for (k, v) in &node.attrs {
        let _ = write!(out, " {k}=\"{}\"", xml_escape(v));
    }
    if !node.styles.is_empty() {
        let style = node
            .styles
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join("; ");
        let _ = write!(out, " style=\"{}\"", xml_escape(&style));
    }

    if node.text.is_none() && node.children().is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    if let Some(text) = &node.text {
        out.push_str(&xml_escape(text));
    }
    for child in node.children() {
        write_node(surface, *child, false, out);
    }
    let _ = write!(out, "</{}>", node.tag);
}

/// Escapes the five XML special characters (`&` first).
pub fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
