//! HTML serializer for element trees.

use std::fmt::Write;

use crate::element::Element;
use crate::parser::{RAW_TEXT_ELEMENTS, VOID_ELEMENTS};

/// Serialize the children of `root` (the wrapper itself is skipped).
pub(crate) fn serialize_children(root: &Element, out: &mut String) {
    out.push_str(&escape_text(&root.text));
    for child in &root.children {
        serialize_node(child, out);
    }
}

/// Serialize a single node recursively, including its tail.
pub(crate) fn serialize_node(node: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&node.tag);
    for (key, value) in &node.attrs {
        write!(out, r#" {}="{}""#, key, escape_attr(value)).unwrap();
    }
    out.push('>');

    if !VOID_ELEMENTS.contains(&node.tag.as_str()) {
        if RAW_TEXT_ELEMENTS.contains(&node.tag.as_str()) {
            out.push_str(&node.text);
        } else {
            out.push_str(&escape_text(&node.text));
        }
        for child in &node.children {
            serialize_node(child, out);
        }
        write!(out, "</{}>", node.tag).unwrap();
    }

    out.push_str(&escape_text(&node.tail));
}

fn escape_text(text: &str) -> String {
    escape_html(text, false)
}

fn escape_attr(text: &str) -> String {
    escape_html(text, true)
}

fn escape_html(text: &str, escape_quotes: bool) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' if escape_quotes => result.push_str("&quot;"),
            _ => result.push(ch),
        }
    }
    result
}
