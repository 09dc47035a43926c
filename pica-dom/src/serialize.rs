//! Canonical HTML serialization.
//!
//! One fixed, minified form per subtree: attributes in insertion order and
//! double-quoted, text and attribute values escaped, void elements without
//! end tags, raw-text elements (script, style) unescaped, RCDATA elements
//! (title, textarea) escaping only `&` and `<`, empty foreign content
//! self-closed, `--` in comments defused. Mining compares sibling spans by
//! exactly this form, so it must be deterministic.

use crate::dom::{Document, Element, Namespace, Node};

/// HTML5 void elements - these never have end tags.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Raw text elements - content is not escaped.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// RCDATA elements - only `&` and `<` are escaped.
const RCDATA_ELEMENTS: &[&str] = &["title", "textarea"];

fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| tag.eq_ignore_ascii_case(v))
}

fn is_raw_text_element(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.iter().any(|v| tag.eq_ignore_ascii_case(v))
}

fn is_rcdata_element(tag: &str) -> bool {
    RCDATA_ELEMENTS.iter().any(|v| tag.eq_ignore_ascii_case(v))
}

/// Serialize an element and its subtree to canonical markup.
pub fn serialize_element(elem: &Element) -> String {
    let mut out = String::new();
    write_element(&mut out, elem);
    out
}

/// Serialize a single node to canonical markup.
pub fn serialize_node(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node);
    out
}

/// Serialize a list of sibling nodes to canonical markup.
pub fn serialize_fragment(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(&mut out, node);
    }
    out
}

fn write_text_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn write_rcdata_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            _ => out.push(c),
        }
    }
}

fn write_attr_value_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

fn write_element(out: &mut String, elem: &Element) {
    let tag = elem.tag.as_str();

    out.push('<');
    out.push_str(tag);
    for (name, value) in &elem.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        write_attr_value_escaped(out, value);
        out.push('"');
    }

    if is_void_element(tag) {
        out.push('>');
        return;
    }

    // Empty foreign content self-closes.
    if elem.ns != Namespace::Html && elem.children.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');

    if is_raw_text_element(tag) || is_rcdata_element(tag) {
        let raw = is_raw_text_element(tag);
        for child in &elem.children {
            if let Node::Text(text) = child {
                if raw {
                    out.push_str(text);
                } else {
                    write_rcdata_escaped(out, text);
                }
            }
        }
    } else {
        for child in &elem.children {
            write_node(out, child);
        }
    }

    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Element(elem) => write_element(out, elem),
        Node::Text(text) => write_text_escaped(out, text),
        Node::Comment(text) => {
            // Defuse -- to keep the comment from closing early.
            out.push_str("<!--");
            out.push_str(&text.replace("--", "- -"));
            out.push_str("-->");
        }
    }
}

impl Element {
    /// Canonical markup of this element and its subtree.
    pub fn to_markup(&self) -> String {
        serialize_element(self)
    }
}

impl Document {
    /// Canonical markup of the whole document, DOCTYPE included.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        if let Some(doctype) = &self.doctype {
            out.push_str("<!DOCTYPE ");
            out.push_str(doctype);
            out.push('>');
        }
        write_element(&mut out, &self.root);
        out
    }
}
