//! Untyped DOM value types.
//!
//! A simple Element/Node tree that doesn't enforce content-model rules. It is
//! the shape documents arrive in for mining: built programmatically here, or
//! converted from whatever parser the caller uses. Attributes keep insertion
//! order so canonical serialization is deterministic.

use compact_str::CompactString;
use indexmap::IndexMap;

/// XML/HTML namespace for elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Namespace {
    /// HTML namespace (default)
    #[default]
    Html,
    /// SVG namespace
    Svg,
    /// MathML namespace
    MathMl,
}

impl Namespace {
    /// Returns the namespace URI.
    pub fn uri(&self) -> &'static str {
        match self {
            Namespace::Html => "http://www.w3.org/1999/xhtml",
            Namespace::Svg => "http://www.w3.org/2000/svg",
            Namespace::MathMl => "http://www.w3.org/1998/Math/MathML",
        }
    }
}

/// DOM content - either an element, text, or comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// An element node
    Element(Element),
    /// A text node
    Text(CompactString),
    /// A comment node
    Comment(CompactString),
}

impl Node {
    /// Returns true if this is an element node.
    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    /// Get as element reference.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get as text reference.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Get text content of this node and all descendants.
    pub fn text_content(&self) -> CompactString {
        match self {
            Node::Text(t) => t.clone(),
            Node::Comment(_) => CompactString::default(),
            Node::Element(e) => e.text_content(),
        }
    }
}

/// An HTML/SVG/MathML element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// The tag name (lowercase for HTML, case-preserved for SVG/MathML)
    pub tag: CompactString,
    /// The namespace (Html, Svg, or MathMl)
    pub ns: Namespace,
    /// Attributes as key-value pairs (preserves insertion order)
    pub attrs: IndexMap<CompactString, CompactString>,
    /// Child nodes
    pub children: Vec<Node>,
}

impl Element {
    /// Create a new element with the given tag name in the HTML namespace.
    pub fn new(tag: impl Into<CompactString>) -> Self {
        Self {
            tag: tag.into(),
            ns: Namespace::Html,
            attrs: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Create a new element with namespace.
    pub fn with_namespace(tag: impl Into<CompactString>, ns: Namespace) -> Self {
        Self {
            ns,
            ..Self::new(tag)
        }
    }

    /// Get an attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(|v| v.as_str())
    }

    /// Set an attribute value.
    pub fn set_attr(&mut self, name: impl Into<CompactString>, value: impl Into<CompactString>) {
        self.attrs.insert(name.into(), value.into());
    }

    /// Add a child node.
    pub fn push_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Add a text child.
    pub fn push_text(&mut self, text: impl Into<CompactString>) {
        self.children.push(Node::Text(text.into()));
    }

    /// Add an element child.
    pub fn push_element(&mut self, element: Element) {
        self.children.push(Node::Element(element));
    }

    /// The element children, in document order. Text and comment children
    /// don't take part in the structural child model the miner sees.
    pub fn element_children(&self) -> impl Iterator<Item = &Element> + '_ {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Number of element children.
    pub fn element_child_count(&self) -> usize {
        self.element_children().count()
    }

    /// Get text content of this element and all descendants.
    pub fn text_content(&self) -> CompactString {
        let mut out = String::new();
        self.collect_text(&mut out);
        out.into()
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => e.collect_text(out),
                Node::Comment(_) => {}
            }
        }
    }
}

/// A complete document: an optional DOCTYPE plus the root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// The DOCTYPE declaration (e.g., "html" for `<!DOCTYPE html>`)
    pub doctype: Option<CompactString>,
    /// The root element
    pub root: Element,
}

impl Document {
    /// Create a new document with the given root element.
    pub fn new(root: Element) -> Self {
        Self {
            doctype: None,
            root,
        }
    }

    /// Get the body element if present.
    pub fn body(&self) -> Option<&Element> {
        self.root.element_children().find(|e| e.tag == "body")
    }
}
