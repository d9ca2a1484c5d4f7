//! Markup tree and HTML serialization.
//!
//! Views build a [`Node`] tree with plain functions; [`render_to_string`]
//! serializes it and reports the document title set inside the tree.
//!
//! A [`Node::Title`] wraps a subtree and declares the page title while that
//! subtree is mounted. Titles are visited parent-first, so the innermost
//! (last visited) title wins.

use std::fmt::Write;

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// A markup tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Escaped text.
    Text(String),
    /// Siblings without a wrapper element.
    Fragment(Vec<Node>),
    /// Declares the document title for its subtree.
    Title { title: String, child: Box<Node> },
}

/// An HTML element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: &'static str,
    attrs: Vec<(&'static str, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn children<I>(mut self, nodes: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        self.children.extend(nodes.into_iter().map(Into::into));
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Node::Text(text.into()))
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

/// Start an element.
pub fn el(tag: &'static str) -> Element {
    Element {
        tag,
        attrs: Vec::new(),
        children: Vec::new(),
    }
}

pub fn text(text: impl Into<String>) -> Node {
    Node::Text(text.into())
}

pub fn fragment(nodes: Vec<Node>) -> Node {
    Node::Fragment(nodes)
}

/// Wrap `child` so that mounting it sets the document title.
pub fn titled(title: impl Into<String>, child: impl Into<Node>) -> Node {
    Node::Title {
        title: title.into(),
        child: Box::new(child.into()),
    }
}

/// Output of serializing a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub html: String,
    /// Title of the innermost [`Node::Title`], if any was mounted.
    pub title: Option<String>,
}

/// Serialize a tree to HTML.
pub fn render_to_string(node: &Node) -> Rendered {
    let mut out = Rendered {
        html: String::new(),
        title: None,
    };
    write_node(node, &mut out);
    out
}

fn write_node(node: &Node, out: &mut Rendered) {
    match node {
        Node::Text(s) => escape_into(s, &mut out.html),
        Node::Fragment(nodes) => {
            for n in nodes {
                write_node(n, out);
            }
        }
        Node::Title { title, child } => {
            out.title = Some(title.clone());
            write_node(child, out);
        }
        Node::Element(el) => {
            out.html.push('<');
            out.html.push_str(el.tag);
            for (name, value) in &el.attrs {
                let _ = write!(out.html, " {name}=\"");
                escape_into(value, &mut out.html);
                out.html.push('"');
            }
            out.html.push('>');

            if VOID_ELEMENTS.contains(&el.tag) {
                return;
            }
            for child in &el.children {
                write_node(child, out);
            }
            let _ = write!(out.html, "</{}>", el.tag);
        }
    }
}

/// Escape text for HTML content and double-quoted attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_into(s, &mut out);
    out
}

fn escape_into(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
}
