//! Parsed markup: element nodes with ordered attributes and mixed children.

use std::fmt::Write;

/// Elements that never have content or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose text content is emitted without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "style", "script", "xmp", "iframe", "noembed", "noframes", "plaintext", "noscript",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    Element(ElementNode),
    Text(String),
}

impl Child {
    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            Child::Element(el) => Some(el),
            Child::Text(_) => None,
        }
    }

    /// True for text made only of whitespace.
    pub fn is_blank_text(&self) -> bool {
        matches!(self, Child::Text(text) if text.trim().is_empty())
    }
}

/// One element of a parsed document.
///
/// `name` is lowercased; attribute order is document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementNode {
    pub name: String,
    pub attrs: Vec<Attribute>,
    pub children: Vec<Child>,
}

impl ElementNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_lowercase(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push(Attribute::new(name, value));
        self
    }

    pub fn with_element(mut self, child: ElementNode) -> Self {
        self.children.push(Child::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Child::Text(text.into()));
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// No element children and nothing but whitespace text.
    pub fn is_blank(&self) -> bool {
        self.children.iter().all(Child::is_blank_text)
    }

    /// Concatenated text of all descendants.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        collect_text(&self.children, &mut text);
        text
    }

    /// Serialized markup of the children, entities escaped once.
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            write_child(&mut out, child, &self.name);
        }
        out
    }

    /// Serialized markup of the element itself.
    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        write_element(&mut out, self);
        out
    }
}

fn collect_text(children: &[Child], text: &mut String) {
    for child in children {
        match child {
            Child::Text(t) => text.push_str(t),
            Child::Element(el) => collect_text(&el.children, text),
        }
    }
}

fn write_child(out: &mut String, child: &Child, parent: &str) {
    match child {
        Child::Text(text) if RAW_TEXT_ELEMENTS.contains(&parent) => out.push_str(text),
        Child::Text(text) => escape_into(out, text, false),
        Child::Element(el) => write_element(out, el),
    }
}

fn write_element(out: &mut String, el: &ElementNode) {
    let _ = write!(out, "<{}", el.name);
    for attr in &el.attrs {
        let _ = write!(out, " {}=\"", attr.name);
        escape_into(out, &attr.value, true);
        out.push('"');
    }
    out.push('>');
    if VOID_ELEMENTS.contains(&el.name.as_str()) {
        return;
    }
    for child in &el.children {
        write_child(out, child, &el.name);
    }
    let _ = write!(out, "</{}>", el.name);
}

fn escape_into(out: &mut String, text: &str, attr_mode: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attr_mode => out.push_str("&quot;"),
            '<' if !attr_mode => out.push_str("&lt;"),
            '>' if !attr_mode => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}
