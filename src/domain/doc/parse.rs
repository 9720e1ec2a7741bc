//! Markup parsing
//!
//! Uses html5ever's RcDom and converts the `<body>` contents into our
//! element tree. Tag and attribute names come out lowercased.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use tracing::{debug, instrument};

use crate::domain::doc::element::{Attribute, Child, ElementNode};
use crate::domain::error::{DomainError, DomainResult};

/// Parse a markup fragment into the children of an implicit `<body>`.
#[instrument(level = "debug", skip(markup), fields(len = markup.len()))]
pub fn parse_fragment(markup: &str) -> DomainResult<Vec<Child>> {
    let dom = parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut markup.as_bytes())
        .map_err(|e| DomainError::Parse {
            message: e.to_string(),
        })?;

    let body = find_element(&dom.document, "body").ok_or_else(|| DomainError::Parse {
        message: "document has no body".to_string(),
    })?;

    let children = convert_children(&body);
    debug!("parsed {} top-level nodes", children.len());
    Ok(children)
}

/// Depth-first search for the first element called `name`.
fn find_element(handle: &Handle, name: &str) -> Option<Handle> {
    if let NodeData::Element { name: qual, .. } = &handle.data {
        if qual.local.as_ref() == name {
            return Some(handle.clone());
        }
    }
    handle
        .children
        .borrow()
        .iter()
        .find_map(|child| find_element(child, name))
}

fn convert_children(handle: &Handle) -> Vec<Child> {
    handle
        .children
        .borrow()
        .iter()
        .filter_map(convert_node)
        .collect()
}

fn convert_node(handle: &Handle) -> Option<Child> {
    match &handle.data {
        NodeData::Text { contents } => Some(Child::Text(contents.borrow().to_string())),
        NodeData::Element { name, attrs, .. } => {
            let attrs = attrs
                .borrow()
                .iter()
                .map(|attr| Attribute::new(attr.name.local.to_string(), attr.value.to_string()))
                .collect();
            Some(Child::Element(ElementNode {
                name: name.local.to_lowercase(),
                attrs,
                children: convert_children(handle),
            }))
        }
        // Comments, doctypes and processing instructions carry no content
        _ => None,
    }
}
