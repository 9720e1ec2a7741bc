//! Structural rewrites that run before the transform walk.
//!
//! Markdown renderers wrap block-ish elements (images, custom components)
//! into paragraphs. Orphan promotion lifts such an element out of its
//! parent and places it right before that parent. Because this changes
//! the tree above the element, it has to run as its own pass.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::domain::doc::element::{Child, ElementNode};
use crate::domain::error::DomainError;

/// "`parent > element`": an `element` directly inside a `parent`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrphanSelector {
    pub parent: String,
    pub element: String,
}

impl OrphanSelector {
    pub fn new(parent: &str, element: &str) -> Self {
        Self {
            parent: parent.to_lowercase(),
            element: element.to_lowercase(),
        }
    }

    fn matches(&self, parent: &str, element: &str) -> bool {
        self.parent == parent && self.element == element
    }
}

impl FromStr for OrphanSelector {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::Parse {
            message: format!("invalid orphan selector: {s:?} (expected \"parent > element\")"),
        };
        let (parent, element) = s.split_once('>').ok_or_else(invalid)?;
        let (parent, element) = (parent.trim(), element.trim());
        if parent.is_empty() || element.is_empty() || element.contains('>') {
            return Err(invalid());
        }
        Ok(Self::new(parent, element))
    }
}

impl fmt::Display for OrphanSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} > {}", self.parent, self.element)
    }
}

/// Lift every element matching a selector out of its parent.
///
/// Matches are decided against the original parent; a lifted element moves
/// exactly one level up and lands before its former parent, after any
/// previously lifted siblings.
pub fn promote_orphans(children: Vec<Child>, selectors: &[OrphanSelector]) -> Vec<Child> {
    if selectors.is_empty() {
        return children;
    }
    let mut out = Vec::with_capacity(children.len());
    for child in children {
        match child {
            Child::Element(el) => lift(el, selectors, &mut out),
            text => out.push(text),
        }
    }
    out
}

fn lift(mut el: ElementNode, selectors: &[OrphanSelector], out: &mut Vec<Child>) {
    let mut kept = Vec::with_capacity(el.children.len());
    for child in std::mem::take(&mut el.children) {
        match child {
            Child::Element(inner) if selectors.iter().any(|s| s.matches(&el.name, &inner.name)) => {
                debug!("unwrapping <{}> from <{}>", inner.name, el.name);
                lift(inner, selectors, out);
            }
            other => kept.push(other),
        }
    }
    el.children = promote_orphans(kept, selectors);
    out.push(Child::Element(el));
}

/// Remove elements of the given types that are left blank.
///
/// Blank is stricter than CSS `:empty`: whitespace-only text also counts,
/// so `<p> </p>` is removed along with `<p></p>`.
pub fn remove_blank(children: Vec<Child>, types: &[&str]) -> Vec<Child> {
    children
        .into_iter()
        .filter_map(|child| match child {
            Child::Element(el) if types.contains(&el.name.as_str()) && el.is_blank() => {
                debug!("removing blank <{}>", el.name);
                None
            }
            Child::Element(mut el) => {
                el.children = remove_blank(std::mem::take(&mut el.children), types);
                Some(Child::Element(el))
            }
            text => Some(text),
        })
        .collect()
}
