//! Document transformer
//!
//! Pipeline, strictly in this order:
//! 1. parse markup into element nodes
//! 2. promote orphans out of their wrapping parents
//! 3. remove elements left blank by step 2
//! 4. walk the tree children-first, resolving pseudo custom elements and
//!    handing every element to the registry
//!
//! A `<div>` whose first attribute names a registered type is treated as
//! that type, so `<div ColorCard color="red">` renders like
//! `<ColorCard color="red">`. A registered literal tag always wins.

use tracing::{debug, instrument, warn};

use crate::domain::doc::element::{Attribute, Child, ElementNode};
use crate::domain::doc::orphan::{promote_orphans, remove_blank, OrphanSelector};
use crate::domain::doc::parse::parse_fragment;
use crate::domain::doc::registry::{Fragment, Props, TransformRegistry};
use crate::domain::error::DomainResult;

/// Generic container that may stand in for a custom element.
pub const PSEUDO_CONTAINER: &str = "div";

/// Called for elements without a registered render function.
pub type FallbackFn<R> = Box<dyn Fn(&str, Props, Vec<Fragment<R>>) -> R + Send + Sync>;

/// Decides whether an element type's content is kept verbatim.
pub type PreformattedFn = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Caller supplied knobs for one transformer.
pub struct TransformOptions<R> {
    pub orphans: Vec<OrphanSelector>,
    /// Element types removed when blank after orphan promotion
    pub blank_cleanup: Vec<String>,
    pub is_preformatted: Option<PreformattedFn>,
    pub no_transform: Option<FallbackFn<R>>,
}

impl<R> Default for TransformOptions<R> {
    fn default() -> Self {
        Self {
            orphans: Vec::new(),
            blank_cleanup: vec!["p".to_string()],
            is_preformatted: None,
            no_transform: None,
        }
    }
}

impl<R> TransformOptions<R> {
    pub fn with_orphans(mut self, orphans: impl IntoIterator<Item = OrphanSelector>) -> Self {
        self.orphans.extend(orphans);
        self
    }

    pub fn with_preformatted<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.is_preformatted = Some(Box::new(predicate));
        self
    }

    pub fn with_fallback<F>(mut self, fallback: F) -> Self
    where
        F: Fn(&str, Props, Vec<Fragment<R>>) -> R + Send + Sync + 'static,
    {
        self.no_transform = Some(Box::new(fallback));
        self
    }

    fn preformatted(&self, element_type: &str) -> bool {
        self.is_preformatted
            .as_ref()
            .is_some_and(|predicate| predicate(element_type))
    }
}

/// Registry plus options; immutable while transforming.
pub struct DocumentTransformer<R, C = ()> {
    registry: TransformRegistry<R, C>,
    options: TransformOptions<R>,
}

impl<R, C> DocumentTransformer<R, C> {
    pub fn new(registry: TransformRegistry<R, C>, options: TransformOptions<R>) -> Self {
        Self { registry, options }
    }

    pub fn registry(&self) -> &TransformRegistry<R, C> {
        &self.registry
    }

    pub fn options(&self) -> &TransformOptions<R> {
        &self.options
    }

    /// Parse `markup` and transform it into render output.
    ///
    /// Fails only if the markup cannot be read; unknown element types are
    /// handled by the fallback or dropped.
    #[instrument(level = "debug", skip_all, fields(len = markup.len()))]
    pub fn transform(&self, markup: &str, context: &C) -> DomainResult<Vec<Fragment<R>>> {
        let children = parse_fragment(markup)?;
        Ok(self.transform_children(children, context))
    }

    /// Run orphan promotion, cleanup and the recursive walk on parsed nodes.
    pub fn transform_children(&self, children: Vec<Child>, context: &C) -> Vec<Fragment<R>> {
        let children = promote_orphans(children, &self.options.orphans);
        let cleanup: Vec<&str> = self.options.blank_cleanup.iter().map(String::as_str).collect();
        let children = remove_blank(children, &cleanup);

        children
            .iter()
            .flat_map(|child| self.transform_child(child, context))
            .collect()
    }

    fn transform_child(&self, child: &Child, context: &C) -> Vec<Fragment<R>> {
        match child {
            // Single spaces separate inline elements; other blank text is noise
            Child::Text(text) if text.trim().is_empty() && text != " " => Vec::new(),
            Child::Text(text) => vec![Fragment::Text(text.clone())],
            Child::Element(el) => self.transform_element(el, context),
        }
    }

    /// Element type and the attributes that become props.
    fn resolve_type<'e>(&self, el: &'e ElementNode) -> (String, &'e [Attribute]) {
        if self.registry.contains(&el.name) {
            return (el.name.clone(), &el.attrs);
        }
        if el.name == PSEUDO_CONTAINER {
            if let Some(first) = el.attrs.first() {
                if self.registry.contains(&first.name) {
                    return (first.name.to_lowercase(), &el.attrs[1..]);
                }
                debug!("unknown custom element {}", first.name);
            }
        }
        (el.name.clone(), &el.attrs)
    }

    fn transform_element(&self, el: &ElementNode, context: &C) -> Vec<Fragment<R>> {
        let (element_type, attrs) = self.resolve_type(el);
        let props: Props = attrs
            .iter()
            .map(|a| (a.name.clone(), a.value.clone()))
            .collect();

        let children = if self.options.preformatted(&element_type) {
            let inner = el.inner_html();
            if inner.is_empty() {
                Vec::new()
            } else {
                vec![Fragment::Text(inner)]
            }
        } else {
            let mut children: Vec<_> = el
                .children
                .iter()
                .flat_map(|child| self.transform_child(child, context))
                .collect();
            if children.is_empty() {
                let text = el.text_content();
                if !text.is_empty() {
                    children.push(Fragment::Text(text));
                }
            }
            children
        };

        if let Some(render) = self.registry.get(&element_type) {
            return vec![Fragment::Node(render(props, children, context))];
        }
        match &self.options.no_transform {
            Some(fallback) => {
                debug!("no transform for {}, using fallback", element_type);
                vec![Fragment::Node(fallback(&element_type, props, children))]
            }
            None => {
                warn!("no transform for {}, dropping element", element_type);
                children
            }
        }
    }
}
