//! Documentation components
//!
//! Concrete render output for documents plus the default registry mapping
//! element types to documentation components.

use regex::Regex;
use serde::Serialize;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::doc::{Fragment, OrphanSelector, Props, TransformOptions, TransformRegistry};
use crate::infrastructure::api::TocEntry;
use crate::util::slug::slugify;

/// Element types whose content is kept verbatim.
pub const DEFAULT_PREFORMATTED: &[&str] = &["pre", "codeblock", "playground"];

/// Registered types that are never lifted out of paragraphs.
const INLINE_COMPONENTS: &[&str] = &["a", "color"];

/// Always lifted out of paragraphs, even though not a component.
const EXTRA_ORPHANS: &[&str] = &["video"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderKind {
    /// A documentation component
    Component,
    /// Plain markup passed through unchanged
    Html,
}

/// One node of a rendered document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderNode {
    pub kind: RenderKind,
    pub name: String,
    pub props: Props,
    pub children: Vec<Fragment<RenderNode>>,
}

impl RenderNode {
    pub fn component(name: &str, props: Props, children: Vec<Fragment<RenderNode>>) -> Self {
        Self {
            kind: RenderKind::Component,
            name: name.to_string(),
            props,
            children,
        }
    }

    pub fn html(name: &str, props: Props, children: Vec<Fragment<RenderNode>>) -> Self {
        Self {
            kind: RenderKind::Html,
            name: name.to_string(),
            props,
            children,
        }
    }

    /// Concatenated text of all descendants.
    pub fn text(&self) -> String {
        fragments_text(&self.children)
    }
}

/// What a render function may know about the document being rendered.
#[derive(Debug, Clone, Default)]
pub struct DocContext {
    pub node_url: String,
    pub doc_title: String,
    pub toc: Vec<TocEntry>,
}

pub type ComponentRegistry = TransformRegistry<RenderNode, DocContext>;

pub fn fragments_text(fragments: &[Fragment<RenderNode>]) -> String {
    fragments
        .iter()
        .map(|f| match f {
            Fragment::Text(text) => text.clone(),
            Fragment::Node(node) => node.text(),
        })
        .collect()
}

fn component(
    name: &'static str,
) -> impl Fn(Props, Vec<Fragment<RenderNode>>, &DocContext) -> RenderNode + Send + Sync {
    move |props, children, _| RenderNode::component(name, props, children)
}

fn heading(
    level: &'static str,
) -> impl Fn(Props, Vec<Fragment<RenderNode>>, &DocContext) -> RenderNode + Send + Sync {
    move |mut props, children, _| {
        if !props.contains("id") {
            props.insert("id", slugify(&fragments_text(&children)));
        }
        props.insert("level", level);
        props.insert("jumptarget", "true");
        RenderNode::component("Heading", props, children)
    }
}

fn warning(mut props: Props, children: Vec<Fragment<RenderNode>>, _: &DocContext) -> RenderNode {
    if !props.contains("type") {
        props.insert("type", "warning");
    }
    RenderNode::component("Banner", props, children)
}

fn table_of_contents(props: Props, _: Vec<Fragment<RenderNode>>, ctx: &DocContext) -> RenderNode {
    let props = props.with("doctitle", ctx.doc_title.as_str());
    RenderNode::component("TableOfContents", props, toc_entries(&ctx.toc))
}

fn toc_entries(entries: &[TocEntry]) -> Vec<Fragment<RenderNode>> {
    entries
        .iter()
        .map(|entry| {
            let props = Props::new()
                .with("id", entry.id.as_str())
                .with("level", entry.level.to_string());
            let mut children = vec![Fragment::Text(entry.title.clone())];
            children.extend(toc_entries(&entry.children));
            Fragment::Node(RenderNode::component("TocEntry", props, children))
        })
        .collect()
}

/// Fenced code blocks arrive as `<pre><code class="language-x">..</code></pre>`.
///
/// The language moves into a prop and the inner `<code>` wrapper is dropped;
/// the content stays escaped exactly once.
fn code_block() -> ApplicationResult<
    impl Fn(Props, Vec<Fragment<RenderNode>>, &DocContext) -> RenderNode + Send + Sync,
> {
    let language = Regex::new(r#"^<code class="language-(.*?)">"#).map_err(|e| {
        ApplicationError::Config {
            message: format!("invalid code block pattern: {e}"),
        }
    })?;
    let opening = Regex::new(r"^<code[^>]*>").map_err(|e| ApplicationError::Config {
        message: format!("invalid code block pattern: {e}"),
    })?;

    Ok(move |mut props: Props, children: Vec<Fragment<RenderNode>>, _: &DocContext| {
        let content = fragments_text(&children);
        if let Some(lang) = language.captures(&content).and_then(|c| c.get(1)) {
            props.insert("language", lang.as_str());
        }
        let unwrapped = opening.replace(&content, "");
        let code: &str = &unwrapped;
        let code = code.strip_suffix("</code>").unwrap_or(code);
        props.insert("escaped", "true");

        let children = if code.is_empty() {
            Vec::new()
        } else {
            vec![Fragment::Text(code.to_string())]
        };
        RenderNode::component("CodeBlock", props, children)
    })
}

/// Registry with every documentation component the viewer knows.
pub fn default_registry() -> ApplicationResult<ComponentRegistry> {
    let mut registry = ComponentRegistry::new();
    for name in [
        "Banner",
        "CodeBlock",
        "ColorCard",
        "ColorGroup",
        "Color",
        "Playground",
        "Do",
        "DoDontGroup",
        "Dont",
        "FigmaEmbed",
        "Image",
        "TypographySpecimen",
        "Glitch",
        "CodeSandbox",
        "Asciinema",
        "ImageGrid",
    ] {
        registry.register(name, component(name));
    }
    registry
        .register("Warning", warning)
        .register("TableOfContents", table_of_contents)
        .register("a", component("Link"))
        .register("h1", heading("alpha"))
        .register("h2", heading("beta"))
        .register("h3", heading("gamma"))
        .register("h4", heading("delta"))
        .register("img", component("Image"))
        .register("pre", code_block()?);
    Ok(registry)
}

/// `p > <type>` for every registered type except inline ones, plus extras.
pub fn default_orphans(registry: &ComponentRegistry) -> Vec<OrphanSelector> {
    registry
        .names()
        .into_iter()
        .filter(|name| !INLINE_COMPONENTS.contains(name))
        .chain(EXTRA_ORPHANS.iter().copied())
        .map(|name| OrphanSelector::new("p", name))
        .collect()
}

/// Pass an unregistered element through as plain markup.
pub fn passthrough(name: &str, props: Props, children: Vec<Fragment<RenderNode>>) -> RenderNode {
    RenderNode::html(name, props, children)
}

/// Transform options for documentation pages.
///
/// `extra_orphans` are added to the registry-derived selectors;
/// `preformatted` replaces the default verbatim types.
pub fn default_options(
    registry: &ComponentRegistry,
    extra_orphans: Vec<OrphanSelector>,
    preformatted: Vec<String>,
) -> TransformOptions<RenderNode> {
    let preformatted: Vec<String> = preformatted.into_iter().map(|t| t.to_lowercase()).collect();
    TransformOptions::default()
        .with_orphans(default_orphans(registry))
        .with_orphans(extra_orphans)
        .with_preformatted(move |ty| preformatted.iter().any(|p| p == ty))
        .with_fallback(passthrough)
}
