//! Document rendering service
//!
//! Turns the markup documents of a node into render trees using the
//! documentation component registry.

use serde::Serialize;
use tracing::{debug, instrument};

use crate::application::components::{
    default_options, default_registry, DocContext, RenderNode,
};
use crate::application::ApplicationResult;
use crate::config::DocConfig;
use crate::domain::doc::{DocumentTransformer, Fragment, OrphanSelector};
use crate::infrastructure::api::{NodeDetail, NodeDoc};

/// One rendered document of a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedDoc {
    pub title: String,
    pub content: Vec<Fragment<RenderNode>>,
}

pub struct DocumentService {
    transformer: DocumentTransformer<RenderNode, DocContext>,
}

impl DocumentService {
    /// Build the service from document settings.
    ///
    /// Fails on malformed orphan selectors.
    pub fn new(config: &DocConfig) -> ApplicationResult<Self> {
        let extra_orphans = config
            .orphans
            .iter()
            .map(|s| s.parse::<OrphanSelector>())
            .collect::<Result<Vec<_>, _>>()?;
        let registry = default_registry()?;
        let options = default_options(&registry, extra_orphans, config.preformatted.clone());
        debug!(
            "document service with {} components, {} orphan selectors",
            registry.len(),
            options.orphans.len()
        );
        Ok(Self {
            transformer: DocumentTransformer::new(registry, options),
        })
    }

    pub fn transformer(&self) -> &DocumentTransformer<RenderNode, DocContext> {
        &self.transformer
    }

    /// Render a single document of the node at `node_url`.
    #[instrument(level = "debug", skip(self, doc), fields(doc = %doc.title))]
    pub fn render_doc(&self, node_url: &str, doc: &NodeDoc) -> ApplicationResult<RenderedDoc> {
        let ctx = DocContext {
            node_url: node_url.to_string(),
            doc_title: doc.title.clone(),
            toc: doc.toc.clone(),
        };
        let content = self.transformer.transform(&doc.html, &ctx)?;
        Ok(RenderedDoc {
            title: doc.title.clone(),
            content,
        })
    }

    /// Render every document of a node, in order.
    pub fn render_node(&self, detail: &NodeDetail) -> ApplicationResult<Vec<RenderedDoc>> {
        detail
            .docs
            .iter()
            .map(|doc| self.render_doc(&detail.url, doc))
            .collect()
    }
}
