//! I/O boundary traits for testability
//!
//! These traits abstract the backend and the terminal, allowing services
//! to be tested with mock implementations.

use crate::domain::Node;
use crate::infrastructure::api::{ApiResult, Hello, Message, NodeDetail, SearchHit};

/// Read access to the documentation backend.
pub trait ApiClient: Send + Sync {
    /// Backend banner.
    fn hello(&self) -> ApiResult<Hello>;

    /// Current root of the documentation tree.
    fn tree(&self) -> ApiResult<Node>;

    /// Full detail of the node with `url`.
    fn node(&self, url: &str) -> ApiResult<NodeDetail>;

    /// Check whether a node with `url` exists without fetching it.
    fn has(&self, url: &str) -> ApiResult<bool>;

    /// Urls of nodes matching a filter query.
    fn filter(&self, query: &str) -> ApiResult<Vec<String>>;

    /// Full-text search hits for a query.
    fn search(&self, query: &str) -> ApiResult<Vec<SearchHit>>;
}

/// Stream of push messages from the backend.
pub trait MessageSource: Send {
    /// Block until the next message arrives.
    /// Returns None once the channel is closed.
    fn next_message(&mut self) -> ApiResult<Option<Message>>;
}

/// Item for FZF-style selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionItem {
    /// Display text shown in selector
    pub display: String,
    /// Actual value (e.g., node url)
    pub value: String,
}

/// Interactive FZF-style selector abstraction.
pub trait Selector: Send + Sync {
    /// Present items to user and return selected one.
    /// Returns None if user cancels (Esc/Ctrl-C).
    fn select_one(
        &self,
        items: &[SelectionItem],
        prompt: &str,
    ) -> Result<Option<SelectionItem>, String>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real selector implementation using skim.
#[derive(Debug, Default)]
pub struct SkimSelector;

impl Selector for SkimSelector {
    fn select_one(
        &self,
        items: &[SelectionItem],
        prompt: &str,
    ) -> Result<Option<SelectionItem>, String> {
        use skim::prelude::*;
        use std::io::Cursor;

        if items.is_empty() {
            return Ok(None);
        }

        let input = items
            .iter()
            .map(|i| i.display.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let options = SkimOptionsBuilder::default()
            .prompt(Some(prompt))
            .height(Some("50%"))
            .multi(false)
            .build()
            .map_err(|e| format!("failed to build skim options: {e}"))?;

        let item_reader = SkimItemReader::default();
        let items_arc = item_reader.of_bufread(Cursor::new(input));

        match Skim::run_with(&options, Some(items_arc)) {
            Some(out) if out.is_abort => Ok(None),
            Some(out) => Ok(out.selected_items.first().and_then(|selected| {
                let display = selected.output().to_string();
                items.iter().find(|i| i.display == display).cloned()
            })),
            None => Ok(None),
        }
    }
}
