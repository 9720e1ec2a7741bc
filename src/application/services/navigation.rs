//! Navigation service
//!
//! Tracks the active filter query and the active node, and reacts to
//! push messages from the backend. Filter responses are sequenced so that
//! only the answer to the most recent query is ever applied.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, instrument};

use crate::application::sequence::{RequestSequencer, Ticket};
use crate::application::services::TreeStore;
use crate::application::{ApiResultExt, ApplicationResult};
use crate::domain::{filter_tree, DomainError, NodeTree, Selection};
use crate::infrastructure::api::{Message, NodeDetail, SearchHit};
use crate::infrastructure::traits::ApiClient;

/// Result of setting a filter query.
#[derive(Debug, Clone)]
pub enum FilterOutcome {
    /// Query was blank; the full tree is visible again
    Cleared,
    /// The pruned tree for the query
    Applied(Arc<NodeTree>),
    /// A newer query was issued while this one was in flight
    Stale,
}

/// What changed after handling a push message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Refresh {
    pub resynced: bool,
    pub refiltered: bool,
    /// Active node still exists and should be rendered again
    pub reload_active: bool,
    /// Active node disappeared with the new tree
    pub active_gone: bool,
}

#[derive(Debug, Default)]
struct NavigationState {
    query: Option<String>,
    filtered: Option<Arc<NodeTree>>,
    active: Option<String>,
}

pub struct NavigationService {
    api: Arc<dyn ApiClient>,
    store: Arc<TreeStore>,
    source: Option<String>,
    sequencer: RequestSequencer,
    state: Mutex<NavigationState>,
}

impl NavigationService {
    pub fn new(api: Arc<dyn ApiClient>, store: Arc<TreeStore>, source: Option<String>) -> Self {
        Self {
            api,
            store,
            source,
            sequencer: RequestSequencer::new(),
            state: Mutex::new(NavigationState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, NavigationState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn store(&self) -> &TreeStore {
        &self.store
    }

    /// Last applied filter query.
    pub fn query(&self) -> Option<String> {
        self.lock().query.clone()
    }

    /// Url of the node last opened.
    pub fn active(&self) -> Option<String> {
        self.lock().active.clone()
    }

    /// Filter the tree by a query; a blank query clears the filter.
    #[instrument(level = "debug", skip(self))]
    pub fn set_filter(&self, query: &str) -> ApplicationResult<FilterOutcome> {
        let query = query.trim();
        let ticket = self.sequencer.issue();

        if query.is_empty() {
            let mut state = self.lock();
            state.query = None;
            state.filtered = None;
            return Ok(FilterOutcome::Cleared);
        }

        let selection = self.fetch_selection(query)?;
        self.apply_filter(ticket, query, &selection)
    }

    fn fetch_selection(&self, query: &str) -> ApplicationResult<Selection> {
        let urls = self
            .api
            .filter(query)
            .with_request_context(&format!("filter {query:?}"))?;
        debug!("filter {:?} matched {} nodes", query, urls.len());
        Ok(Selection::from_urls(urls))
    }

    /// Apply a filter response unless a newer request has been issued.
    fn apply_filter(
        &self,
        ticket: Ticket,
        query: &str,
        selection: &Selection,
    ) -> ApplicationResult<FilterOutcome> {
        let snapshot = self.store.snapshot()?;
        let mut state = self.lock();
        if !self.sequencer.is_current(ticket) {
            debug!("dropping stale response for {:?}", query);
            return Ok(FilterOutcome::Stale);
        }
        let filtered = Arc::new(filter_tree(&snapshot, selection));
        state.query = Some(query.to_string());
        state.filtered = Some(Arc::clone(&filtered));
        Ok(FilterOutcome::Applied(filtered))
    }

    /// The filtered tree if a filter is active, else the full snapshot.
    pub fn visible_tree(&self) -> ApplicationResult<Arc<NodeTree>> {
        if let Some(filtered) = self.lock().filtered.clone() {
            return Ok(filtered);
        }
        self.store.snapshot()
    }

    /// Full-text search; a blank query finds nothing.
    #[instrument(level = "debug", skip(self))]
    pub fn search(&self, query: &str) -> ApplicationResult<Vec<SearchHit>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.api
            .search(query)
            .with_request_context(&format!("search {query:?}"))
    }

    /// Fetch a node and make it the active one.
    #[instrument(level = "debug", skip(self))]
    pub fn open(&self, url: &str) -> ApplicationResult<NodeDetail> {
        let detail = match self.api.node(url) {
            Err(e) if e.is_not_found() => {
                return Err(DomainError::NodeNotFound(url.to_string()).into())
            }
            other => other.with_request_context(&format!("load node {url:?}"))?,
        };
        self.lock().active = Some(url.to_string());
        Ok(detail)
    }

    /// React to a push message.
    ///
    /// A tree-synced message re-syncs the store, re-runs the active query
    /// and re-validates the active node. Everything else is ignored.
    #[instrument(level = "debug", skip(self, msg), fields(topic = %msg.topic))]
    pub fn handle_message(&self, msg: &Message) -> ApplicationResult<Refresh> {
        if !msg.is_tree_synced(self.source.as_deref()) {
            debug!("ignoring message {:?}", msg.topic);
            return Ok(Refresh::default());
        }

        self.store.sync()?;
        let mut refresh = Refresh {
            resynced: true,
            ..Refresh::default()
        };

        // Filtered view was computed against the replaced snapshot
        let query = {
            let mut state = self.lock();
            state.filtered = None;
            state.query.clone()
        };
        if let Some(query) = query {
            refresh.refiltered = matches!(self.set_filter(&query)?, FilterOutcome::Applied(_));
        }

        if let Some(url) = self.active() {
            let exists = self
                .api
                .has(&url)
                .with_request_context(&format!("check node {url:?}"))?;
            if exists {
                refresh.reload_active = true;
            } else {
                info!("active node {} is gone", url);
                self.lock().active = None;
                refresh.active_gone = true;
            }
        }

        Ok(refresh)
    }
}
