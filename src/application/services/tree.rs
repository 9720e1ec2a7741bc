//! Node tree store
//!
//! Holds the current snapshot of the documentation tree. The snapshot is
//! only ever replaced as a whole by `sync`; readers get a shared handle to
//! an immutable tree.

use std::sync::{Arc, RwLock};

use tracing::{info, instrument, warn};

use crate::application::{ApiResultExt, ApplicationError, ApplicationResult};
use crate::domain::{NodeData, NodeTree};
use crate::infrastructure::traits::ApiClient;

/// Restartable pre-order view of a snapshot, root excluded.
#[derive(Debug, Clone)]
pub struct FlatView {
    tree: Arc<NodeTree>,
}

impl FlatView {
    /// Each call starts a fresh walk.
    pub fn iter(&self) -> impl Iterator<Item = &NodeData> + '_ {
        self.tree.flatten()
    }

    pub fn len(&self) -> usize {
        self.tree.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Single source of truth for the documentation tree.
pub struct TreeStore {
    api: Arc<dyn ApiClient>,
    snapshot: RwLock<Option<Arc<NodeTree>>>,
}

impl TreeStore {
    /// Create an empty store; call `sync` to populate it.
    pub fn new(api: Arc<dyn ApiClient>) -> Self {
        Self {
            api,
            snapshot: RwLock::new(None),
        }
    }

    /// Fetch the full tree and replace the held snapshot.
    ///
    /// On failure the previous snapshot stays in place.
    #[instrument(level = "debug", skip(self))]
    pub fn sync(&self) -> ApplicationResult<Arc<NodeTree>> {
        let root = self.api.tree().with_request_context("sync tree")?;
        let tree = NodeTree::from_root(root).map_err(|e| {
            warn!("rejecting synced tree: {}", e);
            e
        })?;
        let tree = Arc::new(tree);
        info!("synced tree with {} nodes", tree.len());

        let mut snapshot = self.snapshot.write().unwrap_or_else(|e| e.into_inner());
        *snapshot = Some(Arc::clone(&tree));
        Ok(tree)
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> ApplicationResult<Arc<NodeTree>> {
        self.snapshot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or(ApplicationError::NotSynced)
    }

    pub fn is_synced(&self) -> bool {
        self.snapshot.read().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    /// Every node except the root, parents before children.
    pub fn flatten(&self) -> ApplicationResult<FlatView> {
        Ok(FlatView {
            tree: self.snapshot()?,
        })
    }

    /// Whether the current snapshot has a node with `url`.
    pub fn contains(&self, url: &str) -> ApplicationResult<bool> {
        Ok(self.snapshot()?.contains(url))
    }
}
