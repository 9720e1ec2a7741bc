//! Integration tests for NavigationService: filtering, opening nodes and
//! reacting to tree-synced push messages.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use dskview::application::services::{FilterOutcome, NavigationService, TreeStore};
use dskview::application::ApplicationError;
use dskview::domain::{DomainError, Node};
use dskview::infrastructure::api::{
    ApiError, ApiResult, Hello, Message, NodeDetail, NodeDoc, SearchHit,
};
use dskview::infrastructure::traits::ApiClient;
use dskview::util::testing;

/// In-memory backend: tree, filter answers and per-query search hits.
#[derive(Default)]
struct MockApi {
    root: Mutex<Node>,
    filters: HashMap<String, Vec<String>>,
    hits: Vec<SearchHit>,
    tree_calls: Mutex<usize>,
    tree_down: AtomicBool,
    filter_down: AtomicBool,
    has_down: AtomicBool,
}

fn unreachable(endpoint: &str) -> ApiError {
    ApiError::Network {
        url: format!("http://docs/api/v2/{endpoint}"),
        message: "connection refused".into(),
    }
}

impl MockApi {
    fn new(root: Node) -> Self {
        Self {
            root: Mutex::new(root),
            ..Self::default()
        }
    }

    fn with_filter(mut self, query: &str, urls: &[&str]) -> Self {
        self.filters
            .insert(query.to_string(), urls.iter().map(|u| u.to_string()).collect());
        self
    }

    fn replace_tree(&self, root: Node) {
        *self.root.lock().unwrap() = root;
    }

    fn urls(&self) -> HashSet<String> {
        fn collect(node: &Node, out: &mut HashSet<String>) {
            out.insert(node.url.clone());
            node.children.iter().for_each(|c| collect(c, out));
        }
        let mut out = HashSet::new();
        collect(&self.root.lock().unwrap(), &mut out);
        out
    }
}

impl ApiClient for MockApi {
    fn hello(&self) -> ApiResult<Hello> {
        Ok(Hello::default())
    }

    fn tree(&self) -> ApiResult<Node> {
        *self.tree_calls.lock().unwrap() += 1;
        if self.tree_down.load(Ordering::SeqCst) {
            return Err(unreachable("tree"));
        }
        Ok(self.root.lock().unwrap().clone())
    }

    fn node(&self, url: &str) -> ApiResult<NodeDetail> {
        if !self.urls().contains(url) {
            return Err(ApiError::Status {
                url: format!("http://docs/api/v2/tree/{url}"),
                status: 404,
            });
        }
        Ok(NodeDetail {
            url: url.to_string(),
            title: url.to_uppercase(),
            docs: vec![NodeDoc {
                title: "readme".into(),
                html: "<p>Hello</p>".into(),
                toc: Vec::new(),
            }],
            ..NodeDetail::default()
        })
    }

    fn has(&self, url: &str) -> ApiResult<bool> {
        if self.has_down.load(Ordering::SeqCst) {
            return Err(unreachable("tree"));
        }
        Ok(self.urls().contains(url))
    }

    fn filter(&self, query: &str) -> ApiResult<Vec<String>> {
        if self.filter_down.load(Ordering::SeqCst) {
            return Err(unreachable("filter"));
        }
        Ok(self.filters.get(query).cloned().unwrap_or_default())
    }

    fn search(&self, _query: &str) -> ApiResult<Vec<SearchHit>> {
        Ok(self.hits.clone())
    }
}

fn sample_tree() -> Node {
    Node::new("", "Root").with_children(vec![
        Node::new("colors", "Colors").with_children(vec![
            Node::new("colors/primary", "Primary"),
            Node::new("colors/secondary", "Secondary"),
        ]),
        Node::new("icons", "Icons"),
    ])
}

fn navigation(api: Arc<MockApi>, source: Option<&str>) -> NavigationService {
    testing::init_test_setup();
    let store = Arc::new(TreeStore::new(api.clone()));
    store.sync().expect("initial sync");
    NavigationService::new(api, store, source.map(String::from))
}

fn synced(source: &str) -> Message {
    Message {
        topic: format!("{source}.tree.synced"),
        text: "Tree synced".into(),
        kind: "tree-synced".into(),
    }
}

// ============================================================
// Filtering
// ============================================================

#[test]
fn given_query_when_setting_filter_then_pruned_tree_is_visible() {
    // Arrange
    let api = Arc::new(MockApi::new(sample_tree()).with_filter("primary", &["colors/primary"]));
    let nav = navigation(api, None);

    // Act
    let outcome = nav.set_filter("primary").unwrap();

    // Assert
    let FilterOutcome::Applied(tree) = outcome else {
        panic!("expected applied filter");
    };
    let urls: Vec<_> = tree.iter().map(|(_, n)| n.data.url.clone()).collect();
    assert_eq!(urls, vec!["", "colors", "colors/primary"]);
    assert_eq!(nav.query().as_deref(), Some("primary"));
    assert_eq!(nav.visible_tree().unwrap().len(), 3);
}

#[test]
fn given_query_without_matches_when_setting_filter_then_only_root_is_visible() {
    let api = Arc::new(MockApi::new(sample_tree()));
    let nav = navigation(api, None);

    let outcome = nav.set_filter("nothing").unwrap();

    assert!(matches!(outcome, FilterOutcome::Applied(ref t) if t.len() == 1));
}

#[test]
fn given_active_filter_when_setting_blank_query_then_filter_is_cleared() {
    let api = Arc::new(MockApi::new(sample_tree()).with_filter("icons", &["icons"]));
    let nav = navigation(api, None);
    nav.set_filter("icons").unwrap();

    let outcome = nav.set_filter("  ").unwrap();

    assert!(matches!(outcome, FilterOutcome::Cleared));
    assert_eq!(nav.query(), None);
    assert_eq!(nav.visible_tree().unwrap().len(), 5);
}

#[test]
fn given_blank_query_when_searching_then_no_request_and_no_hits() {
    let api = Arc::new(MockApi {
        hits: vec![SearchHit {
            url: "icons".into(),
            ..SearchHit::default()
        }],
        ..MockApi::new(sample_tree())
    });
    let nav = navigation(api, None);

    assert!(nav.search("").unwrap().is_empty());
    assert_eq!(nav.search("icon").unwrap().len(), 1);
}

// ============================================================
// Opening nodes
// ============================================================

#[test]
fn given_existing_url_when_opening_then_node_becomes_active() {
    let api = Arc::new(MockApi::new(sample_tree()));
    let nav = navigation(api, None);

    let detail = nav.open("colors/primary").unwrap();

    assert_eq!(detail.title, "COLORS/PRIMARY");
    assert_eq!(nav.active().as_deref(), Some("colors/primary"));
}

#[test]
fn given_missing_url_when_opening_then_node_not_found() {
    let api = Arc::new(MockApi::new(sample_tree()));
    let nav = navigation(api, None);

    let result = nav.open("motion");

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::NodeNotFound(ref url))) if url == "motion"
    ));
    assert_eq!(nav.active(), None);
}

// ============================================================
// Push messages
// ============================================================

#[test]
fn given_message_for_other_source_when_handling_then_nothing_happens() {
    // Arrange
    let api = Arc::new(MockApi::new(sample_tree()));
    let nav = navigation(api.clone(), Some("main"));

    // Act
    let refresh = nav.handle_message(&synced("next")).unwrap();

    // Assert
    assert!(!refresh.resynced);
    assert_eq!(*api.tree_calls.lock().unwrap(), 1);
}

#[test]
fn given_tree_synced_when_handling_then_store_is_resynced_and_query_rerun() {
    // Arrange
    let api = Arc::new(MockApi::new(sample_tree()).with_filter("icons", &["icons"]));
    let nav = navigation(api.clone(), Some("main"));
    nav.set_filter("icons").unwrap();
    api.replace_tree(Node::new("", "Root").with_children(vec![
        Node::new("icons", "Icons").with_children(vec![Node::new("icons/arrow", "Arrow")]),
    ]));

    // Act
    let refresh = nav.handle_message(&synced("main")).unwrap();

    // Assert
    assert!(refresh.resynced);
    assert!(refresh.refiltered);
    assert!(nav.visible_tree().unwrap().contains("icons/arrow"));
    assert_eq!(*api.tree_calls.lock().unwrap(), 2);
}

#[test]
fn given_failing_sync_when_tree_synced_then_previous_view_is_kept() {
    // Arrange
    let api = Arc::new(MockApi::new(sample_tree()).with_filter("icons", &["icons"]));
    let nav = navigation(api.clone(), None);
    nav.set_filter("icons").unwrap();
    api.tree_down.store(true, Ordering::SeqCst);

    // Act
    let result = nav.handle_message(&synced("main"));

    // Assert
    assert!(matches!(result, Err(ApplicationError::Network { .. })));
    let visible = nav.visible_tree().unwrap();
    let urls: Vec<_> = visible.iter().map(|(_, n)| n.data.url.clone()).collect();
    assert_eq!(urls, vec!["", "icons"]);
    assert_eq!(nav.store().snapshot().unwrap().len(), 5);
}

#[test]
fn given_failing_refilter_when_tree_synced_then_old_filtered_tree_is_dropped() {
    // Arrange
    let api = Arc::new(MockApi::new(sample_tree()).with_filter("colors", &["colors"]));
    let nav = navigation(api.clone(), None);
    nav.set_filter("colors").unwrap();
    api.replace_tree(Node::new("", "Root").with_children(vec![Node::new("motion", "Motion")]));
    api.filter_down.store(true, Ordering::SeqCst);

    // Act
    let result = nav.handle_message(&synced("main"));

    // Assert
    assert!(matches!(result, Err(ApplicationError::Network { .. })));
    let visible = nav.visible_tree().unwrap();
    assert!(!visible.contains("colors"));
    assert!(visible.contains("motion"));
    assert_eq!(nav.query().as_deref(), Some("colors"));
}

#[test]
fn given_refilter_recovers_when_next_tree_synced_then_query_is_applied_again() {
    // Arrange
    let api = Arc::new(MockApi::new(sample_tree()).with_filter("icons", &["icons"]));
    let nav = navigation(api.clone(), None);
    nav.set_filter("icons").unwrap();
    api.filter_down.store(true, Ordering::SeqCst);
    let _ = nav.handle_message(&synced("main"));
    api.filter_down.store(false, Ordering::SeqCst);

    // Act
    let refresh = nav.handle_message(&synced("main")).unwrap();

    // Assert
    assert!(refresh.refiltered);
    assert_eq!(nav.visible_tree().unwrap().len(), 2);
}

#[test]
fn given_failing_existence_check_when_tree_synced_then_active_node_is_kept() {
    // Arrange
    let api = Arc::new(MockApi::new(sample_tree()));
    let nav = navigation(api.clone(), None);
    nav.open("icons").unwrap();
    api.has_down.store(true, Ordering::SeqCst);

    // Act
    let result = nav.handle_message(&synced("main"));

    // Assert
    assert!(matches!(result, Err(ApplicationError::Network { .. })));
    assert_eq!(nav.active().as_deref(), Some("icons"));
    assert_eq!(*api.tree_calls.lock().unwrap(), 2);
}

#[test]
fn given_active_node_still_present_when_tree_synced_then_it_is_reloaded() {
    let api = Arc::new(MockApi::new(sample_tree()));
    let nav = navigation(api, None);
    nav.open("icons").unwrap();

    let refresh = nav.handle_message(&synced("main")).unwrap();

    assert!(refresh.reload_active);
    assert!(!refresh.active_gone);
    assert_eq!(nav.active().as_deref(), Some("icons"));
}

#[test]
fn given_active_node_removed_when_tree_synced_then_it_is_reported_gone() {
    // Arrange
    let api = Arc::new(MockApi::new(sample_tree()));
    let nav = navigation(api.clone(), None);
    nav.open("colors/secondary").unwrap();
    api.replace_tree(Node::new("", "Root").with_children(vec![Node::new("icons", "Icons")]));

    // Act
    let refresh = nav.handle_message(&synced("main")).unwrap();

    // Assert
    assert!(refresh.active_gone);
    assert!(!refresh.reload_active);
    assert_eq!(nav.active(), None);
}
