//! Integration tests for the filter engine.
//!
//! Selection law:
//! - a node is kept if its url is selected or a descendant is kept
//! - a selected node reveals its whole subtree
//! - siblings of a selected node are not affected
//! - no selection at all keeps everything, an empty one keeps only the root

use std::collections::HashSet;

use rstest::{fixture, rstest};

use dskview::domain::{filter_tree, Node, NodeTree, Selection};

fn urls(tree: &NodeTree) -> Vec<String> {
    tree.iter().map(|(_, n)| n.data.url.clone()).collect()
}

/// ```text
/// ""
/// ├── colors
/// │   ├── colors/primary
/// │   │   ├── colors/primary/light
/// │   │   └── colors/primary/dark
/// │   └── colors/secondary
/// ├── typography
/// │   └── typography/headings
/// └── icons
/// ```
#[fixture]
fn design_tree() -> NodeTree {
    NodeTree::from_root(Node::new("", "Design System").with_children(vec![
        Node::new("colors", "Colors").with_children(vec![
            Node::new("colors/primary", "Primary").with_children(vec![
                Node::new("colors/primary/light", "Light"),
                Node::new("colors/primary/dark", "Dark"),
            ]),
            Node::new("colors/secondary", "Secondary"),
        ]),
        Node::new("typography", "Typography")
            .with_children(vec![Node::new("typography/headings", "Headings")]),
        Node::new("icons", "Icons"),
    ]))
    .expect("valid tree")
}

// ============================================================
// Literal scenario
// ============================================================

#[test]
fn given_match_on_nested_leaf_when_filtering_then_sibling_branch_is_pruned() {
    // Arrange
    let tree = NodeTree::from_root(Node::new("", "").with_children(vec![
        Node::new("a", ""),
        Node::new("b", "").with_children(vec![Node::new("b/c", "")]),
    ]))
    .unwrap();

    // Act
    let filtered = filter_tree(&tree, &Selection::from_urls(["b/c"]));

    // Assert
    let expected = Node::new("", "")
        .with_children(vec![Node::new("b", "").with_children(vec![Node::new("b/c", "")])]);
    assert_eq!(filtered.to_node(), Some(expected));
}

// ============================================================
// Properties
// ============================================================

#[rstest]
fn given_every_url_selected_when_filtering_then_tree_is_unchanged(design_tree: NodeTree) {
    // Arrange
    let all: Vec<String> = design_tree.flatten().map(|d| d.url.clone()).collect();

    // Act
    let filtered = filter_tree(&design_tree, &Selection::from_urls(all));

    // Assert
    assert_eq!(filtered.len(), design_tree.len());
    assert_eq!(urls(&filtered), urls(&design_tree));
}

#[rstest]
fn given_no_filter_when_filtering_then_tree_is_unchanged(design_tree: NodeTree) {
    let filtered = filter_tree(&design_tree, &Selection::All);

    assert_eq!(filtered.to_node(), design_tree.to_node());
}

#[rstest]
fn given_empty_selection_when_filtering_then_only_root_remains(design_tree: NodeTree) {
    let filtered = filter_tree(&design_tree, &Selection::Only(HashSet::new()));

    assert_eq!(urls(&filtered), vec![""]);
    assert!(filtered.root_node().unwrap().children.is_empty());
}

#[rstest]
#[case("colors/primary/dark", &["", "colors", "colors/primary", "colors/primary/dark"])]
#[case("typography/headings", &["", "typography", "typography/headings"])]
#[case("icons", &["", "icons"])]
fn given_leaf_match_when_filtering_then_ancestors_are_included(
    design_tree: NodeTree,
    #[case] matched: &str,
    #[case] expected: &[&str],
) {
    let filtered = filter_tree(&design_tree, &Selection::from_urls([matched]));

    assert_eq!(urls(&filtered), expected);
}

#[rstest]
fn given_inner_match_when_filtering_then_whole_subtree_is_revealed(design_tree: NodeTree) {
    let filtered = filter_tree(&design_tree, &Selection::from_urls(["colors"]));

    assert_eq!(
        urls(&filtered),
        vec![
            "",
            "colors",
            "colors/primary",
            "colors/primary/light",
            "colors/primary/dark",
            "colors/secondary",
        ]
    );
}

#[rstest]
fn given_deep_match_when_filtering_then_siblings_without_match_are_absent(design_tree: NodeTree) {
    let filtered = filter_tree(&design_tree, &Selection::from_urls(["colors/primary/light"]));

    assert!(!filtered.contains("colors/primary/dark"));
    assert!(!filtered.contains("colors/secondary"));
    assert!(!filtered.contains("typography"));
    assert!(!filtered.contains("icons"));
}

#[rstest]
fn given_matches_in_two_branches_when_filtering_then_original_order_is_kept(
    design_tree: NodeTree,
) {
    let filtered = filter_tree(
        &design_tree,
        &Selection::from_urls(["icons", "colors/secondary"]),
    );

    assert_eq!(
        urls(&filtered),
        vec!["", "colors", "colors/secondary", "icons"]
    );
}

#[rstest]
fn given_unknown_urls_when_filtering_then_they_are_ignored(design_tree: NodeTree) {
    let filtered = filter_tree(
        &design_tree,
        &Selection::from_urls(["gone/away", "typography"]),
    );

    assert_eq!(urls(&filtered), vec!["", "typography", "typography/headings"]);
}

#[rstest]
fn given_filtered_copy_when_filtering_then_source_tree_is_untouched(design_tree: NodeTree) {
    // Arrange
    let before = design_tree.to_node();

    // Act
    let _ = filter_tree(&design_tree, &Selection::from_urls(["icons"]));

    // Assert
    assert_eq!(design_tree.to_node(), before);
}
