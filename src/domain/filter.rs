//! Filter engine: prunes a tree snapshot down to a selection.
//!
//! A node is kept when its own url is selected or when one of its
//! descendants is kept. Selecting a node reveals its whole subtree but
//! leaves its siblings alone:
//!
//! ```text
//!         root                 root
//!        /    \                  |
//!       a      b*      =>        b*
//!             /  \              /  \
//!            c    d            c    d
//! ```
//!
//! The root is never checked against the selection itself.

use std::collections::{HashMap, HashSet};

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::arena::NodeTree;

/// Which nodes to keep.
///
/// `All` means no filter was requested; `Only` with an empty set filters
/// down to the bare root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Only(HashSet<String>),
}

impl Selection {
    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection::Only(urls.into_iter().map(Into::into).collect())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    fn is_selected(&self, url: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(urls) => urls.contains(url),
        }
    }
}

/// Produce a new, independent tree containing only the selected nodes,
/// their ancestors and all descendants of selected nodes.
///
/// Urls in the selection that are absent from the tree are ignored.
#[instrument(level = "debug", skip(tree, selection), fields(nodes = tree.len()))]
pub fn filter_tree(tree: &NodeTree, selection: &Selection) -> NodeTree {
    let Selection::Only(urls) = selection else {
        return tree.clone();
    };
    let Some(root) = tree.root() else {
        return NodeTree::new();
    };

    // keep: transient per-node annotation, lives only for this call
    let mut keep: HashMap<Index, bool> = HashMap::with_capacity(tree.len());
    for (idx, node) in tree.iter_postorder() {
        if idx == root {
            continue;
        }
        let kept = selection.is_selected(&node.data.url)
            || node
                .children
                .iter()
                .any(|child| keep.get(child).copied().unwrap_or(false));
        keep.insert(idx, kept);
    }

    let mut filtered = NodeTree::new();
    let Some(root_node) = tree.get_node(root) else {
        return filtered;
    };
    let new_root = filtered.insert_node(root_node.data.clone(), None);

    // (source index, parent in result, inside a selected subtree)
    let mut stack: Vec<(Index, Index, bool)> = root_node
        .children
        .iter()
        .rev()
        .map(|&child| (child, new_root, false))
        .collect();

    while let Some((idx, parent, revealed)) = stack.pop() {
        if !revealed && !keep.get(&idx).copied().unwrap_or(false) {
            continue;
        }
        let Some(node) = tree.get_node(idx) else {
            continue;
        };
        let copied = filtered.insert_node(node.data.clone(), Some(parent));
        let reveal_children = revealed || urls.contains(&node.data.url);
        for &child in node.children.iter().rev() {
            stack.push((child, copied, reveal_children));
        }
    }

    debug!(
        "filter_tree: kept {} of {} nodes for {} selected urls",
        filtered.len(),
        tree.len(),
        urls.len()
    );
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::Node;

    fn tree() -> NodeTree {
        NodeTree::from_root(Node::new("", "Root").with_children(vec![
            Node::new("a", "A"),
            Node::new("b", "B").with_children(vec![Node::new("b/c", "C")]),
        ]))
        .unwrap()
    }

    #[test]
    fn given_leaf_match_when_filtering_then_only_its_branch_survives() {
        let filtered = filter_tree(&tree(), &Selection::from_urls(["b/c"]));

        let expected = Node::new("", "Root").with_children(vec![
            Node::new("b", "B").with_children(vec![Node::new("b/c", "C")])
        ]);
        assert_eq!(filtered.to_node(), Some(expected));
    }

    #[test]
    fn given_no_selection_when_filtering_then_tree_is_unchanged() {
        let source = tree();

        let filtered = filter_tree(&source, &Selection::All);

        assert_eq!(filtered.to_node(), source.to_node());
    }

    #[test]
    fn given_empty_selection_when_filtering_then_only_root_remains() {
        let filtered = filter_tree(&tree(), &Selection::Only(HashSet::new()));

        assert_eq!(filtered.len(), 1);
        assert!(filtered.root_node().unwrap().children.is_empty());
    }

    #[test]
    fn given_root_url_in_selection_when_filtering_then_root_does_not_reveal_everything() {
        let filtered = filter_tree(&tree(), &Selection::from_urls([""]));

        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn given_empty_tree_when_filtering_then_result_is_empty() {
        let filtered = filter_tree(&NodeTree::new(), &Selection::from_urls(["a"]));

        assert!(filtered.is_empty());
    }
}
