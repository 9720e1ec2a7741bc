//! Tree rendering for the terminal (termtree).

use itertools::Itertools;
use termtree::Tree;

use crate::application::components::{RenderKind, RenderNode};
use crate::domain::doc::Fragment;
use crate::domain::NodeTree;
use generational_arena::Index;

/// Longest text shown inline before it is cut.
const MAX_TEXT: usize = 60;

/// Documentation tree labelled with titles and urls.
pub fn node_tree(tree: &NodeTree) -> Option<Tree<String>> {
    tree.root().map(|root| node_subtree(tree, root))
}

fn node_subtree(tree: &NodeTree, idx: Index) -> Tree<String> {
    match tree.get_node(idx) {
        Some(node) => {
            let leaves: Vec<_> = node
                .children
                .iter()
                .map(|&child| node_subtree(tree, child))
                .collect();
            Tree::new(node.data.to_string()).with_leaves(leaves)
        }
        None => Tree::new(String::new()),
    }
}

/// Render output of one document.
pub fn render_tree(title: &str, content: &[Fragment<RenderNode>]) -> Tree<String> {
    Tree::new(title.to_string()).with_leaves(content.iter().map(fragment_tree))
}

fn fragment_tree(fragment: &Fragment<RenderNode>) -> Tree<String> {
    match fragment {
        Fragment::Text(text) => Tree::new(format!("{:?}", shorten(text))),
        Fragment::Node(node) => {
            let props = node
                .props
                .iter()
                .map(|(k, v)| format!("{k}={:?}", shorten(v)))
                .join(" ");
            let label = match node.kind {
                RenderKind::Component => format!("<{}>", node.name),
                RenderKind::Html => node.name.clone(),
            };
            let label = if props.is_empty() {
                label
            } else {
                format!("{label} {props}")
            };
            Tree::new(label).with_leaves(node.children.iter().map(fragment_tree))
        }
    }
}

fn shorten(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= MAX_TEXT {
        return text.to_string();
    }
    let cut: String = text.chars().take(MAX_TEXT).collect();
    format!("{cut}…")
}
