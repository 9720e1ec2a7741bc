use generational_arena::{Arena, Index};
use std::collections::HashMap;
use std::fmt;
use tracing::instrument;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{Node, NodeMeta};

/// Data payload for tree nodes representing one design aspect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    /// Unique, path-like identifier; empty for the root
    pub url: String,
    pub title: String,
    pub hash: String,
    pub description: String,
    pub tags: Vec<String>,
    pub keywords: Vec<String>,
}

impl NodeData {
    fn from_node(node: &Node) -> Self {
        Self {
            url: node.url.clone(),
            title: node.title.clone(),
            hash: node.hash.clone(),
            description: node.description.clone(),
            tags: node.tags.clone(),
            keywords: node.meta.keywords.clone(),
        }
    }

    fn to_node(&self) -> Node {
        Node {
            url: self.url.clone(),
            title: self.title.clone(),
            hash: self.hash.clone(),
            description: self.description.clone(),
            tags: self.tags.clone(),
            meta: NodeMeta {
                keywords: self.keywords.clone(),
            },
            children: Vec::new(),
        }
    }
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.url.is_empty() {
            write!(f, "{}", self.title)
        } else {
            write!(f, "{} ({})", self.title, self.url)
        }
    }
}

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub data: NodeData,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes in backend order
    pub children: Vec<Index>,
}

/// Arena-based snapshot of the documentation tree.
///
/// A snapshot is never mutated once handed out; derived (filtered) trees
/// are built as new, independent `NodeTree`s.
#[derive(Debug, Clone)]
pub struct NodeTree {
    arena: Arena<TreeNode>,
    root: Option<Index>,
    by_url: HashMap<String, Index>,
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeTree {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            by_url: HashMap::new(),
        }
    }

    /// Build a snapshot from the nested wire shape.
    ///
    /// Fails when two nodes share a `url`.
    #[instrument(level = "debug", skip(root), fields(root = %root.url))]
    pub fn from_root(root: Node) -> DomainResult<Self> {
        let mut tree = Self::new();
        let mut stack = vec![(root, None)];

        while let Some((node, parent_idx)) = stack.pop() {
            if tree.by_url.contains_key(&node.url) {
                return Err(DomainError::DuplicateUrl(node.url));
            }
            let data = NodeData::from_node(&node);
            let current_idx = tree.insert_node(data, parent_idx);

            // Reverse so that children are popped, and thus attached, in order
            for child in node.children.into_iter().rev() {
                stack.push((child, Some(current_idx)));
            }
        }

        Ok(tree)
    }

    /// Rebuild the nested wire shape.
    pub fn to_node(&self) -> Option<Node> {
        self.root.map(|root| self.build_node(root))
    }

    fn build_node(&self, idx: Index) -> Node {
        match self.get_node(idx) {
            Some(tree_node) => {
                let mut node = tree_node.data.to_node();
                node.children = tree_node
                    .children
                    .iter()
                    .map(|&child| self.build_node(child))
                    .collect();
                node
            }
            None => Node::default(),
        }
    }

    #[instrument(level = "trace", skip(self, data), fields(url = %data.url))]
    pub fn insert_node(&mut self, data: NodeData, parent: Option<Index>) -> Index {
        let url = data.url.clone();
        let node = TreeNode {
            data,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.root = Some(node_idx);
        }
        self.by_url.insert(url, node_idx);

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn root_node(&self) -> Option<&TreeNode> {
        self.root.and_then(|idx| self.get_node(idx))
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Look up a node by its `url`.
    pub fn find(&self, url: &str) -> Option<(Index, &TreeNode)> {
        let idx = *self.by_url.get(url)?;
        self.get_node(idx).map(|node| (idx, node))
    }

    pub fn contains(&self, url: &str) -> bool {
        self.by_url.contains_key(url)
    }

    /// Pre-order iteration starting at the root.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    /// Every node except the root, parents before children, siblings in order.
    ///
    /// Lazy and restartable: each call walks the snapshot afresh.
    pub fn flatten(&self) -> impl Iterator<Item = &NodeData> + '_ {
        self.iter().skip(1).map(|(_, node)| &node.data)
    }

    /// Ancestors of the node with `url`, root first, excluding the node itself.
    pub fn ancestors(&self, url: &str) -> DomainResult<Vec<&NodeData>> {
        let (_, node) = self
            .find(url)
            .ok_or_else(|| DomainError::NodeNotFound(url.to_string()))?;

        let mut crumbs = Vec::new();
        let mut current = node.parent;
        while let Some(idx) = current {
            match self.get_node(idx) {
                Some(parent) => {
                    crumbs.push(&parent.data);
                    current = parent.parent;
                }
                None => break,
            }
        }
        crumbs.reverse();
        Ok(crumbs)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        if let Some(root) = self.root {
            self.calculate_depth(root)
        } else {
            0
        }
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Urls of all leaf nodes, in pre-order.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_urls(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(_, node)| node.data.url.clone())
            .collect()
    }
}

pub struct TreeIterator<'a> {
    tree: &'a NodeTree,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a NodeTree) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = tree.root() {
            stack.push(root);
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    tree: &'a NodeTree,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(tree: &'a NodeTree) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = tree.root() {
            stack.push((root, false));
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}
