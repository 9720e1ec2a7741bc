//! Wire shape of a documentation tree node.

use serde::{Deserialize, Deserializer, Serialize};

/// Auxiliary, searchable metadata attached to a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeMeta {
    pub keywords: Vec<String>,
}

/// One entry in the documentation tree ("design aspect").
///
/// The root is identified by the empty `url`. Children keep backend order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub meta: NodeMeta,
    /// Missing or `null` children are read as a leaf.
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_node_without_children_field_when_decoding_then_is_leaf() {
        let node: Node = serde_json::from_str(r#"{"url":"a","title":"A"}"#).unwrap();
        assert!(node.is_leaf());
        assert!(node.tags.is_empty());
    }

    #[test]
    fn given_null_children_when_decoding_then_is_leaf() {
        let node: Node =
            serde_json::from_str(r#"{"url":"a","title":"A","children":null,"tags":null}"#)
                .unwrap();
        assert!(node.is_leaf());
    }

    #[test]
    fn given_nested_children_when_decoding_then_order_is_kept() {
        let json = r#"{"url":"","title":"Root","children":[
            {"url":"b","title":"B","children":[]},
            {"url":"a","title":"A","children":[]}
        ]}"#;
        let node: Node = serde_json::from_str(json).unwrap();
        let urls: Vec<_> = node.children.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(urls, vec!["b", "a"]);
        assert_eq!(node.count(), 3);
    }

    #[test]
    fn given_meta_keywords_when_decoding_then_they_are_read() {
        let node: Node =
            serde_json::from_str(r#"{"url":"a","meta":{"keywords":["button","cta"]}}"#).unwrap();
        assert_eq!(node.meta.keywords, vec!["button", "cta"]);
    }
}
