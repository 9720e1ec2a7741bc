//! Transform registry: element type name to render function.

use std::collections::HashMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::debug;

/// Element attributes handed to a render function, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Props {
    entries: Vec<(String, String)>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Set `key`, replacing an existing value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = Props::new();
        for (k, v) in iter {
            props.insert(k, v);
        }
        props
    }
}

impl Serialize for Props {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// One item of transformed output: literal text or a rendered node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Fragment<R> {
    Text(String),
    Node(R),
}

impl<R> Fragment<R> {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Fragment::Text(text) => Some(text),
            Fragment::Node(_) => None,
        }
    }

    pub fn as_node(&self) -> Option<&R> {
        match self {
            Fragment::Node(node) => Some(node),
            Fragment::Text(_) => None,
        }
    }
}

/// Render function: `(props, transformed children, context) -> node`.
pub type RenderFn<R, C> = Box<dyn Fn(Props, Vec<Fragment<R>>, &C) -> R + Send + Sync>;

/// Maps lowercased element type names to render functions.
///
/// Registering a name twice replaces the earlier handler.
pub struct TransformRegistry<R, C = ()> {
    handlers: HashMap<String, RenderFn<R, C>>,
}

impl<R, C> Default for TransformRegistry<R, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, C> TransformRegistry<R, C> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register<F>(&mut self, name: &str, render: F) -> &mut Self
    where
        F: Fn(Props, Vec<Fragment<R>>, &C) -> R + Send + Sync + 'static,
    {
        let key = name.to_lowercase();
        if self.handlers.insert(key.clone(), Box::new(render)).is_some() {
            debug!("replacing transform for {}", key);
        }
        self
    }

    pub fn with<F>(mut self, name: &str, render: F) -> Self
    where
        F: Fn(Props, Vec<Fragment<R>>, &C) -> R + Send + Sync + 'static,
    {
        self.register(name, render);
        self
    }

    pub fn get(&self, name: &str) -> Option<&RenderFn<R, C>> {
        match self.handlers.get(name) {
            Some(render) => Some(render),
            None => self.handlers.get(&name.to_lowercase()),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<R, C> fmt::Debug for TransformRegistry<R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformRegistry")
            .field("names", &self.names())
            .finish()
    }
}
