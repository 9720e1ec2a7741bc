//! Backend wire types
//!
//! Every response body is wrapped as `{ "status": ..., "data": ... }`;
//! only `data` is read.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::domain::Node;

/// Endpoint family of the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    V1,
    #[default]
    V2,
}

impl ApiVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V1 => "v1",
            ApiVersion::V2 => "v2",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ApiVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "v1" | "1" => Ok(ApiVersion::V1),
            "v2" | "2" => Ok(ApiVersion::V2),
            other => Err(format!("unknown api version: {other}")),
        }
    }
}

/// Failure talking to the backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("cannot decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Banner returned by `/hello`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hello {
    pub hello: String,
    pub org: String,
    pub project: String,
    pub version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreeData {
    pub root: Node,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub total: usize,
}

/// Reference to another node, used for crumbs and siblings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefNode {
    pub url: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TocEntry {
    pub title: String,
    pub id: String,
    pub level: u8,
    #[serde(deserialize_with = "null_as_default")]
    pub children: Vec<TocEntry>,
}

/// One rendered document of a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeDoc {
    pub title: String,
    pub html: String,
    #[serde(deserialize_with = "null_as_default")]
    pub toc: Vec<TocEntry>,
}

/// Full detail of a single node, as returned by `/tree/<url>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeDetail {
    pub url: String,
    pub title: String,
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub docs: Vec<NodeDoc>,
    #[serde(deserialize_with = "null_as_default")]
    pub crumbs: Vec<RefNode>,
    #[serde(deserialize_with = "null_as_default")]
    pub children: Vec<RefNode>,
    pub prev: Option<RefNode>,
    pub next: Option<RefNode>,
}

/// Result of a filter request; `urls` (v1), `nodes` or `hits` (v2).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilterResults {
    #[serde(deserialize_with = "null_as_default")]
    pub urls: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub nodes: Vec<RefNode>,
    #[serde(deserialize_with = "null_as_default")]
    pub hits: Vec<RefNode>,
    pub total: usize,
}

impl FilterResults {
    /// Matched urls, whichever field the backend filled.
    pub fn into_urls(self) -> Vec<String> {
        let mut urls = self.urls;
        urls.extend(self.nodes.into_iter().map(|n| n.url));
        urls.extend(self.hits.into_iter().map(|n| n.url));
        urls
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub fragments: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchResults {
    #[serde(deserialize_with = "null_as_default")]
    pub hits: Vec<SearchHit>,
    pub total: usize,
}

/// Push message from the backend's message channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    pub topic: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
}

const TREE_SYNCED: &str = "tree-synced";
const TREE_SYNCED_SUFFIX: &str = "tree.synced";

impl Message {
    /// True when the message announces a new tree for `source`.
    ///
    /// With a source configured only its own topic counts; without one any
    /// tree-synced notification does.
    pub fn is_tree_synced(&self, source: Option<&str>) -> bool {
        match source {
            Some(source) => self.topic == format!("{source}.{TREE_SYNCED_SUFFIX}"),
            None => {
                self.kind == TREE_SYNCED
                    || self.topic == TREE_SYNCED
                    || self.topic.ends_with(TREE_SYNCED_SUFFIX)
            }
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
