//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod doc;
pub mod error;
pub mod filter;
pub mod node;

pub use arena::{NodeData, NodeTree, TreeNode};
pub use error::{DomainError, DomainResult};
pub use filter::{filter_tree, Selection};
pub use node::{Node, NodeMeta};
