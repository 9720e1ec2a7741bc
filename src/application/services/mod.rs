//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (ApiClient, MessageSource)
//! but are themselves concrete structs, not traits.

mod document;
mod navigation;
mod tree;

pub use document::{DocumentService, RenderedDoc};
pub use navigation::{FilterOutcome, NavigationService, Refresh};
pub use tree::{FlatView, TreeStore};
