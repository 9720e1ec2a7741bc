//! dskview: browse, filter and render a design system documentation tree.
//!
//! Layers, innermost first:
//! - `domain`: node tree, filtering and the markup-to-component transformer
//! - `application`: tree store, navigation and document rendering services
//! - `infrastructure`: HTTP and websocket backend access, selectors, wiring
//! - `cli`: argument parsing, command dispatch and terminal output

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
