//! Infrastructure layer: backend access and DI container
//!
//! This layer implements I/O boundary traits and wires up services.

pub mod api;
pub mod di;
pub mod error;
pub mod http;
pub mod messages;
pub mod traits;

pub use error::{InfraError, InfraResult};
