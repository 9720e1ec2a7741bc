//! Document model and transformation into render output.

pub mod element;
pub mod orphan;
pub mod parse;
pub mod registry;
pub mod transform;

pub use element::{Attribute, Child, ElementNode};
pub use orphan::{promote_orphans, remove_blank, OrphanSelector};
pub use parse::parse_fragment;
pub use registry::{Fragment, Props, RenderFn, TransformRegistry};
pub use transform::{DocumentTransformer, FallbackFn, PreformattedFn, TransformOptions};
