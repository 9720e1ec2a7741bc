pub mod slug;
pub mod testing;

pub use slug::slugify;
