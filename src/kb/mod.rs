//! Knowledge base: entry types and source loaders.

pub mod entry;
pub mod loader;

pub use entry::{Entry, KnowledgeBase};
pub use loader::{load, KbSource};
