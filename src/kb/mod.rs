//! Knowledge base loading and in-memory semantic indexing

pub mod index;
pub mod loader;

pub use index::assemble_context;
pub use index::KnowledgeIndex;
pub use loader::LoadedKnowledgeBase;
pub use loader::load_dir;
pub use loader::split_into_passages;
