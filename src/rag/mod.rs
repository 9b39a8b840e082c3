//! Retrieval-augmented answer synthesis

pub mod answerer;

pub use answerer::RetrievalAugmentedAnswerer;
