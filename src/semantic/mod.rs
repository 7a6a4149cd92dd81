//! Semantic matching
//!
//! Sentence embeddings and the precomputed cosine-similarity index over
//! knowledge base questions.

pub mod embeddings;
pub mod index;

pub use embeddings::{cosine_similarity, EmbeddingModel, EMBEDDING_DIM};
pub use index::SemanticIndex;
