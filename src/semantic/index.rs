//! Semantic index
//!
//! Precomputed embedding vectors for every knowledge base question, stored in
//! knowledge base order. Query-time lookup is a linear cosine-similarity scan
//! (O(N) per query; no approximate index is warranted at this scale) gated by
//! a confidence threshold.

use super::embeddings::{cosine_similarity, EmbeddingModel};
use crate::kb::KnowledgeBase;

/// Immutable embedding index over knowledge base questions.
#[derive(Debug, Clone)]
pub struct SemanticIndex {
    model: EmbeddingModel,
    vectors: Vec<Vec<f32>>,
}

impl SemanticIndex {
    /// Encode every question once; vectors share the knowledge base ordering.
    pub fn build(kb: &KnowledgeBase) -> Self {
        let model = EmbeddingModel::new();
        let vectors = kb
            .entries()
            .iter()
            .map(|entry| model.encode(&entry.question))
            .collect();

        Self { model, vectors }
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn embedding_dim(&self) -> usize {
        self.model.embedding_dim()
    }

    /// Best-scoring entry index for the query, gated by `threshold`.
    ///
    /// Returns `(None, best_score)` when nothing scores strictly above the
    /// threshold: a low-confidence guess is reported as no match. Ties keep
    /// the earliest knowledge base entry.
    pub fn best_match(&self, query: &str, threshold: f32) -> (Option<usize>, f32) {
        if self.vectors.is_empty() {
            return (None, 0.0);
        }

        let query_vec = self.model.encode(query);

        let mut best_index = 0usize;
        let mut best_score = f32::MIN;
        for (index, vector) in self.vectors.iter().enumerate() {
            let score = cosine_similarity(&query_vec, vector);
            if score > best_score {
                best_index = index;
                best_score = score;
            }
        }

        if best_score > threshold {
            (Some(best_index), best_score)
        } else {
            (None, best_score)
        }
    }
}
