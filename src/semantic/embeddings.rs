//! Sentence embedding model
//!
//! Deterministic normalized hashed term-frequency vectors. The encoder is
//! stateless so a built index stays immutable and encoding the same text
//! always produces the same vector (an exact question match scores 1.0 under
//! cosine similarity). It fills the same `encode` contract a pretrained
//! sentence-embedding model would.

/// Fixed embedding dimensionality.
pub const EMBEDDING_DIM: usize = 128;

/// Hashed term-frequency sentence encoder.
#[derive(Debug, Clone)]
pub struct EmbeddingModel {
    embedding_dim: usize,
}

impl EmbeddingModel {
    pub fn new() -> Self {
        Self {
            embedding_dim: EMBEDDING_DIM,
        }
    }

    pub fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    /// Encode text to a unit-length embedding vector.
    ///
    /// Text with no usable tokens encodes to the zero vector, which scores
    /// 0.0 against everything.
    pub fn encode(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.embedding_dim];

        for word in self.tokenize(text) {
            let idx = self.word_index(&word);
            embedding[idx] += 1.0;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for val in &mut embedding {
                *val /= norm;
            }
        }

        embedding
    }

    // Single-character tokens must contribute: questions that differ only in
    // a one-char term ("what is x" vs "what is y") need distinct vectors.
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect()
    }

    /// Stable word -> dimension mapping.
    fn word_index(&self, word: &str) -> usize {
        word.bytes()
            .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize))
            % self.embedding_dim
    }
}

impl Default for EmbeddingModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Cosine similarity between two vectors, in [-1, 1].
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_is_normalized() {
        let model = EmbeddingModel::new();
        let embedding = model.encode("how do I reset my password");
        assert_eq!(embedding.len(), EMBEDDING_DIM);

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_encode_deterministic() {
        let model = EmbeddingModel::new();
        let a = model.encode("what are your opening hours");
        let b = model.encode("what are your opening hours");
        assert_eq!(a, b);
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_encode_empty_is_zero_vector() {
        let model = EmbeddingModel::new();
        let embedding = model.encode("   ");
        assert!(embedding.iter().all(|&v| v == 0.0));
        assert_eq!(
            cosine_similarity(&embedding, &model.encode("anything here")),
            0.0
        );
    }

    #[test]
    fn test_similar_texts_score_higher() {
        let model = EmbeddingModel::new();
        let a = model.encode("reset my account password");
        let b = model.encode("password reset for my account");
        let c = model.encode("shipping rates to canada");

        assert!(cosine_similarity(&a, &b) > cosine_similarity(&a, &c));
    }

    #[test]
    fn test_cosine_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &b)).abs() < 0.01);
    }

    #[test]
    fn test_cosine_dimension_mismatch() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
    }
}
