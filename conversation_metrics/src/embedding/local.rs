//! Offline embedding provider.

use super::{EmbeddingProvider, EmbeddingVector};
use crate::error::MetricsResult;
use crate::text::tokenize;

/// Default number of hash buckets.
pub const DEFAULT_HASH_DIMENSIONS: usize = 256;

/// Deterministic bag-of-tokens embedding that needs no model or network.
///
/// Each lowercase token is hashed with blake3 into one of `dimensions`
/// buckets; the count vector is then L2-normalised. Texts sharing more
/// vocabulary score a higher cosine similarity. Text without tokens embeds
/// to the zero vector.
#[derive(Debug, Clone)]
pub struct HashingEmbeddingProvider {
    dimensions: usize,
}

impl HashingEmbeddingProvider {
    pub const ID: &'static str = "local-hash";

    /// Create a provider with the given number of buckets (at least 1).
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    /// Length of every vector this provider returns.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn bucket(&self, token: &str) -> usize {
        let hash = blake3::hash(token.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&hash.as_bytes()[..8]);
        (u64::from_le_bytes(prefix) % self.dimensions as u64) as usize
    }
}

impl Default for HashingEmbeddingProvider {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_DIMENSIONS)
    }
}

impl EmbeddingProvider for HashingEmbeddingProvider {
    fn id(&self) -> &str {
        Self::ID
    }

    fn embed(&self, text: &str) -> MetricsResult<EmbeddingVector> {
        let mut embedding = vec![0.0f32; self.dimensions];
        for token in tokenize(text) {
            embedding[self.bucket(&token)] += 1.0;
        }

        let magnitude = embedding
            .iter()
            .map(|x| (*x as f64) * (*x as f64))
            .sum::<f64>()
            .sqrt() as f32;
        if magnitude > 0.0 {
            for value in &mut embedding {
                *value /= magnitude;
            }
        }
        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_is_deterministic() {
        let provider = HashingEmbeddingProvider::default();

        let a = provider.embed("The lantern burns low").unwrap();
        let b = provider.embed("the LANTERN burns   low").unwrap();

        assert_eq!(a.len(), DEFAULT_HASH_DIMENSIONS);
        assert_eq!(a, b);
    }

    #[test]
    fn test_embedding_is_unit_length() {
        let provider = HashingEmbeddingProvider::new(32);
        let v = provider.embed("one two three four").unwrap();

        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let provider = HashingEmbeddingProvider::new(8);
        let v = provider.embed("   ").unwrap();

        assert_eq!(v, vec![0.0; 8]);
    }
}
