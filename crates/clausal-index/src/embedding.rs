//! Deterministic embedding and vector math
//!
//! [`HashEmbedder`] is a bag-of-words embedder: every lower-cased
//! alphanumeric token is hashed into one of `dimension` buckets and the
//! resulting count vector is L2-normalised. Texts that share words get
//! positive cosine similarity, which is enough to exercise retrieval without
//! a model.
//!
//! # Examples
//!
//! ```rust
//! use clausal_index::embedding::{cosine_similarity, HashEmbedder};
//!
//! let embedder = HashEmbedder::new(256);
//! let a = embedder.vector("grace period for premium payment");
//! let b = embedder.vector("what is the grace period");
//! let c = embedder.vector("cataract surgery waiting time");
//! assert!(cosine_similarity(&a, &b) > cosine_similarity(&a, &c));
//! ```

use async_trait::async_trait;
use clausal_domain::{Embedder, ServiceError};
use sha2::{Digest, Sha256};

/// Default dimension for the hash embedder
pub const DEFAULT_DIMENSION: usize = 384;

/// Bag-of-words hashing embedder
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    /// Create an embedder producing `dimension`-length vectors
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    /// Compute the vector synchronously
    pub fn vector(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimension];

        for token in tokens(text) {
            let bucket = (token_hash(&token) % self.dimension as u64) as usize;
            embedding[bucket] += 1.0;
        }

        normalize(&mut embedding);
        embedding
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError> {
        Ok(self.vector(text))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// First eight bytes of the token's SHA-256, stable across builds
fn token_hash(token: &str) -> u64 {
    let digest = Sha256::digest(token.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

/// Scale a vector to unit length in place; zero vectors are left alone
pub fn normalize(vector: &mut [f32]) {
    let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        for value in vector.iter_mut() {
            *value /= magnitude;
        }
    }
}

/// Cosine similarity in `[-1, 1]`
///
/// Returns `0.0` when either vector has zero magnitude or the lengths
/// differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    (dot_product / (magnitude_a * magnitude_b)).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_embedding_deterministic() {
        let embedder = HashEmbedder::new(128);
        let text = "The quick brown fox jumps over the lazy dog";
        assert_eq!(embedder.vector(text), embedder.vector(text));
    }

    #[test]
    fn test_token_buckets_are_pinned() {
        assert_eq!(token_hash("grace"), 8341138067720835296);
        let embedding = HashEmbedder::new(64).vector("grace period");
        let expected = std::f32::consts::FRAC_1_SQRT_2;
        assert!((embedding[32] - expected).abs() < 1e-6);
        assert!((embedding[17] - expected).abs() < 1e-6);
    }

    #[test]
    fn test_hash_embedding_normalized() {
        let embedder = HashEmbedder::new(64);
        let embedding = embedder.vector("waiting period for pre-existing diseases");
        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_case_and_punctuation_insensitive() {
        let embedder = HashEmbedder::new(64);
        assert_eq!(embedder.vector("Grace Period!"), embedder.vector("grace, period"));
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let embedder = HashEmbedder::new(16);
        assert!(embedder.vector("  ...  ").iter().all(|v| *v == 0.0));
    }

    #[tokio::test]
    async fn test_embedder_trait() {
        let embedder = HashEmbedder::new(32);
        let vector = embedder.embed("hello").await.unwrap();
        assert_eq!(vector.len(), 32);
        assert_eq!(Embedder::dimension(&embedder), 32);
    }

    #[test]
    fn test_cosine_similarity_identical() {
        let vec = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&vec, &vec) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-4);
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_cosine_similarity_length_mismatch() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
    }
}
