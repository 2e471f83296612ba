//! Embedder trait and a deterministic offline implementation.

use async_trait::async_trait;

use super::RetrievalError;

/// Vector length of [`HashingEmbedder::default`].
pub const DEFAULT_HASHING_DIMENSION: usize = 256;

/// Text → vector. All vectors from one embedder have the same dimension.
///
/// **Interaction**: Used by `InMemoryVectorStore` when indexing and when searching.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// One vector per input text, in input order.
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, RetrievalError>;

    fn dimension(&self) -> usize;
}

/// Bag-of-words feature hashing, L2-normalized.
///
/// Lowercased alphanumeric tokens are hashed (FNV-1a) into `dimension` buckets.
/// Needs no network and gives stable vectors, so the server can run without an
/// embedding API and tests stay deterministic.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_HASHING_DIMENSION,
        }
    }
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Result<Self, RetrievalError> {
        if dimension == 0 {
            return Err(RetrievalError::InvalidConfig("dimension must be > 0".into()));
        }
        Ok(Self { dimension })
    }

    fn fnv1a(token: &str) -> u64 {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for b in token.bytes() {
            hash ^= u64::from(b);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        hash
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dimension];
        let lower = text.to_lowercase();
        for token in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let bucket = (Self::fnv1a(token) % self.dimension as u64) as usize;
            v[bucket] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        v
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, RetrievalError> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Same text gives the same unit vector; case and punctuation are ignored.
    #[tokio::test]
    async fn hashing_embedder_is_deterministic_and_normalized() {
        let e = HashingEmbedder::default();
        let v = e.embed(&["Onboarding process!", "onboarding PROCESS"]).await.unwrap();
        assert_eq!(v.len(), 2);
        assert_eq!(v[0], v[1]);
        assert_eq!(v[0].len(), DEFAULT_HASHING_DIMENSION);
        let norm: f32 = v[0].iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    /// **Scenario**: Text without tokens embeds to the zero vector.
    #[tokio::test]
    async fn hashing_embedder_empty_text_is_zero() {
        let e = HashingEmbedder::new(8).unwrap();
        let v = e.embed(&["  ..  "]).await.unwrap();
        assert!(v[0].iter().all(|x| *x == 0.0));
        assert!(HashingEmbedder::new(0).is_err());
    }
}
