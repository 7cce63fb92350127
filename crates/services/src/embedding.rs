use std::env;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::EmbeddingError;

/// Dimension of the local fallback embedding.
pub const EMBEDDING_DIM: usize = 512;

#[derive(Clone, Debug)]
pub struct EmbeddingConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl EmbeddingConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("CAMPUS_EMBED_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = env::var("CAMPUS_EMBED_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".into());
        let model = env::var("CAMPUS_EMBED_MODEL")
            .unwrap_or_else(|_| "text-embedding-3-small".into());
        Some(Self {
            base_url,
            api_key,
            model,
        })
    }
}

/// Produces text embeddings, preferring a remote model and degrading to a
/// deterministic local token-hash vector when the remote call fails.
#[derive(Clone)]
pub struct EmbeddingService {
    client: Client,
    config: Option<EmbeddingConfig>,
}

impl EmbeddingService {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(EmbeddingConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<EmbeddingConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    /// Embed the given text. Never fails: any remote problem downgrades to
    /// the local fallback so callers can keep operating.
    pub async fn embed(&self, text: &str) -> Vec<f32> {
        match self.embed_remote(text).await {
            Ok(embedding) => embedding,
            Err(err) => {
                warn!(error = %err, "remote embedding failed, using local fallback");
                local_embedding(text)
            }
        }
    }

    /// Embed via the configured remote model.
    ///
    /// # Errors
    ///
    /// Returns `EmbeddingError` when the service is disabled, the request
    /// fails, or the response carries no vector.
    pub async fn embed_remote(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let config = self.config.as_ref().ok_or(EmbeddingError::Disabled)?;

        let url = format!("{}/embeddings", config.base_url.trim_end_matches('/'));
        let payload = EmbeddingRequest {
            model: config.model.clone(),
            input: text.to_string(),
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EmbeddingError::HttpStatus(response.status()));
        }

        let body: EmbeddingResponse = response.json().await?;
        let embedding = body
            .data
            .into_iter()
            .next()
            .map(|item| item.embedding)
            .filter(|embedding| !embedding.is_empty())
            .ok_or(EmbeddingError::EmptyResponse)?;

        Ok(embedding)
    }
}

//
// ─── LOCAL FALLBACK ────────────────────────────────────────────────────────────
//

/// Deterministic local embedding: whitespace tokens hashed into a fixed-size
/// vector, L2-normalized. Not semantically comparable to remote embeddings,
/// but keeps similarity queries operational when the remote model is down.
#[must_use]
pub fn local_embedding(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0_f32; EMBEDDING_DIM];
    for token in text.split_whitespace() {
        let slot = (fnv1a(token.as_bytes()) as usize) % EMBEDDING_DIM;
        vector[slot] += 1.0;
    }

    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in &mut vector {
            *v /= norm;
        }
    }
    vector
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = OFFSET;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

//
// ─── SIMILARITY ────────────────────────────────────────────────────────────────
//

/// Cosine similarity between two vectors.
///
/// Returns 0.0 for mismatched lengths or a zero-norm operand rather than
/// producing NaN.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot = a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>();
    let norm_a = a.iter().map(|v| v * v).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|v| v * v).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

//
// ─── BINARY CODEC ──────────────────────────────────────────────────────────────
//

/// Serialize an embedding for storage in a binary column.
///
/// # Errors
///
/// Returns `EmbeddingError::Codec` for non-finite components.
pub fn to_bytes(embedding: &[f32]) -> Result<Vec<u8>, EmbeddingError> {
    Ok(serde_json::to_vec(embedding)?)
}

/// Deserialize an embedding previously produced by [`to_bytes`].
///
/// # Errors
///
/// Returns `EmbeddingError::Codec` for malformed payloads.
pub fn from_bytes(bytes: &[u8]) -> Result<Vec<f32>, EmbeddingError> {
    Ok(serde_json::from_slice(bytes)?)
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    model: String,
    input: String,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_embedding_is_deterministic_and_normalized() {
        let a = local_embedding("fractions are fun");
        let b = local_embedding("fractions are fun");
        assert_eq!(a, b);
        assert_eq!(a.len(), EMBEDDING_DIM);

        let norm = a.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn identical_texts_have_unit_similarity() {
        let a = local_embedding("multiplying fractions step by step");
        let b = local_embedding("multiplying fractions step by step");
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn disjoint_texts_have_low_similarity() {
        let a = local_embedding("alpha beta gamma");
        let b = local_embedding("one two three");
        assert!(cosine_similarity(&a, &b) < 0.5);
    }

    #[test]
    fn zero_vectors_and_mismatched_lengths_are_guarded() {
        assert_eq!(cosine_similarity(&[0.0; 4], &[0.0; 4]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn empty_text_embeds_to_the_zero_vector() {
        let empty = local_embedding("");
        assert!(empty.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn bytes_roundtrip_preserves_the_vector() {
        let original = local_embedding("store me in a blob column");
        let bytes = to_bytes(&original).unwrap();
        let restored = from_bytes(&bytes).unwrap();
        assert_eq!(original, restored);
    }

    #[tokio::test]
    async fn unconfigured_service_falls_back_locally() {
        let service = EmbeddingService::new(None);
        assert!(!service.enabled());

        let embedding = service.embed("fractions are fun").await;
        assert_eq!(embedding, local_embedding("fractions are fun"));
    }
}
