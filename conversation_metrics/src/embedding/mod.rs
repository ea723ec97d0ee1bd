//! Embedding boundary - the provider trait, an offline provider, and the
//! shared cache that sits in front of both.

mod cache;
mod local;

pub use cache::*;
pub use local::*;

use crate::error::MetricsResult;

/// A fixed-length embedding vector. Dimensionality is set by the provider.
pub type EmbeddingVector = Vec<f32>;

/// Converts text into an embedding vector.
///
/// Implementations may block on the network. Timeouts and retries belong to
/// the implementation, not to callers in this crate. A failed call returns
/// [`crate::MetricsError::ProviderFailure`].
pub trait EmbeddingProvider: Send + Sync {
    /// Stable identifier, part of the cache key (e.g. `"local-hash"`).
    fn id(&self) -> &str;

    /// Embed a single text.
    fn embed(&self, text: &str) -> MetricsResult<EmbeddingVector>;
}
