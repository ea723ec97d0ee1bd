//! # Conversation Metrics
//!
//! Quantitative health signals for dialogues between autonomous nodes. The
//! engine reads a turn log produced elsewhere, computes lexical and semantic
//! measures over bounded windows of it, and returns one snapshot per call.
//!
//! ## Core Components
//!
//! - **lexical**: diversity, growth, reference rates, topic drift, coherence, convergence
//! - **novelty**: n-grams the latest turns introduce
//! - **patterns**: quoted callbacks to much earlier turns
//! - **embedding**: provider trait, offline provider, bounded shared cache
//! - **semantic**: cosine-based convergence, drift, centroid and turn novelty
//! - **health**: status and recommendations from convergence and drift
//! - **trend**: slope classification over snapshot history
//! - **snapshot**: the engine that ties it together
//!
//! ## Design Philosophy
//!
//! - **Pure over snapshots**: every metric is a function of an immutable slice of turns
//! - **Sentinels, not errors**: short logs and empty denominators have fixed answers
//! - **One shared resource**: the embedding cache is the only mutable state, and it
//!   is passed in explicitly

pub mod config;
pub mod embedding;
pub mod error;
pub mod health;
pub mod lexical;
pub mod novelty;
pub mod patterns;
pub mod semantic;
pub mod snapshot;
pub mod text;
pub mod trend;

pub use config::*;
pub use embedding::*;
pub use error::*;
pub use health::*;
pub use lexical::*;
pub use novelty::*;
pub use patterns::*;
pub use semantic::*;
pub use snapshot::*;
pub use trend::*;
