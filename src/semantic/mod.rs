//! Semantic search over influencer profiles.
//!
//! # Architecture
//!
//! - `describe`: profile → embedding text, plus the string-only metadata
//!   flattening boundary
//! - `embeddings`: `Embedder` trait and the fastembed-backed model
//! - `index`: in-memory vector index, L2 k-NN, distance→similarity conversion
//! - `service`: Empty → Ready lifecycle, build and query orchestration

pub mod describe;
pub mod embeddings;
mod index;
mod service;

pub use embeddings::{Embedder, EmbeddingModel};
pub use service::{ProfileSearchService, SearchHit, SearchOptions, SearchServiceError};
