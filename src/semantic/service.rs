//! Profile search service: owns the embedding model and the vector index.
//!
//! Lifecycle is Empty → Ready, crossed exactly once by a successful
//! `initialize()`. Build failures are fatal and propagate; query-time failures
//! degrade to empty results (absence of matches is a valid outcome of a
//! best-effort ranking feature).

use std::sync::{mpsc, Arc, RwLock};
use std::time::Duration;

use crate::profiles::{Profile, ProfileStore};
use crate::semantic::describe::{describe, flatten_metadata};
use crate::semantic::embeddings::{Embedder, EmbeddingError};
use crate::semantic::index::{similarity_from_l2, IndexError, VectorIndex};

/// Floor on the candidate fetch so re-ranking always has headroom, even when
/// the configured cap is tiny.
const MIN_CANDIDATE_POOL: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum SearchServiceError {
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("index error: {0}")]
    Index(#[from] IndexError),

    #[error("embedding batch returned {got} vectors for {want} profiles")]
    BatchShortfall { want: usize, got: usize },

    #[error("internal error: {0}")]
    Internal(String),
}

/// Tunables for the query path. The source system disagreed with itself on
/// result caps, so both knobs are explicit configuration here.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Maximum hits returned to the caller.
    pub result_cap: usize,
    /// Candidates fetched from the index before re-ranking.
    pub candidate_pool: usize,
    /// Deadline for the embed-and-query step.
    pub timeout: Duration,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            result_cap: 2,
            candidate_pool: 10,
            timeout: Duration::from_secs(10),
        }
    }
}

/// A ranked search hit: the full typed profile plus its similarity score.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub profile: Profile,
    pub score: f32,
}

pub struct ProfileSearchService {
    embedder: Arc<dyn Embedder>,
    profiles: Arc<ProfileStore>,
    index: Arc<RwLock<VectorIndex>>,
    opts: SearchOptions,
}

impl ProfileSearchService {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        profiles: Arc<ProfileStore>,
        opts: SearchOptions,
    ) -> Self {
        let index = VectorIndex::new(embedder.dimensions());
        Self {
            embedder,
            profiles,
            index: Arc::new(RwLock::new(index)),
            opts,
        }
    }

    /// Build the index from the profile store: describe, embed, flatten,
    /// bulk-add, tag with the model name.
    ///
    /// Idempotent: a non-empty index is left untouched. Any failure here is
    /// fatal — the service must not claim readiness over a partial index.
    pub fn initialize(&self) -> Result<(), SearchServiceError> {
        let mut index = self
            .index
            .write()
            .map_err(|e| SearchServiceError::Internal(format!("index lock poisoned: {e}")))?;

        if index.count() > 0 {
            log::debug!("index already holds {} entries, skipping build", index.count());
            return Ok(());
        }

        let profiles = self.profiles.all();
        let descriptions: Vec<String> = profiles.iter().map(describe).collect();
        let embeddings = self.embedder.embed_batch(&descriptions)?;

        if embeddings.len() != profiles.len() {
            return Err(SearchServiceError::BatchShortfall {
                want: profiles.len(),
                got: embeddings.len(),
            });
        }

        // Build into a staging index and swap it in only once every profile is
        // indexed. A mid-build failure leaves the service Empty, so a retry
        // rebuilds from scratch instead of skipping past a partial index.
        let mut staged = VectorIndex::new(self.embedder.dimensions());
        for (profile, embedding) in profiles.iter().zip(embeddings) {
            staged.add(profile.id, embedding, flatten_metadata(profile))?;
        }
        staged.set_model_tag(self.embedder.name());
        *index = staged;

        log::info!(
            "indexed {} profiles with model '{}'",
            index.count(),
            self.embedder.name()
        );
        Ok(())
    }

    /// Number of indexed entries (0 while Empty).
    pub fn indexed_count(&self) -> usize {
        self.index.read().map(|idx| idx.count()).unwrap_or(0)
    }

    pub fn is_ready(&self) -> bool {
        self.indexed_count() > 0
    }

    /// Best-effort semantic search. Never errors: an empty index, a model
    /// mismatch, a failed or timed-out embedding call all degrade to an empty
    /// result list (logged for observability).
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        {
            let index = match self.index.read() {
                Ok(index) => index,
                Err(e) => {
                    log::warn!("search degraded: index lock poisoned: {e}");
                    return vec![];
                }
            };

            if index.is_empty() {
                return vec![];
            }

            // Embeddings from different models are not comparable; refuse to
            // rank rather than return meaningless distances.
            if index.model_tag() != Some(self.embedder.name()) {
                log::warn!(
                    "search degraded: index built with model {:?}, querying with '{}'",
                    index.model_tag(),
                    self.embedder.name()
                );
                return vec![];
            }
        }

        let k = self
            .opts
            .candidate_pool
            .max(self.opts.result_cap)
            .max(MIN_CANDIDATE_POOL);

        let embedder = Arc::clone(&self.embedder);
        let index = Arc::clone(&self.index);
        let query = query.to_string();

        let outcome = run_with_deadline(self.opts.timeout, move || -> Result<_, String> {
            let query_embedding = embedder.embed(&query).map_err(|e| e.to_string())?;
            let index = index.read().map_err(|e| e.to_string())?;
            index.query(&query_embedding, k).map_err(|e| e.to_string())
        });

        let matches = match outcome {
            Some(Ok(matches)) => matches,
            Some(Err(e)) => {
                log::warn!("search degraded: {e}");
                return vec![];
            }
            None => {
                log::warn!(
                    "search degraded: embed-and-query exceeded {:?}",
                    self.opts.timeout
                );
                return vec![];
            }
        };

        let mut hits: Vec<SearchHit> = matches
            .into_iter()
            .filter_map(|m| {
                let profile = self.profiles.get(m.id).cloned();
                if profile.is_none() {
                    log::warn!("indexed id {} has no profile, dropping", m.id);
                }
                profile.map(|profile| SearchHit {
                    profile,
                    score: similarity_from_l2(m.distance),
                })
            })
            .collect();

        // Stable sort: equidistant candidates keep the index's insertion order.
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(self.opts.result_cap);
        hits
    }
}

/// Run a job on a worker thread with a deadline. `None` on timeout; the
/// worker is detached and its result dropped.
fn run_with_deadline<T: Send + 'static>(
    timeout: Duration,
    job: impl FnOnce() -> T + Send + 'static,
) -> Option<T> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let _ = tx.send(job());
    });
    rx.recv_timeout(timeout).ok()
}
