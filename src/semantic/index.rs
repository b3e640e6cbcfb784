//! In-memory vector index over profile embeddings.
//!
//! The index stores insertion-ordered `(id, embedding, metadata)` entries and
//! answers k-NN queries by L2 distance. Converting a distance to a similarity
//! score is kept out of the index — see [`similarity_from_l2`] — so the metric
//! assumption lives in exactly one named place.

use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("cannot store or query a zero-norm vector")]
    ZeroNormVector,

    #[error("entry with id {0} already indexed")]
    DuplicateId(u64),
}

#[derive(Debug, Clone)]
struct IndexEntry {
    id: u64,
    embedding: Vec<f32>,
    metadata: BTreeMap<String, String>,
}

/// A single k-NN match: id, raw L2 distance, and the stored string metadata.
#[derive(Debug, Clone)]
pub struct QueryMatch {
    pub id: u64,
    pub distance: f32,
    pub metadata: BTreeMap<String, String>,
}

/// Insertion-ordered vector index with string-only metadata.
///
/// Entries are append-only: the profile set is fixed for the process lifetime,
/// so there is no removal path. `model_tag` records which embedding model
/// produced the stored vectors; queries from a different model are meaningless
/// and the service refuses them.
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
    dimensions: usize,
    model_tag: Option<String>,
}

impl VectorIndex {
    pub fn new(dimensions: usize) -> Self {
        Self {
            entries: Vec::new(),
            dimensions,
            model_tag: None,
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn model_tag(&self) -> Option<&str> {
        self.model_tag.as_deref()
    }

    pub fn set_model_tag(&mut self, tag: &str) {
        self.model_tag = Some(tag.to_string());
    }

    /// Add one entry. Rejects wrong dimensionality, zero-norm vectors and
    /// duplicate ids.
    pub fn add(
        &mut self,
        id: u64,
        embedding: Vec<f32>,
        metadata: BTreeMap<String, String>,
    ) -> Result<(), IndexError> {
        if embedding.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                got: embedding.len(),
            });
        }

        if l2_norm(&embedding) < f32::EPSILON {
            return Err(IndexError::ZeroNormVector);
        }

        if self.entries.iter().any(|e| e.id == id) {
            return Err(IndexError::DuplicateId(id));
        }

        self.entries.push(IndexEntry {
            id,
            embedding,
            metadata,
        });

        Ok(())
    }

    /// k-NN query: the `k` entries closest to `query` by L2 distance,
    /// ascending. The sort is stable, so equidistant entries keep insertion
    /// order.
    pub fn query(&self, query: &[f32], k: usize) -> Result<Vec<QueryMatch>, IndexError> {
        if query.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                got: query.len(),
            });
        }

        if l2_norm(query) < f32::EPSILON {
            return Err(IndexError::ZeroNormVector);
        }

        let mut matches: Vec<QueryMatch> = self
            .entries
            .iter()
            .map(|entry| QueryMatch {
                id: entry.id,
                distance: l2_distance(query, &entry.embedding),
                metadata: entry.metadata.clone(),
            })
            .collect();

        matches.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(k);

        Ok(matches)
    }
}

/// Convert an L2 distance to a cosine-similarity score.
///
/// Valid only for L2 distance between L2-normalized vectors, where
/// `cos θ = 1 − d²/2`. For unit vectors `d ∈ [0, 2]`, so the score lies in
/// `[-1, 1]`; identical vectors (`d = 0`) score exactly 1. If the index metric
/// ever changes, this function is the single conversion point to replace.
pub fn similarity_from_l2(distance: f32) -> f32 {
    1.0 - (distance * distance) / 2.0
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(name: &str) -> BTreeMap<String, String> {
        let mut m = BTreeMap::new();
        m.insert("name".to_string(), name.to_string());
        m
    }

    #[test]
    fn test_new_index_empty() {
        let index = VectorIndex::new(3);
        assert_eq!(index.dimensions(), 3);
        assert_eq!(index.count(), 0);
        assert!(index.is_empty());
    }

    #[test]
    fn test_add_and_count() {
        let mut index = VectorIndex::new(3);
        index.add(1, vec![1.0, 0.0, 0.0], meta("a")).unwrap();
        assert_eq!(index.count(), 1);
    }

    #[test]
    fn test_add_dimension_mismatch() {
        let mut index = VectorIndex::new(3);
        let result = index.add(1, vec![1.0, 0.0], meta("a"));
        assert!(matches!(
            result,
            Err(IndexError::DimensionMismatch { expected: 3, got: 2 })
        ));
    }

    #[test]
    fn test_add_zero_norm_rejected() {
        let mut index = VectorIndex::new(3);
        let result = index.add(1, vec![0.0, 0.0, 0.0], meta("a"));
        assert!(matches!(result, Err(IndexError::ZeroNormVector)));
    }

    #[test]
    fn test_add_duplicate_id_rejected() {
        let mut index = VectorIndex::new(3);
        index.add(1, vec![1.0, 0.0, 0.0], meta("a")).unwrap();
        let result = index.add(1, vec![0.0, 1.0, 0.0], meta("b"));
        assert!(matches!(result, Err(IndexError::DuplicateId(1))));
    }

    #[test]
    fn test_query_orders_by_distance() {
        let mut index = VectorIndex::new(2);
        index.add(1, vec![0.0, 1.0], meta("far")).unwrap();
        index.add(2, vec![1.0, 0.0], meta("exact")).unwrap();
        index
            .add(
                3,
                vec![0.9486833, 0.31622776], // unit vector near (1, 0)
                meta("near"),
            )
            .unwrap();

        let matches = index.query(&[1.0, 0.0], 10).unwrap();
        let ids: Vec<u64> = matches.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert!(matches[0].distance < matches[1].distance);
        assert!(matches[1].distance < matches[2].distance);
    }

    #[test]
    fn test_query_truncates_to_k() {
        let mut index = VectorIndex::new(2);
        index.add(1, vec![1.0, 0.0], meta("a")).unwrap();
        index.add(2, vec![0.0, 1.0], meta("b")).unwrap();
        index.add(3, vec![0.6, 0.8], meta("c")).unwrap();

        let matches = index.query(&[1.0, 0.0], 2).unwrap();
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn test_query_ties_keep_insertion_order() {
        let mut index = VectorIndex::new(2);
        // Both orthogonal to the query, same distance.
        index.add(7, vec![0.0, 1.0], meta("first")).unwrap();
        index.add(3, vec![0.0, -1.0], meta("second")).unwrap();

        let matches = index.query(&[1.0, 0.0], 10).unwrap();
        assert_eq!(matches[0].id, 7);
        assert_eq!(matches[1].id, 3);
    }

    #[test]
    fn test_query_zero_norm_rejected() {
        let mut index = VectorIndex::new(2);
        index.add(1, vec![1.0, 0.0], meta("a")).unwrap();
        let result = index.query(&[0.0, 0.0], 5);
        assert!(matches!(result, Err(IndexError::ZeroNormVector)));
    }

    #[test]
    fn test_query_carries_metadata() {
        let mut index = VectorIndex::new(2);
        index.add(1, vec![1.0, 0.0], meta("Priya")).unwrap();

        let matches = index.query(&[1.0, 0.0], 1).unwrap();
        assert_eq!(matches[0].metadata.get("name").unwrap(), "Priya");
    }

    #[test]
    fn test_model_tag_roundtrip() {
        let mut index = VectorIndex::new(2);
        assert!(index.model_tag().is_none());
        index.set_model_tag("all-MiniLM-L6-v2");
        assert_eq!(index.model_tag(), Some("all-MiniLM-L6-v2"));
    }

    #[test]
    fn test_similarity_identical_vectors_score_one() {
        assert_eq!(similarity_from_l2(0.0), 1.0);
    }

    #[test]
    fn test_similarity_opposite_vectors_score_minus_one() {
        // Unit vectors pointing in opposite directions are distance 2 apart.
        assert!((similarity_from_l2(2.0) - (-1.0)).abs() < f32::EPSILON);
    }

    #[test]
    fn test_similarity_orthogonal_vectors_score_zero() {
        let d = 2.0_f32.sqrt();
        assert!(similarity_from_l2(d).abs() < 1e-6);
    }

    #[test]
    fn test_similarity_bounded_over_valid_distance_range() {
        let mut d = 0.0_f32;
        while d <= 2.0 {
            let score = similarity_from_l2(d);
            assert!((-1.0..=1.0).contains(&score), "score {score} out of range at d={d}");
            d += 0.01;
        }
    }

    #[test]
    fn test_similarity_decreases_with_distance() {
        assert!(similarity_from_l2(0.2) > similarity_from_l2(0.5));
        assert!(similarity_from_l2(0.5) > similarity_from_l2(0.8));
    }
}
