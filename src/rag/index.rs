//! In-memory vector index over the reference document's passages.
//!
//! Built once at startup and never mutated afterwards, so it is shared
//! across requests without locking.

use std::cmp::Ordering;

#[derive(Debug, Clone)]
pub struct IndexedPassage {
    /// Position of the passage in the document
    pub id: usize,
    pub text: String,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Clone, Copy)]
pub struct ScoredPassage<'a> {
    pub passage: &'a IndexedPassage,
    pub score: f32,
}

#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    passages: Vec<IndexedPassage>,
}

impl VectorIndex {
    /// Pair passages with their embeddings; both must be in document order
    pub fn from_embeddings(texts: Vec<String>, embeddings: Vec<Vec<f32>>) -> Self {
        let passages = texts
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(id, (text, embedding))| IndexedPassage { id, text, embedding })
            .collect();
        Self { passages }
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    /// The `top_k` passages most similar to `query`, best first.
    ///
    /// Equal scores keep document order.
    pub fn search(&self, query: &[f32], top_k: usize) -> Vec<ScoredPassage<'_>> {
        let mut results: Vec<ScoredPassage<'_>> = self
            .passages
            .iter()
            .map(|passage| ScoredPassage {
                passage,
                score: cosine_similarity(query, &passage.embedding),
            })
            .collect();

        // Stable sort, so ties stay in document order
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        results.truncate(top_k);
        results
    }
}

/// Cosine similarity; mismatched lengths or zero vectors score 0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|y| y * y).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> VectorIndex {
        VectorIndex::from_embeddings(
            vec!["rent".into(), "deposit".into(), "pets".into(), "rent again".into()],
            vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0], vec![1.0, 0.0, 0.0]],
        )
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_search_ranks_and_truncates() {
        let index = index();
        let results = index.search(&[0.9, 0.1, 0.0], 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].passage.text, "rent");
        assert_eq!(results[1].passage.text, "rent again");
    }

    #[test]
    fn test_top_k_larger_than_index() {
        let index = index();
        assert_eq!(index.search(&[0.0, 1.0, 0.0], 10).len(), 4);
        assert_eq!(index.search(&[0.0, 1.0, 0.0], 10)[0].passage.id, 1);
    }

    #[test]
    fn test_empty_index() {
        let index = VectorIndex::default();
        assert!(index.is_empty());
        assert!(index.search(&[1.0], 3).is_empty());
    }
}
