use crate::chunk::Chunk;
use crate::error::{RecoError, Result};
use crate::similarity::rank_top_k;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit<'a> {
    pub chunk: &'a Chunk,
    pub score: f32,
}

/// Similarity-searchable store of embedded chunks.
pub trait VectorIndex {
    fn insert(&mut self, chunk: Chunk, embedding: Vec<f32>) -> Result<()>;

    /// Best `k` chunks for `query`, highest score first.
    fn search(&self, query: &[f32], k: usize) -> Vec<SearchHit<'_>>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exhaustive cosine search over every stored vector. Enough for a few
/// thousand chunks.
#[derive(Debug, Default)]
pub struct FlatIndex {
    chunks: Vec<Chunk>,
    embeddings: Vec<Vec<f32>>,
}

impl FlatIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dim(&self) -> Option<usize> {
        self.embeddings.first().map(Vec::len)
    }
}

impl VectorIndex for FlatIndex {
    fn insert(&mut self, chunk: Chunk, embedding: Vec<f32>) -> Result<()> {
        if let Some(dim) = self.dim() {
            if embedding.len() != dim {
                return Err(RecoError::ExternalService(format!(
                    "embedding dimension {} does not match index dimension {dim}",
                    embedding.len()
                )));
            }
        }
        self.chunks.push(chunk);
        self.embeddings.push(embedding);
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Vec<SearchHit<'_>> {
        rank_top_k(query, &self.embeddings, k)
            .into_iter()
            .map(|(idx, score)| SearchHit {
                chunk: &self.chunks[idx],
                score,
            })
            .collect()
    }

    fn len(&self) -> usize {
        self.chunks.len()
    }
}
