//! Ephemeral similarity index. Built, queried and dropped within one request.

use chrono::{DateTime, Utc};

use crate::embedding::{cosine_similarity, EmbeddingClient};
use crate::rag::RagError;

#[derive(Debug, Clone)]
pub struct IndexedChunk {
    pub chunk_id: usize,
    pub content: String,
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct EphemeralIndex {
    chunks: Vec<IndexedChunk>,
}

impl EphemeralIndex {
    /// Embeds every chunk in one strict batch call.
    pub async fn build(chunks: Vec<String>, embeddings: &EmbeddingClient) -> Result<Self, RagError> {
        if chunks.is_empty() {
            return Err(RagError::EmptyDocument);
        }
        let vectors = embeddings.try_generate_batch(&chunks).await?;
        Ok(Self::from_embedded(chunks.into_iter().zip(vectors).collect()))
    }

    pub fn from_embedded(items: Vec<(String, Vec<f32>)>) -> Self {
        let created_at = Utc::now();
        let chunks = items
            .into_iter()
            .enumerate()
            .map(|(chunk_id, (content, embedding))| IndexedChunk {
                chunk_id,
                content,
                embedding,
                created_at,
            })
            .collect();
        Self { chunks }
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub async fn similarity_search(
        &self,
        query: &str,
        k: usize,
        embeddings: &EmbeddingClient,
    ) -> Result<Vec<&IndexedChunk>, RagError> {
        let query_embedding = embeddings.try_generate(query).await?;
        self.search_by_vector(&query_embedding, k)
    }

    /// Top `k` chunks by cosine similarity, descending. Ties keep insertion order.
    pub fn search_by_vector(&self, query: &[f32], k: usize) -> Result<Vec<&IndexedChunk>, RagError> {
        let mut scored = self
            .chunks
            .iter()
            .map(|chunk| -> Result<_, RagError> {
                Ok((cosine_similarity(query, &chunk.embedding)?, chunk))
            })
            .collect::<Result<Vec<_>, _>>()?;

        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        Ok(scored.into_iter().take(k).map(|(_, chunk)| chunk).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{EmbeddingError, EMBEDDING_DIMENSIONS};
    use crate::test_support::{FailingEmbeddings, HashEmbeddings};
    use std::sync::Arc;

    fn unit(axis: usize) -> Vec<f32> {
        let mut v = vec![0.0; 4];
        v[axis] = 1.0;
        v
    }

    #[test]
    fn test_search_ranks_by_similarity() {
        let index = EphemeralIndex::from_embedded(vec![
            ("education".to_string(), unit(0)),
            ("experience".to_string(), unit(1)),
            ("skills".to_string(), vec![0.0, 0.9, 0.1, 0.0]),
        ]);
        let hits = index.search_by_vector(&unit(1), 2).unwrap();
        let contents: Vec<_> = hits.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["experience", "skills"]);
    }

    #[test]
    fn test_search_ties_keep_insertion_order() {
        let index = EphemeralIndex::from_embedded(vec![
            ("first".to_string(), unit(2)),
            ("second".to_string(), unit(2)),
            ("third".to_string(), unit(2)),
            ("other".to_string(), unit(0)),
        ]);
        let hits = index.search_by_vector(&unit(2), 3).unwrap();
        let ids: Vec<_> = hits.iter().map(|c| c.chunk_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_search_returns_fewer_than_k_when_small() {
        let index = EphemeralIndex::from_embedded(vec![("only".to_string(), unit(0))]);
        assert_eq!(index.search_by_vector(&unit(0), 3).unwrap().len(), 1);
    }

    #[test]
    fn test_search_dimension_mismatch_surfaces() {
        let index = EphemeralIndex::from_embedded(vec![("x".to_string(), unit(0))]);
        assert!(matches!(
            index.search_by_vector(&[1.0, 0.0], 1),
            Err(RagError::Embedding(EmbeddingError::DimensionMismatch { .. }))
        ));
    }

    #[tokio::test]
    async fn test_build_and_query() {
        let embeddings = EmbeddingClient::new(Arc::new(HashEmbeddings));
        let chunks = vec![
            "Bachelor of Science in Physics from MIT".to_string(),
            "Five years building Kafka pipelines at Acme".to_string(),
        ];
        let index = EphemeralIndex::build(chunks, &embeddings).await.unwrap();
        assert_eq!(index.chunk_count(), 2);
        assert_eq!(index.chunks[0].embedding.len(), EMBEDDING_DIMENSIONS);

        let hits = index.similarity_search("kafka pipelines", 1, &embeddings).await.unwrap();
        assert_eq!(hits[0].chunk_id, 1);
    }

    #[tokio::test]
    async fn test_build_surfaces_provider_failure() {
        let embeddings = EmbeddingClient::new(Arc::new(FailingEmbeddings));
        let result = EphemeralIndex::build(vec!["text".to_string()], &embeddings).await;
        assert!(matches!(result, Err(RagError::Embedding(EmbeddingError::Provider(_)))));
    }

    #[tokio::test]
    async fn test_build_rejects_empty_chunk_list() {
        let embeddings = EmbeddingClient::new(Arc::new(HashEmbeddings));
        assert!(matches!(
            EphemeralIndex::build(Vec::new(), &embeddings).await,
            Err(RagError::EmptyDocument)
        ));
    }
}
