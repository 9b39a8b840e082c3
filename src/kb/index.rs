//! In-memory embedding index with cosine top-k search

use std::sync::Arc;

use futures::stream;
use futures::StreamExt;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::llm::EmbeddingClient;
use crate::models::Passage;
use crate::models::ScoredPassage;

/// Maximum characters of passage text sent for embedding; bounds cost and
/// latency per collaborator call.
pub const MAX_EMBED_CHARS: usize = 5000;

/// Concurrent embedding requests during index build
const EMBED_CONCURRENCY: usize = 8;

struct IndexEntry {
    passage: Passage,
    embedding: Vec<f32>,
}

/// Precomputed embeddings for the whole knowledge base.
///
/// Built once at process start; read-only afterwards, so it can be shared
/// across concurrent sessions without locking. Search is a linear scan -
/// fine for a small static corpus.
pub struct KnowledgeIndex {
    entries: Vec<IndexEntry>,
    embedder: Arc<dyn EmbeddingClient>,
}

impl KnowledgeIndex {
    /// Embed every passage and build the index.
    ///
    /// Passages are embedded with bounded concurrency; results keep passage
    /// order so tie-breaking stays deterministic. A collaborator failure for
    /// a single passage drops that passage from the index (degraded
    /// retrieval, not a fatal abort).
    pub async fn build(
        passages: Vec<Passage>,
        embedder: Arc<dyn EmbeddingClient>,
        max_embed_chars: usize,
    ) -> Self {
        let total = passages.len();

        let entries: Vec<IndexEntry> = stream::iter(passages)
            .map(|passage| {
                let embedder = embedder.clone();
                async move {
                    let result = embedder
                        .embed(truncate_chars(&passage.text, max_embed_chars))
                        .await;
                    (passage, result)
                }
            })
            .buffered(EMBED_CONCURRENCY)
            .filter_map(|(passage, result)| async move {
                match result {
                    Ok(embedding) => Some(IndexEntry { passage, embedding }),
                    Err(e) => {
                        warn!("Skipping passage {} (embedding failed): {e}", passage.id);
                        None
                    }
                }
            })
            .collect()
            .await;

        info!("Knowledge index built: {}/{} passages embedded", entries.len(), total);

        Self { entries, embedder }
    }

    /// Top-k cosine similarity search.
    ///
    /// A query-embedding failure returns an empty result set - the caller
    /// treats it as "no context found", never a crash. Ties keep the
    /// original passage insertion order (stable sort); `k` larger than the
    /// corpus returns everything.
    pub async fn search(&self, query: &str, k: usize) -> Vec<ScoredPassage> {
        let query_embedding = match self.embedder.embed(query).await {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!("Query embedding failed, returning no matches: {e}");
                return Vec::new();
            }
        };

        let mut scored: Vec<ScoredPassage> = self
            .entries
            .iter()
            .map(|entry| ScoredPassage {
                passage: entry.passage.clone(),
                score: cosine_similarity(&query_embedding, &entry.embedding),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);

        debug!(
            "Top matches: {:?}",
            scored.iter().map(|s| s.passage.id.as_str()).collect::<Vec<_>>()
        );

        scored
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Concatenate ranked passages into a single context string, each annotated
/// with its source file and paragraph index.
pub fn assemble_context(results: &[ScoredPassage]) -> String {
    results
        .iter()
        .map(|s| {
            format!(
                "{} (Source: {}, Paragraph: {})",
                s.passage.text, s.passage.source_file, s.passage.paragraph_index
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

/// Cosine similarity: dot(a,b) / (|a| * |b|)
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Truncate to at most `max` characters on a char boundary
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
