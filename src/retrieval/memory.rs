//! In-memory term-overlap retriever.
//!
//! A small, dependency-free [`Retriever`] used by the CLI and by tests: it
//! scores each stored document by the fraction of query terms it contains.
//! It is not a substitute for a real vector database, but it behaves like
//! one at the interface level (scored top-k results over a fixed corpus).

use std::collections::HashSet;

use async_trait::async_trait;

use crate::document::Document;
use crate::error::{QuiverError, Result};
use crate::retrieval::Retriever;

/// An indexed corpus entry.
#[derive(Debug, Clone)]
struct Entry {
    id: String,
    content: String,
    terms: HashSet<String>,
}

/// In-memory retrieval collaborator.
///
/// # Examples
///
/// ```
/// use quiver::retrieval::{MemoryRetriever, Retriever};
///
/// # async fn example() -> quiver::error::Result<()> {
/// let mut retriever = MemoryRetriever::new();
/// retriever.add("Rust is a systems programming language.");
/// retriever.add("Python is popular for machine learning.");
///
/// let docs = retriever.retrieve("rust language", 5).await?;
/// assert_eq!(docs.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryRetriever {
    entries: Vec<Entry>,
}

impl MemoryRetriever {
    /// Create an empty retriever.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document; its identity is derived from its position.
    pub fn add<C: Into<String>>(&mut self, content: C) {
        let id = format!("mem:{}", self.entries.len());
        self.add_with_id(id, content);
    }

    /// Add a document with an explicit identity.
    pub fn add_with_id<I: Into<String>, C: Into<String>>(&mut self, id: I, content: C) {
        let content = content.into();
        let terms = tokenize(&content);
        self.entries.push(Entry {
            id: id.into(),
            content,
            terms,
        });
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no documents are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lowercased alphanumeric terms of `text`.
fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|term| !term.is_empty())
        .map(|term| term.to_lowercase())
        .collect()
}

#[async_trait]
impl Retriever for MemoryRetriever {
    async fn retrieve(&self, query_text: &str, top_k: usize) -> Result<Vec<Document>> {
        if top_k == 0 {
            return Err(QuiverError::invalid_argument("top_k must be at least 1"));
        }

        let query_terms = tokenize(query_text);
        if query_terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(f32, &Entry)> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let overlap = query_terms
                    .iter()
                    .filter(|term| entry.terms.contains(*term))
                    .count();
                if overlap == 0 {
                    return None;
                }
                Some((overlap as f32 / query_terms.len() as f32, entry))
            })
            .collect();

        // Stable sort keeps insertion order among equal scores, so results
        // are deterministic across calls.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(score, entry)| Document::new(&entry.id, &entry.content, score))
            .collect())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
