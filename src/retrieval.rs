//! Retrieval and re-ranking collaborator interfaces.
//!
//! The fusion engine treats retrieval as an opaque nearest-neighbor search
//! over a pre-populated corpus: give it query text and a `top_k`, get back
//! scored [`Document`]s. Re-ranking is a second, optional collaborator that
//! reorders an evidence set by relevance to a query. Neither trait mandates
//! a wire format; in-process, HTTP, and RPC bindings are all fair game.

pub mod memory;

use std::fmt::Debug;

use async_trait::async_trait;

use crate::document::Document;
use crate::error::Result;

pub use memory::MemoryRetriever;

/// Opaque nearest-neighbor retrieval collaborator.
#[async_trait]
pub trait Retriever: Send + Sync + Debug {
    /// Retrieve the `top_k` most relevant documents for `query_text`.
    ///
    /// Returning fewer than `top_k` documents (including none) is not an
    /// error; an `Err` means the collaborator itself failed.
    async fn retrieve(&self, query_text: &str, top_k: usize) -> Result<Vec<Document>>;

    /// Name of this retriever for logging and diagnostics.
    fn name(&self) -> &str {
        "unknown"
    }
}

/// Optional relevance re-ranking collaborator.
#[async_trait]
pub trait Reranker: Send + Sync + Debug {
    /// Reorder `documents` by relevance to `query_text`, most relevant first.
    async fn rerank(&self, query_text: &str, documents: Vec<Document>) -> Result<Vec<Document>>;

    /// Name of this reranker for logging and diagnostics.
    fn name(&self) -> &str {
        "unknown"
    }
}
