//! Evidence sets: deduplicated, ordered retrieval results.

use std::collections::HashSet;

use crate::document::Document;

/// The deduplicated, merged sequence of documents for one request.
///
/// Documents are keyed by identity; the first insertion wins and later
/// duplicates are discarded. Because results are inserted in plan priority
/// order (unit queries before their expansions), a document found by both
/// the original query and an expansion is credited to the original; the
/// expansions are supplementary, not primary.
#[derive(Debug, Clone, Default)]
pub struct EvidenceSet {
    documents: Vec<Document>,
    seen: HashSet<String>,
}

impl EvidenceSet {
    /// Create an empty evidence set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document unless its identity is already present.
    /// Returns true when the document was added.
    pub fn insert(&mut self, document: Document) -> bool {
        if !self.seen.insert(document.id().to_string()) {
            return false;
        }
        self.documents.push(document);
        true
    }

    /// Insert every document in order.
    pub fn extend<I: IntoIterator<Item = Document>>(&mut self, documents: I) {
        for document in documents {
            self.insert(document);
        }
    }

    /// True when the identity is already present.
    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Documents in rank order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Consume the set, yielding documents in rank order.
    pub fn into_documents(self) -> Vec<Document> {
        self.documents
    }

    /// Number of distinct documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// True when no documents were retained.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Rebuild the set in the order a re-ranker returned.
    ///
    /// Documents the re-ranker invented (unknown identity) are dropped;
    /// documents it omitted are appended in their previous order, so the
    /// result holds exactly the same identities as `self`.
    pub fn reordered(&self, ranked: Vec<Document>) -> EvidenceSet {
        let mut result = EvidenceSet::new();
        for document in ranked {
            if self.contains(document.id()) {
                result.insert(document);
            }
        }
        for document in &self.documents {
            result.insert(document.clone());
        }
        result
    }

    /// Concatenated document contents, for prompt assembly.
    pub fn joined_content(&self, separator: &str) -> String {
        self.documents
            .iter()
            .map(Document::content)
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl IntoIterator for EvidenceSet {
    type Item = Document;
    type IntoIter = std::vec::IntoIter<Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.into_iter()
    }
}
