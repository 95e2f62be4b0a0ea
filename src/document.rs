//! Retrieved document representation.
//!
//! A [`Document`] is an opaque retrieval result: content, a stable string
//! identity, and the relevance score the retrieval collaborator assigned.
//! The fusion engine only reads and reorders documents; it never mutates
//! their content or identity.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A single retrieval result.
///
/// Identity is whatever the retrieval collaborator assigns (a chunk id, a
/// source+offset key). For collaborators that return bare text,
/// [`Document::from_content`] derives a content-hash identity instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    id: String,
    content: String,
    score: f32,
}

impl Document {
    /// Create a document with an explicit identity.
    pub fn new<I: Into<String>, C: Into<String>>(id: I, content: C, score: f32) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            score,
        }
    }

    /// Create a document whose identity is a hash of its content.
    pub fn from_content<C: Into<String>>(content: C, score: f32) -> Self {
        let content = content.into();
        let mut hasher = DefaultHasher::new();
        content.hash(&mut hasher);
        Self {
            id: format!("{:x}", hasher.finish()),
            content,
            score,
        }
    }

    /// Stable identity used for deduplication.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The document content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Relevance score assigned by the retrieval (or re-ranking) collaborator.
    pub fn score(&self) -> f32 {
        self.score
    }

    /// Copy of this document carrying a replacement score.
    pub fn with_score(&self, score: f32) -> Self {
        Self {
            id: self.id.clone(),
            content: self.content.clone(),
            score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_identity() {
        let doc = Document::new("resume:3", "Rust experience: 4 years", 0.82);
        assert_eq!(doc.id(), "resume:3");
        assert_eq!(doc.content(), "Rust experience: 4 years");
        assert_eq!(doc.score(), 0.82);
    }

    #[test]
    fn test_content_hash_identity_is_stable() {
        let a = Document::from_content("same text", 0.5);
        let b = Document::from_content("same text", 0.9);
        let c = Document::from_content("other text", 0.5);

        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn test_with_score_keeps_identity() {
        let doc = Document::new("d1", "content", 0.1);
        let rescored = doc.with_score(0.95);
        assert_eq!(rescored.id(), "d1");
        assert_eq!(rescored.score(), 0.95);
    }
}
