//! Query representation with provenance tracking.
//!
//! Every reformulation produced by the expansion stages carries a
//! [`QueryOrigin`] tag and the text of the query it was derived from, so a
//! fused result set can always be traced back to the variant that found it.
//! Queries are immutable after construction.

use serde::{Deserialize, Serialize};

/// Where a query came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryOrigin {
    /// The raw query as submitted by the caller.
    User,
    /// A broader, more abstract restatement.
    StepBack,
    /// A paraphrase produced for recall diversity.
    MultiQuery,
    /// One independently answerable part of a compound query.
    SubQuery,
}

/// An immutable query string with provenance.
///
/// Derived queries keep a back-reference to the text of their parent for
/// lineage tracing only; the reference carries no ownership semantics.
///
/// # Examples
///
/// ```
/// use quiver::query::{Query, QueryOrigin};
///
/// let original = Query::user("What is machine learning?");
/// let broader = Query::step_back("What are the main branches of AI?", &original);
///
/// assert_eq!(original.origin(), QueryOrigin::User);
/// assert_eq!(broader.origin(), QueryOrigin::StepBack);
/// assert_eq!(broader.parent(), Some(original.text()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query {
    text: String,
    origin: QueryOrigin,
    parent: Option<String>,
}

impl Query {
    /// Create a user-submitted query. Surrounding whitespace is trimmed.
    pub fn user<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into().trim().to_string(),
            origin: QueryOrigin::User,
            parent: None,
        }
    }

    /// Create a step-back restatement of `parent`.
    pub fn step_back<S: Into<String>>(text: S, parent: &Query) -> Self {
        Self::derived(text, QueryOrigin::StepBack, parent)
    }

    /// Create a multi-query paraphrase of `parent`.
    pub fn paraphrase<S: Into<String>>(text: S, parent: &Query) -> Self {
        Self::derived(text, QueryOrigin::MultiQuery, parent)
    }

    /// Create a sub-query split out of the compound `parent`.
    pub fn sub_query<S: Into<String>>(text: S, parent: &Query) -> Self {
        Self::derived(text, QueryOrigin::SubQuery, parent)
    }

    fn derived<S: Into<String>>(text: S, origin: QueryOrigin, parent: &Query) -> Self {
        Self {
            text: text.into().trim().to_string(),
            origin,
            parent: Some(parent.text.clone()),
        }
    }

    /// The query text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Provenance of this query.
    pub fn origin(&self) -> QueryOrigin {
        self.origin
    }

    /// Text of the query this one was derived from, if any.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// True for any query that is not the caller's original.
    pub fn is_derived(&self) -> bool {
        self.origin != QueryOrigin::User
    }

    /// True when the trimmed query text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}
