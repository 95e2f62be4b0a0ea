//! Result and error types returned by the fusion engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::Document;
use crate::error::QuiverError;
use crate::fusion::trace::RequestTrace;
use crate::query::Query;

/// Sentinel text substituted for a sub-answer whose generation call failed.
pub const NO_ANSWER_SENTINEL: &str = "no answer available";

/// A complete pipeline result.
///
/// `evidence` and `query_plan` are included for observability and
/// debugging; downstream callers only need `answer_text` for correctness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// The synthesized answer.
    pub answer_text: String,
    /// Fused evidence in rank order.
    pub evidence: Vec<Document>,
    /// Every query variant that was retrieved for, in priority order.
    pub query_plan: Vec<Query>,
    /// Recovered warnings and phase timings.
    pub trace: RequestTrace,
}

/// Partial answer for one unit of a compound query.
///
/// Exists only between per-unit generation and final synthesis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubAnswer {
    /// The unit this answers.
    pub query: Query,
    /// Synthesized partial answer, or [`NO_ANSWER_SENTINEL`].
    pub text: String,
}

impl SubAnswer {
    /// A sub-answer carrying the sentinel text.
    pub fn sentinel(query: Query) -> Self {
        Self {
            query,
            text: NO_ANSWER_SENTINEL.to_string(),
        }
    }

    /// True when this sub-answer is the sentinel substitute.
    pub fn is_sentinel(&self) -> bool {
        self.text == NO_ANSWER_SENTINEL
    }
}

/// Fatal request failure, with partial state attached for diagnosis.
///
/// Only two conditions are fatal: a generation failure on the final
/// synthesis call, and deadline expiry. Everything else degrades locally
/// and is reported through [`RequestTrace`] warnings instead.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct AnswerError {
    /// The underlying failure.
    #[source]
    pub kind: QuiverError,
    /// The query plan as far as it was built.
    pub query_plan: Vec<Query>,
    /// The evidence fused before the failure.
    pub evidence: Vec<Document>,
}

impl AnswerError {
    /// Wrap a fatal failure with its partial diagnostics.
    pub fn new(kind: QuiverError, query_plan: Vec<Query>, evidence: Vec<Document>) -> Self {
        Self {
            kind,
            query_plan,
            evidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_sub_answer() {
        let query = Query::user("part one");
        let sub = SubAnswer::sentinel(query.clone());
        assert!(sub.is_sentinel());
        assert_eq!(sub.text, NO_ANSWER_SENTINEL);

        let real = SubAnswer {
            query,
            text: "an actual answer".to_string(),
        };
        assert!(!real.is_sentinel());
    }

    #[test]
    fn test_answer_error_display_and_diagnostics() {
        let error = AnswerError::new(
            QuiverError::generation("model unreachable"),
            vec![Query::user("q")],
            vec![Document::new("d", "content", 0.5)],
        );

        assert_eq!(error.to_string(), "Generation error: model unreachable");
        assert_eq!(error.query_plan.len(), 1);
        assert_eq!(error.evidence.len(), 1);
    }

    #[test]
    fn test_answer_serialization() {
        let answer = Answer {
            answer_text: "text".to_string(),
            evidence: vec![Document::new("d", "content", 0.5)],
            query_plan: vec![Query::user("q")],
            trace: RequestTrace::new(),
        };
        let json = serde_json::to_value(&answer).unwrap();
        assert_eq!(json["answer_text"], "text");
        assert_eq!(json["evidence"][0]["id"], "d");
    }
}
