//! Request traces: recovered warnings and phase timings.
//!
//! Failures the pipeline recovers from locally (a retrieval call that came
//! back empty-handed, a sub-answer that had to be replaced by a sentinel)
//! never surface as errors; they are recorded here and returned with the
//! answer, so callers can tell a clean answer from a degraded one.

use serde::{Deserialize, Serialize};

/// Pipeline stage a warning originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Compound detection / splitting.
    Decompose,
    /// Step-back expansion.
    StepBack,
    /// Multi-query expansion.
    MultiQuery,
    /// Per-variant retrieval.
    Retrieval,
    /// Evidence re-ranking.
    Rerank,
    /// Per-unit sub-answer generation.
    SubAnswer,
}

/// One locally recovered failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceWarning {
    /// Stage the failure occurred in.
    pub stage: PipelineStage,
    /// Query text the stage was processing, when one applies.
    pub query: Option<String>,
    /// Human-readable description of what was recovered from.
    pub message: String,
}

/// Wall-clock breakdown of one request, in milliseconds per phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeBreakdown {
    /// Decomposition plus expansion time.
    pub expansion_ms: f64,
    /// Concurrent retrieval fan-out time.
    pub retrieval_ms: f64,
    /// Merge, dedup, and re-rank time.
    pub fusion_ms: f64,
    /// Sub-answer and synthesis generation time.
    pub synthesis_ms: f64,
    /// End-to-end request time.
    pub total_ms: f64,
}

/// Observability record returned with every answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestTrace {
    /// Locally recovered failures, in occurrence order.
    pub warnings: Vec<TraceWarning>,
    /// Per-phase timings.
    pub timings: TimeBreakdown,
}

impl RequestTrace {
    /// Create an empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a recovered failure.
    pub fn warn<M: Into<String>>(
        &mut self,
        stage: PipelineStage,
        query: Option<&str>,
        message: M,
    ) {
        self.warnings.push(TraceWarning {
            stage,
            query: query.map(str::to_string),
            message: message.into(),
        });
    }

    /// Warnings recorded for one stage.
    pub fn warnings_for(&self, stage: PipelineStage) -> impl Iterator<Item = &TraceWarning> {
        self.warnings.iter().filter(move |w| w.stage == stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_accumulate_in_order() {
        let mut trace = RequestTrace::new();
        trace.warn(PipelineStage::Retrieval, Some("variant a"), "unreachable");
        trace.warn(PipelineStage::SubAnswer, Some("unit b"), "sentinel used");

        assert_eq!(trace.warnings.len(), 2);
        assert_eq!(trace.warnings[0].stage, PipelineStage::Retrieval);
        assert_eq!(trace.warnings[1].query.as_deref(), Some("unit b"));
    }

    #[test]
    fn test_warnings_for_filters_by_stage() {
        let mut trace = RequestTrace::new();
        trace.warn(PipelineStage::Retrieval, Some("a"), "x");
        trace.warn(PipelineStage::Retrieval, Some("b"), "y");
        trace.warn(PipelineStage::Rerank, None, "z");

        assert_eq!(trace.warnings_for(PipelineStage::Retrieval).count(), 2);
        assert_eq!(trace.warnings_for(PipelineStage::Rerank).count(), 1);
        assert_eq!(trace.warnings_for(PipelineStage::StepBack).count(), 0);
    }

    #[test]
    fn test_serde_round_trip() {
        let mut trace = RequestTrace::new();
        trace.warn(PipelineStage::MultiQuery, Some("q"), "no paraphrases");
        trace.timings.total_ms = 12.5;

        let json = serde_json::to_string(&trace).unwrap();
        let back: RequestTrace = serde_json::from_str(&json).unwrap();
        assert_eq!(back, trace);
    }
}
