//! Fusion engine implementation.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::error::{QuiverError, Result};
use crate::expansion::{MultiQueryGenerator, QueryDecomposer, StepBackGenerator};
use crate::fusion::config::FusionConfig;
use crate::fusion::evidence::EvidenceSet;
use crate::fusion::plan::{PlanUnit, QueryPlan};
use crate::fusion::trace::{PipelineStage, RequestTrace, TraceWarning};
use crate::fusion::types::{Answer, AnswerError, SubAnswer};
use crate::generation::{GenerationRequest, TextGenerator};
use crate::query::{Query, QueryOrigin};
use crate::retrieval::{Reranker, Retriever};

const ANSWER_SYSTEM_PROMPT: &str = "You are a helpful assistant that answers questions \
using the provided context. Give precise and concise answers based only on the context. \
If the context does not contain the answer, respond with \"I don't know\".";

const SYNTHESIS_SYSTEM_PROMPT: &str = "You combine partial answers. Given a question that \
was split into parts and the answer to each part, synthesize one complete answer. Base \
the answer only on the partial answers provided.";

const CONTEXT_SEPARATOR: &str = "\n\n\n";

/// Builder for [`FusionEngine`].
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use quiver::fusion::{FusionConfig, FusionEngine};
/// use quiver::generation::openai::OpenAiGenerator;
/// use quiver::retrieval::MemoryRetriever;
///
/// # fn main() -> quiver::error::Result<()> {
/// let mut retriever = MemoryRetriever::new();
/// retriever.add("Rust is a systems programming language.");
///
/// let engine = FusionEngine::builder()
///     .generator(Arc::new(OpenAiGenerator::with_default_model("key")?))
///     .retriever(Arc::new(retriever))
///     .config(FusionConfig::default())
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct FusionEngineBuilder {
    generator: Option<Arc<dyn TextGenerator>>,
    retriever: Option<Arc<dyn Retriever>>,
    reranker: Option<Arc<dyn Reranker>>,
    config: FusionConfig,
}

impl FusionEngineBuilder {
    /// Create a builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the text-generation collaborator (required).
    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Set the retrieval collaborator (required).
    pub fn retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    /// Set the optional re-ranking collaborator.
    pub fn reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    /// Set the pipeline configuration.
    pub fn config(mut self, config: FusionConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the engine.
    ///
    /// # Errors
    ///
    /// Returns an error when a required collaborator is missing, when the
    /// configuration is invalid, or when re-ranking is enabled without a
    /// reranker.
    pub fn build(self) -> Result<FusionEngine> {
        let generator = self
            .generator
            .ok_or_else(|| QuiverError::invalid_config("a text generator is required"))?;
        let retriever = self
            .retriever
            .ok_or_else(|| QuiverError::invalid_config("a retriever is required"))?;
        self.config.validate()?;
        if self.config.enable_rerank && self.reranker.is_none() {
            return Err(QuiverError::invalid_config(
                "re-ranking is enabled but no reranker was supplied",
            ));
        }

        Ok(FusionEngine {
            step_back: StepBackGenerator::new(generator.clone()),
            multi_query: MultiQueryGenerator::new(generator.clone()),
            decomposer: QueryDecomposer::new(generator.clone()),
            generator,
            retriever,
            reranker: self.reranker,
            config: self.config,
        })
    }
}

/// The retrieval fusion engine.
///
/// Holds collaborators and configuration only; all per-request state (the
/// query plan, the evidence set) lives on the stack of one `answer` call,
/// so the engine can serve concurrent requests from behind an `Arc`.
pub struct FusionEngine {
    generator: Arc<dyn TextGenerator>,
    retriever: Arc<dyn Retriever>,
    reranker: Option<Arc<dyn Reranker>>,
    config: FusionConfig,
    step_back: StepBackGenerator,
    multi_query: MultiQueryGenerator,
    decomposer: QueryDecomposer,
}

impl FusionEngine {
    /// Create a new builder.
    pub fn builder() -> FusionEngineBuilder {
        FusionEngineBuilder::new()
    }

    /// The configuration this engine runs with.
    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Answer `query_text` with the full expand → retrieve → fuse →
    /// synthesize pipeline.
    ///
    /// The caller always receives either a complete [`Answer`] or an
    /// [`AnswerError`] carrying the partial query plan and evidence, never
    /// a silently truncated answer. Locally recovered failures (one variant
    /// failing to retrieve, one sub-answer degrading to a sentinel) are
    /// reported through the answer's trace.
    pub async fn answer(&self, query_text: &str) -> std::result::Result<Answer, AnswerError> {
        let started = Instant::now();
        let deadline = self.config.timeout.map(|timeout| started + timeout);
        let query = Query::user(query_text);
        let mut trace = RequestTrace::new();

        if query.is_empty() {
            return Err(AnswerError::new(
                QuiverError::invalid_argument("query must not be empty"),
                Vec::new(),
                Vec::new(),
            ));
        }

        // Decompose into units, then expand every unit concurrently.
        let phase = Instant::now();
        let units = match with_deadline(deadline, "decomposition", self.build_units(&query))
            .await
            .and_then(|result| result)
        {
            Ok(units) => units,
            Err(err) => return Err(AnswerError::new(err, vec![query.clone()], Vec::new())),
        };

        let expansions = units.iter().map(|unit| self.expand_unit(unit));
        let expanded = with_deadline(deadline, "query expansion", join_all(expansions)).await;
        let plan = match expanded {
            Ok(expanded) => {
                let mut plan = QueryPlan::new();
                for (unit, warnings) in expanded {
                    trace.warnings.extend(warnings);
                    plan.push_unit(unit);
                }
                plan
            }
            Err(err) => return Err(AnswerError::new(err, units, Vec::new())),
        };
        trace.timings.expansion_ms = millis_since(phase);
        debug!(
            units = plan.units().len(),
            queries = plan.len(),
            "query plan built"
        );

        // One independent retrieval call per variant, all concurrent. The
        // result order is fixed by plan order, not completion order.
        let phase = Instant::now();
        let top_k = self.config.top_k;
        let retrievals = plan.units().iter().enumerate().flat_map(|(index, unit)| {
            unit.queries().iter().map(move |variant| async move {
                let outcome = self.retriever.retrieve(variant.text(), top_k).await;
                (index, variant.text().to_string(), outcome)
            })
        });
        let outcomes = match with_deadline(deadline, "retrieval", join_all(retrievals)).await {
            Ok(outcomes) => outcomes,
            Err(err) => return Err(AnswerError::new(err, plan.to_queries(), Vec::new())),
        };
        trace.timings.retrieval_ms = millis_since(phase);

        // Fuse: merge in plan order, dedup by identity, first wins.
        let phase = Instant::now();
        let mut unit_evidence: Vec<EvidenceSet> =
            (0..plan.units().len()).map(|_| EvidenceSet::new()).collect();
        let mut evidence = EvidenceSet::new();
        for (index, variant_text, outcome) in outcomes {
            match outcome {
                Ok(documents) => {
                    for document in documents {
                        unit_evidence[index].insert(document.clone());
                        evidence.insert(document);
                    }
                }
                Err(err) => {
                    warn!(error = %err, query = variant_text.as_str(), "retrieval failed for one variant");
                    trace.warn(
                        PipelineStage::Retrieval,
                        Some(variant_text.as_str()),
                        err.to_string(),
                    );
                }
            }
        }

        // Optional re-rank against the original top-level query, never
        // against whichever variant retrieved a document.
        if self.config.enable_rerank {
            if let Some(reranker) = &self.reranker {
                let ranked = reranker.rerank(query.text(), evidence.documents().to_vec());
                match with_deadline(deadline, "re-ranking", ranked).await {
                    Ok(Ok(ranked)) => evidence = evidence.reordered(ranked),
                    Ok(Err(err)) => {
                        warn!(error = %err, "re-ranking failed, keeping fused order");
                        trace.warn(PipelineStage::Rerank, None, err.to_string());
                    }
                    Err(err) => {
                        return Err(AnswerError::new(
                            err,
                            plan.to_queries(),
                            evidence.into_documents(),
                        ));
                    }
                }
            }
        }
        trace.timings.fusion_ms = millis_since(phase);
        debug!(documents = evidence.len(), "evidence fused");

        // Synthesize. Compound requests get one sub-answer per unit over
        // that unit's own evidence slice, then a single joint synthesis
        // call; a single-unit request gets one call over everything.
        let phase = Instant::now();
        let answer_text = if plan.is_compound() {
            let sub_generations = plan.units().iter().zip(&unit_evidence).map(|(unit, slice)| {
                let request = answer_request(unit.unit().text(), slice);
                async move { self.generator.generate(&request).await }
            });
            let outputs =
                match with_deadline(deadline, "sub-answer generation", join_all(sub_generations))
                    .await
                {
                    Ok(outputs) => outputs,
                    Err(err) => {
                        return Err(AnswerError::new(
                            err,
                            plan.to_queries(),
                            evidence.into_documents(),
                        ));
                    }
                };

            let mut sub_answers = Vec::with_capacity(outputs.len());
            for (unit, output) in plan.units().iter().zip(outputs) {
                let unit_query = unit.unit();
                match output {
                    Ok(text) if !text.trim().is_empty() => sub_answers.push(SubAnswer {
                        query: unit_query.clone(),
                        text,
                    }),
                    Ok(_) => {
                        trace.warn(
                            PipelineStage::SubAnswer,
                            Some(unit_query.text()),
                            "generation returned empty output",
                        );
                        sub_answers.push(SubAnswer::sentinel(unit_query.clone()));
                    }
                    Err(err) => {
                        warn!(error = %err, query = unit_query.text(), "sub-answer generation failed, using sentinel");
                        trace.warn(PipelineStage::SubAnswer, Some(unit_query.text()), err.to_string());
                        sub_answers.push(SubAnswer::sentinel(unit_query.clone()));
                    }
                }
            }

            let request = synthesis_request(query.text(), &sub_answers);
            match with_deadline(deadline, "final synthesis", self.generator.generate(&request))
                .await
                .and_then(|result| result)
            {
                Ok(text) => text,
                Err(err) => {
                    return Err(AnswerError::new(
                        err,
                        plan.to_queries(),
                        evidence.into_documents(),
                    ));
                }
            }
        } else {
            let request = answer_request(query.text(), &evidence);
            match with_deadline(deadline, "final synthesis", self.generator.generate(&request))
                .await
                .and_then(|result| result)
            {
                Ok(text) => text,
                Err(err) => {
                    return Err(AnswerError::new(
                        err,
                        plan.to_queries(),
                        evidence.into_documents(),
                    ));
                }
            }
        };
        trace.timings.synthesis_ms = millis_since(phase);
        trace.timings.total_ms = millis_since(started);

        Ok(Answer {
            answer_text,
            evidence: evidence.into_documents(),
            query_plan: plan.to_queries(),
            trace,
        })
    }

    /// Decompose the query into unit queries, or pass it through untouched
    /// when decomposition is disabled (no classification call is made).
    async fn build_units(&self, query: &Query) -> Result<Vec<Query>> {
        if !self.config.enable_decomposition {
            return Ok(vec![query.clone()]);
        }
        self.decomposer.decompose(query).await
    }

    /// Build one unit's expansion set. Step-back and multi-query calls run
    /// concurrently; degradations come back as trace warnings.
    async fn expand_unit(&self, unit: &Query) -> (PlanUnit, Vec<TraceWarning>) {
        let mut plan_unit = PlanUnit::new(unit.clone());
        let mut warnings = Vec::new();

        let step_back = async {
            if self.config.enable_step_back {
                Some(self.step_back.expand(unit).await)
            } else {
                None
            }
        };
        let paraphrases = async {
            if self.config.enable_multi_query {
                Some(
                    self.multi_query
                        .generate(unit, self.config.multi_query_count)
                        .await,
                )
            } else {
                None
            }
        };
        let (step_back, paraphrases) = tokio::join!(step_back, paraphrases);

        if let Some(outcome) = step_back {
            match outcome {
                Ok(variant) if variant.origin() == QueryOrigin::StepBack => {
                    plan_unit.push(variant);
                }
                Ok(_) => warnings.push(TraceWarning {
                    stage: PipelineStage::StepBack,
                    query: Some(unit.text().to_string()),
                    message: "step-back degraded to the original query".to_string(),
                }),
                Err(err) => warnings.push(TraceWarning {
                    stage: PipelineStage::StepBack,
                    query: Some(unit.text().to_string()),
                    message: err.to_string(),
                }),
            }
        }

        if let Some(outcome) = paraphrases {
            match outcome {
                Ok(variants) => {
                    if variants.is_empty() {
                        warnings.push(TraceWarning {
                            stage: PipelineStage::MultiQuery,
                            query: Some(unit.text().to_string()),
                            message: "no usable paraphrases produced".to_string(),
                        });
                    }
                    for variant in variants {
                        plan_unit.push(variant);
                    }
                }
                Err(err) => warnings.push(TraceWarning {
                    stage: PipelineStage::MultiQuery,
                    query: Some(unit.text().to_string()),
                    message: err.to_string(),
                }),
            }
        }

        (plan_unit, warnings)
    }
}

/// Build the generation request answering `question` from `evidence`.
fn answer_request(question: &str, evidence: &EvidenceSet) -> GenerationRequest {
    let context = evidence.joined_content(CONTEXT_SEPARATOR);
    GenerationRequest::new(format!("Context:\n{context}\n\nQuestion: {question}"))
        .with_system(ANSWER_SYSTEM_PROMPT)
}

/// Build the joint synthesis request over all sub-answers.
fn synthesis_request(question: &str, sub_answers: &[SubAnswer]) -> GenerationRequest {
    let parts = sub_answers
        .iter()
        .map(|sub| format!("- {}: {}", sub.query.text(), sub.text))
        .collect::<Vec<_>>()
        .join("\n");
    GenerationRequest::new(format!("Question: {question}\n\nPartial answers:\n{parts}"))
        .with_system(SYNTHESIS_SYSTEM_PROMPT)
}

/// Milliseconds elapsed since `instant`.
fn millis_since(instant: Instant) -> f64 {
    instant.elapsed().as_secs_f64() * 1000.0
}

/// Run `fut` against an optional deadline.
///
/// When the deadline elapses the future is dropped, aborting whatever calls
/// it still had in flight, and a timeout error names the stage that was
/// interrupted.
async fn with_deadline<T>(
    deadline: Option<Instant>,
    stage: &str,
    fut: impl Future<Output = T>,
) -> Result<T> {
    match deadline {
        None => Ok(fut.await),
        Some(deadline) => {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(QuiverError::timeout(format!(
                    "deadline elapsed before {stage}"
                )));
            }
            tokio::time::timeout(remaining, fut)
                .await
                .map_err(|_| QuiverError::timeout(format!("deadline elapsed during {stage}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::MemoryRetriever;
    use async_trait::async_trait;
    use std::time::Duration;

    #[derive(Debug)]
    struct EchoGenerator;

    #[async_trait]
    impl TextGenerator for EchoGenerator {
        async fn generate(&self, request: &GenerationRequest) -> Result<String> {
            Ok(request.prompt.clone())
        }
    }

    fn retriever() -> Arc<MemoryRetriever> {
        let mut retriever = MemoryRetriever::new();
        retriever.add("Rust is a systems programming language.");
        Arc::new(retriever)
    }

    #[test]
    fn test_builder_requires_generator() {
        let result = FusionEngine::builder().retriever(retriever()).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_requires_retriever() {
        let result = FusionEngine::builder()
            .generator(Arc::new(EchoGenerator))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_rejects_rerank_without_reranker() {
        let result = FusionEngine::builder()
            .generator(Arc::new(EchoGenerator))
            .retriever(retriever())
            .config(FusionConfig {
                enable_rerank: true,
                ..Default::default()
            })
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let result = FusionEngine::builder()
            .generator(Arc::new(EchoGenerator))
            .retriever(retriever())
            .config(FusionConfig {
                top_k: 0,
                ..Default::default()
            })
            .build();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let engine = FusionEngine::builder()
            .generator(Arc::new(EchoGenerator))
            .retriever(retriever())
            .build()
            .unwrap();
        let result = engine.answer("   ").await;
        assert!(result.is_err());
        let error = result.unwrap_err();
        assert!(error.query_plan.is_empty());
        assert!(error.evidence.is_empty());
    }

    #[tokio::test]
    async fn test_prompt_builders() {
        let mut evidence = EvidenceSet::new();
        evidence.insert(crate::document::Document::new("a", "fact one", 0.9));
        evidence.insert(crate::document::Document::new("b", "fact two", 0.5));

        let request = answer_request("what is it?", &evidence);
        assert!(request.prompt.contains("fact one"));
        assert!(request.prompt.contains("fact two"));
        assert!(request.prompt.ends_with("Question: what is it?"));
        assert_eq!(request.system.as_deref(), Some(ANSWER_SYSTEM_PROMPT));

        let subs = vec![
            SubAnswer {
                query: Query::user("part a"),
                text: "answer a".to_string(),
            },
            SubAnswer::sentinel(Query::user("part b")),
        ];
        let request = synthesis_request("the whole question", &subs);
        assert!(request.prompt.contains("- part a: answer a"));
        assert!(request.prompt.contains("- part b: no answer available"));
    }

    #[tokio::test]
    async fn test_with_deadline_none_passes_through() {
        let value = with_deadline(None, "noop", async { 7 }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_with_deadline_elapses() {
        let deadline = Some(Instant::now() + Duration::from_millis(10));
        let result = with_deadline(deadline, "slow stage", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            7
        })
        .await;
        match result {
            Err(QuiverError::Timeout(message)) => {
                assert!(message.contains("slow stage"));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
