//! Engine-level expansion behavior: degradation, set semantics, call gating.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quiver::document::Document;
use quiver::error::{QuiverError, Result};
use quiver::fusion::{FusionConfig, FusionEngine, PipelineStage};
use quiver::generation::{GenerationRequest, TextGenerator};
use quiver::query::QueryOrigin;
use quiver::retrieval::Retriever;

/// Generator that errors for the scripted roles and answers the rest.
#[derive(Debug, Default)]
struct PartialGenerator {
    classification: Option<&'static str>,
    step_back: Option<&'static str>,
    variations: Option<&'static str>,
    fail_step_back: bool,
    fail_multi_query: bool,
    classify_calls: AtomicUsize,
}

#[async_trait]
impl TextGenerator for PartialGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let system = request.system.as_deref().unwrap_or("");
        if system.contains("You classify search queries") {
            self.classify_calls.fetch_add(1, Ordering::SeqCst);
            return Ok(self.classification.unwrap_or("simple").to_string());
        }
        if system.contains("steps back") {
            if self.fail_step_back {
                return Err(QuiverError::generation("step-back backend down"));
            }
            return Ok(self.step_back.unwrap_or("").to_string());
        }
        if system.contains("paraphrases") {
            if self.fail_multi_query {
                return Err(QuiverError::generation("paraphrase backend down"));
            }
            return Ok(self.variations.unwrap_or("").to_string());
        }
        Ok("an answer".to_string())
    }
}

/// Retriever that only records which query texts it was asked for.
#[derive(Debug, Default)]
struct RecordingRetriever {
    queries: Mutex<Vec<String>>,
}

impl RecordingRetriever {
    fn seen(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Retriever for RecordingRetriever {
    async fn retrieve(&self, query_text: &str, _top_k: usize) -> Result<Vec<Document>> {
        self.queries.lock().unwrap().push(query_text.to_string());
        Ok(vec![Document::new(
            format!("doc::{query_text}"),
            query_text,
            1.0,
        )])
    }
}

fn build(
    generator: PartialGenerator,
    retriever: Arc<RecordingRetriever>,
    config: FusionConfig,
) -> FusionEngine {
    FusionEngine::builder()
        .generator(Arc::new(generator))
        .retriever(retriever)
        .config(config)
        .build()
        .unwrap()
}

fn expansion_only(step_back: bool, multi_query: bool) -> FusionConfig {
    FusionConfig {
        enable_step_back: step_back,
        enable_multi_query: multi_query,
        enable_decomposition: false,
        enable_rerank: false,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_step_back_failure_degrades_with_warning() {
    let retriever = Arc::new(RecordingRetriever::default());
    let engine = build(
        PartialGenerator {
            fail_step_back: true,
            ..Default::default()
        },
        retriever.clone(),
        expansion_only(true, false),
    );

    let answer = engine.answer("the question").await.unwrap();

    // Only the original query was retrieved for.
    assert_eq!(retriever.seen(), vec!["the question"]);
    assert_eq!(answer.trace.warnings_for(PipelineStage::StepBack).count(), 1);
}

#[tokio::test]
async fn test_step_back_variant_is_retrieved_after_original() {
    let retriever = Arc::new(RecordingRetriever::default());
    let engine = build(
        PartialGenerator {
            step_back: Some("the broader question"),
            ..Default::default()
        },
        retriever.clone(),
        expansion_only(true, false),
    );

    let answer = engine.answer("the question").await.unwrap();

    assert_eq!(retriever.seen(), vec!["the question", "the broader question"]);
    let origins: Vec<_> = answer.query_plan.iter().map(|q| q.origin()).collect();
    assert_eq!(origins, vec![QueryOrigin::User, QueryOrigin::StepBack]);
    assert!(answer.trace.warnings.is_empty());
}

#[tokio::test]
async fn test_multi_query_failure_degrades_with_warning() {
    let retriever = Arc::new(RecordingRetriever::default());
    let engine = build(
        PartialGenerator {
            fail_multi_query: true,
            ..Default::default()
        },
        retriever.clone(),
        expansion_only(false, true),
    );

    let answer = engine.answer("the question").await.unwrap();

    assert_eq!(retriever.seen(), vec!["the question"]);
    assert_eq!(
        answer.trace.warnings_for(PipelineStage::MultiQuery).count(),
        1
    );
}

#[tokio::test]
async fn test_paraphrases_duplicating_other_variants_collapse() {
    let retriever = Arc::new(RecordingRetriever::default());
    // The second paraphrase repeats the step-back text; the third repeats
    // the original. Neither should be retrieved twice.
    let engine = build(
        PartialGenerator {
            step_back: Some("the broader question"),
            variations: Some("1. a fresh paraphrase\n2. the broader question\n3. the question"),
            ..Default::default()
        },
        retriever.clone(),
        expansion_only(true, true),
    );

    let answer = engine.answer("the question").await.unwrap();

    assert_eq!(
        retriever.seen(),
        vec![
            "the question",
            "the broader question",
            "a fresh paraphrase",
        ]
    );
    assert_eq!(answer.query_plan.len(), 3);
}

#[tokio::test]
async fn test_decomposition_disabled_makes_no_classification_call() {
    let retriever = Arc::new(RecordingRetriever::default());
    let generator = Arc::new(PartialGenerator {
        classification: Some("compound"),
        ..Default::default()
    });
    let engine = FusionEngine::builder()
        .generator(generator.clone())
        .retriever(retriever)
        .config(FusionConfig {
            enable_step_back: false,
            enable_multi_query: false,
            enable_decomposition: false,
            enable_rerank: false,
            ..Default::default()
        })
        .build()
        .unwrap();

    let answer = engine.answer("Compare A and B").await.unwrap();
    assert_eq!(generator.classify_calls.load(Ordering::SeqCst), 0);
    assert_eq!(answer.query_plan.len(), 1);
    assert_eq!(answer.query_plan[0].text(), "Compare A and B");
}

#[tokio::test]
async fn test_simple_classification_passes_query_through_unchanged() {
    let retriever = Arc::new(RecordingRetriever::default());
    let engine = build(
        PartialGenerator {
            classification: Some("simple"),
            ..Default::default()
        },
        retriever.clone(),
        FusionConfig {
            enable_step_back: false,
            enable_multi_query: false,
            enable_decomposition: true,
            enable_rerank: false,
            ..Default::default()
        },
    );

    let answer = engine.answer("What is machine learning?").await.unwrap();

    assert_eq!(retriever.seen(), vec!["What is machine learning?"]);
    assert_eq!(answer.query_plan.len(), 1);
    assert_eq!(answer.query_plan[0].origin(), QueryOrigin::User);
    assert_eq!(answer.query_plan[0].text(), "What is machine learning?");
}
