//! Retrieval fusion engine.
//!
//! Drives the full expand → retrieve → fuse → synthesize pipeline for one
//! request: the query is optionally decomposed into units, each unit is
//! optionally expanded (step-back, multi-query), every variant is retrieved
//! independently and concurrently, the results are merged and deduplicated
//! into one [`EvidenceSet`], optionally re-ranked against the original
//! query, and handed to the generation collaborator for synthesis.
//!
//! All state is request-scoped: the engine holds collaborators and
//! configuration, never results, so concurrent `answer` calls share nothing
//! mutable.

pub mod config;
pub mod engine;
pub mod evidence;
pub mod plan;
pub mod trace;
pub mod types;

pub use config::FusionConfig;
pub use engine::{FusionEngine, FusionEngineBuilder};
pub use evidence::EvidenceSet;
pub use plan::{PlanUnit, QueryPlan};
pub use trace::{PipelineStage, RequestTrace, TimeBreakdown, TraceWarning};
pub use types::{Answer, AnswerError, SubAnswer, NO_ANSWER_SENTINEL};
