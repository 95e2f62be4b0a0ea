//! Query expansion stages.
//!
//! Three independent strategies, each backed only by a text-generation
//! collaborator, produce the variants the fusion engine retrieves for:
//!
//! - [`StepBackGenerator`]: one broader, conceptual restatement
//! - [`MultiQueryGenerator`]: several intent-preserving paraphrases
//! - [`QueryDecomposer`]: splits a compound question into sub-questions
//!
//! Every stage degrades rather than fails: a collaborator error or
//! unusable output falls back to the original query (or an empty variant
//! list) and is logged, so a single flaky expansion never aborts a request.

pub mod decompose;
pub mod multi_query;
pub mod step_back;

mod parse;

pub use decompose::QueryDecomposer;
pub use multi_query::MultiQueryGenerator;
pub use step_back::StepBackGenerator;
