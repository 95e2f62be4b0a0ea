//! Step-back query expansion.

use std::sync::Arc;

use tracing::warn;

use crate::error::{QuiverError, Result};
use crate::expansion::parse;
use crate::generation::{GenerationRequest, TextGenerator};
use crate::query::Query;

const SYSTEM_PROMPT: &str = "You rewrite search queries. Given a question, respond with \
exactly one broader, more general question that steps back from its specifics to the \
underlying concept. Respond with the question only, no explanation.";

/// Produces one broader, conceptual restatement of a query.
///
/// A failed or unusable collaborator response falls back to the original
/// query, so this stage never fails a request on its own.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use quiver::expansion::StepBackGenerator;
/// use quiver::generation::openai::OpenAiGenerator;
/// use quiver::query::Query;
///
/// # async fn example() -> quiver::error::Result<()> {
/// let generator = Arc::new(OpenAiGenerator::with_default_model("key")?);
/// let step_back = StepBackGenerator::new(generator);
///
/// let query = Query::user("How does Rust's borrow checker handle closures?");
/// let broader = step_back.expand(&query).await?;
/// # Ok(())
/// # }
/// ```
pub struct StepBackGenerator {
    generator: Arc<dyn TextGenerator>,
}

impl StepBackGenerator {
    /// Create a step-back generator over the given collaborator.
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Expand `query` into its step-back restatement.
    ///
    /// Returns a new query tagged with step-back provenance, or a clone of
    /// the input when the collaborator fails or produces nothing usable.
    ///
    /// # Errors
    ///
    /// Only if `query` has empty text.
    pub async fn expand(&self, query: &Query) -> Result<Query> {
        if query.is_empty() {
            return Err(QuiverError::invalid_argument(
                "step-back input query must not be empty",
            ));
        }

        let request = GenerationRequest::new(query.text()).with_system(SYSTEM_PROMPT);
        let output = match self.generator.generate(&request).await {
            Ok(output) => output,
            Err(err) => {
                warn!(error = %err, query = query.text(), "step-back generation failed, keeping original query");
                return Ok(query.clone());
            }
        };

        match parse::parse_single(&output) {
            Some(text) if text != query.text() => Ok(Query::step_back(text, query)),
            _ => {
                warn!(query = query.text(), "step-back output unusable, keeping original query");
                Ok(query.clone())
            }
        }
    }
}
