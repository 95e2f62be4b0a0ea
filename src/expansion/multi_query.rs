//! Multi-query paraphrase expansion.

use std::sync::Arc;

use tracing::warn;

use crate::error::{QuiverError, Result};
use crate::expansion::parse;
use crate::generation::{GenerationRequest, TextGenerator};
use crate::query::Query;

/// Default number of paraphrases to request.
pub const DEFAULT_VARIATION_COUNT: usize = 3;

const SYSTEM_PROMPT: &str = "You rewrite search queries. Given a question, produce \
distinct paraphrases that vary the wording and phrasing while preserving the intent. \
Respond with a numbered list of the paraphrases only, no explanation.";

/// Produces several intent-preserving paraphrases of a query.
///
/// One collaborator call yields up to `count` paraphrases. Exact-text
/// duplicates of each other or of the input are dropped before returning:
/// the recall gain from a duplicate is zero while its retrieval cost is not.
/// A failed call yields an empty list, never an error, so retrieval can
/// still proceed with the original query alone.
pub struct MultiQueryGenerator {
    generator: Arc<dyn TextGenerator>,
}

impl MultiQueryGenerator {
    /// Create a multi-query generator over the given collaborator.
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Generate up to `count` paraphrases of `query`.
    ///
    /// # Errors
    ///
    /// Only if `query` has empty text or `count` is zero.
    pub async fn generate(&self, query: &Query, count: usize) -> Result<Vec<Query>> {
        if query.is_empty() {
            return Err(QuiverError::invalid_argument(
                "multi-query input query must not be empty",
            ));
        }
        if count == 0 {
            return Err(QuiverError::invalid_argument(
                "variation count must be at least 1",
            ));
        }

        let prompt = format!(
            "Produce {count} paraphrases of this question:\n{}",
            query.text()
        );
        let request = GenerationRequest::new(prompt).with_system(SYSTEM_PROMPT);

        let output = match self.generator.generate(&request).await {
            Ok(output) => output,
            Err(err) => {
                warn!(error = %err, query = query.text(), "multi-query generation failed, proceeding without paraphrases");
                return Ok(Vec::new());
            }
        };

        let mut seen = vec![query.text().to_string()];
        let mut variations = Vec::new();
        for item in parse::parse_list(&output) {
            if seen.contains(&item) {
                continue;
            }
            seen.push(item.clone());
            variations.push(Query::paraphrase(item, query));
            if variations.len() == count {
                break;
            }
        }

        if variations.is_empty() {
            warn!(query = query.text(), "multi-query output contained no usable paraphrases");
        }
        Ok(variations)
    }
}
