//! Compound-query decomposition.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{QuiverError, Result};
use crate::expansion::parse;
use crate::generation::{GenerationRequest, TextGenerator};
use crate::query::Query;

/// Upper bound on sub-queries taken from one decomposition. Decomposition
/// is never applied recursively, so this caps total plan fan-out.
pub const MAX_SUB_QUERIES: usize = 5;

const CLASSIFY_SYSTEM_PROMPT: &str = "You classify search queries. A query is compound \
when it asks about multiple distinct things at once: several question foci, an explicit \
enumeration, or a comparison across two or more named entities or dimensions. Respond \
with exactly one word: compound or simple.";

const SPLIT_SYSTEM_PROMPT: &str = "You split compound questions. Break the question into \
independently answerable sub-questions, each complete on its own. Respond with a numbered \
list of the sub-questions only, no explanation.";

/// Detects compound queries and splits them into sub-queries.
///
/// Two collaborator calls at most: a classification call, then (only for a
/// compound verdict) a split call. The returned list is never empty: a
/// simple classification, a collaborator failure, or an unusable split all
/// come back as `[query]` unchanged. Sub-queries are never decomposed again.
pub struct QueryDecomposer {
    generator: Arc<dyn TextGenerator>,
}

impl QueryDecomposer {
    /// Create a decomposer over the given collaborator.
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Decompose `query` into independently answerable units.
    ///
    /// # Errors
    ///
    /// Only if `query` has empty text.
    pub async fn decompose(&self, query: &Query) -> Result<Vec<Query>> {
        if query.is_empty() {
            return Err(QuiverError::invalid_argument(
                "decomposition input query must not be empty",
            ));
        }

        if !self.classify_compound(query).await {
            return Ok(vec![query.clone()]);
        }

        let sub_queries = self.split(query).await;
        if sub_queries.len() < 2 {
            // A "compound" query that splits into fewer than two parts was
            // misclassified; retrieval proceeds with the original.
            warn!(query = query.text(), "compound classification produced no usable split");
            return Ok(vec![query.clone()]);
        }

        debug!(query = query.text(), count = sub_queries.len(), "decomposed compound query");
        Ok(sub_queries)
    }

    /// Ask the collaborator whether `query` is compound.
    async fn classify_compound(&self, query: &Query) -> bool {
        let request = GenerationRequest::new(query.text()).with_system(CLASSIFY_SYSTEM_PROMPT);
        match self.generator.generate(&request).await {
            Ok(output) => output.to_lowercase().contains("compound"),
            Err(err) => {
                warn!(error = %err, query = query.text(), "compound classification failed, treating query as simple");
                false
            }
        }
    }

    /// Ask the collaborator to split a compound `query`.
    async fn split(&self, query: &Query) -> Vec<Query> {
        let request = GenerationRequest::new(query.text()).with_system(SPLIT_SYSTEM_PROMPT);
        let output = match self.generator.generate(&request).await {
            Ok(output) => output,
            Err(err) => {
                warn!(error = %err, query = query.text(), "decomposition failed, keeping original query");
                return Vec::new();
            }
        };

        let mut seen: Vec<String> = Vec::new();
        parse::parse_list(&output)
            .into_iter()
            .filter(|item| {
                if seen.contains(item) {
                    return false;
                }
                seen.push(item.clone());
                true
            })
            .take(MAX_SUB_QUERIES)
            .map(|item| Query::sub_query(item, query))
            .collect()
    }
}
