//! Configuration for the fusion engine.
//!
//! Each expansion strategy is guarded by its own flag, so a caller can trade
//! recall for latency and cost per request. Disabling everything reduces the
//! pipeline to a single retrieval call and a single generation call.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{QuiverError, Result};
use crate::expansion::multi_query::DEFAULT_VARIATION_COUNT;

/// Default number of documents requested per retrieval call.
pub const DEFAULT_TOP_K: usize = 4;

/// Configuration for one fusion pipeline.
///
/// # Examples
///
/// ```
/// use quiver::fusion::FusionConfig;
///
/// // Default: all expansion strategies on, no re-ranking, no deadline.
/// let config = FusionConfig::default();
/// assert!(config.enable_step_back);
/// assert_eq!(config.top_k, 4);
///
/// // Cheapest possible request: original query only.
/// let minimal = FusionConfig {
///     enable_step_back: false,
///     enable_multi_query: false,
///     enable_decomposition: false,
///     ..Default::default()
/// };
/// assert!(minimal.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionConfig {
    /// Expand each unit with a step-back restatement.
    pub enable_step_back: bool,
    /// Expand each unit with paraphrase variations.
    pub enable_multi_query: bool,
    /// Number of paraphrases requested per unit.
    pub multi_query_count: usize,
    /// Split compound queries into independently retrieved sub-queries.
    pub enable_decomposition: bool,
    /// Reorder fused evidence by relevance to the original query.
    pub enable_rerank: bool,
    /// Documents requested per retrieval call.
    pub top_k: usize,
    /// Deadline for the whole request; calls still in flight when it elapses
    /// are aborted and the request fails with a timeout error.
    pub timeout: Option<Duration>,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            enable_step_back: true,
            enable_multi_query: true,
            multi_query_count: DEFAULT_VARIATION_COUNT,
            enable_decomposition: true,
            enable_rerank: false,
            top_k: DEFAULT_TOP_K,
            timeout: None,
        }
    }
}

impl FusionConfig {
    /// Validate this configuration.
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(QuiverError::invalid_config("top_k must be at least 1"));
        }
        if self.multi_query_count == 0 {
            return Err(QuiverError::invalid_config(
                "multi_query_count must be at least 1",
            ));
        }
        if let Some(timeout) = self.timeout {
            if timeout.is_zero() {
                return Err(QuiverError::invalid_config("timeout must be non-zero"));
            }
        }
        Ok(())
    }
}
