//! Text-generation collaborator interface.
//!
//! Every stage of the pipeline that needs language-model output (step-back
//! restatement, paraphrasing, compound classification, decomposition,
//! answer synthesis) goes through the [`TextGenerator`] trait. The trait is
//! deliberately opaque: implementations may bind to an HTTP API, an
//! in-process model, or a scripted mock.
//!
//! # Thread Safety
//!
//! Implementations must be `Send + Sync`; the fusion engine issues
//! overlapping generation calls from concurrent tasks.

pub mod openai;

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::Result;

pub use openai::OpenAiGenerator;

/// A single generation request.
///
/// `prompt` is the user-role content; `system` optionally pins the
/// collaborator's role. The remaining fields are soft constraints that
/// implementations may ignore if their backend has no equivalent.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// User-role prompt content.
    pub prompt: String,
    /// Optional system-role instruction.
    pub system: Option<String>,
    /// Upper bound on generated tokens, if the backend supports one.
    pub max_tokens: Option<u32>,
    /// Sampling temperature, if the backend supports one.
    pub temperature: Option<f32>,
}

impl GenerationRequest {
    /// Create a request with only user-role content.
    pub fn new<S: Into<String>>(prompt: S) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            max_tokens: None,
            temperature: None,
        }
    }

    /// Attach a system-role instruction.
    pub fn with_system<S: Into<String>>(mut self, system: S) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Bound the number of generated tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Opaque text-generation collaborator.
#[async_trait]
pub trait TextGenerator: Send + Sync + Debug {
    /// Generate text for the given request.
    ///
    /// # Errors
    ///
    /// Returns an error if the collaborator is unreachable or produced a
    /// malformed response. Callers in the expansion stages treat errors as
    /// recoverable; only the final synthesis call propagates them.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;

    /// Name of this generator for logging and diagnostics.
    fn name(&self) -> &str {
        "unknown"
    }
}
