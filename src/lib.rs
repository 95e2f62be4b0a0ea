//! # Quiver
//!
//! Multi-strategy query expansion and retrieval fusion for
//! retrieval-augmented generation pipelines.
//!
//! Quiver sits between a natural-language question and a retrieval +
//! generation backend. For each request it builds a query plan (step-back
//! restatement, paraphrase variations, compound-query decomposition),
//! retrieves evidence for every variant concurrently, fuses the results
//! into one deduplicated evidence set, and synthesizes a single answer.
//!
//! ## Features
//!
//! - Step-back, multi-query, and decomposition expansion, each behind its
//!   own configuration flag
//! - Identity-keyed evidence fusion with first-wins deduplication
//! - Optional re-ranking against the original query
//! - Degrade-don't-fail error policy: one flaky retrieval or sub-answer
//!   never aborts a request
//! - Request-scoped state only; engines serve concurrent requests from
//!   behind an `Arc`
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use quiver::fusion::{FusionConfig, FusionEngine};
//! use quiver::generation::openai::OpenAiGenerator;
//! use quiver::retrieval::MemoryRetriever;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut retriever = MemoryRetriever::new();
//! retriever.add("Rust is a systems programming language.");
//!
//! let engine = FusionEngine::builder()
//!     .generator(Arc::new(OpenAiGenerator::with_default_model(
//!         std::env::var("OPENAI_API_KEY")?,
//!     )?))
//!     .retriever(Arc::new(retriever))
//!     .config(FusionConfig::default())
//!     .build()?;
//!
//! let answer = engine.answer("What is Rust?").await?;
//! println!("{}", answer.answer_text);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod document;
pub mod error;
pub mod expansion;
pub mod fusion;
pub mod generation;
pub mod query;
pub mod retrieval;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
