//! Command implementations for the quiver CLI.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::error::Result;
use crate::expansion::{MultiQueryGenerator, QueryDecomposer, StepBackGenerator};
use crate::fusion::{FusionConfig, FusionEngine, PlanUnit, QueryPlan};
use crate::generation::openai::OpenAiGenerator;
use crate::generation::TextGenerator;
use crate::query::{Query, QueryOrigin};
use crate::retrieval::MemoryRetriever;

/// Execute a CLI command.
pub async fn execute_command(args: QuiverArgs) -> Result<()> {
    match &args.command {
        Command::Ask(ask_args) => run_ask(ask_args.clone(), &args).await,
        Command::Plan(plan_args) => run_plan(plan_args.clone(), &args).await,
    }
}

/// Build the generation collaborator from CLI settings.
fn build_generator(args: &GeneratorArgs) -> Result<Arc<dyn TextGenerator>> {
    let mut generator = OpenAiGenerator::new(args.api_key.clone(), args.model.clone())?;
    if let Some(base_url) = &args.base_url {
        generator = generator.with_base_url(base_url.clone());
    }
    Ok(Arc::new(generator))
}

/// Load a corpus file into the in-memory retriever.
///
/// Each non-empty line is one document: either a JSONL object with a
/// `content` field (and optional `id`), or plain text.
fn load_corpus(path: &Path) -> Result<MemoryRetriever> {
    let raw = fs::read_to_string(path)?;
    let mut retriever = MemoryRetriever::new();

    for (line_number, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(object)) => {
                let Some(content) = object.get("content").and_then(Value::as_str) else {
                    continue;
                };
                match object.get("id").and_then(Value::as_str) {
                    Some(id) => retriever.add_with_id(id, content),
                    None => retriever.add_with_id(format!("line:{line_number}"), content),
                }
            }
            _ => retriever.add_with_id(format!("line:{line_number}"), line),
        }
    }

    Ok(retriever)
}

/// Answer a question over a local corpus.
async fn run_ask(args: AskArgs, cli_args: &QuiverArgs) -> Result<()> {
    let retriever = load_corpus(&args.corpus)?;
    if cli_args.verbosity() > 1 {
        println!("Loaded {} documents from corpus", retriever.len());
    }

    let config = FusionConfig {
        enable_step_back: !args.no_step_back,
        enable_multi_query: !args.no_multi_query,
        multi_query_count: args.count,
        enable_decomposition: !args.no_decompose,
        enable_rerank: false,
        top_k: args.top_k,
        timeout: args.timeout.map(Duration::from_secs),
    };

    let engine = FusionEngine::builder()
        .generator(build_generator(&args.generator)?)
        .retriever(Arc::new(retriever))
        .config(config)
        .build()?;

    match engine.answer(&args.query).await {
        Ok(answer) => print_answer(&answer, cli_args),
        Err(error) => {
            if cli_args.verbosity() > 0 {
                eprintln!(
                    "Request failed after planning {} queries and fusing {} documents",
                    error.query_plan.len(),
                    error.evidence.len()
                );
            }
            Err(error.kind)
        }
    }
}

/// Print the expanded query plan without retrieving or answering.
async fn run_plan(args: PlanArgs, cli_args: &QuiverArgs) -> Result<()> {
    let generator = build_generator(&args.generator)?;
    let query = Query::user(&args.query);

    let units = if args.no_decompose {
        vec![query]
    } else {
        QueryDecomposer::new(generator.clone()).decompose(&query).await?
    };

    let step_back = StepBackGenerator::new(generator.clone());
    let multi_query = MultiQueryGenerator::new(generator.clone());

    let mut plan = QueryPlan::new();
    for unit in units {
        let mut plan_unit = PlanUnit::new(unit.clone());
        if !args.no_step_back {
            let variant = step_back.expand(&unit).await?;
            if variant.origin() == QueryOrigin::StepBack {
                plan_unit.push(variant);
            }
        }
        if !args.no_multi_query {
            for variant in multi_query.generate(&unit, args.count).await? {
                plan_unit.push(variant);
            }
        }
        plan.push_unit(plan_unit);
    }

    print_plan(&plan, cli_args)
}
