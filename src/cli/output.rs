//! Output formatting for CLI commands.

use crate::cli::args::{OutputFormat, QuiverArgs};
use crate::error::Result;
use crate::fusion::types::Answer;
use crate::fusion::QueryPlan;
use crate::query::{Query, QueryOrigin};

const PREVIEW_LENGTH: usize = 96;

/// Print a pipeline answer in the selected format.
pub fn print_answer(answer: &Answer, args: &QuiverArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(answer)?);
        }
        OutputFormat::Human => {
            println!("{}", answer.answer_text);

            if !answer.trace.warnings.is_empty() && args.verbosity() > 0 {
                println!();
                for warning in &answer.trace.warnings {
                    match &warning.query {
                        Some(query) => {
                            println!("warning [{:?}] {}: {}", warning.stage, query, warning.message)
                        }
                        None => println!("warning [{:?}]: {}", warning.stage, warning.message),
                    }
                }
            }

            if args.verbosity() > 1 {
                println!("\nQuery plan ({} queries):", answer.query_plan.len());
                for query in &answer.query_plan {
                    println!("  [{}] {}", origin_label(query), query.text());
                }

                println!("\nEvidence ({} documents):", answer.evidence.len());
                for document in &answer.evidence {
                    println!(
                        "  {:.3}  {}  {}",
                        document.score(),
                        document.id(),
                        preview(document.content())
                    );
                }

                println!(
                    "\nTimings: expansion {:.1}ms, retrieval {:.1}ms, fusion {:.1}ms, synthesis {:.1}ms, total {:.1}ms",
                    answer.trace.timings.expansion_ms,
                    answer.trace.timings.retrieval_ms,
                    answer.trace.timings.fusion_ms,
                    answer.trace.timings.synthesis_ms,
                    answer.trace.timings.total_ms,
                );
            }
        }
    }
    Ok(())
}

/// Print a query plan in the selected format.
pub fn print_plan(plan: &QueryPlan, args: &QuiverArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(plan)?);
        }
        OutputFormat::Human => {
            for (index, unit) in plan.units().iter().enumerate() {
                println!("Unit {}: {}", index + 1, unit.unit().text());
                for query in unit.queries().iter().skip(1) {
                    println!("  [{}] {}", origin_label(query), query.text());
                }
            }
        }
    }
    Ok(())
}

/// Short label for a query's provenance.
fn origin_label(query: &Query) -> &'static str {
    match query.origin() {
        QueryOrigin::User => "user",
        QueryOrigin::StepBack => "step-back",
        QueryOrigin::MultiQuery => "paraphrase",
        QueryOrigin::SubQuery => "sub-query",
    }
}

/// Single-line content preview.
fn preview(content: &str) -> String {
    let flat = content.replace('\n', " ");
    if flat.len() <= PREVIEW_LENGTH {
        return flat;
    }
    let mut end = PREVIEW_LENGTH;
    while !flat.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &flat[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_labels() {
        let user = Query::user("q");
        assert_eq!(origin_label(&user), "user");
        assert_eq!(origin_label(&Query::step_back("b", &user)), "step-back");
        assert_eq!(origin_label(&Query::paraphrase("p", &user)), "paraphrase");
        assert_eq!(origin_label(&Query::sub_query("s", &user)), "sub-query");
    }

    #[test]
    fn test_preview_truncates() {
        let short = preview("short content");
        assert_eq!(short, "short content");

        let long = preview(&"x".repeat(200));
        assert!(long.ends_with("..."));
        assert!(long.len() <= PREVIEW_LENGTH + 3);
    }

    #[test]
    fn test_preview_flattens_newlines() {
        assert_eq!(preview("a\nb"), "a b");
    }
}
