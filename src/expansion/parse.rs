//! Parsing of collaborator output into query lists.
//!
//! Generation collaborators are asked for numbered lists, but real models
//! also produce bullets, preambles ("Here are three variations:"), and
//! stray quoting. The helpers here normalize all of that into clean query
//! strings.

use std::sync::LazyLock;

use regex::Regex;

/// Leading list markers: `1.`, `2)`, `3]`, `-`, `*`, `•`.
static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:\d+\s*[.)\]:]|[-*•])\s*").expect("static regex"));

/// Strip a list marker and wrapping quotes from one line.
fn clean_line(line: &str) -> String {
    let stripped = LIST_MARKER.replace(line, "");
    stripped
        .trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim()
        .to_string()
}

/// Parse collaborator output into a list of items.
///
/// If any line carries a list marker, only marked lines are taken (the rest
/// is preamble or commentary); otherwise every non-empty line is an item.
pub(crate) fn parse_list(output: &str) -> Vec<String> {
    let lines: Vec<&str> = output.lines().filter(|l| !l.trim().is_empty()).collect();
    let has_markers = lines.iter().any(|l| LIST_MARKER.is_match(l));

    lines
        .into_iter()
        .filter(|line| !has_markers || LIST_MARKER.is_match(line))
        .map(clean_line)
        .filter(|item| !item.is_empty())
        .collect()
}

/// Parse output expected to contain a single item.
///
/// Takes the first usable line, so trailing explanation a collaborator adds
/// despite instructions is ignored.
pub(crate) fn parse_single(output: &str) -> Option<String> {
    parse_list(output).into_iter().next()
}
