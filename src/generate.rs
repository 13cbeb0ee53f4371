//! SQL generation chain: prompt assembly and model-reply parsing.
//!
//! The model is asked for a JSON object with `sql`, `explanation`,
//! `confidence`, and `tables_used`. Models wrap replies in markdown fences or
//! drift from the format often enough that parsing is layered:
//!
//! 1. Strip markdown code fences, parse as JSON
//! 2. Fall back to extracting the first `SELECT ...;` with low confidence
//! 3. Give up with `sql: None` and a diagnostic explanation
//!
//! Whatever comes out of here is untrusted and must still pass the validator
//! before execution.

use std::sync::LazyLock;

use compact_str::CompactString;
use regex::Regex;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{
    error::AppResult,
    llm::TextGenerator,
    prompts::{
        FEW_SHOT_EXAMPLES, clarification_prompt, error_explanation_prompt,
        query_generation_prompt, result_explanation_prompt
    }
};

/// Maximum number of result rows embedded in the explanation prompt.
const MAX_ROWS_FOR_EXPLANATION: usize = 10;

/// Confidence assigned when SQL is recovered by the regex fallback.
const FALLBACK_CONFIDENCE: f64 = 0.3;

static SELECT_FALLBACK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\bSELECT\b.*?;")
        .unwrap_or_else(|e| unreachable!("invalid fallback pattern: {e}"))
});

/// A row returned by the execution sink, as a JSON object.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Parsed model reply for a generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqlGeneration {
    /// Candidate query, `None` when generation failed
    pub sql:         Option<String>,
    /// Model's own description of the query
    #[serde(default)]
    pub explanation: String,
    /// Model's self-reported confidence in [0, 1]
    #[serde(default = "default_confidence")]
    pub confidence:  f64,
    /// Tables the model claims to have used (metadata, not authoritative)
    #[serde(default)]
    pub tables_used: SmallVec<[CompactString; 4]>
}

fn default_confidence() -> f64 {
    0.5
}

impl SqlGeneration {
    fn failed(explanation: impl Into<String>) -> Self {
        Self {
            sql:         None,
            explanation: explanation.into(),
            confidence:  0.0,
            tables_used: SmallVec::new()
        }
    }
}

/// Generate a candidate SQL query for a question.
///
/// # Errors
///
/// Returns an error when the model call itself fails; a malformed reply is
/// not an error and yields `sql: None` instead.
pub async fn generate_sql<G: TextGenerator>(
    llm: &G,
    question: &str,
    schema_summary: &str,
    include_examples: bool
) -> AppResult<SqlGeneration> {
    let few_shot = if include_examples { FEW_SHOT_EXAMPLES } else { "" };
    let prompt = query_generation_prompt(schema_summary, few_shot, question);
    let response = llm.complete(&prompt).await?;
    Ok(parse_generation_response(&response))
}

/// Explain query results in natural language.
pub async fn explain_results<G: TextGenerator>(
    llm: &G,
    question: &str,
    sql: &str,
    rows: &[Row]
) -> AppResult<String> {
    let results_text = format_rows_for_llm(rows, MAX_ROWS_FOR_EXPLANATION);
    let prompt = result_explanation_prompt(question, sql, &results_text);
    let explanation = llm.complete(&prompt).await?;
    Ok(explanation.trim().to_string())
}

/// Explain a query failure in user-friendly terms.
pub async fn explain_error<G: TextGenerator>(
    llm: &G,
    question: &str,
    sql: &str,
    error: &str
) -> AppResult<String> {
    let prompt = error_explanation_prompt(question, sql, error);
    let explanation = llm.complete(&prompt).await?;
    Ok(explanation.trim().to_string())
}

/// Ask the model how an ambiguous question could be made answerable.
pub async fn request_clarification<G: TextGenerator>(
    llm: &G,
    question: &str,
    schema_summary: &str
) -> AppResult<String> {
    let prompt = clarification_prompt(question, schema_summary);
    let reply = llm.complete(&prompt).await?;
    Ok(reply.trim().to_string())
}

/// Parse a model reply into a [`SqlGeneration`].
///
/// Total over arbitrary input: malformed replies degrade through the fallback
/// layers rather than erroring.
pub fn parse_generation_response(response: &str) -> SqlGeneration {
    let cleaned = strip_markdown_fences(response.trim());

    match serde_json::from_str::<SqlGeneration>(cleaned) {
        Ok(generation) if generation.sql.is_some() => generation,
        _ => fallback_sql_extraction(response)
    }
}

/// Recover a `SELECT ...;` from free-form text when JSON parsing fails.
fn fallback_sql_extraction(response: &str) -> SqlGeneration {
    match SELECT_FALLBACK_RE.find(response) {
        Some(found) => SqlGeneration {
            sql:         Some(found.as_str().to_string()),
            explanation: String::from("SQL extracted automatically from a non-JSON reply"),
            confidence:  FALLBACK_CONFIDENCE,
            tables_used: SmallVec::new()
        },
        None => SqlGeneration::failed("Model reply contained no usable SQL")
    }
}

/// Strip a surrounding markdown code fence, with or without a language tag.
fn strip_markdown_fences(response: &str) -> &str {
    let Some(rest) = response.strip_prefix("```") else {
        return response;
    };
    // Drop the language tag line ("json", "sql", or empty)
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest
    };
    body.trim_end()
        .strip_suffix("```")
        .map(str::trim_end)
        .unwrap_or(response)
}

/// Render rows as JSON for the explanation prompt, truncated to `max_rows`.
pub fn format_rows_for_llm(rows: &[Row], max_rows: usize) -> String {
    if rows.is_empty() {
        return String::from("No results.");
    }

    let limited = &rows[..rows.len().min(max_rows)];
    let mut text = serde_json::to_string_pretty(limited).unwrap_or_default();

    if rows.len() > max_rows {
        text.push_str(&format!("\n\n... and {} more rows.", rows.len() - max_rows));
    }

    text
}
