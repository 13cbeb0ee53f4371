use colored::Colorize;
use serde::Serialize;

use crate::{
    agent::QueryOutcome,
    generate::Row,
    validator::Verdict
};

/// Output format for results
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml
}

/// Output options
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format:  OutputFormat,
    pub colored: bool
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format:  OutputFormat::Text,
            colored: true
        }
    }
}

/// Verdict for one checked input, for serialization
#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub input:   String,
    pub verdict: Verdict
}

/// Format a query outcome based on output options
pub fn format_outcome(outcome: &QueryOutcome, opts: &OutputOptions) -> String {
    match opts.format {
        OutputFormat::Json => serde_json::to_string_pretty(outcome).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(outcome).unwrap_or_default(),
        OutputFormat::Text => format_outcome_text(outcome, opts)
    }
}

fn format_outcome_text(outcome: &QueryOutcome, opts: &OutputOptions) -> String {
    let mut output = String::new();

    if outcome.success {
        let header = "=== Answer ===\n\n";
        if opts.colored {
            output.push_str(&header.green().bold().to_string());
        } else {
            output.push_str(header);
        }
    } else {
        let header = "=== Query Failed ===\n\n";
        if opts.colored {
            output.push_str(&header.red().bold().to_string());
        } else {
            output.push_str(header);
        }
    }

    if let Some(sql) = &outcome.sql {
        if opts.colored {
            output.push_str(&format!("SQL: {}\n\n", sql.cyan()));
        } else {
            output.push_str(&format!("SQL: {}\n\n", sql));
        }
    }

    if let Some(explanation) = &outcome.explanation {
        output.push_str(explanation);
        output.push_str("\n\n");
    }

    if let Some(rows) = &outcome.rows {
        output.push_str(&format_rows(rows));
        output.push('\n');
    }

    if let Some(error) = &outcome.error {
        if opts.colored {
            output.push_str(&format!("Error: {}\n", error.red()));
        } else {
            output.push_str(&format!("Error: {}\n", error));
        }
    }

    if !outcome.metadata.tables_used.is_empty() {
        let tables: Vec<&str> = outcome.metadata.tables_used.iter().map(|s| s.as_str()).collect();
        output.push_str(&format!("Tables: {}\n", tables.join(", ")));
    }
    output.push_str(&format!("Confidence: {:.0}%\n", outcome.metadata.confidence * 100.0));
    if let Some(count) = outcome.metadata.row_count {
        output.push_str(&format!("Rows: {}\n", count));
    }

    output
}

/// Render result rows: total count, first rows, remainder marker
pub fn format_rows(rows: &[Row]) -> String {
    if rows.is_empty() {
        return String::from("No results found.\n");
    }

    let mut text = format!("{} results found.\n\n", rows.len());

    let max_display = rows.len().min(10);
    for (i, row) in rows[..max_display].iter().enumerate() {
        let rendered = serde_json::to_string(row).unwrap_or_default();
        text.push_str(&format!("{}. {}\n", i + 1, rendered));
    }

    if rows.len() > max_display {
        text.push_str(&format!("\n... and {} more results.\n", rows.len() - max_display));
    }

    text
}

/// Format check verdicts based on output options
pub fn format_check_results(results: &[CheckResult], opts: &OutputOptions) -> String {
    match opts.format {
        OutputFormat::Json => serde_json::to_string_pretty(results).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(results).unwrap_or_default(),
        OutputFormat::Text => {
            let mut output = String::new();
            for result in results {
                match result.verdict.reason() {
                    None => {
                        let mark = if opts.colored {
                            "ACCEPTED".green().to_string()
                        } else {
                            String::from("ACCEPTED")
                        };
                        output.push_str(&format!("{}  {}\n", mark, result.input));
                    }
                    Some(reason) => {
                        let mark = if opts.colored {
                            "REJECTED".red().to_string()
                        } else {
                            String::from("REJECTED")
                        };
                        output.push_str(&format!("{}  {}\n  reason: {}\n", mark, result.input, reason));
                    }
                }
            }
            output
        }
    }
}
