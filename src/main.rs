//! # SQL Query Agent
//!
//! Natural-language questions in, validated read-only SQL out.
//!
//! The agent asks an LLM to translate a question into SQL against a schema
//! you describe with plain DDL, then gates the result through a static
//! safety validator before anything may be executed. The validator is the
//! load-bearing piece: it rejects mutating statements, stacked-statement
//! injection, oversized queries, and (in strict mode) excessive JOINs,
//! independent of whatever the model produced.
//!
//! # Quick Start
//!
//! ```bash
//! # Generate and validate SQL for a question (local Ollama)
//! sql-query-agent ask "how many customers do we have?" -s schema.sql
//!
//! # Validate candidate SQL without any LLM involved
//! sql-query-agent check -e "SELECT * FROM customers;"
//! echo "DROP TABLE customers;" | sql-query-agent check -
//!
//! # Show the schema summary the model would see
//! sql-query-agent schema schema.sql
//! ```
//!
//! # Exit Codes
//!
//! - `0` - Success, generated/checked SQL accepted
//! - `1` - Operational error (I/O, config, LLM failure)
//! - `2` - Validation rejected at least one query
//!
//! # Configuration
//!
//! Configuration is loaded from (in order of precedence):
//!
//! 1. Command-line arguments
//! 2. Environment variables (`LLM_API_KEY`, `SQL_AGENT_STRICT`, etc.)
//! 3. `.sql-agent.toml` in current directory
//! 4. `~/.config/sql-agent/config.toml`
//!
//! # Library Modules
//!
//! - `validator` - Read-only SQL safety gate
//! - `agent` - Question-to-answer orchestration
//! - `generate` - Generation chain and model-reply parsing
//! - `llm` - LLM provider integrations (OpenAI, Anthropic, Ollama)
//! - `schema` - DDL parsing and prompt-facing summaries
//! - `config` - Configuration loading
//! - `output` - Result formatting
//! - `cache` - Parsed-schema cache
//! - `error` - Error types and constructors

use std::{
    fs::read_to_string,
    io::{self, Read},
    path::PathBuf,
    process,
    time::Duration
};

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use sql_query_agent::{
    agent::{QueryMetadata, QueryOutcome},
    cache::{cache_schema, get_cached},
    cli::{Cli, Commands, Dialect, Format, Provider},
    config::Config,
    error::{AppResult, config_error, file_read_error},
    generate::{generate_sql, request_clarification},
    llm::{LlmClient, LlmProvider},
    output::{CheckResult, OutputFormat, OutputOptions, format_check_results, format_outcome},
    schema::{Schema, SqlDialect},
    validator::{SqlValidator, extract_table_names, sanitize_sql}
};
use tokio::main;

#[main]
async fn main() {
    match run().await {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

async fn run() -> AppResult<i32> {
    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Ask {
            question,
            schema,
            provider,
            api_key,
            model,
            ollama_url,
            dialect,
            output_format,
            lenient,
            no_color
        } => {
            let parsed_schema = load_schema(&schema, convert_dialect(dialect))?;
            let schema_summary = parsed_schema.to_summary();

            let client = build_client(provider, api_key, model, ollama_url, &config)?;

            // Show progress indicator
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}")
            {
                pb.set_style(style);
            }
            pb.set_message("Generating SQL...");
            pb.enable_steady_tick(Duration::from_millis(100));

            let generation = generate_sql(&client, &question, &schema_summary, true).await?;

            pb.finish_and_clear();

            let strict = config.validator.strict && !lenient;
            let validator = SqlValidator::new(strict);

            let mut outcome = QueryOutcome {
                question,
                sql: None,
                rows: None,
                explanation: None,
                success: false,
                error: None,
                metadata: QueryMetadata {
                    confidence:  generation.confidence,
                    tables_used: generation.tables_used,
                    row_count:   None
                }
            };

            let exit_code = match generation.sql {
                Some(sql) => {
                    let verdict = validator.validate(&sql);
                    outcome.sql = Some(sql);
                    match verdict.reason() {
                        None => {
                            outcome.success = true;
                            if !generation.explanation.is_empty() {
                                outcome.explanation = Some(generation.explanation);
                            }
                            0
                        }
                        Some(reason) => {
                            outcome.error = Some(reason);
                            2
                        }
                    }
                }
                None => {
                    outcome.error = Some(if generation.explanation.is_empty() {
                        String::from("No SQL could be generated")
                    } else {
                        generation.explanation
                    });
                    // Ask the model how to rephrase instead of failing silently
                    outcome.explanation =
                        request_clarification(&client, &outcome.question, &schema_summary)
                            .await
                            .ok();
                    1
                }
            };

            let opts = OutputOptions {
                format:  convert_format(output_format),
                colored: !no_color
            };
            println!("{}", format_outcome(&outcome, &opts));

            Ok(exit_code)
        }

        Commands::Check {
            queries,
            files,
            lenient,
            tables,
            output_format,
            no_color
        } => {
            let mut inputs = queries;
            for file in files {
                if file.to_str() == Some("-") {
                    let mut buffer = String::new();
                    io::stdin()
                        .read_to_string(&mut buffer)
                        .map_err(|e| file_read_error("stdin", e))?;
                    inputs.push(buffer);
                } else {
                    let content = read_to_string(&file)
                        .map_err(|e| file_read_error(&file.display().to_string(), e))?;
                    inputs.push(content);
                }
            }

            if inputs.is_empty() {
                return Err(config_error("No queries to check (use -e or pass files)"));
            }

            let strict = config.validator.strict && !lenient;
            let validator = SqlValidator::new(strict);

            let verdicts = validator.validate_batch(&inputs);
            let results: Vec<CheckResult> = inputs
                .iter()
                .zip(verdicts)
                .map(|(sql, verdict)| CheckResult {
                    input: sanitize_sql(sql),
                    verdict
                })
                .collect();

            let opts = OutputOptions {
                format:  convert_format(output_format),
                colored: !no_color
            };
            println!("{}", format_check_results(&results, &opts));

            if tables {
                for result in &results {
                    let names: Vec<String> = extract_table_names(&result.input)
                        .into_iter()
                        .map(|n| n.to_string())
                        .collect();
                    println!("tables({}): {}", result.input, names.join(", "));
                }
            }

            let any_rejected = results.iter().any(|r| !r.verdict.is_accepted());
            Ok(if any_rejected { 2 } else { 0 })
        }

        Commands::Schema {
            schema,
            dialect
        } => {
            let parsed_schema = load_schema(&schema, convert_dialect(dialect))?;
            println!("{}", parsed_schema.to_summary());
            println!("{} tables found.", parsed_schema.table_count());
            Ok(0)
        }
    }
}

/// Read and parse a DDL file, going through the schema cache.
fn load_schema(path: &PathBuf, dialect: SqlDialect) -> AppResult<Schema> {
    let ddl =
        read_to_string(path).map_err(|e| file_read_error(&path.display().to_string(), e))?;

    if let Some(cached) = get_cached(&ddl) {
        return Ok(cached);
    }
    let parsed = Schema::parse(&ddl, dialect)?;
    cache_schema(&ddl, parsed.clone());
    Ok(parsed)
}

fn convert_dialect(dialect: Dialect) -> SqlDialect {
    match dialect {
        Dialect::Generic => SqlDialect::Generic,
        Dialect::Mysql => SqlDialect::MySQL,
        Dialect::Postgresql => SqlDialect::PostgreSQL,
        Dialect::Sqlite => SqlDialect::SQLite
    }
}

fn convert_format(format: Format) -> OutputFormat {
    match format {
        Format::Text => OutputFormat::Text,
        Format::Json => OutputFormat::Json,
        Format::Yaml => OutputFormat::Yaml
    }
}

fn build_client(
    provider: Provider,
    api_key: Option<String>,
    model: Option<String>,
    ollama_url: String,
    config: &Config
) -> AppResult<LlmClient> {
    let effective_api_key = api_key.or(config.llm.api_key.clone());
    let effective_ollama_url = if ollama_url == "http://localhost:11434" {
        config.llm.ollama_url.clone().unwrap_or(ollama_url)
    } else {
        ollama_url
    };

    let model_name = model
        .or(config.llm.model.clone())
        .unwrap_or_else(|| provider.default_model().to_string());

    let llm_provider = match provider {
        Provider::OpenAI => {
            let key = effective_api_key.ok_or_else(|| {
                config_error("API key required for OpenAI (use --api-key or LLM_API_KEY)")
            })?;
            LlmProvider::OpenAI {
                api_key: key,
                model:   model_name
            }
        }
        Provider::Anthropic => {
            let key = effective_api_key.ok_or_else(|| {
                config_error("API key required for Anthropic (use --api-key or LLM_API_KEY)")
            })?;
            LlmProvider::Anthropic {
                api_key: key,
                model:   model_name
            }
        }
        Provider::Ollama => LlmProvider::Ollama {
            base_url: effective_ollama_url,
            model:    model_name
        }
    };

    Ok(LlmClient::with_retry_config(llm_provider, config.retry.clone()))
}
