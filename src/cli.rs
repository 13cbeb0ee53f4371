use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// SQL Query Agent - Ask questions in natural language, get validated SQL
#[derive(Parser, Debug)]
#[command(name = "sql-query-agent")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate and validate SQL for a natural-language question
    Ask {
        /// The question to answer
        question: String,

        /// Path to SQL schema (DDL) file
        #[arg(short, long)]
        schema: PathBuf,

        /// LLM provider to use
        #[arg(short, long, value_enum, default_value = "ollama")]
        provider: Provider,

        /// API key for OpenAI or Anthropic
        #[arg(short, long, env = "LLM_API_KEY")]
        api_key: Option<String>,

        /// Model name
        #[arg(short, long)]
        model: Option<String>,

        /// Ollama base URL
        #[arg(long, default_value = "http://localhost:11434")]
        ollama_url: String,

        /// SQL dialect for schema parsing
        #[arg(long, value_enum, default_value = "postgresql")]
        dialect: Dialect,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        output_format: Format,

        /// Disable the strict-mode complexity ceiling
        #[arg(long)]
        lenient: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool
    },

    /// Validate SQL queries against the read-only safety rules
    Check {
        /// Inline SQL strings to validate
        #[arg(short = 'e', long = "sql", value_name = "SQL")]
        queries: Vec<String>,

        /// Files containing one query each (use - for stdin)
        files: Vec<PathBuf>,

        /// Skip the JOIN-count ceiling
        #[arg(long)]
        lenient: bool,

        /// Also print table names extracted from each query
        #[arg(short, long)]
        tables: bool,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        output_format: Format,

        /// Disable colored output
        #[arg(long)]
        no_color: bool
    },

    /// Parse a DDL file and print the schema summary sent to the LLM
    Schema {
        /// Path to SQL schema (DDL) file
        schema: PathBuf,

        /// SQL dialect for schema parsing
        #[arg(long, value_enum, default_value = "postgresql")]
        dialect: Dialect
    }
}

#[derive(Debug, Clone, ValueEnum)]
pub enum Provider {
    OpenAI,
    Anthropic,
    Ollama
}

impl Provider {
    /// Get default model for provider
    pub fn default_model(&self) -> &str {
        match self {
            Self::OpenAI => "gpt-4",
            Self::Anthropic => "claude-sonnet-4-20250514",
            Self::Ollama => "llama3.2"
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
pub enum Dialect {
    Generic,
    Mysql,
    Postgresql,
    Sqlite
}

#[derive(Debug, Clone, ValueEnum)]
pub enum Format {
    Text,
    Json,
    Yaml
}
