//! Question-to-answer orchestration.
//!
//! [`QueryAgent`] wires the collaborators together: a schema summary, a
//! [`TextGenerator`] that produces candidate SQL, the safety validator, and a
//! [`QueryExecutor`] sink. The one invariant that matters lives here: SQL
//! that has not passed [`SqlValidator::validate`] is never handed to the
//! executor.
//!
//! Database connectivity is out of scope for this crate; embedders supply an
//! executor for their engine of choice, tests use an in-memory fake.

use compact_str::CompactString;
use serde::Serialize;
use smallvec::SmallVec;

use crate::{
    error::AppResult,
    generate::{self, Row, SqlGeneration},
    llm::TextGenerator,
    validator::SqlValidator
};

/// Query-execution collaborator contract.
///
/// Receives only queries that the validator accepted. Implementations map
/// their engine's rows to JSON objects.
pub trait QueryExecutor: Send + Sync {
    /// Execute a read-only query and return its rows.
    fn execute(&self, sql: &str) -> impl Future<Output = AppResult<Vec<Row>>> + Send;
}

/// Metadata accompanying a query outcome.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryMetadata {
    /// Model's self-reported confidence in the generated SQL
    pub confidence:  f64,
    /// Tables the model claims to have used
    pub tables_used: SmallVec<[CompactString; 4]>,
    /// Number of rows returned, when execution happened
    pub row_count:   Option<usize>
}

/// Everything produced while answering one question.
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    /// The original question
    pub question:    String,
    /// Generated SQL, present even when rejected (for diagnostics)
    pub sql:         Option<String>,
    /// Rows returned by the executor
    pub rows:        Option<Vec<Row>>,
    /// Natural-language explanation of the results or the failure
    pub explanation: Option<String>,
    /// Whether the question was answered
    pub success:     bool,
    /// Failure description when `success` is false
    pub error:       Option<String>,
    /// Generation and execution metadata
    pub metadata:    QueryMetadata
}

impl QueryOutcome {
    fn new(question: &str) -> Self {
        Self {
            question:    question.to_string(),
            sql:         None,
            rows:        None,
            explanation: None,
            success:     false,
            error:       None,
            metadata:    QueryMetadata::default()
        }
    }
}

/// Agent turning natural-language questions into validated, executed,
/// explained SQL queries.
pub struct QueryAgent<G, E> {
    llm:            G,
    executor:       E,
    validator:      SqlValidator,
    schema_summary: String
}

impl<G: TextGenerator, E: QueryExecutor> QueryAgent<G, E> {
    /// Create an agent over a fixed schema description.
    pub fn new(llm: G, executor: E, validator: SqlValidator, schema_summary: String) -> Self {
        Self {
            llm,
            executor,
            validator,
            schema_summary
        }
    }

    /// The schema description handed to the model.
    pub fn schema_summary(&self) -> &str {
        &self.schema_summary
    }

    /// Generate SQL for a question without executing it.
    ///
    /// The returned generation is untrusted; validating it is the caller's
    /// next step. Used by surfaces that have no execution sink.
    pub async fn generate(&self, question: &str) -> AppResult<SqlGeneration> {
        generate::generate_sql(&self.llm, question, &self.schema_summary, true).await
    }

    /// Answer a question: generate, validate, execute, explain.
    ///
    /// # Errors
    ///
    /// Returns an error only when the model call for generation fails
    /// outright. Validation rejections and execution failures are reported
    /// inside the outcome.
    pub async fn query(&self, question: &str, explain: bool) -> AppResult<QueryOutcome> {
        let mut outcome = QueryOutcome::new(question);

        let generation = self.generate(question).await?;
        outcome.metadata.confidence = generation.confidence;
        outcome.metadata.tables_used = generation.tables_used.clone();

        let Some(sql) = generation.sql else {
            outcome.error = Some(if generation.explanation.is_empty() {
                String::from("No SQL could be generated")
            } else {
                generation.explanation
            });
            return Ok(outcome);
        };
        outcome.sql = Some(sql.clone());

        // The gate: rejected SQL never reaches the executor
        let verdict = self.validator.validate(&sql);
        if let Some(reason) = verdict.reason() {
            outcome.error = Some(reason.clone());
            if explain {
                outcome.explanation =
                    generate::explain_error(&self.llm, question, &sql, &reason)
                        .await
                        .ok();
            }
            return Ok(outcome);
        }

        let rows = match self.executor.execute(&sql).await {
            Ok(rows) => rows,
            Err(e) => {
                let message = e.to_string();
                outcome.error = Some(message.clone());
                if explain {
                    outcome.explanation =
                        generate::explain_error(&self.llm, question, &sql, &message)
                            .await
                            .ok();
                }
                return Ok(outcome);
            }
        };

        outcome.metadata.row_count = Some(rows.len());
        outcome.success = true;

        if explain {
            outcome.explanation = if rows.is_empty() {
                Some(String::from("No results were found for your question."))
            } else {
                match generate::explain_results(&self.llm, question, &sql, &rows).await {
                    Ok(text) => Some(text),
                    Err(_) => Some(generation.explanation)
                }
            };
        } else if !generation.explanation.is_empty() {
            outcome.explanation = Some(generation.explanation);
        }

        outcome.rows = Some(rows);
        Ok(outcome)
    }
}
