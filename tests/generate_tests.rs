use sql_query_agent::{
    error::AppResult,
    generate::{Row, format_rows_for_llm, parse_generation_response, request_clarification},
    llm::TextGenerator
};

/// Echoes the prompt back, so tests can see what the chain sent.
struct EchoLlm;

impl TextGenerator for EchoLlm {
    fn complete(&self, prompt: &str) -> impl Future<Output = AppResult<String>> + Send {
        let reply = format!("  {}  \n", prompt);
        async move { Ok(reply) }
    }
}

#[test]
fn test_parse_clean_json() {
    let response = r#"{
        "sql": "SELECT COUNT(*) FROM customers;",
        "explanation": "Counts customers.",
        "confidence": 0.95,
        "tables_used": ["customers"]
    }"#;

    let generation = parse_generation_response(response);
    assert_eq!(generation.sql.as_deref(), Some("SELECT COUNT(*) FROM customers;"));
    assert_eq!(generation.explanation, "Counts customers.");
    assert_eq!(generation.confidence, 0.95);
    assert_eq!(generation.tables_used.len(), 1);
    assert_eq!(generation.tables_used[0], "customers");
}

#[test]
fn test_parse_fenced_json() {
    let response = "```json\n{\"sql\": \"SELECT 1;\", \"confidence\": 1.0}\n```";

    let generation = parse_generation_response(response);
    assert_eq!(generation.sql.as_deref(), Some("SELECT 1;"));
    assert_eq!(generation.confidence, 1.0);
}

#[test]
fn test_parse_fenced_without_language_tag() {
    let response = "```\n{\"sql\": \"SELECT 1;\"}\n```";

    let generation = parse_generation_response(response);
    assert_eq!(generation.sql.as_deref(), Some("SELECT 1;"));
}

#[test]
fn test_missing_optional_fields_default() {
    let generation = parse_generation_response(r#"{"sql": "SELECT 1;"}"#);

    assert!(generation.sql.is_some());
    assert_eq!(generation.explanation, "");
    assert_eq!(generation.confidence, 0.5);
    assert!(generation.tables_used.is_empty());
}

#[test]
fn test_fallback_extracts_select() {
    let response = "Sure! Here is the query you asked for:\n\n\
                    SELECT name FROM products ORDER BY price DESC LIMIT 5;\n\n\
                    Let me know if you need anything else.";

    let generation = parse_generation_response(response);
    assert_eq!(
        generation.sql.as_deref(),
        Some("SELECT name FROM products ORDER BY price DESC LIMIT 5;")
    );
    assert_eq!(generation.confidence, 0.3);
}

#[test]
fn test_fallback_is_case_insensitive() {
    let generation = parse_generation_response("here: select id from t;");
    assert_eq!(generation.sql.as_deref(), Some("select id from t;"));
}

#[test]
fn test_garbage_yields_no_sql() {
    let generation = parse_generation_response("I cannot answer that question.");

    assert!(generation.sql.is_none());
    assert_eq!(generation.confidence, 0.0);
    assert!(!generation.explanation.is_empty());
}

#[test]
fn test_json_without_sql_falls_through() {
    // Valid JSON but no usable sql field: the fallback still gets a chance
    let generation = parse_generation_response(r#"{"explanation": "no idea"}"#);
    assert!(generation.sql.is_none());
}

#[tokio::test]
async fn test_request_clarification_sends_question_and_schema() {
    let reply = request_clarification(
        &EchoLlm,
        "how many of the thing?",
        "Database Schema:\n\nTable: customers\n"
    )
    .await
    .unwrap();

    assert!(reply.contains("how many of the thing?"));
    assert!(reply.contains("Table: customers"));
    // The chain trims whatever the model returns
    assert!(!reply.starts_with(' '));
    assert!(!reply.ends_with('\n'));
}

#[test]
fn test_format_rows_empty() {
    assert_eq!(format_rows_for_llm(&[], 10), "No results.");
}

#[test]
fn test_format_rows_truncates() {
    let rows: Vec<Row> = (0..15)
        .map(|i| {
            let mut row = Row::new();
            row.insert("id".into(), serde_json::json!(i));
            row
        })
        .collect();

    let text = format_rows_for_llm(&rows, 10);
    assert!(text.contains("... and 5 more rows."));
    assert!(text.contains("\"id\": 0"));
    assert!(!text.contains("\"id\": 12"));
}

#[test]
fn test_format_rows_under_limit_has_no_marker() {
    let mut row = Row::new();
    row.insert("count".into(), serde_json::json!(42));

    let text = format_rows_for_llm(&[row], 10);
    assert!(!text.contains("more rows"));
    assert!(text.contains("42"));
}
