use sql_query_agent::{
    agent::{QueryMetadata, QueryOutcome},
    generate::Row,
    output::{
        CheckResult, OutputFormat, OutputOptions, format_check_results, format_outcome,
        format_rows
    },
    validator::SqlValidator
};

fn plain(format: OutputFormat) -> OutputOptions {
    OutputOptions {
        format,
        colored: false
    }
}

fn sample_outcome() -> QueryOutcome {
    let mut row = Row::new();
    row.insert("customer_count".into(), serde_json::json!(42));

    QueryOutcome {
        question:    String::from("how many customers?"),
        sql:         Some(String::from("SELECT COUNT(*) FROM customers;")),
        rows:        Some(vec![row]),
        explanation: Some(String::from("You have 42 customers.")),
        success:     true,
        error:       None,
        metadata:    QueryMetadata {
            confidence:  0.9,
            tables_used: ["customers".into()].into_iter().collect(),
            row_count:   Some(1)
        }
    }
}

fn failed_outcome() -> QueryOutcome {
    QueryOutcome {
        question:    String::from("drop everything"),
        sql:         Some(String::from("DROP TABLE customers;")),
        rows:        None,
        explanation: None,
        success:     false,
        error:       Some(String::from(
            "only SELECT queries are allowed, query starts with 'DROP'"
        )),
        metadata:    QueryMetadata::default()
    }
}

#[test]
fn test_text_outcome_success() {
    let text = format_outcome(&sample_outcome(), &plain(OutputFormat::Text));

    assert!(text.contains("=== Answer ==="));
    assert!(text.contains("SQL: SELECT COUNT(*) FROM customers;"));
    assert!(text.contains("You have 42 customers."));
    assert!(text.contains("Tables: customers"));
    assert!(text.contains("Confidence: 90%"));
    assert!(text.contains("Rows: 1"));
}

#[test]
fn test_text_outcome_failure() {
    let text = format_outcome(&failed_outcome(), &plain(OutputFormat::Text));

    assert!(text.contains("=== Query Failed ==="));
    assert!(text.contains("Error: only SELECT queries are allowed"));
}

#[test]
fn test_json_outcome_round_trips() {
    let rendered = format_outcome(&sample_outcome(), &plain(OutputFormat::Json));
    let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

    assert_eq!(value["question"], "how many customers?");
    assert_eq!(value["success"], true);
    assert_eq!(value["metadata"]["row_count"], 1);
}

#[test]
fn test_yaml_outcome_renders() {
    let rendered = format_outcome(&sample_outcome(), &plain(OutputFormat::Yaml));

    assert!(rendered.contains("question: how many customers?"));
    assert!(rendered.contains("success: true"));
}

#[test]
fn test_format_rows_empty() {
    assert_eq!(format_rows(&[]), "No results found.\n");
}

#[test]
fn test_format_rows_truncates_at_ten() {
    let rows: Vec<Row> = (0..13)
        .map(|i| {
            let mut row = Row::new();
            row.insert("id".into(), serde_json::json!(i));
            row
        })
        .collect();

    let text = format_rows(&rows);
    assert!(text.contains("13 results found."));
    assert!(text.contains("10. "));
    assert!(!text.contains("11. "));
    assert!(text.contains("... and 3 more results."));
}

#[test]
fn test_check_results_text() {
    let validator = SqlValidator::new(true);
    let results = vec![
        CheckResult {
            input:   String::from("SELECT 1"),
            verdict: validator.validate("SELECT 1")
        },
        CheckResult {
            input:   String::from("DELETE FROM users"),
            verdict: validator.validate("DELETE FROM users")
        },
    ];

    let text = format_check_results(&results, &plain(OutputFormat::Text));
    assert!(text.contains("ACCEPTED  SELECT 1"));
    assert!(text.contains("REJECTED  DELETE FROM users"));
    assert!(text.contains("reason: only SELECT queries are allowed"));
}

#[test]
fn test_check_results_json() {
    let validator = SqlValidator::new(true);
    let results = vec![CheckResult {
        input:   String::from("SELECT 1"),
        verdict: validator.validate("SELECT 1")
    }];

    let rendered = format_check_results(&results, &plain(OutputFormat::Json));
    let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

    assert_eq!(value[0]["input"], "SELECT 1");
}
