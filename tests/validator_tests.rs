use sql_query_agent::validator::{
    MAX_JOIN_COUNT, MAX_QUERY_LENGTH, RejectReason, SqlValidator, Verdict, extract_table_names,
    sanitize_sql
};

fn strict() -> SqlValidator {
    SqlValidator::new(true)
}

fn lenient() -> SqlValidator {
    SqlValidator::new(false)
}

#[test]
fn test_valid_select_query() {
    let verdict = strict().validate("SELECT * FROM customers;");
    assert!(verdict.is_accepted());
    assert!(verdict.reason().is_none());
}

#[test]
fn test_select_with_where() {
    let sql = "SELECT name, email FROM customers WHERE city = 'Istanbul';";
    assert!(strict().validate(sql).is_accepted());
}

#[test]
fn test_select_with_join() {
    let sql = r#"
        SELECT c.name, o.order_date
        FROM customers c
        JOIN orders o ON c.customer_id = o.customer_id;
    "#;
    assert!(strict().validate(sql).is_accepted());
}

#[test]
fn test_select_lowercase() {
    assert!(strict().validate("select id from customers limit 5").is_accepted());
}

#[test]
fn test_with_cte_accepted() {
    let sql = "WITH big_orders AS (SELECT * FROM orders WHERE total > 100) \
               SELECT COUNT(*) FROM big_orders;";
    assert!(strict().validate(sql).is_accepted());
}

#[test]
fn test_leading_comment_skipped() {
    let sql = "-- top customers\nSELECT name FROM customers LIMIT 10;";
    assert!(strict().validate(sql).is_accepted());

    let sql = "/* generated */ SELECT name FROM customers;";
    assert!(strict().validate(sql).is_accepted());
}

#[test]
fn test_empty_query_rejected() {
    let verdict = strict().validate("");
    assert_eq!(verdict, Verdict::Rejected(RejectReason::EmptyQuery));
    assert_eq!(verdict.reason().unwrap(), "empty query");
}

#[test]
fn test_whitespace_only_rejected() {
    let verdict = strict().validate("   \n\t  ");
    assert_eq!(verdict, Verdict::Rejected(RejectReason::EmptyQuery));
}

#[test]
fn test_insert_forbidden() {
    let verdict = strict().validate("INSERT INTO customers (name) VALUES ('Test');");
    assert!(!verdict.is_accepted());
    assert!(verdict.reason().unwrap().contains("INSERT"));
}

#[test]
fn test_update_forbidden() {
    let verdict = strict().validate("UPDATE customers SET name = 'Test' WHERE id = 1;");
    assert!(!verdict.is_accepted());
    assert!(verdict.reason().unwrap().contains("UPDATE"));
}

#[test]
fn test_delete_forbidden() {
    let verdict = strict().validate("DELETE FROM customers WHERE id = 1;");
    assert!(!verdict.is_accepted());
    assert!(verdict.reason().unwrap().contains("DELETE"));
}

#[test]
fn test_drop_forbidden() {
    let verdict = strict().validate("DROP TABLE customers;");
    assert!(!verdict.is_accepted());
    assert!(verdict.reason().unwrap().contains("DROP"));
}

#[test]
fn test_stacked_statement_injection() {
    // A valid SELECT prefix must not smuggle a second statement through
    let verdict = strict().validate("SELECT 1; DROP TABLE customers;");
    assert!(!verdict.is_accepted());
    assert!(verdict.reason().unwrap().contains("DROP"));
}

#[test]
fn test_forbidden_keyword_case_insensitive() {
    let verdict = strict().validate("SELECT 1; dRoP TABLE x;");
    assert!(!verdict.is_accepted());
    assert!(verdict.reason().unwrap().contains("DROP"));
}

#[test]
fn test_keyword_inside_identifier_not_matched() {
    // "created_at" and "updated_at" contain CREATE/UPDATE as substrings only
    let sql = "SELECT created_at, updated_at FROM orders WHERE deleted = false;";
    assert!(strict().validate(sql).is_accepted());
}

#[test]
fn test_truncate_forbidden_after_select() {
    let verdict = strict().validate("SELECT 1; TRUNCATE TABLE logs;");
    assert!(!verdict.is_accepted());
    assert!(verdict.reason().unwrap().contains("TRUNCATE"));
}

#[test]
fn test_grant_forbidden() {
    let verdict = strict().validate("SELECT 1; GRANT ALL ON customers TO intruder;");
    assert!(!verdict.is_accepted());
    assert!(verdict.reason().unwrap().contains("GRANT"));
}

#[test]
fn test_not_read_only_names_leading_keyword() {
    let verdict = strict().validate("VACUUM customers;");
    assert!(!verdict.is_accepted());
    assert!(verdict.reason().unwrap().contains("VACUUM"));
}

#[test]
fn test_query_too_long() {
    let conditions: Vec<String> = (0..1000).map(|i| format!("id = {}", i)).collect();
    let sql = format!("SELECT * FROM customers WHERE {}", conditions.join(" OR "));
    assert!(sql.len() > MAX_QUERY_LENGTH);

    let verdict = strict().validate(&sql);
    assert!(!verdict.is_accepted());
    assert!(verdict.reason().unwrap().contains("too long"));
}

#[test]
fn test_too_long_regardless_of_content() {
    // Even a forbidden-free SELECT is rejected purely on length
    let sql = format!("SELECT '{}' FROM t", "x".repeat(MAX_QUERY_LENGTH + 1));
    let verdict = lenient().validate(&sql);
    assert!(verdict.reason().unwrap().contains("too long"));
}

#[test]
fn test_too_many_joins_strict() {
    let joins: Vec<String> = (1..=11)
        .map(|i| format!("JOIN table{i} ON table{}.id = table{i}.id", i - 1))
        .collect();
    let sql = format!("SELECT * FROM table0 {}", joins.join(" "));

    let verdict = strict().validate(&sql);
    assert!(!verdict.is_accepted());
    let reason = verdict.reason().unwrap();
    assert!(reason.contains("JOIN") || reason.contains("complex"));
}

#[test]
fn test_too_many_joins_lenient_accepted() {
    let joins: Vec<String> = (1..=11)
        .map(|i| format!("JOIN table{i} ON table{}.id = table{i}.id", i - 1))
        .collect();
    let sql = format!("SELECT * FROM table0 {}", joins.join(" "));

    assert!(lenient().validate(&sql).is_accepted());
}

#[test]
fn test_join_ceiling_boundary() {
    // Exactly MAX_JOIN_COUNT joins is still fine in strict mode
    let joins: Vec<String> = (1..=MAX_JOIN_COUNT)
        .map(|i| format!("JOIN t{i} ON t{}.id = t{i}.id", i - 1))
        .collect();
    let sql = format!("SELECT * FROM t0 {}", joins.join(" "));

    assert!(strict().validate(&sql).is_accepted());
}

#[test]
fn test_checks_never_panic_on_garbage() {
    for garbage in ["\u{0}\u{1}\u{2}", "😀😀😀", "((((((", ";;;;", "'; --"] {
        let _ = strict().validate(garbage);
    }
}

#[test]
fn test_validate_batch() {
    let queries = [
        "SELECT * FROM customers;",
        "DROP TABLE customers;",
        "SELECT id FROM orders LIMIT 1;",
    ];
    let verdicts = strict().validate_batch(&queries);

    assert_eq!(verdicts.len(), 3);
    assert!(verdicts[0].is_accepted());
    assert!(!verdicts[1].is_accepted());
    assert!(verdicts[2].is_accepted());
}

#[test]
fn test_sanitize_sql() {
    let sanitized = sanitize_sql("  SELECT   *   FROM   customers  ");
    assert_eq!(sanitized, "SELECT * FROM customers");
}

#[test]
fn test_sanitize_sql_newlines_and_tabs() {
    let sanitized = sanitize_sql("SELECT\n\tid,\n\tname\nFROM customers");
    assert_eq!(sanitized, "SELECT id, name FROM customers");
}

#[test]
fn test_sanitize_sql_idempotent() {
    for input in [
        "  SELECT   *   FROM   customers  ",
        "already clean",
        "",
        "\n\n\t",
    ] {
        let once = sanitize_sql(input);
        assert_eq!(sanitize_sql(&once), once);
    }
}

#[test]
fn test_extract_table_names() {
    let tables =
        extract_table_names("SELECT * FROM customers JOIN orders ON customers.id = orders.customer_id");

    assert!(tables.contains("customers"));
    assert!(tables.contains("orders"));
    assert_eq!(tables.len(), 2);
}

#[test]
fn test_extract_table_names_deduplicates() {
    let tables = extract_table_names("SELECT * FROM orders JOIN orders ON 1 = 1");
    assert_eq!(tables.len(), 1);
}

#[test]
fn test_extract_table_names_empty() {
    assert!(extract_table_names("not sql at all").is_empty());
    assert!(extract_table_names("").is_empty());
}

#[test]
fn test_extract_table_names_qualified() {
    let tables = extract_table_names("SELECT * FROM public.customers");
    assert!(tables.contains("public.customers"));
}

#[test]
fn test_validator_is_reusable() {
    let validator = strict();
    assert!(validator.validate("SELECT 1").is_accepted());
    assert!(!validator.validate("DELETE FROM t").is_accepted());
    // Verdicts do not leak between calls
    assert!(validator.validate("SELECT 1").is_accepted());
}

#[test]
fn test_default_is_strict() {
    assert!(SqlValidator::default().is_strict());
}
