//! Prompt templates for SQL generation and result explanation.
//!
//! The generation prompt pins the model to a JSON reply containing `sql`,
//! `explanation`, `confidence`, and `tables_used`. The system section states
//! the read-only contract up front; the validator in [`crate::validator`]
//! enforces it regardless of what the model actually produces.

/// Read-only contract and reply format for the generation call.
pub const SYSTEM_PROMPT: &str = r#"You are an AI assistant that writes PostgreSQL queries.

Your task:
1. Understand the user's question
2. Write a correct SQL query using the database schema
3. Only produce SELECT queries (INSERT, UPDATE, DELETE are forbidden)
4. Explain the query

Rules:
- Write SELECT queries only
- Use table and column names exactly as they appear in the schema
- Use foreign key relationships for JOINs
- Ask for clarification when the question is ambiguous
- Add LIMIT when the result could be large

Reply format (JSON):
{
    "sql": "SELECT * FROM ...",
    "explanation": "This query ...",
    "confidence": 0.95,
    "tables_used": ["customers", "orders"]
}
"#;

/// Few-shot question/answer pairs included in the generation prompt.
pub const FEW_SHOT_EXAMPLES: &str = r#"# Example question/answer pairs

## Example 1
Question: "How many customers do we have?"
Answer:
{
    "sql": "SELECT COUNT(*) AS customer_count FROM customers;",
    "explanation": "Counts the total number of rows in the customers table.",
    "confidence": 1.0,
    "tables_used": ["customers"]
}

## Example 2
Question: "Show the 5 most expensive products"
Answer:
{
    "sql": "SELECT name, price FROM products ORDER BY price DESC LIMIT 5;",
    "explanation": "Sorts products by price in descending order and returns the first 5.",
    "confidence": 1.0,
    "tables_used": ["products"]
}

## Example 3
Question: "Which city placed the most orders?"
Answer:
{
    "sql": "SELECT c.city, COUNT(o.order_id) AS order_count FROM customers c JOIN orders o ON c.customer_id = o.customer_id GROUP BY c.city ORDER BY order_count DESC LIMIT 1;",
    "explanation": "Joins customers and orders, counts orders per city, and returns the city with the most.",
    "confidence": 0.95,
    "tables_used": ["customers", "orders"]
}

## Example 4
Question: "What are the 3 best-selling products?"
Answer:
{
    "sql": "SELECT p.name, SUM(oi.quantity) AS total_sold FROM products p JOIN order_items oi ON p.product_id = oi.product_id GROUP BY p.product_id, p.name ORDER BY total_sold DESC LIMIT 3;",
    "explanation": "Joins products and order_items, sums quantities per product, and returns the top sellers.",
    "confidence": 0.95,
    "tables_used": ["products", "order_items"]
}
"#;

/// Build the full generation prompt.
pub fn query_generation_prompt(schema: &str, few_shot_examples: &str, question: &str) -> String {
    format!(
        "{system}\n\n\
         Database Schema:\n{schema}\n\n\
         {few_shot}\n\n\
         User Question: {question}\n\n\
         Using the schema above, write a SQL query that answers this question.\n\
         Reply in JSON (sql, explanation, confidence, tables_used).",
        system = SYSTEM_PROMPT,
        schema = schema,
        few_shot = few_shot_examples,
        question = question
    )
}

/// Build the prompt that turns query results into a natural-language answer.
pub fn result_explanation_prompt(question: &str, sql: &str, results: &str) -> String {
    format!(
        "The user's question: {question}\n\n\
         The SQL query that was executed:\n{sql}\n\n\
         Query results:\n{results}\n\n\
         Explain these results to the user in clear, natural language.\n\
         Answer the question directly without technical detail.\n\
         Highlight numeric results and the key findings.",
        question = question,
        sql = sql,
        results = results
    )
}

/// Build the prompt that explains a query failure in user-friendly terms.
pub fn error_explanation_prompt(question: &str, sql: &str, error: &str) -> String {
    format!(
        "The user's question: {question}\n\n\
         The generated SQL query:\n{sql}\n\n\
         Error message:\n{error}\n\n\
         Explain this error to the user in plain language.\n\
         Avoid technical jargon; describe what went wrong simply.\n\
         Suggest an alternative question if possible.",
        question = question,
        sql = sql,
        error = error
    )
}

/// Build the prompt asking the user to clarify an ambiguous question.
pub fn clarification_prompt(question: &str, schema: &str) -> String {
    format!(
        "The user's question: {question}\n\n\
         Database schema:\n{schema}\n\n\
         This question is ambiguous or incomplete. Please:\n\
         1. Explain what is unclear\n\
         2. Suggest how to ask a more specific question\n\
         3. Give example questions",
        question = question,
        schema = schema
    )
}
