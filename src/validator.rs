//! Read-only SQL safety validation.
//!
//! This module is the sole authority deciding whether an LLM-generated SQL
//! string may reach the database. The checks are deliberately conservative:
//! anything ambiguous is rejected rather than risk executing a mutating or
//! unbounded statement.
//!
//! # Checks (in order, short-circuiting)
//!
//! 1. Non-empty after trimming
//! 2. Leading statement is `SELECT` (or `WITH` introducing a CTE chain)
//! 3. No forbidden keyword anywhere in the text, including after a semicolon
//! 4. Length under [`MAX_QUERY_LENGTH`]
//! 5. Strict mode only: at most [`MAX_JOIN_COUNT`] JOINs
//!
//! Rejection is a normal return value, never an error. The validator holds no
//! mutable state after construction and is safe to share across threads.
//!
//! # Example
//!
//! ```
//! use sql_query_agent::validator::SqlValidator;
//!
//! let validator = SqlValidator::new(true);
//!
//! assert!(validator.validate("SELECT * FROM customers;").is_accepted());
//! assert!(!validator.validate("DROP TABLE customers;").is_accepted());
//! ```
//!
//! # Limitations
//!
//! The forbidden-keyword scan is a word-boundary regex over the raw string,
//! not a SQL grammar parse. Keywords split across comments can evade it. The
//! gate is a heuristic defense against generator mistakes and stacked-
//! statement injection, not a formal proof of read-onlyness.

use std::sync::LazyLock;

use compact_str::CompactString;
use indexmap::IndexSet;
use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;

/// Maximum accepted query length in characters.
pub const MAX_QUERY_LENGTH: usize = 5000;

/// Maximum JOIN count enforced in strict mode.
pub const MAX_JOIN_COUNT: usize = 10;

/// Statement keywords that must never appear anywhere in a candidate query.
///
/// Ordered for deterministic reporting; the scan reports the leftmost match.
pub const FORBIDDEN_KEYWORDS: [&str; 12] = [
    "INSERT", "UPDATE", "DELETE", "DROP", "ALTER", "TRUNCATE", "CREATE", "GRANT", "REVOKE",
    "MERGE", "EXEC", "EXECUTE",
];

static FORBIDDEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r"(?i)\b(?:{})\b", FORBIDDEN_KEYWORDS.join("|"));
    Regex::new(&pattern).unwrap_or_else(|e| unreachable!("invalid keyword pattern: {e}"))
});

static JOIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bJOIN\b").unwrap_or_else(|e| unreachable!("invalid join pattern: {e}"))
});

static TABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:FROM|JOIN)\s+([A-Za-z_][A-Za-z0-9_.]*)")
        .unwrap_or_else(|e| unreachable!("invalid table pattern: {e}"))
});

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+").unwrap_or_else(|e| unreachable!("invalid whitespace pattern: {e}"))
});

/// Why a candidate query was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RejectReason {
    /// Input is blank after trimming
    EmptyQuery,
    /// Query does not begin with a read-only statement; carries the leading
    /// keyword that was found instead
    NotReadOnly(CompactString),
    /// A mutating or DDL verb appears somewhere in the text
    ForbiddenKeyword(CompactString),
    /// Query exceeds [`MAX_QUERY_LENGTH`]
    TooLong {
        length: usize
    },
    /// Strict mode: query exceeds [`MAX_JOIN_COUNT`]
    TooComplex {
        joins: usize
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyQuery => write!(f, "empty query"),
            Self::NotReadOnly(keyword) => {
                write!(
                    f,
                    "only SELECT queries are allowed, query starts with '{}'",
                    keyword
                )
            }
            Self::ForbiddenKeyword(keyword) => {
                write!(f, "forbidden keyword '{}' found in query", keyword)
            }
            Self::TooLong {
                length
            } => {
                write!(
                    f,
                    "query too long: {} characters (max {})",
                    length, MAX_QUERY_LENGTH
                )
            }
            Self::TooComplex {
                joins
            } => {
                write!(f, "query too complex: {} JOINs (max {})", joins, MAX_JOIN_COUNT)
            }
        }
    }
}

/// Outcome of validating a candidate query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Accepted,
    Rejected(RejectReason)
}

impl Verdict {
    /// Whether the query may be forwarded to the execution sink.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// Human-readable rejection reason, `None` when accepted.
    pub fn reason(&self) -> Option<String> {
        match self {
            Self::Accepted => None,
            Self::Rejected(reason) => Some(reason.to_string())
        }
    }
}

/// Static gate for LLM-generated SQL.
///
/// The only configuration is the strictness flag, fixed at construction.
/// Strict mode additionally enforces the JOIN-count ceiling.
#[derive(Debug, Clone, Copy)]
pub struct SqlValidator {
    strict: bool
}

impl Default for SqlValidator {
    fn default() -> Self {
        Self::new(true)
    }
}

impl SqlValidator {
    /// Create a validator. `strict` enables the complexity ceiling.
    #[must_use]
    pub fn new(strict: bool) -> Self {
        Self {
            strict
        }
    }

    /// Whether the complexity ceiling is enforced.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Validate a candidate query.
    ///
    /// Checks run in a fixed order so rejection reasons are deterministic.
    /// Never panics and never returns an error; rejection is a value.
    pub fn validate(&self, sql: &str) -> Verdict {
        let trimmed = sql.trim();
        if trimmed.is_empty() {
            return Verdict::Rejected(RejectReason::EmptyQuery);
        }

        let statement = skip_leading_comments(trimmed);
        if !starts_with_keyword(statement, "SELECT") && !starts_with_keyword(statement, "WITH") {
            let leading = leading_keyword(statement);
            return Verdict::Rejected(RejectReason::NotReadOnly(leading));
        }

        // Whole-text scan: catches statements stacked after a semicolon
        if let Some(found) = FORBIDDEN_RE.find(trimmed) {
            let keyword = CompactString::from(found.as_str().to_uppercase());
            return Verdict::Rejected(RejectReason::ForbiddenKeyword(keyword));
        }

        let length = trimmed.chars().count();
        if length > MAX_QUERY_LENGTH {
            return Verdict::Rejected(RejectReason::TooLong {
                length
            });
        }

        if self.strict {
            let joins = JOIN_RE.find_iter(trimmed).count();
            if joins > MAX_JOIN_COUNT {
                return Verdict::Rejected(RejectReason::TooComplex {
                    joins
                });
            }
        }

        Verdict::Accepted
    }

    /// Validate a batch of candidate queries in parallel.
    pub fn validate_batch<S: AsRef<str> + Sync>(&self, queries: &[S]) -> Vec<Verdict> {
        queries
            .par_iter()
            .map(|sql| self.validate(sql.as_ref()))
            .collect()
    }
}

/// Collapse whitespace runs to single spaces and trim.
///
/// A display/logging normalization, not a security control. Idempotent.
pub fn sanitize_sql(sql: &str) -> String {
    WHITESPACE_RE.replace_all(sql.trim(), " ").into_owned()
}

/// Heuristically extract table names following FROM and JOIN keywords.
///
/// Best-effort metadata for reporting; never used for authorization. Returns
/// an empty set when nothing matches.
pub fn extract_table_names(sql: &str) -> IndexSet<CompactString> {
    TABLE_RE
        .captures_iter(sql)
        .filter_map(|caps| caps.get(1))
        .map(|m| CompactString::from(m.as_str()))
        .collect()
}

fn starts_with_keyword(sql: &str, keyword: &str) -> bool {
    let Some(prefix) = sql.get(..keyword.len()) else {
        return false;
    };
    if !prefix.eq_ignore_ascii_case(keyword) {
        return false;
    }
    // Word boundary: "SELECTED" must not pass as "SELECT"
    sql[keyword.len()..]
        .chars()
        .next()
        .is_none_or(|c| !c.is_alphanumeric() && c != '_')
}

fn leading_keyword(sql: &str) -> CompactString {
    let word: String = sql
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    if word.is_empty() {
        CompactString::from(sql.chars().take(16).collect::<String>())
    } else {
        CompactString::from(word.to_uppercase())
    }
}

/// Skip leading `--` line comments and `/* */` block comments.
fn skip_leading_comments(sql: &str) -> &str {
    let mut rest = sql.trim_start();
    loop {
        if let Some(after) = rest.strip_prefix("--") {
            rest = match after.find('\n') {
                Some(pos) => after[pos + 1..].trim_start(),
                None => ""
            };
        } else if let Some(after) = rest.strip_prefix("/*") {
            rest = match after.find("*/") {
                Some(pos) => after[pos + 2..].trim_start(),
                None => ""
            };
        } else {
            return rest;
        }
        if rest.is_empty() {
            return rest;
        }
    }
}
