//! Database schema parsing and prompt-facing summaries.
//!
//! The agent never introspects a live database; it is handed DDL text
//! (`CREATE TABLE`, `CREATE INDEX`) and parses it into a structured
//! representation. [`Schema::to_summary`] renders the description the LLM
//! sees when generating SQL, including foreign-key relationships so the model
//! can pick correct JOIN conditions.
//!
//! # Example
//!
//! ```
//! use sql_query_agent::schema::{Schema, SqlDialect};
//!
//! let sql = r#"
//!     CREATE TABLE customers (
//!         customer_id INT PRIMARY KEY,
//!         email VARCHAR(255) NOT NULL
//!     );
//!     CREATE INDEX idx_email ON customers(email);
//! "#;
//!
//! let schema = Schema::parse(sql, SqlDialect::PostgreSQL).unwrap();
//!
//! let customers = schema.tables.get("customers").unwrap();
//! assert_eq!(customers.columns.len(), 2);
//!
//! let summary = schema.to_summary();
//! assert!(summary.contains("customers"));
//! ```

use std::collections::BTreeMap;

use sqlparser::{
    dialect::{Dialect, GenericDialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect},
    parser::Parser
};

use crate::error::{AppResult, schema_parse_error};

/// SQL dialect for DDL parsing
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub enum SqlDialect {
    Generic,
    MySQL,
    #[default]
    PostgreSQL,
    SQLite
}

impl SqlDialect {
    /// Convert to sqlparser dialect for parsing
    pub fn into_parser_dialect(self) -> Box<dyn Dialect> {
        match self {
            Self::Generic => Box::new(GenericDialect {}),
            Self::MySQL => Box::new(MySqlDialect {}),
            Self::PostgreSQL => Box::new(PostgreSqlDialect {}),
            Self::SQLite => Box::new(SQLiteDialect {})
        }
    }
}

/// Complete information about a database table.
#[derive(Debug, Clone)]
pub struct TableInfo {
    /// Table name
    pub name:         String,
    /// Ordered list of columns
    pub columns:      Vec<ColumnInfo>,
    /// Indexes defined on this table
    pub indexes:      Vec<IndexInfo>,
    /// Foreign-key relationships from this table
    pub foreign_keys: Vec<ForeignKeyInfo>
}

/// Column metadata extracted from CREATE TABLE.
#[derive(Debug, Clone)]
pub struct ColumnInfo {
    /// Column name
    pub name:        String,
    /// SQL data type (e.g., "INT", "VARCHAR(255)")
    pub data_type:   String,
    /// Whether NULL values are allowed
    pub is_nullable: bool,
    /// Whether this is a primary key column
    pub is_primary:  bool
}

/// Index metadata extracted from CREATE INDEX or table constraints.
#[derive(Debug, Clone)]
pub struct IndexInfo {
    /// Index name (may be empty for anonymous indexes)
    pub name:      String,
    /// Ordered list of indexed columns
    pub columns:   Vec<String>,
    /// Whether this is a unique index
    pub is_unique: bool
}

/// Foreign-key relationship extracted from a table constraint.
#[derive(Debug, Clone)]
pub struct ForeignKeyInfo {
    /// Referencing columns in this table
    pub columns:          Vec<String>,
    /// Referenced table
    pub foreign_table:    String,
    /// Referenced columns
    pub referred_columns: Vec<String>
}

/// Parsed database schema containing all tables and their metadata.
///
/// Tables are stored in a `BTreeMap` for deterministic iteration order.
#[derive(Debug, Default, Clone)]
pub struct Schema {
    /// Map of table name to table information
    pub tables: BTreeMap<String, TableInfo>
}

impl Schema {
    /// Parse SQL schema from string with specified dialect
    ///
    /// # Errors
    ///
    /// Returns error if DDL parsing fails
    pub fn parse(sql: &str, dialect: SqlDialect) -> AppResult<Self> {
        let parser_dialect = dialect.into_parser_dialect();
        let statements = Parser::parse_sql(parser_dialect.as_ref(), sql)
            .map_err(|e| schema_parse_error(e.to_string()))?;
        let mut schema = Self::default();
        for stmt in statements {
            schema.process_statement(stmt);
        }
        Ok(schema)
    }

    fn process_statement(&mut self, stmt: sqlparser::ast::Statement) {
        use sqlparser::ast::Statement;
        match stmt {
            Statement::CreateTable(create) => {
                let table_name = create.name.to_string();
                let mut columns = Vec::new();
                let mut indexes = Vec::new();
                let mut foreign_keys = Vec::new();
                for column in create.columns {
                    let is_primary = column.options.iter().any(|opt| {
                        matches!(opt.option, sqlparser::ast::ColumnOption::PrimaryKey(_))
                    });
                    columns.push(ColumnInfo {
                        name: column.name.to_string(),
                        data_type: column.data_type.to_string(),
                        is_nullable: !column.options.iter().any(|opt| {
                            matches!(opt.option, sqlparser::ast::ColumnOption::NotNull)
                        }),
                        is_primary
                    });
                }
                for constraint in create.constraints {
                    match constraint {
                        sqlparser::ast::TableConstraint::Index(idx) => {
                            indexes.push(IndexInfo {
                                name:      idx.name.map(|n| n.to_string()).unwrap_or_default(),
                                columns:   idx.columns.iter().map(|c| c.to_string()).collect(),
                                is_unique: false
                            });
                        }
                        sqlparser::ast::TableConstraint::ForeignKey(fk) => {
                            foreign_keys.push(ForeignKeyInfo {
                                columns:          fk.columns.iter().map(|c| c.to_string()).collect(),
                                foreign_table:    fk.foreign_table.to_string(),
                                referred_columns: fk
                                    .referred_columns
                                    .iter()
                                    .map(|c| c.to_string())
                                    .collect()
                            });
                        }
                        _ => {}
                    }
                }
                self.tables.insert(
                    table_name.clone(),
                    TableInfo {
                        name: table_name,
                        columns,
                        indexes,
                        foreign_keys
                    }
                );
            }
            Statement::CreateIndex(create_index) => {
                let table_name = create_index.table_name.to_string();
                if let Some(table) = self.tables.get_mut(&table_name) {
                    table.indexes.push(IndexInfo {
                        name:      create_index.name.map(|n| n.to_string()).unwrap_or_default(),
                        columns:   create_index.columns.iter().map(|c| c.to_string()).collect(),
                        is_unique: create_index.unique
                    });
                }
            }
            _ => {}
        }
    }

    /// Number of tables in the schema
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Render the schema description used in generation prompts
    pub fn to_summary(&self) -> String {
        let mut summary = String::from("Database Schema:\n\n");
        for table in self.tables.values() {
            summary.push_str(&format!("Table: {}\n", table.name));
            summary.push_str("Columns:\n");
            for col in &table.columns {
                let nullable = if col.is_nullable { "NULL" } else { "NOT NULL" };
                let primary = if col.is_primary { " PRIMARY KEY" } else { "" };
                summary.push_str(&format!(
                    "  - {name} {data_type} {nullable}{primary}\n",
                    name = col.name,
                    data_type = col.data_type,
                    nullable = nullable,
                    primary = primary
                ));
            }
            if !table.foreign_keys.is_empty() {
                summary.push_str("Relationships:\n");
                for fk in &table.foreign_keys {
                    summary.push_str(&format!(
                        "  - {columns} -> {table}({referred})\n",
                        columns = fk.columns.join(", "),
                        table = fk.foreign_table,
                        referred = fk.referred_columns.join(", ")
                    ));
                }
            }
            if !table.indexes.is_empty() {
                summary.push_str("Indexes:\n");
                for idx in &table.indexes {
                    let unique = if idx.is_unique { "UNIQUE " } else { "" };
                    summary.push_str(&format!(
                        "  - {unique}INDEX {name} ON ({columns})\n",
                        unique = unique,
                        name = idx.name,
                        columns = idx.columns.join(", ")
                    ));
                }
            }
            summary.push('\n');
        }
        summary
    }
}
