//! # SQL Query Agent Library
//!
//! Natural-language-to-SQL agent with a static read-only safety gate.

pub mod agent;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod generate;
pub mod llm;
pub mod output;
pub mod prompts;
pub mod schema;
pub mod validator;
pub use masterror::{AppError, AppResult};
