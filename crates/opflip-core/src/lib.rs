//! # Opflip Core
//!
//! Core implementation of the branch-condition operator inverter, including:
//! - Abstract Syntax Tree (AST) definitions for the supported Python subset
//! - Indentation-aware lexer and recursive-descent parser
//! - The condition-inversion engine and its change log
//! - Source generation from the (mutated) AST
//!
//! This crate provides the components that can be used to build various
//! front ends (CLI, batch rewriter, editor integration, etc.)

#![warn(clippy::all)]

pub mod ast;
pub mod driver;
pub mod invert;
pub mod parser;

// Re-export commonly used types
pub use ast::{CmpOp, Expr, Pos, Program, Stmt, ToSource};
pub use driver::{invert_source, InvertOutcome};
pub use invert::{invert_conditions, ChangeLog, ChangeRecord, ConditionInverter, InvertError};
pub use parser::{create_parser, Parser, PythonParser};

/// Opflip version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for opflip core components
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("opflip_core=info".parse().unwrap()),
        )
        .init();
}

/// Error types for opflip core operations
#[derive(thiserror::Error, Debug)]
pub enum OpflipError {
    /// Parser error
    #[error("Parse error: {0}")]
    Parse(#[from] anyhow::Error),

    /// Rewrite engine error
    #[error("Invert error: {0}")]
    Invert(#[from] invert::InvertError),
}

/// Result type for opflip core operations
pub type Result<T> = std::result::Result<T, OpflipError>;
