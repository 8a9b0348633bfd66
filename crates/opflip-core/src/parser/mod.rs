// Parser module - front end for the supported Python subset
use std::path::Path;

use anyhow::Result;

use crate::ast::Program;

pub mod lexer;
pub mod python;


/// Trait for source-language parsers
pub trait Parser: Send + Sync {
    /// Parse source code into a program AST
    fn parse(&mut self, source: &str) -> Result<Program>;

    /// Parse a file
    fn parse_file(&mut self, path: &Path) -> Result<Program> {
        let source = std::fs::read_to_string(path)?;
        self.parse(&source)
    }

    /// Get parser name for debugging
    fn name(&self) -> &'static str;
}

pub use python::PythonParser;

/// Create the default parser
pub fn create_parser() -> Box<dyn Parser> {
    Box::new(PythonParser::new())
}
