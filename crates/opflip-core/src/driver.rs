//! Thin pipeline over the external collaborators: parse the source,
//! run the inversion engine over the tree, render the mutated tree.

use tracing::{debug, info};

use crate::ast::ToSource;
use crate::invert::{invert_conditions, ChangeRecord};
use crate::parser::create_parser;
use crate::Result;

/// Result of one inversion run: the rendered, mutated source and the
/// ordered change log.
#[derive(Debug, Clone, PartialEq)]
pub struct InvertOutcome {
    pub source: String,
    pub changes: Vec<ChangeRecord>,
}

/// Invert the branch-test comparison operators of `source` and render
/// the result. Parse errors and structural violations propagate; the
/// mutated tree is only rendered on a fully successful traversal.
pub fn invert_source(source: &str) -> Result<InvertOutcome> {
    let mut parser = create_parser();
    debug!(parser = parser.name(), len = source.len(), "parsing source");
    let mut program = parser.parse(source)?;

    let changes = invert_conditions(&mut program)?;
    info!(changes = changes.len(), "inverted branch conditions");

    Ok(InvertOutcome {
        source: program.to_source(),
        changes,
    })
}
