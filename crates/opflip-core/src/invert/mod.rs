//! Condition-inversion engine.
//!
//! Walks a [`Program`] pre-order and replaces every comparison operator
//! that appears inside an `if`/`elif` test with its logical negation,
//! appending one [`ChangeRecord`] per rewritten comparison node. The
//! tree is mutated in place; everything outside branch tests is left
//! untouched.

mod changes;
mod op_table;

#[cfg(test)]
mod tests;

pub use changes::{ChangeLog, ChangeRecord};
use tracing::debug;

use crate::ast::{Expr, Pos, Program, Stmt};

/// Error raised when the tree violates the comparison-node invariant
/// (`ops` non-empty, one more operand than operators). This indicates
/// an upstream contract breach, not a recoverable condition.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InvertError {
    #[error("malformed comparison at {pos}: {ops} operator(s) against {comparators} right-hand operand(s)")]
    Structural {
        pos: Pos,
        ops: usize,
        comparators: usize,
    },
}

/// The traversal engine. One instance handles one tree; the scope flag
/// is engine-local state, never stored in the tree.
#[derive(Debug, Default)]
pub struct ConditionInverter {
    in_branch_test: bool,
    log: ChangeLog,
}

impl ConditionInverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrite operators recorded so far, in discovery order.
    pub fn changes(&self) -> &[ChangeRecord] {
        self.log.changes()
    }

    /// Consume the engine and yield the ordered change log.
    pub fn into_changes(self) -> Vec<ChangeRecord> {
        self.log.into_changes()
    }

    pub fn visit_program(&mut self, program: &mut Program) -> Result<(), InvertError> {
        for stmt in &mut program.statements {
            self.visit_stmt(stmt)?;
        }
        Ok(())
    }

    fn visit_stmt(&mut self, stmt: &mut Stmt) -> Result<(), InvertError> {
        match stmt {
            Stmt::If { test, body, orelse } => {
                // Save/restore rather than reset: a branch reached from
                // inside another branch's test must hand the outer
                // scope back intact.
                let saved = self.in_branch_test;
                self.in_branch_test = true;
                self.visit_expr(test)?;
                self.in_branch_test = false;
                for stmt in body {
                    self.visit_stmt(stmt)?;
                }
                for stmt in orelse {
                    self.visit_stmt(stmt)?;
                }
                self.in_branch_test = saved;
                Ok(())
            }
            // Loop conditions are not branch tests; their comparisons
            // stay as written.
            Stmt::While { test, body } => {
                self.visit_expr(test)?;
                self.visit_body(body)
            }
            Stmt::For { iter, body, .. } => {
                self.visit_expr(iter)?;
                self.visit_body(body)
            }
            Stmt::FunctionDef { body, .. } | Stmt::ClassDef { body, .. } => self.visit_body(body),
            Stmt::Assign { target, value } => {
                self.visit_expr(target)?;
                self.visit_expr(value)
            }
            Stmt::AugAssign { target, value, .. } => {
                self.visit_expr(target)?;
                self.visit_expr(value)
            }
            Stmt::Return { value } => match value {
                Some(value) => self.visit_expr(value),
                None => Ok(()),
            },
            Stmt::Expr { value } => self.visit_expr(value),
            Stmt::Pass | Stmt::Break | Stmt::Continue => Ok(()),
        }
    }

    fn visit_body(&mut self, body: &mut [Stmt]) -> Result<(), InvertError> {
        for stmt in body {
            self.visit_stmt(stmt)?;
        }
        Ok(())
    }

    fn visit_expr(&mut self, expr: &mut Expr) -> Result<(), InvertError> {
        match expr {
            Expr::Compare {
                pos,
                ops,
                comparators,
                ..
            } => {
                if !self.in_branch_test {
                    return Ok(());
                }
                if ops.is_empty() || ops.len() != comparators.len() {
                    return Err(InvertError::Structural {
                        pos: *pos,
                        ops: ops.len(),
                        comparators: comparators.len(),
                    });
                }
                let original = ops[0];
                for op in ops.iter_mut() {
                    *op = op.inverted();
                }
                debug!(%pos, %original, replacement = %ops[0], "inverted comparison");
                self.log.record(*pos, original, ops[0]);
                // Comparison operands are a traversal leaf: a
                // comparison nested inside another comparison's
                // operand is not rewritten.
                Ok(())
            }

            // Everything below descends transparently: the scope flag
            // is not reset at lambda, comprehension or conditional-
            // expression boundaries, so comparisons nested anywhere
            // inside a branch test remain candidates.
            Expr::BoolOp { values, .. } => {
                for value in values {
                    self.visit_expr(value)?;
                }
                Ok(())
            }
            Expr::UnaryOp { operand, .. } => self.visit_expr(operand),
            Expr::BinOp { left, right, .. } => {
                self.visit_expr(left)?;
                self.visit_expr(right)
            }
            Expr::IfExp { test, body, orelse } => {
                self.visit_expr(test)?;
                self.visit_expr(body)?;
                self.visit_expr(orelse)
            }
            Expr::Lambda { body, .. } => self.visit_expr(body),
            Expr::ListComp {
                element,
                iter,
                filter,
                ..
            } => {
                self.visit_expr(element)?;
                self.visit_expr(iter)?;
                match filter {
                    Some(filter) => self.visit_expr(filter),
                    None => Ok(()),
                }
            }
            Expr::Attribute { value, .. } => self.visit_expr(value),
            Expr::Subscript { value, index } => {
                self.visit_expr(value)?;
                self.visit_expr(index)
            }
            Expr::Call { func, args } => {
                self.visit_expr(func)?;
                for arg in args {
                    self.visit_expr(arg)?;
                }
                Ok(())
            }
            Expr::List { elements } => {
                for element in elements {
                    self.visit_expr(element)?;
                }
                Ok(())
            }

            Expr::Int(_)
            | Expr::Float(_)
            | Expr::Str(_)
            | Expr::Bool(_)
            | Expr::NoneLit
            | Expr::Name(_) => Ok(()),
        }
    }
}

/// Invert every comparison operator inside the branch tests of
/// `program`, in place. Returns the ordered change log.
pub fn invert_conditions(program: &mut Program) -> Result<Vec<ChangeRecord>, InvertError> {
    let mut inverter = ConditionInverter::new();
    inverter.visit_program(program)?;
    Ok(inverter.into_changes())
}
