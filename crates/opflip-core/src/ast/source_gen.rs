// Source code generation from the AST
// This module reconstructs source text from the tree after mutation.
// Output is normalized (four-space indents, single spacing), not
// byte-identical to the input.

use super::*;

/// Trait for types that can generate their source code representation
pub trait ToSource {
    fn to_source(&self) -> String;
}

const INDENT: &str = "    ";

impl ToSource for Program {
    fn to_source(&self) -> String {
        let mut out = String::new();
        for stmt in &self.statements {
            write_stmt(&mut out, stmt, 0);
        }
        out
    }
}

impl ToSource for Stmt {
    fn to_source(&self) -> String {
        let mut out = String::new();
        write_stmt(&mut out, self, 0);
        out
    }
}

fn write_stmt(out: &mut String, stmt: &Stmt, indent: usize) {
    let pad = INDENT.repeat(indent);
    match stmt {
        Stmt::If { test, body, orelse } => {
            out.push_str(&format!("{pad}if {}:\n", test.to_source()));
            write_body(out, body, indent + 1);
            write_orelse(out, orelse, indent);
        }
        Stmt::While { test, body } => {
            out.push_str(&format!("{pad}while {}:\n", test.to_source()));
            write_body(out, body, indent + 1);
        }
        Stmt::For { target, iter, body } => {
            out.push_str(&format!("{pad}for {} in {}:\n", target, iter.to_source()));
            write_body(out, body, indent + 1);
        }
        Stmt::FunctionDef { name, params, body } => {
            out.push_str(&format!("{pad}def {}({}):\n", name, params.join(", ")));
            write_body(out, body, indent + 1);
        }
        Stmt::ClassDef { name, bases, body } => {
            if bases.is_empty() {
                out.push_str(&format!("{pad}class {name}:\n"));
            } else {
                out.push_str(&format!("{pad}class {}({}):\n", name, bases.join(", ")));
            }
            write_body(out, body, indent + 1);
        }
        Stmt::Assign { target, value } => {
            out.push_str(&format!(
                "{pad}{} = {}\n",
                target.to_source(),
                value.to_source()
            ));
        }
        Stmt::AugAssign { target, op, value } => {
            out.push_str(&format!(
                "{pad}{} {}= {}\n",
                target.to_source(),
                op.symbol(),
                value.to_source()
            ));
        }
        Stmt::Return { value } => match value {
            Some(v) => out.push_str(&format!("{pad}return {}\n", v.to_source())),
            None => out.push_str(&format!("{pad}return\n")),
        },
        Stmt::Pass => out.push_str(&format!("{pad}pass\n")),
        Stmt::Break => out.push_str(&format!("{pad}break\n")),
        Stmt::Continue => out.push_str(&format!("{pad}continue\n")),
        Stmt::Expr { value } => out.push_str(&format!("{pad}{}\n", value.to_source())),
    }
}

fn write_body(out: &mut String, body: &[Stmt], indent: usize) {
    if body.is_empty() {
        // A suite may not be empty in the surface syntax.
        out.push_str(&format!("{}pass\n", INDENT.repeat(indent)));
        return;
    }
    for stmt in body {
        write_stmt(out, stmt, indent);
    }
}

fn write_orelse(out: &mut String, orelse: &[Stmt], indent: usize) {
    let pad = INDENT.repeat(indent);
    match orelse {
        [] => {}
        // A lone nested If in the alternative renders as an elif chain.
        [Stmt::If { test, body, orelse }] => {
            out.push_str(&format!("{pad}elif {}:\n", test.to_source()));
            write_body(out, body, indent + 1);
            write_orelse(out, orelse, indent);
        }
        stmts => {
            out.push_str(&format!("{pad}else:\n"));
            write_body(out, stmts, indent + 1);
        }
    }
}

impl Expr {
    /// Binding strength used to decide where parentheses are required.
    fn precedence(&self) -> u8 {
        match self {
            Expr::Lambda { .. } | Expr::IfExp { .. } => 1,
            Expr::BoolOp {
                op: BoolOpKind::Or, ..
            } => 2,
            Expr::BoolOp {
                op: BoolOpKind::And,
                ..
            } => 3,
            Expr::UnaryOp {
                op: UnaryOp::Not, ..
            } => 4,
            Expr::Compare { .. } => 5,
            Expr::BinOp {
                op: BinOp::Add | BinOp::Sub,
                ..
            } => 6,
            Expr::BinOp { .. } => 7,
            Expr::UnaryOp {
                op: UnaryOp::Neg, ..
            } => 8,
            _ => 9,
        }
    }
}

/// Render `expr`, parenthesizing it when it binds looser than `min`.
fn grouped(expr: &Expr, min: u8) -> String {
    if expr.precedence() < min {
        format!("({})", expr.to_source())
    } else {
        expr.to_source()
    }
}

impl ToSource for Expr {
    fn to_source(&self) -> String {
        match self {
            Expr::Int(n) => n.to_string(),
            Expr::Float(f) => {
                // Keep a decimal point so the literal re-parses as a float.
                let s = f.to_string();
                if s.contains('.') || s.contains('e') {
                    s
                } else {
                    format!("{s}.0")
                }
            }
            Expr::Str(s) => format!("\"{}\"", escape_string(s)),
            Expr::Bool(b) => if *b { "True" } else { "False" }.to_string(),
            Expr::NoneLit => "None".to_string(),

            Expr::Name(name) => name.clone(),
            Expr::Attribute { value, attr } => format!("{}.{}", grouped(value, 9), attr),
            Expr::Subscript { value, index } => {
                format!("{}[{}]", grouped(value, 9), index.to_source())
            }
            Expr::Call { func, args } => {
                let args_str = args
                    .iter()
                    .map(|arg| arg.to_source())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}({})", grouped(func, 9), args_str)
            }
            Expr::List { elements } => {
                let elements_str = elements
                    .iter()
                    .map(|elem| elem.to_source())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("[{elements_str}]")
            }

            Expr::UnaryOp { op, operand } => match op {
                UnaryOp::Neg => format!("-{}", grouped(operand, 8)),
                UnaryOp::Not => format!("not {}", grouped(operand, 4)),
            },
            Expr::BinOp { left, op, right } => {
                let prec = self.precedence();
                format!(
                    "{} {} {}",
                    grouped(left, prec),
                    op.symbol(),
                    grouped(right, prec + 1)
                )
            }
            Expr::Compare {
                left,
                ops,
                comparators,
                ..
            } => {
                let mut result = grouped(left, 6);
                for (op, comparator) in ops.iter().zip(comparators) {
                    result.push_str(&format!(" {} {}", op.symbol(), grouped(comparator, 6)));
                }
                result
            }
            Expr::BoolOp { op, values } => {
                let prec = self.precedence();
                let joiner = match op {
                    BoolOpKind::And => " and ",
                    BoolOpKind::Or => " or ",
                };
                values
                    .iter()
                    .map(|v| grouped(v, prec))
                    .collect::<Vec<_>>()
                    .join(joiner)
            }

            Expr::IfExp { test, body, orelse } => format!(
                "{} if {} else {}",
                grouped(body, 2),
                grouped(test, 2),
                grouped(orelse, 1)
            ),
            Expr::Lambda { params, body } => {
                format!("lambda {}: {}", params.join(", "), grouped(body, 1))
            }
            Expr::ListComp {
                element,
                target,
                iter,
                filter,
            } => {
                let mut result = format!(
                    "[{} for {} in {}",
                    grouped(element, 2),
                    target,
                    grouped(iter, 2)
                );
                if let Some(cond) = filter {
                    result.push_str(&format!(" if {}", grouped(cond, 2)));
                }
                result.push(']');
                result
            }
        }
    }
}

// Helper function to escape string characters
fn escape_string(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '"' => r#"\""#.to_string(),
            '\\' => r"\\".to_string(),
            '\n' => r"\n".to_string(),
            '\r' => r"\r".to_string(),
            '\t' => r"\t".to_string(),
            c => c.to_string(),
        })
        .collect()
}
