// Recursive-descent parser for the supported Python subset.
// Produces the unified AST; chained comparisons are collected into a
// single Compare node carrying the first operator's position.

use anyhow::{bail, Result};

use super::lexer::{tokenize, Token, TokenKind};
use super::Parser;
use crate::ast::{BinOp, BoolOpKind, CmpOp, Expr, Pos, Program, Stmt, UnaryOp};

const KEYWORDS: &[&str] = &[
    "if", "elif", "else", "while", "for", "in", "is", "not", "and", "or", "def", "class", "return",
    "pass", "break", "continue", "lambda", "True", "False", "None",
];

pub struct PythonParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl PythonParser {
    pub fn new() -> Self {
        Self {
            tokens: Vec::new(),
            pos: 0,
        }
    }
}

impl Default for PythonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for PythonParser {
    fn parse(&mut self, source: &str) -> Result<Program> {
        self.tokens = tokenize(source)?;
        self.pos = 0;
        let mut statements = Vec::new();
        loop {
            while matches!(self.kind(), TokenKind::Newline) {
                self.bump();
            }
            if matches!(self.kind(), TokenKind::Eof) {
                break;
            }
            statements.push(self.statement()?);
        }
        Ok(Program { statements })
    }

    fn name(&self) -> &'static str {
        "python-subset"
    }
}

impl PythonParser {
    fn peek(&self) -> &Token {
        // The token stream always ends with Eof.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn bump(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.kind() == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<()> {
        if !self.eat(kind) {
            let t = self.peek();
            bail!(
                "expected {what} at line {}, column {}, found {:?}",
                t.line,
                t.column,
                t.kind
            );
        }
        Ok(())
    }

    fn at_keyword(&self, kw: &str) -> bool {
        matches!(self.kind(), TokenKind::Name(n) if n == kw)
    }

    fn eat_keyword(&mut self, kw: &str) -> bool {
        if self.at_keyword(kw) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, kw: &str) -> Result<()> {
        if !self.eat_keyword(kw) {
            let t = self.peek();
            bail!(
                "expected '{kw}' at line {}, column {}, found {:?}",
                t.line,
                t.column,
                t.kind
            );
        }
        Ok(())
    }

    fn expect_name(&mut self) -> Result<String> {
        match self.kind() {
            TokenKind::Name(n) if !KEYWORDS.contains(&n.as_str()) => {
                let name = n.clone();
                self.bump();
                Ok(name)
            }
            _ => {
                let t = self.peek();
                bail!(
                    "expected a name at line {}, column {}, found {:?}",
                    t.line,
                    t.column,
                    t.kind
                );
            }
        }
    }

    // === Statements ===

    fn statement(&mut self) -> Result<Stmt> {
        if self.eat_keyword("if") {
            return self.if_tail();
        }
        if self.at_keyword("while") {
            return self.while_stmt();
        }
        if self.at_keyword("for") {
            return self.for_stmt();
        }
        if self.at_keyword("def") {
            return self.def_stmt();
        }
        if self.at_keyword("class") {
            return self.class_stmt();
        }
        self.simple_stmt()
    }

    fn simple_stmt(&mut self) -> Result<Stmt> {
        let stmt = self.small_stmt()?;
        self.end_of_statement()?;
        Ok(stmt)
    }

    fn small_stmt(&mut self) -> Result<Stmt> {
        if self.eat_keyword("pass") {
            return Ok(Stmt::Pass);
        }
        if self.eat_keyword("break") {
            return Ok(Stmt::Break);
        }
        if self.eat_keyword("continue") {
            return Ok(Stmt::Continue);
        }
        if self.eat_keyword("return") {
            let value = if matches!(self.kind(), TokenKind::Newline | TokenKind::Eof) {
                None
            } else {
                Some(self.expression()?)
            };
            return Ok(Stmt::Return { value });
        }

        let target = self.expression()?;
        let aug = match self.kind() {
            TokenKind::Assign => None,
            TokenKind::PlusAssign => Some(BinOp::Add),
            TokenKind::MinusAssign => Some(BinOp::Sub),
            _ => return Ok(Stmt::Expr { value: target }),
        };
        let t = self.peek().clone();
        self.bump();
        if !target.is_assignable() {
            bail!(
                "cannot assign to this expression at line {}, column {}",
                t.line,
                t.column
            );
        }
        let value = self.expression()?;
        Ok(match aug {
            Some(op) => Stmt::AugAssign { target, op, value },
            None => Stmt::Assign { target, value },
        })
    }

    fn end_of_statement(&mut self) -> Result<()> {
        match self.kind() {
            TokenKind::Newline => {
                self.bump();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            _ => {
                let t = self.peek();
                bail!(
                    "expected end of statement at line {}, column {}, found {:?}",
                    t.line,
                    t.column,
                    t.kind
                );
            }
        }
    }

    /// `if`/`elif` body, after the introducing keyword has been eaten.
    /// An elif chain becomes a nested If as the sole `orelse` statement.
    fn if_tail(&mut self) -> Result<Stmt> {
        let test = self.expression()?;
        self.expect(&TokenKind::Colon, "':'")?;
        let body = self.suite()?;
        let orelse = if self.eat_keyword("elif") {
            vec![self.if_tail()?]
        } else if self.eat_keyword("else") {
            self.expect(&TokenKind::Colon, "':'")?;
            self.suite()?
        } else {
            Vec::new()
        };
        Ok(Stmt::If { test, body, orelse })
    }

    fn while_stmt(&mut self) -> Result<Stmt> {
        self.expect_keyword("while")?;
        let test = self.expression()?;
        self.expect(&TokenKind::Colon, "':'")?;
        let body = self.suite()?;
        Ok(Stmt::While { test, body })
    }

    fn for_stmt(&mut self) -> Result<Stmt> {
        self.expect_keyword("for")?;
        let target = self.expect_name()?;
        self.expect_keyword("in")?;
        let iter = self.expression()?;
        self.expect(&TokenKind::Colon, "':'")?;
        let body = self.suite()?;
        Ok(Stmt::For { target, iter, body })
    }

    fn def_stmt(&mut self) -> Result<Stmt> {
        self.expect_keyword("def")?;
        let name = self.expect_name()?;
        self.expect(&TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        if !matches!(self.kind(), TokenKind::RParen) {
            loop {
                params.push(self.expect_name()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen, "')'")?;
        self.expect(&TokenKind::Colon, "':'")?;
        let body = self.suite()?;
        Ok(Stmt::FunctionDef { name, params, body })
    }

    fn class_stmt(&mut self) -> Result<Stmt> {
        self.expect_keyword("class")?;
        let name = self.expect_name()?;
        let mut bases = Vec::new();
        if self.eat(&TokenKind::LParen) {
            if !matches!(self.kind(), TokenKind::RParen) {
                loop {
                    bases.push(self.expect_name()?);
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(&TokenKind::RParen, "')'")?;
        }
        self.expect(&TokenKind::Colon, "':'")?;
        let body = self.suite()?;
        Ok(Stmt::ClassDef { name, bases, body })
    }

    /// A suite is either a single simple statement on the same line or
    /// an indented block.
    fn suite(&mut self) -> Result<Vec<Stmt>> {
        if !matches!(self.kind(), TokenKind::Newline) {
            return Ok(vec![self.simple_stmt()?]);
        }
        self.bump();
        self.expect(&TokenKind::Indent, "an indented block")?;
        let mut body = Vec::new();
        loop {
            while matches!(self.kind(), TokenKind::Newline) {
                self.bump();
            }
            match self.kind() {
                TokenKind::Dedent => {
                    self.bump();
                    break;
                }
                TokenKind::Eof => break,
                _ => body.push(self.statement()?),
            }
        }
        if body.is_empty() {
            let t = self.peek();
            bail!("expected an indented block at line {}", t.line);
        }
        Ok(body)
    }

    // === Expressions ===

    fn expression(&mut self) -> Result<Expr> {
        if self.at_keyword("lambda") {
            return self.lambda();
        }
        let value = self.or_expr()?;
        if self.eat_keyword("if") {
            let test = self.or_expr()?;
            self.expect_keyword("else")?;
            let orelse = self.expression()?;
            return Ok(Expr::IfExp {
                test: Box::new(test),
                body: Box::new(value),
                orelse: Box::new(orelse),
            });
        }
        Ok(value)
    }

    fn lambda(&mut self) -> Result<Expr> {
        self.bump();
        let mut params = Vec::new();
        if !matches!(self.kind(), TokenKind::Colon) {
            loop {
                params.push(self.expect_name()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::Colon, "':'")?;
        let body = self.expression()?;
        Ok(Expr::Lambda {
            params,
            body: Box::new(body),
        })
    }

    fn or_expr(&mut self) -> Result<Expr> {
        let first = self.and_expr()?;
        if !self.at_keyword("or") {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.eat_keyword("or") {
            values.push(self.and_expr()?);
        }
        Ok(Expr::BoolOp {
            op: BoolOpKind::Or,
            values,
        })
    }

    fn and_expr(&mut self) -> Result<Expr> {
        let first = self.not_expr()?;
        if !self.at_keyword("and") {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.eat_keyword("and") {
            values.push(self.not_expr()?);
        }
        Ok(Expr::BoolOp {
            op: BoolOpKind::And,
            values,
        })
    }

    fn not_expr(&mut self) -> Result<Expr> {
        if self.eat_keyword("not") {
            let operand = self.not_expr()?;
            return Ok(Expr::UnaryOp {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            });
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr> {
        let left = self.arith()?;
        let mut pos = None;
        let mut ops = Vec::new();
        let mut comparators = Vec::new();
        while let Some((op, op_pos)) = self.comparison_op()? {
            if pos.is_none() {
                pos = Some(op_pos);
            }
            ops.push(op);
            comparators.push(self.arith()?);
        }
        match pos {
            Some(pos) => Ok(Expr::Compare {
                pos,
                left: Box::new(left),
                ops,
                comparators,
            }),
            None => Ok(left),
        }
    }

    fn comparison_op(&mut self) -> Result<Option<(CmpOp, Pos)>> {
        let t = self.peek().clone();
        let pos = Pos::new(t.line, t.column);
        let op = match &t.kind {
            TokenKind::Lt => CmpOp::Lt,
            TokenKind::Gt => CmpOp::Gt,
            TokenKind::Le => CmpOp::LtE,
            TokenKind::Ge => CmpOp::GtE,
            TokenKind::EqEq => CmpOp::Eq,
            TokenKind::NotEq => CmpOp::NotEq,
            TokenKind::Name(n) if n == "in" => CmpOp::In,
            TokenKind::Name(n) if n == "is" => {
                self.bump();
                let op = if self.eat_keyword("not") {
                    CmpOp::IsNot
                } else {
                    CmpOp::Is
                };
                return Ok(Some((op, pos)));
            }
            TokenKind::Name(n) if n == "not" => {
                // Only `not in` continues a comparison.
                match self.tokens.get(self.pos + 1) {
                    Some(Token {
                        kind: TokenKind::Name(next),
                        ..
                    }) if next == "in" => {
                        self.bump();
                        self.bump();
                        return Ok(Some((CmpOp::NotIn, pos)));
                    }
                    _ => return Ok(None),
                }
            }
            _ => return Ok(None),
        };
        self.bump();
        Ok(Some((op, pos)))
    }

    fn arith(&mut self) -> Result<Expr> {
        let mut left = self.term()?;
        loop {
            let op = match self.kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.bump();
            let right = self.term()?;
            left = Expr::BinOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn term(&mut self) -> Result<Expr> {
        let mut left = self.factor()?;
        loop {
            let op = match self.kind() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            self.bump();
            let right = self.factor()?;
            left = Expr::BinOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn factor(&mut self) -> Result<Expr> {
        if self.eat(&TokenKind::Minus) {
            let operand = self.factor()?;
            return Ok(Expr::UnaryOp {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
            });
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Expr> {
        let mut expr = self.primary()?;
        loop {
            match self.kind() {
                TokenKind::Dot => {
                    self.bump();
                    let attr = self.expect_name()?;
                    expr = Expr::Attribute {
                        value: Box::new(expr),
                        attr,
                    };
                }
                TokenKind::LParen => {
                    self.bump();
                    let mut args = Vec::new();
                    if !matches!(self.kind(), TokenKind::RParen) {
                        loop {
                            args.push(self.expression()?);
                            if !self.eat(&TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect(&TokenKind::RParen, "')'")?;
                    expr = Expr::Call {
                        func: Box::new(expr),
                        args,
                    };
                }
                TokenKind::LBracket => {
                    self.bump();
                    let index = self.expression()?;
                    self.expect(&TokenKind::RBracket, "']'")?;
                    expr = Expr::Subscript {
                        value: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr> {
        let t = self.peek().clone();
        match t.kind {
            TokenKind::Int(n) => {
                self.bump();
                Ok(Expr::Int(n))
            }
            TokenKind::Float(f) => {
                self.bump();
                Ok(Expr::Float(f))
            }
            TokenKind::Str(s) => {
                self.bump();
                Ok(Expr::Str(s))
            }
            TokenKind::Name(n) => {
                if n == "True" {
                    self.bump();
                    return Ok(Expr::Bool(true));
                }
                if n == "False" {
                    self.bump();
                    return Ok(Expr::Bool(false));
                }
                if n == "None" {
                    self.bump();
                    return Ok(Expr::NoneLit);
                }
                if KEYWORDS.contains(&n.as_str()) {
                    bail!(
                        "unexpected keyword '{n}' at line {}, column {}",
                        t.line,
                        t.column
                    );
                }
                self.bump();
                Ok(Expr::Name(n))
            }
            TokenKind::LParen => {
                self.bump();
                let expr = self.expression()?;
                self.expect(&TokenKind::RParen, "')'")?;
                Ok(expr)
            }
            TokenKind::LBracket => self.list_or_comprehension(),
            kind => bail!(
                "unexpected token {:?} at line {}, column {}",
                kind,
                t.line,
                t.column
            ),
        }
    }

    fn list_or_comprehension(&mut self) -> Result<Expr> {
        self.expect(&TokenKind::LBracket, "'['")?;
        if self.eat(&TokenKind::RBracket) {
            return Ok(Expr::List {
                elements: Vec::new(),
            });
        }
        let first = self.expression()?;
        if self.eat_keyword("for") {
            let target = self.expect_name()?;
            self.expect_keyword("in")?;
            let iter = self.or_expr()?;
            let filter = if self.eat_keyword("if") {
                Some(Box::new(self.or_expr()?))
            } else {
                None
            };
            self.expect(&TokenKind::RBracket, "']'")?;
            return Ok(Expr::ListComp {
                element: Box::new(first),
                target,
                iter: Box::new(iter),
                filter,
            });
        }
        let mut elements = vec![first];
        while self.eat(&TokenKind::Comma) {
            if matches!(self.kind(), TokenKind::RBracket) {
                break;
            }
            elements.push(self.expression()?);
        }
        self.expect(&TokenKind::RBracket, "']'")?;
        Ok(Expr::List { elements })
    }
}
