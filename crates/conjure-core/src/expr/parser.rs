//! Recursive-descent parser for the expression language
//!
//! The grammar is deliberately forgiving about things a model is likely
//! to emit even when not asked to: parameter type annotations, return
//! type arrows and trailing commas all parse (annotations are discarded).

use super::ast::{BinaryOp, Block, Expr, FnDef, ParamDef, Program, UnaryOp};
use super::token::{tokenize, Spanned, Token};
use super::value::Value;
use crate::error::CompileError;
use std::collections::HashSet;

/// Parse a source string into a [`Program`]
pub fn parse_program(source: &str) -> Result<Program, CompileError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser { tokens, pos: 0 };
    let mut functions: Vec<FnDef> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    while parser.peek().is_some() {
        let def = parser.parse_fndef()?;
        if !seen.insert(def.name.clone()) {
            return Err(CompileError::DuplicateFunction(def.name));
        }
        functions.push(def);
    }

    if functions.is_empty() {
        return Err(CompileError::EmptyProgram);
    }

    Ok(Program { functions })
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn peek_token(&self) -> Option<&Token> {
        self.peek().map(|s| &s.token)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let spanned = self.tokens.get(self.pos).cloned();
        if spanned.is_some() {
            self.pos += 1;
        }
        spanned
    }

    fn unexpected(&self, expected: &str) -> CompileError {
        match self.peek() {
            Some(spanned) => CompileError::UnexpectedToken {
                found: spanned.token.describe(),
                expected: expected.to_string(),
                offset: spanned.offset,
            },
            None => CompileError::UnexpectedEof {
                expected: expected.to_string(),
            },
        }
    }

    fn expect(&mut self, token: Token, expected: &str) -> Result<(), CompileError> {
        match self.peek_token() {
            Some(t) if *t == token => {
                self.advance();
                Ok(())
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    fn expect_ident(&mut self, expected: &str) -> Result<String, CompileError> {
        match self.peek_token() {
            Some(Token::Ident(_)) => match self.advance().map(|s| s.token) {
                Some(Token::Ident(name)) => Ok(name),
                _ => unreachable!("peeked an identifier"),
            },
            _ => Err(self.unexpected(expected)),
        }
    }

    fn parse_fndef(&mut self) -> Result<FnDef, CompileError> {
        self.expect(Token::Fn, "'fn'")?;
        let name = self.expect_ident("function name")?;
        self.expect(Token::LParen, "'('")?;

        let mut params: Vec<ParamDef> = Vec::new();
        let mut names: HashSet<String> = HashSet::new();
        loop {
            if matches!(self.peek_token(), Some(Token::RParen)) {
                self.advance();
                break;
            }
            let pname = self.expect_ident("parameter name")?;
            if !names.insert(pname.clone()) {
                return Err(CompileError::DuplicateFnParameter {
                    function: name,
                    parameter: pname,
                });
            }
            if matches!(self.peek_token(), Some(Token::Colon)) {
                self.advance();
                self.skip_type_annotation()?;
            }
            let default = if matches!(self.peek_token(), Some(Token::Assign)) {
                self.advance();
                Some(self.parse_literal()?)
            } else {
                None
            };
            params.push(ParamDef {
                name: pname,
                default,
            });

            match self.peek_token() {
                Some(Token::Comma) => {
                    self.advance();
                }
                Some(Token::RParen) => {}
                _ => return Err(self.unexpected("',' or ')'")),
            }
        }

        if matches!(self.peek_token(), Some(Token::Arrow)) {
            self.advance();
            self.skip_type_annotation()?;
        }

        let body = self.parse_block()?;
        Ok(FnDef { name, params, body })
    }

    /// Consume a type annotation such as `int` or `list[Point]`
    fn skip_type_annotation(&mut self) -> Result<(), CompileError> {
        self.expect_ident("type name")?;
        if matches!(self.peek_token(), Some(Token::LBracket)) {
            self.advance();
            self.skip_type_annotation()?;
            self.expect(Token::RBracket, "']'")?;
        }
        Ok(())
    }

    /// Literal values allowed as parameter defaults
    fn parse_literal(&mut self) -> Result<Value, CompileError> {
        let negate = if matches!(self.peek_token(), Some(Token::Minus)) {
            self.advance();
            true
        } else {
            false
        };
        let value = match self.peek_token() {
            Some(Token::Int(v)) => Value::Int(if negate { -*v } else { *v }),
            Some(Token::Float(v)) => Value::Float(if negate { -*v } else { *v }),
            Some(Token::Str(s)) if !negate => Value::Str(s.clone()),
            Some(Token::True) if !negate => Value::Bool(true),
            Some(Token::False) if !negate => Value::Bool(false),
            Some(Token::Nil) if !negate => Value::Nil,
            _ => return Err(self.unexpected("literal default value")),
        };
        self.advance();
        Ok(value)
    }

    fn parse_block(&mut self) -> Result<Block, CompileError> {
        self.expect(Token::LBrace, "'{'")?;
        let mut lets: Vec<(String, Expr)> = Vec::new();

        while matches!(self.peek_token(), Some(Token::Let)) {
            self.advance();
            let name = self.expect_ident("binding name")?;
            self.expect(Token::Assign, "'='")?;
            let expr = self.parse_expr(true)?;
            self.expect(Token::Semicolon, "';'")?;
            lets.push((name, expr));
        }

        let value = self.parse_expr(true)?;
        self.expect(Token::RBrace, "'}'")?;
        Ok(Block {
            lets,
            value: Box::new(value),
        })
    }

    /// `allow_record` suppresses record literals so that `if x { .. }`
    /// does not parse `x { .. }` as one; parenthesize to override.
    fn parse_expr(&mut self, allow_record: bool) -> Result<Expr, CompileError> {
        self.parse_or(allow_record)
    }

    fn parse_or(&mut self, allow_record: bool) -> Result<Expr, CompileError> {
        let mut lhs = self.parse_and(allow_record)?;
        while matches!(self.peek_token(), Some(Token::OrOr)) {
            self.advance();
            let rhs = self.parse_and(allow_record)?;
            lhs = Expr::Binary {
                op: BinaryOp::Or,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_and(&mut self, allow_record: bool) -> Result<Expr, CompileError> {
        let mut lhs = self.parse_equality(allow_record)?;
        while matches!(self.peek_token(), Some(Token::AndAnd)) {
            self.advance();
            let rhs = self.parse_equality(allow_record)?;
            lhs = Expr::Binary {
                op: BinaryOp::And,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self, allow_record: bool) -> Result<Expr, CompileError> {
        let mut lhs = self.parse_comparison(allow_record)?;
        loop {
            let op = match self.peek_token() {
                Some(Token::EqEq) => BinaryOp::Eq,
                Some(Token::NotEq) => BinaryOp::NotEq,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_comparison(allow_record)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_comparison(&mut self, allow_record: bool) -> Result<Expr, CompileError> {
        let mut lhs = self.parse_additive(allow_record)?;
        loop {
            let op = match self.peek_token() {
                Some(Token::Lt) => BinaryOp::Lt,
                Some(Token::LtEq) => BinaryOp::LtEq,
                Some(Token::Gt) => BinaryOp::Gt,
                Some(Token::GtEq) => BinaryOp::GtEq,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_additive(allow_record)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self, allow_record: bool) -> Result<Expr, CompileError> {
        let mut lhs = self.parse_multiplicative(allow_record)?;
        loop {
            let op = match self.peek_token() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_multiplicative(allow_record)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self, allow_record: bool) -> Result<Expr, CompileError> {
        let mut lhs = self.parse_unary(allow_record)?;
        loop {
            let op = match self.peek_token() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Rem,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary(allow_record)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self, allow_record: bool) -> Result<Expr, CompileError> {
        let op = match self.peek_token() {
            Some(Token::Minus) => Some(UnaryOp::Neg),
            Some(Token::Bang) => Some(UnaryOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let expr = self.parse_unary(allow_record)?;
            return Ok(Expr::Unary {
                op,
                expr: Box::new(expr),
            });
        }
        self.parse_postfix(allow_record)
    }

    fn parse_postfix(&mut self, allow_record: bool) -> Result<Expr, CompileError> {
        let mut expr = self.parse_primary(allow_record)?;
        loop {
            match self.peek_token() {
                Some(Token::Dot) => {
                    self.advance();
                    let field = self.expect_ident("field name")?;
                    expr = Expr::Field {
                        expr: Box::new(expr),
                        field,
                    };
                }
                Some(Token::LBracket) => {
                    self.advance();
                    let index = self.parse_expr(true)?;
                    self.expect(Token::RBracket, "']'")?;
                    expr = Expr::Index {
                        list: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self, allow_record: bool) -> Result<Expr, CompileError> {
        match self.peek_token() {
            Some(Token::Int(_))
            | Some(Token::Float(_))
            | Some(Token::Str(_))
            | Some(Token::True)
            | Some(Token::False)
            | Some(Token::Nil) => {
                let value = match self.advance().map(|s| s.token) {
                    Some(Token::Int(v)) => Value::Int(v),
                    Some(Token::Float(v)) => Value::Float(v),
                    Some(Token::Str(s)) => Value::Str(s),
                    Some(Token::True) => Value::Bool(true),
                    Some(Token::False) => Value::Bool(false),
                    Some(Token::Nil) => Value::Nil,
                    _ => unreachable!("peeked a literal token"),
                };
                Ok(Expr::Literal(value))
            }
            Some(Token::LParen) => {
                self.advance();
                let expr = self.parse_expr(true)?;
                self.expect(Token::RParen, "')'")?;
                Ok(expr)
            }
            Some(Token::LBracket) => {
                self.advance();
                let items = self.parse_comma_separated(Token::RBracket, "']'")?;
                Ok(Expr::List(items))
            }
            Some(Token::If) => self.parse_if(),
            Some(Token::Ident(_)) => {
                let name = self.expect_ident("identifier")?;
                match self.peek_token() {
                    Some(Token::LParen) => {
                        self.advance();
                        let args = self.parse_comma_separated(Token::RParen, "')'")?;
                        Ok(Expr::Call { name, args })
                    }
                    Some(Token::LBrace) if allow_record => {
                        self.advance();
                        let fields = self.parse_record_fields()?;
                        Ok(Expr::RecordLit { name, fields })
                    }
                    _ => Ok(Expr::Var(name)),
                }
            }
            _ => Err(self.unexpected("an expression")),
        }
    }

    fn parse_if(&mut self) -> Result<Expr, CompileError> {
        self.expect(Token::If, "'if'")?;
        let cond = self.parse_expr(false)?;
        let then = self.parse_block()?;
        self.expect(Token::Else, "'else'")?;
        let otherwise = if matches!(self.peek_token(), Some(Token::If)) {
            // else-if chains desugar into a single-expression block
            let chained = self.parse_if()?;
            Block {
                lets: Vec::new(),
                value: Box::new(chained),
            }
        } else {
            self.parse_block()?
        };
        Ok(Expr::If {
            cond: Box::new(cond),
            then,
            otherwise,
        })
    }

    fn parse_comma_separated(
        &mut self,
        closing: Token,
        closing_text: &str,
    ) -> Result<Vec<Expr>, CompileError> {
        let mut items = Vec::new();
        loop {
            if self.peek_token() == Some(&closing) {
                self.advance();
                break;
            }
            items.push(self.parse_expr(true)?);
            match self.peek_token() {
                Some(Token::Comma) => {
                    self.advance();
                }
                Some(t) if *t == closing => {}
                _ => return Err(self.unexpected(&format!("',' or {}", closing_text))),
            }
        }
        Ok(items)
    }

    fn parse_record_fields(&mut self) -> Result<Vec<(String, Expr)>, CompileError> {
        let mut fields = Vec::new();
        loop {
            if matches!(self.peek_token(), Some(Token::RBrace)) {
                self.advance();
                break;
            }
            let name = self.expect_ident("field name")?;
            self.expect(Token::Colon, "':'")?;
            let value = self.parse_expr(true)?;
            fields.push((name, value));
            match self.peek_token() {
                Some(Token::Comma) => {
                    self.advance();
                }
                Some(Token::RBrace) => {}
                _ => return Err(self.unexpected("',' or '}'")),
            }
        }
        Ok(fields)
    }

}
