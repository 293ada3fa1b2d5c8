//! Statement parsing.

use lazyffi_lexer::TokenKind;
use lazyffi_types::js::{Declarator, ForInit, Program, Stmt, StmtKind, VarKind};
use lazyffi_types::Span;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    /// Parse statements until end of input.
    pub(crate) fn parse_program(&mut self) -> Option<Program> {
        let start = self.current_span();
        let mut body = Vec::new();
        while !self.at_end() && !self.too_many_errors() {
            match self.parse_statement() {
                Some(stmt) => body.push(stmt),
                None => self.recover(),
            }
        }
        let span = start.merge(self.previous_span());
        Some(Program { body, span })
    }

    /// Skip past a failed statement, always making progress.
    fn recover(&mut self) {
        let before = self.current_span();
        self.synchronize();
        if self.current_span() == before && !self.at_end() {
            self.advance();
        }
    }

    /// `{ statements }`, returning the statements.
    pub(crate) fn parse_block_body(&mut self) -> Option<Vec<Stmt>> {
        self.expect(&TokenKind::LBrace)?;
        let mut body = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            if self.too_many_errors() {
                return None;
            }
            match self.parse_statement() {
                Some(stmt) => body.push(stmt),
                None => self.recover(),
            }
        }
        self.expect(&TokenKind::RBrace)?;
        Some(body)
    }

    pub(crate) fn parse_statement(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        let kind = match self.peek_kind() {
            TokenKind::LBrace => StmtKind::Block(self.parse_block_body()?),
            TokenKind::Semicolon => {
                self.advance();
                StmtKind::Empty
            }
            TokenKind::Var | TokenKind::Let | TokenKind::Const => {
                let (kind, decls) = self.parse_var_declaration()?;
                self.consume_semicolon()?;
                StmtKind::Var(kind, decls)
            }
            TokenKind::Function => {
                let func = self.parse_function()?;
                if func.name.is_none() {
                    self.error_at("function declaration requires a name", start);
                    return None;
                }
                StmtKind::Function(func)
            }
            TokenKind::Return => {
                self.advance();
                let value = if self.check(&TokenKind::Semicolon)
                    || self.check(&TokenKind::RBrace)
                    || self.at_end()
                    || self.newline_before()
                {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.consume_semicolon()?;
                StmtKind::Return(value)
            }
            TokenKind::If => self.parse_if()?,
            TokenKind::While => {
                self.advance();
                let test = self.parse_paren_expression()?;
                let body = self.parse_statement()?;
                StmtKind::While {
                    test,
                    body: Box::new(body),
                }
            }
            TokenKind::For => self.parse_for()?,
            TokenKind::Break => {
                self.advance();
                self.consume_semicolon()?;
                StmtKind::Break
            }
            TokenKind::Continue => {
                self.advance();
                self.consume_semicolon()?;
                StmtKind::Continue
            }
            TokenKind::Throw => {
                self.advance();
                if self.newline_before() {
                    self.error_at_current("line terminator after 'throw'");
                    return None;
                }
                let value = self.parse_expression()?;
                self.consume_semicolon()?;
                StmtKind::Throw(value)
            }
            _ => {
                let expr = self.parse_expression()?;
                self.consume_semicolon()?;
                StmtKind::Expr(expr)
            }
        };
        Some(Stmt::new(kind, start.merge(self.previous_span())))
    }

    fn parse_paren_expression(&mut self) -> Option<lazyffi_types::js::Expr> {
        self.expect(&TokenKind::LParen)?;
        let expr = self.parse_expression()?;
        self.expect(&TokenKind::RParen)?;
        Some(expr)
    }

    fn parse_if(&mut self) -> Option<StmtKind> {
        self.expect(&TokenKind::If)?;
        let test = self.parse_paren_expression()?;
        let consequent = Box::new(self.parse_statement()?);
        let alternate = if self.eat(&TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Some(StmtKind::If {
            test,
            consequent,
            alternate,
        })
    }

    /// `for (init; test; update) body`
    fn parse_for(&mut self) -> Option<StmtKind> {
        self.expect(&TokenKind::For)?;
        self.expect(&TokenKind::LParen)?;

        let init = match self.peek_kind() {
            TokenKind::Semicolon => None,
            TokenKind::Var | TokenKind::Let | TokenKind::Const => {
                self.no_in = true;
                let decl = self.parse_var_declaration();
                self.no_in = false;
                let (kind, decls) = decl?;
                Some(ForInit::Var(kind, decls))
            }
            _ => {
                self.no_in = true;
                let expr = self.parse_expression();
                self.no_in = false;
                Some(ForInit::Expr(expr?))
            }
        };
        self.expect(&TokenKind::Semicolon)?;

        let test = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(&TokenKind::Semicolon)?;

        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(&TokenKind::RParen)?;

        let body = Box::new(self.parse_statement()?);
        Some(StmtKind::For {
            init,
            test,
            update,
            body,
        })
    }

    /// `var a = 1, b` without the terminating semicolon.
    fn parse_var_declaration(&mut self) -> Option<(VarKind, Vec<Declarator>)> {
        let kind = match self.advance().kind {
            TokenKind::Var => VarKind::Var,
            TokenKind::Let => VarKind::Let,
            _ => VarKind::Const,
        };
        let mut decls = Vec::new();
        loop {
            let start: Span = self.current_span();
            let name = self.expect_identifier()?;
            let init = if self.eat(&TokenKind::Eq) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            if kind == VarKind::Const && init.is_none() && !self.no_in {
                self.error_at("missing initializer in const declaration", start);
                return None;
            }
            decls.push(Declarator {
                name,
                init,
                span: start.merge(self.previous_span()),
            });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Some((kind, decls))
    }
}
