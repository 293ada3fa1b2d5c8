//! Expression parsing with precedence climbing.
//!
//! Precedence (lowest to highest):
//! 1. Sequence: `,`
//! 2. Assignment / arrow: `=` `+=` … `=>` (right-assoc)
//! 3. Conditional: `? :`
//! 4. Logical: `??` `||`, then `&&`
//! 5. Bitwise: `|`, `^`, `&`
//! 6. Equality: `==` `!=` `===` `!==`
//! 7. Relational: `<` `>` `<=` `>=` `instanceof` `in`
//! 8. Shift: `<<` `>>` `>>>`
//! 9. Additive: `+` `-`
//! 10. Multiplicative: `*` `/` `%`
//! 11. Exponent: `**` (right-assoc)
//! 12. Unary prefix: `!` `-` `+` `~` `typeof` `void` `delete` `++` `--`
//! 13. Postfix: `++` `--`, calls, `.name`, `[index]`, `new`

use lazyffi_lexer::TokenKind;
use lazyffi_types::js::{
    ArrowBody, AssignOp, BinaryOp, Expr, ExprKind, Function, LogicalOp, Property, PropertyKey,
    UnaryOp, UpdateOp,
};

use crate::parser::{Parser, MAX_NESTING};

/// A binary-level operator and its binding power.
enum Infix {
    Binary(BinaryOp),
    Logical(LogicalOp),
}

impl<'src> Parser<'src> {
    /// Parse a full expression including comma sequences.
    pub(crate) fn parse_expression(&mut self) -> Option<Expr> {
        let first = self.parse_assignment()?;
        if !self.check(&TokenKind::Comma) {
            return Some(first);
        }
        let start = first.span;
        let mut items = vec![first];
        while self.eat(&TokenKind::Comma) {
            items.push(self.parse_assignment()?);
        }
        let span = start.merge(self.previous_span());
        Some(Expr::new(ExprKind::Sequence(items), span))
    }

    /// Parse an assignment-level expression (the unit of call arguments,
    /// array elements and property values).
    pub(crate) fn parse_assignment(&mut self) -> Option<Expr> {
        if self.depth >= MAX_NESTING {
            self.error_at_current("expression nested too deeply");
            return None;
        }
        self.depth += 1;
        let result = self.parse_assignment_inner();
        self.depth -= 1;
        result
    }

    fn parse_assignment_inner(&mut self) -> Option<Expr> {
        if let Some(arrow) = self.try_parse_arrow()? {
            return Some(arrow);
        }

        let target = self.parse_conditional()?;
        let Some(op) = assign_op(self.peek_kind()) else {
            return Some(target);
        };
        if !target.kind.is_assignable() {
            self.error_at("invalid assignment target", target.span);
            return None;
        }
        self.advance();
        let value = self.parse_assignment()?;
        let span = target.span.merge(value.span);
        Some(Expr::new(
            ExprKind::Assign {
                op,
                target: Box::new(target),
                value: Box::new(value),
            },
            span,
        ))
    }

    /// `x => body` or `(a, b) => body`. `Some(None)` when the cursor is not
    /// at an arrow function.
    fn try_parse_arrow(&mut self) -> Option<Option<Expr>> {
        let start = self.current_span();
        let params = match self.peek_kind().clone() {
            TokenKind::Identifier(name) if self.look_ahead(1) == &TokenKind::FatArrow => {
                self.advance();
                vec![name]
            }
            TokenKind::LParen if self.parens_lead_to_arrow() => {
                self.advance();
                self.parse_params_after_lparen()?
            }
            _ => return Some(None),
        };
        if self.newline_before() {
            self.error_at_current("line terminator before '=>'");
            return None;
        }
        self.expect(&TokenKind::FatArrow)?;
        let body = if self.check(&TokenKind::LBrace) {
            ArrowBody::Block(self.parse_block_body()?)
        } else {
            let saved = std::mem::replace(&mut self.no_in, false);
            let expr = self.parse_assignment();
            self.no_in = saved;
            ArrowBody::Expr(Box::new(expr?))
        };
        let span = start.merge(self.previous_span());
        Some(Some(Expr::new(ExprKind::Arrow { params, body }, span)))
    }

    /// Parameter names up to and including the closing `)`.
    pub(crate) fn parse_params_after_lparen(&mut self) -> Option<Vec<String>> {
        let mut params = Vec::new();
        while !self.check(&TokenKind::RParen) {
            params.push(self.expect_identifier()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Some(params)
    }

    fn parse_conditional(&mut self) -> Option<Expr> {
        let test = self.parse_binary(0)?;
        if !self.eat(&TokenKind::Question) {
            return Some(test);
        }
        let saved = std::mem::replace(&mut self.no_in, false);
        let consequent = self.parse_assignment();
        self.no_in = saved;
        let consequent = consequent?;
        self.expect(&TokenKind::Colon)?;
        let alternate = self.parse_assignment()?;
        let span = test.span.merge(alternate.span);
        Some(Expr::new(
            ExprKind::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            },
            span,
        ))
    }

    /// Precedence climbing over every binary and logical operator.
    fn parse_binary(&mut self, min_prec: u8) -> Option<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let Some((op, prec)) = self.infix_op() else {
                break;
            };
            if prec < min_prec {
                break;
            }
            self.advance();
            // `**` is right-associative.
            let next_min = if matches!(op, Infix::Binary(BinaryOp::Exp)) {
                prec
            } else {
                prec + 1
            };
            let right = self.parse_binary(next_min)?;
            let span = left.span.merge(right.span);
            let kind = match op {
                Infix::Binary(op) => ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                Infix::Logical(op) => ExprKind::Logical {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            };
            left = Expr::new(kind, span);
        }
        Some(left)
    }

    fn infix_op(&self) -> Option<(Infix, u8)> {
        use Infix::{Binary as B, Logical as L};
        Some(match self.peek_kind() {
            TokenKind::QuestionQuestion => (L(LogicalOp::Nullish), 1),
            TokenKind::PipePipe => (L(LogicalOp::Or), 1),
            TokenKind::AmpAmp => (L(LogicalOp::And), 2),
            TokenKind::Pipe => (B(BinaryOp::BitOr), 3),
            TokenKind::Caret => (B(BinaryOp::BitXor), 4),
            TokenKind::Amp => (B(BinaryOp::BitAnd), 5),
            TokenKind::EqEq => (B(BinaryOp::Eq), 6),
            TokenKind::BangEq => (B(BinaryOp::NotEq), 6),
            TokenKind::EqEqEq => (B(BinaryOp::StrictEq), 6),
            TokenKind::BangEqEq => (B(BinaryOp::StrictNotEq), 6),
            TokenKind::Lt => (B(BinaryOp::Lt), 7),
            TokenKind::LtEq => (B(BinaryOp::LtEq), 7),
            TokenKind::Gt => (B(BinaryOp::Gt), 7),
            TokenKind::GtEq => (B(BinaryOp::GtEq), 7),
            TokenKind::Instanceof => (B(BinaryOp::InstanceOf), 7),
            TokenKind::In if !self.no_in => (B(BinaryOp::In), 7),
            TokenKind::Shl => (B(BinaryOp::Shl), 8),
            TokenKind::Shr => (B(BinaryOp::Shr), 8),
            TokenKind::UShr => (B(BinaryOp::UShr), 8),
            TokenKind::Plus => (B(BinaryOp::Add), 9),
            TokenKind::Minus => (B(BinaryOp::Sub), 9),
            TokenKind::Star => (B(BinaryOp::Mul), 10),
            TokenKind::Slash => (B(BinaryOp::Div), 10),
            TokenKind::Percent => (B(BinaryOp::Mod), 10),
            TokenKind::StarStar => (B(BinaryOp::Exp), 11),
            _ => return None,
        })
    }

    fn parse_unary(&mut self) -> Option<Expr> {
        let start = self.current_span();
        let op = match self.peek_kind() {
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::Typeof => Some(UnaryOp::TypeOf),
            TokenKind::Void => Some(UnaryOp::Void),
            TokenKind::Delete => Some(UnaryOp::Delete),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary()?;
            let span = start.merge(operand.span);
            return Some(Expr::new(
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                span,
            ));
        }

        let update = match self.peek_kind() {
            TokenKind::PlusPlus => Some(UpdateOp::Increment),
            TokenKind::MinusMinus => Some(UpdateOp::Decrement),
            _ => None,
        };
        if let Some(op) = update {
            self.advance();
            let target = self.parse_unary()?;
            return self.finish_update(op, true, target, start);
        }

        let expr = self.parse_postfix()?;
        let update = match self.peek_kind() {
            TokenKind::PlusPlus if !self.newline_before() => Some(UpdateOp::Increment),
            TokenKind::MinusMinus if !self.newline_before() => Some(UpdateOp::Decrement),
            _ => None,
        };
        match update {
            Some(op) => {
                self.advance();
                let start = expr.span;
                self.finish_update(op, false, expr, start)
            }
            None => Some(expr),
        }
    }

    fn finish_update(
        &mut self,
        op: UpdateOp,
        prefix: bool,
        target: Expr,
        start: lazyffi_types::Span,
    ) -> Option<Expr> {
        if !target.kind.is_assignable() {
            self.error_at("invalid update target", target.span);
            return None;
        }
        let span = start.merge(self.previous_span());
        Some(Expr::new(
            ExprKind::Update {
                op,
                prefix,
                target: Box::new(target),
            },
            span,
        ))
    }

    /// Calls, member access and indexing, applied left to right.
    fn parse_postfix(&mut self) -> Option<Expr> {
        let mut expr = if self.check(&TokenKind::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        loop {
            expr = match self.peek_kind() {
                TokenKind::Dot | TokenKind::LBracket => self.parse_member(expr)?,
                TokenKind::LParen => {
                    self.advance();
                    let args = self.parse_arguments()?;
                    let span = expr.span.merge(self.previous_span());
                    Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    )
                }
                _ => return Some(expr),
            };
        }
    }

    /// One `.name` or `[index]` suffix.
    fn parse_member(&mut self, object: Expr) -> Option<Expr> {
        if self.eat(&TokenKind::Dot) {
            let property = self.expect_property_name()?;
            let span = object.span.merge(self.previous_span());
            return Some(Expr::new(
                ExprKind::Member {
                    object: Box::new(object),
                    property,
                },
                span,
            ));
        }
        self.expect(&TokenKind::LBracket)?;
        let saved = std::mem::replace(&mut self.no_in, false);
        let index = self.parse_expression();
        self.no_in = saved;
        let index = index?;
        self.expect(&TokenKind::RBracket)?;
        let span = object.span.merge(self.previous_span());
        Some(Expr::new(
            ExprKind::Index {
                object: Box::new(object),
                index: Box::new(index),
            },
            span,
        ))
    }

    /// `new Callee(args)`; the argument list is optional.
    fn parse_new(&mut self) -> Option<Expr> {
        let start = self.current_span();
        self.expect(&TokenKind::New)?;
        let mut callee = if self.check(&TokenKind::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        while matches!(self.peek_kind(), TokenKind::Dot | TokenKind::LBracket) {
            callee = self.parse_member(callee)?;
        }
        let args = if self.eat(&TokenKind::LParen) {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        let span = start.merge(self.previous_span());
        Some(Expr::new(
            ExprKind::New {
                callee: Box::new(callee),
                args,
            },
            span,
        ))
    }

    /// Arguments after `(` up to and including `)`.
    fn parse_arguments(&mut self) -> Option<Vec<Expr>> {
        let saved = std::mem::replace(&mut self.no_in, false);
        let args = self.parse_list(&TokenKind::RParen);
        self.no_in = saved;
        args
    }

    /// Comma-separated elements (with spread) until `close`, which is
    /// consumed. A trailing comma is allowed.
    fn parse_list(&mut self, close: &TokenKind) -> Option<Vec<Expr>> {
        let mut items = Vec::new();
        while !self.check(close) {
            let start = self.current_span();
            if self.eat(&TokenKind::DotDotDot) {
                let inner = self.parse_assignment()?;
                let span = start.merge(inner.span);
                items.push(Expr::new(ExprKind::Spread(Box::new(inner)), span));
            } else {
                items.push(self.parse_assignment()?);
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(close)?;
        Some(items)
    }

    fn parse_primary(&mut self) -> Option<Expr> {
        let token = self.peek().clone();
        let span = token.span;
        let kind = match token.kind {
            TokenKind::Identifier(name) => ExprKind::Ident(name),
            TokenKind::Number(n) => ExprKind::Number(n),
            TokenKind::Str(s) => ExprKind::Str(s),
            TokenKind::Template(s) => ExprKind::Template(s),
            TokenKind::Regex { pattern, flags } => ExprKind::Regex { pattern, flags },
            TokenKind::This => ExprKind::This,
            TokenKind::Null => ExprKind::Null,
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::LParen => {
                self.advance();
                let saved = std::mem::replace(&mut self.no_in, false);
                let inner = self.parse_expression();
                self.no_in = saved;
                let mut inner = inner?;
                self.expect(&TokenKind::RParen)?;
                inner.span = span.merge(self.previous_span());
                return Some(inner);
            }
            TokenKind::LBracket => {
                self.advance();
                let saved = std::mem::replace(&mut self.no_in, false);
                let items = self.parse_list(&TokenKind::RBracket);
                self.no_in = saved;
                let items = items?;
                return Some(Expr::new(ExprKind::Array(items), span.merge(self.previous_span())));
            }
            TokenKind::LBrace => return self.parse_object(),
            TokenKind::Function => {
                let func = self.parse_function()?;
                let span = span.merge(self.previous_span());
                return Some(Expr::new(ExprKind::Function(Box::new(func)), span));
            }
            other => {
                self.error_at_current(format!("expected expression, got '{other}'"));
                return None;
            }
        };
        self.advance();
        Some(Expr::new(kind, span))
    }

    /// `{ key: value, shorthand, method() { … }, [computed]: value }`
    fn parse_object(&mut self) -> Option<Expr> {
        let start = self.current_span();
        self.expect(&TokenKind::LBrace)?;
        let saved = std::mem::replace(&mut self.no_in, false);
        let props = self.parse_properties();
        self.no_in = saved;
        let props = props?;
        Some(Expr::new(ExprKind::Object(props), start.merge(self.previous_span())))
    }

    fn parse_properties(&mut self) -> Option<Vec<Property>> {
        let mut props = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let start = self.current_span();
            let key = match self.peek_kind().clone() {
                TokenKind::Str(s) => {
                    self.advance();
                    PropertyKey::Str(s)
                }
                TokenKind::Number(n) => {
                    self.advance();
                    PropertyKey::Number(n)
                }
                TokenKind::LBracket => {
                    self.advance();
                    let key = self.parse_assignment()?;
                    self.expect(&TokenKind::RBracket)?;
                    PropertyKey::Computed(Box::new(key))
                }
                _ => PropertyKey::Ident(self.expect_property_name()?),
            };

            let value = if self.eat(&TokenKind::Colon) {
                self.parse_assignment()?
            } else if self.check(&TokenKind::LParen) {
                self.advance();
                let params = self.parse_params_after_lparen()?;
                let body = self.parse_block_body()?;
                let func = Function {
                    name: None,
                    params,
                    body,
                };
                Expr::new(
                    ExprKind::Function(Box::new(func)),
                    start.merge(self.previous_span()),
                )
            } else if let PropertyKey::Ident(name) = &key {
                Expr::new(ExprKind::Ident(name.clone()), start)
            } else {
                self.error_at_current(format!("expected ':', got '{}'", self.peek_kind()));
                return None;
            };

            props.push(Property {
                key,
                value,
                span: start.merge(self.previous_span()),
            });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace)?;
        Some(props)
    }

    /// `function name?(params) { body }`
    pub(crate) fn parse_function(&mut self) -> Option<Function> {
        self.expect(&TokenKind::Function)?;
        let name = match self.peek_kind() {
            TokenKind::Identifier(_) => self.expect_identifier(),
            _ => None,
        };
        self.expect(&TokenKind::LParen)?;
        let params = self.parse_params_after_lparen()?;
        let body = self.parse_block_body()?;
        Some(Function { name, params, body })
    }
}

fn assign_op(kind: &TokenKind) -> Option<AssignOp> {
    Some(match kind {
        TokenKind::Eq => AssignOp::Assign,
        TokenKind::PlusEq => AssignOp::Add,
        TokenKind::MinusEq => AssignOp::Sub,
        TokenKind::StarEq => AssignOp::Mul,
        TokenKind::SlashEq => AssignOp::Div,
        TokenKind::PercentEq => AssignOp::Mod,
        TokenKind::StarStarEq => AssignOp::Exp,
        TokenKind::ShlEq => AssignOp::Shl,
        TokenKind::ShrEq => AssignOp::Shr,
        TokenKind::UShrEq => AssignOp::UShr,
        TokenKind::AmpEq => AssignOp::BitAnd,
        TokenKind::PipeEq => AssignOp::BitOr,
        TokenKind::CaretEq => AssignOp::BitXor,
        TokenKind::AmpAmpEq => AssignOp::And,
        TokenKind::PipePipeEq => AssignOp::Or,
        TokenKind::QuestionQuestionEq => AssignOp::Nullish,
        _ => return None,
    })
}
