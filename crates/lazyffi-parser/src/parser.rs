//! Core parser infrastructure: token cursor, error reporting, helpers.

use lazyffi_lexer::{Lexer, Token, TokenKind};
use lazyffi_types::js::{Expr, Program};
use lazyffi_types::{CompileErrors, ErrorCode, FfiError, SourceFile, Span, MAX_ERRORS};

/// Deepest expression nesting accepted before parsing gives up.
pub(crate) const MAX_NESTING: u32 = 64;

/// The host-code parser.
///
/// Consumes a token stream produced by the lexer and builds a
/// [`lazyffi_types::js`] AST, collecting errors and recovering at
/// statement boundaries.
pub struct Parser<'src> {
    tokens: Vec<Token>,
    pos: usize,
    source_file: &'src SourceFile,
    errors: CompileErrors,
    /// Current expression nesting depth.
    pub(crate) depth: u32,
    /// `in` is not a binary operator (inside a `for (...;` initializer).
    pub(crate) no_in: bool,
}

/// Result of parsing a whole program.
pub struct ParseResult {
    pub program: Option<Program>,
    pub errors: CompileErrors,
}

/// Result of parsing a single expression.
pub struct ExprParseResult {
    pub expr: Option<Expr>,
    pub errors: CompileErrors,
}

impl<'src> Parser<'src> {
    pub fn new(tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        Self {
            tokens,
            pos: 0,
            source_file,
            errors: CompileErrors::empty(),
            depth: 0,
            no_in: false,
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    pub(crate) fn peek(&self) -> &Token {
        static EOF: std::sync::OnceLock<Token> = std::sync::OnceLock::new();
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .unwrap_or_else(|| EOF.get_or_init(|| Token::new(TokenKind::Eof, Span::point(1, 1))))
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::point(1, 1)
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn look_ahead(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    /// Whether a line terminator precedes the current token.
    pub(crate) fn newline_before(&self) -> bool {
        self.peek().newline_before
    }

    /// Whether the `(` at the cursor closes onto a `=>`.
    pub(crate) fn parens_lead_to_arrow(&self) -> bool {
        let mut depth = 0usize;
        for (i, token) in self.tokens[self.pos..].iter().enumerate() {
            match token.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return self.look_ahead(i + 1) == &TokenKind::FatArrow;
                    }
                }
                TokenKind::Eof => return false,
                _ => {}
            }
        }
        false
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Option<Token> {
        if self.check(expected) {
            Some(self.advance())
        } else {
            self.error_at_current(format!("expected '{}', got '{}'", expected, self.peek_kind()));
            None
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> Option<String> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                self.advance();
                Some(name)
            }
            other => {
                self.error_at_current(format!("expected identifier, got '{other}'"));
                None
            }
        }
    }

    /// An identifier or any keyword, as accepted after `.` and as an object
    /// key.
    pub(crate) fn expect_property_name(&mut self) -> Option<String> {
        let kind = self.peek_kind().clone();
        match &kind {
            TokenKind::Identifier(name) => {
                self.advance();
                Some(name.clone())
            }
            _ => match kind.keyword_text() {
                Some(text) => {
                    self.advance();
                    Some(text.to_string())
                }
                None => {
                    self.error_at_current(format!("expected property name, got '{kind}'"));
                    None
                }
            },
        }
    }

    /// Accept an explicit `;` or an automatically inserted one.
    pub(crate) fn consume_semicolon(&mut self) -> Option<()> {
        if self.eat(&TokenKind::Semicolon)
            || self.check(&TokenKind::RBrace)
            || self.at_end()
            || self.newline_before()
        {
            return Some(());
        }
        self.error_at_current(format!("expected ';', got '{}'", self.peek_kind()));
        None
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    pub(crate) fn error_at_current(&mut self, message: impl Into<String>) {
        let span = self.current_span();
        self.error_at(message, span);
    }

    pub(crate) fn error_at(&mut self, message: impl Into<String>, span: Span) {
        let source_line = self
            .source_file
            .line(span.start_line)
            .unwrap_or("")
            .to_string();
        let error = FfiError::new(
            &self.source_file.name,
            ErrorCode::INVALID_HOST_CODE,
            message,
            span,
            source_line,
        );
        self.errors.push_error(error);
    }

    pub(crate) fn too_many_errors(&self) -> bool {
        self.errors.total_errors >= MAX_ERRORS
    }

    // ── Synchronization ───────────────────────────────────────────────────────

    /// Skip to the start of the next statement after an error.
    pub(crate) fn synchronize(&mut self) {
        let start = self.pos;
        while !self.at_end() {
            if self.pos > start && self.newline_before() {
                return;
            }
            match self.peek_kind() {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::RBrace if self.pos > start => return,
                TokenKind::Var
                | TokenKind::Let
                | TokenKind::Const
                | TokenKind::Function
                | TokenKind::Return
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Throw
                    if self.pos > start =>
                {
                    return
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ── Public API ────────────────────────────────────────────────────────────

    /// Parse the token stream as a sequence of statements.
    pub fn parse(mut self) -> ParseResult {
        let program = self.parse_program();
        ParseResult {
            program,
            errors: self.errors,
        }
    }

    /// Parse the token stream as exactly one expression.
    pub fn parse_single_expression(mut self) -> ExprParseResult {
        let expr = self.parse_expression();
        if expr.is_some() && !self.at_end() {
            self.error_at_current(format!(
                "unexpected '{}' after expression",
                self.peek_kind()
            ));
        }
        let expr = expr.filter(|_| !self.errors.has_errors());
        ExprParseResult {
            expr,
            errors: self.errors,
        }
    }
}

// ── Convenience entry points ──────────────────────────────────────────────────

/// Lex and parse a whole program. Lexer errors are reported before parser
/// errors.
pub fn parse_program(source: &SourceFile) -> ParseResult {
    let lexed = Lexer::new(source).lex();
    let mut result = Parser::new(lexed.tokens, source).parse();
    let mut errors = lexed.errors;
    errors.extend(result.errors);
    if errors.has_errors() {
        result.program = None;
    }
    result.errors = errors;
    result
}

/// Lex and parse a single expression.
pub fn parse_expression(source: &SourceFile) -> ExprParseResult {
    let lexed = Lexer::new(source).lex();
    let mut result = Parser::new(lexed.tokens, source).parse_single_expression();
    let mut errors = lexed.errors;
    errors.extend(result.errors);
    if errors.has_errors() {
        result.expr = None;
    }
    result.errors = errors;
    result
}
