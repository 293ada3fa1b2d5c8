//! Host-code lexer: converts JavaScript source text to a token stream.
//!
//! Features:
//! - Keywords, identifiers (including `$` and `_`), and the full operator set
//! - Decimal, hex, octal and binary numbers with fractions and exponents
//! - Single/double-quoted strings and substitution-free template strings
//! - Regular expression literals, told apart from division by the
//!   preceding token
//! - Line and block comments
//! - Error recovery: collects up to 20 errors instead of stopping at the first

use lazyffi_types::{CompileErrors, ErrorCode, FfiError, SourceFile, Span, MAX_ERRORS};

use crate::token::{Token, TokenKind};

/// The host-code lexer.
pub struct Lexer<'src> {
    source: Vec<char>,
    source_file: &'src SourceFile,
    pos: usize,
    line: u32,
    col: u32,
    errors: CompileErrors,
    /// A line terminator was skipped since the last token.
    saw_newline: bool,
    /// Whether the last emitted token allows a following `/` to be division.
    after_operand: bool,
}

/// Result of lexing: tokens + any errors collected.
pub struct LexResult {
    /// The token stream (always ends with [`TokenKind::Eof`]).
    pub tokens: Vec<Token>,
    pub errors: CompileErrors,
}

impl<'src> Lexer<'src> {
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source: source_file.source.chars().collect(),
            source_file,
            pos: 0,
            line: 1,
            col: 1,
            errors: CompileErrors::empty(),
            saw_newline: false,
            after_operand: false,
        }
    }

    /// Lex the entire source into a token stream.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();
        loop {
            if self.errors.total_errors >= MAX_ERRORS {
                break;
            }
            self.skip_trivia();
            let newline_before = std::mem::take(&mut self.saw_newline);
            let mut token = self.scan_token();
            token.newline_before = newline_before;
            let is_eof = token.kind == TokenKind::Eof;
            self.after_operand = token.kind.ends_operand();
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            tokens.push(Token::new(TokenKind::Eof, self.current_span()));
        }
        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    /// Consume `ch` if it is next.
    fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn current_span(&self) -> Span {
        Span::point(self.line, self.col)
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(start_line, start_col, self.line, self.col.saturating_sub(1).max(1))
    }

    fn text_from(&self, start: usize) -> String {
        self.source[start..self.pos].iter().collect()
    }

    fn emit_error(&mut self, message: impl Into<String>, span: Span) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("").to_string();
        let err = FfiError::new(
            &self.source_file.name,
            ErrorCode::INVALID_HOST_CODE,
            message,
            span,
            source_line,
        );
        self.errors.push_error(err);
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace & comments
    // ─────────────────────────────────────────────────────────────

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some('\n') | Some('\u{2028}') | Some('\u{2029}') => {
                    self.saw_newline = true;
                    self.advance();
                }
                Some(c) if c.is_whitespace() || c == '\u{feff}' => {
                    self.advance();
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => self.skip_block_comment(),
                _ => return,
            }
        }
    }

    fn skip_block_comment(&mut self) {
        let (start_line, start_col) = (self.line, self.col);
        self.advance();
        self.advance();
        loop {
            match self.advance() {
                None => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error("unterminated block comment", span);
                    return;
                }
                Some('*') if self.peek() == Some('/') => {
                    self.advance();
                    return;
                }
                Some('\n') => self.saw_newline = true,
                Some(_) => {}
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Token scanning
    // ─────────────────────────────────────────────────────────────

    fn scan_token(&mut self) -> Token {
        let (start_line, start_col) = (self.line, self.col);
        let start = self.pos;
        let Some(ch) = self.advance() else {
            return Token::new(TokenKind::Eof, self.current_span());
        };

        let kind = match ch {
            '"' | '\'' => self.scan_string(ch, start_line, start_col),
            '`' => self.scan_template(start_line, start_col),
            '0'..='9' => self.scan_number(start, start_line, start_col),
            '.' if matches!(self.peek(), Some('0'..='9')) => {
                self.scan_number(start, start_line, start_col)
            }
            c if is_ident_start(c) => self.scan_identifier(start),
            '/' if !self.after_operand => self.scan_regex(start_line, start_col),
            _ => match self.scan_punctuator(ch) {
                Some(kind) => kind,
                None => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(format!("unexpected character '{ch}'"), span);
                    return self.resume();
                }
            },
        };
        Token::new(kind, self.span_from(start_line, start_col))
    }

    /// Continue with the next token after an error.
    fn resume(&mut self) -> Token {
        self.skip_trivia();
        self.scan_token()
    }

    fn scan_punctuator(&mut self, ch: char) -> Option<TokenKind> {
        use TokenKind as T;
        Some(match ch {
            '(' => T::LParen,
            ')' => T::RParen,
            '{' => T::LBrace,
            '}' => T::RBrace,
            '[' => T::LBracket,
            ']' => T::RBracket,
            ',' => T::Comma,
            ';' => T::Semicolon,
            ':' => T::Colon,
            '~' => T::Tilde,
            '.' => {
                if self.peek() == Some('.') && self.peek_at(1) == Some('.') {
                    self.advance();
                    self.advance();
                    T::DotDotDot
                } else {
                    T::Dot
                }
            }
            '?' => {
                if self.eat('?') {
                    if self.eat('=') {
                        T::QuestionQuestionEq
                    } else {
                        T::QuestionQuestion
                    }
                } else {
                    T::Question
                }
            }
            '=' => {
                if self.eat('>') {
                    T::FatArrow
                } else if self.eat('=') {
                    if self.eat('=') {
                        T::EqEqEq
                    } else {
                        T::EqEq
                    }
                } else {
                    T::Eq
                }
            }
            '!' => {
                if self.eat('=') {
                    if self.eat('=') {
                        T::BangEqEq
                    } else {
                        T::BangEq
                    }
                } else {
                    T::Bang
                }
            }
            '+' => {
                if self.eat('+') {
                    T::PlusPlus
                } else if self.eat('=') {
                    T::PlusEq
                } else {
                    T::Plus
                }
            }
            '-' => {
                if self.eat('-') {
                    T::MinusMinus
                } else if self.eat('=') {
                    T::MinusEq
                } else {
                    T::Minus
                }
            }
            '*' => {
                if self.eat('*') {
                    if self.eat('=') {
                        T::StarStarEq
                    } else {
                        T::StarStar
                    }
                } else if self.eat('=') {
                    T::StarEq
                } else {
                    T::Star
                }
            }
            '/' => {
                if self.eat('=') {
                    T::SlashEq
                } else {
                    T::Slash
                }
            }
            '%' => {
                if self.eat('=') {
                    T::PercentEq
                } else {
                    T::Percent
                }
            }
            '^' => {
                if self.eat('=') {
                    T::CaretEq
                } else {
                    T::Caret
                }
            }
            '&' => {
                if self.eat('&') {
                    if self.eat('=') {
                        T::AmpAmpEq
                    } else {
                        T::AmpAmp
                    }
                } else if self.eat('=') {
                    T::AmpEq
                } else {
                    T::Amp
                }
            }
            '|' => {
                if self.eat('|') {
                    if self.eat('=') {
                        T::PipePipeEq
                    } else {
                        T::PipePipe
                    }
                } else if self.eat('=') {
                    T::PipeEq
                } else {
                    T::Pipe
                }
            }
            '<' => {
                if self.eat('<') {
                    if self.eat('=') {
                        T::ShlEq
                    } else {
                        T::Shl
                    }
                } else if self.eat('=') {
                    T::LtEq
                } else {
                    T::Lt
                }
            }
            '>' => {
                if self.eat('>') {
                    if self.eat('>') {
                        if self.eat('=') {
                            T::UShrEq
                        } else {
                            T::UShr
                        }
                    } else if self.eat('=') {
                        T::ShrEq
                    } else {
                        T::Shr
                    }
                } else if self.eat('=') {
                    T::GtEq
                } else {
                    T::Gt
                }
            }
            _ => return None,
        })
    }

    // ─────────────────────────────────────────────────────────────
    // Identifiers & keywords
    // ─────────────────────────────────────────────────────────────

    fn scan_identifier(&mut self, start: usize) -> TokenKind {
        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                self.advance();
            } else {
                break;
            }
        }
        let text = self.text_from(start);
        TokenKind::from_keyword(&text).unwrap_or(TokenKind::Identifier(text))
    }

    // ─────────────────────────────────────────────────────────────
    // Number literals
    // ─────────────────────────────────────────────────────────────

    fn scan_number(&mut self, start: usize, start_line: u32, start_col: u32) -> TokenKind {
        let first = self.source[start];
        let radix = match (first, self.peek()) {
            ('0', Some('x' | 'X')) => Some(16),
            ('0', Some('o' | 'O')) => Some(8),
            ('0', Some('b' | 'B')) => Some(2),
            _ => None,
        };

        if let Some(radix) = radix {
            self.advance();
            let digits_start = self.pos;
            while self.peek().is_some_and(|c| c.is_digit(radix)) {
                self.advance();
            }
            let digits = self.text_from(digits_start);
            return match u64::from_str_radix(&digits, radix) {
                Ok(v) => self.finish_number(v as f64, start_line, start_col),
                Err(_) => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(format!("malformed base-{radix} number literal"), span);
                    TokenKind::Number(0.0)
                }
            };
        }

        // Leading `.` was already consumed when `first == '.'`.
        self.digits();
        if first != '.' && self.peek() == Some('.') {
            self.advance();
            self.digits();
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let sign = usize::from(matches!(self.peek_at(1), Some('+' | '-')));
            if self.peek_at(1 + sign).is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
                if sign == 1 {
                    self.advance();
                }
                self.digits();
            } else {
                let span = self.span_from(start_line, start_col);
                self.emit_error("missing exponent digits", span);
            }
        }
        let text = self.text_from(start);
        let value = text.parse::<f64>().unwrap_or(0.0);
        self.finish_number(value, start_line, start_col)
    }

    fn digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn finish_number(&mut self, value: f64, start_line: u32, start_col: u32) -> TokenKind {
        if self.peek().is_some_and(is_ident_start) {
            let span = self.span_from(start_line, start_col);
            self.emit_error("identifier starts immediately after numeric literal", span);
        }
        TokenKind::Number(value)
    }

    // ─────────────────────────────────────────────────────────────
    // Strings, templates & regular expressions
    // ─────────────────────────────────────────────────────────────

    fn scan_string(&mut self, quote: char, start_line: u32, start_col: u32) -> TokenKind {
        let mut buf = String::new();
        loop {
            match self.peek() {
                None | Some('\n') => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error("unterminated string literal", span);
                    return TokenKind::Str(buf);
                }
                Some(c) if c == quote => {
                    self.advance();
                    return TokenKind::Str(buf);
                }
                Some('\\') => {
                    if let Some(c) = self.scan_escape_sequence() {
                        buf.push(c);
                    }
                }
                Some(c) => {
                    self.advance();
                    buf.push(c);
                }
            }
        }
    }

    fn scan_template(&mut self, start_line: u32, start_col: u32) -> TokenKind {
        let mut buf = String::new();
        loop {
            match self.peek() {
                None => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error("unterminated template string", span);
                    return TokenKind::Template(buf);
                }
                Some('`') => {
                    self.advance();
                    return TokenKind::Template(buf);
                }
                Some('$') if self.peek_at(1) == Some('{') => {
                    let span = Span::new(self.line, self.col, self.line, self.col + 1);
                    self.emit_error("template substitutions are not supported", span);
                    self.advance();
                    buf.push('$');
                }
                Some('\\') => {
                    if let Some(c) = self.scan_escape_sequence() {
                        buf.push(c);
                    }
                }
                Some(c) => {
                    self.advance();
                    buf.push(c);
                }
            }
        }
    }

    /// Scan an escape sequence starting at the `\`.
    /// Returns `None` for line continuations and unrecoverable escapes.
    fn scan_escape_sequence(&mut self) -> Option<char> {
        let (start_line, start_col) = (self.line, self.col);
        self.advance();
        let c = self.advance()?;
        let resolved = match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'v' => '\u{b}',
            '0' if !self.peek().is_some_and(|d| d.is_ascii_digit()) => '\0',
            '\n' => return None,
            'x' => return self.scan_code_point(2, start_line, start_col),
            'u' if self.eat('{') => {
                let digits_start = self.pos;
                while self.peek().is_some_and(|d| d.is_ascii_hexdigit()) {
                    self.advance();
                }
                let digits = self.text_from(digits_start);
                if !self.eat('}') {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error("unterminated unicode escape", span);
                    return None;
                }
                return self.code_point(&digits, start_line, start_col);
            }
            'u' => return self.scan_code_point(4, start_line, start_col),
            other => other,
        };
        Some(resolved)
    }

    fn scan_code_point(&mut self, len: usize, start_line: u32, start_col: u32) -> Option<char> {
        let digits_start = self.pos;
        for _ in 0..len {
            if self.peek().is_some_and(|d| d.is_ascii_hexdigit()) {
                self.advance();
            }
        }
        let digits = self.text_from(digits_start);
        if digits.len() != len {
            let span = self.span_from(start_line, start_col);
            self.emit_error("malformed escape sequence", span);
            return None;
        }
        self.code_point(&digits, start_line, start_col)
    }

    fn code_point(&mut self, hex: &str, start_line: u32, start_col: u32) -> Option<char> {
        let c = u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
        if c.is_none() {
            let span = self.span_from(start_line, start_col);
            self.emit_error(format!("invalid code point \\u{{{hex}}}"), span);
        }
        c
    }

    fn scan_regex(&mut self, start_line: u32, start_col: u32) -> TokenKind {
        let mut pattern = String::new();
        let mut in_class = false;
        loop {
            match self.peek() {
                None | Some('\n') => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error("unterminated regular expression", span);
                    return TokenKind::Regex {
                        pattern,
                        flags: String::new(),
                    };
                }
                Some('\\') => {
                    self.advance();
                    pattern.push('\\');
                    if let Some(c) = self.peek().filter(|&c| c != '\n') {
                        self.advance();
                        pattern.push(c);
                    }
                }
                Some('/') if !in_class => {
                    self.advance();
                    break;
                }
                Some(c) => {
                    match c {
                        '[' => in_class = true,
                        ']' => in_class = false,
                        _ => {}
                    }
                    self.advance();
                    pattern.push(c);
                }
            }
        }
        let flags_start = self.pos;
        while self.peek().is_some_and(is_ident_continue) {
            self.advance();
        }
        let flags = self.text_from(flags_start);
        if let Some(bad) = flags.chars().find(|c| !"dgimsuyv".contains(*c)) {
            let span = self.span_from(start_line, start_col);
            self.emit_error(format!("invalid regular expression flag '{bad}'"), span);
        }
        TokenKind::Regex { pattern, flags }
    }
}

fn is_ident_start(c: char) -> bool {
    c == '$' || c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    is_ident_start(c) || c.is_alphanumeric() || c == '\u{200c}' || c == '\u{200d}'
}
