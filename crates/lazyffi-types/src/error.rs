use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of errors kept before further ones are only counted.
pub const MAX_ERRORS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Fault category, derived from the error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// Malformed call templates.
    Format,
    /// Assembled call glue that is not a valid host expression.
    Generated,
    /// Foreign signatures and data declarations that cannot be marshalled.
    Signature,
    /// Advisory diagnostics (minification safety, shadowed dispatch cases).
    Lint,
}

/// Numeric diagnostic code (E100–E499).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Format faults (E100–E199) ──
    pub const INCOMPLETE_PLACEHOLDER: Self = Self(100);
    pub const NO_SUCH_ARGUMENT: Self = Self(101);
    pub const BAD_PLACEHOLDER: Self = Self(102);

    // ── Generated-code faults (E200–E299) ──
    pub const INVALID_HOST_CODE: Self = Self(200);

    // ── Signature faults (E300–E399) ──
    pub const NULLARY_FUNCTION: Self = Self(300);
    pub const UNKNOWN_TYPE: Self = Self(301);
    pub const GENERIC_ARITY: Self = Self(302);
    pub const DUPLICATE_DECLARATION: Self = Self(303);
    pub const UNBOUND_TYPE_VARIABLE: Self = Self(304);

    // ── Lint diagnostics (E400–E499) ──
    pub const NAKED_PROPERTY_ACCESS: Self = Self(400);
    pub const SHADOWED_CONSTRUCTOR: Self = Self(401);

    pub fn category(self) -> ErrorCategory {
        match self.0 {
            100..=199 => ErrorCategory::Format,
            200..=299 => ErrorCategory::Generated,
            300..=399 => ErrorCategory::Signature,
            _ => ErrorCategory::Lint,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format => write!(f, "format"),
            Self::Generated => write!(f, "generated"),
            Self::Signature => write!(f, "signature"),
            Self::Lint => write!(f, "lint"),
        }
    }
}

/// A structured diagnostic about one foreign binding or data declaration.
///
/// Tooling renders these directly; the message is never parsed back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FfiError {
    /// Name of the binding or type the diagnostic is about.
    pub binding: String,
    pub code: ErrorCode,
    pub severity: Severity,
    pub category: ErrorCategory,
    pub message: String,
    #[serde(flatten)]
    pub span: Span,
    /// The offending template or declaration text.
    pub source_line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl FfiError {
    pub fn new(
        binding: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        source_line: impl Into<String>,
    ) -> Self {
        let severity = match code.category() {
            ErrorCategory::Lint => Severity::Warning,
            _ => Severity::Error,
        };
        Self {
            binding: binding.into(),
            code,
            severity,
            category: code.category(),
            message: message.into(),
            span,
            source_line: source_line.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Promote or demote the diagnostic (lints configured as `deny`).
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl fmt::Display for FfiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} `{}` {}: {} [{}] {}",
            match self.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
            },
            self.binding,
            self.span,
            self.code,
            self.category,
            self.message
        )
    }
}

impl std::error::Error for FfiError {}

/// Errors and warnings gathered over a whole interface.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompileErrors {
    pub errors: Vec<FfiError>,
    pub warnings: Vec<FfiError>,
    pub total_errors: usize,
    pub total_warnings: usize,
}

impl CompileErrors {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// File a diagnostic under errors or warnings according to its severity.
    pub fn push(&mut self, diagnostic: FfiError) {
        match diagnostic.severity {
            Severity::Error => self.push_error(diagnostic),
            Severity::Warning => self.push_warning(diagnostic),
        }
    }

    pub fn push_error(&mut self, error: FfiError) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
        self.total_errors += 1;
    }

    pub fn push_warning(&mut self, warning: FfiError) {
        self.warnings.push(warning);
        self.total_warnings += 1;
    }

    /// Absorb everything collected by another stage.
    pub fn extend(&mut self, other: CompileErrors) {
        // Errors beyond the cap were counted but not stored.
        let unstored = other.total_errors.saturating_sub(other.errors.len());
        for e in other.errors {
            self.push_error(e);
        }
        self.total_errors += unstored;
        for w in other.warnings {
            self.push_warning(w);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format_fault(i: u32) -> FfiError {
        FfiError::new(
            "setTitle",
            ErrorCode::BAD_PLACEHOLDER,
            format!("bad placeholder #{i}"),
            Span::from_offsets(i as usize, i as usize + 2),
            "document.title = %x",
        )
    }

    #[test]
    fn codes_fall_into_their_category() {
        assert_eq!(ErrorCode::INCOMPLETE_PLACEHOLDER.category(), ErrorCategory::Format);
        assert_eq!(ErrorCode::BAD_PLACEHOLDER.category(), ErrorCategory::Format);
        assert_eq!(ErrorCode::INVALID_HOST_CODE.category(), ErrorCategory::Generated);
        assert_eq!(ErrorCode::NULLARY_FUNCTION.category(), ErrorCategory::Signature);
        assert_eq!(ErrorCode::NAKED_PROPERTY_ACCESS.category(), ErrorCategory::Lint);
    }

    #[test]
    fn lint_codes_default_to_warnings() {
        let w = FfiError::new(
            "get",
            ErrorCode::NAKED_PROPERTY_ACCESS,
            "naked property access",
            Span::point(1, 1),
            "jQuery.get(%1)",
        );
        assert_eq!(w.severity, Severity::Warning);
        assert_eq!(w.with_severity(Severity::Error).severity, Severity::Error);
    }

    #[test]
    fn display_names_binding_and_code() {
        let text = format_fault(17).to_string();
        assert!(text.starts_with("error `setTitle` 1:18: E102 [format]"), "{text}");
    }

    #[test]
    fn json_uses_flat_line_and_column_fields() {
        let err = format_fault(17).with_suggestion("write %% for a literal percent sign");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"line\":1"));
        assert!(json.contains("\"column\":18"));
        assert!(json.contains("\"end_column\":19"));
        assert!(json.contains("\"category\":\"format\""));
        assert!(json.contains("\"suggestion\""));

        let back: FfiError = serde_json::from_str(&json).unwrap();
        assert_eq!(back.code, ErrorCode::BAD_PLACEHOLDER);
        assert_eq!(back.span, err.span);
    }

    #[test]
    fn push_routes_by_severity_and_caps_errors() {
        let mut errs = CompileErrors::empty();
        for i in 0..(MAX_ERRORS as u32 + 5) {
            errs.push(format_fault(i));
        }
        errs.push(FfiError::new(
            "get",
            ErrorCode::SHADOWED_CONSTRUCTOR,
            "shadowed",
            Span::point(1, 1),
            "",
        ));
        assert_eq!(errs.errors.len(), MAX_ERRORS);
        assert_eq!(errs.total_errors, MAX_ERRORS + 5);
        assert_eq!(errs.total_warnings, 1);
    }

    #[test]
    fn extend_keeps_uncapped_totals() {
        let mut a = CompileErrors::empty();
        let mut b = CompileErrors::empty();
        for i in 0..(MAX_ERRORS as u32 + 3) {
            b.push(format_fault(i));
        }
        a.push(format_fault(0));
        a.extend(b);
        assert_eq!(a.total_errors, MAX_ERRORS + 4);
        assert_eq!(a.errors.len(), MAX_ERRORS);
    }
}
