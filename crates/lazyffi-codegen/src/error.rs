//! Codegen error types.

use lazyffi_types::{ErrorCode, FfiError, Span};
use thiserror::Error;

/// Faults raised while generating the glue for one binding.
///
/// Offsets are byte offsets into the binding's call template.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodegenError {
    /// A `%` at the very end of the template.
    #[error("incomplete placeholder at end of template")]
    IncompletePlaceholder { offset: usize },

    /// `%n` where the binding declares fewer than `n` arguments.
    #[error("placeholder %{index} refers to a missing argument (binding takes {arity})")]
    NoSuchArgument {
        index: usize,
        arity: usize,
        offset: usize,
    },

    /// `%` followed by anything other than digits, `*` or `%`.
    #[error("bad placeholder '%{text}'")]
    BadPlaceholder { text: String, offset: usize },

    /// The assembled call expression is not a valid host expression.
    #[error("invalid generated host code for template `{template}`: {message}")]
    InvalidHostCode { template: String, message: String },

    /// A function type in the signature declares no arguments.
    #[error("nullary function: function types must take at least one argument")]
    NullaryFunction,

    /// Property access on an identifier that is not a known global.
    #[error("naked property access `{object}.{property}` is unsafe under minification")]
    NakedPropertyAccess {
        object: String,
        property: String,
        offset: usize,
    },
}

impl CodegenError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CodegenError::IncompletePlaceholder { .. } => ErrorCode::INCOMPLETE_PLACEHOLDER,
            CodegenError::NoSuchArgument { .. } => ErrorCode::NO_SUCH_ARGUMENT,
            CodegenError::BadPlaceholder { .. } => ErrorCode::BAD_PLACEHOLDER,
            CodegenError::InvalidHostCode { .. } => ErrorCode::INVALID_HOST_CODE,
            CodegenError::NullaryFunction => ErrorCode::NULLARY_FUNCTION,
            CodegenError::NakedPropertyAccess { .. } => ErrorCode::NAKED_PROPERTY_ACCESS,
        }
    }

    /// The template range the fault points at.
    fn span(&self, template: &str) -> Span {
        match self {
            CodegenError::IncompletePlaceholder { offset } => Span::from_offsets(*offset, offset + 1),
            CodegenError::NoSuchArgument { index, offset, .. } => {
                Span::from_offsets(*offset, offset + 1 + index.to_string().len())
            }
            CodegenError::BadPlaceholder { text, offset } => {
                Span::from_offsets(*offset, offset + 1 + text.len())
            }
            CodegenError::NakedPropertyAccess { object, offset, .. } => {
                Span::from_offsets(*offset, offset + object.len())
            }
            CodegenError::InvalidHostCode { .. } | CodegenError::NullaryFunction => {
                Span::from_offsets(0, template.len())
            }
        }
    }

    /// Convert into a structured diagnostic for `binding`.
    pub fn to_ffi_error(&self, binding: &str, template: &str) -> FfiError {
        let error = FfiError::new(binding, self.code(), self.to_string(), self.span(template), template);
        match self {
            CodegenError::NakedPropertyAccess { object, .. } => error.with_suggestion(format!(
                "pass `{object}` in as an argument or add it to the allowed globals"
            )),
            CodegenError::BadPlaceholder { .. } => {
                error.with_suggestion("write `%%` for a literal percent sign")
            }
            _ => error,
        }
    }
}

/// Codegen result type alias.
pub type CodegenResult<T> = Result<T, CodegenError>;
