//! Runtime faults raised by forcing and by the host codec.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// An `int` slot received a host number with a fractional part (or one
    /// that is not finite).
    #[error("expected an integral number, got {0}")]
    NonIntegral(f64),
    /// An integer outside the range the host represents exactly.
    #[error("integer {0} is outside the host's exact integer range")]
    UnsafeInteger(String),
    /// A cached thunk was forced again while its own producer was running.
    #[error("<<loop>>: thunk re-entered while being forced")]
    Loop,
    #[error("function types must declare at least one argument")]
    NullaryFunction,
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
    /// A host array or record did not have the shape its descriptor
    /// promises.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("missing field `{field}` on constructor `{constructor}`")]
    MissingField { constructor: String, field: String },
    #[error("index {index} out of range for list of length {length}")]
    IndexOutOfRange { index: usize, length: usize },
    #[error("not a reference cell: {0}")]
    NotAReference(String),
    /// Raised by host code called through the codec.
    #[error("host exception: {0}")]
    HostException(String),
}

impl RuntimeError {
    pub(crate) fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Result alias for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
