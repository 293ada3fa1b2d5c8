//! Shared types for lazyffi.
//!
//! This crate defines the type-descriptor format, the dispatch registry,
//! the declarations read by the binding generator, the host-code AST,
//! source spans and diagnostics used across all stages.

mod error;
mod span;
pub mod decl;
pub mod descriptor;
pub mod js;
pub mod registry;

pub use decl::{
    ConstructorDecl, DataDecl, FieldDecl, ForeignImport, Interface, Marshal, TypeExpr,
    TypeSyntaxError,
};
pub use descriptor::{DescriptorError, DescriptorTag, TypeDescriptor, UserType};
pub use error::{CompileErrors, ErrorCategory, ErrorCode, FfiError, Severity, MAX_ERRORS};
pub use registry::{CaseField, DispatchCase, DispatchRegistry, DispatchTable, DISCRIMINATOR};
pub use span::{SourceFile, Span};

/// Result type used throughout lazyffi's compile-time stages.
pub type Result<T> = std::result::Result<T, FfiError>;
