//! lazyffi binding generator.
//!
//! Turns foreign bindings (a name, a call template and a signature
//! descriptor) into JavaScript wrappers that convert every argument outward
//! and the result inward, and emits the dispatch cases the runtime codec
//! consults for user-defined types.
//!
//! # Module layout
//!
//! A generated module is, in order: an optional runtime prelude
//! ([`runtime::PRELUDE`]), one `__case(...)` call per dispatch case in
//! registration order, and one `var name = wrapper;` per binding.
//!
//! # Templates
//!
//! `%1`..`%N` splice the converted arguments, `%*` splices every argument
//! after the highest one used so far and `%%` is a literal `%`. Any other
//! escape is an error. The assembled call must parse as a host expression.

pub mod binding;
pub mod compiler;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod lint;
pub mod runtime;

pub use binding::{generate_binding, js_ident, Binding, GeneratedBinding};
pub use compiler::{generate_module, CodegenOptions, GeneratedModule};
pub use error::{CodegenError, CodegenResult};
pub use format::{Segment, Template};
pub use lint::{Lint, LintLevel, KNOWN_GLOBALS};
