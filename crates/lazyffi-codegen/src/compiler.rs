//! Module assembly: prelude, dispatch cases and binding wrappers.

use lazyffi_types::{CompileErrors, DispatchRegistry, Severity};

use crate::binding::{generate_binding, Binding, GeneratedBinding};
use crate::dispatch::emit_cases;
use crate::lint::{Lint, LintLevel};
use crate::runtime::PRELUDE;

#[derive(Debug, Clone)]
pub struct CodegenOptions {
    pub lint: LintLevel,
    pub extra_globals: Vec<String>,
    pub emit_prelude: bool,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            lint: LintLevel::Warn,
            extra_globals: Vec::new(),
            emit_prelude: true,
        }
    }
}

/// A generated host module.
#[derive(Debug, Clone)]
pub struct GeneratedModule {
    pub code: String,
    /// Bindings that generated successfully, in input order.
    pub bindings: Vec<GeneratedBinding>,
    pub diagnostics: CompileErrors,
}

/// Generate a module for `bindings` against `registry`.
///
/// A binding that faults is left out of the module and reported; the others
/// are still generated.
pub fn generate_module(
    module: &str,
    bindings: &[Binding<'_>],
    registry: &DispatchRegistry,
    options: &CodegenOptions,
) -> GeneratedModule {
    let lint = Lint::new(options.lint, &options.extra_globals);
    let mut diagnostics = CompileErrors::empty();
    let mut generated = Vec::new();

    for binding in bindings {
        match generate_binding(binding, &lint) {
            Ok(b) => {
                for warning in &b.warnings {
                    log::warn!("{}: {}", binding.name, warning);
                    diagnostics.push(warning.to_ffi_error(binding.name, binding.template));
                }
                generated.push(b);
            }
            Err(e) => {
                let error = e
                    .to_ffi_error(binding.name, binding.template)
                    .with_severity(Severity::Error);
                diagnostics.push(error);
            }
        }
    }

    let mut code = format!("// Generated by lazyffi for module {module}.\n");
    if options.emit_prelude {
        code.push_str(PRELUDE);
        code.push('\n');
    }
    code.push_str(&emit_cases(registry));
    for b in &generated {
        code.push_str(&b.code);
        code.push('\n');
    }

    log::debug!(
        "generated module {module}: {} bindings, {} dispatch cases, {} errors",
        generated.len(),
        registry.len(),
        diagnostics.total_errors
    );
    GeneratedModule {
        code,
        bindings: generated,
        diagnostics,
    }
}
