//! lazyffi compiler: checks a foreign interface and generates its host
//! bindings.
//!
//! ```text
//! Interface ──check──▶ registry + signatures ──codegen──▶ host module
//! ```
//!
//! Entry points: [`compile`] for a full compilation, [`check`] for
//! diagnostics only.

pub mod checker;
pub mod config;
pub mod env;
pub mod lower;

use lazyffi_codegen::{generate_module, Binding};
use lazyffi_types::{CompileErrors, DispatchRegistry, Interface, TypeDescriptor, TypeExpr};
use serde::Serialize;
use sha2::{Digest, Sha256};

pub use checker::{CheckedImport, CheckedInterface, InterfaceChecker};
pub use config::FfiConfig;
pub use env::TypeEnv;
pub use lower::{lower, LowerError};

/// A generated binding as reported to tooling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BindingInfo {
    pub name: String,
    pub js_name: String,
    pub arity: usize,
    /// Literal descriptor of the binding's signature.
    pub descriptor: String,
    /// The call expression after placeholder substitution.
    pub call: String,
}

/// Result of compiling one interface. Serialized to JSON for tooling.
#[derive(Debug, Clone, Serialize)]
pub struct CompileResult {
    pub success: bool,
    pub module: String,
    /// The generated host module; present only on success.
    pub code: Option<String>,
    /// Hex SHA-256 of `code`.
    pub digest: Option<String>,
    pub bindings: Vec<BindingInfo>,
    pub registry: DispatchRegistry,
    pub errors: CompileErrors,
}

/// Check `interface` without generating code.
pub fn check(interface: &Interface) -> CompileErrors {
    let mut errors = CompileErrors::empty();
    InterfaceChecker::new(interface, &mut errors).check();
    errors
}

/// Check `interface` and generate its host module.
pub fn compile(interface: &Interface, config: &FfiConfig) -> CompileResult {
    let mut errors = CompileErrors::empty();
    let checked = InterfaceChecker::new(interface, &mut errors).check();

    let bindings: Vec<Binding<'_>> = checked
        .imports
        .iter()
        .map(|import| Binding {
            name: &import.name,
            template: &import.template,
            signature: &import.signature,
        })
        .collect();
    let module = generate_module(
        &interface.module,
        &bindings,
        &checked.registry,
        &config.codegen_options(),
    );
    errors.extend(module.diagnostics);

    let infos = module
        .bindings
        .iter()
        .filter_map(|b| {
            let import = checked.imports.iter().find(|i| i.name == b.name)?;
            Some(BindingInfo {
                name: b.name.clone(),
                js_name: b.js_name.clone(),
                arity: b.arity,
                descriptor: import.signature.to_literal(),
                call: b.call.clone(),
            })
        })
        .collect();

    let success = !errors.has_errors();
    let (code, digest) = if success {
        let digest = format!("{:x}", Sha256::digest(module.code.as_bytes()));
        (Some(module.code), Some(digest))
    } else {
        (None, None)
    };
    log::debug!(
        "compiled {}: success={success}, {} errors, {} warnings",
        interface.module,
        errors.total_errors,
        errors.total_warnings
    );

    CompileResult {
        success,
        module: interface.module.clone(),
        code,
        digest,
        bindings: infos,
        registry: checked.registry,
        errors,
    }
}

/// [`compile`] over JSON inputs. An empty configuration gives the defaults.
pub fn compile_json(interface_json: &str, config_json: &str) -> Result<CompileResult, serde_json::Error> {
    let interface = Interface::from_json(interface_json)?;
    let config = FfiConfig::from_json(config_json)?;
    Ok(compile(&interface, &config))
}

/// Descriptor of a type written only in terms of builtin types.
pub fn descriptor_of(ty: &TypeExpr) -> Result<TypeDescriptor, LowerError> {
    lower(&TypeEnv::new(), ty)
}
