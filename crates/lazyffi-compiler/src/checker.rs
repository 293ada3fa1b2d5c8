//! Interface checker: resolves declarations, lowers their types and builds
//! the dispatch registry.
//!
//! Entry point: [`InterfaceChecker::check`].
//!
//! Error codes emitted:
//! - E301: unknown type
//! - E302: wrong number of type arguments
//! - E303: duplicate type, import or type parameter; builtin shadowed
//! - E304: type variable not bound by its declaration
//! - E401: constructor declared more than once (warning)

use std::collections::{HashMap, HashSet};

use lazyffi_types::{
    CompileErrors, DataDecl, DispatchCase, DispatchRegistry, ErrorCode, FfiError, ForeignImport,
    Interface, Span, TypeDescriptor,
};
use serde::Serialize;

use crate::env::TypeEnv;
use crate::lower::{lower, LowerError};

/// A foreign import whose signature resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckedImport {
    pub name: String,
    pub template: String,
    pub signature: TypeDescriptor,
}

/// Everything codegen needs from an interface.
#[derive(Debug, Clone, Default)]
pub struct CheckedInterface {
    pub registry: DispatchRegistry,
    pub imports: Vec<CheckedImport>,
}

// ══════════════════════════════════════════════════════════════════════════════
// InterfaceChecker
// ══════════════════════════════════════════════════════════════════════════════

pub struct InterfaceChecker<'a> {
    interface: &'a Interface,
    env: TypeEnv,
    errors: &'a mut CompileErrors,
    /// Constructor name → owning type, for the first declaration seen.
    constructors: HashMap<String, String>,
}

impl<'a> InterfaceChecker<'a> {
    pub fn new(interface: &'a Interface, errors: &'a mut CompileErrors) -> Self {
        Self {
            interface,
            env: TypeEnv::new(),
            errors,
            constructors: HashMap::new(),
        }
    }

    /// Check the whole interface. Declarations that fail are left out of the
    /// result and reported.
    pub fn check(mut self) -> CheckedInterface {
        let interface = self.interface;
        let mut checked = CheckedInterface::default();

        // Declare every type first so declarations may refer to each other.
        let mut declared = Vec::new();
        for decl in &interface.data {
            if self.declare(decl) {
                declared.push(decl);
            }
        }

        for decl in declared {
            for case in self.check_data(decl) {
                checked.registry.register(case);
            }
        }

        let mut seen = HashSet::new();
        for import in &interface.foreign {
            if !seen.insert(import.name.as_str()) {
                self.report(
                    &import.name,
                    ErrorCode::DUPLICATE_DECLARATION,
                    format!("foreign import `{}` is declared more than once", import.name),
                    import.template.clone(),
                );
                continue;
            }
            if let Some(import) = self.check_import(import) {
                checked.imports.push(import);
            }
        }

        log::debug!(
            "checked interface {}: {} dispatch cases, {} imports",
            interface.module,
            checked.registry.len(),
            checked.imports.len()
        );
        checked
    }

    // ══════════════════════════════════════════════════════════════════════
    // Data declarations
    // ══════════════════════════════════════════════════════════════════════

    fn declare(&mut self, decl: &DataDecl) -> bool {
        if self.env.is_builtin(&decl.name) {
            self.report(
                &decl.name,
                ErrorCode::DUPLICATE_DECLARATION,
                format!("data type `{}` shadows a builtin type", decl.name),
                decl.name.clone(),
            );
            return false;
        }
        if !self.env.declare(&decl.name, decl.params.len(), decl.marshal) {
            self.report(
                &decl.name,
                ErrorCode::DUPLICATE_DECLARATION,
                format!("data type `{}` is declared more than once", decl.name),
                decl.name.clone(),
            );
            return false;
        }
        true
    }

    /// One dispatch case per constructor whose fields all lower.
    fn check_data(&mut self, decl: &DataDecl) -> Vec<DispatchCase> {
        let mut params = HashSet::new();
        for p in &decl.params {
            if !params.insert(p.as_str()) {
                self.report(
                    &decl.name,
                    ErrorCode::DUPLICATE_DECLARATION,
                    format!("type parameter `{p}` of `{}` is declared more than once", decl.name),
                    decl.params.join(" "),
                );
                return Vec::new();
            }
        }

        self.env.push_params(&decl.params);
        let mut cases = Vec::new();
        for ctor in &decl.constructors {
            if let Some(owner) = self.constructors.get(&ctor.name).cloned() {
                let message = format!(
                    "constructor `{}` is already declared by `{owner}`; the earlier declaration is used for encoding",
                    ctor.name
                );
                self.report(&decl.name, ErrorCode::SHADOWED_CONSTRUCTOR, message, ctor.name.clone());
            } else {
                self.constructors.insert(ctor.name.clone(), decl.name.clone());
            }

            let mut case = DispatchCase::new(&decl.name, &ctor.name);
            let mut ok = true;
            for field in &ctor.fields {
                match lower(&self.env, &field.ty) {
                    Ok(descriptor) => case = case.field(&field.name, descriptor),
                    Err(e) => {
                        self.report_lowering(&decl.name, e, format!("{}: {}", field.name, field.ty));
                        ok = false;
                    }
                }
            }
            if ok {
                cases.push(case);
            }
        }
        self.env.pop_scope();
        cases
    }

    // ══════════════════════════════════════════════════════════════════════
    // Foreign imports
    // ══════════════════════════════════════════════════════════════════════

    fn check_import(&mut self, import: &ForeignImport) -> Option<CheckedImport> {
        match lower(&self.env, &import.ty) {
            Ok(signature) => Some(CheckedImport {
                name: import.name.clone(),
                template: import.template.clone(),
                signature,
            }),
            Err(e) => {
                self.report_lowering(&import.name, e, import.ty.to_string());
                None
            }
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Reporting
    // ══════════════════════════════════════════════════════════════════════

    fn report_lowering(&mut self, binding: &str, error: LowerError, source_line: String) {
        let suggestion = match &error {
            LowerError::UnknownType(name) => Some(format!("declare `{name}` as a data type")),
            LowerError::UnboundTypeVariable(var) => {
                Some(format!("add `{var}` to the declaration's type parameters"))
            }
            LowerError::GenericArity { .. } => None,
        };
        let mut diagnostic = FfiError::new(
            binding,
            error.code(),
            error.to_string(),
            Span::from_offsets(0, source_line.len()),
            source_line,
        );
        if let Some(s) = suggestion {
            diagnostic = diagnostic.with_suggestion(s);
        }
        self.errors.push(diagnostic);
    }

    fn report(&mut self, binding: &str, code: ErrorCode, message: String, source_line: String) {
        let span = Span::from_offsets(0, source_line.len());
        self.errors
            .push(FfiError::new(binding, code, message, span, source_line));
    }
}
