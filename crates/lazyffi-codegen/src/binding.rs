//! Per-binding glue: a curried host function wrapping one call template.
//!
//! For `f :: Int -> String -> IO Bool` with template `g(%2, %1)` the emitted
//! wrapper is
//!
//! ```text
//! function (a1) { return function (a2) { return __io(function () {
//!     return __fromHost(["bool"], g(__toHost(["string"], a2), __toHost(["int"], a1)));
//! }); }; }
//! ```
//!
//! Passthrough arguments and results are spliced in unconverted. A binding
//! with no arguments becomes a deferred cell (`__lazy`) or, when its type
//! is an action, an action (`__io`), so the template runs on demand.

use lazyffi_lexer::ALL_KEYWORDS;
use lazyffi_parser::parse_expression;
use lazyffi_types::{SourceFile, TypeDescriptor};

use crate::error::{CodegenError, CodegenResult};
use crate::format::Template;
use crate::lint::{Lint, LintLevel};

/// A foreign binding to generate glue for.
#[derive(Debug, Clone, Copy)]
pub struct Binding<'a> {
    pub name: &'a str,
    pub template: &'a str,
    pub signature: &'a TypeDescriptor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedBinding {
    pub name: String,
    /// The host identifier the wrapper is bound to.
    pub js_name: String,
    pub arity: usize,
    /// The assembled call expression, after placeholder substitution.
    pub call: String,
    /// `var <js_name> = <wrapper>;`
    pub code: String,
    /// Lint findings that did not fail the binding.
    pub warnings: Vec<CodegenError>,
}

/// Generate the wrapper for one binding.
pub fn generate_binding(binding: &Binding<'_>, lint: &Lint) -> CodegenResult<GeneratedBinding> {
    if binding.signature.find_nullary_function().is_some() {
        return Err(CodegenError::NullaryFunction);
    }
    let (args, ret): (&[TypeDescriptor], &TypeDescriptor) = match binding.signature {
        TypeDescriptor::Function { args, ret } => (args.as_slice(), ret.as_ref()),
        other => (&[][..], other),
    };
    let template = Template::parse(binding.template, args.len())?;
    let names: Vec<String> = (1..=args.len()).map(|i| format!("a{i}")).collect();

    let encoded: Vec<String> = args
        .iter()
        .zip(&names)
        .map(|(d, name)| to_host(d, name))
        .collect();
    let call = template.render(&encoded);
    validate_call(binding, &call)?;

    let mut warnings = lint_call(binding, &template, &names, lint);
    if lint.level == LintLevel::Deny && !warnings.is_empty() {
        return Err(warnings.swap_remove(0));
    }

    let body = match ret {
        TypeDescriptor::Action(inner) => {
            format!("__io(function () {{ return {}; }})", from_host(inner, &call))
        }
        other if args.is_empty() => {
            format!("__lazy(function () {{ return {}; }})", from_host(other, &call))
        }
        other => from_host(other, &call),
    };
    let wrapper = names.iter().rev().fold(body, |inner, name| {
        format!("function ({name}) {{ return {inner}; }}")
    });

    let js_name = js_ident(binding.name);
    log::debug!("generated binding {} as {} (arity {})", binding.name, js_name, args.len());
    Ok(GeneratedBinding {
        name: binding.name.to_string(),
        code: format!("var {js_name} = {wrapper};"),
        js_name,
        arity: args.len(),
        call,
        warnings,
    })
}

fn to_host(descriptor: &TypeDescriptor, expr: &str) -> String {
    if descriptor.is_passthrough() {
        expr.to_string()
    } else {
        format!("__toHost({}, {expr})", descriptor.to_literal())
    }
}

fn from_host(descriptor: &TypeDescriptor, expr: &str) -> String {
    if descriptor.is_passthrough() {
        expr.to_string()
    } else {
        format!("__fromHost({}, {expr})", descriptor.to_literal())
    }
}

fn validate_call(binding: &Binding<'_>, call: &str) -> CodegenResult<()> {
    let source = SourceFile::new(binding.name, call);
    let result = parse_expression(&source);
    if result.expr.is_some() {
        return Ok(());
    }
    let message = result
        .errors
        .errors
        .first()
        .map(|e| format!("{}: {}", e.span, e.message))
        .unwrap_or_else(|| "not an expression".to_string());
    Err(CodegenError::InvalidHostCode {
        template: binding.template.to_string(),
        message,
    })
}

/// Lint the template with arguments spliced in as bare identifiers.
fn lint_call(binding: &Binding<'_>, template: &Template, names: &[String], lint: &Lint) -> Vec<CodegenError> {
    if lint.level == LintLevel::Allow {
        return Vec::new();
    }
    let source = SourceFile::new(binding.name, template.render(names));
    match parse_expression(&source).expr {
        Some(expr) => lint.check(&expr, names, binding.template),
        None => Vec::new(),
    }
}

/// A host identifier for a binding name.
///
/// Characters outside `[A-Za-z0-9_$]` become `$` plus their hex code point.
/// Names that would collide with a keyword or a runtime helper get a `$`
/// prefix.
pub fn js_ident(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else {
            out.push_str(&format!("${:x}", c as u32));
        }
    }
    let starts_badly = out.chars().next().map_or(true, |c| c.is_ascii_digit());
    if starts_badly || out.starts_with("__") || ALL_KEYWORDS.contains(&out.as_str()) {
        out.insert(0, '$');
    }
    out
}
