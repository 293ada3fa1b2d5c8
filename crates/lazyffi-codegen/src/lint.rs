//! The minification lint: property access on identifiers the minifier does
//! not know about.

use std::collections::BTreeSet;

use lazyffi_types::js::{walk_expr, Expr, ExprKind};
use serde::{Deserialize, Serialize};

use crate::error::CodegenError;

/// Globals whose properties survive minification.
pub const KNOWN_GLOBALS: &[&str] = &[
    "window",
    "document",
    "console",
    "Math",
    "JSON",
    "Object",
    "Array",
    "String",
    "Number",
    "Boolean",
    "Date",
    "Promise",
    "navigator",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LintLevel {
    Allow,
    #[default]
    Warn,
    Deny,
}

#[derive(Debug, Clone)]
pub struct Lint {
    pub level: LintLevel,
    globals: BTreeSet<String>,
}

impl Default for Lint {
    fn default() -> Self {
        Self::new(LintLevel::default(), &[])
    }
}

impl Lint {
    pub fn new(level: LintLevel, extra_globals: &[String]) -> Self {
        let globals = KNOWN_GLOBALS
            .iter()
            .map(|g| g.to_string())
            .chain(extra_globals.iter().cloned())
            .collect();
        Self { level, globals }
    }

    pub fn is_global(&self, name: &str) -> bool {
        self.globals.contains(name)
    }

    /// Naked property accesses in `expr`, in source order. Accesses on
    /// `locals` and on parameters of nested functions are not reported.
    ///
    /// `template` is only used to locate each access for diagnostics.
    pub fn check(&self, expr: &Expr, locals: &[String], template: &str) -> Vec<CodegenError> {
        if self.level == LintLevel::Allow {
            return Vec::new();
        }

        let mut bound: BTreeSet<&str> = locals.iter().map(String::as_str).collect();
        walk_expr(expr, &mut |e| match &e.kind {
            ExprKind::Function(func) => bound.extend(func.params.iter().map(String::as_str)),
            ExprKind::Arrow { params, .. } => bound.extend(params.iter().map(String::as_str)),
            _ => {}
        });

        let mut found = Vec::new();
        walk_expr(expr, &mut |e| {
            let ExprKind::Member { object, property } = &e.kind else {
                return;
            };
            let ExprKind::Ident(name) = &object.kind else {
                return;
            };
            if self.is_global(name) || bound.contains(name.as_str()) || name.starts_with("__") {
                return;
            }
            let offset = template.find(&format!("{name}.{property}")).unwrap_or(0);
            found.push(CodegenError::NakedPropertyAccess {
                object: name.clone(),
                property: property.clone(),
                offset,
            });
        });
        found
    }
}
