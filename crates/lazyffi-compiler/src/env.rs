//! Type environment: the type names visible to an interface and the type
//! variables bound inside a data declaration.

use std::collections::HashMap;

use lazyffi_types::Marshal;

// ══════════════════════════════════════════════════════════════════════════════
// Type Info
// ══════════════════════════════════════════════════════════════════════════════

/// What a type name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// A type with a fixed host representation.
    Builtin(Builtin),
    /// A declared data type.
    Data(Marshal),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Int,
    Double,
    Bool,
    Char,
    String,
    Io,
    Defined,
    Nullable,
    Ptr,
    JsAny,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeInfo {
    pub kind: TypeKind,
    /// Number of type arguments the name takes.
    pub arity: usize,
}

const BUILTINS: &[(&str, Builtin, usize)] = &[
    ("Int", Builtin::Int, 0),
    ("Double", Builtin::Double, 0),
    ("Float", Builtin::Double, 0),
    ("Bool", Builtin::Bool, 0),
    ("Char", Builtin::Char, 0),
    ("String", Builtin::String, 0),
    ("IO", Builtin::Io, 1),
    ("Defined", Builtin::Defined, 1),
    ("Nullable", Builtin::Nullable, 1),
    ("Ptr", Builtin::Ptr, 1),
    ("JSAny", Builtin::JsAny, 0),
];

// ══════════════════════════════════════════════════════════════════════════════
// TypeEnv
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct TypeEnv {
    types: HashMap<String, TypeInfo>,
    /// Innermost last. Each scope maps a type variable to its slot.
    scopes: Vec<HashMap<String, usize>>,
}

impl TypeEnv {
    /// An environment holding only the builtin types.
    pub fn new() -> Self {
        let types = BUILTINS
            .iter()
            .map(|(name, builtin, arity)| {
                (
                    name.to_string(),
                    TypeInfo {
                        kind: TypeKind::Builtin(*builtin),
                        arity: *arity,
                    },
                )
            })
            .collect();
        Self {
            types,
            scopes: Vec::new(),
        }
    }

    /// Declare a data type. Returns `false` if the name is already taken.
    pub fn declare(&mut self, name: &str, arity: usize, marshal: Marshal) -> bool {
        if self.types.contains_key(name) {
            return false;
        }
        self.types.insert(
            name.to_string(),
            TypeInfo {
                kind: TypeKind::Data(marshal),
                arity,
            },
        );
        true
    }

    pub fn lookup(&self, name: &str) -> Option<TypeInfo> {
        self.types.get(name).copied()
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        matches!(self.lookup(name), Some(TypeInfo { kind: TypeKind::Builtin(_), .. }))
    }

    /// Bind `params` to slots `0..` in a new scope.
    pub fn push_params(&mut self, params: &[String]) {
        self.scopes.push(
            params
                .iter()
                .enumerate()
                .map(|(slot, p)| (p.clone(), slot))
                .collect(),
        );
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Whether type variables must be bound (inside a data declaration).
    pub fn in_data(&self) -> bool {
        !self.scopes.is_empty()
    }

    pub fn slot_of(&self, var: &str) -> Option<usize> {
        self.scopes.iter().rev().find_map(|s| s.get(var).copied())
    }
}

impl Default for TypeEnv {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_known() {
        let env = TypeEnv::new();
        assert_eq!(env.lookup("IO").map(|t| t.arity), Some(1));
        assert!(env.is_builtin("Float"));
        assert!(env.lookup("Maybe").is_none());
    }

    #[test]
    fn declarations_cannot_shadow() {
        let mut env = TypeEnv::new();
        assert!(env.declare("Shape", 0, Marshal::Automatic));
        assert!(!env.declare("Shape", 1, Marshal::User));
        assert!(!env.declare("Int", 0, Marshal::Automatic));
    }

    #[test]
    fn params_map_to_slots() {
        let mut env = TypeEnv::new();
        assert!(!env.in_data());
        env.push_params(&["k".to_string(), "v".to_string()]);
        assert_eq!(env.slot_of("v"), Some(1));
        assert_eq!(env.slot_of("x"), None);
        env.pop_scope();
        assert_eq!(env.slot_of("k"), None);
    }
}
