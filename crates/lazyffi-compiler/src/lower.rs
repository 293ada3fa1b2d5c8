//! Lowering of surface types to type descriptors.

use lazyffi_types::{ErrorCode, Marshal, TypeDescriptor, TypeExpr};
use thiserror::Error;

use crate::env::{Builtin, TypeEnv, TypeKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LowerError {
    #[error("unknown type `{0}`")]
    UnknownType(String),
    #[error("type `{name}` expects {expected} argument(s), found {found}")]
    GenericArity {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("type variable `{0}` is not a parameter of the declaration")]
    UnboundTypeVariable(String),
}

impl LowerError {
    pub fn code(&self) -> ErrorCode {
        match self {
            LowerError::UnknownType(_) => ErrorCode::UNKNOWN_TYPE,
            LowerError::GenericArity { .. } => ErrorCode::GENERIC_ARITY,
            LowerError::UnboundTypeVariable(_) => ErrorCode::UNBOUND_TYPE_VARIABLE,
        }
    }
}

/// Lower `ty` in `env`.
///
/// Type variables become generic slots inside a data declaration and plain
/// passthrough elsewhere. Functions are flattened to one descriptor per
/// argument.
pub fn lower(env: &TypeEnv, ty: &TypeExpr) -> Result<TypeDescriptor, LowerError> {
    match ty {
        TypeExpr::Var(name) => match env.slot_of(name) {
            Some(slot) => Ok(TypeDescriptor::generic(slot)),
            None if env.in_data() => Err(LowerError::UnboundTypeVariable(name.clone())),
            None => Ok(TypeDescriptor::Unknown(None)),
        },
        TypeExpr::Fun(..) => {
            let (args, ret) = ty.uncurry();
            let args = args
                .into_iter()
                .map(|a| lower(env, a))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(TypeDescriptor::function(args, lower(env, ret)?))
        }
        TypeExpr::List(elem) => match &**elem {
            TypeExpr::Con { name, args } if name == "Char" && args.is_empty() => Ok(TypeDescriptor::String),
            other => Ok(TypeDescriptor::list(lower(env, other)?)),
        },
        TypeExpr::Tuple(items) if items.is_empty() => Ok(TypeDescriptor::Ptr),
        TypeExpr::Tuple(items) => Ok(TypeDescriptor::Tuple(
            items
                .iter()
                .map(|t| lower(env, t))
                .collect::<Result<Vec<_>, _>>()?,
        )),
        TypeExpr::Con { name, args } => lower_con(env, name, args),
    }
}

fn lower_con(env: &TypeEnv, name: &str, args: &[TypeExpr]) -> Result<TypeDescriptor, LowerError> {
    let info = env
        .lookup(name)
        .ok_or_else(|| LowerError::UnknownType(name.to_string()))?;
    if info.arity != args.len() {
        return Err(LowerError::GenericArity {
            name: name.to_string(),
            expected: info.arity,
            found: args.len(),
        });
    }
    let mut lowered = args
        .iter()
        .map(|a| lower(env, a))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(match info.kind {
        TypeKind::Builtin(Builtin::Int) => TypeDescriptor::Int,
        TypeKind::Builtin(Builtin::Double) => TypeDescriptor::Double,
        TypeKind::Builtin(Builtin::Bool) => TypeDescriptor::Bool,
        TypeKind::Builtin(Builtin::String) => TypeDescriptor::String,
        TypeKind::Builtin(Builtin::Char | Builtin::Ptr | Builtin::JsAny) => TypeDescriptor::Ptr,
        TypeKind::Builtin(Builtin::Io) => TypeDescriptor::action(lowered.remove(0)),
        TypeKind::Builtin(Builtin::Defined) => TypeDescriptor::defined(lowered.remove(0)),
        TypeKind::Builtin(Builtin::Nullable) => TypeDescriptor::nullable(lowered.remove(0)),
        TypeKind::Data(Marshal::Automatic) => TypeDescriptor::automatic(name, lowered),
        TypeKind::Data(Marshal::User) => TypeDescriptor::user(name, lowered),
    })
}
