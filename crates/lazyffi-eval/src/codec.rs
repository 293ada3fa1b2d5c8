//! The type-directed codec between language values and host values.
//!
//! [`Codec::value_to_host`] and [`Codec::host_to_value`] interpret a
//! [`TypeDescriptor`] recursively. User-defined types are resolved through
//! the [`DispatchRegistry`] handed to the codec at construction; a value that
//! matches no registered case passes through unchanged.

use std::rc::Rc;

use lazyffi_types::{DispatchCase, DispatchRegistry, TypeDescriptor, UserType, DISCRIMINATOR};

use crate::error::{RuntimeError, RuntimeResult};
use crate::host::{HostFunction, HostValue};
use crate::list;
use crate::monad::{io, ret, run_action};
use crate::thunk::force;
use crate::value::{Record, Value};

/// Constructor of the `defined` wrapper holding a value.
pub const DEFINED: &str = "Defined";
/// Constructor of the `defined` wrapper standing for host `undefined`.
pub const UNDEFINED: &str = "Undefined";
/// Constructor of the `nullable` wrapper holding a value.
pub const NULLABLE: &str = "Nullable";
/// Constructor of the `nullable` wrapper standing for host `null`.
pub const NULL: &str = "Null";
/// The single slot of the present branch of either wrapper.
pub const WRAPPED_FIELD: &str = "value";
/// Largest integer a host number holds exactly (2^53 - 1).
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;

#[derive(Debug, Clone, Default)]
pub struct Codec {
    registry: Rc<DispatchRegistry>,
}

impl Codec {
    pub fn new(registry: DispatchRegistry) -> Self {
        Self::with_registry(Rc::new(registry))
    }

    pub fn with_registry(registry: Rc<DispatchRegistry>) -> Self {
        log::debug!("codec created with {} dispatch cases", registry.len());
        Self { registry }
    }

    pub fn registry(&self) -> &DispatchRegistry {
        &self.registry
    }

    // ══════════════════════════════════════════════════════════════════
    // Outward
    // ══════════════════════════════════════════════════════════════════

    /// Convert a language value to its host representation.
    pub fn value_to_host(&self, descriptor: &TypeDescriptor, value: &Value) -> RuntimeResult<HostValue> {
        match descriptor {
            TypeDescriptor::Ptr | TypeDescriptor::Unknown(_) => Ok(passthrough_out(value)),
            TypeDescriptor::Int => match force(value)? {
                Value::Int(n) if n.unsigned_abs() > MAX_SAFE_INTEGER as u64 => Err(RuntimeError::UnsafeInteger(n.to_string())),
                Value::Int(n) => Ok(HostValue::Number(n as f64)),
                other => Err(RuntimeError::mismatch("Int", other.type_name())),
            },
            TypeDescriptor::Double => match force(value)? {
                Value::Double(x) => Ok(HostValue::Number(x)),
                Value::Int(n) => Ok(HostValue::Number(n as f64)),
                other => Err(RuntimeError::mismatch("Double", other.type_name())),
            },
            TypeDescriptor::Bool => match force(value)? {
                Value::Bool(b) => Ok(HostValue::Bool(b)),
                other => Err(RuntimeError::mismatch("Bool", other.type_name())),
            },
            TypeDescriptor::String => Ok(HostValue::string(list::to_string(value)?)),
            TypeDescriptor::List(elem) => {
                let mut items = Vec::new();
                for head in list::iter(value) {
                    items.push(self.value_to_host(elem, &head?)?);
                }
                Ok(HostValue::array(items))
            }
            TypeDescriptor::Tuple(slots) => {
                let mut items = Vec::with_capacity(slots.len());
                let mut rest = value.clone();
                for (i, slot) in slots.iter().enumerate() {
                    let Some((head, tail)) = list::uncons(&rest)? else {
                        return Err(RuntimeError::ShapeMismatch(format!(
                            "tuple of {} elements ended after {i}",
                            slots.len()
                        )));
                    };
                    items.push(self.value_to_host(slot, &head)?);
                    rest = tail;
                }
                Ok(HostValue::array(items))
            }
            TypeDescriptor::Action(inner) => Ok(self.export_action(inner, value.clone())),
            TypeDescriptor::Function { args, ret } => {
                if args.is_empty() {
                    return Err(RuntimeError::NullaryFunction);
                }
                Ok(self.export_function(args.clone(), (**ret).clone(), value.clone()))
            }
            TypeDescriptor::Defined(inner) => {
                self.unwrap_optional(inner, value, DEFINED, UNDEFINED, HostValue::Undefined)
            }
            TypeDescriptor::Nullable(inner) => {
                self.unwrap_optional(inner, value, NULLABLE, NULL, HostValue::Null)
            }
            TypeDescriptor::Automatic(user) | TypeDescriptor::User(user) => self.encode_user(user, value),
        }
    }

    /// A zero-argument host function running the action afresh on each call.
    fn export_action(&self, inner: &TypeDescriptor, action: Value) -> HostValue {
        let codec = self.clone();
        let inner = inner.clone();
        HostValue::function(move |_| {
            let result = run_action(&action)?;
            codec.value_to_host(&inner, &result)
        })
    }

    fn export_function(&self, args: Vec<TypeDescriptor>, ret: TypeDescriptor, function: Value) -> HostValue {
        let codec = self.clone();
        HostValue::function(move |host_args| {
            let mut current = function.clone();
            for (i, arg_descriptor) in args.iter().enumerate() {
                let func = match force(&current)? {
                    Value::Fun(func) => func,
                    other => return Ok(passthrough_out(&other)),
                };
                let arg = host_args.get(i).cloned().unwrap_or_default();
                current = func.call(codec.host_to_value(arg_descriptor, &arg)?)?;
            }
            match &ret {
                TypeDescriptor::Action(inner) => {
                    let result = run_action(&current)?;
                    codec.value_to_host(inner, &result)
                }
                other => codec.value_to_host(other, &current),
            }
        })
    }

    fn unwrap_optional(
        &self,
        inner: &TypeDescriptor,
        value: &Value,
        present: &str,
        absent: &str,
        absence: HostValue,
    ) -> RuntimeResult<HostValue> {
        match force(value)? {
            Value::Record(record) if record.constructor == present => {
                self.value_to_host(inner, record.get(WRAPPED_FIELD)?)
            }
            Value::Record(record) if record.constructor == absent => Ok(absence),
            other => Err(RuntimeError::mismatch(
                format!("{present} or {absent}"),
                other.type_name(),
            )),
        }
    }

    fn encode_user(&self, user: &UserType, value: &Value) -> RuntimeResult<HostValue> {
        let forced = force(value)?;
        let Value::Record(record) = &forced else {
            log::trace!("no outward case for {} value, passing through", user.name);
            return Ok(passthrough_out(&forced));
        };
        let Some(case) = self.registry.encoder_for(&record.constructor) else {
            log::trace!("no outward case for constructor {}, passing through", record.constructor);
            return Ok(passthrough_out(&forced));
        };
        let mut entries = Vec::with_capacity(case.fields.len() + 1);
        for field in &case.fields {
            let descriptor = field.descriptor.instantiate(&user.generics);
            let converted = self.value_to_host(&descriptor, record.get(&field.name)?)?;
            if !converted.is_undefined() {
                entries.push((field.name.clone(), converted));
            }
        }
        entries.push((DISCRIMINATOR.to_string(), HostValue::string(case.constructor.as_str())));
        Ok(HostValue::object(entries))
    }

    // ══════════════════════════════════════════════════════════════════
    // Inward
    // ══════════════════════════════════════════════════════════════════

    /// Convert a host value to a language value.
    pub fn host_to_value(&self, descriptor: &TypeDescriptor, host: &HostValue) -> RuntimeResult<Value> {
        match descriptor {
            TypeDescriptor::Ptr | TypeDescriptor::Unknown(_) => Ok(passthrough_in(host)),
            TypeDescriptor::Int => match host {
                HostValue::Number(n) => integral(*n).map(Value::Int),
                other => Err(RuntimeError::mismatch("number", other.type_of())),
            },
            TypeDescriptor::Double => match host {
                HostValue::Number(n) => Ok(Value::Double(*n)),
                other => Err(RuntimeError::mismatch("number", other.type_of())),
            },
            TypeDescriptor::Bool => match host {
                HostValue::Bool(b) => Ok(Value::Bool(*b)),
                other => Err(RuntimeError::mismatch("boolean", other.type_of())),
            },
            TypeDescriptor::String => match host {
                HostValue::String(s) => Ok(Value::string(s)),
                other => Err(RuntimeError::mismatch("string", other.type_of())),
            },
            TypeDescriptor::List(elem) => {
                let items = elements(host)?;
                let values = items
                    .iter()
                    .map(|item| self.host_to_value(elem, item))
                    .collect::<RuntimeResult<Vec<_>>>()?;
                Ok(list::from_values(values))
            }
            TypeDescriptor::Tuple(slots) => {
                let items = elements(host)?;
                if items.len() < slots.len() {
                    return Err(RuntimeError::ShapeMismatch(format!(
                        "expected {} tuple elements, got {}",
                        slots.len(),
                        items.len()
                    )));
                }
                let values = slots
                    .iter()
                    .zip(&items)
                    .map(|(slot, item)| self.host_to_value(slot, item))
                    .collect::<RuntimeResult<Vec<_>>>()?;
                Ok(list::tuple(values))
            }
            TypeDescriptor::Action(inner) => Ok(ret(self.host_to_value(inner, host)?)),
            TypeDescriptor::Function { args, ret } => {
                if args.is_empty() {
                    return Err(RuntimeError::NullaryFunction);
                }
                match host {
                    HostValue::Function(f) => Ok(self.import_function(
                        f.clone(),
                        args.clone().into(),
                        Rc::new((**ret).clone()),
                        Vec::new(),
                    )),
                    other => Err(RuntimeError::mismatch("function", other.type_of())),
                }
            }
            TypeDescriptor::Defined(inner) => match host {
                HostValue::Undefined => Ok(Value::nullary(UNDEFINED)),
                other => Ok(Value::record(DEFINED, vec![(WRAPPED_FIELD, self.host_to_value(inner, other)?)])),
            },
            TypeDescriptor::Nullable(inner) => match host {
                HostValue::Null => Ok(Value::nullary(NULL)),
                other => Ok(Value::record(NULLABLE, vec![(WRAPPED_FIELD, self.host_to_value(inner, other)?)])),
            },
            TypeDescriptor::Automatic(user) | TypeDescriptor::User(user) => self.decode_user(user, host),
        }
    }

    /// A curried language function collecting converted arguments until the
    /// declared arity is reached, then calling the host function.
    fn import_function(
        &self,
        f: HostFunction,
        args: Rc<[TypeDescriptor]>,
        ret: Rc<TypeDescriptor>,
        collected: Vec<HostValue>,
    ) -> Value {
        let codec = self.clone();
        Value::fun(move |arg| {
            let mut collected = collected.clone();
            let converted = codec.value_to_host(&args[collected.len()], &arg)?;
            collected.push(converted);
            if collected.len() < args.len() {
                return Ok(codec.import_function(f.clone(), args.clone(), ret.clone(), collected));
            }
            match &*ret {
                TypeDescriptor::Action(inner) => Ok(codec.import_action(inner, f.clone(), collected)),
                other => codec.host_to_value(other, &f.call(&collected)?),
            }
        })
    }

    /// An action calling `f` with `args` each time it runs.
    fn import_action(&self, inner: &TypeDescriptor, f: HostFunction, args: Vec<HostValue>) -> Value {
        let codec = self.clone();
        let inner = inner.clone();
        io(move || codec.host_to_value(&inner, &f.call(&args)?))
    }

    fn decode_user(&self, user: &UserType, host: &HostValue) -> RuntimeResult<Value> {
        let Some(case) = self.decoder_for(user, host) else {
            log::trace!("no inward case for {}, passing through", user.name);
            return Ok(passthrough_in(host));
        };
        let mut fields = Vec::with_capacity(case.fields.len());
        for field in &case.fields {
            let descriptor = field.descriptor.instantiate(&user.generics);
            fields.push((field.name.clone(), self.host_to_value(&descriptor, &host.get(&field.name))?));
        }
        Ok(Value::Record(Rc::new(Record {
            constructor: case.constructor.clone(),
            fields,
        })))
    }

    fn decoder_for(&self, user: &UserType, host: &HostValue) -> Option<&DispatchCase> {
        let tag = host.get(DISCRIMINATOR);
        self.registry.decoder_for(&user.name, tag.as_str()?)
    }

    // ══════════════════════════════════════════════════════════════════
    // Foreign import
    // ══════════════════════════════════════════════════════════════════

    /// Bind a host function at run time under a declared signature.
    ///
    /// Function signatures give a curried language function. An action
    /// signature gives an action calling `f` with no arguments on every run.
    /// Any other signature gives a thunk calling `f` once, on first force.
    pub fn import(&self, signature: &TypeDescriptor, f: HostFunction) -> RuntimeResult<Value> {
        match signature {
            TypeDescriptor::Function { .. } => self.host_to_value(signature, &HostValue::Function(f)),
            TypeDescriptor::Action(inner) => Ok(self.import_action(inner, f, Vec::new())),
            other => {
                let codec = self.clone();
                let descriptor = other.clone();
                Ok(Value::lazy(move || codec.host_to_value(&descriptor, &f.call(&[])?)))
            }
        }
    }
}

fn passthrough_out(value: &Value) -> HostValue {
    match value {
        Value::Host(host) => host.clone(),
        other => HostValue::Opaque(Rc::new(other.clone())),
    }
}

fn passthrough_in(host: &HostValue) -> Value {
    match host {
        HostValue::Opaque(value) => (**value).clone(),
        other => Value::Host(other.clone()),
    }
}

fn elements(host: &HostValue) -> RuntimeResult<Vec<HostValue>> {
    host.elements()
        .ok_or_else(|| RuntimeError::mismatch("array", host.type_of()))
}

/// Accept a host number only when rounding leaves it unchanged and it lies
/// within the exactly representable integers.
fn integral(n: f64) -> RuntimeResult<i64> {
    if !n.is_finite() || n.round() != n {
        return Err(RuntimeError::NonIntegral(n));
    }
    if n.abs() > MAX_SAFE_INTEGER as f64 {
        return Err(RuntimeError::UnsafeInteger(n.to_string()));
    }
    Ok(n as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_check() {
        assert_eq!(integral(3.0), Ok(3));
        assert_eq!(integral(-0.0), Ok(0));
        assert_eq!(integral(3.5), Err(RuntimeError::NonIntegral(3.5)));
        assert!(integral(f64::NAN).is_err());
        assert!(integral(f64::INFINITY).is_err());
        assert_eq!(integral(9_007_199_254_740_991.0), Ok(MAX_SAFE_INTEGER));
        assert_eq!(
            integral(9_007_199_254_740_992.0),
            Err(RuntimeError::UnsafeInteger("9007199254740992".into()))
        );
    }

    #[test]
    fn passthrough_preserves_identity() {
        let v = Value::string("x");
        let h = passthrough_out(&v);
        assert!(passthrough_in(&h).same(&v));

        let h = HostValue::array([]);
        assert!(passthrough_out(&passthrough_in(&h)).same(&h));
    }

    #[test]
    fn missing_host_arguments_read_as_undefined() {
        let codec = Codec::default();
        let id = Value::fun(Ok);
        let exported = codec
            .value_to_host(&TypeDescriptor::function(vec![TypeDescriptor::Ptr], TypeDescriptor::Ptr), &id)
            .unwrap();
        let HostValue::Function(f) = exported else {
            panic!("expected a host function");
        };
        assert!(f.call(&[]).unwrap().is_undefined());
    }
}
