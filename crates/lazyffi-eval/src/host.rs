//! Host (JavaScript) values as seen from Rust.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value as Json;

use crate::error::RuntimeResult;
use crate::value::Value;

type HostFunctionBody = dyn Fn(&[HostValue]) -> RuntimeResult<HostValue>;

/// A callable host function taking any number of arguments.
#[derive(Clone)]
pub struct HostFunction(Rc<HostFunctionBody>);

impl HostFunction {
    pub fn new(f: impl Fn(&[HostValue]) -> RuntimeResult<HostValue> + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, args: &[HostValue]) -> RuntimeResult<HostValue> {
        (self.0)(args)
    }

    pub fn ptr_eq(&self, other: &HostFunction) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for HostFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<host function>")
    }
}

#[derive(Debug, Clone, Default)]
pub enum HostValue {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Array(Rc<RefCell<Vec<HostValue>>>),
    Object(Rc<RefCell<BTreeMap<String, HostValue>>>),
    Function(HostFunction),
    /// A language value handed to the host without conversion.
    Opaque(Rc<Value>),
}

impl HostValue {
    pub fn string(s: impl Into<Rc<str>>) -> Self {
        HostValue::String(s.into())
    }

    pub fn array(items: impl IntoIterator<Item = HostValue>) -> Self {
        HostValue::Array(Rc::new(RefCell::new(items.into_iter().collect())))
    }

    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, HostValue)>) -> Self {
        HostValue::Object(Rc::new(RefCell::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        )))
    }

    pub fn function(f: impl Fn(&[HostValue]) -> RuntimeResult<HostValue> + 'static) -> Self {
        HostValue::Function(HostFunction::new(f))
    }

    /// The result of `typeof` on this value.
    pub fn type_of(&self) -> &'static str {
        match self {
            HostValue::Undefined => "undefined",
            HostValue::Null | HostValue::Array(_) | HostValue::Object(_) | HostValue::Opaque(_) => {
                "object"
            }
            HostValue::Bool(_) => "boolean",
            HostValue::Number(_) => "number",
            HostValue::String(_) => "string",
            HostValue::Function(_) => "function",
        }
    }

    /// Property lookup; missing properties and non-objects read as
    /// `undefined`.
    pub fn get(&self, key: &str) -> HostValue {
        match self {
            HostValue::Object(map) => map.borrow().get(key).cloned().unwrap_or_default(),
            _ => HostValue::Undefined,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            HostValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// A snapshot of the elements of an array.
    pub fn elements(&self) -> Option<Vec<HostValue>> {
        match self {
            HostValue::Array(items) => Some(items.borrow().clone()),
            _ => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, HostValue::Undefined)
    }

    /// `===` semantics: primitives by value, everything else by identity.
    pub fn same(&self, other: &HostValue) -> bool {
        match (self, other) {
            (HostValue::Undefined, HostValue::Undefined) | (HostValue::Null, HostValue::Null) => true,
            (HostValue::Bool(a), HostValue::Bool(b)) => a == b,
            (HostValue::Number(a), HostValue::Number(b)) => a == b,
            (HostValue::String(a), HostValue::String(b)) => a == b,
            (HostValue::Array(a), HostValue::Array(b)) => Rc::ptr_eq(a, b),
            (HostValue::Object(a), HostValue::Object(b)) => Rc::ptr_eq(a, b),
            (HostValue::Function(a), HostValue::Function(b)) => a.ptr_eq(b),
            (HostValue::Opaque(a), HostValue::Opaque(b)) => a.same(b),
            _ => false,
        }
    }

    /// JSON view. Functions, opaque values and `undefined` become `null`,
    /// except that `undefined` object properties are dropped.
    pub fn to_json(&self) -> Json {
        match self {
            HostValue::Undefined
            | HostValue::Null
            | HostValue::Function(_)
            | HostValue::Opaque(_) => Json::Null,
            HostValue::Bool(b) => Json::Bool(*b),
            HostValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            HostValue::String(s) => Json::String(s.to_string()),
            HostValue::Array(items) => Json::Array(items.borrow().iter().map(HostValue::to_json).collect()),
            HostValue::Object(map) => Json::Object(
                map.borrow()
                    .iter()
                    .filter(|(_, v)| !v.is_undefined())
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<&Json> for HostValue {
    fn from(json: &Json) -> Self {
        match json {
            Json::Null => HostValue::Null,
            Json::Bool(b) => HostValue::Bool(*b),
            Json::Number(n) => HostValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => HostValue::string(s.as_str()),
            Json::Array(items) => HostValue::array(items.iter().map(HostValue::from)),
            Json::Object(map) => HostValue::object(map.iter().map(|(k, v)| (k.clone(), HostValue::from(v)))),
        }
    }
}

impl From<Json> for HostValue {
    fn from(json: Json) -> Self {
        HostValue::from(&json)
    }
}

/// Structural equality for data; functions and opaque values compare by
/// identity.
impl PartialEq for HostValue {
    fn eq(&self, other: &HostValue) -> bool {
        match (self, other) {
            (HostValue::Array(a), HostValue::Array(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            (HostValue::Object(a), HostValue::Object(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            _ => self.same(other),
        }
    }
}
