//! Language-side values.
//!
//! Every compound value is reference counted: thunks, cons cells and records
//! are shared freely between the evaluator and host code, and evaluation is
//! single-threaded.

use std::fmt;
use std::rc::Rc;

use crate::error::{RuntimeError, RuntimeResult};
use crate::host::HostValue;
use crate::reference::Reference;
use crate::thunk::{force, Thunk};

/// A runtime value of the lazy language.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Double(f64),
    Bool(bool),
    Char(char),
    /// The terminal marker of a cons chain.
    Nil,
    Cons(Rc<Cons>),
    Record(Rc<Record>),
    Fun(Function),
    Thunk(Rc<Thunk>),
    /// The monad wrapper around the result of a sequenced computation.
    Monad(Rc<Value>),
    Ref(Reference),
    /// A host value held without conversion.
    Host(HostValue),
}

/// A cons cell. Both halves may be unforced thunks.
#[derive(Debug)]
pub struct Cons {
    pub head: Value,
    pub tail: Value,
}

/// A tagged record: one constructor of a record or sum type.
#[derive(Debug)]
pub struct Record {
    pub constructor: String,
    pub fields: Vec<(String, Value)>,
}

impl Record {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Like [`Record::field`], failing with `MissingField`.
    pub fn get(&self, name: &str) -> RuntimeResult<&Value> {
        self.field(name).ok_or_else(|| RuntimeError::MissingField {
            constructor: self.constructor.clone(),
            field: name.to_string(),
        })
    }
}

type FunctionBody = dyn Fn(Value) -> RuntimeResult<Value>;

/// A one-argument language function. Multi-argument functions are curried.
#[derive(Clone)]
pub struct Function(Rc<FunctionBody>);

impl Function {
    pub fn new(f: impl Fn(Value) -> RuntimeResult<Value> + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, arg: Value) -> RuntimeResult<Value> {
        (self.0)(arg)
    }

    pub fn ptr_eq(&self, other: &Function) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<function>")
    }
}

impl Value {
    /// A deferred value computed by `producer` on first force.
    pub fn lazy(producer: impl Fn() -> RuntimeResult<Value> + 'static) -> Value {
        Value::Thunk(Rc::new(Thunk::new(producer)))
    }

    pub fn fun(f: impl Fn(Value) -> RuntimeResult<Value> + 'static) -> Value {
        Value::Fun(Function::new(f))
    }

    /// A curried function of `arity` arguments (at least one) whose body
    /// receives all of them at once.
    pub fn curried(arity: usize, body: impl Fn(Vec<Value>) -> RuntimeResult<Value> + 'static) -> Value {
        fn step(
            body: Rc<dyn Fn(Vec<Value>) -> RuntimeResult<Value>>,
            arity: usize,
            collected: Vec<Value>,
        ) -> Value {
            Value::fun(move |arg| {
                let mut args = collected.clone();
                args.push(arg);
                if args.len() >= arity {
                    body(args)
                } else {
                    Ok(step(body.clone(), arity, args))
                }
            })
        }
        step(Rc::new(body), arity.max(1), Vec::new())
    }

    pub fn cons(head: Value, tail: Value) -> Value {
        Value::Cons(Rc::new(Cons { head, tail }))
    }

    pub fn record<S: Into<String>>(constructor: impl Into<String>, fields: Vec<(S, Value)>) -> Value {
        Value::Record(Rc::new(Record {
            constructor: constructor.into(),
            fields: fields.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        }))
    }

    /// A constructor without fields.
    pub fn nullary(constructor: impl Into<String>) -> Value {
        Value::Record(Rc::new(Record {
            constructor: constructor.into(),
            fields: Vec::new(),
        }))
    }

    /// A character list.
    pub fn string(s: &str) -> Value {
        crate::list::from_values(s.chars().map(Value::Char).collect::<Vec<_>>())
    }

    /// Short description of the outermost shape, for error messages.
    pub fn type_name(&self) -> String {
        match self {
            Value::Int(_) => "Int".into(),
            Value::Double(_) => "Double".into(),
            Value::Bool(_) => "Bool".into(),
            Value::Char(_) => "Char".into(),
            Value::Nil | Value::Cons(_) => "list".into(),
            Value::Record(r) => format!("record {}", r.constructor),
            Value::Fun(_) => "function".into(),
            Value::Thunk(_) => "thunk".into(),
            Value::Monad(_) => "action".into(),
            Value::Ref(_) => "reference".into(),
            Value::Host(h) => format!("host {}", h.type_of()),
        }
    }

    /// Identity comparison: primitives by value, shared cells by pointer.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Int(a), Value::Double(b)) | (Value::Double(b), Value::Int(a)) => *a as f64 == *b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::Cons(a), Value::Cons(b)) => Rc::ptr_eq(a, b),
            (Value::Record(a), Value::Record(b)) => Rc::ptr_eq(a, b),
            (Value::Fun(a), Value::Fun(b)) => a.ptr_eq(b),
            (Value::Thunk(a), Value::Thunk(b)) => Rc::ptr_eq(a, b),
            (Value::Monad(a), Value::Monad(b)) => Rc::ptr_eq(a, b),
            (Value::Ref(a), Value::Ref(b)) => a.ptr_eq(b),
            (Value::Host(a), Value::Host(b)) => a.same(b),
            _ => false,
        }
    }

    pub fn as_int(&self) -> RuntimeResult<i64> {
        match force(self)? {
            Value::Int(n) => Ok(n),
            other => Err(RuntimeError::mismatch("Int", other.type_name())),
        }
    }

    pub fn as_bool(&self) -> RuntimeResult<bool> {
        match force(self)? {
            Value::Bool(b) => Ok(b),
            other => Err(RuntimeError::mismatch("Bool", other.type_name())),
        }
    }
}

/// Apply a (possibly deferred) function value to one argument.
pub fn apply(f: &Value, arg: Value) -> RuntimeResult<Value> {
    match force(f)? {
        Value::Fun(func) => func.call(arg),
        other => Err(RuntimeError::mismatch("function", other.type_name())),
    }
}

/// Apply a curried function to each argument in turn.
pub fn apply_all(f: &Value, args: impl IntoIterator<Item = Value>) -> RuntimeResult<Value> {
    args.into_iter().try_fold(f.clone(), |acc, arg| apply(&acc, arg))
}
