//! Mutable reference cells. These sit outside the forcing discipline: reads
//! and writes take effect immediately.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{RuntimeError, RuntimeResult};
use crate::thunk::force;
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct Reference(Rc<RefCell<Value>>);

impl Reference {
    pub fn new(value: Value) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    pub fn read(&self) -> Value {
        self.0.borrow().clone()
    }

    pub fn write(&self, value: Value) {
        *self.0.borrow_mut() = value;
    }

    /// Replace the contents with `f(old)`, returning the old contents.
    pub fn modify(&self, f: impl FnOnce(&Value) -> Value) -> Value {
        let old = self.read();
        self.write(f(&old));
        old
    }

    pub fn ptr_eq(&self, other: &Reference) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

pub fn new_ref(value: Value) -> Value {
    Value::Ref(Reference::new(value))
}

fn expect_ref(cell: &Value) -> RuntimeResult<Reference> {
    match force(cell)? {
        Value::Ref(r) => Ok(r),
        other => Err(RuntimeError::NotAReference(other.type_name())),
    }
}

pub fn read_ref(cell: &Value) -> RuntimeResult<Value> {
    Ok(expect_ref(cell)?.read())
}

pub fn write_ref(cell: &Value, value: Value) -> RuntimeResult<()> {
    expect_ref(cell)?.write(value);
    Ok(())
}
