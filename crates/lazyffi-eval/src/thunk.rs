//! Deferred cells and forcing to weak-head normal form.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::{RuntimeError, RuntimeResult};
use crate::value::Value;

type Producer = Rc<dyn Fn() -> RuntimeResult<Value>>;

enum ThunkState {
    Unforced,
    /// The producer is running (cached mode). Forcing again is a loop.
    Forcing,
    Forced(Value),
}

/// How a force treats the memoized result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForceMode {
    /// Run the producer once and replay the stored value afterwards.
    #[default]
    Cached,
    /// Run the producer on every force and store nothing. Used to execute
    /// actions so that each run repeats its effects.
    NoCache,
}

/// A value computed on demand.
pub struct Thunk {
    producer: Option<Producer>,
    state: RefCell<ThunkState>,
}

impl Thunk {
    pub fn new(producer: impl Fn() -> RuntimeResult<Value> + 'static) -> Self {
        Self {
            producer: Some(Rc::new(producer)),
            state: RefCell::new(ThunkState::Unforced),
        }
    }

    /// An already realized cell.
    pub fn ready(value: Value) -> Self {
        Self {
            producer: None,
            state: RefCell::new(ThunkState::Forced(value)),
        }
    }

    pub fn is_forced(&self) -> bool {
        matches!(&*self.state.borrow(), ThunkState::Forced(_))
    }

    /// Force with memoization. The stored value is already in weak-head
    /// normal form.
    pub fn force(&self) -> RuntimeResult<Value> {
        match &*self.state.borrow() {
            ThunkState::Forced(v) => return Ok(v.clone()),
            ThunkState::Forcing => return Err(RuntimeError::Loop),
            ThunkState::Unforced => {}
        }
        let Some(producer) = self.producer.clone() else {
            return Err(RuntimeError::Loop);
        };

        *self.state.borrow_mut() = ThunkState::Forcing;
        match producer().and_then(|v| force(&v)) {
            Ok(v) => {
                *self.state.borrow_mut() = ThunkState::Forced(v.clone());
                Ok(v)
            }
            Err(e) => {
                // A failed force leaves the cell retryable.
                *self.state.borrow_mut() = ThunkState::Unforced;
                Err(e)
            }
        }
    }

    /// Run the producer regardless of any stored result, storing nothing.
    pub fn force_no_cache(&self) -> RuntimeResult<Value> {
        match &self.producer {
            Some(producer) => {
                let producer = producer.clone();
                force_no_cache(&producer()?)
            }
            None => self.force(),
        }
    }
}

impl fmt::Debug for Thunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.state.borrow() {
            ThunkState::Unforced => f.write_str("<thunk>"),
            ThunkState::Forcing => f.write_str("<thunk: forcing>"),
            ThunkState::Forced(v) => write!(f, "<thunk: {v:?}>"),
        }
    }
}

/// Unwrap nested thunks until a non-deferred value is reached.
pub fn force(value: &Value) -> RuntimeResult<Value> {
    force_with(value, ForceMode::Cached)
}

/// [`force`] without memoization at any level of the chain.
pub fn force_no_cache(value: &Value) -> RuntimeResult<Value> {
    force_with(value, ForceMode::NoCache)
}

pub fn force_with(value: &Value, mode: ForceMode) -> RuntimeResult<Value> {
    let mut current = value.clone();
    while let Value::Thunk(thunk) = &current {
        current = match mode {
            ForceMode::Cached => thunk.force()?,
            ForceMode::NoCache => thunk.force_no_cache()?,
        };
    }
    Ok(current)
}
