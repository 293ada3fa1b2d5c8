//! The monad shim: `ret`, `bind` and `then` over actions.
//!
//! An action is any value that forces (without caching) to the monad
//! wrapper. Binding never runs anything; running happens only when the
//! resulting thunk is forced with [`ForceMode::NoCache`], which is what
//! [`run_action`] does.
//!
//! [`ForceMode::NoCache`]: crate::ForceMode::NoCache

use std::rc::Rc;

use crate::error::{RuntimeError, RuntimeResult};
use crate::thunk::force_no_cache;
use crate::value::{apply, Value};

/// Wrap a value as a finished action.
pub fn ret(value: Value) -> Value {
    Value::Monad(Rc::new(value))
}

/// `m >>= f`: a deferred action that runs `m`, applies `f` to its result and
/// runs the action `f` returns.
pub fn bind(m: Value, f: Value) -> Value {
    Value::lazy(move || {
        let x = run_action(&m)?;
        let next = apply(&f, x)?;
        force_no_cache(&next)
    })
}

/// `m >> k`: run `m`, discard its result, then run `k`.
pub fn then(m: Value, k: Value) -> Value {
    Value::lazy(move || {
        run_action(&m)?;
        force_no_cache(&k)
    })
}

/// An action whose effect is `producer`. Runs on every execution.
pub fn io(producer: impl Fn() -> RuntimeResult<Value> + 'static) -> Value {
    Value::lazy(move || producer().map(ret))
}

/// Execute an action once and return the value it wraps.
pub fn run_action(action: &Value) -> RuntimeResult<Value> {
    match force_no_cache(action)? {
        Value::Monad(inner) => Ok((*inner).clone()),
        other => Err(RuntimeError::mismatch("action", other.type_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn logger(log: &Rc<RefCell<Vec<i64>>>, n: i64) -> Value {
        let log = log.clone();
        io(move || {
            log.borrow_mut().push(n);
            Ok(Value::Int(n))
        })
    }

    #[test]
    fn bind_is_lazy_until_run() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let step = logger(&log, 1);
        let log2 = log.clone();
        let program = bind(
            step,
            Value::fun(move |x| Ok(logger(&log2, x.as_int()? + 10))),
        );
        assert!(log.borrow().is_empty());
        let result = run_action(&program).unwrap();
        assert_eq!(result.as_int().unwrap(), 11);
        assert_eq!(*log.borrow(), [1, 11]);
    }

    #[test]
    fn running_twice_repeats_effects() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let program = then(logger(&log, 1), logger(&log, 2));
        run_action(&program).unwrap();
        run_action(&program).unwrap();
        assert_eq!(*log.borrow(), [1, 2, 1, 2]);
    }

    #[test]
    fn ret_wraps_without_effects() {
        let v = run_action(&ret(Value::Bool(true))).unwrap();
        assert!(v.as_bool().unwrap());
    }

    #[test]
    fn running_a_non_action_fails() {
        assert!(matches!(
            run_action(&Value::Int(1)),
            Err(RuntimeError::TypeMismatch { .. })
        ));
    }
}
