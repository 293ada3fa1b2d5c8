//! Deep structural equality.

use crate::error::RuntimeResult;
use crate::host::HostValue;
use crate::thunk::force;
use crate::value::Value;

/// Compare two values, forcing both sides as deep as the comparison needs.
///
/// Records compare fields present on the left only: a right-hand record may
/// carry extra fields and still be equal.
pub fn values_equal(a: &Value, b: &Value) -> RuntimeResult<bool> {
    let a = force(a)?;
    let b = force(b)?;
    if a.same(&b) {
        return Ok(true);
    }
    match (&a, &b) {
        (Value::Cons(_), Value::Cons(_)) => chains_equal(a, b),
        (Value::Record(left), Value::Record(right)) => {
            if left.constructor != right.constructor {
                return Ok(false);
            }
            for (name, value) in &left.fields {
                match right.field(name) {
                    Some(other) if values_equal(value, other)? => {}
                    _ => return Ok(false),
                }
            }
            Ok(true)
        }
        (Value::Host(left), Value::Host(right)) => host_equal(left, right),
        _ => Ok(false),
    }
}

fn chains_equal(mut a: Value, mut b: Value) -> RuntimeResult<bool> {
    loop {
        match (&a, &b) {
            (Value::Nil, Value::Nil) => return Ok(true),
            (Value::Cons(x), Value::Cons(y)) => {
                if std::rc::Rc::ptr_eq(x, y) {
                    return Ok(true);
                }
                if !values_equal(&x.head, &y.head)? {
                    return Ok(false);
                }
                let (next_a, next_b) = (force(&x.tail)?, force(&y.tail)?);
                a = next_a;
                b = next_b;
            }
            _ => return Ok(false),
        }
    }
}

fn host_equal(a: &HostValue, b: &HostValue) -> RuntimeResult<bool> {
    if a.same(b) {
        return Ok(true);
    }
    match (a, b) {
        (HostValue::Array(_), HostValue::Array(_)) => {
            let (xs, ys) = (a.elements().unwrap_or_default(), b.elements().unwrap_or_default());
            if xs.len() != ys.len() {
                return Ok(false);
            }
            for (x, y) in xs.iter().zip(&ys) {
                if !host_equal(x, y)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        (HostValue::Opaque(x), HostValue::Opaque(y)) => values_equal(x, y),
        _ => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list;

    fn eq(a: &Value, b: &Value) -> bool {
        values_equal(a, b).unwrap()
    }

    #[test]
    fn primitives() {
        assert!(eq(&Value::Int(1), &Value::Int(1)));
        assert!(!eq(&Value::Int(1), &Value::Int(2)));
        assert!(!eq(&Value::Int(1), &Value::Bool(true)));
    }

    #[test]
    fn chains_compare_elementwise() {
        assert!(eq(&Value::string("abc"), &Value::string("abc")));
        assert!(!eq(&Value::string("abc"), &Value::string("abd")));
        assert!(!eq(&Value::string("ab"), &Value::string("abc")));
    }

    #[test]
    fn thunks_are_forced_before_comparing() {
        let lazy = Value::lazy(|| Ok(Value::string("x")));
        assert!(eq(&lazy, &Value::string("x")));
    }

    #[test]
    fn records_compare_left_fields_only() {
        let small = Value::record("P", vec![("x", Value::Int(1))]);
        let large = Value::record("P", vec![("x", Value::Int(1)), ("y", Value::Int(2))]);
        assert!(eq(&small, &large));
        assert!(!eq(&large, &small));
        assert!(!eq(&small, &Value::record("Q", vec![("x", Value::Int(1))])));
    }

    #[test]
    fn host_arrays_compare_elementwise() {
        let a = Value::Host(HostValue::array([HostValue::Number(1.0), HostValue::string("a")]));
        let b = Value::Host(HostValue::array([HostValue::Number(1.0), HostValue::string("a")]));
        let c = Value::Host(HostValue::array([HostValue::Number(1.0)]));
        assert!(eq(&a, &b));
        assert!(!eq(&a, &c));
    }

    #[test]
    fn nested_lists_of_records() {
        let mk = || {
            list::from_values([
                Value::record("Just", vec![("value", Value::Int(1))]),
                Value::nullary("Nothing"),
            ])
        };
        assert!(eq(&mk(), &mk()));
    }
}
