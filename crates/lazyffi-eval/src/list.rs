//! Cons-chain lists, strings and tuples.
//!
//! All three share one representation; only the descriptor used at the
//! boundary tells them apart. Walking a chain forces each tail on demand but
//! leaves the heads untouched.

use crate::error::{RuntimeError, RuntimeResult};
use crate::thunk::force;
use crate::value::Value;

/// Build a chain from a finite sequence, right to left.
pub fn from_values(values: impl IntoIterator<Item = Value>) -> Value {
    let items: Vec<Value> = values.into_iter().collect();
    items
        .into_iter()
        .rev()
        .fold(Value::Nil, |tail, head| Value::cons(head, tail))
}

/// Tuples are chains of exactly one cell per slot.
pub fn tuple(values: impl IntoIterator<Item = Value>) -> Value {
    from_values(values)
}

/// Force `list` and split off its first cell.
pub fn uncons(list: &Value) -> RuntimeResult<Option<(Value, Value)>> {
    match force(list)? {
        Value::Nil => Ok(None),
        Value::Cons(cell) => Ok(Some((cell.head.clone(), cell.tail.clone()))),
        other => Err(RuntimeError::mismatch("list", other.type_name())),
    }
}

/// Iterate the heads of a chain.
pub fn iter(list: &Value) -> ListIter {
    ListIter {
        rest: Some(list.clone()),
    }
}

pub struct ListIter {
    rest: Option<Value>,
}

impl Iterator for ListIter {
    type Item = RuntimeResult<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.rest.take()?;
        match uncons(&rest) {
            Ok(Some((head, tail))) => {
                self.rest = Some(tail);
                Some(Ok(head))
            }
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

pub fn to_vec(list: &Value) -> RuntimeResult<Vec<Value>> {
    iter(list).collect()
}

/// The `index`-th head. Walking past the terminal marker is an error.
pub fn index(list: &Value, index: usize) -> RuntimeResult<Value> {
    let mut length = 0;
    for head in iter(list) {
        let head = head?;
        if length == index {
            return Ok(head);
        }
        length += 1;
    }
    Err(RuntimeError::IndexOutOfRange { index, length })
}

/// Whether the chain has exactly `max` cells, walking at most `max + 1`.
pub fn length_is(list: &Value, max: usize) -> RuntimeResult<bool> {
    let mut walked = 0;
    let mut rest = list.clone();
    while walked <= max {
        match uncons(&rest)? {
            Some((_, tail)) => {
                walked += 1;
                rest = tail;
            }
            None => return Ok(walked == max),
        }
    }
    Ok(false)
}

/// Collect a character list, forcing every head.
pub fn to_string(list: &Value) -> RuntimeResult<String> {
    let mut out = String::new();
    for head in iter(list) {
        match force(&head?)? {
            Value::Char(c) => out.push(c),
            other => return Err(RuntimeError::mismatch("Char", other.type_name())),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// An infinite chain of ones that counts how many tails were forced.
    fn ones(forced: Rc<Cell<usize>>) -> Value {
        Value::lazy(move || {
            forced.set(forced.get() + 1);
            Ok(Value::cons(Value::Int(1), ones(forced.clone())))
        })
    }

    #[test]
    fn builds_in_order() {
        let l = from_values([Value::Int(1), Value::Int(2), Value::Int(3)]);
        let items: Vec<i64> = to_vec(&l)
            .unwrap()
            .iter()
            .map(|v| v.as_int().unwrap())
            .collect();
        assert_eq!(items, [1, 2, 3]);
    }

    #[test]
    fn index_walks_the_chain() {
        let l = Value::string("abc");
        assert!(matches!(index(&l, 2).unwrap(), Value::Char('c')));
        assert_eq!(
            index(&l, 5).unwrap_err(),
            RuntimeError::IndexOutOfRange { index: 5, length: 3 }
        );
    }

    #[test]
    fn length_is_exact() {
        let l = from_values([Value::Int(1), Value::Int(2)]);
        assert!(length_is(&l, 2).unwrap());
        assert!(!length_is(&l, 1).unwrap());
        assert!(!length_is(&l, 3).unwrap());
        assert!(length_is(&Value::Nil, 0).unwrap());
    }

    #[test]
    fn length_is_stops_on_infinite_lists() {
        let forced = Rc::new(Cell::new(0));
        let l = ones(forced.clone());
        assert!(!length_is(&l, 4).unwrap());
        assert_eq!(forced.get(), 5);
    }

    #[test]
    fn strings_round_trip() {
        assert_eq!(to_string(&Value::string("héllo")).unwrap(), "héllo");
        assert_eq!(to_string(&Value::Nil).unwrap(), "");
    }

    #[test]
    fn non_list_is_rejected() {
        assert!(matches!(
            uncons(&Value::Int(1)),
            Err(RuntimeError::TypeMismatch { .. })
        ));
    }
}
