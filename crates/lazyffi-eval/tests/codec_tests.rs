//! Codec tests: round trips for every convertible descriptor, action and
//! function export, integer validation, absence wrappers, user-type dispatch
//! and run-time foreign import.

use std::cell::Cell;
use std::rc::Rc;

use lazyffi_eval::monad::{io, ret, run_action};
use lazyffi_eval::{
    apply, apply_all, force, list, values_equal, Codec, HostFunction, HostValue, RuntimeError,
    Value, DEFINED, MAX_SAFE_INTEGER, NULL, NULLABLE, UNDEFINED, WRAPPED_FIELD,
};
use lazyffi_types::{DispatchCase, DispatchRegistry, TypeDescriptor as D, DISCRIMINATOR};
use serde_json::json;

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn codec() -> Codec {
    Codec::new(shapes_registry())
}

/// `data Shape = Circle { radius :: Double } | Rect { w :: Int, h :: Int }`
/// `data Box a = Box { item :: a, label :: Defined String }`
fn shapes_registry() -> DispatchRegistry {
    let mut registry = DispatchRegistry::new();
    registry.register(DispatchCase::new("Shape", "Circle").field("radius", D::Double));
    registry.register(
        DispatchCase::new("Shape", "Rect")
            .field("w", D::Int)
            .field("h", D::Int),
    );
    registry.register(
        DispatchCase::new("Box", "Box")
            .field("item", D::generic(0))
            .field("label", D::defined(D::String)),
    );
    registry
}

fn out(d: &D, v: &Value) -> HostValue {
    codec().value_to_host(d, v).unwrap()
}

fn back(d: &D, h: &HostValue) -> Value {
    codec().host_to_value(d, h).unwrap()
}

fn assert_round_trip(d: &D, v: Value) {
    let c = codec();
    let host = c.value_to_host(d, &v).unwrap();
    let again = c.host_to_value(d, &host).unwrap();
    assert!(
        values_equal(&v, &again).unwrap() && values_equal(&again, &v).unwrap(),
        "round trip through {d} changed the value: {host:?}"
    );
}

fn assert_host_round_trip(d: &D, h: HostValue) {
    let c = codec();
    let value = c.host_to_value(d, &h).unwrap();
    let again = c.value_to_host(d, &value).unwrap();
    assert_eq!(again, h, "host round trip through {d}");
}

fn call(h: &HostValue, args: &[HostValue]) -> HostValue {
    let HostValue::Function(f) = h else {
        panic!("not a host function: {h:?}");
    };
    f.call(args).unwrap()
}

fn constructor(v: &Value) -> String {
    match force(v).unwrap() {
        Value::Record(r) => r.constructor.clone(),
        other => panic!("not a record: {other:?}"),
    }
}

// ─────────────────────────────────────────────────────────────────────
// Round trips
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_primitive_round_trips() {
    assert_round_trip(&D::Int, Value::Int(-42));
    assert_round_trip(&D::Double, Value::Double(2.5));
    assert_round_trip(&D::Bool, Value::Bool(false));
    assert_round_trip(&D::String, Value::string("naïve ☃"));
    assert_round_trip(&D::String, Value::Nil);
}

#[test]
fn test_container_round_trips() {
    assert_round_trip(
        &D::list(D::Int),
        list::from_values([Value::Int(1), Value::Int(2)]),
    );
    assert_round_trip(
        &D::Tuple(vec![D::String, D::Bool]),
        list::tuple([Value::string("a"), Value::Bool(true)]),
    );
    assert_round_trip(
        &D::list(D::Tuple(vec![D::Int, D::list(D::String)])),
        list::from_values([list::tuple([
            Value::Int(1),
            list::from_values([Value::string("x"), Value::string("y")]),
        ])]),
    );
}

#[test]
fn test_optional_round_trips() {
    let present = Value::record(DEFINED, vec![(WRAPPED_FIELD, Value::string("x"))]);
    assert_round_trip(&D::defined(D::String), present);
    assert_round_trip(&D::defined(D::String), Value::nullary(UNDEFINED));
    assert_round_trip(
        &D::nullable(D::Int),
        Value::record(NULLABLE, vec![(WRAPPED_FIELD, Value::Int(3))]),
    );
    assert_round_trip(&D::nullable(D::Int), Value::nullary(NULL));
}

#[test]
fn test_host_side_round_trips() {
    assert_host_round_trip(&D::Int, HostValue::Number(7.0));
    assert_host_round_trip(&D::String, HostValue::string("hi"));
    assert_host_round_trip(
        &D::list(D::Double),
        HostValue::from(json!([1.5, 2.0, -3.25])),
    );
    assert_host_round_trip(
        &D::Tuple(vec![D::Int, D::String]),
        HostValue::from(json!([1, "one"])),
    );
    assert_host_round_trip(&D::defined(D::Bool), HostValue::Undefined);
    assert_host_round_trip(&D::nullable(D::Bool), HostValue::Null);
    assert_host_round_trip(&D::nullable(D::Bool), HostValue::Bool(true));
}

#[test]
fn test_passthrough_is_identity() {
    let host = HostValue::object([("k", HostValue::Number(1.0))]);
    let v = back(&D::Ptr, &host);
    assert!(out(&D::Ptr, &v).same(&host));

    let value = Value::string("opaque");
    let h = out(&D::Unknown(None), &value);
    assert!(back(&D::Unknown(None), &h).same(&value));
}

#[test]
fn test_language_values_nest_inside_host_containers() {
    let point = Value::record("Point", vec![("x", Value::Int(1))]);
    let host = out(&D::list(D::Ptr), &list::from_values(vec![point.clone(), point.clone()]));
    let items = host.elements().unwrap();
    assert!(matches!(&items[0], HostValue::Opaque(v) if v.same(&point)));

    let back_again = back(&D::list(D::Ptr), &host);
    assert!(list::index(&back_again, 1).unwrap().same(&point));
}

// ─────────────────────────────────────────────────────────────────────
// Values faults
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_int_accepts_integral_numbers() {
    assert_eq!(back(&D::Int, &HostValue::Number(3.0)).as_int().unwrap(), 3);
}

#[test]
fn test_int_rejects_fractional_numbers() {
    let err = codec().host_to_value(&D::Int, &HostValue::Number(3.5)).unwrap_err();
    assert_eq!(err, RuntimeError::NonIntegral(3.5));
}

#[test]
fn test_int_stays_within_exact_host_range() {
    let edge = Value::Int(MAX_SAFE_INTEGER);
    assert_round_trip(&D::Int, edge);
    assert_round_trip(&D::Int, Value::Int(-MAX_SAFE_INTEGER));

    let err = codec()
        .value_to_host(&D::Int, &Value::Int(9_007_199_254_740_993))
        .unwrap_err();
    assert_eq!(err, RuntimeError::UnsafeInteger("9007199254740993".into()));
    assert!(codec().value_to_host(&D::Int, &Value::Int(i64::MIN)).is_err());

    let err = codec()
        .host_to_value(&D::Int, &HostValue::Number(9_007_199_254_740_992.0))
        .unwrap_err();
    assert_eq!(err, RuntimeError::UnsafeInteger("9007199254740992".into()));
    assert!(codec().host_to_value(&D::Int, &HostValue::Number(-1e19)).is_err());
}

#[test]
fn test_type_mismatch_is_reported() {
    let err = codec().host_to_value(&D::String, &HostValue::Number(1.0)).unwrap_err();
    assert!(matches!(err, RuntimeError::TypeMismatch { .. }));
}

#[test]
fn test_short_tuple_is_a_shape_mismatch() {
    let d = D::Tuple(vec![D::Int, D::Int, D::Int]);
    let err = codec().host_to_value(&d, &HostValue::from(json!([1, 2]))).unwrap_err();
    assert!(matches!(err, RuntimeError::ShapeMismatch(_)));

    let err = codec()
        .value_to_host(&d, &list::tuple([Value::Int(1)]))
        .unwrap_err();
    assert!(matches!(err, RuntimeError::ShapeMismatch(_)));
}

// ─────────────────────────────────────────────────────────────────────
// Absence wrappers
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_defined_discriminates_undefined() {
    let d = D::defined(D::String);
    assert_eq!(constructor(&back(&d, &HostValue::Undefined)), UNDEFINED);

    let present = back(&d, &HostValue::string("x"));
    assert_eq!(constructor(&present), DEFINED);
    let Value::Record(r) = force(&present).unwrap() else {
        unreachable!()
    };
    assert_eq!(list::to_string(r.get(WRAPPED_FIELD).unwrap()).unwrap(), "x");
}

#[test]
fn test_nullable_discriminates_null_only() {
    let d = D::nullable(D::Ptr);
    assert_eq!(constructor(&back(&d, &HostValue::Null)), NULL);
    assert_eq!(constructor(&back(&d, &HostValue::Undefined)), NULLABLE);
}

#[test]
fn test_absent_branches_encode_to_host_sentinels() {
    assert!(out(&D::defined(D::Int), &Value::nullary(UNDEFINED)).is_undefined());
    assert_eq!(out(&D::nullable(D::Int), &Value::nullary(NULL)), HostValue::Null);
}

// ─────────────────────────────────────────────────────────────────────
// Actions & functions
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_exported_action_reruns_on_every_call() {
    let runs = Rc::new(Cell::new(0));
    let r = runs.clone();
    let action = io(move || {
        r.set(r.get() + 1);
        Ok(Value::Int(i64::from(r.get())))
    });
    let host = out(&D::action(D::Int), &action);
    assert_eq!(call(&host, &[]), HostValue::Number(1.0));
    assert_eq!(call(&host, &[]), HostValue::Number(2.0));
    assert_eq!(runs.get(), 2);
}

#[test]
fn test_exported_function_applies_each_argument() {
    let concat = Value::curried(2, |args| {
        let a = list::to_string(&args[0])?;
        let b = list::to_string(&args[1])?;
        Ok(Value::string(&format!("{a}{b}")))
    });
    let d = D::function(vec![D::String, D::String], D::String);
    let host = out(&d, &concat);
    assert_eq!(
        call(&host, &[HostValue::string("foo"), HostValue::string("bar")]),
        HostValue::string("foobar")
    );
}

#[test]
fn test_exported_function_unwraps_action_result() {
    let runs = Rc::new(Cell::new(0));
    let r = runs.clone();
    let f = Value::fun(move |x| {
        let r = r.clone();
        Ok(io(move || {
            r.set(r.get() + 1);
            Ok(Value::Int(x.as_int()? + 1))
        }))
    });
    let host = out(&D::function(vec![D::Int], D::action(D::Int)), &f);
    assert_eq!(call(&host, &[HostValue::Number(1.0)]), HostValue::Number(2.0));
    assert_eq!(call(&host, &[HostValue::Number(1.0)]), HostValue::Number(2.0));
    assert_eq!(runs.get(), 2);
}

#[test]
fn test_exported_function_stops_when_result_is_not_applicable() {
    let constant = Value::fun(|_| Ok(Value::Host(HostValue::string("done"))));
    let d = D::function(vec![D::Int, D::Int], D::Ptr);
    assert_eq!(
        call(&out(&d, &constant), &[HostValue::Number(1.0), HostValue::Number(2.0)]),
        HostValue::string("done")
    );
}

#[test]
fn test_nullary_function_is_rejected_both_ways() {
    let d = D::function(vec![], D::Int);
    assert_eq!(
        codec().value_to_host(&d, &Value::fun(Ok)).unwrap_err(),
        RuntimeError::NullaryFunction
    );
    let f = HostValue::function(|_| Ok(HostValue::Number(1.0)));
    assert_eq!(codec().host_to_value(&d, &f).unwrap_err(), RuntimeError::NullaryFunction);
}

#[test]
fn test_host_value_as_action_wraps_in_monad() {
    let v = back(&D::action(D::Int), &HostValue::Number(5.0));
    assert_eq!(run_action(&v).unwrap().as_int().unwrap(), 5);
}

#[test]
fn test_host_function_as_action_is_wrapped_not_called() {
    let calls = Rc::new(Cell::new(0));
    let c = calls.clone();
    let f = HostValue::function(move |_| {
        c.set(c.get() + 1);
        Ok(HostValue::Number(42.0))
    });
    let v = back(&D::action(D::Ptr), &f);
    let inner = run_action(&v).unwrap();
    assert!(matches!(&inner, Value::Host(h) if h.same(&f)));
    run_action(&v).unwrap();
    assert_eq!(calls.get(), 0);
}

// ─────────────────────────────────────────────────────────────────────
// User types
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_record_encodes_with_discriminator() {
    let rect = Value::record("Rect", vec![("w", Value::Int(2)), ("h", Value::Int(3))]);
    let host = out(&D::automatic("Shape", vec![]), &rect);
    assert_eq!(host.to_json(), json!({ "$tag": "Rect", "w": 2.0, "h": 3.0 }));
    assert_eq!(host.get(DISCRIMINATOR).as_str(), Some("Rect"));
}

#[test]
fn test_record_decodes_by_discriminator() {
    let host = HostValue::from(json!({ "$tag": "Circle", "radius": 1.5 }));
    let v = back(&D::user("Shape", vec![]), &host);
    let expected = Value::record("Circle", vec![("radius", Value::Double(1.5))]);
    assert!(values_equal(&v, &expected).unwrap());
}

#[test]
fn test_user_type_round_trip() {
    let d = D::automatic("Shape", vec![]);
    assert_round_trip(&d, Value::record("Rect", vec![("w", Value::Int(1)), ("h", Value::Int(9))]));
    assert_round_trip(&d, Value::record("Circle", vec![("radius", Value::Double(0.5))]));
}

#[test]
fn test_undefined_fields_are_omitted() {
    let b = Value::record(
        "Box",
        vec![("item", Value::Int(1)), ("label", Value::nullary(UNDEFINED))],
    );
    let host = out(&D::automatic("Box", vec![D::Int]), &b);
    assert_eq!(host.to_json(), json!({ "$tag": "Box", "item": 1.0 }));
    assert!(matches!(&host, HostValue::Object(map) if !map.borrow().contains_key("label")));
}

#[test]
fn test_generic_fields_use_the_call_site_arguments() {
    let b = Value::record(
        "Box",
        vec![
            ("item", Value::string("payload")),
            ("label", Value::record(DEFINED, vec![(WRAPPED_FIELD, Value::string("l"))])),
        ],
    );
    let host = out(&D::automatic("Box", vec![D::String]), &b);
    assert_eq!(host.get("item"), HostValue::string("payload"));

    let opaque = out(&D::automatic("Box", vec![]), &b);
    assert!(matches!(opaque.get("item"), HostValue::Opaque(_)));
}

#[test]
fn test_unregistered_values_pass_through() {
    let foreign = HostValue::from(json!({ "$tag": "Triangle" }));
    let v = back(&D::automatic("Shape", vec![]), &foreign);
    assert!(matches!(&v, Value::Host(h) if h.same(&foreign)));

    let untagged = HostValue::from(json!({ "w": 1 }));
    assert!(matches!(back(&D::automatic("Shape", vec![]), &untagged), Value::Host(_)));

    let stranger = Value::record("Stranger", vec![("x", Value::Int(1))]);
    assert!(matches!(out(&D::automatic("Shape", vec![]), &stranger), HostValue::Opaque(_)));
}

#[test]
fn test_discriminator_must_belong_to_the_declared_type() {
    let host = HostValue::from(json!({ "$tag": "Circle", "radius": 1 }));
    assert!(matches!(back(&D::automatic("Box", vec![]), &host), Value::Host(_)));
}

#[test]
fn test_first_registered_case_wins() {
    let mut registry = DispatchRegistry::new();
    registry.register(DispatchCase::new("First", "Same").field("a", D::Int));
    registry.register(DispatchCase::new("Second", "Same").field("b", D::Int));
    let codec = Codec::new(registry);
    let v = Value::record("Same", vec![("a", Value::Int(1)), ("b", Value::Int(2))]);
    for _ in 0..100 {
        let host = codec.value_to_host(&D::automatic("Second", vec![]), &v).unwrap();
        assert_eq!(host.to_json(), json!({ "$tag": "Same", "a": 1.0 }));
    }
}

// ─────────────────────────────────────────────────────────────────────
// Run-time import
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_import_curries_host_function() {
    let max = HostFunction::new(|args| {
        let a = args[0].as_number().unwrap_or(f64::NAN);
        let b = args[1].as_number().unwrap_or(f64::NAN);
        Ok(HostValue::Number(a.max(b)))
    });
    let f = codec()
        .import(&D::function(vec![D::Int, D::Int], D::Int), max)
        .unwrap();
    let partial = apply(&f, Value::Int(3)).unwrap();
    assert_eq!(apply(&partial, Value::Int(8)).unwrap().as_int().unwrap(), 8);
    assert_eq!(apply(&partial, Value::Int(1)).unwrap().as_int().unwrap(), 3);
}

#[test]
fn test_imported_action_calls_host_on_each_run() {
    let calls = Rc::new(Cell::new(0));
    let c = calls.clone();
    let now = HostFunction::new(move |_| {
        c.set(c.get() + 1);
        Ok(HostValue::Number(f64::from(c.get())))
    });
    let action = codec().import(&D::action(D::Int), now).unwrap();
    assert_eq!(calls.get(), 0);
    assert_eq!(run_action(&action).unwrap().as_int().unwrap(), 1);
    assert_eq!(run_action(&action).unwrap().as_int().unwrap(), 2);
}

#[test]
fn test_imported_function_returning_action_defers_the_call() {
    let calls = Rc::new(Cell::new(0));
    let c = calls.clone();
    let log = HostFunction::new(move |_| {
        c.set(c.get() + 1);
        Ok(HostValue::Undefined)
    });
    let f = codec()
        .import(&D::function(vec![D::String], D::action(D::Ptr)), log)
        .unwrap();
    let action = apply_all(&f, [Value::string("hello")]).unwrap();
    assert_eq!(calls.get(), 0);
    run_action(&action).unwrap();
    run_action(&action).unwrap();
    assert_eq!(calls.get(), 2);
}

#[test]
fn test_imported_constant_is_called_once() {
    let calls = Rc::new(Cell::new(0));
    let c = calls.clone();
    let pi = HostFunction::new(move |_| {
        c.set(c.get() + 1);
        Ok(HostValue::Number(std::f64::consts::PI))
    });
    let v = codec().import(&D::Double, pi).unwrap();
    assert_eq!(calls.get(), 0);
    force(&v).unwrap();
    force(&v).unwrap();
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_host_errors_propagate() {
    let broken = HostFunction::new(|_| Err(RuntimeError::HostException("TypeError".into())));
    let f = codec().import(&D::function(vec![D::Int], D::Int), broken).unwrap();
    assert_eq!(
        apply(&f, Value::Int(1)).unwrap_err(),
        RuntimeError::HostException("TypeError".into())
    );
}

#[test]
fn test_monad_values_cross_as_actions() {
    let host = out(&D::action(D::String), &ret(Value::string("ok")));
    assert_eq!(call(&host, &[]), HostValue::string("ok"));
}
