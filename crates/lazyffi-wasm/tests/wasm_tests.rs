//! Tests for the JSON-in, JSON-out browser API.

use lazyffi_wasm::{check, descriptor_of, generate, version};
use serde_json::{json, Value};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn interface(template: &str) -> String {
    json!({
        "module": "Main",
        "data": [{
            "name": "Point",
            "constructors": [{ "name": "Point", "fields": [
                { "name": "x", "type": "Int" },
                { "name": "y", "type": "Int" }
            ] }]
        }],
        "foreign": [
            { "name": "now", "template": "Date.now()", "type": "IO Int" },
            { "name": "plot", "template": template, "type": "Point -> IO ()" }
        ]
    })
    .to_string()
}

fn parse(text: &str) -> Value {
    serde_json::from_str(text).unwrap()
}

// ─────────────────────────────────────────────────────────────────────
// generate
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_generate_success() {
    let result = parse(&generate(&interface("window.plot(%1)"), ""));
    assert_eq!(result["success"], json!(true));
    assert_eq!(result["module"], json!("Main"));
    assert!(result["code"].as_str().unwrap().contains("var plot = "));
    assert_eq!(result["digest"].as_str().unwrap().len(), 64);
    assert_eq!(result["bindings"][0]["arity"], json!(0));
    assert_eq!(result["errors"]["total_errors"], json!(0));
}

#[test]
fn test_generate_reports_diagnostics() {
    let result = parse(&generate(&interface("plotter.plot(%1)"), r#"{"lint":"deny"}"#));
    assert_eq!(result["success"], json!(false));
    assert_eq!(result["code"], Value::Null);
    assert_eq!(result["errors"]["errors"][0]["code"], json!(400));
    assert_eq!(result["errors"]["errors"][0]["binding"], json!("plot"));
}

#[test]
fn test_generate_rejects_malformed_input() {
    let result = parse(&generate("not json", ""));
    assert_eq!(result["success"], json!(false));
    assert!(result["message"].as_str().unwrap().starts_with("invalid input"));
}

#[test]
fn test_generate_is_deterministic() {
    let first = generate(&interface("window.plot(%1)"), "");
    for _ in 0..100 {
        assert_eq!(generate(&interface("window.plot(%1)"), ""), first);
    }
}

// ─────────────────────────────────────────────────────────────────────
// check / descriptor_of / version
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_check() {
    let errors = parse(&check(&interface("window.plot(%1)")));
    assert_eq!(errors["total_errors"], json!(0));

    let bad = interface("window.plot(%1)").replace("Point -> IO ()", "Pt -> IO ()");
    let errors = parse(&check(&bad));
    assert_eq!(errors["total_errors"], json!(1));
    assert_eq!(errors["errors"][0]["code"], json!(301));
}

#[test]
fn test_descriptor_of() {
    assert_eq!(
        descriptor_of(r#""[Int] -> IO ()""#),
        r#"["function",["list",["int"]],["action",["ptr"]]]"#
    );
    let error = parse(&descriptor_of(r#""Point""#));
    assert_eq!(error["success"], json!(false));
    assert_eq!(error["message"], json!("E301: unknown type `Point`"));
    let error = parse(&descriptor_of("Int"));
    assert!(error["message"].as_str().unwrap().starts_with("invalid type"));
}

#[test]
fn test_version() {
    assert_eq!(version(), env!("CARGO_PKG_VERSION"));
}

// ─────────────────────────────────────────────────────────────────────
// Object API (browser only)
// ─────────────────────────────────────────────────────────────────────

#[cfg(target_arch = "wasm32")]
mod browser {
    use lazyffi_wasm::generate_object;
    use wasm_bindgen::JsValue;
    use wasm_bindgen_test::wasm_bindgen_test;

    #[wasm_bindgen_test]
    fn generate_object_accepts_plain_objects() {
        let interface: serde_json::Value = serde_json::from_str(&super::interface("window.plot(%1)")).unwrap();
        let interface = serde_wasm_bindgen::to_value(&interface).unwrap();
        let result = generate_object(interface, JsValue::UNDEFINED).unwrap();
        let result: serde_json::Value = serde_wasm_bindgen::from_value(result).unwrap();
        assert_eq!(result["success"], serde_json::json!(true));
    }
}
