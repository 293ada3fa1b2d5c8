//! lazyffi binding generator as a WASM module for browser tooling.
//!
//! # Usage (JavaScript)
//!
//! ```js
//! import init, { generate, descriptor_of } from 'lazyffi-wasm';
//!
//! await init();
//!
//! const result = JSON.parse(generate(interfaceJson, '{"lint":"deny"}'));
//! // { success: true, module: "Main", code: "// Generated by lazyffi ...", digest: "9f2c...", ... }
//!
//! descriptor_of('"Int -> IO String"');
//! // '["function",["int"],["action",["string"]]]'
//! ```

use lazyffi_compiler::FfiConfig;
use lazyffi_types::{Interface, TypeExpr};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// A failure that never reached the compiler.
#[derive(Serialize)]
struct InputError {
    success: bool,
    message: String,
}

fn input_error(message: impl Into<String>) -> String {
    let error = InputError {
        success: false,
        message: message.into(),
    };
    serde_json::to_string(&error).unwrap_or_else(|_| r#"{"success":false}"#.to_string())
}

/// Generate host bindings for an interface.
///
/// Both arguments are JSON documents; an empty configuration gives the
/// defaults. Returns a JSON `CompileResult`:
/// ```json
/// {
///   "success": true,
///   "module": "Main",
///   "code": "...",
///   "digest": "...",
///   "bindings": [{ "name": "now", "js_name": "now", "arity": 0, ... }],
///   "registry": { "outward": [...], "inward": [...] },
///   "errors": { "errors": [], "warnings": [], "total_errors": 0, "total_warnings": 0 }
/// }
/// ```
///
/// Malformed input gives `{ "success": false, "message": "..." }`.
#[wasm_bindgen]
pub fn generate(interface_json: &str, config_json: &str) -> String {
    let result = match lazyffi_compiler::compile_json(interface_json, config_json) {
        Ok(result) => result,
        Err(e) => return input_error(format!("invalid input: {e}")),
    };
    serde_json::to_string(&result).unwrap_or_else(|e| {
        format!(
            r#"{{"success":false,"code":null,"errors":{{"errors":[{{"message":"Serialization error: {}"}}],"warnings":[],"total_errors":1,"total_warnings":0}}}}"#,
            e
        )
    })
}

/// [`generate`] over JavaScript objects instead of JSON text.
///
/// `config` may be `undefined` or `null` for the defaults.
#[wasm_bindgen(js_name = generateObject)]
pub fn generate_object(interface: JsValue, config: JsValue) -> Result<JsValue, JsError> {
    let interface: Interface = serde_wasm_bindgen::from_value(interface)?;
    let config: FfiConfig = if config.is_undefined() || config.is_null() {
        FfiConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config)?
    };
    let result = lazyffi_compiler::compile(&interface, &config);
    Ok(serde_wasm_bindgen::to_value(&result)?)
}

/// Check an interface without generating code.
///
/// Returns a JSON `CompileErrors`.
#[wasm_bindgen]
pub fn check(interface_json: &str) -> String {
    let interface = match Interface::from_json(interface_json) {
        Ok(interface) => interface,
        Err(e) => return input_error(format!("invalid interface: {e}")),
    };
    let errors = lazyffi_compiler::check(&interface);
    serde_json::to_string(&errors).unwrap_or_else(|e| {
        format!(
            r#"{{"errors":[{{"message":"Serialization error: {}"}}],"warnings":[],"total_errors":1,"total_warnings":0}}"#,
            e
        )
    })
}

/// The literal descriptor of a builtin-only type.
///
/// `type_json` is a JSON string holding the type's surface syntax, e.g.
/// `"\"[Int] -> IO ()\""`. Returns the descriptor literal, or an error
/// object with `success: false`.
#[wasm_bindgen]
pub fn descriptor_of(type_json: &str) -> String {
    let ty: TypeExpr = match serde_json::from_str(type_json) {
        Ok(ty) => ty,
        Err(e) => return input_error(format!("invalid type: {e}")),
    };
    match lazyffi_compiler::descriptor_of(&ty) {
        Ok(descriptor) => descriptor.to_literal(),
        Err(e) => input_error(format!("{}: {e}", e.code())),
    }
}

/// Return the generator version string.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
