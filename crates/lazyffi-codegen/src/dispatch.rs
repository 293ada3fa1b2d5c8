//! Dispatch-case emission.
//!
//! Each registered case becomes one `__case(type, constructor, fields)` call.
//! The calls run in registration order, which is the order the prelude's
//! `__encodeUser` and `__decodeUser` try them.

use lazyffi_types::{DispatchCase, DispatchRegistry};

/// One `__case` call.
pub fn emit_case(case: &DispatchCase) -> String {
    let fields: Vec<String> = case
        .fields
        .iter()
        .map(|f| format!("[{},{}]", quote(&f.name), f.descriptor.to_literal()))
        .collect();
    format!(
        "__case({}, {}, [{}]);",
        quote(&case.type_name),
        quote(&case.constructor),
        fields.join(",")
    )
}

/// Every outward case, in registration order, one per line.
pub fn emit_cases(registry: &DispatchRegistry) -> String {
    let mut out = String::new();
    for case in registry.outward.cases() {
        log::debug!("emitting dispatch case {}.{}", case.type_name, case.constructor);
        out.push_str(&emit_case(case));
        out.push('\n');
    }
    out
}

/// A JSON string literal, which is also a valid host string literal.
pub(crate) fn quote(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}
