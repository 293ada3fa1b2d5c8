//! Dispatch tables for user-declared record and sum types.
//!
//! The generator appends one case per constructor as declarations are
//! compiled; the codec consults the tables when a descriptor names a user
//! type. Cases are tried in registration order and the first match wins.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::TypeDescriptor;

/// Name of the host property carrying the source-level constructor name of
/// an encoded record.
pub const DISCRIMINATOR: &str = "$tag";

/// One declared constructor field and how it crosses the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseField {
    pub name: String,
    /// May contain generic slots (`["unknown", i]`) referring to the owning
    /// type's parameters.
    pub descriptor: TypeDescriptor,
}

/// Conversion logic for one constructor of a user type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchCase {
    pub type_name: String,
    pub constructor: String,
    pub fields: Vec<CaseField>,
}

impl DispatchCase {
    pub fn new(type_name: impl Into<String>, constructor: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            constructor: constructor.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, descriptor: TypeDescriptor) -> Self {
        self.fields.push(CaseField {
            name: name.into(),
            descriptor,
        });
        self
    }
}

/// An append-only ordered table with name indexes over its cases.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<DispatchCase>", into = "Vec<DispatchCase>")]
pub struct DispatchTable {
    cases: Vec<DispatchCase>,
    by_constructor: HashMap<String, Vec<usize>>,
    by_type: HashMap<String, Vec<usize>>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, case: DispatchCase) {
        let idx = self.cases.len();
        self.by_constructor
            .entry(case.constructor.clone())
            .or_default()
            .push(idx);
        self.by_type.entry(case.type_name.clone()).or_default().push(idx);
        self.cases.push(case);
    }

    /// Cases in registration order.
    pub fn cases(&self) -> &[DispatchCase] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Every case for a constructor name, earliest registration first.
    pub fn by_constructor(&self, constructor: &str) -> impl Iterator<Item = &DispatchCase> {
        self.by_constructor
            .get(constructor)
            .into_iter()
            .flatten()
            .map(move |&i| &self.cases[i])
    }

    /// Every case belonging to a type name, earliest registration first.
    pub fn by_type(&self, type_name: &str) -> impl Iterator<Item = &DispatchCase> {
        self.by_type
            .get(type_name)
            .into_iter()
            .flatten()
            .map(move |&i| &self.cases[i])
    }
}

impl From<Vec<DispatchCase>> for DispatchTable {
    fn from(cases: Vec<DispatchCase>) -> Self {
        let mut table = DispatchTable::new();
        for case in cases {
            table.push(case);
        }
        table
    }
}

impl From<DispatchTable> for Vec<DispatchCase> {
    fn from(table: DispatchTable) -> Self {
        table.cases
    }
}

/// The pair of dispatch tables handed to the codec.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchRegistry {
    /// Value → host cases, matched on the value's constructor.
    pub outward: DispatchTable,
    /// Host → value cases, matched on the declared type name and the host
    /// value's discriminator.
    pub inward: DispatchTable,
}

impl DispatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one constructor's case to both tables.
    pub fn register(&mut self, case: DispatchCase) {
        self.outward.push(case.clone());
        self.inward.push(case);
    }

    /// The first outward case whose constructor test matches.
    pub fn encoder_for(&self, constructor: &str) -> Option<&DispatchCase> {
        self.outward.by_constructor(constructor).next()
    }

    /// The first inward case for `type_name` whose discriminator matches.
    pub fn decoder_for(&self, type_name: &str, discriminator: &str) -> Option<&DispatchCase> {
        self.inward
            .by_type(type_name)
            .find(|case| case.constructor == discriminator)
    }

    pub fn len(&self) -> usize {
        self.outward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outward.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(type_name: &str) -> DispatchCase {
        DispatchCase::new(type_name, "Point")
            .field("x", TypeDescriptor::Double)
            .field("y", TypeDescriptor::Double)
    }

    #[test]
    fn first_registered_encoder_wins() {
        let mut reg = DispatchRegistry::new();
        reg.register(point("Geo"));
        reg.register(point("Screen"));
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.encoder_for("Point").unwrap().type_name, "Geo");
        assert!(reg.encoder_for("Line").is_none());
    }

    #[test]
    fn decoder_requires_type_and_discriminator() {
        let mut reg = DispatchRegistry::new();
        reg.register(point("Geo"));
        reg.register(DispatchCase::new("Geo", "Origin"));
        reg.register(point("Screen"));
        assert_eq!(reg.decoder_for("Screen", "Point").unwrap().type_name, "Screen");
        assert_eq!(reg.decoder_for("Geo", "Origin").unwrap().fields.len(), 0);
        assert!(reg.decoder_for("Screen", "Origin").is_none());
        assert!(reg.decoder_for("Other", "Point").is_none());
    }

    #[test]
    fn tables_serialize_as_plain_case_lists() {
        let mut reg = DispatchRegistry::new();
        reg.register(point("Geo"));
        reg.register(point("Screen"));
        let json = serde_json::to_value(&reg).unwrap();
        assert_eq!(json["outward"].as_array().unwrap().len(), 2);
        assert_eq!(json["inward"][1]["type_name"], "Screen");
        assert_eq!(json["outward"][0]["fields"][0]["descriptor"], serde_json::json!(["double"]));

        let back: DispatchRegistry = serde_json::from_value(json).unwrap();
        assert_eq!(back.encoder_for("Point").unwrap().type_name, "Geo");
        assert_eq!(back.decoder_for("Screen", "Point").unwrap().fields.len(), 2);
    }

    #[test]
    fn type_index_keeps_declaration_order() {
        let table: DispatchTable = vec![
            DispatchCase::new("Shape", "Circle"),
            DispatchCase::new("Color", "Red"),
            DispatchCase::new("Shape", "Square"),
        ]
        .into();
        let names: Vec<_> = table.by_type("Shape").map(|c| c.constructor.as_str()).collect();
        assert_eq!(names, ["Circle", "Square"]);
    }
}
