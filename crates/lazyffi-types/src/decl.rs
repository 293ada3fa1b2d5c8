//! Declarations consumed by the binding generator.
//!
//! An [`Interface`] is the slice of a compiled module that touches the host
//! boundary: the data types whose values may cross it and the foreign
//! imports with their call templates. Types are written in the source
//! language's surface syntax and parsed into [`TypeExpr`]:
//!
//! ```text
//! Int -> [String] -> IO (Maybe (Int, Bool))
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ══════════════════════════════════════════════════════════════════════════════
// Interface
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Interface {
    #[serde(default)]
    pub module: String,
    #[serde(default)]
    pub data: Vec<DataDecl>,
    #[serde(default)]
    pub foreign: Vec<ForeignImport>,
}

impl Interface {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// How a data type's values are marshalled across the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Marshal {
    /// Derived by the generator from the declaration.
    #[default]
    Automatic,
    /// Explicitly marked for marshalling by the declaring module.
    User,
}

/// `data Name params = Con1 { f: T } | Con2 { ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataDecl {
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
    pub constructors: Vec<ConstructorDecl>,
    #[serde(default)]
    pub marshal: Marshal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorDecl {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
}

/// `foreign import "template" name :: type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignImport {
    pub name: String,
    pub template: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
}

// ══════════════════════════════════════════════════════════════════════════════
// Type expressions
// ══════════════════════════════════════════════════════════════════════════════

/// A source-level type. Serialized as its surface syntax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeExpr {
    /// A type constructor applied to zero or more arguments: `Maybe Int`.
    Con { name: String, args: Vec<TypeExpr> },
    /// A type variable: `a`.
    Var(String),
    /// `a -> b`
    Fun(Box<TypeExpr>, Box<TypeExpr>),
    /// `[a]`
    List(Box<TypeExpr>),
    /// `(a, b)`; the empty tuple is unit `()`.
    Tuple(Vec<TypeExpr>),
}

impl TypeExpr {
    pub fn con(name: impl Into<String>, args: Vec<TypeExpr>) -> Self {
        Self::Con {
            name: name.into(),
            args,
        }
    }

    pub fn var(name: impl Into<String>) -> Self {
        Self::Var(name.into())
    }

    pub fn fun(from: TypeExpr, to: TypeExpr) -> Self {
        Self::Fun(Box::new(from), Box::new(to))
    }

    pub fn list(elem: TypeExpr) -> Self {
        Self::List(Box::new(elem))
    }

    pub fn unit() -> Self {
        Self::Tuple(Vec::new())
    }

    /// Split `a -> b -> c` into `([a, b], c)`.
    pub fn uncurry(&self) -> (Vec<&TypeExpr>, &TypeExpr) {
        let mut args = Vec::new();
        let mut cur = self;
        while let Self::Fun(from, to) = cur {
            args.push(from.as_ref());
            cur = to;
        }
        (args, cur)
    }

    /// Every type variable mentioned, in first-occurrence order.
    pub fn free_vars(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_vars(&mut out);
        out
    }

    fn collect_vars<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Var(v) => {
                if !out.contains(&v.as_str()) {
                    out.push(v);
                }
            }
            Self::Con { args, .. } | Self::Tuple(args) => {
                for a in args {
                    a.collect_vars(out);
                }
            }
            Self::Fun(a, b) => {
                a.collect_vars(out);
                b.collect_vars(out);
            }
            Self::List(a) => a.collect_vars(out),
        }
    }

    fn is_atomic(&self) -> bool {
        match self {
            Self::Con { args, .. } => args.is_empty(),
            Self::Var(_) | Self::List(_) | Self::Tuple(_) => true,
            Self::Fun(..) => false,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Var(v) => write!(f, "{v}"),
            Self::Con { name, args } => {
                write!(f, "{name}")?;
                for a in args {
                    if a.is_atomic() {
                        write!(f, " {a}")?;
                    } else {
                        write!(f, " ({a})")?;
                    }
                }
                Ok(())
            }
            Self::Fun(from, to) => {
                if matches!(from.as_ref(), Self::Fun(..)) {
                    write!(f, "({from}) -> {to}")
                } else {
                    write!(f, "{from} -> {to}")
                }
            }
            Self::List(elem) => write!(f, "[{elem}]"),
            Self::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<TypeExpr> for String {
    fn from(ty: TypeExpr) -> Self {
        ty.to_string()
    }
}

impl TryFrom<String> for TypeExpr {
    type Error = TypeSyntaxError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        text.parse()
    }
}

/// A malformed type in a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at offset {offset}")]
pub struct TypeSyntaxError {
    pub message: String,
    pub offset: usize,
}

impl FromStr for TypeExpr {
    type Err = TypeSyntaxError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut p = TypeParser { src: text, pos: 0 };
        let ty = p.parse_type()?;
        p.skip_ws();
        if p.pos < text.len() {
            return Err(p.error("unexpected trailing input"));
        }
        Ok(ty)
    }
}

// ── Surface syntax parser ──

struct TypeParser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> TypeParser<'a> {
    fn error(&self, message: &str) -> TypeSyntaxError {
        TypeSyntaxError {
            message: message.to_string(),
            offset: self.pos,
        }
    }

    fn skip_ws(&mut self) {
        let rest = &self.src[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.src[self.pos..].chars().next()
    }

    fn eat(&mut self, s: &str) -> bool {
        self.skip_ws();
        if self.src[self.pos..].starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, s: &str) -> Result<(), TypeSyntaxError> {
        if self.eat(s) {
            Ok(())
        } else {
            Err(self.error(&format!("expected `{s}`")))
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        self.skip_ws();
        let rest = &self.src[self.pos..];
        let len = rest
            .char_indices()
            .find(|&(i, c)| {
                !(c.is_alphanumeric() || c == '_' || (i > 0 && (c == '\'' || c == '.')))
            })
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        if len == 0 || rest.starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }
        self.pos += len;
        Some(&rest[..len])
    }

    // type := btype ('->' type)?
    fn parse_type(&mut self) -> Result<TypeExpr, TypeSyntaxError> {
        let from = self.parse_btype()?;
        if self.eat("->") {
            let to = self.parse_type()?;
            return Ok(TypeExpr::fun(from, to));
        }
        Ok(from)
    }

    // btype := Con atype* | atype
    fn parse_btype(&mut self) -> Result<TypeExpr, TypeSyntaxError> {
        let head = self.parse_atype()?;
        let TypeExpr::Con { name, mut args } = head else {
            return Ok(head);
        };
        if !args.is_empty() {
            return Ok(TypeExpr::Con { name, args });
        }
        while self.starts_atype() {
            args.push(self.parse_atype()?);
        }
        Ok(TypeExpr::Con { name, args })
    }

    fn starts_atype(&mut self) -> bool {
        match self.peek() {
            Some('(') | Some('[') => true,
            Some(c) => c.is_alphabetic() || c == '_',
            None => false,
        }
    }

    fn parse_atype(&mut self) -> Result<TypeExpr, TypeSyntaxError> {
        if self.eat("(") {
            if self.eat(")") {
                return Ok(TypeExpr::unit());
            }
            let first = self.parse_type()?;
            if self.eat(")") {
                return Ok(first);
            }
            let mut items = vec![first];
            while self.eat(",") {
                items.push(self.parse_type()?);
            }
            self.expect(")")?;
            return Ok(TypeExpr::Tuple(items));
        }
        if self.eat("[") {
            let elem = self.parse_type()?;
            self.expect("]")?;
            return Ok(TypeExpr::list(elem));
        }
        let start = self.pos;
        match self.ident() {
            Some(name) if name.starts_with(char::is_uppercase) => Ok(TypeExpr::con(name, vec![])),
            Some(name) => Ok(TypeExpr::var(name)),
            None => {
                self.pos = start;
                Err(self.error("expected a type"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(s: &str) -> TypeExpr {
        s.parse().unwrap()
    }

    #[test]
    fn arrows_associate_right_and_application_binds_tighter() {
        assert_eq!(
            ty("Int -> Maybe a -> IO ()"),
            TypeExpr::fun(
                TypeExpr::con("Int", vec![]),
                TypeExpr::fun(
                    TypeExpr::con("Maybe", vec![TypeExpr::var("a")]),
                    TypeExpr::con("IO", vec![TypeExpr::unit()]),
                )
            )
        );
    }

    #[test]
    fn brackets_and_tuples() {
        assert_eq!(
            ty("[(Int, [Char])]"),
            TypeExpr::list(TypeExpr::Tuple(vec![
                TypeExpr::con("Int", vec![]),
                TypeExpr::list(TypeExpr::con("Char", vec![])),
            ]))
        );
        assert_eq!(ty("(Bool)"), TypeExpr::con("Bool", vec![]));
    }

    #[test]
    fn display_round_trips() {
        for src in [
            "Int",
            "(Int -> Bool) -> [a] -> IO (Maybe (Int, String))",
            "Either a (Ptr Element)",
            "()",
        ] {
            assert_eq!(ty(src).to_string(), src);
        }
    }

    #[test]
    fn uncurry_and_free_vars() {
        let t = ty("a -> (b -> a) -> [c] -> IO b");
        let (args, ret) = t.uncurry();
        assert_eq!(args.len(), 3);
        assert_eq!(ret.to_string(), "IO b");
        assert_eq!(t.free_vars(), ["a", "b", "c"]);
    }

    #[test]
    fn syntax_errors_report_offsets() {
        let err = "Int ->".parse::<TypeExpr>().unwrap_err();
        assert_eq!(err.offset, 6);
        assert!("(Int, Bool".parse::<TypeExpr>().is_err());
        assert!("Int ]".parse::<TypeExpr>().is_err());
    }

    #[test]
    fn interface_reads_from_json() {
        let iface = Interface::from_json(
            r#"{
                "module": "Geo",
                "data": [{
                    "name": "Point",
                    "params": ["a"],
                    "constructors": [{"name": "Point", "fields": [
                        {"name": "x", "type": "a"},
                        {"name": "y", "type": "a"}
                    ]}]
                }],
                "foreign": [{"name": "plot", "template": "canvas.plot(%1)", "type": "Point Double -> IO ()"}]
            }"#,
        )
        .unwrap();
        assert_eq!(iface.data[0].marshal, Marshal::Automatic);
        assert_eq!(iface.data[0].constructors[0].fields[1].ty, TypeExpr::var("a"));
        assert_eq!(iface.foreign[0].ty.to_string(), "Point Double -> IO ()");

        let bad = Interface::from_json(r#"{"foreign": [{"name": "f", "template": "", "type": "->"}]}"#);
        assert!(bad.is_err());
    }
}
