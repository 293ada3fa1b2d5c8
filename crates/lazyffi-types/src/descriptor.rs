//! The fundamental-type descriptor shared by the binding generator and the
//! run-time codec.
//!
//! A descriptor is a closed tagged value. Its wire shape is a JSON array
//! whose first element is the tag and whose remaining elements are the
//! payload:
//!
//! | tag | wire shape |
//! |---|---|
//! | `ptr` | `["ptr"]` |
//! | `action` | `["action", inner]` |
//! | `function` | `["function", arg1, …, argN, ret]` |
//! | `string` | `["string"]` |
//! | `list` | `["list", elem]` |
//! | `tuple` | `["tuple", slot1, …, slotN]` |
//! | `defined` | `["defined", inner]` |
//! | `nullable` | `["nullable", inner]` |
//! | `double` / `int` / `bool` | `["double"]` / `["int"]` / `["bool"]` |
//! | `automatic` / `user` | `["automatic", name, [generic…]]` |
//! | `unknown` | `["unknown"]`, or `["unknown", slot]` for a generic parameter |
//!
//! Generated code embeds descriptors as this JSON text, so the encoding is
//! part of the interoperability contract and must not drift.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, IgnoredAny, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// The fixed tag vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorTag {
    Ptr,
    Action,
    Function,
    String,
    List,
    Tuple,
    Defined,
    Nullable,
    Double,
    Int,
    Bool,
    Automatic,
    User,
    Unknown,
}

impl DescriptorTag {
    pub const ALL: [DescriptorTag; 14] = [
        Self::Ptr,
        Self::Action,
        Self::Function,
        Self::String,
        Self::List,
        Self::Tuple,
        Self::Defined,
        Self::Nullable,
        Self::Double,
        Self::Int,
        Self::Bool,
        Self::Automatic,
        Self::User,
        Self::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ptr => "ptr",
            Self::Action => "action",
            Self::Function => "function",
            Self::String => "string",
            Self::List => "list",
            Self::Tuple => "tuple",
            Self::Defined => "defined",
            Self::Nullable => "nullable",
            Self::Double => "double",
            Self::Int => "int",
            Self::Bool => "bool",
            Self::Automatic => "automatic",
            Self::User => "user",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DescriptorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("unknown descriptor tag `{0}`")]
    UnknownTag(String),
}

impl FromStr for DescriptorTag {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| DescriptorError::UnknownTag(s.to_string()))
    }
}

/// A user-defined record or sum type reference: its declared name and the
/// descriptors of its generic arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct UserType {
    pub name: String,
    pub generics: Vec<TypeDescriptor>,
}

/// The fundamental type of a value crossing the host boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    /// Opaque passthrough.
    Ptr,
    /// A deferred computation yielding the inner type when run.
    Action(Box<TypeDescriptor>),
    /// A curried function. A declared function with no arguments is
    /// representable but rejected wherever it is used.
    Function {
        args: Vec<TypeDescriptor>,
        ret: Box<TypeDescriptor>,
    },
    String,
    List(Box<TypeDescriptor>),
    Tuple(Vec<TypeDescriptor>),
    /// Present vs. host `undefined`.
    Defined(Box<TypeDescriptor>),
    /// Present vs. host `null`.
    Nullable(Box<TypeDescriptor>),
    Double,
    Int,
    Bool,
    /// A declared type whose marshalling is derived by the generator.
    Automatic(UserType),
    /// A declared type explicitly marked for user marshalling.
    User(UserType),
    /// Passthrough; `Some(i)` names the i-th generic parameter of the
    /// enclosing user type.
    Unknown(Option<usize>),
}

impl TypeDescriptor {
    pub fn action(inner: TypeDescriptor) -> Self {
        Self::Action(Box::new(inner))
    }

    pub fn function(args: Vec<TypeDescriptor>, ret: TypeDescriptor) -> Self {
        Self::Function {
            args,
            ret: Box::new(ret),
        }
    }

    pub fn list(elem: TypeDescriptor) -> Self {
        Self::List(Box::new(elem))
    }

    pub fn defined(inner: TypeDescriptor) -> Self {
        Self::Defined(Box::new(inner))
    }

    pub fn nullable(inner: TypeDescriptor) -> Self {
        Self::Nullable(Box::new(inner))
    }

    pub fn automatic(name: impl Into<String>, generics: Vec<TypeDescriptor>) -> Self {
        Self::Automatic(UserType {
            name: name.into(),
            generics,
        })
    }

    pub fn user(name: impl Into<String>, generics: Vec<TypeDescriptor>) -> Self {
        Self::User(UserType {
            name: name.into(),
            generics,
        })
    }

    /// Reference to generic parameter `slot` of the enclosing user type.
    pub fn generic(slot: usize) -> Self {
        Self::Unknown(Some(slot))
    }

    pub fn tag(&self) -> DescriptorTag {
        match self {
            Self::Ptr => DescriptorTag::Ptr,
            Self::Action(_) => DescriptorTag::Action,
            Self::Function { .. } => DescriptorTag::Function,
            Self::String => DescriptorTag::String,
            Self::List(_) => DescriptorTag::List,
            Self::Tuple(_) => DescriptorTag::Tuple,
            Self::Defined(_) => DescriptorTag::Defined,
            Self::Nullable(_) => DescriptorTag::Nullable,
            Self::Double => DescriptorTag::Double,
            Self::Int => DescriptorTag::Int,
            Self::Bool => DescriptorTag::Bool,
            Self::Automatic(_) => DescriptorTag::Automatic,
            Self::User(_) => DescriptorTag::User,
            Self::Unknown(_) => DescriptorTag::Unknown,
        }
    }

    pub fn user_type(&self) -> Option<&UserType> {
        match self {
            Self::Automatic(u) | Self::User(u) => Some(u),
            _ => None,
        }
    }

    /// Whether values of this type cross the boundary unconverted.
    pub fn is_passthrough(&self) -> bool {
        matches!(self, Self::Ptr | Self::Unknown(_))
    }

    /// Substitute generic-parameter slots with the given arguments.
    ///
    /// Slots without a corresponding argument stay as they are and therefore
    /// remain passthrough.
    pub fn instantiate(&self, generics: &[TypeDescriptor]) -> TypeDescriptor {
        let inst = |d: &TypeDescriptor| d.instantiate(generics);
        let inst_box = |d: &TypeDescriptor| Box::new(d.instantiate(generics));
        match self {
            Self::Unknown(Some(slot)) => generics.get(*slot).cloned().unwrap_or_else(|| self.clone()),
            Self::Ptr | Self::String | Self::Double | Self::Int | Self::Bool | Self::Unknown(None) => {
                self.clone()
            }
            Self::Action(d) => Self::Action(inst_box(d)),
            Self::List(d) => Self::List(inst_box(d)),
            Self::Defined(d) => Self::Defined(inst_box(d)),
            Self::Nullable(d) => Self::Nullable(inst_box(d)),
            Self::Function { args, ret } => Self::Function {
                args: args.iter().map(inst).collect(),
                ret: inst_box(ret),
            },
            Self::Tuple(ds) => Self::Tuple(ds.iter().map(inst).collect()),
            Self::Automatic(u) => Self::Automatic(UserType {
                name: u.name.clone(),
                generics: u.generics.iter().map(inst).collect(),
            }),
            Self::User(u) => Self::User(UserType {
                name: u.name.clone(),
                generics: u.generics.iter().map(inst).collect(),
            }),
        }
    }

    /// The first function descriptor anywhere inside `self` that declares no
    /// arguments.
    pub fn find_nullary_function(&self) -> Option<&TypeDescriptor> {
        match self {
            Self::Function { args, .. } if args.is_empty() => Some(self),
            Self::Function { args, ret } => args
                .iter()
                .find_map(TypeDescriptor::find_nullary_function)
                .or_else(|| ret.find_nullary_function()),
            Self::Action(d) | Self::List(d) | Self::Defined(d) | Self::Nullable(d) => {
                d.find_nullary_function()
            }
            Self::Tuple(ds) => ds.iter().find_map(TypeDescriptor::find_nullary_function),
            Self::Automatic(u) | Self::User(u) => {
                u.generics.iter().find_map(TypeDescriptor::find_nullary_function)
            }
            _ => None,
        }
    }

    /// Encode as the literal embedded in generated host code.
    pub fn to_literal(&self) -> String {
        let mut out = String::new();
        self.write_literal(&mut out);
        out
    }

    fn write_literal(&self, out: &mut String) {
        out.push_str("[\"");
        out.push_str(self.tag().as_str());
        out.push('"');
        let nested = |d: &TypeDescriptor, out: &mut String| {
            out.push(',');
            d.write_literal(out);
        };
        match self {
            Self::Ptr | Self::String | Self::Double | Self::Int | Self::Bool | Self::Unknown(None) => {}
            Self::Unknown(Some(slot)) => out.push_str(&format!(",{slot}")),
            Self::Action(d) | Self::List(d) | Self::Defined(d) | Self::Nullable(d) => nested(d, out),
            Self::Function { args, ret } => {
                for a in args {
                    nested(a, out);
                }
                nested(ret, out);
            }
            Self::Tuple(ds) => {
                for d in ds {
                    nested(d, out);
                }
            }
            Self::Automatic(u) | Self::User(u) => {
                out.push(',');
                out.push_str(&serde_json::Value::String(u.name.clone()).to_string());
                out.push_str(",[");
                for (i, g) in u.generics.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    g.write_literal(out);
                }
                out.push(']');
            }
        }
        out.push(']');
    }

    /// Decode a literal produced by [`TypeDescriptor::to_literal`] (or any
    /// independently generated binding using the same wire shape).
    pub fn from_literal(text: &str) -> Result<TypeDescriptor, serde_json::Error> {
        serde_json::from_str(text)
    }

    fn wire_len(&self) -> usize {
        match self {
            Self::Ptr | Self::String | Self::Double | Self::Int | Self::Bool | Self::Unknown(None) => 1,
            Self::Unknown(Some(_))
            | Self::Action(_)
            | Self::List(_)
            | Self::Defined(_)
            | Self::Nullable(_) => 2,
            Self::Function { args, .. } => args.len() + 2,
            Self::Tuple(ds) => ds.len() + 1,
            Self::Automatic(_) | Self::User(_) => 3,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ptr => write!(f, "Ptr"),
            Self::String => write!(f, "String"),
            Self::Double => write!(f, "Double"),
            Self::Int => write!(f, "Int"),
            Self::Bool => write!(f, "Bool"),
            Self::Unknown(None) => write!(f, "?"),
            Self::Unknown(Some(slot)) => write!(f, "?{slot}"),
            Self::Action(d) => write!(f, "IO ({d})"),
            Self::List(d) => write!(f, "[{d}]"),
            Self::Defined(d) => write!(f, "Defined ({d})"),
            Self::Nullable(d) => write!(f, "Nullable ({d})"),
            Self::Tuple(ds) => {
                write!(f, "(")?;
                for (i, d) in ds.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{d}")?;
                }
                write!(f, ")")
            }
            Self::Function { args, ret } => {
                if args.is_empty() {
                    return write!(f, "() -> {ret}");
                }
                for a in args {
                    write!(f, "({a}) -> ")?;
                }
                write!(f, "{ret}")
            }
            Self::Automatic(u) | Self::User(u) => {
                write!(f, "{}", u.name)?;
                for g in &u.generics {
                    write!(f, " ({g})")?;
                }
                Ok(())
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Wire format
// ══════════════════════════════════════════════════════════════════════════════

impl Serialize for TypeDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.wire_len()))?;
        seq.serialize_element(self.tag().as_str())?;
        match self {
            Self::Ptr | Self::String | Self::Double | Self::Int | Self::Bool | Self::Unknown(None) => {}
            Self::Unknown(Some(slot)) => seq.serialize_element(slot)?,
            Self::Action(d) | Self::List(d) | Self::Defined(d) | Self::Nullable(d) => {
                seq.serialize_element(d.as_ref())?
            }
            Self::Function { args, ret } => {
                for a in args {
                    seq.serialize_element(a)?;
                }
                seq.serialize_element(ret.as_ref())?;
            }
            Self::Tuple(ds) => {
                for d in ds {
                    seq.serialize_element(d)?;
                }
            }
            Self::Automatic(u) | Self::User(u) => {
                seq.serialize_element(&u.name)?;
                seq.serialize_element(&u.generics)?;
            }
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for TypeDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(DescriptorVisitor)
    }
}

struct DescriptorVisitor;

fn required<'de, A, T>(seq: &mut A, index: usize, what: &'static str) -> Result<T, A::Error>
where
    A: SeqAccess<'de>,
    T: Deserialize<'de>,
{
    seq.next_element()?
        .ok_or_else(|| de::Error::invalid_length(index, &what))
}

fn remaining<'de, A: SeqAccess<'de>>(seq: &mut A) -> Result<Vec<TypeDescriptor>, A::Error> {
    let mut out = Vec::new();
    while let Some(d) = seq.next_element()? {
        out.push(d);
    }
    Ok(out)
}

impl<'de> Visitor<'de> for DescriptorVisitor {
    type Value = TypeDescriptor;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a tagged type descriptor array such as [\"list\", [\"int\"]]")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<TypeDescriptor, A::Error> {
        let tag: String = required(&mut seq, 0, "a descriptor tag")?;
        let tag: DescriptorTag = tag.parse().map_err(de::Error::custom)?;
        let descriptor = match tag {
            DescriptorTag::Ptr => TypeDescriptor::Ptr,
            DescriptorTag::String => TypeDescriptor::String,
            DescriptorTag::Double => TypeDescriptor::Double,
            DescriptorTag::Int => TypeDescriptor::Int,
            DescriptorTag::Bool => TypeDescriptor::Bool,
            DescriptorTag::Action => {
                TypeDescriptor::action(required(&mut seq, 1, "an action result descriptor")?)
            }
            DescriptorTag::List => TypeDescriptor::list(required(&mut seq, 1, "an element descriptor")?),
            DescriptorTag::Defined => {
                TypeDescriptor::defined(required(&mut seq, 1, "a wrapped descriptor")?)
            }
            DescriptorTag::Nullable => {
                TypeDescriptor::nullable(required(&mut seq, 1, "a wrapped descriptor")?)
            }
            DescriptorTag::Function => {
                let mut all = remaining(&mut seq)?;
                let ret = all
                    .pop()
                    .ok_or_else(|| de::Error::invalid_length(1, &"a return descriptor"))?;
                TypeDescriptor::function(all, ret)
            }
            DescriptorTag::Tuple => TypeDescriptor::Tuple(remaining(&mut seq)?),
            DescriptorTag::Automatic | DescriptorTag::User => {
                let name: String = required(&mut seq, 1, "a type name")?;
                let generics: Vec<TypeDescriptor> = seq.next_element()?.unwrap_or_default();
                let user = UserType { name, generics };
                if tag == DescriptorTag::Automatic {
                    TypeDescriptor::Automatic(user)
                } else {
                    TypeDescriptor::User(user)
                }
            }
            DescriptorTag::Unknown => TypeDescriptor::Unknown(seq.next_element()?),
        };
        if seq.next_element::<IgnoredAny>()?.is_some() {
            return Err(de::Error::custom(format!(
                "too many elements in `{tag}` descriptor"
            )));
        }
        Ok(descriptor)
    }
}
