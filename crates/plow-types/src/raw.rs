//! Unresolved type references as the frontend hands them over.

use crate::types::PrimitiveKind;
use std::fmt;

/// A type reference that has not been resolved against the registry yet.
///
/// `Variable` names a type parameter of the declaration the reference
/// appears in.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RawTypeRef {
    Primitive(PrimitiveKind),
    Null,
    Named {
        name: String,
        arguments: Vec<RawTypeRef>,
    },
    Array(Box<RawTypeRef>),
    Variable(String),
    Intersection(Vec<RawTypeRef>),
}

impl RawTypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        RawTypeRef::Named {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, arguments: Vec<RawTypeRef>) -> Self {
        RawTypeRef::Named {
            name: name.into(),
            arguments,
        }
    }

    pub fn var(name: impl Into<String>) -> Self {
        RawTypeRef::Variable(name.into())
    }

    pub fn array_of(component: RawTypeRef) -> Self {
        RawTypeRef::Array(Box::new(component))
    }

    pub fn object() -> Self {
        RawTypeRef::named("java.lang.Object")
    }

    pub fn string() -> Self {
        RawTypeRef::named("java.lang.String")
    }

    pub fn void() -> Self {
        RawTypeRef::Primitive(PrimitiveKind::Void)
    }
}

/// Parses the shorthand used by tests and tools: primitive names, `null`,
/// qualified names and trailing `[]` for arrays.
impl From<&str> for RawTypeRef {
    fn from(text: &str) -> Self {
        let text = text.trim();
        if let Some(component) = text.strip_suffix("[]") {
            return RawTypeRef::array_of(RawTypeRef::from(component));
        }
        if text == "null" {
            return RawTypeRef::Null;
        }
        match PrimitiveKind::from_name(text) {
            Some(kind) => RawTypeRef::Primitive(kind),
            None => RawTypeRef::named(text),
        }
    }
}

impl fmt::Display for RawTypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawTypeRef::Primitive(kind) => f.write_str(kind.name()),
            RawTypeRef::Null => f.write_str("null"),
            RawTypeRef::Named { name, arguments } => {
                f.write_str(name)?;
                if !arguments.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in arguments.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            RawTypeRef::Array(component) => write!(f, "{component}[]"),
            RawTypeRef::Variable(name) => f.write_str(name),
            RawTypeRef::Intersection(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" & ")?;
                    }
                    write!(f, "{part}")?;
                }
                Ok(())
            }
        }
    }
}
