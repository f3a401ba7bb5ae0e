//! Type descriptors and their structural keys.
//!
//! A `TypeKey` is the structural identity of a type; the registry maps every
//! key to exactly one `TypeId`, so type equality anywhere in the pipeline is a
//! `u32` comparison.

use bitflags::bitflags;
use plow_common::Atom;
use serde::Serialize;
use smallvec::SmallVec;
use std::sync::{Arc, OnceLock};

/// Handle to a canonical `TypeDescriptor`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub u32);

impl TypeId {
    pub const VOID: TypeId = TypeId(0);
    pub const BOOLEAN: TypeId = TypeId(1);
    pub const BYTE: TypeId = TypeId(2);
    pub const SHORT: TypeId = TypeId(3);
    pub const CHAR: TypeId = TypeId(4);
    pub const INT: TypeId = TypeId(5);
    pub const LONG: TypeId = TypeId(6);
    pub const FLOAT: TypeId = TypeId(7);
    pub const DOUBLE: TypeId = TypeId(8);
    /// The type of the `null` literal before retyping.
    pub const NULL: TypeId = TypeId(9);
    pub const OBJECT: TypeId = TypeId(10);
    pub const STRING: TypeId = TypeId(11);

    /// First id handed out for types not registered by the registry itself.
    pub const FIRST_USER: u32 = 12;

    #[inline]
    pub fn is_primitive(self) -> bool {
        self.0 <= Self::DOUBLE.0
    }

    #[inline]
    pub fn is_void(self) -> bool {
        self == Self::VOID
    }
}

/// Primitive types of the source language.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum PrimitiveKind {
    Void,
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveKind {
    /// In `TypeId` order.
    pub const ALL: [PrimitiveKind; 9] = [
        PrimitiveKind::Void,
        PrimitiveKind::Boolean,
        PrimitiveKind::Byte,
        PrimitiveKind::Short,
        PrimitiveKind::Char,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Void => "void",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
        }
    }

    pub fn from_name(name: &str) -> Option<PrimitiveKind> {
        PrimitiveKind::ALL.iter().copied().find(|p| p.name() == name)
    }

    pub fn type_id(self) -> TypeId {
        TypeId(self as u32)
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, PrimitiveKind::Void | PrimitiveKind::Boolean)
    }
}

/// Structural identity of a type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKey {
    Primitive(PrimitiveKind),
    Null,
    /// A declared class, interface or enum. Empty `arguments` on a generic
    /// declaration is the raw type.
    Declared {
        name: Atom,
        arguments: SmallVec<[TypeId; 2]>,
    },
    Array(TypeId),
    TypeVariable {
        owner: Atom,
        name: Atom,
    },
    Intersection(SmallVec<[TypeId; 2]>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum TypeKind {
    Primitive,
    Null,
    Class,
    Interface,
    Enum,
    Array,
    TypeVariable,
    Intersection,
}

bitflags! {
    /// Flags copied from a type's declaration.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TypeFlags: u8 {
        const ABSTRACT = 1 << 0;
        /// Provided by the target language; never emitted as a declaration.
        const NATIVE = 1 << 1;
        const FINAL = 1 << 2;
        /// Members are exposed to the target language under their simple names.
        const JS_TYPE = 1 << 3;
        /// An enumeration erased to its underlying value before printing.
        const JS_ENUM = 1 << 4;
    }
}

/// Canonical descriptor of one type.
///
/// Descriptors are immutable once interned. Supertype information is
/// computed on first query and then cached in place.
#[derive(Debug)]
pub struct TypeDescriptor {
    pub id: TypeId,
    pub key: TypeKey,
    pub kind: TypeKind,
    pub flags: TypeFlags,
    pub(crate) super_type: OnceLock<Option<TypeId>>,
    pub(crate) interfaces: OnceLock<Arc<[TypeId]>>,
}

impl TypeDescriptor {
    pub(crate) fn new(id: TypeId, key: TypeKey, kind: TypeKind, flags: TypeFlags) -> Self {
        TypeDescriptor {
            id,
            key,
            kind,
            flags,
            super_type: OnceLock::new(),
            interfaces: OnceLock::new(),
        }
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, TypeKind::Class | TypeKind::Enum)
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    pub fn is_declared(&self) -> bool {
        matches!(self.key, TypeKey::Declared { .. })
    }

    pub fn is_primitive(&self) -> bool {
        self.kind == TypeKind::Primitive
    }

    pub fn is_array(&self) -> bool {
        self.kind == TypeKind::Array
    }

    pub fn is_type_variable(&self) -> bool {
        self.kind == TypeKind::TypeVariable
    }

    /// Anything a `null` can be assigned to.
    pub fn is_reference(&self) -> bool {
        !matches!(self.kind, TypeKind::Primitive | TypeKind::Null)
    }

    pub fn is_abstract(&self) -> bool {
        self.flags.contains(TypeFlags::ABSTRACT) || self.is_interface()
    }

    pub fn is_native(&self) -> bool {
        self.flags.contains(TypeFlags::NATIVE)
    }

    pub fn is_js_enum(&self) -> bool {
        self.flags.contains(TypeFlags::JS_ENUM)
    }

    /// Declared name atom for declared types.
    pub fn declared_name(&self) -> Option<Atom> {
        match self.key {
            TypeKey::Declared { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn type_arguments(&self) -> &[TypeId] {
        match &self.key {
            TypeKey::Declared { arguments, .. } => arguments,
            _ => &[],
        }
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeDescriptor {}
