//! Declarations registered by the frontend.
//!
//! A declaration is the unresolved shape of a class, interface or enum. The
//! registry resolves its references lazily, the first time a descriptor that
//! depends on them is requested.

use crate::method::MethodFlags;
use crate::raw::RawTypeRef;
use crate::types::{TypeFlags, TypeKind};
use serde::Serialize;

pub const CONSTRUCTOR_NAME: &str = "$ctor";
/// Synthetic static initializer produced by initialization sequencing.
pub const CLINIT_NAME: &str = "$clinit";
/// Synthetic instance initializer produced by initialization sequencing.
pub const INIT_NAME: &str = "$init";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Package,
    Private,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParameter {
    pub name: String,
    /// `None` means `java.lang.Object`.
    pub bound: Option<RawTypeRef>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodSignature {
    pub name: String,
    pub parameters: Vec<RawTypeRef>,
    pub return_type: RawTypeRef,
    pub visibility: Visibility,
    pub flags: MethodFlags,
}

impl MethodSignature {
    /// A public `void` method without parameters.
    pub fn new(name: impl Into<String>) -> Self {
        MethodSignature {
            name: name.into(),
            parameters: Vec::new(),
            return_type: RawTypeRef::void(),
            visibility: Visibility::Public,
            flags: MethodFlags::empty(),
        }
    }

    /// Constructors are methods named `$ctor`.
    pub fn constructor() -> Self {
        MethodSignature::new(CONSTRUCTOR_NAME).flags(MethodFlags::CONSTRUCTOR)
    }

    pub fn param(mut self, parameter: impl Into<RawTypeRef>) -> Self {
        self.parameters.push(parameter.into());
        self
    }

    pub fn returns(mut self, return_type: impl Into<RawTypeRef>) -> Self {
        self.return_type = return_type.into();
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn flags(mut self, flags: MethodFlags) -> Self {
        self.flags |= flags;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSignature {
    pub name: String,
    pub field_type: RawTypeRef,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
}

impl FieldSignature {
    pub fn new(name: impl Into<String>, field_type: impl Into<RawTypeRef>) -> Self {
        FieldSignature {
            name: name.into(),
            field_type: field_type.into(),
            visibility: Visibility::Public,
            is_static: false,
            is_final: false,
        }
    }

    pub fn make_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn make_final(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }
}

/// One declared class, interface or enum.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDeclaration {
    /// Fully qualified, dot separated.
    pub name: String,
    pub kind: TypeKind,
    pub flags: TypeFlags,
    pub type_parameters: Vec<TypeParameter>,
    /// `None` on a class means `java.lang.Object`.
    pub super_type: Option<RawTypeRef>,
    pub interfaces: Vec<RawTypeRef>,
    pub methods: Vec<MethodSignature>,
    pub fields: Vec<FieldSignature>,
}

impl TypeDeclaration {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        TypeDeclaration {
            name: name.into(),
            kind,
            flags: TypeFlags::empty(),
            type_parameters: Vec::new(),
            super_type: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Class)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Interface)
    }

    pub fn flags(mut self, flags: TypeFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn type_parameter(mut self, name: impl Into<String>) -> Self {
        self.type_parameters.push(TypeParameter {
            name: name.into(),
            bound: None,
        });
        self
    }

    pub fn bounded_type_parameter(
        mut self,
        name: impl Into<String>,
        bound: impl Into<RawTypeRef>,
    ) -> Self {
        self.type_parameters.push(TypeParameter {
            name: name.into(),
            bound: Some(bound.into()),
        });
        self
    }

    pub fn extends(mut self, super_type: impl Into<RawTypeRef>) -> Self {
        self.super_type = Some(super_type.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<RawTypeRef>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn method(mut self, method: MethodSignature) -> Self {
        self.methods.push(method);
        self
    }

    pub fn field(mut self, field: FieldSignature) -> Self {
        self.fields.push(field);
        self
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    pub(crate) fn find_type_parameter(&self, name: &str) -> Option<&TypeParameter> {
        self.type_parameters.iter().find(|p| p.name == name)
    }
}
