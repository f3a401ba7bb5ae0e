//! Type declarations, compilation units and the program.

use crate::error::ConstructionError;
use crate::member::{Field, Member, Method};
use plow_common::SourcePosition;
use plow_types::{RegistryError, TypeFlags, TypeId, TypeKind, TypeRegistry};
use std::sync::Arc;

// =============================================================================
// Type
// =============================================================================

/// A class, interface or enum declaration in the tree.
///
/// `super_type` and `interfaces` are what the tree says; passes compare them
/// against the registry before trusting inherited-member queries.
#[derive(Clone, Debug, PartialEq)]
pub struct Type {
    pub(crate) descriptor: TypeId,
    pub(crate) kind: TypeKind,
    pub(crate) flags: TypeFlags,
    pub(crate) super_type: Option<TypeId>,
    pub(crate) interfaces: Vec<TypeId>,
    pub(crate) members: Vec<Member>,
    pub(crate) position: SourcePosition,
}

impl Type {
    pub fn builder() -> TypeBuilder {
        TypeBuilder::default()
    }

    /// A builder seeded with the registry's view of `descriptor`.
    pub fn builder_for(
        registry: &TypeRegistry,
        descriptor: TypeId,
    ) -> Result<TypeBuilder, RegistryError> {
        let type_descriptor = registry.descriptor(descriptor)?;
        Ok(TypeBuilder {
            descriptor: Some(descriptor),
            kind: type_descriptor.kind,
            flags: type_descriptor.flags,
            super_type: registry.super_type(descriptor)?,
            interfaces: registry.interfaces(descriptor)?.to_vec(),
            members: Vec::new(),
            position: SourcePosition::NONE,
        })
    }

    pub fn descriptor(&self) -> TypeId {
        self.descriptor
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn flags(&self) -> TypeFlags {
        self.flags
    }

    pub fn super_type(&self) -> Option<TypeId> {
        self.super_type
    }

    pub fn interfaces(&self) -> &[TypeId] {
        &self.interfaces
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn position(&self) -> &SourcePosition {
        &self.position
    }

    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.members.iter().filter_map(Member::as_method)
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.members.iter().filter_map(Member::as_field)
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, TypeKind::Class | TypeKind::Enum)
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    pub fn is_abstract(&self) -> bool {
        self.flags.contains(TypeFlags::ABSTRACT)
    }

    pub fn is_native(&self) -> bool {
        self.flags.contains(TypeFlags::NATIVE)
    }

    pub fn into_members(self) -> Vec<Member> {
        self.members
    }

    /// A builder seeded with this node, without copying its members.
    pub fn into_builder(self) -> TypeBuilder {
        TypeBuilder {
            descriptor: Some(self.descriptor),
            kind: self.kind,
            flags: self.flags,
            super_type: self.super_type,
            interfaces: self.interfaces,
            members: self.members,
            position: self.position,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TypeBuilder {
    descriptor: Option<TypeId>,
    kind: TypeKind,
    flags: TypeFlags,
    super_type: Option<TypeId>,
    interfaces: Vec<TypeId>,
    members: Vec<Member>,
    position: SourcePosition,
}

impl Default for TypeBuilder {
    fn default() -> Self {
        TypeBuilder {
            descriptor: None,
            kind: TypeKind::Class,
            flags: TypeFlags::empty(),
            super_type: None,
            interfaces: Vec::new(),
            members: Vec::new(),
            position: SourcePosition::NONE,
        }
    }
}

impl TypeBuilder {
    pub fn descriptor(mut self, descriptor: TypeId) -> Self {
        self.descriptor = Some(descriptor);
        self
    }

    pub fn kind(mut self, kind: TypeKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn flags(mut self, flags: TypeFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn super_type(mut self, super_type: Option<TypeId>) -> Self {
        self.super_type = super_type;
        self
    }

    pub fn interfaces(mut self, interfaces: Vec<TypeId>) -> Self {
        self.interfaces = interfaces;
        self
    }

    pub fn member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    pub fn members(mut self, members: Vec<Member>) -> Self {
        self.members = members;
        self
    }

    /// Moves the members out, leaving the builder with none.
    pub fn take_members(&mut self) -> Vec<Member> {
        std::mem::take(&mut self.members)
    }

    pub fn position(mut self, position: SourcePosition) -> Self {
        self.position = position;
        self
    }

    pub fn build(self) -> Result<Type, ConstructionError> {
        let descriptor = self.descriptor.ok_or(ConstructionError::MissingField {
            node: "Type",
            field: "descriptor",
        })?;
        Ok(Type {
            descriptor,
            kind: self.kind,
            flags: self.flags,
            super_type: self.super_type,
            interfaces: self.interfaces,
            members: self.members,
            position: self.position,
        })
    }
}

impl From<&Type> for TypeBuilder {
    fn from(ty: &Type) -> Self {
        TypeBuilder {
            descriptor: Some(ty.descriptor),
            kind: ty.kind,
            flags: ty.flags,
            super_type: ty.super_type,
            interfaces: ty.interfaces.clone(),
            members: ty.members.clone(),
            position: ty.position.clone(),
        }
    }
}

// =============================================================================
// CompilationUnit
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct CompilationUnit {
    pub(crate) file_path: Arc<str>,
    pub(crate) package_name: Arc<str>,
    pub(crate) types: Vec<Type>,
}

impl CompilationUnit {
    pub fn builder() -> CompilationUnitBuilder {
        CompilationUnitBuilder::default()
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn types(&self) -> &[Type] {
        &self.types
    }

    pub fn into_types(self) -> Vec<Type> {
        self.types
    }

    pub fn into_builder(self) -> CompilationUnitBuilder {
        CompilationUnitBuilder {
            file_path: Some(self.file_path),
            package_name: self.package_name,
            types: self.types,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct CompilationUnitBuilder {
    file_path: Option<Arc<str>>,
    package_name: Arc<str>,
    types: Vec<Type>,
}

impl CompilationUnitBuilder {
    pub fn file_path(mut self, file_path: impl Into<Arc<str>>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }

    /// Empty for the default package.
    pub fn package_name(mut self, package_name: impl Into<Arc<str>>) -> Self {
        self.package_name = package_name.into();
        self
    }

    pub fn add_type(mut self, ty: Type) -> Self {
        self.types.push(ty);
        self
    }

    pub fn types(mut self, types: Vec<Type>) -> Self {
        self.types = types;
        self
    }

    /// Moves the types out, leaving the builder with none.
    pub fn take_types(&mut self) -> Vec<Type> {
        std::mem::take(&mut self.types)
    }

    pub fn build(self) -> Result<CompilationUnit, ConstructionError> {
        let file_path = self
            .file_path
            .filter(|path| !path.is_empty())
            .ok_or(ConstructionError::MissingField {
                node: "CompilationUnit",
                field: "file path",
            })?;
        Ok(CompilationUnit {
            file_path,
            package_name: self.package_name,
            types: self.types,
        })
    }
}

impl From<&CompilationUnit> for CompilationUnitBuilder {
    fn from(unit: &CompilationUnit) -> Self {
        CompilationUnitBuilder {
            file_path: Some(unit.file_path.clone()),
            package_name: unit.package_name.clone(),
            types: unit.types.clone(),
        }
    }
}

// =============================================================================
// Program
// =============================================================================

/// The whole input: compilation units in a fixed order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    pub(crate) units: Vec<CompilationUnit>,
}

impl Program {
    pub fn new(units: Vec<CompilationUnit>) -> Self {
        Program { units }
    }

    pub fn units(&self) -> &[CompilationUnit] {
        &self.units
    }

    pub fn into_units(self) -> Vec<CompilationUnit> {
        self.units
    }

    pub fn types(&self) -> impl Iterator<Item = &Type> {
        self.units.iter().flat_map(|unit| unit.types().iter())
    }

    /// The tree node declaring `descriptor`, if it is part of the program.
    pub fn find_type(&self, descriptor: TypeId) -> Option<&Type> {
        self.types().find(|ty| ty.descriptor() == descriptor)
    }
}
