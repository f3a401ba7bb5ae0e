//! The type descriptor registry.
//!
//! One registry lives for one compilation. It hands out a single canonical
//! descriptor per type, method and field, so every pass can compare
//! descriptors by id and share them between tree nodes without copying.
//!
//! Interning goes through `DashMap` entries: the first resolution of a key is
//! serialized on the key's shard, every later lookup reads the cached `Arc`.

use crate::declaration::TypeDeclaration;
use crate::error::{RegistryError, UnresolvedReason, UnresolvedTypeError};
use crate::hierarchy::InheritedMethod;
use crate::method::{
    FieldDescriptor, FieldId, FieldKey, MethodDescriptor, MethodDescriptorBuilder, MethodFlags,
    MethodId, MethodKey, ParameterTypes,
};
use crate::raw::RawTypeRef;
use crate::types::{PrimitiveKind, TypeDescriptor, TypeFlags, TypeId, TypeKey, TypeKind};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use plow_common::limits::{MAX_HIERARCHY_DEPTH, MAX_TYPE_NESTING_DEPTH};
use plow_common::{Atom, ShardedInterner};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::{debug, trace};

pub const OBJECT_NAME: &str = "java.lang.Object";
pub const STRING_NAME: &str = "java.lang.String";

/// Type variable to replacement.
pub type Substitution = FxHashMap<TypeId, TypeId>;

/// A registered declaration plus its lazily resolved members.
pub(crate) struct DeclarationEntry {
    pub(crate) declaration: TypeDeclaration,
    pub(crate) name: Atom,
    pub(crate) self_type: TypeId,
    pub(crate) type_parameters: Arc<[TypeId]>,
    methods: OnceLock<Arc<[Arc<MethodDescriptor>]>>,
    fields: OnceLock<Arc<[Arc<FieldDescriptor>]>>,
}

pub struct TypeRegistry {
    names: ShardedInterner,
    declarations: DashMap<Atom, Arc<DeclarationEntry>>,
    type_ids: DashMap<TypeKey, TypeId>,
    types: DashMap<TypeId, Arc<TypeDescriptor>>,
    next_type: AtomicU32,
    method_keys: DashMap<MethodKey, Arc<MethodDescriptor>>,
    methods: DashMap<MethodId, Arc<MethodDescriptor>>,
    next_method: AtomicU32,
    field_keys: DashMap<FieldKey, Arc<FieldDescriptor>>,
    next_field: AtomicU32,
    pub(crate) polymorphic: DashMap<TypeId, Arc<[Arc<MethodDescriptor>]>>,
    pub(crate) inherited: DashMap<TypeId, Arc<[InheritedMethod]>>,
    pub(crate) mangled: DashMap<MethodId, Arc<str>>,
    pub(crate) js_members: DashMap<MethodId, bool>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create a registry with the well-known types at their fixed ids.
    pub fn new() -> Self {
        let registry = TypeRegistry {
            names: ShardedInterner::new(),
            declarations: DashMap::new(),
            type_ids: DashMap::new(),
            types: DashMap::new(),
            next_type: AtomicU32::new(0),
            method_keys: DashMap::new(),
            methods: DashMap::new(),
            next_method: AtomicU32::new(0),
            field_keys: DashMap::new(),
            next_field: AtomicU32::new(0),
            polymorphic: DashMap::new(),
            inherited: DashMap::new(),
            mangled: DashMap::new(),
            js_members: DashMap::new(),
        };
        registry.names.intern_common();
        registry.register_well_known();
        registry
    }

    fn register_well_known(&self) {
        for kind in PrimitiveKind::ALL {
            self.intern_type(
                TypeKey::Primitive(kind),
                TypeKind::Primitive,
                TypeFlags::empty(),
            );
        }
        self.intern_type(TypeKey::Null, TypeKind::Null, TypeFlags::empty());
        // Neither can collide in an empty registry.
        let _ = self.declare(TypeDeclaration::class(OBJECT_NAME));
        let _ = self.declare(TypeDeclaration::class(STRING_NAME).flags(TypeFlags::FINAL));
        debug_assert_eq!(self.next_type.load(Ordering::SeqCst), TypeId::FIRST_USER);
    }

    /// Drop every declaration and descriptor. Ids handed out before the reset
    /// must not be used afterwards.
    pub fn reset(&mut self) {
        debug!("TypeRegistry::reset");
        *self = TypeRegistry::new();
    }

    // =========================================================================
    // Names
    // =========================================================================

    pub fn intern_name(&self, name: &str) -> Atom {
        self.names.intern(name)
    }

    pub fn resolve_name(&self, atom: Atom) -> Arc<str> {
        self.names.resolve(atom)
    }

    // =========================================================================
    // Types
    // =========================================================================

    pub(crate) fn intern_type(&self, key: TypeKey, kind: TypeKind, flags: TypeFlags) -> TypeId {
        if let Some(id) = self.type_ids.get(&key) {
            return *id;
        }
        match self.type_ids.entry(key) {
            Entry::Occupied(existing) => *existing.get(),
            Entry::Vacant(slot) => {
                let id = TypeId(self.next_type.fetch_add(1, Ordering::SeqCst));
                let descriptor = TypeDescriptor::new(id, slot.key().clone(), kind, flags);
                trace!(type_id = id.0, key = ?descriptor.key, "intern_type");
                self.types.insert(id, Arc::new(descriptor));
                *slot.insert(id)
            }
        }
    }

    /// Register a declaration and return the descriptor of its self type
    /// (`C<T>` for a generic `C`).
    pub fn declare(&self, declaration: TypeDeclaration) -> Result<TypeId, RegistryError> {
        let name = self.names.intern(&declaration.name);
        if self.declarations.contains_key(&name) {
            return Err(RegistryError::DuplicateDeclaration(declaration.name));
        }

        let type_parameters: Arc<[TypeId]> = declaration
            .type_parameters
            .iter()
            .map(|parameter| {
                let key = TypeKey::TypeVariable {
                    owner: name,
                    name: self.names.intern(&parameter.name),
                };
                self.intern_type(key, TypeKind::TypeVariable, TypeFlags::empty())
            })
            .collect();

        match self.declarations.entry(name) {
            Entry::Occupied(_) => Err(RegistryError::DuplicateDeclaration(declaration.name)),
            Entry::Vacant(slot) => {
                let key = TypeKey::Declared {
                    name,
                    arguments: type_parameters.iter().copied().collect(),
                };
                let self_type = self.intern_type(key, declaration.kind, declaration.flags);
                debug!(name = %declaration.name, type_id = self_type.0, "declare");
                slot.insert(Arc::new(DeclarationEntry {
                    declaration,
                    name,
                    self_type,
                    type_parameters,
                    methods: OnceLock::new(),
                    fields: OnceLock::new(),
                }));
                Ok(self_type)
            }
        }
    }

    /// The self type of the declaration named `name`, if one is registered.
    pub fn declared_type(&self, name: &str) -> Option<TypeId> {
        let atom = self.names.intern(name);
        self.declarations.get(&atom).map(|entry| entry.self_type)
    }

    pub(crate) fn entry(&self, name: Atom) -> Option<Arc<DeclarationEntry>> {
        self.declarations.get(&name).map(|entry| entry.value().clone())
    }

    /// The declaration behind a declared type, `None` for every other kind.
    pub(crate) fn declaration_entry(
        &self,
        id: TypeId,
    ) -> Result<Option<Arc<DeclarationEntry>>, RegistryError> {
        let descriptor = self.descriptor(id)?;
        Ok(descriptor.declared_name().and_then(|name| self.entry(name)))
    }

    pub fn descriptor(&self, id: TypeId) -> Result<Arc<TypeDescriptor>, RegistryError> {
        self.lookup(id).ok_or(RegistryError::UnknownType(id))
    }

    pub fn lookup(&self, id: TypeId) -> Option<Arc<TypeDescriptor>> {
        self.types.get(&id).map(|descriptor| descriptor.value().clone())
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Resolve a reference outside of any declaration. Idempotent: the same
    /// reference always yields the same id.
    pub fn resolve(&self, reference: &RawTypeRef) -> Result<TypeId, UnresolvedTypeError> {
        self.resolve_in(None, reference)
    }

    /// Resolve a reference that appears inside the declaration of `scope`,
    /// where its type parameters are visible.
    pub fn resolve_in_scope(
        &self,
        scope: TypeId,
        reference: &RawTypeRef,
    ) -> Result<TypeId, RegistryError> {
        let entry = self.declaration_entry(scope)?;
        Ok(self.resolve_in(entry.as_deref(), reference)?)
    }

    pub(crate) fn resolve_in(
        &self,
        scope: Option<&DeclarationEntry>,
        reference: &RawTypeRef,
    ) -> Result<TypeId, UnresolvedTypeError> {
        match reference {
            RawTypeRef::Primitive(kind) => Ok(kind.type_id()),
            RawTypeRef::Null => Ok(TypeId::NULL),
            RawTypeRef::Named { name, arguments } => {
                let atom = self.names.intern(name);
                let entry = self.entry(atom).ok_or_else(|| {
                    UnresolvedTypeError::new(name.clone(), UnresolvedReason::UnknownType)
                })?;
                let expected = entry.type_parameters.len();
                if !arguments.is_empty() && arguments.len() != expected {
                    return Err(UnresolvedTypeError::new(
                        reference.to_string(),
                        UnresolvedReason::ArgumentCount {
                            expected,
                            found: arguments.len(),
                        },
                    ));
                }
                let arguments = arguments
                    .iter()
                    .map(|argument| self.resolve_in(scope, argument))
                    .collect::<Result<SmallVec<[TypeId; 2]>, _>>()?;
                Ok(self.intern_type(
                    TypeKey::Declared {
                        name: atom,
                        arguments,
                    },
                    entry.declaration.kind,
                    entry.declaration.flags,
                ))
            }
            RawTypeRef::Array(component) => {
                let component = self.resolve_in(scope, component)?;
                Ok(self.array_of(component))
            }
            RawTypeRef::Variable(name) => {
                let owner = scope
                    .filter(|entry| entry.declaration.find_type_parameter(name).is_some())
                    .ok_or_else(|| {
                        UnresolvedTypeError::new(
                            name.clone(),
                            UnresolvedReason::TypeVariableOutOfScope,
                        )
                    })?;
                let key = TypeKey::TypeVariable {
                    owner: owner.name,
                    name: self.names.intern(name),
                };
                Ok(self.intern_type(key, TypeKind::TypeVariable, TypeFlags::empty()))
            }
            RawTypeRef::Intersection(parts) => {
                let parts = parts
                    .iter()
                    .map(|part| self.resolve_in(scope, part))
                    .collect::<Result<SmallVec<[TypeId; 2]>, _>>()?;
                if parts.len() == 1 {
                    return Ok(parts[0]);
                }
                Ok(self.intern_type(
                    TypeKey::Intersection(parts),
                    TypeKind::Intersection,
                    TypeFlags::empty(),
                ))
            }
        }
    }

    pub fn array_of(&self, component: TypeId) -> TypeId {
        self.intern_type(
            TypeKey::Array(component),
            TypeKind::Array,
            TypeFlags::empty(),
        )
    }

    /// `generic<arguments>` for a declared generic type.
    pub fn parameterized(
        &self,
        generic: TypeId,
        arguments: &[TypeId],
    ) -> Result<TypeId, RegistryError> {
        let Some(entry) = self.declaration_entry(generic)? else {
            return Err(RegistryError::UnknownType(generic));
        };
        if arguments.len() != entry.type_parameters.len() {
            return Err(UnresolvedTypeError::new(
                entry.declaration.name.clone(),
                UnresolvedReason::ArgumentCount {
                    expected: entry.type_parameters.len(),
                    found: arguments.len(),
                },
            )
            .into());
        }
        Ok(self.intern_type(
            TypeKey::Declared {
                name: entry.name,
                arguments: arguments.iter().copied().collect(),
            },
            entry.declaration.kind,
            entry.declaration.flags,
        ))
    }

    /// Type variables of the declaration behind `id`, in declaration order.
    pub fn type_parameters(&self, id: TypeId) -> Result<Arc<[TypeId]>, RegistryError> {
        Ok(self
            .declaration_entry(id)?
            .map(|entry| entry.type_parameters.clone())
            .unwrap_or_else(|| Arc::from(Vec::new())))
    }

    pub fn qualified_name(&self, id: TypeId) -> Option<Arc<str>> {
        let descriptor = self.lookup(id)?;
        descriptor.declared_name().map(|name| self.names.resolve(name))
    }

    /// Readable name for diagnostics and logs: `p.C<java.lang.String>`, `int[]`.
    pub fn type_name(&self, id: TypeId) -> String {
        let Some(descriptor) = self.lookup(id) else {
            return format!("<unknown type {}>", id.0);
        };
        match &descriptor.key {
            TypeKey::Primitive(kind) => kind.name().to_string(),
            TypeKey::Null => "null".to_string(),
            TypeKey::Declared { name, arguments } => {
                let mut text = self.names.resolve(*name).to_string();
                if !arguments.is_empty() {
                    let arguments: Vec<String> =
                        arguments.iter().map(|a| self.type_name(*a)).collect();
                    text.push('<');
                    text.push_str(&arguments.join(", "));
                    text.push('>');
                }
                text
            }
            TypeKey::Array(component) => format!("{}[]", self.type_name(*component)),
            TypeKey::TypeVariable { name, .. } => self.names.resolve(*name).to_string(),
            TypeKey::Intersection(parts) => parts
                .iter()
                .map(|p| self.type_name(*p))
                .collect::<Vec<_>>()
                .join(" & "),
        }
    }

    /// `Type.method` for diagnostics.
    pub fn describe_method(&self, method: &MethodDescriptor) -> String {
        format!("{}.{}", self.type_name(method.enclosing_type()), method.name())
    }

    // =========================================================================
    // Supertypes
    // =========================================================================

    /// The direct superclass of `id`, specialized to `id`'s type arguments.
    /// Raw types see the erasure of their declared superclass.
    pub fn super_type(&self, id: TypeId) -> Result<Option<TypeId>, RegistryError> {
        let descriptor = self.descriptor(id)?;
        if let Some(cached) = descriptor.super_type.get() {
            return Ok(*cached);
        }
        let computed = match &descriptor.key {
            TypeKey::Declared { name, arguments } => {
                let entry = self.entry(*name).ok_or(RegistryError::UnknownType(id))?;
                match self.declared_super_type(&entry)? {
                    Some(super_type) => {
                        Some(self.substitute_arguments(&entry, arguments, super_type)?)
                    }
                    None => None,
                }
            }
            TypeKey::Array(_) => Some(TypeId::OBJECT),
            TypeKey::Primitive(_)
            | TypeKey::Null
            | TypeKey::TypeVariable { .. }
            | TypeKey::Intersection(_) => None,
        };
        Ok(*descriptor.super_type.get_or_init(|| computed))
    }

    /// Directly implemented (or, for interfaces, extended) interfaces of `id`.
    pub fn interfaces(&self, id: TypeId) -> Result<Arc<[TypeId]>, RegistryError> {
        let descriptor = self.descriptor(id)?;
        if let Some(cached) = descriptor.interfaces.get() {
            return Ok(cached.clone());
        }
        let computed: Arc<[TypeId]> = match &descriptor.key {
            TypeKey::Declared { name, arguments } => {
                let entry = self.entry(*name).ok_or(RegistryError::UnknownType(id))?;
                entry
                    .declaration
                    .interfaces
                    .iter()
                    .map(|reference| {
                        let interface = self.resolve_in(Some(&entry), reference)?;
                        self.substitute_arguments(&entry, arguments, interface)
                    })
                    .collect::<Result<Vec<_>, _>>()?
                    .into()
            }
            _ => Arc::from(Vec::new()),
        };
        Ok(descriptor.interfaces.get_or_init(|| computed).clone())
    }

    fn declared_super_type(
        &self,
        entry: &DeclarationEntry,
    ) -> Result<Option<TypeId>, RegistryError> {
        match &entry.declaration.super_type {
            Some(reference) => Ok(Some(self.resolve_in(Some(entry), reference)?)),
            None if entry.declaration.is_interface() || entry.self_type == TypeId::OBJECT => {
                Ok(None)
            }
            None => Ok(Some(TypeId::OBJECT)),
        }
    }

    fn substitute_arguments(
        &self,
        entry: &DeclarationEntry,
        arguments: &[TypeId],
        ty: TypeId,
    ) -> Result<TypeId, RegistryError> {
        if entry.type_parameters.is_empty() {
            return Ok(ty);
        }
        if arguments.is_empty() {
            return self.erasure(ty);
        }
        let substitution: Substitution = entry
            .type_parameters
            .iter()
            .copied()
            .zip(arguments.iter().copied())
            .collect();
        self.specialize(ty, &substitution)
    }

    /// Maps the type variables of `id`'s declaration to `id`'s arguments, or
    /// to their erasures when `id` is raw.
    pub fn type_argument_substitution(&self, id: TypeId) -> Result<Substitution, RegistryError> {
        let descriptor = self.descriptor(id)?;
        let Some(entry) = descriptor.declared_name().and_then(|name| self.entry(name)) else {
            return Ok(Substitution::default());
        };
        let arguments = descriptor.type_arguments();
        if arguments.is_empty() {
            return entry
                .type_parameters
                .iter()
                .map(|&parameter| Ok((parameter, self.erasure(parameter)?)))
                .collect();
        }
        Ok(entry
            .type_parameters
            .iter()
            .copied()
            .zip(arguments.iter().copied())
            .collect())
    }

    // =========================================================================
    // Substitution and erasure
    // =========================================================================

    /// Replace type variables in `ty` according to `substitution`.
    pub fn specialize(
        &self,
        ty: TypeId,
        substitution: &Substitution,
    ) -> Result<TypeId, RegistryError> {
        if substitution.is_empty() {
            return Ok(ty);
        }
        self.specialize_at(ty, substitution, 0)
    }

    fn specialize_at(
        &self,
        ty: TypeId,
        substitution: &Substitution,
        depth: u32,
    ) -> Result<TypeId, RegistryError> {
        if let Some(&replacement) = substitution.get(&ty) {
            return Ok(replacement);
        }
        if ty.is_primitive() || ty == TypeId::NULL {
            return Ok(ty);
        }
        if depth > MAX_TYPE_NESTING_DEPTH {
            return Err(RegistryError::NestingTooDeep(self.type_name(ty)));
        }
        let descriptor = self.descriptor(ty)?;
        match &descriptor.key {
            TypeKey::Declared { name, arguments } if !arguments.is_empty() => {
                let specialized = arguments
                    .iter()
                    .map(|&argument| self.specialize_at(argument, substitution, depth + 1))
                    .collect::<Result<SmallVec<[TypeId; 2]>, _>>()?;
                if specialized == *arguments {
                    return Ok(ty);
                }
                Ok(self.intern_type(
                    TypeKey::Declared {
                        name: *name,
                        arguments: specialized,
                    },
                    descriptor.kind,
                    descriptor.flags,
                ))
            }
            TypeKey::Array(component) => {
                let specialized = self.specialize_at(*component, substitution, depth + 1)?;
                Ok(if specialized == *component {
                    ty
                } else {
                    self.array_of(specialized)
                })
            }
            TypeKey::Intersection(parts) => {
                let specialized = parts
                    .iter()
                    .map(|&part| self.specialize_at(part, substitution, depth + 1))
                    .collect::<Result<SmallVec<[TypeId; 2]>, _>>()?;
                if specialized == *parts {
                    return Ok(ty);
                }
                Ok(self.intern_type(
                    TypeKey::Intersection(specialized),
                    TypeKind::Intersection,
                    TypeFlags::empty(),
                ))
            }
            _ => Ok(ty),
        }
    }

    /// Erasure: raw declared types, type variables replaced by the erasure of
    /// their bound, intersections by their first component.
    pub fn erasure(&self, ty: TypeId) -> Result<TypeId, RegistryError> {
        self.erasure_at(ty, 0)
    }

    fn erasure_at(&self, ty: TypeId, depth: u32) -> Result<TypeId, RegistryError> {
        if ty.is_primitive() || ty == TypeId::NULL || ty == TypeId::OBJECT {
            return Ok(ty);
        }
        if depth > MAX_TYPE_NESTING_DEPTH {
            return Err(RegistryError::NestingTooDeep(self.type_name(ty)));
        }
        let descriptor = self.descriptor(ty)?;
        match &descriptor.key {
            TypeKey::Declared { name, arguments } if !arguments.is_empty() => {
                Ok(self.intern_type(
                    TypeKey::Declared {
                        name: *name,
                        arguments: SmallVec::new(),
                    },
                    descriptor.kind,
                    descriptor.flags,
                ))
            }
            TypeKey::Array(component) => {
                let erased = self.erasure_at(*component, depth + 1)?;
                Ok(self.array_of(erased))
            }
            TypeKey::TypeVariable { .. } => {
                let bound = self.upper_bound(ty)?;
                self.erasure_at(bound, depth + 1)
            }
            TypeKey::Intersection(parts) => match parts.first() {
                Some(&first) => self.erasure_at(first, depth + 1),
                None => Ok(TypeId::OBJECT),
            },
            _ => Ok(ty),
        }
    }

    /// The declared bound of a type variable (`java.lang.Object` when
    /// unbounded); any other type is its own bound.
    pub fn upper_bound(&self, ty: TypeId) -> Result<TypeId, RegistryError> {
        let descriptor = self.descriptor(ty)?;
        let TypeKey::TypeVariable { owner, name } = &descriptor.key else {
            return Ok(ty);
        };
        let entry = self.entry(*owner).ok_or(RegistryError::UnknownType(ty))?;
        let name = self.names.resolve(*name);
        match entry
            .declaration
            .find_type_parameter(&name)
            .and_then(|parameter| parameter.bound.as_ref())
        {
            Some(bound) => Ok(self.resolve_in(Some(&entry), bound)?),
            None => Ok(TypeId::OBJECT),
        }
    }

    // =========================================================================
    // Subtyping
    // =========================================================================

    /// Subtyping on erasures, which is all the lowering passes need.
    pub fn is_subtype_of(&self, sub: TypeId, sup: TypeId) -> Result<bool, RegistryError> {
        if sub == sup {
            return Ok(true);
        }
        if sub == TypeId::NULL {
            return Ok(self.descriptor(sup)?.is_reference());
        }
        if sub.is_primitive() || sup.is_primitive() {
            return Ok(false);
        }
        if sup == TypeId::OBJECT {
            return Ok(true);
        }

        let sub_descriptor = self.descriptor(sub)?;
        if let TypeKey::Intersection(parts) = &sub_descriptor.key {
            for &part in parts {
                if self.is_subtype_of(part, sup)? {
                    return Ok(true);
                }
            }
            return Ok(false);
        }

        let sub_erased = self.erasure(sub)?;
        let sup_erased = self.erasure(sup)?;
        if sub_erased == sup_erased {
            return Ok(true);
        }

        let sub_key = self.descriptor(sub_erased)?.key.clone();
        let sup_key = self.descriptor(sup_erased)?.key.clone();
        match (sub_key, sup_key) {
            (TypeKey::Array(a), TypeKey::Array(b)) => {
                if a.is_primitive() || b.is_primitive() {
                    Ok(a == b)
                } else {
                    self.is_subtype_of(a, b)
                }
            }
            (TypeKey::Array(_), _) | (_, TypeKey::Array(_)) => Ok(false),
            _ => self.reaches_supertype(sub_erased, sup_erased),
        }
    }

    fn reaches_supertype(&self, from: TypeId, target: TypeId) -> Result<bool, RegistryError> {
        let mut visited = FxHashSet::default();
        let mut queue = VecDeque::from([from]);
        while let Some(current) = queue.pop_front() {
            if current == target {
                return Ok(true);
            }
            if !visited.insert(current) {
                continue;
            }
            if visited.len() > MAX_HIERARCHY_DEPTH as usize * 8 {
                return Err(RegistryError::HierarchyTooDeep(self.type_name(from)));
            }
            if let Some(super_type) = self.super_type(current)? {
                queue.push_back(self.erasure(super_type)?);
            }
            for &interface in self.interfaces(current)?.iter() {
                queue.push_back(self.erasure(interface)?);
            }
        }
        Ok(false)
    }

    /// Assignment compatibility: subtyping plus primitive widening.
    pub fn is_assignable(&self, from: TypeId, to: TypeId) -> Result<bool, RegistryError> {
        if from.is_primitive() && to.is_primitive() {
            return Ok(from == to || widens_to(from, to));
        }
        self.is_subtype_of(from, to)
    }

    // =========================================================================
    // Members
    // =========================================================================

    /// Methods declared by the declaration behind `id`, typed in terms of its
    /// own type variables. Empty for anything that is not a declared type.
    pub fn declared_methods(
        &self,
        id: TypeId,
    ) -> Result<Arc<[Arc<MethodDescriptor>]>, RegistryError> {
        let Some(entry) = self.declaration_entry(id)? else {
            return Ok(Arc::from(Vec::new()));
        };
        if let Some(methods) = entry.methods.get() {
            return Ok(methods.clone());
        }
        let methods = entry
            .declaration
            .methods
            .iter()
            .map(|signature| {
                let parameters = signature
                    .parameters
                    .iter()
                    .map(|parameter| self.resolve_in(Some(&entry), parameter))
                    .collect::<Result<ParameterTypes, _>>()?;
                let return_type = self.resolve_in(Some(&entry), &signature.return_type)?;
                let mut flags = signature.flags;
                if entry.declaration.is_interface()
                    && !flags.intersects(MethodFlags::DEFAULT | MethodFlags::STATIC)
                    && signature.visibility != crate::Visibility::Private
                {
                    flags |= MethodFlags::ABSTRACT;
                }
                Ok(
                    MethodDescriptorBuilder::new(entry.self_type, signature.name.as_str())
                        .parameters(parameters)
                        .return_type(return_type)
                        .visibility(signature.visibility)
                        .flags(flags)
                        .build(self),
                )
            })
            .collect::<Result<Vec<_>, RegistryError>>()?;
        Ok(entry.methods.get_or_init(|| Arc::from(methods)).clone())
    }

    pub fn declared_fields(
        &self,
        id: TypeId,
    ) -> Result<Arc<[Arc<FieldDescriptor>]>, RegistryError> {
        let Some(entry) = self.declaration_entry(id)? else {
            return Ok(Arc::from(Vec::new()));
        };
        if let Some(fields) = entry.fields.get() {
            return Ok(fields.clone());
        }
        let fields = entry
            .declaration
            .fields
            .iter()
            .map(|signature| {
                let key = FieldKey {
                    enclosing: entry.self_type,
                    name: self.names.intern(&signature.name),
                    field_type: self.resolve_in(Some(&entry), &signature.field_type)?,
                    visibility: signature.visibility,
                    is_static: signature.is_static,
                    is_final: signature.is_final,
                };
                Ok(self.intern_field(key, Arc::from(signature.name.as_str())))
            })
            .collect::<Result<Vec<_>, RegistryError>>()?;
        Ok(entry.fields.get_or_init(|| Arc::from(fields)).clone())
    }

    /// A method declared by `id`'s declaration with exactly these parameter
    /// types, else a polymorphic method visible at `id` with these parameter
    /// types.
    pub fn find_method(
        &self,
        id: TypeId,
        name: &str,
        parameters: &[TypeId],
    ) -> Result<Option<Arc<MethodDescriptor>>, RegistryError> {
        let declared = self.declared_methods(id)?;
        if let Some(method) = declared
            .iter()
            .find(|m| m.name() == name && m.parameters() == parameters)
        {
            return Ok(Some(method.clone()));
        }
        let polymorphic = self.polymorphic_methods(id)?;
        Ok(polymorphic
            .iter()
            .find(|m| m.name() == name && m.parameters() == parameters)
            .cloned())
    }

    /// First method declared by `id`'s declaration with the given name.
    pub fn declared_method_named(
        &self,
        id: TypeId,
        name: &str,
    ) -> Result<Option<Arc<MethodDescriptor>>, RegistryError> {
        Ok(self
            .declared_methods(id)?
            .iter()
            .find(|m| m.name() == name)
            .cloned())
    }

    /// A field declared by `id` or the nearest superclass declaring it.
    pub fn find_field(
        &self,
        id: TypeId,
        name: &str,
    ) -> Result<Option<Arc<FieldDescriptor>>, RegistryError> {
        let mut current = Some(id);
        let mut depth = 0;
        while let Some(ty) = current {
            if let Some(field) = self.declared_fields(ty)?.iter().find(|f| f.name() == name) {
                return Ok(Some(field.clone()));
            }
            depth += 1;
            if depth > MAX_HIERARCHY_DEPTH {
                return Err(RegistryError::HierarchyTooDeep(self.type_name(id)));
            }
            current = self.super_type(ty)?;
        }
        Ok(None)
    }

    pub fn method(&self, id: MethodId) -> Result<Arc<MethodDescriptor>, RegistryError> {
        self.methods
            .get(&id)
            .map(|method| method.value().clone())
            .ok_or(RegistryError::UnknownMethod(id))
    }

    pub(crate) fn intern_method(
        &self,
        key: MethodKey,
        name: Arc<str>,
        declaration: Option<Arc<MethodDescriptor>>,
        bridge_target: Option<Arc<MethodDescriptor>>,
    ) -> Arc<MethodDescriptor> {
        if let Some(existing) = self.method_keys.get(&key) {
            return existing.value().clone();
        }
        match self.method_keys.entry(key) {
            Entry::Occupied(existing) => existing.get().clone(),
            Entry::Vacant(slot) => {
                let id = MethodId(self.next_method.fetch_add(1, Ordering::SeqCst));
                let descriptor = Arc::new(MethodDescriptor {
                    id,
                    key: slot.key().clone(),
                    name,
                    declaration,
                    bridge_target,
                });
                trace!(method_id = id.0, name = %descriptor.name, "intern_method");
                self.methods.insert(id, descriptor.clone());
                slot.insert(descriptor.clone());
                descriptor
            }
        }
    }

    fn intern_field(&self, key: FieldKey, name: Arc<str>) -> Arc<FieldDescriptor> {
        if let Some(existing) = self.field_keys.get(&key) {
            return existing.value().clone();
        }
        match self.field_keys.entry(key) {
            Entry::Occupied(existing) => existing.get().clone(),
            Entry::Vacant(slot) => {
                let id = FieldId(self.next_field.fetch_add(1, Ordering::SeqCst));
                let descriptor = Arc::new(FieldDescriptor {
                    id,
                    key: slot.key().clone(),
                    name,
                });
                slot.insert(descriptor.clone());
                descriptor
            }
        }
    }

    /// View of `method`'s declaration as a member of `as_member_of`, with the
    /// declaration's type variables replaced by `as_member_of`'s arguments.
    pub fn specialize_method(
        &self,
        method: &Arc<MethodDescriptor>,
        as_member_of: TypeId,
    ) -> Result<Arc<MethodDescriptor>, RegistryError> {
        let declaration = method.declaration_descriptor();
        if as_member_of == declaration.enclosing_type() {
            return Ok(declaration);
        }
        let substitution = self.type_argument_substitution(as_member_of)?;
        let parameters = declaration
            .parameters()
            .iter()
            .map(|&parameter| self.specialize(parameter, &substitution))
            .collect::<Result<ParameterTypes, _>>()?;
        let return_type = self.specialize(declaration.return_type(), &substitution)?;
        Ok(MethodDescriptorBuilder::from(&*declaration)
            .enclosing_type(as_member_of)
            .parameters(parameters)
            .return_type(return_type)
            .declaration(&declaration)
            .build(self))
    }
}

fn widens_to(from: TypeId, to: TypeId) -> bool {
    const ORDER: [TypeId; 6] = [
        TypeId::BYTE,
        TypeId::SHORT,
        TypeId::INT,
        TypeId::LONG,
        TypeId::FLOAT,
        TypeId::DOUBLE,
    ];
    let rank = |id: TypeId| ORDER.iter().position(|&t| t == id);
    match (from, rank(to)) {
        (TypeId::CHAR, Some(target)) => target >= 2,
        (_, Some(target)) => rank(from).is_some_and(|source| source < target),
        _ => false,
    }
}
