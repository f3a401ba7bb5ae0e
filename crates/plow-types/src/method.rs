//! Method and field descriptors.
//!
//! Descriptors are hash-consed by the registry: building the same method twice
//! yields the same `Arc`, and identity comparisons go through the id.

use crate::declaration::Visibility;
use crate::registry::TypeRegistry;
use crate::types::TypeId;
use bitflags::bitflags;
use plow_common::Atom;
use serde::Serialize;
use smallvec::SmallVec;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MethodId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FieldId(pub u32);

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MethodFlags: u16 {
        const ABSTRACT = 1 << 0;
        const STATIC = 1 << 1;
        const NATIVE = 1 << 2;
        /// Forwards to `bridge_target`.
        const BRIDGE = 1 << 3;
        /// Created by a pass, not by the frontend.
        const SYNTHETIC = 1 << 4;
        /// Interface method with a body.
        const DEFAULT = 1 << 5;
        /// Explicitly exposed to the target language under its simple name.
        const JS_MEMBER = 1 << 6;
        const FINAL = 1 << 7;
        const CONSTRUCTOR = 1 << 8;
    }
}

pub type ParameterTypes = SmallVec<[TypeId; 4]>;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct MethodKey {
    pub(crate) enclosing: TypeId,
    pub(crate) name: Atom,
    pub(crate) parameters: ParameterTypes,
    pub(crate) return_type: TypeId,
    pub(crate) visibility: Visibility,
    pub(crate) flags: MethodFlags,
    pub(crate) declaration: Option<MethodId>,
    pub(crate) bridge_target: Option<MethodId>,
}

/// Canonical descriptor of a method, possibly a specialized view of a generic
/// declaration.
#[derive(Debug)]
pub struct MethodDescriptor {
    pub(crate) id: MethodId,
    pub(crate) key: MethodKey,
    pub(crate) name: Arc<str>,
    pub(crate) declaration: Option<Arc<MethodDescriptor>>,
    pub(crate) bridge_target: Option<Arc<MethodDescriptor>>,
}

impl MethodDescriptor {
    pub fn id(&self) -> MethodId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn name_atom(&self) -> Atom {
        self.key.name
    }

    pub fn enclosing_type(&self) -> TypeId {
        self.key.enclosing
    }

    pub fn parameters(&self) -> &[TypeId] {
        &self.key.parameters
    }

    pub fn return_type(&self) -> TypeId {
        self.key.return_type
    }

    pub fn visibility(&self) -> Visibility {
        self.key.visibility
    }

    pub fn flags(&self) -> MethodFlags {
        self.key.flags
    }

    pub fn is_abstract(&self) -> bool {
        self.key.flags.contains(MethodFlags::ABSTRACT)
    }

    pub fn is_static(&self) -> bool {
        self.key.flags.contains(MethodFlags::STATIC)
    }

    pub fn is_native(&self) -> bool {
        self.key.flags.contains(MethodFlags::NATIVE)
    }

    pub fn is_bridge(&self) -> bool {
        self.key.flags.contains(MethodFlags::BRIDGE)
    }

    pub fn is_synthetic(&self) -> bool {
        self.key.flags.contains(MethodFlags::SYNTHETIC)
    }

    pub fn is_default(&self) -> bool {
        self.key.flags.contains(MethodFlags::DEFAULT)
    }

    pub fn is_private(&self) -> bool {
        self.key.visibility == Visibility::Private
    }

    pub fn is_constructor(&self) -> bool {
        self.key.flags.contains(MethodFlags::CONSTRUCTOR)
    }

    /// Static and private methods and constructors never take part in
    /// dynamic dispatch.
    pub fn is_polymorphic(&self) -> bool {
        !self.is_static() && !self.is_private() && !self.is_constructor()
    }

    /// The declaration this descriptor was specialized from, or itself.
    pub fn declaration(&self) -> &MethodDescriptor {
        self.declaration.as_deref().unwrap_or(self)
    }

    /// Owned form of [`MethodDescriptor::declaration`].
    pub fn declaration_descriptor(self: &Arc<Self>) -> Arc<MethodDescriptor> {
        self.declaration.clone().unwrap_or_else(|| Arc::clone(self))
    }

    pub fn is_specialized(&self) -> bool {
        self.declaration.is_some()
    }

    pub fn bridge_target(&self) -> Option<&Arc<MethodDescriptor>> {
        self.bridge_target.as_ref()
    }

    /// Same declaration, regardless of specialization.
    pub fn same_declaration(&self, other: &MethodDescriptor) -> bool {
        self.declaration().id == other.declaration().id
    }
}

impl PartialEq for MethodDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MethodDescriptor {}

impl Hash for MethodDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Seeds a new method descriptor, usually from an existing one.
///
/// `build` interns the result, so two identical builders produce the same
/// descriptor.
#[derive(Clone, Debug)]
pub struct MethodDescriptorBuilder {
    enclosing_type: TypeId,
    name: Arc<str>,
    parameters: ParameterTypes,
    return_type: TypeId,
    visibility: Visibility,
    flags: MethodFlags,
    declaration: Option<Arc<MethodDescriptor>>,
    bridge_target: Option<Arc<MethodDescriptor>>,
}

impl MethodDescriptorBuilder {
    pub fn new(enclosing_type: TypeId, name: impl Into<Arc<str>>) -> Self {
        MethodDescriptorBuilder {
            enclosing_type,
            name: name.into(),
            parameters: SmallVec::new(),
            return_type: TypeId::VOID,
            visibility: Visibility::Public,
            flags: MethodFlags::empty(),
            declaration: None,
            bridge_target: None,
        }
    }

    pub fn enclosing_type(mut self, enclosing_type: TypeId) -> Self {
        self.enclosing_type = enclosing_type;
        self
    }

    pub fn parameters(mut self, parameters: impl IntoIterator<Item = TypeId>) -> Self {
        self.parameters = parameters.into_iter().collect();
        self
    }

    pub fn return_type(mut self, return_type: TypeId) -> Self {
        self.return_type = return_type;
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn flags(mut self, flags: MethodFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn add_flags(mut self, flags: MethodFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn remove_flags(mut self, flags: MethodFlags) -> Self {
        self.flags.remove(flags);
        self
    }

    /// Always records the root declaration, never an intermediate view.
    pub fn declaration(mut self, declaration: &Arc<MethodDescriptor>) -> Self {
        self.declaration = Some(declaration.declaration_descriptor());
        self
    }

    pub fn bridge_target(mut self, target: Option<Arc<MethodDescriptor>>) -> Self {
        self.bridge_target = target;
        self
    }

    /// An abstract stand-in for `method` inside `enclosing_type`: the
    /// declaration is kept, so the stub mangles like the method it stands for.
    pub fn abstract_stub(method: &Arc<MethodDescriptor>, enclosing_type: TypeId) -> Self {
        MethodDescriptorBuilder::from(&**method)
            .enclosing_type(enclosing_type)
            .declaration(method)
            .remove_flags(MethodFlags::DEFAULT | MethodFlags::NATIVE | MethodFlags::FINAL)
            .add_flags(MethodFlags::ABSTRACT | MethodFlags::SYNTHETIC)
            .bridge_target(None)
    }

    pub fn build(self, registry: &TypeRegistry) -> Arc<MethodDescriptor> {
        let name = registry.intern_name(&self.name);
        let key = MethodKey {
            enclosing: self.enclosing_type,
            name,
            parameters: self.parameters,
            return_type: self.return_type,
            visibility: self.visibility,
            flags: self.flags,
            declaration: self.declaration.as_ref().map(|d| d.id),
            bridge_target: self.bridge_target.as_ref().map(|t| t.id),
        };
        registry.intern_method(key, self.name, self.declaration, self.bridge_target)
    }
}

impl From<&MethodDescriptor> for MethodDescriptorBuilder {
    fn from(method: &MethodDescriptor) -> Self {
        MethodDescriptorBuilder {
            enclosing_type: method.key.enclosing,
            name: Arc::clone(&method.name),
            parameters: method.key.parameters.clone(),
            return_type: method.key.return_type,
            visibility: method.key.visibility,
            flags: method.key.flags,
            declaration: method.declaration.clone(),
            bridge_target: method.bridge_target.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct FieldKey {
    pub(crate) enclosing: TypeId,
    pub(crate) name: Atom,
    pub(crate) field_type: TypeId,
    pub(crate) visibility: Visibility,
    pub(crate) is_static: bool,
    pub(crate) is_final: bool,
}

#[derive(Debug)]
pub struct FieldDescriptor {
    pub(crate) id: FieldId,
    pub(crate) key: FieldKey,
    pub(crate) name: Arc<str>,
}

impl FieldDescriptor {
    pub fn id(&self) -> FieldId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn enclosing_type(&self) -> TypeId {
        self.key.enclosing
    }

    pub fn field_type(&self) -> TypeId {
        self.key.field_type
    }

    pub fn visibility(&self) -> Visibility {
        self.key.visibility
    }

    pub fn is_static(&self) -> bool {
        self.key.is_static
    }

    pub fn is_final(&self) -> bool {
        self.key.is_final
    }
}

impl PartialEq for FieldDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FieldDescriptor {}

impl Hash for FieldDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
