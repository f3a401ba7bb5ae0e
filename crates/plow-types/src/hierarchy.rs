//! Inherited and polymorphic method views.
//!
//! `inherited_methods` lists every dispatchable method of every ancestor,
//! specialized to the subject type and unmerged. `polymorphic_methods` merges
//! that list with the type's own methods into the resolved method table:
//!
//! - a method declared in the type shadows every ancestor method with the
//!   same erased signature;
//! - the superclass chain is visited nearest first, before any interface, so
//!   class methods shadow interface methods and nearer classes shadow
//!   farther ones;
//! - interfaces are visited breadth first and the first method for an erased
//!   signature wins.

use crate::error::RegistryError;
use crate::method::{MethodDescriptor, ParameterTypes};
use crate::registry::TypeRegistry;
use crate::types::TypeId;
use plow_common::Atom;
use plow_common::limits::MAX_HIERARCHY_DEPTH;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::trace;

/// Name plus erased parameter types: the identity used for overriding.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ErasedSignature {
    pub name: Atom,
    pub parameters: ParameterTypes,
}

/// One ancestor method as seen from a subtype.
#[derive(Clone, Debug)]
pub struct InheritedMethod {
    /// Specialized to `ancestor`.
    pub method: Arc<MethodDescriptor>,
    /// The ancestor as the subject type sees it, e.g. `C<String>`.
    pub ancestor: TypeId,
    pub from_class: bool,
    /// Supertype steps from the subject type.
    pub distance: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ancestor {
    pub ty: TypeId,
    pub is_class: bool,
    pub distance: u32,
}

impl TypeRegistry {
    pub fn erased_signature(
        &self,
        method: &MethodDescriptor,
    ) -> Result<ErasedSignature, RegistryError> {
        let parameters = method
            .parameters()
            .iter()
            .map(|&parameter| self.erasure(parameter))
            .collect::<Result<ParameterTypes, _>>()?;
        Ok(ErasedSignature {
            name: method.name_atom(),
            parameters,
        })
    }

    /// Whether `method` overrides `ancestor_method`. Both must be viewed as
    /// members of the same subject type.
    pub fn overrides(
        &self,
        method: &MethodDescriptor,
        ancestor_method: &MethodDescriptor,
    ) -> Result<bool, RegistryError> {
        if method.id() == ancestor_method.id()
            || !method.is_polymorphic()
            || !ancestor_method.is_polymorphic()
            || method.name_atom() != ancestor_method.name_atom()
        {
            return Ok(false);
        }
        Ok(self.erased_signature(method)? == self.erased_signature(ancestor_method)?)
    }

    /// Superclasses nearest first, then every interface in breadth-first
    /// order, each specialized to `id`.
    pub fn ancestors(&self, id: TypeId) -> Result<Vec<Ancestor>, RegistryError> {
        let mut result = Vec::new();

        let mut current = self.super_type(id)?;
        let mut distance = 1;
        while let Some(super_type) = current {
            if distance > MAX_HIERARCHY_DEPTH {
                return Err(RegistryError::HierarchyTooDeep(self.type_name(id)));
            }
            result.push(Ancestor {
                ty: super_type,
                is_class: true,
                distance,
            });
            current = self.super_type(super_type)?;
            distance += 1;
        }

        let mut queue: VecDeque<(TypeId, u32)> =
            self.interfaces(id)?.iter().map(|&i| (i, 1)).collect();
        for class in &result {
            for &interface in self.interfaces(class.ty)?.iter() {
                queue.push_back((interface, class.distance + 1));
            }
        }

        let mut seen = FxHashSet::default();
        while let Some((interface, distance)) = queue.pop_front() {
            if !seen.insert(self.erasure(interface)?) {
                continue;
            }
            result.push(Ancestor {
                ty: interface,
                is_class: false,
                distance,
            });
            for &super_interface in self.interfaces(interface)?.iter() {
                queue.push_back((super_interface, distance + 1));
            }
        }

        Ok(result)
    }

    /// Every non-static, non-private ancestor method, specialized to `id`, in
    /// `ancestors` order. Cached per type.
    pub fn inherited_methods(&self, id: TypeId) -> Result<Arc<[InheritedMethod]>, RegistryError> {
        if let Some(cached) = self.inherited.get(&id) {
            return Ok(cached.value().clone());
        }
        let mut methods = Vec::new();
        for ancestor in self.ancestors(id)? {
            for method in self.declared_methods(ancestor.ty)?.iter() {
                if !method.is_polymorphic() {
                    continue;
                }
                methods.push(InheritedMethod {
                    method: self.specialize_method(method, ancestor.ty)?,
                    ancestor: ancestor.ty,
                    from_class: ancestor.is_class,
                    distance: ancestor.distance,
                });
            }
        }
        let methods: Arc<[InheritedMethod]> = Arc::from(methods);
        Ok(self.inherited.entry(id).or_insert(methods).value().clone())
    }

    /// The resolved method table of `id`: own and inherited dispatchable
    /// methods, merged by erased signature. Cached per type.
    pub fn polymorphic_methods(
        &self,
        id: TypeId,
    ) -> Result<Arc<[Arc<MethodDescriptor>]>, RegistryError> {
        if let Some(cached) = self.polymorphic.get(&id) {
            return Ok(cached.value().clone());
        }

        let mut seen = FxHashSet::default();
        let mut methods = Vec::new();
        for method in self.declared_methods(id)?.iter() {
            if !method.is_polymorphic() {
                continue;
            }
            let method = self.specialize_method(method, id)?;
            if seen.insert(self.erased_signature(&method)?) {
                methods.push(method);
            }
        }
        for inherited in self.inherited_methods(id)?.iter() {
            if seen.insert(self.erased_signature(&inherited.method)?) {
                methods.push(inherited.method.clone());
            }
        }
        trace!(
            type_name = %self.type_name(id),
            count = methods.len(),
            "polymorphic_methods"
        );

        let methods: Arc<[Arc<MethodDescriptor>]> = Arc::from(methods);
        Ok(self.polymorphic.entry(id).or_insert(methods).value().clone())
    }
}
