//! Target-language dispatch model.
//!
//! A lowered call is resolved in two steps. The compiler picks a method at
//! the receiver's static type ([`resolve_invocation`]) and emits its mangled
//! name; at run time the name is looked up on the receiver's class
//! ([`DispatchTable::lookup`]). A lowering is correct when the two steps
//! together reach the method the source language would have run.

use crate::error::PassError;
use indexmap::IndexMap;
use plow_ast::{Method, Program, Type};
use plow_types::{MethodDescriptor, RegistryError, TypeId, TypeRegistry};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;
use tracing::trace;

/// The method a mangled name reaches on one class.
#[derive(Clone, Debug)]
pub struct DispatchEntry {
    pub method: Arc<MethodDescriptor>,
    /// Tree node declaring `method`, as passed to [`Program::find_type`].
    pub declaring_type: TypeId,
}

/// Per-class method tables, keyed by the erased class.
#[derive(Debug, Default)]
pub struct DispatchTable {
    tables: FxHashMap<TypeId, IndexMap<Arc<str>, DispatchEntry>>,
}

impl DispatchTable {
    /// Builds a table for every class in `program`: own concrete methods,
    /// then the superclass chain, then interface defaults. The first entry
    /// for a name wins, so classes shadow interfaces.
    pub fn build(program: &Program, registry: &TypeRegistry) -> Result<Self, PassError> {
        let mut nodes: FxHashMap<TypeId, &Type> = FxHashMap::default();
        for ty in program.types() {
            nodes.insert(registry.erasure(ty.descriptor())?, ty);
        }

        let mut tables = FxHashMap::default();
        for ty in program.types().filter(|ty| ty.is_class()) {
            let class = registry.erasure(ty.descriptor())?;
            let mut table = IndexMap::new();

            let mut current = Some(ty.descriptor());
            while let Some(link) = current {
                if let Some(node) = nodes.get(&registry.erasure(link)?) {
                    add_methods(registry, &mut table, node, |method| !method.is_abstract())?;
                }
                current = registry.super_type(link)?;
            }
            for ancestor in registry.ancestors(ty.descriptor())? {
                if ancestor.is_class {
                    continue;
                }
                if let Some(node) = nodes.get(&registry.erasure(ancestor.ty)?) {
                    add_methods(registry, &mut table, node, MethodDescriptor::is_default)?;
                }
            }

            trace!(
                type_name = %registry.type_name(class),
                entries = table.len(),
                "dispatch table"
            );
            tables.insert(class, table);
        }
        Ok(DispatchTable { tables })
    }

    /// The method `mangled_name` reaches on `class` (an erased class id).
    pub fn lookup(&self, class: TypeId, mangled_name: &str) -> Option<&DispatchEntry> {
        self.tables.get(&class)?.get(mangled_name)
    }

    /// Mangled names available on `class`, in table order.
    pub fn names(&self, class: TypeId) -> impl Iterator<Item = &Arc<str>> {
        self.tables.get(&class).into_iter().flat_map(|table| table.keys())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

fn add_methods(
    registry: &TypeRegistry,
    table: &mut IndexMap<Arc<str>, DispatchEntry>,
    node: &Type,
    include: impl Fn(&MethodDescriptor) -> bool,
) -> Result<(), RegistryError> {
    for method in node.methods() {
        let descriptor = method.descriptor();
        if !descriptor.is_polymorphic() || !include(descriptor) {
            continue;
        }
        table
            .entry(stamped_name(registry, method)?)
            .or_insert_with(|| DispatchEntry {
                method: descriptor.clone(),
                declaring_type: node.descriptor(),
            });
    }
    Ok(())
}

fn stamped_name(registry: &TypeRegistry, method: &Method) -> Result<Arc<str>, RegistryError> {
    match method.mangled_name() {
        Some(name) => Ok(name.clone()),
        None => registry.mangled_name(method.descriptor()),
    }
}

// =============================================================================
// Overload resolution
// =============================================================================

/// Source-level overload resolution: the most specific method named `name`
/// visible at `static_type` that accepts `argument_types`.
///
/// Candidates are the methods declared by `static_type` (static ones
/// included) and its resolved method table. When no single candidate is
/// more specific than every other, the first one in declaration order wins.
pub fn resolve_invocation(
    registry: &TypeRegistry,
    static_type: TypeId,
    name: &str,
    argument_types: &[TypeId],
) -> Result<Option<Arc<MethodDescriptor>>, RegistryError> {
    let mut seen = FxHashSet::default();
    let mut applicable: Vec<Arc<MethodDescriptor>> = Vec::new();

    let declared = registry
        .declared_methods(static_type)?
        .iter()
        .map(|method| registry.specialize_method(method, static_type))
        .collect::<Result<Vec<_>, _>>()?;
    let polymorphic = registry.polymorphic_methods(static_type)?;

    for candidate in declared.iter().chain(polymorphic.iter()) {
        if candidate.name() != name
            || candidate.parameters().len() != argument_types.len()
            || !seen.insert(candidate.declaration().id())
        {
            continue;
        }
        if accepts(registry, candidate.parameters(), argument_types)? {
            applicable.push(candidate.clone());
        }
    }

    for candidate in &applicable {
        let mut most_specific = true;
        for other in &applicable {
            if other.id() != candidate.id()
                && !accepts(registry, other.parameters(), candidate.parameters())?
            {
                most_specific = false;
                break;
            }
        }
        if most_specific {
            return Ok(Some(candidate.clone()));
        }
    }
    Ok(applicable.into_iter().next())
}

/// Whether every argument type is assignable to its parameter type.
fn accepts(
    registry: &TypeRegistry,
    parameters: &[TypeId],
    arguments: &[TypeId],
) -> Result<bool, RegistryError> {
    for (&parameter, &argument) in parameters.iter().zip(arguments) {
        if !registry.is_assignable(argument, parameter)? {
            return Ok(false);
        }
    }
    Ok(true)
}
