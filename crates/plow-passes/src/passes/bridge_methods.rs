//! Instance-dispatch bridges.
//!
//! A call site names exactly one mangled method. When a class implements an
//! inherited method through a method with a different mangled name (a
//! generic parameter narrowed by the type arguments, or an interface method
//! satisfied by a superclass method), callers going through the ancestor
//! would miss the implementation. The bridge closes that gap: it carries the
//! ancestor's mangled name and erased signature, casts its arguments and
//! forwards to the implementation on `this`.

use super::declared_mangled_names;
use crate::error::PassError;
use crate::pass::{PassContext, TypePass};
use indexmap::IndexMap;
use plow_ast::ast_utils::{create_forwarding_statement, create_parameter_variables};
use plow_ast::{Member, Method, Type};
use plow_common::{SourcePosition, diagnostic_codes};
use plow_types::{
    ErasedSignature, MethodDescriptor, MethodDescriptorBuilder, MethodFlags, RegistryError,
    TypeId, TypeRegistry,
};
use rustc_hash::FxHashSet;
use std::sync::Arc;
use tracing::{debug, trace};

pub struct BridgeMethods;

/// How a type implements one inherited method.
#[derive(Clone, Debug)]
pub enum Implementation {
    /// Declared by the type, inherited from the nearest superclass that
    /// declares it, or the most specific interface default.
    Found(Arc<MethodDescriptor>),
    /// No class implements it and two unrelated interface defaults do.
    Ambiguous(Arc<MethodDescriptor>, Arc<MethodDescriptor>),
    /// Only abstract declarations exist.
    Missing,
}

/// Finds the method that implements `inherited` (viewed as a member of an
/// ancestor of `subject`) in `subject`. Class methods win over interface
/// defaults; the result may be abstract.
pub fn find_implementation(
    registry: &TypeRegistry,
    subject: TypeId,
    inherited: &MethodDescriptor,
) -> Result<Implementation, RegistryError> {
    for method in registry.declared_methods(subject)?.iter() {
        if registry.overrides(method, inherited)? {
            return Ok(Implementation::Found(method.clone()));
        }
    }

    let implements = |method: &MethodDescriptor| -> Result<bool, RegistryError> {
        Ok(method.same_declaration(inherited) || registry.overrides(method, inherited)?)
    };

    let ancestors = registry.inherited_methods(subject)?;
    for candidate in ancestors.iter().filter(|candidate| candidate.from_class) {
        if implements(&candidate.method)? {
            return Ok(Implementation::Found(candidate.method.clone()));
        }
    }

    let mut defaults: Vec<Arc<MethodDescriptor>> = Vec::new();
    for candidate in ancestors.iter().filter(|candidate| !candidate.from_class) {
        if candidate.method.is_default() && implements(&candidate.method)? {
            defaults.push(candidate.method.clone());
        }
    }
    let mut most_specific: Vec<Arc<MethodDescriptor>> = Vec::new();
    for candidate in &defaults {
        let mut shadowed = false;
        for other in &defaults {
            if other.id() != candidate.id()
                && other.enclosing_type() != candidate.enclosing_type()
                && registry.is_subtype_of(other.enclosing_type(), candidate.enclosing_type())?
            {
                shadowed = true;
                break;
            }
        }
        if !shadowed {
            most_specific.push(candidate.clone());
        }
    }

    Ok(match most_specific.as_slice() {
        [] => Implementation::Missing,
        [single] => Implementation::Found(single.clone()),
        [first, second, ..] => Implementation::Ambiguous(first.clone(), second.clone()),
    })
}

impl TypePass for BridgeMethods {
    fn name(&self) -> &'static str {
        "bridge-methods"
    }

    fn apply_to_type(&self, ty: Type, context: &mut PassContext<'_>) -> Result<Type, PassError> {
        if !ty.is_class() || ty.is_native() {
            return Ok(ty);
        }
        if !context.has_consistent_hierarchy(&ty, self.name())? {
            return Ok(ty);
        }

        let bridges = BridgeSynthesizer::new(context.registry, &ty)?.synthesize(context)?;
        if bridges.is_empty() {
            return Ok(ty);
        }
        let mut builder = ty.into_builder();
        for bridge in bridges {
            builder = builder.member(Member::Method(bridge));
        }
        Ok(builder.build()?)
    }
}

// =============================================================================
// Synthesis
// =============================================================================

struct BridgeSynthesizer<'a> {
    registry: &'a TypeRegistry,
    subject: TypeId,
    position: SourcePosition,
    declared: FxHashSet<Arc<str>>,
    /// Bridges by mangled name, with the implementation they forward to.
    bridges: IndexMap<Arc<str>, (Arc<MethodDescriptor>, Method)>,
    reported_ambiguities: FxHashSet<ErasedSignature>,
}

impl<'a> BridgeSynthesizer<'a> {
    fn new(registry: &'a TypeRegistry, ty: &Type) -> Result<Self, PassError> {
        Ok(BridgeSynthesizer {
            registry,
            subject: ty.descriptor(),
            position: ty.position().clone(),
            declared: declared_mangled_names(ty, registry)?,
            bridges: IndexMap::new(),
            reported_ambiguities: FxHashSet::default(),
        })
    }

    fn synthesize(mut self, context: &mut PassContext<'_>) -> Result<Vec<Method>, PassError> {
        let inherited = self.registry.inherited_methods(self.subject)?;
        for entry in inherited.iter() {
            self.consider(&entry.method, context)?;
        }
        Ok(self
            .bridges
            .into_values()
            .map(|(_, bridge)| bridge)
            .collect())
    }

    fn consider(
        &mut self,
        inherited: &Arc<MethodDescriptor>,
        context: &mut PassContext<'_>,
    ) -> Result<(), PassError> {
        let registry = self.registry;
        let implementation =
            match find_implementation(registry, self.subject, inherited)? {
                Implementation::Found(implementation) => implementation,
                Implementation::Missing => return Ok(()),
                Implementation::Ambiguous(first, second) => {
                    if self
                        .reported_ambiguities
                        .insert(registry.erased_signature(inherited)?)
                    {
                        context.report(
                            diagnostic_codes::AMBIGUOUS_OVERRIDE,
                            self.position.clone(),
                            &[
                                inherited.name(),
                                &registry.type_name(self.subject),
                                &registry.type_name(first.enclosing_type()),
                                &registry.type_name(second.enclosing_type()),
                            ],
                        );
                    }
                    return Ok(());
                }
            };

        if implementation.is_abstract() || implementation.same_declaration(inherited) {
            return Ok(());
        }
        let bridge_name = registry.mangled_name(inherited)?;
        if registry.mangled_name(&implementation)? == bridge_name
            || self.declared.contains(&bridge_name)
            || self.super_type_resolves_to(inherited, &implementation)?
        {
            return Ok(());
        }

        if let Some((target, _)) = self.bridges.get(&bridge_name) {
            if !target.same_declaration(&implementation) {
                context.report(
                    diagnostic_codes::CONFLICTING_BRIDGE,
                    self.position.clone(),
                    &[
                        &bridge_name,
                        &registry.type_name(self.subject),
                        &registry.describe_method(target),
                        &registry.describe_method(&implementation),
                    ],
                );
            }
            return Ok(());
        }

        let bridge = self.create_bridge(inherited, &implementation)?;
        debug!(
            type_name = %registry.type_name(self.subject),
            bridge = %bridge_name,
            target = %registry.describe_method(&implementation),
            "bridge"
        );
        self.bridges
            .insert(bridge_name, (implementation.clone(), bridge));
        Ok(())
    }

    /// Whether the superclass already dispatches `inherited` to the same
    /// implementation, in which case it carries the bridge.
    fn super_type_resolves_to(
        &self,
        inherited: &MethodDescriptor,
        implementation: &MethodDescriptor,
    ) -> Result<bool, PassError> {
        let registry = self.registry;
        let Some(super_type) = registry.super_type(self.subject)? else {
            return Ok(false);
        };
        let super_view = registry
            .inherited_methods(super_type)?
            .iter()
            .find(|entry| entry.method.same_declaration(inherited))
            .map(|entry| entry.method.clone());
        let Some(super_view) = super_view else {
            return Ok(false);
        };
        let resolved = match find_implementation(registry, super_type, &super_view)? {
            Implementation::Found(resolved) => resolved.same_declaration(implementation),
            Implementation::Ambiguous(..) | Implementation::Missing => false,
        };
        trace!(
            type_name = %registry.type_name(self.subject),
            method = %inherited.name(),
            resolved,
            "super type resolution"
        );
        Ok(resolved)
    }

    fn create_bridge(
        &self,
        inherited: &Arc<MethodDescriptor>,
        implementation: &Arc<MethodDescriptor>,
    ) -> Result<Method, PassError> {
        let registry = self.registry;
        let declaration = inherited.declaration_descriptor();
        let parameter_types = declaration
            .parameters()
            .iter()
            .map(|&parameter| registry.erasure(parameter))
            .collect::<Result<Vec<_>, _>>()?;
        let return_type = registry.erasure(declaration.return_type())?;

        let descriptor = MethodDescriptorBuilder::new(self.subject, declaration.name())
            .parameters(parameter_types.iter().copied())
            .return_type(return_type)
            .visibility(declaration.visibility())
            .flags(MethodFlags::BRIDGE | MethodFlags::SYNTHETIC)
            .declaration(&declaration)
            .bridge_target(Some(implementation.clone()))
            .build(registry);

        let parameters = create_parameter_variables(&parameter_types);
        let forward = create_forwarding_statement(
            self.subject,
            implementation,
            &parameters,
            !return_type.is_void(),
        )?;
        Ok(Method::builder()
            .descriptor(descriptor)
            .parameters(parameters)
            .statements(vec![forward])
            .position(SourcePosition::NONE)
            .build()?)
    }
}
