use super::declared_mangled_names;
use crate::error::PassError;
use crate::pass::{PassContext, TypePass};
use plow_ast::ast_utils::create_parameter_variables;
use plow_ast::{Member, Method, Type};
use plow_common::SourcePosition;
use plow_types::MethodDescriptorBuilder;
use tracing::debug;

/// Redeclares, on every abstract class, the interface methods it leaves
/// abstract, so the output type lists its complete method set.
pub struct AbstractMethodStubs;

impl TypePass for AbstractMethodStubs {
    fn name(&self) -> &'static str {
        "abstract-method-stubs"
    }

    fn apply_to_type(&self, ty: Type, context: &mut PassContext<'_>) -> Result<Type, PassError> {
        if !ty.is_class() || !ty.is_abstract() || ty.is_native() {
            return Ok(ty);
        }
        if !context.has_consistent_hierarchy(&ty, self.name())? {
            return Ok(ty);
        }

        let registry = context.registry;
        let mut declared = declared_mangled_names(&ty, registry)?;
        let mut stubs = Vec::new();

        for method in registry.polymorphic_methods(ty.descriptor())?.iter() {
            if !method.is_abstract()
                || method.enclosing_type() == ty.descriptor()
                || !registry.descriptor(method.enclosing_type())?.is_interface()
            {
                continue;
            }
            let mangled_name = registry.mangled_name(method)?;
            if !declared.insert(mangled_name.clone()) {
                continue;
            }

            let parameter_types = method
                .parameters()
                .iter()
                .map(|&parameter| registry.erasure(parameter))
                .collect::<Result<Vec<_>, _>>()?;
            let descriptor =
                MethodDescriptorBuilder::abstract_stub(method, ty.descriptor()).build(registry);
            debug!(
                type_name = %registry.type_name(ty.descriptor()),
                method = %mangled_name,
                "abstract stub"
            );
            stubs.push(Member::Method(
                Method::builder()
                    .descriptor(descriptor)
                    .parameters(create_parameter_variables(&parameter_types))
                    .position(SourcePosition::NONE)
                    .build()?,
            ));
        }

        if stubs.is_empty() {
            return Ok(ty);
        }
        let mut builder = ty.into_builder();
        for stub in stubs {
            builder = builder.member(stub);
        }
        Ok(builder.build()?)
    }
}
