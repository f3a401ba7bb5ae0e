use crate::error::PassError;
use crate::pass::{PassContext, UnitPass};
use plow_ast::visit::{rewrite_expression_children, rewrite_method_children};
use plow_ast::{CompilationUnit, Expression, Method, Rewriter};
use plow_types::TypeRegistry;
use tracing::trace;

/// Stamps every method and every call site with its target-language name.
///
/// Runs after bridge synthesis, so a call through an ancestor and the bridge
/// that serves it agree on the name.
pub struct MangleCallSites;

impl UnitPass for MangleCallSites {
    fn name(&self) -> &'static str {
        "mangle-call-sites"
    }

    fn apply_to_unit(
        &self,
        unit: CompilationUnit,
        context: &mut PassContext<'_>,
    ) -> Result<CompilationUnit, PassError> {
        NameStamper {
            registry: context.registry,
        }
        .rewrite_unit(unit)
    }
}

struct NameStamper<'a> {
    registry: &'a TypeRegistry,
}

impl Rewriter for NameStamper<'_> {
    type Error = PassError;

    fn rewrite_method(&mut self, method: Method) -> Result<Method, PassError> {
        let method = rewrite_method_children(self, method)?;
        let mangled_name = self.registry.mangled_name(method.descriptor())?;
        if method.mangled_name() == Some(&mangled_name) {
            return Ok(method);
        }
        trace!(method = %mangled_name, "stamp method");
        Ok(method.into_builder().mangled_name(Some(mangled_name)).build()?)
    }

    fn rewrite_expression(&mut self, expression: Expression) -> Result<Expression, PassError> {
        match rewrite_expression_children(self, expression)? {
            Expression::MethodCall(call) => {
                let mangled_name = self.registry.mangled_name(call.target())?;
                if call.mangled_name() == Some(&mangled_name) {
                    return Ok(Expression::MethodCall(call));
                }
                trace!(target = %mangled_name, "stamp call site");
                Ok(Expression::MethodCall(
                    call.into_builder().mangled_name(Some(mangled_name)).build()?,
                ))
            }
            expression => Ok(expression),
        }
    }
}
