use super::conversion_context::{ContextRewriter, ConversionContextRewriter};
use crate::error::PassError;
use crate::pass::{PassContext, UnitPass};
use plow_ast::ast_utils::default_value;
use plow_ast::{CompilationUnit, Expression, Rewriter};
use plow_types::{TypeId, TypeRegistry};
use tracing::trace;

/// Gives every `null` in a conversion context the type of the slot it flows
/// into.
///
/// A slot typed by a non-native js-enum takes `null` typed `Object`: such an
/// enum is represented by its boxed value, whose default is the object
/// default rather than the enum's own.
pub struct NormalizeNullLiterals;

impl UnitPass for NormalizeNullLiterals {
    fn name(&self) -> &'static str {
        "normalize-null-literals"
    }

    fn apply_to_unit(
        &self,
        unit: CompilationUnit,
        context: &mut PassContext<'_>,
    ) -> Result<CompilationUnit, PassError> {
        let retyper = NullLiteralRetyper {
            registry: context.registry,
            retyped: 0,
        };
        let mut rewriter = ConversionContextRewriter::new(retyper);
        let unit = rewriter.rewrite_unit(unit)?;
        let retyped = rewriter.into_inner().retyped;
        if retyped > 0 {
            trace!(unit = %unit.file_path(), retyped, "null literals retyped");
        }
        Ok(unit)
    }
}

struct NullLiteralRetyper<'a> {
    registry: &'a TypeRegistry,
    retyped: usize,
}

impl ContextRewriter for NullLiteralRetyper<'_> {
    fn rewrite_type_conversion_context(
        &mut self,
        inferred: TypeId,
        actual: TypeId,
        expression: Expression,
    ) -> Result<Expression, PassError> {
        if !expression.is_null_literal() {
            return Ok(expression);
        }
        let descriptor = self.registry.descriptor(inferred)?;
        let target = if descriptor.is_js_enum() && !descriptor.is_native() {
            TypeId::OBJECT
        } else {
            inferred
        };
        let normalized = default_value(target);
        if normalized != expression {
            trace!(from = ?actual, to = ?target, "null literal");
            self.retyped += 1;
        }
        Ok(normalized)
    }
}
