//! Conversion contexts.
//!
//! A conversion context is a position where a value flows into a slot of a
//! known type: the right-hand side of an assignment, a field or variable
//! initializer, a call or instantiation argument, a returned value and the
//! operand of a cast. [`ConversionContextRewriter`] walks a tree bottom-up and
//! offers every such expression to a [`ContextRewriter`] together with the
//! slot's type (inferred) and the expression's own type (actual).

use crate::error::PassError;
use plow_ast::visit::{
    rewrite_expression_children, rewrite_method_children, rewrite_statement_children,
};
use plow_ast::{Expression, Field, Method, NewInstance, Rewriter, Statement};
use plow_types::TypeId;

pub trait ContextRewriter {
    fn rewrite_type_conversion_context(
        &mut self,
        inferred: TypeId,
        actual: TypeId,
        expression: Expression,
    ) -> Result<Expression, PassError>;
}

pub struct ConversionContextRewriter<R> {
    rewriter: R,
    /// Return types of the enclosing methods, innermost last.
    return_types: Vec<TypeId>,
}

impl<R: ContextRewriter> ConversionContextRewriter<R> {
    pub fn new(rewriter: R) -> Self {
        ConversionContextRewriter {
            rewriter,
            return_types: Vec::new(),
        }
    }

    pub fn into_inner(self) -> R {
        self.rewriter
    }

    fn convert(&mut self, inferred: TypeId, expression: Expression) -> Result<Expression, PassError> {
        let actual = expression.type_descriptor();
        self.rewriter
            .rewrite_type_conversion_context(inferred, actual, expression)
    }

    fn convert_arguments(
        &mut self,
        parameters: &[TypeId],
        arguments: Vec<Expression>,
    ) -> Result<Vec<Expression>, PassError> {
        arguments
            .into_iter()
            .zip(parameters.iter().copied())
            .map(|(argument, parameter)| self.convert(parameter, argument))
            .collect()
    }
}

impl<R: ContextRewriter> Rewriter for ConversionContextRewriter<R> {
    type Error = PassError;

    fn rewrite_method(&mut self, method: Method) -> Result<Method, PassError> {
        self.return_types.push(method.descriptor().return_type());
        let result = rewrite_method_children(self, method);
        self.return_types.pop();
        result
    }

    fn rewrite_field(&mut self, field: Field) -> Result<Field, PassError> {
        let inferred = field.descriptor().field_type();
        let mut builder = field.into_builder();
        if let Some(initializer) = builder.take_initializer() {
            let initializer = self.rewrite_expression(initializer)?;
            let initializer = self.convert(inferred, initializer)?;
            builder = builder.initializer(Some(initializer));
        }
        Ok(builder.build()?)
    }

    fn rewrite_statement(&mut self, statement: Statement) -> Result<Statement, PassError> {
        match rewrite_statement_children(self, statement)? {
            Statement::VariableDeclaration {
                variable,
                initializer: Some(initializer),
                position,
            } => {
                let initializer = self.convert(variable.type_id(), initializer)?;
                Ok(Statement::VariableDeclaration {
                    variable,
                    initializer: Some(initializer),
                    position,
                })
            }
            Statement::Return {
                expression: Some(expression),
                position,
            } => {
                let expression = match self.return_types.last().copied() {
                    Some(return_type) => self.convert(return_type, expression)?,
                    None => expression,
                };
                Ok(Statement::Return {
                    expression: Some(expression),
                    position,
                })
            }
            statement => Ok(statement),
        }
    }

    fn rewrite_expression(&mut self, expression: Expression) -> Result<Expression, PassError> {
        Ok(match rewrite_expression_children(self, expression)? {
            Expression::Assignment { target, value } => {
                let value = self.convert(target.type_descriptor(), *value)?;
                Expression::Assignment {
                    target,
                    value: Box::new(value),
                }
            }
            Expression::MethodCall(call) => {
                let target = call.target().clone();
                let mut builder = call.into_builder();
                let arguments = builder.take_arguments();
                let arguments = self.convert_arguments(target.parameters(), arguments)?;
                Expression::MethodCall(builder.arguments(arguments).build()?)
            }
            Expression::NewInstance(instance) => {
                let (constructor, arguments) = instance.into_parts();
                let arguments = self.convert_arguments(constructor.parameters(), arguments)?;
                Expression::NewInstance(NewInstance::new(constructor, arguments)?)
            }
            Expression::Cast {
                type_id,
                expression,
            } => Expression::Cast {
                type_id,
                expression: Box::new(self.convert(type_id, *expression)?),
            },
            expression => expression,
        })
    }
}
