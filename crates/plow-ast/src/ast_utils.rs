//! Helpers for synthesizing tree fragments.

use crate::error::ConstructionError;
use crate::expression::{Expression, MethodCall, NumberValue, Variable};
use crate::statement::Statement;
use plow_types::{MethodDescriptor, TypeId};
use std::sync::Arc;

/// Fresh parameters `arg0`, `arg1`, ... of the given types.
pub fn create_parameter_variables(types: &[TypeId]) -> Vec<Variable> {
    types
        .iter()
        .enumerate()
        .map(|(index, &type_id)| Variable::parameter(format!("arg{index}"), type_id))
        .collect()
}

/// The value a field of `type_id` holds before its initializer runs.
pub fn default_value(type_id: TypeId) -> Expression {
    match type_id {
        TypeId::BOOLEAN => Expression::BooleanLiteral(false),
        TypeId::FLOAT | TypeId::DOUBLE => Expression::NumberLiteral {
            value: NumberValue::Floating(0.0),
            type_id,
        },
        TypeId::BYTE | TypeId::SHORT | TypeId::CHAR | TypeId::INT | TypeId::LONG => {
            Expression::NumberLiteral {
                value: NumberValue::Integral(0),
                type_id,
            }
        }
        _ => Expression::NullLiteral(type_id),
    }
}

/// `return this.target((P0) arg0, ...);`, or an expression statement when
/// `returns_value` is false.
///
/// An argument is cast only where its variable type differs from `target`'s
/// parameter type.
pub fn create_forwarding_statement(
    this_type: TypeId,
    target: &Arc<MethodDescriptor>,
    parameters: &[Variable],
    returns_value: bool,
) -> Result<Statement, ConstructionError> {
    let arguments = parameters
        .iter()
        .zip(target.parameters())
        .map(|(parameter, &parameter_type)| {
            let reference = parameter.reference();
            if parameter.type_id() == parameter_type {
                reference
            } else {
                Expression::cast(parameter_type, reference)
            }
        })
        .collect::<Vec<_>>();

    let call = MethodCall::builder()
        .qualifier(Some(Expression::This(this_type)))
        .target(target.clone())
        .arguments(arguments)
        .build()?;
    let call = Expression::MethodCall(call);

    Ok(if returns_value {
        Statement::return_value(Some(call))
    } else {
        Statement::expression(call)
    })
}
