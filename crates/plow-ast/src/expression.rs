//! Expression nodes.
//!
//! `Expression` is a closed enum. The struct-shaped expressions (variables,
//! field accesses, calls and instantiations) are only created through their
//! builders, which validate them against their descriptors.

use crate::error::ConstructionError;
use plow_types::{FieldDescriptor, MethodDescriptor, TypeId};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NumberValue {
    Integral(i64),
    Floating(f64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Plus,
    Minus,
    Times,
    Divide,
    Remainder,
    Equals,
    NotEquals,
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    ConditionalAnd,
    ConditionalOr,
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Times => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Remainder => "%",
            BinaryOperator::Equals => "==",
            BinaryOperator::NotEquals => "!=",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEquals => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEquals => ">=",
            BinaryOperator::ConditionalAnd => "&&",
            BinaryOperator::ConditionalOr => "||",
        }
    }

    /// Operators whose result is `boolean` regardless of operand types.
    pub fn is_boolean(self) -> bool {
        !matches!(
            self,
            BinaryOperator::Plus
                | BinaryOperator::Minus
                | BinaryOperator::Times
                | BinaryOperator::Divide
                | BinaryOperator::Remainder
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrefixOperator {
    Minus,
    Not,
    Increment,
    Decrement,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PostfixOperator {
    Increment,
    Decrement,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    // =========================================================================
    // Literals
    // =========================================================================
    /// `null`, typed by the context it flows into once normalized.
    NullLiteral(TypeId),

    /// `true`, `false`
    BooleanLiteral(bool),

    /// `42`, `1.5`, `'c'` (chars are integral literals of type `char`)
    NumberLiteral { value: NumberValue, type_id: TypeId },

    /// `"text"`
    StringLiteral(Arc<str>),

    // =========================================================================
    // References
    // =========================================================================
    /// `this` inside the given type.
    This(TypeId),

    VariableReference(Variable),

    /// `qualifier.field`, or `Type.field` for statics.
    FieldAccess(FieldAccess),

    // =========================================================================
    // Invocations
    // =========================================================================
    /// `qualifier.method(args)`
    MethodCall(MethodCall),

    /// `new Type(args)`
    NewInstance(NewInstance),

    // =========================================================================
    // Operators
    // =========================================================================
    /// `target = value`
    Assignment {
        target: Box<Expression>,
        value: Box<Expression>,
    },

    /// `left op right`
    Binary {
        operator: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
        type_id: TypeId,
    },

    /// `op operand`
    Prefix {
        operator: PrefixOperator,
        operand: Box<Expression>,
    },

    /// `operand op`
    Postfix {
        operator: PostfixOperator,
        operand: Box<Expression>,
    },

    /// `(Type) expression`
    Cast {
        type_id: TypeId,
        expression: Box<Expression>,
    },

    /// `condition ? when_true : when_false`
    Conditional {
        condition: Box<Expression>,
        when_true: Box<Expression>,
        when_false: Box<Expression>,
        type_id: TypeId,
    },
}

impl Expression {
    /// Static type of the expression.
    pub fn type_descriptor(&self) -> TypeId {
        match self {
            Expression::NullLiteral(type_id) => *type_id,
            Expression::BooleanLiteral(_) => TypeId::BOOLEAN,
            Expression::NumberLiteral { type_id, .. } => *type_id,
            Expression::StringLiteral(_) => TypeId::STRING,
            Expression::This(type_id) => *type_id,
            Expression::VariableReference(variable) => variable.type_id(),
            Expression::FieldAccess(access) => access.target().field_type(),
            Expression::MethodCall(call) => call.target().return_type(),
            Expression::NewInstance(instance) => instance.instantiated_type(),
            Expression::Assignment { target, .. } => target.type_descriptor(),
            Expression::Binary { type_id, .. } => *type_id,
            Expression::Prefix {
                operator: PrefixOperator::Not,
                ..
            } => TypeId::BOOLEAN,
            Expression::Prefix { operand, .. } | Expression::Postfix { operand, .. } => {
                operand.type_descriptor()
            }
            Expression::Cast { type_id, .. } => *type_id,
            Expression::Conditional { type_id, .. } => *type_id,
        }
    }

    pub fn null() -> Self {
        Expression::NullLiteral(TypeId::NULL)
    }

    pub fn int(value: i64) -> Self {
        Expression::NumberLiteral {
            value: NumberValue::Integral(value),
            type_id: TypeId::INT,
        }
    }

    pub fn string(text: impl Into<Arc<str>>) -> Self {
        Expression::StringLiteral(text.into())
    }

    pub fn assign(target: Expression, value: Expression) -> Self {
        Expression::Assignment {
            target: Box::new(target),
            value: Box::new(value),
        }
    }

    pub fn binary(
        operator: BinaryOperator,
        left: Expression,
        right: Expression,
        type_id: TypeId,
    ) -> Self {
        Expression::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            type_id,
        }
    }

    pub fn prefix(operator: PrefixOperator, operand: Expression) -> Self {
        Expression::Prefix {
            operator,
            operand: Box::new(operand),
        }
    }

    pub fn postfix(operator: PostfixOperator, operand: Expression) -> Self {
        Expression::Postfix {
            operator,
            operand: Box::new(operand),
        }
    }

    pub fn cast(type_id: TypeId, expression: Expression) -> Self {
        Expression::Cast {
            type_id,
            expression: Box::new(expression),
        }
    }

    pub fn is_null_literal(&self) -> bool {
        matches!(self, Expression::NullLiteral(_))
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Expression::NullLiteral(_)
                | Expression::BooleanLiteral(_)
                | Expression::NumberLiteral { .. }
                | Expression::StringLiteral(_)
        )
    }
}

// =============================================================================
// Variable
// =============================================================================

/// A local variable or parameter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Variable {
    pub(crate) name: Arc<str>,
    pub(crate) type_id: TypeId,
    pub(crate) is_final: bool,
    pub(crate) is_parameter: bool,
}

impl Variable {
    pub fn new(name: impl Into<Arc<str>>, type_id: TypeId) -> Self {
        Variable {
            name: name.into(),
            type_id,
            is_final: false,
            is_parameter: false,
        }
    }

    pub fn parameter(name: impl Into<Arc<str>>, type_id: TypeId) -> Self {
        Variable {
            is_parameter: true,
            ..Variable::new(name, type_id)
        }
    }

    pub fn builder() -> VariableBuilder {
        VariableBuilder::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn is_parameter(&self) -> bool {
        self.is_parameter
    }

    pub fn reference(&self) -> Expression {
        Expression::VariableReference(self.clone())
    }
}

#[derive(Clone, Debug, Default)]
pub struct VariableBuilder {
    name: Option<Arc<str>>,
    type_id: Option<TypeId>,
    is_final: bool,
    is_parameter: bool,
}

impl VariableBuilder {
    pub fn name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn type_id(mut self, type_id: TypeId) -> Self {
        self.type_id = Some(type_id);
        self
    }

    pub fn is_final(mut self, is_final: bool) -> Self {
        self.is_final = is_final;
        self
    }

    pub fn is_parameter(mut self, is_parameter: bool) -> Self {
        self.is_parameter = is_parameter;
        self
    }

    pub fn build(self) -> Result<Variable, ConstructionError> {
        let name = self
            .name
            .filter(|name| !name.is_empty())
            .ok_or(ConstructionError::MissingField {
                node: "Variable",
                field: "name",
            })?;
        let type_id = self.type_id.ok_or(ConstructionError::MissingField {
            node: "Variable",
            field: "type",
        })?;
        Ok(Variable {
            name,
            type_id,
            is_final: self.is_final,
            is_parameter: self.is_parameter,
        })
    }
}

impl From<&Variable> for VariableBuilder {
    fn from(variable: &Variable) -> Self {
        VariableBuilder {
            name: Some(variable.name.clone()),
            type_id: Some(variable.type_id),
            is_final: variable.is_final,
            is_parameter: variable.is_parameter,
        }
    }
}

// =============================================================================
// FieldAccess
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct FieldAccess {
    pub(crate) qualifier: Option<Box<Expression>>,
    pub(crate) target: Arc<FieldDescriptor>,
}

impl FieldAccess {
    pub fn builder() -> FieldAccessBuilder {
        FieldAccessBuilder::default()
    }

    /// `None` for a static field reached through its type.
    pub fn qualifier(&self) -> Option<&Expression> {
        self.qualifier.as_deref()
    }

    pub fn target(&self) -> &Arc<FieldDescriptor> {
        &self.target
    }
}

#[derive(Clone, Debug, Default)]
pub struct FieldAccessBuilder {
    qualifier: Option<Expression>,
    target: Option<Arc<FieldDescriptor>>,
}

impl FieldAccessBuilder {
    pub fn qualifier(mut self, qualifier: Option<Expression>) -> Self {
        self.qualifier = qualifier;
        self
    }

    pub fn target(mut self, target: Arc<FieldDescriptor>) -> Self {
        self.target = Some(target);
        self
    }

    pub fn build(self) -> Result<FieldAccess, ConstructionError> {
        let target = self.target.ok_or(ConstructionError::MissingField {
            node: "FieldAccess",
            field: "target",
        })?;
        Ok(FieldAccess {
            qualifier: self.qualifier.map(Box::new),
            target,
        })
    }
}

impl From<&FieldAccess> for FieldAccessBuilder {
    fn from(access: &FieldAccess) -> Self {
        FieldAccessBuilder {
            qualifier: access.qualifier.as_deref().cloned(),
            target: Some(access.target.clone()),
        }
    }
}

// =============================================================================
// MethodCall
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct MethodCall {
    pub(crate) qualifier: Option<Box<Expression>>,
    pub(crate) target: Arc<MethodDescriptor>,
    pub(crate) arguments: Vec<Expression>,
    pub(crate) is_static_dispatch: bool,
    pub(crate) mangled_name: Option<Arc<str>>,
}

impl MethodCall {
    pub fn builder() -> MethodCallBuilder {
        MethodCallBuilder::default()
    }

    /// `None` for static calls.
    pub fn qualifier(&self) -> Option<&Expression> {
        self.qualifier.as_deref()
    }

    pub fn target(&self) -> &Arc<MethodDescriptor> {
        &self.target
    }

    pub fn arguments(&self) -> &[Expression] {
        &self.arguments
    }

    /// `super.m()` style calls that must not dispatch on the receiver.
    pub fn is_static_dispatch(&self) -> bool {
        self.is_static_dispatch
    }

    /// Target-language name, stamped by call-site mangling.
    pub fn mangled_name(&self) -> Option<&Arc<str>> {
        self.mangled_name.as_ref()
    }

    pub fn into_builder(self) -> MethodCallBuilder {
        MethodCallBuilder {
            qualifier: self.qualifier.map(|qualifier| *qualifier),
            target: Some(self.target),
            arguments: self.arguments,
            is_static_dispatch: self.is_static_dispatch,
            mangled_name: self.mangled_name,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MethodCallBuilder {
    qualifier: Option<Expression>,
    target: Option<Arc<MethodDescriptor>>,
    arguments: Vec<Expression>,
    is_static_dispatch: bool,
    mangled_name: Option<Arc<str>>,
}

impl MethodCallBuilder {
    pub fn qualifier(mut self, qualifier: Option<Expression>) -> Self {
        self.qualifier = qualifier;
        self
    }

    pub fn target(mut self, target: Arc<MethodDescriptor>) -> Self {
        self.target = Some(target);
        self
    }

    pub fn arguments(mut self, arguments: Vec<Expression>) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn take_arguments(&mut self) -> Vec<Expression> {
        std::mem::take(&mut self.arguments)
    }

    pub fn is_static_dispatch(mut self, is_static_dispatch: bool) -> Self {
        self.is_static_dispatch = is_static_dispatch;
        self
    }

    pub fn mangled_name(mut self, mangled_name: Option<Arc<str>>) -> Self {
        self.mangled_name = mangled_name;
        self
    }

    pub fn build(self) -> Result<MethodCall, ConstructionError> {
        let target = self.target.ok_or(ConstructionError::MissingField {
            node: "MethodCall",
            field: "target",
        })?;
        if target.parameters().len() != self.arguments.len() {
            return Err(ConstructionError::ArgumentCount {
                method: target.name().to_string(),
                expected: target.parameters().len(),
                found: self.arguments.len(),
            });
        }
        Ok(MethodCall {
            qualifier: self.qualifier.map(Box::new),
            target,
            arguments: self.arguments,
            is_static_dispatch: self.is_static_dispatch,
            mangled_name: self.mangled_name,
        })
    }
}

impl From<&MethodCall> for MethodCallBuilder {
    fn from(call: &MethodCall) -> Self {
        MethodCallBuilder {
            qualifier: call.qualifier.as_deref().cloned(),
            target: Some(call.target.clone()),
            arguments: call.arguments.clone(),
            is_static_dispatch: call.is_static_dispatch,
            mangled_name: call.mangled_name.clone(),
        }
    }
}

// =============================================================================
// NewInstance
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct NewInstance {
    pub(crate) constructor: Arc<MethodDescriptor>,
    pub(crate) arguments: Vec<Expression>,
}

impl NewInstance {
    pub fn new(
        constructor: Arc<MethodDescriptor>,
        arguments: Vec<Expression>,
    ) -> Result<Self, ConstructionError> {
        if constructor.parameters().len() != arguments.len() {
            return Err(ConstructionError::ArgumentCount {
                method: constructor.name().to_string(),
                expected: constructor.parameters().len(),
                found: arguments.len(),
            });
        }
        Ok(NewInstance {
            constructor,
            arguments,
        })
    }

    pub fn constructor(&self) -> &Arc<MethodDescriptor> {
        &self.constructor
    }

    pub fn arguments(&self) -> &[Expression] {
        &self.arguments
    }

    pub fn instantiated_type(&self) -> TypeId {
        self.constructor.enclosing_type()
    }

    pub fn into_parts(self) -> (Arc<MethodDescriptor>, Vec<Expression>) {
        (self.constructor, self.arguments)
    }
}
