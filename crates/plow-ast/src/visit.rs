//! Tree traversal.
//!
//! [`Visitor`] walks a tree by reference. [`Rewriter`] consumes a tree and
//! rebuilds it bottom-up; every `rewrite_*` default delegates to the matching
//! `rewrite_*_children` function, so an implementation overrides only the
//! nodes it changes and calls back into the children function to keep
//! descending.

use crate::error::ConstructionError;
use crate::expression::{Expression, FieldAccess, MethodCall, NewInstance};
use crate::member::{Field, InitializerBlock, Member, Method};
use crate::statement::{Block, Statement};
use crate::unit::{CompilationUnit, Program, Type};

// =============================================================================
// Visitor
// =============================================================================

pub trait Visitor {
    fn visit_unit(&mut self, unit: &CompilationUnit) {
        walk_unit(self, unit);
    }

    fn visit_type(&mut self, ty: &Type) {
        walk_type(self, ty);
    }

    fn visit_member(&mut self, member: &Member) {
        walk_member(self, member);
    }

    fn visit_method(&mut self, method: &Method) {
        walk_method(self, method);
    }

    fn visit_field(&mut self, field: &Field) {
        walk_field(self, field);
    }

    fn visit_initializer_block(&mut self, block: &InitializerBlock) {
        walk_block(self, block.block());
    }

    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }

    fn visit_statement(&mut self, statement: &Statement) {
        walk_statement(self, statement);
    }

    fn visit_expression(&mut self, expression: &Expression) {
        walk_expression(self, expression);
    }
}

pub fn walk_program<V: Visitor + ?Sized>(visitor: &mut V, program: &Program) {
    for unit in program.units() {
        visitor.visit_unit(unit);
    }
}

pub fn walk_unit<V: Visitor + ?Sized>(visitor: &mut V, unit: &CompilationUnit) {
    for ty in unit.types() {
        visitor.visit_type(ty);
    }
}

pub fn walk_type<V: Visitor + ?Sized>(visitor: &mut V, ty: &Type) {
    for member in ty.members() {
        visitor.visit_member(member);
    }
}

pub fn walk_member<V: Visitor + ?Sized>(visitor: &mut V, member: &Member) {
    match member {
        Member::Method(method) => visitor.visit_method(method),
        Member::Field(field) => visitor.visit_field(field),
        Member::InitializerBlock(block) => visitor.visit_initializer_block(block),
    }
}

pub fn walk_method<V: Visitor + ?Sized>(visitor: &mut V, method: &Method) {
    if let Some(body) = method.body() {
        visitor.visit_block(body);
    }
}

pub fn walk_field<V: Visitor + ?Sized>(visitor: &mut V, field: &Field) {
    if let Some(initializer) = field.initializer() {
        visitor.visit_expression(initializer);
    }
}

pub fn walk_block<V: Visitor + ?Sized>(visitor: &mut V, block: &Block) {
    for statement in block.statements() {
        visitor.visit_statement(statement);
    }
}

pub fn walk_statement<V: Visitor + ?Sized>(visitor: &mut V, statement: &Statement) {
    match statement {
        Statement::Expression { expression, .. } | Statement::Throw { expression, .. } => {
            visitor.visit_expression(expression);
        }
        Statement::VariableDeclaration { initializer, .. } => {
            if let Some(initializer) = initializer {
                visitor.visit_expression(initializer);
            }
        }
        Statement::Return { expression, .. } => {
            if let Some(expression) = expression {
                visitor.visit_expression(expression);
            }
        }
        Statement::Block(block) => visitor.visit_block(block),
        Statement::If {
            condition,
            then_statement,
            else_statement,
            ..
        } => {
            visitor.visit_expression(condition);
            visitor.visit_statement(then_statement);
            if let Some(else_statement) = else_statement {
                visitor.visit_statement(else_statement);
            }
        }
        Statement::While {
            condition, body, ..
        } => {
            visitor.visit_expression(condition);
            visitor.visit_statement(body);
        }
        Statement::Labeled { body, .. } => visitor.visit_statement(body),
        Statement::Assert {
            condition, message, ..
        } => {
            visitor.visit_expression(condition);
            if let Some(message) = message {
                visitor.visit_expression(message);
            }
        }
        Statement::Break { .. } | Statement::Continue { .. } => {}
    }
}

pub fn walk_expression<V: Visitor + ?Sized>(visitor: &mut V, expression: &Expression) {
    match expression {
        Expression::NullLiteral(_)
        | Expression::BooleanLiteral(_)
        | Expression::NumberLiteral { .. }
        | Expression::StringLiteral(_)
        | Expression::This(_)
        | Expression::VariableReference(_) => {}
        Expression::FieldAccess(access) => {
            if let Some(qualifier) = access.qualifier() {
                visitor.visit_expression(qualifier);
            }
        }
        Expression::MethodCall(call) => {
            if let Some(qualifier) = call.qualifier() {
                visitor.visit_expression(qualifier);
            }
            for argument in call.arguments() {
                visitor.visit_expression(argument);
            }
        }
        Expression::NewInstance(instance) => {
            for argument in instance.arguments() {
                visitor.visit_expression(argument);
            }
        }
        Expression::Assignment { target, value } => {
            visitor.visit_expression(target);
            visitor.visit_expression(value);
        }
        Expression::Binary { left, right, .. } => {
            visitor.visit_expression(left);
            visitor.visit_expression(right);
        }
        Expression::Prefix { operand, .. } | Expression::Postfix { operand, .. } => {
            visitor.visit_expression(operand);
        }
        Expression::Cast { expression, .. } => visitor.visit_expression(expression),
        Expression::Conditional {
            condition,
            when_true,
            when_false,
            ..
        } => {
            visitor.visit_expression(condition);
            visitor.visit_expression(when_true);
            visitor.visit_expression(when_false);
        }
    }
}

// =============================================================================
// Rewriter
// =============================================================================

pub trait Rewriter {
    type Error: From<ConstructionError>;

    fn rewrite_unit(&mut self, unit: CompilationUnit) -> Result<CompilationUnit, Self::Error> {
        rewrite_unit_children(self, unit)
    }

    fn rewrite_type(&mut self, ty: Type) -> Result<Type, Self::Error> {
        rewrite_type_children(self, ty)
    }

    fn rewrite_member(&mut self, member: Member) -> Result<Member, Self::Error> {
        rewrite_member_children(self, member)
    }

    fn rewrite_method(&mut self, method: Method) -> Result<Method, Self::Error> {
        rewrite_method_children(self, method)
    }

    fn rewrite_field(&mut self, field: Field) -> Result<Field, Self::Error> {
        rewrite_field_children(self, field)
    }

    fn rewrite_initializer_block(
        &mut self,
        block: InitializerBlock,
    ) -> Result<InitializerBlock, Self::Error> {
        rewrite_initializer_block_children(self, block)
    }

    fn rewrite_block(&mut self, block: Block) -> Result<Block, Self::Error> {
        rewrite_block_children(self, block)
    }

    fn rewrite_statement(&mut self, statement: Statement) -> Result<Statement, Self::Error> {
        rewrite_statement_children(self, statement)
    }

    fn rewrite_expression(&mut self, expression: Expression) -> Result<Expression, Self::Error> {
        rewrite_expression_children(self, expression)
    }
}

pub fn rewrite_unit_children<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    mut unit: CompilationUnit,
) -> Result<CompilationUnit, R::Error> {
    unit.types = std::mem::take(&mut unit.types)
        .into_iter()
        .map(|ty| rewriter.rewrite_type(ty))
        .collect::<Result<_, _>>()?;
    Ok(unit)
}

pub fn rewrite_type_children<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    mut ty: Type,
) -> Result<Type, R::Error> {
    ty.members = std::mem::take(&mut ty.members)
        .into_iter()
        .map(|member| rewriter.rewrite_member(member))
        .collect::<Result<_, _>>()?;
    Ok(ty)
}

pub fn rewrite_member_children<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    member: Member,
) -> Result<Member, R::Error> {
    Ok(match member {
        Member::Method(method) => Member::Method(rewriter.rewrite_method(method)?),
        Member::Field(field) => Member::Field(rewriter.rewrite_field(field)?),
        Member::InitializerBlock(block) => {
            Member::InitializerBlock(rewriter.rewrite_initializer_block(block)?)
        }
    })
}

pub fn rewrite_method_children<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    mut method: Method,
) -> Result<Method, R::Error> {
    method.body = method
        .body
        .take()
        .map(|body| rewriter.rewrite_block(body))
        .transpose()?;
    Ok(method)
}

pub fn rewrite_field_children<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    mut field: Field,
) -> Result<Field, R::Error> {
    field.initializer = field
        .initializer
        .take()
        .map(|initializer| rewriter.rewrite_expression(initializer))
        .transpose()?;
    Ok(field)
}

pub fn rewrite_initializer_block_children<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    mut block: InitializerBlock,
) -> Result<InitializerBlock, R::Error> {
    block.block = rewriter.rewrite_block(std::mem::take(&mut block.block))?;
    Ok(block)
}

pub fn rewrite_block_children<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    mut block: Block,
) -> Result<Block, R::Error> {
    block.statements = std::mem::take(&mut block.statements)
        .into_iter()
        .map(|statement| rewriter.rewrite_statement(statement))
        .collect::<Result<_, _>>()?;
    Ok(block)
}

pub fn rewrite_statement_children<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    statement: Statement,
) -> Result<Statement, R::Error> {
    Ok(match statement {
        Statement::Expression {
            expression,
            position,
        } => Statement::Expression {
            expression: rewriter.rewrite_expression(expression)?,
            position,
        },
        Statement::VariableDeclaration {
            variable,
            initializer,
            position,
        } => Statement::VariableDeclaration {
            variable,
            initializer: initializer
                .map(|initializer| rewriter.rewrite_expression(initializer))
                .transpose()?,
            position,
        },
        Statement::Return {
            expression,
            position,
        } => Statement::Return {
            expression: expression
                .map(|expression| rewriter.rewrite_expression(expression))
                .transpose()?,
            position,
        },
        Statement::Block(block) => Statement::Block(rewriter.rewrite_block(block)?),
        Statement::If {
            condition,
            then_statement,
            else_statement,
            position,
        } => Statement::If {
            condition: rewriter.rewrite_expression(condition)?,
            then_statement: Box::new(rewriter.rewrite_statement(*then_statement)?),
            else_statement: else_statement
                .map(|statement| rewriter.rewrite_statement(*statement).map(Box::new))
                .transpose()?,
            position,
        },
        Statement::While {
            condition,
            body,
            position,
        } => Statement::While {
            condition: rewriter.rewrite_expression(condition)?,
            body: Box::new(rewriter.rewrite_statement(*body)?),
            position,
        },
        Statement::Labeled {
            label,
            body,
            position,
        } => Statement::Labeled {
            label,
            body: Box::new(rewriter.rewrite_statement(*body)?),
            position,
        },
        Statement::Assert {
            condition,
            message,
            position,
        } => Statement::Assert {
            condition: rewriter.rewrite_expression(condition)?,
            message: message
                .map(|message| rewriter.rewrite_expression(message))
                .transpose()?,
            position,
        },
        Statement::Throw {
            expression,
            position,
        } => Statement::Throw {
            expression: rewriter.rewrite_expression(expression)?,
            position,
        },
        statement @ (Statement::Break { .. } | Statement::Continue { .. }) => statement,
    })
}

pub fn rewrite_expression_children<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    expression: Expression,
) -> Result<Expression, R::Error> {
    Ok(match expression {
        leaf @ (Expression::NullLiteral(_)
        | Expression::BooleanLiteral(_)
        | Expression::NumberLiteral { .. }
        | Expression::StringLiteral(_)
        | Expression::This(_)
        | Expression::VariableReference(_)) => leaf,
        Expression::FieldAccess(FieldAccess { qualifier, target }) => {
            Expression::FieldAccess(FieldAccess {
                qualifier: rewrite_boxed(rewriter, qualifier)?,
                target,
            })
        }
        Expression::MethodCall(call) => {
            let MethodCall {
                qualifier,
                target,
                arguments,
                is_static_dispatch,
                mangled_name,
            } = call;
            Expression::MethodCall(MethodCall {
                qualifier: rewrite_boxed(rewriter, qualifier)?,
                target,
                arguments: rewrite_all(rewriter, arguments)?,
                is_static_dispatch,
                mangled_name,
            })
        }
        Expression::NewInstance(NewInstance {
            constructor,
            arguments,
        }) => Expression::NewInstance(NewInstance {
            constructor,
            arguments: rewrite_all(rewriter, arguments)?,
        }),
        Expression::Assignment { target, value } => Expression::Assignment {
            target: Box::new(rewriter.rewrite_expression(*target)?),
            value: Box::new(rewriter.rewrite_expression(*value)?),
        },
        Expression::Binary {
            operator,
            left,
            right,
            type_id,
        } => Expression::Binary {
            operator,
            left: Box::new(rewriter.rewrite_expression(*left)?),
            right: Box::new(rewriter.rewrite_expression(*right)?),
            type_id,
        },
        Expression::Prefix { operator, operand } => Expression::Prefix {
            operator,
            operand: Box::new(rewriter.rewrite_expression(*operand)?),
        },
        Expression::Postfix { operator, operand } => Expression::Postfix {
            operator,
            operand: Box::new(rewriter.rewrite_expression(*operand)?),
        },
        Expression::Cast {
            type_id,
            expression,
        } => Expression::Cast {
            type_id,
            expression: Box::new(rewriter.rewrite_expression(*expression)?),
        },
        Expression::Conditional {
            condition,
            when_true,
            when_false,
            type_id,
        } => Expression::Conditional {
            condition: Box::new(rewriter.rewrite_expression(*condition)?),
            when_true: Box::new(rewriter.rewrite_expression(*when_true)?),
            when_false: Box::new(rewriter.rewrite_expression(*when_false)?),
            type_id,
        },
    })
}

fn rewrite_boxed<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    expression: Option<Box<Expression>>,
) -> Result<Option<Box<Expression>>, R::Error> {
    expression
        .map(|expression| rewriter.rewrite_expression(*expression).map(Box::new))
        .transpose()
}

fn rewrite_all<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    expressions: Vec<Expression>,
) -> Result<Vec<Expression>, R::Error> {
    expressions
        .into_iter()
        .map(|expression| rewriter.rewrite_expression(expression))
        .collect()
}
