//! Shared fixtures and a small interpreter for lowered programs.
//!
//! The interpreter runs a program the way the target language would: a call
//! is resolved at its static type to a mangled name, and the name is looked up
//! on the receiver's class through the dispatch table. Nothing else about the
//! source language's dispatch rules is modeled, so a missing bridge shows up as
//! a failed lookup.

#![allow(dead_code)]

use plow_ast::ast_utils::create_parameter_variables;
use plow_ast::*;
use plow_common::SourcePosition;
use plow_passes::{
    DispatchTable, LoweringOptions, Pipeline, PipelineOutput, resolve_invocation,
};
use plow_types::{
    FieldDescriptor, FieldId, MethodDescriptor, TypeDeclaration, TypeId, TypeRegistry,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

// =============================================================================
// Fixtures
// =============================================================================

pub fn declare(registry: &TypeRegistry, declaration: TypeDeclaration) -> TypeId {
    let name = declaration.name.clone();
    registry
        .declare(declaration)
        .unwrap_or_else(|err| panic!("declare {name}: {err}"))
}

/// The method `name` declared by `ty` with exactly these parameters.
pub fn method(
    registry: &TypeRegistry,
    ty: TypeId,
    name: &str,
    parameters: &[TypeId],
) -> Arc<MethodDescriptor> {
    registry
        .declared_methods(ty)
        .unwrap()
        .iter()
        .find(|m| m.name() == name && m.parameters() == parameters)
        .cloned()
        .unwrap_or_else(|| panic!("no method {name}{parameters:?} on {}", registry.type_name(ty)))
}

pub fn field(registry: &TypeRegistry, ty: TypeId, name: &str) -> Arc<FieldDescriptor> {
    registry
        .declared_fields(ty)
        .unwrap()
        .iter()
        .find(|f| f.name() == name)
        .cloned()
        .unwrap_or_else(|| panic!("no field {name} on {}", registry.type_name(ty)))
}

/// A method node with fresh parameters and the given body.
pub fn method_node(descriptor: &Arc<MethodDescriptor>, statements: Vec<Statement>) -> Member {
    Member::Method(
        Method::builder()
            .descriptor(descriptor.clone())
            .parameters(create_parameter_variables(descriptor.parameters()))
            .statements(statements)
            .build()
            .unwrap(),
    )
}

pub fn abstract_node(descriptor: &Arc<MethodDescriptor>) -> Member {
    Member::Method(
        Method::builder()
            .descriptor(descriptor.clone())
            .parameters(create_parameter_variables(descriptor.parameters()))
            .build()
            .unwrap(),
    )
}

/// `{ return "text"; }`
pub fn returning(descriptor: &Arc<MethodDescriptor>, text: &str) -> Member {
    method_node(
        descriptor,
        vec![Statement::return_value(Some(Expression::string(text)))],
    )
}

pub fn field_node(descriptor: &Arc<FieldDescriptor>, initializer: Option<Expression>) -> Member {
    Member::Field(
        Field::builder()
            .descriptor(descriptor.clone())
            .initializer(initializer)
            .build()
            .unwrap(),
    )
}

pub fn static_block(statements: Vec<Statement>) -> Member {
    block(true, statements)
}

pub fn instance_block(statements: Vec<Statement>) -> Member {
    block(false, statements)
}

fn block(is_static: bool, statements: Vec<Statement>) -> Member {
    Member::InitializerBlock(
        InitializerBlock::builder()
            .is_static(is_static)
            .block(Block::new(statements))
            .build()
            .unwrap(),
    )
}

pub fn type_node(registry: &TypeRegistry, ty: TypeId, members: Vec<Member>) -> Type {
    Type::builder_for(registry, ty)
        .unwrap()
        .members(members)
        .position(SourcePosition::at_line(format!("{}.java", registry.type_name(ty)), 1))
        .build()
        .unwrap()
}

/// One compilation unit per type, in order.
pub fn program(types: Vec<Type>) -> Program {
    Program::new(
        types
            .into_iter()
            .enumerate()
            .map(|(index, ty)| {
                CompilationUnit::builder()
                    .file_path(format!("test/Unit{index}.java"))
                    .package_name("test")
                    .add_type(ty)
                    .build()
                    .unwrap()
            })
            .collect(),
    )
}

pub fn static_access(field: &Arc<FieldDescriptor>) -> Expression {
    Expression::FieldAccess(FieldAccess::builder().target(field.clone()).build().unwrap())
}

pub fn this_access(ty: TypeId, field: &Arc<FieldDescriptor>) -> Expression {
    Expression::FieldAccess(
        FieldAccess::builder()
            .qualifier(Some(Expression::This(ty)))
            .target(field.clone())
            .build()
            .unwrap(),
    )
}

pub fn static_call(target: &Arc<MethodDescriptor>, arguments: Vec<Expression>) -> Expression {
    Expression::MethodCall(
        MethodCall::builder()
            .target(target.clone())
            .arguments(arguments)
            .build()
            .unwrap(),
    )
}

pub fn lower(registry: &TypeRegistry, program: Program) -> PipelineOutput {
    lower_with(registry, program, LoweringOptions::default())
}

pub fn lower_with(
    registry: &TypeRegistry,
    program: Program,
    options: LoweringOptions,
) -> PipelineOutput {
    Pipeline::with_default_passes(options)
        .run(program, registry)
        .unwrap_or_else(|err| panic!("lowering failed: {err}"))
}

pub fn find_type(program: &Program, ty: TypeId) -> &Type {
    program
        .find_type(ty)
        .unwrap_or_else(|| panic!("type {ty:?} not in program"))
}

pub fn bridges(program: &Program, ty: TypeId) -> Vec<Arc<MethodDescriptor>> {
    find_type(program, ty)
        .methods()
        .filter(|method| method.descriptor().is_bridge())
        .map(|method| method.descriptor().clone())
        .collect()
}

// =============================================================================
// Interpreter
// =============================================================================

#[derive(Clone, Debug)]
pub enum Value {
    Void,
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Str(Arc<str>),
    Object(Rc<Instance>),
}

impl Value {
    pub fn str(text: &str) -> Value {
        Value::Str(Arc::from(text))
    }

    fn default_for(type_id: TypeId) -> Value {
        match type_id {
            TypeId::BOOLEAN => Value::Bool(false),
            TypeId::FLOAT | TypeId::DOUBLE => Value::Double(0.0),
            TypeId::BYTE | TypeId::SHORT | TypeId::CHAR | TypeId::INT | TypeId::LONG => {
                Value::Int(0)
            }
            _ => Value::Null,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Void, Value::Void) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[derive(Debug)]
pub struct Instance {
    /// Erased runtime class.
    pub class: TypeId,
    fields: RefCell<HashMap<FieldId, Value>>,
}

impl Instance {
    pub fn get(&self, field: &FieldDescriptor) -> Value {
        self.fields
            .borrow()
            .get(&field.id())
            .cloned()
            .unwrap_or_else(|| Value::default_for(field.field_type()))
    }
}

enum Flow {
    Normal,
    Return(Value),
}

struct Frame {
    this: Option<Value>,
    locals: HashMap<Arc<str>, Value>,
}

pub struct Interpreter<'a> {
    program: &'a Program,
    registry: &'a TypeRegistry,
    table: DispatchTable,
    statics: HashMap<FieldId, Value>,
}

type Outcome<T> = Result<T, String>;

impl<'a> Interpreter<'a> {
    pub fn new(program: &'a Program, registry: &'a TypeRegistry) -> Self {
        Interpreter {
            program,
            registry,
            table: DispatchTable::build(program, registry).unwrap(),
            statics: HashMap::new(),
        }
    }

    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    pub fn static_value(&self, field: &FieldDescriptor) -> Value {
        self.statics
            .get(&field.id())
            .cloned()
            .unwrap_or_else(|| Value::default_for(field.field_type()))
    }

    /// Runs the static method named `name` of `ty`.
    pub fn run_static(&mut self, ty: TypeId, name: &str) -> Outcome<Value> {
        let node = find_type(self.program, ty);
        let method = node
            .methods()
            .find(|method| method.descriptor().name() == name && method.descriptor().is_static())
            .ok_or_else(|| format!("no static method {name}"))?;
        self.execute(method, None, Vec::new())
    }

    /// `new C()` through C's no-argument constructor, or a bare instance when
    /// the class declares none.
    pub fn instantiate(&mut self, class: TypeId) -> Outcome<Value> {
        let instance = Value::Object(Rc::new(Instance {
            class: self.registry.erasure(class).map_err(|err| err.to_string())?,
            fields: RefCell::new(HashMap::new()),
        }));
        let constructor = find_type(self.program, class)
            .methods()
            .find(|method| {
                method.descriptor().is_constructor() && method.descriptor().parameters().is_empty()
            });
        if let Some(constructor) = constructor {
            self.execute(constructor, Some(instance.clone()), Vec::new())?;
        }
        Ok(instance)
    }

    /// A source-level call `((static_type) receiver).name(arguments)`.
    pub fn call(
        &mut self,
        receiver: &Value,
        static_type: TypeId,
        name: &str,
        arguments: Vec<(TypeId, Value)>,
    ) -> Outcome<Value> {
        let argument_types = arguments.iter().map(|(ty, _)| *ty).collect::<Vec<_>>();
        let target = resolve_invocation(self.registry, static_type, name, &argument_types)
            .map_err(|err| err.to_string())?
            .ok_or_else(|| format!("no applicable {name}{argument_types:?}"))?;
        let mangled_name = self
            .registry
            .mangled_name(&target)
            .map_err(|err| err.to_string())?;
        let values = arguments.into_iter().map(|(_, value)| value).collect();
        self.dispatch(receiver.clone(), &mangled_name, values)
    }

    fn dispatch(&mut self, receiver: Value, mangled_name: &str, arguments: Vec<Value>) -> Outcome<Value> {
        let Value::Object(instance) = &receiver else {
            return Err(format!("{mangled_name} called on {receiver:?}"));
        };
        let entry = self
            .table
            .lookup(instance.class, mangled_name)
            .ok_or_else(|| {
                format!(
                    "{} has no method {mangled_name}",
                    self.registry.type_name(instance.class)
                )
            })?
            .clone();
        let method = self.method_node(entry.declaring_type, &entry.method)?;
        self.execute(method, Some(receiver), arguments)
    }

    fn method_node(&self, ty: TypeId, descriptor: &MethodDescriptor) -> Outcome<&'a Method> {
        let program: &'a Program = self.program;
        let node = program
            .types()
            .find(|node| {
                node.descriptor() == ty
                    || self.registry.erasure(node.descriptor()).ok()
                        == self.registry.erasure(ty).ok()
            })
            .ok_or_else(|| format!("type {} not in program", self.registry.type_name(ty)))?;
        node.methods()
            .find(|method| method.descriptor().declaration().id() == descriptor.declaration().id())
            .ok_or_else(|| format!("no body for {}", self.registry.describe_method(descriptor)))
    }

    fn execute(&mut self, method: &Method, this: Option<Value>, arguments: Vec<Value>) -> Outcome<Value> {
        let body = method
            .body()
            .ok_or_else(|| format!("{} has no body", method.descriptor().name()))?;
        let mut frame = Frame {
            this,
            locals: method
                .parameters()
                .iter()
                .map(|parameter| Arc::from(parameter.name()))
                .zip(arguments)
                .collect(),
        };
        match self.run_block(body, &mut frame)? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Void),
        }
    }

    fn run_block(&mut self, block: &Block, frame: &mut Frame) -> Outcome<Flow> {
        for statement in block.statements() {
            if let Flow::Return(value) = self.run_statement(statement, frame)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    fn run_statement(&mut self, statement: &Statement, frame: &mut Frame) -> Outcome<Flow> {
        match statement {
            Statement::Expression { expression, .. } => {
                self.evaluate(expression, frame)?;
            }
            Statement::VariableDeclaration {
                variable,
                initializer,
                ..
            } => {
                let value = match initializer {
                    Some(initializer) => self.evaluate(initializer, frame)?,
                    None => Value::default_for(variable.type_id()),
                };
                frame.locals.insert(Arc::from(variable.name()), value);
            }
            Statement::Return { expression, .. } => {
                let value = match expression {
                    Some(expression) => self.evaluate(expression, frame)?,
                    None => Value::Void,
                };
                return Ok(Flow::Return(value));
            }
            Statement::Block(block) => return self.run_block(block, frame),
            Statement::If {
                condition,
                then_statement,
                else_statement,
                ..
            } => {
                if self.truthy(condition, frame)? {
                    return self.run_statement(then_statement, frame);
                }
                if let Some(else_statement) = else_statement {
                    return self.run_statement(else_statement, frame);
                }
            }
            Statement::Assert { condition, .. } => {
                if !self.truthy(condition, frame)? {
                    return Err(format!("assertion failed: {condition:?}"));
                }
            }
            other => return Err(format!("unsupported statement {other:?}")),
        }
        Ok(Flow::Normal)
    }

    fn truthy(&mut self, condition: &Expression, frame: &mut Frame) -> Outcome<bool> {
        match self.evaluate(condition, frame)? {
            Value::Bool(value) => Ok(value),
            other => Err(format!("condition evaluated to {other:?}")),
        }
    }

    fn evaluate(&mut self, expression: &Expression, frame: &mut Frame) -> Outcome<Value> {
        Ok(match expression {
            Expression::NullLiteral(_) => Value::Null,
            Expression::BooleanLiteral(value) => Value::Bool(*value),
            Expression::NumberLiteral { value, .. } => match value {
                NumberValue::Integral(value) => Value::Int(*value),
                NumberValue::Floating(value) => Value::Double(*value),
            },
            Expression::StringLiteral(text) => Value::Str(text.clone()),
            Expression::This(_) => frame.this.clone().ok_or("`this` outside an instance")?,
            Expression::VariableReference(variable) => frame
                .locals
                .get(variable.name())
                .cloned()
                .ok_or_else(|| format!("unbound {}", variable.name()))?,
            Expression::FieldAccess(access) => {
                let target = access.target().clone();
                match access.qualifier() {
                    None => self.static_value(&target),
                    Some(qualifier) => match self.evaluate(qualifier, frame)? {
                        Value::Object(instance) => instance.get(&target),
                        other => return Err(format!("field read on {other:?}")),
                    },
                }
            }
            Expression::Assignment { target, value } => {
                let value = self.evaluate(value, frame)?;
                self.store(target, value.clone(), frame)?;
                value
            }
            Expression::Postfix { operator, operand } => {
                let old = self.evaluate(operand, frame)?;
                let Value::Int(number) = old else {
                    return Err(format!("{operator:?} on {old:?}"));
                };
                let new = match operator {
                    PostfixOperator::Increment => number + 1,
                    PostfixOperator::Decrement => number - 1,
                };
                self.store(operand, Value::Int(new), frame)?;
                old
            }
            Expression::Binary {
                operator,
                left,
                right,
                ..
            } => {
                let left = self.evaluate(left, frame)?;
                let right = self.evaluate(right, frame)?;
                binary(*operator, left, right)?
            }
            Expression::Cast { expression, .. } => self.evaluate(expression, frame)?,
            Expression::Conditional {
                condition,
                when_true,
                when_false,
                ..
            } => {
                if self.truthy(condition, frame)? {
                    self.evaluate(when_true, frame)?
                } else {
                    self.evaluate(when_false, frame)?
                }
            }
            Expression::MethodCall(call) => self.invoke(call, frame)?,
            other => return Err(format!("unsupported expression {other:?}")),
        })
    }

    fn invoke(&mut self, call: &MethodCall, frame: &mut Frame) -> Outcome<Value> {
        let receiver = match call.qualifier() {
            Some(qualifier) => Some(self.evaluate(qualifier, frame)?),
            None => None,
        };
        let mut arguments = Vec::with_capacity(call.arguments().len());
        for argument in call.arguments() {
            arguments.push(self.evaluate(argument, frame)?);
        }

        let target = call.target();
        if target.is_polymorphic() && !call.is_static_dispatch() {
            let mangled_name = match call.mangled_name() {
                Some(name) => name.clone(),
                None => self
                    .registry
                    .mangled_name(target)
                    .map_err(|err| err.to_string())?,
            };
            let receiver = receiver.ok_or("instance call without a receiver")?;
            return self.dispatch(receiver, &mangled_name, arguments);
        }
        let method = self.method_node(target.enclosing_type(), target)?;
        let this = if target.is_static() { None } else { receiver };
        self.execute(method, this, arguments)
    }

    fn store(&mut self, target: &Expression, value: Value, frame: &mut Frame) -> Outcome<()> {
        match target {
            Expression::VariableReference(variable) => {
                frame.locals.insert(Arc::from(variable.name()), value);
            }
            Expression::FieldAccess(access) => match access.qualifier() {
                None => {
                    self.statics.insert(access.target().id(), value);
                }
                Some(qualifier) => match self.evaluate(qualifier, frame)? {
                    Value::Object(instance) => {
                        instance.fields.borrow_mut().insert(access.target().id(), value);
                    }
                    other => return Err(format!("field write on {other:?}")),
                },
            },
            other => return Err(format!("cannot assign to {other:?}")),
        }
        Ok(())
    }
}

fn binary(operator: BinaryOperator, left: Value, right: Value) -> Outcome<Value> {
    Ok(match (operator, &left, &right) {
        (BinaryOperator::Equals, _, _) => Value::Bool(left == right),
        (BinaryOperator::NotEquals, _, _) => Value::Bool(left != right),
        (BinaryOperator::Plus, Value::Int(a), Value::Int(b)) => Value::Int(a + b),
        (BinaryOperator::Minus, Value::Int(a), Value::Int(b)) => Value::Int(a - b),
        (BinaryOperator::Times, Value::Int(a), Value::Int(b)) => Value::Int(a * b),
        (BinaryOperator::Less, Value::Int(a), Value::Int(b)) => Value::Bool(a < b),
        (BinaryOperator::Greater, Value::Int(a), Value::Int(b)) => Value::Bool(a > b),
        (BinaryOperator::Plus, Value::Str(a), _) => Value::Str(Arc::from(format!("{a}{}", display(&right)))),
        _ => return Err(format!("unsupported {left:?} {} {right:?}", operator.symbol())),
    })
}

fn display(value: &Value) -> String {
    match value {
        Value::Str(text) => text.to_string(),
        Value::Int(number) => number.to_string(),
        Value::Double(number) => number.to_string(),
        Value::Bool(value) => value.to_string(),
        Value::Null => "null".to_string(),
        Value::Void => String::new(),
        Value::Object(instance) => format!("object#{}", instance.class.0),
    }
}
