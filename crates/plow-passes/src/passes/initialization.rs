//! Initialization sequencing.
//!
//! Field initializers and initializer blocks run interleaved, in declaration
//! order. The target language has neither, so the sequencer moves them into
//! one synthetic method per kind:
//!
//! ```text
//! static int a = f();          $clinit() {
//! static { g(); }        =>       a = 0; b = 0;
//! static int b = h();             a = f(); { g(); } b = h();
//!                               }
//! ```
//!
//! Every sequenced field is first reset to its default so that a forward
//! reference observes the default value, as it would in the source language.

use crate::error::PassError;
use crate::pass::{PassContext, TypePass};
use plow_ast::ast_utils::default_value;
use plow_ast::visit::walk_expression;
use plow_ast::{
    Expression, Field, FieldAccess, Member, Method, MethodCall, Statement, Type, Visitor,
};
use plow_common::{SourcePosition, diagnostic_codes};
use plow_types::{
    CLINIT_NAME, FieldDescriptor, FieldId, INIT_NAME, MethodDescriptor,
    MethodDescriptorBuilder, MethodFlags, TypeId, TypeRegistry, Visibility,
};
use rustc_hash::FxHashSet;
use std::sync::Arc;
use tracing::{debug, trace};

/// Sequences static field initializers and static blocks into `$clinit`.
pub struct StaticInitialization;

/// Sequences instance field initializers and instance blocks into `$init`,
/// called at the start of every constructor.
pub struct InstanceInitialization;

/// A final static field of primitive or `String` type initialized with a
/// non-null literal. Its initializer stays on the field.
pub fn is_compile_time_constant(field: &Field) -> bool {
    let descriptor = field.descriptor();
    descriptor.is_static()
        && descriptor.is_final()
        && (descriptor.field_type().is_primitive() || descriptor.field_type() == TypeId::STRING)
        && field
            .initializer()
            .is_some_and(|initializer| initializer.is_literal() && !initializer.is_null_literal())
}

impl TypePass for StaticInitialization {
    fn name(&self) -> &'static str {
        "static-initialization"
    }

    fn apply_to_type(&self, ty: Type, context: &mut PassContext<'_>) -> Result<Type, PassError> {
        if ty.is_native() {
            return Ok(ty);
        }
        Sequencer::new(Phase::Static, &ty, context.registry).apply(ty, context)
    }
}

impl TypePass for InstanceInitialization {
    fn name(&self) -> &'static str {
        "instance-initialization"
    }

    fn apply_to_type(&self, ty: Type, context: &mut PassContext<'_>) -> Result<Type, PassError> {
        if !ty.is_class() || ty.is_native() {
            return Ok(ty);
        }
        Sequencer::new(Phase::Instance, &ty, context.registry).apply(ty, context)
    }
}

// =============================================================================
// Sequencing
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Static,
    Instance,
}

impl Phase {
    fn is_static(self) -> bool {
        self == Phase::Static
    }

    fn method_name(self) -> &'static str {
        match self {
            Phase::Static => CLINIT_NAME,
            Phase::Instance => INIT_NAME,
        }
    }
}

struct Sequencer<'a> {
    phase: Phase,
    subject: TypeId,
    registry: &'a TypeRegistry,
}

/// Members left on the type, and what was taken out of them.
#[derive(Default)]
struct Extracted {
    members: Vec<Member>,
    fields: Vec<Arc<FieldDescriptor>>,
    actions: Vec<Statement>,
    forward_references: Vec<(Arc<FieldDescriptor>, SourcePosition)>,
}

impl<'a> Sequencer<'a> {
    fn new(phase: Phase, ty: &Type, registry: &'a TypeRegistry) -> Self {
        Sequencer {
            phase,
            subject: ty.descriptor(),
            registry,
        }
    }

    fn apply(&self, ty: Type, context: &mut PassContext<'_>) -> Result<Type, PassError> {
        let has_work = ty.members().iter().any(|member| self.is_sequenced(member));
        if !has_work {
            return Ok(ty);
        }

        let mut builder = ty.into_builder();
        let extracted = self.extract(builder.take_members())?;
        for (field, position) in &extracted.forward_references {
            context.report(
                diagnostic_codes::FORWARD_STATIC_REFERENCE,
                position.clone(),
                &[field.name()],
            );
        }

        let mut prologue = extracted
            .fields
            .iter()
            .map(|field| self.default_assignment(field))
            .collect::<Result<Vec<_>, _>>()?;
        let mut existing = None;
        let mut members = Vec::with_capacity(extracted.members.len() + 1);
        for member in extracted.members {
            match member {
                Member::Method(method)
                    if existing.is_none() && self.is_initializer_method(method.descriptor()) =>
                {
                    existing = Some(method);
                }
                member => members.push(member),
            }
        }
        let method = match existing {
            Some(method) => {
                let previous = method
                    .body()
                    .map(|body| body.statements().to_vec())
                    .unwrap_or_default();
                prologue.extend(previous);
                prologue.extend(extracted.actions);
                method.into_builder().statements(prologue).build()?
            }
            None => {
                prologue.extend(extracted.actions);
                Method::builder()
                    .descriptor(self.initializer_descriptor())
                    .statements(prologue)
                    .position(SourcePosition::NONE)
                    .build()?
            }
        };

        debug!(
            type_name = %self.registry.type_name(self.subject),
            method = self.phase.method_name(),
            fields = extracted.fields.len(),
            "initializer sequenced"
        );

        if self.phase == Phase::Instance {
            let descriptor = method.descriptor().clone();
            members = members
                .into_iter()
                .map(|member| self.call_from_constructor(member, &descriptor))
                .collect::<Result<_, _>>()?;
        }
        members.push(Member::Method(method));
        Ok(builder.members(members).build()?)
    }

    fn is_sequenced(&self, member: &Member) -> bool {
        match member {
            Member::Field(field) => {
                field.descriptor().is_static() == self.phase.is_static()
                    && field.initializer().is_some()
                    && !is_compile_time_constant(field)
            }
            Member::InitializerBlock(block) => block.is_static() == self.phase.is_static(),
            Member::Method(_) => false,
        }
    }

    fn is_initializer_method(&self, method: &MethodDescriptor) -> bool {
        method.is_synthetic()
            && method.is_static() == self.phase.is_static()
            && method.name() == self.phase.method_name()
            && method.parameters().is_empty()
    }

    fn extract(&self, members: Vec<Member>) -> Result<Extracted, PassError> {
        let mut pending: FxHashSet<FieldId> = members
            .iter()
            .filter(|member| self.is_sequenced(member))
            .filter_map(Member::as_field)
            .map(|field| field.descriptor().id())
            .collect();

        let mut extracted = Extracted::default();
        for member in members {
            if !self.is_sequenced(&member) {
                extracted.members.push(member);
                continue;
            }
            match member {
                Member::Field(field) => {
                    let descriptor = field.descriptor().clone();
                    let position = field.position().clone();
                    let mut field_builder = field.into_builder();
                    let Some(initializer) = field_builder.take_initializer() else {
                        extracted.members.push(Member::Field(field_builder.build()?));
                        continue;
                    };
                    if self.phase.is_static() {
                        self.find_forward_references(
                            &pending,
                            |finder| finder.visit_expression(&initializer),
                            &position,
                            &mut extracted.forward_references,
                        );
                    }
                    pending.remove(&descriptor.id());

                    trace!(field = %descriptor.name(), "field initializer");
                    let target = self.field_access(&descriptor)?;
                    extracted.actions.push(Statement::Expression {
                        expression: Expression::assign(target, initializer),
                        position,
                    });
                    extracted.fields.push(descriptor);
                    extracted.members.push(Member::Field(field_builder.build()?));
                }
                Member::InitializerBlock(block) => {
                    let position = block.position().clone();
                    let block = block.into_block();
                    if self.phase.is_static() {
                        self.find_forward_references(
                            &pending,
                            |finder| finder.visit_block(&block),
                            &position,
                            &mut extracted.forward_references,
                        );
                    }
                    trace!("initializer block");
                    extracted.actions.push(Statement::Block(block));
                }
                Member::Method(method) => extracted.members.push(Member::Method(method)),
            }
        }
        Ok(extracted)
    }

    fn find_forward_references(
        &self,
        pending: &FxHashSet<FieldId>,
        visit: impl FnOnce(&mut ForwardReferenceFinder<'_>),
        position: &SourcePosition,
        found: &mut Vec<(Arc<FieldDescriptor>, SourcePosition)>,
    ) {
        let mut finder = ForwardReferenceFinder {
            pending,
            found: Vec::new(),
        };
        visit(&mut finder);
        found.extend(
            finder
                .found
                .into_iter()
                .map(|field| (field, position.clone())),
        );
    }

    fn field_access(&self, field: &Arc<FieldDescriptor>) -> Result<Expression, PassError> {
        let qualifier = match self.phase {
            Phase::Static => None,
            Phase::Instance => Some(Expression::This(self.subject)),
        };
        Ok(Expression::FieldAccess(
            FieldAccess::builder()
                .qualifier(qualifier)
                .target(field.clone())
                .build()?,
        ))
    }

    fn default_assignment(&self, field: &Arc<FieldDescriptor>) -> Result<Statement, PassError> {
        let target = self.field_access(field)?;
        Ok(Statement::expression(Expression::assign(
            target,
            default_value(field.field_type()),
        )))
    }

    fn initializer_descriptor(&self) -> Arc<MethodDescriptor> {
        let (flags, visibility) = match self.phase {
            Phase::Static => (MethodFlags::STATIC | MethodFlags::SYNTHETIC, Visibility::Public),
            Phase::Instance => (MethodFlags::SYNTHETIC, Visibility::Private),
        };
        MethodDescriptorBuilder::new(self.subject, self.phase.method_name())
            .return_type(TypeId::VOID)
            .visibility(visibility)
            .flags(flags)
            .build(self.registry)
    }

    /// Inserts `this.$init()` into a constructor, after its leading
    /// super-constructor call if there is one.
    ///
    /// A constructor that starts by delegating to `this(...)` is left alone:
    /// the constructor it delegates to runs the initializers.
    fn call_from_constructor(
        &self,
        member: Member,
        init: &Arc<MethodDescriptor>,
    ) -> Result<Member, PassError> {
        let Member::Method(method) = member else {
            return Ok(member);
        };
        if !method.descriptor().is_constructor() {
            return Ok(Member::Method(method));
        }
        let Some(body) = method.body() else {
            return Ok(Member::Method(method));
        };
        let mut statements = body.statements().to_vec();
        let delegates = statements
            .first()
            .is_some_and(|statement| is_this_constructor_call(statement, self.subject));
        if delegates || statements.iter().take(2).any(|statement| calls(statement, init)) {
            return Ok(Member::Method(method));
        }

        let call = MethodCall::builder()
            .qualifier(Some(Expression::This(self.subject)))
            .target(init.clone())
            .is_static_dispatch(true)
            .build()?;
        let index = usize::from(
            statements
                .first()
                .is_some_and(|statement| is_super_constructor_call(statement, self.subject)),
        );
        statements.insert(index, Statement::expression(Expression::MethodCall(call)));
        Ok(Member::Method(method.into_builder().statements(statements).build()?))
    }
}

fn calls(statement: &Statement, method: &MethodDescriptor) -> bool {
    matches!(
        statement,
        Statement::Expression { expression: Expression::MethodCall(call), .. }
            if call.target().id() == method.id()
    )
}

fn is_super_constructor_call(statement: &Statement, subject: TypeId) -> bool {
    matches!(
        statement,
        Statement::Expression { expression: Expression::MethodCall(call), .. }
            if call.target().is_constructor() && call.target().enclosing_type() != subject
    )
}

fn is_this_constructor_call(statement: &Statement, subject: TypeId) -> bool {
    matches!(
        statement,
        Statement::Expression { expression: Expression::MethodCall(call), .. }
            if call.target().is_constructor()
                && call.target().enclosing_type() == subject
                && matches!(call.qualifier(), Some(Expression::This(_)))
    )
}

/// Reads of static fields whose initializer has not run yet.
struct ForwardReferenceFinder<'a> {
    pending: &'a FxHashSet<FieldId>,
    found: Vec<Arc<FieldDescriptor>>,
}

impl Visitor for ForwardReferenceFinder<'_> {
    fn visit_expression(&mut self, expression: &Expression) {
        match expression {
            Expression::FieldAccess(access)
                if access.qualifier().is_none() && self.pending.contains(&access.target().id()) =>
            {
                if !self.found.iter().any(|field| field.id() == access.target().id()) {
                    self.found.push(access.target().clone());
                }
            }
            // Writes are not reads.
            Expression::Assignment { target, value } => {
                if let Expression::FieldAccess(access) = target.as_ref() {
                    if let Some(qualifier) = access.qualifier() {
                        self.visit_expression(qualifier);
                    }
                } else {
                    self.visit_expression(target);
                }
                self.visit_expression(value);
            }
            _ => walk_expression(self, expression),
        }
    }
}
