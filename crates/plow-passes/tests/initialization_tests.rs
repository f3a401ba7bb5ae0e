//! Initialization sequencing and null-literal retyping.

mod common;

use common::*;
use plow_ast::{BinaryOperator, Expression, Member, MethodCall, PostfixOperator, Statement};
use plow_common::diagnostic_codes;
use plow_passes::{LoweringOptions, NormalizationPass, Pipeline, is_compile_time_constant};
use plow_types::{
    CLINIT_NAME, FieldDescriptor, FieldSignature, INIT_NAME, MethodFlags, MethodSignature,
    TypeDeclaration, TypeFlags, TypeId, TypeKind, TypeRegistry,
};
use std::sync::Arc;

/// `assert counter++ == expected;`
fn assert_counter(counter: &Arc<FieldDescriptor>, expected: i64) -> Statement {
    Statement::Assert {
        condition: Expression::binary(
            BinaryOperator::Equals,
            Expression::postfix(PostfixOperator::Increment, static_access(counter)),
            Expression::int(expected),
            TypeId::BOOLEAN,
        ),
        message: None,
        position: Default::default(),
    }
}

fn static_int(name: &str) -> FieldSignature {
    FieldSignature::new(name, "int").make_static()
}

fn static_int_method(name: &str) -> MethodSignature {
    MethodSignature::new(name)
        .returns("int")
        .flags(MethodFlags::STATIC)
}

/// ```java
/// @JsType class StaticInitOrder {
///   static int counter = 1;
///   static int field1 = initializeField1();
///   static int field2 = initializeField2();
///   static { assert counter++ == 3; }
///   static { assert counter++ == 4; }
///   static int initializeField1() { assert counter++ == 1; return counter; }
///   static int initializeField2() { assert counter++ == 2; return counter; }
/// }
/// ```
#[test]
fn test_static_initializers_run_in_declaration_order() {
    let registry = TypeRegistry::new();
    let ty = declare(
        &registry,
        TypeDeclaration::class("test.StaticInitOrder")
            .flags(TypeFlags::JS_TYPE)
            .field(static_int("counter"))
            .field(static_int("field1"))
            .field(static_int("field2"))
            .method(static_int_method("initializeField1"))
            .method(static_int_method("initializeField2")),
    );
    let counter = field(&registry, ty, "counter");
    let field1 = field(&registry, ty, "field1");
    let field2 = field(&registry, ty, "field2");
    let initialize1 = method(&registry, ty, "initializeField1", &[]);
    let initialize2 = method(&registry, ty, "initializeField2", &[]);
    let returns_counter = || Statement::return_value(Some(static_access(&counter)));

    let node = type_node(
        &registry,
        ty,
        vec![
            field_node(&counter, Some(Expression::int(1))),
            field_node(&field1, Some(static_call(&initialize1, vec![]))),
            field_node(&field2, Some(static_call(&initialize2, vec![]))),
            static_block(vec![assert_counter(&counter, 3)]),
            static_block(vec![assert_counter(&counter, 4)]),
            method_node(&initialize1, vec![assert_counter(&counter, 1), returns_counter()]),
            method_node(&initialize2, vec![assert_counter(&counter, 2), returns_counter()]),
        ],
    );

    let output = lower(&registry, program(vec![node]));
    let lowered = find_type(&output.program, ty);
    assert!(
        !lowered
            .members()
            .iter()
            .any(|member| matches!(member, Member::InitializerBlock(_)))
    );
    assert!(lowered.fields().all(|field| field.initializer().is_none()));

    let clinit = lowered
        .methods()
        .find(|method| method.descriptor().name() == CLINIT_NAME)
        .unwrap();
    assert!(clinit.descriptor().is_static());
    assert!(clinit.descriptor().is_synthetic());
    assert_eq!(clinit.mangled_name().map(|name| &**name), Some(CLINIT_NAME));
    // Three default assignments, then the five actions.
    assert_eq!(clinit.body().unwrap().statements().len(), 8);

    let mut interpreter = Interpreter::new(&output.program, &registry);
    interpreter.run_static(ty, CLINIT_NAME).unwrap();
    assert_eq!(interpreter.static_value(&counter), Value::Int(5));
    assert_eq!(interpreter.static_value(&field1), Value::Int(2));
    assert_eq!(interpreter.static_value(&field2), Value::Int(3));
}

/// ```java
/// class Forward {
///   static int a = b + 1;
///   static int b = 2;
/// }
/// ```
#[test]
fn test_forward_reference_observes_default() {
    let registry = TypeRegistry::new();
    let ty = declare(
        &registry,
        TypeDeclaration::class("test.Forward")
            .field(static_int("a"))
            .field(static_int("b")),
    );
    let a = field(&registry, ty, "a");
    let b = field(&registry, ty, "b");
    let node = type_node(
        &registry,
        ty,
        vec![
            field_node(
                &a,
                Some(Expression::binary(
                    BinaryOperator::Plus,
                    static_access(&b),
                    Expression::int(1),
                    TypeId::INT,
                )),
            ),
            field_node(&b, Some(Expression::int(2))),
        ],
    );

    let output = lower(&registry, program(vec![node]));
    let forward: Vec<_> = output
        .diagnostics
        .with_code(diagnostic_codes::FORWARD_STATIC_REFERENCE)
        .collect();
    assert_eq!(forward.len(), 1);
    assert!(forward[0].message_text.contains("'b'"));
    assert!(!output.diagnostics.has_errors());

    let mut interpreter = Interpreter::new(&output.program, &registry);
    interpreter.run_static(ty, CLINIT_NAME).unwrap();
    assert_eq!(interpreter.static_value(&a), Value::Int(1));
    assert_eq!(interpreter.static_value(&b), Value::Int(2));
}

#[test]
fn test_compile_time_constants_stay_inline() {
    let registry = TypeRegistry::new();
    let ty = declare(
        &registry,
        TypeDeclaration::class("test.Limits")
            .field(static_int("MAX").make_final())
            .field(
                FieldSignature::new("NAME", "java.lang.String")
                    .make_static()
                    .make_final(),
            )
            .field(
                FieldSignature::new("NOTHING", "java.lang.String")
                    .make_static()
                    .make_final(),
            ),
    );
    let max = field(&registry, ty, "MAX");
    let name = field(&registry, ty, "NAME");
    let nothing = field(&registry, ty, "NOTHING");
    let node = type_node(
        &registry,
        ty,
        vec![
            field_node(&max, Some(Expression::int(10))),
            field_node(&name, Some(Expression::string("limits"))),
            field_node(&nothing, Some(Expression::null())),
        ],
    );
    let fields: Vec<_> = node.fields().collect();
    assert!(is_compile_time_constant(fields[0]));
    assert!(is_compile_time_constant(fields[1]));
    assert!(!is_compile_time_constant(fields[2]));

    let output = lower(&registry, program(vec![node]));
    let lowered = find_type(&output.program, ty);
    let fields: Vec<_> = lowered.fields().collect();
    assert_eq!(fields[0].initializer(), Some(&Expression::int(10)));
    assert_eq!(fields[1].initializer(), Some(&Expression::string("limits")));
    assert_eq!(fields[2].initializer(), None);

    // Only the null-initialized field is sequenced.
    let clinit = lowered
        .methods()
        .find(|method| method.descriptor().name() == CLINIT_NAME)
        .unwrap();
    assert_eq!(clinit.body().unwrap().statements().len(), 2);
}

#[test]
fn test_type_without_initializers_is_untouched() {
    let registry = TypeRegistry::new();
    let ty = declare(
        &registry,
        TypeDeclaration::class("test.Plain").field(static_int("count")),
    );
    let node = type_node(&registry, ty, vec![field_node(&field(&registry, ty, "count"), None)]);

    let output = lower(&registry, program(vec![node.clone()]));
    assert_eq!(find_type(&output.program, ty).members(), node.members());
}

/// ```java
/// class Point {
///   int x = 3;
///   int y;
///   { y = x + 1; }
///   Point() {}
/// }
/// ```
#[test]
fn test_instance_initializers_run_from_constructor() {
    let registry = TypeRegistry::new();
    let ty = declare(
        &registry,
        TypeDeclaration::class("test.Point")
            .field(FieldSignature::new("x", "int"))
            .field(FieldSignature::new("y", "int"))
            .method(MethodSignature::constructor()),
    );
    let x = field(&registry, ty, "x");
    let y = field(&registry, ty, "y");
    let constructor = method(&registry, ty, "$ctor", &[]);
    let node = type_node(
        &registry,
        ty,
        vec![
            field_node(&x, Some(Expression::int(3))),
            field_node(&y, None),
            instance_block(vec![Statement::expression(Expression::assign(
                this_access(ty, &y),
                Expression::binary(
                    BinaryOperator::Plus,
                    this_access(ty, &x),
                    Expression::int(1),
                    TypeId::INT,
                ),
            ))]),
            method_node(&constructor, vec![]),
        ],
    );

    let output = lower(&registry, program(vec![node]));
    let lowered = find_type(&output.program, ty);
    let init = lowered
        .methods()
        .find(|method| method.descriptor().name() == INIT_NAME)
        .unwrap();
    assert!(!init.descriptor().is_static());
    let constructor_node = lowered
        .methods()
        .find(|method| method.descriptor().is_constructor())
        .unwrap();
    let Statement::Expression {
        expression: Expression::MethodCall(call),
        ..
    } = &constructor_node.body().unwrap().statements()[0]
    else {
        panic!("constructor should start with the $init call");
    };
    assert_eq!(call.target().id(), init.descriptor().id());

    let mut interpreter = Interpreter::new(&output.program, &registry);
    let Value::Object(point) = interpreter.instantiate(ty).unwrap() else {
        panic!("expected an instance");
    };
    assert_eq!(point.get(&x), Value::Int(3));
    assert_eq!(point.get(&y), Value::Int(4));
}

/// `this(...)` or `super(...)` from a constructor of `ty`.
fn constructor_call(
    ty: TypeId,
    target: &Arc<plow_types::MethodDescriptor>,
    arguments: Vec<Expression>,
) -> Statement {
    Statement::expression(Expression::MethodCall(
        MethodCall::builder()
            .qualifier(Some(Expression::This(ty)))
            .target(target.clone())
            .arguments(arguments)
            .build()
            .unwrap(),
    ))
}

fn is_call_to(statement: &Statement, name: &str) -> bool {
    matches!(
        statement,
        Statement::Expression { expression: Expression::MethodCall(call), .. }
            if call.target().name() == name
    )
}

/// ```java
/// class Chain {
///   int n = 7;
///   { n++; }
///   Chain() { this(0); }
///   Chain(int v) {}
/// }
/// ```
#[test]
fn test_delegating_constructor_runs_initializers_once() {
    let registry = TypeRegistry::new();
    let ty = declare(
        &registry,
        TypeDeclaration::class("test.Chain")
            .field(FieldSignature::new("n", "int"))
            .method(MethodSignature::constructor())
            .method(MethodSignature::constructor().param("int")),
    );
    let n = field(&registry, ty, "n");
    let delegating = method(&registry, ty, "$ctor", &[]);
    let delegated = method(&registry, ty, "$ctor", &[TypeId::INT]);
    let node = type_node(
        &registry,
        ty,
        vec![
            field_node(&n, Some(Expression::int(7))),
            instance_block(vec![Statement::expression(Expression::postfix(
                PostfixOperator::Increment,
                this_access(ty, &n),
            ))]),
            method_node(
                &delegating,
                vec![constructor_call(ty, &delegated, vec![Expression::int(0)])],
            ),
            method_node(&delegated, vec![]),
        ],
    );

    let output = lower(&registry, program(vec![node]));
    let lowered = find_type(&output.program, ty);
    let body_of = |descriptor: &Arc<plow_types::MethodDescriptor>| {
        lowered
            .methods()
            .find(|method| method.descriptor().id() == descriptor.id())
            .unwrap()
            .body()
            .unwrap()
            .statements()
            .to_vec()
    };

    let delegating_body = body_of(&delegating);
    assert_eq!(delegating_body.len(), 1);
    assert!(!is_call_to(&delegating_body[0], INIT_NAME));
    let delegated_body = body_of(&delegated);
    assert_eq!(delegated_body.len(), 1);
    assert!(is_call_to(&delegated_body[0], INIT_NAME));

    let mut interpreter = Interpreter::new(&output.program, &registry);
    let Value::Object(chain) = interpreter.instantiate(ty).unwrap() else {
        panic!("expected an instance");
    };
    assert_eq!(chain.get(&n), Value::Int(8));
}

/// ```java
/// class Base { Base() {} }
/// class Derived extends Base {
///   int n = 5;
///   Derived() { super(); }
/// }
/// ```
#[test]
fn test_init_call_follows_super_constructor_call() {
    let registry = TypeRegistry::new();
    let base = declare(
        &registry,
        TypeDeclaration::class("test.Base").method(MethodSignature::constructor()),
    );
    let derived = declare(
        &registry,
        TypeDeclaration::class("test.Derived")
            .extends("test.Base")
            .field(FieldSignature::new("n", "int"))
            .method(MethodSignature::constructor()),
    );
    let n = field(&registry, derived, "n");
    let base_constructor = method(&registry, base, "$ctor", &[]);
    let derived_constructor = method(&registry, derived, "$ctor", &[]);
    let program = program(vec![
        type_node(&registry, base, vec![method_node(&base_constructor, vec![])]),
        type_node(
            &registry,
            derived,
            vec![
                field_node(&n, Some(Expression::int(5))),
                method_node(
                    &derived_constructor,
                    vec![constructor_call(derived, &base_constructor, vec![])],
                ),
            ],
        ),
    ]);

    let output = lower(&registry, program);
    let constructor = find_type(&output.program, derived)
        .methods()
        .find(|method| method.descriptor().is_constructor())
        .unwrap();
    let statements = constructor.body().unwrap().statements();
    assert_eq!(statements.len(), 2);
    assert!(!is_call_to(&statements[0], INIT_NAME));
    assert!(is_call_to(&statements[1], INIT_NAME));

    let mut interpreter = Interpreter::new(&output.program, &registry);
    let Value::Object(instance) = interpreter.instantiate(derived).unwrap() else {
        panic!("expected an instance");
    };
    assert_eq!(instance.get(&n), Value::Int(5));
}

#[test]
fn test_sequencing_is_idempotent() {
    let registry = TypeRegistry::new();
    let ty = declare(
        &registry,
        TypeDeclaration::class("test.Twice")
            .field(static_int("a"))
            .field(FieldSignature::new("b", "int"))
            .method(MethodSignature::constructor()),
    );
    let node = type_node(
        &registry,
        ty,
        vec![
            field_node(&field(&registry, ty, "a"), Some(Expression::int(1))),
            field_node(&field(&registry, ty, "b"), Some(Expression::int(2))),
            method_node(&method(&registry, ty, "$ctor", &[]), vec![]),
        ],
    );
    let options = LoweringOptions {
        verify_idempotence: true,
        ..LoweringOptions::default()
    };
    let once = lower_with(&registry, program(vec![node]), options.clone());
    let twice = lower_with(&registry, once.program.clone(), options);
    assert_eq!(twice.program, once.program);
}

// =============================================================================
// Null-literal retyping
// =============================================================================

fn normalize_only(registry: &TypeRegistry, program: plow_ast::Program) -> plow_ast::Program {
    Pipeline::new(LoweringOptions::default())
        .with_pass(NormalizationPass::NormalizeNullLiterals.create())
        .run(program, registry)
        .unwrap()
        .program
}

#[test]
fn test_null_takes_the_type_of_its_context() {
    let registry = TypeRegistry::new();
    declare(
        &registry,
        TypeDeclaration::new("test.Color", TypeKind::Enum).flags(TypeFlags::JS_ENUM),
    );
    let native_color = declare(
        &registry,
        TypeDeclaration::new("test.NativeColor", TypeKind::Enum)
            .flags(TypeFlags::JS_ENUM | TypeFlags::NATIVE),
    );
    let ty = declare(
        &registry,
        TypeDeclaration::class("test.Palette")
            .field(FieldSignature::new("name", "java.lang.String"))
            .field(FieldSignature::new("color", "test.Color"))
            .field(FieldSignature::new("native", "test.NativeColor"))
            .method(MethodSignature::new("label").returns("java.lang.String")),
    );
    let label = method(&registry, ty, "label", &[]);
    let node = type_node(
        &registry,
        ty,
        vec![
            field_node(&field(&registry, ty, "name"), Some(Expression::null())),
            field_node(&field(&registry, ty, "color"), Some(Expression::null())),
            field_node(&field(&registry, ty, "native"), Some(Expression::null())),
            method_node(&label, vec![Statement::return_value(Some(Expression::null()))]),
        ],
    );
    let input = program(vec![node]);

    let output = normalize_only(&registry, input.clone());
    let lowered = find_type(&output, ty);
    let initializers: Vec<_> = lowered
        .fields()
        .map(|field| field.initializer().cloned())
        .collect();
    assert_eq!(
        initializers,
        vec![
            Some(Expression::NullLiteral(TypeId::STRING)),
            Some(Expression::NullLiteral(TypeId::OBJECT)),
            Some(Expression::NullLiteral(native_color)),
        ]
    );

    let body = lowered.methods().next().unwrap().body().unwrap();
    assert_eq!(
        body.statements()[0],
        Statement::return_value(Some(Expression::NullLiteral(TypeId::STRING)))
    );

    assert_eq!(normalize_only(&registry, output.clone()), output);
    assert_ne!(output, input);
}

#[test]
fn test_non_null_expressions_are_left_alone() {
    let registry = TypeRegistry::new();
    let ty = declare(
        &registry,
        TypeDeclaration::class("test.Named").field(FieldSignature::new("name", "java.lang.Object")),
    );
    let node = type_node(
        &registry,
        ty,
        vec![field_node(
            &field(&registry, ty, "name"),
            Some(Expression::string("fixed")),
        )],
    );
    let input = program(vec![node]);
    assert_eq!(normalize_only(&registry, input.clone()), input);
}
