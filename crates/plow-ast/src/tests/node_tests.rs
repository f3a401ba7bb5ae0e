use crate::ast_utils::{create_forwarding_statement, create_parameter_variables, default_value};
use crate::*;
use plow_types::{
    MethodDescriptor, MethodDescriptorBuilder, MethodFlags, MethodSignature, RawTypeRef,
    TypeDeclaration, TypeId, TypeRegistry,
};
use std::sync::Arc;

struct Fixture {
    registry: TypeRegistry,
    owner: TypeId,
    concrete: Arc<MethodDescriptor>,
    abstract_method: Arc<MethodDescriptor>,
}

fn fixture() -> Fixture {
    let registry = TypeRegistry::new();
    let owner = registry
        .declare(
            TypeDeclaration::class("test.Shape")
                .method(
                    MethodSignature::new("describe")
                        .param(RawTypeRef::string())
                        .returns(RawTypeRef::string()),
                )
                .method(
                    MethodSignature::new("area")
                        .returns("double")
                        .flags(MethodFlags::ABSTRACT),
                ),
        )
        .expect("declare Shape");
    let methods = registry.declared_methods(owner).expect("methods");
    Fixture {
        concrete: methods[0].clone(),
        abstract_method: methods[1].clone(),
        registry,
        owner,
    }
}

#[test]
fn test_method_requires_descriptor() {
    let err = Method::builder().build().unwrap_err();
    assert_eq!(
        err,
        ConstructionError::MissingField {
            node: "Method",
            field: "descriptor"
        }
    );
}

#[test]
fn test_concrete_method_requires_body() {
    let f = fixture();
    let err = Method::builder()
        .descriptor(f.concrete.clone())
        .parameters(create_parameter_variables(&[TypeId::STRING]))
        .build()
        .unwrap_err();
    assert!(matches!(err, ConstructionError::MissingBody { .. }));
}

#[test]
fn test_abstract_method_rejects_body() {
    let f = fixture();
    let err = Method::builder()
        .descriptor(f.abstract_method.clone())
        .statements(vec![])
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        ConstructionError::UnexpectedBody {
            kind: "abstract",
            ..
        }
    ));

    let method = Method::builder()
        .descriptor(f.abstract_method.clone())
        .build()
        .expect("abstract method without body");
    assert!(method.is_abstract());
    assert!(method.body().is_none());
}

#[test]
fn test_parameter_count_must_match_descriptor() {
    let f = fixture();
    let err = Method::builder()
        .descriptor(f.concrete.clone())
        .statements(vec![])
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        ConstructionError::ParameterCount {
            method: "describe".to_string(),
            expected: 1,
            found: 0
        }
    );
}

#[test]
fn test_bridge_needs_concrete_target() {
    let f = fixture();
    let untargeted = MethodDescriptorBuilder::new(f.owner, "describe")
        .parameters([TypeId::OBJECT])
        .return_type(TypeId::OBJECT)
        .flags(MethodFlags::BRIDGE | MethodFlags::SYNTHETIC)
        .build(&f.registry);
    let err = Method::builder()
        .descriptor(untargeted)
        .parameters(create_parameter_variables(&[TypeId::OBJECT]))
        .statements(vec![])
        .build()
        .unwrap_err();
    assert!(matches!(err, ConstructionError::BridgeWithoutTarget { .. }));

    let to_abstract = MethodDescriptorBuilder::new(f.owner, "area")
        .return_type(TypeId::DOUBLE)
        .flags(MethodFlags::BRIDGE | MethodFlags::SYNTHETIC)
        .bridge_target(Some(f.abstract_method.clone()))
        .build(&f.registry);
    let err = Method::builder()
        .descriptor(to_abstract)
        .statements(vec![])
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        ConstructionError::BridgeToAbstractTarget {
            method: "area".to_string(),
            target: "area".to_string()
        }
    );
}

#[test]
fn test_method_call_checks_argument_count() {
    let f = fixture();
    let err = MethodCall::builder()
        .target(f.concrete.clone())
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        ConstructionError::ArgumentCount {
            expected: 1,
            found: 0,
            ..
        }
    ));

    let call = MethodCall::builder()
        .qualifier(Some(Expression::This(f.owner)))
        .target(f.concrete.clone())
        .arguments(vec![Expression::string("x")])
        .build()
        .expect("call");
    assert_eq!(Expression::MethodCall(call).type_descriptor(), TypeId::STRING);
}

#[test]
fn test_variable_requires_name_and_type() {
    let err = Variable::builder().type_id(TypeId::INT).build().unwrap_err();
    assert_eq!(
        err,
        ConstructionError::MissingField {
            node: "Variable",
            field: "name"
        }
    );
    let err = Variable::builder().name("x").build().unwrap_err();
    assert_eq!(
        err,
        ConstructionError::MissingField {
            node: "Variable",
            field: "type"
        }
    );
}

#[test]
fn test_unit_requires_file_path() {
    let err = CompilationUnit::builder().build().unwrap_err();
    assert!(matches!(
        err,
        ConstructionError::MissingField {
            node: "CompilationUnit",
            ..
        }
    ));
}

#[test]
fn test_default_values() {
    assert_eq!(default_value(TypeId::BOOLEAN), Expression::BooleanLiteral(false));
    assert_eq!(default_value(TypeId::INT), Expression::int(0));
    assert_eq!(
        default_value(TypeId::DOUBLE),
        Expression::NumberLiteral {
            value: NumberValue::Floating(0.0),
            type_id: TypeId::DOUBLE
        }
    );
    assert_eq!(
        default_value(TypeId::CHAR).type_descriptor(),
        TypeId::CHAR
    );
    assert_eq!(
        default_value(TypeId::STRING),
        Expression::NullLiteral(TypeId::STRING)
    );
}

#[test]
fn test_forwarding_statement_casts_only_narrowed_arguments() {
    let f = fixture();
    let parameters = create_parameter_variables(&[TypeId::OBJECT]);
    assert_eq!(parameters[0].name(), "arg0");
    assert!(parameters[0].is_parameter());

    let statement =
        create_forwarding_statement(f.owner, &f.concrete, &parameters, true).expect("forward");
    let Statement::Return {
        expression: Some(Expression::MethodCall(call)),
        ..
    } = &statement
    else {
        panic!("expected a returned call, got {statement:?}");
    };
    assert_eq!(call.qualifier(), Some(&Expression::This(f.owner)));
    assert_eq!(
        call.arguments(),
        &[Expression::cast(TypeId::STRING, parameters[0].reference())]
    );

    let exact = create_parameter_variables(&[TypeId::STRING]);
    let statement =
        create_forwarding_statement(f.owner, &f.concrete, &exact, false).expect("forward");
    let Statement::Expression {
        expression: Expression::MethodCall(call),
        ..
    } = &statement
    else {
        panic!("expected an expression statement, got {statement:?}");
    };
    assert_eq!(call.arguments(), &[exact[0].reference()]);
}
