use crate::*;

fn method(registry: &TypeRegistry, ty: TypeId, name: &str) -> std::sync::Arc<MethodDescriptor> {
    registry
        .declared_method_named(ty, name)
        .expect("declared methods")
        .unwrap_or_else(|| panic!("method {name} not declared"))
}

#[test]
fn test_member_names_encode_erased_parameters() {
    let registry = TypeRegistry::new();
    let a = registry
        .declare(
            TypeDeclaration::class("test.A")
                .method(MethodSignature::new("get").param(RawTypeRef::string()))
                .method(
                    MethodSignature::new("put")
                        .param("int")
                        .param(RawTypeRef::array_of(RawTypeRef::object())),
                )
                .method(MethodSignature::new("run"))
                .method(MethodSignature::new("helper").visibility(Visibility::Private))
                .method(MethodSignature::new("create").flags(MethodFlags::STATIC)),
        )
        .unwrap();

    let mangled = |name: &str| registry.mangled_name(&method(&registry, a, name)).unwrap();
    assert_eq!(&*mangled("get"), "m_get__java_lang_String");
    assert_eq!(&*mangled("put"), "m_put__int__arrayOf_java_lang_Object");
    assert_eq!(&*mangled("run"), "m_run__");
    assert_eq!(&*mangled("helper"), "m_helper___$p_test_A");
    assert_eq!(&*mangled("create"), "m_create__");
}

#[test]
fn test_type_variables_mangle_as_their_bound() {
    let registry = TypeRegistry::new();
    let g = registry
        .declare(
            TypeDeclaration::class("test.G")
                .type_parameter("T")
                .bounded_type_parameter("S", RawTypeRef::string())
                .method(MethodSignature::new("get").param(RawTypeRef::var("T")))
                .method(MethodSignature::new("sized").param(RawTypeRef::var("S"))),
        )
        .unwrap();

    let get = method(&registry, g, "get");
    assert_eq!(&*registry.mangled_name(&get).unwrap(), "m_get__java_lang_Object");
    assert_eq!(
        &*registry.mangled_name(&method(&registry, g, "sized")).unwrap(),
        "m_sized__java_lang_String"
    );

    // A specialized view keeps the name of its declaration.
    let g_int = registry
        .resolve(&RawTypeRef::generic(
            "test.G",
            vec![RawTypeRef::string(), RawTypeRef::string()],
        ))
        .unwrap();
    let view = registry.specialize_method(&get, g_int).unwrap();
    assert_eq!(view.parameters(), &[TypeId::STRING]);
    assert_eq!(&*registry.mangled_name(&view).unwrap(), "m_get__java_lang_Object");
}

#[test]
fn test_js_exposed_members_keep_simple_names() {
    let registry = TypeRegistry::new();
    let j = registry
        .declare(
            TypeDeclaration::class("test.J")
                .flags(TypeFlags::JS_TYPE)
                .method(MethodSignature::new("get").param(RawTypeRef::string()))
                .method(MethodSignature::new("create").flags(MethodFlags::STATIC))
                .method(MethodSignature::new("hidden").visibility(Visibility::Private))
                .method(MethodSignature::new("internal").visibility(Visibility::Package)),
        )
        .unwrap();
    let k = registry
        .declare(
            TypeDeclaration::class("test.K")
                .extends("test.J")
                .method(MethodSignature::new("get").param(RawTypeRef::string()))
                .method(MethodSignature::new("get").param(RawTypeRef::object()))
                .method(MethodSignature::new("exported").flags(MethodFlags::JS_MEMBER)),
        )
        .unwrap();

    assert_eq!(&*registry.mangled_name(&method(&registry, j, "get")).unwrap(), "get");
    assert_eq!(&*registry.mangled_name(&method(&registry, j, "create")).unwrap(), "create");
    assert_eq!(
        &*registry.mangled_name(&method(&registry, j, "hidden")).unwrap(),
        "m_hidden___$p_test_J"
    );
    assert_eq!(
        &*registry.mangled_name(&method(&registry, j, "internal")).unwrap(),
        "m_internal__"
    );

    let k_methods = registry.declared_methods(k).unwrap();
    let overriding = &k_methods[0];
    let overload = &k_methods[1];
    assert_eq!(&*registry.mangled_name(overriding).unwrap(), "get");
    assert_eq!(
        &*registry.mangled_name(overload).unwrap(),
        "m_get__java_lang_Object"
    );
    assert_eq!(
        &*registry.mangled_name(&method(&registry, k, "exported")).unwrap(),
        "exported"
    );
}

#[test]
fn test_mangled_type_names() {
    let registry = TypeRegistry::new();
    let matrix = registry.array_of(registry.array_of(TypeId::DOUBLE));
    assert_eq!(registry.mangled_type_name(matrix).unwrap(), "arrayOf_arrayOf_double");
    assert_eq!(registry.mangled_type_name(TypeId::STRING).unwrap(), "java_lang_String");
}

#[test]
fn test_constructors_mangle_without_method_prefix() {
    let registry = TypeRegistry::new();
    let point = registry
        .declare(
            TypeDeclaration::class("test.Point")
                .flags(TypeFlags::JS_TYPE)
                .method(MethodSignature::constructor().param("int").param("int")),
        )
        .unwrap();

    let constructor = method(&registry, point, CONSTRUCTOR_NAME);
    assert!(constructor.is_constructor());
    assert!(!constructor.is_polymorphic());
    assert_eq!(&*registry.mangled_name(&constructor).unwrap(), "$ctor__int__int");
}

#[test]
fn test_synthetic_initializers_keep_their_names() {
    let registry = TypeRegistry::new();
    let holder = registry
        .declare(TypeDeclaration::class("test.Holder"))
        .unwrap();

    let clinit = MethodDescriptorBuilder::new(holder, CLINIT_NAME)
        .flags(MethodFlags::STATIC | MethodFlags::SYNTHETIC)
        .build(&registry);
    assert_eq!(&*registry.mangled_name(&clinit).unwrap(), "$clinit");

    let user_method = MethodDescriptorBuilder::new(holder, CLINIT_NAME).build(&registry);
    assert_eq!(&*registry.mangled_name(&user_method).unwrap(), "m_$clinit__");
}
