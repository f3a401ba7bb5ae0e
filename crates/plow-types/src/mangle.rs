//! Target-language method names.
//!
//! Methods exposed to the target language keep their simple name. Everything
//! else gets a name that encodes the erased parameter types, so overloads
//! never collide on a prototype:
//!
//! ```text
//! get(java.lang.String)          -> m_get__java_lang_String
//! put(int, java.lang.Object[])   -> m_put__int__arrayOf_java_lang_Object
//! run()                          -> m_run__
//! private helper() in p.A        -> m_helper___$p_p_A
//! constructor (int)              -> $ctor__int
//! synthetic $clinit()            -> $clinit
//! ```
//!
//! Names are computed on the root declaration, so specialized views, bridges
//! and stubs all share the name of the member they stand for.

use crate::error::RegistryError;
use crate::method::{MethodDescriptor, MethodFlags};
use crate::registry::TypeRegistry;
use crate::types::{TypeFlags, TypeId, TypeKey};
use crate::{CLINIT_NAME, INIT_NAME, Visibility};
use std::sync::Arc;

impl TypeRegistry {
    pub fn mangled_name(&self, method: &MethodDescriptor) -> Result<Arc<str>, RegistryError> {
        let declaration = method.declaration();
        if let Some(cached) = self.mangled.get(&declaration.id()) {
            return Ok(cached.value().clone());
        }
        let name: Arc<str> = if is_synthetic_initializer(declaration) {
            Arc::from(declaration.name())
        } else if self.is_js_member(declaration)? {
            Arc::from(declaration.name())
        } else {
            Arc::from(self.mangle_member_name(declaration)?)
        };
        Ok(self
            .mangled
            .entry(declaration.id())
            .or_insert(name)
            .value()
            .clone())
    }

    /// Whether `method` is called by its simple name from the target language:
    /// explicitly marked, public in a js-type, or overriding such a member.
    pub fn is_js_member(&self, method: &MethodDescriptor) -> Result<bool, RegistryError> {
        let declaration = method.declaration();
        if let Some(cached) = self.js_members.get(&declaration.id()) {
            return Ok(*cached);
        }

        let exposed = if declaration.flags().contains(MethodFlags::JS_MEMBER) {
            true
        } else if declaration.is_private() || declaration.is_constructor() {
            false
        } else if declaration.visibility() == Visibility::Public
            && self
                .descriptor(declaration.enclosing_type())?
                .flags
                .contains(TypeFlags::JS_TYPE)
        {
            true
        } else if declaration.is_static() {
            false
        } else {
            self.overrides_js_member(declaration)?
        };

        self.js_members.insert(declaration.id(), exposed);
        Ok(exposed)
    }

    fn overrides_js_member(&self, declaration: &MethodDescriptor) -> Result<bool, RegistryError> {
        let signature = self.erased_signature(declaration)?;
        for inherited in self
            .inherited_methods(declaration.enclosing_type())?
            .iter()
        {
            if inherited.method.name_atom() != declaration.name_atom() {
                continue;
            }
            if self.erased_signature(&inherited.method)? == signature
                && self.is_js_member(&inherited.method)?
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn mangle_member_name(&self, declaration: &MethodDescriptor) -> Result<String, RegistryError> {
        let parameters = declaration
            .parameters()
            .iter()
            .map(|&parameter| self.mangled_type_name(self.erasure(parameter)?))
            .collect::<Result<Vec<_>, _>>()?;

        if declaration.is_constructor() {
            return Ok(format!("{}__{}", declaration.name(), parameters.join("__")));
        }
        let mut mangled = format!("m_{}__{}", declaration.name(), parameters.join("__"));
        if declaration.is_private() {
            let enclosing = self.erasure(declaration.enclosing_type())?;
            mangled.push_str("_$p_");
            mangled.push_str(&self.mangled_type_name(enclosing)?);
        }
        Ok(mangled)
    }

    /// `java.lang.String` -> `java_lang_String`, `int[]` -> `arrayOf_int`.
    pub fn mangled_type_name(&self, ty: TypeId) -> Result<String, RegistryError> {
        let descriptor = self.descriptor(ty)?;
        match &descriptor.key {
            TypeKey::Primitive(kind) => Ok(kind.name().to_string()),
            TypeKey::Null => Ok("null".to_string()),
            TypeKey::Declared { name, .. } => Ok(self.resolve_name(*name).replace('.', "_")),
            TypeKey::Array(component) => {
                Ok(format!("arrayOf_{}", self.mangled_type_name(*component)?))
            }
            TypeKey::TypeVariable { .. } | TypeKey::Intersection(_) => {
                self.mangled_type_name(self.erasure(ty)?)
            }
        }
    }
}

fn is_synthetic_initializer(method: &MethodDescriptor) -> bool {
    method.is_synthetic()
        && method.parameters().is_empty()
        && matches!(method.name(), CLINIT_NAME | INIT_NAME)
}
