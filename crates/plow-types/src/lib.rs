//! Type Descriptor Registry.
//!
//! Canonical descriptors for every type, method and field of one compilation:
//!
//! - `TypeId` handles hash-consed through structural `TypeKey`s
//! - declarations registered by the frontend and resolved lazily
//! - erasure, specialization and erased subtyping
//! - the per-type resolved method table (`polymorphic_methods`)
//! - target-language method names (`mangled_name`)

pub mod declaration;
pub use declaration::{
    CLINIT_NAME, CONSTRUCTOR_NAME, FieldSignature, INIT_NAME, MethodSignature, TypeDeclaration,
    TypeParameter, Visibility,
};

pub mod error;
pub use error::{RegistryError, UnresolvedReason, UnresolvedTypeError};

pub mod hierarchy;
pub use hierarchy::{Ancestor, ErasedSignature, InheritedMethod};

mod mangle;

pub mod method;
pub use method::{
    FieldDescriptor, FieldId, MethodDescriptor, MethodDescriptorBuilder, MethodFlags, MethodId,
    ParameterTypes,
};

pub mod raw;
pub use raw::RawTypeRef;

pub mod registry;
pub use registry::{OBJECT_NAME, STRING_NAME, Substitution, TypeRegistry};

pub mod types;
pub use types::{PrimitiveKind, TypeDescriptor, TypeFlags, TypeId, TypeKey, TypeKind};

#[cfg(test)]
#[path = "tests/registry_unit_tests.rs"]
mod registry_unit_tests;

#[cfg(test)]
#[path = "tests/mangle_tests.rs"]
mod mangle_tests;
