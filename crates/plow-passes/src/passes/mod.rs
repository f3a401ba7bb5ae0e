//! The built-in normalization passes.

mod abstract_method_stubs;
mod bridge_methods;
mod conversion_context;
mod initialization;
mod mangle_call_sites;
mod normalize_null_literals;

pub use abstract_method_stubs::AbstractMethodStubs;
pub use bridge_methods::{BridgeMethods, Implementation, find_implementation};
pub use conversion_context::{ContextRewriter, ConversionContextRewriter};
pub use initialization::{InstanceInitialization, StaticInitialization, is_compile_time_constant};
pub use mangle_call_sites::MangleCallSites;
pub use normalize_null_literals::NormalizeNullLiterals;

use plow_ast::Type;
use plow_types::{RegistryError, TypeRegistry};
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// Mangled names of every method the type node already declares.
pub(crate) fn declared_mangled_names(
    ty: &Type,
    registry: &TypeRegistry,
) -> Result<FxHashSet<Arc<str>>, RegistryError> {
    ty.methods()
        .map(|method| registry.mangled_name(method.descriptor()))
        .collect()
}
