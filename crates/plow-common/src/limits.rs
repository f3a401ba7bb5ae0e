//! Centralized limits for recursive algorithms.
//!
//! The input program is type-checked, so none of these should be reachable for
//! well-formed input. They turn a cyclic or corrupted hierarchy into an error
//! instead of a stack overflow.

/// Maximum number of supertype steps walked from any type.
///
/// Exceeding it makes the registry report `RegistryError::HierarchyTooDeep`.
pub const MAX_HIERARCHY_DEPTH: u32 = 256;

/// Maximum nesting of type arguments during substitution and erasure.
pub const MAX_TYPE_NESTING_DEPTH: u32 = 64;
