//! Registry errors.
//!
//! All of these are fatal: the input is assumed to be type-checked, so a
//! reference the registry cannot resolve means the frontend handed over an
//! inconsistent program.

use crate::method::MethodId;
use crate::types::TypeId;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum UnresolvedReason {
    #[error("no type with this name is declared")]
    UnknownType,
    #[error("type variable is not in scope")]
    TypeVariableOutOfScope,
    #[error("expected {expected} type arguments, found {found}")]
    ArgumentCount { expected: usize, found: usize },
}

/// A type reference could not be resolved to a descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("cannot resolve type `{reference}`: {reason}")]
pub struct UnresolvedTypeError {
    pub reference: String,
    pub reason: UnresolvedReason,
}

impl UnresolvedTypeError {
    pub fn new(reference: impl Into<String>, reason: UnresolvedReason) -> Self {
        UnresolvedTypeError {
            reference: reference.into(),
            reason,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Unresolved(#[from] UnresolvedTypeError),
    #[error("type `{0}` is declared more than once")]
    DuplicateDeclaration(String),
    #[error("supertype chain of `{0}` exceeds the hierarchy depth limit")]
    HierarchyTooDeep(String),
    #[error("type arguments of `{0}` are nested too deeply")]
    NestingTooDeep(String),
    #[error("{0:?} does not belong to this compilation")]
    UnknownType(TypeId),
    #[error("{0:?} does not belong to this compilation")]
    UnknownMethod(MethodId),
}
