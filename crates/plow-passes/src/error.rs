use crate::pipeline::PipelineState;
use plow_ast::ConstructionError;
use plow_common::Diagnostic;
use plow_types::{RegistryError, UnresolvedTypeError};
use thiserror::Error;

/// A pass hit an inconsistency it cannot diagnose its way around.
#[derive(Debug, Error)]
pub enum PassError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Construction(#[from] ConstructionError),
    #[error("missing descriptor: {0}")]
    MissingDescriptor(String),
    #[error("pass `{pass}` changed its own output in `{unit}`")]
    NotIdempotent { pass: &'static str, unit: String },
}

impl From<UnresolvedTypeError> for PassError {
    fn from(err: UnresolvedTypeError) -> Self {
        PassError::Registry(RegistryError::Unresolved(err))
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pass `{pass}` (#{pass_index}) failed: {source}")]
    PassFailed {
        pass: &'static str,
        pass_index: usize,
        #[source]
        source: PassError,
    },
    #[error("stopped before pass `{next_pass}` after {error_count} error diagnostic(s)")]
    StoppedOnDiagnostics {
        next_pass: &'static str,
        error_count: usize,
        diagnostics: Vec<Diagnostic>,
    },
    #[error("pipeline cannot start from state {0:?}")]
    InvalidState(PipelineState),
}
