//! Normalization passes for the plow lowering core.
//!
//! The passes rewrite a fully resolved program so that each class carries the
//! members a prototype-based target needs: bridges for dispatch through
//! ancestors, stubs for abstract interface methods, synthetic initialization
//! methods, typed null literals and mangled call sites. [`Pipeline`] runs them
//! in order; [`DispatchTable`] and [`resolve_invocation`] model how the
//! lowered program dispatches.

pub mod error;
pub use error::{PassError, PipelineError};

pub mod options;
pub use options::LoweringOptions;

// Pass contract and orchestration
pub mod pass;
pub use pass::{NormalizationPass, Pass, PassContext, TypePass, UnitPass};

pub mod pipeline;
pub use pipeline::{Pipeline, PipelineOutput, PipelineState};

pub mod passes;
pub use passes::{
    AbstractMethodStubs, BridgeMethods, ContextRewriter, ConversionContextRewriter,
    Implementation, InstanceInitialization, MangleCallSites, NormalizeNullLiterals,
    StaticInitialization, find_implementation, is_compile_time_constant,
};

// Output contract
pub mod dispatch;
pub use dispatch::{DispatchEntry, DispatchTable, resolve_invocation};

#[cfg(test)]
#[path = "tests/options_tests.rs"]
mod options_tests;
#[cfg(test)]
#[path = "tests/conversion_context_tests.rs"]
mod conversion_context_tests;
