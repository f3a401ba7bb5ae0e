//! plow: the semantic-lowering core of a class-based to prototype-based
//! cross-compiler.
//!
//! A [`Compilation`] owns the type registry for one program and the pass
//! pipeline that lowers it. The frontend declares every type through
//! [`Compilation::declare`], builds the resolved tree with [`ast`] builders and
//! hands it to [`Compilation::lower`].
//!
//! ```ignore
//! let mut compilation = Compilation::new(LoweringOptions::default());
//! let shape = compilation.declare(TypeDeclaration::interface("geo.Shape"))?;
//! let output = compilation.lower(program)?;
//! ```

pub use plow_ast as ast;
pub use plow_common as common;
pub use plow_passes as passes;
pub use plow_types as types;

pub use plow_passes::{
    DispatchTable, LoweringOptions, PassError, Pipeline, PipelineError, PipelineOutput,
};
pub use plow_types::{RegistryError, TypeDeclaration, TypeId, TypeRegistry};

pub mod tracing_config;

use plow_ast::Program;
use thiserror::Error;
use tracing::{debug, debug_span};

#[derive(Debug, Error)]
pub enum CompilationError {
    #[error("invalid lowering options: {0}")]
    Options(#[from] serde_json::Error),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Pass(#[from] PassError),
}

/// One program's registry and the pipeline that lowers it.
pub struct Compilation {
    registry: TypeRegistry,
    pipeline: Pipeline,
}

impl Compilation {
    /// A compilation running the default passes, minus those `options`
    /// disables.
    pub fn new(options: LoweringOptions) -> Self {
        Compilation {
            registry: TypeRegistry::new(),
            pipeline: Pipeline::with_default_passes(options),
        }
    }

    /// Like [`Compilation::new`], with options read from camelCase JSON.
    pub fn from_json_options(json: &str) -> Result<Self, CompilationError> {
        Ok(Compilation::new(LoweringOptions::from_json_str(json)?))
    }

    /// A compilation running a caller-assembled pipeline.
    pub fn with_pipeline(pipeline: Pipeline) -> Self {
        Compilation {
            registry: TypeRegistry::new(),
            pipeline,
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn declare(&self, declaration: TypeDeclaration) -> Result<TypeId, CompilationError> {
        Ok(self.registry.declare(declaration)?)
    }

    /// Runs every pass over `program`. A compilation lowers one program;
    /// call [`Compilation::reset`] before lowering another.
    pub fn lower(&mut self, program: Program) -> Result<PipelineOutput, CompilationError> {
        let _span = debug_span!("lower", units = program.units().len()).entered();
        let output = self.pipeline.run(program, &self.registry)?;
        debug!(
            types = self.registry.type_count(),
            errors = output.diagnostics.error_count(),
            warnings = output.diagnostics.warning_count(),
            "lowering complete"
        );
        Ok(output)
    }

    /// Method tables of a lowered program, as the target runtime sees them.
    pub fn dispatch_table(&self, program: &Program) -> Result<DispatchTable, CompilationError> {
        Ok(DispatchTable::build(program, &self.registry)?)
    }

    /// Forgets every declaration and readies the pipeline for a new program.
    pub fn reset(&mut self) {
        self.registry.reset();
        self.pipeline.reset();
    }
}
