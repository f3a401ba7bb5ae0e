//! Pass pipeline orchestrator.
//!
//! Pass *i* is applied to every compilation unit before pass *i + 1* starts.
//! Units are independent within a pass, so with `parallel` set they are
//! processed through rayon; results and diagnostics are merged back in unit
//! order either way.

use crate::error::{PassError, PipelineError};
use crate::options::LoweringOptions;
use crate::pass::{NormalizationPass, Pass, PassContext};
use plow_ast::{CompilationUnit, Program};
use plow_common::DiagnosticBag;
use plow_types::TypeRegistry;
use rayon::prelude::*;
use tracing::{debug, debug_span};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Running { pass_index: usize },
    Done,
    Failed,
}

/// The lowered program and everything the passes reported on the way.
#[derive(Debug)]
pub struct PipelineOutput {
    pub program: Program,
    pub diagnostics: DiagnosticBag,
}

pub struct Pipeline {
    passes: Vec<Pass>,
    options: LoweringOptions,
    state: PipelineState,
}

impl Pipeline {
    /// An empty pipeline.
    pub fn new(options: LoweringOptions) -> Self {
        Pipeline {
            passes: Vec::new(),
            options,
            state: PipelineState::Idle,
        }
    }

    /// The built-in passes in default order, minus `disabled_passes`.
    pub fn with_default_passes(options: LoweringOptions) -> Self {
        let passes = NormalizationPass::DEFAULT_ORDER
            .into_iter()
            .filter(|pass| options.is_pass_enabled(pass.name()))
            .map(NormalizationPass::create)
            .collect();
        Pipeline {
            passes,
            options,
            state: PipelineState::Idle,
        }
    }

    pub fn with_pass(mut self, pass: Pass) -> Self {
        self.passes.push(pass);
        self
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(Pass::name).collect()
    }

    pub fn options(&self) -> &LoweringOptions {
        &self.options
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Back to `Idle` so the pipeline can run another program.
    pub fn reset(&mut self) {
        self.state = PipelineState::Idle;
    }

    pub fn run(
        &mut self,
        program: Program,
        registry: &TypeRegistry,
    ) -> Result<PipelineOutput, PipelineError> {
        if self.state != PipelineState::Idle {
            return Err(PipelineError::InvalidState(self.state));
        }

        let mut diagnostics = DiagnosticBag::new();
        let mut units = program.into_units();

        for (pass_index, pass) in self.passes.iter().enumerate() {
            if self.options.stop_on_error_diagnostics && diagnostics.has_errors() {
                self.state = PipelineState::Failed;
                return Err(PipelineError::StoppedOnDiagnostics {
                    next_pass: pass.name(),
                    error_count: diagnostics.error_count(),
                    diagnostics: diagnostics.into_vec(),
                });
            }

            self.state = PipelineState::Running { pass_index };
            let _span = debug_span!("pass", name = pass.name(), index = pass_index).entered();

            let results = apply_pass(pass, units, registry, &self.options);
            units = Vec::with_capacity(results.len());
            for result in results {
                match result {
                    Ok((unit, unit_diagnostics)) => {
                        diagnostics.extend(unit_diagnostics.into_vec());
                        units.push(unit);
                    }
                    Err(source) => {
                        self.state = PipelineState::Failed;
                        return Err(PipelineError::PassFailed {
                            pass: pass.name(),
                            pass_index,
                            source,
                        });
                    }
                }
            }
            debug!(
                pass = pass.name(),
                units = units.len(),
                diagnostics = diagnostics.len(),
                "pass complete"
            );
        }

        self.state = PipelineState::Done;
        Ok(PipelineOutput {
            program: Program::new(units),
            diagnostics,
        })
    }
}

fn apply_pass(
    pass: &Pass,
    units: Vec<CompilationUnit>,
    registry: &TypeRegistry,
    options: &LoweringOptions,
) -> Vec<Result<(CompilationUnit, DiagnosticBag), PassError>> {
    if options.parallel {
        units
            .into_par_iter()
            .map(|unit| apply_to_unit(pass, unit, registry, options))
            .collect()
    } else {
        units
            .into_iter()
            .map(|unit| apply_to_unit(pass, unit, registry, options))
            .collect()
    }
}

fn apply_to_unit(
    pass: &Pass,
    unit: CompilationUnit,
    registry: &TypeRegistry,
    options: &LoweringOptions,
) -> Result<(CompilationUnit, DiagnosticBag), PassError> {
    let mut context = PassContext::new(registry, options);
    let unit = pass.apply(unit, &mut context)?;

    if options.verify_idempotence {
        let mut scratch = PassContext::new(registry, options);
        let again = pass.apply(unit.clone(), &mut scratch)?;
        if again != unit {
            return Err(PassError::NotIdempotent {
                pass: pass.name(),
                unit: unit.file_path().to_string(),
            });
        }
    }

    Ok((unit, context.diagnostics))
}
