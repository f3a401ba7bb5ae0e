//! Pass contract.
//!
//! A pass declares its granularity by the [`Pass`] variant it is wrapped in:
//! unit passes see a whole compilation unit, type passes one type at a time.
//! Either way the pass consumes the node and returns its rebuilt replacement.

use crate::error::PassError;
use crate::options::LoweringOptions;
use crate::passes::{
    AbstractMethodStubs, BridgeMethods, InstanceInitialization, MangleCallSites,
    NormalizeNullLiterals, StaticInitialization,
};
use plow_ast::{CompilationUnit, Type};
use plow_common::{Diagnostic, DiagnosticBag, SourcePosition, diagnostic_codes};
use plow_types::TypeRegistry;
use tracing::warn;

/// What a pass may read and where it reports diagnostics.
pub struct PassContext<'a> {
    pub registry: &'a TypeRegistry,
    pub options: &'a LoweringOptions,
    pub diagnostics: DiagnosticBag,
}

impl<'a> PassContext<'a> {
    pub fn new(registry: &'a TypeRegistry, options: &'a LoweringOptions) -> Self {
        PassContext {
            registry,
            options,
            diagnostics: DiagnosticBag::new(),
        }
    }

    pub fn report(&mut self, code: u32, position: SourcePosition, args: &[&str]) {
        self.diagnostics
            .add(Diagnostic::from_code(code, position, args));
    }

    /// Whether the tree's super type for `ty` still matches the registry.
    ///
    /// Passes that reason about inherited members skip the type when it does
    /// not, and a warning is recorded: the registry's member view would
    /// describe a hierarchy the tree no longer has.
    pub fn has_consistent_hierarchy(
        &mut self,
        ty: &Type,
        pass: &'static str,
    ) -> Result<bool, PassError> {
        let expected = self.registry.super_type(ty.descriptor())?;
        if ty.super_type() == expected {
            return Ok(true);
        }
        let type_name = self.registry.type_name(ty.descriptor());
        warn!(type_name = %type_name, pass, "super type diverges from registry; skipping");
        self.report(
            diagnostic_codes::INCONSISTENT_HIERARCHY,
            ty.position().clone(),
            &[&type_name, pass],
        );
        Ok(false)
    }
}

pub trait UnitPass: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply_to_unit(
        &self,
        unit: CompilationUnit,
        context: &mut PassContext<'_>,
    ) -> Result<CompilationUnit, PassError>;
}

pub trait TypePass: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply_to_type(&self, ty: Type, context: &mut PassContext<'_>) -> Result<Type, PassError>;
}

pub enum Pass {
    Unit(Box<dyn UnitPass>),
    Type(Box<dyn TypePass>),
}

impl Pass {
    pub fn name(&self) -> &'static str {
        match self {
            Pass::Unit(pass) => pass.name(),
            Pass::Type(pass) => pass.name(),
        }
    }

    /// Applies the pass to one unit, type by type for type passes.
    pub fn apply(
        &self,
        unit: CompilationUnit,
        context: &mut PassContext<'_>,
    ) -> Result<CompilationUnit, PassError> {
        match self {
            Pass::Unit(pass) => pass.apply_to_unit(unit, context),
            Pass::Type(pass) => {
                let mut builder = unit.into_builder();
                let types = builder
                    .take_types()
                    .into_iter()
                    .map(|ty| pass.apply_to_type(ty, context))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(builder.types(types).build()?)
            }
        }
    }
}

impl std::fmt::Debug for Pass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pass::Unit(pass) => write!(f, "Pass::Unit({})", pass.name()),
            Pass::Type(pass) => write!(f, "Pass::Type({})", pass.name()),
        }
    }
}

// =============================================================================
// Built-in passes
// =============================================================================

/// The normalization passes this crate provides, in default pipeline order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NormalizationPass {
    BridgeMethods,
    AbstractMethodStubs,
    StaticInitialization,
    InstanceInitialization,
    NormalizeNullLiterals,
    MangleCallSites,
}

impl NormalizationPass {
    pub const DEFAULT_ORDER: [NormalizationPass; 6] = [
        NormalizationPass::BridgeMethods,
        NormalizationPass::AbstractMethodStubs,
        NormalizationPass::StaticInitialization,
        NormalizationPass::InstanceInitialization,
        NormalizationPass::NormalizeNullLiterals,
        NormalizationPass::MangleCallSites,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NormalizationPass::BridgeMethods => "bridge-methods",
            NormalizationPass::AbstractMethodStubs => "abstract-method-stubs",
            NormalizationPass::StaticInitialization => "static-initialization",
            NormalizationPass::InstanceInitialization => "instance-initialization",
            NormalizationPass::NormalizeNullLiterals => "normalize-null-literals",
            NormalizationPass::MangleCallSites => "mangle-call-sites",
        }
    }

    pub fn from_name(name: &str) -> Option<NormalizationPass> {
        Self::DEFAULT_ORDER.into_iter().find(|pass| pass.name() == name)
    }

    pub fn create(self) -> Pass {
        match self {
            NormalizationPass::BridgeMethods => Pass::Type(Box::new(BridgeMethods)),
            NormalizationPass::AbstractMethodStubs => Pass::Type(Box::new(AbstractMethodStubs)),
            NormalizationPass::StaticInitialization => Pass::Type(Box::new(StaticInitialization)),
            NormalizationPass::InstanceInitialization => {
                Pass::Type(Box::new(InstanceInitialization))
            }
            NormalizationPass::NormalizeNullLiterals => {
                Pass::Unit(Box::new(NormalizeNullLiterals))
            }
            NormalizationPass::MangleCallSites => Pass::Unit(Box::new(MangleCallSites)),
        }
    }
}
