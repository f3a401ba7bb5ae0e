//! Common types and utilities for the plow lowering core.
//!
//! This crate provides foundational types used across all plow crates:
//! - String interning (`Atom`, `ShardedInterner`)
//! - Source positions (`SourcePosition`)
//! - Diagnostics (`Diagnostic`, `DiagnosticBag`, diagnostic codes)
//! - Recursion limits

// String interning for type, method and field names
pub mod interner;
pub use interner::{Atom, ShardedInterner};
#[cfg(test)]
#[path = "tests/interner_tests.rs"]
mod interner_tests;

// Source provenance attached to every tree node
pub mod position;
pub use position::SourcePosition;

// Non-fatal diagnostics accumulated by passes
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticBag, DiagnosticCategory, diagnostic_codes};
#[cfg(test)]
#[path = "tests/diagnostics_tests.rs"]
mod diagnostics_tests;

// Centralized limits and thresholds
pub mod limits;
