//! Diagnostic infrastructure.
//!
//! Diagnostics are the non-fatal half of the error model: a source-level
//! problem detected by a pass (an ambiguous override, a bridge that cannot be
//! synthesized) is recorded against a `SourcePosition` and the pipeline keeps
//! going. Fatal problems are `Err` values, never diagnostics.
//!
//! # Components
//!
//! - `Diagnostic` - a single message with position, category and code
//! - `DiagnosticBag` - an ordered collection with error/warning counts
//! - `diagnostic_codes` - the codes passes report, with message templates

use crate::position::SourcePosition;
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::fmt;

// =============================================================================
// Diagnostic Types
// =============================================================================

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticCategory {
    Error,
    Warning,
    Message,
}

impl DiagnosticCategory {
    pub fn name(self) -> &'static str {
        match self {
            DiagnosticCategory::Error => "error",
            DiagnosticCategory::Warning => "warning",
            DiagnosticCategory::Message => "message",
        }
    }
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A diagnostic message definition with code, category, and message template.
#[derive(Clone, Copy, Debug)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

pub mod diagnostic_codes {
    /// Two unrelated interface defaults override the same method and no class
    /// implementation picks one.
    pub const AMBIGUOUS_OVERRIDE: u32 = 4001;
    /// Two bridges with one mangled name would forward to different methods.
    pub const CONFLICTING_BRIDGE: u32 = 4002;
    /// The type node's super type disagrees with the registry; synthesis skipped.
    pub const INCONSISTENT_HIERARCHY: u32 = 4003;
    /// A static initializer reads a static field declared later in the type.
    pub const FORWARD_STATIC_REFERENCE: u32 = 4004;
}

pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    DiagnosticMessage {
        code: diagnostic_codes::AMBIGUOUS_OVERRIDE,
        category: DiagnosticCategory::Error,
        message: "Method '{0}' in '{1}' is implemented by unrelated default methods in '{2}' and '{3}'.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::CONFLICTING_BRIDGE,
        category: DiagnosticCategory::Error,
        message: "Bridge '{0}' in '{1}' would forward to both '{2}' and '{3}'.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::INCONSISTENT_HIERARCHY,
        category: DiagnosticCategory::Warning,
        message: "Super type of '{0}' was changed by an earlier pass; '{1}' skipped for this type.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::FORWARD_STATIC_REFERENCE,
        category: DiagnosticCategory::Message,
        message: "Static field '{0}' is read before its initializer runs and observes its default value.",
    },
];

static MESSAGES_BY_CODE: Lazy<FxHashMap<u32, &'static DiagnosticMessage>> =
    Lazy::new(|| DIAGNOSTIC_MESSAGES.iter().map(|m| (m.code, m)).collect());

/// Look up a diagnostic message definition by code.
pub fn get_diagnostic_message(code: u32) -> Option<&'static DiagnosticMessage> {
    MESSAGES_BY_CODE.get(&code).copied()
}

/// Format a message template by replacing `{0}`, `{1}`, ... with `args`.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// A diagnostic tied to a source position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub position: SourcePosition,
    pub message_text: String,
}

impl Diagnostic {
    pub fn new(
        category: DiagnosticCategory,
        code: u32,
        position: SourcePosition,
        message: impl Into<String>,
    ) -> Self {
        Diagnostic {
            category,
            code,
            position,
            message_text: message.into(),
        }
    }

    pub fn error(code: u32, position: SourcePosition, message: impl Into<String>) -> Self {
        Self::new(DiagnosticCategory::Error, code, position, message)
    }

    pub fn warning(code: u32, position: SourcePosition, message: impl Into<String>) -> Self {
        Self::new(DiagnosticCategory::Warning, code, position, message)
    }

    /// Build a diagnostic from a registered code, filling the template.
    ///
    /// Unknown codes produce an error with the arguments joined as the message.
    pub fn from_code(code: u32, position: SourcePosition, args: &[&str]) -> Self {
        match get_diagnostic_message(code) {
            Some(def) => Self::new(def.category, code, position, format_message(def.message, args)),
            None => Self::error(code, position, args.join(" ")),
        }
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }

    pub fn is_warning(&self) -> bool {
        self.category == DiagnosticCategory::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}[PL{}]: {}",
            self.position, self.category, self.code, self.message_text
        )
    }
}

// =============================================================================
// DiagnosticBag
// =============================================================================

/// An ordered collection of diagnostics with running error and warning counts.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        match diagnostic.category {
            DiagnosticCategory::Error => self.error_count += 1,
            DiagnosticCategory::Warning => self.warning_count += 1,
            DiagnosticCategory::Message => {}
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.add(diagnostic);
        }
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Diagnostics with the given code, in insertion order.
    pub fn with_code(&self, code: u32) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.code == code)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
        self.error_count = 0;
        self.warning_count = 0;
    }
}
