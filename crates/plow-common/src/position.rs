//! Source provenance for tree nodes.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Where a node came from: file plus byte range, with the 1-based line and
/// column of the start for diagnostics.
///
/// Synthesized nodes carry [`SourcePosition::NONE`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default, Serialize)]
pub struct SourcePosition {
    pub file: Option<Arc<str>>,
    pub start: u32,
    pub end: u32,
    pub line: u32,
    pub column: u32,
}

impl SourcePosition {
    /// Position of a synthetic node.
    pub const NONE: SourcePosition = SourcePosition {
        file: None,
        start: 0,
        end: 0,
        line: 0,
        column: 0,
    };

    pub fn new(file: impl Into<Arc<str>>, start: u32, end: u32, line: u32, column: u32) -> Self {
        SourcePosition {
            file: Some(file.into()),
            start,
            end,
            line,
            column,
        }
    }

    /// Position covering only a line of `file`, for tests and frontends that
    /// do not track offsets.
    pub fn at_line(file: impl Into<Arc<str>>, line: u32) -> Self {
        Self::new(file, 0, 0, line, 1)
    }

    pub fn is_none(&self) -> bool {
        self.file.is_none()
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}({},{})", file, self.line, self.column),
            None => f.write_str("<synthetic>"),
        }
    }
}
