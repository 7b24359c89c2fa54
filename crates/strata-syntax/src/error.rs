use text_size::TextRange;

use crate::{SyntaxKind, SyntaxPath};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The caller assembled children that cannot form a node of `kind`.
    /// This is a bug in the calling layer, not a property of the input.
    #[error("illegal tree shape for {kind:?}: {reason}")]
    IllegalTreeShape { kind: SyntaxKind, reason: String },

    #[error("child index {index} is out of range for {kind:?} with {len} children")]
    ChildOutOfRange { kind: SyntaxKind, index: usize, len: usize },

    #[error("path `{path}` does not resolve at depth {depth}")]
    InvalidPath { path: SyntaxPath, depth: usize },

    #[error("edit at {first:?} overlaps edit at {second:?}")]
    OverlappingEdit { first: TextRange, second: TextRange },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid path segment `{segment}`, expected a child index")]
pub struct ParsePathError {
    pub segment: String,
}

impl TreeError {
    pub(crate) fn shape(kind: SyntaxKind, reason: impl Into<String>) -> Self {
        Self::IllegalTreeShape { kind, reason: reason.into() }
    }
}
