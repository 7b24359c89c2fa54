//! Lossless syntax trees with shared, immutable subtrees.
//!
//! The green layer stores kinds and lengths only and is shared freely
//! between trees. A [`SyntaxTree`] session lays positioned, parent-aware
//! handles over one green root on demand, and edits produce new roots that
//! reuse every untouched subtree.

/// Kind-indexed field table and typed views.
pub mod ast;
mod builder;
mod cursor;
mod diagnostics;
mod document;
mod error;
mod green;
mod modify;
mod red;
mod syntax;
mod syntax_kind;
mod syntax_set;

#[cfg(test)]
mod tests;

/// Session-scoped factory for green trees.
pub use builder::{Builder, BuilderConfig, CacheStats};
/// Preorder traversal over facades.
pub use cursor::{Preorder, PreorderWithTokens, WalkEvent};
/// Non-mutating diagnostic attachment.
pub use diagnostics::attach;
/// Get/modify contract for editor tooling.
pub use document::SyntaxDocument;
pub use error::{ParsePathError, TreeError};
/// Immutable, position-independent tree data.
pub use green::{GreenChildren, GreenElement, GreenNode, GreenToken, GreenTokens};
pub use modify::Modification;
/// Navigation session over one green root.
pub use red::SyntaxTree;
pub use strata_errors::{Diagnostic, DiagnosticCode, LocatedDiagnostic, Severity};
/// Positioned handles and their helpers.
pub use syntax::{
    NodeOrToken, SyntaxChildren, SyntaxElement, SyntaxNode, SyntaxPath, SyntaxToken, TokenAtOffset,
};
/// Token and node kinds used throughout the tree.
pub use syntax_kind::SyntaxKind;
/// Compact set for grouping `SyntaxKind` values.
pub use syntax_set::SyntaxSet;
pub use text_size::{TextRange, TextSize};
