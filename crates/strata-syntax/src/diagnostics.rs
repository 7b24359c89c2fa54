//! Diagnostics as data on green elements.
//!
//! Attaching never mutates: it returns a copy that shares every child with
//! the original. Collection walks a facade subtree in preorder and skips
//! every subtree whose green flags say it carries nothing.

use strata_errors::{Diagnostic, LocatedDiagnostic};

use crate::{GreenElement, GreenNode, GreenToken, NodeOrToken, SyntaxNode, SyntaxToken, WalkEvent};

/// Returns `element` with `diagnostic` appended to its own diagnostics.
pub fn attach(element: &GreenElement, diagnostic: Diagnostic) -> GreenElement {
    match element {
        NodeOrToken::Node(node) => NodeOrToken::Node(node.with_diagnostic(diagnostic)),
        NodeOrToken::Token(token) => NodeOrToken::Token(token.with_diagnostic(diagnostic)),
    }
}

fn appended(existing: &[Diagnostic], diagnostic: Diagnostic) -> Box<[Diagnostic]> {
    existing.iter().cloned().chain(std::iter::once(diagnostic)).collect()
}

impl GreenNode {
    /// Same kind, children and width; `diagnostic` appended.
    pub fn with_diagnostic(&self, diagnostic: Diagnostic) -> Self {
        self.with_diagnostics(appended(self.diagnostics(), diagnostic))
    }
}

impl GreenToken {
    pub fn with_diagnostic(&self, diagnostic: Diagnostic) -> Self {
        self.with_diagnostics(appended(self.diagnostics(), diagnostic))
    }
}

impl SyntaxNode<'_> {
    /// Every diagnostic in this subtree, in document order.
    ///
    /// A node's own diagnostics come before those of its descendants, and
    /// an earlier sibling's before a later one's, even when both start at
    /// the same offset. Each diagnostic is located at its element's trimmed
    /// range.
    pub fn diagnostics(self) -> Vec<LocatedDiagnostic> {
        let mut diagnostics = Vec::new();
        if !self.green().contains_diagnostics() {
            return diagnostics;
        }

        let mut walk = self.preorder_with_tokens();
        while let Some(event) = walk.next() {
            let WalkEvent::Enter(element) = event else { continue };
            let green = element.green();
            if !green.contains_diagnostics() {
                walk.skip_subtree();
                continue;
            }
            let range = element.trimmed_range();
            diagnostics.extend(green.diagnostics().iter().map(|d| d.clone().located(range)));
        }
        diagnostics
    }
}

impl SyntaxToken<'_> {
    pub fn diagnostics(self) -> Vec<LocatedDiagnostic> {
        let range = self.trimmed_range();
        self.green().diagnostics().iter().map(|d| d.clone().located(range)).collect()
    }
}
