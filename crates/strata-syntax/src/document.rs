use crate::{GreenElement, GreenNode, Modification, SyntaxPath, SyntaxTree, TreeError};

/// The current tree of one source file, as served to editor tooling.
///
/// `tree` answers *get tree*; `modify` answers *modify tree*. A failed
/// modification leaves the document exactly as it was.
#[derive(Debug, Clone)]
pub struct SyntaxDocument {
    root: GreenNode,
    version: u64,
}

impl SyntaxDocument {
    pub fn new(root: GreenNode) -> Self {
        Self { root, version: 0 }
    }

    /// Number of successful modifications so far.
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[inline]
    pub fn green(&self) -> &GreenNode {
        &self.root
    }

    /// A fresh navigation session with the root facade at offset 0.
    pub fn tree(&self) -> SyntaxTree {
        SyntaxTree::new(self.root.clone())
    }

    /// Applies `edits` as one batch. An empty batch is not a modification
    /// and leaves the version alone.
    pub fn modify(
        &mut self,
        edits: impl IntoIterator<Item = (SyntaxPath, GreenElement)>,
    ) -> Result<SyntaxTree, TreeError> {
        let mut modification = Modification::new();
        for (path, replacement) in edits {
            modification.replace_path(path, replacement);
        }

        if modification.is_empty() {
            return Ok(self.tree());
        }

        let tree = self.tree().apply(modification)?;
        self.root = tree.green().clone();
        self.version += 1;
        tracing::debug!(version = self.version, width = ?self.root.width(), "document updated");
        Ok(tree)
    }
}
