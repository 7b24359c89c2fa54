//! Non-destructive subtree replacement.
//!
//! A batch is validated in full before anything is rebuilt: every path must
//! resolve and no two targets may overlap. The rebuild then descends once
//! along the union of all edited paths. Each node on that union is rebuilt
//! exactly once; every child off it is reused by reference.

use text_size::TextRange;

use crate::{GreenElement, GreenNode, SyntaxElement, SyntaxPath, SyntaxTree, TreeError};

/// A batch of subtree replacements against one tree.
#[derive(Debug, Clone, Default)]
pub struct Modification {
    edits: Vec<Edit>,
}

#[derive(Debug, Clone)]
struct Edit {
    path: SyntaxPath,
    /// Green element the target wrapped when the edit was recorded.
    expected: Option<GreenElement>,
    replacement: GreenElement,
}

#[derive(Debug)]
struct Resolved {
    path: SyntaxPath,
    range: TextRange,
    replacement: GreenElement,
}

impl Modification {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the subtree under `target`.
    ///
    /// The target's green element is remembered, so applying the batch to a
    /// tree whose subtree at that path differs fails instead of editing the
    /// wrong node.
    pub fn replace<'t>(
        &mut self,
        target: impl Into<SyntaxElement<'t>>,
        replacement: impl Into<GreenElement>,
    ) -> &mut Self {
        let target = target.into();
        self.edits.push(Edit {
            path: target.path(),
            expected: Some(target.green()),
            replacement: replacement.into(),
        });
        self
    }

    /// Replaces whatever subtree `path` names when the batch is applied.
    pub fn replace_path(
        &mut self,
        path: SyntaxPath,
        replacement: impl Into<GreenElement>,
    ) -> &mut Self {
        self.edits.push(Edit { path, expected: None, replacement: replacement.into() });
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}

impl SyntaxTree {
    /// Applies every edit of `modification` and returns a session over the
    /// new root. `self` is left untouched.
    #[tracing::instrument(level = "debug", skip_all, fields(edits = modification.len()))]
    pub fn apply(&self, modification: Modification) -> Result<Self, TreeError> {
        let edits = self.validate(modification).inspect_err(|err| {
            tracing::warn!(%err, "rejected modification");
        })?;

        let root = match edits.first() {
            None => self.green().clone(),
            Some(edit) if edit.path.is_root() => match &edit.replacement {
                GreenElement::Node(node) => node.clone(),
                GreenElement::Token(token) => {
                    return Err(TreeError::shape(token.kind(), "the root must be replaced by a node"));
                }
            },
            Some(_) => splice(self.green(), 0, &edits)?,
        };

        tracing::debug!(old_width = ?self.green().width(), new_width = ?root.width(), "applied modification");
        Ok(Self::new(root))
    }

    /// Single-edit form of [`SyntaxTree::apply`].
    pub fn replace<'t>(
        &self,
        target: impl Into<SyntaxElement<'t>>,
        replacement: impl Into<GreenElement>,
    ) -> Result<Self, TreeError> {
        let mut modification = Modification::new();
        modification.replace(target, replacement);
        self.apply(modification)
    }

    /// Resolves every edit and rejects the batch on the first conflict.
    /// On success the edits are sorted by path.
    fn validate(&self, modification: Modification) -> Result<Vec<Resolved>, TreeError> {
        let mut resolved = Vec::with_capacity(modification.len());
        for edit in modification.edits {
            let target = self.resolve(&edit.path)?;
            if let Some(expected) = &edit.expected {
                if !target.green().ptr_eq(expected) {
                    return Err(TreeError::shape(
                        target.kind(),
                        format!("edit target at `{}` is not part of this tree", edit.path),
                    ));
                }
            }
            resolved.push(Resolved {
                path: edit.path,
                range: target.text_range(),
                replacement: edit.replacement,
            });
        }

        // A path sorts directly before its extensions, so a prefix conflict
        // always shows up between neighbours.
        resolved.sort_by(|lhs, rhs| lhs.path.cmp(&rhs.path));
        for pair in resolved.windows(2) {
            let (first, second) = (&pair[0], &pair[1]);
            let shares_bytes = first
                .range
                .intersect(second.range)
                .is_some_and(|common| !common.is_empty());
            if first.path.is_prefix_of(&second.path) || shares_bytes {
                return Err(TreeError::OverlappingEdit { first: first.range, second: second.range });
            }
        }
        Ok(resolved)
    }
}

/// Rebuilds `node`, the ancestor at `depth` of every edit in `edits`.
fn splice(node: &GreenNode, depth: usize, edits: &[Resolved]) -> Result<GreenNode, TreeError> {
    let mut children = node.children().cloned().collect::<Vec<_>>();
    let step = |edit: &Resolved| edit.path.indices()[depth] as usize;

    for group in edits.chunk_by(|lhs, rhs| step(lhs) == step(rhs)) {
        let edit = &group[0];
        let index = step(edit);
        let len = children.len();
        let slot = children
            .get_mut(index)
            .ok_or_else(|| TreeError::ChildOutOfRange { kind: node.kind(), index, len })?;

        // Validation guarantees a direct replacement is alone in its group.
        *slot = if edit.path.depth() == depth + 1 {
            edit.replacement.clone()
        } else {
            let GreenElement::Node(child) = &*slot else {
                return Err(TreeError::InvalidPath { path: edit.path.clone(), depth: depth + 1 });
            };
            splice(child, depth + 1, group)?.into()
        };
    }

    tracing::trace!(kind = ?node.kind(), depth, "rebuilt ancestor");
    node.with_children(children)
}
