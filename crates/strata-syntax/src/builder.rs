//! Session-scoped factory for green trees.

use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;
use text_size::TextSize;

use crate::ast::FieldCategory;
use crate::{GreenElement, GreenNode, GreenToken, SyntaxKind, TreeError};

const DEFAULT_TREE_DEPTH: usize = 128;
const DEFAULT_TREE_SIZE: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuilderConfig {
    /// Reuse one `GreenToken` for every token with the same kind and lengths.
    pub intern_tokens: bool,
    /// Expected nesting depth, used to size the open-node stack.
    pub depth_hint: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self { intern_tokens: true, depth_hint: DEFAULT_TREE_DEPTH }
    }
}

/// Token cache traffic since the builder was created.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct TokenKey {
    kind: SyntaxKind,
    leading: TextSize,
    text: TextSize,
    trailing: TextSize,
    missing: bool,
}

#[derive(Debug, Clone, Copy)]
struct Opened {
    kind: SyntaxKind,
    first_child: usize,
}

/// Builds green trees for one parsing session.
///
/// Elements can be created directly ([`Builder::token`], [`Builder::node`])
/// or streamed as events ([`Builder::start_node`] ... [`Builder::finish`]).
/// The token cache lives as long as the builder, so reusing one builder for
/// several parses shares their leaves.
pub struct Builder {
    config: BuilderConfig,
    tokens: FxHashMap<TokenKey, GreenToken>,
    stats: CacheStats,
    opened: Vec<Opened>,
    children: Vec<GreenElement>,
}

impl Drop for Builder {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.opened.is_empty() {
            panic!("you should call `Builder::finish()`");
        }
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    pub fn new() -> Self {
        Self::with_config(BuilderConfig::default())
    }

    pub fn with_config(config: BuilderConfig) -> Self {
        Self {
            config,
            tokens: FxHashMap::default(),
            stats: CacheStats::default(),
            opened: Vec::with_capacity(config.depth_hint),
            children: Vec::with_capacity(DEFAULT_TREE_SIZE),
        }
    }

    #[inline]
    pub fn config(&self) -> BuilderConfig {
        self.config
    }

    #[inline]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// A present token. `kind` must be a token kind and the three lengths
    /// must not overflow `TextSize`; [`Builder::create_token`] checks both.
    pub fn token(
        &mut self,
        kind: SyntaxKind,
        leading: TextSize,
        text: TextSize,
        trailing: TextSize,
    ) -> GreenToken {
        debug_assert!(kind.is_token(), "{kind:?} is not a token kind");
        self.intern(TokenKey { kind, leading, text, trailing, missing: false })
    }

    /// A zero-width placeholder for a required token absent from the input.
    pub fn missing(&mut self, kind: SyntaxKind) -> GreenToken {
        debug_assert!(kind.is_token(), "{kind:?} is not a token kind");
        let zero = TextSize::new(0);
        self.intern(TokenKey { kind, leading: zero, text: zero, trailing: zero, missing: true })
    }

    /// Checked form of [`Builder::token`] and [`Builder::missing`].
    pub fn create_token(
        &mut self,
        kind: SyntaxKind,
        leading: TextSize,
        text: TextSize,
        trailing: TextSize,
        is_missing: bool,
    ) -> Result<GreenToken, TreeError> {
        if !kind.is_token() {
            return Err(TreeError::shape(kind, "not a token kind"));
        }
        let zero = TextSize::new(0);
        if is_missing && (leading, text, trailing) != (zero, zero, zero) {
            return Err(TreeError::shape(kind, "a missing token must have zero width"));
        }
        if leading.checked_add(text).and_then(|sum| sum.checked_add(trailing)).is_none() {
            return Err(TreeError::shape(kind, "token width overflows the text size"));
        }
        Ok(self.intern(TokenKey { kind, leading, text, trailing, missing: is_missing }))
    }

    fn intern(&mut self, key: TokenKey) -> GreenToken {
        let make = |key: TokenKey| {
            if key.missing {
                GreenToken::missing(key.kind)
            } else {
                GreenToken::new(key.kind, key.leading, key.text, key.trailing)
            }
        };
        if !self.config.intern_tokens {
            return make(key);
        }
        match self.tokens.entry(key) {
            Entry::Occupied(entry) => {
                self.stats.hits += 1;
                tracing::trace!(kind = ?key.kind, "token cache hit");
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                self.stats.misses += 1;
                tracing::trace!(kind = ?key.kind, "token cache miss");
                entry.insert(make(key)).clone()
            }
        }
    }

    /// Assembles a node without validating its shape.
    ///
    /// Panics if the children's total width overflows `TextSize`.
    #[track_caller]
    pub fn node(
        &mut self,
        kind: SyntaxKind,
        children: impl IntoIterator<Item = GreenElement>,
    ) -> GreenNode {
        GreenNode::new(kind, children)
    }

    /// Assembles a node after checking it against the field table.
    ///
    /// Fixed-shape kinds need exactly one child per field, each of the
    /// field's category. `LIST` may not directly contain another `LIST`.
    pub fn checked_node(
        &mut self,
        kind: SyntaxKind,
        children: impl IntoIterator<Item = GreenElement>,
    ) -> Result<GreenNode, TreeError> {
        if kind.is_token() {
            return Err(TreeError::shape(kind, "a token kind cannot label a node"));
        }
        let children = children.into_iter().collect::<Vec<_>>();
        check_shape(kind, &children)?;
        GreenNode::try_new(kind, children)
    }

    /// Opens a node; its children are every element pushed until the matching
    /// [`Builder::finish_node`].
    pub fn start_node(&mut self, kind: SyntaxKind) {
        self.opened.push(Opened { kind, first_child: self.children.len() });
    }

    pub fn push_token(
        &mut self,
        kind: SyntaxKind,
        leading: TextSize,
        text: TextSize,
        trailing: TextSize,
    ) {
        let token = self.token(kind, leading, text, trailing);
        self.children.push(token.into());
    }

    pub fn push_missing(&mut self, kind: SyntaxKind) {
        let token = self.missing(kind);
        self.children.push(token.into());
    }

    /// Pushes an already built subtree, typically one reused from a previous
    /// tree.
    pub fn push_element(&mut self, element: impl Into<GreenElement>) {
        self.children.push(element.into());
    }

    /// Closes the node opened last. On error the node stays open with its
    /// children untouched.
    pub fn finish_node(&mut self) -> Result<(), TreeError> {
        let Some(Opened { kind, first_child }) = self.opened.pop() else {
            return Err(TreeError::shape(SyntaxKind::ERROR, "`finish_node` without an open node"));
        };
        let children = self.children.split_off(first_child);
        match GreenNode::try_new(kind, children.iter().cloned()) {
            Ok(node) => {
                self.children.push(node.into());
                Ok(())
            }
            Err(err) => {
                self.children.extend(children);
                self.opened.push(Opened { kind, first_child });
                Err(err)
            }
        }
    }

    /// Returns the single root built from the event stream and resets the
    /// event state. The token cache is kept.
    pub fn finish(&mut self) -> Result<GreenNode, TreeError> {
        let opened = std::mem::take(&mut self.opened);
        let children = std::mem::take(&mut self.children);
        if let Some(unfinished) = opened.last() {
            return Err(TreeError::shape(unfinished.kind, "node was started but never finished"));
        }

        let mut children = children.into_iter();
        match (children.next(), children.next()) {
            (Some(GreenElement::Node(root)), None) => {
                tracing::debug!(kind = ?root.kind(), width = ?root.width(), "built tree");
                Ok(root)
            }
            (Some(GreenElement::Token(token)), None) => {
                Err(TreeError::shape(token.kind(), "the root must be a node"))
            }
            (Some(_), Some(extra)) => {
                Err(TreeError::shape(extra.kind(), "more than one root element"))
            }
            (None, _) => Err(TreeError::shape(SyntaxKind::ERROR, "no root element was built")),
        }
    }
}

fn check_shape(kind: SyntaxKind, children: &[GreenElement]) -> Result<(), TreeError> {
    if kind.is_free_form() {
        if kind.is_list() && children.iter().any(|child| child.kind().is_list()) {
            return Err(TreeError::shape(kind, "a LIST cannot directly contain another LIST"));
        }
        return Ok(());
    }
    let Some(fields) = kind.fields() else {
        return Ok(());
    };
    if fields.len() != children.len() {
        return Err(TreeError::shape(
            kind,
            format!("expected {} children, found {}", fields.len(), children.len()),
        ));
    }
    for (field, child) in fields.iter().zip(children) {
        if !field.category.accepts(child) {
            let expected = match field.category {
                FieldCategory::Token => "a token",
                FieldCategory::Node => "a node",
                FieldCategory::Any => "any element",
            };
            return Err(TreeError::shape(
                kind,
                format!("field `{}` expects {expected}, found {:?}", field.name, child.kind()),
            ));
        }
    }
    Ok(())
}
