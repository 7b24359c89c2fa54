//! Public syntax tree API: `Copy` handles into a [`SyntaxTree`] session.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use text_size::{TextRange, TextSize};

use crate::red::FacadeId;
use crate::{
    GreenElement, GreenNode, GreenToken, ParsePathError, SyntaxKind, SyntaxTree, TreeError,
};

/// Positioned view of a green node.
#[derive(Clone, Copy)]
pub struct SyntaxNode<'t> {
    tree: &'t SyntaxTree,
    id: FacadeId,
}

/// Positioned view of a green token.
#[derive(Clone, Copy)]
pub struct SyntaxToken<'t> {
    tree: &'t SyntaxTree,
    id: FacadeId,
}

/// Node or token element inside the tree.
pub type SyntaxElement<'t> = NodeOrToken<SyntaxNode<'t>, SyntaxToken<'t>>;

impl<'t> SyntaxNode<'t> {
    #[inline]
    pub(crate) fn new(tree: &'t SyntaxTree, id: FacadeId) -> Self {
        Self { tree, id }
    }

    #[inline]
    pub(crate) fn id(self) -> FacadeId {
        self.id
    }

    /// The session this handle belongs to.
    #[inline]
    pub fn tree(self) -> &'t SyntaxTree {
        self.tree
    }

    #[inline]
    pub fn kind(self) -> SyntaxKind {
        self.tree.with(self.id, |data| data.green.kind())
    }

    pub fn green(self) -> GreenNode {
        self.tree.with(self.id, |data| match &data.green {
            NodeOrToken::Node(node) => node.clone(),
            NodeOrToken::Token(_) => unreachable!("node handle over a token record"),
        })
    }

    /// Absolute start offset, leading trivia included.
    #[inline]
    pub fn offset(self) -> TextSize {
        self.tree.with(self.id, |data| data.offset)
    }

    #[inline]
    pub fn width(self) -> TextSize {
        self.tree.with(self.id, |data| data.green.width())
    }

    /// Range covered by this node, trivia included.
    #[inline]
    pub fn text_range(self) -> TextRange {
        self.tree.with(self.id, |data| TextRange::at(data.offset, data.green.width()))
    }

    /// Range from the text of the first present token to the text of the
    /// last one, without their outer trivia. Missing tokens are ignored; a
    /// node without present tokens yields an empty range at its start.
    pub fn trimmed_range(self) -> TextRange {
        let present = |token: SyntaxToken<'_>| !token.is_missing();
        match (first_token_where(self, &present), last_token_where(self, &present)) {
            (Some(first), Some(last)) => {
                TextRange::new(first.trimmed_range().start(), last.trimmed_range().end())
            }
            _ => TextRange::empty(self.offset()),
        }
    }

    /// Slices the node's text, trivia included, out of `source`.
    ///
    /// `source` must be the buffer this tree was built from.
    #[inline]
    pub fn text<'s>(self, source: &'s str) -> &'s str {
        &source[self.text_range()]
    }

    #[inline]
    pub fn text_trimmed<'s>(self, source: &'s str) -> &'s str {
        &source[self.trimmed_range()]
    }

    #[inline]
    pub fn parent(self) -> Option<Self> {
        parent_of(self.tree, self.id)
    }

    /// Iterates ancestors starting from this node.
    #[inline]
    pub fn ancestors(self) -> impl Iterator<Item = SyntaxNode<'t>> + Clone {
        std::iter::successors(Some(self), |node| node.parent())
    }

    /// Position among the parent's children; `None` for a root.
    #[inline]
    pub fn index_in_parent(self) -> Option<usize> {
        index_in_parent(self.tree, self.id)
    }

    #[inline]
    pub fn children(self) -> SyntaxChildren<'t> {
        let len = self.tree.with(self.id, |data| data.green.as_node().map_or(0, GreenNode::len));
        SyntaxChildren { tree: self.tree, parent: self.id, front: 0, back: len }
    }

    #[inline]
    pub fn child(self, index: usize) -> Option<SyntaxElement<'t>> {
        self.tree.child(self.id, index).map(|id| self.tree.element(id))
    }

    pub fn child_at(self, index: usize) -> Result<SyntaxElement<'t>, TreeError> {
        self.child(index).ok_or_else(|| TreeError::ChildOutOfRange {
            kind: self.kind(),
            index,
            len: self.children().len(),
        })
    }

    /// Iterates child nodes, skipping tokens.
    #[inline]
    pub fn child_nodes(self) -> impl DoubleEndedIterator<Item = SyntaxNode<'t>> + Clone {
        self.children().filter_map(NodeOrToken::into_node)
    }

    #[inline]
    pub fn first_child(self) -> Option<SyntaxElement<'t>> {
        self.children().next()
    }

    #[inline]
    pub fn last_child(self) -> Option<SyntaxElement<'t>> {
        self.children().next_back()
    }

    #[inline]
    pub fn next_sibling(self) -> Option<SyntaxElement<'t>> {
        sibling(self.tree, self.id, Direction::Next)
    }

    #[inline]
    pub fn prev_sibling(self) -> Option<SyntaxElement<'t>> {
        sibling(self.tree, self.id, Direction::Prev)
    }

    /// First token of the subtree, missing tokens included.
    #[inline]
    pub fn first_token(self) -> Option<SyntaxToken<'t>> {
        first_token_where(self, &|_| true)
    }

    #[inline]
    pub fn last_token(self) -> Option<SyntaxToken<'t>> {
        last_token_where(self, &|_| true)
    }

    /// Finds the token(s) touching `offset`. Zero-width tokens never match.
    pub fn token_at_offset(self, offset: TextSize) -> TokenAtOffset<SyntaxToken<'t>> {
        let range = self.text_range();
        if range.is_empty() || !range.contains_inclusive(offset) {
            return TokenAtOffset::None;
        }

        let mut covering = self.children().filter(|child| {
            let child_range = child.text_range();
            !child_range.is_empty() && child_range.contains_inclusive(offset)
        });
        let Some(left) = covering.next() else {
            return TokenAtOffset::None;
        };
        let left = left.token_at_offset(offset);
        let Some(right) = covering.next() else {
            return left;
        };
        match (left.left_biased(), right.token_at_offset(offset).right_biased()) {
            (Some(left), Some(right)) => TokenAtOffset::Between(left, right),
            (Some(single), None) | (None, Some(single)) => TokenAtOffset::Single(single),
            (None, None) => TokenAtOffset::None,
        }
    }

    /// Returns the smallest element with a non-empty range that fully
    /// covers `range`, or `None` if `range` is not inside this node.
    pub fn covering_element(self, range: TextRange) -> Option<SyntaxElement<'t>> {
        if !self.text_range().contains_range(range) {
            return None;
        }
        let mut current = NodeOrToken::Node(self);
        while let NodeOrToken::Node(node) = current {
            let child = node.children().find(|child| {
                let child_range = child.text_range();
                !child_range.is_empty() && child_range.contains_range(range)
            });
            match child {
                Some(child) => current = child,
                None => break,
            }
        }
        Some(current)
    }

    /// Child indices leading from the session root to this node.
    #[inline]
    pub fn path(self) -> SyntaxPath {
        path_of(self.tree, self.id)
    }
}

impl<'t> SyntaxToken<'t> {
    #[inline]
    pub(crate) fn new(tree: &'t SyntaxTree, id: FacadeId) -> Self {
        Self { tree, id }
    }

    #[inline]
    pub fn tree(self) -> &'t SyntaxTree {
        self.tree
    }

    #[inline]
    pub fn kind(self) -> SyntaxKind {
        self.tree.with(self.id, |data| data.green.kind())
    }

    pub fn green(self) -> GreenToken {
        self.tree.with(self.id, |data| match &data.green {
            NodeOrToken::Token(token) => token.clone(),
            NodeOrToken::Node(_) => unreachable!("token handle over a node record"),
        })
    }

    #[inline]
    pub fn offset(self) -> TextSize {
        self.tree.with(self.id, |data| data.offset)
    }

    #[inline]
    pub fn width(self) -> TextSize {
        self.tree.with(self.id, |data| data.green.width())
    }

    #[inline]
    pub fn is_missing(self) -> bool {
        self.tree.with(self.id, |data| data.green.as_token().is_some_and(GreenToken::is_missing))
    }

    /// Range including leading and trailing trivia.
    #[inline]
    pub fn text_range(self) -> TextRange {
        TextRange::at(self.offset(), self.width())
    }

    /// Range of the token text alone.
    pub fn trimmed_range(self) -> TextRange {
        let green = self.green();
        TextRange::at(self.offset() + green.leading_len(), green.text_len())
    }

    pub fn leading_trivia_range(self) -> TextRange {
        TextRange::at(self.offset(), self.green().leading_len())
    }

    pub fn trailing_trivia_range(self) -> TextRange {
        let green = self.green();
        TextRange::at(self.trimmed_range().end(), green.trailing_len())
    }

    #[inline]
    pub fn text<'s>(self, source: &'s str) -> &'s str {
        &source[self.text_range()]
    }

    #[inline]
    pub fn text_trimmed<'s>(self, source: &'s str) -> &'s str {
        &source[self.trimmed_range()]
    }

    /// The enclosing node; `None` only for a detached token facade.
    #[inline]
    pub fn parent(self) -> Option<SyntaxNode<'t>> {
        parent_of(self.tree, self.id)
    }

    /// Iterates ancestors starting from the parent.
    #[inline]
    pub fn parent_ancestors(self) -> impl Iterator<Item = SyntaxNode<'t>> + Clone {
        std::iter::successors(self.parent(), |node| node.parent())
    }

    #[inline]
    pub fn index_in_parent(self) -> Option<usize> {
        index_in_parent(self.tree, self.id)
    }

    #[inline]
    pub fn next_sibling(self) -> Option<SyntaxElement<'t>> {
        sibling(self.tree, self.id, Direction::Next)
    }

    #[inline]
    pub fn prev_sibling(self) -> Option<SyntaxElement<'t>> {
        sibling(self.tree, self.id, Direction::Prev)
    }

    /// The following token in document order.
    pub fn next_token(self) -> Option<Self> {
        let mut element = SyntaxElement::Token(self);
        loop {
            let mut next = element.next_sibling();
            while let Some(candidate) = next {
                if let Some(token) = candidate.first_token() {
                    return Some(token);
                }
                next = candidate.next_sibling();
            }
            element = NodeOrToken::Node(element.parent()?);
        }
    }

    /// The preceding token in document order.
    pub fn prev_token(self) -> Option<Self> {
        let mut element = SyntaxElement::Token(self);
        loop {
            let mut prev = element.prev_sibling();
            while let Some(candidate) = prev {
                if let Some(token) = candidate.last_token() {
                    return Some(token);
                }
                prev = candidate.prev_sibling();
            }
            element = NodeOrToken::Node(element.parent()?);
        }
    }

    #[inline]
    pub fn path(self) -> SyntaxPath {
        path_of(self.tree, self.id)
    }
}

impl<'t> SyntaxElement<'t> {
    #[inline]
    pub fn kind(self) -> SyntaxKind {
        match self {
            NodeOrToken::Node(node) => node.kind(),
            NodeOrToken::Token(token) => token.kind(),
        }
    }

    pub fn green(self) -> GreenElement {
        match self {
            NodeOrToken::Node(node) => NodeOrToken::Node(node.green()),
            NodeOrToken::Token(token) => NodeOrToken::Token(token.green()),
        }
    }

    #[inline]
    pub fn offset(self) -> TextSize {
        match self {
            NodeOrToken::Node(node) => node.offset(),
            NodeOrToken::Token(token) => token.offset(),
        }
    }

    #[inline]
    pub fn text_range(self) -> TextRange {
        match self {
            NodeOrToken::Node(node) => node.text_range(),
            NodeOrToken::Token(token) => token.text_range(),
        }
    }

    #[inline]
    pub fn trimmed_range(self) -> TextRange {
        match self {
            NodeOrToken::Node(node) => node.trimmed_range(),
            NodeOrToken::Token(token) => token.trimmed_range(),
        }
    }

    #[inline]
    pub fn parent(self) -> Option<SyntaxNode<'t>> {
        match self {
            NodeOrToken::Node(node) => node.parent(),
            NodeOrToken::Token(token) => token.parent(),
        }
    }

    #[inline]
    pub fn next_sibling(self) -> Option<Self> {
        match self {
            NodeOrToken::Node(node) => node.next_sibling(),
            NodeOrToken::Token(token) => token.next_sibling(),
        }
    }

    #[inline]
    pub fn prev_sibling(self) -> Option<Self> {
        match self {
            NodeOrToken::Node(node) => node.prev_sibling(),
            NodeOrToken::Token(token) => token.prev_sibling(),
        }
    }

    #[inline]
    pub fn first_token(self) -> Option<SyntaxToken<'t>> {
        match self {
            NodeOrToken::Node(node) => node.first_token(),
            NodeOrToken::Token(token) => Some(token),
        }
    }

    #[inline]
    pub fn last_token(self) -> Option<SyntaxToken<'t>> {
        match self {
            NodeOrToken::Node(node) => node.last_token(),
            NodeOrToken::Token(token) => Some(token),
        }
    }

    pub fn token_at_offset(self, offset: TextSize) -> TokenAtOffset<SyntaxToken<'t>> {
        match self {
            NodeOrToken::Node(node) => node.token_at_offset(offset),
            NodeOrToken::Token(token) => {
                let range = token.text_range();
                if !range.is_empty() && range.contains_inclusive(offset) {
                    TokenAtOffset::Single(token)
                } else {
                    TokenAtOffset::None
                }
            }
        }
    }

    #[inline]
    pub fn path(self) -> SyntaxPath {
        match self {
            NodeOrToken::Node(node) => node.path(),
            NodeOrToken::Token(token) => token.path(),
        }
    }
}

impl<'t> From<SyntaxNode<'t>> for SyntaxElement<'t> {
    #[inline]
    fn from(node: SyntaxNode<'t>) -> Self {
        Self::Node(node)
    }
}

impl<'t> From<SyntaxToken<'t>> for SyntaxElement<'t> {
    #[inline]
    fn from(token: SyntaxToken<'t>) -> Self {
        Self::Token(token)
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Next,
    Prev,
}

fn parent_of(tree: &SyntaxTree, id: FacadeId) -> Option<SyntaxNode<'_>> {
    tree.with(id, |data| data.parent).map(|parent| SyntaxNode::new(tree, parent))
}

fn index_in_parent(tree: &SyntaxTree, id: FacadeId) -> Option<usize> {
    tree.with(id, |data| data.parent.map(|_| data.index as usize))
}

fn sibling(tree: &SyntaxTree, id: FacadeId, direction: Direction) -> Option<SyntaxElement<'_>> {
    let (parent, index) = tree.with(id, |data| (data.parent, data.index as usize));
    let index = match direction {
        Direction::Next => index + 1,
        Direction::Prev => index.checked_sub(1)?,
    };
    tree.child(parent?, index).map(|id| tree.element(id))
}

fn path_of(tree: &SyntaxTree, id: FacadeId) -> SyntaxPath {
    let mut indices = Vec::new();
    let mut current = id;
    while let (Some(parent), index) = tree.with(current, |data| (data.parent, data.index)) {
        indices.push(index);
        current = parent;
    }
    indices.reverse();
    SyntaxPath(indices)
}

fn first_token_where<'t>(
    node: SyntaxNode<'t>,
    predicate: &impl Fn(SyntaxToken<'t>) -> bool,
) -> Option<SyntaxToken<'t>> {
    node.children().find_map(|child| match child {
        NodeOrToken::Token(token) => predicate(token).then_some(token),
        NodeOrToken::Node(node) => first_token_where(node, predicate),
    })
}

fn last_token_where<'t>(
    node: SyntaxNode<'t>,
    predicate: &impl Fn(SyntaxToken<'t>) -> bool,
) -> Option<SyntaxToken<'t>> {
    node.children().rev().find_map(|child| match child {
        NodeOrToken::Token(token) => predicate(token).then_some(token),
        NodeOrToken::Node(node) => last_token_where(node, predicate),
    })
}

/// Two facades are equivalent when they wrap the same green element at the
/// same offset under equivalent parents. Holds across sessions.
fn equivalent(lhs: (&SyntaxTree, FacadeId), rhs: (&SyntaxTree, FacadeId)) -> bool {
    let (mut lhs, mut rhs) = (Some(lhs), Some(rhs));
    loop {
        match (lhs, rhs) {
            (None, None) => return true,
            (Some((lhs_tree, lhs_id)), Some((rhs_tree, rhs_id))) => {
                if std::ptr::eq(lhs_tree, rhs_tree) && lhs_id == rhs_id {
                    return true;
                }
                let (lhs_green, lhs_offset, lhs_parent) =
                    lhs_tree.with(lhs_id, |data| (data.green.clone(), data.offset, data.parent));
                let (rhs_green, rhs_offset, rhs_parent) =
                    rhs_tree.with(rhs_id, |data| (data.green.clone(), data.offset, data.parent));
                if lhs_offset != rhs_offset || !lhs_green.ptr_eq(&rhs_green) {
                    return false;
                }
                lhs = lhs_parent.map(|parent| (lhs_tree, parent));
                rhs = rhs_parent.map(|parent| (rhs_tree, parent));
            }
            _ => return false,
        }
    }
}

impl PartialEq for SyntaxNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        equivalent((self.tree, self.id), (other.tree, other.id))
    }
}

impl Eq for SyntaxNode<'_> {}

impl Hash for SyntaxNode<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        self.offset().hash(state);
    }
}

impl PartialEq for SyntaxToken<'_> {
    fn eq(&self, other: &Self) -> bool {
        equivalent((self.tree, self.id), (other.tree, other.id))
    }
}

impl Eq for SyntaxToken<'_> {}

impl Hash for SyntaxToken<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        self.offset().hash(state);
    }
}

impl fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.text_range())
    }
}

impl fmt::Debug for SyntaxToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.text_range())?;
        if self.is_missing() {
            f.write_str(" missing")?;
        }
        Ok(())
    }
}

/// Iterator over the children of a [`SyntaxNode`]. Cheap to clone and to
/// restart; every child is materialized once per session.
#[derive(Clone)]
pub struct SyntaxChildren<'t> {
    tree: &'t SyntaxTree,
    parent: FacadeId,
    front: usize,
    back: usize,
}

impl<'t> Iterator for SyntaxChildren<'t> {
    type Item = SyntaxElement<'t>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let id = self.tree.child(self.parent, self.front)?;
        self.front += 1;
        Some(self.tree.element(id))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }
}

impl DoubleEndedIterator for SyntaxChildren<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let id = self.tree.child(self.parent, self.back - 1)?;
        self.back -= 1;
        Some(self.tree.element(id))
    }
}

impl ExactSizeIterator for SyntaxChildren<'_> {}

/// Child indices from a root to an element; the descriptor editor tooling
/// uses to name a modification target.
///
/// Displays as dot-separated indices (`1.0.2`); the root path is empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SyntaxPath(Vec<u32>);

impl SyntaxPath {
    #[inline]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    #[inline]
    pub fn new(indices: impl Into<Vec<u32>>) -> Self {
        Self(indices.into())
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.0
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn child(&self, index: u32) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// `true` if `self` names `other` or one of its ancestors.
    #[inline]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.0.starts_with(&self.0)
    }
}

impl fmt::Display for SyntaxPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{index}")?;
        }
        Ok(())
    }
}

impl FromStr for SyntaxPath {
    type Err = ParsePathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        s.split('.')
            .map(|segment| {
                segment.parse::<u32>().map_err(|_| ParsePathError { segment: segment.to_owned() })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

/// Node-or-token wrapper used throughout the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeOrToken<N, T> {
    Node(N),
    Token(T),
}

impl<N, T> NodeOrToken<N, T> {
    /// Converts into the node variant, if any.
    pub fn into_node(self) -> Option<N> {
        match self {
            NodeOrToken::Node(node) => Some(node),
            NodeOrToken::Token(_) => None,
        }
    }

    /// Converts into the token variant, if any.
    pub fn into_token(self) -> Option<T> {
        match self {
            NodeOrToken::Node(_) => None,
            NodeOrToken::Token(token) => Some(token),
        }
    }

    /// Returns a shared reference to the node, if any.
    pub fn as_node(&self) -> Option<&N> {
        match self {
            NodeOrToken::Node(node) => Some(node),
            NodeOrToken::Token(_) => None,
        }
    }

    /// Returns a shared reference to the token, if any.
    pub fn as_token(&self) -> Option<&T> {
        match self {
            NodeOrToken::Node(_) => None,
            NodeOrToken::Token(token) => Some(token),
        }
    }
}

/// There might be zero, one or two tokens at a given offset.
#[derive(Clone, Debug)]
pub enum TokenAtOffset<T> {
    /// No tokens at offset.
    None,
    /// Only a single token at offset.
    Single(T),
    /// Offset is exactly between two tokens.
    Between(T, T),
}

impl<T> TokenAtOffset<T> {
    /// Maps tokens to a different type.
    pub fn map<F: Fn(T) -> U, U>(self, f: F) -> TokenAtOffset<U> {
        match self {
            TokenAtOffset::None => TokenAtOffset::None,
            TokenAtOffset::Single(it) => TokenAtOffset::Single(f(it)),
            TokenAtOffset::Between(l, r) => TokenAtOffset::Between(f(l), f(r)),
        }
    }

    /// Convert to option, preferring the right token in case of a tie.
    pub fn right_biased(self) -> Option<T> {
        match self {
            Self::None => None,
            Self::Single(node) => Some(node),
            Self::Between(_, right) => Some(right),
        }
    }

    /// Convert to option, preferring the left token in case of a tie.
    pub fn left_biased(self) -> Option<T> {
        match self {
            Self::None => None,
            Self::Single(node) => Some(node),
            Self::Between(left, _) => Some(left),
        }
    }
}

impl<T> Iterator for TokenAtOffset<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        match std::mem::replace(self, Self::None) {
            Self::None => None,
            Self::Single(node) => Some(node),
            Self::Between(left, right) => {
                *self = Self::Single(right);
                Some(left)
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::None => (0, Some(0)),
            Self::Single(_) => (1, Some(1)),
            Self::Between(_, _) => (2, Some(2)),
        }
    }
}

impl<T> ExactSizeIterator for TokenAtOffset<T> {}
