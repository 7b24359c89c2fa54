//! Immutable, position-independent tree data.
//!
//! A green element knows its kind, its width and its children, and nothing
//! about where it sits in a file or who its parent is. The same green subtree
//! can therefore be shared, unchanged, by any number of trees.

use std::fmt::{self, Write as _};

use strata_errors::Diagnostic;
use text_size::TextSize;
use triomphe::Arc;

use crate::{NodeOrToken, SyntaxKind, TreeError};

pub type GreenElement = NodeOrToken<GreenNode, GreenToken>;

/// Summary bits cached on every node so that traversals can skip subtrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
struct Flags {
    raw: u8,
}

impl Flags {
    const CONTAINS_MISSING: u8 = 0b01;
    const CONTAINS_DIAGNOSTICS: u8 = 0b10;

    #[inline]
    fn with(self, bit: u8, on: bool) -> Self {
        if on { Self { raw: self.raw | bit } } else { self }
    }

    #[inline]
    fn union(self, other: Self) -> Self {
        Self { raw: self.raw | other.raw }
    }

    #[inline]
    fn contains(self, bit: u8) -> bool {
        self.raw & bit != 0
    }
}

#[derive(PartialEq, Eq, Hash)]
struct GreenTokenData {
    kind: SyntaxKind,
    leading: TextSize,
    text: TextSize,
    trailing: TextSize,
    missing: bool,
    diagnostics: Box<[Diagnostic]>,
}

/// Leaf of the green tree.
///
/// Only lengths are stored: the characters themselves live in the source
/// buffer owned by the caller.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct GreenToken(Arc<GreenTokenData>);

impl GreenToken {
    /// The three lengths must sum to at most `TextSize` max.
    pub fn new(kind: SyntaxKind, leading: TextSize, text: TextSize, trailing: TextSize) -> Self {
        Self(Arc::new(GreenTokenData {
            kind,
            leading,
            text,
            trailing,
            missing: false,
            diagnostics: Box::default(),
        }))
    }

    /// A zero-width placeholder for a required token that the input lacks.
    pub fn missing(kind: SyntaxKind) -> Self {
        Self(Arc::new(GreenTokenData {
            kind,
            leading: TextSize::new(0),
            text: TextSize::new(0),
            trailing: TextSize::new(0),
            missing: true,
            diagnostics: Box::default(),
        }))
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.0.kind
    }

    #[inline]
    pub fn leading_len(&self) -> TextSize {
        self.0.leading
    }

    #[inline]
    pub fn text_len(&self) -> TextSize {
        self.0.text
    }

    #[inline]
    pub fn trailing_len(&self) -> TextSize {
        self.0.trailing
    }

    /// Leading trivia, text and trailing trivia together.
    #[inline]
    pub fn width(&self) -> TextSize {
        self.0.leading + self.0.text + self.0.trailing
    }

    #[inline]
    pub fn is_missing(&self) -> bool {
        self.0.missing
    }

    /// Diagnostics attached to this token, in attachment order.
    #[inline]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.0.diagnostics
    }

    /// Identity comparison; `==` compares structure.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn with_diagnostics(&self, diagnostics: Box<[Diagnostic]>) -> Self {
        Self(Arc::new(GreenTokenData {
            kind: self.0.kind,
            leading: self.0.leading,
            text: self.0.text,
            trailing: self.0.trailing,
            missing: self.0.missing,
            diagnostics,
        }))
    }

    fn flags(&self) -> Flags {
        Flags::default()
            .with(Flags::CONTAINS_MISSING, self.0.missing)
            .with(Flags::CONTAINS_DIAGNOSTICS, !self.0.diagnostics.is_empty())
    }
}

impl fmt::Debug for GreenToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GreenToken")
            .field("kind", &self.kind())
            .field("leading", &self.leading_len())
            .field("text", &self.text_len())
            .field("trailing", &self.trailing_len())
            .field("missing", &self.is_missing())
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct GreenChild {
    /// Offset relative to the start of the parent.
    offset: TextSize,
    element: GreenElement,
}

#[derive(PartialEq, Eq, Hash)]
struct GreenNodeData {
    kind: SyntaxKind,
    width: TextSize,
    flags: Flags,
    children: Box<[GreenChild]>,
    diagnostics: Box<[Diagnostic]>,
}

/// Interior node of the green tree.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct GreenNode(Arc<GreenNodeData>);

impl GreenNode {
    /// Builds a node from already built children.
    ///
    /// Panics if the accumulated width does not fit in a `TextSize`; use
    /// [`GreenNode::try_new`] to get the error instead.
    #[track_caller]
    pub fn new(kind: SyntaxKind, children: impl IntoIterator<Item = GreenElement>) -> Self {
        match Self::try_new(kind, children) {
            Ok(node) => node,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_new(
        kind: SyntaxKind,
        children: impl IntoIterator<Item = GreenElement>,
    ) -> Result<Self, TreeError> {
        Self::assemble(kind, children, Box::default())
    }

    fn assemble(
        kind: SyntaxKind,
        children: impl IntoIterator<Item = GreenElement>,
        diagnostics: Box<[Diagnostic]>,
    ) -> Result<Self, TreeError> {
        let children = children.into_iter();
        let mut slots = Vec::with_capacity(children.size_hint().0);
        let mut width = TextSize::new(0);
        let mut flags = Flags::default().with(Flags::CONTAINS_DIAGNOSTICS, !diagnostics.is_empty());

        for element in children {
            let offset = width;
            width = width
                .checked_add(element.width())
                .ok_or_else(|| TreeError::shape(kind, "width overflows the text size"))?;
            flags = flags.union(element.flags());
            slots.push(GreenChild { offset, element });
        }

        Ok(Self(Arc::new(GreenNodeData {
            kind,
            width,
            flags,
            children: slots.into_boxed_slice(),
            diagnostics,
        })))
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.0.kind
    }

    /// Sum of the widths of all children.
    #[inline]
    pub fn width(&self) -> TextSize {
        self.0.width
    }

    /// Number of direct children.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.children.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.children.is_empty()
    }

    #[inline]
    pub fn children(&self) -> GreenChildren<'_> {
        GreenChildren { inner: self.0.children.iter() }
    }

    #[inline]
    pub fn child(&self, index: usize) -> Option<&GreenElement> {
        self.0.children.get(index).map(|child| &child.element)
    }

    pub fn child_at(&self, index: usize) -> Result<&GreenElement, TreeError> {
        self.child(index).ok_or(TreeError::ChildOutOfRange {
            kind: self.kind(),
            index,
            len: self.len(),
        })
    }

    /// Offset of child `index` relative to the start of this node.
    #[inline]
    pub fn child_offset(&self, index: usize) -> Option<TextSize> {
        self.0.children.get(index).map(|child| child.offset)
    }

    #[inline]
    pub(crate) fn slot(&self, index: usize) -> Option<(TextSize, &GreenElement)> {
        self.0.children.get(index).map(|child| (child.offset, &child.element))
    }

    /// Diagnostics attached to this node itself, not to its descendants.
    #[inline]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.0.diagnostics
    }

    /// `true` if a missing token occurs anywhere in this subtree.
    #[inline]
    pub fn contains_missing(&self) -> bool {
        self.0.flags.contains(Flags::CONTAINS_MISSING)
    }

    /// `true` if this node or any descendant carries a diagnostic.
    #[inline]
    pub fn contains_diagnostics(&self) -> bool {
        self.0.flags.contains(Flags::CONTAINS_DIAGNOSTICS)
    }

    /// Identity comparison; `==` compares structure.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Returns a copy of this node with child `index` swapped for `element`.
    /// Every other child is shared with `self`.
    pub fn replace_child(&self, index: usize, element: GreenElement) -> Result<Self, TreeError> {
        self.child_at(index)?;
        let children = self.children().enumerate().map(|(i, child)| {
            if i == index { element.clone() } else { child.clone() }
        });
        self.with_children(children)
    }

    /// Same kind and own diagnostics, new children.
    pub(crate) fn with_children(
        &self,
        children: impl IntoIterator<Item = GreenElement>,
    ) -> Result<Self, TreeError> {
        Self::assemble(self.kind(), children, self.0.diagnostics.clone())
    }

    pub(crate) fn with_diagnostics(&self, diagnostics: Box<[Diagnostic]>) -> Self {
        let flags = Flags::default()
            .with(Flags::CONTAINS_MISSING, self.contains_missing())
            .with(
                Flags::CONTAINS_DIAGNOSTICS,
                !diagnostics.is_empty()
                    || self.children().any(|child| child.flags().contains(Flags::CONTAINS_DIAGNOSTICS)),
            );
        Self(Arc::new(GreenNodeData {
            kind: self.0.kind,
            width: self.0.width,
            flags,
            children: self.0.children.clone(),
            diagnostics,
        }))
    }

    /// All tokens of this subtree in document order.
    pub fn tokens(&self) -> GreenTokens<'_> {
        GreenTokens { stack: vec![self.0.children.iter()] }
    }

    /// Indented outline of the subtree with offsets computed from zero.
    pub fn debug_dump(&self) -> String {
        let mut out = String::new();
        dump(&mut out, &NodeOrToken::Node(self.clone()), TextSize::new(0), 0);
        out
    }
}

fn dump(out: &mut String, element: &GreenElement, offset: TextSize, depth: usize) {
    let indent = depth * 2;
    let end = offset + element.width();
    match element {
        NodeOrToken::Node(node) => {
            let _ = writeln!(out, "{:indent$}{:?}@{:?}..{:?}", "", node.kind(), offset, end);
        }
        NodeOrToken::Token(token) if token.is_missing() => {
            let _ = writeln!(out, "{:indent$}{:?}@{:?}..{:?} missing", "", token.kind(), offset, end);
        }
        NodeOrToken::Token(token) => {
            let _ = writeln!(
                out,
                "{:indent$}{:?}@{:?}..{:?} [{:?}+{:?}+{:?}]",
                "",
                token.kind(),
                offset,
                end,
                token.leading_len(),
                token.text_len(),
                token.trailing_len(),
            );
        }
    }
    for diagnostic in element.diagnostics() {
        let _ = writeln!(out, "{:indent$}! {diagnostic}", "", indent = indent + 2);
    }
    if let NodeOrToken::Node(node) = element {
        for (child_offset, child) in node.0.children.iter().map(|c| (c.offset, &c.element)) {
            dump(out, child, offset + child_offset, depth + 1);
        }
    }
}

impl fmt::Debug for GreenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GreenNode")
            .field("kind", &self.kind())
            .field("width", &self.width())
            .field("children", &self.len())
            .field("diagnostics", &self.diagnostics().len())
            .finish()
    }
}

impl fmt::Display for GreenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.debug_dump())
    }
}

/// Iterator over the direct children of a [`GreenNode`].
#[derive(Clone)]
pub struct GreenChildren<'a> {
    inner: std::slice::Iter<'a, GreenChild>,
}

impl<'a> Iterator for GreenChildren<'a> {
    type Item = &'a GreenElement;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|child| &child.element)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for GreenChildren<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|child| &child.element)
    }
}

impl ExactSizeIterator for GreenChildren<'_> {}

/// Preorder iterator over the tokens of a green subtree.
#[derive(Clone)]
pub struct GreenTokens<'a> {
    stack: Vec<std::slice::Iter<'a, GreenChild>>,
}

impl<'a> Iterator for GreenTokens<'a> {
    type Item = &'a GreenToken;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next().map(|child| &child.element) {
                None => {
                    self.stack.pop();
                }
                Some(NodeOrToken::Token(token)) => return Some(token),
                Some(NodeOrToken::Node(node)) => self.stack.push(node.0.children.iter()),
            }
        }
    }
}

impl GreenElement {
    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        match self {
            NodeOrToken::Node(node) => node.kind(),
            NodeOrToken::Token(token) => token.kind(),
        }
    }

    #[inline]
    pub fn width(&self) -> TextSize {
        match self {
            NodeOrToken::Node(node) => node.width(),
            NodeOrToken::Token(token) => token.width(),
        }
    }

    #[inline]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            NodeOrToken::Node(node) => node.diagnostics(),
            NodeOrToken::Token(token) => token.diagnostics(),
        }
    }

    #[inline]
    pub fn contains_missing(&self) -> bool {
        self.flags().contains(Flags::CONTAINS_MISSING)
    }

    #[inline]
    pub fn contains_diagnostics(&self) -> bool {
        self.flags().contains(Flags::CONTAINS_DIAGNOSTICS)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NodeOrToken::Node(lhs), NodeOrToken::Node(rhs)) => lhs.ptr_eq(rhs),
            (NodeOrToken::Token(lhs), NodeOrToken::Token(rhs)) => lhs.ptr_eq(rhs),
            _ => false,
        }
    }

    #[inline]
    fn flags(&self) -> Flags {
        match self {
            NodeOrToken::Node(node) => node.0.flags,
            NodeOrToken::Token(token) => token.flags(),
        }
    }
}

impl From<GreenNode> for GreenElement {
    #[inline]
    fn from(node: GreenNode) -> Self {
        Self::Node(node)
    }
}

impl From<GreenToken> for GreenElement {
    #[inline]
    fn from(token: GreenToken) -> Self {
        Self::Token(token)
    }
}

#[cfg(test)]
mod tests {
    use expect_test::expect;

    use super::*;
    use crate::SyntaxKind::*;

    fn token(kind: SyntaxKind, leading: u32, text: u32, trailing: u32) -> GreenElement {
        GreenToken::new(kind, leading.into(), text.into(), trailing.into()).into()
    }

    #[test]
    fn width_sums_children() {
        let name = GreenNode::new(SIMPLE_NAME_REFERENCE, [token(IDENTIFIER_TOKEN, 0, 2, 0)]);
        let receive =
            GreenNode::new(RECEIVE_ACTION, [token(LEFT_ARROW_TOKEN, 0, 2, 1), name.into()]);

        assert_eq!(receive.width(), TextSize::new(5));
        assert_eq!(receive.child_offset(0), Some(TextSize::new(0)));
        assert_eq!(receive.child_offset(1), Some(TextSize::new(3)));
        assert_eq!(receive.len(), 2);
    }

    #[test]
    fn child_at_reports_out_of_range() {
        let list = GreenNode::new(LIST, []);
        assert!(list.is_empty());
        assert_eq!(
            list.child_at(0).unwrap_err(),
            TreeError::ChildOutOfRange { kind: LIST, index: 0, len: 0 }
        );
    }

    #[test]
    fn missing_tokens_have_zero_width_and_mark_ancestors() {
        let missing = GreenToken::missing(IDENTIFIER_TOKEN);
        assert_eq!(missing.width(), TextSize::new(0));
        assert!(missing.is_missing());

        let name = GreenNode::new(SIMPLE_NAME_REFERENCE, [missing.into()]);
        let receive = GreenNode::new(RECEIVE_ACTION, [token(LEFT_ARROW_TOKEN, 0, 2, 0), name.into()]);
        assert!(receive.contains_missing());
        assert!(!receive.contains_diagnostics());
        assert_eq!(receive.width(), TextSize::new(2));
    }

    #[test]
    fn equality_is_structural_and_ptr_eq_is_identity() {
        let a = GreenToken::new(COMMA_TOKEN, TextSize::new(0), TextSize::new(1), TextSize::new(1));
        let b = GreenToken::new(COMMA_TOKEN, TextSize::new(0), TextSize::new(1), TextSize::new(1));
        assert_eq!(a, b);
        assert!(!a.ptr_eq(&b));
        assert!(a.ptr_eq(&a.clone()));
    }

    #[test]
    fn replace_child_shares_siblings() {
        let arrow = token(LEFT_ARROW_TOKEN, 0, 2, 1);
        let old = GreenNode::new(SIMPLE_NAME_REFERENCE, [token(IDENTIFIER_TOKEN, 0, 2, 0)]);
        let receive = GreenNode::new(RECEIVE_ACTION, [arrow.clone(), old.into()]);

        let new = GreenNode::new(SIMPLE_NAME_REFERENCE, [token(IDENTIFIER_TOKEN, 0, 4, 0)]);
        let replaced = receive.replace_child(1, new.clone().into()).unwrap();

        assert_eq!(replaced.width(), TextSize::new(7));
        assert!(replaced.child(0).unwrap().ptr_eq(&arrow));
        assert!(replaced.child(1).unwrap().ptr_eq(&new.into()));
        assert_eq!(receive.width(), TextSize::new(5));
    }

    #[test]
    fn tokens_in_document_order() {
        let braced = GreenNode::new(
            BRACED_EXPRESSION,
            [
                token(OPEN_PAREN_TOKEN, 0, 1, 0),
                GreenNode::new(NUMERIC_LITERAL, [token(DECIMAL_INTEGER_LITERAL_TOKEN, 0, 2, 0)])
                    .into(),
                token(CLOSE_PAREN_TOKEN, 0, 1, 1),
            ],
        );
        let kinds = braced.tokens().map(GreenToken::kind).collect::<Vec<_>>();
        assert_eq!(kinds, [OPEN_PAREN_TOKEN, DECIMAL_INTEGER_LITERAL_TOKEN, CLOSE_PAREN_TOKEN]);

        let total: TextSize = braced.tokens().map(GreenToken::width).sum();
        assert_eq!(total, braced.width());
    }

    #[test]
    fn dump_shows_offsets_and_missing_tokens() {
        let receive = GreenNode::new(
            RECEIVE_ACTION,
            [
                token(LEFT_ARROW_TOKEN, 1, 2, 1),
                GreenNode::new(SIMPLE_NAME_REFERENCE, [GreenToken::missing(IDENTIFIER_TOKEN).into()])
                    .into(),
            ],
        );

        expect![[r#"
            RECEIVE_ACTION@0..4
              LEFT_ARROW_TOKEN@0..4 [1+2+1]
              SIMPLE_NAME_REFERENCE@4..4
                IDENTIFIER_TOKEN@4..4 missing
        "#]]
        .assert_eq(&receive.debug_dump());
    }
}
