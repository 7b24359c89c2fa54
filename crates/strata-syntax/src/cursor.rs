use crate::{NodeOrToken, SyntaxElement, SyntaxNode, SyntaxToken};

/// Preorder walk over nodes and tokens of a subtree, `start` included.
pub struct PreorderWithTokens<'t> {
    start: SyntaxNode<'t>,
    next: Option<WalkEvent<SyntaxElement<'t>>>,
    skip_subtree: bool,
}

impl<'t> PreorderWithTokens<'t> {
    pub fn new(start: SyntaxNode<'t>) -> Self {
        let next = Some(WalkEvent::Enter(NodeOrToken::Node(start)));
        Self { start, next, skip_subtree: false }
    }

    /// Skips the children of the node entered last.
    pub fn skip_subtree(&mut self) {
        self.skip_subtree = true;
    }
}

impl<'t> Iterator for PreorderWithTokens<'t> {
    type Item = WalkEvent<SyntaxElement<'t>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.skip_subtree {
            self.next = self.next.take().and_then(|next| match next {
                WalkEvent::Enter(first_child) => {
                    first_child.parent().map(|parent| WalkEvent::Leave(parent.into()))
                }
                WalkEvent::Leave(element) => Some(WalkEvent::Leave(element)),
            });
            self.skip_subtree = false;
        }

        let next = self.next.take();

        self.next = next.as_ref().and_then(|event| {
            Some(match *event {
                WalkEvent::Enter(element) => match element {
                    NodeOrToken::Node(node) => match node.first_child() {
                        Some(child) => WalkEvent::Enter(child),
                        None => WalkEvent::Leave(element),
                    },
                    NodeOrToken::Token(_) => WalkEvent::Leave(element),
                },
                WalkEvent::Leave(element) => {
                    if element == NodeOrToken::Node(self.start) {
                        return None;
                    }

                    match element.next_sibling() {
                        Some(sibling) => WalkEvent::Enter(sibling),
                        None => WalkEvent::Leave(element.parent()?.into()),
                    }
                }
            })
        });

        next
    }
}

/// Preorder walk over the nodes of a subtree, `start` included.
pub struct Preorder<'t> {
    inner: PreorderWithTokens<'t>,
}

impl<'t> Preorder<'t> {
    pub fn new(start: SyntaxNode<'t>) -> Self {
        Self { inner: PreorderWithTokens::new(start) }
    }

    pub fn skip_subtree(&mut self) {
        self.inner.skip_subtree();
    }
}

impl<'t> Iterator for Preorder<'t> {
    type Item = WalkEvent<SyntaxNode<'t>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.find_map(|event| match event {
            WalkEvent::Enter(element) => element.into_node().map(WalkEvent::Enter),
            WalkEvent::Leave(element) => element.into_node().map(WalkEvent::Leave),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkEvent<T> {
    Enter(T),
    Leave(T),
}

impl<T> WalkEvent<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> WalkEvent<U> {
        match self {
            WalkEvent::Enter(it) => WalkEvent::Enter(f(it)),
            WalkEvent::Leave(it) => WalkEvent::Leave(f(it)),
        }
    }
}

impl<'t> SyntaxNode<'t> {
    #[inline]
    pub fn preorder(self) -> Preorder<'t> {
        Preorder::new(self)
    }

    #[inline]
    pub fn preorder_with_tokens(self) -> PreorderWithTokens<'t> {
        PreorderWithTokens::new(self)
    }

    /// Nodes of the subtree in document order, this node first.
    pub fn descendants(self) -> impl Iterator<Item = SyntaxNode<'t>> {
        self.preorder().filter_map(|event| match event {
            WalkEvent::Enter(node) => Some(node),
            WalkEvent::Leave(_) => None,
        })
    }

    /// Nodes and tokens of the subtree in document order, this node first.
    pub fn descendants_with_tokens(self) -> impl Iterator<Item = SyntaxElement<'t>> {
        self.preorder_with_tokens().filter_map(|event| match event {
            WalkEvent::Enter(element) => Some(element),
            WalkEvent::Leave(_) => None,
        })
    }

    /// Tokens of the subtree in document order, missing tokens included.
    pub fn descendant_tokens(self) -> impl Iterator<Item = SyntaxToken<'t>> {
        self.descendants_with_tokens().filter_map(NodeOrToken::into_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyntaxKind::*;
    use crate::{GreenElement, GreenNode, GreenToken, SyntaxKind, SyntaxTree};

    fn token(kind: SyntaxKind, text: u32) -> GreenElement {
        GreenToken::new(kind, 0.into(), text.into(), 0.into()).into()
    }

    fn name() -> GreenElement {
        GreenNode::new(SIMPLE_NAME_REFERENCE, [token(IDENTIFIER_TOKEN, 1)]).into()
    }

    fn binary() -> GreenNode {
        GreenNode::new(BINARY_EXPRESSION, [name(), token(PLUS_TOKEN, 1), name()])
    }

    #[test]
    fn preorder_enters_and_leaves_in_order() {
        let tree = SyntaxTree::new(binary());
        let events = tree
            .root()
            .preorder()
            .map(|event| event.map(SyntaxNode::kind))
            .collect::<Vec<_>>();
        assert_eq!(events, [
            WalkEvent::Enter(BINARY_EXPRESSION),
            WalkEvent::Enter(SIMPLE_NAME_REFERENCE),
            WalkEvent::Leave(SIMPLE_NAME_REFERENCE),
            WalkEvent::Enter(SIMPLE_NAME_REFERENCE),
            WalkEvent::Leave(SIMPLE_NAME_REFERENCE),
            WalkEvent::Leave(BINARY_EXPRESSION),
        ]);
    }

    #[test]
    fn descendants_with_tokens_is_document_order() {
        let tree = SyntaxTree::new(binary());
        let kinds = tree.root().descendants_with_tokens().map(SyntaxElement::kind).collect::<Vec<_>>();
        assert_eq!(kinds, [
            BINARY_EXPRESSION,
            SIMPLE_NAME_REFERENCE,
            IDENTIFIER_TOKEN,
            PLUS_TOKEN,
            SIMPLE_NAME_REFERENCE,
            IDENTIFIER_TOKEN,
        ]);
    }

    #[test]
    fn skip_subtree_jumps_to_sibling() {
        let tree = SyntaxTree::new(binary());
        let mut walk = tree.root().preorder_with_tokens();
        let mut entered = Vec::new();
        while let Some(event) = walk.next() {
            if let WalkEvent::Enter(element) = event {
                entered.push(element.kind());
                if element.kind() == SIMPLE_NAME_REFERENCE {
                    walk.skip_subtree();
                }
            }
        }
        assert_eq!(entered, [
            BINARY_EXPRESSION,
            SIMPLE_NAME_REFERENCE,
            PLUS_TOKEN,
            SIMPLE_NAME_REFERENCE
        ]);
    }

    #[test]
    fn walk_stays_inside_start() {
        let tree = SyntaxTree::new(binary());
        let lhs = tree.root().child_nodes().next().unwrap();
        let tokens = lhs.descendant_tokens().map(SyntaxToken::kind).collect::<Vec<_>>();
        assert_eq!(tokens, [IDENTIFIER_TOKEN]);
    }
}
