//! Property-based tests over randomly shaped green trees.

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use strata_syntax::SyntaxKind::*;
use strata_syntax::{
    GreenElement, GreenNode, GreenToken, NodeOrToken, SyntaxPath, SyntaxTree, TextSize,
};

fn leaf() -> impl Strategy<Value = GreenElement> {
    prop_oneof![
        4 => (0u32..3, 0u32..6, 0u32..3).prop_map(|(leading, text, trailing)| {
            GreenToken::new(IDENTIFIER_TOKEN, leading.into(), text.into(), trailing.into()).into()
        }),
        1 => Just(GreenElement::from(GreenToken::missing(COMMA_TOKEN))),
    ]
}

fn green_tree() -> impl Strategy<Value = GreenNode> {
    leaf()
        .prop_recursive(4, 64, 6, |inner| {
            prop::collection::vec(inner, 0..6)
                .prop_map(|children| GreenNode::new(LIST, children).into())
        })
        .prop_map(|element| match element {
            NodeOrToken::Node(node) => node,
            NodeOrToken::Token(token) => GreenNode::new(ERROR, [token.into()]),
        })
}

fn check_widths(node: &GreenNode) -> Result<(), TestCaseError> {
    let mut sum = TextSize::new(0);
    for (index, child) in node.children().enumerate() {
        prop_assert_eq!(node.child_offset(index), Some(sum));
        sum += child.width();
        if let NodeOrToken::Node(child) = child {
            check_widths(child)?;
        }
    }
    prop_assert_eq!(node.width(), sum);
    Ok(())
}

fn element_paths(tree: &SyntaxTree) -> Vec<SyntaxPath> {
    tree.root().descendants_with_tokens().map(|element| element.path()).collect()
}

proptest! {
    #[test]
    fn width_is_sum_of_children(root in green_tree()) {
        check_widths(&root)?;
    }

    #[test]
    fn tokens_cover_the_root_without_gaps(root in green_tree()) {
        let total: TextSize = root.tokens().map(GreenToken::width).sum();
        prop_assert_eq!(total, root.width());

        let tree = SyntaxTree::new(root);
        let mut end = TextSize::new(0);
        for token in tree.root().descendant_tokens() {
            prop_assert_eq!(token.text_range().start(), end);
            end = token.text_range().end();
        }
        prop_assert_eq!(end, tree.root().width());
    }

    #[test]
    fn untouched_subtrees_are_shared(root in green_tree(), pick in any::<prop::sample::Index>()) {
        let tree = SyntaxTree::new(root);
        let paths = element_paths(&tree);
        let candidates = paths.iter().filter(|path| !path.is_root()).collect::<Vec<_>>();
        prop_assume!(!candidates.is_empty());
        let target = candidates[pick.index(candidates.len())].clone();

        let replacement = GreenToken::new(IDENTIFIER_TOKEN, TextSize::new(1), TextSize::new(7), TextSize::new(1));
        let target_element = tree.resolve(&target).unwrap();
        let edited = tree.replace(target_element, replacement.clone()).unwrap();

        prop_assert!(edited.resolve(&target).unwrap().green().ptr_eq(&replacement.into()));
        for path in &paths {
            let old = tree.resolve(path).unwrap().green();
            if path.is_prefix_of(&target) {
                let new = edited.resolve(path).unwrap().green();
                prop_assert!(!new.ptr_eq(&old), "ancestor `{}` was not rebuilt", path);
            } else if !target.is_prefix_of(path) {
                let new = edited.resolve(path).unwrap().green();
                prop_assert!(new.ptr_eq(&old), "`{}` was rebuilt", path);
            }
        }
        check_widths(edited.green())?;
    }

    #[test]
    fn facades_via_equal_paths_are_equivalent(root in green_tree()) {
        let first = SyntaxTree::new(root.clone());
        let second = SyntaxTree::new(root);
        for path in element_paths(&first) {
            let lhs = first.resolve(&path).unwrap();
            let rhs = second.resolve(&path).unwrap();
            prop_assert_eq!(lhs, rhs);
            prop_assert_eq!(lhs.offset(), rhs.offset());
            prop_assert_eq!(lhs.parent(), rhs.parent());
        }
    }
}
