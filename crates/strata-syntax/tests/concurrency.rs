use std::thread;

use strata_syntax::SyntaxKind::*;
use strata_syntax::{Builder, GreenNode, SyntaxElement, SyntaxPath, SyntaxTree, TextSize};

const THREADS: usize = 8;

/// A `LIST` of `width` statements, each `name = name;`.
fn wide_tree(width: usize) -> GreenNode {
    let mut builder = Builder::new();
    let len = TextSize::new;
    builder.start_node(LIST);
    for _ in 0..width {
        builder.start_node(ASSIGNMENT_STATEMENT);
        builder.start_node(SIMPLE_NAME_REFERENCE);
        builder.push_token(IDENTIFIER_TOKEN, len(1), len(3), len(1));
        builder.finish_node().unwrap();
        builder.push_token(EQUAL_TOKEN, len(0), len(1), len(1));
        builder.start_node(SIMPLE_NAME_REFERENCE);
        builder.push_token(IDENTIFIER_TOKEN, len(0), len(3), len(0));
        builder.finish_node().unwrap();
        builder.push_token(SEMICOLON_TOKEN, len(0), len(1), len(1));
        builder.finish_node().unwrap();
    }
    builder.finish_node().unwrap();
    builder.finish().unwrap()
}

fn element_count(node: &GreenNode) -> usize {
    1 + node
        .children()
        .map(|child| child.as_node().map_or(1, element_count))
        .sum::<usize>()
}

#[test]
fn concurrent_navigation_memoizes_each_child_once() {
    let green = wide_tree(64);
    let tree = SyntaxTree::new(green.clone());

    let walks = thread::scope(|scope| {
        let handles = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    tree.root()
                        .descendants_with_tokens()
                        .map(|element| (element.path(), element.offset()))
                        .collect::<Vec<_>>()
                })
            })
            .collect::<Vec<_>>();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect::<Vec<_>>()
    });

    for walk in &walks[1..] {
        assert_eq!(walk, &walks[0]);
    }
    assert_eq!(tree.facade_count(), element_count(&green));
}

#[test]
fn handles_from_different_threads_are_equivalent() {
    let tree = SyntaxTree::new(wide_tree(16));
    let path = SyntaxPath::new([7, 2, 0]);

    let seen = thread::scope(|scope| {
        let handles = (0..THREADS)
            .map(|_| scope.spawn(|| tree.resolve(&path).unwrap()))
            .collect::<Vec<_>>();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect::<Vec<SyntaxElement<'_>>>()
    });

    assert!(seen.iter().all(|element| *element == seen[0]));
    assert_eq!(seen[0].kind(), IDENTIFIER_TOKEN);
}

#[test]
fn green_trees_are_shared_across_threads() {
    let green = wide_tree(32);
    let widths = thread::scope(|scope| {
        let handles = (0..THREADS)
            .map(|_| {
                let green = green.clone();
                scope.spawn(move || SyntaxTree::new(green).root().width())
            })
            .collect::<Vec<_>>();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect::<Vec<_>>()
    });
    assert!(widths.iter().all(|&width| width == green.width()));
}
