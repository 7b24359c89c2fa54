use std::fmt::Write as _;

use expect_test::expect;
use strata_errors::{Diagnostic, DiagnosticCode};

use crate::SyntaxKind::*;
use crate::{Builder, GreenNode, Modification, SyntaxPath, SyntaxTree, TextSize, WalkEvent};

/// `x = <- w` with the closing `;` missing.
fn unterminated_receive(builder: &mut Builder) -> GreenNode {
    let len = TextSize::new;
    builder.start_node(ASSIGNMENT_STATEMENT);
    builder.start_node(SIMPLE_NAME_REFERENCE);
    builder.push_token(IDENTIFIER_TOKEN, len(0), len(1), len(1));
    builder.finish_node().unwrap();
    builder.push_token(EQUAL_TOKEN, len(0), len(1), len(1));
    builder.start_node(RECEIVE_ACTION);
    builder.push_token(LEFT_ARROW_TOKEN, len(0), len(2), len(1));
    builder.start_node(SIMPLE_NAME_REFERENCE);
    builder.push_token(IDENTIFIER_TOKEN, len(0), len(1), len(0));
    builder.finish_node().unwrap();
    builder.finish_node().unwrap();
    builder.push_missing(SEMICOLON_TOKEN);
    builder.finish_node().unwrap();
    builder.finish().unwrap()
}

fn outline(tree: &SyntaxTree, source: &str) -> String {
    let mut out = String::new();
    let mut depth = 0;
    for event in tree.root().preorder_with_tokens() {
        match event {
            WalkEvent::Enter(element) => {
                let range = element.text_range();
                let indent = depth * 2;
                let _ = writeln!(
                    out,
                    "{:indent$}{:?}@{:?} {:?}",
                    "",
                    element.kind(),
                    range,
                    &source[range]
                );
                if element.as_node().is_some() {
                    depth += 1;
                }
            }
            WalkEvent::Leave(element) => {
                if element.as_node().is_some() {
                    depth -= 1;
                }
            }
        }
    }
    out
}

#[test]
fn missing_token_with_diagnostic() {
    let mut builder = Builder::new();
    let root = unterminated_receive(&mut builder);
    let tree = SyntaxTree::new(root);

    let semicolon = tree.root().last_token().unwrap();
    assert!(semicolon.is_missing());
    let flagged = semicolon
        .green()
        .with_diagnostic(Diagnostic::error(DiagnosticCode::MISSING_TOKEN, "expected `;`"));
    let tree = tree.replace(semicolon, flagged).unwrap();

    expect![[r#"
        ASSIGNMENT_STATEMENT@0..8
          SIMPLE_NAME_REFERENCE@0..2
            IDENTIFIER_TOKEN@0..2 [0+1+1]
          EQUAL_TOKEN@2..4 [0+1+1]
          RECEIVE_ACTION@4..8
            LEFT_ARROW_TOKEN@4..7 [0+2+1]
            SIMPLE_NAME_REFERENCE@7..8
              IDENTIFIER_TOKEN@7..8 [0+1+0]
          SEMICOLON_TOKEN@8..8 missing
            ! error[STX0001]: expected `;`
    "#]]
    .assert_eq(&tree.green().debug_dump());

    let located = tree.root().diagnostics();
    assert_eq!(located.len(), 1);
    assert_eq!(located[0].range(), crate::TextRange::empty(TextSize::new(8)));
}

#[test]
fn filling_a_missing_token() {
    let mut builder = Builder::new();
    let root = unterminated_receive(&mut builder);
    let tree = SyntaxTree::new(root);

    let semicolon = builder.token(SEMICOLON_TOKEN, TextSize::new(0), TextSize::new(1), TextSize::new(0));
    let mut modification = Modification::new();
    modification.replace_path(SyntaxPath::new([3]), semicolon);
    let tree = tree.apply(modification).unwrap();
    assert!(!tree.green().contains_missing());

    expect![[r#"
        ASSIGNMENT_STATEMENT@0..9 "x = <- w;"
          SIMPLE_NAME_REFERENCE@0..2 "x "
            IDENTIFIER_TOKEN@0..2 "x "
          EQUAL_TOKEN@2..4 "= "
          RECEIVE_ACTION@4..8 "<- w"
            LEFT_ARROW_TOKEN@4..7 "<- "
            SIMPLE_NAME_REFERENCE@7..8 "w"
              IDENTIFIER_TOKEN@7..8 "w"
          SEMICOLON_TOKEN@8..9 ";"
    "#]]
    .assert_eq(&outline(&tree, "x = <- w;"));
}

#[test]
fn one_builder_shares_leaves_across_parses() {
    let mut builder = Builder::new();
    let first = unterminated_receive(&mut builder);
    let second = unterminated_receive(&mut builder);

    assert_eq!(first, second);
    assert!(!first.ptr_eq(&second));
    let first_tokens = first.tokens().collect::<Vec<_>>();
    let second_tokens = second.tokens().collect::<Vec<_>>();
    assert!(first_tokens.iter().zip(&second_tokens).all(|(a, b)| a.ptr_eq(b)));
    assert_eq!(builder.stats().hits, 5);
}
