use std::hint::black_box;

use codspeed_criterion_compat::{BenchmarkId, Criterion, criterion_group, criterion_main};
use strata_errors::{Diagnostic, DiagnosticCode};
use strata_syntax::SyntaxKind::*;
use strata_syntax::{Builder, GreenNode, Modification, SyntaxPath, SyntaxTree, attach};
use text_size::TextSize;

/// A `LIST` of `statements` expression statements `name;`.
fn statement_list(builder: &mut Builder, statements: usize) -> GreenNode {
    let len = TextSize::new;
    builder.start_node(LIST);
    for _ in 0..statements {
        builder.start_node(EXPRESSION_STATEMENT);
        builder.start_node(SIMPLE_NAME_REFERENCE);
        builder.push_token(IDENTIFIER_TOKEN, len(4), len(5), len(0));
        builder.finish_node().unwrap();
        builder.push_token(SEMICOLON_TOKEN, len(0), len(1), len(1));
        builder.finish_node().unwrap();
    }
    builder.finish_node().unwrap();
    builder.finish().unwrap()
}

fn benchmark_modify(c: &mut Criterion) {
    let mut group = c.benchmark_group("Modification Benchmark");
    let mut builder = Builder::new();

    for statements in [256, 4096] {
        let tree = SyntaxTree::new(statement_list(&mut builder, statements));
        let ident = builder.token(IDENTIFIER_TOKEN, TextSize::new(4), TextSize::new(9), TextSize::new(0));
        let replacement = builder.node(SIMPLE_NAME_REFERENCE, [ident.into()]);

        group.bench_with_input(BenchmarkId::new("single_edit", statements), &tree, |b, tree| {
            let path = SyntaxPath::new([(statements / 2) as u32, 0]);
            b.iter(|| {
                let mut modification = Modification::new();
                modification.replace_path(path.clone(), replacement.clone());
                black_box(tree.apply(modification).unwrap());
            });
        });

        group.bench_with_input(BenchmarkId::new("batch_of_16", statements), &tree, |b, tree| {
            let step = statements / 16;
            b.iter(|| {
                let mut modification = Modification::new();
                for i in 0..16 {
                    modification.replace_path(SyntaxPath::new([(i * step) as u32, 0]), replacement.clone());
                }
                black_box(tree.apply(modification).unwrap());
            });
        });
    }

    group.finish();
}

fn benchmark_diagnostics(c: &mut Criterion) {
    let mut group = c.benchmark_group("Diagnostics Benchmark");
    let mut builder = Builder::new();

    for statements in [256, 4096] {
        let mut root = statement_list(&mut builder, statements);
        for index in (0..statements).step_by(64) {
            let Some(child) = root.child(index) else { break };
            let flagged = attach(child, Diagnostic::warning(DiagnosticCode::UNEXPECTED_NODE, "unused"));
            root = root.replace_child(index, flagged).unwrap();
        }
        let tree = SyntaxTree::new(root);

        group.bench_with_input(BenchmarkId::new("collect", statements), &tree, |b, tree| {
            b.iter(|| black_box(tree.root().diagnostics().len()));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_modify, benchmark_diagnostics);
criterion_main!(benches);
