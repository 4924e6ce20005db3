use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tf_core::{AstNode, NodeKind};
use tf_optimizer::OptimizerPipeline;

fn generate_markup(items: usize) -> AstNode {
    let mut list = Vec::with_capacity(items * 2);
    for i in 0..items {
        list.push(AstNode::text("\n    "));
        list.push(AstNode::element(
            "li",
            vec![],
            vec![AstNode::text(format!("entry   {}", i % 16))],
        ));
    }
    AstNode::document(vec![AstNode::element("ul", vec![], list)])
}

fn generate_stylesheet(rules: usize) -> AstNode {
    let rules = (0..rules)
        .map(|i| {
            AstNode::rule(
                format!(".c{}", i % 32),
                vec![
                    AstNode::declaration("margin", "0"),
                    AstNode::declaration("color", "red"),
                    AstNode::declaration("margin", "0"),
                ],
            )
        })
        .collect();
    AstNode::document(rules)
}

fn bench_optimize(c: &mut Criterion) {
    for &n in &[100usize, 1000] {
        let markup = generate_markup(n);
        let sheet = generate_stylesheet(n);
        let safe = OptimizerPipeline::safe();
        let structural = OptimizerPipeline::structural()
            .with_sibling_dedup(&[NodeKind::Declaration, NodeKind::Rule]);
        c.bench_function(&format!("optimize_safe_markup_{n}"), |b| {
            b.iter(|| black_box(safe.optimize(black_box(&markup))))
        });
        c.bench_function(&format!("optimize_structural_markup_{n}"), |b| {
            b.iter(|| black_box(structural.optimize(black_box(&markup))))
        });
        c.bench_function(&format!("optimize_structural_stylesheet_{n}"), |b| {
            b.iter(|| black_box(structural.optimize(black_box(&sheet))))
        });
    }
}

criterion_group!(benches, bench_optimize);
criterion_main!(benches);
