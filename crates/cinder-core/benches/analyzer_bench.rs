use cinder_core::ast::{BinaryOp, Literal};
use cinder_core::{AnalyzerOptions, Node, OptimizationLevel, Optimizer};
use cinder_test_helpers::fixtures::{if_else, template_with_globals};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// A function with `sections` conditionals, each reading and filtering the
/// same globals in both branches
fn generated_template(sections: usize) -> Node {
    let globals = ["title", "user", "items"];
    let mut body = Vec::with_capacity(sections * 2);
    for i in 0..sections {
        let branch = || {
            vec![
                Node::buffer_write(Node::filter(Node::placeholder("title"))),
                Node::buffer_write(Node::binop(
                    BinaryOp::Or,
                    Node::placeholder("user"),
                    Node::literal(Literal::Str("anonymous".into())),
                )),
                Node::buffer_write(Node::call(
                    Node::identifier("len"),
                    vec![Node::placeholder("items")],
                )),
            ]
        };
        body.push(Node::assign(
            format!("counter_{}", i),
            Node::literal(Literal::Int(i as i64)),
        ));
        body.push(if_else(branch(), branch()));
    }
    template_with_globals(&globals, body)
}

fn bench_optimize_levels(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimize_levels");
    let template = generated_template(50);

    for level in [
        OptimizationLevel::O0,
        OptimizationLevel::O1,
        OptimizationLevel::O2,
        OptimizationLevel::O3,
    ] {
        let optimizer = Optimizer::new(AnalyzerOptions::for_level(level));
        group.bench_with_input(BenchmarkId::from_parameter(format!("{:?}", level)), &template, |b, template| {
            b.iter(|| {
                let mut root = template.clone();
                optimizer.optimize(black_box(&mut root)).ok()
            })
        });
    }
    group.finish();
}

fn bench_template_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("template_size");
    let optimizer = Optimizer::new(AnalyzerOptions::for_level(OptimizationLevel::O3));

    for sections in [10, 100, 1000] {
        let template = generated_template(sections);
        group.bench_with_input(BenchmarkId::from_parameter(sections), &template, |b, template| {
            b.iter(|| {
                let mut root = template.clone();
                optimizer.optimize(black_box(&mut root)).ok()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_optimize_levels, bench_template_size);
criterion_main!(benches);
