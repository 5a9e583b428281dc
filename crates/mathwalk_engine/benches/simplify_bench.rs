//! Simplification throughput over representative inputs.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mathwalk_engine::Simplifier;
use mathwalk_parser::parse;

fn bench_simplify(c: &mut Criterion) {
    let cases = [
        ("constant_fold", "(8 - 2) * 2^2 * (1 + 1)/(4/2)/5"),
        ("fraction_sum", "4/9 + 3/5 + 1/2 + 7/10"),
        ("like_terms", "x^2 + 3x * (-4x) + 5x^3 + 3x^2 + 6"),
        ("binomial_product", "(3 + x)(4 + x)(x + 5)"),
        ("cancellation", "(x^3 * y)/x^2 + (x^2 * y^2)/(x * y)"),
    ];

    for (name, input) in cases {
        c.bench_function(name, |b| {
            b.iter(|| {
                let mut simplifier = Simplifier::with_default_rules();
                let expr =
                    parse(black_box(input), &mut simplifier.context).expect("bench input parses");
                simplifier.simplify(expr).expect("bench input simplifies")
            })
        });
    }
}

criterion_group!(benches, bench_simplify);
criterion_main!(benches);
