use criterion::{black_box, criterion_group, criterion_main, Criterion};
use loxcalc::{compile, Chunk, Config, VM};

fn long_expression(terms: usize) -> String {
    let mut src = String::from("1");
    for i in 0..terms {
        let op = ["+", "-", "*", "/"][i % 4];
        src.push_str(&format!(" {} ({}.5 - -{})", op, i, i % 7));
    }
    src
}

pub fn compile_only(c: &mut Criterion) {
    let src = long_expression(500);
    c.bench_function("compile_500_terms", |b| {
        b.iter(|| {
            let mut chunk = Chunk::default();
            compile(black_box(&src), &mut chunk)
        })
    });
}

pub fn compile_and_run(c: &mut Criterion) {
    let src = long_expression(500);
    c.bench_function("interpret_500_terms", |b| {
        let mut vm = VM::new(Config::default(), std::io::sink());
        b.iter(|| vm.interpret_source(black_box(&src)));
    });
}

pub fn run_only(c: &mut Criterion) {
    let src = long_expression(500);
    let mut chunk = Chunk::default();
    compile(&src, &mut chunk).expect("benchmark source compiles");
    c.bench_function("run_500_terms", |b| {
        let mut vm = VM::new(Config::default(), std::io::sink());
        b.iter(|| vm.interpret(black_box(&chunk)));
    });
}

criterion_group!(benches, compile_only, compile_and_run, run_only);
criterion_main!(benches);
