//! Benchmarks for translation and materialization
//!
//! Run with: cargo bench -p nuqasm

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use nuqasm::{MemoryLoader, Translator, TranslatorOptions, materialize};
use nuqasm_ir::Circuit;

/// A layered program: `layers` rounds of gate calls over `width` qubits.
fn generate_program(width: usize, layers: usize) -> String {
    let mut src = String::from("OPENQASM 2.0;\n");
    src.push_str("gate entangle(theta) a,b\n{\n  rz(theta/2) b;\n  cx a,b;\n  rz(-theta/2) b;\n  cx a,b;\n}\n");
    src.push_str(&format!("qreg q[{width}];\ncreg c[{width}];\n"));
    for layer in 0..layers {
        for i in 0..width {
            src.push_str(&format!("h q[{i}];\n"));
        }
        for i in 0..width - 1 {
            src.push_str(&format!("entangle(pi/{}) q[{i}],q[{}];\n", layer + 1, i + 1));
        }
        src.push_str("barrier q;\n");
    }
    src.push_str("measure q -> c;\n");
    src
}

fn translator() -> Translator<MemoryLoader> {
    Translator::with_loader(TranslatorOptions::default(), MemoryLoader::new())
}

fn bench_translate(c: &mut Criterion) {
    let mut group = c.benchmark_group("translate");

    for layers in &[10, 100, 500] {
        let src = generate_program(8, *layers);
        group.bench_with_input(BenchmarkId::new("layers", layers), &src, |b, src| {
            b.iter(|| translator().translate_str(black_box(src)).unwrap());
        });
    }

    group.finish();
}

fn bench_materialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("materialize");

    for layers in &[10, 100, 500] {
        let unit = translator()
            .translate_str(&generate_program(8, *layers))
            .unwrap();
        group.bench_with_input(BenchmarkId::new("layers", layers), &unit, |b, unit| {
            b.iter(|| {
                let mut circuit = Circuit::new("bench");
                materialize(black_box(unit), &mut circuit).unwrap();
                circuit
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_translate, bench_materialize);
criterion_main!(benches);
