use criterion::{criterion_group, criterion_main, Criterion};
use interpreter::Interpreter;

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("arithmetic", |b| b.iter(|| {
        let source = r#"
            var a = 1;
            var b = 2;
            print (a + b) * (a - b) / 3 - -a * 4 >= 2 == !nil;
            print 1 + 2 * 3 - 4 / 5 + 6 * 7 - 8 / 9 + 10;
        "#;
        let mut output = Vec::<u8>::new();
        Interpreter::new(&mut output).run_source(source).unwrap();
    }));

    c.bench_function("string concatenation", |b| b.iter(|| {
        let source = r#"
            var s = "a" + "b" + "c" + "d" + "e" + "f" + "g" + "h";
            print s + s + s + s;
        "#;
        let mut output = Vec::<u8>::new();
        Interpreter::new(&mut output).run_source(source).unwrap();
    }));

    let nested = format!("{}1{}", "(".repeat(200), " + 1)".repeat(200));
    c.bench_function("deeply nested expression", |b| b.iter(|| {
        Interpreter::new(std::io::sink()).evaluate_source(&nested).unwrap();
    }));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
