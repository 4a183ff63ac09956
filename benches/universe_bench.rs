use criterion::{criterion_group, criterion_main, Criterion};
use quadlife::{parse_rle, random_field, Universe};

const GOSPER_GUN: &str = "#N Gosper glider gun
x = 36, y = 9, rule = B3/S23
24bo$22bobo$12b2o6b2o12b2o$11bo3bo4b2o12b2o$2o8bo5bo3b2o$2o8bo3bob2o4b
obo$10bo5bo7bo$11bo3bo$12b2o!
";

fn bench_glider_gun(c: &mut Criterion) {
    let mut pattern = parse_rle(GOSPER_GUN).unwrap();
    c.bench_function("gosper_gun_2^12", |b| {
        b.iter(|| {
            let mut universe = Universe::new();
            universe.setup_field(&mut pattern.field_x, &mut pattern.field_y, None);
            universe.set_step(12);
            universe.next_generation(true);
            universe.population()
        })
    });
}

fn bench_random_single_steps(c: &mut Criterion) {
    let (mut xs, mut ys) = random_field(1 << 8, 0.3, Some(42));
    let mut universe = Universe::new();
    universe.setup_field(&mut xs, &mut ys, None);
    c.bench_function("random_256_single_step", |b| {
        b.iter(|| universe.next_generation(true))
    });
}

criterion_group!(benches, bench_glider_gun, bench_random_single_steps);
criterion_main!(benches);
