extern crate criterion;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

use speedysheet_lib::{delete_range, insert_many, CssStyleSheet, RuleSheet};

fn batch_rules(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            if i % 10 == 9 {
                // every tenth rule is rejected
                format!("{{color:red}} /* {} */", i)
            } else {
                format!(".c{}{{color:red}}", i)
            }
        })
        .collect()
}

fn bench_insert_many(c: &mut Criterion) {
    let rules = batch_rules(1_000);

    c.bench_function("insert_many_1000", |b| {
        b.iter_batched(
            CssStyleSheet::detached,
            |mut sheet| insert_many(&mut sheet, &rules, 0),
            BatchSize::SmallInput,
        )
    });
}

fn bench_delete_range(c: &mut Criterion) {
    let rules = batch_rules(1_000);

    c.bench_function("delete_range_900", |b| {
        b.iter_batched(
            || {
                let mut sheet = CssStyleSheet::detached();
                insert_many(&mut sheet, &rules, 0);
                sheet
            },
            |mut sheet| {
                let count = sheet.rule_count();
                delete_range(&mut sheet, count - 1, count).unwrap();
                sheet
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_insert_many, bench_delete_range);
criterion_main!(benches);
