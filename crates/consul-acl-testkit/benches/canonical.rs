use criterion::{black_box, criterion_group, criterion_main, Criterion};

use consul_acl_core::{decode, encode, merge, sort_document, Policy, RuleRecord, RuleSet};
use consul_acl_testkit::vectors::{RULES_CHILD, RULES_ORIGINAL, RULES_SECOND};

/// A rule set with `n` key prefixes and a couple of singletons.
fn large_rule_set(n: usize) -> RuleSet {
    let policies = [Policy::Write, Policy::Read, Policy::Deny];
    (0..n)
        .map(|i| RuleRecord::prefixed("key", format!("app/{i:05}/"), policies[i % 3].clone()))
        .chain([
            RuleRecord::singleton("operator", Policy::Read),
            RuleRecord::singleton("keyring", Policy::Deny),
        ])
        .collect()
}

fn bench_small(c: &mut Criterion) {
    let rules = decode(RULES_ORIGINAL).unwrap();
    let inherited = format!("{RULES_ORIGINAL}{RULES_SECOND}");

    c.bench_function("encode_small", |b| b.iter(|| encode(black_box(&rules))));
    c.bench_function("decode_small", |b| {
        b.iter(|| decode(black_box(RULES_ORIGINAL)).unwrap())
    });
    c.bench_function("merge_small", |b| {
        b.iter(|| merge(black_box(RULES_CHILD), black_box(&inherited)).unwrap())
    });
}

fn bench_large(c: &mut Criterion) {
    let own = large_rule_set(500);
    let own_doc = encode(&own);
    let other_doc = encode(&large_rule_set(1000));

    c.bench_function("encode_500", |b| b.iter(|| encode(black_box(&own))));
    c.bench_function("decode_500", |b| b.iter(|| decode(black_box(&own_doc)).unwrap()));
    c.bench_function("sort_document_1000", |b| {
        b.iter(|| sort_document(black_box(&other_doc)))
    });
    c.bench_function("merge_500_1000", |b| {
        b.iter(|| merge(black_box(&own_doc), black_box(&other_doc)).unwrap())
    });
}

criterion_group!(benches, bench_small, bench_large);
criterion_main!(benches);
