use criterion::{criterion_group, criterion_main, Criterion};
use kwsearch_core::{Document, InvertedIndex, Normalizer};
use std::sync::Arc;

const TEXT: &str = "A retired thief is pulled back for one last job: a vault beneath the \
    city's oldest bank, guarded by a security chief who has waited twenty years to catch him. \
    Meanwhile, his daughter, a detective, starts to suspect the truth.";

fn bench_normalize(c: &mut Criterion) {
    let normalizer = Normalizer::default();
    c.bench_function("normalize_paragraph", |b| b.iter(|| normalizer.normalize(TEXT)));
}

fn bench_search(c: &mut Criterion) {
    let mut idx = InvertedIndex::new(Arc::new(Normalizer::default()));
    let docs = (0..2_000u32).map(|i| Document::new(i, format!("Movie {i}"), TEXT.repeat((i % 5 + 1) as usize)));
    idx.build(docs).expect("build");
    c.bench_function("search_two_terms", |b| b.iter(|| idx.search("bank detective", 10).expect("search")));
}

criterion_group!(benches, bench_normalize, bench_search);
criterion_main!(benches);
