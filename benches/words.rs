use std::hint::black_box;

use bytetrie::{ByteOrder, CompactStore, NodeStore, PackedStore, ReferenceStore, StrCodec, Trie};
use criterion::{Criterion, criterion_group, criterion_main};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn corpus(n: usize) -> Vec<String> {
    let mut rng = SmallRng::seed_from_u64(0xda7a);
    let mut words = std::collections::BTreeSet::new();
    while words.len() < n {
        let len = rng.random_range(2..12);
        let word: String = (0..len)
            .map(|_| rng.random_range(b'a'..=b'z') as char)
            .collect();
        words.insert(word);
    }
    words.into_iter().collect()
}

fn build<S: NodeStore>(store: S, words: &[String]) -> Trie<S, StrCodec> {
    let mut trie = Trie::new(store, StrCodec);
    for w in words {
        trie.add(w).unwrap();
    }
    trie
}

fn lookup_hits<S: NodeStore>(trie: &Trie<S, StrCodec>, words: &[String]) -> usize {
    words
        .iter()
        .filter(|w| trie.contains(w).unwrap())
        .count()
}

fn words_benchmark(c: &mut Criterion) {
    let words = corpus(10_000);

    let mut group = c.benchmark_group("insert");
    group.bench_function("reference", |b| {
        b.iter(|| build(ReferenceStore::new(ByteOrder::Unsigned, true), &words))
    });
    group.bench_function("packed", |b| {
        b.iter(|| build(PackedStore::new(ByteOrder::Unsigned, true), &words))
    });
    group.finish();

    let reference = build(ReferenceStore::new(ByteOrder::Unsigned, true), &words);
    let packed = build(PackedStore::new(ByteOrder::Unsigned, true), &words);
    let mut compact = build(CompactStore::new(ByteOrder::Unsigned, true), &words);
    compact.compact().unwrap();

    let mut group = c.benchmark_group("contains");
    group.bench_function("reference", |b| {
        b.iter(|| black_box(lookup_hits(&reference, &words)))
    });
    group.bench_function("packed", |b| {
        b.iter(|| black_box(lookup_hits(&packed, &words)))
    });
    group.bench_function("compact", |b| {
        b.iter(|| black_box(lookup_hits(&compact, &words)))
    });
    group.finish();

    let mut group = c.benchmark_group("iterate");
    group.bench_function("packed", |b| b.iter(|| packed.iter().count()));
    group.bench_function("compact", |b| b.iter(|| compact.iter().count()));
    group.finish();
}

criterion_group!(benches, words_benchmark);
criterion_main!(benches);
