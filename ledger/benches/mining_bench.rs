// Mining and validation benchmarks for the ledger.
//
// Covers block hashing, nonce search at increasing difficulty, and a full
// validation pass over chains of growing length.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use hashchain::pow::mine;
use hashchain::{Block, Chain, Record};

fn candidate() -> Block {
    Block::new(Record::new("Alice", "Bob", 10.0), 42)
        .with_prev_hash("0".repeat(64))
        .with_timestamp("12:00:00")
}

/// Chain of `n` blocks past genesis, mined at difficulty 1.
fn build_chain(n: usize) -> Chain {
    let mut chain = Chain::with_genesis(Block::genesis().with_timestamp("00:00:00"), 1);
    for i in 0..n {
        let block = Block::new(Record::new("Alice", "Bob", i as f64), 42)
            .with_prev_hash(chain.tip().hash_block())
            .with_timestamp("12:00:00");
        chain.add_block(block).expect("difficulty 1 is always reachable");
    }
    chain
}

fn bench_hash_block(c: &mut Criterion) {
    let block = candidate();

    c.bench_function("block/hash", |b| {
        b.iter(|| block.hash_block());
    });
}

fn bench_mine(c: &mut Criterion) {
    let mut group = c.benchmark_group("pow/mine");

    for difficulty in [1usize, 2, 3] {
        group.bench_with_input(
            BenchmarkId::from_parameter(difficulty),
            &difficulty,
            |b, &d| {
                b.iter_with_setup(candidate, |block| mine(block, d));
            },
        );
    }

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain/validate");

    for length in [10usize, 100, 1_000] {
        let chain = build_chain(length);
        group.throughput(Throughput::Elements(length as u64));
        group.bench_with_input(BenchmarkId::from_parameter(length), &chain, |b, chain| {
            b.iter(|| chain.is_valid());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_hash_block, bench_mine, bench_validate);
criterion_main!(benches);
