//! Benchmarks for both sequence variants against their std counterparts.
//!
//! Run with: cargo bench -p nexus-seq

use std::collections::{LinkedList, VecDeque};
use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use nexus_seq::{ArraySequence, LinkedSequence, SeqCursor, Sequence, sequence};
use rayon::prelude::*;

const N: usize = 10_000;

// ============================================================================
// Push
// ============================================================================

fn bench_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("push");
    group.throughput(Throughput::Elements(N as u64));

    group.bench_function("array_sequence", |b| {
        b.iter(|| {
            let mut seq = ArraySequence::new();
            for i in 0..N as u64 {
                seq.push(black_box(i));
            }
            seq
        });
    });

    group.bench_function("vec", |b| {
        b.iter(|| {
            let mut vec = Vec::new();
            for i in 0..N as u64 {
                vec.push(black_box(i));
            }
            vec
        });
    });

    group.bench_function("linked_sequence/back", |b| {
        b.iter(|| {
            let mut seq = LinkedSequence::<u64>::new();
            for i in 0..N as u64 {
                seq.push_back(black_box(i));
            }
            seq
        });
    });

    group.bench_function("std_linked_list/back", |b| {
        b.iter(|| {
            let mut list = LinkedList::new();
            for i in 0..N as u64 {
                list.push_back(black_box(i));
            }
            list
        });
    });

    group.bench_function("vec_deque/back", |b| {
        b.iter(|| {
            let mut deque = VecDeque::new();
            for i in 0..N as u64 {
                deque.push_back(black_box(i));
            }
            deque
        });
    });

    group.finish();
}

// ============================================================================
// Positional access
// ============================================================================

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");

    for len in [100usize, 1_000, 10_000] {
        let array: ArraySequence<u64> = (0..len as u64).collect();
        let linked: LinkedSequence<u64> = (0..len as u64).collect();

        // lower quarter walks from head, upper quarter from tail
        let probes = [len / 4, len / 2, 3 * len / 4];

        group.bench_with_input(BenchmarkId::new("array_sequence", len), &len, |b, _| {
            b.iter(|| {
                for &i in &probes {
                    black_box(array.get(black_box(i)).unwrap());
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("linked_sequence", len), &len, |b, _| {
            b.iter(|| {
                for &i in &probes {
                    black_box(linked.get(black_box(i)).unwrap());
                }
            });
        });
    }

    group.finish();
}

// ============================================================================
// Middle insert/remove
// ============================================================================

fn bench_insert_middle(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_remove_middle");

    let mut array: ArraySequence<u64> = (0..N as u64).collect();
    let mut linked: LinkedSequence<u64> = (0..N as u64).collect();

    group.bench_function("array_sequence", |b| {
        b.iter(|| {
            array.insert(N / 2, black_box(7)).unwrap();
            black_box(array.remove_at(N / 2).unwrap())
        });
    });

    group.bench_function("linked_sequence", |b| {
        b.iter(|| {
            linked.insert(N / 2, black_box(7)).unwrap();
            black_box(linked.remove_at(N / 2).unwrap())
        });
    });

    // cursor-local edits are O(1) on the linked variant once positioned
    group.bench_function("linked_sequence/cursor", |b| {
        b.iter(|| {
            let mut cursor = linked.cursor_at(N / 2).unwrap();
            cursor.add(&mut linked, black_box(7)).unwrap();
            cursor.previous(&linked).unwrap();
            black_box(cursor.remove(&mut linked).unwrap())
        });
    });

    group.finish();
}

// ============================================================================
// Bulk operations
// ============================================================================

fn bench_bulk(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk");
    group.throughput(Throughput::Elements(N as u64));

    let array: ArraySequence<u64> = (0..N as u64).collect();
    let linked: LinkedSequence<u64> = (0..N as u64).collect();

    group.bench_function("array_sequence/remove_if", |b| {
        b.iter_batched(
            || array.clone(),
            |mut seq| {
                seq.remove_if(|v| v.is_multiple_of(3));
                seq
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.bench_function("linked_sequence/remove_if", |b| {
        b.iter_batched(
            || linked.clone(),
            |mut seq| {
                seq.remove_if(|v| v.is_multiple_of(3));
                seq
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.bench_function("linked_sequence/cursor_remove_if", |b| {
        b.iter_batched(
            || linked.clone(),
            |mut seq| {
                sequence::remove_if(&mut seq, |v: &u64| v.is_multiple_of(3)).unwrap();
                seq
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

// ============================================================================
// Parallel traversal
// ============================================================================

fn bench_par_sum(c: &mut Criterion) {
    let mut group = c.benchmark_group("par_sum");
    let len = 1_000_000u64;
    group.throughput(Throughput::Elements(len));

    let array: ArraySequence<u64> = (0..len).collect();
    let linked: LinkedSequence<u64> = (0..len).collect();

    group.bench_function("array_sequence/seq", |b| {
        b.iter(|| black_box(array.iter().sum::<u64>()));
    });

    group.bench_function("array_sequence/par", |b| {
        b.iter(|| black_box(array.par_iter().sum::<u64>()));
    });

    group.bench_function("linked_sequence/seq", |b| {
        b.iter(|| black_box(linked.iter().sum::<u64>()));
    });

    group.bench_function("linked_sequence/par", |b| {
        b.iter(|| black_box(linked.par_iter().sum::<u64>()));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_push,
    bench_get,
    bench_insert_middle,
    bench_bulk,
    bench_par_sum
);
criterion_main!(benches);
