//! Criterion benchmarks for rated-item extraction and pairwise scoring.
//!
//! Measures the cost of turning a user's notes into identity-keyed ratings
//! and of scoring two users across several library sizes, so regressions in
//! the request path show up before they reach the feed ranker.
//!
//! Run benchmarks with:
//! ```bash
//! cargo bench --package palate-scorer
//! ```

// Criterion macros generate code that triggers missing_docs warnings.
#![allow(missing_docs, reason = "Criterion macros generate undocumented code")]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use palate_core::test_support::{dish, note_at};
use palate_core::{Category, Note, TastePolicy, UserId};
use palate_scorer::{extract, score_pair};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Notes per user to benchmark.
const LIBRARY_SIZES: &[usize] = &[100, 1_000, 5_000];

/// Fixed seed so every run scores the same libraries.
const BENCHMARK_SEED: u64 = 42;

/// Generate `size` restaurant notes drawn from a menu twice as large, so
/// roughly half of two users' dishes overlap and some dishes repeat.
fn generate_notes(owner: &str, size: usize, rng: &mut ChaCha8Rng) -> Vec<Note> {
    let menu = size.saturating_mul(2);
    (0..size)
        .map(|index| {
            let dish_index = rng.gen_range(0..menu);
            let rating = rng.gen_range(1_u8..=10);
            let minutes = i64::try_from(index).unwrap_or(i64::MAX);
            note_at(
                &format!("{owner}-{index}"),
                owner,
                rating,
                minutes,
                dish(&format!("Dish {dish_index}"), Some("venue-1")),
            )
        })
        .collect()
}

fn bench_extraction(c: &mut Criterion) {
    let policy = TastePolicy::default();
    let owner = UserId::from("alice");
    let mut group = c.benchmark_group("extract");
    for &size in LIBRARY_SIZES {
        let mut rng = ChaCha8Rng::seed_from_u64(BENCHMARK_SEED);
        let notes = generate_notes("alice", size, &mut rng);
        group.throughput(Throughput::Elements(u64::try_from(size).unwrap_or(u64::MAX)));
        group.bench_with_input(BenchmarkId::from_parameter(size), &notes, |b, notes| {
            b.iter(|| extract(&owner, Category::Restaurant, notes, &policy));
        });
    }
    group.finish();
}

fn bench_scoring(c: &mut Criterion) {
    let policy = TastePolicy::default();
    let mut group = c.benchmark_group("score_pair");
    for &size in LIBRARY_SIZES {
        let mut rng = ChaCha8Rng::seed_from_u64(BENCHMARK_SEED);
        let alice = generate_notes("alice", size, &mut rng);
        let bob = generate_notes("bob", size, &mut rng);
        let items_a = extract(&"alice".into(), Category::Restaurant, &alice, &policy);
        let items_b = extract(&"bob".into(), Category::Restaurant, &bob, &policy);
        group.throughput(Throughput::Elements(u64::try_from(size).unwrap_or(u64::MAX)));
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &(items_a, items_b),
            |b, (left, right)| {
                b.iter(|| score_pair(left, right));
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_extraction, bench_scoring);
criterion_main!(benches);
