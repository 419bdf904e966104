//! Registry and polling-engine benchmark suite.
//!
//! Benchmarks the in-process costs the library adds around a backend:
//! - Acquire/release across many concurrent contexts: 16, 64, 256
//! - One `poll` evaluation against pages of growing size
//! - Bounded random selection over an option list
//!
//! Run with: cargo bench --bench poll_engine
//! Results saved to: target/criterion/

use std::sync::Arc;
use std::time::Duration;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

use session_sync::browser::memory::{MemoryBrowser, MemoryFactory};
use session_sync::select::select_random_enabled_with;
use session_sync::wait::{Clickability, CollectionClickable, Visibility, explicit_wait};
use session_sync::{BrowserKind, ContextId, ElementState, Locator, Session, SessionRegistry};

// ============================================================================
// Benchmark Parameters
// ============================================================================

const CONTEXT_COUNTS: &[usize] = &[16, 64, 256];
const PAGE_SIZES: &[usize] = &[10, 100, 1000];

// ============================================================================
// Benchmark: Acquire / Release
// ============================================================================

fn bench_acquire_release(c: &mut Criterion) {
    init_logging();
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("acquire_release");

    for &count in CONTEXT_COUNTS {
        group.bench_with_input(BenchmarkId::new("contexts", count), &count, |b, &count| {
            b.to_async(&rt).iter(|| acquire_release(count));
        });
    }

    group.finish();
}

async fn acquire_release(count: usize) {
    let registry = SessionRegistry::builder()
        .factory(Arc::new(MemoryFactory::new()))
        .build()
        .expect("registry");

    let tasks: Vec<_> = (0..count)
        .map(|_| {
            let registry = registry.clone();
            tokio::spawn(async move {
                let ctx = ContextId::new();
                registry
                    .acquire(ctx, BrowserKind::ChromeHeadless)
                    .await
                    .expect("acquire");
                registry.release(ctx).await;
            })
        })
        .collect();

    for result in futures_util::future::join_all(tasks).await {
        result.expect("task");
    }
}

// ============================================================================
// Benchmark: Single Evaluation
// ============================================================================

fn bench_satisfied_poll(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("satisfied_poll");

    for &size in PAGE_SIZES {
        let session = page_with(size);
        let last = Locator::id(format!("item-{}", size - 1));
        let items = Locator::css("li.item");
        let (session, last, items) = (&session, &last, &items);

        group.bench_with_input(BenchmarkId::new("visibility", size), &size, |b, _| {
            b.to_async(&rt).iter(move || async move {
                explicit_wait(session, &Visibility::of(last.clone()), Duration::from_secs(1))
                    .await
                    .ok()
                    .expect("visible")
            });
        });

        group.bench_with_input(BenchmarkId::new("clickability", size), &size, |b, _| {
            b.to_async(&rt).iter(move || async move {
                explicit_wait(session, &Clickability::of(last.clone()), Duration::from_secs(1))
                    .await
                    .ok()
                    .expect("clickable")
            });
        });

        group.bench_with_input(BenchmarkId::new("collection", size), &size, |b, _| {
            b.to_async(&rt).iter(move || async move {
                explicit_wait(session, &CollectionClickable::of(items.clone()), Duration::from_secs(1))
                    .await
                    .ok()
                    .expect("collection")
            });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Random Selection
// ============================================================================

fn bench_select(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let session = page_with(50);
    let options = rt
        .block_on(session.remote().find_elements(&Locator::css("li.item")))
        .expect("options");

    c.bench_function("select_random_enabled", |b| {
        let mut rng = StdRng::seed_from_u64(42);
        b.iter(|| {
            rt.block_on(select_random_enabled_with(&session, &options, &mut rng))
                .expect("selected")
        });
    });
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Installs a subscriber honoring `RUST_LOG`; warnings only by default.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("session_sync=warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Session over a page of `size` clickable list items.
fn page_with(size: usize) -> Session {
    let page = Arc::new(MemoryBrowser::new(BrowserKind::ChromeHeadless));
    for i in 0..size {
        page.add_element_matching(
            [Locator::css("li.item"), Locator::id(format!("item-{i}"))],
            ElementState::visible(120.0, 18.0),
        );
    }
    Session::detached(BrowserKind::ChromeHeadless, page)
}

criterion_group!(benches, bench_acquire_release, bench_satisfied_poll, bench_select);
criterion_main!(benches);
