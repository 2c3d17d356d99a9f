use breedlens::testing::ScriptedFetcher;
use breedlens::{AdmissionController, RequestContext, SearchQuery, SearchService};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use http::StatusCode;
use std::sync::Arc;
use std::thread;

const LOOKUP: &str = "https://bench.test/api/breed/husky/images/random";
const IMAGE: &str = "https://images.bench.test/breeds/husky/1.jpg";

fn admission_admit_release(c: &mut Criterion) {
    let admission = AdmissionController::new();

    c.bench_function("admission_admit_release", |b| {
        b.iter(|| {
            let admitted = black_box(admission.try_admit());
            if admitted {
                admission.release();
            }
        });
    });
}

fn admission_denied_when_full(c: &mut Criterion) {
    let admission = AdmissionController::new();
    while admission.try_admit() {}

    c.bench_function("admission_denied_when_full", |b| {
        b.iter(|| black_box(admission.try_admit()));
    });
}

fn admission_contended(c: &mut Criterion) {
    let admission = Arc::new(AdmissionController::new());

    c.bench_function("admission_contended_4_threads", |b| {
        b.iter(|| {
            thread::scope(|s| {
                for _ in 0..4 {
                    let admission = Arc::clone(&admission);
                    s.spawn(move || {
                        for _ in 0..64 {
                            if admission.try_admit() {
                                admission.release();
                            }
                        }
                    });
                }
            });
        });
    });
}

fn search_pipeline_scripted(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let fetcher = ScriptedFetcher::new()
        .resolves_to(LOOKUP, IMAGE)
        .respond(IMAGE, StatusCode::OK, vec![0u8; 4096]);
    // Capacity large enough that the bench never trips admission.
    let admission = AdmissionController::with_capacity(usize::MAX).unwrap();
    let service = SearchService::new(fetcher, admission, "https://bench.test");
    let query = SearchQuery::category_only("husky");

    c.bench_function("search_pipeline_scripted", |b| {
        b.to_async(&rt).iter(|| async {
            let ctx = RequestContext::new();
            let _ = black_box(service.search(black_box(&query), &ctx).await);
        });
    });
}

criterion_group!(
    benches,
    admission_admit_release,
    admission_denied_when_full,
    admission_contended,
    search_pipeline_scripted
);
criterion_main!(benches);
