//! # Hashgraph Benchmarks
//!
//! | Subsystem | Operation | Input |
//! |-----------|-----------|-------|
//! | hg-03 Hashgraph | Insert and decide | Prepared gossip DAG |
//! | hg-02 Event Intake | Verify, journal and insert | Prepared gossip DAG |
//! | shared-crypto | Event signature check | One event |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hg_02_event_intake::EventIntakeApi;
use hg_03_hashgraph::{ConsensusConfig, Hashgraph};
use hg_tests::fixtures::{DagBuilder, Pipeline};
use shared_crypto::verify_event_signature;
use shared_types::PlatformEvent;
use std::time::Duration;

fn bench_hashgraph_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("hg-03-hashgraph");
    group.measurement_time(Duration::from_secs(10));

    for members in [4u64, 7, 10] {
        let mut dag = DagBuilder::new(members, 42);
        dag.random(100 * members as usize);
        let events: Vec<PlatformEvent> = dag
            .events()
            .iter()
            .cloned()
            .map(PlatformEvent::new)
            .collect();

        group.throughput(Throughput::Elements(events.len() as u64));
        group.bench_with_input(BenchmarkId::new("add_events", members), &events, |b, events| {
            b.iter(|| {
                let mut graph = Hashgraph::new(ConsensusConfig::default(), dag.rosters());
                let mut decided = 0;
                for event in events {
                    decided += graph.add_event(event.clone()).map(|r| r.len()).unwrap_or(0);
                }
                black_box(decided)
            })
        });
    }
    group.finish();
}

fn bench_intake_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("hg-02-event-intake");
    group.sample_size(10);

    let runtime = tokio::runtime::Runtime::new().expect("runtime");
    let mut dag = DagBuilder::new(4, 7);
    dag.random(400);
    let events = dag.events().to_vec();

    group.throughput(Throughput::Elements(events.len() as u64));
    group.bench_function("submit_signed_events", |b| {
        b.iter(|| {
            let dir = tempfile::tempdir().expect("tempdir");
            let mut pipeline = Pipeline::open(dir.path(), dag.rosters(), 10);
            runtime.block_on(async {
                for event in &events {
                    let _ = pipeline.intake.submit(event.clone(), None).await;
                }
            });
            black_box(pipeline.drain_rounds().len())
        })
    });
    group.finish();
}

fn bench_signature_check(c: &mut Criterion) {
    let mut group = c.benchmark_group("shared-crypto");
    let mut dag = DagBuilder::new(4, 1);
    let event = dag.create(0, None);
    let public_key = dag.rosters().latest().entries()[0].public_key;
    let hash = event.event.hash();

    group.bench_function("verify_event_signature", |b| {
        b.iter(|| black_box(verify_event_signature(&public_key, &hash, &event.signature)))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_hashgraph_insertion,
    bench_intake_pipeline,
    bench_signature_check
);
criterion_main!(benches);
