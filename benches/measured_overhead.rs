use {
    blockmeter::{
        block_server::{BlockServer, BlockServerMeasured, BlockServerMemory},
        metrics::MetricsRegistry,
        models::{BlockContext, BlockCryptKeyServerHalf, BlockId, RequestContext, TlfId},
    },
    criterion::{Criterion, criterion_group, criterion_main},
    std::{hint::black_box, sync::Arc},
    uuid::Uuid,
};

fn get_benchmark(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("failed to build runtime");

    let registry = MetricsRegistry::new();
    let memory = Arc::new(BlockServerMemory::default());
    let measured = BlockServerMeasured::new(memory.clone(), &registry);

    let ctx = RequestContext::default();
    let tlf_id = TlfId::new_random();
    let context = BlockContext::first_ref(Uuid::new_v4());
    let id = BlockId([3; 32]);
    runtime
        .block_on(memory.put(
            &ctx,
            id,
            tlf_id,
            &context,
            vec![0; 4096],
            BlockCryptKeyServerHalf([1; 32]),
        ))
        .expect("failed to seed block");

    c.bench_function("get_direct", |b| {
        b.iter(|| runtime.block_on(memory.get(&ctx, black_box(id), tlf_id, &context)))
    });
    c.bench_function("get_measured", |b| {
        b.iter(|| runtime.block_on(measured.get(&ctx, black_box(id), tlf_id, &context)))
    });
}

criterion_group!(benches, get_benchmark);
criterion_main!(benches);
