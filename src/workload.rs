//! Synthetic block traffic used to exercise a block server end to end.

use {
    crate::{
        block_server::{BlockServer, BlockServerError},
        config::WorkloadConfig,
        models::{BlockContext, BlockCryptKeyServerHalf, BlockId, RefNonce, RequestContext, TlfId},
    },
    chrono::{TimeDelta, Utc},
    rand::{Rng, SeedableRng, rngs::StdRng},
    std::{collections::HashMap, sync::Arc, time::Duration},
    tracing::{debug, warn},
    uuid::Uuid,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadReport {
    pub rounds: usize,
    pub failures: usize,
}

impl WorkloadReport {
    fn merge(&mut self, other: WorkloadReport) {
        self.rounds += other.rounds;
        self.failures += other.failures;
    }
}

/// Runs `config.tasks` workers concurrently, each doing `config.rounds`
/// put/get/reference cycles against `server`.
pub async fn run_workload(server: Arc<dyn BlockServer>, config: &WorkloadConfig) -> WorkloadReport {
    let mut workers = tokio::task::JoinSet::new();
    for worker in 0..config.tasks {
        let server = server.clone();
        let (rounds, block_size) = (config.rounds, config.block_size);
        let timeout = Duration::from_millis(config.request_timeout_ms);
        workers.spawn(async move { run_worker(worker, server, rounds, block_size, timeout).await });
    }

    let mut report = WorkloadReport::default();
    while let Some(result) = workers.join_next().await {
        match result {
            Ok(worker_report) => report.merge(worker_report),
            Err(e) => warn!("Workload task failed: {}", e),
        }
    }
    report
}

struct RandomBlock {
    id: BlockId,
    payload: Vec<u8>,
    server_half: BlockCryptKeyServerHalf,
}

async fn run_worker(
    worker: usize,
    server: Arc<dyn BlockServer>,
    rounds: usize,
    block_size: usize,
    timeout: Duration,
) -> WorkloadReport {
    let timeout = TimeDelta::from_std(timeout).unwrap_or(TimeDelta::MAX);
    let mut rng = StdRng::from_os_rng();
    let tlf_id = TlfId::new_random();
    let user = Uuid::new_v4();
    let mut report = WorkloadReport::default();

    for round in 0..rounds {
        let mut payload = vec![0u8; block_size];
        rng.fill(payload.as_mut_slice());
        let block = RandomBlock {
            id: BlockId(rng.random()),
            payload,
            server_half: BlockCryptKeyServerHalf(rng.random()),
        };
        let archive = rng.random_bool(0.25);

        let ctx = match Utc::now().checked_add_signed(timeout) {
            Some(deadline) => RequestContext::with_deadline(deadline),
            None => RequestContext::default(),
        };

        report.rounds += 1;
        if let Err(e) = run_round(server.as_ref(), &ctx, tlf_id, user, block, archive).await {
            debug!("Worker {} round {} failed: {}", worker, round, e);
            report.failures += 1;
        }
    }
    report
}

async fn run_round(
    server: &dyn BlockServer,
    ctx: &RequestContext,
    tlf_id: TlfId,
    user: Uuid,
    block: RandomBlock,
    archive: bool,
) -> Result<(), BlockServerError> {
    let RandomBlock {
        id,
        payload,
        server_half,
    } = block;
    let first = BlockContext::first_ref(user);
    let second = BlockContext::new(user, user, RefNonce(1));

    server.put(ctx, id, tlf_id, &first, payload, server_half).await?;
    server.get(ctx, id, tlf_id, &first).await?;
    server.add_block_reference(ctx, id, tlf_id, &second).await?;

    if archive {
        server
            .archive_block_references(ctx, tlf_id, HashMap::from([(id, vec![second.clone()])]))
            .await?;
    }

    server
        .remove_block_reference(ctx, tlf_id, HashMap::from([(id, vec![first, second])]))
        .await?;
    Ok(())
}
