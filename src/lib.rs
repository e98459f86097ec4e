use {
    crate::{
        block_server::{BlockServer, BlockServerMeasured, BlockServerMemory},
        config::BlockMeterConfig,
        metrics::{MetricsError, MetricsRegistry},
        models::RequestContext,
        workload::run_workload,
    },
    std::sync::Arc,
    thiserror::Error,
    tracing::{info, warn},
};

pub mod block_server;
pub mod config;
pub mod logging;
mod macros;
pub mod metrics;
pub mod models;
pub mod workload;

#[derive(Debug, Error)]
pub enum BlockMeterError {
    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),
}

/// Wires an in-memory block server behind the measuring decorator and drives
/// traffic through it.
pub struct BlockMeter {
    pub config: BlockMeterConfig,
    pub registry: MetricsRegistry,
    server: Arc<BlockServerMeasured>,
}

impl BlockMeter {
    pub fn new(config: BlockMeterConfig) -> Result<Self, BlockMeterError> {
        let registry = MetricsRegistry::new().with_buckets(config.metrics.buckets.to_buckets())?;
        let memory = Arc::new(BlockServerMemory::new(config.memory.quota_limit_bytes));
        let server = Arc::new(BlockServerMeasured::with_service_name(
            memory,
            &registry,
            &config.metrics.service_name,
        ));

        Ok(BlockMeter {
            config,
            registry,
            server,
        })
    }

    /// Runs the configured workload and returns the metrics in prometheus
    /// text format. The block server is shut down afterwards.
    pub async fn run(&self) -> Result<String, BlockMeterError> {
        info!(
            "Running {} tasks x {} rounds of {} byte blocks",
            self.config.workload.tasks, self.config.workload.rounds, self.config.workload.block_size
        );

        let report = run_workload(self.server.clone(), &self.config.workload).await;
        info!("Completed {} rounds, {} failed", report.rounds, report.failures);

        match self.server.get_user_quota_info(&RequestContext::default()).await {
            Ok(quota) => info!(
                "Quota usage: {} of {} bytes across {} folders",
                quota.total_bytes,
                quota.limit_bytes,
                quota.folders.len()
            ),
            Err(e) => warn!("Failed to read quota info: {}", e),
        }

        let exposition = self.registry.encode_text()?;
        self.server.shutdown();
        Ok(exposition)
    }
}
