use {
    crate::metrics::{FAST_OPS_BUCKETS, SLOW_OPS_BUCKETS},
    config::{Config, ConfigError, File, FileFormat},
    serde::Deserialize,
};

#[derive(Clone, Debug, Deserialize)]
pub struct BlockMeterConfig {
    pub debug: bool,
    pub log_dir: String,
    pub metrics: MetricsConfig,
    pub memory: MemoryServerConfig,
    pub workload: WorkloadConfig,
}

impl BlockMeterConfig {
    pub fn from_file(config_path: &str) -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(File::new(config_path, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("debug", false)?
            .set_default("log_dir", "logs")?
            .set_default("metrics.service_name", "BlockServer")?
            .set_default("metrics.buckets", "slow")?
            .set_default("memory.quota_limit_bytes", i64::MAX)?
            .set_default("workload.tasks", 4)?
            .set_default("workload.rounds", 100)?
            .set_default("workload.block_size", 4096)?
            .set_default("workload.request_timeout_ms", 5000)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct MetricsConfig {
    pub service_name: String,
    pub buckets: BucketsConfig,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum BucketsConfig {
    Preset(BucketPreset),
    Custom(Vec<f64>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketPreset {
    Fast,
    Slow,
}

impl BucketsConfig {
    pub fn to_buckets(&self) -> Vec<f64> {
        match self {
            BucketsConfig::Preset(BucketPreset::Fast) => FAST_OPS_BUCKETS.to_vec(),
            BucketsConfig::Preset(BucketPreset::Slow) => SLOW_OPS_BUCKETS.to_vec(),
            BucketsConfig::Custom(buckets) => buckets.clone(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct MemoryServerConfig {
    pub quota_limit_bytes: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct WorkloadConfig {
    pub tasks: usize,
    pub rounds: usize,
    pub block_size: usize,
    /// Deadline applied to every request the workload issues.
    pub request_timeout_ms: u64,
}
