pub mod error;
pub mod registry;
pub mod timer;

pub use {error::MetricsError, registry::MetricsRegistry, timer::Timer, timer::TimerGuard};

/// Buckets for calls served from local memory or disk, in seconds.
pub const FAST_OPS_BUCKETS: &[f64] = &[
    0.000_05, 0.000_1, 0.000_25, 0.000_5, 0.001, 0.002_5, 0.005, 0.01, 0.025, 0.05, 0.1,
];

/// Buckets for calls that cross the network, in seconds.
pub const SLOW_OPS_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
];
