use {
    crate::metrics::{SLOW_OPS_BUCKETS, error::MetricsError, timer::Timer},
    dashmap::DashMap,
    prometheus::{Encoder, Histogram, HistogramOpts, Registry, TextEncoder, proto::MetricFamily},
    tracing::{debug, error, warn},
};

/// Maps timer names to timers backed by a prometheus registry.
pub struct MetricsRegistry {
    registry: Registry,
    buckets: Vec<f64>,
    timers: DashMap<String, Timer>,
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRegistry {
    /// Creates an isolated registry using the slow-ops buckets.
    pub fn new() -> Self {
        MetricsRegistry {
            registry: Registry::new(),
            buckets: SLOW_OPS_BUCKETS.to_vec(),
            timers: DashMap::new(),
        }
    }

    /// Replaces the buckets used by timers registered from now on.
    pub fn with_buckets(mut self, buckets: Vec<f64>) -> Result<Self, MetricsError> {
        let increasing = buckets.windows(2).all(|pair| pair[0] < pair[1]);
        if buckets.is_empty() || !increasing || buckets.iter().any(|b| !b.is_finite()) {
            return Err(MetricsError::InvalidBuckets(buckets));
        }
        self.buckets = buckets;
        Ok(self)
    }

    /// Returns the timer registered under `name`, registering it first if
    /// needed. Repeated calls with the same name share one timer.
    pub fn get_or_register_timer(&self, name: &str) -> Timer {
        if let Some(timer) = self.timers.get(name) {
            return timer.clone();
        }

        self.timers
            .entry(name.to_owned())
            .or_insert_with(|| self.register_timer(name))
            .clone()
    }

    pub fn timer_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.timers.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Renders every registered metric in the prometheus text format.
    pub fn encode_text(&self) -> Result<String, MetricsError> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    fn register_timer(&self, name: &str) -> Timer {
        let metric = metric_name(name);
        let opts = HistogramOpts::new(metric.clone(), format!("Duration of {name} calls in seconds"))
            .buckets(self.buckets.clone());

        let histogram = match Histogram::with_opts(opts) {
            Ok(histogram) => histogram,
            Err(e) => {
                error!("Failed to build timer {}: {}", name, e);
                return Timer::detached(name);
            }
        };

        // The timer still counts samples when registration fails; it is only
        // missing from the exposition.
        match self.registry.register(Box::new(histogram.clone())) {
            Ok(()) => debug!("Registered timer {} as {}", name, metric),
            Err(e) => warn!("Timer {} is not exported as {}: {}", name, metric, e),
        }

        Timer::new(name, histogram)
    }
}

/// Converts a dotted timer name into a valid prometheus metric name.
pub fn metric_name(name: &str) -> String {
    let mut metric: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == ':' { c } else { '_' })
        .collect();

    if metric.is_empty() || metric.starts_with(|c: char| c.is_ascii_digit()) {
        metric.insert(0, '_');
    }
    metric.push_str("_seconds");
    metric
}
