use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Histogram buckets must be non-empty and strictly increasing: {0:?}")]
    InvalidBuckets(Vec<f64>),
    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
    #[error("Exposition is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
