use {
    chrono::NaiveDate,
    std::{
        fs::{self, OpenOptions},
        path::{Path, PathBuf},
        sync::Mutex,
    },
    thiserror::Error,
    tracing::level_filters::LevelFilter,
    tracing_subscriber::{
        EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError,
    },
};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to open log file: {0}")]
    Io(#[from] std::io::Error),
    #[error("A global subscriber is already installed: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}

/// Daily log file for `date` under `log_dir`.
pub fn log_file_path(log_dir: &Path, date: NaiveDate) -> PathBuf {
    log_dir.join(format!("{}.log", date.format("%Y-%m-%d")))
}

/// Installs the global subscriber: compact console output, plus a daily file
/// under `log_dir` when one is given. `RUST_LOG` takes precedence over the
/// level picked from `debug`.
pub fn init_logging(debug: bool, log_dir: Option<&Path>) -> Result<Option<PathBuf>, LoggingError> {
    let default_level = if debug { LevelFilter::DEBUG } else { LevelFilter::INFO };
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let log_file = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let path = log_file_path(dir, chrono::Local::now().date_naive());
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            Some((path, file))
        }
        None => None,
    };

    let (log_path, file_layer) = match log_file {
        Some((path, file)) => {
            let layer = fmt::layer()
                .with_writer(Mutex::new(file))
                .with_target(false)
                .with_ansi(false)
                .compact();
            (Some(path), Some(layer))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).compact())
        .with(file_layer)
        .try_init()?;

    if let Some(path) = &log_path {
        tracing::info!("Logging to: {}", path.display());
    }

    Ok(log_path)
}
