use {
    blockmeter::{BlockMeter, config::BlockMeterConfig, logging::init_logging},
    clap::Parser,
    std::path::Path,
    tracing::error,
};

#[derive(Parser)]
#[command(version, about = "Drives traffic through a measured block server")]
struct Cli {
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = match BlockMeterConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: failed to load config file: {e}");
            return;
        }
    };

    if let Err(e) = init_logging(config.debug, Some(Path::new(&config.log_dir))) {
        eprintln!("Error: failed to initialize logging: {e}");
        return;
    }

    let app = match BlockMeter::new(config) {
        Ok(app) => app,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };

    match app.run().await {
        Ok(exposition) => print!("{exposition}"),
        Err(e) => error!("blockmeter failed to run: {}", e),
    }
}
