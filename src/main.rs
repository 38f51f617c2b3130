use clap::Parser;
use parking_flow::config::{self, DEFAULT_CONFIG_PATH};
use parking_flow::generator::{self, RunOptions};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "parking-flow",
    about = "Generate simulated parking-lot occupancy snapshots"
)]
struct Cli {
    /// Decimal hour overriding the clock, e.g. 14.5
    #[arg(allow_hyphen_values = true)]
    hour: Option<String>,
    /// Configuration file [default: config/config.toml]
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for a reproducible run (overrides simulation.seed)
    #[arg(long)]
    seed: Option<u64>,
}

fn init_tracing(level: Level) {
    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let loaded = match &cli.config {
        Some(path) => config::load_from_path(path),
        None => config::load_default(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(err) => {
            init_tracing(Level::INFO);
            tracing::error!(
                config_path = %config_path.display(),
                error = %err,
                "Failed to load config"
            );
            return Err(err.into());
        }
    };
    init_tracing(config.log_level()?);
    tracing::info!(
        app = %config.app.name,
        config_path = %config_path.display(),
        "parking-flow starting"
    );

    let options = RunOptions {
        debug_hour: cli.hour,
        seed: cli.seed,
    };
    let summary = match generator::run(&config, &options) {
        Ok(summary) => summary,
        Err(err) => {
            tracing::error!(error = %err, "Generation failed");
            return Err(err.into());
        }
    };

    let available: u32 = summary.records.iter().map(|r| r.available_spots).sum();
    let total: u32 = summary.records.iter().map(|r| r.total_spots).sum();
    tracing::info!(
        lots = summary.records.len(),
        available,
        total,
        minutes = summary.minutes,
        output = %summary.output_path.display(),
        "Run complete"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid_toml() -> Result<(), Box<dyn std::error::Error>> {
        let _config = config::load_default()?;
        Ok(())
    }

    #[test]
    fn cli_accepts_negative_hour_and_flags() {
        let cli = Cli::parse_from(["parking-flow", "-1.5", "--seed", "9"]);

        assert_eq!(cli.hour.as_deref(), Some("-1.5"));
        assert_eq!(cli.seed, Some(9));
        assert!(cli.config.is_none());
    }

    #[test]
    fn cli_hour_is_optional() {
        let cli = Cli::parse_from(["parking-flow", "--config", "other.toml"]);

        assert!(cli.hour.is_none());
        assert_eq!(cli.config, Some(PathBuf::from("other.toml")));
    }
}
