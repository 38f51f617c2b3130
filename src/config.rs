use crate::occupancy::transition::TransitionParams;
use crate::occupancy::{OccupancyBand, OccupancyRange, OccupancySchedule};
use crate::snapshot::DEFAULT_SNAPSHOT_PATH;
use crate::state::LotConfig;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::Level;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub app: AppSection,
    pub logging: LoggingSection,
    #[serde(default)]
    pub snapshot: Option<SnapshotSection>,
    #[serde(default)]
    pub simulation: Option<SimulationSection>,
    #[serde(default)]
    pub schedule: Option<ScheduleSection>,
    /// Lots to simulate, in output order. Empty means the built-in lots.
    #[serde(default)]
    pub lots: Vec<LotConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSection {
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSection {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SnapshotSection {
    /// Where the snapshot is written (default: data/simulated_data.json)
    pub output_path: Option<PathBuf>,
    /// Where the previous snapshot is read from (default: output_path)
    pub input_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SimulationSection {
    pub premium_count: Option<u32>,
    pub premium_release_probability: Option<f64>,
    pub premium_reclaim_probability: Option<f64>,
    pub standard_toggle_probability: Option<f64>,
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScheduleSection {
    #[serde(default)]
    pub bands: Vec<BandSection>,
    pub fallback: Option<RangeSection>,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct BandSection {
    pub start_minute: i64,
    pub end_minute: i64,
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct RangeSection {
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

pub fn load_default() -> Result<Config, ConfigError> {
    load_from_path(DEFAULT_CONFIG_PATH)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Check everything that would otherwise fail halfway through a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.log_level()?;
        self.transition_params()
            .validate()
            .map_err(ConfigError::Invalid)?;
        self.schedule()?;

        let mut seen = HashSet::new();
        for lot in &self.lots {
            if lot.lot_id.trim().is_empty() {
                return Err(ConfigError::Invalid("lot_id must not be empty".to_string()));
            }
            if !seen.insert(lot.lot_id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate lot_id: {}",
                    lot.lot_id
                )));
            }
        }
        Ok(())
    }

    pub fn log_level(&self) -> Result<Level, ConfigError> {
        Level::from_str(self.logging.level.trim()).map_err(|_| {
            ConfigError::Invalid(format!("unknown log level: {}", self.logging.level))
        })
    }

    /// Returns the configured lots, or the built-in lots if none are listed.
    pub fn lots(&self) -> Vec<LotConfig> {
        if self.lots.is_empty() {
            LotConfig::defaults()
        } else {
            self.lots.clone()
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.snapshot
            .as_ref()
            .and_then(|s| s.output_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT_PATH))
    }

    /// Returns the previous-snapshot path (default: the output path).
    pub fn input_path(&self) -> PathBuf {
        self.snapshot
            .as_ref()
            .and_then(|s| s.input_path.clone())
            .unwrap_or_else(|| self.output_path())
    }

    pub fn transition_params(&self) -> TransitionParams {
        let defaults = TransitionParams::default();
        let Some(section) = &self.simulation else {
            return defaults;
        };
        TransitionParams {
            premium_count: section.premium_count.unwrap_or(defaults.premium_count),
            premium_release_probability: section
                .premium_release_probability
                .unwrap_or(defaults.premium_release_probability),
            premium_reclaim_probability: section
                .premium_reclaim_probability
                .unwrap_or(defaults.premium_reclaim_probability),
            standard_toggle_probability: section
                .standard_toggle_probability
                .unwrap_or(defaults.standard_toggle_probability),
        }
    }

    pub fn seed(&self) -> Option<u64> {
        self.simulation.as_ref().and_then(|s| s.seed)
    }

    /// Returns the occupancy schedule, falling back to the built-in bands.
    pub fn schedule(&self) -> Result<OccupancySchedule, ConfigError> {
        let Some(section) = &self.schedule else {
            return Ok(OccupancySchedule::default());
        };
        let defaults = OccupancySchedule::default();
        let bands = if section.bands.is_empty() {
            defaults.bands().to_vec()
        } else {
            section
                .bands
                .iter()
                .map(|b| OccupancyBand::new(b.start_minute, b.end_minute, b.low, b.high))
                .collect()
        };
        let fallback = section
            .fallback
            .map(|r| OccupancyRange::new(r.low, r.high))
            .unwrap_or(defaults.fallback());
        OccupancySchedule::new(bands, fallback).map_err(ConfigError::Invalid)
    }
}
