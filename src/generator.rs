//! One regeneration pass over every configured lot.

use crate::clock;
use crate::config::{Config, ConfigError};
use crate::error::AppError;
use crate::occupancy::transition::{TransitionParams, update_state};
use crate::occupancy::{OccupancySchedule, target_available};
use crate::random::{RandomSource, SimRng};
use crate::snapshot::{load_snapshot, write_snapshot};
use crate::state::{LotConfig, LotRecord, find_lot};
use std::path::PathBuf;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct Simulator {
    lots: Vec<LotConfig>,
    schedule: OccupancySchedule,
    params: TransitionParams,
}

impl Simulator {
    pub fn new(lots: Vec<LotConfig>, schedule: OccupancySchedule, params: TransitionParams) -> Self {
        Self {
            lots,
            schedule,
            params,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(
            config.lots(),
            config.schedule()?,
            config.transition_params(),
        ))
    }

    pub fn lots(&self) -> &[LotConfig] {
        &self.lots
    }

    /// Build the next snapshot from `previous` without touching the filesystem.
    ///
    /// Each lot is matched to its previous record by `lot_id`; lots without one
    /// start from an all-occupied state.
    pub fn generate_records<R>(
        &self,
        previous: Option<&[LotRecord]>,
        minutes: i64,
        updated_at: &str,
        rng: &mut R,
    ) -> Vec<LotRecord>
    where
        R: RandomSource + ?Sized,
    {
        self.lots
            .iter()
            .map(|lot| self.generate_lot(lot, previous, minutes, updated_at, rng))
            .collect()
    }

    fn generate_lot<R>(
        &self,
        lot: &LotConfig,
        previous: Option<&[LotRecord]>,
        minutes: i64,
        updated_at: &str,
        rng: &mut R,
    ) -> LotRecord
    where
        R: RandomSource + ?Sized,
    {
        let occupancy = self
            .schedule
            .target_occupancy(lot.total_spots, minutes, rng);
        let target = target_available(lot.total_spots, occupancy);
        let previous_spots = previous
            .and_then(|records| find_lot(records, &lot.lot_id))
            .map(|record| record.parking_status.as_slice());
        if previous_spots.is_none() {
            debug!(lot_id = %lot.lot_id, "No previous state for lot");
        }

        let update = update_state(lot, previous_spots, target, &self.params, rng);
        if !update.reached_target() {
            warn!(
                lot_id = %lot.lot_id,
                target_available = target,
                available = update.available,
                "Target availability unreachable, reporting achieved count"
            );
        }
        info!(
            lot_id = %lot.lot_id,
            occupancy = format_args!("{occupancy:.3}"),
            available = update.available,
            total = lot.total_spots,
            "Lot updated"
        );

        LotRecord {
            lot_id: lot.lot_id.clone(),
            zone_type: lot.zone_id.clone(),
            total_spots: lot.total_spots,
            available_spots: u32::try_from(update.available).unwrap_or(lot.total_spots),
            updated_at: updated_at.to_string(),
            parking_status: update.spots,
        }
    }
}

/// Per-invocation inputs that do not come from the config file.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Raw decimal-hour override, e.g. `"14.5"`.
    pub debug_hour: Option<String>,
    /// Seed overriding `simulation.seed`.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub minutes: i64,
    pub output_path: PathBuf,
    pub records: Vec<LotRecord>,
}

/// Seed for this run: `--seed` first, then `simulation.seed`.
pub fn effective_seed(config: &Config, options: &RunOptions) -> Option<u64> {
    options.seed.or(config.seed())
}

/// Seeded generator when a seed is configured, entropy otherwise.
pub fn seed_rng(config: &Config, options: &RunOptions) -> SimRng {
    match effective_seed(config, options) {
        Some(seed) => {
            info!(seed, "Using fixed seed");
            SimRng::from_seed_u64(seed)
        }
        None => SimRng::from_entropy(),
    }
}

/// Read the previous snapshot, regenerate every lot and replace the snapshot.
pub fn run(config: &Config, options: &RunOptions) -> Result<RunSummary, AppError> {
    let mut rng = seed_rng(config, options);
    run_at(config, options, clock::local_now(), &mut rng)
}

pub fn run_at<R>(
    config: &Config,
    options: &RunOptions,
    now: OffsetDateTime,
    rng: &mut R,
) -> Result<RunSummary, AppError>
where
    R: RandomSource + ?Sized,
{
    let simulator = Simulator::from_config(config)?;
    let minutes = clock::resolve_minutes(options.debug_hour.as_deref(), now);
    let updated_at = clock::format_timestamp(now)?;

    let input_path = config.input_path();
    let previous = load_snapshot(&input_path)?;
    info!(
        minutes,
        lots = simulator.lots().len(),
        previous = previous.is_some(),
        input = %input_path.display(),
        "Generating parking data"
    );

    let records = simulator.generate_records(previous.as_deref(), minutes, &updated_at, rng);

    let output_path = config.output_path();
    write_snapshot(&output_path, &records)?;
    info!(output = %output_path.display(), "Parking data generated");

    Ok(RunSummary {
        minutes,
        output_path,
        records,
    })
}
