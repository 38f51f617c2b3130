//! Time-of-day occupancy targets.
//!
//! A schedule maps minutes since midnight to a uniform occupancy range. The
//! first band containing the minute wins; minutes outside every band use the
//! fallback range.

use crate::random::RandomSource;

pub mod transition;

pub const MINUTES_PER_DAY: i64 = 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OccupancyRange {
    pub low: f64,
    pub high: f64,
}

impl OccupancyRange {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.low) || !(0.0..=1.0).contains(&self.high) {
            return Err(format!(
                "occupancy range {}-{} must lie within 0-1",
                self.low, self.high
            ));
        }
        if self.low > self.high {
            return Err(format!(
                "occupancy range low {} exceeds high {}",
                self.low, self.high
            ));
        }
        Ok(())
    }
}

/// Half-open `[start_minute, end_minute)` band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OccupancyBand {
    pub start_minute: i64,
    pub end_minute: i64,
    pub range: OccupancyRange,
}

impl OccupancyBand {
    pub const fn new(start_minute: i64, end_minute: i64, low: f64, high: f64) -> Self {
        Self {
            start_minute,
            end_minute,
            range: OccupancyRange::new(low, high),
        }
    }

    pub fn covers(&self, minutes: i64) -> bool {
        (self.start_minute..self.end_minute).contains(&minutes)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OccupancySchedule {
    bands: Vec<OccupancyBand>,
    fallback: OccupancyRange,
}

impl Default for OccupancySchedule {
    fn default() -> Self {
        Self {
            bands: vec![
                OccupancyBand::new(420, 570, 0.40, 0.55),  // 07:00 morning arrivals
                OccupancyBand::new(570, 720, 0.85, 0.95),  // 09:30 peak
                OccupancyBand::new(720, 930, 0.80, 0.90),  // 12:00 midday
                OccupancyBand::new(930, 1020, 0.60, 0.75), // 15:30 departures
            ],
            fallback: OccupancyRange::new(0.20, 0.35),
        }
    }
}

impl OccupancySchedule {
    pub fn new(bands: Vec<OccupancyBand>, fallback: OccupancyRange) -> Result<Self, String> {
        for band in &bands {
            if band.start_minute >= band.end_minute {
                return Err(format!(
                    "band {}-{} is empty",
                    band.start_minute, band.end_minute
                ));
            }
            band.range.validate()?;
        }
        fallback.validate()?;
        Ok(Self { bands, fallback })
    }

    pub fn bands(&self) -> &[OccupancyBand] {
        &self.bands
    }

    pub fn fallback(&self) -> OccupancyRange {
        self.fallback
    }

    /// Occupancy range in effect at `minutes` since midnight.
    pub fn range_at(&self, minutes: i64) -> OccupancyRange {
        self.bands
            .iter()
            .find(|band| band.covers(minutes))
            .map(|band| band.range)
            .unwrap_or(self.fallback)
    }

    /// Draw a target occupancy fraction for a lot.
    ///
    /// `_total_spots` is accepted for callers that size targets per lot; the
    /// draw only depends on the time of day.
    pub fn target_occupancy<R>(&self, _total_spots: u32, minutes: i64, rng: &mut R) -> f64
    where
        R: RandomSource + ?Sized,
    {
        let range = self.range_at(minutes);
        rng.uniform(range.low, range.high)
    }
}

/// `floor(total_spots * (1 - occupancy))`.
pub fn target_available(total_spots: u32, occupancy: f64) -> i64 {
    (f64::from(total_spots) * (1.0 - occupancy)).floor() as i64
}
