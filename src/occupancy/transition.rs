//! Spot-state transitions toward a target available count.
//!
//! An update runs in two phases. Every spot first takes a noisy step from its
//! previous status (premium spots are sticky toward occupied, standard spots
//! toggle occasionally). The result is then corrected one spot at a time until
//! the available count matches the target, touching standard spots before
//! premium ones.

use crate::random::RandomSource;
use crate::state::{LotConfig, SpotClass, SpotRecord, SpotStatus};
use std::collections::HashMap;

pub const DEFAULT_PREMIUM_COUNT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionParams {
    /// Number of leading spots per lot treated as premium.
    pub premium_count: u32,
    /// Probability that an occupied premium spot becomes available.
    pub premium_release_probability: f64,
    /// Probability that an available premium spot becomes occupied.
    pub premium_reclaim_probability: f64,
    /// Probability that a standard spot toggles.
    pub standard_toggle_probability: f64,
}

impl Default for TransitionParams {
    fn default() -> Self {
        Self {
            premium_count: DEFAULT_PREMIUM_COUNT,
            premium_release_probability: 0.05,
            premium_reclaim_probability: 0.80,
            standard_toggle_probability: 0.2,
        }
    }
}

impl TransitionParams {
    /// Params with every flip disabled.
    pub fn frozen(premium_count: u32) -> Self {
        Self {
            premium_count,
            premium_release_probability: 0.0,
            premium_reclaim_probability: 0.0,
            standard_toggle_probability: 0.0,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let probabilities = [
            ("premium_release_probability", self.premium_release_probability),
            ("premium_reclaim_probability", self.premium_reclaim_probability),
            ("standard_toggle_probability", self.standard_toggle_probability),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{name} must be within 0-1, got {value}"));
            }
        }
        Ok(())
    }

    pub fn class_of(&self, index: u32) -> SpotClass {
        if index <= self.premium_count {
            SpotClass::Premium
        } else {
            SpotClass::Standard
        }
    }

    /// Noisy step for a single spot.
    pub fn step<R>(&self, class: SpotClass, previous: SpotStatus, rng: &mut R) -> SpotStatus
    where
        R: RandomSource + ?Sized,
    {
        match (class, previous) {
            (SpotClass::Premium, SpotStatus::Occupied) => {
                if rng.chance(self.premium_release_probability) {
                    SpotStatus::Available
                } else {
                    SpotStatus::Occupied
                }
            }
            (SpotClass::Premium, SpotStatus::Available) => {
                if rng.chance(self.premium_reclaim_probability) {
                    SpotStatus::Occupied
                } else {
                    SpotStatus::Available
                }
            }
            (SpotClass::Standard, status) => {
                if rng.chance(self.standard_toggle_probability) {
                    status.toggled()
                } else {
                    status
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TrackedSpot {
    spot_id: String,
    class: SpotClass,
    status: SpotStatus,
}

/// Result of one lot update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotUpdate {
    pub spots: Vec<SpotRecord>,
    pub target_available: i64,
    pub available: usize,
}

impl SpotUpdate {
    pub fn reached_target(&self) -> bool {
        i64::try_from(self.available).is_ok_and(|available| available == self.target_available)
    }
}

/// Produce the next status list for `lot`.
///
/// Spots missing from `previous` start out occupied; entries in `previous`
/// that do not belong to the lot are ignored. If the target cannot be reached
/// (negative, or above the spot count) the correction stops once no candidate
/// of the needed status is left.
pub fn update_state<R>(
    lot: &LotConfig,
    previous: Option<&[SpotRecord]>,
    target_available: i64,
    params: &TransitionParams,
    rng: &mut R,
) -> SpotUpdate
where
    R: RandomSource + ?Sized,
{
    let prior: HashMap<&str, SpotStatus> = previous
        .unwrap_or_default()
        .iter()
        .map(|spot| (spot.spot_id.as_str(), spot.status))
        .collect();

    let mut spots: Vec<TrackedSpot> = (1..=lot.total_spots)
        .map(|index| {
            let spot_id = lot.spot_id(index);
            let class = params.class_of(index);
            let previous = prior
                .get(spot_id.as_str())
                .copied()
                .unwrap_or(SpotStatus::Occupied);
            TrackedSpot {
                spot_id,
                class,
                status: previous,
            }
        })
        .collect();

    for spot in &mut spots {
        spot.status = params.step(spot.class, spot.status, rng);
    }

    let available = enforce_target(&mut spots, target_available, rng);

    SpotUpdate {
        spots: spots
            .into_iter()
            .map(|spot| SpotRecord {
                spot_id: spot.spot_id,
                status: spot.status,
            })
            .collect(),
        target_available,
        available,
    }
}

fn enforce_target<R>(spots: &mut [TrackedSpot], target: i64, rng: &mut R) -> usize
where
    R: RandomSource + ?Sized,
{
    let mut available = spots.iter().filter(|spot| spot.status.is_available()).count();

    if count_exceeds(available, target) {
        let mut pool = CandidatePool::collect(spots, SpotStatus::Available);
        while count_exceeds(available, target) {
            let Some(index) = pool.take(rng) else {
                break;
            };
            spots[index].status = SpotStatus::Occupied;
            available -= 1;
        }
    } else if count_below(available, target) {
        let mut pool = CandidatePool::collect(spots, SpotStatus::Occupied);
        while count_below(available, target) {
            let Some(index) = pool.take(rng) else {
                break;
            };
            spots[index].status = SpotStatus::Available;
            available += 1;
        }
    }

    available
}

fn count_exceeds(available: usize, target: i64) -> bool {
    i64::try_from(available).map_or(true, |available| available > target)
}

fn count_below(available: usize, target: i64) -> bool {
    i64::try_from(available).is_ok_and(|available| available < target)
}

/// Indices of spots holding one status, split by class.
///
/// A taken index is removed, so each spot flips at most once per correction.
#[derive(Debug)]
struct CandidatePool {
    standard: Vec<usize>,
    premium: Vec<usize>,
}

impl CandidatePool {
    fn collect(spots: &[TrackedSpot], status: SpotStatus) -> Self {
        let mut pool = Self {
            standard: Vec::new(),
            premium: Vec::new(),
        };
        for (index, spot) in spots.iter().enumerate() {
            if spot.status != status {
                continue;
            }
            match spot.class {
                SpotClass::Standard => pool.standard.push(index),
                SpotClass::Premium => pool.premium.push(index),
            }
        }
        pool
    }

    /// Uniformly remove a candidate, standard spots first.
    fn take<R>(&mut self, rng: &mut R) -> Option<usize>
    where
        R: RandomSource + ?Sized,
    {
        let candidates = if self.standard.is_empty() {
            &mut self.premium
        } else {
            &mut self.standard
        };
        if candidates.is_empty() {
            return None;
        }
        let slot = rng.pick(candidates.len());
        Some(candidates.swap_remove(slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SimRng;
    use crate::random::mock::ScriptedRandom;
    use std::collections::HashSet;
    use SpotStatus::{Available as A, Occupied as O};

    fn spots(lot_id: &str, statuses: &[SpotStatus]) -> Vec<SpotRecord> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, status)| SpotRecord {
                spot_id: format!("{lot_id}_Spot_{}", i + 1),
                status: *status,
            })
            .collect()
    }

    fn statuses(update: &SpotUpdate) -> Vec<SpotStatus> {
        update.spots.iter().map(|spot| spot.status).collect()
    }

    #[test]
    fn reachable_targets_are_hit_exactly() {
        let lot = LotConfig::new("Lot_A", "zone_1", 50);
        let params = TransitionParams::default();
        let mut rng = SimRng::from_seed_u64(99);
        let mut previous: Option<Vec<SpotRecord>> = None;

        for target in [0, 7, 25, 50, 3, 49] {
            let update = update_state(&lot, previous.as_deref(), target, &params, &mut rng);

            let counted = update.spots.iter().filter(|s| s.status.is_available()).count();
            assert_eq!(counted as i64, target);
            assert_eq!(update.available, counted);
            assert!(update.reached_target());
            previous = Some(update.spots);
        }
    }

    #[test]
    fn spot_ids_cover_lot_without_gaps() {
        let lot = LotConfig::new("Lot_C", "zone_3", 40);
        let mut rng = SimRng::from_seed_u64(4);

        let update = update_state(&lot, None, 12, &TransitionParams::default(), &mut rng);

        let ids: Vec<&str> = update.spots.iter().map(|s| s.spot_id.as_str()).collect();
        let expected: Vec<String> = (1..=40).map(|i| format!("Lot_C_Spot_{i}")).collect();
        assert_eq!(ids, expected);
        assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 40);
    }

    #[test]
    fn frozen_standard_spot_keeps_occupied_status() {
        let lot = LotConfig::new("Lot_A", "zone_1", 3);
        let previous = spots("Lot_A", &[O, A, O]);
        let mut rng = ScriptedRandom::constant(0.0);

        let update = update_state(
            &lot,
            Some(previous.as_slice()),
            1,
            &TransitionParams::frozen(0),
            &mut rng,
        );

        assert_eq!(statuses(&update), vec![O, A, O]);
    }

    #[test]
    fn certain_toggle_flips_every_standard_spot() {
        let lot = LotConfig::new("Lot_A", "zone_1", 4);
        let previous = spots("Lot_A", &[O, A, A, O]);
        let params = TransitionParams {
            standard_toggle_probability: 1.0,
            ..TransitionParams::frozen(0)
        };
        let mut rng = ScriptedRandom::constant(0.999);

        let update = update_state(&lot, Some(previous.as_slice()), 2, &params, &mut rng);

        assert_eq!(statuses(&update), vec![A, O, O, A]);
    }

    #[test]
    fn premium_spots_use_asymmetric_probabilities() {
        let params = TransitionParams::default();

        // A roll of 0.5 is above the release chance but below the reclaim chance.
        let mut rng = ScriptedRandom::constant(0.5);
        assert_eq!(params.step(SpotClass::Premium, O, &mut rng), O);
        assert_eq!(params.step(SpotClass::Premium, A, &mut rng), O);

        let mut rng = ScriptedRandom::constant(0.01);
        assert_eq!(params.step(SpotClass::Premium, O, &mut rng), A);

        let mut rng = ScriptedRandom::constant(0.9);
        assert_eq!(params.step(SpotClass::Premium, A, &mut rng), A);
    }

    #[test]
    fn standard_step_toggles_below_threshold() {
        let params = TransitionParams::default();

        let mut rng = ScriptedRandom::constant(0.1);
        assert_eq!(params.step(SpotClass::Standard, O, &mut rng), A);

        let mut rng = ScriptedRandom::constant(0.3);
        assert_eq!(params.step(SpotClass::Standard, O, &mut rng), O);
    }

    #[test]
    fn correction_prefers_standard_spots() {
        let lot = LotConfig::new("Lot_B", "zone_2", 4);
        let previous = spots("Lot_B", &[A, A, A, A]);
        let mut rng = ScriptedRandom::constant(0.5);

        let update = update_state(
            &lot,
            Some(previous.as_slice()),
            2,
            &TransitionParams::frozen(2),
            &mut rng,
        );

        assert_eq!(statuses(&update), vec![A, A, O, O]);
    }

    #[test]
    fn correction_falls_back_to_premium_spots() {
        let lot = LotConfig::new("Lot_B", "zone_2", 4);
        let previous = spots("Lot_B", &[O, O, O, O]);
        let mut rng = ScriptedRandom::constant(0.5);

        let update = update_state(
            &lot,
            Some(previous.as_slice()),
            3,
            &TransitionParams::frozen(2),
            &mut rng,
        );

        assert_eq!(statuses(&update), vec![A, O, A, A]);
    }

    #[test]
    fn correction_picks_among_candidates() {
        let lot = LotConfig::new("Lot_A", "zone_1", 3);
        let previous = spots("Lot_A", &[A, A, A]);
        let mut rng = ScriptedRandom::constant(0.5).with_picks([1]);

        let update = update_state(
            &lot,
            Some(previous.as_slice()),
            2,
            &TransitionParams::frozen(0),
            &mut rng,
        );

        assert_eq!(statuses(&update), vec![A, O, A]);
    }

    #[test]
    fn taken_candidate_leaves_the_pool() {
        let lot = LotConfig::new("Lot_A", "zone_1", 4);
        let previous = spots("Lot_A", &[A, A, A, A]);
        // Taking slot 1 moves the last candidate into its place, so the
        // fallback pick of slot 0 lands on the first spot.
        let mut rng = ScriptedRandom::constant(0.5).with_picks([1]);

        let update = update_state(
            &lot,
            Some(previous.as_slice()),
            2,
            &TransitionParams::frozen(0),
            &mut rng,
        );

        assert_eq!(statuses(&update), vec![O, O, A, A]);
    }

    #[test]
    fn large_lot_drains_each_spot_once() {
        let lot = LotConfig::new("Lot_L", "zone_1", 20_000);
        let previous = spots("Lot_L", &vec![A; 20_000]);
        let mut rng = SimRng::from_seed_u64(12);

        let update = update_state(
            &lot,
            Some(previous.as_slice()),
            0,
            &TransitionParams::frozen(10),
            &mut rng,
        );

        assert_eq!(update.available, 0);
        assert!(statuses(&update).iter().all(|status| !status.is_available()));
    }

    #[test]
    fn target_above_capacity_saturates() {
        let lot = LotConfig::new("Lot_A", "zone_1", 12);
        let mut rng = SimRng::from_seed_u64(21);

        let update = update_state(&lot, None, 17, &TransitionParams::default(), &mut rng);

        assert_eq!(update.available, 12);
        assert!(statuses(&update).iter().all(|status| status.is_available()));
        assert!(!update.reached_target());
    }

    #[test]
    fn negative_target_empties_lot() {
        let lot = LotConfig::new("Lot_A", "zone_1", 6);
        let previous = spots("Lot_A", &[A; 6]);
        let mut rng = SimRng::from_seed_u64(8);

        let update = update_state(
            &lot,
            Some(previous.as_slice()),
            -3,
            &TransitionParams::default(),
            &mut rng,
        );

        assert_eq!(update.available, 0);
        assert!(!update.reached_target());
    }

    #[test]
    fn empty_lot_yields_no_spots() {
        let lot = LotConfig::new("Lot_Z", "zone_9", 0);
        let mut rng = SimRng::from_seed_u64(1);

        let update = update_state(&lot, None, 0, &TransitionParams::default(), &mut rng);

        assert!(update.spots.is_empty());
        assert!(update.reached_target());
    }

    #[test]
    fn missing_previous_spots_default_to_occupied() {
        let lot = LotConfig::new("Lot_A", "zone_1", 3);
        let previous = vec![
            SpotRecord {
                spot_id: "Lot_A_Spot_2".to_string(),
                status: A,
            },
            SpotRecord {
                spot_id: "Lot_Q_Spot_1".to_string(),
                status: A,
            },
        ];
        let mut rng = ScriptedRandom::constant(0.5);

        let update = update_state(
            &lot,
            Some(previous.as_slice()),
            1,
            &TransitionParams::frozen(0),
            &mut rng,
        );

        assert_eq!(statuses(&update), vec![O, A, O]);
    }

    #[test]
    fn premium_count_is_capped_by_lot_size() {
        let params = TransitionParams::default();

        assert_eq!(params.class_of(1), SpotClass::Premium);
        assert_eq!(params.class_of(10), SpotClass::Premium);
        assert_eq!(params.class_of(11), SpotClass::Standard);

        let lot = LotConfig::new("Lot_S", "zone_1", 4);
        let previous = spots("Lot_S", &[A, A, A, A]);
        let mut rng = ScriptedRandom::constant(0.5);
        let update = update_state(&lot, Some(previous.as_slice()), 1, &params, &mut rng);

        // All four spots are premium, so the reclaim roll pulls them occupied
        // and the correction releases exactly one.
        assert_eq!(update.available, 1);
    }

    #[test]
    fn validate_rejects_out_of_range_probability() {
        let params = TransitionParams {
            standard_toggle_probability: 1.5,
            ..TransitionParams::default()
        };

        assert!(params.validate().is_err());
        assert!(TransitionParams::default().validate().is_ok());
    }
}
