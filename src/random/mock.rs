use crate::random::RandomSource;
use std::collections::VecDeque;

/// Scripted random source for tests.
///
/// Queued values are consumed in order; once a queue is empty the fallback
/// value for that kind of draw is returned.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    rolls: VecDeque<f64>,
    picks: VecDeque<usize>,
    fallback_roll: f64,
    fallback_pick: usize,
}

impl ScriptedRandom {
    /// Every roll returns `roll`, every pick returns the first candidate.
    pub fn constant(roll: f64) -> Self {
        Self {
            rolls: VecDeque::new(),
            picks: VecDeque::new(),
            fallback_roll: roll,
            fallback_pick: 0,
        }
    }

    pub fn with_rolls(mut self, rolls: impl IntoIterator<Item = f64>) -> Self {
        self.rolls.extend(rolls);
        self
    }

    pub fn with_picks(mut self, picks: impl IntoIterator<Item = usize>) -> Self {
        self.picks.extend(picks);
        self
    }

    pub fn with_fallback_pick(mut self, pick: usize) -> Self {
        self.fallback_pick = pick;
        self
    }
}

impl RandomSource for ScriptedRandom {
    fn roll(&mut self) -> f64 {
        self.rolls.pop_front().unwrap_or(self.fallback_roll)
    }

    /// Maps the next roll linearly onto `[low, high]`.
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        let t = self.roll().clamp(0.0, 1.0);
        low + (high - low) * t
    }

    fn pick(&mut self, len: usize) -> usize {
        let index = self.picks.pop_front().unwrap_or(self.fallback_pick);
        index.min(len.saturating_sub(1))
    }
}
