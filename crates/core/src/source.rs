//! Producers of detected speeds.
//!
//! A [`SpeedSource`] stands in for the sensor adapter. The monitor never
//! talks to a source directly; the caller pulls a speed and passes it to
//! [`SpeedMonitor::evaluate`](crate::speed::monitor::SpeedMonitor::evaluate).

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::speed::config::Configuration;
use crate::types::Mph;

/// Default width of the simulated speed range above the limit.
pub const DEFAULT_SIMULATION_SPREAD: Mph = 20.0;

/// Something that can produce the next detected vehicle speed.
pub trait SpeedSource: Send {
    /// Next speed, or `None` once the source is exhausted.
    ///
    /// `configuration` is the monitor's current configuration, for sources
    /// that generate speeds relative to the limit.
    fn next_speed(&mut self, configuration: &Configuration) -> Option<Mph>;
}

/// Uniformly random speeds in `[speed_limit, speed_limit + spread)`.
#[derive(Debug)]
pub struct RandomSpeedSource {
    rng: StdRng,
    spread: Mph,
}

impl RandomSpeedSource {
    /// Entropy-seeded source.
    pub fn new(spread: Mph) -> Self {
        Self {
            rng: StdRng::from_rng(&mut rand::rng()),
            spread,
        }
    }

    /// Deterministic source, for reproducible simulations and tests.
    pub fn seeded(spread: Mph, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            spread,
        }
    }
}

impl Default for RandomSpeedSource {
    fn default() -> Self {
        Self::new(DEFAULT_SIMULATION_SPREAD)
    }
}

impl SpeedSource for RandomSpeedSource {
    fn next_speed(&mut self, configuration: &Configuration) -> Option<Mph> {
        let offset: f64 = self.rng.random::<f64>() * self.spread;
        Some(configuration.speed_limit + offset)
    }
}

/// Replays a fixed list of speeds, then reports exhaustion.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSpeedSource {
    speeds: VecDeque<Mph>,
}

impl ScriptedSpeedSource {
    pub fn new(speeds: impl IntoIterator<Item = Mph>) -> Self {
        Self {
            speeds: speeds.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.speeds.len()
    }
}

impl SpeedSource for ScriptedSpeedSource {
    fn next_speed(&mut self, _configuration: &Configuration) -> Option<Mph> {
        self.speeds.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_speeds_stay_within_spread_above_limit() {
        let cfg = Configuration {
            speed_limit: 30.0,
            threshold: 5.0,
        };
        let mut source = RandomSpeedSource::seeded(20.0, 7);
        for _ in 0..500 {
            let speed = source.next_speed(&cfg).expect("random source never ends");
            assert!((30.0..50.0).contains(&speed), "speed {speed} out of range");
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let cfg = Configuration::DEFAULT;
        let mut a = RandomSpeedSource::seeded(20.0, 42);
        let mut b = RandomSpeedSource::seeded(20.0, 42);
        for _ in 0..10 {
            assert_eq!(a.next_speed(&cfg), b.next_speed(&cfg));
        }
    }

    #[test]
    fn scripted_source_replays_then_ends() {
        let cfg = Configuration::DEFAULT;
        let mut source = ScriptedSpeedSource::new([36.0, 34.0]);
        assert_eq!(source.remaining(), 2);
        assert_eq!(source.next_speed(&cfg), Some(36.0));
        assert_eq!(source.next_speed(&cfg), Some(34.0));
        assert_eq!(source.next_speed(&cfg), None);
    }
}
