// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Fault-injection decisions for the driver.
//!
//! The driver never draws random numbers itself; it asks a [`ChaosSource`]
//! for the colour flags and the failure flag of every call.

use colour_core::record::ColourChoice;
use rand::Rng;

/// Decides the randomized inputs of each record service call.
pub trait ChaosSource: Send + Sync {
    /// Colour flags for a create or update.
    fn colour_choice(&self) -> ColourChoice;

    /// Whether the next call should request a simulated failure.
    fn simulate_failure(&self) -> bool;
}

/// Independent coin flips per colour flag, failure with a fixed probability.
#[derive(Debug, Clone, Copy)]
pub struct RandomChaos {
    failure_rate: f64,
}

impl RandomChaos {
    /// Create a source failing with probability `failure_rate`, clamped to
    /// `0.0..=1.0`.
    pub fn new(failure_rate: f64) -> Self {
        let failure_rate = if failure_rate.is_nan() {
            0.0
        } else {
            failure_rate.clamp(0.0, 1.0)
        };
        Self { failure_rate }
    }

    /// The failure probability in use.
    pub fn failure_rate(&self) -> f64 {
        self.failure_rate
    }
}

impl Default for RandomChaos {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_FAILURE_RATE)
    }
}

impl ChaosSource for RandomChaos {
    fn colour_choice(&self) -> ColourChoice {
        let mut rng = rand::thread_rng();
        ColourChoice::new(rng.gen_bool(0.5), rng.gen_bool(0.5))
    }

    fn simulate_failure(&self) -> bool {
        rand::thread_rng().gen_bool(self.failure_rate)
    }
}

/// Constant decisions, for tests and demos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedChaos {
    /// Flags returned for every write.
    pub choice: ColourChoice,
    /// Failure flag returned for every call.
    pub fail: bool,
}

impl FixedChaos {
    /// Always RED, never failing.
    pub fn happy() -> Self {
        Self {
            choice: ColourChoice::new(true, false),
            fail: false,
        }
    }

    /// Always the given flags, never failing.
    pub fn with_choice(choice: ColourChoice) -> Self {
        Self {
            choice,
            fail: false,
        }
    }

    /// Every call requests a simulated failure.
    pub fn always_failing() -> Self {
        Self {
            choice: ColourChoice::new(true, false),
            fail: true,
        }
    }
}

impl ChaosSource for FixedChaos {
    fn colour_choice(&self) -> ColourChoice {
        self.choice
    }

    fn simulate_failure(&self) -> bool {
        self.fail
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colour_core::record::Colour;

    #[test]
    fn test_fixed_chaos() {
        let chaos = FixedChaos::with_choice(ColourChoice::new(false, true));
        assert_eq!(chaos.colour_choice().classify(), Colour::Blue);
        assert!(!chaos.simulate_failure());
        assert!(FixedChaos::always_failing().simulate_failure());
    }

    #[test]
    fn test_random_chaos_extremes() {
        let never = RandomChaos::new(0.0);
        let always = RandomChaos::new(1.0);
        for _ in 0..100 {
            assert!(!never.simulate_failure());
            assert!(always.simulate_failure());
        }
    }

    #[test]
    fn test_random_chaos_clamps_rate() {
        assert_eq!(RandomChaos::new(2.0).failure_rate(), 1.0);
        assert_eq!(RandomChaos::new(-1.0).failure_rate(), 0.0);
        assert_eq!(RandomChaos::new(f64::NAN).failure_rate(), 0.0);
        assert_eq!(RandomChaos::default().failure_rate(), 0.1);
    }

    #[test]
    fn test_random_chaos_produces_every_colour() {
        let chaos = RandomChaos::default();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            seen.insert(chaos.colour_choice().classify());
        }
        assert_eq!(seen.len(), 4);
    }
}
