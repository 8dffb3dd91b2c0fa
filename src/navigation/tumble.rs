// src/navigation/tumble.rs
// Random reorientation used when the light gradient stops improving.

use rand::Rng;
use std::f64::consts::PI;

use super::{Heading, TumbleDistribution};

/// Draws tumble headings from an injected random source
#[derive(Debug, Clone)]
pub struct TumbleGenerator {
    distribution: TumbleDistribution,
    speed: f64,
}

impl TumbleGenerator {
    /// `speed` is the crawl speed flown on the tumble tick.
    pub fn new(distribution: TumbleDistribution, speed: f64) -> Self {
        TumbleGenerator {
            distribution,
            speed,
        }
    }

    /// Picks a new heading. `from` is the heading being abandoned; the uniform
    /// distribution ignores it.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R, from: f64) -> Heading {
        let angle = match self.distribution {
            TumbleDistribution::Uniform => rng.gen_range(-PI..PI),
            TumbleDistribution::Relative { max_turn } => {
                let turn = rng.gen_range(0.0..max_turn);
                if rng.gen_bool(0.5) { from + turn } else { from - turn }
            }
        };
        Heading::new(angle, self.speed)
    }

    /// Configured heading distribution.
    pub fn distribution(&self) -> TumbleDistribution {
        self.distribution
    }
}
