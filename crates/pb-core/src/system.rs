//! Production implementations of the clock and randomness ports.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::traits::{Clock, RandomSource};

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Uniform picks from the thread-local generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick(&self, n: usize) -> usize {
        rand::rng().random_range(0..n)
    }
}
