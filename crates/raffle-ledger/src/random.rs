//! Randomness sources for win/lose draws

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use raffle_domain::RandomSource;
use std::collections::VecDeque;

/// Draws from the thread-local OS-seeded generator
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn draw(&mut self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Reproducible draws from a seeded ChaCha8 stream
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    /// Create a source that always yields the same sequence for `seed`
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn draw(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Scripted draws, for tests and replays
///
/// Yields the queued values in order, then keeps repeating the last one.
///
/// # Examples
///
/// ```
/// use raffle_domain::RandomSource;
/// use raffle_ledger::FixedRandom;
///
/// let mut source = FixedRandom::sequence([0.9, 0.1]);
/// assert_eq!(source.draw(), 0.9);
/// assert_eq!(source.draw(), 0.1);
/// assert_eq!(source.draw(), 0.1);
/// ```
#[derive(Debug, Clone)]
pub struct FixedRandom {
    queue: VecDeque<f64>,
    last: f64,
}

impl FixedRandom {
    /// Largest draw below 1.0; loses against any probability under 1.0
    const HIGHEST: f64 = 1.0 - f64::EPSILON / 2.0;

    /// Always yield `value` (clamped into `[0.0, 1.0)`)
    pub fn always(value: f64) -> Self {
        Self::sequence([value])
    }

    /// Every draw wins unless the win probability is zero
    pub fn always_win() -> Self {
        Self::always(0.0)
    }

    /// Every draw loses unless the win probability is one
    pub fn always_lose() -> Self {
        Self::always(Self::HIGHEST)
    }

    /// Yield `values` in order, then repeat the last one
    pub fn sequence(values: impl IntoIterator<Item = f64>) -> Self {
        let queue: VecDeque<f64> = values.into_iter().map(|v| v.clamp(0.0, Self::HIGHEST)).collect();
        let last = queue.back().copied().unwrap_or(0.0);
        Self { queue, last }
    }
}

impl RandomSource for FixedRandom {
    fn draw(&mut self) -> f64 {
        if let Some(value) = self.queue.pop_front() {
            self.last = value;
        }
        self.last
    }
}
