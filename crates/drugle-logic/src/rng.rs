//! Injectable random sources.
//!
//! Every function that needs randomness takes a [`RandomSource`]: a supplier
//! of uniform floats in `[0, 1)`. Closures implement it directly, any
//! [`rand::Rng`] can be wrapped in [`RngSource`], and [`ScriptedSource`]
//! replays fixed values so tests can force each branch of a probability gate.

use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};

/// Supplier of uniform floats in `[0, 1)`.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

impl<F: FnMut() -> f64> RandomSource for F {
    fn next_unit(&mut self) -> f64 {
        self()
    }
}

/// Adapter over any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl RngSource<ThreadRng> {
    pub fn thread() -> Self {
        Self(rand::thread_rng())
    }
}

impl RngSource<StdRng> {
    /// Reproducible source for harness runs.
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_unit(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// Replays a fixed list of values, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    values: Vec<f64>,
    next: usize,
}

impl ScriptedSource {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            next: 0,
        }
    }

    /// Number of values handed out so far.
    pub fn draws(&self) -> usize {
        self.next
    }
}

impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.next % self.values.len()];
        self.next += 1;
        v
    }
}

/// Draw one value, forcing it into `[0, 1)`. NaN reads as `0.0`.
pub fn unit<R: RandomSource + ?Sized>(rng: &mut R) -> f64 {
    let v = rng.next_unit();
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

/// Uniform index into a collection of `len` items, `None` when empty.
pub fn pick_index<R: RandomSource + ?Sized>(rng: &mut R, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let idx = (unit(rng) * len as f64) as usize;
    Some(idx.min(len - 1))
}

/// True with probability `p` (clamped to `[0, 1]`).
pub fn chance<R: RandomSource + ?Sized>(rng: &mut R, p: f64) -> bool {
    unit(rng) < p.clamp(0.0, 1.0)
}
