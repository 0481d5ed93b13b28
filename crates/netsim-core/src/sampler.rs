//! Replaces the "callable, constant, or iterable" distribution parameters
//! of the source system with a single tagged abstraction.

use std::collections::VecDeque;

/// A source of numbers for inter-arrival intervals or packet sizes.
///
/// `Constant` always returns the same value. `Callable` wraps a closure
/// (e.g. a seeded RNG draw) that is called once per `sample()`. `Drained`
/// holds a finite, ordered sequence; once exhausted it always returns
/// `None`, matching the reference's "exhaustion terminates that stream"
/// behavior for a finite interval or size sequence.
pub enum Sampler {
    Constant(f64),
    Callable(Box<dyn FnMut() -> f64 + Send>),
    Drained(VecDeque<f64>),
}

impl Sampler {
    pub fn constant(value: f64) -> Self {
        Sampler::Constant(value)
    }

    pub fn callable(f: impl FnMut() -> f64 + Send + 'static) -> Self {
        Sampler::Callable(Box::new(f))
    }

    pub fn drained(values: impl IntoIterator<Item = f64>) -> Self {
        Sampler::Drained(values.into_iter().collect())
    }

    /// Draw the next value, or `None` if this sampler's stream is
    /// exhausted (only possible for `Drained`).
    pub fn sample(&mut self) -> Option<f64> {
        match self {
            Sampler::Constant(v) => Some(*v),
            Sampler::Callable(f) => Some(f()),
            Sampler::Drained(queue) => queue.pop_front(),
        }
    }
}

impl std::fmt::Debug for Sampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sampler::Constant(v) => write!(f, "Sampler::Constant({v})"),
            Sampler::Callable(_) => write!(f, "Sampler::Callable(..)"),
            Sampler::Drained(q) => write!(f, "Sampler::Drained({q:?})"),
        }
    }
}
