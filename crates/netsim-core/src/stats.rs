//! Concrete statistics containers.
//!
//! The distilled specification treats `Intervals`/`Statistic`/`Trace` as
//! external collaborators behind a narrow record/append interface. For a
//! complete, runnable crate they need a concrete shape; since every module
//! needs exactly one of these three fixed shapes (never a custom or
//! swappable implementation), they are plain structs here rather than
//! `dyn Trait` objects. Each exposes no public mutator beyond its single
//! recording method, so a module's statistics cannot be reassigned or
//! corrupted from outside.

/// Records successive timestamps and exposes the deltas between them.
#[derive(Debug, Clone)]
pub struct Intervals {
    last: Option<f64>,
    deltas: Vec<f64>,
}

impl Default for Intervals {
    fn default() -> Self {
        Self {
            last: Some(0.0),
            deltas: Vec::new(),
        }
    }
}

impl Intervals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new timestamp, appending `now - last` to the recorded
    /// deltas. `last` starts at the simulation's start time (0.0), so the
    /// first call records the delta from t=0, not just from the previous
    /// call.
    pub fn record(&mut self, now: f64) {
        if let Some(last) = self.last {
            self.deltas.push(now - last);
        }
        self.last = Some(now);
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.deltas
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    pub fn mean(&self) -> f64 {
        mean(&self.deltas)
    }
}

/// Records a running sequence of sampled values.
#[derive(Debug, Clone, Default)]
pub struct Statistic {
    values: Vec<f64>,
}

impl Statistic {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, x: f64) {
        self.values.push(x);
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn mean(&self) -> f64 {
        mean(&self.values)
    }
}

/// Records `(time, value)` samples, used for queue occupancy, transceiver
/// busy state, and any other step function over simulated time.
#[derive(Debug, Clone, Default)]
pub struct Trace {
    samples: Vec<(f64, f64)>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, time: f64, value: f64) {
        self.samples.push((time, value));
    }

    pub fn as_slice(&self) -> &[(f64, f64)] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn mean(&self) -> f64 {
        mean(&self.samples.iter().map(|(_, v)| *v).collect::<Vec<_>>())
    }

    /// Time-weighted average: each recorded value is weighted by how long
    /// it held until the next sample (or, for the last sample, until
    /// `end_time`). Needs at least two samples to be non-trivial; with a
    /// single sample the value is returned as-is.
    pub fn timeavg(&self) -> f64 {
        self.timeavg_until(self.samples.last().map(|(t, _)| *t).unwrap_or(0.0))
    }

    pub fn timeavg_until(&self, end_time: f64) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        if self.samples.len() == 1 {
            return self.samples[0].1;
        }
        let mut weighted = 0.0;
        let mut span = 0.0;
        for window in self.samples.windows(2) {
            let (t0, v0) = window[0];
            let (t1, _) = window[1];
            weighted += v0 * (t1 - t0);
            span += t1 - t0;
        }
        let (last_t, last_v) = *self.samples.last().unwrap();
        if end_time > last_t {
            weighted += last_v * (end_time - last_t);
            span += end_time - last_t;
        }
        if span == 0.0 { last_v } else { weighted / span }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intervals_record_deltas_from_simulation_start() {
        let mut intervals = Intervals::new();
        intervals.record(10.0);
        intervals.record(22.0);
        intervals.record(37.0);
        intervals.record(54.0);
        assert_eq!(intervals.as_slice(), &[10.0, 12.0, 15.0, 17.0]);
    }

    #[test]
    fn statistic_appends_in_order() {
        let mut stat = Statistic::new();
        stat.append(123.0);
        stat.append(412.0);
        assert_eq!(stat.as_slice(), &[123.0, 412.0]);
        assert!((stat.mean() - 267.5).abs() < 1e-9);
    }

    #[test]
    fn trace_records_time_value_pairs() {
        let mut trace = Trace::new();
        trace.record(0.0, 0.0);
        trace.record(7.0, 1.0);
        trace.record(8.0, 2.0);
        assert_eq!(trace.as_slice(), &[(0.0, 0.0), (7.0, 1.0), (8.0, 2.0)]);
    }

    #[test]
    fn trace_timeavg_weights_by_duration() {
        let mut trace = Trace::new();
        trace.record(0.0, 0.0);
        trace.record(1.0, 1.0); // held value 0 for 1 unit
        assert!((trace.timeavg_until(2.0) - 0.5).abs() < 1e-9); // 0*1 + 1*1 over span 2
    }
}
