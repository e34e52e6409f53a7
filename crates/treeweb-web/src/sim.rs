//! Simulated drifting measurements.
//!
//! [`step`] is a pure random-walk transition. [`StateStore`] owns the
//! current state, throttles how often it advances, and produces the JSON
//! snapshot served by `/getstate`.

use crate::{AppConfig, WebError};
use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

pub const VALUE_MIN: f64 = 0.0;
pub const VALUE_MAX: f64 = 10.0;
pub const STEP_SIZE_MAX: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SimState {
    pub values: Vec<f64>,
    pub stepsize: f64,
    pub count: u64,
}

impl SimState {
    /// Every value starts uniformly in `[0, 10)`, rounded to two decimals.
    pub fn new<R: Rng + ?Sized>(nitems: usize, stepsize: f64, rng: &mut R) -> Self {
        Self {
            values: (0..nitems)
                .map(|_| round2(rng.gen_range(VALUE_MIN..VALUE_MAX)))
                .collect(),
            stepsize,
            count: 0,
        }
    }

    pub fn step_choices(&self) -> [f64; 3] {
        [-self.stepsize, 0.0, self.stepsize]
    }
}

/// Move every value by `-stepsize`, `0` or `+stepsize`, round to two
/// decimals, clamp to `[0, 10]`, and bump the counter.
pub fn step<R: Rng + ?Sized>(state: &SimState, rng: &mut R) -> SimState {
    let choices = state.step_choices();
    let values = state
        .values
        .iter()
        .map(|v| {
            let delta = choices.choose(rng).copied().unwrap_or(0.0);
            round2(v + delta).clamp(VALUE_MIN, VALUE_MAX)
        })
        .collect();
    SimState {
        values,
        stepsize: state.stepsize,
        count: state.count + 1,
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Parse a submitted step size. Must be a finite number in `[0, 10]`.
pub fn parse_step_size(raw: &str) -> Result<f64, WebError> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && (0.0..=STEP_SIZE_MAX).contains(&v) => Ok(v),
        _ => Err(WebError::InvalidStepSize(raw.to_string())),
    }
}

/// The `/getstate` payload: `item0..itemN` followed by the bookkeeping
/// fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    #[serde(flatten)]
    pub items: IndexMap<String, f64>,
    pub count: u64,
    pub stepsize: f64,
    pub step: [f64; 3],
    /// Seconds since the epoch. Clients reload when this increases.
    pub server_start_time: f64,
}

#[derive(Debug)]
pub struct StateStore {
    keys: Vec<String>,
    state: SimState,
    rng: StdRng,
    last_update: Instant,
    min_interval: Duration,
    server_start_time: f64,
}

impl StateStore {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_rng(config: &AppConfig, mut rng: StdRng) -> Self {
        let state = SimState::new(config.nitems, config.stepsize, &mut rng);
        Self {
            keys: config.state_keys(),
            state,
            rng,
            last_update: Instant::now(),
            min_interval: Duration::from_millis(config.min_update_interval_ms),
            server_start_time: epoch_seconds(),
        }
    }

    /// Advance the walk if at least the minimum interval has passed since
    /// the last advance, then return the current snapshot.
    pub fn poll(&mut self, now: Instant) -> Snapshot {
        if now.saturating_duration_since(self.last_update) >= self.min_interval {
            self.last_update = now;
            self.state = step(&self.state, &mut self.rng);
        }
        self.snapshot()
    }

    pub fn set_step_size(&mut self, stepsize: f64) {
        log::debug!("step size {} -> {}", self.state.stepsize, stepsize);
        self.state.stepsize = stepsize;
    }

    /// Re-seed the walk from a new config and move `server_start_time`
    /// forward so polling clients reload.
    pub fn restart(&mut self, config: &AppConfig) {
        self.keys = config.state_keys();
        self.state = SimState::new(config.nitems, config.stepsize, &mut self.rng);
        self.min_interval = Duration::from_millis(config.min_update_interval_ms);
        self.last_update = Instant::now();
        self.server_start_time = epoch_seconds().max(self.server_start_time + 0.001);
        log::info!("simulation restarted with {} items", self.keys.len());
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn server_start_time(&self) -> f64 {
        self.server_start_time
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            items: self
                .keys
                .iter()
                .cloned()
                .zip(self.state.values.iter().copied())
                .collect(),
            count: self.state.count,
            stepsize: self.state.stepsize,
            step: self.state.step_choices(),
            server_start_time: self.server_start_time,
        }
    }
}

fn epoch_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}
