use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::error::{non_negative, ordered, positive, ConfigError};

#[derive(Clone, Copy, Debug)]
pub struct GridLoadConfig {
    /// kW
    pub initial_load: f64,
    /// Largest per-tick random walk step, kW.
    pub walk_step: f64,
    pub min_load: f64,
    pub max_load: f64,
    /// Simulated seconds until the first spike.
    pub first_spike_after: f64,
    pub spike_interval_min: f64,
    pub spike_interval_max: f64,
    pub spike_duration: f64,
    /// Spike height at onset, kW. Decays linearly to 0 over `spike_duration`.
    pub spike_magnitude: f64,
}

impl Default for GridLoadConfig {
    fn default() -> Self {
        Self {
            initial_load: 1000.0,
            walk_step: 12.0,
            min_load: 800.0,
            max_load: 2100.0,
            first_spike_after: 10.0,
            spike_interval_min: 10.0,
            spike_interval_max: 15.0,
            spike_duration: 10.0,
            spike_magnitude: 1000.0,
        }
    }
}

impl GridLoadConfig {
    /// Flat demand: no walk, no spikes.
    pub fn steady(load: f64) -> Self {
        Self {
            initial_load: load,
            walk_step: 0.0,
            min_load: load,
            max_load: load,
            spike_magnitude: 0.0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("walk_step", self.walk_step)?;
        non_negative("min_load", self.min_load)?;
        ordered("load bounds", self.min_load, self.max_load)?;
        non_negative("spike_interval_min", self.spike_interval_min)?;
        ordered(
            "spike interval",
            self.spike_interval_min,
            self.spike_interval_max,
        )?;
        positive("spike_duration", self.spike_duration)?;
        non_negative("spike_magnitude", self.spike_magnitude)?;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
struct Spike {
    active: bool,
    elapsed: f64,
    /// Countdown to the next onset; only runs while inactive.
    timer: f64,
}

/// External power demand: bounded random walk plus periodic decaying spikes.
#[derive(Clone, Debug)]
pub struct GridLoad {
    cfg: GridLoadConfig,
    base_load: f64,
    spike: Spike,
    walk: Uniform<f64>,
    interval: Uniform<f64>,
}

impl GridLoad {
    /// `cfg` must already have passed [`GridLoadConfig::validate`].
    pub(crate) fn new(cfg: GridLoadConfig) -> Self {
        Self {
            base_load: cfg.initial_load.clamp(cfg.min_load, cfg.max_load),
            spike: Spike {
                active: false,
                elapsed: 0.0,
                timer: cfg.first_spike_after,
            },
            walk: Uniform::new_inclusive(-cfg.walk_step, cfg.walk_step),
            interval: Uniform::new_inclusive(cfg.spike_interval_min, cfg.spike_interval_max),
            cfg,
        }
    }

    pub fn base_load(&self) -> f64 {
        self.base_load
    }

    pub fn is_spiking(&self) -> bool {
        self.spike.active
    }

    /// Advance by `dt` simulated seconds and return the new demand, rounded to whole kW.
    pub fn update<R: Rng + ?Sized>(&mut self, rng: &mut R, dt: f64) -> f64 {
        self.base_load =
            (self.base_load + self.walk.sample(rng)).clamp(self.cfg.min_load, self.cfg.max_load);

        let mut spike_load = 0.0;
        let spike = &mut self.spike;
        if !spike.active {
            spike.timer -= dt;
            if spike.timer <= 0.0 {
                spike.active = true;
                spike.elapsed = 0.0;
                spike.timer = self.interval.sample(rng);
            }
        } else {
            spike.elapsed += dt;
            if spike.elapsed >= self.cfg.spike_duration {
                spike.active = false;
            } else {
                let decay = 1.0 - spike.elapsed / self.cfg.spike_duration;
                spike_load = self.cfg.spike_magnitude * decay;
            }
        }

        (self.base_load + spike_load).round()
    }
}
