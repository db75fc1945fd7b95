use controller::AutoControlConfig;
use safety::StatusConfig;

use crate::error::{non_negative, positive, ConfigError};
use crate::grid::GridLoadConfig;

/// Physical constants of the plant. Immutable once a model is built.
#[derive(Clone, Copy, Debug)]
pub struct ReactorParams {
    /// Gauge ceiling in °C. Not enforced by the physics.
    pub max_temp: f64,
    /// kW
    pub max_power_output: f64,
    pub meltdown_temp: f64,
    pub overheat_temp: f64,
    pub low_temp: f64,
    pub optimal_temp: f64,
    /// Condition points per second at 100% fission.
    pub fuel_consumption_rate: f64,
    /// °C per second at 100% fission.
    pub heat_generation_rate: f64,
    /// Fraction of temperature shed per second.
    pub ambient_temp_dissipation: f64,
    /// kW per °C of heat drawn by the turbine.
    pub turbine_power_factor: f64,
    pub low_fuel_threshold: f64,
}

impl Default for ReactorParams {
    fn default() -> Self {
        Self {
            max_temp: 1000.0,
            max_power_output: 5000.0,
            meltdown_temp: 900.0,
            overheat_temp: 600.0,
            low_temp: 200.0,
            optimal_temp: 350.0,
            fuel_consumption_rate: 0.05,
            heat_generation_rate: 800.0,
            ambient_temp_dissipation: 0.05,
            turbine_power_factor: 8.0,
            low_fuel_threshold: 20.0,
        }
    }
}

impl ReactorParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("max_power_output", self.max_power_output)?;
        positive("overheat_temp", self.overheat_temp)?;
        positive("optimal_temp", self.optimal_temp)?;
        positive("turbine_power_factor", self.turbine_power_factor)?;
        positive("heat_generation_rate", self.heat_generation_rate)?;
        non_negative("fuel_consumption_rate", self.fuel_consumption_rate)?;
        non_negative("ambient_temp_dissipation", self.ambient_temp_dissipation)?;
        non_negative("low_fuel_threshold", self.low_fuel_threshold)?;
        Ok(())
    }

    pub fn status_config(&self) -> StatusConfig {
        StatusConfig {
            meltdown_temp: self.meltdown_temp,
            overheat_temp: self.overheat_temp,
            low_temp: self.low_temp,
            low_fuel_threshold: self.low_fuel_threshold,
            ..StatusConfig::default()
        }
    }
}

/// Everything needed to build a [`crate::Reactor`].
#[derive(Clone, Debug)]
pub struct ReactorConfig {
    pub params: ReactorParams,
    pub grid: GridLoadConfig,
    pub control: AutoControlConfig,
    /// Fixed seed for the grid RNG. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for ReactorConfig {
    fn default() -> Self {
        let params = ReactorParams::default();
        Self {
            control: AutoControlConfig {
                target_temp: params.optimal_temp,
                ..AutoControlConfig::default()
            },
            params,
            grid: GridLoadConfig::default(),
            seed: None,
        }
    }
}

impl ReactorConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.params.validate()?;
        self.grid.validate()
    }
}
