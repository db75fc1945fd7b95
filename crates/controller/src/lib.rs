#[derive(Clone, Copy, Debug)]
pub struct AutoControlConfig {
    /// Turbine % per kW of load error.
    pub turbine_gain: f64,
    /// Fission % per °C of temperature error.
    pub fission_gain: f64,
    pub target_temp: f64,
    pub out_min: f64,
    pub out_max: f64,
}

impl Default for AutoControlConfig {
    fn default() -> Self {
        Self {
            turbine_gain: 0.01,
            fission_gain: 0.002,
            target_temp: 350.0,
            out_min: 0.0,
            out_max: 100.0,
        }
    }
}

/// Actuator positions, both in percent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Setpoints {
    pub fission_rate: f64,
    pub turbine_output: f64,
}

#[derive(Clone, Copy, Debug)]
pub struct Measurements {
    pub temperature: f64,
    pub power_output: f64,
    pub power_load: f64,
}

/// Proportional-only feedback. There is no integral or derivative term, so
/// the loop can oscillate or sit saturated against a band edge.
#[derive(Clone, Debug)]
pub struct AutoControl {
    cfg: AutoControlConfig,
}

impl AutoControl {
    pub fn new(cfg: AutoControlConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &AutoControlConfig {
        &self.cfg
    }

    /// One control step. Turbine tracks load, fission tracks target temperature.
    pub fn update(&self, current: Setpoints, m: &Measurements) -> Setpoints {
        let power_error = m.power_load - m.power_output;
        let temp_error = self.cfg.target_temp - m.temperature;

        let turbine = current.turbine_output + power_error * self.cfg.turbine_gain;
        let fission = current.fission_rate + temp_error * self.cfg.fission_gain;

        Setpoints {
            fission_rate: self.saturate(fission),
            turbine_output: self.saturate(turbine),
        }
    }

    fn saturate(&self, v: f64) -> f64 {
        v.clamp(self.cfg.out_min, self.cfg.out_max)
    }
}

impl Default for AutoControl {
    fn default() -> Self {
        Self::new(AutoControlConfig::default())
    }
}
