use safety::Status;
use serde::{Deserialize, Serialize};

use crate::params::ReactorParams;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FuelRod {
    /// 0..=100
    pub condition: f64,
}

impl FuelRod {
    pub fn fresh() -> Self {
        Self { condition: 100.0 }
    }
}

/// Full plant state. Also the snapshot handed to clients; field names are the wire format.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactorState {
    pub is_powered_on: bool,
    pub is_auto_control: bool,
    /// °C
    pub temperature: f64,
    /// 0..=100
    pub fission_rate: f64,
    /// 0..=100
    pub turbine_output: f64,
    /// kW
    pub power_output: f64,
    /// kW
    pub power_load: f64,
    pub fuel_rod: Option<FuelRod>,
    pub status: Status,
}

impl ReactorState {
    /// Running at the optimal temperature with fission and turbine chosen so
    /// that heat in, heat out and `load` all balance.
    pub fn balanced(p: &ReactorParams, load: f64) -> Self {
        let temp = p.optimal_temp;
        let efficiency = (temp / p.overheat_temp).min(1.0);
        let turbine = load / (temp / 100.0 * efficiency * p.turbine_power_factor);
        let heat_consumed = load / p.turbine_power_factor + temp * p.ambient_temp_dissipation;
        let fission = heat_consumed * 100.0 / p.heat_generation_rate;

        Self {
            is_powered_on: true,
            is_auto_control: true,
            temperature: temp,
            fission_rate: fission.clamp(0.0, 100.0),
            turbine_output: turbine.clamp(0.0, 100.0),
            power_output: load,
            power_load: load,
            fuel_rod: Some(FuelRod::fresh()),
            status: Status::NONE,
        }
    }

    pub fn is_scrammed(&self) -> bool {
        self.status.contains(Status::SCRAM)
    }

    /// Clamp every field back into its domain: setpoints to 0..=100, heat
    /// and load non-negative, output capped, a scram forces power off and a
    /// missing or spent rod is marked as fuel-out.
    pub fn normalized(mut self, p: &ReactorParams) -> Self {
        self.fission_rate = clamp_percent(self.fission_rate);
        self.turbine_output = clamp_percent(self.turbine_output);
        self.temperature = self.temperature.max(0.0);
        self.power_output = self.power_output.max(0.0).min(p.max_power_output);
        self.power_load = self.power_load.max(0.0);

        self.fuel_rod = self
            .fuel_rod
            .filter(|rod| rod.condition > 0.0)
            .map(|rod| FuelRod {
                condition: rod.condition.min(100.0),
            });
        if self.fuel_rod.is_none() {
            self.status.insert(Status::FUEL_OUT);
        }
        if self.is_scrammed() {
            self.is_powered_on = false;
        }
        self
    }
}

/// NaN maps to 0.
pub(crate) fn clamp_percent(v: f64) -> f64 {
    if v.is_nan() {
        return 0.0;
    }
    v.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_state_at_default_params() {
        let p = ReactorParams::default();
        let s = ReactorState::balanced(&p, 1000.0);
        assert_eq!(s.temperature, 350.0);
        assert!((s.fission_rate - 17.8125).abs() < 1e-9);
        assert!((s.turbine_output - 61.224_489_795_918_37).abs() < 1e-9);

        // One step of the physics at these settings leaves temperature unchanged.
        let heat_in = s.fission_rate / 100.0 * p.heat_generation_rate;
        let efficiency = s.temperature / p.overheat_temp;
        let output = s.temperature * s.turbine_output / 100.0 * efficiency * p.turbine_power_factor;
        let heat_out = output / p.turbine_power_factor + s.temperature * p.ambient_temp_dissipation;
        assert!((output - 1000.0).abs() < 1e-6);
        assert!((heat_in - heat_out).abs() < 1e-6);
    }

    #[test]
    fn normalized_leaves_valid_state_alone() {
        let p = ReactorParams::default();
        let s = ReactorState::balanced(&p, 1000.0);
        assert_eq!(s.normalized(&p), s);
    }

    #[test]
    fn normalized_clamps_nan() {
        let p = ReactorParams::default();
        let mut s = ReactorState::balanced(&p, 1000.0);
        s.temperature = f64::NAN;
        s.fission_rate = f64::NAN;
        s.power_output = f64::NAN;
        let n = s.normalized(&p);
        assert_eq!(n.temperature, 0.0);
        assert_eq!(n.fission_rate, 0.0);
        assert_eq!(n.power_output, 0.0);
    }

    #[test]
    fn wire_shape() {
        let mut s = ReactorState::balanced(&ReactorParams::default(), 1000.0);
        s.status = Status::FUEL_OUT;
        s.fuel_rod = None;
        let v = serde_json::to_value(s).unwrap();
        for key in [
            "isPoweredOn",
            "isAutoControl",
            "temperature",
            "fissionRate",
            "turbineOutput",
            "powerOutput",
            "powerLoad",
            "fuelRod",
            "status",
        ] {
            assert!(v.get(key).is_some(), "missing {key}");
        }
        assert!(v["fuelRod"].is_null());
        assert_eq!(v["status"], 32);

        s.fuel_rod = Some(FuelRod::fresh());
        let v = serde_json::to_value(s).unwrap();
        assert_eq!(v["fuelRod"]["condition"], 100.0);
    }
}
