use controller::{AutoControl, Measurements, Setpoints};
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::SeedableRng;
use safety::{Status, StatusConfig, StatusInputs};
use tracing::{debug, info, warn};

use crate::error::ConfigError;
use crate::grid::GridLoad;
use crate::params::{ReactorConfig, ReactorParams};
use crate::state::{clamp_percent, FuelRod, ReactorState};

/// Mutable part of the model. Everything in here sits behind one lock.
struct Core {
    state: ReactorState,
    grid: GridLoad,
    rng: StdRng,
}

/// The reactor. One writer (the tick loop) and any number of command senders
/// and readers share it through `&self`; all state goes through a single
/// reader-writer lock held for a fixed handful of float updates.
pub struct Reactor {
    params: ReactorParams,
    status_cfg: StatusConfig,
    control: AutoControl,
    core: RwLock<Core>,
}

impl Reactor {
    pub fn new() -> Self {
        Self::build(ReactorConfig::default(), None)
    }

    pub fn with_config(cfg: ReactorConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self::build(cfg, None))
    }

    /// Start from an explicit state instead of the balanced operating point.
    /// Out-of-domain values are clamped; see [`ReactorState::normalized`].
    pub fn from_state(cfg: ReactorConfig, state: ReactorState) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let state = state.normalized(&cfg.params);
        Ok(Self::build(cfg, Some(state)))
    }

    fn build(cfg: ReactorConfig, state: Option<ReactorState>) -> Self {
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let state =
            state.unwrap_or_else(|| ReactorState::balanced(&cfg.params, cfg.grid.initial_load));

        Self {
            params: cfg.params,
            status_cfg: cfg.params.status_config(),
            control: AutoControl::new(cfg.control),
            core: RwLock::new(Core {
                state,
                grid: GridLoad::new(cfg.grid),
                rng,
            }),
        }
    }

    pub fn params(&self) -> &ReactorParams {
        &self.params
    }

    /// Copy of the current state. Holds the shared lock only for the copy.
    pub fn snapshot(&self) -> ReactorState {
        self.core.read().state
    }

    /// Turn on and clear a latched scram. No-op when already on.
    pub fn power_on(&self) {
        let mut core = self.core.write();
        let state = &mut core.state;
        if !state.is_powered_on {
            state.is_powered_on = true;
            state.status.remove(Status::SCRAM);
            info!("reactor powered on");
        }
    }

    /// Normal shutdown. Leaves a scram latched.
    pub fn power_off(&self) {
        let mut core = self.core.write();
        if core.state.is_powered_on {
            info!("reactor powered off");
        }
        core.state.is_powered_on = false;
    }

    pub fn scram(&self) {
        let mut core = self.core.write();
        let state = &mut core.state;
        if !state.is_scrammed() {
            warn!(temperature = state.temperature, "SCRAM");
        }
        state.status.insert(Status::SCRAM);
        state.is_powered_on = false;
    }

    pub fn toggle_auto(&self) {
        let mut core = self.core.write();
        core.state.is_auto_control = !core.state.is_auto_control;
        info!(enabled = core.state.is_auto_control, "auto-control toggled");
    }

    /// Manual fission setpoint. Ignored while auto-control owns the actuators;
    /// returns whether it was applied.
    pub fn set_fission_rate(&self, value: f64) -> bool {
        let mut core = self.core.write();
        if core.state.is_auto_control {
            debug!(value, "fission setpoint ignored under auto-control");
            return false;
        }
        core.state.fission_rate = clamp_percent(value);
        true
    }

    /// Manual turbine setpoint, same rules as [`Reactor::set_fission_rate`].
    pub fn set_turbine_output(&self, value: f64) -> bool {
        let mut core = self.core.write();
        if core.state.is_auto_control {
            debug!(value, "turbine setpoint ignored under auto-control");
            return false;
        }
        core.state.turbine_output = clamp_percent(value);
        true
    }

    /// Inject a demand value. The grid generator overwrites it on the next tick.
    pub fn set_power_load(&self, value: f64) {
        let mut core = self.core.write();
        core.state.power_load = value.max(0.0);
    }

    pub fn refuel(&self) {
        let mut core = self.core.write();
        core.state.fuel_rod = Some(FuelRod::fresh());
        info!("fuel rod replaced");
    }

    /// One tick of `dt` simulated seconds.
    pub fn advance(&self, dt: f64) {
        let mut guard = self.core.write();
        let Core { state, grid, rng } = &mut *guard;
        let p = &self.params;

        state.power_load = grid.update(rng, dt);

        if !state.is_powered_on || state.is_scrammed() {
            state.fission_rate = 0.0;
            self.draw_turbine(state, dt, 2.0);
            if state.temperature <= 0.0 {
                state.power_output = 0.0;
            }
            self.refresh_status(state);
            return;
        }

        if state.is_auto_control {
            let next = self.control.update(
                Setpoints {
                    fission_rate: state.fission_rate,
                    turbine_output: state.turbine_output,
                },
                &Measurements {
                    temperature: state.temperature,
                    power_output: state.power_output,
                    power_load: state.power_load,
                },
            );
            state.fission_rate = next.fission_rate;
            state.turbine_output = next.turbine_output;
        }

        // Without usable fuel the core only coasts on stored heat.
        if let Some(rod) = state.fuel_rod.as_mut().filter(|r| r.condition > 0.0) {
            let fission = state.fission_rate / 100.0;
            state.temperature += fission * p.heat_generation_rate * dt;
            let consumed = fission * p.fuel_consumption_rate * dt;
            rod.condition = (rod.condition - consumed).max(0.0);
        }

        self.draw_turbine(state, dt, 1.0);
        self.refresh_status(state);
    }

    /// Turbine extraction and ambient losses. `ambient_scale` is 2 while shut down.
    fn draw_turbine(&self, state: &mut ReactorState, dt: f64, ambient_scale: f64) {
        let p = &self.params;
        let efficiency = (state.temperature / p.overheat_temp).min(1.0);
        let potential = state.temperature * (state.turbine_output / 100.0) * efficiency;
        state.power_output = (potential * p.turbine_power_factor).min(p.max_power_output);

        let turbine_draw = state.power_output / p.turbine_power_factor;
        let ambient = state.temperature * p.ambient_temp_dissipation * ambient_scale;
        state.temperature = (state.temperature - (turbine_draw + ambient) * dt).max(0.0);
    }

    fn refresh_status(&self, state: &mut ReactorState) {
        let status = safety::evaluate(
            &self.status_cfg,
            &StatusInputs {
                temperature: state.temperature,
                is_powered_on: state.is_powered_on,
                power_output: state.power_output,
                power_load: state.power_load,
                fuel_condition: state.fuel_rod.map(|r| r.condition),
                previous: state.status,
            },
        );

        // Spent rods are discarded; only a refuel brings one back.
        if status.contains(Status::FUEL_OUT) && state.fuel_rod.take().is_some() {
            warn!("fuel exhausted, rod discarded");
        }
        if status.contains(Status::MELTDOWN) && !state.status.contains(Status::MELTDOWN) {
            warn!(temperature = state.temperature, "meltdown temperature reached");
        }
        state.status = status;
    }
}

impl Default for Reactor {
    fn default() -> Self {
        Self::new()
    }
}
