use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Alarm bitset. Bit positions are part of the wire format.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Status(u8);

impl Status {
    pub const NONE: Status = Status(0);
    pub const TEMP_LOW: Status = Status(1 << 0);
    pub const OVERHEAT: Status = Status(1 << 1);
    pub const OUTPUT_LOW: Status = Status(1 << 2);
    pub const OUTPUT_HIGH: Status = Status(1 << 3);
    pub const FUEL_LOW: Status = Status(1 << 4);
    pub const FUEL_OUT: Status = Status(1 << 5);
    pub const MELTDOWN: Status = Status(1 << 6);
    pub const SCRAM: Status = Status(1 << 7);

    const NAMES: [(Status, &'static str); 8] = [
        (Status::TEMP_LOW, "TempLow"),
        (Status::OVERHEAT, "Overheat"),
        (Status::OUTPUT_LOW, "OutputLow"),
        (Status::OUTPUT_HIGH, "OutputHigh"),
        (Status::FUEL_LOW, "FuelLow"),
        (Status::FUEL_OUT, "FuelOut"),
        (Status::MELTDOWN, "Meltdown"),
        (Status::SCRAM, "Scram"),
    ];

    pub const fn from_bits(bits: u8) -> Self {
        Status(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Status) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Status) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Status) {
        self.0 &= !other.0;
    }

    pub const fn intersection(self, other: Status) -> Status {
        Status(self.0 & other.0)
    }

    /// Names of the set flags, lowest bit first.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMES
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| name)
    }
}

impl BitOr for Status {
    type Output = Status;

    fn bitor(self, rhs: Status) -> Status {
        Status(self.0 | rhs.0)
    }
}

impl BitOrAssign for Status {
    fn bitor_assign(&mut self, rhs: Status) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("Status(None)");
        }
        let names: Vec<_> = self.names().collect();
        write!(f, "Status({})", names.join(" | "))
    }
}

#[derive(Clone, Copy, Debug)]
pub struct StatusConfig {
    pub meltdown_temp: f64,
    pub overheat_temp: f64,
    pub low_temp: f64,
    pub low_fuel_threshold: f64,
    /// Allowed output deviation as a fraction of load.
    pub output_tolerance: f64,
    /// Output alarms are suppressed at or below this load (kW).
    pub min_load_for_output_alarm: f64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            meltdown_temp: 900.0,
            overheat_temp: 600.0,
            low_temp: 200.0,
            low_fuel_threshold: 20.0,
            output_tolerance: 0.2,
            min_load_for_output_alarm: 100.0,
        }
    }
}

/// Physical readings the status flags are derived from.
#[derive(Clone, Copy, Debug)]
pub struct StatusInputs {
    pub temperature: f64,
    pub is_powered_on: bool,
    pub power_output: f64,
    pub power_load: f64,
    /// `None` when no fuel rod is loaded.
    pub fuel_condition: Option<f64>,
    pub previous: Status,
}

/// Recompute all flags from scratch. Only SCRAM is carried over from `previous`.
pub fn evaluate(cfg: &StatusConfig, inputs: &StatusInputs) -> Status {
    let mut status = inputs.previous.intersection(Status::SCRAM);

    let t = inputs.temperature;
    if t >= cfg.meltdown_temp {
        status |= Status::MELTDOWN;
    } else if t >= cfg.overheat_temp {
        status |= Status::OVERHEAT;
    } else if t < cfg.low_temp && inputs.is_powered_on && inputs.power_output > 0.0 {
        status |= Status::TEMP_LOW;
    }

    let load = inputs.power_load;
    if load > cfg.min_load_for_output_alarm {
        let diff = inputs.power_output - load;
        let band = load * cfg.output_tolerance;
        if diff > band {
            status |= Status::OUTPUT_HIGH;
        } else if diff < -band {
            status |= Status::OUTPUT_LOW;
        }
    }

    match inputs.fuel_condition {
        Some(c) if c > 0.0 => {
            if c < cfg.low_fuel_threshold {
                status |= Status::FUEL_LOW;
            }
        }
        _ => status |= Status::FUEL_OUT,
    }

    status
}
