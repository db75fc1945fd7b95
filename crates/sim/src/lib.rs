//! Reactor plant model: physical state, grid demand and the locked model
//! shared between the tick loop and request handlers.

mod error;
mod grid;
mod params;
mod reactor;
mod state;

pub use error::ConfigError;
pub use grid::{GridLoad, GridLoadConfig};
pub use params::{ReactorConfig, ReactorParams};
pub use reactor::Reactor;
pub use state::{FuelRod, ReactorState};

pub use safety::Status;
