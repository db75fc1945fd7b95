//! Workspace root crate.
//!
//! Re-exports the plant model, auto-control and status evaluation so
//! integration tests can depend on a single crate.

pub use controller::*;
pub use safety::*;
pub use sim::*;
