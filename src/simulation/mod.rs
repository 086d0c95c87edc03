pub mod controller;
pub mod driver;
pub mod snapshot;

pub use controller::{ControllerState, RunState, SimulationController, StepOutcome};
pub use driver::drive;
pub use snapshot::{RouterSnapshot, Snapshot};
