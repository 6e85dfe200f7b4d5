pub mod solution;
pub mod types;

pub use solution::{Assignment, SimulationReport};
pub use types::*;
