pub mod config;
pub mod distance;
pub mod domain;
pub mod error;
pub mod evaluation;
pub mod fixtures;
pub mod phases;
pub mod report;
pub mod setup;
pub mod solver;

pub use error::{SimError, SimResult};
