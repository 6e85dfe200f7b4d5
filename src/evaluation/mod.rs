pub mod audit;
pub mod fitness;

pub use audit::{audit, Violation};
pub use fitness::find_distance;
