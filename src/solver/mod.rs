pub mod route;
pub mod run;
pub mod simulation;

pub use route::{simulate_route, travel_time, RouteOutcome};
pub use simulation::{simulate, SimOptions};
