pub mod init;
pub mod init_types;
pub mod notes;
pub mod store;

pub use init::{build_fleet, load_packages, load_scenario, on_service_date};
pub use init_types::Scenario;
pub use store::PackageStore;
