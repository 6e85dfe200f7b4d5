use serde::Deserialize;

use crate::distance::DistanceIndex;
use crate::error::SimError;
use crate::setup::store::PackageStore;

/// One row of the package file.
#[derive(Debug, Deserialize)]
pub struct PackageRecord {
    #[serde(rename = "Package ID")]
    pub package_id: u32,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "City", default)]
    pub city: String,
    #[serde(rename = "State", default)]
    pub state: String,
    #[serde(rename = "Zip", default)]
    pub zip: String,
    #[serde(rename = "Delivery Deadline", default)]
    pub deadline: String,
    #[serde(rename = "Weight Kilo", default)]
    pub weight: f64,
    #[serde(rename = "Special Notes", default)]
    pub notes: String,
}

/// Everything the core needs for one run.
#[derive(Debug)]
pub struct Scenario {
    pub store: PackageStore,
    pub distances: DistanceIndex,
    pub warnings: Vec<SimError>,
}
