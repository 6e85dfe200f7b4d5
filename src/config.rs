use std::env;
use std::str::FromStr;

use chrono::NaiveTime;
use dotenv::dotenv;
use tracing::{debug, info};

use crate::error::{SimError, SimResult};

pub mod constant {
    pub const TRUCK_SPEED_MPH: f64 = 18.0;
    pub const END_OF_DAY: (u32, u32) = (17, 0);
    pub const DEFAULT_START: (u32, u32) = (8, 0);
    pub const LATE_DEPARTURE: (u32, u32) = (10, 20);
    pub const LATE_VEHICLE_ID: u32 = 3;
    pub const VEHICLE_CAPACITY: usize = 16;
    pub const FLEET_SIZE: usize = 3;
    pub const PACKAGE_BUCKETS: usize = 40;
    pub const SERVICE_DATE: (i32, u32, u32) = (2024, 1, 2);
    pub const SEED: u64 = 64;
    pub const FIXTURE_PACKAGES: usize = 40;
    pub const FIXTURE_LOCATIONS: usize = 27;
    pub const PACKAGE_CSV_PATH: &str = "data/packages.csv";
    pub const DISTANCE_CSV_PATH: &str = "data/distances.csv";
    pub const ADDRESS_CSV_PATH: &str = "data/addresses.csv";
    pub const REPORT_CSV_PATH: &str = "delivery_report.csv";
}

pub fn hm(hm: (u32, u32)) -> NaiveTime {
    NaiveTime::from_hms_opt(hm.0, hm.1, 0).unwrap_or(NaiveTime::MIN)
}

/// Runtime settings. Defaults come from [`constant`], `.env` and the process
/// environment override them.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub package_csv: String,
    pub distance_csv: String,
    pub address_csv: String,
    pub report_csv: String,
    pub fleet_size: usize,
    pub vehicle_capacity: usize,
    pub start_time: NaiveTime,
    pub late_vehicle_id: u32,
    pub late_departure: NaiveTime,
    pub parallel_routing: bool,
    pub status_at: Option<NaiveTime>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            package_csv: constant::PACKAGE_CSV_PATH.to_string(),
            distance_csv: constant::DISTANCE_CSV_PATH.to_string(),
            address_csv: constant::ADDRESS_CSV_PATH.to_string(),
            report_csv: constant::REPORT_CSV_PATH.to_string(),
            fleet_size: constant::FLEET_SIZE,
            vehicle_capacity: constant::VEHICLE_CAPACITY,
            start_time: hm(constant::DEFAULT_START),
            late_vehicle_id: constant::LATE_VEHICLE_ID,
            late_departure: hm(constant::LATE_DEPARTURE),
            parallel_routing: false,
            status_at: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> SimResult<Self> {
        dotenv().ok();
        let settings = Self::from_lookup(|key| env::var(key).ok())?;
        info!(
            "Settings: {} vehicles x {} packages, late vehicle {} at {}",
            settings.fleet_size,
            settings.vehicle_capacity,
            settings.late_vehicle_id,
            settings.late_departure
        );
        Ok(settings)
    }

    /// Builds settings from an arbitrary key lookup so tests need not touch
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> SimResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        if let Some(v) = lookup("WGUPS_PACKAGE_CSV") {
            settings.package_csv = v;
        }
        if let Some(v) = lookup("WGUPS_DISTANCE_CSV") {
            settings.distance_csv = v;
        }
        if let Some(v) = lookup("WGUPS_ADDRESS_CSV") {
            settings.address_csv = v;
        }
        if let Some(v) = lookup("WGUPS_REPORT_CSV") {
            settings.report_csv = v;
        }
        if let Some(v) = lookup("WGUPS_FLEET_SIZE") {
            settings.fleet_size = parse_value("WGUPS_FLEET_SIZE", &v)?;
        }
        if let Some(v) = lookup("WGUPS_VEHICLE_CAPACITY") {
            settings.vehicle_capacity = parse_value("WGUPS_VEHICLE_CAPACITY", &v)?;
        }
        if let Some(v) = lookup("WGUPS_START_TIME") {
            settings.start_time = parse_clock("WGUPS_START_TIME", &v)?;
        }
        if let Some(v) = lookup("WGUPS_LATE_VEHICLE") {
            settings.late_vehicle_id = parse_value("WGUPS_LATE_VEHICLE", &v)?;
        }
        if let Some(v) = lookup("WGUPS_LATE_DEPARTURE") {
            settings.late_departure = parse_clock("WGUPS_LATE_DEPARTURE", &v)?;
        }
        if let Some(v) = lookup("WGUPS_PARALLEL_ROUTING") {
            settings.parallel_routing = parse_value("WGUPS_PARALLEL_ROUTING", &v)?;
        }
        if let Some(v) = lookup("WGUPS_STATUS_AT") {
            settings.status_at = Some(parse_clock("WGUPS_STATUS_AT", &v)?);
        }

        if settings.fleet_size == 0 {
            return Err(SimError::InvalidConfig {
                key: "WGUPS_FLEET_SIZE",
                value: "0".to_string(),
            });
        }

        debug!("Resolved settings: {:?}", settings);
        Ok(settings)
    }
}

fn parse_value<T: FromStr>(key: &'static str, value: &str) -> SimResult<T> {
    value.trim().parse().map_err(|_| SimError::InvalidConfig {
        key,
        value: value.to_string(),
    })
}

/// Accepts `HH:MM` (24h) or `H:MM AM/PM`.
fn parse_clock(key: &'static str, value: &str) -> SimResult<NaiveTime> {
    let v = value.trim();
    NaiveTime::parse_from_str(v, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(&v.to_uppercase(), "%I:%M %p"))
        .map_err(|_| SimError::InvalidConfig {
            key,
            value: value.to_string(),
        })
}
