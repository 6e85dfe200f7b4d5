use chrono::{NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::error::{SimError, SimResult};

pub type PackageId = u32;
pub type VehicleId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeliveryStatus {
    Pending,
    EnRoute,
    Delivered,
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DeliveryStatus::Pending => "At Hub",
            DeliveryStatus::EnRoute => "En Route",
            DeliveryStatus::Delivered => "Delivered",
        };
        f.write_str(s)
    }
}

/// Constraints derived from a package's special notes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Constraints {
    pub vehicle: Option<VehicleId>,
    pub grouped_with: Vec<PackageId>,
    pub delayed_until: Option<NaiveTime>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub id: PackageId,
    pub address: String,
    pub city: String,
    pub zip: String,
    /// Location index in the distance table; `None` when the address could not be resolved.
    pub destination: Option<usize>,
    pub deadline: Option<NaiveTime>,
    pub weight: f64,
    pub notes: String,
    pub constraints: Constraints,
    pub status: DeliveryStatus,
    pub delivered_at: Option<NaiveDateTime>,
}

impl Package {
    pub fn new(id: PackageId, destination: Option<usize>) -> Self {
        Self {
            id,
            address: String::new(),
            city: String::new(),
            zip: String::new(),
            destination,
            deadline: None,
            weight: 0.0,
            notes: String::new(),
            constraints: Constraints::default(),
            status: DeliveryStatus::Pending,
            delivered_at: None,
        }
    }

    /// Records the delivery. The timestamp is set once.
    pub fn mark_delivered(&mut self, at: NaiveDateTime) {
        if self.delivered_at.is_none() {
            self.delivered_at = Some(at);
        }
        self.status = DeliveryStatus::Delivered;
    }

    /// Delivered after its deadline.
    pub fn is_late(&self) -> bool {
        match (self.deadline, self.delivered_at) {
            (Some(deadline), Some(at)) => at.time() > deadline,
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: VehicleId,
    pub capacity: usize,
    pub packages: Vec<Package>,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    pub distance: f64,
}

impl Vehicle {
    pub fn new(id: VehicleId, capacity: usize, start_time: NaiveDateTime) -> Self {
        Self {
            id,
            capacity,
            packages: vec![],
            start_time,
            end_time: None,
            distance: 0.0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.packages.len())
    }

    pub fn is_full(&self) -> bool {
        self.remaining() == 0
    }

    /// Loads every package or none. Overloading is a caller bug and is
    /// refused rather than truncated.
    pub fn load(&mut self, packages: Vec<Package>) -> SimResult<()> {
        if packages.len() > self.remaining() {
            return Err(SimError::CapacityViolationOnLoad {
                vehicle_id: self.id,
                capacity: self.capacity,
                loaded: self.packages.len(),
                attempted: packages.len(),
            });
        }
        self.packages.extend(packages);
        Ok(())
    }

    pub fn add_miles(&mut self, miles: f64) {
        self.distance += miles;
    }

    pub fn package_ids(&self) -> Vec<PackageId> {
        self.packages.iter().map(|p| p.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn eight() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    #[test]
    fn load_refuses_overflow_without_truncating() {
        let mut truck = Vehicle::new(1, 2, eight());
        truck.load(vec![Package::new(1, Some(1))]).unwrap();

        let err = truck
            .load(vec![Package::new(2, Some(2)), Package::new(3, Some(3))])
            .unwrap_err();
        assert!(matches!(
            err,
            SimError::CapacityViolationOnLoad {
                vehicle_id: 1,
                loaded: 1,
                attempted: 2,
                ..
            }
        ));
        assert_eq!(truck.package_ids(), vec![1]);

        truck.load(vec![Package::new(2, Some(2))]).unwrap();
        assert!(truck.is_full());
    }

    #[test]
    fn delivery_timestamp_is_set_once() {
        let mut pkg = Package::new(7, Some(3));
        pkg.mark_delivered(eight());
        pkg.mark_delivered(eight() + chrono::Duration::hours(1));
        assert_eq!(pkg.delivered_at, Some(eight()));
        assert_eq!(pkg.status, DeliveryStatus::Delivered);
    }

    #[test]
    fn lateness_compares_time_of_day() {
        let mut pkg = Package::new(1, Some(1));
        pkg.deadline = NaiveTime::from_hms_opt(9, 0, 0);
        pkg.mark_delivered(eight() + chrono::Duration::minutes(61));
        assert!(pkg.is_late());
    }
}
