use std::collections::BTreeMap;

use crate::domain::types::{DeliveryStatus, Package, PackageId, Vehicle, VehicleId};
use crate::error::SimError;

/// Result of the assignment phase: loaded vehicles plus whatever could not be placed.
#[derive(Debug)]
pub struct Assignment {
    pub vehicles: Vec<Vehicle>,
    pub vehicle_of: BTreeMap<PackageId, VehicleId>,
    pub unassigned: Vec<PackageId>,
    pub warnings: Vec<SimError>,
}

impl Assignment {
    pub fn assigned_count(&self) -> usize {
        self.vehicle_of.len()
    }
}

/// Final state of a simulated day.
#[derive(Debug)]
pub struct SimulationReport {
    /// Vehicles in the order they were simulated (ascending start time).
    pub vehicles: Vec<Vehicle>,
    pub total_packages: usize,
    /// Grouped deliveries, as classified.
    pub groups: Vec<Vec<PackageId>>,
    pub assignment_failed: Vec<PackageId>,
    pub routing_failed: Vec<PackageId>,
    pub warnings: Vec<SimError>,
}

impl SimulationReport {
    pub fn total_distance(&self) -> f64 {
        self.vehicles.iter().map(|v| v.distance).sum()
    }

    pub fn delivered(&self) -> impl Iterator<Item = &Package> {
        self.vehicles
            .iter()
            .flat_map(|v| v.packages.iter())
            .filter(|p| p.status == DeliveryStatus::Delivered)
    }

    pub fn delivered_count(&self) -> usize {
        self.delivered().count()
    }

    pub fn failed_count(&self) -> usize {
        self.assignment_failed.len() + self.routing_failed.len()
    }

    pub fn late_packages(&self) -> Vec<&Package> {
        self.delivered().filter(|p| p.is_late()).collect()
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    /// Delivered plus failed covers every package exactly once.
    pub fn is_total(&self) -> bool {
        self.delivered_count() + self.failed_count() == self.total_packages
    }
}
