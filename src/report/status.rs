use chrono::{NaiveDateTime, NaiveTime};

use crate::domain::solution::SimulationReport;
use crate::domain::types::{DeliveryStatus, Package, PackageId, VehicleId};
use crate::setup::init::on_service_date;
use crate::setup::store::PackageStore;

#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub package_id: PackageId,
    pub vehicle_id: Option<VehicleId>,
    pub status: DeliveryStatus,
    pub delivered_at: Option<NaiveDateTime>,
}

/// Where a package stood at `at`: at the hub until its vehicle departs,
/// en route until delivered, delivered afterwards.
pub fn status_at(package: &Package, departure: Option<NaiveDateTime>, at: NaiveDateTime) -> DeliveryStatus {
    match (departure, package.delivered_at) {
        (_, Some(delivered)) if delivered <= at => DeliveryStatus::Delivered,
        (Some(departed), _) if departed <= at && package.destination.is_some() => {
            DeliveryStatus::EnRoute
        }
        _ => DeliveryStatus::Pending,
    }
}

/// Status of every package in the store at time-of-day `at`, by ascending id.
pub fn snapshot(report: &SimulationReport, store: &PackageStore, at: NaiveTime) -> Vec<StatusLine> {
    let at = on_service_date(at);
    store
        .all()
        .into_iter()
        .map(|pkg| {
            let vehicle = report
                .vehicles
                .iter()
                .find(|v| v.packages.iter().any(|p| p.id == pkg.id));
            StatusLine {
                package_id: pkg.id,
                vehicle_id: vehicle.map(|v| v.id),
                status: status_at(pkg, vehicle.map(|v| v.start_time), at),
                delivered_at: pkg.delivered_at.filter(|d| *d <= at),
            }
        })
        .collect()
}
