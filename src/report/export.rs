use std::path::Path;

use csv::Writer;
use serde::Serialize;
use tracing::info;

use crate::domain::solution::SimulationReport;
use crate::domain::types::{DeliveryStatus, PackageId, VehicleId};
use crate::error::SimResult;
use crate::setup::store::PackageStore;

#[derive(Debug, Serialize, PartialEq)]
pub struct DeliveryRow {
    pub package_id: PackageId,
    pub vehicle_id: Option<VehicleId>,
    pub address: String,
    pub deadline: String,
    pub delivered_at: String,
    pub outcome: String,
    pub late: bool,
}

/// One row per package in ascending id order.
pub fn delivery_rows(report: &SimulationReport, store: &PackageStore) -> Vec<DeliveryRow> {
    store
        .all()
        .into_iter()
        .map(|pkg| {
            let vehicle_id = report
                .vehicles
                .iter()
                .find(|v| v.packages.iter().any(|p| p.id == pkg.id))
                .map(|v| v.id);
            let outcome = if report.assignment_failed.contains(&pkg.id) {
                "Assignment Failed".to_string()
            } else if report.routing_failed.contains(&pkg.id) {
                "Routing Failed".to_string()
            } else if pkg.status == DeliveryStatus::Delivered {
                pkg.status.to_string()
            } else {
                DeliveryStatus::Pending.to_string()
            };
            DeliveryRow {
                package_id: pkg.id,
                vehicle_id,
                address: pkg.address.clone(),
                deadline: pkg
                    .deadline
                    .map(|d| d.format("%H:%M").to_string())
                    .unwrap_or_else(|| "EOD".to_string()),
                delivered_at: pkg
                    .delivered_at
                    .map(|d| d.format("%H:%M:%S").to_string())
                    .unwrap_or_default(),
                outcome,
                late: pkg.is_late(),
            }
        })
        .collect()
}

pub fn save_to_csv<P: AsRef<Path>>(
    report: &SimulationReport,
    store: &PackageStore,
    path: P,
) -> SimResult<()> {
    let mut wtr = Writer::from_path(path.as_ref())?;
    let rows = delivery_rows(report, store);
    for row in &rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    info!("Wrote {} rows to {}", rows.len(), path.as_ref().display());
    Ok(())
}
