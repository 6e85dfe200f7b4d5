use std::collections::HashMap;

use thiserror::Error;
use tracing::{error, info};

use crate::distance::DistanceIndex;
use crate::domain::solution::SimulationReport;
use crate::domain::types::{DeliveryStatus, PackageId, VehicleId};
use crate::evaluation::fitness::find_distance;

const DISTANCE_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
    #[error("{delivered} delivered + {failed} failed != {total} packages")]
    NotTotal {
        delivered: usize,
        failed: usize,
        total: usize,
    },
    #[error("vehicle {vehicle} carries {carried} packages over capacity {capacity}")]
    OverCapacity {
        vehicle: VehicleId,
        carried: usize,
        capacity: usize,
    },
    #[error("group {group:?} split across vehicles {vehicles:?}")]
    SplitGroup {
        group: Vec<PackageId>,
        vehicles: Vec<VehicleId>,
    },
    #[error("package {package} on vehicle {vehicle} delivered out of order or before departure")]
    Timeline { vehicle: VehicleId, package: PackageId },
    #[error("vehicle {vehicle} reports {reported:.3} mi, route measures {measured:.3} mi")]
    DistanceMismatch {
        vehicle: VehicleId,
        reported: f64,
        measured: f64,
    },
}

/// Checks a finished run against the invariants a valid day must hold.
pub fn audit(report: &SimulationReport, distances: &DistanceIndex) -> Vec<Violation> {
    let mut violations = vec![];

    if !report.is_total() {
        violations.push(Violation::NotTotal {
            delivered: report.delivered_count(),
            failed: report.failed_count(),
            total: report.total_packages,
        });
    }

    let mut vehicle_of: HashMap<PackageId, VehicleId> = HashMap::new();
    for v in &report.vehicles {
        if v.packages.len() > v.capacity {
            violations.push(Violation::OverCapacity {
                vehicle: v.id,
                carried: v.packages.len(),
                capacity: v.capacity,
            });
        }

        let mut last = v.start_time;
        for p in v.packages.iter().filter(|p| p.status == DeliveryStatus::Delivered) {
            vehicle_of.insert(p.id, v.id);
            match p.delivered_at {
                Some(at) if at >= last => last = at,
                _ => violations.push(Violation::Timeline {
                    vehicle: v.id,
                    package: p.id,
                }),
            }
        }

        let measured = find_distance(v, distances);
        if (measured - v.distance).abs() > DISTANCE_TOLERANCE {
            violations.push(Violation::DistanceMismatch {
                vehicle: v.id,
                reported: v.distance,
                measured,
            });
        }
    }

    for group in &report.groups {
        let mut vehicles: Vec<VehicleId> = group
            .iter()
            .filter_map(|id| vehicle_of.get(id).copied())
            .collect();
        vehicles.sort_unstable();
        vehicles.dedup();
        if vehicles.len() > 1 {
            violations.push(Violation::SplitGroup {
                group: group.clone(),
                vehicles,
            });
        }
    }

    if violations.is_empty() {
        info!("Audit passed");
    }
    for v in &violations {
        error!("Audit: {}", v);
    }
    violations
}
