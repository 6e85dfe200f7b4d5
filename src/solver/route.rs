use chrono::Duration;
use tracing::{debug, info, span, warn, Level};

use crate::config::constant::TRUCK_SPEED_MPH;
use crate::distance::DistanceIndex;
use crate::domain::types::{DeliveryStatus, Package, PackageId, Vehicle};
use crate::error::SimError;

const DEPOT: usize = 0;

/// Time to cover `distance` miles at truck speed, to the nanosecond.
pub fn travel_time(distance: f64) -> Duration {
    let hours = distance / TRUCK_SPEED_MPH;
    Duration::nanoseconds((hours * 3_600_000_000_000.0).round() as i64)
}

#[derive(Debug, Default)]
pub struct RouteOutcome {
    pub visit_order: Vec<PackageId>,
    pub routing_failed: Vec<PackageId>,
    pub warnings: Vec<SimError>,
}

/// Index of the package closest to `from`. Ties go to the earliest package
/// in held order.
fn nearest(remaining: &[Package], from: usize, distances: &DistanceIndex) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, pkg) in remaining.iter().enumerate() {
        let Some(dest) = pkg.destination else { continue };
        let d = distances.distance(from, dest);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}

/// Drives one vehicle from the depot through its packages, always to the
/// closest undelivered destination, then back to the depot.
///
/// Packages without a usable destination stay at the hub and are reported
/// as routing failures. They are kept at the end of the vehicle's list.
pub fn simulate_route(vehicle: &mut Vehicle, distances: &DistanceIndex) -> RouteOutcome {
    let span = span!(Level::INFO, "vehicle", vehicle = vehicle.id);
    let _guard = span.enter();

    let mut outcome = RouteOutcome::default();
    let (mut remaining, unroutable): (Vec<Package>, Vec<Package>) =
        std::mem::take(&mut vehicle.packages)
            .into_iter()
            .partition(|p| p.destination.is_some_and(|d| d < distances.len()));

    for pkg in &unroutable {
        let err = SimError::UnresolvedDestination {
            package_id: pkg.id,
            address: pkg.address.clone(),
        };
        warn!("{}", err);
        outcome.warnings.push(err);
        outcome.routing_failed.push(pkg.id);
    }

    for pkg in remaining.iter_mut() {
        pkg.status = DeliveryStatus::EnRoute;
    }

    let mut current = DEPOT;
    let mut clock = vehicle.start_time;
    let mut visited = Vec::with_capacity(remaining.len());

    while let Some(idx) = nearest(&remaining, current, distances) {
        let mut pkg = remaining.remove(idx);
        let dest = pkg.destination.unwrap_or(DEPOT);
        let miles = distances.distance(current, dest);

        clock += travel_time(miles);
        vehicle.add_miles(miles);
        pkg.mark_delivered(clock);
        debug!(
            "Delivered package {} at {} ({:.1} mi from {})",
            pkg.id,
            clock.time(),
            miles,
            current
        );

        current = dest;
        outcome.visit_order.push(pkg.id);
        visited.push(pkg);
    }

    if visited.is_empty() {
        vehicle.end_time = Some(vehicle.start_time);
    } else {
        let back = distances.distance(current, DEPOT);
        vehicle.add_miles(back);
        vehicle.end_time = Some(clock + travel_time(back));
    }

    visited.extend(unroutable);
    vehicle.packages = visited;

    info!(
        "Vehicle {} delivered {} packages, {:.2} mi, back at {}",
        vehicle.id,
        outcome.visit_order.len(),
        vehicle.distance,
        vehicle.end_time.map(|t| t.time().to_string()).unwrap_or_default()
    );
    outcome
}
