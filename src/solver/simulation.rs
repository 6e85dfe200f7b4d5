use chrono::NaiveTime;
use rayon::prelude::*;
use tracing::{info, span, Level};

use crate::config::{constant, hm, Settings};
use crate::distance::DistanceIndex;
use crate::domain::solution::SimulationReport;
use crate::domain::types::Vehicle;
use crate::error::SimResult;
use crate::phases::{classify, plan, LateDeparture};
use crate::setup::init::on_service_date;
use crate::setup::store::PackageStore;
use crate::solver::route::{simulate_route, RouteOutcome};

#[derive(Debug, Clone, Copy)]
pub struct SimOptions {
    /// Deadlines strictly before this are urgent.
    pub cutoff: NaiveTime,
    pub late: Option<LateDeparture>,
    pub parallel: bool,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            cutoff: hm(constant::END_OF_DAY),
            late: None,
            parallel: false,
        }
    }
}

impl SimOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            cutoff: hm(constant::END_OF_DAY),
            late: Some(LateDeparture {
                vehicle: settings.late_vehicle_id,
                at: on_service_date(settings.late_departure),
            }),
            parallel: settings.parallel_routing,
        }
    }
}

/// Classifies, assigns and routes one day's packages, then writes the final
/// package states back into `store`.
pub fn simulate(
    store: &mut PackageStore,
    distances: &DistanceIndex,
    fleet: Vec<Vehicle>,
    options: &SimOptions,
) -> SimResult<SimulationReport> {
    let total_packages = store.len();

    let (buckets, mut warnings) = {
        let span = span!(Level::INFO, "classify");
        let _g = span.enter();
        classify(&store.all(), options.cutoff)
    };
    let groups = buckets.grouped.iter().map(|g| g.members.clone()).collect();

    let assignment = {
        let span = span!(Level::INFO, "assign");
        let _g = span.enter();
        plan(&buckets, store, fleet, options.late)?
    };
    warnings.extend(assignment.warnings);

    let mut vehicles = assignment.vehicles;
    // Stable: equal start times keep ascending id order.
    vehicles.sort_by_key(|v| v.start_time);

    let outcomes: Vec<RouteOutcome> = {
        let span = span!(Level::INFO, "route", parallel = options.parallel);
        let _g = span.enter();
        if options.parallel {
            vehicles
                .par_iter_mut()
                .map(|v| simulate_route(v, distances))
                .collect()
        } else {
            vehicles
                .iter_mut()
                .map(|v| simulate_route(v, distances))
                .collect()
        }
    };

    let mut routing_failed = vec![];
    for outcome in outcomes {
        routing_failed.extend(outcome.routing_failed);
        warnings.extend(outcome.warnings);
    }
    routing_failed.sort_unstable();

    for pkg in vehicles.iter().flat_map(|v| v.packages.iter()) {
        store.insert(pkg.clone());
    }

    let report = SimulationReport {
        vehicles,
        total_packages,
        groups,
        assignment_failed: assignment.unassigned,
        routing_failed,
        warnings,
    };

    info!(
        "Delivered {}/{} packages ({} assignment failures, {} routing failures), {:.2} mi total",
        report.delivered_count(),
        report.total_packages,
        report.assignment_failed.len(),
        report.routing_failed.len(),
        report.total_distance()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{DeliveryStatus, Package};

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn line(n: usize) -> DistanceIndex {
        let rows: Vec<Vec<f64>> = (0..n)
            .map(|i| (0..=i).map(|j| (i - j) as f64).collect())
            .collect();
        DistanceIndex::from_lower_triangle(rows).unwrap()
    }

    fn fleet(n: u32, capacity: usize) -> Vec<Vehicle> {
        (1..=n)
            .map(|id| Vehicle::new(id, capacity, on_service_date(t(8, 0))))
            .collect()
    }

    #[test]
    fn later_departures_are_simulated_last() {
        let mut store: PackageStore = (1..=4).map(|id| Package::new(id, Some(id as usize))).collect();
        if let Some(p) = store.get_mut(4) {
            p.constraints.delayed_until = Some(t(10, 20));
        }
        let options = SimOptions {
            late: Some(LateDeparture {
                vehicle: 1,
                at: on_service_date(t(10, 20)),
            }),
            ..SimOptions::default()
        };

        let report = simulate(&mut store, &line(5), fleet(2, 3), &options).unwrap();
        let order: Vec<u32> = report.vehicles.iter().map(|v| v.id).collect();
        assert_eq!(order, vec![2, 1]);
        assert!(report.is_total());
        assert_eq!(report.delivered_count(), 4);
    }

    #[test]
    fn store_reflects_final_states() {
        let mut store: PackageStore = (1..=3).map(|id| Package::new(id, Some(id as usize))).collect();
        let report = simulate(&mut store, &line(4), fleet(1, 3), &SimOptions::default()).unwrap();

        assert!(store
            .all()
            .iter()
            .all(|p| p.status == DeliveryStatus::Delivered && p.delivered_at.is_some()));
        // 1 + 1 + 1 out, 3 back
        assert!((report.total_distance() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn failures_are_counted_apart_from_deliveries() {
        let mut store: PackageStore = (1..=5).map(|id| Package::new(id, Some(id as usize))).collect();
        if let Some(p) = store.get_mut(2) {
            p.destination = None;
        }
        let report = simulate(&mut store, &line(6), fleet(1, 4), &SimOptions::default()).unwrap();

        assert_eq!(report.delivered_count(), 3);
        assert_eq!(report.routing_failed, vec![2]);
        assert_eq!(report.assignment_failed, vec![5]);
        assert!(report.is_total());
    }

    #[test]
    fn parallel_routing_matches_sequential() {
        let build = || -> PackageStore { (1..=9).map(|id| Package::new(id, Some(id as usize))).collect() };
        let sequential = simulate(&mut build(), &line(10), fleet(3, 3), &SimOptions::default()).unwrap();
        let parallel = simulate(
            &mut build(),
            &line(10),
            fleet(3, 3),
            &SimOptions {
                parallel: true,
                ..SimOptions::default()
            },
        )
        .unwrap();

        for (a, b) in sequential.vehicles.iter().zip(parallel.vehicles.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.package_ids(), b.package_ids());
            assert_eq!(a.end_time, b.end_time);
        }
    }
}
