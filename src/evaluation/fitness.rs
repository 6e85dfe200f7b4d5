use crate::distance::DistanceIndex;
use crate::domain::types::{DeliveryStatus, Vehicle};

/// Depot -> each delivered stop in visit order -> depot.
pub fn find_distance(vehicle: &Vehicle, distances: &DistanceIndex) -> f64 {
    let stops: Vec<usize> = vehicle
        .packages
        .iter()
        .filter(|p| p.status == DeliveryStatus::Delivered)
        .filter_map(|p| p.destination)
        .collect();
    if stops.is_empty() {
        return 0.0;
    }

    let warehouse_to_first_loc = distances.distance(0, stops[0]);
    let last_loc_to_warehouse = distances.distance(stops[stops.len() - 1], 0);

    let total_dist: f64 = stops
        .windows(2)
        .map(|w| distances.distance(w[0], w[1]))
        .sum();

    warehouse_to_first_loc + total_dist + last_loc_to_warehouse
}
