use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::domain::solution::Assignment;
use crate::domain::types::{Package, PackageId, Vehicle, VehicleId};
use crate::error::{SimError, SimResult};
use crate::phases::phases_types::Buckets;
use crate::setup::store::PackageStore;

/// The vehicle reserved for delayed packages and when it may leave.
#[derive(Debug, Clone, Copy)]
pub struct LateDeparture {
    pub vehicle: VehicleId,
    pub at: NaiveDateTime,
}

struct Planner<'a> {
    store: &'a PackageStore,
    vehicles: Vec<Vehicle>,
    vehicle_of: BTreeMap<PackageId, VehicleId>,
    /// Packages that must not fall through to first-fit.
    blocked: HashSet<PackageId>,
    warnings: Vec<SimError>,
}

impl<'a> Planner<'a> {
    fn is_assigned(&self, id: PackageId) -> bool {
        self.vehicle_of.contains_key(&id)
    }

    /// First vehicle in ascending id order with at least `need` free slots.
    fn first_fit(&self, need: usize) -> Option<usize> {
        self.vehicles.iter().position(|v| v.remaining() >= need)
    }

    fn position_of(&self, vehicle: VehicleId) -> Option<usize> {
        self.vehicles.iter().position(|v| v.id == vehicle)
    }

    fn load(&mut self, slot: usize, ids: &[PackageId]) -> SimResult<()> {
        let packages: Vec<Package> = ids
            .iter()
            .filter_map(|id| self.store.get(*id).cloned())
            .collect();
        let vehicle = &mut self.vehicles[slot];
        vehicle.load(packages)?;
        for id in ids {
            self.vehicle_of.insert(*id, vehicle.id);
        }
        debug!("Loaded {:?} on vehicle {}", ids, vehicle.id);
        Ok(())
    }

    fn first_fit_one(&mut self, id: PackageId, kind: &str) -> SimResult<bool> {
        if self.is_assigned(id) || self.blocked.contains(&id) {
            return Ok(true);
        }
        match self.first_fit(1) {
            Some(slot) => {
                self.load(slot, &[id])?;
                debug!("{} package {} on vehicle {}", kind, id, self.vehicles[slot].id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn reject(&mut self, ids: Vec<PackageId>, reason: String) {
        let err = SimError::CapacityExceeded {
            package_ids: ids.clone(),
            reason,
        };
        warn!("{}", err);
        self.warnings.push(err);
        self.blocked.extend(ids);
    }

    fn place_groups(&mut self, buckets: &Buckets) -> SimResult<()> {
        for group in &buckets.grouped {
            match self.first_fit(group.len()) {
                Some(slot) => self.load(slot, &group.members)?,
                None => self.reject(
                    group.members.clone(),
                    format!("no vehicle has {} free slots for the group", group.len()),
                ),
            }
        }
        Ok(())
    }

    fn place_restricted(&mut self, buckets: &Buckets) -> SimResult<()> {
        for (vehicle, ids) in &buckets.restricted {
            let Some(slot) = self.position_of(*vehicle) else {
                for id in ids {
                    let err = SimError::UnknownVehicle {
                        package_id: *id,
                        vehicle_id: *vehicle,
                    };
                    warn!("{}", err);
                    self.warnings.push(err);
                    self.blocked.insert(*id);
                }
                continue;
            };
            for id in ids {
                if self.is_assigned(*id) {
                    continue;
                }
                if self.vehicles[slot].is_full() {
                    self.reject(vec![*id], format!("required vehicle {vehicle} is full"));
                } else {
                    self.load(slot, &[*id])?;
                }
            }
        }
        Ok(())
    }

    fn place_delayed(&mut self, buckets: &Buckets, late: Option<LateDeparture>) -> SimResult<()> {
        let late_slot = late.and_then(|l| self.position_of(l.vehicle));
        for id in &buckets.delayed {
            if self.is_assigned(*id) {
                continue;
            }
            if let (Some(l), Some(pkg)) = (late, self.store.get(*id)) {
                if pkg.constraints.delayed_until.is_some_and(|t| t > l.at.time()) {
                    warn!(
                        "Package {} arrives at {:?}, after vehicle {} departs at {}",
                        id,
                        pkg.constraints.delayed_until,
                        l.vehicle,
                        l.at.time()
                    );
                }
            }
            match late_slot {
                Some(slot) if !self.vehicles[slot].is_full() => self.load(slot, &[*id])?,
                _ => {
                    warn!("Late vehicle unavailable for delayed package {}, using first fit", id);
                    self.first_fit_one(*id, "Delayed")?;
                }
            }
        }
        Ok(())
    }
}

/// Maps every package to one vehicle without exceeding capacity.
///
/// Steps claim capacity in a fixed order: groups, vehicle-restricted,
/// delayed, urgent, flexible, then a final first-fit sweep. Every first-fit
/// scans vehicles in ascending id order. Groups and restricted packages that
/// do not fit are reported and left out; they are never split or moved to
/// another vehicle.
pub fn plan(
    buckets: &Buckets,
    store: &PackageStore,
    mut vehicles: Vec<Vehicle>,
    late: Option<LateDeparture>,
) -> SimResult<Assignment> {
    vehicles.sort_by_key(|v| v.id);

    if let Some(l) = late {
        if let Some(v) = vehicles.iter_mut().find(|v| v.id == l.vehicle) {
            if v.start_time < l.at {
                info!("Vehicle {} held until {}", v.id, l.at.time());
                v.start_time = l.at;
            }
        }
    }

    let mut planner = Planner {
        store,
        vehicles,
        vehicle_of: BTreeMap::new(),
        blocked: HashSet::new(),
        warnings: vec![],
    };

    planner.place_groups(buckets)?;
    planner.place_restricted(buckets)?;
    planner.place_delayed(buckets, late)?;
    for id in &buckets.urgent {
        planner.first_fit_one(*id, "Urgent")?;
    }
    for id in &buckets.flexible {
        planner.first_fit_one(*id, "Flexible")?;
    }

    let mut all_ids = buckets.ids();
    all_ids.sort_unstable();
    for id in &all_ids {
        if !planner.first_fit_one(*id, "Final pass")? {
            planner.reject(vec![*id], "every vehicle is full".to_string());
        }
    }

    let unassigned: Vec<PackageId> = all_ids
        .into_iter()
        .filter(|id| !planner.is_assigned(*id))
        .collect();

    for v in &planner.vehicles {
        info!(
            "Vehicle {} departs {} with {}/{} packages: {:?}",
            v.id,
            v.start_time.time(),
            v.packages.len(),
            v.capacity,
            v.package_ids()
        );
    }
    if !unassigned.is_empty() {
        warn!("Unassigned packages: {:?}", unassigned);
    }

    Ok(Assignment {
        vehicles: planner.vehicles,
        vehicle_of: planner.vehicle_of,
        unassigned,
        warnings: planner.warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phases::classify::classify;
    use crate::setup::init::on_service_date;
    use chrono::NaiveTime;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn fleet(capacities: &[usize]) -> Vec<Vehicle> {
        capacities
            .iter()
            .enumerate()
            .map(|(i, c)| Vehicle::new(i as u32 + 1, *c, on_service_date(t(8, 0))))
            .collect()
    }

    fn run(packages: Vec<Package>, vehicles: Vec<Vehicle>, late: Option<LateDeparture>) -> Assignment {
        let store: PackageStore = packages.into_iter().collect();
        let all = store.all();
        let (buckets, _) = classify(&all, t(17, 0));
        plan(&buckets, &store, vehicles, late).unwrap()
    }

    fn pkgs(n: u32) -> Vec<Package> {
        (1..=n).map(|id| Package::new(id, Some(id as usize))).collect()
    }

    #[test]
    fn group_lands_on_lowest_vehicle_with_room() {
        let mut packages = pkgs(20);
        packages[9].constraints.grouped_with = vec![20];
        let a = run(packages, fleet(&[16, 16, 16]), None);
        assert_eq!(a.vehicle_of[&10], 1);
        assert_eq!(a.vehicle_of[&20], 1);
        assert!(a.unassigned.is_empty());
    }

    #[test]
    fn group_skips_vehicle_without_enough_room() {
        let mut packages = pkgs(4);
        packages[0].constraints.grouped_with = vec![2];
        packages[2].constraints.grouped_with = vec![4];
        let a = run(packages, fleet(&[3, 2]), None);
        assert_eq!(a.vehicle_of[&1], 1);
        assert_eq!(a.vehicle_of[&2], 1);
        assert_eq!(a.vehicle_of[&3], 2);
        assert_eq!(a.vehicle_of[&4], 2);
    }

    #[test]
    fn oversized_group_is_reported_whole() {
        let mut packages = pkgs(4);
        packages[0].constraints.grouped_with = vec![2, 3];
        let a = run(packages, fleet(&[2, 2]), None);
        assert_eq!(a.unassigned, vec![1, 2, 3]);
        assert_eq!(a.vehicle_of[&4], 1);
        assert!(matches!(
            a.warnings.as_slice(),
            [SimError::CapacityExceeded { package_ids, .. }] if package_ids == &vec![1, 2, 3]
        ));
    }

    #[test]
    fn restricted_package_is_not_moved_off_a_full_vehicle() {
        let mut packages = pkgs(4);
        for p in packages.iter_mut().take(3) {
            p.constraints.vehicle = Some(2);
        }
        let a = run(packages, fleet(&[5, 2]), None);
        assert_eq!(a.vehicle_of[&1], 2);
        assert_eq!(a.vehicle_of[&2], 2);
        assert!(!a.vehicle_of.contains_key(&3));
        assert_eq!(a.unassigned, vec![3]);
        assert!(matches!(
            a.warnings.as_slice(),
            [SimError::CapacityExceeded { package_ids, .. }] if package_ids == &vec![3]
        ));
    }

    #[test]
    fn restriction_to_missing_vehicle_is_reported() {
        let mut packages = pkgs(2);
        packages[0].constraints.vehicle = Some(9);
        let a = run(packages, fleet(&[4]), None);
        assert_eq!(a.unassigned, vec![1]);
        assert!(matches!(
            a.warnings.as_slice(),
            [SimError::UnknownVehicle {
                package_id: 1,
                vehicle_id: 9
            }]
        ));
    }

    #[test]
    fn delayed_package_rides_the_late_vehicle() {
        let mut packages = pkgs(3);
        packages[1].constraints.delayed_until = Some(t(10, 20));
        let late = LateDeparture {
            vehicle: 3,
            at: on_service_date(t(10, 20)),
        };
        let a = run(packages, fleet(&[16, 16, 16]), Some(late));
        assert_eq!(a.vehicle_of[&2], 3);
        let v3 = a.vehicles.iter().find(|v| v.id == 3).unwrap();
        assert_eq!(v3.start_time.time(), t(10, 20));
        assert_eq!(a.vehicles[0].start_time.time(), t(8, 0));
    }

    #[test]
    fn delayed_falls_through_when_late_vehicle_is_full() {
        let mut packages = pkgs(3);
        packages[0].constraints.vehicle = Some(2);
        packages[1].constraints.delayed_until = Some(t(9, 5));
        let late = LateDeparture {
            vehicle: 2,
            at: on_service_date(t(9, 5)),
        };
        let a = run(packages, fleet(&[2, 1]), Some(late));
        assert_eq!(a.vehicle_of[&1], 2);
        assert_eq!(a.vehicle_of[&2], 1);
        assert_eq!(a.vehicle_of[&3], 1);
    }

    #[test]
    fn capacity_is_never_exceeded() {
        let a = run(pkgs(10), fleet(&[3, 3, 3]), None);
        assert!(a.vehicles.iter().all(|v| v.packages.len() <= v.capacity));
        assert_eq!(a.assigned_count(), 9);
        assert_eq!(a.unassigned, vec![10]);
    }

    #[test]
    fn urgent_claims_capacity_before_flexible() {
        let mut packages = pkgs(3);
        packages[2].deadline = Some(t(10, 30));
        let a = run(packages, fleet(&[1, 1, 1]), None);
        assert_eq!(a.vehicle_of[&3], 1);
        assert_eq!(a.vehicle_of[&1], 2);
        assert_eq!(a.vehicle_of[&2], 3);
    }
}
