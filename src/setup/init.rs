use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use csv::ReaderBuilder;
use tracing::{debug, info, warn};

use crate::config::{constant, Settings};
use crate::distance::{AddressResolver, DistanceIndex};
use crate::domain::types::{Package, Vehicle};
use crate::error::{SimError, SimResult};
use crate::setup::init_types::{PackageRecord, Scenario};
use crate::setup::notes::{parse_deadline, parse_notes};
use crate::setup::store::PackageStore;

pub fn service_date() -> NaiveDate {
    let (y, m, d) = constant::SERVICE_DATE;
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

/// Anchors a time-of-day on the service date.
pub fn on_service_date(time: NaiveTime) -> NaiveDateTime {
    service_date().and_time(time)
}

/// Reads the package file into a store. Destinations are resolved through
/// `resolver` and must fall inside a table of `locations` entries.
pub fn load_packages<P: AsRef<Path>>(
    path: P,
    resolver: &AddressResolver,
    locations: usize,
) -> SimResult<(PackageStore, Vec<SimError>)> {
    let mut reader = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path.as_ref())?;

    let mut store = PackageStore::default();
    let mut warnings = vec![];

    for (n, row) in reader.deserialize::<PackageRecord>().enumerate() {
        let record = row?;
        let (package, mut record_warnings) = package_from_record(record, resolver, locations);
        debug!(
            "Loaded package {}: destination {:?}, deadline {:?}, constraints {:?}",
            package.id, package.destination, package.deadline, package.constraints
        );
        warnings.append(&mut record_warnings);
        if let Some(previous) = store.insert(package) {
            return Err(SimError::InvalidRecord {
                line: n as u64 + 2,
                reason: format!("duplicate package id {}", previous.id),
            });
        }
    }

    for w in &warnings {
        warn!("{}", w);
    }
    info!(
        "Loaded {} packages from {} ({} warnings)",
        store.len(),
        path.as_ref().display(),
        warnings.len()
    );
    Ok((store, warnings))
}

pub fn package_from_record(
    record: PackageRecord,
    resolver: &AddressResolver,
    locations: usize,
) -> (Package, Vec<SimError>) {
    let id = record.package_id;
    let (constraints, mut warnings) = parse_notes(id, &record.notes);
    let (deadline, deadline_warning) = parse_deadline(id, &record.deadline);
    warnings.extend(deadline_warning);

    let destination = resolver.resolve(&record.address).filter(|idx| *idx < locations);

    let mut package = Package::new(id, destination);
    package.address = record.address;
    package.city = record.city;
    package.zip = record.zip;
    package.deadline = deadline;
    package.weight = record.weight;
    package.notes = record.notes;
    package.constraints = constraints;
    (package, warnings)
}

/// Vehicles `1..=fleet_size`, all departing at the configured start time.
/// The planner moves the late vehicle's departure when it takes delayed packages.
pub fn build_fleet(settings: &Settings) -> Vec<Vehicle> {
    let start = on_service_date(settings.start_time);
    (1..=settings.fleet_size as u32)
        .map(|id| Vehicle::new(id, settings.vehicle_capacity, start))
        .collect()
}

/// Loads addresses, distances and packages from the configured files.
pub fn load_scenario(settings: &Settings) -> SimResult<Scenario> {
    let distances = DistanceIndex::from_csv(&settings.distance_csv)?;
    let resolver = AddressResolver::from_csv(&settings.address_csv)?;
    if resolver.len() != distances.len() {
        warn!(
            "Address list has {} entries but distance table has {}",
            resolver.len(),
            distances.len()
        );
    }
    distances.log_table();

    let (store, warnings) = load_packages(&settings.package_csv, &resolver, distances.len())?;
    Ok(Scenario {
        store,
        distances,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str =
        "Package ID,Address,City,State,Zip,Delivery Deadline,Weight Kilo,Special Notes";

    fn resolver() -> AddressResolver {
        AddressResolver::new(vec![
            "4001 South 700 East".to_string(),
            "195 W Oakland Ave".to_string(),
            "2530 S 500 E".to_string(),
        ])
    }

    #[test]
    fn loads_records_with_constraints() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        writeln!(file, "1,195 W Oakland Ave,Salt Lake City,UT,84115,10:30 AM,21,").unwrap();
        writeln!(file, "2,2530 S 500 E,Salt Lake City,UT,84106,EOD,44,Can only be on truck 2").unwrap();
        writeln!(file, "3,1 Nowhere Rd,Salt Lake City,UT,84106,EOD,2,\"Must be delivered with 1, 2\"").unwrap();
        writeln!(file, "4,2530 S 500 E,Salt Lake City,UT,84106,soon,2,Delayed until 9:05 am").unwrap();

        let (store, warnings) = load_packages(file.path(), &resolver(), 3).unwrap();
        assert_eq!(store.ids(), vec![1, 2, 3, 4]);

        let p1 = store.get(1).unwrap();
        assert_eq!(p1.destination, Some(1));
        assert_eq!(p1.deadline, NaiveTime::from_hms_opt(10, 30, 0));

        assert_eq!(store.get(2).unwrap().constraints.vehicle, Some(2));
        assert_eq!(store.get(3).unwrap().constraints.grouped_with, vec![1, 2]);
        assert_eq!(store.get(3).unwrap().destination, None);
        assert_eq!(
            store.get(4).unwrap().constraints.delayed_until,
            NaiveTime::from_hms_opt(9, 5, 0)
        );

        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            warnings[0],
            SimError::UnparseableConstraint {
                package_id: 4,
                field: "deadline",
                ..
            }
        ));
    }

    #[test]
    fn destination_outside_table_is_unresolved() {
        let record = PackageRecord {
            package_id: 9,
            address: "2530 S 500 E".to_string(),
            city: String::new(),
            state: String::new(),
            zip: String::new(),
            deadline: "EOD".to_string(),
            weight: 1.0,
            notes: String::new(),
        };
        let (package, _) = package_from_record(record, &resolver(), 2);
        assert_eq!(package.destination, None);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        writeln!(file, "1,195 W Oakland Ave,SLC,UT,84115,EOD,21,").unwrap();
        writeln!(file, "1,2530 S 500 E,SLC,UT,84106,EOD,44,").unwrap();

        let err = load_packages(file.path(), &resolver(), 3).unwrap_err();
        assert!(matches!(err, SimError::InvalidRecord { .. }));
    }

    #[test]
    fn fleet_follows_settings() {
        let settings = Settings {
            fleet_size: 2,
            vehicle_capacity: 5,
            ..Settings::default()
        };
        let fleet = build_fleet(&settings);
        assert_eq!(fleet.iter().map(|v| v.id).collect::<Vec<_>>(), vec![1, 2]);
        assert!(fleet.iter().all(|v| v.capacity == 5));
        assert_eq!(fleet[0].start_time.time(), settings.start_time);
    }
}
