use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::distance::{AddressResolver, DistanceIndex};
use crate::error::SimResult;
use crate::setup::init::package_from_record;
use crate::setup::init_types::{PackageRecord, Scenario};
use crate::setup::store::PackageStore;

const DEADLINES: [&str; 5] = ["EOD", "EOD", "EOD", "10:30 AM", "9:00 AM"];

/// Generates addresses for `locations` stops, index 0 being the hub.
fn generate_addresses(locations: usize) -> Vec<String> {
    let mut addresses = Vec::with_capacity(locations);
    addresses.push("4001 South 700 East".to_string());
    for i in 1..locations {
        addresses.push(format!("{} Fixture Ave", 100 + i * 7));
    }
    addresses
}

/// Lower triangle of random distances in `0.1..=15.0` miles, one decimal.
fn generate_distances(rng: &mut ChaCha8Rng, locations: usize) -> SimResult<DistanceIndex> {
    let rows: Vec<Vec<f64>> = (0..locations)
        .map(|i| {
            (0..=i)
                .map(|j| {
                    if i == j {
                        0.0
                    } else {
                        rng.gen_range(1..=150) as f64 / 10.0
                    }
                })
                .collect()
        })
        .collect();
    DistanceIndex::from_lower_triangle(rows)
}

/// Special notes in the same phrasing as the real package file.
fn generate_notes(rng: &mut ChaCha8Rng, id: u32, package_count: u32) -> String {
    match rng.gen_range(0..20) {
        0 => "Can only be on truck 2".to_string(),
        1 => "Delayed on flight---will not arrive to depot until 9:05 am".to_string(),
        2 if package_count > 2 => {
            let mut others: Vec<u32> = (1..=package_count).filter(|o| *o != id).collect();
            others.shuffle(rng);
            format!("Must be delivered with {}, {}", others[0], others[1])
        }
        _ => String::new(),
    }
}

/// Builds a deterministic day of packages and distances from `seed`.
pub fn generate_scenario(seed: u64, package_count: usize, locations: usize) -> SimResult<Scenario> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let locations = locations.max(2);
    let resolver = AddressResolver::new(generate_addresses(locations));
    let distances = generate_distances(&mut rng, locations)?;

    let mut store = PackageStore::default();
    let mut warnings = vec![];
    for id in 1..=package_count as u32 {
        let dest = rng.gen_range(1..locations);
        let record = PackageRecord {
            package_id: id,
            address: resolver.address(dest).unwrap_or_default().to_string(),
            city: "Salt Lake City".to_string(),
            state: "UT".to_string(),
            zip: format!("84{:03}", dest),
            deadline: DEADLINES
                .choose(&mut rng)
                .copied()
                .unwrap_or("EOD")
                .to_string(),
            weight: rng.gen_range(1..=88) as f64,
            notes: generate_notes(&mut rng, id, package_count as u32),
        };
        let (package, mut w) = package_from_record(record, &resolver, distances.len());
        warnings.append(&mut w);
        store.insert(package);
    }

    info!(
        "Generated fixture scenario: {} packages over {} locations (seed {})",
        store.len(),
        distances.len(),
        seed
    );
    Ok(Scenario {
        store,
        distances,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_scenario() {
        let a = generate_scenario(7, 40, 27).unwrap();
        let b = generate_scenario(7, 40, 27).unwrap();
        assert_eq!(a.distances, b.distances);
        assert_eq!(a.store.all(), b.store.all());
    }

    #[test]
    fn every_package_has_a_destination() {
        let s = generate_scenario(3, 40, 27).unwrap();
        assert_eq!(s.store.len(), 40);
        assert!(s.warnings.is_empty());
        assert!(s
            .store
            .all()
            .iter()
            .all(|p| p.destination.is_some_and(|d| d > 0 && d < 27)));
    }
}
