use std::collections::HashMap;

use chrono::NaiveTime;
use tracing::{debug, info, warn};

use crate::domain::types::{Package, PackageId};
use crate::error::SimError;
use crate::phases::phases_types::{Buckets, Group};

/// Union-find over positions in the package list. The root of a set is its
/// earliest member, so sets come out in discovery order.
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cur = x;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            let (keep, merge) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[merge] = keep;
        }
    }
}

/// Pass 1: links every package with the ids its notes name, transitively.
/// Returns the multi-member groups in discovery order.
pub fn find_groups(packages: &[&Package]) -> (Vec<Group>, Vec<SimError>) {
    let position: HashMap<PackageId, usize> =
        packages.iter().enumerate().map(|(i, p)| (p.id, i)).collect();
    let mut sets = DisjointSet::new(packages.len());
    let mut warnings = vec![];

    for (i, pkg) in packages.iter().enumerate() {
        for other in &pkg.constraints.grouped_with {
            match position.get(other) {
                Some(&j) => sets.union(i, j),
                None => warnings.push(SimError::UnparseableConstraint {
                    package_id: pkg.id,
                    field: "grouped-with",
                    text: format!("unknown package {other}"),
                }),
            }
        }
    }

    let mut by_root: Vec<Vec<PackageId>> = vec![vec![]; packages.len()];
    for (i, pkg) in packages.iter().enumerate() {
        let root = sets.find(i);
        by_root[root].push(pkg.id);
    }

    let groups = by_root
        .into_iter()
        .filter(|members| members.len() > 1)
        .map(|mut members| {
            members.sort_unstable();
            Group { members }
        })
        .collect();
    (groups, warnings)
}

/// Pass 2: places each package in exactly one bucket, by priority
/// Grouped > Delayed > Restricted > Urgent > Flexible. Urgent means a
/// deadline strictly before `cutoff`.
pub fn classify(packages: &[&Package], cutoff: NaiveTime) -> (Buckets, Vec<SimError>) {
    let (grouped, warnings) = find_groups(packages);
    for w in &warnings {
        warn!("{}", w);
    }

    let in_group: HashMap<PackageId, usize> = grouped
        .iter()
        .enumerate()
        .flat_map(|(g, group)| group.members.iter().map(move |id| (*id, g)))
        .collect();

    let mut buckets = Buckets {
        grouped,
        ..Buckets::default()
    };

    for pkg in packages {
        if in_group.contains_key(&pkg.id) {
            continue;
        }
        let c = &pkg.constraints;
        if c.delayed_until.is_some() {
            buckets.delayed.push(pkg.id);
        } else if let Some(vehicle) = c.vehicle {
            buckets.restricted.entry(vehicle).or_default().push(pkg.id);
        } else if pkg.deadline.is_some_and(|d| d < cutoff) {
            buckets.urgent.push(pkg.id);
        } else {
            buckets.flexible.push(pkg.id);
        }
    }

    debug!("Groups: {:?}", buckets.grouped);
    info!(
        "Classified {} packages: {} groups, {} delayed, {} restricted, {} urgent, {} flexible",
        packages.len(),
        buckets.grouped.len(),
        buckets.delayed.len(),
        buckets.restricted.values().map(Vec::len).sum::<usize>(),
        buckets.urgent.len(),
        buckets.flexible.len()
    );
    (buckets, warnings)
}
