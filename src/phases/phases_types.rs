use std::collections::BTreeMap;

use crate::domain::types::{PackageId, VehicleId};

/// Packages that must ride together, in ascending id order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub members: Vec<PackageId>,
}

impl Group {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Grouped,
    Delayed,
    Restricted,
    Urgent,
    Flexible,
}

/// Disjoint partition of the package set. Ids keep source order inside each bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buckets {
    /// In discovery order.
    pub grouped: Vec<Group>,
    pub delayed: Vec<PackageId>,
    /// Keyed by required vehicle, ascending.
    pub restricted: BTreeMap<VehicleId, Vec<PackageId>>,
    pub urgent: Vec<PackageId>,
    pub flexible: Vec<PackageId>,
}

impl Buckets {
    pub fn category_of(&self, id: PackageId) -> Option<Category> {
        if self.grouped.iter().any(|g| g.members.contains(&id)) {
            Some(Category::Grouped)
        } else if self.delayed.contains(&id) {
            Some(Category::Delayed)
        } else if self.restricted.values().any(|ids| ids.contains(&id)) {
            Some(Category::Restricted)
        } else if self.urgent.contains(&id) {
            Some(Category::Urgent)
        } else if self.flexible.contains(&id) {
            Some(Category::Flexible)
        } else {
            None
        }
    }

    /// Every classified id, bucket by bucket.
    pub fn ids(&self) -> Vec<PackageId> {
        self.grouped
            .iter()
            .flat_map(|g| g.members.iter().copied())
            .chain(self.delayed.iter().copied())
            .chain(self.restricted.values().flatten().copied())
            .chain(self.urgent.iter().copied())
            .chain(self.flexible.iter().copied())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.ids().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
