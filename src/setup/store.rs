use tracing::trace;

use crate::domain::types::{Package, PackageId};

/// Fixed-bucket hash table of packages keyed by id, chained on collision.
#[derive(Debug, Clone)]
pub struct PackageStore {
    buckets: Vec<Vec<Package>>,
    len: usize,
}

impl PackageStore {
    pub fn with_buckets(buckets: usize) -> Self {
        Self {
            buckets: vec![vec![]; buckets.max(1)],
            len: 0,
        }
    }

    fn bucket(&self, id: PackageId) -> usize {
        id as usize % self.buckets.len()
    }

    /// Inserts or replaces. Returns the previous record for `package.id`.
    pub fn insert(&mut self, package: Package) -> Option<Package> {
        let b = self.bucket(package.id);
        let chain = &mut self.buckets[b];
        if let Some(slot) = chain.iter_mut().find(|p| p.id == package.id) {
            trace!("Updated package {} in bucket {}", package.id, b);
            return Some(std::mem::replace(slot, package));
        }
        trace!("Inserted package {} in bucket {}", package.id, b);
        chain.push(package);
        self.len += 1;
        None
    }

    pub fn get(&self, id: PackageId) -> Option<&Package> {
        self.buckets[self.bucket(id)].iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: PackageId) -> Option<&mut Package> {
        let b = self.bucket(id);
        self.buckets[b].iter_mut().find(|p| p.id == id)
    }

    pub fn remove(&mut self, id: PackageId) -> Option<Package> {
        let b = self.bucket(id);
        let chain = &mut self.buckets[b];
        let pos = chain.iter().position(|p| p.id == id)?;
        self.len -= 1;
        Some(chain.remove(pos))
    }

    pub fn contains(&self, id: PackageId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All ids in ascending order.
    pub fn ids(&self) -> Vec<PackageId> {
        let mut ids: Vec<PackageId> = self.buckets.iter().flatten().map(|p| p.id).collect();
        ids.sort_unstable();
        ids
    }

    /// All packages in ascending id order.
    pub fn all(&self) -> Vec<&Package> {
        let mut all: Vec<&Package> = self.buckets.iter().flatten().collect();
        all.sort_by_key(|p| p.id);
        all
    }
}

impl Default for PackageStore {
    fn default() -> Self {
        Self::with_buckets(crate::config::constant::PACKAGE_BUCKETS)
    }
}

impl FromIterator<Package> for PackageStore {
    fn from_iter<I: IntoIterator<Item = Package>>(iter: I) -> Self {
        let mut store = PackageStore::default();
        for p in iter {
            store.insert(p);
        }
        store
    }
}
