use std::collections::HashMap;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::{debug, info, warn};

use crate::error::SimResult;

/// Maps delivery addresses to location indices in the distance table.
#[derive(Debug, Clone, Default)]
pub struct AddressResolver {
    addresses: Vec<String>,
    exact: HashMap<String, usize>,
}

impl AddressResolver {
    pub fn new(addresses: Vec<String>) -> Self {
        let addresses: Vec<String> = addresses.into_iter().map(|a| a.trim().to_string()).collect();
        let mut exact = HashMap::with_capacity(addresses.len());
        for (idx, address) in addresses.iter().enumerate() {
            exact.entry(address.clone()).or_insert(idx);
        }
        Self { addresses, exact }
    }

    /// Column 1 of every row with at least two columns, in row order.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path.as_ref())?;

        let mut addresses = vec![];
        for record in reader.records() {
            let record = record?;
            if let Some(address) = record.get(1) {
                addresses.push(address.to_string());
            }
        }

        info!(
            "Loaded {} addresses from {}",
            addresses.len(),
            path.as_ref().display()
        );
        Ok(Self::new(addresses))
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn address(&self, index: usize) -> Option<&str> {
        self.addresses.get(index).map(String::as_str)
    }

    /// Exact match first, then the first entry that contains `address`.
    pub fn resolve(&self, address: &str) -> Option<usize> {
        let needle = address.trim();
        if needle.is_empty() {
            return None;
        }
        if let Some(&idx) = self.exact.get(needle) {
            return Some(idx);
        }
        let found = self.addresses.iter().position(|a| a.contains(needle));
        match found {
            Some(idx) => debug!("Address {:?} matched {:?} by substring", needle, self.addresses[idx]),
            None => warn!("Address {:?} not found", needle),
        }
        found
    }
}
