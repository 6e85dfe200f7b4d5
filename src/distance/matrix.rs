use std::path::Path;

use csv::ReaderBuilder;
use tracing::{debug, info};

use crate::error::{SimError, SimResult};

/// Symmetric distance table. Only the lower triangle is stored; lookups
/// mirror across the diagonal. Index 0 is the depot.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceIndex {
    rows: Vec<Vec<f64>>,
}

impl DistanceIndex {
    /// Row `i` must hold at least `i + 1` values (`d(i, 0) ..= d(i, i)`);
    /// anything past the diagonal is ignored.
    pub fn from_lower_triangle(rows: Vec<Vec<f64>>) -> SimResult<Self> {
        let mut trimmed = Vec::with_capacity(rows.len());
        for (i, mut row) in rows.into_iter().enumerate() {
            if row.len() < i + 1 {
                return Err(SimError::InvalidDistanceTable(format!(
                    "row {} has {} values, expected at least {}",
                    i,
                    row.len(),
                    i + 1
                )));
            }
            row.truncate(i + 1);
            if let Some(bad) = row.iter().find(|d| !d.is_finite() || **d < 0.0) {
                return Err(SimError::InvalidDistanceTable(format!(
                    "row {i} contains {bad}"
                )));
            }
            trimmed.push(row);
        }
        Ok(Self { rows: trimmed })
    }

    /// Reads the CSV layout where row `i` lists distances to locations `0..=i`
    /// and the upper triangle is left blank.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path.as_ref())?;

        let mut rows = vec![];
        for (i, record) in reader.records().enumerate() {
            let record = record?;
            let mut row = Vec::with_capacity(i + 1);
            for (j, cell) in record.iter().enumerate().take(i + 1) {
                let value = cell.parse::<f64>().map_err(|_| {
                    SimError::InvalidDistanceTable(format!("cell ({i}, {j}) is {cell:?}"))
                })?;
                row.push(value);
            }
            rows.push(row);
        }

        let index = Self::from_lower_triangle(rows)?;
        info!(
            "Loaded distance table with {} locations from {}",
            index.len(),
            path.as_ref().display()
        );
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Callers pass indices below [`len`](Self::len).
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        if i >= j {
            self.rows[i][j]
        } else {
            self.rows[j][i]
        }
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i < self.len() && j < self.len() {
            Some(self.distance(i, j))
        } else {
            None
        }
    }

    pub fn log_table(&self) {
        debug!("Distance table:");
        for row in &self.rows {
            debug!("{:?}", row);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample() -> DistanceIndex {
        DistanceIndex::from_lower_triangle(vec![
            vec![0.0],
            vec![7.2, 0.0],
            vec![3.8, 7.1, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn lookups_mirror_across_the_diagonal() {
        let dm = sample();
        assert_eq!(dm.distance(2, 1), 7.1);
        assert_eq!(dm.distance(1, 2), 7.1);
        assert_eq!(dm.distance(0, 2), 3.8);
        assert_eq!(dm.distance(1, 1), 0.0);
        assert_eq!(dm.get(3, 0), None);
    }

    #[test]
    fn short_rows_and_negative_values_are_rejected() {
        let short = DistanceIndex::from_lower_triangle(vec![vec![0.0], vec![1.0]]);
        assert!(matches!(short, Err(SimError::InvalidDistanceTable(_))));

        let negative = DistanceIndex::from_lower_triangle(vec![vec![0.0], vec![-1.0, 0.0]]);
        assert!(matches!(negative, Err(SimError::InvalidDistanceTable(_))));
    }

    #[test]
    fn reads_lower_triangle_csv_with_blank_upper_cells() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0,,").unwrap();
        writeln!(file, "7.2,0,").unwrap();
        writeln!(file, "3.8,7.1,0").unwrap();

        let dm = DistanceIndex::from_csv(file.path()).unwrap();
        assert_eq!(dm, sample());
    }

    #[test]
    fn non_numeric_cell_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0,,").unwrap();
        writeln!(file, "x,0,").unwrap();

        let err = DistanceIndex::from_csv(file.path()).unwrap_err();
        assert!(matches!(err, SimError::InvalidDistanceTable(_)));
    }
}
