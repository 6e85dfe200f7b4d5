use thiserror::Error;

/// Everything that can go wrong while loading or simulating a delivery day.
///
/// The first group of variants is recoverable: the planner and simulator
/// collect them as warnings and keep going. The rest abort the operation
/// that produced them.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("package {package_id}: could not derive {field} from {text:?}")]
    UnparseableConstraint {
        package_id: u32,
        field: &'static str,
        text: String,
    },

    #[error("packages {package_ids:?} do not fit: {reason}")]
    CapacityExceeded {
        package_ids: Vec<u32>,
        reason: String,
    },

    #[error("package {package_id}: destination {address:?} has no location index")]
    UnresolvedDestination { package_id: u32, address: String },

    #[error("package {package_id} requires vehicle {vehicle_id}, which is not in the fleet")]
    UnknownVehicle { package_id: u32, vehicle_id: u32 },

    #[error("vehicle {vehicle_id} holds {loaded}/{capacity}, cannot load {attempted} more")]
    CapacityViolationOnLoad {
        vehicle_id: u32,
        capacity: usize,
        loaded: usize,
        attempted: usize,
    },

    #[error("invalid record at line {line}: {reason}")]
    InvalidRecord { line: u64, reason: String },

    #[error("invalid distance table: {0}")]
    InvalidDistanceTable(String),

    #[error("invalid configuration for {key}: {value:?}")]
    InvalidConfig { key: &'static str, value: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl SimError {
    /// Recoverable conditions are reported as warnings instead of failing a run.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            SimError::UnparseableConstraint { .. }
                | SimError::CapacityExceeded { .. }
                | SimError::UnresolvedDestination { .. }
                | SimError::UnknownVehicle { .. }
        )
    }
}

pub type SimResult<T> = Result<T, SimError>;
