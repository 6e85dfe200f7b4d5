pub mod address;
pub mod matrix;

pub use address::AddressResolver;
pub use matrix::DistanceIndex;
