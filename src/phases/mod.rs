pub mod assign;
pub mod classify;
pub mod phases_types;

pub use assign::{plan, LateDeparture};
pub use classify::classify;
pub use phases_types::{Buckets, Category, Group};
