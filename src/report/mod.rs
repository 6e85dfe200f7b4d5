pub mod console;
pub mod export;
pub mod status;

pub use console::{print_report, print_status};
pub use export::save_to_csv;
pub use status::{snapshot, status_at};
