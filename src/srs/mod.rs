pub mod due;
pub mod sm2;

pub use due::{select_due, DueQueue};
pub use sm2::{apply, apply_quality, preview, SchedulerError};
