//! Application services.
//!
//! Logic shared by several handlers that spans more than one storage call.

pub mod review;

pub use review::{submit_review, ReviewOutcome};
