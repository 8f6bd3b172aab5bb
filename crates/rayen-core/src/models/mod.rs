//! Domain models for clinic automation.

mod patient;
mod schedule;

pub use patient::*;
pub use schedule::*;
