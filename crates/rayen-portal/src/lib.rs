//! Portal automation for Rayen APS.
//!
//! This crate holds the page-driver seam and the two flows built on it:
//! extracting scheduled patients into a new workbook, and filling an
//! existing clinic sheet from each patient's record and anamnesis note.
//! A JSON replay driver stands in for a live browser session.

pub mod driver;
pub mod error;
pub mod flows;
pub mod parse;
pub mod replay;

pub use driver::*;
pub use error::{PortalError, PortalResult};
pub use flows::*;
pub use parse::*;
pub use replay::*;
