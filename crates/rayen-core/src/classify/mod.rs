//! Classifiers that turn portal free text into sheet fields.
//!
//! Pipeline: raw text → [`normalize`](crate::text::normalize) → table lookup
//!
//! Every classifier is total: unmatched or malformed input yields `None`
//! (or 0 months), never an error.

mod age;
mod anamnesis;
mod attention;
mod deficit;
mod sex;

pub use age::*;
pub use anamnesis::*;
pub use attention::*;
pub use deficit::*;
pub use sex::*;
