//! Library side of the `rayen` command-line tool.
//!
//! Settings loading, logging setup, the command runners and the summary
//! tables live here so they can be tested without spawning the binary.

pub mod commands;
pub mod config;
pub mod logging;
pub mod summary;
