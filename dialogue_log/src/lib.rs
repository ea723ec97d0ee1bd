//! # Dialogue Log
//!
//! The turn log crate - the ordered record of what each node said and when.
//! This crate owns the data model only and contains no metric logic; the
//! metrics engine borrows slices of it.

pub mod turn_log;
pub mod turns;

pub use turn_log::*;
pub use turns::*;
