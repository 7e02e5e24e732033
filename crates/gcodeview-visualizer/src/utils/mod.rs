//! Utility modules

pub mod file_io;

pub use file_io::{FileReadStats, GcodeFileReader};
