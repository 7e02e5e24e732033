//! Polyline geometry helpers

pub mod simplify;

pub use simplify::{corner_measures, Simplifier};
