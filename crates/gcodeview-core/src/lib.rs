//! # GCodeView Core
//!
//! Core types, errors, and options for GCodeView.
//! Provides the toolpath data model shared by the interpreter,
//! the simplifier, and the layer and mesh exporters.

pub mod constants;
pub mod error;
pub mod options;
pub mod types;

pub use error::{Error, GcodeError, Result};

pub use options::{
    ConversionOptions, FilterOptions, LayerOptions, LineHeight, MeshOptions, OutputFormat,
    SimplifyTolerances,
};

pub use types::{Point, Polyline, ToolPaths, ToolPolylines, ToolSet};
